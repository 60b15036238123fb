//! Server-side pricing
//!
//! The pricing engine computes the trusted total for a booking from the
//! configured price table. This is the central trust boundary of the
//! system: passenger counts and add-on *names* come from the client,
//! every price comes from the table, and the resulting total is the only
//! amount ever sent to the payment provider.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use core_kernel::{Currency, Money, MoneyError};

use crate::booking::PassengerCounts;

/// How an add-on price applies to a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingMode {
    /// Charged once per booking
    Flat,
    /// Charged once per passenger
    PerPassenger,
}

/// A priced add-on entry in the table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddonPrice {
    pub price: Money,
    pub mode: PricingMode,
}

/// Server-configured price table
///
/// Built once at process start from configuration and injected into the
/// engine; business logic never reads prices from ambient state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTable {
    currency: Currency,
    adult_fare: Money,
    child_fare: Money,
    addons: BTreeMap<String, AddonPrice>,
}

impl PriceTable {
    pub fn new(currency: Currency, adult_fare: Money, child_fare: Money) -> Self {
        Self {
            currency,
            adult_fare,
            child_fare,
            addons: BTreeMap::new(),
        }
    }

    /// Adds a priced add-on to the table
    pub fn with_addon(mut self, name: impl Into<String>, price: Money, mode: PricingMode) -> Self {
        self.addons.insert(name.into(), AddonPrice { price, mode });
        self
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn addon(&self, name: &str) -> Option<&AddonPrice> {
        self.addons.get(name)
    }
}

/// Errors from total computation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// adults + children must be at least 1
    #[error("A booking requires at least one passenger")]
    NoPassengers,

    /// The client named an add-on the table does not price
    #[error("Unknown add-on: {0}")]
    UnknownAddon(String),

    /// The computed total must be strictly positive
    #[error("Computed total is not positive")]
    NonPositiveTotal,

    #[error("Money error: {0}")]
    Money(#[from] MoneyError),
}

/// Pure pricing function over the configured table
///
/// Deterministic and side-effect free: identical inputs and table always
/// produce the identical total, so a charge can be re-derived for audit
/// or refund reasoning.
#[derive(Debug, Clone)]
pub struct PricingEngine {
    table: PriceTable,
}

impl PricingEngine {
    pub fn new(table: PriceTable) -> Self {
        Self { table }
    }

    pub fn currency(&self) -> Currency {
        self.table.currency()
    }

    /// Computes the trusted total for a booking
    ///
    /// Base amount is adults x adult fare + children x child fare.
    /// Flat add-ons contribute their price once; per-passenger add-ons
    /// contribute price x (adults + children). Unknown add-on names are
    /// rejected rather than silently dropped, so the order the client
    /// sees and the total charged can never disagree. Each multiplied
    /// intermediate is rounded half-up to currency precision before
    /// summation.
    pub fn compute_total(
        &self,
        passengers: &PassengerCounts,
        addons: &[String],
    ) -> Result<Money, PricingError> {
        if passengers.total() == 0 {
            return Err(PricingError::NoPassengers);
        }

        let adults = Decimal::from(passengers.adults);
        let children = Decimal::from(passengers.children);
        let seats = Decimal::from(passengers.total());

        let mut total = self
            .table
            .adult_fare
            .multiply(adults)
            .round_to_currency()
            .checked_add(&self.table.child_fare.multiply(children).round_to_currency())?;

        for name in addons {
            let entry = self
                .table
                .addon(name)
                .ok_or_else(|| PricingError::UnknownAddon(name.clone()))?;

            let contribution = match entry.mode {
                PricingMode::Flat => entry.price,
                PricingMode::PerPassenger => entry.price.multiply(seats).round_to_currency(),
            };
            total = total.checked_add(&contribution)?;
        }

        if !total.is_positive() {
            return Err(PricingError::NonPositiveTotal);
        }

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn standard_table() -> PriceTable {
        PriceTable::new(
            Currency::MXN,
            Money::new(dec!(2500), Currency::MXN),
            Money::new(dec!(2200), Currency::MXN),
        )
        .with_addon("photos", Money::new(dec!(1200), Currency::MXN), PricingMode::Flat)
        .with_addon(
            "breakfast",
            Money::new(dec!(600), Currency::MXN),
            PricingMode::PerPassenger,
        )
    }

    #[test]
    fn test_base_fare_only() {
        let engine = PricingEngine::new(standard_table());
        let total = engine
            .compute_total(&PassengerCounts::new(2, 1), &[])
            .unwrap();
        // 2 x 2500 + 1 x 2200
        assert_eq!(total.amount(), dec!(7200));
    }

    #[test]
    fn test_flat_and_per_passenger_addons() {
        let engine = PricingEngine::new(standard_table());
        let total = engine
            .compute_total(
                &PassengerCounts::new(2, 1),
                &["photos".to_string(), "breakfast".to_string()],
            )
            .unwrap();
        // base 7200 + flat 1200 + 600 x 3 = 10200
        assert_eq!(total.amount(), dec!(10200));
        assert_eq!(total.minor_units().unwrap(), 1_020_000);
    }

    #[test]
    fn test_addon_order_does_not_change_total() {
        let engine = PricingEngine::new(standard_table());
        let a = engine
            .compute_total(
                &PassengerCounts::new(1, 2),
                &["photos".to_string(), "breakfast".to_string()],
            )
            .unwrap();
        let b = engine
            .compute_total(
                &PassengerCounts::new(1, 2),
                &["breakfast".to_string(), "photos".to_string()],
            )
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_passengers_rejected() {
        let engine = PricingEngine::new(standard_table());
        assert_eq!(
            engine.compute_total(&PassengerCounts::new(0, 0), &[]),
            Err(PricingError::NoPassengers)
        );
    }

    #[test]
    fn test_unknown_addon_rejected() {
        let engine = PricingEngine::new(standard_table());
        let result = engine.compute_total(
            &PassengerCounts::new(1, 0),
            &["helicopter-transfer".to_string()],
        );
        assert_eq!(
            result,
            Err(PricingError::UnknownAddon("helicopter-transfer".to_string()))
        );
    }

    #[test]
    fn test_fractional_per_passenger_price_rounds_half_up() {
        let table = PriceTable::new(
            Currency::MXN,
            Money::new(dec!(100), Currency::MXN),
            Money::new(dec!(0), Currency::MXN),
        )
        .with_addon(
            "insurance",
            Money::new(dec!(33.335), Currency::MXN),
            PricingMode::PerPassenger,
        );
        let engine = PricingEngine::new(table);
        let total = engine
            .compute_total(&PassengerCounts::new(3, 0), &["insurance".to_string()])
            .unwrap();
        // 33.335 x 3 = 100.005 -> 100.01 after half-up; base 300
        assert_eq!(total.amount(), dec!(400.01));
    }

    #[test]
    fn test_zero_priced_table_rejected_as_non_positive() {
        let table = PriceTable::new(
            Currency::MXN,
            Money::zero(Currency::MXN),
            Money::zero(Currency::MXN),
        );
        let engine = PricingEngine::new(table);
        assert_eq!(
            engine.compute_total(&PassengerCounts::new(1, 1), &[]),
            Err(PricingError::NonPositiveTotal)
        );
    }
}
