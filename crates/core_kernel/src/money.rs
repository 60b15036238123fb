//! Money types with precise decimal arithmetic
//!
//! This module provides a type-safe representation of monetary values
//! using rust_decimal for precise calculations without floating-point errors.
//! Charged amounts are always expressed in whole minor units (centavos),
//! rounded half-up from any fractional intermediate.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};
use thiserror::Error;

/// Currency codes following ISO 4217
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    MXN,
    USD,
    EUR,
}

impl Currency {
    /// Returns the number of decimal places for this currency
    pub fn decimal_places(&self) -> u32 {
        2
    }

    /// Returns the currency symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::MXN => "$",
            Currency::USD => "US$",
            Currency::EUR => "€",
        }
    }

    /// Returns the ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::MXN => "MXN",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
        }
    }

    /// Returns the lowercase code used by payment providers
    pub fn provider_code(&self) -> &'static str {
        match self {
            Currency::MXN => "mxn",
            Currency::USD => "usd",
            Currency::EUR => "eur",
        }
    }

    /// Parses an ISO 4217 code
    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "MXN" => Some(Currency::MXN),
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Currency mismatch: cannot operate on {0} and {1}")]
    CurrencyMismatch(String, String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Overflow during calculation")]
    Overflow,
}

/// A monetary amount with associated currency
///
/// Money uses rust_decimal for precise arithmetic without floating-point
/// errors. Amounts are stored with 4 decimal places internally; conversion
/// to minor units rounds half-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    /// Creates a new Money value
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self {
            amount: amount.round_dp(4),
            currency,
        }
    }

    /// Creates Money from an integer amount in minor units (e.g., centavos)
    pub fn from_minor(minor_units: i64, currency: Currency) -> Self {
        let divisor = Decimal::new(10_i64.pow(currency.decimal_places()), 0);
        Self::new(Decimal::new(minor_units, 0) / divisor, currency)
    }

    /// Creates a zero amount in the specified currency
    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: dec!(0),
            currency,
        }
    }

    /// Returns the amount
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Returns the currency
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Returns true if the amount is positive
    pub fn is_positive(&self) -> bool {
        self.amount.is_sign_positive() && !self.amount.is_zero()
    }

    /// Rounds to the currency's standard decimal places, half-up
    ///
    /// Half-up (midpoint away from zero) matches the granularity charged
    /// by the payment provider, not banker's rounding.
    pub fn round_to_currency(&self) -> Self {
        Self {
            amount: self.amount.round_dp_with_strategy(
                self.currency.decimal_places(),
                RoundingStrategy::MidpointAwayFromZero,
            ),
            currency: self.currency,
        }
    }

    /// Converts to whole minor units (centavos), rounding half-up
    pub fn minor_units(&self) -> Result<i64, MoneyError> {
        let scale = Decimal::new(10_i64.pow(self.currency.decimal_places()), 0);
        let scaled = (self.amount * scale)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        scaled.to_i64().ok_or(MoneyError::Overflow)
    }

    /// Checked addition that returns an error on currency mismatch
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch(
                self.currency.to_string(),
                other.currency.to_string(),
            ));
        }
        Ok(Self::new(self.amount + other.amount, self.currency))
    }

    /// Checked subtraction that returns an error on currency mismatch
    pub fn checked_sub(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch(
                self.currency.to_string(),
                other.currency.to_string(),
            ));
        }
        Ok(Self::new(self.amount - other.amount, self.currency))
    }

    /// Multiplies by a scalar (e.g., a passenger count)
    pub fn multiply(&self, factor: Decimal) -> Self {
        Self::new(self.amount * factor, self.currency)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dp = self.currency.decimal_places();
        write!(
            f,
            "{} {:.dp$} {}",
            self.currency.symbol(),
            self.amount,
            self.currency.code(),
            dp = dp as usize
        )
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.checked_add(&other)
            .expect("Currency mismatch in Money::add")
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        self.checked_sub(&other)
            .expect("Currency mismatch in Money::sub")
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, factor: Decimal) -> Self {
        self.multiply(factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_creation() {
        let m = Money::new(dec!(2500.00), Currency::MXN);
        assert_eq!(m.amount(), dec!(2500.00));
        assert_eq!(m.currency(), Currency::MXN);
    }

    #[test]
    fn test_money_from_minor() {
        let m = Money::from_minor(250000, Currency::MXN);
        assert_eq!(m.amount(), dec!(2500.00));
    }

    #[test]
    fn test_minor_units_round_trip() {
        let m = Money::new(dec!(10200), Currency::MXN);
        assert_eq!(m.minor_units().unwrap(), 1_020_000);
    }

    #[test]
    fn test_minor_units_rounds_half_up() {
        let up = Money::new(dec!(10.005), Currency::MXN);
        assert_eq!(up.minor_units().unwrap(), 1001);

        let down = Money::new(dec!(10.004), Currency::MXN);
        assert_eq!(down.minor_units().unwrap(), 1000);
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::new(dec!(100.00), Currency::MXN);
        let b = Money::new(dec!(50.00), Currency::MXN);

        assert_eq!((a + b).amount(), dec!(150.00));
        assert_eq!((a - b).amount(), dec!(50.00));
    }

    #[test]
    fn test_currency_mismatch() {
        let mxn = Money::new(dec!(100.00), Currency::MXN);
        let usd = Money::new(dec!(100.00), Currency::USD);

        let result = mxn.checked_add(&usd);
        assert!(matches!(result, Err(MoneyError::CurrencyMismatch(_, _))));
    }

    #[test]
    fn test_multiply_by_count() {
        let fare = Money::new(dec!(2500), Currency::MXN);
        let total = fare.multiply(Decimal::from(3u32));
        assert_eq!(total.amount(), dec!(7500));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn minor_units_inverts_from_minor(amount in 0i64..1_000_000_000i64) {
            let money = Money::from_minor(amount, Currency::MXN);
            prop_assert_eq!(money.minor_units().unwrap(), amount);
        }

        #[test]
        fn money_addition_is_commutative(
            a in 0i64..1_000_000i64,
            b in 0i64..1_000_000i64
        ) {
            let ma = Money::from_minor(a, Currency::MXN);
            let mb = Money::from_minor(b, Currency::MXN);

            prop_assert_eq!(ma + mb, mb + ma);
        }
    }
}
