//! Standard fixtures and a wired service harness

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use rust_decimal_macros::dec;

use core_kernel::{Currency, Money};
use domain_booking::{
    BookingService, CodeGenerator, PriceTable, PricingEngine, PricingMode, ReconciliationDriver,
};

use crate::memory::{InMemoryBookingStore, RecordingGateway, RecordingMailer};

/// The flight date used across the test suite
pub fn flight_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 9, 12).unwrap()
}

/// The standard MXN price table: adult 2500, child 2200,
/// flat photo package 1200, per-passenger breakfast 600
pub fn standard_price_table() -> PriceTable {
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

/// A fully wired ledger over in-memory ports
pub struct Harness {
    pub service: Arc<BookingService>,
    pub driver: Arc<ReconciliationDriver>,
    pub store: Arc<InMemoryBookingStore>,
    pub gateway: Arc<RecordingGateway>,
    pub mailer: Arc<RecordingMailer>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_ports(
            Arc::new(InMemoryBookingStore::new()),
            Arc::new(RecordingGateway::new()),
            Arc::new(RecordingMailer::new()),
        )
    }

    /// Wires the harness from explicit port doubles
    pub fn with_ports(
        store: Arc<InMemoryBookingStore>,
        gateway: Arc<RecordingGateway>,
        mailer: Arc<RecordingMailer>,
    ) -> Self {
        let service = Arc::new(BookingService::new(
            store.clone(),
            gateway.clone(),
            PricingEngine::new(standard_price_table()),
            CodeGenerator::new("VUE"),
            Duration::hours(48),
        ));
        let driver = Arc::new(ReconciliationDriver::new(service.clone(), mailer.clone()));
        Self {
            service,
            driver,
            store,
            gateway,
            mailer,
        }
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
