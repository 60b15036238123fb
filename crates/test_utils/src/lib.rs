//! Shared test utilities for the booking system test suite
//!
//! - [`memory`]: in-memory implementations of the domain ports with the
//!   same compare-and-swap semantics the SQL adapter provides, so
//!   reconciliation races are testable in-process.
//! - [`builders`]: builder-pattern constructors for test data.
//! - [`fixtures`]: the standard price table, dates, and a fully wired
//!   service harness.
//! - [`generators`]: fake-data generators for contact details.

pub mod builders;
pub mod fixtures;
pub mod generators;
pub mod memory;

pub use builders::{NewBookingBuilder, PaymentEventBuilder, TestBookingBuilder};
pub use fixtures::{flight_date, standard_price_table, Harness};
pub use memory::{InMemoryBookingStore, RecordingGateway, RecordingMailer};
