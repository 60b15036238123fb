//! Booking Domain
//!
//! This crate holds the business core of the balloon-flight booking
//! system:
//!
//! - **Pricing**: a trusted monetary total computed server-side from
//!   passenger counts and the configured add-on price table. Client
//!   totals are never accepted.
//! - **Confirmation codes**: short human-legible identifiers handed to
//!   the customer, independent of internal database identifiers.
//! - **The ledger**: the Booking lifecycle (pending, paid, checked-in,
//!   failed, expired) and the reconciliation procedure that applies an
//!   asynchronous payment-provider notification exactly once.
//!
//! External collaborators (datastore, payment provider, email provider)
//! are reached only through the port traits in [`ports`].

pub mod booking;
pub mod confirmation;
pub mod driver;
pub mod error;
pub mod events;
pub mod ports;
pub mod pricing;
pub mod service;

pub use booking::{Booking, BookingStatus, ContactDetails, PassengerCounts, PaymentReference};
pub use confirmation::{CodeGenerator, ConfirmationCode};
pub use driver::ReconciliationDriver;
pub use error::BookingError;
pub use events::{
    EventMetadata, NotificationRequest, NotificationTemplate, PaymentEvent, PaymentEventKind,
    Recipient,
};
pub use ports::{
    BookingStore, NotificationSender, PaymentGateway, PaymentSession, SessionMetadata,
    SessionRequest,
};
pub use pricing::{AddonPrice, PriceTable, PricingEngine, PricingError, PricingMode};
pub use service::{
    BookingLookup, BookingService, CreatedBooking, NewBooking, ReconcileOutcome, Reconciliation,
};
