//! The Booking record and its lifecycle state machine
//!
//! A Booking is the unit of business state: one customer's reservation
//! and its payment lifecycle. The record is exclusively owned by the
//! ledger; the payment provider owns only the session it issued, and the
//! ledger status converges to the provider's via reconciliation.
//!
//! # State machine
//!
//! ```text
//! Pending --payment success--> Paid --staff check-in--> CheckedIn
//! Pending --payment failure--> Failed
//! Pending --expiry sweep-----> Expired
//! ```
//!
//! Transitions are total over (state, event): unrecognized combinations
//! yield no transition, never a panic.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use core_kernel::{BookingId, Money};

use crate::confirmation::ConfirmationCode;
use crate::events::PaymentEventKind;

/// Passenger counts for one flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassengerCounts {
    pub adults: u32,
    pub children: u32,
}

impl PassengerCounts {
    pub fn new(adults: u32, children: u32) -> Self {
        Self { adults, children }
    }

    /// Total number of seats in the basket
    pub fn total(&self) -> u32 {
        self.adults + self.children
    }
}

/// Customer contact details
///
/// The email address is required: confirmation and payment-outcome
/// notifications are delivered to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ContactDetails {
    #[validate(length(min = 1, message = "contact name must not be empty"))]
    pub name: String,
    #[validate(email(message = "contact email is not a valid address"))]
    pub email: String,
    pub phone: Option<String>,
}

/// Opaque identifier issued by the payment provider for a session
///
/// Used to correlate the provider's asynchronous events back to a
/// Booking. Set once after session creation, immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentReference(String);

impl PaymentReference {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaymentReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for PaymentReference {
    fn from(reference: String) -> Self {
        Self(reference)
    }
}

/// Booking lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Created, awaiting a payment outcome
    Pending,
    /// Payment confirmed by the provider
    Paid,
    /// Passenger verified at the launch field
    CheckedIn,
    /// Payment failed
    Failed,
    /// No payment event arrived within the configured window
    Expired,
}

impl BookingStatus {
    /// Returns the storage representation of this status
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Paid => "paid",
            BookingStatus::CheckedIn => "checked_in",
            BookingStatus::Failed => "failed",
            BookingStatus::Expired => "expired",
        }
    }

    /// Parses a storage representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "paid" => Some(BookingStatus::Paid),
            "checked_in" => Some(BookingStatus::CheckedIn),
            "failed" => Some(BookingStatus::Failed),
            "expired" => Some(BookingStatus::Expired),
            _ => None,
        }
    }

    /// Returns true if no further payment event can change this status
    pub fn is_terminal(&self) -> bool {
        !matches!(self, BookingStatus::Pending)
    }

    /// The status a payment event drives a *pending* booking to
    ///
    /// Total over every event kind: unrecognized events map to `None`
    /// and are ignored by reconciliation.
    pub fn target_for(kind: &PaymentEventKind) -> Option<BookingStatus> {
        match kind {
            PaymentEventKind::Succeeded => Some(BookingStatus::Paid),
            PaymentEventKind::Failed => Some(BookingStatus::Failed),
            PaymentEventKind::SessionExpired => Some(BookingStatus::Expired),
            PaymentEventKind::Other(_) => None,
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One customer's reservation and its payment lifecycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    /// Unique identifier, generated at creation, immutable
    pub id: BookingId,
    /// Human-legible code handed to the customer, unique, immutable
    pub confirmation_code: ConfirmationCode,
    /// Passenger counts (adults + children >= 1)
    pub passengers: PassengerCounts,
    /// Selected add-on names, order preserved
    pub addons: Vec<String>,
    /// Calendar date of the flight
    pub flight_date: NaiveDate,
    /// Customer contact details
    pub contact: ContactDetails,
    /// Trusted total, computed server-side only
    pub total: Money,
    /// Provider-issued session identifier, set after session creation
    pub payment_reference: Option<PaymentReference>,
    /// Current lifecycle state
    pub status: BookingStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Creates a new pending booking
    ///
    /// The total must already have been computed by the pricing engine;
    /// this constructor never derives money from client input.
    pub fn new_pending(
        confirmation_code: ConfirmationCode,
        passengers: PassengerCounts,
        addons: Vec<String>,
        flight_date: NaiveDate,
        contact: ContactDetails,
        total: Money,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: BookingId::new_v7(),
            confirmation_code,
            passengers,
            addons,
            flight_date,
            contact,
            total,
            payment_reference: None,
            status: BookingStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true if the booking is awaiting a payment outcome
    pub fn is_pending(&self) -> bool {
        self.status == BookingStatus::Pending
    }
}
