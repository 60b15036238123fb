//! Collaborator ports for the booking domain
//!
//! The ledger reaches every external system through these traits.
//! Adapters live in the infra crates (`infra_db`, `infra_providers`);
//! in-memory implementations for tests live in `test_utils`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{BookingId, DomainPort, Money, PortError};

use crate::booking::{Booking, BookingStatus, PaymentReference};
use crate::confirmation::ConfirmationCode;
use crate::events::NotificationRequest;

/// Record store for bookings
///
/// `transition_status` is the contract the whole reconciliation design
/// rests on: the store must apply "set status to `to` where the current
/// status is `from`" as one atomic conditional update and report whether
/// a row actually changed. A plain read-then-write implementation breaks
/// exactly-once reconciliation under concurrent webhook deliveries.
#[async_trait]
pub trait BookingStore: DomainPort {
    /// Persists a new booking
    ///
    /// A duplicate confirmation code must surface as
    /// `PortError::Conflict` so the caller can retry with a fresh code.
    async fn insert(&self, booking: &Booking) -> Result<(), PortError>;

    async fn find_by_id(&self, id: BookingId) -> Result<Option<Booking>, PortError>;

    async fn find_by_code(&self, code: &ConfirmationCode) -> Result<Option<Booking>, PortError>;

    async fn find_by_payment_reference(
        &self,
        reference: &PaymentReference,
    ) -> Result<Option<Booking>, PortError>;

    /// Records the provider-issued reference on a booking
    async fn set_payment_reference(
        &self,
        id: BookingId,
        reference: &PaymentReference,
    ) -> Result<(), PortError>;

    /// Atomic conditional status update (compare-and-swap)
    ///
    /// Returns the updated record if the booking was in `from`, or
    /// `None` if the condition did not hold (idempotent-skip detection).
    async fn transition_status(
        &self,
        id: BookingId,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<Option<Booking>, PortError>;

    /// Bulk-expires pending bookings created before the cutoff
    ///
    /// Returns the number of bookings moved to `Expired`.
    async fn expire_pending_before(&self, cutoff: DateTime<Utc>) -> Result<u64, PortError>;
}

/// Metadata attached to a payment session at creation time
///
/// This is the only channel the later asynchronous webhook event has to
/// find the booking again; the provider carries no foreign key of ours
/// by default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub booking_id: BookingId,
    pub confirmation_code: ConfirmationCode,
}

/// Request to open a payment session with the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRequest {
    /// The trusted server-computed total
    pub amount: Money,
    pub metadata: SessionMetadata,
    /// Shown on the provider's checkout page
    pub description: String,
}

/// A payment session opened with the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSession {
    /// Provider-issued identifier, stored on the booking
    pub reference: PaymentReference,
    /// Where to send the customer to complete payment
    pub redirect_url: String,
}

/// Payment provider port
#[async_trait]
pub trait PaymentGateway: DomainPort {
    /// Opens a checkout session for the given amount
    ///
    /// Implementations must bound the call with a timeout and surface a
    /// typed `PortError` rather than hang; the core never retries.
    async fn create_session(&self, request: &SessionRequest) -> Result<PaymentSession, PortError>;
}

/// Email provider port
///
/// Fire-and-forget from the core's perspective: failures are logged by
/// the reconciliation driver, never escalated into the payment flow.
#[async_trait]
pub trait NotificationSender: DomainPort {
    async fn send(&self, request: &NotificationRequest) -> Result<(), PortError>;
}
