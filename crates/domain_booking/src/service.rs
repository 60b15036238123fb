//! The booking ledger
//!
//! `BookingService` owns the Booking lifecycle: it creates pending
//! bookings (pricing, code derivation, payment-session creation),
//! reconciles verified payment events against them exactly once, applies
//! the staff check-in action, and expires stale pending records.
//!
//! # Exactly-once reconciliation
//!
//! The provider delivers webhook events at-least-once, so two deliveries
//! of the same success event can race. Reconciliation therefore never
//! does a separate read-then-write: the decisive step is the store's
//! atomic conditional update (`transition_status`), and a lost race is
//! re-classified from the record's current state instead of failing.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};
use validator::Validate;

use core_kernel::{BookingId, Money};

use crate::booking::{Booking, BookingStatus, ContactDetails, PassengerCounts};
use crate::confirmation::{CodeGenerator, ConfirmationCode};
use crate::error::BookingError;
use crate::events::{
    NotificationRequest, NotificationTemplate, PaymentEvent, Recipient,
};
use crate::ports::{BookingStore, PaymentGateway, PaymentSession, SessionMetadata, SessionRequest};
use crate::pricing::PricingEngine;

/// Attempts to allocate a unique confirmation code before giving up
const MAX_CODE_ATTEMPTS: u8 = 5;

/// Validated input for booking creation
///
/// Carries no monetary amounts: the total is always recomputed from the
/// server-side price table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBooking {
    pub passengers: PassengerCounts,
    pub addons: Vec<String>,
    pub flight_date: chrono::NaiveDate,
    pub contact: ContactDetails,
}

/// Result of booking creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedBooking {
    pub booking: Booking,
    pub session: PaymentSession,
}

/// How a payment event was applied to the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileOutcome {
    /// The booking transitioned to the given status
    Applied(BookingStatus),
    /// The event was recognized as already applied; nothing changed
    AlreadyProcessed,
    /// No booking matches the event; acknowledged and logged
    NotFound,
    /// Unrecognized event kind; acknowledged and skipped
    Ignored,
    /// The event targets a booking in an unrelated terminal state;
    /// logged for manual replay, nothing changed
    Anomalous(BookingStatus),
}

impl ReconcileOutcome {
    /// Short label for logs and webhook acknowledgements
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconcileOutcome::Applied(_) => "applied",
            ReconcileOutcome::AlreadyProcessed => "already_processed",
            ReconcileOutcome::NotFound => "not_found",
            ReconcileOutcome::Ignored => "ignored",
            ReconcileOutcome::Anomalous(_) => "anomalous",
        }
    }
}

/// Outcome of one reconciliation attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub outcome: ReconcileOutcome,
    /// Declarative side effects; empty unless the event was applied
    pub notifications: Vec<NotificationRequest>,
}

impl Reconciliation {
    fn of(outcome: ReconcileOutcome) -> Self {
        Self {
            outcome,
            notifications: Vec::new(),
        }
    }
}

/// A lookup key accepted by the status endpoint
#[derive(Debug, Clone, PartialEq)]
pub enum BookingLookup {
    Id(BookingId),
    Code(ConfirmationCode),
}

impl BookingLookup {
    /// Parses a path segment as a booking id or a confirmation code
    pub fn parse(raw: &str) -> Result<Self, BookingError> {
        if let Ok(id) = BookingId::from_str(raw) {
            return Ok(BookingLookup::Id(id));
        }
        if let Ok(code) = ConfirmationCode::from_str(raw) {
            return Ok(BookingLookup::Code(code));
        }
        Err(BookingError::validation(format!(
            "'{raw}' is neither a booking id nor a confirmation code"
        )))
    }
}

/// The booking ledger service
pub struct BookingService {
    store: Arc<dyn BookingStore>,
    payments: Arc<dyn PaymentGateway>,
    pricing: PricingEngine,
    codes: CodeGenerator,
    expiry_window: Duration,
}

impl BookingService {
    pub fn new(
        store: Arc<dyn BookingStore>,
        payments: Arc<dyn PaymentGateway>,
        pricing: PricingEngine,
        codes: CodeGenerator,
        expiry_window: Duration,
    ) -> Self {
        Self {
            store,
            payments,
            pricing,
            codes,
            expiry_window,
        }
    }

    /// Creates a pending booking and opens its payment session
    ///
    /// The session is tagged with the booking id and confirmation code
    /// as provider-side metadata so the later webhook event can find the
    /// booking again. If session creation fails the pending record is
    /// marked `Failed`, never left dangling with a reference that does
    /// not exist.
    pub async fn create_pending(&self, input: NewBooking) -> Result<CreatedBooking, BookingError> {
        input
            .contact
            .validate()
            .map_err(|e| BookingError::Validation(e.to_string()))?;

        let total = self.pricing.compute_total(&input.passengers, &input.addons)?;
        let mut booking = self.insert_with_fresh_code(&input, total).await?;

        let request = SessionRequest {
            amount: total,
            metadata: SessionMetadata {
                booking_id: booking.id,
                confirmation_code: booking.confirmation_code.clone(),
            },
            description: format!(
                "Balloon flight {} ({} passengers)",
                booking.flight_date,
                booking.passengers.total()
            ),
        };

        let session = match self.payments.create_session(&request).await {
            Ok(session) => session,
            Err(cause) => {
                warn!(
                    booking_id = %booking.id,
                    code = %booking.confirmation_code,
                    error = %cause,
                    "payment session creation failed, marking booking failed"
                );
                if let Err(mark) = self
                    .store
                    .transition_status(booking.id, BookingStatus::Pending, BookingStatus::Failed)
                    .await
                {
                    warn!(
                        booking_id = %booking.id,
                        error = %mark,
                        "could not mark booking failed after provider error"
                    );
                }
                return Err(BookingError::PaymentProvider(cause.to_string()));
            }
        };

        self.store
            .set_payment_reference(booking.id, &session.reference)
            .await
            .map_err(BookingError::Persistence)?;
        booking.payment_reference = Some(session.reference.clone());

        info!(
            booking_id = %booking.id,
            code = %booking.confirmation_code,
            reference = %session.reference,
            total = %booking.total,
            "booking created pending payment"
        );

        Ok(CreatedBooking { booking, session })
    }

    /// Applies a verified payment event to the ledger exactly once
    pub async fn reconcile(&self, event: &PaymentEvent) -> Result<Reconciliation, BookingError> {
        let Some(target) = BookingStatus::target_for(&event.kind) else {
            debug!(event_id = %event.id, kind = ?event.kind, "ignoring unrecognized payment event");
            return Ok(Reconciliation::of(ReconcileOutcome::Ignored));
        };

        let Some(booking) = self.locate(event).await? else {
            warn!(
                event_id = %event.id,
                reference = ?event.reference,
                "payment event matched no booking"
            );
            return Ok(Reconciliation::of(ReconcileOutcome::NotFound));
        };

        if booking.status == target {
            debug!(
                booking_id = %booking.id,
                event_id = %event.id,
                status = %booking.status,
                "duplicate payment event, already processed"
            );
            return Ok(Reconciliation::of(ReconcileOutcome::AlreadyProcessed));
        }

        if booking.status != BookingStatus::Pending {
            warn!(
                booking_id = %booking.id,
                event_id = %event.id,
                status = %booking.status,
                target = %target,
                "payment event targets a booking in an unrelated terminal state"
            );
            return Ok(Reconciliation::of(ReconcileOutcome::Anomalous(booking.status)));
        }

        match self
            .store
            .transition_status(booking.id, BookingStatus::Pending, target)
            .await
            .map_err(BookingError::Persistence)?
        {
            Some(updated) => {
                info!(
                    booking_id = %updated.id,
                    event_id = %event.id,
                    status = %updated.status,
                    "payment event applied"
                );
                Ok(Reconciliation {
                    outcome: ReconcileOutcome::Applied(target),
                    notifications: Self::notifications_for(&updated),
                })
            }
            // Another delivery won the conditional update; classify from
            // the record's current state.
            None => {
                let current = self
                    .store
                    .find_by_id(booking.id)
                    .await
                    .map_err(BookingError::Persistence)?;
                match current {
                    Some(b) if b.status == target => {
                        Ok(Reconciliation::of(ReconcileOutcome::AlreadyProcessed))
                    }
                    Some(b) => {
                        warn!(
                            booking_id = %b.id,
                            event_id = %event.id,
                            status = %b.status,
                            "lost reconciliation race to a conflicting transition"
                        );
                        Ok(Reconciliation::of(ReconcileOutcome::Anomalous(b.status)))
                    }
                    None => Ok(Reconciliation::of(ReconcileOutcome::NotFound)),
                }
            }
        }
    }

    /// Staff check-in: Paid -> CheckedIn
    ///
    /// Checking in an already checked-in booking is idempotent and
    /// returns the current record.
    pub async fn check_in(&self, code: &ConfirmationCode) -> Result<Booking, BookingError> {
        let booking = self
            .store
            .find_by_code(code)
            .await
            .map_err(BookingError::Persistence)?
            .ok_or_else(|| BookingError::not_found(code.as_str()))?;

        match booking.status {
            BookingStatus::CheckedIn => Ok(booking),
            BookingStatus::Paid => {
                let updated = self
                    .store
                    .transition_status(booking.id, BookingStatus::Paid, BookingStatus::CheckedIn)
                    .await
                    .map_err(BookingError::Persistence)?;
                match updated {
                    Some(b) => {
                        info!(booking_id = %b.id, code = %code, "passenger checked in");
                        Ok(b)
                    }
                    None => {
                        // Raced with another scan; idempotent if it won.
                        let current = self
                            .store
                            .find_by_id(booking.id)
                            .await
                            .map_err(BookingError::Persistence)?
                            .ok_or_else(|| BookingError::not_found(code.as_str()))?;
                        if current.status == BookingStatus::CheckedIn {
                            Ok(current)
                        } else {
                            Err(BookingError::InvalidState {
                                code: code.as_str().to_string(),
                                status: current.status,
                                action: "check in",
                            })
                        }
                    }
                }
            }
            status => Err(BookingError::InvalidState {
                code: code.as_str().to_string(),
                status,
                action: "check in",
            }),
        }
    }

    /// Expires pending bookings older than the configured window
    ///
    /// Policy sweep, not provider-enforced: a session the customer
    /// abandoned may never produce an event at all.
    pub async fn expire_stale(&self, now: DateTime<Utc>) -> Result<u64, BookingError> {
        let cutoff = now - self.expiry_window;
        let expired = self
            .store
            .expire_pending_before(cutoff)
            .await
            .map_err(BookingError::Persistence)?;
        if expired > 0 {
            info!(expired, %cutoff, "expired stale pending bookings");
        }
        Ok(expired)
    }

    /// Looks up a booking for status display
    pub async fn find(&self, lookup: &BookingLookup) -> Result<Booking, BookingError> {
        let found = match lookup {
            BookingLookup::Id(id) => self
                .store
                .find_by_id(*id)
                .await
                .map_err(BookingError::Persistence)?,
            BookingLookup::Code(code) => self
                .store
                .find_by_code(code)
                .await
                .map_err(BookingError::Persistence)?,
        };
        found.ok_or_else(|| match lookup {
            BookingLookup::Id(id) => BookingError::not_found(id.to_string()),
            BookingLookup::Code(code) => BookingError::not_found(code.as_str()),
        })
    }

    /// Inserts a pending booking, retrying code collisions
    async fn insert_with_fresh_code(
        &self,
        input: &NewBooking,
        total: Money,
    ) -> Result<Booking, BookingError> {
        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = self
                .codes
                .generate(input.flight_date, &mut rand::thread_rng());
            let booking = Booking::new_pending(
                code,
                input.passengers,
                input.addons.clone(),
                input.flight_date,
                input.contact.clone(),
                total,
            );

            match self.store.insert(&booking).await {
                Ok(()) => return Ok(booking),
                Err(e) if e.is_conflict() => {
                    debug!(attempt, "confirmation code collision, regenerating");
                    continue;
                }
                Err(e) => return Err(BookingError::Persistence(e)),
            }
        }
        Err(BookingError::CodeAllocation {
            attempts: MAX_CODE_ATTEMPTS,
        })
    }

    /// Finds the booking a payment event refers to
    ///
    /// Prefers the payment reference; falls back to the metadata the
    /// session was tagged with at creation.
    async fn locate(&self, event: &PaymentEvent) -> Result<Option<Booking>, BookingError> {
        if let Some(reference) = &event.reference {
            if let Some(booking) = self
                .store
                .find_by_payment_reference(reference)
                .await
                .map_err(BookingError::Persistence)?
            {
                return Ok(Some(booking));
            }
        }
        if let Some(id) = event.metadata.booking_id {
            if let Some(booking) = self
                .store
                .find_by_id(id)
                .await
                .map_err(BookingError::Persistence)?
            {
                return Ok(Some(booking));
            }
        }
        if let Some(code) = &event.metadata.confirmation_code {
            if let Some(booking) = self
                .store
                .find_by_code(code)
                .await
                .map_err(BookingError::Persistence)?
            {
                return Ok(Some(booking));
            }
        }
        Ok(None)
    }

    /// Builds the customer and staff notifications for an applied event
    fn notifications_for(booking: &Booking) -> Vec<NotificationRequest> {
        let (customer_template, staff_template) = match booking.status {
            BookingStatus::Paid => (
                NotificationTemplate::BookingConfirmed,
                NotificationTemplate::StaffBookingPaid,
            ),
            BookingStatus::Failed => (
                NotificationTemplate::PaymentFailed,
                NotificationTemplate::StaffPaymentFailed,
            ),
            _ => return Vec::new(),
        };

        let data = json!({
            "confirmation_code": booking.confirmation_code.as_str(),
            "contact_name": booking.contact.name,
            "flight_date": booking.flight_date.to_string(),
            "adults": booking.passengers.adults,
            "children": booking.passengers.children,
            "total": booking.total.to_string(),
        });

        let staff_data = json!({
            "booking_id": booking.id.to_string(),
            "confirmation_code": booking.confirmation_code.as_str(),
            "flight_date": booking.flight_date.to_string(),
            "passengers": booking.passengers.total(),
            "total": booking.total.to_string(),
        });

        vec![
            NotificationRequest::new(
                Recipient::Customer {
                    email: booking.contact.email.clone(),
                },
                customer_template,
                data,
            ),
            NotificationRequest::new(Recipient::Staff, staff_template, staff_data),
        ]
    }
}
