//! In-memory port implementations
//!
//! The store mirrors the Postgres adapter's contract exactly: unique
//! confirmation codes surface as `Conflict`, and `transition_status` is
//! a compare-and-swap performed under one lock, so two tasks racing the
//! same transition see exactly one winner.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use core_kernel::{BookingId, DomainPort, PortError};
use domain_booking::{
    Booking, BookingStatus, BookingStore, ConfirmationCode, NotificationRequest,
    NotificationSender, PaymentGateway, PaymentReference, PaymentSession, SessionRequest,
};

/// Mutex-guarded booking store with CAS transition semantics
#[derive(Default)]
pub struct InMemoryBookingStore {
    records: Mutex<HashMap<BookingId, Booking>>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a booking directly, bypassing the service (test setup)
    pub fn seed(&self, booking: Booking) {
        self.records.lock().unwrap().insert(booking.id, booking);
    }

    /// Number of stored bookings
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    /// Snapshot of every stored booking (test assertions)
    pub fn all(&self) -> Vec<Booking> {
        self.records.lock().unwrap().values().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DomainPort for InMemoryBookingStore {}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn insert(&self, booking: &Booking) -> Result<(), PortError> {
        let mut records = self.records.lock().unwrap();
        if records
            .values()
            .any(|b| b.confirmation_code == booking.confirmation_code)
        {
            return Err(PortError::conflict(format!(
                "confirmation code {} already exists",
                booking.confirmation_code
            )));
        }
        records.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: BookingId) -> Result<Option<Booking>, PortError> {
        Ok(self.records.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_code(&self, code: &ConfirmationCode) -> Result<Option<Booking>, PortError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .values()
            .find(|b| &b.confirmation_code == code)
            .cloned())
    }

    async fn find_by_payment_reference(
        &self,
        reference: &PaymentReference,
    ) -> Result<Option<Booking>, PortError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .values()
            .find(|b| b.payment_reference.as_ref() == Some(reference))
            .cloned())
    }

    async fn set_payment_reference(
        &self,
        id: BookingId,
        reference: &PaymentReference,
    ) -> Result<(), PortError> {
        let mut records = self.records.lock().unwrap();
        let booking = records
            .get_mut(&id)
            .ok_or_else(|| PortError::not_found("Booking", id))?;
        booking.payment_reference = Some(reference.clone());
        booking.updated_at = Utc::now();
        Ok(())
    }

    async fn transition_status(
        &self,
        id: BookingId,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<Option<Booking>, PortError> {
        let mut records = self.records.lock().unwrap();
        match records.get_mut(&id) {
            Some(booking) if booking.status == from => {
                booking.status = to;
                booking.updated_at = Utc::now();
                Ok(Some(booking.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn expire_pending_before(&self, cutoff: DateTime<Utc>) -> Result<u64, PortError> {
        let mut records = self.records.lock().unwrap();
        let mut expired = 0;
        for booking in records.values_mut() {
            if booking.status == BookingStatus::Pending && booking.created_at < cutoff {
                booking.status = BookingStatus::Expired;
                booking.updated_at = Utc::now();
                expired += 1;
            }
        }
        Ok(expired)
    }
}

/// Payment gateway double that records session requests
pub struct RecordingGateway {
    requests: Mutex<Vec<SessionRequest>>,
    counter: AtomicU64,
    fail: bool,
}

impl RecordingGateway {
    /// A gateway whose sessions always succeed
    pub fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            counter: AtomicU64::new(0),
            fail: false,
        }
    }

    /// A gateway whose sessions always fail (provider outage)
    pub fn failing() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            counter: AtomicU64::new(0),
            fail: true,
        }
    }

    /// Session requests received so far
    pub fn requests(&self) -> Vec<SessionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for RecordingGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl DomainPort for RecordingGateway {}

#[async_trait]
impl PaymentGateway for RecordingGateway {
    async fn create_session(&self, request: &SessionRequest) -> Result<PaymentSession, PortError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(PortError::ServiceUnavailable {
                service: "payments".to_string(),
            });
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(PaymentSession {
            reference: PaymentReference::new(format!("cs_test_{n:06}")),
            redirect_url: format!("https://pay.example.com/c/cs_test_{n:06}"),
        })
    }
}

/// Notification sender double that records every request
pub struct RecordingMailer {
    sent: Mutex<Vec<NotificationRequest>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    /// A mailer whose sends always fail (provider outage)
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Notifications attempted so far, in order
    pub fn sent(&self) -> Vec<NotificationRequest> {
        self.sent.lock().unwrap().clone()
    }
}

impl Default for RecordingMailer {
    fn default() -> Self {
        Self::new()
    }
}

impl DomainPort for RecordingMailer {}

#[async_trait]
impl NotificationSender for RecordingMailer {
    async fn send(&self, request: &NotificationRequest) -> Result<(), PortError> {
        self.sent.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(PortError::ServiceUnavailable {
                service: "email".to_string(),
            });
        }
        Ok(())
    }
}
