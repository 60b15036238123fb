//! Test data builders
//!
//! Builder patterns for constructing test data with sensible defaults,
//! so tests specify only the fields they care about.

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use core_kernel::{BookingId, Currency, Money};
use domain_booking::{
    Booking, BookingStatus, ConfirmationCode, ContactDetails, EventMetadata, NewBooking,
    PassengerCounts, PaymentEvent, PaymentEventKind, PaymentReference,
};

use crate::fixtures::flight_date;

/// Builder for booking-creation input
pub struct NewBookingBuilder {
    passengers: PassengerCounts,
    addons: Vec<String>,
    flight_date: NaiveDate,
    contact: ContactDetails,
}

impl Default for NewBookingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NewBookingBuilder {
    pub fn new() -> Self {
        Self {
            passengers: PassengerCounts::new(2, 1),
            addons: Vec::new(),
            flight_date: flight_date(),
            contact: ContactDetails {
                name: "Ana Torres".to_string(),
                email: "ana.torres@example.com".to_string(),
                phone: Some("+52 55 1234 5678".to_string()),
            },
        }
    }

    pub fn with_passengers(mut self, adults: u32, children: u32) -> Self {
        self.passengers = PassengerCounts::new(adults, children);
        self
    }

    pub fn with_addon(mut self, name: impl Into<String>) -> Self {
        self.addons.push(name.into());
        self
    }

    pub fn with_flight_date(mut self, date: NaiveDate) -> Self {
        self.flight_date = date;
        self
    }

    pub fn with_contact(mut self, contact: ContactDetails) -> Self {
        self.contact = contact;
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.contact.email = email.into();
        self
    }

    pub fn build(self) -> NewBooking {
        NewBooking {
            passengers: self.passengers,
            addons: self.addons,
            flight_date: self.flight_date,
            contact: self.contact,
        }
    }
}

/// Builder for a persisted booking in an arbitrary lifecycle state
pub struct TestBookingBuilder {
    code: ConfirmationCode,
    status: BookingStatus,
    payment_reference: Option<PaymentReference>,
    passengers: PassengerCounts,
    total: Money,
    flight_date: NaiveDate,
}

impl Default for TestBookingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestBookingBuilder {
    pub fn new() -> Self {
        Self {
            code: "VUE-20260912-ABCDEF".parse().unwrap(),
            status: BookingStatus::Pending,
            payment_reference: None,
            passengers: PassengerCounts::new(2, 1),
            total: Money::new(dec!(10200), Currency::MXN),
            flight_date: flight_date(),
        }
    }

    pub fn with_code(mut self, code: &str) -> Self {
        self.code = code.parse().expect("test code must be well-formed");
        self
    }

    pub fn with_status(mut self, status: BookingStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_payment_reference(mut self, reference: impl Into<String>) -> Self {
        self.payment_reference = Some(PaymentReference::new(reference));
        self
    }

    pub fn with_passengers(mut self, adults: u32, children: u32) -> Self {
        self.passengers = PassengerCounts::new(adults, children);
        self
    }

    pub fn with_total(mut self, total: Money) -> Self {
        self.total = total;
        self
    }

    pub fn build(self) -> Booking {
        let mut booking = Booking::new_pending(
            self.code,
            self.passengers,
            Vec::new(),
            self.flight_date,
            ContactDetails {
                name: "Ana Torres".to_string(),
                email: "ana.torres@example.com".to_string(),
                phone: None,
            },
            self.total,
        );
        booking.status = self.status;
        booking.payment_reference = self.payment_reference;
        booking
    }
}

/// Builder for verified payment events
pub struct PaymentEventBuilder {
    id: String,
    kind: PaymentEventKind,
    reference: Option<PaymentReference>,
    metadata: EventMetadata,
}

impl PaymentEventBuilder {
    pub fn succeeded() -> Self {
        Self {
            id: "evt_test_0001".to_string(),
            kind: PaymentEventKind::Succeeded,
            reference: None,
            metadata: EventMetadata::default(),
        }
    }

    pub fn failed() -> Self {
        Self {
            kind: PaymentEventKind::Failed,
            ..Self::succeeded()
        }
    }

    pub fn session_expired() -> Self {
        Self {
            kind: PaymentEventKind::SessionExpired,
            ..Self::succeeded()
        }
    }

    pub fn other(raw_type: impl Into<String>) -> Self {
        Self {
            kind: PaymentEventKind::Other(raw_type.into()),
            ..Self::succeeded()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(PaymentReference::new(reference));
        self
    }

    pub fn with_booking_id(mut self, id: BookingId) -> Self {
        self.metadata.booking_id = Some(id);
        self
    }

    pub fn with_confirmation_code(mut self, code: &str) -> Self {
        self.metadata.confirmation_code = Some(code.parse().expect("test code must be well-formed"));
        self
    }

    pub fn build(self) -> PaymentEvent {
        PaymentEvent {
            id: self.id,
            kind: self.kind,
            reference: self.reference,
            metadata: self.metadata,
        }
    }
}
