//! Booking DTOs
//!
//! The creation request is a strict schema: unknown fields are rejected
//! at deserialization, so a client-supplied `total` or `price` never
//! even reaches the handler. Amounts appear in responses only as
//! server-computed values.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_booking::{
    Booking, BookingStatus, ContactDetails, CreatedBooking, NewBooking, PassengerCounts,
};

use crate::error::ApiError;

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ContactRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(email(message = "email is not a valid address"))]
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateBookingRequest {
    pub adults: u32,
    pub children: u32,
    #[serde(default)]
    pub addons: Vec<String>,
    pub flight_date: NaiveDate,
    #[validate(nested)]
    pub contact: ContactRequest,
}

impl CreateBookingRequest {
    pub fn into_new_booking(self) -> NewBooking {
        NewBooking {
            passengers: PassengerCounts::new(self.adults, self.children),
            addons: self.addons,
            flight_date: self.flight_date,
            contact: ContactDetails {
                name: self.contact.name,
                email: self.contact.email,
                phone: self.contact.phone,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub booking_id: Uuid,
    pub confirmation_code: String,
    pub status: BookingStatus,
    pub flight_date: NaiveDate,
    pub adults: u32,
    pub children: u32,
    pub addons: Vec<String>,
    pub total_minor_units: i64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

impl BookingResponse {
    pub fn from_domain(booking: &Booking) -> Result<Self, ApiError> {
        let total_minor_units = booking
            .total
            .minor_units()
            .map_err(|e| ApiError::Internal(format!("total conversion: {e}")))?;

        Ok(Self {
            booking_id: *booking.id.as_uuid(),
            confirmation_code: booking.confirmation_code.as_str().to_string(),
            status: booking.status,
            flight_date: booking.flight_date,
            adults: booking.passengers.adults,
            children: booking.passengers.children,
            addons: booking.addons.clone(),
            total_minor_units,
            currency: booking.total.currency().code().to_string(),
            created_at: booking.created_at,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentSessionResponse {
    pub reference: String,
    pub redirect_url: String,
}

#[derive(Debug, Serialize)]
pub struct CreateBookingResponse {
    pub booking: BookingResponse,
    pub payment: PaymentSessionResponse,
}

impl CreateBookingResponse {
    pub fn from_domain(created: &CreatedBooking) -> Result<Self, ApiError> {
        Ok(Self {
            booking: BookingResponse::from_domain(&created.booking)?,
            payment: PaymentSessionResponse {
                reference: created.session.reference.as_str().to_string(),
                redirect_url: created.session.redirect_url.clone(),
            },
        })
    }
}

/// Webhook acknowledgement body
///
/// Always `received: true` once the event was verified; the outcome is
/// echoed for the provider's dashboard logs.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
    pub outcome: &'static str,
}
