//! Booking domain errors

use thiserror::Error;

use core_kernel::PortError;

use crate::booking::BookingStatus;
use crate::pricing::PricingError;

/// Errors that can occur in the booking domain
#[derive(Debug, Error)]
pub enum BookingError {
    /// Bad client input; the message is safe to return verbatim
    #[error("Validation error: {0}")]
    Validation(String),

    /// Pricing rejected the booking input
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// No booking matches the lookup
    #[error("Booking not found: {0}")]
    NotFound(String),

    /// The booking is not in a state that allows the operation
    #[error("Booking {code} cannot {action} while {status}")]
    InvalidState {
        code: String,
        status: BookingStatus,
        action: &'static str,
    },

    /// The payment provider call failed
    #[error("Payment provider error: {0}")]
    PaymentProvider(String),

    /// The persistence collaborator failed
    #[error("Persistence error: {0}")]
    Persistence(#[source] PortError),

    /// Code generation kept colliding against the unique index
    #[error("Could not allocate a unique confirmation code after {attempts} attempts")]
    CodeAllocation { attempts: u8 },
}

impl BookingError {
    pub fn validation(message: impl Into<String>) -> Self {
        BookingError::Validation(message.into())
    }

    pub fn not_found(lookup: impl Into<String>) -> Self {
        BookingError::NotFound(lookup.into())
    }
}
