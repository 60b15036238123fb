//! Payment events and declarative notification requests
//!
//! A `PaymentEvent` is the already-verified form of a provider webhook
//! delivery: signature checking happens at the adapter boundary and is a
//! precondition here. A `NotificationRequest` is the ledger's declarative
//! output for an email send; performing the send is the driver's job, so
//! a provider outage can never corrupt payment-state correctness.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use core_kernel::{BookingId, NotificationId};

use crate::booking::PaymentReference;
use crate::confirmation::ConfirmationCode;

/// Kinds of payment-provider events the ledger consumes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentEventKind {
    /// Payment completed
    Succeeded,
    /// Payment failed
    Failed,
    /// The checkout session expired without payment
    SessionExpired,
    /// Anything else the provider sends; always a no-op
    Other(String),
}

/// Provider metadata echoed back on webhook events
///
/// When the session was created it was tagged with the booking id and
/// confirmation code. This metadata is the only channel an asynchronous
/// event has to find its booking when the payment reference alone does
/// not resolve.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventMetadata {
    pub booking_id: Option<BookingId>,
    pub confirmation_code: Option<ConfirmationCode>,
}

/// A verified asynchronous payment-provider notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentEvent {
    /// Provider-side event identifier, kept for log replay
    pub id: String,
    pub kind: PaymentEventKind,
    /// The session/intent the event refers to
    pub reference: Option<PaymentReference>,
    pub metadata: EventMetadata,
}

/// Who a notification is addressed to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recipient {
    /// The booking's contact email
    Customer { email: String },
    /// The operations inbox, resolved by the mailer's configuration
    Staff,
}

/// Which template the mailer should render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationTemplate {
    BookingConfirmed,
    PaymentFailed,
    StaffBookingPaid,
    StaffPaymentFailed,
}

/// A declarative request to send one templated email
///
/// Emitted by reconciliation instead of calling the email provider
/// inline, so sends can be retried or dropped without touching the
/// booking record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub id: NotificationId,
    pub recipient: Recipient,
    pub template: NotificationTemplate,
    /// Template substitution data
    pub data: Value,
}

impl NotificationRequest {
    pub fn new(recipient: Recipient, template: NotificationTemplate, data: Value) -> Self {
        Self {
            id: NotificationId::new_v7(),
            recipient,
            template,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_kind_serialization() {
        let kind = PaymentEventKind::SessionExpired;
        let json = serde_json::to_string(&kind).unwrap();
        assert_eq!(json, "\"session_expired\"");
    }

    #[test]
    fn test_other_kind_preserves_raw_type() {
        let kind = PaymentEventKind::Other("charge.refunded".to_string());
        let round: PaymentEventKind =
            serde_json::from_str(&serde_json::to_string(&kind).unwrap()).unwrap();
        assert_eq!(round, kind);
    }

    #[test]
    fn test_notification_request_carries_template_data() {
        let request = NotificationRequest::new(
            Recipient::Customer {
                email: "ana@example.com".to_string(),
            },
            NotificationTemplate::BookingConfirmed,
            json!({"confirmation_code": "VUE-20260912-ABCDEF"}),
        );

        assert_eq!(request.template, NotificationTemplate::BookingConfirmed);
        assert_eq!(
            request.data["confirmation_code"],
            "VUE-20260912-ABCDEF"
        );
    }
}
