//! Webhook signature verification and event parsing
//!
//! The provider signs each delivery with HMAC-SHA256 over
//! `"{timestamp}.{payload}"` and sends `t=<unix>,v1=<hex>` in the
//! signature header. Verification happens here, before anything reaches
//! reconciliation: a bad signature is rejected outright, and timestamps
//! older than the tolerance window are refused to blunt replay.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;
use tracing::debug;

use core_kernel::BookingId;
use domain_booking::{EventMetadata, PaymentEvent, PaymentEventKind, PaymentReference};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the event signature
pub const SIGNATURE_HEADER: &str = "x-payment-signature";

/// Maximum accepted age of a signed timestamp
pub const TIMESTAMP_TOLERANCE_SECS: i64 = 300;

/// Errors from webhook verification and parsing
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WebhookError {
    #[error("Malformed signature header")]
    MalformedHeader,

    #[error("Signature does not match payload")]
    InvalidSignature,

    #[error("Signed timestamp outside tolerance ({age_secs}s old)")]
    StaleTimestamp { age_secs: i64 },

    #[error("Malformed event payload: {0}")]
    MalformedPayload(String),
}

#[derive(Debug, Deserialize)]
struct Envelope {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    data: EnvelopeData,
}

#[derive(Debug, Deserialize)]
struct EnvelopeData {
    object: EnvelopeObject,
}

#[derive(Debug, Deserialize)]
struct EnvelopeObject {
    id: Option<String>,
    #[serde(default)]
    metadata: RawMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct RawMetadata {
    booking_id: Option<String>,
    confirmation_code: Option<String>,
}

/// Verifies a signed delivery and parses it into a `PaymentEvent`
///
/// `now` is injected so tolerance checks are testable.
pub fn verify_and_parse(
    payload: &[u8],
    signature_header: &str,
    secret: &str,
    now: DateTime<Utc>,
) -> Result<PaymentEvent, WebhookError> {
    let (timestamp, signature) = parse_header(signature_header)?;

    let age_secs = (now.timestamp() - timestamp).abs();
    if age_secs > TIMESTAMP_TOLERANCE_SECS {
        return Err(WebhookError::StaleTimestamp { age_secs });
    }

    verify_signature(payload, timestamp, &signature, secret)?;
    parse_event(payload)
}

/// Renders a signature header for the given payload
///
/// Used by outbound-simulation tests and local tooling; production
/// headers come from the provider.
pub fn build_signature_header(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(format!("{timestamp}.").as_bytes());
    mac.update(payload);
    format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
}

fn parse_header(header: &str) -> Result<(i64, Vec<u8>), WebhookError> {
    let mut timestamp = None;
    let mut signature = None;

    for part in header.split(',') {
        match part.split_once('=') {
            Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
            Some(("v1", value)) => signature = hex::decode(value).ok(),
            _ => {}
        }
    }

    match (timestamp, signature) {
        (Some(t), Some(s)) => Ok((t, s)),
        _ => Err(WebhookError::MalformedHeader),
    }
}

fn verify_signature(
    payload: &[u8],
    timestamp: i64,
    signature: &[u8],
    secret: &str,
) -> Result<(), WebhookError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(format!("{timestamp}.").as_bytes());
    mac.update(payload);
    // verify_slice is constant-time
    mac.verify_slice(signature)
        .map_err(|_| WebhookError::InvalidSignature)
}

fn parse_event(payload: &[u8]) -> Result<PaymentEvent, WebhookError> {
    let envelope: Envelope = serde_json::from_slice(payload)
        .map_err(|e| WebhookError::MalformedPayload(e.to_string()))?;

    let metadata = EventMetadata {
        booking_id: envelope
            .data
            .object
            .metadata
            .booking_id
            .as_deref()
            .and_then(|raw| raw.parse::<BookingId>().ok()),
        confirmation_code: envelope
            .data
            .object
            .metadata
            .confirmation_code
            .as_deref()
            .and_then(|raw| raw.parse().ok()),
    };

    let kind = map_event_type(&envelope.event_type);
    debug!(event_id = %envelope.id, event_type = %envelope.event_type, "webhook event verified");

    Ok(PaymentEvent {
        id: envelope.id,
        kind,
        reference: envelope.data.object.id.map(PaymentReference::new),
        metadata,
    })
}

/// Maps provider event types onto the kinds the ledger consumes
fn map_event_type(event_type: &str) -> PaymentEventKind {
    match event_type {
        "checkout.session.completed" | "checkout.session.async_payment_succeeded" => {
            PaymentEventKind::Succeeded
        }
        "checkout.session.async_payment_failed" | "payment_intent.payment_failed" => {
            PaymentEventKind::Failed
        }
        "checkout.session.expired" => PaymentEventKind::SessionExpired,
        other => PaymentEventKind::Other(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test123secret456";

    fn payload() -> Vec<u8> {
        serde_json::json!({
            "id": "evt_test_0001",
            "type": "checkout.session.completed",
            "data": {
                "object": {
                    "id": "cs_test_000042",
                    "metadata": {
                        "booking_id": "0192f0c1-1111-7ccc-8ddd-eeeeffff0000",
                        "confirmation_code": "VUE-20260912-ABCDEF"
                    }
                }
            }
        })
        .to_string()
        .into_bytes()
    }

    #[test]
    fn test_valid_signature_parses_event() {
        let payload = payload();
        let now = Utc::now();
        let header = build_signature_header(&payload, SECRET, now.timestamp());

        let event = verify_and_parse(&payload, &header, SECRET, now).unwrap();
        assert_eq!(event.id, "evt_test_0001");
        assert_eq!(event.kind, PaymentEventKind::Succeeded);
        assert_eq!(
            event.reference,
            Some(PaymentReference::new("cs_test_000042"))
        );
        assert_eq!(
            event.metadata.confirmation_code.unwrap().as_str(),
            "VUE-20260912-ABCDEF"
        );
        assert!(event.metadata.booking_id.is_some());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let payload = payload();
        let now = Utc::now();
        let header = build_signature_header(&payload, "wrong_secret", now.timestamp());

        assert_eq!(
            verify_and_parse(&payload, &header, SECRET, now),
            Err(WebhookError::InvalidSignature)
        );
    }

    #[test]
    fn test_modified_payload_is_rejected() {
        let payload = payload();
        let now = Utc::now();
        let header = build_signature_header(&payload, SECRET, now.timestamp());

        let mut tampered = payload.clone();
        tampered.extend_from_slice(b" ");

        assert_eq!(
            verify_and_parse(&tampered, &header, SECRET, now),
            Err(WebhookError::InvalidSignature)
        );
    }

    #[test]
    fn test_stale_timestamp_is_rejected() {
        let payload = payload();
        let now = Utc::now();
        // 10 minutes old, beyond the 5-minute tolerance
        let header = build_signature_header(&payload, SECRET, now.timestamp() - 600);

        assert!(matches!(
            verify_and_parse(&payload, &header, SECRET, now),
            Err(WebhookError::StaleTimestamp { .. })
        ));
    }

    #[test]
    fn test_malformed_header_is_rejected() {
        let payload = payload();
        let now = Utc::now();

        for header in ["", "v1=deadbeef", "t=123", "nonsense"] {
            assert_eq!(
                verify_and_parse(&payload, header, SECRET, now),
                Err(WebhookError::MalformedHeader),
                "header {header:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_malformed_payload_is_rejected_after_verification() {
        let garbage = b"not json at all";
        let now = Utc::now();
        let header = build_signature_header(garbage, SECRET, now.timestamp());

        assert!(matches!(
            verify_and_parse(garbage, &header, SECRET, now),
            Err(WebhookError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_event_type_mapping() {
        assert_eq!(
            map_event_type("checkout.session.completed"),
            PaymentEventKind::Succeeded
        );
        assert_eq!(
            map_event_type("checkout.session.async_payment_succeeded"),
            PaymentEventKind::Succeeded
        );
        assert_eq!(
            map_event_type("checkout.session.async_payment_failed"),
            PaymentEventKind::Failed
        );
        assert_eq!(
            map_event_type("checkout.session.expired"),
            PaymentEventKind::SessionExpired
        );
        assert_eq!(
            map_event_type("invoice.created"),
            PaymentEventKind::Other("invoice.created".to_string())
        );
    }

    #[test]
    fn test_unparseable_metadata_degrades_to_none() {
        let payload = serde_json::json!({
            "id": "evt_test_0002",
            "type": "checkout.session.completed",
            "data": {
                "object": {
                    "id": "cs_test_000043",
                    "metadata": { "booking_id": "not-a-uuid" }
                }
            }
        })
        .to_string()
        .into_bytes();
        let now = Utc::now();
        let header = build_signature_header(&payload, SECRET, now.timestamp());

        let event = verify_and_parse(&payload, &header, SECRET, now).unwrap();
        assert!(event.metadata.booking_id.is_none());
        assert!(event.metadata.confirmation_code.is_none());
        // lookup still works through the session reference
        assert!(event.reference.is_some());
    }
}
