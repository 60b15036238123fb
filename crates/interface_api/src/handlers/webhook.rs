//! Payment webhook handler
//!
//! The provider delivers events at-least-once and keeps retrying until
//! it sees a 2xx. Policy: a bad signature is a 400 and never reaches
//! reconciliation; once the event verified, every reconciliation outcome
//! (applied, already processed, not found, anomalous, ignored) is a 200
//! so healthy retries stop; only a storage failure returns a 500, which
//! makes the provider's own retry redeliver the event once storage
//! recovers.

use axum::{body::Bytes, extract::State, http::HeaderMap, http::StatusCode, Json};
use chrono::Utc;
use tracing::{error, warn};

use infra_providers::{verify_and_parse, SIGNATURE_HEADER};

use crate::dto::bookings::WebhookAck;
use crate::error::ApiError;
use crate::AppState;

pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<WebhookAck>), ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::BadRequest("missing signature header".to_string()))?;

    let event = verify_and_parse(&body, signature, &state.webhook_secret, Utc::now())
        .map_err(|cause| {
            warn!(error = %cause, "webhook rejected before reconciliation");
            ApiError::BadRequest(cause.to_string())
        })?;

    match state.driver.handle(&event).await {
        Ok(reconciliation) => Ok((
            StatusCode::OK,
            Json(WebhookAck {
                received: true,
                outcome: reconciliation.outcome.as_str(),
            }),
        )),
        Err(cause) => {
            error!(
                event_id = %event.id,
                error = %cause,
                "reconciliation failed; provider retry will redeliver"
            );
            Err(ApiError::Internal("Reconciliation failed".to_string()))
        }
    }
}
