//! API middleware

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::AppState;

/// Header carrying the staff shared token
pub const STAFF_TOKEN_HEADER: &str = "x-staff-token";

/// Staff authentication middleware
///
/// Guards the check-in action with the shared staff token.
pub async fn staff_auth_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = request
        .headers()
        .get(STAFF_TOKEN_HEADER)
        .and_then(|h| h.to_str().ok());

    match token {
        Some(token) if token == state.staff_token => Ok(next.run(request).await),
        _ => {
            warn!(uri = %request.uri(), "staff action rejected: missing or wrong token");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}
