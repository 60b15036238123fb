//! Booking handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use domain_booking::{BookingLookup, ConfirmationCode};

use crate::dto::bookings::{BookingResponse, CreateBookingRequest, CreateBookingResponse};
use crate::error::ApiError;
use crate::AppState;

/// Creates a pending booking and its payment session
pub async fn create_booking(
    State(state): State<AppState>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<CreateBookingResponse>), ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let created = state.service.create_pending(request.into_new_booking()).await?;
    let response = CreateBookingResponse::from_domain(&created)?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Looks up a booking by id or confirmation code for status display
pub async fn get_booking(
    State(state): State<AppState>,
    Path(id_or_code): Path<String>,
) -> Result<Json<BookingResponse>, ApiError> {
    let lookup = BookingLookup::parse(&id_or_code)
        .map_err(|_| ApiError::BadRequest(format!("'{id_or_code}' is not a booking reference")))?;
    let booking = state.service.find(&lookup).await?;
    Ok(Json(BookingResponse::from_domain(&booking)?))
}

/// Staff check-in action (guarded by the staff token middleware)
pub async fn check_in(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<BookingResponse>, ApiError> {
    let code: ConfirmationCode = code
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("'{code}' is not a confirmation code")))?;
    let booking = state.service.check_in(&code).await?;
    Ok(Json(BookingResponse::from_domain(&booking)?))
}
