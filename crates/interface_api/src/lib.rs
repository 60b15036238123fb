//! HTTP API Layer
//!
//! This crate provides the REST API for the booking system using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: booking creation, status lookup, staff check-in, and
//!   the payment webhook
//! - **Middleware**: staff-token guard on the check-in action, request
//!   tracing, CORS from configuration
//! - **DTOs**: strict request schemas (unknown fields rejected) and
//!   response objects
//! - **Error Handling**: consistent error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let app = create_router(state, &config.allowed_origins);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_booking::{BookingService, ReconciliationDriver};

use crate::handlers::{bookings, health, webhook};
use crate::middleware::staff_auth_middleware;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<BookingService>,
    pub driver: Arc<ReconciliationDriver>,
    /// Secret verifying inbound webhook signatures
    pub webhook_secret: String,
    /// Shared token guarding staff actions
    pub staff_token: String,
}

/// Creates the main API router
///
/// # Arguments
///
/// * `state` - Shared application state
/// * `allowed_origins` - CORS origins; `"*"` allows any
pub fn create_router(state: AppState, allowed_origins: &[String]) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Staff routes, guarded by the shared token
    let staff_routes = Router::new()
        .route("/bookings/:code/check-in", post(bookings::check_in))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            staff_auth_middleware,
        ));

    // Customer-facing routes plus the provider webhook
    let api_routes = Router::new()
        .route("/bookings", post(bookings::create_booking))
        .route("/bookings/:id_or_code", get(bookings::get_booking))
        .route("/payment-webhook", post(webhook::payment_webhook))
        .merge(staff_routes);

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}

/// Builds the CORS layer from configured origins
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    if allowed_origins.iter().any(|origin| origin == "*") {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        layer.allow_origin(AllowOrigin::list(origins))
    }
}
