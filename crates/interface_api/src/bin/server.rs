//! Booking API server binary
//!
//! Starts the HTTP API for the balloon-flight booking backend.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin booking-api
//!
//! # Run with environment variables
//! APP_HOST=0.0.0.0 APP_PORT=8080 APP_DATABASE_URL=postgres://... cargo run --bin booking-api
//! ```
//!
//! # Environment Variables
//!
//! * `APP_HOST` / `APP_PORT` - bind address (default: 0.0.0.0:8080)
//! * `APP_DATABASE_URL` - PostgreSQL connection string
//! * `APP_STAFF_TOKEN` - shared token for the staff check-in action
//! * `APP_PAYMENTS__SECRET_KEY` / `APP_PAYMENTS__WEBHOOK_SECRET` - payment provider credentials
//! * `APP_EMAIL__API_KEY` - email provider credentials
//! * `APP_PRICING__ADULT_FARE` / `APP_PRICING__CHILD_FARE` - fares in whole currency units
//! * `APP_LOG_LEVEL` - trace, debug, info, warn, error (default: info)

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use domain_booking::{BookingService, CodeGenerator, PricingEngine, ReconciliationDriver};
use infra_db::{create_pool, DatabaseConfig, PgBookingStore};
use infra_providers::{CheckoutGateway, HttpMailer};
use interface_api::{config::ApiConfig, create_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().unwrap_or_default();

    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        "Starting booking API server"
    );

    // Database pool and connectivity check
    let pool = create_pool(DatabaseConfig::new(&config.database_url)).await?;
    sqlx::query("SELECT 1").execute(&pool).await?;
    tracing::info!("Database ready");

    // Collaborator adapters
    let store = Arc::new(PgBookingStore::new(pool));
    let gateway = Arc::new(CheckoutGateway::new(config.payments.checkout_config())?);
    let mailer = Arc::new(HttpMailer::new(config.email.mailer_config())?);

    // The ledger, wired from the immutable configuration
    let service = Arc::new(BookingService::new(
        store,
        gateway,
        PricingEngine::new(config.pricing.price_table()?),
        CodeGenerator::new(&config.code_prefix),
        chrono::Duration::hours(config.expiry_hours),
    ));
    let driver = Arc::new(ReconciliationDriver::new(service.clone(), mailer));

    spawn_expiry_sweep(service.clone(), config.sweep_interval_secs);

    let state = AppState {
        service,
        driver,
        webhook_secret: config.payments.webhook_secret.clone(),
        staff_token: config.staff_token.clone(),
    };
    let app = create_router(state, &config.allowed_origins);

    let addr: SocketAddr = config.server_addr().parse()?;
    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Periodically expires pending bookings that never saw a payment event
fn spawn_expiry_sweep(service: Arc<BookingService>, interval_secs: u64) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        loop {
            ticker.tick().await;
            if let Err(cause) = service.expire_stale(Utc::now()).await {
                tracing::warn!(error = %cause, "expiry sweep failed");
            }
        }
    });
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM)
///
/// This enables graceful shutdown of the server, allowing in-flight
/// requests to complete before the process exits.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
