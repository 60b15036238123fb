//! Checkout-session payment gateway
//!
//! Creates hosted checkout sessions over the provider's form-encoded
//! HTTP API. The session is tagged with the booking id and confirmation
//! code as provider-side metadata, which is the only channel the later
//! webhook event has to find the booking again.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use core_kernel::{DomainPort, PortError};
use domain_booking::{PaymentGateway, PaymentReference, PaymentSession, SessionRequest};

/// Configuration for the checkout gateway
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// Base URL of the provider API
    pub api_base: String,
    /// Secret API key
    pub secret_key: String,
    /// Where the provider redirects after successful payment
    pub success_url: String,
    /// Where the provider redirects on cancel
    pub cancel_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Also offer the cash-at-store payment method (paid later at a
    /// convenience store, confirmed by an async webhook event)
    pub store_payment_fallback: bool,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.stripe.com".to_string(),
            secret_key: String::new(),
            success_url: "https://example.com/booking/success".to_string(),
            cancel_url: "https://example.com/booking/cancelled".to_string(),
            timeout_secs: 30,
            store_payment_fallback: false,
        }
    }
}

/// Payment gateway over the provider's checkout-session API
pub struct CheckoutGateway {
    config: CheckoutConfig,
    http: reqwest::Client,
}

impl CheckoutGateway {
    pub fn new(config: CheckoutConfig) -> Result<Self, PortError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PortError::internal(format!("http client: {e}")))?;
        Ok(Self { config, http })
    }
}

/// Builds the form-encoded body for session creation
///
/// The provider expects bracketed field names for nested objects; the
/// amount is the trusted total in minor units.
fn session_form(
    request: &SessionRequest,
    config: &CheckoutConfig,
) -> Result<Vec<(String, String)>, PortError> {
    let unit_amount = request
        .amount
        .minor_units()
        .map_err(|e| PortError::validation(format!("session amount: {e}")))?;

    let mut form = vec![
        ("mode".to_string(), "payment".to_string()),
        ("success_url".to_string(), config.success_url.clone()),
        ("cancel_url".to_string(), config.cancel_url.clone()),
        ("line_items[0][quantity]".to_string(), "1".to_string()),
        (
            "line_items[0][price_data][currency]".to_string(),
            request.amount.currency().provider_code().to_string(),
        ),
        (
            "line_items[0][price_data][unit_amount]".to_string(),
            unit_amount.to_string(),
        ),
        (
            "line_items[0][price_data][product_data][name]".to_string(),
            request.description.clone(),
        ),
        (
            "metadata[booking_id]".to_string(),
            request.metadata.booking_id.as_uuid().to_string(),
        ),
        (
            "metadata[confirmation_code]".to_string(),
            request.metadata.confirmation_code.as_str().to_string(),
        ),
        (
            "payment_method_types[0]".to_string(),
            "card".to_string(),
        ),
    ];

    if config.store_payment_fallback {
        form.push((
            "payment_method_types[1]".to_string(),
            "oxxo".to_string(),
        ));
    }

    Ok(form)
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
    url: String,
}

impl DomainPort for CheckoutGateway {}

#[async_trait]
impl PaymentGateway for CheckoutGateway {
    async fn create_session(&self, request: &SessionRequest) -> Result<PaymentSession, PortError> {
        let form = session_form(request, &self.config)?;
        let url = format!("{}/v1/checkout/sessions", self.config.api_base);

        debug!(
            booking_id = %request.metadata.booking_id,
            amount = %request.amount,
            "creating checkout session"
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.secret_key)
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PortError::timeout("create_session", self.config.timeout_secs * 1000)
                } else if e.is_connect() {
                    PortError::connection(e.to_string())
                } else {
                    PortError::internal(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "checkout session creation rejected");
            return Err(map_provider_status(status, body));
        }

        let session: SessionResponse = response
            .json()
            .await
            .map_err(|e| PortError::internal(format!("session response: {e}")))?;

        Ok(PaymentSession {
            reference: PaymentReference::new(session.id),
            redirect_url: session.url,
        })
    }
}

fn map_provider_status(status: StatusCode, body: String) -> PortError {
    if status.is_server_error() {
        PortError::ServiceUnavailable {
            service: "payments".to_string(),
        }
    } else {
        PortError::Rejected {
            service: "payments".to_string(),
            message: body,
        }
    }
}
