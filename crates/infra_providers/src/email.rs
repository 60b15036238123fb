//! Templated email adapter
//!
//! Sends transactional mail through the email provider's template API.
//! Fire-and-forget from the core's perspective: the reconciliation
//! driver logs failures and never lets them near the payment flow.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use core_kernel::{DomainPort, PortError};
use domain_booking::{NotificationRequest, NotificationSender, NotificationTemplate, Recipient};

/// Provider-side template identifiers
#[derive(Debug, Clone)]
pub struct TemplateIds {
    pub booking_confirmed: String,
    pub payment_failed: String,
    pub staff_booking_paid: String,
    pub staff_payment_failed: String,
}

impl TemplateIds {
    fn resolve(&self, template: NotificationTemplate) -> &str {
        match template {
            NotificationTemplate::BookingConfirmed => &self.booking_confirmed,
            NotificationTemplate::PaymentFailed => &self.payment_failed,
            NotificationTemplate::StaffBookingPaid => &self.staff_booking_paid,
            NotificationTemplate::StaffPaymentFailed => &self.staff_payment_failed,
        }
    }
}

/// Configuration for the mailer
#[derive(Debug, Clone)]
pub struct MailerConfig {
    /// Provider send endpoint
    pub api_url: String,
    /// API key
    pub api_key: String,
    /// Sender address
    pub from_address: String,
    /// Operations inbox for staff notifications
    pub staff_address: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    pub templates: TemplateIds,
}

/// Outbound send payload
#[derive(Debug, Serialize)]
struct SendPayload<'a> {
    from: &'a str,
    to: &'a str,
    template_id: &'a str,
    data: &'a Value,
}

/// Email sender over the provider's HTTP template API
pub struct HttpMailer {
    config: MailerConfig,
    http: reqwest::Client,
}

impl HttpMailer {
    pub fn new(config: MailerConfig) -> Result<Self, PortError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PortError::internal(format!("http client: {e}")))?;
        Ok(Self { config, http })
    }

    fn recipient_address<'a>(&'a self, recipient: &'a Recipient) -> &'a str {
        match recipient {
            Recipient::Customer { email } => email,
            Recipient::Staff => &self.config.staff_address,
        }
    }
}

impl DomainPort for HttpMailer {}

#[async_trait]
impl NotificationSender for HttpMailer {
    async fn send(&self, request: &NotificationRequest) -> Result<(), PortError> {
        let payload = SendPayload {
            from: &self.config.from_address,
            to: self.recipient_address(&request.recipient),
            template_id: self.config.templates.resolve(request.template),
            data: &request.data,
        };

        debug!(notification_id = %request.id, template = ?request.template, "sending notification");

        let response = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PortError::timeout("send_email", self.config.timeout_secs * 1000)
                } else {
                    PortError::connection(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(if status.is_server_error() {
                PortError::ServiceUnavailable {
                    service: "email".to_string(),
                }
            } else {
                PortError::Rejected {
                    service: "email".to_string(),
                    message: body,
                }
            });
        }

        Ok(())
    }
}
