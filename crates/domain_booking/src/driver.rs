//! Reconciliation driver
//!
//! Thin orchestration invoked once per verified inbound payment event:
//! apply the event through the ledger, then forward any emitted
//! notifications to the email collaborator. Send failures are logged and
//! swallowed so a transient email outage never turns into a webhook
//! error and a pointless provider redelivery.

use std::sync::Arc;

use tracing::{error, info};

use crate::error::BookingError;
use crate::events::PaymentEvent;
use crate::ports::NotificationSender;
use crate::service::{BookingService, Reconciliation};

pub struct ReconciliationDriver {
    service: Arc<BookingService>,
    notifier: Arc<dyn NotificationSender>,
}

impl ReconciliationDriver {
    pub fn new(service: Arc<BookingService>, notifier: Arc<dyn NotificationSender>) -> Self {
        Self { service, notifier }
    }

    /// Handles one verified payment event end to end
    pub async fn handle(&self, event: &PaymentEvent) -> Result<Reconciliation, BookingError> {
        let reconciliation = self.service.reconcile(event).await?;

        for request in &reconciliation.notifications {
            if let Err(cause) = self.notifier.send(request).await {
                error!(
                    notification_id = %request.id,
                    template = ?request.template,
                    error = %cause,
                    "notification send failed; payment state is already committed"
                );
            }
        }

        info!(
            event_id = %event.id,
            outcome = reconciliation.outcome.as_str(),
            notifications = reconciliation.notifications.len(),
            "payment event handled"
        );

        Ok(reconciliation)
    }
}
