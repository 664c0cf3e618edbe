//! EventDispatcher - routes a validated event to its business handler.

use std::sync::Arc;

use crate::domain::webhook::{EventKind, FailureKind, HandlerError, WebhookEvent};
use crate::ports::PaymentEventHandler;

/// Decodes the event kind and calls the matching handler method.
///
/// Unhandled types are acknowledged with `Ok(true)`.
pub struct EventDispatcher {
    handler: Arc<dyn PaymentEventHandler>,
}

impl EventDispatcher {
    pub fn new(handler: Arc<dyn PaymentEventHandler>) -> Self {
        Self { handler }
    }

    pub async fn dispatch(&self, event: &WebhookEvent) -> Result<bool, HandlerError> {
        let result = match EventKind::from_event(event) {
            Ok(kind) => self.route(event, kind).await,
            Err(e) => Err(e),
        };

        match &result {
            Ok(true) => {}
            Ok(false) => tracing::warn!(
                event_id = %event.id,
                event_type = %event.event_type,
                "Handler declined event"
            ),
            Err(e) => tracing::error!(
                event_id = %event.id,
                event_type = %event.event_type,
                created = event.created,
                account = ?event.account,
                api_version = ?event.api_version,
                classification = %FailureKind::HandlerError,
                error = %e,
                "Handler failed"
            ),
        }
        result
    }

    async fn route(&self, event: &WebhookEvent, kind: EventKind) -> Result<bool, HandlerError> {
        let h = &self.handler;
        match kind {
            EventKind::CheckoutSessionCompleted(session) => {
                h.checkout_session_completed(event, &session).await
            }
            EventKind::InvoicePaymentSucceeded(invoice) => {
                h.invoice_payment_succeeded(event, &invoice).await
            }
            EventKind::InvoicePaymentFailed(invoice) => h.invoice_payment_failed(event, &invoice).await,
            EventKind::SubscriptionCreated(sub) => h.subscription_created(event, &sub).await,
            EventKind::SubscriptionUpdated(sub) => h.subscription_updated(event, &sub).await,
            EventKind::SubscriptionDeleted(sub) => h.subscription_deleted(event, &sub).await,
            EventKind::PaymentIntentSucceeded(intent) => {
                h.payment_intent_succeeded(event, &intent).await
            }
            EventKind::PaymentIntentFailed(intent) => h.payment_intent_failed(event, &intent).await,
            EventKind::ChargeRefunded(charge) => h.charge_refunded(event, &charge).await,
            EventKind::CustomerCreated(customer) => h.customer_created(event, &customer).await,
            EventKind::CustomerUpdated(customer) => h.customer_updated(event, &customer).await,
            EventKind::Unhandled(event_type) => {
                tracing::info!(
                    event_id = %event.id,
                    event_type = %event_type,
                    "No handler for event type, acknowledging"
                );
                Ok(true)
            }
        }
    }
}
