//! Handler that records invocations, for tests and dry runs.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

use crate::domain::webhook::{
    Charge, CheckoutSession, Customer, EventType, HandlerError, Invoice, PaymentIntent,
    Subscription, WebhookEvent,
};
use crate::ports::PaymentEventHandler;

/// One handler call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandledEvent {
    pub event_id: String,
    pub event_type: EventType,
    pub object_id: String,
}

/// Records every call. Selected event ids can be made to fail or decline.
#[derive(Debug, Default)]
pub struct RecordingEventHandler {
    handled: Mutex<Vec<HandledEvent>>,
    failing: Mutex<HashSet<String>>,
    declining: Mutex<HashSet<String>>,
}

impl RecordingEventHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls for `event_id` return `Err(HandlerError::Failed)`.
    pub fn fail_for(&self, event_id: impl Into<String>) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.insert(event_id.into());
        }
    }

    /// Calls for `event_id` return `Ok(false)`.
    pub fn decline_for(&self, event_id: impl Into<String>) {
        if let Ok(mut declining) = self.declining.lock() {
            declining.insert(event_id.into());
        }
    }

    pub fn handled(&self) -> Vec<HandledEvent> {
        self.handled.lock().map(|h| h.clone()).unwrap_or_default()
    }

    pub fn handled_ids(&self) -> Vec<String> {
        self.handled().into_iter().map(|h| h.event_id).collect()
    }

    pub fn count(&self) -> usize {
        self.handled().len()
    }

    fn record(
        &self,
        event: &WebhookEvent,
        event_type: EventType,
        object_id: &str,
    ) -> Result<bool, HandlerError> {
        let contains = |set: &Mutex<HashSet<String>>| {
            set.lock().map(|s| s.contains(&event.id)).unwrap_or(false)
        };

        if let Ok(mut handled) = self.handled.lock() {
            handled.push(HandledEvent {
                event_id: event.id.clone(),
                event_type,
                object_id: object_id.to_string(),
            });
        }

        if contains(&self.failing) {
            return Err(HandlerError::failed(event_type.as_str(), "injected failure"));
        }
        Ok(!contains(&self.declining))
    }
}

#[async_trait]
impl PaymentEventHandler for RecordingEventHandler {
    async fn checkout_session_completed(
        &self,
        event: &WebhookEvent,
        session: &CheckoutSession,
    ) -> Result<bool, HandlerError> {
        self.record(event, EventType::CheckoutSessionCompleted, &session.id)
    }

    async fn invoice_payment_succeeded(
        &self,
        event: &WebhookEvent,
        invoice: &Invoice,
    ) -> Result<bool, HandlerError> {
        self.record(event, EventType::InvoicePaymentSucceeded, &invoice.id)
    }

    async fn invoice_payment_failed(
        &self,
        event: &WebhookEvent,
        invoice: &Invoice,
    ) -> Result<bool, HandlerError> {
        self.record(event, EventType::InvoicePaymentFailed, &invoice.id)
    }

    async fn subscription_created(
        &self,
        event: &WebhookEvent,
        subscription: &Subscription,
    ) -> Result<bool, HandlerError> {
        self.record(event, EventType::SubscriptionCreated, &subscription.id)
    }

    async fn subscription_updated(
        &self,
        event: &WebhookEvent,
        subscription: &Subscription,
    ) -> Result<bool, HandlerError> {
        self.record(event, EventType::SubscriptionUpdated, &subscription.id)
    }

    async fn subscription_deleted(
        &self,
        event: &WebhookEvent,
        subscription: &Subscription,
    ) -> Result<bool, HandlerError> {
        self.record(event, EventType::SubscriptionDeleted, &subscription.id)
    }

    async fn payment_intent_succeeded(
        &self,
        event: &WebhookEvent,
        intent: &PaymentIntent,
    ) -> Result<bool, HandlerError> {
        self.record(event, EventType::PaymentIntentSucceeded, &intent.id)
    }

    async fn payment_intent_failed(
        &self,
        event: &WebhookEvent,
        intent: &PaymentIntent,
    ) -> Result<bool, HandlerError> {
        self.record(event, EventType::PaymentIntentFailed, &intent.id)
    }

    async fn charge_refunded(
        &self,
        event: &WebhookEvent,
        charge: &Charge,
    ) -> Result<bool, HandlerError> {
        self.record(event, EventType::ChargeRefunded, &charge.id)
    }

    async fn customer_created(
        &self,
        event: &WebhookEvent,
        customer: &Customer,
    ) -> Result<bool, HandlerError> {
        self.record(event, EventType::CustomerCreated, &customer.id)
    }

    async fn customer_updated(
        &self,
        event: &WebhookEvent,
        customer: &Customer,
    ) -> Result<bool, HandlerError> {
        self.record(event, EventType::CustomerUpdated, &customer.id)
    }
}
