//! PaymentEventHandler port - business handlers for recognized event kinds.
//!
//! Handlers run only after an event passed validation. Each handler owns its
//! own idempotency: dedupe guards literal redelivery of one event id, not two
//! ids describing the same business transition.

use async_trait::async_trait;

use crate::domain::webhook::{
    Charge, CheckoutSession, Customer, HandlerError, Invoice, PaymentIntent, Subscription,
    WebhookEvent,
};

/// One method per recognized event kind.
///
/// `Ok(false)` means the handler declined the event without faulting.
#[async_trait]
pub trait PaymentEventHandler: Send + Sync {
    async fn checkout_session_completed(
        &self,
        event: &WebhookEvent,
        session: &CheckoutSession,
    ) -> Result<bool, HandlerError>;

    async fn invoice_payment_succeeded(
        &self,
        event: &WebhookEvent,
        invoice: &Invoice,
    ) -> Result<bool, HandlerError>;

    async fn invoice_payment_failed(
        &self,
        event: &WebhookEvent,
        invoice: &Invoice,
    ) -> Result<bool, HandlerError>;

    async fn subscription_created(
        &self,
        event: &WebhookEvent,
        subscription: &Subscription,
    ) -> Result<bool, HandlerError>;

    async fn subscription_updated(
        &self,
        event: &WebhookEvent,
        subscription: &Subscription,
    ) -> Result<bool, HandlerError>;

    async fn subscription_deleted(
        &self,
        event: &WebhookEvent,
        subscription: &Subscription,
    ) -> Result<bool, HandlerError>;

    async fn payment_intent_succeeded(
        &self,
        event: &WebhookEvent,
        intent: &PaymentIntent,
    ) -> Result<bool, HandlerError>;

    async fn payment_intent_failed(
        &self,
        event: &WebhookEvent,
        intent: &PaymentIntent,
    ) -> Result<bool, HandlerError>;

    async fn charge_refunded(
        &self,
        event: &WebhookEvent,
        charge: &Charge,
    ) -> Result<bool, HandlerError>;

    async fn customer_created(
        &self,
        event: &WebhookEvent,
        customer: &Customer,
    ) -> Result<bool, HandlerError>;

    async fn customer_updated(
        &self,
        event: &WebhookEvent,
        customer: &Customer,
    ) -> Result<bool, HandlerError>;
}
