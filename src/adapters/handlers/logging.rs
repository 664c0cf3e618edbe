//! Handler that acknowledges every event with a structured log line.
//!
//! Default wiring for the binary until business mutations are plugged in.

use async_trait::async_trait;

use crate::domain::webhook::{
    Charge, CheckoutSession, Customer, HandlerError, Invoice, PaymentIntent, Subscription,
    WebhookEvent,
};
use crate::ports::PaymentEventHandler;

#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEventHandler;

impl LoggingEventHandler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PaymentEventHandler for LoggingEventHandler {
    async fn checkout_session_completed(
        &self,
        event: &WebhookEvent,
        session: &CheckoutSession,
    ) -> Result<bool, HandlerError> {
        tracing::info!(
            event_id = %event.id,
            session_id = %session.id,
            customer = ?session.customer,
            mode = %session.mode,
            payment_status = %session.payment_status,
            amount_total = ?session.amount_total,
            "Checkout session completed"
        );
        Ok(true)
    }

    async fn invoice_payment_succeeded(
        &self,
        event: &WebhookEvent,
        invoice: &Invoice,
    ) -> Result<bool, HandlerError> {
        tracing::info!(
            event_id = %event.id,
            invoice_id = %invoice.id,
            subscription = ?invoice.subscription,
            amount_paid = invoice.amount_paid,
            currency = %invoice.currency,
            "Invoice paid"
        );
        Ok(true)
    }

    async fn invoice_payment_failed(
        &self,
        event: &WebhookEvent,
        invoice: &Invoice,
    ) -> Result<bool, HandlerError> {
        tracing::warn!(
            event_id = %event.id,
            invoice_id = %invoice.id,
            subscription = ?invoice.subscription,
            amount_due = invoice.amount_due,
            attempt_count = invoice.attempt_count,
            next_payment_attempt = ?invoice.next_payment_attempt,
            "Invoice payment failed"
        );
        Ok(true)
    }

    async fn subscription_created(
        &self,
        event: &WebhookEvent,
        subscription: &Subscription,
    ) -> Result<bool, HandlerError> {
        tracing::info!(
            event_id = %event.id,
            subscription_id = %subscription.id,
            customer = ?subscription.customer,
            status = %subscription.status,
            "Subscription created"
        );
        Ok(true)
    }

    async fn subscription_updated(
        &self,
        event: &WebhookEvent,
        subscription: &Subscription,
    ) -> Result<bool, HandlerError> {
        tracing::info!(
            event_id = %event.id,
            subscription_id = %subscription.id,
            status = %subscription.status,
            cancel_at_period_end = subscription.cancel_at_period_end,
            current_period_end = ?subscription.current_period_end,
            "Subscription updated"
        );
        Ok(true)
    }

    async fn subscription_deleted(
        &self,
        event: &WebhookEvent,
        subscription: &Subscription,
    ) -> Result<bool, HandlerError> {
        tracing::info!(
            event_id = %event.id,
            subscription_id = %subscription.id,
            canceled_at = ?subscription.canceled_at,
            "Subscription deleted"
        );
        Ok(true)
    }

    async fn payment_intent_succeeded(
        &self,
        event: &WebhookEvent,
        intent: &PaymentIntent,
    ) -> Result<bool, HandlerError> {
        tracing::info!(
            event_id = %event.id,
            payment_intent_id = %intent.id,
            amount = intent.amount,
            currency = %intent.currency,
            "Payment intent succeeded"
        );
        Ok(true)
    }

    async fn payment_intent_failed(
        &self,
        event: &WebhookEvent,
        intent: &PaymentIntent,
    ) -> Result<bool, HandlerError> {
        let (code, message) = intent
            .last_payment_error
            .as_ref()
            .map(|e| (e.code.clone(), e.message.clone()))
            .unwrap_or_default();
        tracing::warn!(
            event_id = %event.id,
            payment_intent_id = %intent.id,
            amount = intent.amount,
            error_code = ?code,
            error_message = ?message,
            "Payment intent failed"
        );
        Ok(true)
    }

    async fn charge_refunded(
        &self,
        event: &WebhookEvent,
        charge: &Charge,
    ) -> Result<bool, HandlerError> {
        tracing::info!(
            event_id = %event.id,
            charge_id = %charge.id,
            amount_refunded = charge.amount_refunded,
            fully_refunded = charge.refunded,
            "Charge refunded"
        );
        Ok(true)
    }

    async fn customer_created(
        &self,
        event: &WebhookEvent,
        customer: &Customer,
    ) -> Result<bool, HandlerError> {
        tracing::info!(event_id = %event.id, customer_id = %customer.id, "Customer created");
        Ok(true)
    }

    async fn customer_updated(
        &self,
        event: &WebhookEvent,
        customer: &Customer,
    ) -> Result<bool, HandlerError> {
        tracing::info!(event_id = %event.id, customer_id = %customer.id, "Customer updated");
        Ok(true)
    }
}
