//! Closed set of event kinds this service routes.

use serde::de::DeserializeOwned;

use super::errors::HandlerError;
use super::event::WebhookEvent;
use super::objects::{CheckoutSession, Charge, Customer, Invoice, PaymentIntent, Subscription};
use super::priority::EventPriority;

/// Event types with a business handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    CheckoutSessionCompleted,
    InvoicePaymentSucceeded,
    InvoicePaymentFailed,
    SubscriptionCreated,
    SubscriptionUpdated,
    SubscriptionDeleted,
    PaymentIntentSucceeded,
    PaymentIntentFailed,
    ChargeRefunded,
    CustomerCreated,
    CustomerUpdated,
}

impl EventType {
    pub const ALL: [EventType; 11] = [
        EventType::CheckoutSessionCompleted,
        EventType::InvoicePaymentSucceeded,
        EventType::InvoicePaymentFailed,
        EventType::SubscriptionCreated,
        EventType::SubscriptionUpdated,
        EventType::SubscriptionDeleted,
        EventType::PaymentIntentSucceeded,
        EventType::PaymentIntentFailed,
        EventType::ChargeRefunded,
        EventType::CustomerCreated,
        EventType::CustomerUpdated,
    ];

    pub fn parse(event_type: &str) -> Option<Self> {
        let parsed = match event_type {
            "checkout.session.completed" => EventType::CheckoutSessionCompleted,
            "invoice.payment_succeeded" => EventType::InvoicePaymentSucceeded,
            "invoice.payment_failed" => EventType::InvoicePaymentFailed,
            "customer.subscription.created" => EventType::SubscriptionCreated,
            "customer.subscription.updated" => EventType::SubscriptionUpdated,
            "customer.subscription.deleted" => EventType::SubscriptionDeleted,
            "payment_intent.succeeded" => EventType::PaymentIntentSucceeded,
            "payment_intent.payment_failed" => EventType::PaymentIntentFailed,
            "charge.refunded" => EventType::ChargeRefunded,
            "customer.created" => EventType::CustomerCreated,
            "customer.updated" => EventType::CustomerUpdated,
            _ => return None,
        };
        Some(parsed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::CheckoutSessionCompleted => "checkout.session.completed",
            EventType::InvoicePaymentSucceeded => "invoice.payment_succeeded",
            EventType::InvoicePaymentFailed => "invoice.payment_failed",
            EventType::SubscriptionCreated => "customer.subscription.created",
            EventType::SubscriptionUpdated => "customer.subscription.updated",
            EventType::SubscriptionDeleted => "customer.subscription.deleted",
            EventType::PaymentIntentSucceeded => "payment_intent.succeeded",
            EventType::PaymentIntentFailed => "payment_intent.payment_failed",
            EventType::ChargeRefunded => "charge.refunded",
            EventType::CustomerCreated => "customer.created",
            EventType::CustomerUpdated => "customer.updated",
        }
    }

    pub fn priority(self) -> EventPriority {
        match self {
            EventType::CheckoutSessionCompleted
            | EventType::InvoicePaymentSucceeded
            | EventType::InvoicePaymentFailed
            | EventType::PaymentIntentSucceeded
            | EventType::PaymentIntentFailed
            | EventType::ChargeRefunded => EventPriority::High,
            EventType::SubscriptionCreated
            | EventType::SubscriptionUpdated
            | EventType::SubscriptionDeleted => EventPriority::Medium,
            EventType::CustomerCreated | EventType::CustomerUpdated => EventPriority::Low,
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event decoded into its kind and typed object.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    CheckoutSessionCompleted(CheckoutSession),
    InvoicePaymentSucceeded(Invoice),
    InvoicePaymentFailed(Invoice),
    SubscriptionCreated(Subscription),
    SubscriptionUpdated(Subscription),
    SubscriptionDeleted(Subscription),
    PaymentIntentSucceeded(PaymentIntent),
    PaymentIntentFailed(PaymentIntent),
    ChargeRefunded(Charge),
    CustomerCreated(Customer),
    CustomerUpdated(Customer),
    /// No handler is registered for this type. Acknowledged, not an error.
    Unhandled(String),
}

impl EventKind {
    /// Decode an event into its kind.
    ///
    /// Fails only when a known type carries an object that does not decode.
    pub fn from_event(event: &WebhookEvent) -> Result<Self, HandlerError> {
        let Some(event_type) = event.known_type() else {
            return Ok(EventKind::Unhandled(event.event_type.clone()));
        };

        let kind = match event_type {
            EventType::CheckoutSessionCompleted => {
                EventKind::CheckoutSessionCompleted(decode_object(event)?)
            }
            EventType::InvoicePaymentSucceeded => {
                EventKind::InvoicePaymentSucceeded(decode_object(event)?)
            }
            EventType::InvoicePaymentFailed => EventKind::InvoicePaymentFailed(decode_object(event)?),
            EventType::SubscriptionCreated => EventKind::SubscriptionCreated(decode_object(event)?),
            EventType::SubscriptionUpdated => EventKind::SubscriptionUpdated(decode_object(event)?),
            EventType::SubscriptionDeleted => EventKind::SubscriptionDeleted(decode_object(event)?),
            EventType::PaymentIntentSucceeded => {
                EventKind::PaymentIntentSucceeded(decode_object(event)?)
            }
            EventType::PaymentIntentFailed => EventKind::PaymentIntentFailed(decode_object(event)?),
            EventType::ChargeRefunded => EventKind::ChargeRefunded(decode_object(event)?),
            EventType::CustomerCreated => EventKind::CustomerCreated(decode_object(event)?),
            EventType::CustomerUpdated => EventKind::CustomerUpdated(decode_object(event)?),
        };
        Ok(kind)
    }

    pub fn event_type(&self) -> Option<EventType> {
        let event_type = match self {
            EventKind::CheckoutSessionCompleted(_) => EventType::CheckoutSessionCompleted,
            EventKind::InvoicePaymentSucceeded(_) => EventType::InvoicePaymentSucceeded,
            EventKind::InvoicePaymentFailed(_) => EventType::InvoicePaymentFailed,
            EventKind::SubscriptionCreated(_) => EventType::SubscriptionCreated,
            EventKind::SubscriptionUpdated(_) => EventType::SubscriptionUpdated,
            EventKind::SubscriptionDeleted(_) => EventType::SubscriptionDeleted,
            EventKind::PaymentIntentSucceeded(_) => EventType::PaymentIntentSucceeded,
            EventKind::PaymentIntentFailed(_) => EventType::PaymentIntentFailed,
            EventKind::ChargeRefunded(_) => EventType::ChargeRefunded,
            EventKind::CustomerCreated(_) => EventType::CustomerCreated,
            EventKind::CustomerUpdated(_) => EventType::CustomerUpdated,
            EventKind::Unhandled(_) => return None,
        };
        Some(event_type)
    }
}

fn decode_object<T: DeserializeOwned>(event: &WebhookEvent) -> Result<T, HandlerError> {
    let object = event
        .object()
        .cloned()
        .ok_or_else(|| HandlerError::malformed(&event.event_type, "missing data.object"))?;

    serde_json::from_value(object)
        .map_err(|e| HandlerError::malformed(&event.event_type, e.to_string()))
}
