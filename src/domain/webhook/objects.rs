//! Typed payment-processor objects carried in event payloads.
//!
//! Only the fields handlers act on are modelled; everything else in the
//! processor's JSON is ignored. Optional upstream fields stay `Option`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Checkout Session object.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CheckoutSession {
    /// Unique session identifier (cs_...).
    pub id: String,

    /// Customer ID if customer was created/attached.
    pub customer: Option<String>,

    /// Customer email used during checkout.
    pub customer_email: Option<String>,

    /// Subscription ID if checkout created a subscription.
    pub subscription: Option<String>,

    /// Payment intent for one-off payments.
    pub payment_intent: Option<String>,

    /// Session payment status (paid, unpaid, no_payment_required).
    #[serde(default)]
    pub payment_status: String,

    /// Payment mode (payment, setup, subscription).
    #[serde(default)]
    pub mode: String,

    /// Total in the smallest currency unit.
    pub amount_total: Option<i64>,

    /// Custom metadata attached to the session.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Invoice object.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Invoice {
    /// Unique invoice identifier (in_...).
    pub id: String,

    /// Customer ID.
    pub customer: Option<String>,

    /// Associated subscription ID.
    pub subscription: Option<String>,

    /// Invoice status (draft, open, paid, void, uncollectible).
    pub status: Option<String>,

    /// Amount paid in cents.
    #[serde(default)]
    pub amount_paid: i64,

    /// Amount due in cents.
    #[serde(default)]
    pub amount_due: i64,

    /// Currency (lowercase).
    #[serde(default)]
    pub currency: String,

    /// Number of payment attempts made.
    #[serde(default)]
    pub attempt_count: i32,

    /// Unix timestamp of next payment attempt.
    pub next_payment_attempt: Option<i64>,

    /// Custom metadata.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Subscription object.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Subscription {
    /// Unique subscription identifier (sub_...).
    pub id: String,

    /// Customer ID owning this subscription.
    pub customer: Option<String>,

    /// Subscription status.
    #[serde(default)]
    pub status: String,

    /// Current period start (Unix timestamp).
    pub current_period_start: Option<i64>,

    /// Current period end (Unix timestamp).
    pub current_period_end: Option<i64>,

    /// Whether subscription cancels at period end.
    #[serde(default)]
    pub cancel_at_period_end: bool,

    /// When cancellation was requested (Unix timestamp).
    pub canceled_at: Option<i64>,

    /// Custom metadata.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// PaymentIntent object.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PaymentIntent {
    /// Unique payment intent identifier (pi_...).
    pub id: String,

    /// Customer ID.
    pub customer: Option<String>,

    /// Amount in cents.
    #[serde(default)]
    pub amount: i64,

    /// Currency (lowercase).
    #[serde(default)]
    pub currency: String,

    /// Intent status (succeeded, requires_payment_method, ...).
    #[serde(default)]
    pub status: String,

    /// Error of the last failed attempt.
    pub last_payment_error: Option<PaymentError>,

    /// Custom metadata.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Error attached to a failed payment attempt.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PaymentError {
    pub code: Option<String>,
    pub message: Option<String>,
}

/// Charge object.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Charge {
    /// Unique charge identifier (ch_...).
    pub id: String,

    /// Customer ID.
    pub customer: Option<String>,

    /// Payment intent this charge belongs to.
    pub payment_intent: Option<String>,

    /// Amount charged in cents.
    #[serde(default)]
    pub amount: i64,

    /// Amount refunded in cents.
    #[serde(default)]
    pub amount_refunded: i64,

    /// Whether the charge is fully refunded.
    #[serde(default)]
    pub refunded: bool,

    /// Currency (lowercase).
    #[serde(default)]
    pub currency: String,
}

/// Customer object.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Customer {
    /// Unique customer identifier (cus_...).
    pub id: String,

    /// Customer email address.
    pub email: Option<String>,

    /// Customer name.
    pub name: Option<String>,

    /// Custom metadata.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}
