//! Stripe adapter.
//!
//! Verifies inbound webhook signatures and lists historical events for
//! recovery through `GET /v1/events`.
//!
//! # Security
//!
//! - HMAC-SHA256 signature verification with constant-time comparison
//! - Timestamp validation (5-minute window) for replay attack prevention
//! - Secrets handled via `secrecy::SecretString`

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::config::PaymentConfig;
use crate::domain::recovery::EventSourceError;
use crate::domain::webhook::{WebhookError, WebhookEvent};
use crate::ports::{EventListQuery, EventPage, EventSource, WebhookVerifier};

use super::webhook_types::{SignatureHeader, StripeErrorBody, StripeEventList};

type HmacSha256 = Hmac<Sha256>;

/// Maximum age for webhook events (5 minutes).
const MAX_TIMESTAMP_AGE_SECS: i64 = 300;

/// Clock skew tolerance for future timestamps (60 seconds).
const MAX_FUTURE_TOLERANCE_SECS: i64 = 60;

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Secret or restricted API key (sk_... / rk_...).
    api_key: SecretString,

    /// Webhook signing secret (whsec_...). Empty when not configured.
    webhook_secret: SecretString,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,

    /// Reject test-mode events.
    require_livemode: bool,
}

impl StripeConfig {
    pub fn new(api_key: impl Into<String>, webhook_secret: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            webhook_secret: SecretString::new(webhook_secret.into()),
            api_base_url: "https://api.stripe.com".to_string(),
            require_livemode: false,
        }
    }

    pub fn from_payment_config(config: &PaymentConfig) -> Self {
        Self::new(&config.stripe_api_key, &config.stripe_webhook_secret)
            .with_base_url(&config.api_base_url)
            .with_require_livemode(config.require_livemode)
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_require_livemode(mut self, require: bool) -> Self {
        self.require_livemode = require;
        self
    }
}

/// Stripe adapter implementing [`WebhookVerifier`] and [`EventSource`].
pub struct StripeAdapter {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripeAdapter {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// Verify the signature against the clock reading `now`.
    fn verify_signature(
        &self,
        payload: &[u8],
        header: &SignatureHeader,
        now: i64,
    ) -> Result<(), WebhookError> {
        let secret = self.config.webhook_secret.expose_secret();
        if secret.is_empty() {
            return Err(WebhookError::MissingSecret);
        }

        let age = now - header.timestamp;
        if age > MAX_TIMESTAMP_AGE_SECS {
            tracing::warn!(
                signed_at = header.timestamp,
                current_time = now,
                age_secs = age,
                "Webhook signature too old - possible replay attack"
            );
            return Err(WebhookError::TimestampOutOfRange);
        }
        if age < -MAX_FUTURE_TOLERANCE_SECS {
            tracing::warn!(
                signed_at = header.timestamp,
                current_time = now,
                "Webhook signature from future - clock skew or manipulation"
            );
            return Err(WebhookError::TimestampOutOfRange);
        }

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|_| WebhookError::MissingSecret)?;
        mac.update(header.timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        let expected = mac.finalize().into_bytes();

        let matched = header
            .v1_signatures
            .iter()
            .any(|candidate| bool::from(expected.as_slice().ct_eq(candidate)));

        if !matched {
            tracing::warn!(signed_at = header.timestamp, "Invalid webhook signature");
            return Err(WebhookError::InvalidSignature);
        }

        Ok(())
    }

    fn parse_event(&self, payload: &[u8]) -> Result<WebhookEvent, WebhookError> {
        let event: WebhookEvent = serde_json::from_slice(payload).map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse webhook payload");
            WebhookError::ParseError(format!("Invalid JSON: {}", e))
        })?;

        if self.config.require_livemode && !event.livemode {
            tracing::warn!(event_id = %event.id, "Rejected test mode event");
            return Err(WebhookError::LivemodeMismatch);
        }

        Ok(event)
    }
}

#[async_trait]
impl WebhookVerifier for StripeAdapter {
    async fn verify(&self, payload: &[u8], signature: &str) -> Result<WebhookEvent, WebhookError> {
        let header = SignatureHeader::parse(signature).map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse Stripe-Signature header");
            WebhookError::ParseError(e.to_string())
        })?;

        self.verify_signature(payload, &header, chrono::Utc::now().timestamp())?;
        let event = self.parse_event(payload)?;

        tracing::debug!(
            event_id = %event.id,
            event_type = %event.event_type,
            "Webhook signature verified"
        );

        Ok(event)
    }
}

#[async_trait]
impl EventSource for StripeAdapter {
    async fn list_events(&self, query: &EventListQuery) -> Result<EventPage, EventSourceError> {
        let url = format!("{}/v1/events", self.config.api_base_url);

        let mut params = vec![
            ("created[gte]", query.created_gte.to_string()),
            ("created[lte]", query.created_lte.to_string()),
            ("limit", query.limit.to_string()),
        ];
        if let Some(cursor) = &query.starting_after {
            params.push(("starting_after", cursor.clone()));
        }

        let response = self
            .http_client
            .get(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .query(&params)
            .send()
            .await
            .map_err(|e| EventSourceError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<StripeErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            tracing::error!(status = status.as_u16(), error = %message, "Stripe list events failed");
            return Err(EventSourceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let list: StripeEventList = response
            .json()
            .await
            .map_err(|e| EventSourceError::Decode(e.to_string()))?;

        Ok(EventPage {
            events: list.data,
            has_more: list.has_more,
        })
    }
}
