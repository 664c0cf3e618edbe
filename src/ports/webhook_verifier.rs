//! WebhookVerifier port - authenticates a raw inbound payload.

use async_trait::async_trait;

use crate::domain::webhook::{WebhookError, WebhookEvent};

/// Verifies the signature of a raw payload and decodes the event.
#[async_trait]
pub trait WebhookVerifier: Send + Sync {
    /// # Errors
    ///
    /// - `MissingSecret` if no signing secret is configured
    /// - `ParseError` if the header or JSON is malformed
    /// - `InvalidSignature` / `TimestampOutOfRange` on verification failure
    /// - `LivemodeMismatch` if test events are refused
    async fn verify(&self, payload: &[u8], signature: &str) -> Result<WebhookEvent, WebhookError>;
}
