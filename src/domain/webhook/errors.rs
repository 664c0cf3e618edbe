//! Error types for webhook ingestion.
//!
//! Expected outcomes (duplicates, stale deliveries) are not errors; see
//! [`ValidationOutcome`](super::ValidationOutcome). Everything here is an
//! infrastructure or handler fault, or a rejected inbound request.

use axum::http::StatusCode;
use std::fmt;
use thiserror::Error;

/// Closed classification attached to every logged failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Duplicate,
    OutOfOrder,
    RedisError,
    HandlerError,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Duplicate => "DUPLICATE",
            FailureKind::OutOfOrder => "OUT_OF_ORDER",
            FailureKind::RedisError => "REDIS_ERROR",
            FailureKind::HandlerError => "HANDLER_ERROR",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event Store faults.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Backend unreachable or command failed.
    #[error("Event store unavailable: {0}")]
    Unavailable(String),

    /// A stored value could not be decoded or encoded.
    #[error("Corrupt record at {key}: {reason}")]
    Corrupt { key: String, reason: String },
}

impl StoreError {
    pub fn corrupt(key: impl Into<String>, reason: impl fmt::Display) -> Self {
        StoreError::Corrupt {
            key: key.into(),
            reason: reason.to_string(),
        }
    }
}

/// Business handler faults.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    /// The event object does not decode into the type its kind requires.
    #[error("Malformed {event_type} payload: {reason}")]
    MalformedPayload { event_type: String, reason: String },

    /// The handler ran and failed.
    #[error("Handler for {event_type} failed: {reason}")]
    Failed { event_type: String, reason: String },
}

impl HandlerError {
    pub fn malformed(event_type: &str, reason: impl fmt::Display) -> Self {
        HandlerError::MalformedPayload {
            event_type: event_type.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn failed(event_type: &str, reason: impl fmt::Display) -> Self {
        HandlerError::Failed {
            event_type: event_type.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Errors surfaced by the webhook endpoint.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// No signature header on the request.
    #[error("Missing signature")]
    MissingSignature,

    /// No webhook secret configured to verify against.
    #[error("Missing webhook secret")]
    MissingSecret,

    /// Signature verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Signed timestamp is outside the tolerance window.
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// A test-mode event reached a live-mode deployment.
    #[error("Livemode mismatch")]
    LivemodeMismatch,

    /// Payload or signature header could not be parsed.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Event Store fault (REDIS_ERROR).
    #[error(transparent)]
    Storage(#[from] StoreError),

    /// Handler fault (HANDLER_ERROR).
    #[error(transparent)]
    Handler(#[from] HandlerError),
}

impl WebhookError {
    /// Returns true if a redelivery can succeed.
    ///
    /// Only store faults qualify. A handler fault happens after the dedupe
    /// record is written, so its redelivery is rejected as a duplicate.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WebhookError::Storage(_))
    }

    /// Maps the error to the response status.
    ///
    /// 4xx stops redelivery, 5xx asks for it.
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::MissingSignature
            | WebhookError::MissingSecret
            | WebhookError::InvalidSignature
            | WebhookError::TimestampOutOfRange
            | WebhookError::LivemodeMismatch
            | WebhookError::ParseError(_) => StatusCode::BAD_REQUEST,

            WebhookError::Storage(_) | WebhookError::Handler(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Classification for logging, when the error is a processing fault.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            WebhookError::Storage(_) => Some(FailureKind::RedisError),
            WebhookError::Handler(_) => Some(FailureKind::HandlerError),
            _ => None,
        }
    }
}
