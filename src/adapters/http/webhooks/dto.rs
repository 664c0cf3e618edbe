//! HTTP DTOs for the webhook and recovery endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::webhooks::RecoverEventsCommand;
use crate::domain::recovery::{RecoveryMode, RecoveryStats};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to replay a time window.
#[derive(Debug, Clone, Deserialize)]
pub struct RecoveryRequest {
    /// Window start, Unix seconds.
    pub start_time: i64,
    /// Window end, Unix seconds, inclusive.
    pub end_time: i64,
    #[serde(default = "default_mode")]
    pub mode: RecoveryMode,
    /// Chunked mode page budget override.
    #[serde(default)]
    pub max_pages: Option<u32>,
}

fn default_mode() -> RecoveryMode {
    RecoveryMode::Chunked
}

impl From<RecoveryRequest> for RecoverEventsCommand {
    fn from(req: RecoveryRequest) -> Self {
        Self {
            start_time: req.start_time,
            end_time: req.end_time,
            mode: req.mode,
            max_pages: req.max_pages,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Body of every webhook response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn processed() -> Self {
        Self {
            message: "Processed".to_string(),
        }
    }

    pub fn webhook_error(reason: impl std::fmt::Display) -> Self {
        Self {
            message: format!("Webhook Error: {}", reason),
        }
    }
}

/// Result of a recovery run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryResponse {
    pub mode: RecoveryMode,
    pub start_time: i64,
    pub end_time: i64,
    pub stats: RecoveryStats,
}

/// Error response for the recovery endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
