//! HTTP handlers for webhook ingestion and recovery.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Json, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;

use crate::application::handlers::webhooks::{
    ProcessWebhookCommand, ProcessWebhookError, ProcessWebhookHandler, RecoveryEngine,
};
use crate::config::RetryPolicies;
use crate::domain::recovery::RecoveryError;
use crate::domain::webhook::WebhookError;

use super::dto::{
    ErrorResponse, HealthResponse, MessageResponse, RecoveryRequest, RecoveryResponse,
};

pub const SIGNATURE_HEADER: &str = "Stripe-Signature";
pub const ADMIN_TOKEN_HEADER: &str = "X-Admin-Token";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state, cloned per request.
#[derive(Clone)]
pub struct WebhookAppState {
    pub webhook_handler: Arc<ProcessWebhookHandler>,
    pub recovery_engine: Arc<RecoveryEngine>,
    pub retry_policies: Arc<RetryPolicies>,
    /// Token required by the recovery endpoint. Open when `None`.
    pub admin_token: Option<Arc<SecretString>>,
}

impl WebhookAppState {
    fn admin_authorized(&self, headers: &HeaderMap) -> bool {
        let Some(expected) = &self.admin_token else {
            return true;
        };
        headers
            .get(ADMIN_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|provided| {
                bool::from(
                    provided
                        .as_bytes()
                        .ct_eq(expected.expose_secret().as_bytes()),
                )
            })
            .unwrap_or(false)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/webhooks/stripe - Ingest one webhook delivery
///
/// Duplicates and stale deliveries are acknowledged with 200 so the
/// processor stops redelivering them.
pub async fn handle_stripe_webhook(
    State(state): State<WebhookAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<MessageResponse>, WebhookApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let cmd = ProcessWebhookCommand {
        payload: body.to_vec(),
        signature,
    };

    state
        .webhook_handler
        .handle(cmd)
        .await
        .map_err(|e| WebhookApiError::from_failure(e, &state.retry_policies))?;

    Ok(Json(MessageResponse::processed()))
}

/// POST /api/webhooks/recovery - Replay a time window
pub async fn trigger_recovery(
    State(state): State<WebhookAppState>,
    headers: HeaderMap,
    Json(request): Json<RecoveryRequest>,
) -> Result<Json<RecoveryResponse>, RecoveryApiError> {
    if !state.admin_authorized(&headers) {
        tracing::warn!("Recovery request rejected: bad admin token");
        return Err(RecoveryApiError::Unauthorized);
    }

    let mode = request.mode;
    let (start_time, end_time) = (request.start_time, request.end_time);
    let stats = state.recovery_engine.handle(request.into()).await?;

    Ok(Json(RecoveryResponse {
        mode,
        start_time,
        end_time,
        stats,
    }))
}

/// GET /health - Liveness check
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// Webhook failure rendered as `{"message": "Webhook Error: ..."}`.
#[derive(Debug)]
pub struct WebhookApiError {
    error: WebhookError,
    retry_after: Option<Duration>,
}

impl WebhookApiError {
    /// Attach the first retry delay of the event's priority to retryable faults.
    pub fn from_failure(failure: ProcessWebhookError, retry: &RetryPolicies) -> Self {
        let retry_after = failure
            .priority
            .filter(|_| failure.source.is_retryable())
            .and_then(|priority| retry.for_priority(priority).delay_for_attempt(0));

        Self {
            error: failure.source,
            retry_after,
        }
    }
}

impl From<WebhookError> for WebhookApiError {
    fn from(error: WebhookError) -> Self {
        Self {
            error,
            retry_after: None,
        }
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> Response {
        let status = self.error.status_code();
        let body = Json(MessageResponse::webhook_error(&self.error));
        let mut response = (status, body).into_response();

        if let Some(delay) = self.retry_after {
            let secs = delay.as_secs() + u64::from(delay.subsec_nanos() > 0);
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs.max(1)));
        }

        response
    }
}

/// Recovery endpoint errors.
#[derive(Debug)]
pub enum RecoveryApiError {
    Unauthorized,
    Recovery(RecoveryError),
}

impl From<RecoveryError> for RecoveryApiError {
    fn from(err: RecoveryError) -> Self {
        Self::Recovery(err)
    }
}

impl IntoResponse for RecoveryApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            RecoveryApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Admin token required".to_string(),
            ),
            RecoveryApiError::Recovery(
                e @ (RecoveryError::InvalidWindow { .. } | RecoveryError::InvalidChunkSize),
            ) => (StatusCode::BAD_REQUEST, "INVALID_WINDOW", e.to_string()),
            RecoveryApiError::Recovery(e @ RecoveryError::Source(_)) => {
                (StatusCode::BAD_GATEWAY, "UPSTREAM_UNAVAILABLE", e.to_string())
            }
        };

        (status, Json(ErrorResponse::new(error_code, message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProcessingConfig;
    use crate::domain::recovery::EventSourceError;
    use crate::domain::webhook::{EventPriority, HandlerError, StoreError};

    fn policies() -> RetryPolicies {
        ProcessingConfig::production().retry
    }

    #[test]
    fn retryable_failure_gets_retry_after_from_priority() {
        let failure = ProcessWebhookError {
            source: WebhookError::Storage(StoreError::Unavailable("down".to_string())),
            priority: Some(EventPriority::Medium),
        };

        let response = WebhookApiError::from_failure(failure, &policies()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[header::RETRY_AFTER], "5");
    }

    #[test]
    fn sub_second_delay_rounds_up() {
        let failure = ProcessWebhookError {
            source: WebhookError::Storage(StoreError::Unavailable("down".to_string())),
            priority: Some(EventPriority::High),
        };

        let response = WebhookApiError::from_failure(failure, &ProcessingConfig::development().retry)
            .into_response();

        assert_eq!(response.headers()[header::RETRY_AFTER], "1");
    }

    #[test]
    fn handler_failure_has_no_retry_after() {
        let failure = ProcessWebhookError {
            source: WebhookError::Handler(HandlerError::failed("charge.refunded", "x")),
            priority: Some(EventPriority::High),
        };

        let response = WebhookApiError::from_failure(failure, &policies()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get(header::RETRY_AFTER).is_none());
    }

    #[test]
    fn verification_failure_has_no_retry_after() {
        let response = WebhookApiError::from(WebhookError::InvalidSignature).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().get(header::RETRY_AFTER).is_none());
    }

    #[test]
    fn invalid_window_maps_to_400() {
        let response =
            RecoveryApiError::from(RecoveryError::InvalidWindow { start: 2, end: 1 }).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn upstream_failure_maps_to_502() {
        let response = RecoveryApiError::from(RecoveryError::Source(EventSourceError::Unavailable(
            "timeout".to_string(),
        )))
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn unauthorized_maps_to_401() {
        assert_eq!(
            RecoveryApiError::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
