//! Axum router configuration for webhook endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{handle_stripe_webhook, health, trigger_recovery, WebhookAppState};

/// Webhook routes, mounted at `/api/webhooks`.
///
/// # Routes
/// - `POST /stripe` - Ingest a Stripe webhook (signature verified)
/// - `POST /recovery` - Replay a time window (admin token)
pub fn webhook_routes() -> Router<WebhookAppState> {
    Router::new()
        .route("/stripe", post(handle_stripe_webhook))
        .route("/recovery", post(trigger_recovery))
}

/// Complete application router with state applied.
pub fn app_router(state: WebhookAppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/webhooks", webhook_routes())
        .with_state(state)
}
