//! HTTP adapters (Axum).

pub mod webhooks;

pub use webhooks::{app_router, WebhookAppState};
