//! HTTP adapter for webhook ingestion and recovery.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::WebhookAppState;
pub use routes::{app_router, webhook_routes};
