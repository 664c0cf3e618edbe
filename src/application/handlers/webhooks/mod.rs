//! Webhook ingestion and recovery handlers.

mod dispatch_event;
mod process_webhook;
mod recover_events;
mod validate_event;

pub use dispatch_event::EventDispatcher;
pub use process_webhook::{
    ProcessWebhookCommand, ProcessWebhookError, ProcessWebhookHandler, ProcessWebhookResult,
};
pub use recover_events::{RecoverEventsCommand, RecoveryEngine};
pub use validate_event::EventValidator;
