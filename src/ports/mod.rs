//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `EventStore` - TTL-bounded key-value store for dedupe and ordering records
//! - `EventSource` - Paginated upstream event listing used by recovery
//! - `PaymentEventHandler` - Business handlers per event kind
//! - `WebhookVerifier` - Signature verification of inbound payloads

mod event_handler;
mod event_source;
mod event_store;
mod webhook_verifier;

pub use event_handler::PaymentEventHandler;
pub use event_source::{EventListQuery, EventPage, EventSource};
pub use event_store::EventStore;
pub use webhook_verifier::WebhookVerifier;

pub use crate::domain::recovery::EventSourceError;
