//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `event_store` - Redis and in-memory Event Stores
//! - `stripe` - Signature verification and event listing
//! - `handlers` - Payment event handlers
//! - `http` - Axum endpoints

pub mod event_store;
pub mod handlers;
pub mod http;
pub mod stripe;

pub use event_store::{InMemoryEventStore, RedisEventStore};
pub use handlers::{LoggingEventHandler, RecordingEventHandler};
pub use stripe::{InMemoryEventSource, StripeAdapter, StripeConfig};
