//! Stripe adapters: signature verification, event listing, and an
//! in-memory stand-in for the listing endpoint.

mod in_memory_event_source;
mod stripe_adapter;
mod webhook_types;

pub use in_memory_event_source::InMemoryEventSource;
pub use stripe_adapter::{StripeAdapter, StripeConfig};
pub use webhook_types::{hex_encode, SignatureHeader, SignatureParseError};
