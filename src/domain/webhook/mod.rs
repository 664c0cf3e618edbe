//! Webhook domain: inbound events, their kinds, stored records and errors.

mod errors;
mod event;
mod event_kind;
mod objects;
mod priority;
mod records;
mod validation;

pub use errors::{FailureKind, HandlerError, StoreError, WebhookError};
pub use event::WebhookEvent;
pub use event_kind::{EventKind, EventType};
pub use objects::{CheckoutSession, Charge, Customer, Invoice, PaymentError, PaymentIntent, Subscription};
pub use priority::EventPriority;
pub use records::{EventKeys, EventMetadata, LastObjectEventRecord, StoredEventRecord};
pub use validation::{Rejection, ValidationOutcome};
