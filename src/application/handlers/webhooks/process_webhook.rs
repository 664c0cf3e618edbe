//! ProcessWebhookHandler - verify, validate and dispatch one inbound webhook.

use std::sync::Arc;
use thiserror::Error;

use crate::domain::webhook::{
    EventPriority, Rejection, ValidationOutcome, WebhookError, WebhookEvent,
};
use crate::ports::WebhookVerifier;

use super::{EventDispatcher, EventValidator};

/// Command to process a webhook delivery.
#[derive(Debug, Clone)]
pub struct ProcessWebhookCommand {
    /// Raw request body, verified byte for byte.
    pub payload: Vec<u8>,
    /// `Stripe-Signature` header, if sent.
    pub signature: Option<String>,
}

/// Outcome of a delivery that needs no redelivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessWebhookResult {
    /// Validated and dispatched. `handled` is false when the handler declined.
    Processed { event_id: String, handled: bool },
    /// Already processed.
    Duplicate { event_id: String },
    /// Older than the last applied event of the same type for the object.
    OutOfOrder {
        event_id: String,
        time_difference: i64,
    },
}

/// Failure, with the event priority when the event was decoded.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct ProcessWebhookError {
    pub source: WebhookError,
    pub priority: Option<EventPriority>,
}

impl From<WebhookError> for ProcessWebhookError {
    fn from(source: WebhookError) -> Self {
        Self {
            source,
            priority: None,
        }
    }
}

pub struct ProcessWebhookHandler {
    verifier: Arc<dyn WebhookVerifier>,
    validator: Arc<EventValidator>,
    dispatcher: Arc<EventDispatcher>,
}

impl ProcessWebhookHandler {
    pub fn new(
        verifier: Arc<dyn WebhookVerifier>,
        validator: Arc<EventValidator>,
        dispatcher: Arc<EventDispatcher>,
    ) -> Self {
        Self {
            verifier,
            validator,
            dispatcher,
        }
    }

    pub async fn handle(
        &self,
        cmd: ProcessWebhookCommand,
    ) -> Result<ProcessWebhookResult, ProcessWebhookError> {
        let signature = cmd.signature.ok_or(WebhookError::MissingSignature)?;
        let event = self.verifier.verify(&cmd.payload, &signature).await?;

        self.process(&event).await.map_err(|source| ProcessWebhookError {
            source,
            priority: Some(event.priority()),
        })
    }

    /// Validate then dispatch an already verified event.
    pub async fn process(&self, event: &WebhookEvent) -> Result<ProcessWebhookResult, WebhookError> {
        let event_id = event.id.clone();

        match self.validator.validate(event).await? {
            ValidationOutcome::Accepted => {
                let handled = self.dispatcher.dispatch(event).await?;
                tracing::info!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    handled,
                    "Webhook processed"
                );
                Ok(ProcessWebhookResult::Processed { event_id, handled })
            }
            ValidationOutcome::Rejected(Rejection::Duplicate) => {
                Ok(ProcessWebhookResult::Duplicate { event_id })
            }
            ValidationOutcome::Rejected(Rejection::OutOfOrder {
                time_difference, ..
            }) => Ok(ProcessWebhookResult::OutOfOrder {
                event_id,
                time_difference,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::event_store::InMemoryEventStore;
    use crate::adapters::handlers::RecordingEventHandler;
    use crate::config::ProcessingConfig;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    // ════════════════════════════════════════════════════════════════════════════
    // Mock Implementations
    // ════════════════════════════════════════════════════════════════════════════

    /// Accepts the signature "valid" and decodes the payload as JSON.
    struct MockVerifier {
        calls: Mutex<u32>,
    }

    #[async_trait]
    impl WebhookVerifier for MockVerifier {
        async fn verify(&self, payload: &[u8], signature: &str) -> Result<WebhookEvent, WebhookError> {
            *self.calls.lock().unwrap() += 1;
            if signature != "valid" {
                return Err(WebhookError::InvalidSignature);
            }
            serde_json::from_slice(payload).map_err(|e| WebhookError::ParseError(e.to_string()))
        }
    }

    struct Fixture {
        handler: ProcessWebhookHandler,
        events: Arc<RecordingEventHandler>,
        store: InMemoryEventStore,
    }

    fn fixture() -> Fixture {
        let store = InMemoryEventStore::new();
        let events = Arc::new(RecordingEventHandler::new());
        let config = ProcessingConfig::development();
        let handler = ProcessWebhookHandler::new(
            Arc::new(MockVerifier {
                calls: Mutex::new(0),
            }),
            Arc::new(EventValidator::new(Arc::new(store.clone()), &config)),
            Arc::new(EventDispatcher::new(events.clone())),
        );
        Fixture {
            handler,
            events,
            store,
        }
    }

    fn command(id: &str, event_type: &str, created: i64) -> ProcessWebhookCommand {
        let body = json!({
            "id": id,
            "type": event_type,
            "created": created,
            "data": { "object": { "id": "in_1" } }
        });
        ProcessWebhookCommand {
            payload: body.to_string().into_bytes(),
            signature: Some("valid".to_string()),
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn processes_new_event() {
        let f = fixture();

        let result = f
            .handler
            .handle(command("evt_1", "invoice.payment_succeeded", 1000))
            .await
            .unwrap();

        assert_eq!(
            result,
            ProcessWebhookResult::Processed {
                event_id: "evt_1".to_string(),
                handled: true
            }
        );
        assert_eq!(f.events.handled_ids(), vec!["evt_1"]);
    }

    #[tokio::test]
    async fn duplicate_is_not_dispatched_twice() {
        let f = fixture();
        f.handler
            .handle(command("evt_1", "invoice.payment_succeeded", 1000))
            .await
            .unwrap();

        let result = f
            .handler
            .handle(command("evt_1", "invoice.payment_succeeded", 1000))
            .await
            .unwrap();

        assert!(matches!(result, ProcessWebhookResult::Duplicate { .. }));
        assert_eq!(f.events.count(), 1);
    }

    #[tokio::test]
    async fn stale_event_is_out_of_order() {
        let f = fixture();
        f.handler
            .handle(command("evt_1", "invoice.payment_succeeded", 1000))
            .await
            .unwrap();

        let result = f
            .handler
            .handle(command("evt_2", "invoice.payment_succeeded", 900))
            .await
            .unwrap();

        assert_eq!(
            result,
            ProcessWebhookResult::OutOfOrder {
                event_id: "evt_2".to_string(),
                time_difference: 100
            }
        );
        assert_eq!(f.events.count(), 1);
    }

    #[tokio::test]
    async fn missing_signature_is_rejected_before_verification() {
        let f = fixture();
        let mut cmd = command("evt_1", "invoice.payment_succeeded", 1000);
        cmd.signature = None;

        let err = f.handler.handle(cmd).await.unwrap_err();

        assert!(matches!(err.source, WebhookError::MissingSignature));
        assert!(err.priority.is_none());
    }

    #[tokio::test]
    async fn invalid_signature_is_rejected() {
        let f = fixture();
        let mut cmd = command("evt_1", "invoice.payment_succeeded", 1000);
        cmd.signature = Some("forged".to_string());

        let err = f.handler.handle(cmd).await.unwrap_err();

        assert!(matches!(err.source, WebhookError::InvalidSignature));
        assert!(f.store.is_empty().await);
    }

    #[tokio::test]
    async fn handler_failure_carries_priority() {
        let f = fixture();
        f.events.fail_for("evt_1");

        let err = f
            .handler
            .handle(command("evt_1", "customer.updated", 1000))
            .await
            .unwrap_err();

        assert!(matches!(err.source, WebhookError::Handler(_)));
        assert_eq!(err.priority, Some(EventPriority::Low));
    }

    #[tokio::test]
    async fn store_failure_is_storage_error() {
        let f = fixture();
        f.store.fail_writes(true);

        let err = f
            .handler
            .handle(command("evt_1", "invoice.payment_succeeded", 1000))
            .await
            .unwrap_err();

        assert!(matches!(err.source, WebhookError::Storage(_)));
        assert_eq!(err.priority, Some(EventPriority::High));
    }
}
