//! EventValidator - duplicate and ordering checks against the Event Store.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ProcessingConfig;
use crate::domain::webhook::{
    EventKeys, FailureKind, LastObjectEventRecord, Rejection, StoreError, StoredEventRecord,
    ValidationOutcome, WebhookEvent,
};
use crate::ports::EventStore;

/// Validates one event and records it.
///
/// 1. An existing dedupe record rejects the event as `DUPLICATE`.
/// 2. With an object id, the ordering record is compare-and-swapped; a
///    strictly newer stored timestamp rejects the event as `OUT_OF_ORDER`
///    and leaves the record untouched.
/// 3. The dedupe record is written only if still absent; losing that race
///    is also `DUPLICATE`.
///
/// Store faults are returned as `Err` and classified `REDIS_ERROR`.
pub struct EventValidator {
    store: Arc<dyn EventStore>,
    keys: EventKeys,
    event_ttl: Duration,
    last_event_ttl: Duration,
}

impl EventValidator {
    pub fn new(store: Arc<dyn EventStore>, config: &ProcessingConfig) -> Self {
        Self {
            store,
            keys: EventKeys::new(&config.namespace),
            event_ttl: Duration::from_secs(config.event_ttl_secs),
            last_event_ttl: Duration::from_secs(config.last_event_ttl_secs),
        }
    }

    pub fn keys(&self) -> &EventKeys {
        &self.keys
    }

    /// Whether a dedupe record exists for `event_id`.
    pub async fn is_recorded(&self, event_id: &str) -> Result<bool, StoreError> {
        Ok(self.store.get(&self.keys.event_key(event_id)).await?.is_some())
    }

    /// The ordering record for `(event_type, object_id)`, if any.
    pub async fn last_event(
        &self,
        event_type: &str,
        object_id: &str,
    ) -> Result<Option<LastObjectEventRecord>, StoreError> {
        let key = self.keys.last_event_key(event_type, object_id);
        match self.store.get(&key).await? {
            Some(value) => serde_json::from_str(&value)
                .map(Some)
                .map_err(|e| StoreError::corrupt(key, e)),
            None => Ok(None),
        }
    }

    pub async fn validate(&self, event: &WebhookEvent) -> Result<ValidationOutcome, StoreError> {
        self.run(event).await.map_err(|e| {
            tracing::error!(
                event_id = %event.id,
                event_type = %event.event_type,
                created = event.created,
                account = ?event.account,
                api_version = ?event.api_version,
                classification = %FailureKind::RedisError,
                error = %e,
                "Event store failure during validation"
            );
            e
        })
    }

    async fn run(&self, event: &WebhookEvent) -> Result<ValidationOutcome, StoreError> {
        let event_key = self.keys.event_key(&event.id);

        if self.store.get(&event_key).await?.is_some() {
            return Ok(self.duplicate(event));
        }

        match event.object_id() {
            Some(object_id) => {
                if let Some(rejection) = self.check_order(event, object_id).await? {
                    return Ok(ValidationOutcome::Rejected(rejection));
                }
            }
            None => {
                tracing::info!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    "Event has no object id, skipping ordering check"
                );
            }
        }

        let record = StoredEventRecord::new(event, Utc::now());
        let value = serde_json::to_string(&record).map_err(|e| StoreError::corrupt(&event_key, e))?;

        if !self.store.set_if_absent(&event_key, &value, self.event_ttl).await? {
            return Ok(self.duplicate(event));
        }

        tracing::debug!(
            event_id = %event.id,
            event_type = %event.event_type,
            created = event.created,
            priority = %event.priority(),
            "Event validated"
        );
        Ok(ValidationOutcome::Accepted)
    }

    async fn check_order(
        &self,
        event: &WebhookEvent,
        object_id: &str,
    ) -> Result<Option<Rejection>, StoreError> {
        let key = self.keys.last_event_key(&event.event_type, object_id);
        let record = LastObjectEventRecord::new(event, object_id);
        let value = serde_json::to_string(&record).map_err(|e| StoreError::corrupt(&key, e))?;

        let Some(current) = self
            .store
            .set_if_not_older(&key, &value, event.created, self.last_event_ttl)
            .await?
        else {
            return Ok(None);
        };

        let stored: LastObjectEventRecord =
            serde_json::from_str(&current).map_err(|e| StoreError::corrupt(&key, e))?;
        let time_difference = stored.timestamp - event.created;

        tracing::warn!(
            event_id = %event.id,
            event_type = %event.event_type,
            created = event.created,
            account = ?event.account,
            api_version = ?event.api_version,
            object_id = %object_id,
            classification = %FailureKind::OutOfOrder,
            stored_event_id = %stored.event_id,
            stored_timestamp = stored.timestamp,
            time_difference,
            "Rejected out-of-order event"
        );

        Ok(Some(Rejection::OutOfOrder {
            stored,
            time_difference,
        }))
    }

    fn duplicate(&self, event: &WebhookEvent) -> ValidationOutcome {
        tracing::info!(
            event_id = %event.id,
            event_type = %event.event_type,
            created = event.created,
            account = ?event.account,
            api_version = ?event.api_version,
            classification = %FailureKind::Duplicate,
            "Skipping duplicate event"
        );
        ValidationOutcome::Rejected(Rejection::Duplicate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::event_store::InMemoryEventStore;
    use serde_json::json;

    fn event(id: &str, object_id: Option<&str>, created: i64) -> WebhookEvent {
        let object = match object_id {
            Some(oid) => json!({ "id": oid }),
            None => json!({ "object": "balance" }),
        };
        WebhookEvent {
            id: id.to_string(),
            event_type: "invoice.payment_succeeded".to_string(),
            created,
            payload: json!({ "object": object }),
            account: None,
            api_version: None,
            livemode: false,
        }
    }

    fn validator() -> (EventValidator, InMemoryEventStore) {
        let store = InMemoryEventStore::new();
        let validator = EventValidator::new(Arc::new(store.clone()), &ProcessingConfig::development());
        (validator, store)
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Duplicate detection
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn new_event_is_accepted_and_recorded() {
        let (validator, _) = validator();

        let outcome = validator.validate(&event("evt_1", Some("in_1"), 1000)).await.unwrap();

        assert_eq!(outcome, ValidationOutcome::Accepted);
        assert!(validator.is_recorded("evt_1").await.unwrap());
    }

    #[tokio::test]
    async fn second_delivery_is_duplicate() {
        let (validator, _) = validator();
        let e = event("evt_1", Some("in_1"), 1000);
        validator.validate(&e).await.unwrap();

        let outcome = validator.validate(&e).await.unwrap();

        assert_eq!(outcome, ValidationOutcome::Rejected(Rejection::Duplicate));
    }

    #[tokio::test]
    async fn event_is_new_again_once_dedupe_ttl_lapses() {
        let (validator, store) = validator();
        let config = ProcessingConfig::development();
        let e = event("evt_1", Some("in_1"), 1000);
        validator.validate(&e).await.unwrap();

        store.advance(Duration::from_secs(config.event_ttl_secs + 1));

        // Ordering record outlives the dedupe record; equal timestamps pass.
        assert!(config.last_event_ttl_secs > config.event_ttl_secs + 1);
        assert!(validator.last_event("invoice.payment_succeeded", "in_1").await.unwrap().is_some());
        assert!(validator.validate(&e).await.unwrap().is_accepted());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Ordering
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn older_event_is_out_of_order() {
        let (validator, _) = validator();
        validator.validate(&event("evt_b", Some("in_1"), 1100)).await.unwrap();

        let outcome = validator.validate(&event("evt_a", Some("in_1"), 900)).await.unwrap();

        match outcome {
            ValidationOutcome::Rejected(Rejection::OutOfOrder {
                stored,
                time_difference,
            }) => {
                assert_eq!(time_difference, 200);
                assert_eq!(stored.event_id, "evt_b");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }

        let last = validator
            .last_event("invoice.payment_succeeded", "in_1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(last.timestamp, 1100);
    }

    #[tokio::test]
    async fn rejected_event_is_not_recorded() {
        let (validator, _) = validator();
        validator.validate(&event("evt_b", Some("in_1"), 1100)).await.unwrap();
        validator.validate(&event("evt_a", Some("in_1"), 900)).await.unwrap();

        assert!(!validator.is_recorded("evt_a").await.unwrap());
    }

    #[tokio::test]
    async fn equal_timestamps_are_accepted() {
        let (validator, _) = validator();
        validator.validate(&event("evt_1", Some("in_1"), 1000)).await.unwrap();

        let outcome = validator.validate(&event("evt_2", Some("in_1"), 1000)).await.unwrap();

        assert!(outcome.is_accepted());
    }

    #[tokio::test]
    async fn ordering_is_per_type() {
        let (validator, _) = validator();
        validator.validate(&event("evt_1", Some("in_1"), 1000)).await.unwrap();

        let mut other_type = event("evt_2", Some("in_1"), 500);
        other_type.event_type = "invoice.payment_failed".to_string();

        assert!(validator.validate(&other_type).await.unwrap().is_accepted());
    }

    #[tokio::test]
    async fn event_without_object_id_is_still_recorded() {
        let (validator, store) = validator();

        let outcome = validator.validate(&event("evt_1", None, 1000)).await.unwrap();

        assert!(outcome.is_accepted());
        assert!(validator.is_recorded("evt_1").await.unwrap());
        assert_eq!(store.len().await, 1);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Store faults
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn write_failure_is_an_error() {
        let (validator, store) = validator();
        store.fail_writes(true);

        let result = validator.validate(&event("evt_1", None, 1000)).await;

        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }

    #[tokio::test]
    async fn concurrent_duplicates_accept_once() {
        let (validator, _) = validator();
        let validator = Arc::new(validator);
        let e = event("evt_1", Some("in_1"), 1000);

        let outcomes = futures::future::join_all((0..8).map(|_| {
            let validator = validator.clone();
            let e = e.clone();
            async move { validator.validate(&e).await.unwrap() }
        }))
        .await;

        let accepted = outcomes.iter().filter(|o| o.is_accepted()).count();
        assert_eq!(accepted, 1);
    }
}
