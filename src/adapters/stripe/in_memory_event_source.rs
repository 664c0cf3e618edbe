//! In-memory event source emulating Stripe's `/v1/events` listing.
//!
//! Pages are newest first and continue with `starting_after`, like the real
//! endpoint. Failures can be injected for a given call number.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::domain::recovery::{EventSourceError, TimeWindow};
use crate::domain::webhook::WebhookEvent;
use crate::ports::{EventListQuery, EventPage, EventSource};

/// Deterministic [`EventSource`] backed by a fixed event list.
#[derive(Debug, Default)]
pub struct InMemoryEventSource {
    events: Mutex<Vec<WebhookEvent>>,
    queries: Mutex<Vec<EventListQuery>>,
    fail_on_call: Mutex<Option<usize>>,
}

impl InMemoryEventSource {
    pub fn new(events: Vec<WebhookEvent>) -> Self {
        Self {
            events: Mutex::new(events),
            ..Self::default()
        }
    }

    pub fn push(&self, event: WebhookEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }

    /// Fail the `call`-th listing (zero-based) with `Unavailable`.
    pub fn fail_on_call(&self, call: usize) {
        if let Ok(mut fail) = self.fail_on_call.lock() {
            *fail = Some(call);
        }
    }

    /// Every query received, in order.
    pub fn queries(&self) -> Vec<EventListQuery> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl EventSource for InMemoryEventSource {
    async fn list_events(&self, query: &EventListQuery) -> Result<EventPage, EventSourceError> {
        let call = {
            let mut queries = self
                .queries
                .lock()
                .map_err(|e| EventSourceError::Unavailable(e.to_string()))?;
            queries.push(query.clone());
            queries.len() - 1
        };

        let fail_on = *self
            .fail_on_call
            .lock()
            .map_err(|e| EventSourceError::Unavailable(e.to_string()))?;
        if fail_on == Some(call) {
            return Err(EventSourceError::Unavailable(format!(
                "injected failure on call {}",
                call
            )));
        }

        let window = TimeWindow::new(query.created_gte, query.created_lte);
        let mut matching: Vec<WebhookEvent> = self
            .events
            .lock()
            .map_err(|e| EventSourceError::Unavailable(e.to_string()))?
            .iter()
            .filter(|e| window.contains(e.created))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created.cmp(&a.created).then_with(|| b.id.cmp(&a.id)));

        let offset = match &query.starting_after {
            Some(cursor) => matching
                .iter()
                .position(|e| &e.id == cursor)
                .map(|i| i + 1)
                .unwrap_or(matching.len()),
            None => 0,
        };

        let limit = query.limit as usize;
        let remaining = matching.len().saturating_sub(offset);
        let events = matching.into_iter().skip(offset).take(limit).collect();

        Ok(EventPage {
            events,
            has_more: remaining > limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(id: &str, created: i64) -> WebhookEvent {
        WebhookEvent {
            id: id.to_string(),
            event_type: "charge.refunded".to_string(),
            created,
            payload: json!({ "object": { "id": "ch_1" } }),
            account: None,
            api_version: None,
            livemode: false,
        }
    }

    fn query(gte: i64, lte: i64, limit: u32) -> EventListQuery {
        EventListQuery {
            created_gte: gte,
            created_lte: lte,
            limit,
            starting_after: None,
        }
    }

    #[tokio::test]
    async fn lists_window_newest_first() {
        let source = InMemoryEventSource::new(vec![
            event("evt_a", 10),
            event("evt_b", 30),
            event("evt_c", 20),
            event("evt_out", 99),
        ]);

        let page = source.list_events(&query(0, 50, 10)).await.unwrap();

        let ids: Vec<_> = page.events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["evt_b", "evt_c", "evt_a"]);
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn paginates_with_starting_after() {
        let source = InMemoryEventSource::new((1..=5).map(|i| event(&format!("evt_{}", i), i)).collect());

        let first = source.list_events(&query(0, 10, 2)).await.unwrap();
        assert!(first.has_more);

        let cursor = first.events.last().unwrap().id.clone();
        let second = source.list_events(&query(0, 10, 2).next_page(cursor)).await.unwrap();
        let ids: Vec<_> = second.events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["evt_3", "evt_2"]);
        assert!(second.has_more);

        assert_eq!(source.queries().len(), 2);
    }

    #[tokio::test]
    async fn injected_failure_hits_only_that_call() {
        let source = InMemoryEventSource::new(vec![event("evt_1", 1)]);
        source.fail_on_call(1);

        assert!(source.list_events(&query(0, 10, 10)).await.is_ok());
        assert!(source.list_events(&query(0, 10, 10)).await.is_err());
        assert!(source.list_events(&query(0, 10, 10)).await.is_ok());
    }
}
