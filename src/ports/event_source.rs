//! EventSource port - paginated listing of historical upstream events.

use async_trait::async_trait;

use crate::domain::recovery::{EventSourceError, TimeWindow};
use crate::domain::webhook::WebhookEvent;

/// One listing request: `created` in `[created_gte, created_lte]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventListQuery {
    pub created_gte: i64,
    pub created_lte: i64,
    pub limit: u32,
    /// Cursor: id of the last event of the previous page.
    pub starting_after: Option<String>,
}

impl EventListQuery {
    pub fn for_window(window: TimeWindow, limit: u32) -> Self {
        Self {
            created_gte: window.start,
            created_lte: window.end,
            limit,
            starting_after: None,
        }
    }

    /// Query for the page following `last_event_id`.
    pub fn next_page(&self, last_event_id: impl Into<String>) -> Self {
        Self {
            starting_after: Some(last_event_id.into()),
            ..self.clone()
        }
    }
}

/// One page of results, newest first as the upstream returns them.
#[derive(Debug, Clone, Default)]
pub struct EventPage {
    pub events: Vec<WebhookEvent>,
    pub has_more: bool,
}

/// Port for the upstream event listing used by recovery.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn list_events(&self, query: &EventListQuery) -> Result<EventPage, EventSourceError>;
}
