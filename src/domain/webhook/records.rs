//! Records persisted in the Event Store and the key scheme addressing them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::event::WebhookEvent;
use super::priority::EventPriority;

/// Context copied from the event into both record kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMetadata {
    pub account: Option<String>,
    pub api_version: Option<String>,
    pub livemode: bool,
    pub priority: EventPriority,
}

impl EventMetadata {
    pub fn from_event(event: &WebhookEvent) -> Self {
        Self {
            account: event.account.clone(),
            api_version: event.api_version.clone(),
            livemode: event.livemode,
            priority: event.priority(),
        }
    }
}

/// Dedupe record: proves an event id has been processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredEventRecord {
    #[serde(rename = "type")]
    pub event_type: String,
    pub object_id: Option<String>,
    pub created: i64,
    pub processed_at: DateTime<Utc>,
    pub metadata: EventMetadata,
}

impl StoredEventRecord {
    pub fn new(event: &WebhookEvent, processed_at: DateTime<Utc>) -> Self {
        Self {
            event_type: event.event_type.clone(),
            object_id: event.object_id().map(str::to_string),
            created: event.created,
            processed_at,
            metadata: EventMetadata::from_event(event),
        }
    }
}

/// Ordering record: latest applied event for one (type, object) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastObjectEventRecord {
    pub event_id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    /// `created` of the event that wrote this record.
    pub timestamp: i64,
    pub object_id: String,
    pub metadata: EventMetadata,
}

impl LastObjectEventRecord {
    pub fn new(event: &WebhookEvent, object_id: &str) -> Self {
        Self {
            event_id: event.id.clone(),
            event_type: event.event_type.clone(),
            timestamp: event.created,
            object_id: object_id.to_string(),
            metadata: EventMetadata::from_event(event),
        }
    }
}

/// Builds namespaced store keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventKeys {
    namespace: String,
}

impl EventKeys {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// `<namespace>:event:<eventId>`
    pub fn event_key(&self, event_id: &str) -> String {
        format!("{}:event:{}", self.namespace, event_id)
    }

    /// `<namespace>:last_event:<eventType>:<objectId>`
    pub fn last_event_key(&self, event_type: &str, object_id: &str) -> String {
        format!("{}:last_event:{}:{}", self.namespace, event_type, object_id)
    }
}
