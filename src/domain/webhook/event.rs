//! Inbound webhook event as delivered by the payment processor.

use serde::{Deserialize, Serialize};

use super::event_kind::EventType;
use super::priority::EventPriority;

/// An asynchronously delivered payment-processor notification.
///
/// Deserializes directly from the processor's event envelope; the `data`
/// member is kept verbatim as `payload` and decoded lazily into a typed
/// object by [`EventKind::from_event`](super::EventKind::from_event).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Unique event identifier (evt_...).
    pub id: String,

    /// Event type (e.g., "invoice.payment_succeeded").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Unix timestamp (seconds) when the event was created upstream.
    pub created: i64,

    /// Event data envelope, `{"object": {...}, "previous_attributes": {...}}`.
    #[serde(rename = "data", default)]
    pub payload: serde_json::Value,

    /// Connected account the event belongs to, if any.
    #[serde(default)]
    pub account: Option<String>,

    /// API version used to render the event.
    #[serde(default)]
    pub api_version: Option<String>,

    /// Whether this is a live or test event.
    #[serde(default)]
    pub livemode: bool,
}

impl WebhookEvent {
    /// Identity of the object this event describes, if it has one.
    ///
    /// Account-level events carry no object id.
    pub fn object_id(&self) -> Option<&str> {
        self.payload
            .get("object")
            .and_then(|object| object.get("id"))
            .and_then(|id| id.as_str())
            .filter(|id| !id.is_empty())
    }

    /// The embedded object, if present.
    pub fn object(&self) -> Option<&serde_json::Value> {
        self.payload.get("object")
    }

    pub fn known_type(&self) -> Option<EventType> {
        EventType::parse(&self.event_type)
    }

    pub fn priority(&self) -> EventPriority {
        EventPriority::for_event_type(&self.event_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_processor_envelope() {
        let raw = json!({
            "id": "evt_1",
            "object": "event",
            "type": "invoice.payment_succeeded",
            "created": 1000,
            "api_version": "2023-10-16",
            "livemode": false,
            "pending_webhooks": 1,
            "data": { "object": { "id": "in_1", "object": "invoice" } }
        });

        let event: WebhookEvent = serde_json::from_value(raw).unwrap();

        assert_eq!(event.id, "evt_1");
        assert_eq!(event.event_type, "invoice.payment_succeeded");
        assert_eq!(event.created, 1000);
        assert_eq!(event.api_version.as_deref(), Some("2023-10-16"));
        assert!(event.account.is_none());
        assert_eq!(event.object_id(), Some("in_1"));
    }

    #[test]
    fn object_id_absent_for_account_level_events() {
        let event = WebhookEvent {
            id: "evt_2".to_string(),
            event_type: "balance.available".to_string(),
            created: 1,
            payload: json!({ "object": { "object": "balance" } }),
            account: None,
            api_version: None,
            livemode: false,
        };
        assert_eq!(event.object_id(), None);
    }

    #[test]
    fn object_id_ignores_non_string_ids() {
        let event = WebhookEvent {
            id: "evt_3".to_string(),
            event_type: "x.y".to_string(),
            created: 1,
            payload: json!({ "object": { "id": 42 } }),
            account: None,
            api_version: None,
            livemode: false,
        };
        assert_eq!(event.object_id(), None);
    }
}
