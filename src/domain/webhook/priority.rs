//! Event priority tiers.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::event_kind::EventType;

/// Coarse classification governing recommended retry aggressiveness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventPriority {
    High,
    Medium,
    Low,
}

impl EventPriority {
    /// Priority for a raw event type. Unknown types are `Medium`.
    pub fn for_event_type(event_type: &str) -> Self {
        EventType::parse(event_type)
            .map(EventType::priority)
            .unwrap_or(EventPriority::Medium)
    }
}

impl fmt::Display for EventPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventPriority::High => write!(f, "high"),
            EventPriority::Medium => write!(f, "medium"),
            EventPriority::Low => write!(f, "low"),
        }
    }
}
