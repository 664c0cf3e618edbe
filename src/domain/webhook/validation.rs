//! Outcome of validating one event against the Event Store.

use super::errors::FailureKind;
use super::records::LastObjectEventRecord;

/// Result of a validation pass that did not hit an infrastructure fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// Event is new and in order; records were written.
    Accepted,
    /// Event must not be dispatched.
    Rejected(Rejection),
}

impl ValidationOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationOutcome::Accepted)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The event id is already recorded.
    Duplicate,
    /// A newer event of the same type was already applied to the object.
    OutOfOrder {
        stored: LastObjectEventRecord,
        /// `stored.timestamp - event.created`, always positive.
        time_difference: i64,
    },
}

impl Rejection {
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Rejection::Duplicate => FailureKind::Duplicate,
            Rejection::OutOfOrder { .. } => FailureKind::OutOfOrder,
        }
    }
}
