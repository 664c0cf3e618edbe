//! Recovery domain: time windows, run statistics and errors.

mod window;

pub use window::{chunk_count, chunk_windows, ChunkWindows, TimeWindow};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Replay mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryMode {
    /// One page over the whole window.
    Simple,
    /// Fixed-width chunks, paginated.
    Chunked,
}

/// Counters accumulated by one recovery run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryStats {
    /// Events returned by the upstream source.
    pub total_events: u64,
    /// Events with no dedupe record.
    pub missing_events: u64,
    pub replayed_events: u64,
    pub failed_replays: u64,
    pub processed_chunks: u64,
    /// Chunks left unfetched once the page budget ran out.
    pub skipped_chunks: u64,
}

impl RecoveryStats {
    /// Event counters only; chunk counters are mode specific.
    pub fn event_counts(&self) -> (u64, u64, u64, u64) {
        (
            self.total_events,
            self.missing_events,
            self.replayed_events,
            self.failed_replays,
        )
    }
}

/// Upstream event listing faults.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventSourceError {
    #[error("Event source unavailable: {0}")]
    Unavailable(String),

    #[error("Event source returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Event source response could not be decoded: {0}")]
    Decode(String),
}

/// Errors that abort a whole recovery run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecoveryError {
    #[error("Invalid window: start {start} is after end {end}")]
    InvalidWindow { start: i64, end: i64 },

    #[error("Chunk size must be positive")]
    InvalidChunkSize,

    #[error(transparent)]
    Source(#[from] EventSourceError),
}
