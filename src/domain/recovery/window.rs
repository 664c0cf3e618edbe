//! Partitioning of a recovery window into chunks.

use serde::{Deserialize, Serialize};

/// Inclusive range of `created` timestamps, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: i64,
    pub end: i64,
}

impl TimeWindow {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, timestamp: i64) -> bool {
        self.start <= timestamp && timestamp <= self.end
    }
}

/// Split `[start, end]` into consecutive inclusive chunks of `chunk_size` seconds.
///
/// Chunks are disjoint and cover the window exactly; the last one absorbs
/// the end bound. `start == end` yields a single chunk. Chunks are produced
/// lazily. The caller checks `start <= end` and `chunk_size > 0`.
pub fn chunk_windows(start: i64, end: i64, chunk_size: i64) -> ChunkWindows {
    debug_assert!(start <= end && chunk_size > 0);
    ChunkWindows {
        next_start: Some(start),
        end,
        chunk_size,
    }
}

/// Number of chunks `chunk_windows(start, end, chunk_size)` yields.
pub fn chunk_count(start: i64, end: i64, chunk_size: i64) -> u64 {
    debug_assert!(start <= end && chunk_size > 0);
    let len = i128::from(end) - i128::from(start);
    let size = i128::from(chunk_size);
    let count = (len + size - 1) / size;
    u64::try_from(count.max(1)).unwrap_or(u64::MAX)
}

/// Iterator over the chunks of a window.
#[derive(Debug, Clone)]
pub struct ChunkWindows {
    next_start: Option<i64>,
    end: i64,
    chunk_size: i64,
}

impl Iterator for ChunkWindows {
    type Item = TimeWindow;

    fn next(&mut self) -> Option<TimeWindow> {
        let chunk_start = self.next_start?;
        let chunk_end = chunk_start.saturating_add(self.chunk_size);
        if chunk_end >= self.end {
            self.next_start = None;
            return Some(TimeWindow::new(chunk_start, self.end));
        }
        self.next_start = Some(chunk_end);
        Some(TimeWindow::new(chunk_start, chunk_end - 1))
    }
}
