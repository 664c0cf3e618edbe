//! EventStore port - key-value store backing dedupe and ordering records.
//!
//! Every key carries a TTL; records expire passively and are never deleted
//! explicitly. The two conditional writes close the read-then-write races
//! between concurrent deliveries of the same event or the same object.

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::webhook::StoreError;

/// Port for the external key-value Event Store.
///
/// Values are JSON documents. [`set_if_not_older`](EventStore::set_if_not_older)
/// reads the `timestamp` member of the stored document.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Fetch the value at `key`, if present and not expired.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Unconditionally write `value` at `key` with a TTL.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Write only if `key` is absent. Returns `true` if this call wrote.
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration)
        -> Result<bool, StoreError>;

    /// Write unless the stored document's `timestamp` is newer than `timestamp`.
    ///
    /// Returns `None` when written, or `Some(current)` with the stored value
    /// that caused the rejection. Equal timestamps are written.
    async fn set_if_not_older(
        &self,
        key: &str,
        value: &str,
        timestamp: i64,
        ttl: Duration,
    ) -> Result<Option<String>, StoreError>;
}
