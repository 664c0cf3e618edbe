//! In-memory Event Store for tests and single-process development.
//!
//! Honours TTLs against an adjustable clock so expiry can be tested
//! without sleeping. Conditional writes take the write lock for the whole
//! read-compare-write, which makes them atomic within the process.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::domain::webhook::StoreError;
use crate::ports::EventStore;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

/// In-memory [`EventStore`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    /// Milliseconds added to the wall clock.
    skew_ms: Arc<AtomicU64>,
    writes_fail: Arc<AtomicBool>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move this store's clock forward.
    pub fn advance(&self, by: Duration) {
        self.skew_ms.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }

    /// Make every subsequent write fail with `Unavailable`.
    pub fn fail_writes(&self, fail: bool) {
        self.writes_fail.store(fail, Ordering::SeqCst);
    }

    /// Number of live keys.
    pub async fn len(&self) -> usize {
        let now = self.now();
        self.entries
            .read()
            .await
            .values()
            .filter(|entry| entry.expires_at > now)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn now(&self) -> Instant {
        Instant::now() + Duration::from_millis(self.skew_ms.load(Ordering::SeqCst))
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.writes_fail.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }

    fn entry(&self, value: &str, ttl: Duration) -> Entry {
        Entry {
            value: value.to_string(),
            expires_at: self.now() + ttl,
        }
    }

    fn live<'a>(&self, entries: &'a HashMap<String, Entry>, key: &str) -> Option<&'a Entry> {
        let now = self.now();
        entries.get(key).filter(|entry| entry.expires_at > now)
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.read().await;
        Ok(self.live(&entries, key).map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        self.check_writable()?;
        let entry = self.entry(value, ttl);
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        self.check_writable()?;
        let mut entries = self.entries.write().await;
        if self.live(&entries, key).is_some() {
            return Ok(false);
        }
        let entry = self.entry(value, ttl);
        entries.insert(key.to_string(), entry);
        Ok(true)
    }

    async fn set_if_not_older(
        &self,
        key: &str,
        value: &str,
        timestamp: i64,
        ttl: Duration,
    ) -> Result<Option<String>, StoreError> {
        self.check_writable()?;
        let mut entries = self.entries.write().await;

        if let Some(current) = self.live(&entries, key) {
            let stored = stored_timestamp(&current.value);
            if stored.is_some_and(|stored| stored > timestamp) {
                return Ok(Some(current.value.clone()));
            }
        }

        let entry = self.entry(value, ttl);
        entries.insert(key.to_string(), entry);
        Ok(None)
    }
}

/// `timestamp` member of a stored JSON document. Unreadable values never block a write.
fn stored_timestamp(value: &str) -> Option<i64> {
    serde_json::from_str::<serde_json::Value>(value)
        .ok()?
        .get("timestamp")?
        .as_i64()
}
