//! Redis-backed Event Store for production deployments.
//!
//! - Plain writes use `SET key value EX ttl`
//! - Dedupe writes use `SET key value NX EX ttl`
//! - Ordering writes run a Lua compare-and-swap on the stored `timestamp`

use async_trait::async_trait;
use once_cell::sync::Lazy;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::time::Duration;

use crate::domain::webhook::StoreError;
use crate::ports::EventStore;

/// Returns the current value when it is newer than ARGV[2], otherwise writes
/// ARGV[1] with TTL ARGV[3] and returns nil.
static SET_IF_NOT_OLDER: Lazy<redis::Script> = Lazy::new(|| {
    redis::Script::new(
        r#"
local current = redis.call('GET', KEYS[1])
if current then
  local ok, decoded = pcall(cjson.decode, current)
  if ok and type(decoded) == 'table' then
    local stored = tonumber(decoded['timestamp'])
    if stored and stored > tonumber(ARGV[2]) then
      return current
    end
  end
end
redis.call('SET', KEYS[1], ARGV[1], 'EX', ARGV[3])
return false
"#,
    )
});

/// Redis [`EventStore`] over a multiplexed connection.
#[derive(Clone)]
pub struct RedisEventStore {
    conn: MultiplexedConnection,
}

impl RedisEventStore {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }
}

/// Redis rejects `EX 0`.
fn ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

fn unavailable(e: redis::RedisError) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

#[async_trait]
impl EventStore for RedisEventStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        conn.get(key).await.map_err(unavailable)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(ttl_secs(ttl))
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(unavailable)
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(ttl_secs(ttl))
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(reply.is_some())
    }

    async fn set_if_not_older(
        &self,
        key: &str,
        value: &str,
        timestamp: i64,
        ttl: Duration,
    ) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        SET_IF_NOT_OLDER
            .key(key)
            .arg(value)
            .arg(timestamp)
            .arg(ttl_secs(ttl))
            .invoke_async(&mut conn)
            .await
            .map_err(unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_is_at_least_one_second() {
        assert_eq!(ttl_secs(Duration::from_millis(10)), 1);
        assert_eq!(ttl_secs(Duration::from_secs(3_600)), 3_600);
    }

    // Round-trip tests against a live server:
    //
    // #[tokio::test]
    // #[ignore] // Run with: cargo test -- --ignored
    // async fn test_redis_event_store() {
    //     let client = redis::Client::open("redis://127.0.0.1/").unwrap();
    //     let conn = client.get_multiplexed_tokio_connection().await.unwrap();
    //     let store = RedisEventStore::new(conn);
    //     // ... test code
    // }
}
