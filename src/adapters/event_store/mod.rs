//! Event Store adapters.

mod in_memory;
mod redis;

pub use self::redis::RedisEventStore;
pub use in_memory::InMemoryEventStore;
