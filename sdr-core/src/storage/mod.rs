pub mod redis_store;
pub mod sqlite_store;

pub use redis_store::RedisKvStore;
pub use sqlite_store::SqliteKvStore;

use async_trait::async_trait;

use crate::error::Result;

/// Read side of the external key-value store that holds precomputed
/// snapshots. Values are JSON text; a missing key is `Ok(None)`.
///
/// Opened once at startup and closed on shutdown; reads after `close` fail
/// with a storage error.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    fn is_open(&self) -> bool;

    fn close(&self);
}
