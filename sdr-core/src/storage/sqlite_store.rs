use async_trait::async_trait;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OptionalExtension;
use std::path::Path;
use std::sync::RwLock;
use std::time::Duration;

use super::KeyValueStore;
use crate::error::{EngagementError, Result};

/// SQLite-backed snapshot store for local runs without a shared cache.
pub struct SqliteKvStore {
    pool: RwLock<Option<Pool<SqliteConnectionManager>>>,
}

impl SqliteKvStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                EngagementError::Storage(format!("Failed to create cache directory: {}", e))
            })?;
        }

        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.busy_timeout(Duration::from_secs(5))?;
            Ok(())
        });
        let pool = Pool::builder().max_size(4).build(manager)?;

        pool.get()?.execute(
            "CREATE TABLE IF NOT EXISTS kv_cache (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            [],
        )?;

        tracing::info!("Opened key-value cache at {:?}", path);

        Ok(Self {
            pool: RwLock::new(Some(pool)),
        })
    }

    fn pool(&self) -> Result<Pool<SqliteConnectionManager>> {
        let guard = self
            .pool
            .read()
            .map_err(|_| EngagementError::Storage("Cache lock poisoned".to_string()))?;
        guard
            .clone()
            .ok_or_else(|| EngagementError::Storage("Cache store is closed".to_string()))
    }

    /// Write path for the process that populates snapshots.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.pool()?.get()?;
        let now = chrono::Utc::now().timestamp_millis();
        conn.execute(
            "INSERT INTO kv_cache (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            rusqlite::params![key, value, now],
        )?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for SqliteKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.pool()?.get()?;
        let value = conn
            .query_row("SELECT value FROM kv_cache WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn is_open(&self) -> bool {
        self.pool.read().map(|g| g.is_some()).unwrap_or(false)
    }

    fn close(&self) {
        if let Ok(mut guard) = self.pool.write() {
            if guard.take().is_some() {
                tracing::info!("Closed key-value cache");
            }
        }
    }
}
