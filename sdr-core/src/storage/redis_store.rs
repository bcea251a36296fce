use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::sync::RwLock;

use super::KeyValueStore;
use crate::error::{EngagementError, Result};

/// Redis-backed snapshot store, shared with the analysis jobs that write
/// `atlan_prospects` and `analyzed_emails`.
pub struct RedisKvStore {
    connection: RwLock<Option<ConnectionManager>>,
}

impl RedisKvStore {
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let address = client.get_connection_info().addr.to_string();
        let connection = client.get_connection_manager().await?;

        tracing::info!("Connected to key-value cache at {}", address);

        Ok(Self {
            connection: RwLock::new(Some(connection)),
        })
    }

    fn connection(&self) -> Result<ConnectionManager> {
        let guard = self
            .connection
            .read()
            .map_err(|_| EngagementError::Storage("Cache lock poisoned".to_string()))?;
        guard
            .clone()
            .ok_or_else(|| EngagementError::Storage("Cache store is closed".to_string()))
    }
}

#[async_trait]
impl KeyValueStore for RedisKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut connection = self.connection()?;
        let value: Option<String> = connection.get(key).await?;
        Ok(value)
    }

    fn is_open(&self) -> bool {
        self.connection.read().map(|g| g.is_some()).unwrap_or(false)
    }

    fn close(&self) {
        if let Ok(mut guard) = self.connection.write() {
            if guard.take().is_some() {
                tracing::info!("Closed key-value cache connection");
            }
        }
    }
}
