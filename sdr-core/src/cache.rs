use serde::de::DeserializeOwned;
use shared_types::{EmailAnalysis, Prospect};
use std::sync::Arc;

use crate::error::EngagementError;
use crate::storage::KeyValueStore;

pub const ANALYZED_EMAILS_KEY: &str = "analyzed_emails";
pub const PROSPECTS_KEY: &str = "atlan_prospects";

/// Fast-render read path over the precomputed snapshots. Reads never fail:
/// a missing key, an unreachable store or a malformed blob all yield an
/// empty sequence.
#[derive(Clone)]
pub struct EngagementCache {
    store: Arc<dyn KeyValueStore>,
}

impl EngagementCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn cached_prospects(&self) -> Vec<Prospect> {
        self.read_sequence(PROSPECTS_KEY).await
    }

    pub async fn cached_analyzed_emails(&self) -> Vec<EmailAnalysis> {
        self.read_sequence(ANALYZED_EMAILS_KEY).await
    }

    async fn read_sequence<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("Cache read for '{}' failed: {}", key, e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Option<Vec<T>>>(&raw) {
            Ok(items) => items.unwrap_or_default(),
            Err(e) => {
                let err = EngagementError::Parse(e.to_string());
                tracing::warn!("Ignoring cached '{}': {}", key, err);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteKvStore;

    fn cache_with(entries: &[(&str, &str)]) -> (tempfile::TempDir, Arc<SqliteKvStore>, EngagementCache) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(SqliteKvStore::open(&dir.path().join("cache.sqlite")).unwrap());
        for (key, value) in entries {
            store.set(key, value).unwrap();
        }
        let cache = EngagementCache::new(store.clone());
        (dir, store, cache)
    }

    #[tokio::test]
    async fn test_absent_key_is_empty() {
        let (_dir, _store, cache) = cache_with(&[]);
        assert!(cache.cached_prospects().await.is_empty());
        assert!(cache.cached_analyzed_emails().await.is_empty());
    }

    #[tokio::test]
    async fn test_reads_snapshot() {
        let (_dir, _store, cache) = cache_with(&[(
            PROSPECTS_KEY,
            r#"[{"author": "John Doe", "company": "Tech Corp", "alignment_score": 0.85, "isProspect": true}]"#,
        )]);
        let prospects = cache.cached_prospects().await;
        assert_eq!(prospects.len(), 1);
        assert_eq!(prospects[0].author, "John Doe");
    }

    #[tokio::test]
    async fn test_malformed_or_null_blob_is_empty() {
        let (_dir, _store, cache) = cache_with(&[
            (PROSPECTS_KEY, "not json"),
            (ANALYZED_EMAILS_KEY, "null"),
        ]);
        assert!(cache.cached_prospects().await.is_empty());
        assert!(cache.cached_analyzed_emails().await.is_empty());
    }

    #[tokio::test]
    async fn test_closed_store_is_empty() {
        let (_dir, store, cache) = cache_with(&[(PROSPECTS_KEY, "[]")]);
        store.close();
        assert!(cache.cached_prospects().await.is_empty());
    }
}
