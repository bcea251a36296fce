use std::path::{Path, PathBuf};
use std::sync::Arc;

use sdr_core::{KeyValueStore, RedisKvStore, SqliteKvStore};

use crate::database::Database;

/// Local email-record database inside the data directory
///
/// # Platform-specific defaults
///
/// - **macOS**: `~/Library/Application Support/sdr-dashboard/dashboard.sqlite`
/// - **Linux**: `~/.local/share/sdr-dashboard/dashboard.sqlite`
/// - **Windows**: `%APPDATA%\sdr-dashboard\dashboard.sqlite`
pub fn get_db_path(data_dir: &Path) -> PathBuf {
    data_dir.join("dashboard.sqlite")
}

/// Local snapshot store used when no Redis cache is configured
pub fn get_cache_path(data_dir: &Path) -> PathBuf {
    data_dir.join("cache.sqlite")
}

pub fn initialize_database(data_dir: &Path) -> anyhow::Result<Arc<Database>> {
    let db = Database::new(&get_db_path(data_dir))?;
    Ok(Arc::new(db))
}

pub fn open_local_cache(data_dir: &Path) -> anyhow::Result<Arc<SqliteKvStore>> {
    let store = SqliteKvStore::open(&get_cache_path(data_dir))?;
    Ok(Arc::new(store))
}

pub async fn open_cache_store(
    redis_url: Option<&str>,
    data_dir: &Path,
) -> anyhow::Result<Arc<dyn KeyValueStore>> {
    match redis_url {
        Some(url) => Ok(Arc::new(RedisKvStore::connect(url).await?)),
        None => Ok(open_local_cache(data_dir)?),
    }
}
