//! Storage implementations.

use std::sync::Arc;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tracing::info;

use crate::config::StorageConfig;
pub use crate::interfaces::order_store::{OrderStore, OrderTransaction, Result, StorageError};

pub mod helpers;
pub mod mock;
pub mod schema;
pub mod sqlite;

pub use mock::MockOrderStore;
pub use sqlite::SqliteOrderStore;

/// Initialize storage based on configuration.
///
/// Opens (creating if needed) the SQLite database and ensures the schema
/// exists.
pub async fn init_storage(config: &StorageConfig) -> Result<Arc<dyn OrderStore>> {
    info!(path = %config.path, "Storage: sqlite");

    if let Some(parent) = std::path::Path::new(&config.path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorageError::Database(sqlx::Error::Io(e)))?;
        }
    }

    let opts = SqliteConnectOptions::new()
        .filename(&config.path)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(config.busy_timeout_secs))
        .foreign_keys(true)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(opts)
        .await?;

    let store = SqliteOrderStore::new(pool);
    store.init_schema().await?;

    Ok(Arc::new(store))
}
