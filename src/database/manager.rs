use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::config::{StorageBackend, StorageConfig};
use crate::database::file::FileStore;
use crate::database::memory::MemoryStore;
use crate::database::postgres::PostgresStore;
use crate::database::store::Store;

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Builds the configured store at startup
pub struct DatabaseManager;

impl DatabaseManager {
    pub async fn connect(config: &StorageConfig) -> Result<Arc<dyn Store>, DatabaseError> {
        let store: Arc<dyn Store> = match config.backend {
            StorageBackend::Memory => Arc::new(MemoryStore::new()),
            StorageBackend::File => {
                let store = FileStore::open(&config.file_path).await?;
                info!("Project data file: {}", store.path().display());
                Arc::new(store)
            }
            StorageBackend::Postgres => {
                let url = config
                    .database_url
                    .as_deref()
                    .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;
                let store = PostgresStore::connect(url, config.max_connections).await?;
                store.migrate().await?;
                Arc::new(store)
            }
        };

        info!("Storage backend ready: {}", store.backend_name());
        Ok(store)
    }
}
