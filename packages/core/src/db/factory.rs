//! Backend selection from configuration

use crate::config::{ConfigError, GraphConfig, StorageBackend};
use crate::db::{LocalDiskStorage, MemoryStorage, SqliteStorage, Storage, StorageError, ZipStorage};
use std::sync::Arc;
use thiserror::Error;

/// Failure to open the configured backend
#[derive(Debug, Error)]
pub enum OpenStorageError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Open the storage backend named by `config.backend`
pub async fn open_storage(config: &GraphConfig) -> Result<Arc<dyn Storage>, OpenStorageError> {
    config.validate()?;
    let missing = || ConfigError::MissingPath {
        backend: config.backend,
    };

    let storage: Arc<dyn Storage> = match config.backend {
        StorageBackend::Memory => Arc::new(MemoryStorage::new()),
        StorageBackend::LocalDisk => {
            let root = config.root.clone().ok_or_else(missing)?;
            Arc::new(LocalDiskStorage::new(root))
        }
        StorageBackend::Sqlite => {
            let db_path = config.db_path.clone().ok_or_else(missing)?;
            Arc::new(SqliteStorage::open(db_path).await?)
        }
        StorageBackend::Zip => {
            let zip_path = config.zip_path.clone().ok_or_else(missing)?;
            Arc::new(ZipStorage::open(zip_path).await?)
        }
    };

    tracing::info!("Using {} storage backend", storage.backend_name());
    Ok(storage)
}
