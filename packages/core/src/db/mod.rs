//! Storage Layer
//!
//! This module provides everything between the graph services and raw bytes:
//!
//! - `Storage` - capability interface implemented once per backend
//! - `MemoryStorage`, `LocalDiskStorage`, `SqliteStorage`, `ZipStorage`
//! - `open_storage` - backend selection from `GraphConfig`
//! - `PathResolver` - storage key layout
//! - `KeyedCatalog` - node/link type catalogues with keyed updates
//! - `GraphRepository` - typed JSON documents over a `Storage`

mod catalog;
mod disk_store;
mod error;
mod factory;
mod memory_store;
mod paths;
mod repository;
mod sqlite_store;
mod storage;
mod zip_store;

pub use catalog::{CatalogEntry, KeyedCatalog};
pub use disk_store::LocalDiskStorage;
pub use error::{validate_key, StorageError};
pub use factory::{open_storage, OpenStorageError};
pub use memory_store::MemoryStorage;
pub use paths::{PathResolver, DEFAULT_BASE_PATH};
pub use repository::GraphRepository;
pub use sqlite_store::SqliteStorage;
pub use storage::Storage;
pub use zip_store::ZipStorage;
