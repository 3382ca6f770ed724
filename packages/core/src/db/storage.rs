//! Storage Trait - Storage Surface Abstraction
//!
//! This module defines the `Storage` trait: a byte-addressable key/value
//! surface keyed by path-like strings. Every document the graph engine
//! persists (nodes, indices, type catalogues, attachments) goes through it.
//!
//! # Architecture
//!
//! - **Capability interface**: five operations, no transactions, no locking
//! - **Multiple Backends**: memory, local disk, embedded SQL (libsql), zip archive
//! - **Selected by configuration**: see `db::open_storage`
//!
//! Any multi-document consistency the engine provides is built above this
//! layer by sequencing independent read-modify-write calls.
//!
//! # Examples
//!
//! ```rust
//! use issuegraph_core::db::{MemoryStorage, Storage};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), issuegraph_core::db::StorageError> {
//! let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
//! storage.write("config/settings.json", b"{}").await?;
//! assert!(storage.exists("config/settings.json").await?);
//! # Ok(())
//! # }
//! ```

use crate::db::StorageError;
use async_trait::async_trait;

/// Byte-addressable key/value storage surface
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so one instance can be shared as
/// `Arc<dyn Storage>` across tasks.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Whether a value is stored under `key`
    async fn exists(&self, key: &str) -> Result<bool, StorageError>;

    /// Read the bytes stored under `key`
    ///
    /// - `Ok(Some(bytes))` if present
    /// - `Ok(None)` if absent (not an error)
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Store `data` under `key`, replacing any previous value
    async fn write(&self, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Remove `key`; returns whether anything was removed
    async fn delete(&self, key: &str) -> Result<bool, StorageError>;

    /// Remove every stored key
    async fn clear(&self) -> Result<(), StorageError>;

    /// Short backend name for logs
    fn backend_name(&self) -> &'static str;
}
