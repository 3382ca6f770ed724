//! MemoryStorage - In-Memory Storage Backend
//!
//! Keeps every key in a `HashMap` behind an async `RwLock`. Used by tests and
//! throwaway sessions; nothing survives the process.

use crate::db::error::validate_key;
use crate::db::{Storage, StorageError};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory storage backend
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub async fn len(&self) -> usize {
        self.files.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.files.read().await.is_empty()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        validate_key(key)?;
        Ok(self.files.read().await.contains_key(key))
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        validate_key(key)?;
        Ok(self.files.read().await.get(key).cloned())
    }

    async fn write(&self, key: &str, data: &[u8]) -> Result<(), StorageError> {
        validate_key(key)?;
        self.files
            .write()
            .await
            .insert(key.to_string(), data.to_vec());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        validate_key(key)?;
        Ok(self.files.write().await.remove(key).is_some())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.files.write().await.clear();
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_read_delete() {
        let storage = MemoryStorage::new();
        assert!(!storage.exists("a/b.json").await.unwrap());

        storage.write("a/b.json", b"hello").await.unwrap();
        assert!(storage.exists("a/b.json").await.unwrap());
        assert_eq!(
            storage.read("a/b.json").await.unwrap(),
            Some(b"hello".to_vec())
        );

        assert!(storage.delete("a/b.json").await.unwrap());
        assert!(!storage.delete("a/b.json").await.unwrap());
        assert_eq!(storage.read("a/b.json").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clear_removes_everything() {
        let storage = MemoryStorage::new();
        storage.write("x", b"1").await.unwrap();
        storage.write("y/z", b"2").await.unwrap();
        assert_eq!(storage.len().await, 2);

        storage.clear().await.unwrap();
        assert!(storage.is_empty().await);
    }

    #[tokio::test]
    async fn test_rejects_escaping_keys() {
        let storage = MemoryStorage::new();
        let result = storage.write("../outside", b"nope").await;
        assert!(matches!(result, Err(StorageError::InvalidKey { .. })));
    }
}
