//! Keyed Catalogue Documents
//!
//! Node types and link types are each persisted as one JSON document holding
//! a list of entries (`{"types": [...]}`, `{"link_types": [...]}`). This module
//! exposes such a document as a keyed store: entries are addressed by their
//! unique key (type name, verb) and changed through `insert_if_absent`,
//! `upsert` and `remove` instead of whole-list load/mutate/save by callers.
//!
//! # Concurrency
//!
//! Every read-modify-write of a catalogue document runs under an async mutex
//! owned by the `KeyedCatalog`, so two tasks sharing one repository cannot
//! interleave and drop each other's entries. Plain reads do not lock.

use crate::db::{Storage, StorageError};
use crate::models::{LinkType, NodeType};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::Mutex;

/// An entry of a keyed catalogue document
pub trait CatalogEntry: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// Top-level field of the document holding the entry list
    const FIELD: &'static str;

    /// Unique key of this entry
    fn key(&self) -> &str;
}

impl CatalogEntry for NodeType {
    const FIELD: &'static str = "types";

    fn key(&self) -> &str {
        &self.name
    }
}

impl CatalogEntry for LinkType {
    const FIELD: &'static str = "link_types";

    fn key(&self) -> &str {
        &self.verb
    }
}

/// One catalogue document addressed by entry key
pub struct KeyedCatalog<T> {
    storage: Arc<dyn Storage>,
    path: String,
    write_lock: Mutex<()>,
    _entry: PhantomData<fn() -> T>,
}

impl<T: CatalogEntry> KeyedCatalog<T> {
    pub fn new(storage: Arc<dyn Storage>, path: impl Into<String>) -> Self {
        Self {
            storage,
            path: path.into(),
            write_lock: Mutex::new(()),
            _entry: PhantomData,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// All entries in stored order; a missing document is an empty catalogue
    pub async fn list(&self) -> Result<Vec<T>, StorageError> {
        let Some(bytes) = self.storage.read(&self.path).await? else {
            return Ok(Vec::new());
        };
        let document: Value = serde_json::from_slice(&bytes)
            .map_err(|e| StorageError::document(self.path.clone(), e))?;
        match document.get(T::FIELD) {
            Some(entries) => serde_json::from_value(entries.clone())
                .map_err(|e| StorageError::document(self.path.clone(), e)),
            None => Ok(Vec::new()),
        }
    }

    pub async fn get(&self, key: &str) -> Result<Option<T>, StorageError> {
        Ok(self.list().await?.into_iter().find(|entry| entry.key() == key))
    }

    pub async fn contains(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.get(key).await?.is_some())
    }

    /// Append `entry` unless its key is taken; returns whether it was added
    pub async fn insert_if_absent(&self, entry: T) -> Result<bool, StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.list().await?;
        if entries.iter().any(|existing| existing.key() == entry.key()) {
            return Ok(false);
        }
        entries.push(entry);
        self.save(&entries).await?;
        Ok(true)
    }

    /// Replace the entry with the same key in place, or append it
    pub async fn upsert(&self, entry: T) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.list().await?;
        match entries
            .iter_mut()
            .find(|existing| existing.key() == entry.key())
        {
            Some(existing) => *existing = entry,
            None => entries.push(entry),
        }
        self.save(&entries).await
    }

    /// Remove the entry with `key`; returns the removed entry
    pub async fn remove(&self, key: &str) -> Result<Option<T>, StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.list().await?;
        let Some(position) = entries.iter().position(|entry| entry.key() == key) else {
            return Ok(None);
        };
        let removed = entries.remove(position);
        self.save(&entries).await?;
        Ok(Some(removed))
    }

    async fn save(&self, entries: &[T]) -> Result<(), StorageError> {
        let list =
            serde_json::to_value(entries).map_err(|e| StorageError::document(self.path.clone(), e))?;
        let mut document = Map::new();
        document.insert(T::FIELD.to_string(), list);
        let bytes = serde_json::to_vec_pretty(&Value::Object(document))
            .map_err(|e| StorageError::document(self.path.clone(), e))?;
        self.storage.write(&self.path, &bytes).await
    }
}
