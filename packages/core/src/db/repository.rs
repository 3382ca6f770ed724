//! GraphRepository - Typed Document Access
//!
//! Loads and saves every graph document as pretty-printed JSON through a
//! `Storage` backend, using `PathResolver` for keys. The repository holds no
//! cached state: each call goes to storage.
//!
//! # Examples
//!
//! ```rust
//! use issuegraph_core::db::{GraphRepository, MemoryStorage, PathResolver};
//! use issuegraph_core::models::Node;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), issuegraph_core::db::StorageError> {
//! let repo = GraphRepository::new(Arc::new(MemoryStorage::new()), PathResolver::default());
//! let node = Node::new("bug", 1, "Crash on save", "backlog");
//! repo.node_save(&node).await?;
//! assert_eq!(repo.node_load("bug", "Bug-1").await?, Some(node));
//! # Ok(())
//! # }
//! ```

use crate::db::catalog::KeyedCatalog;
use crate::db::{PathResolver, Storage, StorageError};
use crate::models::{GlobalIndex, LinkType, Node, NodeType, TypeIndex};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Typed JSON access to graph documents
pub struct GraphRepository {
    storage: Arc<dyn Storage>,
    paths: PathResolver,
    node_types: KeyedCatalog<NodeType>,
    link_types: KeyedCatalog<LinkType>,
}

impl GraphRepository {
    pub fn new(storage: Arc<dyn Storage>, paths: PathResolver) -> Self {
        let node_types = KeyedCatalog::new(storage.clone(), paths.node_types());
        let link_types = KeyedCatalog::new(storage.clone(), paths.link_types());
        Self {
            storage,
            paths,
            node_types,
            link_types,
        }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub fn paths(&self) -> &PathResolver {
        &self.paths
    }

    async fn load_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.storage.read(key).await? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| StorageError::document(key, e)),
            None => Ok(None),
        }
    }

    async fn save_json<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(value).map_err(|e| StorageError::document(key, e))?;
        self.storage.write(key, &bytes).await
    }

    // Nodes

    pub async fn node_save(&self, node: &Node) -> Result<(), StorageError> {
        let key = self.paths.node(&node.node_type, &node.label);
        self.save_json(&key, node).await
    }

    pub async fn node_load(&self, node_type: &str, label: &str) -> Result<Option<Node>, StorageError> {
        self.load_json(&self.paths.node(node_type, label)).await
    }

    /// Remove a node document; returns whether it existed
    pub async fn node_delete(&self, node_type: &str, label: &str) -> Result<bool, StorageError> {
        self.storage.delete(&self.paths.node(node_type, label)).await
    }

    pub async fn node_exists(&self, node_type: &str, label: &str) -> Result<bool, StorageError> {
        self.storage.exists(&self.paths.node(node_type, label)).await
    }

    // Indices

    /// Load a type's index, or a fresh one if the type never held a node
    pub async fn type_index_load(&self, node_type: &str) -> Result<TypeIndex, StorageError> {
        Ok(self
            .load_json(&self.paths.type_index(node_type))
            .await?
            .unwrap_or_else(|| TypeIndex::new(node_type)))
    }

    pub async fn type_index_save(&self, index: &TypeIndex) -> Result<(), StorageError> {
        self.save_json(&self.paths.type_index(&index.node_type), index)
            .await
    }

    pub async fn global_index_load(&self) -> Result<GlobalIndex, StorageError> {
        Ok(self
            .load_json(&self.paths.global_index())
            .await?
            .unwrap_or_default())
    }

    pub async fn global_index_save(&self, index: &GlobalIndex) -> Result<(), StorageError> {
        self.save_json(&self.paths.global_index(), index).await
    }

    // Catalogues

    pub fn node_types(&self) -> &KeyedCatalog<NodeType> {
        &self.node_types
    }

    pub fn link_types(&self) -> &KeyedCatalog<LinkType> {
        &self.link_types
    }

    // Attachments

    pub async fn attachment_save(
        &self,
        node_type: &str,
        label: &str,
        filename: &str,
        data: &[u8],
    ) -> Result<(), StorageError> {
        self.storage
            .write(&self.paths.attachment(node_type, label, filename), data)
            .await
    }

    pub async fn attachment_load(
        &self,
        node_type: &str,
        label: &str,
        filename: &str,
    ) -> Result<Option<Vec<u8>>, StorageError> {
        self.storage
            .read(&self.paths.attachment(node_type, label, filename))
            .await
    }

    pub async fn attachment_delete(
        &self,
        node_type: &str,
        label: &str,
        filename: &str,
    ) -> Result<bool, StorageError> {
        self.storage
            .delete(&self.paths.attachment(node_type, label, filename))
            .await
    }

    /// Remove every document from the backing storage
    pub async fn clear_storage(&self) -> Result<(), StorageError> {
        tracing::warn!(
            "Clearing all graph documents from {} storage",
            self.storage.backend_name()
        );
        self.storage.clear().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStorage;

    fn repository() -> GraphRepository {
        GraphRepository::new(Arc::new(MemoryStorage::new()), PathResolver::default())
    }

    #[tokio::test]
    async fn test_node_round_trip_and_delete() {
        let repo = repository();
        let node = Node::new("task", 3, "Write docs", "todo");

        repo.node_save(&node).await.unwrap();
        assert!(repo.node_exists("task", "Task-3").await.unwrap());
        assert_eq!(repo.node_load("task", "Task-3").await.unwrap(), Some(node));

        assert!(repo.node_delete("task", "Task-3").await.unwrap());
        assert!(repo.node_load("task", "Task-3").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_type_index_is_fresh() {
        let repo = repository();
        let index = repo.type_index_load("bug").await.unwrap();
        assert_eq!(index, TypeIndex::new("bug"));
    }

    #[tokio::test]
    async fn test_documents_are_pretty_printed() {
        let repo = repository();
        let mut index = TypeIndex::new("bug");
        index.record_created();
        repo.type_index_save(&index).await.unwrap();

        let raw = repo
            .storage()
            .read(".issues/data/bug/_index.json")
            .await
            .unwrap()
            .unwrap();
        let text = String::from_utf8(raw).unwrap();
        assert!(text.contains("\n  \"next_index\": 2"));
    }

    #[tokio::test]
    async fn test_attachments() {
        let repo = repository();
        repo.attachment_save("bug", "Bug-1", "trace.log", b"boom")
            .await
            .unwrap();
        assert_eq!(
            repo.attachment_load("bug", "Bug-1", "trace.log")
                .await
                .unwrap(),
            Some(b"boom".to_vec())
        );
        assert!(repo
            .attachment_delete("bug", "Bug-1", "trace.log")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_clear_storage_empties_everything() {
        let repo = repository();
        repo.global_index_save(&GlobalIndex::default()).await.unwrap();
        repo.clear_storage().await.unwrap();
        assert!(!repo.storage().exists(".issues/_index.json").await.unwrap());
    }
}
