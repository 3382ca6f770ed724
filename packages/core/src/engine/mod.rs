//! GraphEngine - Call Contract Facade
//!
//! `GraphEngine` is the entry point for callers such as an HTTP layer or a
//! CLI. It wires the services over one storage root and exposes each
//! operation as a `GraphResponse`, so no failure escapes as anything but a
//! structured result.
//!
//! # Concurrency
//!
//! Every mutating operation holds the engine's write lock for its whole
//! read-modify-write cycle. Mutations through one engine are therefore
//! serialised; reads do not take the lock. Two engines over the same storage
//! root are not coordinated.
//!
//! # Examples
//!
//! ```rust
//! use issuegraph_core::engine::GraphEngine;
//! use issuegraph_core::models::{CreateLinkRequest, CreateNodeRequest};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let engine = GraphEngine::in_memory();
//! engine.initialize_default_types().await;
//!
//! engine.create_node(CreateNodeRequest::new("bug", "Crash on save")).await;
//! engine.create_node(CreateNodeRequest::new("task", "Fix save")).await;
//!
//! let linked = engine
//!     .create_link("bug", "Bug-1", CreateLinkRequest::new("blocks", "Task-1"))
//!     .await;
//! assert!(linked.success);
//! # }
//! ```

mod response;

pub use response::GraphResponse;

use crate::config::{ConfigError, GraphConfig};
use crate::db::{open_storage, GraphRepository, MemoryStorage, OpenStorageError, PathResolver, Storage};
use crate::models::{
    CreateLinkRequest, CreateNodeRequest, GlobalIndex, LinkType, NewLinkType, NewNodeType, Node,
    NodeLink, NodeSummary, NodeType, NodeTypeUpdate, NodeUpdate, TypeIndex,
};
use crate::services::{
    GraphError, IndexService, LinkCreated, LinkDeleted, LinkService, NodeDeleted, NodeService,
    TypeService,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

/// Failure to bring up an engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to open storage: {0}")]
    Open(#[from] OpenStorageError),

    #[error("Failed to seed default types: {0}")]
    Seed(#[from] GraphError),
}

impl From<ConfigError> for EngineError {
    fn from(error: ConfigError) -> Self {
        Self::Open(OpenStorageError::Config(error))
    }
}

/// Graph consistency engine over one storage root
pub struct GraphEngine {
    repository: Arc<GraphRepository>,
    types: TypeService,
    nodes: NodeService,
    links: LinkService,
    index: IndexService,
    write_lock: Mutex<()>,
}

impl GraphEngine {
    /// Wire the services over an existing storage backend
    pub fn new(storage: Arc<dyn Storage>, paths: PathResolver) -> Self {
        let repository = Arc::new(GraphRepository::new(storage, paths));
        let types = TypeService::new(repository.clone());
        let index = IndexService::new(repository.clone());
        let links = LinkService::new(repository.clone(), types.clone());
        let nodes = NodeService::new(
            repository.clone(),
            types.clone(),
            index.clone(),
            links.clone(),
        );
        Self {
            repository,
            types,
            nodes,
            links,
            index,
            write_lock: Mutex::new(()),
        }
    }

    /// Empty engine over memory storage; no types registered
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()), PathResolver::default())
    }

    /// Open the configured backend and seed default types if requested
    pub async fn open(config: &GraphConfig) -> Result<Self, EngineError> {
        let storage = open_storage(config).await?;
        let engine = Self::new(storage, PathResolver::new(config.base_path.clone()));
        if config.seed_defaults {
            engine.types.initialize_default_types().await?;
        }
        tracing::info!(
            "Graph engine ready ({} backend, base path '{}')",
            config.backend,
            engine.repository.paths().base_path()
        );
        Ok(engine)
    }

    /// Open from `ISSUEGRAPH_*` environment variables
    pub async fn from_env() -> Result<Self, EngineError> {
        let config = GraphConfig::from_env()?;
        Self::open(&config).await
    }

    pub fn repository(&self) -> &Arc<GraphRepository> {
        &self.repository
    }

    pub fn types(&self) -> &TypeService {
        &self.types
    }

    pub fn nodes(&self) -> &NodeService {
        &self.nodes
    }

    pub fn links(&self) -> &LinkService {
        &self.links
    }

    pub fn index(&self) -> &IndexService {
        &self.index
    }

    // Node types

    pub async fn list_node_types(&self) -> GraphResponse<Vec<NodeType>> {
        GraphResponse::from_result("list_node_types", self.types.list_node_types().await)
    }

    pub async fn get_node_type(&self, name: &str) -> GraphResponse<NodeType> {
        let result = self
            .types
            .get_node_type(name)
            .await
            .and_then(|found| found.ok_or_else(|| GraphError::not_found(format!("node type {}", name))));
        GraphResponse::from_result("get_node_type", result)
    }

    pub async fn create_node_type(&self, new_type: NewNodeType) -> GraphResponse<NodeType> {
        let _guard = self.write_lock.lock().await;
        let name = new_type.name.clone();
        match self.types.create_node_type(new_type).await {
            Ok(Some(created)) => GraphResponse::ok(created),
            Ok(None) => GraphResponse::refused(format!("Node type '{}' already exists", name)),
            Err(error) => GraphResponse::from_result("create_node_type", Err(error)),
        }
    }

    pub async fn update_node_type(
        &self,
        name: &str,
        update: NodeTypeUpdate,
    ) -> GraphResponse<NodeType> {
        let _guard = self.write_lock.lock().await;
        GraphResponse::from_result(
            "update_node_type",
            self.types.update_node_type(name, update).await,
        )
    }

    pub async fn delete_node_type(&self, name: &str) -> GraphResponse<bool> {
        let _guard = self.write_lock.lock().await;
        match self.types.delete_node_type(name).await {
            Ok(true) => GraphResponse::ok(true),
            Ok(false) => GraphResponse::refused(format!(
                "Node type '{}' still has nodes and cannot be deleted",
                name
            )),
            Err(error) => GraphResponse::from_result("delete_node_type", Err(error)),
        }
    }

    // Link types

    pub async fn list_link_types(&self) -> GraphResponse<Vec<LinkType>> {
        GraphResponse::from_result("list_link_types", self.types.list_link_types().await)
    }

    pub async fn get_link_type(&self, verb: &str) -> GraphResponse<LinkType> {
        let result = self
            .types
            .get_link_type(verb)
            .await
            .and_then(|found| found.ok_or_else(|| GraphError::unknown_verb(verb)));
        GraphResponse::from_result("get_link_type", result)
    }

    pub async fn create_link_type(&self, new_type: NewLinkType) -> GraphResponse<LinkType> {
        let _guard = self.write_lock.lock().await;
        let verb = new_type.verb.clone();
        match self.types.create_link_type(new_type).await {
            Ok(Some(created)) => GraphResponse::ok(created),
            Ok(None) => GraphResponse::refused(format!("Link type '{}' already exists", verb)),
            Err(error) => GraphResponse::from_result("create_link_type", Err(error)),
        }
    }

    pub async fn delete_link_type(&self, verb: &str) -> GraphResponse<bool> {
        let _guard = self.write_lock.lock().await;
        let result = self.types.delete_link_type(verb).await.and_then(|removed| {
            if removed {
                Ok(true)
            } else {
                Err(GraphError::unknown_verb(verb))
            }
        });
        GraphResponse::from_result("delete_link_type", result)
    }

    /// Register missing default types; data is the number added
    pub async fn initialize_default_types(&self) -> GraphResponse<usize> {
        let _guard = self.write_lock.lock().await;
        GraphResponse::from_result(
            "initialize_default_types",
            self.types.initialize_default_types().await,
        )
    }

    // Nodes

    pub async fn create_node(&self, request: CreateNodeRequest) -> GraphResponse<Node> {
        let _guard = self.write_lock.lock().await;
        GraphResponse::from_result("create_node", self.nodes.create_node(request).await)
    }

    pub async fn get_node(&self, node_type: &str, label: &str) -> GraphResponse<Node> {
        let result = self
            .nodes
            .get_node(node_type, label)
            .await
            .and_then(|found| found.ok_or_else(|| GraphError::not_found(format!("node {}", label))));
        GraphResponse::from_result("get_node", result)
    }

    pub async fn node_exists(&self, node_type: &str, label: &str) -> GraphResponse<bool> {
        GraphResponse::from_result("node_exists", self.nodes.node_exists(node_type, label).await)
    }

    pub async fn list_nodes(&self, node_type: Option<&str>) -> GraphResponse<Vec<NodeSummary>> {
        GraphResponse::from_result("list_nodes", self.nodes.list_nodes(node_type).await)
    }

    pub async fn update_node(
        &self,
        node_type: &str,
        label: &str,
        update: NodeUpdate,
    ) -> GraphResponse<Node> {
        let _guard = self.write_lock.lock().await;
        GraphResponse::from_result(
            "update_node",
            self.nodes.update_node(node_type, label, update).await,
        )
    }

    pub async fn delete_node(&self, node_type: &str, label: &str) -> GraphResponse<NodeDeleted> {
        let _guard = self.write_lock.lock().await;
        GraphResponse::from_result("delete_node", self.nodes.delete_node(node_type, label).await)
    }

    // Attachments

    pub async fn save_attachment(
        &self,
        node_type: &str,
        label: &str,
        filename: &str,
        data: &[u8],
    ) -> GraphResponse<()> {
        let _guard = self.write_lock.lock().await;
        GraphResponse::from_result(
            "save_attachment",
            self.nodes
                .save_attachment(node_type, label, filename, data)
                .await,
        )
    }

    pub async fn load_attachment(
        &self,
        node_type: &str,
        label: &str,
        filename: &str,
    ) -> GraphResponse<Vec<u8>> {
        let result = self
            .nodes
            .load_attachment(node_type, label, filename)
            .await
            .and_then(|found| {
                found.ok_or_else(|| {
                    GraphError::not_found(format!("attachment {} on {}", filename, label))
                })
            });
        GraphResponse::from_result("load_attachment", result)
    }

    pub async fn delete_attachment(
        &self,
        node_type: &str,
        label: &str,
        filename: &str,
    ) -> GraphResponse<bool> {
        let _guard = self.write_lock.lock().await;
        GraphResponse::from_result(
            "delete_attachment",
            self.nodes
                .delete_attachment(node_type, label, filename)
                .await,
        )
    }

    // Links

    pub async fn create_link(
        &self,
        source_type: &str,
        source_label: &str,
        request: CreateLinkRequest,
    ) -> GraphResponse<LinkCreated> {
        let _guard = self.write_lock.lock().await;
        GraphResponse::from_result(
            "create_link",
            self.links
                .create_link(source_type, source_label, &request)
                .await,
        )
    }

    pub async fn delete_link(
        &self,
        source_type: &str,
        source_label: &str,
        target_label: &str,
    ) -> GraphResponse<LinkDeleted> {
        let _guard = self.write_lock.lock().await;
        GraphResponse::from_result(
            "delete_link",
            self.links
                .delete_link(source_type, source_label, target_label)
                .await,
        )
    }

    pub async fn list_links(&self, node_type: &str, label: &str) -> GraphResponse<Vec<NodeLink>> {
        GraphResponse::from_result("list_links", self.links.list_links(node_type, label).await)
    }

    // Indices

    pub async fn global_index(&self) -> GraphResponse<GlobalIndex> {
        GraphResponse::from_result("global_index", self.index.global_index().await)
    }

    pub async fn type_index(&self, node_type: &str) -> GraphResponse<TypeIndex> {
        GraphResponse::from_result("type_index", self.index.type_index(node_type).await)
    }

    pub async fn refresh_global_index(&self) -> GraphResponse<GlobalIndex> {
        let _guard = self.write_lock.lock().await;
        GraphResponse::from_result(
            "refresh_global_index",
            self.index.refresh_global_index().await,
        )
    }

    pub async fn reconcile_type_index(&self, node_type: &str) -> GraphResponse<TypeIndex> {
        let _guard = self.write_lock.lock().await;
        GraphResponse::from_result(
            "reconcile_type_index",
            self.index.reconcile_type_index(node_type).await,
        )
    }

    /// Remove every document, types included
    pub async fn clear_storage(&self) -> GraphResponse<()> {
        let _guard = self.write_lock.lock().await;
        GraphResponse::from_result(
            "clear_storage",
            self.repository.clear_storage().await.map_err(GraphError::from),
        )
    }
}
