//! IssueGraph Core
//!
//! A typed issue graph persisted as JSON documents over a pluggable
//! key/value storage backend.
//!
//! # Architecture
//!
//! - **Typed nodes**: every node belongs to a registered `NodeType` and is
//!   labelled `Type-N` from a per-type counter that never reuses an index
//! - **Bidirectional links**: each link is two halves, one on each endpoint,
//!   written together and rolled back together
//! - **Indices**: a per-type counter document plus a derived global summary
//! - **Pluggable storage**: memory, local disk, libsql/SQLite or a zip archive
//!
//! # Modules
//!
//! - [`models`] - Persisted data structures and label helpers
//! - [`db`] - Storage backends, path layout and the document repository
//! - [`services`] - Type, node, link and index services
//! - [`engine`] - `GraphEngine`, the response-returning facade
//! - [`config`] - Backend selection from TOML or the environment
//!
//! # Example
//!
//! ```rust
//! use issuegraph_core::{CreateNodeRequest, GraphConfig, GraphEngine};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let engine = GraphEngine::open(&GraphConfig::memory()).await.unwrap();
//! let response = engine.create_node(CreateNodeRequest::new("task", "Write docs")).await;
//! assert_eq!(response.data.unwrap().label, "Task-1");
//! # }
//! ```

pub mod config;
pub mod db;
pub mod engine;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use config::{init_tracing, ConfigError, GraphConfig, StorageBackend};
pub use db::{GraphRepository, PathResolver, Storage, StorageError};
pub use engine::{EngineError, GraphEngine, GraphResponse};
pub use models::*;
pub use services::*;
