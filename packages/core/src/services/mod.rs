//! Graph Services
//!
//! This module contains the graph consistency logic:
//!
//! - `TypeService` - node type and link type registry
//! - `NodeService` - node CRUD, label minting, attachments
//! - `LinkService` - paired link creation/removal with compensation
//! - `IndexService` - per-type and global index maintenance
//!
//! Services share one `GraphRepository` and keep no state of their own;
//! every call re-reads what it mutates.

pub mod error;
pub mod index_service;
pub mod link_service;
pub mod node_service;
pub mod type_service;

pub use error::{GraphError, GraphErrorKind};
pub use index_service::IndexService;
pub use link_service::{LinkCreated, LinkDeleted, LinkService};
pub use node_service::{NodeDeleted, NodeService};
pub use type_service::TypeService;
