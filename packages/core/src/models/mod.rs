//! Data Models
//!
//! This module contains the data structures persisted by IssueGraph:
//!
//! - `Node` / `NodeLink` - typed entities and the two halves of each relationship
//! - `NodeType` / `LinkType` - the type catalogue (schema)
//! - `TypeIndex` / `GlobalIndex` - per-type counters and the derived summary
//! - token validation and label formatting helpers
//!
//! Field names are the persisted JSON contract; every struct serializes with
//! snake_case names exactly as stored.

pub mod core_schemas;
mod index;
mod node;
pub mod schema;
mod tokens;

pub use core_schemas::{default_link_types, default_node_types};
pub use index::{GlobalIndex, TypeCount, TypeIndex};
pub use node::{CreateLinkRequest, CreateNodeRequest, Node, NodeLink, NodeSummary, NodeUpdate};
pub use schema::{
    LinkType, NewLinkType, NewNodeType, NodeType, NodeTypeUpdate, PropertyDefinition,
    PropertyType,
};
pub use tokens::{
    capitalize, is_valid_label, is_valid_token, label_from_type_and_index, parse_label,
    MAX_LABEL_LENGTH, MAX_TOKEN_LENGTH,
};
