//! Node Data Structures
//!
//! This module defines the `Node` document and its link records.
//!
//! # Architecture
//!
//! - **Typed entities**: every bug, task, feature or person is a `Node` whose
//!   `node_type` names a registered `NodeType`
//! - **Per-type labels**: `label` is derived from `(node_type, node_index)` and
//!   never stored inconsistently with the index that produced it
//! - **Denormalized links**: each relationship is stored as two `NodeLink`
//!   records, one on each endpoint, so a node document can be rendered without
//!   a join
//!
//! # Persisted Shape
//!
//! ```json
//! {
//!   "node_id": "5b0c…", "node_type": "bug", "node_index": 27, "label": "Bug-27",
//!   "title": "Crash on save", "description": "", "status": "backlog",
//!   "created_at": "2025-01-03T10:00:00Z", "updated_at": "2025-01-03T10:00:00Z",
//!   "created_by": null, "tags": [], "links": [], "properties": {}
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::tokens::label_from_type_and_index;

/// One directed half of a bidirectional relationship
///
/// The record lives on the node the edge starts from. Its twin lives on the
/// node at `target_id` and points back with the inverse verb.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLink {
    /// Id of the `LinkType` that defined this relationship
    pub link_type_id: String,

    /// Verb as seen from this node (`blocks` here, `blocked-by` on the twin)
    pub verb: String,

    /// `node_id` of the node at the other end
    pub target_id: String,

    /// Denormalized label of the other end, e.g. `Task-15`
    pub target_label: String,

    /// Creation time, shared by both halves
    pub created_at: DateTime<Utc>,
}

/// A typed entity with a per-type sequential label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Opaque identifier, generated once and never changed
    pub node_id: String,

    /// Registered type name (`bug`, `task`, …)
    pub node_type: String,

    /// Per-type sequential index, starting at 1
    pub node_index: u32,

    /// `Capitalize(node_type)-node_index`
    pub label: String,

    pub title: String,

    #[serde(default)]
    pub description: String,

    /// One of the owning type's statuses
    pub status: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    /// Optional identifier of the person or agent who created the node
    #[serde(default)]
    pub created_by: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Outgoing link halves, in creation order
    #[serde(default)]
    pub links: Vec<NodeLink>,

    /// Free-form type-specific properties
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl Node {
    /// Build a fresh node with a generated id and a label minted from `node_index`
    pub fn new(
        node_type: impl Into<String>,
        node_index: u32,
        title: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        let node_type = node_type.into();
        let now = Utc::now();
        Self {
            node_id: Uuid::new_v4().to_string(),
            label: label_from_type_and_index(&node_type, node_index),
            node_type,
            node_index,
            title: title.into(),
            description: String::new(),
            status: status.into(),
            created_at: now,
            updated_at: now,
            created_by: None,
            tags: Vec::new(),
            links: Vec::new(),
            properties: Map::new(),
        }
    }

    /// Whether the stored label still matches the index that produced it
    pub fn label_is_consistent(&self) -> bool {
        self.label == label_from_type_and_index(&self.node_type, self.node_index)
    }

    /// Find the outgoing link for an exact `(target_id, verb)` pair
    pub fn find_link(&self, target_id: &str, verb: &str) -> Option<&NodeLink> {
        self.links
            .iter()
            .find(|link| link.target_id == target_id && link.verb == verb)
    }

    /// Lightweight projection used by listings
    pub fn summary(&self) -> NodeSummary {
        NodeSummary {
            label: self.label.clone(),
            node_type: self.node_type.clone(),
            title: self.title.clone(),
            status: self.status.clone(),
        }
    }
}

/// Node projection for list views
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSummary {
    pub label: String,
    pub node_type: String,
    pub title: String,
    pub status: String,
}

/// Input for `NodeService::create_node`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateNodeRequest {
    /// Required: registered type name
    pub node_type: String,

    /// Required: non-blank title
    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Falls back to the type's default status
    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub properties: Map<String, Value>,

    #[serde(default)]
    pub created_by: Option<String>,
}

impl CreateNodeRequest {
    pub fn new(node_type: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            title: title.into(),
            ..Default::default()
        }
    }
}

/// Partial update for an existing node
///
/// `None` means "leave unchanged"; `Some` of an empty value is applied. Tags
/// are replaced wholesale, properties are merged key by key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeUpdate {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub tags: Option<Vec<String>>,

    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
}

impl NodeUpdate {
    /// Whether no field is present
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.tags.is_none()
            && self.properties.is_none()
    }
}

/// Input for `LinkService::create_link`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLinkRequest {
    pub verb: String,
    pub target_label: String,
}

impl CreateLinkRequest {
    pub fn new(verb: impl Into<String>, target_label: impl Into<String>) -> Self {
        Self {
            verb: verb.into(),
            target_label: target_label.into(),
        }
    }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;
