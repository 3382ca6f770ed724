//! Type Catalogue Types
//!
//! This module contains the definitions that classify nodes and links:
//!
//! - `NodeType` - a node classification with its statuses, default status and
//!   custom property definitions
//! - `LinkType` - a relationship verb, its inverse, and the node types allowed
//!   at either end
//!
//! Both are stored as keyed entries of a catalogue document
//! (`config/node-types.json` and `config/link-types.json`).
//!
//! ## Example Link Type
//!
//! ```json
//! {
//!   "link_type_id": "1f0e…",
//!   "verb": "blocks",
//!   "inverse_verb": "blocked-by",
//!   "description": "Prevents progress on target",
//!   "source_types": ["bug", "task"],
//!   "target_types": ["task", "feature"]
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Value kind of a custom property
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    /// Free text
    #[default]
    String,
    Number,
    Boolean,
    /// One of `PropertyDefinition::options`
    Enum,
    /// ISO date string
    Date,
    /// ISO datetime string
    Datetime,
}

/// Definition of one type-specific property field
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PropertyDefinition {
    /// Property name, e.g. `severity`
    pub name: String,

    #[serde(default)]
    pub prop_type: PropertyType,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub required: bool,

    /// Valid values for `PropertyType::Enum`
    #[serde(default)]
    pub options: Vec<String>,

    /// Value applied on creation when the property is absent
    #[serde(default)]
    pub default: Option<String>,
}

impl PropertyDefinition {
    /// Whether `value` is acceptable for an enum property
    ///
    /// Non-enum properties and enum properties without options accept anything.
    pub fn accepts(&self, value: &Value) -> bool {
        if self.prop_type != PropertyType::Enum || self.options.is_empty() {
            return true;
        }
        value
            .as_str()
            .map(|v| self.options.iter().any(|option| option == v))
            .unwrap_or(false)
    }
}

/// Node classification (bug, task, feature, person, …)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeType {
    pub type_id: String,

    /// Unique key; lowercase token
    pub name: String,

    pub display_name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub icon: String,

    /// Display colour like `#ef4444`
    #[serde(default)]
    pub color: String,

    /// Valid statuses for nodes of this type
    pub statuses: Vec<String>,

    /// Status assigned on creation when none is requested
    pub default_status: String,

    #[serde(default)]
    pub properties: Vec<PropertyDefinition>,
}

impl NodeType {
    pub fn allows_status(&self, status: &str) -> bool {
        self.statuses.iter().any(|s| s == status)
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDefinition> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// Input for `TypeService::create_node_type`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNodeType {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub icon: String,
    pub color: String,
    pub statuses: Vec<String>,
    pub default_status: String,
    pub properties: Vec<PropertyDefinition>,
}

impl NewNodeType {
    /// Defaults: statuses `backlog, in-progress, done`, default `backlog`, colour `#888888`
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            description: String::new(),
            icon: String::new(),
            color: "#888888".to_string(),
            statuses: vec![
                "backlog".to_string(),
                "in-progress".to_string(),
                "done".to_string(),
            ],
            default_status: "backlog".to_string(),
            properties: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_statuses(mut self, statuses: &[&str], default_status: &str) -> Self {
        self.statuses = statuses.iter().map(|s| s.to_string()).collect();
        self.default_status = default_status.to_string();
        self
    }

    pub fn with_property(mut self, property: PropertyDefinition) -> Self {
        self.properties.push(property);
        self
    }

    pub(crate) fn into_node_type(self) -> NodeType {
        NodeType {
            type_id: Uuid::new_v4().to_string(),
            name: self.name,
            display_name: self.display_name,
            description: self.description,
            icon: self.icon,
            color: self.color,
            statuses: self.statuses,
            default_status: self.default_status,
            properties: self.properties,
        }
    }
}

/// Partial update for a node type; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeTypeUpdate {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub statuses: Option<Vec<String>>,
    #[serde(default)]
    pub default_status: Option<String>,
    #[serde(default)]
    pub properties: Option<Vec<PropertyDefinition>>,
}

/// Relationship classification
///
/// A symmetric verb has `inverse_verb == verb`; both halves of such a link
/// carry the same verb.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkType {
    pub link_type_id: String,

    /// Unique key
    pub verb: String,

    pub inverse_verb: String,

    #[serde(default)]
    pub description: String,

    /// Node types allowed at the source end
    #[serde(default)]
    pub source_types: Vec<String>,

    /// Node types allowed at the target end
    #[serde(default)]
    pub target_types: Vec<String>,
}

impl LinkType {
    pub fn is_symmetric(&self) -> bool {
        self.verb == self.inverse_verb
    }

    pub fn allows_source(&self, node_type: &str) -> bool {
        self.source_types.iter().any(|t| t == node_type)
    }

    pub fn allows_target(&self, node_type: &str) -> bool {
        self.target_types.iter().any(|t| t == node_type)
    }
}

/// Input for `TypeService::create_link_type`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLinkType {
    pub verb: String,
    pub inverse_verb: String,
    pub description: String,
    pub source_types: Vec<String>,
    pub target_types: Vec<String>,
}

impl NewLinkType {
    pub fn new(verb: impl Into<String>, inverse_verb: impl Into<String>) -> Self {
        Self {
            verb: verb.into(),
            inverse_verb: inverse_verb.into(),
            description: String::new(),
            source_types: Vec::new(),
            target_types: Vec::new(),
        }
    }

    /// A verb that is its own inverse
    pub fn symmetric(verb: impl Into<String>) -> Self {
        let verb = verb.into();
        Self::new(verb.clone(), verb)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn between(mut self, source_types: &[&str], target_types: &[&str]) -> Self {
        self.source_types = source_types.iter().map(|s| s.to_string()).collect();
        self.target_types = target_types.iter().map(|s| s.to_string()).collect();
        self
    }

    pub(crate) fn into_link_type(self) -> LinkType {
        LinkType {
            link_type_id: Uuid::new_v4().to_string(),
            verb: self.verb,
            inverse_verb: self.inverse_verb,
            description: self.description,
            source_types: self.source_types,
            target_types: self.target_types,
        }
    }
}
