//! Type Registry
//!
//! CRUD over node types and link types. Both catalogues are keyed (type
//! name, verb) and written through `KeyedCatalog`, so a duplicate key is
//! detected under the catalogue lock rather than by a separate read.
//!
//! Creating a type whose key is taken is not an error: the call returns
//! `Ok(None)` and leaves the existing entry untouched.

use crate::db::GraphRepository;
use crate::models::{
    default_link_types, default_node_types, is_valid_token, LinkType, NewLinkType, NewNodeType,
    NodeType, NodeTypeUpdate,
};
use crate::services::GraphError;
use std::sync::Arc;

#[derive(Clone)]
pub struct TypeService {
    repository: Arc<GraphRepository>,
}

fn require_token(what: &str, value: &str) -> Result<(), GraphError> {
    if is_valid_token(value) {
        Ok(())
    } else {
        Err(GraphError::validation(format!(
            "invalid {} '{}': expected lowercase letters, digits and hyphens",
            what, value
        )))
    }
}

fn validate_statuses(statuses: &[String], default_status: &str) -> Result<(), GraphError> {
    if statuses.is_empty() {
        return Err(GraphError::validation("a node type needs at least one status"));
    }
    for status in statuses {
        require_token("status", status)?;
    }
    if !statuses.iter().any(|s| s == default_status) {
        return Err(GraphError::validation(format!(
            "default status '{}' is not one of the statuses",
            default_status
        )));
    }
    Ok(())
}

impl TypeService {
    pub fn new(repository: Arc<GraphRepository>) -> Self {
        Self { repository }
    }

    // Node types

    pub async fn list_node_types(&self) -> Result<Vec<NodeType>, GraphError> {
        Ok(self.repository.node_types().list().await?)
    }

    pub async fn get_node_type(&self, name: &str) -> Result<Option<NodeType>, GraphError> {
        Ok(self.repository.node_types().get(name).await?)
    }

    /// Fetch a registered type or fail with `UnknownType`
    pub async fn require_node_type(&self, name: &str) -> Result<NodeType, GraphError> {
        self.get_node_type(name)
            .await?
            .ok_or_else(|| GraphError::unknown_type(name))
    }

    /// Register a node type; `Ok(None)` if the name is taken
    pub async fn create_node_type(
        &self,
        new_type: NewNodeType,
    ) -> Result<Option<NodeType>, GraphError> {
        require_token("node type", &new_type.name)?;
        if new_type.display_name.trim().is_empty() {
            return Err(GraphError::validation("display name cannot be empty"));
        }
        validate_statuses(&new_type.statuses, &new_type.default_status)?;

        let node_type = new_type.into_node_type();
        if !self
            .repository
            .node_types()
            .insert_if_absent(node_type.clone())
            .await?
        {
            tracing::debug!("Node type '{}' already registered", node_type.name);
            return Ok(None);
        }

        tracing::info!("Registered node type '{}'", node_type.name);
        Ok(Some(node_type))
    }

    /// Apply a partial update to a registered node type
    pub async fn update_node_type(
        &self,
        name: &str,
        update: NodeTypeUpdate,
    ) -> Result<NodeType, GraphError> {
        let mut node_type = self
            .get_node_type(name)
            .await?
            .ok_or_else(|| GraphError::not_found(format!("node type {}", name)))?;

        if let Some(display_name) = update.display_name {
            if display_name.trim().is_empty() {
                return Err(GraphError::validation("display name cannot be empty"));
            }
            node_type.display_name = display_name;
        }
        if let Some(description) = update.description {
            node_type.description = description;
        }
        if let Some(icon) = update.icon {
            node_type.icon = icon;
        }
        if let Some(color) = update.color {
            node_type.color = color;
        }
        if let Some(statuses) = update.statuses {
            node_type.statuses = statuses;
        }
        if let Some(default_status) = update.default_status {
            node_type.default_status = default_status;
        }
        if let Some(properties) = update.properties {
            node_type.properties = properties;
        }
        validate_statuses(&node_type.statuses, &node_type.default_status)?;

        self.repository.node_types().upsert(node_type.clone()).await?;
        tracing::info!("Updated node type '{}'", name);
        Ok(node_type)
    }

    /// Remove a node type that has no live nodes
    ///
    /// Returns `Ok(false)` while any node of the type exists.
    pub async fn delete_node_type(&self, name: &str) -> Result<bool, GraphError> {
        if !self.repository.node_types().contains(name).await? {
            return Err(GraphError::not_found(format!("node type {}", name)));
        }

        let type_index = self.repository.type_index_load(name).await?;
        if type_index.count > 0 {
            tracing::warn!(
                "Refusing to delete node type '{}' with {} live nodes",
                name,
                type_index.count
            );
            return Ok(false);
        }

        self.repository.node_types().remove(name).await?;
        tracing::info!("Deleted node type '{}'", name);
        Ok(true)
    }

    // Link types

    pub async fn list_link_types(&self) -> Result<Vec<LinkType>, GraphError> {
        Ok(self.repository.link_types().list().await?)
    }

    pub async fn get_link_type(&self, verb: &str) -> Result<Option<LinkType>, GraphError> {
        Ok(self.repository.link_types().get(verb).await?)
    }

    /// Register a link type; `Ok(None)` if the verb is taken
    pub async fn create_link_type(
        &self,
        new_type: NewLinkType,
    ) -> Result<Option<LinkType>, GraphError> {
        require_token("verb", &new_type.verb)?;
        require_token("inverse verb", &new_type.inverse_verb)?;
        for node_type in new_type.source_types.iter().chain(&new_type.target_types) {
            require_token("node type", node_type)?;
        }

        let link_type = new_type.into_link_type();
        if !self
            .repository
            .link_types()
            .insert_if_absent(link_type.clone())
            .await?
        {
            tracing::debug!("Link type '{}' already registered", link_type.verb);
            return Ok(None);
        }

        tracing::info!(
            "Registered link type '{}' / '{}'",
            link_type.verb,
            link_type.inverse_verb
        );
        Ok(Some(link_type))
    }

    /// Remove a link type; existing link records are left as they are
    pub async fn delete_link_type(&self, verb: &str) -> Result<bool, GraphError> {
        let removed = self.repository.link_types().remove(verb).await?.is_some();
        if removed {
            tracing::info!("Deleted link type '{}'", verb);
        }
        Ok(removed)
    }

    // Defaults

    /// Register every default type whose key is not taken yet
    ///
    /// Returns how many types were added; a second call adds none.
    pub async fn initialize_default_types(&self) -> Result<usize, GraphError> {
        let mut added = 0;
        for node_type in default_node_types() {
            if self.create_node_type(node_type).await?.is_some() {
                added += 1;
            }
        }
        for link_type in default_link_types() {
            if self.create_link_type(link_type).await?.is_some() {
                added += 1;
            }
        }
        if added > 0 {
            tracing::info!("Seeded {} default types", added);
        }
        Ok(added)
    }
}

#[cfg(test)]
#[path = "type_service_test.rs"]
mod type_service_test;
