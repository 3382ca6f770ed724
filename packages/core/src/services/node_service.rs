//! Node Store
//!
//! Creates, updates and deletes node documents and keeps the per-type index
//! in step with them.
//!
//! # Labels
//!
//! A new node takes `next_index` from its type's `TypeIndex` and gets the
//! label `Capitalize(type)-index`. `next_index` only ever moves forward, so a
//! label is never handed out twice, even after the node holding it is deleted.
//!
//! # Write Order
//!
//! - create: node document, then type index (the node document is removed
//!   again if the index write fails), then global index refresh
//! - delete: node document, type index, inbound link halves on peers, then
//!   global index refresh. A failed document delete changes nothing; a peer
//!   that cannot be cleaned keeps a half pointing at a missing node, which
//!   `delete_link` removes.
//!
//! The global index is a cache; a failed refresh is logged and does not fail
//! the operation.

use crate::db::GraphRepository;
use crate::models::{
    is_valid_label, is_valid_token, label_from_type_and_index, CreateNodeRequest, Node,
    NodeSummary, NodeType, NodeUpdate, PropertyType,
};
use crate::services::{GraphError, IndexService, LinkService, TypeService};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Outcome of a node deletion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDeleted {
    pub label: String,
    pub deleted: bool,
    /// Peers whose link halves pointing at the deleted node were removed
    pub peers_cleaned: usize,
}

#[derive(Clone)]
pub struct NodeService {
    repository: Arc<GraphRepository>,
    types: TypeService,
    index: IndexService,
    links: LinkService,
}

/// Reject a `(node_type, label)` pair that cannot name a node document
pub(crate) fn validate_node_ref(node_type: &str, label: &str) -> Result<(), GraphError> {
    if !is_valid_token(node_type) {
        return Err(GraphError::validation(format!(
            "invalid node type '{}'",
            node_type
        )));
    }
    if !is_valid_label(label) {
        return Err(GraphError::validation(format!("invalid node label '{}'", label)));
    }
    Ok(())
}

fn index_exhausted(node_type: &str) -> GraphError {
    GraphError::validation(format!("no label indices left for type {}", node_type))
}

fn validate_filename(filename: &str) -> Result<(), GraphError> {
    if filename.trim().is_empty()
        || filename.contains('/')
        || filename.contains('\\')
        || filename.contains("..")
    {
        return Err(GraphError::validation(format!(
            "invalid attachment filename '{}'",
            filename
        )));
    }
    Ok(())
}

/// Fill declared defaults and check required and enum properties
fn apply_property_rules(
    node_type: &NodeType,
    properties: &mut Map<String, Value>,
    fill_defaults: bool,
) -> Result<(), GraphError> {
    for definition in &node_type.properties {
        let present = properties
            .get(&definition.name)
            .map_or(false, |value| !value.is_null());

        if !present && fill_defaults {
            if let Some(default) = &definition.default {
                let value = match definition.prop_type {
                    PropertyType::Number => default
                        .parse::<f64>()
                        .ok()
                        .and_then(serde_json::Number::from_f64)
                        .map(Value::Number)
                        .unwrap_or_else(|| Value::String(default.clone())),
                    PropertyType::Boolean => match default.as_str() {
                        "true" => Value::Bool(true),
                        "false" => Value::Bool(false),
                        _ => Value::String(default.clone()),
                    },
                    _ => Value::String(default.clone()),
                };
                properties.insert(definition.name.clone(), value);
                continue;
            }
            if definition.required {
                return Err(GraphError::validation(format!(
                    "property '{}' is required for {}",
                    definition.name, node_type.name
                )));
            }
        }

        if let Some(value) = properties.get(&definition.name) {
            if !value.is_null() && !definition.accepts(value) {
                return Err(GraphError::validation(format!(
                    "property '{}' must be one of: {}",
                    definition.name,
                    definition.options.join(", ")
                )));
            }
        }
    }
    Ok(())
}

fn require_status(node_type: &NodeType, status: &str) -> Result<(), GraphError> {
    if node_type.allows_status(status) {
        Ok(())
    } else {
        Err(GraphError::validation(format!(
            "status '{}' is not valid for {} (expected one of: {})",
            status,
            node_type.name,
            node_type.statuses.join(", ")
        )))
    }
}

impl NodeService {
    pub fn new(
        repository: Arc<GraphRepository>,
        types: TypeService,
        index: IndexService,
        links: LinkService,
    ) -> Self {
        Self {
            repository,
            types,
            index,
            links,
        }
    }

    // Queries

    pub async fn get_node(&self, node_type: &str, label: &str) -> Result<Option<Node>, GraphError> {
        validate_node_ref(node_type, label)?;
        Ok(self.repository.node_load(node_type, label).await?)
    }

    pub async fn node_exists(&self, node_type: &str, label: &str) -> Result<bool, GraphError> {
        validate_node_ref(node_type, label)?;
        Ok(self.repository.node_exists(node_type, label).await?)
    }

    /// Summaries of live nodes, by type catalogue order then index
    ///
    /// Storage has no listing operation, so every minted index of each type
    /// is checked.
    pub async fn list_nodes(&self, node_type: Option<&str>) -> Result<Vec<NodeSummary>, GraphError> {
        let type_names: Vec<String> = match node_type {
            Some(name) => vec![self.types.require_node_type(name).await?.name],
            None => self
                .types
                .list_node_types()
                .await?
                .into_iter()
                .map(|nt| nt.name)
                .collect(),
        };

        let mut summaries = Vec::new();
        for name in &type_names {
            let type_index = self.repository.type_index_load(name).await?;
            for node_index in type_index.minted() {
                let label = label_from_type_and_index(name, node_index);
                if let Some(node) = self.repository.node_load(name, &label).await? {
                    summaries.push(node.summary());
                }
            }
        }
        Ok(summaries)
    }

    // Create

    pub async fn create_node(&self, request: CreateNodeRequest) -> Result<Node, GraphError> {
        if request.title.trim().is_empty() {
            return Err(GraphError::validation("title is required"));
        }
        let node_type = self.types.require_node_type(&request.node_type).await?;

        let status = request
            .status
            .clone()
            .unwrap_or_else(|| node_type.default_status.clone());
        require_status(&node_type, &status)?;

        let mut properties = request.properties;
        apply_property_rules(&node_type, &mut properties, true)?;

        let mut type_index = self.repository.type_index_load(&node_type.name).await?;
        let mut node_index = type_index.next_index;
        while self
            .repository
            .node_exists(
                &node_type.name,
                &label_from_type_and_index(&node_type.name, node_index),
            )
            .await?
        {
            tracing::warn!(
                "Type index for '{}' is behind: index {} already taken",
                node_type.name,
                node_index
            );
            node_index = node_index
                .checked_add(1)
                .ok_or_else(|| index_exhausted(&node_type.name))?;
        }

        type_index.next_index = node_index;
        if type_index.record_created().is_none() {
            return Err(index_exhausted(&node_type.name));
        }

        let mut node = Node::new(&node_type.name, node_index, request.title, status);
        node.description = request.description;
        node.tags = request.tags;
        node.properties = properties;
        node.created_by = request.created_by;

        self.repository
            .node_save(&node)
            .await
            .map_err(|e| GraphError::persistence_with(format!("failed to save {}", node.label), e))?;

        if let Err(index_error) = self.repository.type_index_save(&type_index).await {
            if let Err(e) = self.repository.node_delete(&node.node_type, &node.label).await {
                tracing::error!(
                    "Failed to remove {} after its type index write failed: {}",
                    node.label,
                    e
                );
            }
            return Err(GraphError::persistence_with(
                format!("failed to update type index for {}", node.node_type),
                index_error,
            ));
        }

        self.refresh_global_index().await;
        tracing::info!("Created {} ({})", node.label, node.node_id);
        Ok(node)
    }

    // Update

    /// Apply the fields present in `update`
    ///
    /// Tags are replaced, properties are merged key by key, and `updated_at`
    /// is always stamped.
    pub async fn update_node(
        &self,
        node_type: &str,
        label: &str,
        update: NodeUpdate,
    ) -> Result<Node, GraphError> {
        validate_node_ref(node_type, label)?;
        let mut node = self
            .repository
            .node_load(node_type, label)
            .await?
            .ok_or_else(|| GraphError::not_found(format!("node {}", label)))?;

        if let Some(title) = update.title {
            if title.trim().is_empty() {
                return Err(GraphError::validation("title cannot be empty"));
            }
            node.title = title;
        }
        if let Some(description) = update.description {
            node.description = description;
        }
        if update.status.is_some() || update.properties.is_some() {
            let definition = self.types.require_node_type(&node.node_type).await?;
            if let Some(status) = update.status {
                require_status(&definition, &status)?;
                node.status = status;
            }
            if let Some(properties) = update.properties {
                node.properties.extend(properties);
                apply_property_rules(&definition, &mut node.properties, false)?;
            }
        }
        if let Some(tags) = update.tags {
            node.tags = tags;
        }
        node.updated_at = Utc::now();

        self.repository
            .node_save(&node)
            .await
            .map_err(|e| GraphError::persistence_with(format!("failed to save {}", node.label), e))?;
        tracing::debug!("Updated {}", node.label);
        Ok(node)
    }

    // Delete

    /// Delete a node and strip the link halves other nodes hold to it
    pub async fn delete_node(&self, node_type: &str, label: &str) -> Result<NodeDeleted, GraphError> {
        validate_node_ref(node_type, label)?;
        let node = self
            .repository
            .node_load(node_type, label)
            .await?
            .ok_or_else(|| GraphError::not_found(format!("node {}", label)))?;

        if !self
            .repository
            .node_delete(node_type, label)
            .await
            .map_err(|e| GraphError::persistence_with(format!("failed to delete {}", label), e))?
        {
            return Err(GraphError::not_found(format!("node {}", label)));
        }

        let mut type_index = self.repository.type_index_load(node_type).await?;
        type_index.record_deleted();
        if let Err(e) = self.repository.type_index_save(&type_index).await {
            tracing::warn!(
                "Deleted {} but failed to update type index for {}: {}",
                label,
                node_type,
                e
            );
        }

        let peers_cleaned = self.links.detach_node(&node).await;

        self.refresh_global_index().await;
        tracing::info!("Deleted {} ({} peers cleaned)", label, peers_cleaned);
        Ok(NodeDeleted {
            label: label.to_string(),
            deleted: true,
            peers_cleaned,
        })
    }

    // Attachments

    pub async fn save_attachment(
        &self,
        node_type: &str,
        label: &str,
        filename: &str,
        data: &[u8],
    ) -> Result<(), GraphError> {
        validate_node_ref(node_type, label)?;
        validate_filename(filename)?;
        if !self.repository.node_exists(node_type, label).await? {
            return Err(GraphError::not_found(format!("node {}", label)));
        }
        self.repository
            .attachment_save(node_type, label, filename, data)
            .await?;
        tracing::debug!("Saved attachment {} on {} ({} bytes)", filename, label, data.len());
        Ok(())
    }

    pub async fn load_attachment(
        &self,
        node_type: &str,
        label: &str,
        filename: &str,
    ) -> Result<Option<Vec<u8>>, GraphError> {
        validate_node_ref(node_type, label)?;
        validate_filename(filename)?;
        Ok(self
            .repository
            .attachment_load(node_type, label, filename)
            .await?)
    }

    pub async fn delete_attachment(
        &self,
        node_type: &str,
        label: &str,
        filename: &str,
    ) -> Result<bool, GraphError> {
        validate_node_ref(node_type, label)?;
        validate_filename(filename)?;
        Ok(self
            .repository
            .attachment_delete(node_type, label, filename)
            .await?)
    }

    async fn refresh_global_index(&self) {
        if let Err(e) = self.index.refresh_global_index().await {
            tracing::warn!("Failed to refresh global index: {}", e);
        }
    }
}

#[cfg(test)]
#[path = "node_service_test.rs"]
mod node_service_test;
