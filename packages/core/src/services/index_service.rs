//! Index Maintainer
//!
//! The global index is a cache: `refresh_global_index` rebuilds it from every
//! registered type's `TypeIndex` and overwrites the stored document. Calling
//! it again without intervening node changes produces the same counts.

use crate::db::GraphRepository;
use crate::models::{is_valid_token, label_from_type_and_index, GlobalIndex, TypeIndex};
use crate::services::GraphError;
use std::sync::Arc;

#[derive(Clone)]
pub struct IndexService {
    repository: Arc<GraphRepository>,
}

impl IndexService {
    pub fn new(repository: Arc<GraphRepository>) -> Self {
        Self { repository }
    }

    /// Recompute and persist the global index from all type indices
    pub async fn refresh_global_index(&self) -> Result<GlobalIndex, GraphError> {
        let node_types = self.repository.node_types().list().await?;

        let mut type_indices = Vec::with_capacity(node_types.len());
        for node_type in &node_types {
            type_indices.push(self.repository.type_index_load(&node_type.name).await?);
        }

        let global = GlobalIndex::from_type_indices(&type_indices);
        self.repository.global_index_save(&global).await?;
        tracing::debug!(
            "Refreshed global index: {} nodes across {} types",
            global.total_nodes,
            global.type_counts.len()
        );
        Ok(global)
    }

    /// Stored global index (empty if never written)
    pub async fn global_index(&self) -> Result<GlobalIndex, GraphError> {
        Ok(self.repository.global_index_load().await?)
    }

    pub async fn type_index(&self, node_type: &str) -> Result<TypeIndex, GraphError> {
        if !is_valid_token(node_type) {
            return Err(GraphError::validation(format!(
                "invalid node type '{}'",
                node_type
            )));
        }
        Ok(self.repository.type_index_load(node_type).await?)
    }

    /// Recount a type's live nodes and repair its stored count
    ///
    /// Checks every minted index, so drift left by a failure between a node
    /// write and its index write is corrected. `next_index` is never lowered.
    pub async fn reconcile_type_index(&self, node_type: &str) -> Result<TypeIndex, GraphError> {
        if !self.repository.node_types().contains(node_type).await? {
            return Err(GraphError::unknown_type(node_type));
        }

        let mut index = self.repository.type_index_load(node_type).await?;
        let mut live = 0;
        for node_index in index.minted() {
            let label = label_from_type_and_index(node_type, node_index);
            if self.repository.node_exists(node_type, &label).await? {
                live += 1;
            }
        }

        if live != index.count {
            tracing::warn!(
                "Type index for '{}' counted {} nodes, found {}",
                node_type,
                index.count,
                live
            );
            index.count = live;
            index.last_updated = Some(chrono::Utc::now());
            self.repository.type_index_save(&index).await?;
        }

        self.refresh_global_index().await?;
        Ok(index)
    }
}
