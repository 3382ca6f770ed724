//! Link Engine
//!
//! A relationship between two nodes is stored as two `NodeLink` records, one
//! in each node document: the forward half on the source (`blocks`) and the
//! inverse half on the target (`blocked-by`). Both halves carry the same
//! `link_type_id` and `created_at`.
//!
//! # Partial Failure
//!
//! Storage offers no transactions, so the two document writes are sequenced:
//!
//! 1. The source is written first. If that fails nothing has changed.
//! 2. The target is written second. If that fails the source document is
//!    written back in its previous state before the error is returned.
//!
//! Deletion follows the same order and compensation. A compensating write
//! that itself fails is logged with `tracing::error!` and named in the
//! returned error; the one-sided link it leaves behind can be removed with
//! `delete_link`.

use crate::db::GraphRepository;
use crate::models::{is_valid_label, parse_label, CreateLinkRequest, Node, NodeLink};
use crate::services::node_service::validate_node_ref;
use crate::services::{GraphError, TypeService};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Both halves of a newly created relationship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkCreated {
    pub source_link: NodeLink,
    pub target_link: NodeLink,
}

/// Outcome of a link deletion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkDeleted {
    pub source_label: String,
    pub target_label: String,
    /// False when the target or its inverse half was already gone
    pub inverse_removed: bool,
}

#[derive(Clone)]
pub struct LinkService {
    repository: Arc<GraphRepository>,
    types: TypeService,
}

impl LinkService {
    pub fn new(repository: Arc<GraphRepository>, types: TypeService) -> Self {
        Self { repository, types }
    }

    /// Outgoing link halves of a node, in creation order
    pub async fn list_links(
        &self,
        node_type: &str,
        label: &str,
    ) -> Result<Vec<NodeLink>, GraphError> {
        validate_node_ref(node_type, label)?;
        let node = self
            .repository
            .node_load(node_type, label)
            .await?
            .ok_or_else(|| GraphError::not_found(format!("node {}", label)))?;
        Ok(node.links)
    }

    /// Create a bidirectional link from `(source_type, source_label)`
    pub async fn create_link(
        &self,
        source_type: &str,
        source_label: &str,
        request: &CreateLinkRequest,
    ) -> Result<LinkCreated, GraphError> {
        validate_node_ref(source_type, source_label)?;
        let mut source = self
            .repository
            .node_load(source_type, source_label)
            .await?
            .ok_or_else(|| GraphError::source_not_found(source_label))?;

        if !is_valid_label(&request.target_label) {
            return Err(GraphError::invalid_target_label(&request.target_label));
        }
        let (target_type, target_label) = parse_label(&request.target_label)
            .ok_or_else(|| GraphError::invalid_target_label(&request.target_label))?;

        let mut target = self
            .repository
            .node_load(&target_type, &target_label)
            .await?
            .ok_or_else(|| GraphError::target_not_found(&target_label))?;

        let link_type = self
            .types
            .get_link_type(&request.verb)
            .await?
            .ok_or_else(|| GraphError::unknown_verb(&request.verb))?;

        if !link_type.allows_source(&source.node_type) || !link_type.allows_target(&target.node_type)
        {
            return Err(GraphError::type_mismatch(
                &request.verb,
                &source.node_type,
                &target.node_type,
            ));
        }

        if target.node_id == source.node_id {
            return Err(GraphError::validation(format!(
                "cannot link {} to itself",
                source.label
            )));
        }

        if source.find_link(&target.node_id, &request.verb).is_some() {
            return Err(GraphError::duplicate_link(
                &source.label,
                &request.verb,
                &target.label,
            ));
        }

        let now = Utc::now();
        let source_link = NodeLink {
            link_type_id: link_type.link_type_id.clone(),
            verb: request.verb.clone(),
            target_id: target.node_id.clone(),
            target_label: target.label.clone(),
            created_at: now,
        };
        let target_link = NodeLink {
            link_type_id: link_type.link_type_id.clone(),
            verb: link_type.inverse_verb.clone(),
            target_id: source.node_id.clone(),
            target_label: source.label.clone(),
            created_at: now,
        };

        let previous_source = source.clone();
        source.links.push(source_link.clone());
        source.updated_at = now;
        self.repository
            .node_save(&source)
            .await
            .map_err(|e| GraphError::persistence_with(format!("failed to save {}", source.label), e))?;

        target.links.push(target_link.clone());
        target.updated_at = now;
        if let Err(save_error) = self.repository.node_save(&target).await {
            let context = format!("failed to save {}", target.label);
            return Err(self
                .compensate(&previous_source, context, save_error)
                .await);
        }

        tracing::info!(
            "Linked {} -{}-> {} ({} on target)",
            source.label,
            source_link.verb,
            target.label,
            target_link.verb
        );
        Ok(LinkCreated {
            source_link,
            target_link,
        })
    }

    /// Remove both halves of the link from `source_label` to `target_label`
    ///
    /// If the target label cannot be parsed, the target node is gone, or it no
    /// longer holds the inverse half, only the source half is removed and the
    /// result reports `inverse_removed: false`.
    pub async fn delete_link(
        &self,
        source_type: &str,
        source_label: &str,
        target_label: &str,
    ) -> Result<LinkDeleted, GraphError> {
        validate_node_ref(source_type, source_label)?;
        let mut source = self
            .repository
            .node_load(source_type, source_label)
            .await?
            .ok_or_else(|| GraphError::source_not_found(source_label))?;

        let position = source
            .links
            .iter()
            .position(|link| link.target_label == target_label)
            .ok_or_else(|| GraphError::link_not_found(source_label, target_label))?;

        let previous_source = source.clone();
        let forward = source.links.remove(position);
        source.updated_at = Utc::now();
        self.repository
            .node_save(&source)
            .await
            .map_err(|e| GraphError::persistence_with(format!("failed to save {}", source.label), e))?;

        let inverse_removed = match self.remove_inverse(&source, &forward).await {
            Ok(removed) => removed,
            Err(error) => {
                let context = format!("failed to remove inverse link on {}", target_label);
                return Err(self.compensate(&previous_source, context, error).await);
            }
        };

        tracing::info!(
            "Unlinked {} -{}-> {}{}",
            source.label,
            forward.verb,
            target_label,
            if inverse_removed {
                ""
            } else {
                " (source half only)"
            }
        );
        Ok(LinkDeleted {
            source_label: source.label,
            target_label: target_label.to_string(),
            inverse_removed,
        })
    }

    /// Remove the twin of `forward` from the node it points at
    async fn remove_inverse(&self, source: &Node, forward: &NodeLink) -> Result<bool, GraphError> {
        let Some((target_type, target_label)) = parse_label(&forward.target_label) else {
            tracing::warn!(
                "Link target label '{}' on {} is not parseable; removed source half only",
                forward.target_label,
                source.label
            );
            return Ok(false);
        };

        let Some(mut target) = self.repository.node_load(&target_type, &target_label).await? else {
            tracing::warn!(
                "Link target {} of {} no longer exists; removed source half only",
                target_label,
                source.label
            );
            return Ok(false);
        };

        let position = target
            .links
            .iter()
            .position(|link| {
                link.target_id == source.node_id && link.link_type_id == forward.link_type_id
            })
            .or_else(|| {
                target
                    .links
                    .iter()
                    .position(|link| link.target_label == source.label)
            });
        let Some(position) = position else {
            tracing::warn!(
                "{} holds no inverse link back to {}",
                target.label,
                source.label
            );
            return Ok(false);
        };

        target.links.remove(position);
        target.updated_at = Utc::now();
        self.repository.node_save(&target).await?;
        Ok(true)
    }

    /// Write `previous_source` back after a failed second write
    async fn compensate(
        &self,
        previous_source: &Node,
        context: String,
        error: impl Into<GraphError>,
    ) -> GraphError {
        let error = error.into();
        match self.repository.node_save(previous_source).await {
            Ok(()) => {
                tracing::warn!(
                    "{}; restored {} to its previous state",
                    context,
                    previous_source.label
                );
                GraphError::persistence(format!("{}: {}", context, error))
            }
            Err(rollback_error) => {
                tracing::error!(
                    "{}; rollback of {} also failed, link is one-sided: {}",
                    context,
                    previous_source.label,
                    rollback_error
                );
                GraphError::persistence(format!(
                    "{}: {}; rollback of {} failed: {}",
                    context, error, previous_source.label, rollback_error
                ))
            }
        }
    }

    /// Strip every link half that points at `node` from the nodes it links to
    ///
    /// Returns how many peers were cleaned. Peers that are missing or fail to
    /// save are logged and skipped.
    pub(crate) async fn detach_node(&self, node: &Node) -> usize {
        let mut seen = HashSet::new();
        let mut cleaned = 0;

        for link in &node.links {
            if !seen.insert(link.target_id.as_str()) {
                continue;
            }
            let Some((peer_type, peer_label)) = parse_label(&link.target_label) else {
                tracing::warn!(
                    "Skipping unparseable peer label '{}' while detaching {}",
                    link.target_label,
                    node.label
                );
                continue;
            };

            let mut peer = match self.repository.node_load(&peer_type, &peer_label).await {
                Ok(Some(peer)) if peer.node_id == link.target_id => peer,
                Ok(_) => {
                    tracing::warn!(
                        "Peer {} of {} not found while detaching",
                        peer_label,
                        node.label
                    );
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Failed to load peer {}: {}", peer_label, e);
                    continue;
                }
            };

            let before = peer.links.len();
            peer.links.retain(|l| l.target_id != node.node_id);
            if peer.links.len() == before {
                continue;
            }
            peer.updated_at = Utc::now();
            match self.repository.node_save(&peer).await {
                Ok(()) => cleaned += 1,
                Err(e) => tracing::warn!(
                    "Failed to remove links to {} from {}: {}",
                    node.label,
                    peer.label,
                    e
                ),
            }
        }

        cleaned
    }
}

#[cfg(test)]
#[path = "link_service_test.rs"]
mod link_service_test;
