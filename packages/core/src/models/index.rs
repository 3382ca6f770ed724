//! Index Records
//!
//! `TypeIndex` is the authoritative per-type counter: it mints label suffixes
//! (`next_index`, never reused) and tracks the live node count. `GlobalIndex`
//! is a cache recomputed from every `TypeIndex`; it carries no information of
//! its own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn first_index() -> u32 {
    1
}

/// Per-type counter and live count (`data/{type}/_index.json`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeIndex {
    pub node_type: String,

    /// Suffix for the next label; monotonic
    #[serde(default = "first_index")]
    pub next_index: u32,

    /// Live nodes of this type
    #[serde(default)]
    pub count: u32,

    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl TypeIndex {
    /// Empty index for a type that has never held a node
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            next_index: first_index(),
            count: 0,
            last_updated: None,
        }
    }

    /// Record a created node: consume `next_index` and bump the count
    ///
    /// Returns the consumed index, or `None` (leaving the index untouched)
    /// when the counter is exhausted.
    pub fn record_created(&mut self) -> Option<u32> {
        let consumed = self.next_index;
        let next_index = consumed.checked_add(1)?;
        let count = self.count.checked_add(1)?;
        self.next_index = next_index;
        self.count = count;
        self.last_updated = Some(Utc::now());
        Some(consumed)
    }

    /// Record a deleted node; the count never goes below zero
    pub fn record_deleted(&mut self) {
        self.count = self.count.saturating_sub(1);
        self.last_updated = Some(Utc::now());
    }

    /// Indices minted so far, in order
    pub fn minted(&self) -> std::ops::Range<u32> {
        first_index()..self.next_index
    }
}

/// One entry of `GlobalIndex::type_counts`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCount {
    pub node_type: String,
    pub count: u32,
}

/// Cross-type summary (`_index.json`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalIndex {
    #[serde(default)]
    pub total_nodes: u64,

    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,

    #[serde(default)]
    pub type_counts: Vec<TypeCount>,
}

impl GlobalIndex {
    /// Build the summary from type indices, replacing any previous state
    pub fn from_type_indices<'a>(indices: impl IntoIterator<Item = &'a TypeIndex>) -> Self {
        let type_counts: Vec<TypeCount> = indices
            .into_iter()
            .map(|index| TypeCount {
                node_type: index.node_type.clone(),
                count: index.count,
            })
            .collect();
        let total_nodes = type_counts.iter().map(|tc| u64::from(tc.count)).sum();
        Self {
            total_nodes,
            last_updated: Some(Utc::now()),
            type_counts,
        }
    }

    pub fn count_for(&self, node_type: &str) -> Option<u32> {
        self.type_counts
            .iter()
            .find(|tc| tc.node_type == node_type)
            .map(|tc| tc.count)
    }
}
