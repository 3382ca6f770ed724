//! Service Layer Error Types
//!
//! This module defines `GraphError`, the single error type returned by every
//! graph service, and `GraphErrorKind`, its serialisable classification for
//! callers that map failures onto transport responses.

use crate::db::StorageError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Graph service errors
#[derive(Error, Debug)]
pub enum GraphError {
    /// Empty or malformed input
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Entity absent
    #[error("Not found: {entity}")]
    NotFound { entity: String },

    /// Referenced node type is not registered
    #[error("Unknown node type: {node_type}")]
    UnknownType { node_type: String },

    /// Referenced link verb is not registered
    #[error("Unknown link verb: {verb}")]
    UnknownVerb { verb: String },

    /// Relationship violates the link type's allowed source/target types
    #[error("Link '{verb}' not allowed from {source_type} to {target_type}")]
    TypeMismatch {
        verb: String,
        source_type: String,
        target_type: String,
    },

    /// Same (source, verb, target) relationship already exists
    #[error("Link already exists: {source_label} {verb} {target_label}")]
    DuplicateLink {
        source_label: String,
        verb: String,
        target_label: String,
    },

    /// Storage write or read failed
    #[error("Persistence failed: {context}")]
    Persistence {
        context: String,
        #[source]
        source: Option<StorageError>,
    },

    /// Link source node absent
    #[error("Source node not found: {label}")]
    SourceNotFound { label: String },

    /// Target label could not be split into type and index
    #[error("Invalid target label: {label}")]
    InvalidTargetLabel { label: String },

    /// Link target node absent
    #[error("Target node not found: {label}")]
    TargetNotFound { label: String },

    /// No link from source to target
    #[error("Link not found: {source_label} -> {target_label}")]
    LinkNotFound {
        source_label: String,
        target_label: String,
    },

    /// Stored document could not be decoded or encoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Serialisable classification of a `GraphError`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphErrorKind {
    Validation,
    NotFound,
    UnknownType,
    UnknownVerb,
    TypeMismatch,
    DuplicateLink,
    Persistence,
    SourceNotFound,
    InvalidTargetLabel,
    TargetNotFound,
    LinkNotFound,
    Serialization,
}

impl GraphError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
        }
    }

    /// Create an unknown type error
    pub fn unknown_type(node_type: impl Into<String>) -> Self {
        Self::UnknownType {
            node_type: node_type.into(),
        }
    }

    /// Create an unknown verb error
    pub fn unknown_verb(verb: impl Into<String>) -> Self {
        Self::UnknownVerb { verb: verb.into() }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(
        verb: impl Into<String>,
        source_type: impl Into<String>,
        target_type: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            verb: verb.into(),
            source_type: source_type.into(),
            target_type: target_type.into(),
        }
    }

    /// Create a duplicate link error
    pub fn duplicate_link(
        source_label: impl Into<String>,
        verb: impl Into<String>,
        target_label: impl Into<String>,
    ) -> Self {
        Self::DuplicateLink {
            source_label: source_label.into(),
            verb: verb.into(),
            target_label: target_label.into(),
        }
    }

    /// Create a persistence error without an underlying storage error
    pub fn persistence(context: impl Into<String>) -> Self {
        Self::Persistence {
            context: context.into(),
            source: None,
        }
    }

    /// Wrap a storage failure with context about the step that failed
    pub fn persistence_with(context: impl Into<String>, source: StorageError) -> Self {
        Self::Persistence {
            context: format!("{}: {}", context.into(), source),
            source: Some(source),
        }
    }

    /// Create a source not found error
    pub fn source_not_found(label: impl Into<String>) -> Self {
        Self::SourceNotFound {
            label: label.into(),
        }
    }

    /// Create an invalid target label error
    pub fn invalid_target_label(label: impl Into<String>) -> Self {
        Self::InvalidTargetLabel {
            label: label.into(),
        }
    }

    /// Create a target not found error
    pub fn target_not_found(label: impl Into<String>) -> Self {
        Self::TargetNotFound {
            label: label.into(),
        }
    }

    /// Create a link not found error
    pub fn link_not_found(source_label: impl Into<String>, target_label: impl Into<String>) -> Self {
        Self::LinkNotFound {
            source_label: source_label.into(),
            target_label: target_label.into(),
        }
    }

    pub fn kind(&self) -> GraphErrorKind {
        match self {
            GraphError::Validation(_) => GraphErrorKind::Validation,
            GraphError::NotFound { .. } => GraphErrorKind::NotFound,
            GraphError::UnknownType { .. } => GraphErrorKind::UnknownType,
            GraphError::UnknownVerb { .. } => GraphErrorKind::UnknownVerb,
            GraphError::TypeMismatch { .. } => GraphErrorKind::TypeMismatch,
            GraphError::DuplicateLink { .. } => GraphErrorKind::DuplicateLink,
            GraphError::Persistence { .. } => GraphErrorKind::Persistence,
            GraphError::SourceNotFound { .. } => GraphErrorKind::SourceNotFound,
            GraphError::InvalidTargetLabel { .. } => GraphErrorKind::InvalidTargetLabel,
            GraphError::TargetNotFound { .. } => GraphErrorKind::TargetNotFound,
            GraphError::LinkNotFound { .. } => GraphErrorKind::LinkNotFound,
            GraphError::Serialization(_) => GraphErrorKind::Serialization,
        }
    }
}

impl From<StorageError> for GraphError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::Document { .. } => Self::Serialization(error.to_string()),
            other => Self::Persistence {
                context: other.to_string(),
                source: Some(other),
            },
        }
    }
}
