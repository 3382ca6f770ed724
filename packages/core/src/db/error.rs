//! Storage Error Types
//!
//! This module defines error types for the storage surface, covering the
//! filesystem, embedded SQL and archive backends.

use std::path::PathBuf;
use thiserror::Error;

/// Storage surface errors
///
/// Every backend maps its native failures onto these variants so the layers
/// above never depend on a particular backend's error type.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Filesystem operation failed
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// Failed to open or create the backing database
    #[error("Failed to connect to database at {path}: {source}")]
    ConnectionFailed {
        path: PathBuf,
        source: libsql::Error,
    },

    /// libsql operation error
    #[error("Database operation failed: {0}")]
    LibsqlError(#[from] libsql::Error),

    /// SQL execution error with context
    #[error("SQL execution failed: {context}")]
    SqlExecutionError { context: String },

    /// Archive could not be read or written
    #[error("Archive error on {path}: {context}")]
    Archive { path: PathBuf, context: String },

    /// Stored document could not be parsed or encoded as JSON
    #[error("Malformed document '{key}': {source}")]
    Document {
        key: String,
        source: serde_json::Error,
    },

    /// Key is not a relative, normalized path
    #[error("Invalid storage key: {key}")]
    InvalidKey { key: String },

    /// Background task running blocking I/O was cancelled or panicked
    #[error("Storage task failed: {0}")]
    TaskFailed(String),
}

impl StorageError {
    /// Create an I/O error bound to the key or path that failed
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a connection failed error
    pub fn connection_failed(path: PathBuf, source: libsql::Error) -> Self {
        Self::ConnectionFailed { path, source }
    }

    /// Create a SQL execution error with context
    pub fn sql_execution(context: impl Into<String>) -> Self {
        Self::SqlExecutionError {
            context: context.into(),
        }
    }

    /// Create an archive error
    pub fn archive(path: PathBuf, context: impl Into<String>) -> Self {
        Self::Archive {
            path,
            context: context.into(),
        }
    }

    /// Create a malformed document error
    pub fn document(key: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Document {
            key: key.into(),
            source,
        }
    }

    /// Create an invalid key error
    pub fn invalid_key(key: impl Into<String>) -> Self {
        Self::InvalidKey { key: key.into() }
    }
}

/// Reject keys that could escape a backend's root
///
/// Keys are `/`-separated relative paths without empty, `.` or `..` segments.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let well_formed = !key.is_empty()
        && !key.starts_with('/')
        && !key.contains('\\')
        && key
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..");
    if well_formed {
        Ok(())
    } else {
        Err(StorageError::invalid_key(key))
    }
}
