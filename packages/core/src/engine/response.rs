//! Call contract result type

use crate::services::{GraphError, GraphErrorKind};
use serde::{Deserialize, Serialize};

/// Result of one engine operation
///
/// `success` with `data` on success; `message` and (for typed failures)
/// `error` otherwise. The transport layer decides how to render it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub error: Option<GraphErrorKind>,
}

impl<T> GraphResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
        }
    }

    /// Failure carrying a typed error
    pub fn failure(error: &GraphError) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(error.to_string()),
            error: Some(error.kind()),
        }
    }

    /// Failure that is a refusal rather than an error, e.g. a taken name
    pub fn refused(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn from_result(operation: &str, result: Result<T, GraphError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(error) => {
                match error.kind() {
                    GraphErrorKind::Persistence | GraphErrorKind::Serialization => {
                        tracing::error!("{} failed: {}", operation, error)
                    }
                    _ => tracing::debug!("{} rejected: {}", operation, error),
                }
                Self::failure(&error)
            }
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// The payload, if the operation succeeded
    pub fn into_data(self) -> Option<T> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failure_serializes_kind_and_message() {
        let response: GraphResponse<()> =
            GraphResponse::failure(&GraphError::unknown_verb("haunts"));
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "success": false,
                "data": null,
                "message": "Unknown link verb: haunts",
                "error": "unknown_verb"
            })
        );
    }

    #[test]
    fn test_from_result_ok() {
        let response = GraphResponse::from_result("count", Ok::<_, GraphError>(3));
        assert!(response.is_success());
        assert_eq!(response.into_data(), Some(3));
    }
}
