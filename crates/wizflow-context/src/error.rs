//! Context error types
//!
//! Writes never return errors (see [`WriteOutcome`](crate::WriteOutcome)).
//! These cover fallible import and loading operations only.

use crate::path::PathError;
use crate::store::WorkspaceId;

/// Errors from context import and parsing
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    /// Malformed JSON text
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Imported value is not a JSON object
    #[error("context for workspace '{workspace_id}' must be a JSON object")]
    NotAnObject {
        /// Target workspace
        workspace_id: WorkspaceId,
    },

    /// Malformed path
    #[error(transparent)]
    Path(#[from] PathError),
}

/// Result type for context operations
pub type Result<T> = std::result::Result<T, ContextError>;
