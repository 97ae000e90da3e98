//! Flow error types
//!
//! Navigation never errors (stale or out-of-range transitions are ignored,
//! see [`Transition`](crate::Transition)). These cover loading, session
//! setup and upstream LLM failures.

use std::path::PathBuf;
use wizflow_context::WorkspaceId;

/// Errors from loading workspaces and opening sessions
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// File could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Malformed JSON
    #[error("invalid workspace JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed YAML
    #[error("invalid workspace YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Malformed TOML configuration
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Structural problem in a workspace
    #[error("invalid workspace: {0}")]
    InvalidWorkspace(String),

    /// Two entries share an id
    #[error("duplicate {kind} id '{id}'")]
    DuplicateId {
        /// Entry kind (scenario or node)
        kind: &'static str,
        /// Offending id
        id: String,
    },

    /// Scenario id not found in the workspace
    #[error("scenario '{scenario_id}' not found in workspace '{workspace_id}'")]
    UnknownScenario {
        /// Workspace searched
        workspace_id: WorkspaceId,
        /// Requested scenario
        scenario_id: String,
    },

    /// Malformed context path
    #[error(transparent)]
    Path(#[from] wizflow_context::PathError),

    /// Resolver could not be built
    #[error(transparent)]
    Registry(#[from] wizflow_resolver::RegistryError),
}

/// Upstream failure of an LLM step
///
/// Owned by the step; never causes a transition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LlmError {
    /// Client reported a failure
    #[error("LLM request failed: {0}")]
    Upstream(String),

    /// Client returned no text
    #[error("LLM returned an empty completion")]
    EmptyCompletion,

    /// Current node is not an LLM query step
    #[error("node '{0}' is not an llmQuery step")]
    NotAnLlmStep(String),

    /// No current node
    #[error("scenario has no current node")]
    NoCurrentNode,
}

/// Result type for flow operations
pub type Result<T> = std::result::Result<T, FlowError>;
