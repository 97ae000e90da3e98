//! Store diagnostics
//!
//! Writes never fail. When one is dropped the store logs a warning and, if a
//! diagnostic channel is attached, sends a [`StoreDiagnostic`] so integrators
//! can opt into stricter handling.

use crate::path::PathError;
use crate::store::WorkspaceId;

/// Why a write did not land
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DropReason {
    /// No workspace selected (empty id)
    #[error("no workspace selected")]
    NoWorkspace,

    /// Workspace namespace does not exist
    #[error("unknown workspace")]
    UnknownWorkspace,

    /// Path or key could not be parsed
    #[error("invalid path: {0}")]
    InvalidPath(#[from] PathError),
}

/// Diagnostic event emitted by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreDiagnostic {
    /// A write was dropped
    WriteDropped {
        /// Target workspace as given by the caller
        workspace_id: WorkspaceId,
        /// Target path as given by the caller
        path: String,
        /// Drop cause
        reason: DropReason,
    },
}

impl std::fmt::Display for StoreDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WriteDropped {
                workspace_id,
                path,
                reason,
            } => write!(f, "write to '{workspace_id}' at '{path}' dropped: {reason}"),
        }
    }
}

/// Result of a write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// A new snapshot was produced
    Applied {
        /// Version of the new snapshot
        version: u64,
    },
    /// Value was deep-equal to the existing one; nothing changed
    Unchanged,
    /// The write was dropped
    Dropped(DropReason),
}

impl WriteOutcome {
    /// Whether a new snapshot was produced
    #[inline]
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    /// Whether the write was dropped
    #[inline]
    #[must_use]
    pub fn is_dropped(&self) -> bool {
        matches!(self, Self::Dropped(_))
    }
}
