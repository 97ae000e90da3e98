//! Change notification types
//!
//! Every effective write produces exactly one [`ContextChange`], delivered to
//! each subscriber after the store lock is released. No-op writes produce
//! nothing.

use crate::path::ContextPath;
use crate::store::{Snapshot, WorkspaceId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Handle returned by [`ContextStore::subscribe`](crate::ContextStore::subscribe)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub u64);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Callback invoked once per effective write
pub type Listener = Arc<dyn Fn(&ContextChange) + Send + Sync>;

/// What a write touched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeScope {
    /// Path-scoped write inside one workspace
    Path {
        /// Workspace written
        workspace_id: WorkspaceId,
        /// Full path written (first segment is the top-level key)
        path: ContextPath,
    },

    /// Workspace namespace created or its whole tree replaced
    Workspace {
        /// Workspace written
        workspace_id: WorkspaceId,
    },

    /// Workspace namespace dropped
    Removed {
        /// Workspace removed
        workspace_id: WorkspaceId,
    },

    /// Whole mapping replaced through `set_all`
    All {
        /// Workspaces whose tree differs from before
        changed: Vec<WorkspaceId>,
    },
}

impl ChangeScope {
    /// Workspaces affected by this change
    #[must_use]
    pub fn workspaces(&self) -> Vec<&WorkspaceId> {
        match self {
            Self::Path { workspace_id, .. }
            | Self::Workspace { workspace_id }
            | Self::Removed { workspace_id } => vec![workspace_id],
            Self::All { changed } => changed.iter().collect(),
        }
    }
}

/// One effective write, with the snapshots on both sides of it
#[derive(Debug, Clone)]
pub struct ContextChange {
    /// Version of `current`
    pub version: u64,
    /// What was written
    pub scope: ChangeScope,
    /// Snapshot before the write
    pub previous: Snapshot,
    /// Snapshot after the write
    pub current: Snapshot,
}
