//! Change tracking over store snapshots
//!
//! [`ChangeTracker`] subscribes to a [`ContextStore`] and keeps a bounded
//! history of path-level diffs. Diffing skips any subtree that is
//! reference-identical on both sides, so the cost follows the size of the
//! write rather than the size of the tree.

use crate::change::{ContextChange, SubscriptionId};
use crate::path::ContextPath;
use crate::store::{ContextStore, WorkspaceId};
use crate::value::ContextValue;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;

/// Tracker configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Maximum records kept; the oldest are evicted first
    pub history_capacity: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            history_capacity: 64,
        }
    }
}

impl TrackerConfig {
    /// Set history capacity
    #[inline]
    #[must_use]
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }
}

/// Kind of a leaf-level difference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    /// Path did not exist before
    Added,
    /// Path no longer exists
    Removed,
    /// Value at path changed
    Modified,
}

/// One difference between two trees
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathDiff {
    /// Path relative to the workspace root
    pub path: ContextPath,
    /// Kind of difference
    pub kind: DiffKind,
    /// Value before, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<ContextValue>,
    /// Value after, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<ContextValue>,
}

/// Diffs of one workspace for one effective write
#[derive(Debug, Clone, Serialize)]
pub struct ChangeRecord {
    /// Store version after the write
    pub version: u64,
    /// Workspace affected
    pub workspace_id: WorkspaceId,
    /// When the tracker observed the write
    pub at: DateTime<Utc>,
    /// Path-level differences
    pub diffs: Vec<PathDiff>,
}

/// Diff two optional trees
///
/// Objects are compared key by key; everything else is compared by value and
/// reported as a single leaf. Reference-identical subtrees are skipped.
#[must_use]
pub fn diff(previous: Option<&ContextValue>, current: Option<&ContextValue>) -> Vec<PathDiff> {
    let mut out = Vec::new();
    diff_into(&ContextPath::root(), previous, current, &mut out);
    out
}

fn diff_into(
    path: &ContextPath,
    previous: Option<&ContextValue>,
    current: Option<&ContextValue>,
    out: &mut Vec<PathDiff>,
) {
    match (previous, current) {
        (None, None) => {}
        (None, Some(after)) => out.push(PathDiff {
            path: path.clone(),
            kind: DiffKind::Added,
            before: None,
            after: Some(after.clone()),
        }),
        (Some(before), None) => out.push(PathDiff {
            path: path.clone(),
            kind: DiffKind::Removed,
            before: Some(before.clone()),
            after: None,
        }),
        (Some(before), Some(after)) if before.ptr_eq(after) => {}
        (Some(ContextValue::Object(a)), Some(ContextValue::Object(b))) => {
            for (key, before) in a {
                diff_into(&path.child(key.as_str()), Some(before), b.get(key), out);
            }
            for (key, after) in b {
                if !a.contains_key(key) {
                    diff_into(&path.child(key.as_str()), None, Some(after), out);
                }
            }
        }
        (Some(before), Some(after)) => {
            if before != after {
                out.push(PathDiff {
                    path: path.clone(),
                    kind: DiffKind::Modified,
                    before: Some(before.clone()),
                    after: Some(after.clone()),
                });
            }
        }
    }
}

/// Bounded history of context changes
///
/// Unsubscribes from the store on drop.
pub struct ChangeTracker {
    store: ContextStore,
    subscription: SubscriptionId,
    history: Arc<Mutex<VecDeque<ChangeRecord>>>,
}

impl std::fmt::Debug for ChangeTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeTracker")
            .field("subscription", &self.subscription)
            .field("records", &self.history.lock().len())
            .finish_non_exhaustive()
    }
}

impl ChangeTracker {
    /// Subscribe to `store` and start recording
    #[must_use]
    pub fn attach(store: &ContextStore, config: &TrackerConfig) -> Self {
        let capacity = config.history_capacity.max(1);
        let history = Arc::new(Mutex::new(VecDeque::with_capacity(capacity)));

        let sink = Arc::clone(&history);
        let subscription = store.subscribe(move |change| {
            let records = records_for_change(change);
            if records.is_empty() {
                return;
            }
            let mut history = sink.lock();
            for record in records {
                if history.len() == capacity {
                    history.pop_front();
                }
                history.push_back(record);
            }
        });

        tracing::debug!(%subscription, capacity, "change tracker attached");

        Self {
            store: store.clone(),
            subscription,
            history,
        }
    }

    /// All retained records, oldest first
    #[must_use]
    pub fn records(&self) -> Vec<ChangeRecord> {
        self.history.lock().iter().cloned().collect()
    }

    /// Most recent record
    #[must_use]
    pub fn latest(&self) -> Option<ChangeRecord> {
        self.history.lock().back().cloned()
    }

    /// Retained records of one workspace, oldest first
    #[must_use]
    pub fn records_for(&self, workspace_id: &WorkspaceId) -> Vec<ChangeRecord> {
        self.history
            .lock()
            .iter()
            .filter(|r| &r.workspace_id == workspace_id)
            .cloned()
            .collect()
    }

    /// Number of retained records
    #[must_use]
    pub fn len(&self) -> usize {
        self.history.lock().len()
    }

    /// Check if no record is retained
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history.lock().is_empty()
    }

    /// Forget all records
    pub fn clear(&self) {
        self.history.lock().clear();
    }
}

impl Drop for ChangeTracker {
    fn drop(&mut self) {
        self.store.unsubscribe(self.subscription);
    }
}

fn records_for_change(change: &ContextChange) -> Vec<ChangeRecord> {
    let at = Utc::now();
    change
        .scope
        .workspaces()
        .into_iter()
        .filter_map(|workspace_id| {
            let diffs = diff(
                change.previous.get(workspace_id),
                change.current.get(workspace_id),
            );
            (!diffs.is_empty()).then(|| ChangeRecord {
                version: change.version,
                workspace_id: workspace_id.clone(),
                at,
                diffs,
            })
        })
        .collect()
}
