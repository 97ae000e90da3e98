//! Workspace-scoped context store
//!
//! Provides [`ContextStore`], a cloneable handle onto one mapping
//! `workspace id → context tree`. Every effective write produces one new
//! immutable [`Snapshot`]; unrelated workspaces and branches are shared with
//! the previous snapshot.
//!
//! Writes never fail. A write against an empty or unknown workspace, or with
//! an unparsable path, is dropped with a warning and an optional
//! [`StoreDiagnostic`].

use crate::change::{ChangeScope, ContextChange, Listener, SubscriptionId};
use crate::diagnostic::{DropReason, StoreDiagnostic, WriteOutcome};
use crate::error::ContextError;
use crate::path::{ContextPath, PathError};
use crate::template;
use crate::value::ContextValue;
use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::{RwLock, RwLockWriteGuard};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::Arc;

/// Workspace identifier (owner of one context namespace)
#[derive(
    Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct WorkspaceId(String);

impl WorkspaceId {
    /// Create workspace id
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Empty id means "no workspace selected"
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for WorkspaceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WorkspaceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for WorkspaceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Immutable view of the whole mapping at one version
///
/// Cloning is O(1).
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    version: u64,
    contexts: im::HashMap<WorkspaceId, ContextValue>,
}

impl Snapshot {
    /// Version, advanced by one per effective write
    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Tree of one workspace
    #[inline]
    #[must_use]
    pub fn get(&self, workspace_id: &WorkspaceId) -> Option<&ContextValue> {
        self.contexts.get(workspace_id)
    }

    /// Check if workspace exists
    #[inline]
    #[must_use]
    pub fn contains(&self, workspace_id: &WorkspaceId) -> bool {
        self.contexts.contains_key(workspace_id)
    }

    /// Known workspaces, sorted
    #[must_use]
    pub fn workspace_ids(&self) -> Vec<WorkspaceId> {
        let mut ids: Vec<_> = self.contexts.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of workspaces
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    /// Check if no workspace exists
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// Reference identity of the whole mapping
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.contexts.ptr_eq(&other.contexts)
    }

    /// Whole mapping as a JSON object
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.contexts
                .iter()
                .map(|(id, tree)| (id.to_string(), tree.to_json()))
                .collect(),
        )
    }
}

#[derive(Default)]
struct StoreState {
    snapshot: Snapshot,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
    diagnostics: Option<Sender<StoreDiagnostic>>,
}

/// Shared handle onto the context mapping
///
/// Clones share the same state; inject one handle per session into the
/// navigator, the session and any tracker.
#[derive(Clone, Default)]
pub struct ContextStore {
    inner: Arc<RwLock<StoreState>>,
}

impl Debug for ContextStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let state = self.inner.read();
        f.debug_struct("ContextStore")
            .field("version", &state.snapshot.version)
            .field("workspaces", &state.snapshot.contexts.len())
            .field("listeners", &state.listeners.len())
            .finish()
    }
}

impl ContextStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create store with an attached diagnostic channel
    #[must_use]
    pub fn with_diagnostics() -> (Self, Receiver<StoreDiagnostic>) {
        let store = Self::new();
        let rx = store.diagnostics();
        (store, rx)
    }

    /// Attach a diagnostic channel, replacing any previous one
    #[must_use]
    pub fn diagnostics(&self) -> Receiver<StoreDiagnostic> {
        let (tx, rx) = channel::unbounded();
        self.inner.write().diagnostics = Some(tx);
        rx
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Current snapshot
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.inner.read().snapshot.clone()
    }

    /// Current version
    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.read().snapshot.version
    }

    /// Known workspaces, sorted
    #[must_use]
    pub fn workspace_ids(&self) -> Vec<WorkspaceId> {
        self.inner.read().snapshot.workspace_ids()
    }

    /// Full tree of a workspace, or the value at `path`
    ///
    /// `None` for an unknown workspace, a missing path, or a path that does
    /// not parse.
    #[must_use]
    pub fn get_context(
        &self,
        workspace_id: &WorkspaceId,
        path: Option<&str>,
    ) -> Option<ContextValue> {
        match path {
            None => self.tree(workspace_id),
            Some(raw) => {
                let path: ContextPath = raw.parse().ok()?;
                self.get_at(workspace_id, &path)
            }
        }
    }

    /// Value at a parsed path
    #[must_use]
    pub fn get_at(&self, workspace_id: &WorkspaceId, path: &ContextPath) -> Option<ContextValue> {
        let state = self.inner.read();
        state
            .snapshot
            .contexts
            .get(workspace_id)?
            .get_path(path)
            .cloned()
    }

    /// Full tree of a workspace
    #[inline]
    #[must_use]
    pub fn tree(&self, workspace_id: &WorkspaceId) -> Option<ContextValue> {
        self.inner.read().snapshot.contexts.get(workspace_id).cloned()
    }

    /// Existence check, tolerant of missing intermediates
    #[inline]
    #[must_use]
    pub fn has_path(&self, workspace_id: &WorkspaceId, path: &str) -> bool {
        self.get_context(workspace_id, Some(path)).is_some()
    }

    /// Replace every `{{dotted.path}}` token with the resolved value
    #[must_use]
    pub fn interpolate(&self, template: &str, workspace_id: &WorkspaceId) -> String {
        let tree = self.tree(workspace_id);
        template::interpolate(template, tree.as_ref())
    }

    /// Workspace tree as JSON
    #[must_use]
    pub fn export_context(&self, workspace_id: &WorkspaceId) -> Option<serde_json::Value> {
        self.tree(workspace_id).map(|tree| tree.to_json())
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Replace the whole mapping
    ///
    /// No-op when every workspace is deep-equal to the current mapping.
    /// Workspaces whose tree is unchanged keep their existing reference.
    /// Entries with an empty id are dropped.
    pub fn set_all<I, K, V>(&self, contexts: I) -> WriteOutcome
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<WorkspaceId>,
        V: Into<ContextValue>,
    {
        let mut incoming: Vec<(WorkspaceId, ContextValue)> = Vec::new();
        for (id, tree) in contexts {
            let id = id.into();
            if id.is_empty() {
                let _ = self.drop_write(&id, "", DropReason::NoWorkspace);
            } else {
                incoming.push((id, tree.into()));
            }
        }

        let state = self.inner.write();
        let old = state.snapshot.contexts.clone();

        let mut next = im::HashMap::new();
        let mut changed = Vec::new();
        for (id, tree) in incoming {
            match old.get(&id) {
                Some(existing) if *existing == tree => {
                    next.insert(id, existing.clone());
                }
                _ => {
                    changed.push(id.clone());
                    next.insert(id, tree);
                }
            }
        }
        for id in old.keys() {
            if !next.contains_key(id) {
                changed.push(id.clone());
            }
        }

        if changed.is_empty() {
            tracing::trace!("set_all unchanged");
            return WriteOutcome::Unchanged;
        }

        changed.sort();
        changed.dedup();
        self.publish(state, next, ChangeScope::All { changed })
    }

    /// Create or replace a workspace namespace
    ///
    /// A `null` initial context becomes an empty object.
    pub fn insert_workspace(
        &self,
        workspace_id: &WorkspaceId,
        initial: impl Into<ContextValue>,
    ) -> WriteOutcome {
        if workspace_id.is_empty() {
            return self.drop_write(workspace_id, "", DropReason::NoWorkspace);
        }

        let tree = match initial.into() {
            ContextValue::Null => ContextValue::object(),
            other => other,
        };

        let state = self.inner.write();
        if state.snapshot.contexts.get(workspace_id) == Some(&tree) {
            return WriteOutcome::Unchanged;
        }

        let next = state.snapshot.contexts.update(workspace_id.clone(), tree);
        let scope = ChangeScope::Workspace {
            workspace_id: workspace_id.clone(),
        };
        self.publish(state, next, scope)
    }

    /// Create a workspace namespace only if it does not exist yet
    pub fn ensure_workspace(
        &self,
        workspace_id: &WorkspaceId,
        initial: impl Into<ContextValue>,
    ) -> WriteOutcome {
        if self.inner.read().snapshot.contains(workspace_id) {
            return WriteOutcome::Unchanged;
        }
        self.insert_workspace(workspace_id, initial)
    }

    /// Drop a workspace namespace
    pub fn remove_workspace(&self, workspace_id: &WorkspaceId) -> WriteOutcome {
        let state = self.inner.write();
        if !state.snapshot.contains(workspace_id) {
            return WriteOutcome::Unchanged;
        }

        let next = state.snapshot.contexts.without(workspace_id);
        let scope = ChangeScope::Removed {
            workspace_id: workspace_id.clone(),
        };
        self.publish(state, next, scope)
    }

    /// Replace a workspace tree from JSON text
    ///
    /// # Errors
    /// Returns error if the text is not valid JSON or not an object.
    pub fn import_context(
        &self,
        workspace_id: &WorkspaceId,
        json: &str,
    ) -> Result<WriteOutcome, ContextError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if !value.is_object() {
            return Err(ContextError::NotAnObject {
                workspace_id: workspace_id.clone(),
            });
        }
        Ok(self.insert_workspace(workspace_id, value))
    }

    /// Replace top-level entry `key`
    ///
    /// No-op if the new value is deep-equal to the existing one.
    pub fn update_context(
        &self,
        workspace_id: &WorkspaceId,
        key: &str,
        value: impl Into<ContextValue>,
    ) -> WriteOutcome {
        match parse_key(key) {
            Ok(path) => self.write_at(workspace_id, path, value.into()),
            Err(err) => self.drop_write(workspace_id, key, err.into()),
        }
    }

    /// Copy-on-write deep set into `key`'s subtree at `sub_path`
    ///
    /// Intermediate objects are created as needed. `key`'s object is replaced
    /// wholesale, never mutated in place.
    pub fn update_path(
        &self,
        workspace_id: &WorkspaceId,
        key: &str,
        sub_path: &str,
        value: impl Into<ContextValue>,
    ) -> WriteOutcome {
        let target = format!("{key}.{sub_path}");
        let key_path = match parse_key(key) {
            Ok(path) => path,
            Err(err) => return self.drop_write(workspace_id, &target, err.into()),
        };
        let sub: ContextPath = match sub_path.parse() {
            Ok(path) => path,
            Err(err) => return self.drop_write(workspace_id, &target, DropReason::InvalidPath(err)),
        };

        self.write_at(workspace_id, key_path.extend(sub.segments()), value.into())
    }

    /// Uniform write entry point used by node submission
    ///
    /// A single-segment path goes through [`update_context`](Self::update_context),
    /// a longer one through [`update_path`](Self::update_path).
    pub fn update_by_context_path(
        &self,
        workspace_id: &WorkspaceId,
        full_path: &str,
        value: impl Into<ContextValue>,
    ) -> WriteOutcome {
        match full_path.parse::<ContextPath>() {
            Ok(path) => self.update_at(workspace_id, &path, value),
            Err(err) => self.drop_write(workspace_id, full_path, DropReason::InvalidPath(err)),
        }
    }

    /// Typed variant of [`update_by_context_path`](Self::update_by_context_path)
    pub fn update_at(
        &self,
        workspace_id: &WorkspaceId,
        path: &ContextPath,
        value: impl Into<ContextValue>,
    ) -> WriteOutcome {
        match path.split_first() {
            None => self.drop_write(
                workspace_id,
                "",
                DropReason::InvalidPath(PathError::NotAKey(String::new())),
            ),
            Some((key, rest)) if rest.is_empty() => self.update_context(workspace_id, key, value),
            Some((key, rest)) => self.update_path(workspace_id, key, &rest.to_string(), value),
        }
    }

    // ------------------------------------------------------------------
    // Subscriptions
    // ------------------------------------------------------------------

    /// Register a listener called once per effective write
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&ContextChange) + Send + Sync + 'static,
    {
        let mut state = self.inner.write();
        state.next_subscription += 1;
        let id = SubscriptionId(state.next_subscription);
        state.listeners.push((id, Arc::new(listener)));
        tracing::debug!(subscription = %id, "listener subscribed");
        id
    }

    /// Remove a listener
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut state = self.inner.write();
        let before = state.listeners.len();
        state.listeners.retain(|(sid, _)| *sid != id);
        state.listeners.len() != before
    }

    /// Number of registered listeners
    #[inline]
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.read().listeners.len()
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn write_at(
        &self,
        workspace_id: &WorkspaceId,
        path: ContextPath,
        value: ContextValue,
    ) -> WriteOutcome {
        let target = path.to_string();
        if workspace_id.is_empty() {
            return self.drop_write(workspace_id, &target, DropReason::NoWorkspace);
        }

        let state = self.inner.write();
        let edited = state.snapshot.contexts.get(workspace_id).map(|tree| {
            if tree.get_path(&path) == Some(&value) {
                None
            } else {
                Some(tree.set_path(&path, value))
            }
        });

        match edited {
            None => {
                drop(state);
                self.drop_write(workspace_id, &target, DropReason::UnknownWorkspace)
            }
            Some(None) => {
                tracing::trace!(workspace = %workspace_id, path = %target, "write unchanged");
                WriteOutcome::Unchanged
            }
            Some(Some(tree)) => {
                let next = state.snapshot.contexts.update(workspace_id.clone(), tree);
                let scope = ChangeScope::Path {
                    workspace_id: workspace_id.clone(),
                    path,
                };
                self.publish(state, next, scope)
            }
        }
    }

    /// Swap in a new mapping, then notify listeners outside the lock
    fn publish(
        &self,
        mut state: RwLockWriteGuard<'_, StoreState>,
        contexts: im::HashMap<WorkspaceId, ContextValue>,
        scope: ChangeScope,
    ) -> WriteOutcome {
        let previous = state.snapshot.clone();
        state.snapshot = Snapshot {
            version: previous.version + 1,
            contexts,
        };
        let current = state.snapshot.clone();
        let listeners: Vec<Listener> = state.listeners.iter().map(|(_, l)| Arc::clone(l)).collect();
        drop(state);

        tracing::debug!(version = current.version, ?scope, "context updated");

        let change = ContextChange {
            version: current.version,
            scope,
            previous,
            current,
        };
        for listener in &listeners {
            listener(&change);
        }

        WriteOutcome::Applied {
            version: change.version,
        }
    }

    fn drop_write(
        &self,
        workspace_id: &WorkspaceId,
        path: &str,
        reason: DropReason,
    ) -> WriteOutcome {
        tracing::warn!(workspace = %workspace_id, path, %reason, "context write dropped");

        let sender = self.inner.read().diagnostics.clone();
        if let Some(tx) = sender {
            // Receiver may be gone; diagnostics are best-effort
            let _ = tx.send(StoreDiagnostic::WriteDropped {
                workspace_id: workspace_id.clone(),
                path: path.to_string(),
                reason: reason.clone(),
            });
        }

        WriteOutcome::Dropped(reason)
    }
}

fn parse_key(key: &str) -> Result<ContextPath, PathError> {
    let path: ContextPath = key.parse()?;
    if path.len() == 1 {
        Ok(path)
    } else {
        Err(PathError::NotAKey(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ws() -> WorkspaceId {
        WorkspaceId::new("ws-1")
    }

    fn store_with(initial: serde_json::Value) -> ContextStore {
        let store = ContextStore::new();
        let _ = store.insert_workspace(&ws(), initial);
        store
    }

    #[test]
    fn get_context_full_and_path() {
        let store = store_with(json!({"a": {"b": 1}}));
        assert_eq!(
            store.get_context(&ws(), None).unwrap().to_json(),
            json!({"a": {"b": 1}})
        );
        assert_eq!(
            store.get_context(&ws(), Some("a.b")).unwrap().to_json(),
            json!(1)
        );
    }

    #[test]
    fn get_context_missing_is_none() {
        let store = store_with(json!({"a": 1}));
        assert!(store.get_context(&ws(), Some("a.b.c")).is_none());
        assert!(store.get_context(&WorkspaceId::new("nope"), None).is_none());
        assert!(store.get_context(&ws(), Some("a..b")).is_none());
    }

    #[test]
    fn update_context_replaces_top_level_entry() {
        let store = store_with(json!({"a": {"old": true}, "b": 2}));
        let outcome = store.update_context(&ws(), "a", json!({"new": true}));
        assert!(outcome.is_applied());
        assert_eq!(
            store.tree(&ws()).unwrap().to_json(),
            json!({"a": {"new": true}, "b": 2})
        );
    }

    #[test]
    fn update_context_rejects_dotted_key() {
        let store = store_with(json!({}));
        let outcome = store.update_context(&ws(), "a.b", 1_i64);
        assert!(matches!(
            outcome,
            WriteOutcome::Dropped(DropReason::InvalidPath(PathError::NotAKey(_)))
        ));
    }

    #[test]
    fn update_path_creates_intermediates() {
        let store = store_with(json!({"campaign": {"name": "x"}}));
        let _ = store.update_path(&ws(), "campaign", "settings.budget", 100_i64);
        assert_eq!(
            store.tree(&ws()).unwrap().to_json(),
            json!({"campaign": {"name": "x", "settings": {"budget": 100}}})
        );
    }

    #[test]
    fn update_path_replaces_key_object_not_mutated() {
        let store = store_with(json!({"campaign": {"name": "x"}}));
        let before = store.get_at(&ws(), &ContextPath::single("campaign")).unwrap();
        let _ = store.update_path(&ws(), "campaign", "name", "y");
        let after = store.get_at(&ws(), &ContextPath::single("campaign")).unwrap();

        assert_eq!(before.to_json(), json!({"name": "x"}));
        assert_eq!(after.to_json(), json!({"name": "y"}));
        assert!(!before.ptr_eq(&after));
    }

    #[test]
    fn update_by_context_path_dispatches() {
        let store = store_with(json!({}));
        let _ = store.update_by_context_path(&ws(), "single", "v");
        let _ = store.update_by_context_path(&ws(), "form.q1.answer", "A");
        assert_eq!(
            store.tree(&ws()).unwrap().to_json(),
            json!({"single": "v", "form": {"q1": {"answer": "A"}}})
        );
    }

    #[test]
    fn equal_write_is_unchanged_and_keeps_identity() {
        let store = store_with(json!({}));
        let first = store.update_by_context_path(&ws(), "a.b", json!({"x": 1}));
        let snap = store.snapshot();
        let second = store.update_by_context_path(&ws(), "a.b", json!({"x": 1}));

        assert!(first.is_applied());
        assert_eq!(second, WriteOutcome::Unchanged);
        assert!(snap.ptr_eq(&store.snapshot()));
        assert_eq!(snap.version(), store.version());
    }

    #[test]
    fn sibling_workspace_untouched() {
        let store = store_with(json!({"a": 1}));
        let other = WorkspaceId::new("ws-2");
        let _ = store.insert_workspace(&other, json!({"z": {"deep": true}}));
        let before = store.tree(&other).unwrap();

        let _ = store.update_by_context_path(&ws(), "a", 2_i64);

        assert!(before.ptr_eq(&store.tree(&other).unwrap()));
    }

    #[test]
    fn writes_to_unknown_workspace_are_dropped() {
        let (store, rx) = ContextStore::with_diagnostics();
        let outcome = store.update_by_context_path(&WorkspaceId::new("ghost"), "a", 1_i64);

        assert_eq!(outcome, WriteOutcome::Dropped(DropReason::UnknownWorkspace));
        assert!(store.workspace_ids().is_empty());
        assert!(matches!(
            rx.try_recv().unwrap(),
            StoreDiagnostic::WriteDropped {
                reason: DropReason::UnknownWorkspace,
                ..
            }
        ));
    }

    #[test]
    fn writes_without_workspace_are_dropped() {
        let store = store_with(json!({}));
        let outcome = store.update_by_context_path(&WorkspaceId::default(), "a", 1_i64);
        assert_eq!(outcome, WriteOutcome::Dropped(DropReason::NoWorkspace));
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn invalid_path_dropped_not_panicking() {
        let (store, rx) = ContextStore::with_diagnostics();
        let _ = store.insert_workspace(&ws(), json!({}));
        let outcome = store.update_by_context_path(&ws(), "a..b", 1_i64);
        assert!(outcome.is_dropped());
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn set_all_noop_when_deep_equal() {
        let store = ContextStore::new();
        let _ = store.set_all([("a", json!({"x": 1})), ("b", json!({}))]);
        let snap = store.snapshot();

        let outcome = store.set_all([("b", json!({})), ("a", json!({"x": 1}))]);
        assert_eq!(outcome, WriteOutcome::Unchanged);
        assert!(snap.ptr_eq(&store.snapshot()));
    }

    #[test]
    fn set_all_keeps_identity_of_equal_workspaces() {
        let store = ContextStore::new();
        let _ = store.set_all([("a", json!({"x": {"y": 1}})), ("b", json!({}))]);
        let a_before = store.tree(&"a".into()).unwrap();

        let _ = store.set_all([("a", json!({"x": {"y": 1}})), ("b", json!({"k": 1}))]);

        assert!(a_before.ptr_eq(&store.tree(&"a".into()).unwrap()));
        assert_eq!(store.tree(&"b".into()).unwrap().to_json(), json!({"k": 1}));
    }

    #[test]
    fn set_all_drops_missing_workspaces() {
        let store = ContextStore::new();
        let _ = store.set_all([("a", json!({})), ("b", json!({}))]);
        let _ = store.set_all([("a", json!({}))]);
        assert_eq!(store.workspace_ids(), vec![WorkspaceId::new("a")]);
    }

    #[test]
    fn set_all_skips_empty_workspace_id() {
        let (store, diagnostics) = ContextStore::with_diagnostics();
        let outcome = store.set_all([("", json!({"a": 1})), ("ws-1", json!({"b": 2}))]);

        assert!(outcome.is_applied());
        assert_eq!(store.workspace_ids(), vec![ws()]);
        assert!(store.get_context(&WorkspaceId::default(), None).is_none());
        assert!(matches!(
            diagnostics.try_recv(),
            Ok(StoreDiagnostic::WriteDropped {
                reason: DropReason::NoWorkspace,
                ..
            })
        ));
    }

    #[test]
    fn rewriting_integer_as_float_is_unchanged() {
        let store = store_with(json!({}));
        let first = store.update_context(&ws(), "a", json!(1));
        let version = store.version();

        let second = store.update_context(&ws(), "a", json!(1.0));

        assert!(first.is_applied());
        assert_eq!(second, WriteOutcome::Unchanged);
        assert_eq!(store.version(), version);
    }

    #[test]
    fn subscribers_notified_once_per_effective_write() {
        let store = store_with(json!({}));
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let _ = store.subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        let _ = store.update_by_context_path(&ws(), "a.b", 1_i64);
        let _ = store.update_by_context_path(&ws(), "a.b", 1_i64);
        let _ = store.update_by_context_path(&WorkspaceId::new("ghost"), "a", 1_i64);

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn change_carries_both_snapshots() {
        let store = store_with(json!({"a": 1}));
        let captured = Arc::new(parking_lot::Mutex::new(None));
        let sink = Arc::clone(&captured);
        let _ = store.subscribe(move |change| {
            *sink.lock() = Some(change.clone());
        });

        let _ = store.update_by_context_path(&ws(), "a", 2_i64);

        let change = captured.lock().take().unwrap();
        assert_eq!(change.previous.get(&ws()).unwrap().to_json(), json!({"a": 1}));
        assert_eq!(change.current.get(&ws()).unwrap().to_json(), json!({"a": 2}));
        assert_eq!(change.version, change.current.version());
        assert!(matches!(change.scope, ChangeScope::Path { .. }));
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let store = store_with(json!({}));
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let id = store.subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        let _ = store.update_by_context_path(&ws(), "a", 1_i64);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn listener_may_read_store() {
        let store = store_with(json!({}));
        let reader = store.clone();
        let observed = Arc::new(parking_lot::Mutex::new(None));
        let sink = Arc::clone(&observed);
        let _ = store.subscribe(move |_| {
            *sink.lock() = reader.get_context(&WorkspaceId::new("ws-1"), Some("a"));
        });

        let _ = store.update_by_context_path(&ws(), "a", "v");
        assert_eq!(observed.lock().clone(), Some(ContextValue::from("v")));
    }

    #[test]
    fn import_and_export_round_trip() {
        let store = ContextStore::new();
        let outcome = store
            .import_context(&ws(), r#"{"form": {"q1": "A"}}"#)
            .unwrap();
        assert!(outcome.is_applied());
        assert_eq!(
            store.export_context(&ws()).unwrap(),
            json!({"form": {"q1": "A"}})
        );
    }

    #[test]
    fn import_rejects_non_object() {
        let store = ContextStore::new();
        assert!(matches!(
            store.import_context(&ws(), "[1, 2]"),
            Err(ContextError::NotAnObject { .. })
        ));
        assert!(matches!(
            store.import_context(&ws(), "{not json"),
            Err(ContextError::Json(_))
        ));
    }

    #[test]
    fn ensure_workspace_keeps_existing_data() {
        let store = store_with(json!({"kept": true}));
        assert_eq!(
            store.ensure_workspace(&ws(), json!({})),
            WriteOutcome::Unchanged
        );
        assert!(store.has_path(&ws(), "kept"));
    }

    #[test]
    fn remove_workspace() {
        let store = store_with(json!({}));
        assert!(store.remove_workspace(&ws()).is_applied());
        assert_eq!(store.remove_workspace(&ws()), WriteOutcome::Unchanged);
        assert!(store.tree(&ws()).is_none());
    }

    #[test]
    fn has_path_tolerates_missing_intermediates() {
        let store = store_with(json!({"a": {"b": null}}));
        assert!(store.has_path(&ws(), "a.b"));
        assert!(!store.has_path(&ws(), "a.b.c"));
        assert!(!store.has_path(&ws(), "x.y.z"));
        assert!(!store.has_path(&WorkspaceId::new("ghost"), "a"));
    }
}
