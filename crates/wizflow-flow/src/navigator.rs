//! Linear flow navigator
//!
//! Walks the ordered nodes of one scenario. The index only changes on an
//! explicit transition; each index change (and each completion) advances
//! the epoch, which lets sessions recognise responses to requests issued
//! before the transition.
//!
//! Transitions that make no sense in the current state are no-ops reported
//! as [`Transition::Ignored`], never panics.

use crate::model::{Node, Scenario};
use serde::Serialize;
use std::fmt::{self, Display, Formatter};
use wizflow_context::{ContextStore, ContextValue, WorkspaceId, WriteOutcome};

/// Why a transition was not applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "camelCase")]
pub enum IgnoreReason {
    /// Scenario has no nodes
    Empty,
    /// Issued for a node that is no longer current
    StaleNode {
        /// Node the caller believed current
        expected: String,
        /// Node actually current
        current: Option<String>,
    },
    /// Response to a request issued before the last transition
    StaleRequest,
    /// Jump target outside the scenario
    OutOfRange {
        /// Requested index
        index: usize,
        /// Number of nodes
        len: usize,
    },
}

impl Display for IgnoreReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("scenario is empty"),
            Self::StaleNode { expected, current } => write!(
                f,
                "node '{expected}' is not current (current: {})",
                current.as_deref().unwrap_or("none")
            ),
            Self::StaleRequest => f.write_str("request predates the last transition"),
            Self::OutOfRange { index, len } => write!(f, "index {index} out of range 0..{len}"),
        }
    }
}

/// Result of a navigation call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Transition {
    /// Moved to the next node
    Advanced {
        /// Previous index
        from: usize,
        /// New index
        to: usize,
    },
    /// Submitted the last node; the index is unchanged
    Completed {
        /// Last node
        node_id: String,
    },
    /// Moved to the previous node
    Retreated {
        /// Previous index
        from: usize,
        /// New index
        to: usize,
    },
    /// `back` on the first node; the caller decides where to go
    Exited,
    /// Direct jump
    Jumped {
        /// Previous index
        from: usize,
        /// New index
        to: usize,
    },
    /// Nothing happened
    Ignored(IgnoreReason),
}

impl Transition {
    /// Check if the transition was applied
    #[inline]
    #[must_use]
    pub fn is_applied(&self) -> bool {
        !matches!(self, Self::Ignored(_))
    }
}

/// Cursor over one scenario's nodes, bound to one workspace
#[derive(Debug, Clone)]
pub struct Navigator {
    store: ContextStore,
    workspace_id: WorkspaceId,
    scenario_id: String,
    nodes: Vec<Node>,
    index: usize,
    epoch: u64,
}

impl Navigator {
    /// Create navigator at the first node
    ///
    /// Nodes are sorted by `order`. Writes go to `workspace_id`; an empty or
    /// unknown workspace makes the store drop them.
    #[must_use]
    pub fn new(store: ContextStore, workspace_id: WorkspaceId, scenario: &Scenario) -> Self {
        let mut nodes = scenario.nodes.clone();
        nodes.sort_by_key(|n| n.order);
        Self {
            store,
            workspace_id,
            scenario_id: scenario.id.clone(),
            nodes,
            index: 0,
            epoch: 0,
        }
    }

    /// Workspace writes go to
    #[inline]
    #[must_use]
    pub fn workspace_id(&self) -> &WorkspaceId {
        &self.workspace_id
    }

    /// Scenario being walked
    #[inline]
    #[must_use]
    pub fn scenario_id(&self) -> &str {
        &self.scenario_id
    }

    /// Store handle
    #[inline]
    #[must_use]
    pub fn store(&self) -> &ContextStore {
        &self.store
    }

    /// Nodes in traversal order
    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of nodes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if scenario has no nodes
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Current index
    #[inline]
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.index
    }

    /// Transition counter
    #[inline]
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Current node, `None` for an empty scenario
    #[inline]
    #[must_use]
    pub fn current_node(&self) -> Option<&Node> {
        self.nodes.get(self.index)
    }

    /// Index is 0
    #[inline]
    #[must_use]
    pub fn is_first_node(&self) -> bool {
        !self.nodes.is_empty() && self.index == 0
    }

    /// Index is the last one
    #[inline]
    #[must_use]
    pub fn is_last_node(&self) -> bool {
        !self.nodes.is_empty() && self.index == self.nodes.len() - 1
    }

    /// One-based position and total, `(0, 0)` when empty
    #[must_use]
    pub fn progress(&self) -> (usize, usize) {
        if self.nodes.is_empty() {
            (0, 0)
        } else {
            (self.index + 1, self.nodes.len())
        }
    }

    /// Bind the current node's result and move forward
    ///
    /// The result is written to the node's `contextPath`; without a path, or
    /// without a result, nothing is written. On the last node the index
    /// stays and [`Transition::Completed`] is returned.
    pub fn submit(&mut self, result: Option<ContextValue>) -> Transition {
        let Some(node) = self.nodes.get(self.index) else {
            return self.ignore(IgnoreReason::Empty);
        };

        if let (Some(path), Some(value)) = (&node.context_path, result) {
            let outcome = self.store.update_at(&self.workspace_id, path, value);
            if let WriteOutcome::Applied { version } = outcome {
                tracing::debug!(node = %node.id, path = %path, version, "node result bound");
            }
        }

        self.epoch += 1;
        if self.index + 1 == self.nodes.len() {
            let node_id = node.id.clone();
            tracing::debug!(scenario = %self.scenario_id, node = %node_id, "scenario completed");
            return Transition::Completed { node_id };
        }

        let from = self.index;
        self.index += 1;
        tracing::debug!(scenario = %self.scenario_id, from, to = self.index, "advanced");
        Transition::Advanced {
            from,
            to: self.index,
        }
    }

    /// Move to the previous node, or exit from the first one
    ///
    /// Never writes to the store.
    pub fn back(&mut self) -> Transition {
        if self.nodes.is_empty() {
            return self.ignore(IgnoreReason::Empty);
        }
        if self.index == 0 {
            tracing::debug!(scenario = %self.scenario_id, "exited from first node");
            return Transition::Exited;
        }

        let from = self.index;
        self.index -= 1;
        self.epoch += 1;
        tracing::debug!(scenario = %self.scenario_id, from, to = self.index, "retreated");
        Transition::Retreated {
            from,
            to: self.index,
        }
    }

    /// [`submit`](Self::submit) only if `node_id` is still current
    pub fn submit_for(&mut self, node_id: &str, result: Option<ContextValue>) -> Transition {
        match self.check_current(node_id) {
            Some(reason) => self.ignore(reason),
            None => self.submit(result),
        }
    }

    /// [`back`](Self::back) only if `node_id` is still current
    pub fn back_from(&mut self, node_id: &str) -> Transition {
        match self.check_current(node_id) {
            Some(reason) => self.ignore(reason),
            None => self.back(),
        }
    }

    /// Jump to `index` without binding anything
    pub fn go_to(&mut self, index: usize) -> Transition {
        if self.nodes.is_empty() {
            return self.ignore(IgnoreReason::Empty);
        }
        if index >= self.nodes.len() {
            return self.ignore(IgnoreReason::OutOfRange {
                index,
                len: self.nodes.len(),
            });
        }

        let from = self.index;
        self.index = index;
        self.epoch += 1;
        tracing::debug!(scenario = %self.scenario_id, from, to = index, "jumped");
        Transition::Jumped { from, to: index }
    }

    /// Return to the first node
    pub fn reset(&mut self) -> Transition {
        self.go_to(0)
    }

    fn check_current(&self, node_id: &str) -> Option<IgnoreReason> {
        let current = self.current_node().map(|n| n.id.as_str());
        if current == Some(node_id) {
            None
        } else {
            Some(IgnoreReason::StaleNode {
                expected: node_id.to_string(),
                current: current.map(str::to_string),
            })
        }
    }

    fn ignore(&self, reason: IgnoreReason) -> Transition {
        tracing::warn!(
            scenario = %self.scenario_id,
            index = self.index,
            %reason,
            "transition ignored"
        );
        Transition::Ignored(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn scenario() -> Scenario {
        Scenario::new("s")
            .with_node(Node::new("q1", "form-step").with_context_path("form.q1".parse().unwrap()))
            .with_node(Node::new("note", "info-step"))
            .with_node(Node::new("q2", "form-step").with_context_path("form.q2".parse().unwrap()))
    }

    fn navigator() -> (Navigator, ContextStore) {
        let store = ContextStore::new();
        let ws = WorkspaceId::new("ws");
        let _ = store.insert_workspace(&ws, json!({}));
        (Navigator::new(store.clone(), ws, &scenario()), store)
    }

    #[test]
    fn starts_at_first_node() {
        let (nav, _) = navigator();
        assert_eq!(nav.current_node().unwrap().id, "q1");
        assert!(nav.is_first_node());
        assert!(!nav.is_last_node());
        assert_eq!(nav.progress(), (1, 3));
    }

    #[test]
    fn submit_binds_and_advances() {
        let (mut nav, store) = navigator();
        let t = nav.submit(Some(json!({"answer": "A"}).into()));

        assert_eq!(t, Transition::Advanced { from: 0, to: 1 });
        assert_eq!(
            store.export_context(&WorkspaceId::new("ws")).unwrap(),
            json!({"form": {"q1": {"answer": "A"}}})
        );
    }

    #[test]
    fn submit_without_context_path_discards_result() {
        let (mut nav, store) = navigator();
        let _ = nav.go_to(1);
        let version = store.version();

        let t = nav.submit(Some("ignored".into()));

        assert_eq!(t, Transition::Advanced { from: 1, to: 2 });
        assert_eq!(store.version(), version);
    }

    #[test]
    fn submit_on_last_node_completes() {
        let (mut nav, store) = navigator();
        let _ = nav.go_to(2);
        let t = nav.submit(Some("B".into()));

        assert_eq!(
            t,
            Transition::Completed {
                node_id: "q2".to_string()
            }
        );
        assert_eq!(nav.current_index(), 2);
        assert!(store.has_path(&WorkspaceId::new("ws"), "form.q2"));
    }

    #[test]
    fn back_never_writes() {
        let (mut nav, store) = navigator();
        let _ = nav.submit(None);
        let version = store.version();

        assert_eq!(nav.back(), Transition::Retreated { from: 1, to: 0 });
        assert_eq!(nav.back(), Transition::Exited);
        assert_eq!(nav.current_index(), 0);
        assert_eq!(store.version(), version);
    }

    #[test]
    fn stale_node_transitions_are_ignored() {
        let (mut nav, _) = navigator();
        let _ = nav.submit(None);

        let t = nav.submit_for("q1", Some("late".into()));
        assert!(matches!(
            t,
            Transition::Ignored(IgnoreReason::StaleNode { ref expected, .. }) if expected == "q1"
        ));
        assert_eq!(nav.current_index(), 1);

        assert!(!nav.back_from("q1").is_applied());
        assert!(nav.back_from("note").is_applied());
    }

    #[test]
    fn go_to_out_of_range_is_ignored() {
        let (mut nav, _) = navigator();
        let epoch = nav.epoch();
        assert_eq!(
            nav.go_to(3),
            Transition::Ignored(IgnoreReason::OutOfRange { index: 3, len: 3 })
        );
        assert_eq!(nav.epoch(), epoch);
    }

    #[test]
    fn empty_scenario_is_inert() {
        let mut nav =
            Navigator::new(ContextStore::new(), WorkspaceId::new("ws"), &Scenario::new("e"));
        assert!(nav.current_node().is_none());
        assert!(!nav.is_first_node());
        assert!(!nav.is_last_node());
        assert_eq!(nav.progress(), (0, 0));
        assert_eq!(nav.submit(None), Transition::Ignored(IgnoreReason::Empty));
        assert_eq!(nav.back(), Transition::Ignored(IgnoreReason::Empty));
        assert_eq!(nav.reset(), Transition::Ignored(IgnoreReason::Empty));
    }

    #[test]
    fn epoch_advances_on_every_applied_transition() {
        let (mut nav, _) = navigator();
        let _ = nav.submit(None);
        let _ = nav.back();
        let _ = nav.back();
        assert_eq!(nav.epoch(), 2);
        let _ = nav.reset();
        assert_eq!(nav.epoch(), 3);
    }

    #[test]
    fn unset_workspace_writes_are_dropped() {
        let store = ContextStore::new();
        let rx = store.diagnostics();
        let mut nav = Navigator::new(store.clone(), WorkspaceId::default(), &scenario());

        let t = nav.submit(Some("A".into()));

        assert_eq!(t, Transition::Advanced { from: 0, to: 1 });
        assert!(store.snapshot().is_empty());
        assert_eq!(rx.len(), 1);
    }

    #[test]
    fn nodes_sorted_by_order() {
        let scenario = Scenario::new("s")
            .with_node(Node::new("b", "x").with_order(2))
            .with_node(Node::new("a", "x").with_order(1))
            .with_node(Node::new("c", "x").with_order(2));
        let nav = Navigator::new(ContextStore::new(), WorkspaceId::new("ws"), &scenario);
        let ids: Vec<&str> = nav.nodes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
