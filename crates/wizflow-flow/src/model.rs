//! Workspace, scenario and node model
//!
//! Loaded once per session from JSON or YAML (camelCase fields) and then
//! read-only. Nodes are sorted by `order` when a workspace is loaded; ties
//! keep file order.

use crate::attrs::NodeAttrs;
use crate::error::FlowError;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::path::Path;
use wizflow_context::{ContextPath, WorkspaceId};

/// A step in a scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Unique id within its scenario
    pub id: String,

    /// Human-readable title
    #[serde(default)]
    pub label: String,

    /// Where the step's result is written; `None` discards it
    #[serde(
        default,
        deserialize_with = "empty_path_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub context_path: Option<ContextPath>,

    /// Symbolic flow step id resolved to a renderer
    pub tpl_file: String,

    /// Step-kind specific attributes
    #[serde(default)]
    pub attrs: NodeAttrs,

    /// Position in the scenario
    #[serde(default)]
    pub order: i64,
}

impl Node {
    /// Create node without context path
    #[must_use]
    pub fn new(id: impl Into<String>, tpl_file: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: String::new(),
            context_path: None,
            tpl_file: tpl_file.into(),
            attrs: NodeAttrs::default(),
            order: 0,
        }
    }

    /// Set label
    #[inline]
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set context path
    #[inline]
    #[must_use]
    pub fn with_context_path(mut self, path: ContextPath) -> Self {
        self.context_path = Some(path);
        self
    }

    /// Set attributes
    #[inline]
    #[must_use]
    pub fn with_attrs(mut self, attrs: NodeAttrs) -> Self {
        self.attrs = attrs;
        self
    }

    /// Set order
    #[inline]
    #[must_use]
    pub fn with_order(mut self, order: i64) -> Self {
        self.order = order;
        self
    }
}

fn empty_path_as_none<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<ContextPath>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(path) => path.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Ordered sequence of nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    /// Unique id within its workspace
    pub id: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Owning workspace; filled from the containing workspace on load
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<WorkspaceId>,

    /// Steps in traversal order
    #[serde(default)]
    pub nodes: Vec<Node>,

    /// System message for LLM steps without their own
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_message: Option<String>,
}

impl Scenario {
    /// Create empty scenario
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            workspace_id: None,
            nodes: Vec::new(),
            system_message: None,
        }
    }

    /// Append a node
    #[inline]
    #[must_use]
    pub fn with_node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    /// Set system message
    #[inline]
    #[must_use]
    pub fn with_system_message(mut self, message: impl Into<String>) -> Self {
        self.system_message = Some(message.into());
        self
    }

    /// Sort nodes by `order`, keeping file order for ties
    pub fn sort_nodes(&mut self) {
        self.nodes.sort_by_key(|n| n.order);
    }

    /// Find a node by id
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// Owner of one context namespace and its scenarios
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    /// Workspace id (context namespace key)
    pub id: WorkspaceId,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Scenarios
    #[serde(default)]
    pub scenarios: Vec<Scenario>,

    /// Context seeded when the namespace is first created
    #[serde(default = "empty_object")]
    pub initial_context: serde_json::Value,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl Workspace {
    /// Create empty workspace
    #[must_use]
    pub fn new(id: impl Into<WorkspaceId>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            scenarios: Vec::new(),
            initial_context: empty_object(),
        }
    }

    /// Set display name
    #[inline]
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Add a scenario
    #[inline]
    #[must_use]
    pub fn with_scenario(mut self, scenario: Scenario) -> Self {
        self.scenarios.push(scenario);
        self
    }

    /// Set initial context
    #[inline]
    #[must_use]
    pub fn with_initial_context(mut self, context: serde_json::Value) -> Self {
        self.initial_context = context;
        self
    }

    /// Find a scenario by id
    #[must_use]
    pub fn scenario(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id == id)
    }

    /// Parse from JSON text and normalize
    ///
    /// # Errors
    /// Returns error on malformed JSON or invalid structure.
    pub fn from_json_str(text: &str) -> Result<Self, FlowError> {
        serde_json::from_str::<Self>(text)?.normalized()
    }

    /// Parse from YAML text and normalize
    ///
    /// # Errors
    /// Returns error on malformed YAML or invalid structure.
    pub fn from_yaml_str(text: &str) -> Result<Self, FlowError> {
        serde_yaml::from_str::<Self>(text)?.normalized()
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FlowError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| FlowError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let workspace = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_str(&text)?,
            _ => Self::from_json_str(&text)?,
        };

        tracing::debug!(
            path = %path.display(),
            workspace = %workspace.id,
            scenarios = workspace.scenarios.len(),
            "workspace loaded"
        );
        Ok(workspace)
    }

    /// Sort nodes, fill scenario owners and check id uniqueness
    ///
    /// # Errors
    /// Returns error on an empty workspace id, a non-object initial
    /// context, duplicate ids, or a scenario owned by another workspace.
    pub fn normalized(mut self) -> Result<Self, FlowError> {
        if self.id.is_empty() {
            return Err(FlowError::InvalidWorkspace("workspace id is empty".to_string()));
        }
        match &self.initial_context {
            serde_json::Value::Object(_) => {}
            serde_json::Value::Null => self.initial_context = empty_object(),
            _ => {
                return Err(FlowError::InvalidWorkspace(format!(
                    "initialContext of '{}' must be an object",
                    self.id
                )))
            }
        }

        let mut scenario_ids = HashSet::new();
        for scenario in &mut self.scenarios {
            if !scenario_ids.insert(scenario.id.clone()) {
                return Err(FlowError::DuplicateId {
                    kind: "scenario",
                    id: scenario.id.clone(),
                });
            }
            match &scenario.workspace_id {
                Some(owner) if *owner != self.id => {
                    return Err(FlowError::InvalidWorkspace(format!(
                        "scenario '{}' belongs to workspace '{owner}', not '{}'",
                        scenario.id, self.id
                    )))
                }
                Some(_) => {}
                None => scenario.workspace_id = Some(self.id.clone()),
            }

            let mut node_ids = HashSet::new();
            for node in &scenario.nodes {
                if !node_ids.insert(node.id.as_str()) {
                    return Err(FlowError::DuplicateId {
                        kind: "node",
                        id: node.id.clone(),
                    });
                }
            }
            scenario.sort_nodes();
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs::NodeType;
    use pretty_assertions::assert_eq;

    const WORKSPACE_JSON: &str = r#"{
        "id": "acme",
        "name": "Acme",
        "initialContext": {"brand": {"name": "Acme"}},
        "scenarios": [{
            "id": "launch",
            "name": "Launch",
            "nodes": [
                {"id": "b", "label": "Second", "tplFile": "info-step", "order": 2,
                 "attrs": {"kind": "info", "content": "Hi {{brand.name}}"}},
                {"id": "a", "label": "First", "tplFile": "form-step", "order": 1,
                 "contextPath": "form.a",
                 "attrs": {"kind": "form", "fields": [{"name": "answer", "label": "Answer", "required": true}]}},
                {"id": "c", "tplFile": "fancy-step", "order": 2, "contextPath": ""}
            ]
        }]
    }"#;

    #[test]
    fn loads_and_sorts_nodes() {
        let ws = Workspace::from_json_str(WORKSPACE_JSON).unwrap();
        let scenario = ws.scenario("launch").unwrap();

        let ids: Vec<&str> = scenario.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(scenario.workspace_id, Some(WorkspaceId::new("acme")));
        assert_eq!(
            scenario.node("a").unwrap().context_path,
            Some("form.a".parse().unwrap())
        );
        assert_eq!(scenario.node("c").unwrap().context_path, None);
        assert_eq!(scenario.node("c").unwrap().attrs.node_type(), NodeType::Custom);
    }

    #[test]
    fn loads_yaml() {
        let yaml = r"
id: acme
scenarios:
  - id: s
    nodes:
      - id: q1
        tplFile: form-step
        contextPath: form.q1
        attrs:
          kind: form
          fields:
            - name: answer
              label: Answer
";
        let ws = Workspace::from_yaml_str(yaml).unwrap();
        let node = &ws.scenario("s").unwrap().nodes[0];
        assert_eq!(node.attrs.node_type(), NodeType::Form);
        assert_eq!(ws.initial_context, serde_json::json!({}));
    }

    #[test]
    fn rejects_duplicate_node_ids() {
        let json = r#"{"id": "w", "scenarios": [{"id": "s", "nodes": [
            {"id": "n", "tplFile": "x"}, {"id": "n", "tplFile": "y"}
        ]}]}"#;
        assert!(matches!(
            Workspace::from_json_str(json),
            Err(FlowError::DuplicateId { kind: "node", .. })
        ));
    }

    #[test]
    fn rejects_foreign_scenario_owner() {
        let json = r#"{"id": "w", "scenarios": [{"id": "s", "workspaceId": "other"}]}"#;
        assert!(matches!(
            Workspace::from_json_str(json),
            Err(FlowError::InvalidWorkspace(_))
        ));
    }

    #[test]
    fn rejects_invalid_context_path() {
        let json = r#"{"id": "w", "scenarios": [{"id": "s", "nodes": [
            {"id": "n", "tplFile": "x", "contextPath": "a..b"}
        ]}]}"#;
        assert!(matches!(Workspace::from_json_str(json), Err(FlowError::Json(_))));
    }

    #[test]
    fn load_from_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ws.json");
        std::fs::write(&path, WORKSPACE_JSON).unwrap();
        assert_eq!(Workspace::load(&path).unwrap().id, WorkspaceId::new("acme"));

        assert!(matches!(
            Workspace::load(dir.path().join("missing.yaml")),
            Err(FlowError::Io { .. })
        ));
    }
}
