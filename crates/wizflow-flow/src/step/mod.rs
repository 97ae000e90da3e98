//! Step-kind contract and built-in renderers
//!
//! A renderer receives [`StepProps`] for the current node, produces a
//! [`StepView`], and answers user input with a [`StepAction`]:
//! - `Submit(result)` binds the result and advances
//! - `Previous` goes back
//! - `Stay` keeps the node current (validation failure, waiting, ...)
//!
//! Built-in renderers are registered under the flow step ids `form-step`,
//! `llm-query-step`, `review-step` and `info-step` by [`builtin_pack`].

mod form;
mod info;
mod llm;
mod placeholder;
mod review;

pub use form::FormStep;
pub use info::InfoStep;
pub use llm::LlmQueryStep;
pub use placeholder::PlaceholderStep;
pub use review::ReviewStep;

use crate::attrs::FormField;
use crate::model::Node;
use serde::Serialize;
use std::fmt::Debug;
use std::sync::Arc;
use wizflow_context::{template, ContextValue};
use wizflow_resolver::{Category, NodeType, Resolution, Resolver, TemplatePack};

/// Inputs handed to a renderer
#[derive(Debug, Clone)]
pub struct StepProps {
    /// Current node
    pub node: Node,
    /// Index is 0
    pub is_first_node: bool,
    /// Index is the last one
    pub is_last_node: bool,
    /// Workspace context tree at render time
    pub context: Option<ContextValue>,
    /// Scenario system message
    pub system_message: Option<String>,
}

impl StepProps {
    /// Interpolate `text` against the context
    #[must_use]
    pub fn interpolate(&self, text: &str) -> String {
        template::interpolate(text, self.context.as_ref())
    }

    /// Title shown for the node (label, or id when unlabeled)
    #[must_use]
    pub fn title(&self) -> String {
        if self.node.label.is_empty() {
            self.node.id.clone()
        } else {
            self.interpolate(&self.node.label)
        }
    }
}

/// What the user did
#[derive(Debug, Clone, PartialEq)]
pub enum StepInput {
    /// Confirm without payload
    Continue,
    /// Submit values (form answers, a completion, ...)
    Values(ContextValue),
    /// Go back
    Back,
}

/// Renderer's answer to an input
#[derive(Debug, Clone, PartialEq)]
pub enum StepAction {
    /// Bind `result` (if any) and advance
    Submit(Option<ContextValue>),
    /// Go to the previous node
    Previous,
    /// Stay on this node, with an optional message for the user
    Stay(Option<String>),
}

/// Render output, independent of any UI toolkit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepView {
    /// Renderer id
    pub renderer: String,
    /// Heading
    pub title: String,
    /// Interpolated body text
    pub body: String,
    /// Input fields, if any
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FormField>,
    /// Label of the forward action
    pub submit_label: String,
    /// Whether a back action leads to another node
    pub can_go_back: bool,
}

impl StepView {
    pub(crate) fn base(renderer: &str, props: &StepProps) -> Self {
        let submit_label = if props.is_last_node { "Finish" } else { "Next" };
        Self {
            renderer: renderer.to_string(),
            title: props.title(),
            body: String::new(),
            fields: Vec::new(),
            submit_label: submit_label.to_string(),
            can_go_back: !props.is_first_node,
        }
    }
}

/// Renderer for one kind of step
pub trait StepRenderer: Debug + Send + Sync {
    /// Flow step id this renderer is meant for
    fn id(&self) -> &str;

    /// Produce the view for the current node
    fn render(&self, props: &StepProps) -> StepView;

    /// Turn user input into an action
    fn handle(&self, props: &StepProps, input: StepInput) -> StepAction;
}

/// Renderer shared between resolver and sessions
pub type SharedRenderer = Arc<dyn StepRenderer>;

/// Resolver over step renderers
pub type StepResolver = Resolver<SharedRenderer>;

/// Name of the pack returned by [`builtin_pack`]
pub const BUILTIN_PACK: &str = "builtin";

/// Pack with the built-in renderers
#[must_use]
pub fn builtin_pack() -> TemplatePack<SharedRenderer> {
    let renderers: [SharedRenderer; 4] = [
        Arc::new(FormStep),
        Arc::new(LlmQueryStep),
        Arc::new(ReviewStep),
        Arc::new(InfoStep),
    ];
    renderers
        .into_iter()
        .fold(TemplatePack::new(BUILTIN_PACK), |pack, renderer| {
            let id = renderer.id().to_string();
            pack.with_flow_step(id, renderer)
        })
}

/// Look up the renderer for `node`
///
/// Tries `tplFile` (with the suffix fallback), then the default step of the
/// node's type unless it is `custom`. A total miss keeps the `tplFile`
/// diagnostic and is logged at `warn`.
pub fn resolve_step(resolver: &StepResolver, node: &Node) -> Resolution<SharedRenderer> {
    let by_id = resolver.find(Category::FlowStep, &node.tpl_file);
    if by_id.is_resolved() {
        return by_id;
    }

    let node_type = node.attrs.node_type();
    if node_type != NodeType::Custom {
        let by_type = resolver.find_for_node_type(node_type);
        if by_type.is_resolved() {
            tracing::debug!(
                node = %node.id,
                tpl_file = %node.tpl_file,
                step = by_type.resolved_id.as_deref().unwrap_or_default(),
                "step resolved by node type"
            );
            return by_type;
        }
    }

    if let Some(diagnostic) = &by_id.diagnostic {
        tracing::warn!(node = %node.id, %diagnostic, "template not resolved");
    }
    by_id
}
