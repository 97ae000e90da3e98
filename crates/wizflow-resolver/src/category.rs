//! Component categories and coarse node types

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Component category a symbolic id is registered under
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    /// Page-level layouts
    Layout,
    /// Reusable widgets
    Widget,
    /// Flow step renderers (the `tplFile` of a node)
    FlowStep,
}

impl Category {
    /// All categories in display order
    pub const ALL: [Self; 3] = [Self::Layout, Self::Widget, Self::FlowStep];

    /// Name as written in configuration files
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Layout => "layout",
            Self::Widget => "widget",
            Self::FlowStep => "flowStep",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse step kind used to pick a default flow step
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum NodeType {
    /// Form collection
    Form,
    /// LLM-backed generation
    LlmQuery,
    /// Review of previously collected values
    Review,
    /// Static informational content
    Info,
    /// Anything else
    Custom,
}

impl NodeType {
    /// All node types
    pub const ALL: [Self; 5] = [
        Self::Form,
        Self::LlmQuery,
        Self::Review,
        Self::Info,
        Self::Custom,
    ];

    /// Flow step id used when no override is configured
    #[inline]
    #[must_use]
    pub fn default_step_id(self) -> &'static str {
        match self {
            Self::Form => "form-step",
            Self::LlmQuery => "llm-query-step",
            Self::Review => "review-step",
            Self::Info => "info-step",
            Self::Custom => "custom-step",
        }
    }
}

impl Display for NodeType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Form => "form",
            Self::LlmQuery => "llmQuery",
            Self::Review => "review",
            Self::Info => "info",
            Self::Custom => "custom",
        };
        f.write_str(name)
    }
}
