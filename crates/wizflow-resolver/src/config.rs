//! Resolver configuration

use crate::category::NodeType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default fallback pattern: one trailing `-segment`
pub const DEFAULT_SUFFIX_PATTERN: &str = "-[A-Za-z0-9_]+$";

/// Resolver configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ResolverConfig {
    /// Maximum memoized resolutions
    pub cache_capacity: u64,

    /// Regex stripped from an unresolved flow step id before the single retry
    pub fallback_suffix_pattern: String,

    /// Overrides of the default flow step id per node type
    pub node_type_defaults: BTreeMap<NodeType, String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 256,
            fallback_suffix_pattern: DEFAULT_SUFFIX_PATTERN.to_string(),
            node_type_defaults: BTreeMap::new(),
        }
    }
}

impl ResolverConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set cache capacity
    #[inline]
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: u64) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Set fallback suffix pattern
    #[inline]
    #[must_use]
    pub fn with_fallback_suffix_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.fallback_suffix_pattern = pattern.into();
        self
    }

    /// Override the flow step id used for a node type
    #[inline]
    #[must_use]
    pub fn with_node_type_default(mut self, node_type: NodeType, id: impl Into<String>) -> Self {
        self.node_type_defaults.insert(node_type, id.into());
        self
    }

    /// Flow step id for a node type
    #[must_use]
    pub fn step_id_for(&self, node_type: NodeType) -> &str {
        self.node_type_defaults
            .get(&node_type)
            .map_or_else(|| node_type.default_step_id(), String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ResolverConfig::default();
        assert_eq!(config.cache_capacity, 256);
        assert_eq!(config.fallback_suffix_pattern, DEFAULT_SUFFIX_PATTERN);
        assert_eq!(config.step_id_for(NodeType::Form), "form-step");
    }

    #[test]
    fn override_node_type_default() {
        let config = ResolverConfig::new().with_node_type_default(NodeType::Form, "fancy-form");
        assert_eq!(config.step_id_for(NodeType::Form), "fancy-form");
        assert_eq!(config.step_id_for(NodeType::Info), "info-step");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: ResolverConfig = toml::from_str("cache_capacity = 8").unwrap();
        assert_eq!(config.cache_capacity, 8);
        assert_eq!(config.fallback_suffix_pattern, DEFAULT_SUFFIX_PATTERN);
    }

    #[test]
    fn node_type_overrides_from_json() {
        let config: ResolverConfig =
            serde_json::from_str(r#"{"node_type_defaults": {"llmQuery": "chat-step"}}"#).unwrap();
        assert_eq!(config.step_id_for(NodeType::LlmQuery), "chat-step");
        assert_eq!(config.cache_capacity, 256);
    }
}
