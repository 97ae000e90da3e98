//! Engine configuration
//!
//! Loadable from TOML or YAML; every section and field is optional.

use crate::error::FlowError;
use crate::step::{builtin_pack, StepResolver};
use serde::{Deserialize, Serialize};
use std::path::Path;
use wizflow_context::TrackerConfig;
use wizflow_resolver::ResolverConfig;

/// Logging configuration (applied by the binary)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive
    pub filter: String,
    /// Emit JSON lines instead of text
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Template resolver
    pub resolver: ResolverConfig,
    /// Change tracker
    pub tracker: TrackerConfig,
    /// Logging
    pub log: LogConfig,
}

impl EngineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set resolver configuration
    #[inline]
    #[must_use]
    pub fn with_resolver(mut self, resolver: ResolverConfig) -> Self {
        self.resolver = resolver;
        self
    }

    /// Set tracker configuration
    #[inline]
    #[must_use]
    pub fn with_tracker(mut self, tracker: TrackerConfig) -> Self {
        self.tracker = tracker;
        self
    }

    /// Set log filter
    #[inline]
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log.filter = filter.into();
        self
    }

    /// Parse TOML text
    ///
    /// # Errors
    /// Returns error on malformed TOML.
    pub fn from_toml_str(text: &str) -> Result<Self, FlowError> {
        Ok(toml::from_str(text)?)
    }

    /// Parse YAML text
    ///
    /// # Errors
    /// Returns error on malformed YAML.
    pub fn from_yaml_str(text: &str) -> Result<Self, FlowError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load from a `.toml`, `.yaml` or `.yml` file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FlowError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| FlowError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_str(&text),
            _ => Self::from_toml_str(&text),
        }
    }

    /// Build a step resolver with the built-in pack registered
    ///
    /// # Errors
    /// Returns error if the fallback suffix pattern does not compile.
    pub fn build_resolver(&self) -> Result<StepResolver, FlowError> {
        let resolver = StepResolver::new(self.resolver.clone())?;
        resolver.register(builtin_pack())?;
        Ok(resolver)
    }
}
