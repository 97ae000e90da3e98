//! LLM client seam
//!
//! The engine only needs text in, text out. Provider wire formats live in
//! implementations of [`LlmClient`].

use crate::error::LlmError;
use serde::Serialize;

/// Completion request built from an llmQuery node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmRequest {
    /// Node issuing the request
    pub node_id: String,
    /// System message (node override, else scenario)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Interpolated prompt
    pub prompt: String,
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Text completion provider
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Complete `request`
    ///
    /// # Errors
    /// Returns error if the upstream call fails.
    async fn complete(&self, request: &LlmRequest) -> Result<String, LlmError>;
}

/// Client that answers every prompt with a fixed text
///
/// Used by the CLI's scripted runs and in tests.
#[derive(Debug, Clone, Default)]
pub struct EchoClient {
    prefix: String,
}

impl EchoClient {
    /// Create client answering `"{prefix}{prompt}"`
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for EchoClient {
    async fn complete(&self, request: &LlmRequest) -> Result<String, LlmError> {
        Ok(format!("{}{}", self.prefix, request.prompt))
    }
}
