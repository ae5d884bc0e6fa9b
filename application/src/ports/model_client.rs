//! Model client port
//!
//! The sole network boundary for language-model calls. Agents, reviewers,
//! the classifier, and model-backed guardrails all go through this trait;
//! adapters in the infrastructure layer implement the actual transport.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during a model call
///
/// Retryability is part of the contract: the adapter may retry retryable
/// failures a small bounded number of times, callers never retry on top of
/// that.
#[derive(Error, Debug, Clone)]
pub enum GenerationFailure {
    #[error("Model call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Rate limited by provider: {0}")]
    RateLimited(String),

    #[error("Model output did not match the requested schema: {0}")]
    MalformedOutput(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request rejected by provider: {0}")]
    Rejected(String),

    #[error("Prompt could not be rendered: {0}")]
    PromptRender(String),
}

impl GenerationFailure {
    /// Whether a retry could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            GenerationFailure::Timeout(_)
            | GenerationFailure::RateLimited(_)
            | GenerationFailure::Transport(_) => true,
            GenerationFailure::MalformedOutput(_)
            | GenerationFailure::Rejected(_)
            | GenerationFailure::PromptRender(_) => false,
        }
    }
}

/// Model selection and sampling parameters for one call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelProfile {
    /// Provider model name
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
}

impl ModelProfile {
    pub fn new(model: impl Into<String>, temperature: f32) -> Self {
        Self {
            model: model.into(),
            temperature,
        }
    }
}

impl Default for ModelProfile {
    fn default() -> Self {
        Self::new("gpt-4o-mini", 0.2)
    }
}

/// Shape the caller expects the model output to take
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OutputSchema {
    /// Free text
    Text,
    /// A single JSON object; the description tells the provider what fields
    /// to emit (e.g. via a JSON-mode system hint)
    Json {
        description: String,
    },
}

/// One model-call request
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// System prompt establishing the calling component's role
    pub system_prompt: String,
    /// User prompt
    pub prompt: String,
    /// Expected output shape
    pub schema: OutputSchema,
    /// Model and sampling parameters
    pub profile: ModelProfile,
    /// Per-call timeout; on expiry the call fails with
    /// [`GenerationFailure::Timeout`]
    pub timeout: Duration,
}

impl GenerationRequest {
    pub fn new(system_prompt: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            prompt: prompt.into(),
            schema: OutputSchema::Text,
            profile: ModelProfile::default(),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_schema(mut self, schema: OutputSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_profile(mut self, profile: ModelProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Raw model output
#[derive(Debug, Clone)]
pub struct ModelOutput {
    text: String,
}

impl ModelOutput {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The output text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Parse the output as a typed JSON value
    ///
    /// Tolerates a fenced ```json block around the object, which providers
    /// emit even in JSON mode. Parse failure is a
    /// [`GenerationFailure::MalformedOutput`].
    pub fn parse_json<T: DeserializeOwned>(&self) -> Result<T, GenerationFailure> {
        let trimmed = self.text.trim();
        let stripped = trimmed
            .strip_prefix("```json")
            .or_else(|| trimmed.strip_prefix("```"))
            .and_then(|s| s.strip_suffix("```"))
            .unwrap_or(trimmed);

        serde_json::from_str(stripped.trim())
            .map_err(|e| GenerationFailure::MalformedOutput(e.to_string()))
    }
}

/// Gateway for language-model calls
///
/// Implementations (adapters) live in the infrastructure layer and own any
/// bounded retry for retryable failures. Shared read-only across concurrent
/// tasks.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Perform one generation call
    async fn generate(&self, request: GenerationRequest)
    -> Result<ModelOutput, GenerationFailure>;
}
