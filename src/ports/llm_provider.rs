//! LLM Provider Port - Interface for text generation backends.
//!
//! The analysis pipeline talks to the model only through this port, so the
//! HTTP provider, the retry decorator and the test mock are interchangeable.
//!
//! # Error classification
//!
//! [`LlmError::is_retryable`] splits failures into transient ones (rate
//! limits, timeouts, network, 5xx) and terminal ones that would fail again
//! for an identical request.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::response::RawLlmResponse;

/// Port for LLM text generation.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generates a response for a single prompt.
    async fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<RawLlmResponse, LlmError>;

    /// Get provider information (name, model).
    fn provider_info(&self) -> ProviderInfo;
}

/// Requested output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResponseMimeType {
    #[default]
    #[serde(rename = "application/json")]
    ApplicationJson,
    #[serde(rename = "text/plain")]
    TextPlain,
}

impl ResponseMimeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseMimeType::ApplicationJson => "application/json",
            ResponseMimeType::TextPlain => "text/plain",
        }
    }
}

/// Parameters for one generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    /// Temperature for response randomness (0.0 = deterministic).
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub response_mime_type: ResponseMimeType,
    /// Structural hint passed to the provider; not enforced locally.
    pub response_schema: Option<Value>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            max_output_tokens: 65_536,
            response_mime_type: ResponseMimeType::ApplicationJson,
            response_schema: None,
        }
    }
}

impl GenerationConfig {
    /// JSON-mode configuration.
    pub fn json(temperature: f32, max_output_tokens: u32) -> Self {
        Self {
            temperature,
            max_output_tokens,
            response_mime_type: ResponseMimeType::ApplicationJson,
            response_schema: None,
        }
    }

    /// Plain-text configuration.
    pub fn text(temperature: f32, max_output_tokens: u32) -> Self {
        Self {
            response_mime_type: ResponseMimeType::TextPlain,
            ..Self::json(temperature, max_output_tokens)
        }
    }

    /// Attaches a response schema hint.
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.response_schema = Some(schema);
        self
    }

    pub fn expects_json(&self) -> bool {
        self.response_mime_type == ResponseMimeType::ApplicationJson
    }
}

/// Provider information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Provider name (e.g., "gemini", "mock").
    pub name: String,
    /// Model identifier.
    pub model: String,
}

impl ProviderInfo {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
        }
    }
}

/// LLM provider errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LlmError {
    /// Rate limited by provider.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds until retry is allowed.
        retry_after_secs: u32,
    },

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// Network error during request.
    #[error("network error: {0}")]
    Network(String),

    /// Provider is unavailable (5xx).
    #[error("provider unavailable: {message}")]
    Unavailable { message: String },

    /// Prompt or output exceeds the model's token limit.
    #[error("token limit exceeded: {0}")]
    TokenLimitExceeded(String),

    /// Malformed request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// API key or authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// The provider answered but the body is not a usable response.
    #[error("response validation failed: {0}")]
    ResponseValidation(String),

    /// The prompt or response was blocked by the provider.
    #[error("content blocked: {reason}")]
    ContentBlocked { reason: String },
}

impl LlmError {
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn content_blocked(reason: impl Into<String>) -> Self {
        Self::ContentBlocked {
            reason: reason.into(),
        }
    }

    /// Returns true if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LlmError::RateLimited { .. }
                | LlmError::Unavailable { .. }
                | LlmError::Network(_)
                | LlmError::Timeout { .. }
        )
    }
}
