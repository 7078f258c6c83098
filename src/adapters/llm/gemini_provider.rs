//! Gemini Provider - Implementation of LlmProvider for the Gemini API.
//!
//! # Configuration
//!
//! ```ignore
//! let config = GeminiConfig::new(api_key)
//!     .with_model("gemini-2.5-pro")
//!     .with_timeout(Duration::from_secs(600));
//!
//! let provider = GeminiProvider::new(config)?;
//! ```
//!
//! The provider performs no retries of its own; wrap it in
//! `RetryingLlmProvider` for backoff on transient failures.

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::domain::response::RawLlmResponse;
use crate::ports::{GenerationConfig, LlmError, LlmProvider, ProviderInfo, ResponseMimeType};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Configuration for the Gemini provider.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    api_key: Secret<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gemini-2.5-pro".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(600),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Gemini API provider implementation.
pub struct GeminiProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiProvider {
    /// Creates a new provider with the given configuration.
    pub fn new(config: GeminiConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::InvalidRequest(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    async fn send_request(&self, body: &GeminiRequest) -> Result<Response, LlmError> {
        self.client
            .post(self.generate_url())
            .header("x-goog-api-key", self.config.api_key())
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout {
                        timeout_secs: self.config.timeout.as_secs(),
                    }
                } else if e.is_connect() {
                    LlmError::network(format!("Connection failed: {}", e))
                } else {
                    LlmError::network(e.to_string())
                }
            })
    }

    /// Parses the API response status and handles errors.
    async fn handle_response_status(&self, response: Response) -> Result<Response, LlmError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let error_body = response.text().await.unwrap_or_default();
        Err(map_error_status(status.as_u16(), &error_body))
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<RawLlmResponse, LlmError> {
        let request = GeminiRequest::new(prompt, config);
        tracing::debug!(
            model = %self.config.model,
            mime_type = config.response_mime_type.as_str(),
            prompt_chars = prompt.len(),
            "Sending generation request"
        );

        let response = self.send_request(&request).await?;
        let response = self.handle_response_status(response).await?;
        let body: GeminiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ResponseValidation(format!("Failed to parse response: {}", e)))?;

        into_raw_response(body, config.response_mime_type)
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("gemini", self.config.model.clone())
    }
}

/// Maps a non-success HTTP status onto the error taxonomy.
fn map_error_status(status: u16, error_body: &str) -> LlmError {
    match status {
        401 | 403 => LlmError::AuthenticationFailed,
        429 => LlmError::rate_limited(parse_retry_after(error_body)),
        400 | 413 => {
            let lowered = error_body.to_lowercase();
            if lowered.contains("token") && (lowered.contains("exceed") || lowered.contains("limit")) {
                LlmError::TokenLimitExceeded(error_body.to_string())
            } else {
                LlmError::InvalidRequest(error_body.to_string())
            }
        }
        404 => LlmError::InvalidRequest(format!("Model or endpoint not found: {}", error_body)),
        402..=499 => LlmError::InvalidRequest(format!("Client error {}: {}", status, error_body)),
        500..=599 => LlmError::unavailable(format!("Server error {}: {}", status, error_body)),
        _ => LlmError::network(format!("Unexpected status {}: {}", status, error_body)),
    }
}

/// Reads `retryDelay` (e.g. `"30s"`) from a 429 body, defaulting to 30.
fn parse_retry_after(error_body: &str) -> u32 {
    let parsed: Option<Value> = serde_json::from_str(error_body).ok();
    parsed
        .as_ref()
        .and_then(|v| v.pointer("/error/details"))
        .and_then(Value::as_array)
        .and_then(|details| {
            details
                .iter()
                .filter_map(|d| d.get("retryDelay").and_then(Value::as_str))
                .find_map(|delay| delay.trim_end_matches('s').parse::<f64>().ok())
        })
        .map(|secs| secs.ceil() as u32)
        .unwrap_or(30)
}

/// Pulls the candidate text out of a decoded body.
fn into_raw_response(body: GeminiResponse, mime: ResponseMimeType) -> Result<RawLlmResponse, LlmError> {
    if let Some(reason) = body.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(LlmError::content_blocked(reason));
    }

    let candidate = body
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::ResponseValidation("No candidates in response".to_string()))?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    let finish_reason = candidate.finish_reason.unwrap_or_default();
    match finish_reason.as_str() {
        "SAFETY" | "PROHIBITED_CONTENT" | "BLOCKLIST" if text.is_empty() => {
            return Err(LlmError::content_blocked(finish_reason));
        }
        "MAX_TOKENS" if text.is_empty() => {
            return Err(LlmError::TokenLimitExceeded(
                "output token limit reached before any text".to_string(),
            ));
        }
        "MAX_TOKENS" => {
            tracing::warn!(chars = text.len(), "Response truncated at output token limit");
        }
        _ => {}
    }

    if text.trim().is_empty() {
        return Err(LlmError::ResponseValidation("Candidate has no text".to_string()));
    }

    Ok(match mime {
        ResponseMimeType::ApplicationJson => RawLlmResponse::Json(text),
        ResponseMimeType::TextPlain => RawLlmResponse::Text(text),
    })
}

// ════════════════════════════════════════════════════════════════════════════════
// Gemini API Types
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

impl GeminiRequest {
    fn new(prompt: &str, config: &GenerationConfig) -> Self {
        Self {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: config.temperature,
                max_output_tokens: config.max_output_tokens,
                response_mime_type: config.response_mime_type.as_str().to_string(),
                response_schema: config.response_schema.clone(),
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    response_mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(value: Value) -> GeminiResponse {
        serde_json::from_value(value).unwrap()
    }

    mod config {
        use super::*;

        #[test]
        fn builder_works() {
            let config = GeminiConfig::new("key")
                .with_model("gemini-2.5-flash")
                .with_base_url("http://localhost:9000/")
                .with_timeout(Duration::from_secs(5));
            assert_eq!(config.model, "gemini-2.5-flash");
            assert_eq!(config.timeout, Duration::from_secs(5));
            assert_eq!(config.api_key(), "key");
        }

        #[test]
        fn url_includes_model() {
            let provider = GeminiProvider::new(
                GeminiConfig::new("key").with_base_url("http://localhost:9000/"),
            )
            .unwrap();
            assert_eq!(
                provider.generate_url(),
                "http://localhost:9000/models/gemini-2.5-pro:generateContent"
            );
        }

        #[test]
        fn debug_output_hides_api_key() {
            let rendered = format!("{:?}", GeminiConfig::new("super-secret"));
            assert!(!rendered.contains("super-secret"));
        }
    }

    mod request {
        use super::*;

        #[test]
        fn serializes_generation_config() {
            let config = GenerationConfig::json(0.2, 1024).with_schema(json!({"type": "OBJECT"}));
            let body = serde_json::to_value(GeminiRequest::new("hi", &config)).unwrap();
            assert_eq!(body["contents"][0]["parts"][0]["text"], "hi");
            assert_eq!(body["generationConfig"]["maxOutputTokens"], 1024);
            assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
            assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
        }

        #[test]
        fn omits_absent_schema() {
            let body = serde_json::to_value(GeminiRequest::new("hi", &GenerationConfig::text(0.1, 8))).unwrap();
            assert!(body["generationConfig"].get("responseSchema").is_none());
        }
    }

    mod statuses {
        use super::*;

        #[test]
        fn maps_statuses() {
            assert_eq!(map_error_status(401, ""), LlmError::AuthenticationFailed);
            assert_eq!(map_error_status(403, ""), LlmError::AuthenticationFailed);
            assert!(matches!(map_error_status(429, ""), LlmError::RateLimited { retry_after_secs: 30 }));
            assert!(matches!(map_error_status(503, "busy"), LlmError::Unavailable { .. }));
            assert!(matches!(map_error_status(400, "bad field"), LlmError::InvalidRequest(_)));
        }

        #[test]
        fn other_client_errors_are_terminal() {
            for status in [404, 405, 409, 422] {
                let err = map_error_status(status, "nope");
                assert!(matches!(err, LlmError::InvalidRequest(_)), "status {status}");
                assert!(!err.is_retryable());
            }
            assert!(matches!(map_error_status(302, "moved"), LlmError::Network(_)));
        }

        #[test]
        fn token_wording_is_token_limit() {
            let err = map_error_status(400, "The input token count exceeds the maximum");
            assert!(matches!(err, LlmError::TokenLimitExceeded(_)));
            assert!(!err.is_retryable());
        }

        #[test]
        fn reads_retry_delay() {
            let body = r#"{"error": {"details": [{"@type": "RetryInfo", "retryDelay": "12s"}]}}"#;
            assert_eq!(parse_retry_after(body), 12);
        }
    }

    mod responses {
        use super::*;

        #[test]
        fn joins_candidate_parts() {
            let body = response(json!({"candidates": [{"content": {"parts": [{"text": "{\"a\":"}, {"text": "1}"}]}, "finishReason": "STOP"}]}));
            let raw = into_raw_response(body, ResponseMimeType::ApplicationJson).unwrap();
            assert_eq!(raw, RawLlmResponse::Json("{\"a\":1}".into()));
        }

        #[test]
        fn text_mode_returns_text() {
            let body = response(json!({"candidates": [{"content": {"parts": [{"text": "=== METRICS ==="}]}}]}));
            let raw = into_raw_response(body, ResponseMimeType::TextPlain).unwrap();
            assert!(matches!(raw, RawLlmResponse::Text(_)));
        }

        #[test]
        fn blocked_prompt_is_content_blocked() {
            let body = response(json!({"promptFeedback": {"blockReason": "SAFETY"}}));
            let err = into_raw_response(body, ResponseMimeType::ApplicationJson).unwrap_err();
            assert_eq!(err, LlmError::content_blocked("SAFETY"));
        }

        #[test]
        fn missing_text_is_validation_error() {
            let body = response(json!({"candidates": [{"finishReason": "STOP"}]}));
            let err = into_raw_response(body, ResponseMimeType::ApplicationJson).unwrap_err();
            assert!(matches!(err, LlmError::ResponseValidation(_)));
        }

        #[test]
        fn empty_max_tokens_is_token_limit() {
            let body = response(json!({"candidates": [{"finishReason": "MAX_TOKENS"}]}));
            let err = into_raw_response(body, ResponseMimeType::ApplicationJson).unwrap_err();
            assert!(matches!(err, LlmError::TokenLimitExceeded(_)));
        }

        #[test]
        fn no_candidates_is_validation_error() {
            let body = response(json!({}));
            assert!(matches!(
                into_raw_response(body, ResponseMimeType::ApplicationJson),
                Err(LlmError::ResponseValidation(_))
            ));
        }
    }
}
