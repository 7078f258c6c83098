//! Mock LLM Provider for testing.
//!
//! Provides a configurable mock implementation of the LlmProvider port,
//! allowing tests to run without calling a real model.
//!
//! # Features
//!
//! - Queued responses, consumed in order
//! - Prompt-matched responses for concurrent callers
//! - Simulated delays
//! - Error injection for retry testing
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let provider = MockLlmProvider::new()
//!     .with_json(r#"{"themes": []}"#)
//!     .with_error(LlmError::rate_limited(1));
//!
//! let response = provider.generate("prompt", &GenerationConfig::default()).await?;
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::response::RawLlmResponse;
use crate::ports::{GenerationConfig, LlmError, LlmProvider, ProviderInfo};

/// A configured mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Success(RawLlmResponse),
    Error(LlmError),
}

/// A recorded call.
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    pub prompt: String,
    pub config: GenerationConfig,
}

/// Mock LLM provider for testing.
#[derive(Debug, Clone)]
pub struct MockLlmProvider {
    /// Pre-configured responses (consumed in order).
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    /// Responses chosen by a substring of the prompt, checked first.
    matched: Arc<Mutex<Vec<(String, MockResponse)>>>,
    info: ProviderInfo,
    delay: Duration,
    calls: Arc<Mutex<Vec<MockCall>>>,
}

impl Default for MockLlmProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLlmProvider {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            matched: Arc::new(Mutex::new(Vec::new())),
            info: ProviderInfo::new("mock", "mock-model-1"),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queues a JSON-text response.
    pub fn with_json(self, body: impl Into<String>) -> Self {
        self.with_response(MockResponse::Success(RawLlmResponse::Json(body.into())))
    }

    /// Queues a plain-text response.
    pub fn with_text(self, body: impl Into<String>) -> Self {
        self.with_response(MockResponse::Success(RawLlmResponse::Text(body.into())))
    }

    /// Queues an error.
    pub fn with_error(self, error: LlmError) -> Self {
        self.with_response(MockResponse::Error(error))
    }

    pub fn with_response(self, response: MockResponse) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    /// Answers every prompt containing `needle` with `response`.
    pub fn with_response_for(self, needle: impl Into<String>, response: MockResponse) -> Self {
        self.matched.lock().unwrap().push((needle.into(), response));
        self
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_provider_info(mut self, info: ProviderInfo) -> Self {
        self.info = info;
        self
    }

    /// Returns the number of calls made to this provider.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Returns all recorded calls.
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    fn next_response(&self, prompt: &str, config: &GenerationConfig) -> MockResponse {
        let matched = self
            .matched
            .lock()
            .unwrap()
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, response)| response.clone());
        if let Some(response) = matched {
            return response;
        }

        self.responses.lock().unwrap().pop_front().unwrap_or_else(|| {
            let fallback = if config.expects_json() {
                RawLlmResponse::Json("{}".to_string())
            } else {
                RawLlmResponse::Text(String::new())
            };
            MockResponse::Success(fallback)
        })
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    async fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<RawLlmResponse, LlmError> {
        self.calls.lock().unwrap().push(MockCall {
            prompt: prompt.to_string(),
            config: config.clone(),
        });

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_response(prompt, config) {
            MockResponse::Success(response) => Ok(response),
            MockResponse::Error(err) => Err(err),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.info.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_responses_in_order() {
        let provider = MockLlmProvider::new().with_json("{\"a\": 1}").with_text("second");
        let config = GenerationConfig::default();

        let first = provider.generate("p", &config).await.unwrap();
        let second = provider.generate("p", &config).await.unwrap();

        assert_eq!(first, RawLlmResponse::Json("{\"a\": 1}".into()));
        assert_eq!(second, RawLlmResponse::Text("second".into()));
    }

    #[tokio::test]
    async fn returns_default_after_exhausted() {
        let provider = MockLlmProvider::new();
        let json = provider.generate("p", &GenerationConfig::default()).await.unwrap();
        let text = provider.generate("p", &GenerationConfig::text(0.2, 10)).await.unwrap();
        assert_eq!(json, RawLlmResponse::Json("{}".into()));
        assert_eq!(text, RawLlmResponse::Text(String::new()));
    }

    #[tokio::test]
    async fn returns_configured_error() {
        let provider = MockLlmProvider::new().with_error(LlmError::rate_limited(30));
        let err = provider.generate("p", &GenerationConfig::default()).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(err, LlmError::RateLimited { retry_after_secs: 30 });
    }

    #[tokio::test]
    async fn prompt_matches_take_precedence() {
        let provider = MockLlmProvider::new()
            .with_json("{}")
            .with_response_for("Trust", MockResponse::Success(RawLlmResponse::Json("[\"q\"]".into())));

        let matched = provider.generate("theme: Trust", &GenerationConfig::default()).await.unwrap();
        let queued = provider.generate("other", &GenerationConfig::default()).await.unwrap();

        assert_eq!(matched, RawLlmResponse::Json("[\"q\"]".into()));
        assert_eq!(queued, RawLlmResponse::Json("{}".into()));
    }

    #[tokio::test]
    async fn tracks_calls() {
        let provider = MockLlmProvider::new();
        assert_eq!(provider.call_count(), 0);

        provider.generate("hello", &GenerationConfig::default()).await.unwrap();

        let calls = provider.get_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].prompt, "hello");
    }
}
