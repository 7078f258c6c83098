//! LLM adapters.
//!
//! - `GeminiProvider` - HTTP provider for the Gemini API
//! - `RetryingLlmProvider` - Backoff decorator around any provider
//! - `MockLlmProvider` - Queued responses for tests

mod gemini_provider;
mod mock_provider;
mod retry;

pub use gemini_provider::{GeminiConfig, GeminiProvider, DEFAULT_BASE_URL};
pub use mock_provider::{MockCall, MockLlmProvider, MockResponse};
pub use retry::{retry_with_backoff, retry_with_backoff_if, RetryPolicy, RetryingLlmProvider};
