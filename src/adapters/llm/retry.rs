//! Bounded retries with exponential backoff.
//!
//! `retry_with_backoff` retries every failure; `retry_with_backoff_if`
//! stops at the first error the classifier rejects. Delays are
//! `base_delay * 2^attempt` with no jitter.

use async_trait::async_trait;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::response::RawLlmResponse;
use crate::ports::{GenerationConfig, LlmError, LlmProvider, ProviderInfo};

/// How often and how patiently to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Delay before the retry that follows `attempt` (zero-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }

    fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }
}

/// Retries any failure until the attempts are used up.
pub async fn retry_with_backoff<T, E, F, Fut>(policy: &RetryPolicy, op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    retry_with_backoff_if(policy, |_| true, op).await
}

/// Retries only failures for which `is_retryable` returns true.
///
/// The last error is returned unchanged once attempts run out.
pub async fn retry_with_backoff_if<T, E, F, Fut, C>(
    policy: &RetryPolicy,
    is_retryable: C,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: Fn(&E) -> bool,
    E: Display,
{
    let attempts = policy.attempts();
    let mut attempt = 0;

    loop {
        match op().await {
            Ok(value) => {
                if attempt > 0 {
                    tracing::info!(attempt = attempt + 1, "Call succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) if !is_retryable(&err) => {
                tracing::warn!(error = %err, "Non-retryable failure");
                return Err(err);
            }
            Err(err) if attempt + 1 >= attempts => {
                tracing::error!(attempts, error = %err, "Retries exhausted");
                return Err(err);
            }
            Err(err) => {
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Call failed, retrying"
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// Decorator that retries transient provider errors.
pub struct RetryingLlmProvider {
    inner: Arc<dyn LlmProvider>,
    policy: RetryPolicy,
}

impl RetryingLlmProvider {
    pub fn new(inner: Arc<dyn LlmProvider>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl LlmProvider for RetryingLlmProvider {
    async fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<RawLlmResponse, LlmError> {
        retry_with_backoff_if(&self.policy, LlmError::is_retryable, || {
            self.inner.generate(prompt, config)
        })
        .await
    }

    fn provider_info(&self) -> ProviderInfo {
        self.inner.provider_info()
    }
}
