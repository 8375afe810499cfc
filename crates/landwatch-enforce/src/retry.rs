use std::future::Future;
use std::time::Duration;

use landwatch_core::config::BatchConfig;

use crate::provider::ProviderError;

/// Timeout and retry settings for provider calls.
///
/// Every attempt runs under its own timeout; an expired attempt counts as a
/// [`ProviderError::Timeout`] and is retried like any transient failure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub timeout: Duration,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&BatchConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(batch: &BatchConfig) -> Self {
        Self {
            max_retries: batch.max_retries,
            timeout: Duration::from_millis(batch.provider_timeout_ms),
            backoff: Duration::from_millis(batch.retry_backoff_ms),
        }
    }

    /// Delay before retry number `attempt + 1`: backoff · 2^attempt.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff
            .saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Run `call` until it succeeds, fails permanently, or runs out of retries.
    pub async fn run<T, F, Fut>(&self, what: &'static str, mut call: F) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let mut attempt = 0;
        loop {
            let result = match tokio::time::timeout(self.timeout, call()).await {
                Ok(result) => result,
                Err(_) => Err(ProviderError::Timeout(
                    u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                )),
            };
            match result {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let delay = self.backoff_for(attempt);
                    tracing::debug!(what, attempt, ?delay, error = %e, "retrying provider call");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
