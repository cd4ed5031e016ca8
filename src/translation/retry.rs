/*!
 * Shared retry and backoff policy for provider calls.
 *
 * Every attempt is gated by the process-wide rate limiter. Retryable
 * failures are retried with exponential backoff plus random jitter, anything
 * else propagates immediately.
 */

use log::warn;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

use crate::errors::ProviderError;
use super::rate_limiter::RateLimiter;

/// Upper bound (exclusive) of the random jitter added to each backoff
pub const MAX_JITTER_MS: u64 = 300;

/// Retry policy shared by all remote providers
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Number of retries after the first attempt
    pub max_retries: u32,

    /// Base delay of the exponential backoff
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Create a new policy
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self { max_retries, base_delay }
    }

    /// Policy that never retries
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Backoff before the `retry`-th retry, counted from zero, without jitter
    pub fn base_backoff(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Backoff before the `retry`-th retry including jitter
    pub fn backoff_delay(&self, retry: u32) -> Duration {
        self.base_backoff(retry).saturating_add(jitter())
    }

    /// Run an operation under this policy
    ///
    /// `operation` is invoked once per attempt. `label` names the call in
    /// log lines.
    pub async fn execute<T, F, Fut>(
        &self,
        limiter: &RateLimiter,
        label: &str,
        mut operation: F,
    ) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let mut retry = 0;

        loop {
            limiter.acquire().await;

            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && retry < self.max_retries => {
                    let delay = self.backoff_delay(retry);
                    warn!(
                        "{} failed: {} - retrying in {:?} (retry {}/{})",
                        label, e, delay, retry + 1, self.max_retries
                    );
                    tokio::time::sleep(delay).await;
                    retry += 1;
                },
                Err(e) => return Err(e),
            }
        }
    }
}

// Kept out of async code: the thread-local rng is not Send
fn jitter() -> Duration {
    Duration::from_millis(rand::rng().random_range(0..MAX_JITTER_MS))
}
