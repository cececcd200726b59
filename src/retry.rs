//! Bounded retry with exponential backoff for reasoning-service calls.

use crate::llm_client::LlmError;
use derive_getters::Getters;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// How many times to try a call and how long to wait between tries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    max_attempts: u32,
    /// Delay before the first retry. Doubles for each retry after that.
    base_delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy. At least one attempt is always made.
    #[instrument]
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Delay after the failed attempt with zero-based index `attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Whether a failure of this shape is worth another attempt.
    pub fn is_retryable(&self, error: &LlmError) -> bool {
        error.kind().is_retryable()
    }

    /// Runs `operation` until it succeeds, fails permanently, or the attempt
    /// budget is spent.
    ///
    /// The operation receives the zero-based attempt index. Non-retryable
    /// errors are returned as-is. Exhaustion returns a single aggregated
    /// error that carries the last cause.
    #[instrument(skip(self, sleeper, operation), fields(max_attempts = self.max_attempts))]
    pub async fn run<T, F, Fut>(&self, sleeper: &dyn Sleeper, mut operation: F) -> Result<T, LlmError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, LlmError>>,
    {
        let mut attempt = 0;
        loop {
            let error = match operation(attempt).await {
                Ok(value) => {
                    debug!(attempt, "Call succeeded");
                    return Ok(value);
                }
                Err(error) => error,
            };

            if !self.is_retryable(&error) {
                debug!(attempt, kind = %error.kind(), "Error is not retryable");
                return Err(error);
            }

            if attempt + 1 >= self.max_attempts {
                warn!(attempts = self.max_attempts, kind = %error.kind(), "Retries exhausted");
                return Err(LlmError::exhausted(self.max_attempts, error));
            }

            let delay = self.delay_for(attempt);
            warn!(attempt, kind = %error.kind(), delay_ms = delay.as_millis() as u64, "Retrying after backoff");
            sleeper.sleep(delay).await;
            attempt += 1;
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

/// Source of delays between attempts.
#[async_trait::async_trait]
pub trait Sleeper: Send + Sync + std::fmt::Debug {
    /// Waits for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait::async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
