//! Retry with exponential backoff for classified upstream failures.
//!
//! `Auth`, `Validation` and `Parse` errors fail immediately. Rate limits wait
//! exactly the server-specified delay; network, timeout and unknown failures
//! back off exponentially up to a ceiling.

use crate::search::SearchError;
use std::future::Future;
use std::time::Duration;

/// Backoff configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay after the first failed attempt
    pub base_delay: Duration,
    /// Upper bound for backoff delays (rate-limit waits are not capped)
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Backoff for the given failed attempt (1-indexed): `base * 2^(attempt-1)`, capped.
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay
            .checked_mul(1u32 << exponent)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// How long to wait before retrying after `error`, or `None` to stop.
    ///
    /// Retryability is decided by [`SearchError::is_retryable`].
    pub fn delay_for(&self, error: &SearchError, attempt: u32) -> Option<Duration> {
        if !error.is_retryable() {
            return None;
        }
        match error {
            SearchError::RateLimit { retry_after } => Some(*retry_after),
            _ => Some(self.backoff_for_attempt(attempt)),
        }
    }

    /// Run `op` up to `max_attempts` times (at least once).
    ///
    /// Returns the first success, the first non-retryable error, or the error
    /// from the final attempt.
    pub async fn execute_with_retry<T, F, Fut>(
        &self,
        mut op: F,
        max_attempts: u32,
    ) -> Result<T, SearchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SearchError>>,
    {
        let max_attempts = max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let error = match op().await {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::info!(attempt, "upstream call succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(e) => e,
            };

            let Some(delay) = self.delay_for(&error, attempt) else {
                tracing::debug!(attempt, kind = error.kind(), "error is not retryable");
                return Err(error);
            };

            if attempt >= max_attempts {
                tracing::warn!(
                    attempts = attempt,
                    kind = error.kind(),
                    error = %error,
                    "giving up after final attempt"
                );
                return Err(error);
            }

            tracing::warn!(
                attempt,
                max_attempts,
                kind = error.kind(),
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "transient upstream error, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
