//! Retry executor with bounded exponential backoff
//!
//! Transient failures are retried up to a ceiling, waiting
//! `min(base * 2^(attempt - 1), cap)` before each retry. Waits observe the
//! run's cancellation token.

use crate::config::RunPolicy;
use crate::FetchError;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Exponents above this are clamped
pub const MAX_BACKOFF_EXPONENT: u32 = 10;

/// Classifies errors as worth retrying or not
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

impl Retryable for FetchError {
    fn is_retryable(&self) -> bool {
        FetchError::is_retryable(self)
    }
}

/// Why a retried operation gave up
#[derive(Debug, Error)]
pub enum RetryError<E: std::error::Error + 'static> {
    #[error("operation failed after {attempts} attempts, last error: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: E,
    },

    #[error("non-retryable error: {0}")]
    NonRetryable(#[source] E),

    #[error("retry cancelled")]
    Cancelled,
}

/// Calculates the delay before retry number `attempt`
///
/// Attempt 0 is the first try and has no delay. The exponent is clamped to
/// [`MAX_BACKOFF_EXPONENT`] and the doubling saturates, so large attempts
/// simply yield `max_delay`.
pub fn backoff_delay(attempt: u32, base_delay: Duration, max_delay: Duration) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let exponent = attempt.min(MAX_BACKOFF_EXPONENT) - 1;
    base_delay.saturating_mul(1u32 << exponent).min(max_delay)
}

/// Runs fallible operations with backoff between attempts
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    retry_ceiling: u32,
    base_delay: Duration,
    max_delay: Duration,
    cancel: CancellationToken,
}

impl RetryExecutor {
    pub fn new(
        retry_ceiling: u32,
        base_delay: Duration,
        max_delay: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            retry_ceiling,
            base_delay,
            max_delay,
            cancel,
        }
    }

    pub fn from_policy(policy: &RunPolicy, cancel: CancellationToken) -> Self {
        Self::new(
            policy.retry_ceiling,
            policy.backoff_base(),
            policy.backoff_cap(),
            cancel,
        )
    }

    /// Executes `operation` up to `retry_ceiling + 1` times
    ///
    /// The operation receives the zero-based attempt number. Non-retryable
    /// errors are returned immediately; cancellation during a backoff wait
    /// aborts with [`RetryError::Cancelled`].
    pub async fn execute<T, E, F, Fut>(&self, mut operation: F) -> Result<T, RetryError<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + std::error::Error + 'static,
    {
        let mut attempt = 0;

        loop {
            if attempt > 0 {
                let delay = backoff_delay(attempt, self.base_delay, self.max_delay);
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => return Err(RetryError::Cancelled),
                    _ = tokio::time::sleep(delay) => {}
                }
            }

            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_retryable() => return Err(RetryError::NonRetryable(e)),
                Err(e) if attempt >= self.retry_ceiling => {
                    return Err(RetryError::Exhausted {
                        attempts: attempt + 1,
                        last: e,
                    });
                }
                Err(e) => {
                    tracing::debug!("Attempt {} failed, retrying: {}", attempt + 1, e);
                    attempt += 1;
                }
            }
        }
    }
}
