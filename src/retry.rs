//! Retry policy for transient provider and store failures.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::Result;

/// A reusable retry policy with exponential backoff.
///
/// Only errors whose [`RagError::is_retryable`](crate::RagError::is_retryable)
/// returns true are retried; everything else is returned to the caller on the
/// first attempt. Language-model generation is never wrapped in this policy;
/// generation failures are surfaced, not retried, to avoid duplicate side
/// effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Factor applied to the delay after each retry.
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3, base_delay: Duration::from_millis(100), multiplier: 2 }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self { max_attempts: 1, ..Self::default() }
    }

    /// Run `op`, retrying retryable failures with exponential backoff.
    ///
    /// `label` names the operation in log output.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        let mut delay = self.base_delay;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    warn!(
                        operation = label,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "transient failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    delay *= self.multiplier;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
