//! Linear backoff retry policy shared by every Auto Scaling call.
//!
//! An operation is attempted once and then retried up to `max_retries` times. Before retry `n`
//! (1-based) the policy sleeps `step * n`, so the defaults give delays of 5s, 10s, 15s, 20s and
//! 25s. The policy holds no state between calls and can be used from any number of tasks.
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

/// Number of retries after the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 5;
/// Delay unit multiplied by the retry index
pub const DEFAULT_RETRY_STEP: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: DEFAULT_MAX_RETRIES, step: DEFAULT_RETRY_STEP }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, step: Duration) -> Self {
        Self { max_retries, step }
    }

    /// Total number of times the operation may run
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Delay slept before the given retry (1-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.step.saturating_mul(retry)
    }

    /// Runs `operation` until it succeeds or the retry budget is spent.
    ///
    /// The first success is returned immediately. Once every attempt failed the error of the
    /// last attempt is returned untouched.
    pub async fn retry<T, E, F, Fut>(&self, operation: &str, mut f: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut retry = 0;
        loop {
            match f().await {
                Ok(value) => return Ok(value),
                Err(error) if retry >= self.max_retries => {
                    tracing::warn!(
                        operation = %operation,
                        attempts = retry + 1,
                        error = %error,
                        "Giving up after exhausting retries"
                    );
                    return Err(error);
                }
                Err(error) => {
                    retry += 1;
                    let delay = self.delay_for(retry);
                    tracing::debug!(
                        operation = %operation,
                        retry = retry,
                        delay_secs = delay.as_secs(),
                        error = %error,
                        "Attempt failed, backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}
