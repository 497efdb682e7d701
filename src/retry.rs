//! Bounded retry with fixed or exponential backoff.

use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts including the first one.
    pub max_attempts: u32,
    pub backoff: Duration,
    /// Doubles `backoff` after each failed attempt when set.
    pub exponential: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(1),
            exponential: true,
        }
    }
}

impl RetryPolicy {
    /// Policy that never sleeps; used by tests and direct callers that
    /// handle pacing themselves.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff: Duration::ZERO,
            exponential: false,
        }
    }

    /// Delay before attempt `attempt + 1`, where `attempt` is 1-based.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        if !self.exponential {
            return self.backoff;
        }
        let factor = 1u32 << attempt.saturating_sub(1).min(8);
        self.backoff.saturating_mul(factor)
    }

    /// Runs `op` until it succeeds or attempts are exhausted.
    ///
    /// Returns the last error together with the number of attempts made.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut op: F) -> Result<T, (E, u32)>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;

            match op(attempt).await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(url = label, attempts = attempt, "Succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(e) => {
                    if attempt >= max_attempts {
                        warn!(
                            url = label,
                            attempts = attempt,
                            error = %e,
                            "Giving up after retries"
                        );
                        return Err((e, attempt));
                    }

                    warn!(url = label, attempts = attempt, error = %e, "Attempt failed, retrying");

                    let delay = self.delay_after(attempt);
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }
    }
}
