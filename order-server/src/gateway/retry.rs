//! Reusable retry policy for gateway calls
//!
//! Every gateway operation runs under the same policy: a per-attempt
//! timeout, a bounded number of attempts, and exponential backoff
//! between them. The last error is surfaced once attempts are
//! exhausted.

use std::future::Future;
use std::time::Duration;
use tracing::warn;

use super::{GatewayError, GatewayResult};

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            attempt_timeout: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Run `f` until it succeeds or attempts are exhausted
    pub async fn run<T, F, Fut>(&self, operation: &'static str, mut f: F) -> GatewayResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = GatewayResult<T>>,
    {
        let mut delay = self.base_delay;
        let mut last_err = GatewayError::Timeout(operation);

        for attempt in 1..=self.max_attempts {
            match tokio::time::timeout(self.attempt_timeout, f()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(err)) => {
                    warn!(operation, attempt, error = %err, "Gateway call failed");
                    last_err = err;
                }
                Err(_) => {
                    warn!(operation, attempt, "Gateway call timed out");
                    last_err = GatewayError::Timeout(operation);
                }
            }

            if attempt < self.max_attempts {
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
        }

        Err(last_err)
    }
}
