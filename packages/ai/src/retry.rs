// ABOUTME: Exponential backoff retry for upstream LLM calls
// ABOUTME: Transient failures are retried a bounded number of times, everything else surfaces immediately

use std::future::Future;
use std::time::Duration;

use backoff::{future::retry_notify, ExponentialBackoff, ExponentialBackoffBuilder};
use tracing::{debug, warn};

use crate::error::{AIServiceError, AIServiceResult};

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Deterministic exponential schedule; the attempt cap is enforced by `with_retry`
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_backoff)
            .with_multiplier(self.multiplier)
            .with_max_interval(self.max_backoff)
            .with_randomization_factor(0.0)
            .with_max_elapsed_time(None)
            .build()
    }
}

/// Run `operation` until it succeeds, fails permanently, or attempts run out
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut operation: F,
) -> AIServiceResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AIServiceResult<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0u32;

    let result = retry_notify(
        policy.backoff(),
        || {
            attempt += 1;
            let current = attempt;
            let call = operation();
            async move {
                call.await.map_err(|err| {
                    if err.is_retryable() && current < max_attempts {
                        backoff::Error::transient(err)
                    } else {
                        backoff::Error::permanent(err)
                    }
                })
            }
        },
        |err: AIServiceError, wait: Duration| {
            warn!(
                operation = operation_name,
                max_attempts,
                backoff_ms = wait.as_millis() as u64,
                error = %err,
                "Transient upstream failure, retrying"
            );
        },
    )
    .await;

    if result.is_ok() && attempt > 1 {
        debug!(operation = operation_name, attempt, "Succeeded after retry");
    }
    result
}
