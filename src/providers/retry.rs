use crate::core::RateError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Exponential backoff with additive jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Attempts after the first one.
    pub max_retries: usize,
    pub base_delay_ms: u64,
    pub max_jitter_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1000,
            max_jitter_ms: 500,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based): `base * 2^attempt + jitter`.
    pub fn delay_for(&self, attempt: usize) -> Duration {
        let factor = 1u64 << attempt.min(16);
        let jitter = if self.max_jitter_ms > 0 {
            rand::thread_rng().gen_range(0..self.max_jitter_ms)
        } else {
            0
        };
        Duration::from_millis(
            self.base_delay_ms
                .saturating_mul(factor)
                .saturating_add(jitter),
        )
    }
}

/// Retries an async operation while it fails with a retryable error
///
/// # Parameters
/// - `operation`: Closure returning a future
/// - `policy`: Retry budget and backoff
///
/// # Returns
/// Either the successful result or the error of the last attempt
pub async fn with_retry<F, Fut, T>(mut operation: F, policy: &RetryPolicy) -> Result<T, RateError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RateError>>,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(val) => return Ok(val),
            Err(err) => {
                if attempt > policy.max_retries || !err.is_retryable() {
                    return Err(err);
                }
                let delay = policy.delay_for(attempt);
                debug!(
                    "Attempt {}/{} failed: {}. Retrying in {:?}...",
                    attempt,
                    policy.max_retries + 1,
                    err,
                    delay
                );
                attempt += 1;
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fast_policy(max_retries: usize) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            base_delay_ms: 1,
            max_jitter_ms: 1,
        }
    }

    #[test]
    fn test_delay_saturates_on_huge_base() {
        let policy = RetryPolicy {
            max_retries: 3,
            base_delay_ms: u64::MAX,
            max_jitter_ms: 500,
        };
        assert_eq!(policy.delay_for(3), Duration::from_millis(u64::MAX));
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let calls = AtomicUsize::new(0);
        let result = with_retry(
            || async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(RateError::Transport("connection reset".into()))
                } else {
                    Ok(42)
                }
            },
            &fast_policy(3),
        )
        .await;

        assert_eq!(result, Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_budget() {
        let calls = AtomicUsize::new(0);
        let result: Result<(), _> = with_retry(
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(RateError::Upstream {
                    status: Some(500),
                    message: "boom".into(),
                })
            },
            &fast_policy(3),
        )
        .await;

        assert!(matches!(result, Err(RateError::Upstream { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_decode_errors_are_not_retried() {
        let calls = AtomicUsize::new(0);
        let result: Result<(), _> = with_retry(
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(RateError::Decode("bad".into()))
            },
            &fast_policy(3),
        )
        .await;

        assert!(matches!(result, Err(RateError::Decode(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_backoff_grows_exponentially() {
        let policy = RetryPolicy {
            max_retries: 3,
            base_delay_ms: 100,
            max_jitter_ms: 50,
        };
        for attempt in 1..=3 {
            let delay = policy.delay_for(attempt).as_millis() as u64;
            let floor = 100 * (1 << attempt);
            assert!(delay >= floor && delay < floor + 50, "attempt {attempt}: {delay}");
        }
    }
}
