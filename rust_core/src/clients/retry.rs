//! Retry with exponential backoff and jitter for upstream fetches.

use rand::Rng;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// How many times to try a fetch and how long to wait between attempts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_backoff: Duration::from_millis(600),
            max_backoff: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Delay before retrying after failed attempt number `attempt` (1-based):
    /// `base * 2^(attempt-1)` capped at `max_backoff`, plus up to half of
    /// that again as random jitter.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        let delay = self
            .base_backoff
            .saturating_mul(1_u32 << exp)
            .min(self.max_backoff);
        let half_ms = delay.as_millis() as u64 / 2;
        let jitter = rand::thread_rng().gen_range(0..=half_ms);
        delay + Duration::from_millis(jitter)
    }
}

/// Run `f` until it succeeds, returns a non-retriable error, or the attempt
/// budget runs out. The last error is returned.
pub async fn retry_with_backoff<F, Fut, T, E>(
    mut f: F,
    policy: &RetryPolicy,
    is_retriable: impl Fn(&E) -> bool,
    target: &str,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        match f().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_attempts && is_retriable(&e) => {
                let delay = policy.backoff(attempt);
                warn!(
                    "Fetch of {} failed (attempt {}/{}): {}. Retrying in {}ms",
                    target,
                    attempt,
                    max_attempts,
                    e,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(4),
        }
    }

    #[test]
    fn test_backoff_bounds() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(300),
        };
        for _ in 0..20 {
            let first = policy.backoff(1);
            assert!(first >= Duration::from_millis(100) && first <= Duration::from_millis(150));
            let capped = policy.backoff(10);
            assert!(capped >= Duration::from_millis(300) && capped <= Duration::from_millis(450));
        }
    }

    #[tokio::test]
    async fn test_retry_succeeds_eventually() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<u32, String> = retry_with_backoff(
            || {
                let counter = counter.clone();
                async move {
                    let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                    if n < 3 {
                        Err("timeout".to_string())
                    } else {
                        Ok(n)
                    }
                }
            },
            &fast_policy(5),
            |_| true,
            "test",
        )
        .await;

        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<(), String> = retry_with_backoff(
            || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err("503".to_string())
                }
            },
            &fast_policy(3),
            |_| true,
            "test",
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retriable_stops_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<(), String> = retry_with_backoff(
            || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err("404".to_string())
                }
            },
            &fast_policy(5),
            |e| e != "404",
            "test",
        )
        .await;

        assert_eq!(result, Err("404".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
