//! Bounded-retry policy with multiplicative back-off and jitter.
//!
//! Retry budgets are carried by an explicit [`RetryPolicy`] value handed to
//! each fallible call site, so the budget is visible where the call is made
//! rather than hidden in a wrapper. After the final attempt the **last
//! error is returned**, never raised mid-loop; the caller decides whether
//! the failure is fatal to the entity, the page, or swallowed with an empty
//! result.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use vendcrawl_core::AppConfig;

/// Bounded-retry wrapper around a fallible async operation.
///
/// Back-off schedule with `initial_delay = 1s`, `backoff_factor = 2.0`:
///
/// | Attempt | Sleep before next attempt |
/// |---------|---------------------------|
/// | 1       | 1 s ± 25 % jitter         |
/// | 2       | 2 s ± 25 % jitter         |
/// | 3       | 4 s ± 25 % jitter         |
///
/// Delay is capped at `max_delay`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Always at least 1.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub backoff_factor: f64,
    pub max_delay: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_attempts: u32, initial_delay: Duration, backoff_factor: f64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay,
            backoff_factor,
            max_delay: Duration::from_secs(60),
        }
    }

    /// Policy derived from the configured retry settings.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_attempts: config.retry_max_attempts.max(1),
            initial_delay: Duration::from_millis(config.retry_initial_delay_ms),
            backoff_factor: config.retry_backoff_factor,
            max_delay: Duration::from_millis(config.retry_max_delay_ms),
        }
    }

    /// A single-attempt policy, mainly for tests.
    #[must_use]
    pub fn no_retries() -> Self {
        Self::new(1, Duration::ZERO, 1.0)
    }

    /// Runs `operation` up to `max_attempts` times, sleeping between
    /// attempts and growing the delay by `backoff_factor` each time.
    ///
    /// # Errors
    ///
    /// Returns the error from the **last** attempt once the budget is
    /// exhausted.
    pub async fn run<T, E, F, Fut>(&self, operation: F) -> Result<T, E>
    where
        E: Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.run_where(operation, |_| true).await
    }

    /// Like [`RetryPolicy::run`], but gives up immediately when
    /// `should_retry` returns `false` for the error — used with
    /// [`crate::FetchError::is_transient`] so malformed responses and 404s
    /// are not retried.
    ///
    /// # Errors
    ///
    /// Returns the first non-retriable error, or the last error once the
    /// attempt budget is exhausted.
    pub async fn run_where<T, E, F, Fut, P>(
        &self,
        mut operation: F,
        should_retry: P,
    ) -> Result<T, E>
    where
        E: Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
    {
        let mut attempt = 1u32;
        let mut delay = self.initial_delay;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if attempt >= self.max_attempts || !should_retry(&err) {
                        return Err(err);
                    }
                    let sleep_for = jittered(delay.min(self.max_delay));
                    tracing::warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = sleep_for.as_millis() as u64,
                        error = %err,
                        "transient failure — retrying after back-off"
                    );
                    tokio::time::sleep(sleep_for).await;
                    delay = delay.mul_f64(self.backoff_factor).min(self.max_delay);
                    attempt += 1;
                }
            }
        }
    }
}

/// Applies ±25 % jitter so synchronized clients do not retry in lockstep.
fn jittered(delay: Duration) -> Duration {
    if delay.is_zero() {
        return delay;
    }
    delay.mul_f64(rand::random::<f64>() * 0.5 + 0.75)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    fn fast(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::ZERO, 1.0)
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = fast(3)
            .run(|| {
                let c = Arc::clone(&c);
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Ok::<u32, String>(42)
                }
            })
            .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = fast(3)
            .run(|| {
                let c = Arc::clone(&c);
                async move {
                    let n = c.fetch_add(1, Ordering::SeqCst);
                    if n < 2 {
                        Err("flaky".to_string())
                    } else {
                        Ok::<u32, String>(99)
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), 99);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn returns_last_error_after_exhausting_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = fast(3)
            .run(|| {
                let c = Arc::clone(&c);
                async move {
                    let n = c.fetch_add(1, Ordering::SeqCst);
                    Err::<u32, String>(format!("failure {n}"))
                }
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(result.unwrap_err(), "failure 2");
    }

    #[tokio::test]
    async fn non_retriable_error_is_returned_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = fast(5)
            .run_where(
                || {
                    let c = Arc::clone(&c);
                    async move {
                        c.fetch_add(1, Ordering::SeqCst);
                        Err::<u32, String>("fatal".to_string())
                    }
                },
                |e| e != "fatal",
            )
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.unwrap_err(), "fatal");
    }

    #[test]
    fn max_attempts_is_clamped_to_one() {
        let policy = RetryPolicy::new(0, Duration::ZERO, 2.0);
        assert_eq!(policy.max_attempts, 1);
    }

    #[test]
    fn jitter_stays_within_bounds() {
        let base = Duration::from_millis(1000);
        for _ in 0..100 {
            let j = jittered(base);
            assert!(j >= Duration::from_millis(750) && j <= Duration::from_millis(1250));
        }
    }
}
