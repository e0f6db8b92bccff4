//! Command timing and transient-failure retry.
//!
//! Gateways log per-statement timing through [`elapsed_ms`]; callers
//! that want resilience wrap read operations in [`with_retry`], which
//! retries only failures [`DbError::is_transient`] classifies as safe.
//! Retrying a write would risk duplicating its effect, so write paths
//! never use it.

use std::time::{Duration, Instant};

use crate::error::DbError;

/// Milliseconds elapsed since `started`, saturating on overflow.
pub fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Exponential-backoff retry policy for transient storage failures.
///
/// Attempt `n` (1-based) waits `base_delay * 2^(n-1)` before retrying,
/// so the defaults produce delays of 1s, 2s, 4s across three attempts.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles each attempt.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Create a policy with explicit attempt count and base delay.
    pub const fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Delay to wait after the given 1-based attempt fails.
    pub const fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2_u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }
}

/// Run `operation`, retrying transient failures per the policy.
///
/// Non-transient failures (constraint violations, validation errors,
/// SQL errors with a database cause) propagate immediately without a
/// retry. The final transient failure propagates once attempts are
/// exhausted.
///
/// # Errors
///
/// Returns the last [`DbError`] produced by `operation`.
pub async fn with_retry<T, F, Fut>(policy: RetryPolicy, mut operation: F) -> Result<T, DbError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbError>>,
{
    let mut attempt: u32 = 1;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < policy.max_attempts => {
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %e,
                    "transient storage failure, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt = attempt.saturating_add(1);
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(1))
    }

    #[test]
    fn delays_double_per_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for(3), Duration::from_secs(4));
    }

    #[tokio::test]
    async fn transient_failures_are_retried_until_success() {
        let attempts = AtomicU32::new(0);

        let result = with_retry(fast_policy(), || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(DbError::Sql(sqlx::Error::PoolTimedOut))
                } else {
                    Ok(42_i32)
                }
            }
        })
        .await;

        assert_eq!(result.ok(), Some(42));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_transient_failure_propagates_immediately() {
        let attempts = AtomicU32::new(0);

        let result: Result<i32, DbError> = with_retry(fast_policy(), || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(DbError::Sql(sqlx::Error::RowNotFound)) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn attempts_are_exhausted_on_persistent_transient_failure() {
        let attempts = AtomicU32::new(0);

        let result: Result<i32, DbError> = with_retry(fast_policy(), || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(DbError::Sql(sqlx::Error::PoolTimedOut)) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }
}
