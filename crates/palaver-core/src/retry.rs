// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Exponential backoff with jitter.
//!
//! One retry policy shared by the bootstrap health check and the LLM
//! adapter, parameterized by attempt budget, base delay, jitter bound and a
//! retryable-error predicate.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::warn;

/// Retry policy: exponential backoff with random jitter.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts (0 = no retries, just one attempt).
    pub max_retries: u32,
    /// Base delay between retries in milliseconds.
    pub base_delay_ms: u64,
    /// Upper bound for the random jitter added to each delay, in milliseconds.
    pub jitter_ms: u64,
}

impl RetryPolicy {
    /// Create a new retry policy.
    pub fn new(max_retries: u32, base_delay_ms: u64, jitter_ms: u64) -> Self {
        Self {
            max_retries,
            base_delay_ms,
            jitter_ms,
        }
    }

    /// Calculate the delay before a given retry attempt (1-indexed).
    ///
    /// Attempt 1 is the first retry after the initial failure:
    /// `base * 2^(attempt-1) + jitter`, with jitter drawn uniformly from
    /// `[0, jitter_ms]`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let multiplier = 2u64.saturating_pow(attempt.saturating_sub(1));
        let base = self.base_delay_ms.saturating_mul(multiplier);
        let jitter = if self.jitter_ms > 0 {
            rand::thread_rng().gen_range(0..=self.jitter_ms)
        } else {
            0
        };
        Duration::from_millis(base.saturating_add(jitter))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 500,
            jitter_ms: 250,
        }
    }
}

/// Run `op` up to `1 + policy.max_retries` times.
///
/// `op` receives the 1-indexed attempt number. A failure is retried only
/// while the budget lasts and `is_retryable` returns true for it; the last
/// error is returned unchanged once the budget is exhausted or the error is
/// not retryable. Each failed attempt is logged before the backoff sleep.
pub async fn retry<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    what: &str,
    is_retryable: P,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let mut attempt: u32 = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if attempt <= policy.max_retries && is_retryable(&err) => {
                let delay = policy.delay_for_attempt(attempt);
                warn!(
                    attempt,
                    max_retries = policy.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    "{} failed: {}, retrying",
                    what,
                    err
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_delay_grows_exponentially() {
        let policy = RetryPolicy::new(3, 100, 0);
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(400));
    }

    #[test]
    fn test_delay_jitter_stays_in_bounds() {
        let policy = RetryPolicy::new(3, 100, 50);
        for attempt in 1..=3 {
            let base = 100u64 * 2u64.pow(attempt - 1);
            for _ in 0..20 {
                let delay = policy.delay_for_attempt(attempt).as_millis() as u64;
                assert!(delay >= base, "delay {} below base {}", delay, base);
                assert!(delay <= base + 50, "delay {} above base+jitter", delay);
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_succeeds_within_budget() {
        let policy = RetryPolicy::new(2, 10, 0);
        let calls = AtomicU32::new(0);

        let result: Result<u32, String> = retry(&policy, "op", |_| true, |_attempt| {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 3 {
                    Err(format!("failure {}", n))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_exhausts_budget() {
        let policy = RetryPolicy::new(2, 10, 0);
        let calls = AtomicU32::new(0);

        let result: Result<(), String> = retry(&policy, "op", |_| true, |_attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("always".to_string()) }
        })
        .await;

        assert_eq!(result, Err("always".to_string()));
        // 1 initial attempt + 2 retries
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_error_fails_fast() {
        let policy = RetryPolicy::new(5, 10, 0);
        let calls = AtomicU32::new(0);

        let result: Result<(), String> = retry(&policy, "op", |_| false, |_attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("fatal".to_string()) }
        })
        .await;

        assert_eq!(result, Err("fatal".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries_means_single_attempt() {
        let policy = RetryPolicy::new(0, 10, 0);
        let calls = AtomicU32::new(0);

        let result: Result<(), String> = retry(&policy, "op", |_| true, |_attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("nope".to_string()) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
