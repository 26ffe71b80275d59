//! Bounded exponential backoff for embedding requests

use super::traits::{EmbeddingError, EmbeddingResult};
use std::time::Duration;
use tracing::warn;

/// Total attempts per request, including the first
pub const MAX_ATTEMPTS: u32 = 5;
/// Delay after the first failed attempt
pub const BASE_DELAY: Duration = Duration::from_millis(500);
/// Upper bound on any single delay
pub const MAX_DELAY: Duration = Duration::from_secs(8);

/// Retry schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            base_delay: BASE_DELAY,
            max_delay: MAX_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Delay after failed attempt `attempt` (1-based): `base * 2^(attempt-1)`, capped
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay
            .checked_mul(1u32 << exponent)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Run `operation` until it succeeds, fails permanently, or attempts run out
    pub fn run<T, F>(&self, what: &str, mut operation: F) -> EmbeddingResult<T>
    where
        F: FnMut() -> EmbeddingResult<T>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            let err = match operation() {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_transient() => return Err(err),
                Err(err) => err,
            };

            if attempt >= max_attempts {
                return Err(EmbeddingError::RetriesExhausted {
                    attempts: attempt,
                    last: Box::new(err),
                });
            }

            let delay = match &err {
                EmbeddingError::RateLimited {
                    retry_after_ms: Some(ms),
                } => Duration::from_millis(*ms).min(self.max_delay),
                _ => self.delay_for(attempt),
            };
            warn!(
                "{} failed (attempt {}/{}): {}; retrying in {:?}",
                what, attempt, max_attempts, err, delay
            );
            std::thread::sleep(delay);
            attempt += 1;
        }
    }
}

#[cfg(test)]
pub(crate) fn fast_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(4),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn unavailable() -> EmbeddingError {
        EmbeddingError::HttpStatus {
            status: 503,
            body: "unavailable".to_string(),
        }
    }

    #[test]
    fn test_default_schedule() {
        let policy = RetryPolicy::default();
        let delays: Vec<Duration> = (1..MAX_ATTEMPTS).map(|n| policy.delay_for(n)).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(500),
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
            ]
        );
    }

    #[test]
    fn test_delay_is_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(5), MAX_DELAY);
        assert_eq!(policy.delay_for(40), MAX_DELAY);
    }

    #[test]
    fn test_succeeds_after_transient_failures() {
        let calls = Cell::new(0);
        let result = fast_policy(5).run("embed", || {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err(unavailable())
            } else {
                Ok(calls.get())
            }
        });
        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_exhausts_attempts() {
        let calls = Cell::new(0);
        let result: EmbeddingResult<()> = fast_policy(5).run("embed", || {
            calls.set(calls.get() + 1);
            Err(unavailable())
        });

        assert_eq!(calls.get(), 5);
        match result.unwrap_err() {
            EmbeddingError::RetriesExhausted { attempts, last } => {
                assert_eq!(attempts, 5);
                assert!(matches!(*last, EmbeddingError::HttpStatus { status: 503, .. }));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_permanent_error_not_retried() {
        let calls = Cell::new(0);
        let result: EmbeddingResult<()> = fast_policy(5).run("embed", || {
            calls.set(calls.get() + 1);
            Err(EmbeddingError::MalformedResponse("not json".to_string()))
        });
        assert_eq!(calls.get(), 1);
        assert!(matches!(result, Err(EmbeddingError::MalformedResponse(_))));
    }

    #[test]
    fn test_zero_attempts_still_runs_once() {
        let calls = Cell::new(0);
        let _ = fast_policy(0).run("embed", || -> EmbeddingResult<()> {
            calls.set(calls.get() + 1);
            Err(unavailable())
        });
        assert_eq!(calls.get(), 1);
    }
}
