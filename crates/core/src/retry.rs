//! Bounded retry with a fixed delay
//!
//! Provides retry mechanisms for operations that may need a moment to settle,
//! such as files written by an external process. A predicate decides which
//! errors are worth another attempt, so permanent errors stop immediately.
//!
//! # Example
//!
//! ```rust,no_run
//! use schemekit_core::retry::{retry_when, RetryConfig};
//! use std::time::Duration;
//!
//! let result = retry_when(
//!     RetryConfig::fixed(3, Duration::from_secs(10)),
//!     || Ok::<_, std::io::Error>("visible"),
//!     |e: &std::io::Error| e.kind() == std::io::ErrorKind::NotFound,
//! );
//! assert!(result.is_ok());
//! ```

use std::thread;
use std::time::Duration;

/// Retry configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
    /// Delay before every retry
    pub delay: Duration,
}

impl RetryConfig {
    /// Create a config that waits the same delay between every attempt
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Create a config with no retries
    pub fn no_retry() -> Self {
        Self::fixed(1, Duration::ZERO)
    }

    /// Delay to wait before `attempt` (zero-based)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            Duration::ZERO
        } else {
            self.delay
        }
    }
}

/// Retry result with attempt information
#[derive(Debug)]
pub struct RetryResult<T> {
    /// The successful result
    pub value: T,
    /// Number of attempts made
    pub attempts: u32,
}

/// Failure after retries, carrying the last error
#[derive(Debug)]
pub struct RetryError<E> {
    /// The error returned by the last attempt
    pub error: E,
    /// Number of attempts made
    pub attempts: u32,
}

/// Execute a function with retry logic, retrying only errors accepted by `should_retry`
pub fn retry_when<F, T, E, P>(
    config: RetryConfig,
    mut f: F,
    should_retry: P,
) -> Result<RetryResult<T>, RetryError<E>>
where
    F: FnMut() -> Result<T, E>,
    P: Fn(&E) -> bool,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        // Wait before retry (except first attempt)
        if attempt > 0 {
            thread::sleep(config.delay_for_attempt(attempt));
        }

        match f() {
            Ok(value) => {
                return Ok(RetryResult {
                    value,
                    attempts: attempt + 1,
                });
            }
            Err(error) => {
                attempt += 1;
                if attempt >= max_attempts || !should_retry(&error) {
                    return Err(RetryError {
                        error,
                        attempts: attempt,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn always(_: &&str) -> bool {
        true
    }

    #[test]
    fn test_retry_success_first_attempt() {
        let config = RetryConfig::fixed(3, Duration::from_secs(60));
        let result = retry_when(config, || Ok::<_, &str>("success"), always).unwrap();

        assert_eq!(result.value, "success");
        assert_eq!(result.attempts, 1);
    }

    #[test]
    fn test_retry_success_after_failures() {
        let config = RetryConfig::fixed(3, Duration::from_millis(1));

        let mut attempt = 0;
        let result = retry_when(
            config,
            || {
                attempt += 1;
                if attempt < 3 {
                    Err("not yet")
                } else {
                    Ok("success")
                }
            },
            always,
        )
        .unwrap();

        assert_eq!(result.value, "success");
        assert_eq!(result.attempts, 3);
    }

    #[test]
    fn test_retry_all_failures() {
        let config = RetryConfig::fixed(2, Duration::ZERO);

        let err = retry_when(config, || Err::<(), _>("always fails"), always).unwrap_err();
        assert_eq!(err.error, "always fails");
        assert_eq!(err.attempts, 2);
    }

    #[test]
    fn test_retry_when_stops_on_permanent_error() {
        let config = RetryConfig::fixed(5, Duration::from_secs(60));

        let start = Instant::now();
        let mut calls = 0;
        let err = retry_when(
            config,
            || {
                calls += 1;
                Err::<(), _>("permanent")
            },
            |e| *e != "permanent",
        )
        .unwrap_err();

        assert_eq!(calls, 1);
        assert_eq!(err.attempts, 1);
        assert!(start.elapsed() < Duration::from_secs(60));
    }

    #[test]
    fn test_zero_attempts_still_runs_once() {
        let config = RetryConfig {
            max_attempts: 0,
            ..RetryConfig::no_retry()
        };

        let result = retry_when(config, || Ok::<_, &str>(7), always).unwrap();
        assert_eq!(result.attempts, 1);
        assert_eq!(RetryConfig::fixed(0, Duration::ZERO).max_attempts, 1);
    }

    #[test]
    fn test_fixed_delay_is_constant() {
        let config = RetryConfig::fixed(3, Duration::from_secs(10));

        assert_eq!(config.delay_for_attempt(0), Duration::ZERO);
        assert_eq!(config.delay_for_attempt(1), Duration::from_secs(10));
        assert_eq!(config.delay_for_attempt(2), Duration::from_secs(10));
    }

    #[test]
    fn test_huge_delay_is_returned_unchanged() {
        let config = RetryConfig::fixed(3, Duration::from_secs(u64::MAX));

        assert_eq!(config.delay_for_attempt(1), Duration::from_secs(u64::MAX));
        assert_eq!(config.delay_for_attempt(u32::MAX), Duration::from_secs(u64::MAX));
    }
}
