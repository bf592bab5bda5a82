//! Retry with bounded exponential backoff for collaborator calls

use std::time::Duration;

use crate::error::FetchError;

/// How often and how patiently a collaborator call is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one
    pub max_retries: u32,
    /// Delay before the first retry; doubles on every further attempt
    pub base_delay: Duration,
    /// Upper bound for a single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// No retries, no sleeping. Used by tests and one-shot commands.
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Exponential backoff: base, 2*base, 4*base, ... capped at `max_delay`
    pub fn backoff_duration(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Retry a fallible collaborator call with exponential backoff.
///
/// Retryable errors are logged and retried up to `policy.max_retries` times.
/// Returns `Ok(T)` on first success, or the final `Err` on exhaustion /
/// non-retryable error.
pub fn retry_with_backoff<T>(
    label: &str,
    policy: &RetryPolicy,
    mut attempt_fn: impl FnMut() -> Result<T, FetchError>,
) -> Result<T, FetchError> {
    let mut attempt = 0u32;
    loop {
        match attempt_fn() {
            Ok(v) => return Ok(v),
            Err(e) if attempt < policy.max_retries && e.is_retryable() => {
                attempt += 1;
                log::debug!(
                    "{label}: attempt {attempt}/{} failed: {e}, retrying...",
                    policy.max_retries
                );
                std::thread::sleep(policy.backoff_duration(attempt));
            }
            Err(e) => {
                log::error!("{label}: failed permanently: {e}");
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unavailable() -> FetchError {
        FetchError::Http {
            status: Some(503),
            message: "unavailable".into(),
        }
    }

    #[test]
    fn backoff_exponential() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_duration(1), Duration::from_secs(2));
        assert_eq!(policy.backoff_duration(2), Duration::from_secs(4));
        assert_eq!(policy.backoff_duration(3), Duration::from_secs(8));
    }

    #[test]
    fn backoff_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_duration(10), Duration::from_secs(30));
        assert_eq!(policy.backoff_duration(u32::MAX), Duration::from_secs(30));
    }

    #[test]
    fn succeeds_after_transient_failures() {
        let policy = RetryPolicy {
            max_retries: 3,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        };
        let mut calls = 0;
        let result = retry_with_backoff("test", &policy, || {
            calls += 1;
            if calls < 3 { Err(unavailable()) } else { Ok(calls) }
        });
        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn gives_up_after_max_retries() {
        let policy = RetryPolicy {
            max_retries: 2,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        };
        let mut calls = 0;
        let result: Result<(), _> = retry_with_backoff("test", &policy, || {
            calls += 1;
            Err(unavailable())
        });
        assert!(result.is_err());
        assert_eq!(calls, 3);
    }

    #[test]
    fn non_retryable_fails_immediately() {
        let mut calls = 0;
        let result: Result<(), _> = retry_with_backoff("test", &RetryPolicy::default(), || {
            calls += 1;
            Err(FetchError::Invalid("bad record".into()))
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }
}
