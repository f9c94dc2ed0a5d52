//! Retry policy for model backend calls.
//!
//! Each failed attempt is classified into a [`RetryDecision`]: transient
//! failures wait a fixed backoff and try again until the attempt budget is
//! spent; anything else aborts at once.

use crate::config::RetryConfig;
use crate::error::ApiError;
use std::time::Duration;

/// Bounded, fixed-backoff retry policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Upper bound on total attempts, including the initial request.
    pub max_attempts: u32,
    /// Delay between attempts.
    pub backoff: Duration,
}

/// What to do after a failed attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetryDecision {
    Retry(Duration),
    Abort,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            backoff: Duration::from_secs(config.backoff_secs),
        }
    }

    /// Classify the failure of zero-based attempt `attempt`.
    pub fn decide(&self, err: &ApiError, attempt: u32) -> RetryDecision {
        if attempt.saturating_add(1) >= self.max_attempts || !err.is_transient() {
            return RetryDecision::Abort;
        }
        RetryDecision::Retry(self.backoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> ApiError {
        ApiError::Status {
            code,
            body: String::new(),
        }
    }

    #[test]
    fn transient_errors_retry_until_budget_is_spent() {
        let policy = RetryPolicy {
            max_attempts: 3,
            backoff: Duration::from_secs(5),
        };
        let err = status(503);
        assert_eq!(
            policy.decide(&err, 0),
            RetryDecision::Retry(Duration::from_secs(5))
        );
        assert_eq!(
            policy.decide(&err, 1),
            RetryDecision::Retry(Duration::from_secs(5))
        );
        assert_eq!(policy.decide(&err, 2), RetryDecision::Abort);
    }

    #[test]
    fn fatal_errors_abort_immediately() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.decide(&status(401), 0), RetryDecision::Abort);
        assert_eq!(
            policy.decide(&ApiError::InvalidResponse("bad json".into()), 0),
            RetryDecision::Abort
        );
    }

    #[test]
    fn single_attempt_policy_never_retries() {
        let policy = RetryPolicy {
            max_attempts: 1,
            backoff: Duration::ZERO,
        };
        assert_eq!(policy.decide(&status(429), 0), RetryDecision::Abort);
    }

    #[test]
    fn from_config_floors_attempts_at_one() {
        let policy = RetryPolicy::from_config(&RetryConfig {
            max_attempts: 0,
            backoff_secs: 2,
        });
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.backoff, Duration::from_secs(2));
    }
}
