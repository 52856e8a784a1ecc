//! When to call the inference backend again after a failed attempt.
//!
//! Only [`OpenAiClient`](crate::OpenAiClient) consults a [`RetryPolicy`]; the
//! assistant pipeline and the message assembler never retry. The policy looks
//! at the concrete [`CallFailure`]: only transient failures are retried, and a
//! rate-limited backend (HTTP 429) gets a longer pause than a flaky one.

use std::time::Duration;

use crate::error::CallFailure;

/// Bounded exponential backoff for transient backend failures.
///
/// The default makes a single attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one.
    pub retries: u32,
    /// Pause before the first retry; doubled for every retry after it.
    pub base_delay: Duration,
    /// No single pause is longer than this.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 0,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Default delays with `retries` extra attempts.
    pub fn retries(retries: u32) -> Self {
        Self {
            retries,
            ..Default::default()
        }
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// How long to wait before retrying after `failure`, given that
    /// `retries_done` retries already happened. `None` means give up.
    pub fn backoff(&self, failure: &CallFailure, retries_done: u32) -> Option<Duration> {
        if retries_done >= self.retries || !failure.is_transient() {
            return None;
        }
        // 429 starts one doubling ahead.
        let steps = match failure {
            CallFailure::Status { status: 429, .. } => retries_done.saturating_add(1),
            _ => retries_done,
        };
        let delay = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(steps));
        Some(delay.min(self.max_delay))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> CallFailure {
        CallFailure::Status {
            status: code,
            body: String::new(),
        }
    }

    #[test]
    fn default_gives_up_immediately() {
        assert_eq!(RetryPolicy::default().backoff(&status(503), 0), None);
    }

    #[test]
    fn transient_failure_doubles_until_cap() {
        let policy = RetryPolicy {
            retries: 10,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(3),
        };
        let unavailable = status(503);
        assert_eq!(policy.backoff(&unavailable, 0), Some(Duration::from_millis(500)));
        assert_eq!(policy.backoff(&unavailable, 1), Some(Duration::from_secs(1)));
        assert_eq!(policy.backoff(&unavailable, 2), Some(Duration::from_secs(2)));
        assert_eq!(policy.backoff(&unavailable, 3), Some(Duration::from_secs(3)));
        assert_eq!(policy.backoff(&unavailable, 9), Some(Duration::from_secs(3)));
        assert_eq!(policy.backoff(&unavailable, 10), None);
    }

    #[test]
    fn rate_limit_waits_longer() {
        let policy = RetryPolicy::retries(2);
        assert_eq!(policy.backoff(&status(429), 0), Some(Duration::from_secs(1)));
        assert_eq!(policy.backoff(&status(502), 0), Some(Duration::from_millis(500)));
    }

    #[test]
    fn permanent_failures_never_retried() {
        let policy = RetryPolicy::retries(5);
        assert_eq!(policy.backoff(&status(401), 0), None);
        assert_eq!(policy.backoff(&status(400), 0), None);
        assert_eq!(policy.backoff(&CallFailure::EmptyReply, 0), None);
        assert_eq!(policy.backoff(&CallFailure::Api("bad model".into()), 0), None);
    }

    #[test]
    fn huge_retry_counts_saturate() {
        let policy = RetryPolicy::retries(u32::MAX);
        assert_eq!(policy.backoff(&status(504), 200), Some(policy.max_delay));
    }
}
