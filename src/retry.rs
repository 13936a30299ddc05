//! Retry decisions for failed attempts.
//!
//! The policy only decides; whoever drives the request loop owns the timer.
//! [`crate::FetchClient`] sleeps on the returned delay itself, hosts with
//! their own scheduler can call [`RetryPolicy::next_step`] directly.

use std::time::Duration;

use crate::{ClientOptions, FetchError, Success};

/// Statuses treated as transient: `0` (client timeout or network failure),
/// 408 (server timeout), 503 (service unavailable), 504 (gateway timeout).
pub const RETRYABLE_STATUSES: [u16; 4] = [0, 408, 503, 504];

/// Whether `status` belongs to [`RETRYABLE_STATUSES`].
pub fn is_retryable_status(status: u16) -> bool {
    RETRYABLE_STATUSES.contains(&status)
}

/// What to do after an attempt finished.
#[derive(Debug)]
pub enum Step {
    /// Deliver this outcome to the caller.
    Completed(Result<Success, FetchError>),
    /// Wait this long, then re-issue the request with `attempt + 1`.
    ScheduleRetry(Duration),
}

/// Bounded, jittered exponential backoff.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Highest attempt number that may still be retried.
    pub max_retries: u32,
    /// Backoff scale `k` in milliseconds.
    pub backoff_scale_ms: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&ClientOptions::default())
    }
}

impl From<&ClientOptions> for RetryPolicy {
    fn from(options: &ClientOptions) -> Self {
        Self {
            max_retries: options.max_retries,
            backoff_scale_ms: options.backoff_scale_ms,
        }
    }
}

impl RetryPolicy {
    /// A failure of `attempt` is retried iff it is transient and
    /// `attempt <= max_retries`.
    pub fn should_retry(&self, attempt: u32, err: &FetchError) -> bool {
        err.is_transient() && attempt <= self.max_retries
    }

    /// Decides whether the outcome of `attempt` is final or worth another try.
    pub fn next_step(&self, attempt: u32, outcome: Result<Success, FetchError>) -> Step {
        match outcome {
            Err(err) if self.should_retry(attempt, &err) => {
                Step::ScheduleRetry(self.backoff_delay(attempt))
            }
            outcome => Step::Completed(outcome),
        }
    }

    /// Randomized delay before retrying a failed `attempt`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.backoff_delay_with(attempt, rand::random::<f64>())
    }

    /// `ceil((0.75 + jitter * 0.5) * 10^attempt * k)` milliseconds, never
    /// below one millisecond.
    ///
    /// `jitter` is clamped to `[0, 1]`.
    pub fn backoff_delay_with(&self, attempt: u32, jitter: f64) -> Duration {
        let exp = attempt.min(16) as i32;
        let factor = 0.75 + jitter.clamp(0.0, 1.0) * 0.5;
        let delay_ms = (factor * 10f64.powi(exp) * self.backoff_scale_ms.max(0.0)).ceil();
        // float-to-int `as` saturates
        Duration::from_millis(delay_ms.max(1.0) as u64)
    }
}
