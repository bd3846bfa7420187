//! Retry policy with exponential backoff.
//!
//! Configuration and progress are kept apart:
//!
//! - [`RetryPolicy`] is immutable and shareable. It answers two pure
//!   questions: is this error worth retrying after `n` retries, and how long
//!   to wait before retry `n`.
//! - [`RetryState`] is created per logical operation and owns the retry
//!   counter. It implements [`RetryHandler`], the seam the
//!   [`RetryInvoker`](crate::RetryInvoker) drives.
//!
//! Only classified failures are retried: an error whose status cannot be
//! extracted, or whose `(group, code)` is missing from the retryable table,
//! ends the sequence.

use std::{sync::Arc, time::Duration};

use fabric_sdk_types::RetryableCodes;

use crate::{config::RetryOpts, error::SdkError, status::Status};

/// Decides whether an operation should be attempted again.
pub trait RetryHandler {
    /// Consumes one retry if `err` warrants it, returning the backoff to wait
    /// before the next attempt.
    ///
    /// Returns `None` when the error is not retryable or the retries are
    /// exhausted. Never sleeps.
    fn next_backoff(&mut self, err: &SdkError) -> Option<Duration>;

    /// Blocking form of [`next_backoff`](Self::next_backoff).
    ///
    /// When a retry is warranted, sleeps the calling thread for the backoff
    /// and returns `true`. Do not call from inside an async runtime.
    fn required(&mut self, err: &SdkError) -> bool {
        match self.next_backoff(err) {
            Some(backoff) => {
                std::thread::sleep(backoff);
                true
            },
            None => false,
        }
    }
}

/// Immutable retry policy.
///
/// # Example
///
/// ```
/// # use std::time::Duration;
/// # use fabric_sdk::{RetryOpts, RetryPolicy};
/// let policy = RetryPolicy::new(RetryOpts {
///     initial_backoff: Duration::from_secs(2),
///     max_backoff: Duration::from_secs(30),
///     backoff_factor: 3.0,
///     ..RetryOpts::default()
/// });
///
/// assert_eq!(policy.backoff(0), Duration::from_secs(2));
/// assert_eq!(policy.backoff(1), Duration::from_secs(6));
/// assert_eq!(policy.backoff(2), Duration::from_secs(18));
/// assert_eq!(policy.backoff(3), Duration::from_secs(30));
/// ```
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    opts: Arc<RetryOpts>,
}

impl RetryPolicy {
    /// Creates a policy, substituting [`RetryableCodes::sdk_default`] for an
    /// empty retryable table.
    #[must_use]
    pub fn new(mut opts: RetryOpts) -> Self {
        if opts.retryable_codes.is_empty() {
            opts.retryable_codes = RetryableCodes::sdk_default();
        }
        Self { opts: Arc::new(opts) }
    }

    /// Returns the options this policy was built from.
    #[must_use]
    pub fn opts(&self) -> &RetryOpts {
        &self.opts
    }

    /// Returns whether `err` carries a status listed as retryable.
    #[must_use]
    pub fn is_retryable(&self, err: &SdkError) -> bool {
        Status::from_error(Some(err))
            .is_some_and(|status| self.opts.retryable_codes.contains(status.group(), status.code()))
    }

    /// Returns whether `err` should be retried after `retries` retries.
    #[must_use]
    pub fn should_retry(&self, err: &SdkError, retries: u32) -> bool {
        retries < self.opts.attempts && self.is_retryable(err)
    }

    /// Backoff before retry number `retries` (zero-based).
    ///
    /// Computed as `initial_backoff * backoff_factor^retries`, clamped to
    /// `max_backoff`.
    #[must_use]
    pub fn backoff(&self, retries: u32) -> Duration {
        let exponent = i32::try_from(retries).unwrap_or(i32::MAX);
        let nanos = self.opts.initial_backoff.as_nanos() as f64
            * self.opts.backoff_factor.powi(exponent);
        let max_nanos = self.opts.max_backoff.as_nanos() as f64;

        if !nanos.is_finite() || nanos >= max_nanos {
            return self.opts.max_backoff;
        }
        Duration::from_nanos(nanos as u64)
    }

    /// Creates the per-operation state for one retry sequence.
    #[must_use]
    pub fn handler(&self) -> RetryState {
        RetryState { policy: self.clone(), retries: 0 }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(RetryOpts::default())
    }
}

/// Progress of one retry sequence.
///
/// Owned by a single logical operation; create a fresh one per operation via
/// [`RetryPolicy::handler`].
#[derive(Debug, Clone)]
pub struct RetryState {
    policy: RetryPolicy,
    retries: u32,
}

impl RetryState {
    /// Returns the number of retries consumed so far.
    #[must_use]
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Returns the policy driving this sequence.
    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

impl RetryHandler for RetryState {
    fn next_backoff(&mut self, err: &SdkError) -> Option<Duration> {
        if !self.policy.should_retry(err, self.retries) {
            if self.retries >= self.policy.opts.attempts {
                tracing::debug!(
                    attempts = self.policy.opts.attempts,
                    error = %err,
                    "retry attempts exhausted"
                );
            }
            return None;
        }

        let backoff = self.policy.backoff(self.retries);
        self.retries += 1;
        Some(backoff)
    }
}
