//! Operations with a predetermined sequence of outcomes.

use std::{
    collections::VecDeque,
    sync::atomic::{AtomicUsize, Ordering},
};

use fabric_sdk::{Result, SdkError};
use parking_lot::Mutex;

/// An operation returning queued results in order.
///
/// Once the queue is drained every further call fails with an unclassified
/// error, which no retry policy retries.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use fabric_sdk::{RetryInvoker, RetryOpts, RetryPolicy, RetryableCodes};
/// use fabric_sdk_test_utils::{ScriptedOperation, transient_error};
///
/// let policy = RetryPolicy::new(RetryOpts {
///     initial_backoff: Duration::from_millis(1),
///     max_backoff: Duration::from_millis(1),
///     retryable_codes: RetryableCodes::test(),
///     ..RetryOpts::default()
/// });
/// let op = ScriptedOperation::new([Err(transient_error("busy")), Ok(7)]);
///
/// let result = RetryInvoker::from_policy(&policy).invoke_blocking(|| op.call());
/// assert_eq!(result.ok(), Some(7));
/// assert_eq!(op.calls(), 2);
/// ```
#[derive(Debug)]
pub struct ScriptedOperation<T> {
    script: Mutex<VecDeque<Result<T>>>,
    calls: AtomicUsize,
}

impl<T> ScriptedOperation<T> {
    /// Creates an operation returning `results` in order.
    pub fn new(results: impl IntoIterator<Item = Result<T>>) -> Self {
        Self { script: Mutex::new(results.into_iter().collect()), calls: AtomicUsize::new(0) }
    }

    /// An operation failing `failures` times with `error()` before
    /// succeeding with `value`.
    pub fn failing_then(failures: usize, error: impl Fn() -> SdkError, value: T) -> Self {
        let mut script: VecDeque<Result<T>> = (0..failures).map(|_| Err(error())).collect();
        script.push_back(Ok(value));
        Self { script: Mutex::new(script), calls: AtomicUsize::new(0) }
    }

    /// Runs the operation once.
    ///
    /// # Errors
    ///
    /// Returns the next scripted error, or an unclassified error once the
    /// script is exhausted.
    pub fn call(&self) -> Result<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script.lock().pop_front().unwrap_or_else(|| {
            Err(SdkError::Unclassified { message: "scripted operation exhausted".to_owned() })
        })
    }

    /// Returns how many times the operation ran.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Returns how many scripted results are left.
    pub fn remaining(&self) -> usize {
        self.script.lock().len()
    }
}
