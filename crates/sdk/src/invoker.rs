//! Drives an operation through a [`RetryHandler`].
//!
//! ```text
//!   ┌──────────────┐   Ok    ┌─────────────┐
//!   │   attempt    ├────────►│ return value│
//!   └──────┬───────┘         └─────────────┘
//!          │ Err
//!          ▼
//!   ┌──────────────┐  None   ┌─────────────┐
//!   │ next_backoff ├────────►│ return err  │
//!   └──────┬───────┘         └─────────────┘
//!          │ Some(backoff)
//!          ▼
//!   sleep(backoff) ─► before-retry hook ─► attempt
//! ```
//!
//! Attempts are strictly sequential. The error returned after the last
//! attempt is the last error observed, unchanged.

use std::{fmt, future::Future, sync::Arc};

use tokio_util::sync::CancellationToken;

use crate::{
    error::{Result, SdkError},
    retry::{RetryHandler, RetryPolicy, RetryState},
};

/// Callback invoked with the failing error before each retry.
pub type BeforeRetryHook = Arc<dyn Fn(&SdkError) + Send + Sync>;

/// Retries an operation according to a handler.
///
/// # Example
///
/// ```no_run
/// # use fabric_sdk::{RetryInvoker, RetryOpts, RetryPolicy, SdkError};
/// # async fn example() -> fabric_sdk::Result<()> {
/// let policy = RetryPolicy::new(RetryOpts::channel_client());
/// let mut invoker = RetryInvoker::from_policy(&policy)
///     .with_before_retry(|err| tracing::info!(error = %err, "retrying query"));
///
/// let height = invoker.invoke(move || async move { Ok::<_, SdkError>(42u64) }).await?;
/// # Ok(())
/// # }
/// ```
pub struct RetryInvoker<H = RetryState> {
    handler: H,
    before_retry: Option<BeforeRetryHook>,
    cancellation: Option<CancellationToken>,
}

impl RetryInvoker<RetryState> {
    /// Creates an invoker with fresh state from `policy`.
    #[must_use]
    pub fn from_policy(policy: &RetryPolicy) -> Self {
        Self::new(policy.handler())
    }
}

impl<H: RetryHandler> RetryInvoker<H> {
    /// Creates an invoker driven by `handler`.
    #[must_use]
    pub fn new(handler: H) -> Self {
        Self { handler, before_retry: None, cancellation: None }
    }

    /// Registers a callback invoked with the error before every retry.
    #[must_use]
    pub fn with_before_retry<F>(mut self, hook: F) -> Self
    where
        F: Fn(&SdkError) + Send + Sync + 'static,
    {
        self.before_retry = Some(Arc::new(hook));
        self
    }

    /// Stops the sequence with [`SdkError::Cancelled`] once `token` is cancelled.
    ///
    /// The token is checked before every attempt and raced against every
    /// in-flight attempt and backoff sleep.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Returns the handler, e.g. to inspect how many retries were consumed.
    #[must_use]
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Runs `operation` until it succeeds, fails with an error the handler
    /// declines to retry, or the sequence is cancelled.
    ///
    /// # Errors
    ///
    /// Returns the last error produced by `operation`, or
    /// [`SdkError::Cancelled`] if the cancellation token fired.
    pub async fn invoke<F, Fut, T>(&mut self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let token = self.cancellation.clone().unwrap_or_else(CancellationToken::new);
        let mut attempt: u32 = 0;

        loop {
            if token.is_cancelled() {
                return Err(SdkError::Cancelled);
            }
            attempt += 1;

            let result = tokio::select! {
                biased;
                () = token.cancelled() => return Err(SdkError::Cancelled),
                result = operation() => result,
            };

            let err = match result {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            let Some(backoff) = self.handler.next_backoff(&err) else {
                return Err(err);
            };

            tracing::debug!(
                attempt = attempt,
                backoff_ms = backoff.as_millis() as u64,
                error = %err,
                "retrying after backoff"
            );

            tokio::select! {
                biased;
                () = token.cancelled() => return Err(SdkError::Cancelled),
                () = tokio::time::sleep(backoff) => {}
            }

            self.notify_before_retry(&err);
        }
    }

    /// Blocking form of [`invoke`](Self::invoke) for callers outside an
    /// async runtime.
    ///
    /// Sleeps through [`RetryHandler::required`]. The cancellation token, if
    /// any, is checked before every attempt and before every backoff sleep.
    ///
    /// # Errors
    ///
    /// Returns the last error produced by `operation`, or
    /// [`SdkError::Cancelled`] if the cancellation token fired.
    pub fn invoke_blocking<F, T>(&mut self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        let cancelled =
            |token: &Option<CancellationToken>| token.as_ref().is_some_and(|t| t.is_cancelled());

        loop {
            if cancelled(&self.cancellation) {
                return Err(SdkError::Cancelled);
            }

            let err = match operation() {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if cancelled(&self.cancellation) {
                return Err(SdkError::Cancelled);
            }
            if !self.handler.required(&err) {
                return Err(err);
            }

            self.notify_before_retry(&err);
        }
    }

    fn notify_before_retry(&self, err: &SdkError) {
        if let Some(hook) = &self.before_retry {
            hook(err);
        }
    }
}

impl<H: fmt::Debug> fmt::Debug for RetryInvoker<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryInvoker")
            .field("handler", &self.handler)
            .field("before_retry", &self.before_retry.is_some())
            .field("cancellation", &self.cancellation)
            .finish()
    }
}
