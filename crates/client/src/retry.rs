//! Fixed-delay retry of the transient overload condition.
//!
//! [`RetryPolicy::run_with_policy`] drives one logical operation through up
//! to `max_retries` attempts. Every suspension point (the attempt itself and
//! the back-off between attempts) races the caller's [`CancellationToken`];
//! cancellation wins, drops the pending future and leaves the retry state
//! untouched so a superseding run can own it.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Notify};
use tokio_util::sync::CancellationToken;

use crate::error::ClientError;

/// Total attempts per logical operation when nothing else is configured.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Pause between automatic attempts when nothing else is configured.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total number of attempts, the first one included.
    pub max_retries: u32,
    /// Fixed wait between a retryable failure and the next attempt.
    pub retry_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// Observable retry bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryState {
    /// Retries consumed by the current operation. Never exceeds `max_retries`.
    pub attempt_count: u32,
    /// True only between a retryable failure and the start of the next attempt.
    pub is_retrying: bool,
}

pub type RetryCallback = Arc<dyn Fn(u32) + Send + Sync>;
pub type MaxRetriesCallback = Arc<dyn Fn() + Send + Sync>;
pub type RetryPredicate = Arc<dyn Fn(&ClientError) -> bool + Send + Sync>;

pub struct RetryPolicy {
    config: RetryConfig,
    state: watch::Sender<RetryState>,
    on_retry: Option<RetryCallback>,
    on_max_retries_reached: Option<MaxRetriesCallback>,
    predicate: Option<RetryPredicate>,
    skip: Notify,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        let (state, _) = watch::channel(RetryState::default());
        Self {
            config,
            state,
            on_retry: None,
            on_max_retries_reached: None,
            predicate: None,
            skip: Notify::new(),
        }
    }

    /// Called with the new attempt count each time an automatic retry is
    /// scheduled.
    pub fn with_on_retry(mut self, callback: impl Fn(u32) + Send + Sync + 'static) -> Self {
        self.on_retry = Some(Arc::new(callback));
        self
    }

    /// Called once when an operation gives up on the overload condition
    /// because the attempt cap was reached.
    pub fn with_on_max_retries_reached(
        mut self,
        callback: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        self.on_max_retries_reached = Some(Arc::new(callback));
        self
    }

    /// Replace the default "is it the overload condition" check. The attempt
    /// cap still applies and cancellation is never retried.
    pub fn with_predicate(
        mut self,
        predicate: impl Fn(&ClientError) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    pub fn config(&self) -> RetryConfig {
        self.config
    }

    pub fn snapshot(&self) -> RetryState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<RetryState> {
        self.state.subscribe()
    }

    /// Whether `err` should be followed by another automatic attempt given
    /// the current attempt count.
    pub fn is_retryable_error(&self, err: &ClientError) -> bool {
        if err.is_cancelled() || !self.below_cap() {
            return false;
        }
        match &self.predicate {
            Some(predicate) => predicate(err),
            None => err.is_overload(),
        }
    }

    /// Zero the attempt count and clear the retrying flag.
    pub fn reset(&self) {
        self.state.send_if_modified(|state| {
            let changed = *state != RetryState::default();
            *state = RetryState::default();
            changed
        });
    }

    /// Cut a pending back-off short so the next attempt starts immediately.
    /// Does nothing when no back-off is in progress.
    pub fn skip_delay(&self) {
        self.skip.notify_waiters();
    }

    /// Run `operation` until it succeeds, fails terminally or `token` is
    /// cancelled.
    pub async fn run_with_policy<T, F, Fut>(
        &self,
        mut operation: F,
        token: &CancellationToken,
    ) -> Result<T, ClientError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        loop {
            if token.is_cancelled() {
                return Err(ClientError::Cancelled);
            }
            self.update(token, |state| state.is_retrying = false);

            let outcome = tokio::select! {
                biased;
                _ = token.cancelled() => Err(ClientError::Cancelled),
                result = operation() => result,
            };

            let err = match outcome {
                Ok(value) => {
                    if !token.is_cancelled() {
                        self.reset();
                    }
                    return Ok(value);
                }
                Err(err) => err,
            };

            if err.is_cancelled() || token.is_cancelled() {
                return Err(ClientError::Cancelled);
            }

            if !self.is_retryable_error(&err) {
                if err.is_overload() && !self.below_cap() {
                    tracing::warn!(
                        max_retries = self.config.max_retries,
                        "Model overloaded, maximum retries reached",
                    );
                    if let Some(callback) = &self.on_max_retries_reached {
                        callback();
                    }
                }
                self.reset();
                return Err(err);
            }

            let attempt = self.advance(token);
            tracing::warn!(
                attempt,
                max_retries = self.config.max_retries,
                delay_ms = self.config.retry_delay.as_millis() as u64,
                error = %err,
                "Retrying after transient failure",
            );
            if let Some(callback) = &self.on_retry {
                callback(attempt);
            }

            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tracing::debug!(attempt, "Retry back-off cancelled");
                    return Err(ClientError::Cancelled);
                }
                _ = self.skip.notified() => {
                    tracing::debug!(attempt, "Retry back-off skipped");
                }
                _ = tokio::time::sleep(self.config.retry_delay) => {}
            }
        }
    }

    /// Count one retry and start the next attempt immediately, bypassing the
    /// back-off.
    pub async fn manual_retry<T, F, Fut>(
        &self,
        operation: F,
        token: &CancellationToken,
    ) -> Result<T, ClientError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        if token.is_cancelled() {
            return Err(ClientError::Cancelled);
        }
        let attempt = self.advance(token);
        tracing::info!(attempt, "Manual retry requested");
        self.run_with_policy(operation, token).await
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn below_cap(&self) -> bool {
        self.state.borrow().attempt_count + 1 < self.config.max_retries
    }

    /// Apply `mutate` unless the operation owning the state was cancelled.
    fn update(&self, token: &CancellationToken, mutate: impl FnOnce(&mut RetryState)) {
        self.state.send_if_modified(|state| {
            if token.is_cancelled() {
                return false;
            }
            let before = *state;
            mutate(state);
            *state != before
        });
    }

    fn advance(&self, token: &CancellationToken) -> u32 {
        let max = self.config.max_retries;
        self.update(token, |state| {
            state.attempt_count = (state.attempt_count + 1).min(max);
            state.is_retrying = true;
        });
        self.snapshot().attempt_count
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}
