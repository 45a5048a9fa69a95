//! Single-flight orchestration of generation requests.
//!
//! A [`RequestCoordinator`] owns at most one live logical operation. Starting
//! a new one cancels the previous token before anything else happens, and a
//! run only applies its outcome while its token is still the active one, so a
//! superseded run can never touch the current result or the history.

use std::sync::Arc;

use genstudio_core::generation::DEFAULT_HISTORY_LIMIT;
use genstudio_core::overload::OverloadSimulator;
use tokio::sync::{broadcast, watch, Mutex};
use tokio_util::sync::CancellationToken;

use crate::api::GenerationApi;
use crate::error::ClientError;
use crate::events::{CoordinatorEvent, EventBus};
use crate::history::HistoryStore;
use crate::model::{GenerationRequest, GenerationResult};
use crate::retry::{RetryConfig, RetryPolicy, RetryState};

/// Tunables for a [`RequestCoordinator`].
#[derive(Debug, Clone, Copy)]
pub struct CoordinatorOptions {
    pub retry: RetryConfig,
    /// Rolled before every attempt; a hit is treated as the overload
    /// condition without contacting the server.
    pub overload: OverloadSimulator,
    /// History entries fetched after each success, clamped to 1..=50.
    pub history_limit: i64,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            overload: OverloadSimulator::default(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Running,
}

/// Observable coordinator state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoordinatorSnapshot {
    pub phase: Phase,
    pub is_loading: bool,
    pub current: Option<GenerationResult>,
}

/// The live operation, if any. `epoch` increases with every `generate` call.
#[derive(Default)]
struct Flight {
    epoch: u64,
    token: Option<CancellationToken>,
}

pub struct RequestCoordinator {
    api: Arc<dyn GenerationApi>,
    policy: RetryPolicy,
    history: HistoryStore,
    overload: OverloadSimulator,
    flight: Mutex<Flight>,
    state: watch::Sender<CoordinatorSnapshot>,
    events: EventBus,
}

impl RequestCoordinator {
    pub fn new(api: Arc<dyn GenerationApi>, options: CoordinatorOptions) -> Self {
        let events = EventBus::default();
        let max_retries = options.retry.max_retries;

        let retry_events = events.clone();
        let exhausted_events = events.clone();
        let policy = RetryPolicy::new(options.retry)
            .with_on_retry(move |attempt| {
                retry_events.publish(CoordinatorEvent::Retrying {
                    attempt,
                    max_retries,
                });
            })
            .with_on_max_retries_reached(move || {
                exhausted_events.publish(CoordinatorEvent::MaxRetriesReached { max_retries });
            });

        let (state, _) = watch::channel(CoordinatorSnapshot::default());

        Self {
            api,
            policy,
            history: HistoryStore::new(options.history_limit),
            overload: options.overload,
            flight: Mutex::new(Flight::default()),
            state,
            events,
        }
    }

    // -----------------------------------------------------------------------
    // Observation
    // -----------------------------------------------------------------------

    pub fn snapshot(&self) -> CoordinatorSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CoordinatorSnapshot> {
        self.state.subscribe()
    }

    pub fn retry_state(&self) -> RetryState {
        self.policy.snapshot()
    }

    pub fn subscribe_retry(&self) -> watch::Receiver<RetryState> {
        self.policy.subscribe()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<CoordinatorEvent> {
        self.events.subscribe()
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn max_retries(&self) -> u32 {
        self.policy.config().max_retries
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Run one logical generation, superseding any operation in flight.
    ///
    /// Returns [`ClientError::Cancelled`] when this run is aborted or
    /// superseded before it completes.
    pub async fn generate(&self, request: GenerationRequest) -> Result<GenerationResult, ClientError> {
        request.validate()?;

        let (epoch, token) = self.begin().await;
        self.events.publish(CoordinatorEvent::Started {
            prompt: request.prompt.clone(),
            style: request.style,
        });
        tracing::info!(epoch, style = %request.style, "Generation started");

        let outcome = self
            .policy
            .run_with_policy(|| self.attempt(&request), &token)
            .await;

        // The refresh is still part of this run: a newer run cuts it short.
        let refreshed = match &outcome {
            Ok(_) => tokio::select! {
                biased;
                _ = token.cancelled() => None,
                fetched = self.history.fetch(self.api.as_ref()) => Some(fetched),
            },
            Err(_) => None,
        };

        let owned = self
            .finish(epoch, || {
                let Ok(result) = &outcome else {
                    return;
                };
                self.state
                    .send_modify(|state| state.current = Some(result.clone()));
                match refreshed {
                    Some(Ok(entries)) => self.history.replace(entries),
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "Failed to refresh history after generation");
                    }
                    None => {}
                }
                self.events.publish(CoordinatorEvent::Succeeded(result.clone()));
            })
            .await;

        if !owned {
            tracing::info!(epoch, "Generation superseded or aborted, discarding outcome");
            self.events.publish(CoordinatorEvent::Aborted);
            return Err(ClientError::Cancelled);
        }

        match outcome {
            Ok(result) => {
                tracing::info!(epoch, generation_id = result.id, "Generation succeeded");
                Ok(result)
            }
            Err(ClientError::Cancelled) => {
                self.policy.reset();
                self.events.publish(CoordinatorEvent::Aborted);
                Err(ClientError::Cancelled)
            }
            Err(err) => {
                // Exhausted overload was already announced by the policy.
                if !err.is_overload() {
                    tracing::warn!(epoch, error = %err, "Generation failed");
                    self.events.publish(CoordinatorEvent::Failed {
                        message: err.to_string(),
                    });
                }
                Err(err)
            }
        }
    }

    /// Cancel the operation in flight, if any. Idempotent.
    pub async fn abort(&self) {
        let token = self.flight.lock().await.token.take();
        let Some(token) = token else {
            return;
        };
        token.cancel();
        self.policy.reset();
        self.state.send_modify(|state| {
            state.phase = Phase::Idle;
            state.is_loading = false;
        });
        tracing::info!("Generation aborted");
    }

    /// Abort anything in flight and forget the current result.
    pub async fn reset(&self) {
        self.abort().await;
        self.policy.reset();
        self.state.send_modify(|state| state.current = None);
    }

    /// Make a history entry the current result.
    pub fn load_generation(&self, result: GenerationResult) -> GenerationResult {
        self.state
            .send_modify(|state| state.current = Some(result.clone()));
        result
    }

    /// Cut the pending retry back-off short ("Retry Now").
    pub fn retry_now(&self) {
        self.policy.skip_delay();
    }

    /// Re-fetch the history outside of a generation.
    pub async fn refresh_history(&self) -> Result<Vec<GenerationResult>, ClientError> {
        self.history.refresh(self.api.as_ref()).await
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    /// Supersede any live operation and install a fresh token.
    async fn begin(&self) -> (u64, CancellationToken) {
        let token = CancellationToken::new();
        let epoch = {
            let mut flight = self.flight.lock().await;
            if let Some(previous) = flight.token.replace(token.clone()) {
                tracing::debug!(epoch = flight.epoch, "Cancelling superseded generation");
                previous.cancel();
            }
            flight.epoch += 1;
            flight.epoch
        };
        self.policy.reset();
        self.state.send_modify(|state| {
            state.phase = Phase::Running;
            state.is_loading = true;
        });
        (epoch, token)
    }

    /// Release the token if `epoch` still owns it, running `apply` before the
    /// flight lock is dropped. Returns whether it did.
    ///
    /// `begin` takes the same lock, so nothing `apply` writes can land after
    /// a newer run has started.
    async fn finish(&self, epoch: u64, apply: impl FnOnce()) -> bool {
        let mut flight = self.flight.lock().await;
        if flight.epoch != epoch || flight.token.is_none() {
            return false;
        }
        flight.token = None;
        apply();
        self.state.send_modify(|state| {
            state.phase = Phase::Idle;
            state.is_loading = false;
        });
        true
    }

    async fn attempt(&self, request: &GenerationRequest) -> Result<GenerationResult, ClientError> {
        if self.overload.should_overload() {
            tracing::debug!("Simulated overload before submission");
            return Err(ClientError::Overloaded);
        }
        self.api.generate(request).await
    }
}
