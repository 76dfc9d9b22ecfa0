use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tokio::task::JoinHandle;

use crate::classify::{classify, LOOKUP_FALLBACK, PROTOCOL_MESSAGE};
use crate::executor::{Action, RequestExecutor, RequestSpec, RequestTicket};
use crate::http_client::HttpClient;
use crate::orchestrator::history::HistoryOrchestrator;
use crate::orchestrator::lifecycle::{LifecycleSlot, RequestLifecycleState, SettleGuard};
use crate::outcome::{ClassifiedError, ErrorCategory, OperationOutcome};
use crate::{ClientConfig, LookupRequest, LookupResult, ValidationError};

pub const PRICE_PATH: &str = "/crypto/price";

/// Point-in-time copy of the lookup state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LookupSnapshot {
    pub lifecycle: RequestLifecycleState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<LookupResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ClassifiedError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_error: Option<ClassifiedError>,
}

#[derive(Debug, Default)]
struct LookupState {
    lifecycle: RequestLifecycleState,
    result: Option<LookupResult>,
    error: Option<ClassifiedError>,
    warning: Option<String>,
    input_error: Option<ClassifiedError>,
}

impl LifecycleSlot for LookupState {
    fn lifecycle_mut(&mut self) -> &mut RequestLifecycleState {
        &mut self.lifecycle
    }
}

struct LookupInner {
    executor: RequestExecutor,
    config: Arc<ClientConfig>,
    history: HistoryOrchestrator,
    state: Mutex<LookupState>,
    scheduled_refreshes: AtomicU64,
    pending_refresh: Mutex<Option<JoinHandle<()>>>,
}

/// Drives the "fetch price" action and triggers a history refresh after each
/// successful lookup. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct LookupOrchestrator {
    inner: Arc<LookupInner>,
}

impl LookupOrchestrator {
    pub fn new(
        client: Arc<dyn HttpClient>,
        config: Arc<ClientConfig>,
        history: HistoryOrchestrator,
    ) -> Self {
        Self {
            inner: Arc::new(LookupInner {
                executor: RequestExecutor::new(Action::Lookup, client, Arc::clone(&config)),
                config,
                history,
                state: Mutex::new(LookupState::default()),
                scheduled_refreshes: AtomicU64::new(0),
                pending_refresh: Mutex::new(None),
            }),
        }
    }

    pub fn history(&self) -> &HistoryOrchestrator {
        &self.inner.history
    }

    pub fn snapshot(&self) -> LookupSnapshot {
        let state = self.lock_state();
        LookupSnapshot {
            lifecycle: state.lifecycle,
            result: state.result.clone(),
            error: state.error.clone(),
            warning: state.warning.clone(),
            input_error: state.input_error.clone(),
        }
    }

    /// Number of history refreshes scheduled by successful lookups so far.
    pub fn scheduled_refreshes(&self) -> u64 {
        self.inner.scheduled_refreshes.load(Ordering::SeqCst)
    }

    /// Validates the raw input and, when valid, looks up the price.
    ///
    /// Invalid input is rejected without a network call and without touching
    /// the lifecycle. A newer submit supersedes an in-flight one; the
    /// superseded call returns a suppressed `Cancelled` failure.
    pub async fn submit(&self, asset: &str, notify_address: &str) -> OperationOutcome<LookupResult> {
        match LookupRequest::parse(asset, notify_address) {
            Ok(request) => self.submit_request(request).await,
            Err(error) => self.reject(error),
        }
    }

    pub async fn submit_request(&self, request: LookupRequest) -> OperationOutcome<LookupResult> {
        let inner = &self.inner;
        let ticket = {
            let mut state = self.lock_state();
            let ticket = inner.executor.issue();
            state.lifecycle = RequestLifecycleState::InFlight;
            state.input_error = None;
            state.result = None;
            state.error = None;
            state.warning = None;
            ticket
        };
        let _settle = SettleGuard::new(&inner.state, &inner.executor, &ticket);

        tracing::info!(sequence = ticket.sequence(), asset = %request.asset(), "submitting price lookup");
        let raw = inner
            .executor
            .execute(&ticket, RequestSpec::post(PRICE_PATH, request.to_wire()))
            .await;
        let outcome = classify(raw, LOOKUP_FALLBACK).and_then(|data| {
            LookupResult::from_wire(data, request.asset()).map_err(|error| {
                tracing::warn!(error = %error, "price payload did not decode");
                ClassifiedError::new(ErrorCategory::Protocol, PROTOCOL_MESSAGE)
            })
        });

        if !self.commit(&ticket, &outcome) {
            return OperationOutcome::Failure(ClassifiedError::cancelled());
        }
        if outcome.is_success() {
            self.schedule_history_refresh();
        }
        outcome
    }

    /// Cancels the in-flight lookup, if any. Stored result and error are left
    /// as they are.
    pub fn cancel(&self) -> bool {
        self.inner.executor.cancel_outstanding()
    }

    /// Waits for the most recently scheduled history refresh to finish.
    /// Returns immediately when none is pending.
    pub async fn wait_for_scheduled_refresh(&self) {
        let handle = self
            .inner
            .pending_refresh
            .lock()
            .expect("pending refresh lock is not poisoned")
            .take();
        if let Some(handle) = handle {
            if let Err(error) = handle.await {
                tracing::warn!(error = %error, "scheduled history refresh task failed");
            }
        }
    }

    fn reject(&self, error: ValidationError) -> OperationOutcome<LookupResult> {
        let classified = ClassifiedError::new(ErrorCategory::InputInvalid, error.to_string());
        tracing::info!(reason = %error, "lookup input rejected");
        self.lock_state().input_error = Some(classified.clone());
        OperationOutcome::Failure(classified)
    }

    /// Applies `outcome` if `ticket` is still current. Returns false when the
    /// outcome was discarded.
    fn commit(&self, ticket: &RequestTicket, outcome: &OperationOutcome<LookupResult>) -> bool {
        let mut state = self.lock_state();
        if !self.inner.executor.is_current(ticket) {
            tracing::debug!(sequence = ticket.sequence(), "discarding superseded lookup outcome");
            return false;
        }

        state.lifecycle = RequestLifecycleState::Settled;
        match outcome {
            OperationOutcome::Success { value, warning } => {
                tracing::info!(
                    sequence = ticket.sequence(),
                    asset = %value.asset,
                    price = value.price,
                    "price lookup succeeded"
                );
                state.result = Some(value.clone());
                state.error = None;
                state.warning = warning.clone();
                true
            }
            OperationOutcome::Failure(error) if error.is_suppressed() => false,
            OperationOutcome::Failure(error) => {
                tracing::warn!(sequence = ticket.sequence(), category = %error.category(), "price lookup failed");
                state.result = None;
                state.error = Some(error.clone());
                state.warning = None;
                true
            }
        }
    }

    fn schedule_history_refresh(&self) {
        let history = self.inner.history.clone();
        let delay = self.inner.config.history_refresh_delay();
        self.inner.scheduled_refreshes.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(delay_ms = delay.as_millis() as u64, "scheduling history refresh");

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            history.refresh().await;
        });
        *self
            .inner
            .pending_refresh
            .lock()
            .expect("pending refresh lock is not poisoned") = Some(handle);
    }

    fn lock_state(&self) -> MutexGuard<'_, LookupState> {
        self.inner
            .state
            .lock()
            .expect("lookup state lock is not poisoned")
    }
}
