use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::classify::{classify, HISTORY_FALLBACK, PROTOCOL_MESSAGE};
use crate::executor::{Action, RequestExecutor, RequestSpec, RequestTicket};
use crate::http_client::HttpClient;
use crate::orchestrator::lifecycle::{LifecycleSlot, RequestLifecycleState, SettleGuard};
use crate::outcome::{ClassifiedError, ErrorCategory, OperationOutcome};
use crate::{ClientConfig, HistoryEntry};

pub const HISTORY_PATH: &str = "/crypto/history";

/// Point-in-time copy of the history state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistorySnapshot {
    pub lifecycle: RequestLifecycleState,
    pub entries: Vec<HistoryEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ClassifiedError>,
}

#[derive(Debug, Default)]
struct HistoryState {
    lifecycle: RequestLifecycleState,
    entries: Vec<HistoryEntry>,
    error: Option<ClassifiedError>,
}

impl LifecycleSlot for HistoryState {
    fn lifecycle_mut(&mut self) -> &mut RequestLifecycleState {
        &mut self.lifecycle
    }
}

struct HistoryInner {
    executor: RequestExecutor,
    state: Mutex<HistoryState>,
}

/// Keeps the server's lookup history. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct HistoryOrchestrator {
    inner: Arc<HistoryInner>,
}

impl HistoryOrchestrator {
    pub fn new(client: Arc<dyn HttpClient>, config: Arc<ClientConfig>) -> Self {
        Self {
            inner: Arc::new(HistoryInner {
                executor: RequestExecutor::new(Action::History, client, config),
                state: Mutex::new(HistoryState::default()),
            }),
        }
    }

    pub fn snapshot(&self) -> HistorySnapshot {
        let state = self.lock_state();
        HistorySnapshot {
            lifecycle: state.lifecycle,
            entries: state.entries.clone(),
            error: state.error.clone(),
        }
    }

    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.lock_state().entries.clone()
    }

    /// Re-fetches the history. A newer refresh supersedes this one; on failure
    /// the previously held entries stay in place next to the error.
    pub async fn refresh(&self) -> OperationOutcome<Vec<HistoryEntry>> {
        let inner = &self.inner;
        let ticket = {
            let mut state = self.lock_state();
            let ticket = inner.executor.issue();
            state.lifecycle = RequestLifecycleState::InFlight;
            state.error = None;
            ticket
        };
        let _settle = SettleGuard::new(&inner.state, &inner.executor, &ticket);

        let raw = inner
            .executor
            .execute(&ticket, RequestSpec::get(HISTORY_PATH))
            .await;
        let outcome = classify(raw, HISTORY_FALLBACK).and_then(|data| {
            HistoryEntry::decode_sequence(data).map_err(|error| {
                tracing::warn!(error = %error, "history payload did not decode");
                ClassifiedError::new(ErrorCategory::Protocol, PROTOCOL_MESSAGE)
            })
        });

        if self.commit(&ticket, &outcome) {
            outcome
        } else {
            OperationOutcome::Failure(ClassifiedError::cancelled())
        }
    }

    /// Cancels the outstanding refresh, if any. The held entries are kept.
    pub fn cancel(&self) -> bool {
        self.inner.executor.cancel_outstanding()
    }

    fn commit(&self, ticket: &RequestTicket, outcome: &OperationOutcome<Vec<HistoryEntry>>) -> bool {
        let mut state = self.lock_state();
        if !self.inner.executor.is_current(ticket) {
            tracing::debug!(sequence = ticket.sequence(), "discarding superseded history outcome");
            return false;
        }

        state.lifecycle = RequestLifecycleState::Settled;
        match outcome {
            OperationOutcome::Success { value, .. } => {
                tracing::info!(sequence = ticket.sequence(), entries = value.len(), "history refreshed");
                state.entries = value.clone();
                state.error = None;
                true
            }
            OperationOutcome::Failure(error) if error.is_suppressed() => false,
            OperationOutcome::Failure(error) => {
                tracing::warn!(
                    sequence = ticket.sequence(),
                    category = %error.category(),
                    kept_entries = state.entries.len(),
                    "history refresh failed"
                );
                state.error = Some(error.clone());
                true
            }
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, HistoryState> {
        self.inner
            .state
            .lock()
            .expect("history state lock is not poisoned")
    }
}
