use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::executor::{RequestExecutor, RequestTicket};

/// Per-orchestrator request lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestLifecycleState {
    #[default]
    Idle,
    InFlight,
    Settled,
}

impl RequestLifecycleState {
    pub const fn is_in_flight(self) -> bool {
        matches!(self, Self::InFlight)
    }
}

pub(crate) trait LifecycleSlot {
    fn lifecycle_mut(&mut self) -> &mut RequestLifecycleState;
}

/// Settles the orchestrator when the owning call ends, however it ends.
///
/// Normal completion settles before the guard drops, leaving it nothing to do.
/// If the submitting future is dropped mid-flight the guard moves a still
/// current `InFlight` state to `Settled`.
pub(crate) struct SettleGuard<'a, S: LifecycleSlot> {
    state: &'a Mutex<S>,
    executor: &'a RequestExecutor,
    ticket: &'a RequestTicket,
}

impl<'a, S: LifecycleSlot> SettleGuard<'a, S> {
    pub(crate) fn new(
        state: &'a Mutex<S>,
        executor: &'a RequestExecutor,
        ticket: &'a RequestTicket,
    ) -> Self {
        Self {
            state,
            executor,
            ticket,
        }
    }
}

impl<S: LifecycleSlot> Drop for SettleGuard<'_, S> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if !self.executor.is_current(self.ticket) {
            return;
        }

        let lifecycle = state.lifecycle_mut();
        if lifecycle.is_in_flight() {
            *lifecycle = RequestLifecycleState::Settled;
            tracing::debug!(
                action = %self.ticket.action(),
                sequence = self.ticket.sequence(),
                "request dropped before completion; settled"
            );
        }
    }
}
