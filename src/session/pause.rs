//! Session-wide pause signal
//!
//! One `PauseSignal` is created per session and shared by every worker. The
//! orchestrator mutates it in response to operator commands; workers only
//! read it and wait on it between pages.
//!
//! The signal is a `tokio::sync::watch` channel:
//! - every change wakes all waiting workers at once
//! - a waiter checks the current value before sleeping, so a change made
//!   between "check" and "wait" is never missed
//! - `Stopped` is absorbing; later `pause()`/`resume()` calls are no-ops

use crate::session::WorkerState;
use std::sync::Arc;
use tokio::sync::watch;

/// Shared cooperative control state for all workers of a session
#[derive(Debug, Clone)]
pub struct PauseSignal {
    tx: Arc<watch::Sender<WorkerState>>,
}

impl PauseSignal {
    /// Creates a signal in the `Running` state
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(WorkerState::Running);
        Self { tx: Arc::new(tx) }
    }

    /// Current state
    pub fn state(&self) -> WorkerState {
        *self.tx.borrow()
    }

    pub fn is_stopped(&self) -> bool {
        self.state().is_terminal()
    }

    /// Asks workers to suspend at their next page boundary
    ///
    /// Returns true if the state changed.
    pub fn pause(&self) -> bool {
        self.transition(WorkerState::Paused)
    }

    /// Lets every paused worker continue
    ///
    /// Returns true if the state changed.
    pub fn resume(&self) -> bool {
        self.transition(WorkerState::Running)
    }

    /// Stops the session permanently and releases every waiting worker
    ///
    /// Safe to call any number of times, from any task. Returns true only
    /// for the call that actually stopped the session.
    pub fn stop(&self) -> bool {
        self.transition(WorkerState::Stopped)
    }

    /// Waits until the signal is no longer `Paused`
    ///
    /// Returns immediately when the state is already `Running` or `Stopped`.
    ///
    /// # Returns
    ///
    /// The state that released the waiter: `Running` or `Stopped`.
    pub async fn wait_while_paused(&self) -> WorkerState {
        let mut rx = self.tx.subscribe();
        let released = rx
            .wait_for(|state| *state != WorkerState::Paused)
            .await
            .map(|state| *state);

        // The sender lives in `self`, so the channel cannot close under us
        released.unwrap_or(WorkerState::Stopped)
    }

    fn transition(&self, next: WorkerState) -> bool {
        self.tx.send_if_modified(|state| {
            if state.can_transition_to(next) {
                tracing::debug!("Session signal: {} -> {}", state, next);
                *state = next;
                true
            } else {
                false
            }
        })
    }
}

impl Default for PauseSignal {
    fn default() -> Self {
        Self::new()
    }
}
