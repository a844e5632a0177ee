//! Render loop lifecycle state, shared between the loop and its owner

use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Lifecycle of the render thread. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RenderLoopState {
    Idle,
    Active,
    Terminating,
    Stopped,
}

/// Reported by the render thread on its status channel
#[derive(Debug, Clone, PartialEq)]
pub enum RenderStatus {
    Started,
    InitFailed(String),
    Stopped { frames: u64 },
}

#[derive(Debug)]
pub(crate) struct StateCell {
    state: Mutex<RenderLoopState>,
    changed: Condvar,
}

impl StateCell {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(RenderLoopState::Idle),
            changed: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RenderLoopState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn get(&self) -> RenderLoopState {
        *self.lock()
    }

    /// Move to `next`; refused (returns false) if that would go backwards
    pub(crate) fn advance(&self, next: RenderLoopState) -> bool {
        let mut state = self.lock();
        if next <= *state {
            return false;
        }
        tracing::debug!("Render loop {:?} -> {:?}", *state, next);
        *state = next;
        drop(state);
        self.changed.notify_all();
        true
    }

    /// Block until `target` is reached, the loop stops, or `timeout` passes
    pub(crate) fn wait_for(&self, target: RenderLoopState, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.lock();
        loop {
            if *state == target {
                return true;
            }
            if *state == RenderLoopState::Stopped {
                return false;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            state = self
                .changed
                .wait_timeout(state, remaining)
                .unwrap_or_else(|e| e.into_inner())
                .0;
        }
    }
}
