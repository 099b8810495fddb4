//! Process state machine.
//!
//! # States
//! ```text
//! Stopped → Starting        config read, listener bind
//! Starting → Ready          listener bound, serving
//! Starting → Failed         config or bind error
//! Ready → Draining          termination signal
//! Ready → Crashed           server loop fault
//! Draining → Stopped        in-flight work done or drain timeout
//! ```
//! Any other transition is rejected.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    Stopped,
    Starting,
    Ready,
    Draining,
    Failed,
    Crashed,
}

impl ProcessState {
    pub fn can_transition_to(self, next: ProcessState) -> bool {
        use ProcessState::{Crashed, Draining, Failed, Ready, Starting, Stopped};

        matches!(
            (self, next),
            (Stopped, Starting)
                | (Starting, Ready)
                | (Starting, Failed)
                | (Ready, Draining)
                | (Ready, Crashed)
                | (Draining, Stopped)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProcessState::Stopped => "stopped",
            ProcessState::Starting => "starting",
            ProcessState::Ready => "ready",
            ProcessState::Draining => "draining",
            ProcessState::Failed => "failed",
            ProcessState::Crashed => "crashed",
        }
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid lifecycle transition from {from} to {to}")]
pub struct LifecycleError {
    pub from: ProcessState,
    pub to: ProcessState,
}

/// Shared handle to the current process state.
///
/// Cloning is cheap; every clone observes the same state. Reads never block.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    tx: Arc<watch::Sender<ProcessState>>,
}

impl Lifecycle {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(ProcessState::Stopped);
        Self { tx: Arc::new(tx) }
    }

    pub fn state(&self) -> ProcessState {
        *self.tx.borrow()
    }

    /// Move to `next`, returning the previous state.
    pub fn transition(&self, next: ProcessState) -> Result<ProcessState, LifecycleError> {
        let mut outcome = Err(LifecycleError {
            from: self.state(),
            to: next,
        });

        self.tx.send_if_modified(|current| {
            if current.can_transition_to(next) {
                outcome = Ok(*current);
                *current = next;
                true
            } else {
                outcome = Err(LifecycleError {
                    from: *current,
                    to: next,
                });
                false
            }
        });

        if let Ok(previous) = outcome {
            tracing::info!(from = %previous, to = %next, "Process state changed");
        }
        outcome
    }

    /// Watch for state changes.
    pub fn subscribe(&self) -> watch::Receiver<ProcessState> {
        self.tx.subscribe()
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path() {
        let lifecycle = Lifecycle::new();
        assert_eq!(lifecycle.state(), ProcessState::Stopped);

        for next in [
            ProcessState::Starting,
            ProcessState::Ready,
            ProcessState::Draining,
            ProcessState::Stopped,
        ] {
            lifecycle.transition(next).unwrap();
            assert_eq!(lifecycle.state(), next);
        }
    }

    #[test]
    fn rejects_unlisted_transitions() {
        let lifecycle = Lifecycle::new();
        let err = lifecycle.transition(ProcessState::Ready).unwrap_err();
        assert_eq!(
            err,
            LifecycleError {
                from: ProcessState::Stopped,
                to: ProcessState::Ready
            }
        );
        assert_eq!(lifecycle.state(), ProcessState::Stopped);

        lifecycle.transition(ProcessState::Starting).unwrap();
        lifecycle.transition(ProcessState::Failed).unwrap();
        assert!(lifecycle.transition(ProcessState::Starting).is_err());
    }

    #[test]
    fn draining_cannot_crash_or_resume() {
        assert!(!ProcessState::Draining.can_transition_to(ProcessState::Ready));
        assert!(!ProcessState::Draining.can_transition_to(ProcessState::Crashed));
        assert!(ProcessState::Ready.can_transition_to(ProcessState::Crashed));
    }

    #[tokio::test]
    async fn subscribers_see_changes() {
        let lifecycle = Lifecycle::new();
        let mut rx = lifecycle.subscribe();

        lifecycle.transition(ProcessState::Starting).unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), ProcessState::Starting);
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&ProcessState::Draining).unwrap();
        assert_eq!(json, "\"draining\"");
    }
}
