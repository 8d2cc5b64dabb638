// crates/stakewatch-sync/src/state.rs
//
// Poller state machine.
//
// Valid transitions:
//   Polling -> Processing -> Polling
//   Polling | Processing -> RetryWait -> Polling
//   Any state -> Stopped (terminal)

use std::fmt;

use stakewatch_core::WatcherError;

/// Lifecycle states of the block poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    /// Reading the head height and checking confirmation depth.
    Polling,
    /// Scanning a confirmed block and running epoch work for it.
    Processing,
    /// Backing off after a transient failure.
    RetryWait,
    /// Stopped by request, retry exhaustion, or a fatal error.
    Stopped,
}

impl fmt::Display for PollerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollerState::Polling => write!(f, "Polling"),
            PollerState::Processing => write!(f, "Processing"),
            PollerState::RetryWait => write!(f, "RetryWait"),
            PollerState::Stopped => write!(f, "Stopped"),
        }
    }
}

/// State machine for the poller loop.
#[derive(Debug)]
pub struct PollerStateMachine {
    current: PollerState,
}

impl PollerStateMachine {
    /// Create a new state machine starting in the Polling state.
    pub fn new() -> Self {
        Self {
            current: PollerState::Polling,
        }
    }

    pub fn current(&self) -> PollerState {
        self.current
    }

    pub fn is_stopped(&self) -> bool {
        self.current == PollerState::Stopped
    }

    /// Attempt to transition to a new state.
    ///
    /// Returns an error if the transition is not valid.
    pub fn transition(&mut self, new_state: PollerState) -> Result<(), WatcherError> {
        let valid = match (self.current, new_state) {
            (PollerState::Stopped, _) => false,
            (_, PollerState::Stopped) => true,
            (PollerState::Polling, PollerState::Processing) => true,
            (PollerState::Processing, PollerState::Polling) => true,
            (PollerState::Polling, PollerState::RetryWait) => true,
            (PollerState::Processing, PollerState::RetryWait) => true,
            (PollerState::RetryWait, PollerState::Polling) => true,
            _ => false,
        };

        if valid {
            tracing::trace!("Poller state transition: {} -> {}", self.current, new_state);
            self.current = new_state;
            Ok(())
        } else {
            Err(WatcherError::InvalidState(format!(
                "Invalid poller transition: {} -> {}",
                self.current, new_state
            )))
        }
    }
}

impl Default for PollerStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
