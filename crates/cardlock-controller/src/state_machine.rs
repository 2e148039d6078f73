//! Appliance state machine.
//!
//! This module tracks where the control loop is in the
//! read-verify-act cycle and rejects transitions the loop should never make.
//!
//! # States
//!
//! - `Initializing`: peripherals are being brought up
//! - `Ready`: polling the reader for a card
//! - `CardDetected`: a credential was read
//! - `Verifying`: the credential is being checked
//! - `Granting`: access granted, lock being actuated
//! - `Denying`: access denied
//! - `ShuttingDown`: releasing peripherals (terminal)
//!
//! # Valid Transitions
//!
//! - Initializing → Ready
//! - Ready → CardDetected → Verifying → Granting/Denying → Ready
//! - any non-terminal state → ShuttingDown
//!
//! # Examples
//!
//! ```
//! use cardlock_controller::{ApplianceState, StateMachine};
//!
//! let mut machine = StateMachine::new();
//! assert_eq!(machine.current_state(), ApplianceState::Initializing);
//!
//! machine.transition_to(ApplianceState::Ready).unwrap();
//! assert!(machine.transition_to(ApplianceState::Granting).is_err());
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use cardlock_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::debug;

/// Maximum number of state transitions to keep in history.
///
/// A full access cycle is five transitions, so this keeps the last twenty
/// cycles for diagnostics.
const MAX_HISTORY_SIZE: usize = 100;

/// Phase of the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplianceState {
    /// Peripherals are being brought up.
    Initializing,

    /// Polling the reader for a card.
    Ready,

    /// A credential was read and is about to be checked.
    CardDetected,

    /// Checking the credential against the store.
    Verifying,

    /// Access granted; the lock is being actuated.
    Granting,

    /// Access denied.
    Denying,

    /// Releasing peripherals. Terminal.
    ShuttingDown,
}

impl fmt::Display for ApplianceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state_str = match self {
            ApplianceState::Initializing => "Initializing",
            ApplianceState::Ready => "Ready",
            ApplianceState::CardDetected => "CardDetected",
            ApplianceState::Verifying => "Verifying",
            ApplianceState::Granting => "Granting",
            ApplianceState::Denying => "Denying",
            ApplianceState::ShuttingDown => "ShuttingDown",
        };
        write!(f, "{}", state_str)
    }
}

impl ApplianceState {
    /// Check if transition to target state is valid from this state.
    ///
    /// # Examples
    ///
    /// ```
    /// use cardlock_controller::ApplianceState;
    ///
    /// assert!(ApplianceState::Ready.can_transition_to(&ApplianceState::CardDetected));
    /// assert!(ApplianceState::Verifying.can_transition_to(&ApplianceState::ShuttingDown));
    /// assert!(!ApplianceState::Ready.can_transition_to(&ApplianceState::Granting));
    /// ```
    pub fn can_transition_to(&self, target: &ApplianceState) -> bool {
        if *target == ApplianceState::ShuttingDown {
            return !self.is_terminal();
        }

        matches!(
            (self, target),
            (ApplianceState::Initializing, ApplianceState::Ready)
                | (ApplianceState::Ready, ApplianceState::CardDetected)
                | (ApplianceState::CardDetected, ApplianceState::Verifying)
                | (
                    ApplianceState::Verifying,
                    ApplianceState::Granting | ApplianceState::Denying
                )
                | (
                    ApplianceState::Granting | ApplianceState::Denying,
                    ApplianceState::Ready
                )
        )
    }

    /// Returns `true` for states with no way out.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ApplianceState::ShuttingDown)
    }
}

/// One step of the control loop, with how long the loop sat in `from`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTransition {
    pub from: ApplianceState,
    pub to: ApplianceState,
    pub dwell: Duration,
}

/// State machine for the control loop.
///
/// Not synchronized; the control loop owns it.
#[derive(Debug)]
pub struct StateMachine {
    /// Current state of the appliance.
    current_state: ApplianceState,

    /// When the current state was entered.
    state_entered_at: Instant,

    /// History of state transitions (limited to MAX_HISTORY_SIZE).
    history: VecDeque<StateTransition>,
}

impl StateMachine {
    /// Create a new state machine in the Initializing state.
    pub fn new() -> Self {
        Self {
            current_state: ApplianceState::Initializing,
            state_entered_at: Instant::now(),
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        }
    }

    pub fn current_state(&self) -> ApplianceState {
        self.current_state
    }

    /// Recent state transitions, ordered from oldest to newest.
    pub fn history(&self) -> &VecDeque<StateTransition> {
        &self.history
    }

    /// Transition to a new state, validating the transition.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidStateTransition` if the transition is not
    /// valid for the current state; the machine is left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use cardlock_controller::{ApplianceState, StateMachine};
    ///
    /// let mut machine = StateMachine::new();
    /// let transition = machine.transition_to(ApplianceState::Ready).unwrap();
    /// assert_eq!(transition.from, ApplianceState::Initializing);
    /// assert_eq!(transition.to, ApplianceState::Ready);
    /// ```
    pub fn transition_to(&mut self, new_state: ApplianceState) -> Result<StateTransition> {
        if !self.current_state.can_transition_to(&new_state) {
            return Err(Error::InvalidStateTransition {
                from: self.current_state.to_string(),
                to: new_state.to_string(),
            });
        }

        let now = Instant::now();
        let transition = StateTransition {
            from: self.current_state,
            to: new_state,
            dwell: now.duration_since(self.state_entered_at),
        };
        debug!(
            from = %transition.from,
            to = %transition.to,
            dwell_ms = transition.dwell.as_millis() as u64,
            "State transition"
        );

        self.current_state = new_state;
        self.state_entered_at = now;
        self.add_to_history(transition);

        Ok(transition)
    }

    fn add_to_history(&mut self, transition: StateTransition) {
        self.history.push_back(transition);
        if self.history.len() > MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ready_machine() -> StateMachine {
        let mut machine = StateMachine::new();
        machine.transition_to(ApplianceState::Ready).unwrap();
        machine
    }

    #[test]
    fn test_new_machine_starts_initializing() {
        let machine = StateMachine::new();
        assert_eq!(machine.current_state(), ApplianceState::Initializing);
        assert!(machine.history().is_empty());
    }

    #[rstest]
    #[case(ApplianceState::Initializing, ApplianceState::Ready)]
    #[case(ApplianceState::Ready, ApplianceState::CardDetected)]
    #[case(ApplianceState::CardDetected, ApplianceState::Verifying)]
    #[case(ApplianceState::Verifying, ApplianceState::Granting)]
    #[case(ApplianceState::Verifying, ApplianceState::Denying)]
    #[case(ApplianceState::Granting, ApplianceState::Ready)]
    #[case(ApplianceState::Denying, ApplianceState::Ready)]
    fn test_valid_transitions(#[case] from: ApplianceState, #[case] to: ApplianceState) {
        assert!(from.can_transition_to(&to));
    }

    #[rstest]
    #[case(ApplianceState::Initializing, ApplianceState::CardDetected)]
    #[case(ApplianceState::Ready, ApplianceState::Verifying)]
    #[case(ApplianceState::Ready, ApplianceState::Granting)]
    #[case(ApplianceState::CardDetected, ApplianceState::Granting)]
    #[case(ApplianceState::Granting, ApplianceState::Denying)]
    #[case(ApplianceState::ShuttingDown, ApplianceState::Ready)]
    #[case(ApplianceState::ShuttingDown, ApplianceState::ShuttingDown)]
    fn test_invalid_transitions(#[case] from: ApplianceState, #[case] to: ApplianceState) {
        assert!(!from.can_transition_to(&to));
    }

    #[rstest]
    #[case(ApplianceState::Initializing)]
    #[case(ApplianceState::Ready)]
    #[case(ApplianceState::CardDetected)]
    #[case(ApplianceState::Verifying)]
    #[case(ApplianceState::Granting)]
    #[case(ApplianceState::Denying)]
    fn test_shutdown_reachable_from_any_live_state(#[case] from: ApplianceState) {
        assert!(from.can_transition_to(&ApplianceState::ShuttingDown));
    }

    #[test]
    fn test_invalid_transition_leaves_machine_unchanged() {
        let mut machine = ready_machine();
        let result = machine.transition_to(ApplianceState::Granting);

        match result {
            Err(Error::InvalidStateTransition { from, to }) => {
                assert_eq!(from, "Ready");
                assert_eq!(to, "Granting");
            }
            other => panic!("expected invalid transition, got {other:?}"),
        }
        assert_eq!(machine.current_state(), ApplianceState::Ready);
        assert_eq!(machine.history().len(), 1);
    }

    #[test]
    fn test_complete_access_cycle_history() {
        let mut machine = ready_machine();
        for state in [
            ApplianceState::CardDetected,
            ApplianceState::Verifying,
            ApplianceState::Granting,
            ApplianceState::Ready,
        ] {
            machine.transition_to(state).unwrap();
        }

        assert_eq!(machine.history().len(), 5);
        let last = machine.history().back().copied().unwrap();
        assert_eq!(last.from, ApplianceState::Granting);
        assert_eq!(last.to, ApplianceState::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transition_records_dwell() {
        let mut machine = ready_machine();
        tokio::time::sleep(Duration::from_millis(350)).await;
        let transition = machine.transition_to(ApplianceState::CardDetected).unwrap();

        assert_eq!(transition.dwell, Duration::from_millis(350));
        assert_eq!(machine.history().back(), Some(&transition));
    }

    #[test]
    fn test_history_is_bounded() {
        let mut machine = ready_machine();
        for _ in 0..30 {
            machine.transition_to(ApplianceState::CardDetected).unwrap();
            machine.transition_to(ApplianceState::Verifying).unwrap();
            machine.transition_to(ApplianceState::Denying).unwrap();
            machine.transition_to(ApplianceState::Ready).unwrap();
        }
        assert_eq!(machine.history().len(), MAX_HISTORY_SIZE);
        assert_eq!(
            machine.history().back().map(|t| t.to),
            Some(ApplianceState::Ready)
        );
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_string(&ApplianceState::CardDetected).unwrap();
        assert_eq!(json, "\"card_detected\"");
    }
}
