//! The appliance control loop.
//!
//! [`Controller`] polls the reader, checks each presented credential and
//! toggles the lock for authorized cards, keeping the display in step. It
//! runs until its [`CancellationToken`] is cancelled or the lock actuator
//! fails, then releases every peripheral.

use std::time::Duration;

use cardlock_auth::{Authenticator, CredentialStore};
use cardlock_core::constants::{DEFAULT_POLL_INTERVAL_MS, DEFAULT_RESULT_PAUSE_MS};
use cardlock_core::{Credential, LockState};
use cardlock_hardware::{CardTransceiver, PwmChannel};
use cardlock_lcd::CharacterDisplay;
use cardlock_rfid::CredentialReader;
use cardlock_servo::{ServoError, ServoLock};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::state_machine::{ApplianceState, StateMachine, StateTransition};
use crate::status::StatusMessage;

/// Timing of the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Longest a single reader poll waits for a card.
    pub poll_interval: Duration,

    /// How long a grant or denial stays on screen before the next poll.
    pub result_pause: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            result_pause: Duration::from_millis(DEFAULT_RESULT_PAUSE_MS),
        }
    }
}

impl ControllerConfig {
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_result_pause(mut self, result_pause: Duration) -> Self {
        self.result_pause = result_pause;
        self
    }
}

/// Why the control loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Shutdown was requested.
    Interrupted,
    /// An unrecoverable fault, with its description.
    Fatal(String),
}

/// Faults that stop the control loop.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("Lock actuation failed: {0}")]
    Actuation(#[from] ServoError),

    #[error(transparent)]
    State(#[from] cardlock_core::Error),
}

/// Owns the peripherals and runs the read-verify-act cycle.
///
/// Display faults are logged and otherwise ignored; the lock keeps working
/// with a dead panel. Lock actuator faults end the loop.
#[derive(Debug)]
pub struct Controller<T, S, D, P>
where
    T: CardTransceiver,
    S: CredentialStore,
    D: CharacterDisplay,
    P: PwmChannel,
{
    reader: CredentialReader<T>,
    auth: Authenticator<S>,
    display: D,
    lock: ServoLock<P>,
    config: ControllerConfig,
    machine: StateMachine,
}

impl<T, S, D, P> Controller<T, S, D, P>
where
    T: CardTransceiver,
    S: CredentialStore,
    D: CharacterDisplay,
    P: PwmChannel,
{
    pub fn new(
        reader: CredentialReader<T>,
        auth: Authenticator<S>,
        display: D,
        lock: ServoLock<P>,
        config: ControllerConfig,
    ) -> Self {
        Self {
            reader,
            auth,
            display,
            lock,
            config,
            machine: StateMachine::new(),
        }
    }

    pub fn state(&self) -> ApplianceState {
        self.machine.current_state()
    }

    pub fn lock_state(&self) -> LockState {
        self.lock.state()
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Every transition the loop has made, oldest first.
    pub fn history(&self) -> Vec<StateTransition> {
        self.machine.history().iter().cloned().collect()
    }

    /// Run until `shutdown` is cancelled or a fatal fault occurs.
    ///
    /// Cancellation is observed between polls, so it takes effect within one
    /// poll interval (or one result pause, if a card is being handled). The
    /// peripherals are released before this returns, whatever the outcome.
    pub async fn run(&mut self, shutdown: CancellationToken) -> RunOutcome {
        let outcome = match self.poll_until_stopped(&shutdown).await {
            Ok(()) => {
                info!("Shutdown requested");
                RunOutcome::Interrupted
            }
            Err(err) => {
                error!(error = %err, "Fatal error in control loop");
                self.show(StatusMessage::SystemError);
                RunOutcome::Fatal(err.to_string())
            }
        };

        if let Err(err) = self.machine.transition_to(ApplianceState::ShuttingDown) {
            debug!(error = %err, "Already shutting down");
        }
        self.shutdown().await;
        outcome
    }

    async fn poll_until_stopped(
        &mut self,
        shutdown: &CancellationToken,
    ) -> Result<(), ControllerError> {
        self.machine.transition_to(ApplianceState::Ready)?;
        self.show(StatusMessage::Ready);
        info!(
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            "Ready for cards"
        );

        while !shutdown.is_cancelled() {
            let poll = self.reader.try_read_credential(self.config.poll_interval);
            if let Some(credential) = poll.await {
                self.handle_credential(credential).await?;
            }
        }
        Ok(())
    }

    /// One pass through the cycle for a presented card, ending in Ready.
    async fn handle_credential(&mut self, credential: Credential) -> Result<(), ControllerError> {
        self.machine.transition_to(ApplianceState::CardDetected)?;
        self.show(StatusMessage::CardDetected(credential.id));

        self.machine.transition_to(ApplianceState::Verifying)?;
        let authorized = self.auth.authorize(credential.id, &credential.payload);

        if authorized {
            self.machine.transition_to(ApplianceState::Granting)?;
            let state = self.lock.toggle().await?;
            info!(card_id = %credential.id, lock_state = %state, "Access granted");
            self.show(StatusMessage::Granted(state));
        } else {
            self.machine.transition_to(ApplianceState::Denying)?;
            warn!(card_id = %credential.id, "Access denied");
            self.show(StatusMessage::Denied);
        }

        tokio::time::sleep(self.config.result_pause).await;

        self.machine.transition_to(ApplianceState::Ready)?;
        self.show(StatusMessage::Ready);
        Ok(())
    }

    fn show(&mut self, message: StatusMessage) {
        let [first, second] = message.lines(usize::from(self.display.columns()));
        if let Err(err) = self.display.show(&first, &second) {
            warn!(error = %err, status = %message, "Display update failed");
        }
    }

    /// Release everything, logging and skipping past individual failures.
    async fn shutdown(&mut self) {
        info!("Cleaning up peripherals");

        if let Err(err) = self.lock.cleanup() {
            warn!(error = %err, "Servo cleanup failed");
        }

        if let Err(err) = self.display.clear() {
            warn!(error = %err, "Display clear failed");
        }
        if let Err(err) = self.display.display_off() {
            warn!(error = %err, "Display power-off failed");
        }
        if let Err(err) = self.display.cleanup() {
            warn!(error = %err, "Display cleanup failed");
        }

        if let Err(err) = self.reader.cleanup().await {
            warn!(error = %err, "Reader cleanup failed");
        }

        info!("Cleanup complete");
    }
}
