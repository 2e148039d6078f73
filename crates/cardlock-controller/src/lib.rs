//! Control loop of the cardlock appliance.
//!
//! The [`Controller`] ties the credential reader, the authenticator, the lock
//! actuator and the status display together. Each presented card walks the
//! [`StateMachine`] through one read-verify-act cycle.
//!
//! # Examples
//!
//! ```no_run
//! use cardlock_auth::{Authenticator, MemoryStore};
//! use cardlock_controller::{Controller, ControllerConfig, RunOutcome};
//! use cardlock_core::HardwareConfig;
//! use cardlock_hardware::mock::{MockCardTransceiver, MockGpio};
//! use cardlock_lcd::{Lcd1602, LcdBus};
//! use cardlock_rfid::CredentialReader;
//! use cardlock_servo::{ServoConfig, ServoLock};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let hardware = HardwareConfig::default();
//!     let gpio = MockGpio::new();
//!
//!     let bus = LcdBus::claim(&hardware.lcd, |pin| gpio.output(pin))?;
//!     let display = Lcd1602::new(bus, gpio.delay())?;
//!     let servo = ServoConfig::from_hardware(&hardware);
//!     let pwm = gpio.pwm(hardware.servo_pin, servo.frequency_hz)?;
//!     let lock = ServoLock::new(pwm, servo).await?;
//!     let (transceiver, _cards) = MockCardTransceiver::new();
//!
//!     let mut controller = Controller::new(
//!         CredentialReader::new(transceiver),
//!         Authenticator::new(MemoryStore::new()),
//!         display,
//!         lock,
//!         ControllerConfig::default(),
//!     );
//!
//!     let shutdown = CancellationToken::new();
//!     let outcome = controller.run(shutdown).await;
//!     assert_eq!(outcome, RunOutcome::Interrupted);
//!     Ok(())
//! }
//! ```

pub mod controller;
pub mod enrollment;
pub mod state_machine;
pub mod status;

pub use controller::{Controller, ControllerConfig, ControllerError, RunOutcome};
pub use enrollment::{EnrollOutcome, enroll_card};
pub use state_machine::{ApplianceState, StateMachine, StateTransition};
pub use status::StatusMessage;
