//! Hardware abstraction layer for the cardlock appliance.
//!
//! This crate provides trait-based abstractions for the peripherals the
//! appliance drives: digital output pins (LCD bus), a PWM channel (lock
//! servo), a microsecond delay source and an RFID card transceiver. Drivers
//! in the other crates are generic over these traits, so the same code runs
//! against real hardware or the emulated devices in [`mock`].
//!
//! # Design Philosophy
//!
//! - **Explicit ownership**: every pin handle is owned by exactly one driver
//!   and released explicitly (or on drop).
//! - **No global mode**: pin numbers arrive already resolved through
//!   [`cardlock_core::HardwareConfig`].
//! - **Error-aware**: all operations return [`Result<T>`][error::Result] with a
//!   [`HardwareError`] describing the pin or card fault.
//!
//! # Pins
//!
//! ```
//! use cardlock_hardware::mock::MockGpio;
//! use cardlock_hardware::traits::{OutputPin, PwmChannel};
//!
//! let gpio = MockGpio::new();
//! let mut rs = gpio.output(27).unwrap();
//! rs.set_high().unwrap();
//!
//! let mut servo = gpio.pwm(18, 50.0).unwrap();
//! servo.set_duty_cycle(2.5).unwrap();
//! assert_eq!(gpio.duty_cycle(18), Some(2.5));
//! ```
//!
//! # Card Transceivers
//!
//! The [`CardTransceiver`] trait uses native `async fn` (Rust 1.90 + Edition
//! 2024 RPITIT). Reads block until a card is presented and must be
//! cancel-safe so callers can bound them with a timeout.
//!
//! [`CardTransceiver`]: traits::CardTransceiver

pub mod delay;
pub mod error;
pub mod mock;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use delay::StdDelay;
pub use error::{HardwareError, Result};
pub use traits::{CardTransceiver, Delay, OutputPin, PwmChannel};
pub use types::{PinLevel, tag_text};
