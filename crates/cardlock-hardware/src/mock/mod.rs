//! Mock device implementations for testing and development.
//!
//! This module provides simulated peripherals that can be controlled
//! programmatically without requiring physical hardware: a GPIO pin bank with
//! an HD44780 model that decodes the LCD bus, and an RFID card transceiver.

pub mod gpio;
pub mod hd44780;
pub mod rfid;

// Re-export commonly used types
pub use gpio::{BusEvent, MockDelay, MockGpio, MockPin, MockPwm, VirtualLcd};
pub use hd44780::Hd44780Model;
pub use rfid::{MockCardHandle, MockCardTransceiver};
