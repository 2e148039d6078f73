//! HD44780 character LCD driver for the cardlock appliance.
//!
//! [`Lcd1602`] bit-bangs a 16x2 panel over a 4-bit bus (RS, E, D4-D7) using
//! any [`OutputPin`](cardlock_hardware::OutputPin) implementation. The
//! [`CharacterDisplay`] trait is the narrow surface the control loop uses.
//!
//! # Examples
//!
//! ```
//! use cardlock_core::HardwareConfig;
//! use cardlock_hardware::mock::MockGpio;
//! use cardlock_lcd::{CharacterDisplay, Lcd1602, LcdBus};
//!
//! let config = HardwareConfig::default();
//! let gpio = MockGpio::new();
//! let screen = gpio.attach_lcd(config.lcd);
//!
//! let bus = LcdBus::claim(&config.lcd, |pin| gpio.output(pin)).unwrap();
//! let mut lcd = Lcd1602::new(bus, gpio.delay()).unwrap();
//! lcd.show("Access granted", "UNLOCKED").unwrap();
//!
//! assert_eq!(screen.text(), ["Access granted", "UNLOCKED"]);
//! ```

pub mod demo;
pub mod display;
pub mod lcd1602;

pub use demo::{DemoTiming, run_demo};
pub use display::CharacterDisplay;
pub use lcd1602::{Lcd1602, LcdBus};
