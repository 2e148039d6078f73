//! Servo-driven lock actuator.
//!
//! [`ServoLock`] owns a PWM channel and moves the servo between a locked and
//! an unlocked shaft angle. Angles map linearly onto pulse widths, and pulse
//! widths onto a duty cycle of the PWM period:
//!
//! ```
//! use cardlock_servo::ServoConfig;
//!
//! let config = ServoConfig::default();
//! assert_eq!(config.pulse_width_us(90.0), 1_500.0);
//! assert_eq!(config.duty_cycle(90.0), 7.5);
//! ```

pub mod command;
pub mod config;
pub mod error;
pub mod lock;

pub use command::ServoCommand;
pub use config::{ServoConfig, map_range};
pub use error::{Result, ServoError};
pub use lock::ServoLock;
