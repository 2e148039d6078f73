//! Hardware wiring configuration.
//!
//! Pin numbers are stored in the numbering scheme named by
//! [`HardwareConfig::numbering`]. The scheme is chosen once at startup and the
//! whole configuration is handed to the drivers, so no driver ever asks a
//! global GPIO layer which mode is active.
//!
//! # Examples
//!
//! ```
//! use cardlock_core::{HardwareConfig, PinNumbering};
//!
//! let config = HardwareConfig::for_numbering(PinNumbering::Board).unwrap();
//! assert_eq!(config.servo_pin, 12);
//! config.validate().unwrap();
//! ```

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_LCD_DATA_PINS, DEFAULT_LCD_E_PIN, DEFAULT_LCD_RS_PIN, DEFAULT_LOCKED_ANGLE,
    DEFAULT_SERVO_PIN, DEFAULT_UNLOCKED_ANGLE, SERVO_MAX_ANGLE,
};
use crate::{Error, PinNumbering, Result};

/// LCD wiring: register select, enable and the four data lines D4-D7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LcdPinConfig {
    /// Register-select pin.
    pub rs: u8,

    /// Enable pin.
    pub e: u8,

    /// Data pins in D4, D5, D6, D7 order.
    pub data: [u8; 4],
}

/// Complete wiring and mechanical configuration of the appliance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardwareConfig {
    /// Numbering scheme the pin numbers below are expressed in.
    pub numbering: PinNumbering,

    /// LCD wiring.
    pub lcd: LcdPinConfig,

    /// Servo signal pin.
    pub servo_pin: u8,

    /// Shaft angle of the locked position.
    pub locked_angle: f64,

    /// Shaft angle of the unlocked position.
    pub unlocked_angle: f64,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            numbering: PinNumbering::Bcm,
            lcd: LcdPinConfig {
                rs: DEFAULT_LCD_RS_PIN,
                e: DEFAULT_LCD_E_PIN,
                data: DEFAULT_LCD_DATA_PINS,
            },
            servo_pin: DEFAULT_SERVO_PIN,
            locked_angle: DEFAULT_LOCKED_ANGLE,
            unlocked_angle: DEFAULT_UNLOCKED_ANGLE,
        }
    }
}

impl HardwareConfig {
    /// Default wiring expressed in the given numbering scheme.
    ///
    /// # Errors
    /// Returns `Error::InvalidPin` if a default pin has no header position,
    /// which cannot happen with the shipped defaults.
    pub fn for_numbering(numbering: PinNumbering) -> Result<Self> {
        let defaults = Self::default();
        let mut data = [0u8; 4];
        for (slot, pin) in data.iter_mut().zip(defaults.lcd.data) {
            *slot = numbering.resolve(pin)?;
        }

        Ok(Self {
            numbering,
            lcd: LcdPinConfig {
                rs: numbering.resolve(defaults.lcd.rs)?,
                e: numbering.resolve(defaults.lcd.e)?,
                data,
            },
            servo_pin: numbering.resolve(defaults.servo_pin)?,
            ..defaults
        })
    }

    /// Set the servo pin.
    pub fn with_servo_pin(mut self, pin: u8) -> Self {
        self.servo_pin = pin;
        self
    }

    /// Set the LCD wiring.
    pub fn with_lcd_pins(mut self, lcd: LcdPinConfig) -> Self {
        self.lcd = lcd;
        self
    }

    /// Set the locked and unlocked shaft angles.
    pub fn with_angles(mut self, locked: f64, unlocked: f64) -> Self {
        self.locked_angle = locked;
        self.unlocked_angle = unlocked;
        self
    }

    /// Every assigned pin with the role it plays.
    pub fn assignments(&self) -> Vec<(&'static str, u8)> {
        vec![
            ("LCD RS", self.lcd.rs),
            ("LCD E", self.lcd.e),
            ("LCD D4", self.lcd.data[0]),
            ("LCD D5", self.lcd.data[1]),
            ("LCD D6", self.lcd.data[2]),
            ("LCD D7", self.lcd.data[3]),
            ("servo", self.servo_pin),
        ]
    }

    /// Check the configuration for wiring and range errors.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A pin is not a GPIO pin in the configured numbering
    /// - Two roles share a pin
    /// - An angle lies outside 0-180 degrees
    pub fn validate(&self) -> Result<()> {
        let assignments = self.assignments();

        for (index, (role, pin)) in assignments.iter().enumerate() {
            if !self.numbering.is_gpio(*pin) {
                return Err(Error::InvalidPin {
                    pin: *pin,
                    numbering: self.numbering.to_string(),
                });
            }

            if let Some((other, _)) = assignments[..index].iter().find(|(_, p)| p == pin) {
                return Err(Error::PinConflict {
                    pin: *pin,
                    first: (*other).to_string(),
                    second: (*role).to_string(),
                });
            }
        }

        for angle in [self.locked_angle, self.unlocked_angle] {
            if !(0.0..=SERVO_MAX_ANGLE).contains(&angle) {
                return Err(Error::InvalidAngle { angle });
            }
        }

        Ok(())
    }
}
