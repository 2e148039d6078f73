//! Servo configuration and the angle to duty-cycle mapping.

use std::time::Duration;

use cardlock_core::HardwareConfig;
use cardlock_core::constants::{
    DEFAULT_LOCKED_ANGLE, DEFAULT_UNLOCKED_ANGLE, SERVO_DEFAULT_FREQUENCY_HZ,
    SERVO_DEFAULT_MAX_PULSE_US, SERVO_DEFAULT_MIN_PULSE_US, SERVO_MAX_ANGLE, SERVO_SETTLE_MS,
};

use crate::error::{Result, ServoError};

/// Linearly map `value` from `[in_min, in_max]` onto `[out_min, out_max]`.
///
/// No clamping is applied.
///
/// # Examples
///
/// ```
/// use cardlock_servo::map_range;
///
/// assert_eq!(map_range(50.0, 0.0, 100.0, 0.0, 180.0), 90.0);
/// assert_eq!(map_range(1_500.0, 500.0, 2_500.0, 0.0, 100.0), 50.0);
/// ```
pub fn map_range(value: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
    (out_max - out_min) * (value - in_min) / (in_max - in_min) + out_min
}

/// Servo timing and lock positions.
#[derive(Debug, Clone, PartialEq)]
pub struct ServoConfig {
    /// Shaft angle of the locked position (degrees).
    pub locked_angle: f64,

    /// Shaft angle of the unlocked position (degrees).
    pub unlocked_angle: f64,

    /// PWM frequency (Hz).
    pub frequency_hz: f64,

    /// Pulse width at 0 degrees (microseconds).
    pub min_pulse_us: f64,

    /// Pulse width at 180 degrees (microseconds).
    pub max_pulse_us: f64,

    /// Time allowed for the shaft to reach a commanded angle.
    pub settle: Duration,
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            locked_angle: DEFAULT_LOCKED_ANGLE,
            unlocked_angle: DEFAULT_UNLOCKED_ANGLE,
            frequency_hz: SERVO_DEFAULT_FREQUENCY_HZ,
            min_pulse_us: SERVO_DEFAULT_MIN_PULSE_US,
            max_pulse_us: SERVO_DEFAULT_MAX_PULSE_US,
            settle: Duration::from_millis(SERVO_SETTLE_MS),
        }
    }
}

impl ServoConfig {
    /// Default timing with the lock angles from the hardware configuration.
    pub fn from_hardware(hardware: &HardwareConfig) -> Self {
        Self::default().with_angles(hardware.locked_angle, hardware.unlocked_angle)
    }

    pub fn with_angles(mut self, locked: f64, unlocked: f64) -> Self {
        self.locked_angle = locked;
        self.unlocked_angle = unlocked;
        self
    }

    pub fn with_frequency(mut self, frequency_hz: f64) -> Self {
        self.frequency_hz = frequency_hz;
        self
    }

    pub fn with_pulse_range(mut self, min_pulse_us: f64, max_pulse_us: f64) -> Self {
        self.min_pulse_us = min_pulse_us;
        self.max_pulse_us = max_pulse_us;
        self
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// PWM period in microseconds.
    pub fn period_us(&self) -> f64 {
        1_000_000.0 / self.frequency_hz
    }

    /// Pulse width for `angle`, clamped to 0-180 degrees first.
    pub fn pulse_width_us(&self, angle: f64) -> f64 {
        let angle = angle.clamp(0.0, SERVO_MAX_ANGLE);
        map_range(
            angle,
            0.0,
            SERVO_MAX_ANGLE,
            self.min_pulse_us,
            self.max_pulse_us,
        )
    }

    /// Duty cycle (percent of the period) for `angle`.
    pub fn duty_cycle(&self, angle: f64) -> f64 {
        map_range(self.pulse_width_us(angle), 0.0, self.period_us(), 0.0, 100.0)
    }

    /// Check timing and angle ranges.
    ///
    /// # Errors
    ///
    /// Returns `ServoError::InvalidConfig` if:
    /// - The frequency is not a positive finite number
    /// - The minimum pulse is negative or not below the maximum
    /// - The maximum pulse does not fit in one PWM period
    /// - A lock angle lies outside 0-180 degrees
    pub fn validate(&self) -> Result<()> {
        if !self.frequency_hz.is_finite() || self.frequency_hz <= 0.0 {
            return Err(ServoError::invalid_config(format!(
                "frequency must be positive, got {} Hz",
                self.frequency_hz
            )));
        }

        if self.min_pulse_us < 0.0 || self.min_pulse_us >= self.max_pulse_us {
            return Err(ServoError::invalid_config(format!(
                "pulse range {}-{} us is empty",
                self.min_pulse_us, self.max_pulse_us
            )));
        }

        if self.max_pulse_us > self.period_us() {
            return Err(ServoError::invalid_config(format!(
                "max pulse {} us exceeds the {} us period",
                self.max_pulse_us,
                self.period_us()
            )));
        }

        for (name, angle) in [
            ("locked", self.locked_angle),
            ("unlocked", self.unlocked_angle),
        ] {
            if !(0.0..=SERVO_MAX_ANGLE).contains(&angle) {
                return Err(ServoError::invalid_config(format!(
                    "{name} angle {angle} outside 0-180 degrees"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, 500.0, 2.5)]
    #[case(90.0, 1_500.0, 7.5)]
    #[case(180.0, 2_500.0, 12.5)]
    #[case(-30.0, 500.0, 2.5)]
    #[case(270.0, 2_500.0, 12.5)]
    fn test_default_mapping(#[case] angle: f64, #[case] pulse: f64, #[case] duty: f64) {
        let config = ServoConfig::default();
        assert_eq!(config.pulse_width_us(angle), pulse);
        assert_eq!(config.duty_cycle(angle), duty);
    }

    #[rstest]
    #[case(50.0, 0.0, 100.0, 0.0, 180.0, 90.0)]
    #[case(0.0, 0.0, 100.0, 0.0, 180.0, 0.0)]
    #[case(100.0, 0.0, 100.0, 0.0, 180.0, 180.0)]
    #[case(1_500.0, 500.0, 2_500.0, 0.0, 100.0, 50.0)]
    fn test_map_range(
        #[case] value: f64,
        #[case] in_min: f64,
        #[case] in_max: f64,
        #[case] out_min: f64,
        #[case] out_max: f64,
        #[case] expected: f64,
    ) {
        assert_eq!(map_range(value, in_min, in_max, out_min, out_max), expected);
    }

    #[test]
    fn test_default_config_is_valid() {
        ServoConfig::default().validate().unwrap();
    }

    #[test]
    fn test_from_hardware_takes_angles() {
        let hardware = HardwareConfig::default().with_angles(10.0, 100.0);
        let config = ServoConfig::from_hardware(&hardware);
        assert_eq!(config.locked_angle, 10.0);
        assert_eq!(config.unlocked_angle, 100.0);
        assert_eq!(config.frequency_hz, 50.0);
    }

    #[rstest]
    #[case::zero_frequency(ServoConfig::default().with_frequency(0.0))]
    #[case::inverted_pulses(ServoConfig::default().with_pulse_range(2_500.0, 500.0))]
    #[case::pulse_longer_than_period(ServoConfig::default().with_frequency(1_000.0))]
    #[case::angle_out_of_range(ServoConfig::default().with_angles(0.0, 181.0))]
    fn test_invalid_configs(#[case] config: ServoConfig) {
        assert!(matches!(
            config.validate(),
            Err(ServoError::InvalidConfig(_))
        ));
    }
}
