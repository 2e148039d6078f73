//! Lock actuator built on a PWM-driven hobby servo.

use cardlock_core::LockState;
use cardlock_hardware::{HardwareError, PwmChannel};
use tokio::time::sleep;
use tracing::{debug, info};

use crate::config::ServoConfig;
use crate::error::{Result, ServoError};

/// Servo lock.
///
/// The lock owns its PWM channel for its whole life. `lock` and `unlock` are
/// guarded by the recorded state, so repeating either one never moves the
/// shaft twice.
///
/// # Examples
///
/// ```
/// use cardlock_core::LockState;
/// use cardlock_hardware::mock::MockGpio;
/// use cardlock_servo::{ServoConfig, ServoLock};
///
/// #[tokio::main(flavor = "current_thread", start_paused = true)]
/// async fn main() -> cardlock_servo::Result<()> {
///     let gpio = MockGpio::new();
///     let config = ServoConfig::default();
///     let pwm = gpio.pwm(18, config.frequency_hz)?;
///
///     let mut lock = ServoLock::new(pwm, config).await?;
///     assert_eq!(lock.state(), LockState::Locked);
///
///     assert_eq!(lock.toggle().await?, LockState::Unlocked);
///     assert_eq!(gpio.duty_cycle(18), Some(7.5));
///
///     lock.cleanup()?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct ServoLock<P: PwmChannel> {
    pwm: Option<P>,
    pin: u8,
    config: ServoConfig,
    state: LockState,
}

impl<P: PwmChannel> ServoLock<P> {
    /// Take ownership of `pwm` and drive the shaft to the locked angle.
    ///
    /// The locked angle is applied unconditionally, whatever position the
    /// shaft was left in.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration is invalid
    /// - The channel runs at a different frequency than configured
    /// - Applying the locked angle fails
    pub async fn new(pwm: P, config: ServoConfig) -> Result<Self> {
        config.validate()?;

        if (pwm.frequency_hz() - config.frequency_hz).abs() > f64::EPSILON {
            return Err(ServoError::invalid_config(format!(
                "PWM channel runs at {} Hz, expected {} Hz",
                pwm.frequency_hz(),
                config.frequency_hz
            )));
        }

        let pin = pwm.pin();
        info!(pin, "Initializing servo to locked position");

        let mut lock = Self {
            pwm: Some(pwm),
            pin,
            config,
            state: LockState::Locked,
        };
        lock.set_angle(lock.config.locked_angle).await?;

        info!(angle = lock.config.locked_angle, "Servo initialized and locked");
        Ok(lock)
    }

    /// Current recorded state.
    pub fn state(&self) -> LockState {
        self.state
    }

    pub fn is_locked(&self) -> bool {
        self.state.is_locked()
    }

    pub fn config(&self) -> &ServoConfig {
        &self.config
    }

    /// Drive the shaft to `angle` (clamped to 0-180) and wait for it to
    /// settle. The recorded state is not changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel was released or rejects the duty
    /// cycle.
    pub async fn set_angle(&mut self, angle: f64) -> Result<()> {
        let duty = self.config.duty_cycle(angle);
        let pwm = self
            .pwm
            .as_mut()
            .ok_or_else(|| HardwareError::pin_released(self.pin))?;

        pwm.set_duty_cycle(duty)?;
        debug!(angle, duty, "Servo angle applied");

        sleep(self.config.settle).await;
        Ok(())
    }

    /// Move to the locked position unless already locked.
    ///
    /// # Errors
    ///
    /// Returns an error if the actuation fails; the state is unchanged.
    pub async fn lock(&mut self) -> Result<()> {
        self.move_to(LockState::Locked).await
    }

    /// Move to the unlocked position unless already unlocked.
    ///
    /// # Errors
    ///
    /// Returns an error if the actuation fails; the state is unchanged.
    pub async fn unlock(&mut self) -> Result<()> {
        self.move_to(LockState::Unlocked).await
    }

    /// Flip the lock and return the new state.
    ///
    /// # Errors
    ///
    /// Returns an error if the actuation fails; the state is unchanged.
    pub async fn toggle(&mut self) -> Result<LockState> {
        let target = self.state.toggled();
        self.move_to(target).await?;
        Ok(self.state)
    }

    async fn move_to(&mut self, target: LockState) -> Result<()> {
        if self.state == target {
            debug!(state = %target, "Servo already in requested state");
            return Ok(());
        }

        let angle = match target {
            LockState::Locked => {
                info!("Locking");
                self.config.locked_angle
            }
            LockState::Unlocked => {
                info!("Unlocking");
                self.config.unlocked_angle
            }
        };

        self.set_angle(angle).await?;
        self.state = target;
        Ok(())
    }

    /// Stop the PWM output and release the pin.
    ///
    /// Safe to call more than once.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel refuses to stop.
    pub fn cleanup(&mut self) -> Result<()> {
        if let Some(mut pwm) = self.pwm.take() {
            pwm.stop()?;
            debug!(pin = self.pin, "Servo PWM stopped");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardlock_hardware::mock::{BusEvent, MockGpio};
    use std::time::Duration;

    const PIN: u8 = 18;

    fn duty_writes(gpio: &MockGpio) -> Vec<f64> {
        gpio.events()
            .into_iter()
            .filter_map(|event| match event {
                BusEvent::DutyCycle { percent, .. } => Some(percent),
                _ => None,
            })
            .collect()
    }

    async fn servo(gpio: &MockGpio) -> ServoLock<cardlock_hardware::mock::MockPwm> {
        let config = ServoConfig::default();
        let pwm = gpio.pwm(PIN, config.frequency_hz).unwrap();
        ServoLock::new(pwm, config).await.unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_forces_locked_angle() {
        let gpio = MockGpio::new();
        let lock = servo(&gpio).await;
        assert_eq!(lock.state(), LockState::Locked);
        assert_eq!(duty_writes(&gpio), vec![2.5]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_lock_actuates_once() {
        let gpio = MockGpio::new();
        let mut lock = servo(&gpio).await;
        gpio.clear_events();

        lock.lock().await.unwrap();
        lock.lock().await.unwrap();
        assert!(duty_writes(&gpio).is_empty());

        lock.unlock().await.unwrap();
        lock.unlock().await.unwrap();
        assert_eq!(duty_writes(&gpio), vec![7.5]);
        assert!(!lock.is_locked());
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_is_involution() {
        let gpio = MockGpio::new();
        let mut lock = servo(&gpio).await;

        assert_eq!(lock.toggle().await.unwrap(), LockState::Unlocked);
        assert_eq!(lock.toggle().await.unwrap(), LockState::Locked);
        assert_eq!(duty_writes(&gpio), vec![2.5, 7.5, 2.5]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_actuation_waits_for_settle() {
        let gpio = MockGpio::new();
        let mut lock = servo(&gpio).await;

        let start = tokio::time::Instant::now();
        lock.unlock().await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fault_leaves_state_unchanged() {
        let gpio = MockGpio::new();
        let mut lock = servo(&gpio).await;

        gpio.fail_pin(PIN, true);
        let err = lock.unlock().await.unwrap_err();
        assert!(matches!(
            err,
            ServoError::Hardware(HardwareError::PinFault { pin: PIN, .. })
        ));
        assert_eq!(lock.state(), LockState::Locked);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_is_idempotent() {
        let gpio = MockGpio::new();
        let mut lock = servo(&gpio).await;

        lock.cleanup().unwrap();
        lock.cleanup().unwrap();
        assert!(!gpio.is_claimed(PIN));
        assert!(matches!(
            lock.unlock().await,
            Err(ServoError::Hardware(HardwareError::PinReleased { pin: PIN }))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_frequency_mismatch_rejected() {
        let gpio = MockGpio::new();
        let pwm = gpio.pwm(PIN, 60.0).unwrap();
        let result = ServoLock::new(pwm, ServoConfig::default()).await;
        assert!(matches!(result, Err(ServoError::InvalidConfig(_))));
    }
}
