//! Mock GPIO pin bank for testing and development.
//!
//! [`MockGpio`] hands out [`MockPin`] and [`MockPwm`] handles that enforce
//! single ownership per pin, records every bus-level event, and can inject
//! faults on individual pins. An HD44780 model can be tapped onto the LCD
//! lines to read the screen back as text.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use cardlock_core::LcdPinConfig;
use tracing::debug;

use super::hd44780::Hd44780Model;
use crate::error::{HardwareError, Result};
use crate::traits::{Delay, OutputPin, PwmChannel};
use crate::types::PinLevel;

/// Maximum number of bus events retained.
pub const MAX_EVENT_LOG: usize = 16_384;

/// One observable action on the emulated bus.
#[derive(Debug, Clone, PartialEq)]
pub enum BusEvent {
    /// An output line was driven.
    Level { pin: u8, level: PinLevel },
    /// A PWM duty cycle was applied.
    DutyCycle { pin: u8, percent: f64 },
    /// A PWM channel was stopped.
    PwmStopped { pin: u8 },
    /// An output line was released.
    Released { pin: u8 },
    /// A blocking delay was requested.
    Delay { us: u64 },
}

#[derive(Debug)]
struct LcdTap {
    pins: LcdPinConfig,
    model: Hd44780Model,
}

#[derive(Debug, Default)]
struct GpioState {
    levels: HashMap<u8, PinLevel>,
    duty: HashMap<u8, f64>,
    claimed: HashSet<u8>,
    faulty: HashSet<u8>,
    events: VecDeque<BusEvent>,
    lcd: Option<LcdTap>,
}

impl GpioState {
    fn record(&mut self, event: BusEvent) {
        if self.events.len() >= MAX_EVENT_LOG {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    fn claim(&mut self, pin: u8) -> Result<()> {
        if !self.claimed.insert(pin) {
            return Err(HardwareError::pin_busy(pin));
        }
        Ok(())
    }

    fn check_fault(&self, pin: u8) -> Result<()> {
        if self.faulty.contains(&pin) {
            return Err(HardwareError::pin_fault(pin, "injected fault"));
        }
        Ok(())
    }

    fn drive(&mut self, pin: u8, level: PinLevel) {
        let previous = self.levels.insert(pin, level);
        self.record(BusEvent::Level { pin, level });

        let falling_edge = previous == Some(PinLevel::High) && level == PinLevel::Low;
        if !falling_edge {
            return;
        }

        let levels = &self.levels;
        if let Some(tap) = self.lcd.as_mut().filter(|tap| tap.pins.e == pin) {
            let is_high = |p: u8| levels.get(&p).is_some_and(|l| l.is_high());
            let nibble = tap
                .pins
                .data
                .iter()
                .enumerate()
                .filter(|(_, p)| is_high(**p))
                .fold(0u8, |acc, (bit, _)| acc | (1 << bit));
            tap.model.latch_nibble(is_high(tap.pins.rs), nibble);
        }
    }
}

/// Emulated GPIO pin bank.
///
/// Cloning yields another handle onto the same bank, so a test can keep one
/// clone for inspection while drivers own the pins.
///
/// # Examples
///
/// ```
/// use cardlock_hardware::mock::MockGpio;
/// use cardlock_hardware::traits::OutputPin;
/// use cardlock_hardware::types::PinLevel;
///
/// let gpio = MockGpio::new();
/// let mut pin = gpio.output(27).unwrap();
/// pin.set_high().unwrap();
/// assert_eq!(gpio.level(27), Some(PinLevel::High));
///
/// // A second claim on the same pin fails until the first is released.
/// assert!(gpio.output(27).is_err());
/// pin.release().unwrap();
/// assert!(gpio.output(27).is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockGpio {
    state: Arc<Mutex<GpioState>>,
}

impl MockGpio {
    /// Create an empty pin bank.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, GpioState> {
        lock_state(&self.state)
    }

    /// Claim `pin` as a digital output, initially low.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::PinBusy` if the pin is already claimed.
    pub fn output(&self, pin: u8) -> Result<MockPin> {
        let mut state = self.lock();
        state.claim(pin)?;
        state.levels.insert(pin, PinLevel::Low);
        debug!(pin, "Claimed output pin");

        Ok(MockPin {
            pin,
            state: Arc::clone(&self.state),
            released: false,
        })
    }

    /// Claim `pin` as a PWM channel running at `frequency_hz`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The pin is already claimed
    /// - The frequency is not a positive finite number
    pub fn pwm(&self, pin: u8, frequency_hz: f64) -> Result<MockPwm> {
        if !frequency_hz.is_finite() || frequency_hz <= 0.0 {
            return Err(HardwareError::invalid_data(format!(
                "PWM frequency must be positive, got {frequency_hz}"
            )));
        }

        let mut state = self.lock();
        state.claim(pin)?;
        debug!(pin, frequency_hz, "Claimed PWM channel");

        Ok(MockPwm {
            pin,
            frequency_hz,
            state: Arc::clone(&self.state),
            stopped: false,
        })
    }

    /// Current level of an output pin, `None` if it is not claimed.
    pub fn level(&self, pin: u8) -> Option<PinLevel> {
        self.lock().levels.get(&pin).copied()
    }

    /// Current duty cycle of a PWM channel, `None` if no duty has been applied.
    pub fn duty_cycle(&self, pin: u8) -> Option<f64> {
        self.lock().duty.get(&pin).copied()
    }

    pub fn is_claimed(&self, pin: u8) -> bool {
        self.lock().claimed.contains(&pin)
    }

    /// Snapshot of the recorded bus events, oldest first.
    pub fn events(&self) -> Vec<BusEvent> {
        self.lock().events.iter().cloned().collect()
    }

    pub fn clear_events(&self) {
        self.lock().events.clear();
    }

    /// Make every write to `pin` fail (or succeed again).
    pub fn fail_pin(&self, pin: u8, failing: bool) {
        let mut state = self.lock();
        if failing {
            state.faulty.insert(pin);
        } else {
            state.faulty.remove(&pin);
        }
    }

    /// A delay source that records requests on this bank's event log
    /// instead of sleeping.
    pub fn delay(&self) -> MockDelay {
        MockDelay {
            state: Arc::clone(&self.state),
        }
    }

    /// Tap an HD44780 model onto the given LCD wiring.
    ///
    /// Replaces any previously attached model.
    pub fn attach_lcd(&self, pins: LcdPinConfig) -> VirtualLcd {
        self.lock().lcd = Some(LcdTap {
            pins,
            model: Hd44780Model::new(),
        });
        VirtualLcd {
            state: Arc::clone(&self.state),
        }
    }
}

fn lock_state(state: &Mutex<GpioState>) -> MutexGuard<'_, GpioState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Digital output handle from a [`MockGpio`] bank.
///
/// Dropping the handle releases the pin.
#[derive(Debug)]
pub struct MockPin {
    pin: u8,
    state: Arc<Mutex<GpioState>>,
    released: bool,
}

impl OutputPin for MockPin {
    fn pin(&self) -> u8 {
        self.pin
    }

    fn set_level(&mut self, level: PinLevel) -> Result<()> {
        if self.released {
            return Err(HardwareError::pin_released(self.pin));
        }

        let mut state = lock_state(&self.state);
        state.check_fault(self.pin)?;
        state.drive(self.pin, level);
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;

        let mut state = lock_state(&self.state);
        state.claimed.remove(&self.pin);
        state.levels.remove(&self.pin);
        state.record(BusEvent::Released { pin: self.pin });
        debug!(pin = self.pin, "Released output pin");
        Ok(())
    }
}

impl Drop for MockPin {
    fn drop(&mut self) {
        let _ = self.release();
    }
}

/// PWM channel handle from a [`MockGpio`] bank.
#[derive(Debug)]
pub struct MockPwm {
    pin: u8,
    frequency_hz: f64,
    state: Arc<Mutex<GpioState>>,
    stopped: bool,
}

impl PwmChannel for MockPwm {
    fn pin(&self) -> u8 {
        self.pin
    }

    fn frequency_hz(&self) -> f64 {
        self.frequency_hz
    }

    fn set_duty_cycle(&mut self, percent: f64) -> Result<()> {
        if self.stopped {
            return Err(HardwareError::pin_released(self.pin));
        }
        if !(0.0..=100.0).contains(&percent) {
            return Err(HardwareError::invalid_data(format!(
                "Duty cycle {percent}% outside 0-100"
            )));
        }

        let mut state = lock_state(&self.state);
        state.check_fault(self.pin)?;
        state.duty.insert(self.pin, percent);
        state.record(BusEvent::DutyCycle {
            pin: self.pin,
            percent,
        });
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if self.stopped {
            return Ok(());
        }
        self.stopped = true;

        let mut state = lock_state(&self.state);
        state.claimed.remove(&self.pin);
        state.duty.remove(&self.pin);
        state.record(BusEvent::PwmStopped { pin: self.pin });
        debug!(pin = self.pin, "Stopped PWM channel");
        Ok(())
    }
}

impl Drop for MockPwm {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Delay source that records instead of sleeping.
#[derive(Debug, Clone)]
pub struct MockDelay {
    state: Arc<Mutex<GpioState>>,
}

impl Delay for MockDelay {
    fn delay_us(&mut self, us: u64) {
        lock_state(&self.state).record(BusEvent::Delay { us });
    }
}

/// Read-back view of an HD44780 model attached to a [`MockGpio`] bank.
#[derive(Debug, Clone)]
pub struct VirtualLcd {
    state: Arc<Mutex<GpioState>>,
}

impl VirtualLcd {
    /// Run `f` against the attached model.
    ///
    /// Returns `None` if the model was detached by a later
    /// [`MockGpio::attach_lcd`] replacing it.
    pub fn with_model<R>(&self, f: impl FnOnce(&Hd44780Model) -> R) -> Option<R> {
        lock_state(&self.state).lcd.as_ref().map(|tap| f(&tap.model))
    }

    /// Visible text of `row`, blank if no model is attached.
    pub fn line(&self, row: usize) -> String {
        self.with_model(|model| model.line(row))
            .unwrap_or_else(|| " ".repeat(16))
    }

    /// Both visible lines.
    pub fn lines(&self) -> [String; 2] {
        [self.line(0), self.line(1)]
    }

    /// Visible lines with trailing blanks removed.
    pub fn text(&self) -> [String; 2] {
        self.lines().map(|line| line.trim_end().to_string())
    }

    pub fn display_on(&self) -> bool {
        self.with_model(Hd44780Model::display_on).unwrap_or(false)
    }
}
