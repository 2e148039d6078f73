//! Hardware device trait definitions.
//!
//! This module defines the contract between the appliance drivers and the
//! platform: digital output lines, PWM channels, a microsecond delay source
//! and an RFID card transceiver. Drivers are generic over these traits so the
//! same code drives real pins or the emulated ones in [`crate::mock`].
//!
//! The pin traits are synchronous: the LCD bus is bit-banged with
//! microsecond holds that an async timer cannot honour. The card transceiver
//! uses native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT) because a
//! read blocks until a card is presented.

#![allow(async_fn_in_trait)]

use cardlock_core::Credential;

use crate::error::Result;
use crate::types::PinLevel;

/// A digital output line owned by exactly one driver.
///
/// # Examples
///
/// ```
/// use cardlock_hardware::traits::OutputPin;
/// use cardlock_hardware::error::Result;
///
/// fn strobe<P: OutputPin>(pin: &mut P) -> Result<()> {
///     pin.set_high()?;
///     pin.set_low()
/// }
/// ```
pub trait OutputPin: Send {
    /// Pin number in the numbering scheme the pin was claimed with.
    fn pin(&self) -> u8;

    /// Drive the line to the given level.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The pin has been released
    /// - The write to the line failed
    fn set_level(&mut self, level: PinLevel) -> Result<()>;

    /// Drive the line high.
    ///
    /// # Errors
    ///
    /// See [`set_level`](Self::set_level).
    fn set_high(&mut self) -> Result<()> {
        self.set_level(PinLevel::High)
    }

    /// Drive the line low.
    ///
    /// # Errors
    ///
    /// See [`set_level`](Self::set_level).
    fn set_low(&mut self) -> Result<()> {
        self.set_level(PinLevel::Low)
    }

    /// Return the pin to an unconfigured state.
    ///
    /// Releasing is idempotent; later writes fail with
    /// [`HardwareError::PinReleased`](crate::HardwareError::PinReleased).
    ///
    /// # Errors
    ///
    /// Returns an error if the platform refuses to release the line.
    fn release(&mut self) -> Result<()>;
}

/// A PWM output channel with a fixed frequency.
pub trait PwmChannel: Send {
    /// Pin number carrying the signal.
    fn pin(&self) -> u8;

    /// PWM frequency in hertz.
    fn frequency_hz(&self) -> f64;

    /// Set the duty cycle as a percentage of the period (0-100).
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The percentage is outside 0-100
    /// - The channel has been stopped
    fn set_duty_cycle(&mut self, percent: f64) -> Result<()>;

    /// Stop generating pulses and release the pin.
    ///
    /// Stopping is idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform refuses to stop the channel.
    fn stop(&mut self) -> Result<()>;
}

/// Blocking microsecond delay source.
pub trait Delay {
    /// Block for at least `us` microseconds.
    fn delay_us(&mut self, us: u64);
}

/// RFID card reader/writer.
///
/// Mirrors the "simple" MFRC522 interface: a read blocks until a card is in
/// the field and returns its serial number plus the text stored on it; a
/// write blocks until a card is in the field and stores the text.
///
/// # Cancellation
///
/// Implementations must make [`read`](Self::read) cancel-safe: dropping the
/// future before it resolves must not lose a presented card. Callers bound
/// reads with `tokio::time::timeout`.
///
/// # Examples
///
/// ```no_run
/// use cardlock_hardware::traits::CardTransceiver;
/// use cardlock_hardware::error::Result;
///
/// async fn wait_for_card<T: CardTransceiver>(reader: &mut T) -> Result<String> {
///     let credential = reader.read().await?;
///     Ok(credential.id.to_string())
/// }
/// ```
pub trait CardTransceiver: Send {
    /// Read the next presented card.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The card could not be read (collision, CRC or auth failure)
    /// - The reader is disconnected or closed
    async fn read(&mut self) -> Result<Credential>;

    /// Write `text` to the next presented card, returning its serial number.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The card was removed before the write completed
    /// - The reader is disconnected or closed
    async fn write(&mut self, text: &str) -> Result<cardlock_core::CardId>;

    /// Release the reader and its bus.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader could not be shut down cleanly.
    async fn close(&mut self) -> Result<()>;
}
