//! Error types for hardware operations.
//!
//! This module defines error types specific to peripheral operations,
//! covering pin ownership, faulty output lines, card transceiver failures and
//! disconnected devices.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during hardware device operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Pin is already claimed by another driver.
    #[error("Pin {pin} is already in use")]
    PinBusy { pin: u8 },

    /// Pin was released and can no longer be driven.
    #[error("Pin {pin} has been released")]
    PinReleased { pin: u8 },

    /// Writing to an output line failed.
    #[error("Pin {pin} fault: {message}")]
    PinFault { pin: u8, message: String },

    /// Invalid data passed to or received from a device.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Card reading error.
    #[error("Card read error: {message}")]
    CardReadError { message: String },

    /// Card writing error.
    #[error("Card write error: {message}")]
    CardWriteError { message: String },
}

impl HardwareError {
    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new pin busy error.
    pub fn pin_busy(pin: u8) -> Self {
        Self::PinBusy { pin }
    }

    /// Create a new released pin error.
    pub fn pin_released(pin: u8) -> Self {
        Self::PinReleased { pin }
    }

    /// Create a new pin fault error.
    pub fn pin_fault(pin: u8, message: impl Into<String>) -> Self {
        Self::PinFault {
            pin,
            message: message.into(),
        }
    }

    /// Create a new invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a new card read error.
    pub fn card_read(message: impl Into<String>) -> Self {
        Self::CardReadError {
            message: message.into(),
        }
    }

    /// Create a new card write error.
    pub fn card_write(message: impl Into<String>) -> Self {
        Self::CardWriteError {
            message: message.into(),
        }
    }
}
