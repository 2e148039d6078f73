//! Error types for the lock actuator.

use cardlock_hardware::HardwareError;

/// Result type alias for servo operations.
pub type Result<T> = std::result::Result<T, ServoError>;

/// Errors that can occur while configuring or driving the servo.
#[derive(Debug, thiserror::Error)]
pub enum ServoError {
    /// The servo configuration is inconsistent.
    #[error("Invalid servo configuration: {0}")]
    InvalidConfig(String),

    /// The PWM channel failed.
    #[error(transparent)]
    Hardware(#[from] HardwareError),
}

impl ServoError {
    /// Create a new invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}
