use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Credential errors
    #[error("Invalid card identifier: {0}")]
    InvalidCardId(String),

    // Hardware configuration errors
    #[error("Pin {pin} is not a GPIO pin in {numbering} numbering")]
    InvalidPin { pin: u8, numbering: String },

    #[error("Pin {pin} is assigned to both {first} and {second}")]
    PinConflict {
        pin: u8,
        first: String,
        second: String,
    },

    #[error("Invalid angle {angle}: must be within 0-180 degrees")]
    InvalidAngle { angle: f64 },

    // State machine errors
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
