use crate::{Result, error::Error};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Card identifier (tag serial number).
///
/// The decimal rendering of the identifier doubles as the password salt, so
/// [`Display`](fmt::Display) must stay a plain base-10 number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(u64);

impl CardId {
    /// Create a card identifier from its raw serial number.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        CardId(id)
    }

    /// Get the raw serial number.
    #[must_use]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CardId {
    fn from(id: u64) -> Self {
        CardId(id)
    }
}

impl std::str::FromStr for CardId {
    type Err = Error;

    /// Parse a decimal card identifier, ignoring surrounding whitespace.
    ///
    /// # Errors
    /// Returns `Error::InvalidCardId` for anything that is not a decimal `u64`.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidCardId(s.to_string()));
        }
        trimmed
            .parse::<u64>()
            .map(CardId)
            .map_err(|_| Error::InvalidCardId(s.to_string()))
    }
}

/// A credential read from a presented card.
///
/// The payload is the free-text field stored on the tag. In this appliance it
/// carries the password written at enrollment, possibly padded with trailing
/// spaces up to the tag capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Card serial number.
    pub id: CardId,

    /// Text stored on the card.
    pub payload: String,

    /// When the card was read.
    pub read_at: DateTime<Utc>,
}

impl Credential {
    /// Create a credential stamped with the current time.
    #[must_use]
    pub fn new(id: CardId, payload: impl Into<String>) -> Self {
        Self {
            id,
            payload: payload.into(),
            read_at: Utc::now(),
        }
    }
}

/// Logical state of the lock mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockState {
    Locked,
    Unlocked,
}

impl LockState {
    /// The opposite state.
    #[inline]
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            LockState::Locked => LockState::Unlocked,
            LockState::Unlocked => LockState::Locked,
        }
    }

    /// Returns `true` if the mechanism is locked.
    #[inline]
    #[must_use]
    pub fn is_locked(self) -> bool {
        matches!(self, LockState::Locked)
    }
}

impl fmt::Display for LockState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LockState::Locked => write!(f, "LOCKED"),
            LockState::Unlocked => write!(f, "UNLOCKED"),
        }
    }
}

/// GPIO pin numbering scheme.
///
/// Resolved once at startup and passed to every driver through
/// [`HardwareConfig`](crate::HardwareConfig).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinNumbering {
    /// Broadcom SoC channel numbers (`GPIO18`).
    #[default]
    Bcm,
    /// Physical pin positions on the 40-pin header (`pin 12`).
    Board,
}

/// (BCM channel, physical header pin) pairs of the 40-pin Raspberry Pi header.
const BCM_TO_BOARD: [(u8, u8); 28] = [
    (0, 27),
    (1, 28),
    (2, 3),
    (3, 5),
    (4, 7),
    (5, 29),
    (6, 31),
    (7, 26),
    (8, 24),
    (9, 21),
    (10, 19),
    (11, 23),
    (12, 32),
    (13, 33),
    (14, 8),
    (15, 10),
    (16, 36),
    (17, 11),
    (18, 12),
    (19, 35),
    (20, 38),
    (21, 40),
    (22, 15),
    (23, 16),
    (24, 18),
    (25, 22),
    (26, 37),
    (27, 13),
];

impl PinNumbering {
    /// Translate a BCM channel into this numbering scheme.
    ///
    /// # Errors
    /// Returns `Error::InvalidPin` if the channel is not exposed on the header.
    ///
    /// # Examples
    ///
    /// ```
    /// use cardlock_core::PinNumbering;
    ///
    /// assert_eq!(PinNumbering::Bcm.resolve(18).unwrap(), 18);
    /// assert_eq!(PinNumbering::Board.resolve(18).unwrap(), 12);
    /// ```
    pub fn resolve(self, bcm: u8) -> Result<u8> {
        let board = BCM_TO_BOARD
            .iter()
            .find(|(channel, _)| *channel == bcm)
            .map(|(_, board)| *board)
            .ok_or_else(|| Error::InvalidPin {
                pin: bcm,
                numbering: PinNumbering::Bcm.to_string(),
            })?;

        Ok(match self {
            PinNumbering::Bcm => bcm,
            PinNumbering::Board => board,
        })
    }

    /// Returns `true` if `pin` is a GPIO-capable pin in this numbering.
    #[must_use]
    pub fn is_gpio(self, pin: u8) -> bool {
        BCM_TO_BOARD.iter().any(|(bcm, board)| match self {
            PinNumbering::Bcm => *bcm == pin,
            PinNumbering::Board => *board == pin,
        })
    }
}

impl fmt::Display for PinNumbering {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PinNumbering::Bcm => write!(f, "BCM"),
            PinNumbering::Board => write!(f, "BOARD"),
        }
    }
}

impl std::str::FromStr for PinNumbering {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bcm" => Ok(PinNumbering::Bcm),
            "board" => Ok(PinNumbering::Board),
            other => Err(Error::Config(format!("Unknown pin numbering: {other}"))),
        }
    }
}
