//! Options shared by several subcommands.

use std::path::PathBuf;

use anyhow::Context;
use cardlock_auth::{Authenticator, EnvFileStore};
use cardlock_core::constants::DEFAULT_CREDENTIAL_FILE;
use cardlock_core::{HardwareConfig, PinNumbering};
use clap::{Args, ValueEnum};

use crate::console::{ConsoleInput, ConsoleTransceiver, TagWallet};

/// Pin numbering scheme as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Numbering {
    /// Broadcom channel numbers.
    Bcm,
    /// Physical header positions.
    Board,
}

impl From<Numbering> for PinNumbering {
    fn from(value: Numbering) -> Self {
        match value {
            Numbering::Bcm => PinNumbering::Bcm,
            Numbering::Board => PinNumbering::Board,
        }
    }
}

/// Wiring and mechanical options.
#[derive(Debug, Clone, Args)]
pub struct HardwareArgs {
    /// Numbering scheme used for every pin number.
    #[arg(long, env = "CARDLOCK_PIN_NUMBERING", value_enum, default_value_t = Numbering::Bcm)]
    pub numbering: Numbering,

    /// Servo signal pin, in the chosen numbering. Defaults to BCM 18.
    #[arg(long, env = "CARDLOCK_SERVO_PIN")]
    pub servo_pin: Option<u8>,

    /// Shaft angle of the locked position.
    #[arg(long, env = "CARDLOCK_LOCKED_ANGLE", default_value_t = 0.0)]
    pub locked_angle: f64,

    /// Shaft angle of the unlocked position.
    #[arg(long, env = "CARDLOCK_UNLOCKED_ANGLE", default_value_t = 90.0)]
    pub unlocked_angle: f64,
}

impl HardwareArgs {
    /// Resolve the options into a validated wiring configuration.
    pub fn to_config(&self) -> anyhow::Result<HardwareConfig> {
        let mut config = HardwareConfig::for_numbering(self.numbering.into())?
            .with_angles(self.locked_angle, self.unlocked_angle);
        if let Some(pin) = self.servo_pin {
            config = config.with_servo_pin(pin);
        }
        config.validate().context("Invalid hardware configuration")?;
        Ok(config)
    }
}

/// Where credential records and emulated tag contents live.
#[derive(Debug, Clone, Args)]
pub struct StoreArgs {
    /// Credential file holding one RFID_CARD_<id>_HASH entry per card.
    #[arg(long, env = "CARDLOCK_CREDENTIALS", default_value = DEFAULT_CREDENTIAL_FILE)]
    pub credentials: PathBuf,

    /// JSON file holding the text stored on each emulated tag.
    #[arg(long, env = "CARDLOCK_TAG_FILE", default_value = "cardlock-tags.json")]
    pub tags: PathBuf,
}

impl StoreArgs {
    pub fn authenticator(&self) -> Authenticator<EnvFileStore> {
        Authenticator::new(EnvFileStore::new(&self.credentials))
    }

    /// Console transceiver reading card IDs from stdin.
    pub fn transceiver(&self, input: ConsoleInput) -> anyhow::Result<ConsoleTransceiver> {
        let wallet = TagWallet::load(&self.tags)?;
        Ok(ConsoleTransceiver::new(input, wallet))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hardware(numbering: Numbering) -> HardwareArgs {
        HardwareArgs {
            numbering,
            servo_pin: None,
            locked_angle: 0.0,
            unlocked_angle: 90.0,
        }
    }

    #[test]
    fn test_default_wiring() {
        let config = hardware(Numbering::Bcm).to_config().unwrap();
        assert_eq!(config, HardwareConfig::default());
    }

    #[test]
    fn test_board_numbering() {
        let config = hardware(Numbering::Board).to_config().unwrap();
        assert_eq!(config.numbering, PinNumbering::Board);
        assert_eq!(config.servo_pin, 12);
    }

    #[test]
    fn test_conflicting_servo_pin_rejected() {
        let mut args = hardware(Numbering::Bcm);
        args.servo_pin = Some(27);
        assert!(args.to_config().is_err());
    }

    #[test]
    fn test_out_of_range_angle_rejected() {
        let mut args = hardware(Numbering::Bcm);
        args.unlocked_angle = 270.0;
        assert!(args.to_config().is_err());
    }
}
