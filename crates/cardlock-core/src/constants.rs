//! Core constants for the cardlock appliance.
//!
//! The timing values in this module are contracts with the physical
//! peripherals (HD44780 controller, hobby servo) and must not be tuned
//! casually: the LCD controller silently drops commands that arrive before it
//! has finished executing the previous one, and a servo that is not given
//! time to travel ends up stuck mid-position.
//!
//! # Usage
//!
//! ```
//! use cardlock_core::constants::*;
//! use std::time::Duration;
//!
//! assert_eq!(LCD_WRITE_SETTLE_US, 1_000);
//! let settle = Duration::from_millis(SERVO_SETTLE_MS);
//! assert_eq!(settle.as_millis(), 500);
//! ```

// ============================================================================
// LCD Bus Timing (microseconds)
// ============================================================================

/// Hold time after each enable-line level change.
pub const LCD_PULSE_HOLD_US: u64 = 1;

/// Settle delay before every 8-bit write.
pub const LCD_WRITE_SETTLE_US: u64 = 1_000;

/// Completion delay after clear-display and return-home.
///
/// These two commands take the controller roughly 1.5 ms to execute; the
/// extra margin covers slow clones of the HD44780.
pub const LCD_CLEAR_DELAY_US: u64 = 3_000;

// ============================================================================
// LCD Geometry
// ============================================================================

/// Number of visible character columns.
pub const LCD_COLUMNS: usize = 16;

/// Number of visible rows.
pub const LCD_LINES: usize = 2;

/// DDRAM start address of each row (the table covers 4-row modules).
pub const LCD_ROW_OFFSETS: [u8; 4] = [0x00, 0x40, 0x14, 0x54];

/// Raw bring-up sequence replayed at initialization.
///
/// `0x33` and `0x32` are sent as nibbles `3, 3, 3, 2`: three "8-bit mode"
/// wake-ups followed by the switch to 4-bit mode. The remaining values set
/// 2 lines / 5x8 font, display on with no cursor, and left-to-right entry.
pub const LCD_INIT_SEQUENCE: [u8; 5] = [
    0x33,
    0x32,
    LCD_FUNCTION_SET | LCD_2LINE,
    LCD_DISPLAY_CONTROL | LCD_DISPLAY_ON,
    LCD_ENTRY_MODE_SET | LCD_ENTRY_LEFT,
];

// ============================================================================
// LCD Command Set (HD44780)
// ============================================================================

pub const LCD_CLEAR_DISPLAY: u8 = 0x01;
pub const LCD_RETURN_HOME: u8 = 0x02;
pub const LCD_ENTRY_MODE_SET: u8 = 0x04;
pub const LCD_DISPLAY_CONTROL: u8 = 0x08;
pub const LCD_CURSOR_SHIFT: u8 = 0x10;
pub const LCD_FUNCTION_SET: u8 = 0x20;
pub const LCD_SET_DDRAM_ADDR: u8 = 0x80;

// Entry mode flags
pub const LCD_ENTRY_LEFT: u8 = 0x02;
pub const LCD_ENTRY_SHIFT_INCREMENT: u8 = 0x01;

// Display control flags
pub const LCD_DISPLAY_ON: u8 = 0x04;
pub const LCD_CURSOR_ON: u8 = 0x02;
pub const LCD_BLINK_ON: u8 = 0x01;

// Display/cursor shift flags
pub const LCD_DISPLAY_MOVE: u8 = 0x08;
pub const LCD_MOVE_RIGHT: u8 = 0x04;

// Function set flags. 4-bit bus and 5x8 font are the cleared bits.
pub const LCD_2LINE: u8 = 0x08;

/// Command that moves the cursor to the start of the second row.
pub const LCD_SECOND_LINE: u8 = LCD_SET_DDRAM_ADDR | LCD_ROW_OFFSETS[1];

// ============================================================================
// Servo
// ============================================================================

/// Default PWM frequency for hobby servos.
pub const SERVO_DEFAULT_FREQUENCY_HZ: f64 = 50.0;

/// Default pulse width at 0 degrees.
pub const SERVO_DEFAULT_MIN_PULSE_US: f64 = 500.0;

/// Default pulse width at 180 degrees.
pub const SERVO_DEFAULT_MAX_PULSE_US: f64 = 2_500.0;

/// Maximum shaft angle.
pub const SERVO_MAX_ANGLE: f64 = 180.0;

/// Time the servo is given to reach a new position.
pub const SERVO_SETTLE_MS: u64 = 500;

/// Default locked angle.
pub const DEFAULT_LOCKED_ANGLE: f64 = 0.0;

/// Default unlocked angle.
pub const DEFAULT_UNLOCKED_ANGLE: f64 = 90.0;

// ============================================================================
// Control Loop
// ============================================================================

/// Interval between credential polls.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Pause after showing a grant or denial result.
pub const DEFAULT_RESULT_PAUSE_MS: u64 = 2_000;

// ============================================================================
// Credentials
// ============================================================================

/// Text capacity of a tag's data blocks (three 16-byte blocks).
pub const TAG_TEXT_CAPACITY: usize = 48;

/// Default credential file.
pub const DEFAULT_CREDENTIAL_FILE: &str = ".env";

/// Prefix of per-card hash keys: `RFID_CARD_<id>_HASH`.
pub const CARD_HASH_KEY_PREFIX: &str = "RFID_CARD_";

/// Suffix of per-card hash keys: `RFID_CARD_<id>_HASH`.
pub const CARD_HASH_KEY_SUFFIX: &str = "_HASH";

/// Length of a hex-encoded SHA-256 digest.
pub const HASH_HEX_LENGTH: usize = 64;

// ============================================================================
// Default Pins (BCM numbering)
// ============================================================================

pub const DEFAULT_LCD_RS_PIN: u8 = 27;
pub const DEFAULT_LCD_E_PIN: u8 = 22;

/// D4, D5, D6, D7.
pub const DEFAULT_LCD_DATA_PINS: [u8; 4] = [25, 24, 23, 17];

/// GPIO18 carries hardware PWM0 on the Raspberry Pi header.
pub const DEFAULT_SERVO_PIN: u8 = 18;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_line_command() {
        assert_eq!(LCD_SECOND_LINE, 0xC0);
    }

    #[test]
    fn test_init_sequence_bytes() {
        assert_eq!(LCD_INIT_SEQUENCE, [0x33, 0x32, 0x28, 0x0C, 0x06]);
    }

    #[test]
    fn test_default_pins_do_not_overlap() {
        let mut pins = vec![DEFAULT_LCD_RS_PIN, DEFAULT_LCD_E_PIN, DEFAULT_SERVO_PIN];
        pins.extend_from_slice(&DEFAULT_LCD_DATA_PINS);
        let count = pins.len();
        pins.sort_unstable();
        pins.dedup();
        assert_eq!(pins.len(), count);
    }
}
