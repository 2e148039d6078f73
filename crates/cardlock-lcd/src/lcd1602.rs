//! HD44780 16x2 driver over a 4-bit bus.
//!
//! # Bus protocol
//!
//! Each 8-bit value is preceded by a settle delay and sent as two nibbles,
//! high nibble first. For each nibble the driver sets RS (low for commands,
//! high for character data), drives D4-D7 with bit 0 on D4 and bit 3 on D7,
//! then pulses E low, high, low holding each level for one microsecond. The
//! controller latches on the falling edge.

use cardlock_core::LcdPinConfig;
use cardlock_core::constants::{
    LCD_2LINE, LCD_BLINK_ON, LCD_CLEAR_DELAY_US, LCD_CLEAR_DISPLAY, LCD_COLUMNS, LCD_CURSOR_ON,
    LCD_CURSOR_SHIFT, LCD_DISPLAY_CONTROL, LCD_DISPLAY_MOVE, LCD_DISPLAY_ON, LCD_ENTRY_LEFT,
    LCD_ENTRY_MODE_SET, LCD_ENTRY_SHIFT_INCREMENT, LCD_FUNCTION_SET, LCD_INIT_SEQUENCE, LCD_LINES,
    LCD_MOVE_RIGHT, LCD_PULSE_HOLD_US, LCD_RETURN_HOME, LCD_ROW_OFFSETS, LCD_SECOND_LINE,
    LCD_SET_DDRAM_ADDR, LCD_WRITE_SETTLE_US,
};
use cardlock_hardware::{Delay, OutputPin, PinLevel, Result};
use tracing::{debug, warn};

use crate::display::CharacterDisplay;

/// The six output lines of the LCD bus.
#[derive(Debug)]
pub struct LcdBus<P> {
    /// Register select.
    pub rs: P,
    /// Enable.
    pub e: P,
    /// D4, D5, D6, D7.
    pub data: [P; 4],
}

impl<P: OutputPin> LcdBus<P> {
    /// Claim every line of `pins` through `claim`.
    ///
    /// # Errors
    ///
    /// Returns the first claim error. Lines claimed before the failure are
    /// dropped, which releases them for pin types that release on drop.
    pub fn claim(pins: &LcdPinConfig, mut claim: impl FnMut(u8) -> Result<P>) -> Result<Self> {
        let rs = claim(pins.rs)?;
        let e = claim(pins.e)?;
        let data = [
            claim(pins.data[0])?,
            claim(pins.data[1])?,
            claim(pins.data[2])?,
            claim(pins.data[3])?,
        ];
        Ok(Self { rs, e, data })
    }
}

/// 16x2 HD44780 character LCD.
///
/// The driver keeps no copy of the screen contents, only the cursor position
/// and the display-control, function and entry-mode flag bytes.
#[derive(Debug)]
pub struct Lcd1602<P: OutputPin, D: Delay> {
    bus: LcdBus<P>,
    delay: D,
    display_function: u8,
    display_control: u8,
    display_mode: u8,
    cursor: (u8, u8),
}

impl<P: OutputPin, D: Delay> Lcd1602<P, D> {
    /// Take ownership of the bus and initialize the panel.
    ///
    /// # Errors
    ///
    /// Returns the pin fault that interrupted initialization.
    pub fn new(bus: LcdBus<P>, delay: D) -> Result<Self> {
        let mut lcd = Self {
            bus,
            delay,
            display_function: 0,
            display_control: 0,
            display_mode: 0,
            cursor: (0, 0),
        };
        lcd.initialize()?;
        Ok(lcd)
    }

    /// Replay the power-on sequence: switch to 4-bit mode, two lines, display
    /// on with cursor and blink off, left-to-right entry, then clear.
    ///
    /// # Errors
    ///
    /// Returns the first pin fault.
    pub fn initialize(&mut self) -> Result<()> {
        for value in LCD_INIT_SEQUENCE {
            self.command(value)?;
        }

        self.display_control = LCD_DISPLAY_ON;
        self.display_function = LCD_FUNCTION_SET | LCD_2LINE;
        self.display_mode = LCD_ENTRY_LEFT;

        self.command(LCD_ENTRY_MODE_SET | self.display_mode)?;
        self.clear()?;
        debug!(
            rs = self.bus.rs.pin(),
            e = self.bus.e.pin(),
            "LCD initialized"
        );
        Ok(())
    }

    /// Blank the display and return the cursor to (0, 0).
    ///
    /// # Errors
    ///
    /// Returns the first pin fault.
    pub fn clear(&mut self) -> Result<()> {
        self.command(LCD_CLEAR_DISPLAY)?;
        self.delay.delay_us(LCD_CLEAR_DELAY_US);
        self.cursor = (0, 0);
        Ok(())
    }

    /// Return the cursor to (0, 0) and undo any display shift.
    ///
    /// # Errors
    ///
    /// Returns the first pin fault.
    pub fn home(&mut self) -> Result<()> {
        self.command(LCD_RETURN_HOME)?;
        self.delay.delay_us(LCD_CLEAR_DELAY_US);
        self.cursor = (0, 0);
        Ok(())
    }

    /// Move the cursor to `col` on `row`; rows past the last line are clamped.
    ///
    /// # Errors
    ///
    /// Returns the first pin fault.
    pub fn set_cursor(&mut self, col: u8, row: u8) -> Result<()> {
        let row = row.min(LCD_LINES as u8 - 1);
        let address = col.wrapping_add(LCD_ROW_OFFSETS[usize::from(row)]) & 0x7F;
        self.command(LCD_SET_DDRAM_ADDR | address)?;
        self.cursor = (col, row);
        Ok(())
    }

    /// Write text at the cursor.
    ///
    /// `'\n'` moves to the start of the second line. Characters outside
    /// ASCII are sent as `'?'`.
    ///
    /// # Errors
    ///
    /// Returns the first pin fault; characters before it have been written.
    pub fn write(&mut self, text: &str) -> Result<()> {
        debug!(text, "LCD write");

        for ch in text.chars() {
            if ch == '\n' {
                self.command(LCD_SECOND_LINE)?;
                self.cursor = (0, 1);
                continue;
            }

            let byte = if ch.is_ascii() { ch as u8 } else { b'?' };
            self.write_byte(byte, true)?;
            self.cursor.0 = self.cursor.0.wrapping_add(1);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns the first pin fault.
    pub fn display_on(&mut self) -> Result<()> {
        self.update_control(LCD_DISPLAY_ON, true)
    }

    /// # Errors
    ///
    /// Returns the first pin fault.
    pub fn display_off(&mut self) -> Result<()> {
        self.update_control(LCD_DISPLAY_ON, false)
    }

    /// # Errors
    ///
    /// Returns the first pin fault.
    pub fn cursor_on(&mut self) -> Result<()> {
        self.update_control(LCD_CURSOR_ON, true)
    }

    /// # Errors
    ///
    /// Returns the first pin fault.
    pub fn cursor_off(&mut self) -> Result<()> {
        self.update_control(LCD_CURSOR_ON, false)
    }

    /// # Errors
    ///
    /// Returns the first pin fault.
    pub fn blink_on(&mut self) -> Result<()> {
        self.update_control(LCD_BLINK_ON, true)
    }

    /// # Errors
    ///
    /// Returns the first pin fault.
    pub fn blink_off(&mut self) -> Result<()> {
        self.update_control(LCD_BLINK_ON, false)
    }

    /// Shift the whole display one column left.
    ///
    /// # Errors
    ///
    /// Returns the first pin fault.
    pub fn scroll_left(&mut self) -> Result<()> {
        self.command(LCD_CURSOR_SHIFT | LCD_DISPLAY_MOVE)
    }

    /// Shift the whole display one column right.
    ///
    /// # Errors
    ///
    /// Returns the first pin fault.
    pub fn scroll_right(&mut self) -> Result<()> {
        self.command(LCD_CURSOR_SHIFT | LCD_DISPLAY_MOVE | LCD_MOVE_RIGHT)
    }

    /// Choose whether the cursor advances left-to-right or right-to-left.
    ///
    /// # Errors
    ///
    /// Returns the first pin fault.
    pub fn set_entry_direction(&mut self, left_to_right: bool) -> Result<()> {
        self.update_mode(LCD_ENTRY_LEFT, left_to_right)
    }

    /// Shift the display on every write, keeping the cursor column fixed.
    ///
    /// # Errors
    ///
    /// Returns the first pin fault.
    pub fn set_autoscroll(&mut self, enabled: bool) -> Result<()> {
        self.update_mode(LCD_ENTRY_SHIFT_INCREMENT, enabled)
    }

    /// Release RS, E and the data lines.
    ///
    /// Every line is released even if an earlier one fails.
    ///
    /// # Errors
    ///
    /// Returns the first release failure.
    pub fn cleanup(&mut self) -> Result<()> {
        let LcdBus { rs, e, data } = &mut self.bus;
        let mut first_error = None;

        for pin in std::iter::once(rs).chain(std::iter::once(e)).chain(data.iter_mut()) {
            if let Err(err) = pin.release() {
                warn!(pin = pin.pin(), error = %err, "Failed to release LCD pin");
                first_error.get_or_insert(err);
            }
        }

        debug!("LCD pins released");
        first_error.map_or(Ok(()), Err)
    }

    /// Last cursor position set through this driver.
    pub fn cursor(&self) -> (u8, u8) {
        self.cursor
    }

    /// Display-control flag byte (display, cursor, blink).
    pub fn display_control(&self) -> u8 {
        self.display_control
    }

    /// Function-set flag byte (interface width, lines, font).
    pub fn display_function(&self) -> u8 {
        self.display_function
    }

    /// Entry-mode flag byte (direction, autoscroll).
    pub fn display_mode(&self) -> u8 {
        self.display_mode
    }

    fn update_control(&mut self, flag: u8, set: bool) -> Result<()> {
        if set {
            self.display_control |= flag;
        } else {
            self.display_control &= !flag;
        }
        self.command(LCD_DISPLAY_CONTROL | self.display_control)
    }

    fn update_mode(&mut self, flag: u8, set: bool) -> Result<()> {
        if set {
            self.display_mode |= flag;
        } else {
            self.display_mode &= !flag;
        }
        self.command(LCD_ENTRY_MODE_SET | self.display_mode)
    }

    fn command(&mut self, value: u8) -> Result<()> {
        self.write_byte(value, false)
    }

    fn write_byte(&mut self, value: u8, char_mode: bool) -> Result<()> {
        self.delay.delay_us(LCD_WRITE_SETTLE_US);
        self.bus.rs.set_level(PinLevel::from(char_mode))?;
        self.write_nibble(value >> 4)?;
        self.write_nibble(value & 0x0F)
    }

    fn write_nibble(&mut self, nibble: u8) -> Result<()> {
        for (bit, pin) in self.bus.data.iter_mut().enumerate() {
            pin.set_level(PinLevel::from(nibble & (1 << bit) != 0))?;
        }
        self.pulse_enable()
    }

    fn pulse_enable(&mut self) -> Result<()> {
        for level in [PinLevel::Low, PinLevel::High, PinLevel::Low] {
            self.bus.e.set_level(level)?;
            self.delay.delay_us(LCD_PULSE_HOLD_US);
        }
        Ok(())
    }
}

impl<P: OutputPin, D: Delay> CharacterDisplay for Lcd1602<P, D> {
    fn columns(&self) -> u8 {
        LCD_COLUMNS as u8
    }

    fn lines(&self) -> u8 {
        LCD_LINES as u8
    }

    fn clear(&mut self) -> Result<()> {
        Lcd1602::clear(self)
    }

    fn set_cursor(&mut self, col: u8, row: u8) -> Result<()> {
        Lcd1602::set_cursor(self, col, row)
    }

    fn write(&mut self, text: &str) -> Result<()> {
        Lcd1602::write(self, text)
    }

    fn display_on(&mut self) -> Result<()> {
        Lcd1602::display_on(self)
    }

    fn display_off(&mut self) -> Result<()> {
        Lcd1602::display_off(self)
    }

    fn cleanup(&mut self) -> Result<()> {
        Lcd1602::cleanup(self)
    }
}
