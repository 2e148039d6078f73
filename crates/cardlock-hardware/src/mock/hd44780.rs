//! Behavioural model of an HD44780 character LCD controller.
//!
//! The model consumes the nibbles latched on the bus (one per falling edge of
//! the enable line) and maintains the controller's display data RAM, address
//! counter and flag registers, so tests can read back what a real panel would
//! show.

use std::fmt;

/// Width of one DDRAM line in two-line mode.
const LINE_LENGTH: u8 = 40;

/// DDRAM address of the second line.
const SECOND_LINE_BASE: u8 = 0x40;

/// Number of visible columns rendered by [`Hd44780Model::line`].
const VISIBLE_COLUMNS: usize = 16;

/// HD44780 controller state.
///
/// Starts in 8-bit interface mode exactly as the silicon does after power-on,
/// so the driver's initialization sequence must switch it to 4-bit mode
/// before byte-wide values decode correctly.
#[derive(Clone)]
pub struct Hd44780Model {
    ddram: [u8; 128],
    address: u8,
    four_bit: bool,
    pending_high: Option<u8>,
    two_line: bool,
    increment: bool,
    shift_on_write: bool,
    display_shift: i32,
    display_on: bool,
    cursor_on: bool,
    blink_on: bool,
    cgram_selected: bool,
    commands: Vec<u8>,
}

impl Default for Hd44780Model {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Hd44780Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hd44780Model")
            .field("line0", &self.line(0))
            .field("line1", &self.line(1))
            .field("address", &self.address)
            .field("four_bit", &self.four_bit)
            .field("display_on", &self.display_on)
            .finish()
    }
}

impl Hd44780Model {
    /// Power-on state: 8-bit interface, display off, DDRAM filled with spaces.
    pub fn new() -> Self {
        Self {
            ddram: [b' '; 128],
            address: 0,
            four_bit: false,
            pending_high: None,
            two_line: false,
            increment: true,
            shift_on_write: false,
            display_shift: 0,
            display_on: false,
            cursor_on: false,
            blink_on: false,
            cgram_selected: false,
            commands: Vec::new(),
        }
    }

    /// Feed one latched nibble.
    ///
    /// `data` reflects the register-select line: `false` for the instruction
    /// register, `true` for the data register.
    pub fn latch_nibble(&mut self, data: bool, nibble: u8) {
        let nibble = nibble & 0x0F;

        if !self.four_bit {
            // Only D4-D7 are wired, so D0-D3 read as zero.
            self.execute(data, nibble << 4);
            return;
        }

        match self.pending_high.take() {
            Some(high) => self.execute(data, (high << 4) | nibble),
            None => self.pending_high = Some(nibble),
        }
    }

    fn execute(&mut self, data: bool, value: u8) {
        if data {
            self.write_data(value);
        } else {
            self.commands.push(value);
            self.execute_command(value);
        }
    }

    fn write_data(&mut self, value: u8) {
        if self.cgram_selected {
            return;
        }

        self.ddram[usize::from(self.address)] = value;
        self.step_address(self.increment);

        if self.shift_on_write {
            self.display_shift += if self.increment { 1 } else { -1 };
        }
    }

    fn execute_command(&mut self, value: u8) {
        if value & 0x80 != 0 {
            self.cgram_selected = false;
            self.address = self.normalize_address(value & 0x7F);
        } else if value & 0x40 != 0 {
            self.cgram_selected = true;
        } else if value & 0x20 != 0 {
            self.four_bit = value & 0x10 == 0;
            self.two_line = value & 0x08 != 0;
            self.pending_high = None;
        } else if value & 0x10 != 0 {
            let right = value & 0x04 != 0;
            if value & 0x08 != 0 {
                // Moving the display right slides the window left over DDRAM.
                self.display_shift += if right { -1 } else { 1 };
            } else {
                self.step_address(right);
            }
        } else if value & 0x08 != 0 {
            self.display_on = value & 0x04 != 0;
            self.cursor_on = value & 0x02 != 0;
            self.blink_on = value & 0x01 != 0;
        } else if value & 0x04 != 0 {
            self.increment = value & 0x02 != 0;
            self.shift_on_write = value & 0x01 != 0;
        } else if value & 0x02 != 0 {
            self.address = 0;
            self.display_shift = 0;
        } else if value & 0x01 != 0 {
            self.ddram = [b' '; 128];
            self.address = 0;
            self.display_shift = 0;
            self.increment = true;
        }
    }

    fn normalize_address(&self, address: u8) -> u8 {
        if !self.two_line {
            return address % 80;
        }
        if address >= SECOND_LINE_BASE {
            SECOND_LINE_BASE + (address - SECOND_LINE_BASE) % LINE_LENGTH
        } else {
            address % LINE_LENGTH
        }
    }

    fn step_address(&mut self, forward: bool) {
        let last_first = LINE_LENGTH - 1;
        let last_second = SECOND_LINE_BASE + LINE_LENGTH - 1;

        self.address = match (forward, self.address) {
            (true, a) if a == last_first => SECOND_LINE_BASE,
            (true, a) if a == last_second => 0,
            (true, a) => a + 1,
            (false, 0) => last_second,
            (false, a) if a == SECOND_LINE_BASE => last_first,
            (false, a) => a - 1,
        };
    }

    /// The 16 visible characters of `row` (0 or 1), honouring display shift.
    pub fn line(&self, row: usize) -> String {
        let base = if row == 0 { 0 } else { SECOND_LINE_BASE };
        (0..VISIBLE_COLUMNS)
            .map(|col| {
                let offset = (col as i32 + self.display_shift).rem_euclid(i32::from(LINE_LENGTH));
                let byte = self.ddram[usize::from(base) + offset as usize];
                if byte.is_ascii_graphic() || byte == b' ' {
                    char::from(byte)
                } else {
                    '?'
                }
            })
            .collect()
    }

    /// Both visible lines.
    pub fn lines(&self) -> [String; 2] {
        [self.line(0), self.line(1)]
    }

    /// Current DDRAM address counter.
    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn is_four_bit(&self) -> bool {
        self.four_bit
    }

    pub fn is_two_line(&self) -> bool {
        self.two_line
    }

    pub fn display_on(&self) -> bool {
        self.display_on
    }

    pub fn cursor_on(&self) -> bool {
        self.cursor_on
    }

    pub fn blink_on(&self) -> bool {
        self.blink_on
    }

    /// Entry mode: `true` when the address counter increments.
    pub fn increments(&self) -> bool {
        self.increment
    }

    /// Entry mode: `true` when the display shifts on each write.
    pub fn shifts_on_write(&self) -> bool {
        self.shift_on_write
    }

    /// Current display shift, positive when content has moved left.
    pub fn display_shift(&self) -> i32 {
        self.display_shift
    }

    /// Every instruction byte executed so far, in order.
    pub fn commands(&self) -> &[u8] {
        &self.commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn send_byte(model: &mut Hd44780Model, data: bool, value: u8) {
        model.latch_nibble(data, value >> 4);
        model.latch_nibble(data, value & 0x0F);
    }

    fn initialized() -> Hd44780Model {
        let mut model = Hd44780Model::new();
        for value in [0x33, 0x32, 0x28, 0x0C, 0x06, 0x01] {
            send_byte(&mut model, false, value);
        }
        model
    }

    #[test]
    fn test_init_sequence_enters_four_bit_mode() {
        let model = initialized();
        assert!(model.is_four_bit());
        assert!(model.is_two_line());
        assert!(model.display_on());
        assert!(!model.cursor_on());
        assert!(model.increments());
        assert_eq!(model.commands(), &[0x30, 0x30, 0x30, 0x20, 0x28, 0x0C, 0x06, 0x01]);
    }

    #[test]
    fn test_write_and_second_line() {
        let mut model = initialized();
        for b in b"Hi" {
            send_byte(&mut model, true, *b);
        }
        send_byte(&mut model, false, 0xC0);
        for b in b"there" {
            send_byte(&mut model, true, *b);
        }
        assert_eq!(model.line(0), "Hi              ");
        assert_eq!(model.line(1), "there           ");
    }

    #[test]
    fn test_address_wraps_between_lines() {
        let mut model = initialized();
        send_byte(&mut model, false, 0x80 | 0x27);
        send_byte(&mut model, true, b'A');
        assert_eq!(model.address(), 0x40);
        send_byte(&mut model, false, 0x80 | 0x67);
        send_byte(&mut model, true, b'B');
        assert_eq!(model.address(), 0x00);
    }

    #[test]
    fn test_display_shift() {
        let mut model = initialized();
        for b in b"ABC" {
            send_byte(&mut model, true, *b);
        }
        send_byte(&mut model, false, 0x18); // shift left
        assert_eq!(model.line(0), "BC              ");
        send_byte(&mut model, false, 0x1C); // shift right
        send_byte(&mut model, false, 0x1C);
        assert_eq!(model.line(0), " ABC            ");
    }

    #[test]
    fn test_clear_resets_ram_and_shift() {
        let mut model = initialized();
        send_byte(&mut model, true, b'X');
        send_byte(&mut model, false, 0x18);
        send_byte(&mut model, false, 0x01);
        assert_eq!(model.line(0), " ".repeat(16));
        assert_eq!(model.display_shift(), 0);
        assert_eq!(model.address(), 0);
    }

    #[test]
    fn test_cgram_writes_do_not_touch_ddram() {
        let mut model = initialized();
        send_byte(&mut model, false, 0x40);
        send_byte(&mut model, true, 0x1F);
        send_byte(&mut model, false, 0x80);
        assert_eq!(model.line(0), " ".repeat(16));
    }
}
