//! Character display abstraction.

use cardlock_hardware::Result;

/// A line-oriented character display.
///
/// Every operation can fail with a pin fault; the control loop treats those
/// as non-fatal.
pub trait CharacterDisplay {
    /// Visible columns per line.
    fn columns(&self) -> u8;

    /// Number of lines.
    fn lines(&self) -> u8;

    /// Blank the screen and home the cursor.
    fn clear(&mut self) -> Result<()>;

    /// Move the cursor. Rows past the last line are clamped to it.
    fn set_cursor(&mut self, col: u8, row: u8) -> Result<()>;

    /// Write text at the cursor. `'\n'` moves to the start of the second line.
    fn write(&mut self, text: &str) -> Result<()>;

    /// Turn the panel on without touching its contents.
    fn display_on(&mut self) -> Result<()>;

    /// Turn the panel off without touching its contents.
    fn display_off(&mut self) -> Result<()>;

    /// Release the display's pins.
    fn cleanup(&mut self) -> Result<()>;

    /// Replace the screen with two lines of text.
    fn show(&mut self, first: &str, second: &str) -> Result<()> {
        self.clear()?;
        self.write(first)?;
        self.set_cursor(0, 1)?;
        self.write(second)
    }
}
