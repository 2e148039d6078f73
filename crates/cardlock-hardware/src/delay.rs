//! Platform delay source.

use std::time::Duration;

use crate::traits::Delay;

/// Delay backed by [`std::thread::sleep`].
///
/// The OS may oversleep, never undersleep, which is the direction the LCD
/// timing contract tolerates.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDelay;

impl Delay for StdDelay {
    fn delay_us(&mut self, us: u64) {
        std::thread::sleep(Duration::from_micros(us));
    }
}
