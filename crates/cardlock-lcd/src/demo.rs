//! Display self-test: welcome banner, typewriter animation and scrolling.

use std::time::Duration;

use cardlock_hardware::{Delay, OutputPin, Result};
use tokio::time::sleep;
use tracing::info;

use crate::lcd1602::Lcd1602;

const WELCOME: &str = "Welcome to --->\nRFID Servo Lock";
const ANIMATED_LINES: [&str; 2] = [" Hello, World!", "LCD1602 Test"];
const SCROLL_STEPS: usize = 3;

/// Pauses between the demo's steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoTiming {
    /// How long the welcome banner stays up.
    pub welcome: Duration,
    /// Pause after each animated character.
    pub per_char: Duration,
    /// Pause after the animation completes.
    pub hold: Duration,
    /// Pause after each scroll step.
    pub scroll_step: Duration,
    /// Pause before returning.
    pub finish: Duration,
}

impl Default for DemoTiming {
    fn default() -> Self {
        Self {
            welcome: Duration::from_secs(3),
            per_char: Duration::from_millis(100),
            hold: Duration::from_secs(2),
            scroll_step: Duration::from_millis(500),
            finish: Duration::from_secs(1),
        }
    }
}

/// Run the display demo. The caller clears and releases the display
/// afterwards.
///
/// # Errors
///
/// Returns the first pin fault.
pub async fn run_demo<P: OutputPin, D: Delay>(
    lcd: &mut Lcd1602<P, D>,
    timing: DemoTiming,
) -> Result<()> {
    lcd.clear()?;
    lcd.write(WELCOME)?;
    sleep(timing.welcome).await;

    lcd.clear()?;
    for (row, line) in ANIMATED_LINES.iter().enumerate() {
        for (col, ch) in line.chars().enumerate() {
            lcd.set_cursor(col as u8, row as u8)?;
            lcd.write(ch.encode_utf8(&mut [0; 4]))?;
            sleep(timing.per_char).await;
        }
    }
    sleep(timing.hold).await;

    info!("Scrolling demo");
    for _ in 0..SCROLL_STEPS {
        lcd.scroll_left()?;
        sleep(timing.scroll_step).await;
    }
    for _ in 0..SCROLL_STEPS {
        lcd.scroll_right()?;
        sleep(timing.scroll_step).await;
    }

    sleep(timing.finish).await;
    Ok(())
}
