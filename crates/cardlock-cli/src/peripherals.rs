//! Bring-up of the emulated peripherals and the on-terminal screen mirror.

use std::time::Duration;

use cardlock_core::HardwareConfig;
use cardlock_hardware::StdDelay;
use cardlock_hardware::mock::{MockGpio, MockPin, MockPwm, VirtualLcd};
use cardlock_lcd::{Lcd1602, LcdBus};
use cardlock_servo::{ServoConfig, ServoLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub type Panel = Lcd1602<MockPin, StdDelay>;

/// Emulated GPIO bank with an HD44780 model on the LCD pins.
pub struct Bench {
    pub gpio: MockGpio,
    pub screen: VirtualLcd,
    pub hardware: HardwareConfig,
}

impl Bench {
    pub fn new(hardware: HardwareConfig) -> Self {
        let gpio = MockGpio::new();
        let screen = gpio.attach_lcd(hardware.lcd);
        info!(numbering = %hardware.numbering, "Emulated GPIO bank ready");
        Self {
            gpio,
            screen,
            hardware,
        }
    }

    /// Claim the LCD pins and initialize the panel.
    pub fn open_display(&self) -> anyhow::Result<Panel> {
        let bus = LcdBus::claim(&self.hardware.lcd, |pin| self.gpio.output(pin))?;
        Ok(Lcd1602::new(bus, StdDelay)?)
    }

    /// Claim the servo pin and drive the shaft to the locked position.
    pub async fn open_lock(&self) -> anyhow::Result<ServoLock<MockPwm>> {
        let config = ServoConfig::from_hardware(&self.hardware);
        let pwm = self.gpio.pwm(self.hardware.servo_pin, config.frequency_hz)?;
        Ok(ServoLock::new(pwm, config).await?)
    }

    /// Print the panel to the terminal whenever it changes, until `stop`.
    pub fn mirror_screen(&self, stop: CancellationToken) -> JoinHandle<()> {
        let screen = self.screen.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(200));
            let mut last: Option<[String; 2]> = None;
            loop {
                tokio::select! {
                    _ = stop.cancelled() => break,
                    _ = interval.tick() => {}
                }
                let lines = screen.lines();
                if last.as_ref() != Some(&lines) {
                    println!("{}", render_screen(&lines));
                    last = Some(lines);
                }
            }
        })
    }
}

/// Draw two panel lines inside a box.
pub fn render_screen(lines: &[String; 2]) -> String {
    let width = lines.iter().map(|line| line.chars().count()).max().unwrap_or(0);
    let border = format!("+{}+", "-".repeat(width));
    format!("{border}\n|{}|\n|{}|\n{border}", lines[0], lines[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_screen() {
        let lines = ["Ready           ".to_string(), "Present card    ".to_string()];
        assert_eq!(
            render_screen(&lines),
            "+----------------+\n|Ready           |\n|Present card    |\n+----------------+"
        );
    }

    #[tokio::test]
    async fn test_bench_opens_peripherals() {
        let bench = Bench::new(HardwareConfig::default());
        let mut display = bench.open_display().unwrap();
        let lock = bench.open_lock().await.unwrap();

        assert!(lock.is_locked());
        assert_eq!(bench.gpio.duty_cycle(18), Some(2.5));

        display.write("hi").unwrap();
        assert_eq!(bench.screen.text()[0], "hi");
    }
}
