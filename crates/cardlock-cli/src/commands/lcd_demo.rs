//! `cardlock lcd-demo`: display self-test.

use cardlock_lcd::{DemoTiming, run_demo};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::args::HardwareArgs;
use crate::peripherals::Bench;

/// Play the demo once, or until Ctrl-C, then blank and release the panel.
pub async fn execute(hardware: &HardwareArgs) -> anyhow::Result<()> {
    let bench = Bench::new(hardware.to_config()?);
    let mut lcd = bench.open_display()?;
    let stop = CancellationToken::new();
    let mirror = bench.mirror_screen(stop.clone());

    let result = tokio::select! {
        result = run_demo(&mut lcd, DemoTiming::default()) => result,
        _ = tokio::signal::ctrl_c() => {
            println!("\nProgram interrupted by user");
            Ok(())
        }
    };

    stop.cancel();
    let _ = mirror.await;

    if let Err(err) = lcd.clear() {
        warn!(error = %err, "Display clear failed");
    }
    lcd.cleanup()?;
    Ok(result?)
}
