//! `cardlock run`: the appliance itself.

use std::time::Duration;

use cardlock_auth::{Authenticator, CredentialStore};
use cardlock_controller::{Controller, ControllerConfig, RunOutcome, StatusMessage};
use cardlock_core::constants::LCD_COLUMNS;
use cardlock_hardware::mock::MockPwm;
use cardlock_lcd::CharacterDisplay;
use cardlock_rfid::CredentialReader;
use cardlock_servo::ServoLock;
use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::args::{HardwareArgs, StoreArgs};
use crate::console::{ConsoleInput, ConsoleTransceiver};
use crate::peripherals::{Bench, Panel};

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Longest a single reader poll waits for a card, in milliseconds.
    #[arg(long, env = "CARDLOCK_POLL_INTERVAL_MS", default_value_t = 100)]
    pub poll_interval_ms: u64,

    /// How long a grant or denial stays on screen, in milliseconds.
    #[arg(long, env = "CARDLOCK_RESULT_PAUSE_MS", default_value_t = 2_000)]
    pub result_pause_ms: u64,

    /// Do not print the LCD contents to the terminal.
    #[arg(long)]
    pub no_screen: bool,
}

impl RunArgs {
    fn controller_config(&self) -> ControllerConfig {
        ControllerConfig::default()
            .with_poll_interval(Duration::from_millis(self.poll_interval_ms))
            .with_result_pause(Duration::from_millis(self.result_pause_ms))
    }
}

/// Run the appliance until Ctrl-C or a fatal fault.
///
/// Both endings are a successful exit; only the log tells them apart.
pub async fn execute(
    args: &RunArgs,
    hardware: &HardwareArgs,
    store: &StoreArgs,
) -> anyhow::Result<()> {
    info!(version = cardlock_core::VERSION, "Starting RFID servo lock");

    // Installed before any peripheral is opened.
    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => signal.cancel(),
            Err(err) => warn!(error = %err, "Cannot listen for Ctrl-C"),
        }
    });

    let bench = Bench::new(hardware.to_config()?);
    let reader = CredentialReader::new(store.transceiver(ConsoleInput::stdin())?);
    let mirror = (!args.no_screen).then(|| bench.mirror_screen(shutdown.child_token()));

    info!(
        credentials = %store.credentials.display(),
        "Type a card ID and press Enter to present it; Ctrl-C to stop"
    );

    let result = serve(
        &bench,
        reader,
        store.authenticator(),
        args.controller_config(),
        shutdown.clone(),
    )
    .await;

    shutdown.cancel();
    if let Some(mirror) = mirror {
        if let Err(err) = mirror.await {
            warn!(error = %err, "Screen mirror task failed");
        }
    }

    match result? {
        RunOutcome::Interrupted => info!("Program interrupted by user"),
        RunOutcome::Fatal(reason) => error!(%reason, "Appliance stopped after a fatal error"),
    }
    Ok(())
}

/// Bring up the display and lock, then run the control loop on them.
async fn serve<S: CredentialStore>(
    bench: &Bench,
    reader: CredentialReader<ConsoleTransceiver>,
    auth: Authenticator<S>,
    config: ControllerConfig,
    shutdown: CancellationToken,
) -> anyhow::Result<RunOutcome> {
    let (display, lock) = open_peripherals(bench).await?;
    let mut controller = Controller::new(reader, auth, display, lock, config);
    Ok(controller.run(shutdown).await)
}

/// Open the display, show the start-up screen, then open the lock.
///
/// If the lock cannot be opened the display is blanked and released before
/// the error is returned.
async fn open_peripherals(bench: &Bench) -> anyhow::Result<(Panel, ServoLock<MockPwm>)> {
    let mut display = bench.open_display()?;
    let [first, second] = StatusMessage::Starting.lines(LCD_COLUMNS);
    if let Err(err) = display.show(&first, &second) {
        warn!(error = %err, "Display update failed");
    }

    match bench.open_lock().await {
        Ok(lock) => Ok((display, lock)),
        Err(err) => {
            release_display(&mut display);
            Err(err)
        }
    }
}

fn release_display(display: &mut Panel) {
    if let Err(err) = display.clear() {
        warn!(error = %err, "Display clear failed");
    }
    if let Err(err) = display.display_off() {
        warn!(error = %err, "Display power-off failed");
    }
    if let Err(err) = display.cleanup() {
        warn!(error = %err, "Display cleanup failed");
    }
}
