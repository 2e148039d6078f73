//! `cardlock`: RFID servo lock appliance and its operator tools.
//!
//! Peripherals are emulated: the LCD and servo sit on an in-process GPIO bank
//! whose screen is mirrored to the terminal, and cards are presented by typing
//! their ID on stdin.

mod args;
mod commands;
mod console;
mod peripherals;

use cardlock_core::CardId;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::args::{HardwareArgs, StoreArgs};
use crate::commands::card::ReadArgs;
use crate::commands::run::RunArgs;

#[derive(Debug, Parser)]
#[command(name = "cardlock", version, about = "RFID servo lock appliance")]
struct Cli {
    /// Log filter used when RUST_LOG is not set.
    #[arg(long, env = "CARDLOCK_LOG_LEVEL", default_value = "info", global = true)]
    log_level: String,

    #[command(flatten)]
    hardware: HardwareArgs,

    #[command(flatten)]
    store: StoreArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the lock: poll for cards, verify them and toggle the lock.
    Run(RunArgs),

    /// Enroll cards interactively: set a password, store its hash, write the card.
    Enroll,

    /// Remove a card's credential record.
    Revoke {
        /// Card identifier.
        card: CardId,
    },

    /// List enrolled card IDs.
    List,

    /// Print the ID and stored text of each presented card.
    Read(ReadArgs),

    /// Write text to presented cards.
    Write,

    /// Run the LCD demo.
    LcdDemo,

    /// Drive the lock from an interactive console.
    Servo,
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match &cli.command {
        Commands::Run(args) => commands::run::execute(args, &cli.hardware, &cli.store).await,
        Commands::Enroll => commands::credentials::enroll(&cli.store).await,
        Commands::Revoke { card } => commands::credentials::revoke(&cli.store, *card),
        Commands::List => commands::credentials::list(&cli.store),
        Commands::Read(args) => commands::card::read(args, &cli.store).await,
        Commands::Write => commands::card::write(&cli.store).await,
        Commands::LcdDemo => commands::lcd_demo::execute(&cli.hardware).await,
        Commands::Servo => commands::servo::execute(&cli.hardware).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_revoke() {
        let cli = Cli::try_parse_from(["cardlock", "revoke", "123456789"]).unwrap();
        match cli.command {
            Commands::Revoke { card } => assert_eq!(card, CardId::new(123_456_789)),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_run_with_hardware_options() {
        let cli = Cli::try_parse_from([
            "cardlock",
            "--numbering",
            "board",
            "--credentials",
            "/tmp/creds.env",
            "run",
            "--result-pause-ms",
            "500",
        ])
        .unwrap();

        assert_eq!(cli.hardware.numbering, args::Numbering::Board);
        assert_eq!(cli.store.credentials, std::path::PathBuf::from("/tmp/creds.env"));
        match cli.command {
            Commands::Run(run) => assert_eq!(run.result_pause_ms, 500),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_rejects_non_numeric_card() {
        assert!(Cli::try_parse_from(["cardlock", "revoke", "abc"]).is_err());
    }
}
