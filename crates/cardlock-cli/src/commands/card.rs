//! `cardlock read` and `cardlock write`: stand-alone card utilities.

use std::time::Duration;

use cardlock_core::Credential;
use cardlock_rfid::CredentialReader;
use clap::Args;
use tokio::time::sleep;

use crate::args::StoreArgs;
use crate::commands::is_quit;
use crate::console::{ConsoleInput, ConsoleTransceiver};

#[derive(Debug, Args)]
pub struct ReadArgs {
    /// Pause after each card, in milliseconds.
    #[arg(long, default_value_t = 3_000)]
    pub pause_ms: u64,
}

/// Print every card presented until Ctrl-C or end of input.
pub async fn read(args: &ReadArgs, store: &StoreArgs) -> anyhow::Result<()> {
    let mut reader = CredentialReader::new(store.transceiver(ConsoleInput::stdin())?);
    println!("Type a card ID to read it (Ctrl-C to stop)");

    tokio::select! {
        _ = read_loop(&mut reader, Duration::from_millis(args.pause_ms), |credential| {
            println!("{}", describe(&credential));
        }) => {}
        _ = tokio::signal::ctrl_c() => println!("\nProgram interrupted by user"),
    }

    reader.cleanup().await?;
    Ok(())
}

async fn read_loop(
    reader: &mut CredentialReader<ConsoleTransceiver>,
    pause: Duration,
    mut on_card: impl FnMut(Credential),
) {
    loop {
        match reader.read_credential().await {
            Some(credential) => {
                on_card(credential);
                sleep(pause).await;
            }
            None if reader.transceiver().input_closed() => break,
            None => {}
        }
    }
}

fn describe(credential: &Credential) -> String {
    format!(
        "ID: {}\nText: {}",
        credential.id,
        credential.payload.trim_end()
    )
}

/// Write text to cards until the operator quits or input ends.
pub async fn write(store: &StoreArgs) -> anyhow::Result<()> {
    let mut reader = CredentialReader::new(store.transceiver(ConsoleInput::stdin())?);
    let written = write_loop(&mut reader).await;
    if let Some(path) = reader.transceiver().wallet().path() {
        println!("{written} card(s) written, tag contents saved to {}", path.display());
    }
    reader.cleanup().await?;
    Ok(())
}

async fn write_loop(reader: &mut CredentialReader<ConsoleTransceiver>) -> usize {
    let mut written = 0;
    loop {
        let Some(text) = reader
            .transceiver_mut()
            .prompt("New data (or 'quit' to exit): ")
            .await
        else {
            println!();
            break;
        };
        if is_quit(&text) {
            break;
        }

        println!("Now type the card ID to write to");
        if reader.write_credential(&text).await {
            println!("Written");
            written += 1;
        } else {
            println!("Write failed");
        }
    }
    written
}
