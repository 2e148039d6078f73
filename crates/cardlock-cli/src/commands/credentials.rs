//! `cardlock enroll`, `revoke` and `list`: credential administration.

use cardlock_auth::{AuthError, Authenticator, CredentialStore, check_password};
use cardlock_controller::{EnrollOutcome, enroll_card};
use cardlock_core::CardId;
use cardlock_rfid::CredentialReader;

use crate::args::StoreArgs;
use crate::commands::is_quit;
use crate::console::{ConsoleInput, ConsoleTransceiver};

/// Enroll cards until the operator quits or input ends.
pub async fn enroll(store: &StoreArgs) -> anyhow::Result<()> {
    let mut reader = CredentialReader::new(store.transceiver(ConsoleInput::stdin())?);
    let mut auth = store.authenticator();

    println!("Card enrollment. Credentials are saved to {}", store.credentials.display());
    enroll_loop(&mut reader, &mut auth).await?;

    reader.cleanup().await?;
    Ok(())
}

/// Prompt for passwords and enroll one card per password.
///
/// Returns the cards enrolled, in order.
pub async fn enroll_loop<S: CredentialStore>(
    reader: &mut CredentialReader<ConsoleTransceiver>,
    auth: &mut Authenticator<S>,
) -> anyhow::Result<Vec<CardId>> {
    let mut enrolled = Vec::new();

    loop {
        let Some(reply) = reader
            .transceiver_mut()
            .prompt("Enter a password for the card (or 'quit' to exit): ")
            .await
        else {
            println!();
            break;
        };
        if is_quit(&reply) {
            break;
        }

        if let Err(err) = check_password(&reply) {
            println!("{err}");
            continue;
        }

        println!("Type the card ID, then type it again to write the password");
        match enroll_card(reader, auth, &reply).await {
            Ok(EnrollOutcome::Enrolled(card)) => {
                println!("Card {card} enrolled");
                enrolled.push(card);
            }
            Ok(EnrollOutcome::ReadFailed) => println!("Could not read the card, try again"),
            Ok(EnrollOutcome::WriteFailed(card)) => {
                println!("Hash stored for card {card}, but writing the card failed; enroll it again");
            }
            Err(err @ (AuthError::EmptyPassword | AuthError::PasswordTooLong { .. })) => {
                println!("{err}");
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(enrolled)
}

/// Remove a card's credential record.
pub fn revoke(store: &StoreArgs, card: CardId) -> anyhow::Result<()> {
    let mut auth = store.authenticator();
    if auth.revoke(card)? {
        println!("Card {card} revoked");
    } else {
        println!("Card {card} was not enrolled");
    }
    Ok(())
}

/// Print every enrolled card ID.
pub fn list(store: &StoreArgs) -> anyhow::Result<()> {
    let cards = store.authenticator().enrolled_cards()?;
    if cards.is_empty() {
        println!("No cards enrolled in {}", store.credentials.display());
    }
    for card in cards {
        println!("{card}");
    }
    Ok(())
}
