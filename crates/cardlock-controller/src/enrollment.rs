//! Card enrollment workflow.
//!
//! Enrolling a card takes two presentations: the first reads the card's
//! identifier so the password hash can be stored under it, the second writes
//! the password onto the tag so the card carries its own credential.

use cardlock_auth::{AuthError, Authenticator, CredentialStore, check_password};
use cardlock_core::CardId;
use cardlock_hardware::CardTransceiver;
use cardlock_rfid::CredentialReader;
use tracing::{info, warn};

/// How an enrollment attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollOutcome {
    /// Hash stored and password written to the card.
    Enrolled(CardId),
    /// The card could not be read; nothing was stored.
    ReadFailed,
    /// The hash was stored but the password could not be written to the
    /// card. Enrolling again overwrites the record.
    WriteFailed(CardId),
}

/// Enroll the next card presented to `reader` with `password`.
///
/// The password is checked before any card is read, so a blank or oversized
/// password never waits on the reader.
///
/// # Errors
///
/// Returns an error if:
/// - The password is empty after trimming or longer than a tag holds
/// - The credential store cannot be written
pub async fn enroll_card<T, S>(
    reader: &mut CredentialReader<T>,
    auth: &mut Authenticator<S>,
    password: &str,
) -> Result<EnrollOutcome, AuthError>
where
    T: CardTransceiver,
    S: CredentialStore,
{
    let password = check_password(password)?;

    info!("Place the card on the reader to read its ID");
    let Some(credential) = reader.read_credential().await else {
        warn!("Failed to read card ID, enrollment aborted");
        return Ok(EnrollOutcome::ReadFailed);
    };
    let card = credential.id;

    auth.enroll(card, password)?;

    info!(card_id = %card, "Place the card on the reader again to write the password");
    if reader.write_credential(password).await {
        info!(card_id = %card, "Card enrolled");
        Ok(EnrollOutcome::Enrolled(card))
    } else {
        warn!(card_id = %card, "Password hash stored but card write failed");
        Ok(EnrollOutcome::WriteFailed(card))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardlock_auth::MemoryStore;
    use cardlock_hardware::mock::{MockCardHandle, MockCardTransceiver};

    const CARD: CardId = CardId::new(42);

    fn setup() -> (
        CredentialReader<MockCardTransceiver>,
        MockCardHandle,
        Authenticator<MemoryStore>,
    ) {
        let (transceiver, handle) = MockCardTransceiver::new();
        (
            CredentialReader::new(transceiver),
            handle,
            Authenticator::new(MemoryStore::new()),
        )
    }

    #[tokio::test]
    async fn test_enroll_stores_hash_and_writes_card() {
        let (mut reader, handle, mut auth) = setup();
        handle.present_card(CARD).await.unwrap();
        handle.present_card(CARD).await.unwrap();

        let outcome = enroll_card(&mut reader, &mut auth, "  secret \n").await.unwrap();

        assert_eq!(outcome, EnrollOutcome::Enrolled(CARD));
        assert_eq!(auth.enrolled_cards().unwrap(), vec![CARD]);
        let stored = handle.stored_text(CARD).unwrap();
        assert_eq!(stored.trim_end(), "secret");
        assert!(auth.authorize(CARD, &stored));
    }

    #[tokio::test]
    async fn test_blank_password_rejected_before_read() {
        let (mut reader, handle, mut auth) = setup();
        handle.present_card(CARD).await.unwrap();

        let result = enroll_card(&mut reader, &mut auth, "   ").await;
        assert!(matches!(result, Err(AuthError::EmptyPassword)));

        // The presented card is still waiting to be read.
        let credential = reader.read_credential().await.unwrap();
        assert_eq!(credential.id, CARD);
    }

    #[tokio::test]
    async fn test_password_longer_than_tag_rejected_before_read() {
        let (mut reader, handle, mut auth) = setup();
        handle.present_card(CARD).await.unwrap();

        let result = enroll_card(&mut reader, &mut auth, &"p".repeat(49)).await;
        assert!(matches!(
            result,
            Err(AuthError::PasswordTooLong { length: 49, .. })
        ));
        assert!(auth.enrolled_cards().unwrap().is_empty());
        assert_eq!(reader.read_credential().await.unwrap().id, CARD);
    }

    #[tokio::test]
    async fn test_full_capacity_password_authorizes_from_card() {
        let (mut reader, handle, mut auth) = setup();
        let password = "p".repeat(48);
        handle.present_card(CARD).await.unwrap();
        handle.present_card(CARD).await.unwrap();

        let outcome = enroll_card(&mut reader, &mut auth, &password).await.unwrap();
        assert_eq!(outcome, EnrollOutcome::Enrolled(CARD));

        handle.present_card(CARD).await.unwrap();
        let credential = reader.read_credential().await.unwrap();
        assert_eq!(credential.payload, password);
        assert!(auth.authorize(credential.id, &credential.payload));
    }

    #[tokio::test]
    async fn test_read_failure_stores_nothing() {
        let (mut reader, handle, mut auth) = setup();
        handle.inject_fault("collision").await.unwrap();

        let outcome = enroll_card(&mut reader, &mut auth, "secret").await.unwrap();
        assert_eq!(outcome, EnrollOutcome::ReadFailed);
        assert!(auth.enrolled_cards().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_failure_keeps_record() {
        let (mut reader, handle, mut auth) = setup();
        handle.present_card(CARD).await.unwrap();
        handle.inject_fault("card removed").await.unwrap();

        let outcome = enroll_card(&mut reader, &mut auth, "secret").await.unwrap();
        assert_eq!(outcome, EnrollOutcome::WriteFailed(CARD));
        assert!(auth.authorize(CARD, "secret"));
    }
}
