//! Card enrollment and authorization against a [`CredentialStore`].

use cardlock_core::CardId;
use cardlock_core::constants::{HASH_HEX_LENGTH, TAG_TEXT_CAPACITY};
use tracing::{debug, info, warn};

use crate::error::{AuthError, Result};
use crate::hash::{card_hash_key, card_salt, hash_password, parse_card_hash_key, verify_password};
use crate::store::CredentialStore;

/// Enrolls cards and decides whether a presented card is authorized.
///
/// Passwords are trimmed before hashing and before verification, since tags
/// hand back their text padded with spaces.
#[derive(Debug)]
pub struct Authenticator<S: CredentialStore> {
    store: S,
}

impl<S: CredentialStore> Authenticator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Authorize `card` with `password`, replacing any earlier record for it.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The password is empty after trimming or does not fit on a tag
    /// - The store cannot be written
    pub fn enroll(&mut self, card: CardId, password: &str) -> Result<()> {
        let password = check_password(password)?;

        let hash = hash_password(password, &card_salt(card));
        self.store.save(&card_hash_key(card), &hash)?;
        info!(card_id = %card, "Password hash saved for card");
        Ok(())
    }

    /// Check the password read from `card` against its stored record.
    ///
    /// Fails closed: a missing, unreadable or malformed record denies access.
    pub fn authorize(&self, card: CardId, supplied: &str) -> bool {
        let stored = match self.store.load(&card_hash_key(card)) {
            Ok(Some(stored)) => stored,
            Ok(None) => {
                debug!(card_id = %card, "No credential record for card");
                return false;
            }
            Err(err) => {
                warn!(card_id = %card, error = %err, "Credential store unreadable");
                return false;
            }
        };

        if !is_well_formed_hash(&stored) {
            warn!(card_id = %card, "Malformed credential record");
            return false;
        }

        verify_password(
            supplied.trim(),
            &card_salt(card),
            &stored.to_ascii_lowercase(),
        )
    }

    /// Remove the record for `card`. Returns `true` if one existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn revoke(&mut self, card: CardId) -> Result<bool> {
        let removed = self.store.remove(&card_hash_key(card))?;
        if removed {
            info!(card_id = %card, "Card authorization revoked");
        }
        Ok(removed)
    }

    /// Cards with a record in the store, in ascending order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn enrolled_cards(&self) -> Result<Vec<CardId>> {
        let mut cards: Vec<CardId> = self
            .store
            .keys()?
            .iter()
            .filter_map(|key| parse_card_hash_key(key))
            .collect();
        cards.sort_unstable();
        cards.dedup();
        Ok(cards)
    }
}

/// Trim `password` and check that a tag can carry it.
///
/// A password longer than [`TAG_TEXT_CAPACITY`] would be cut short when
/// written to the card and never match its hash again.
///
/// # Errors
///
/// Returns [`AuthError::EmptyPassword`] or [`AuthError::PasswordTooLong`].
pub fn check_password(password: &str) -> Result<&str> {
    let password = password.trim();
    if password.is_empty() {
        return Err(AuthError::EmptyPassword);
    }
    let length = password.chars().count();
    if length > TAG_TEXT_CAPACITY {
        return Err(AuthError::PasswordTooLong {
            length,
            capacity: TAG_TEXT_CAPACITY,
        });
    }
    Ok(password)
}

fn is_well_formed_hash(value: &str) -> bool {
    value.len() == HASH_HEX_LENGTH && value.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    const CARD: CardId = CardId::new(123_456_789);

    fn enrolled() -> Authenticator<MemoryStore> {
        let mut auth = Authenticator::new(MemoryStore::new());
        auth.enroll(CARD, "testpassword").unwrap();
        auth
    }

    #[test]
    fn test_enroll_stores_salted_hash() {
        let auth = enrolled();
        assert_eq!(
            auth.store().load("RFID_CARD_123456789_HASH").unwrap().as_deref(),
            Some("d429d12dabbb04c8202c542895fef1c53e8327456b7855c7be2bcb26a0a03f60")
        );
    }

    #[test]
    fn test_enroll_rejects_blank_password() {
        let mut auth = Authenticator::new(MemoryStore::new());
        assert!(matches!(
            auth.enroll(CARD, "   \t"),
            Err(AuthError::EmptyPassword)
        ));
        assert!(auth.enrolled_cards().unwrap().is_empty());
    }

    #[test]
    fn test_enroll_rejects_password_longer_than_tag() {
        let mut auth = Authenticator::new(MemoryStore::new());
        assert!(matches!(
            auth.enroll(CARD, &"p".repeat(49)),
            Err(AuthError::PasswordTooLong {
                length: 49,
                capacity: 48
            })
        ));
        assert!(auth.enrolled_cards().unwrap().is_empty());

        auth.enroll(CARD, &"p".repeat(48)).unwrap();
        assert!(auth.authorize(CARD, &"p".repeat(48)));
    }

    #[test]
    fn test_check_password_trims_before_measuring() {
        let padded = format!("  {}  ", "p".repeat(48));
        assert_eq!(check_password(&padded).unwrap(), "p".repeat(48));
    }

    #[test]
    fn test_enroll_trims_password() {
        let mut auth = Authenticator::new(MemoryStore::new());
        auth.enroll(CARD, "  testpassword\n").unwrap();
        assert!(auth.authorize(CARD, "testpassword"));
    }

    #[test]
    fn test_authorize() {
        let auth = enrolled();
        assert!(auth.authorize(CARD, "testpassword"));
        assert!(auth.authorize(CARD, "testpassword                    "));
        assert!(!auth.authorize(CARD, "wrongpassword"));
        assert!(!auth.authorize(CardId::new(987_654_321), "testpassword"));
    }

    #[test]
    fn test_re_enroll_replaces_record() {
        let mut auth = enrolled();
        auth.enroll(CARD, "newpassword").unwrap();
        assert!(!auth.authorize(CARD, "testpassword"));
        assert!(auth.authorize(CARD, "newpassword"));
        assert_eq!(auth.enrolled_cards().unwrap(), vec![CARD]);
    }

    #[test]
    fn test_uppercase_record_accepted() {
        let mut store = MemoryStore::new();
        store
            .save(
                "RFID_CARD_123456789_HASH",
                "D429D12DABBB04C8202C542895FEF1C53E8327456B7855C7BE2BCB26A0A03F60",
            )
            .unwrap();
        let auth = Authenticator::new(store);
        assert!(auth.authorize(CARD, "testpassword"));
    }

    #[test]
    fn test_malformed_record_fails_closed() {
        let mut store = MemoryStore::new();
        store.save("RFID_CARD_123456789_HASH", "not-a-hash").unwrap();
        let auth = Authenticator::new(store);
        assert!(!auth.authorize(CARD, "testpassword"));
    }

    #[test]
    fn test_revoke() {
        let mut auth = enrolled();
        assert!(auth.revoke(CARD).unwrap());
        assert!(!auth.revoke(CARD).unwrap());
        assert!(!auth.authorize(CARD, "testpassword"));
    }

    #[test]
    fn test_enrolled_cards_sorted_and_filtered() {
        let mut store = MemoryStore::new();
        store.save("UNRELATED", "x").unwrap();
        let mut auth = Authenticator::new(store);
        auth.enroll(CardId::new(9), "a").unwrap();
        auth.enroll(CardId::new(3), "b").unwrap();
        assert_eq!(
            auth.enrolled_cards().unwrap(),
            vec![CardId::new(3), CardId::new(9)]
        );
    }
}
