//! Salted password hashing.

use cardlock_core::CardId;
use cardlock_core::constants::{CARD_HASH_KEY_PREFIX, CARD_HASH_KEY_SUFFIX};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// SHA-256 of `password` followed by `salt`, as 64 lowercase hex characters.
///
/// # Examples
///
/// ```
/// use cardlock_auth::hash_password;
///
/// assert_eq!(
///     hash_password("testpassword", "123456789"),
///     "d429d12dabbb04c8202c542895fef1c53e8327456b7855c7be2bcb26a0a03f60"
/// );
/// ```
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    hex::encode(hasher.finalize())
}

/// Recompute the hash of `password` and compare it with `expected` in
/// constant time.
pub fn verify_password(password: &str, salt: &str, expected: &str) -> bool {
    let computed = hash_password(password, salt);
    computed.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// Salt used for a card's password: its decimal identifier.
pub fn card_salt(card: CardId) -> String {
    card.to_string()
}

/// Credential-file key holding the hash for `card`.
///
/// ```
/// use cardlock_auth::card_hash_key;
/// use cardlock_core::CardId;
///
/// assert_eq!(card_hash_key(CardId::new(42)), "RFID_CARD_42_HASH");
/// ```
pub fn card_hash_key(card: CardId) -> String {
    format!("{CARD_HASH_KEY_PREFIX}{card}{CARD_HASH_KEY_SUFFIX}")
}

/// Card identifier named by a credential-file key, if it is a card hash key.
pub fn parse_card_hash_key(key: &str) -> Option<CardId> {
    key.strip_prefix(CARD_HASH_KEY_PREFIX)?
        .strip_suffix(CARD_HASH_KEY_SUFFIX)?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(
        "testpassword",
        "123456789",
        "d429d12dabbb04c8202c542895fef1c53e8327456b7855c7be2bcb26a0a03f60"
    )]
    #[case(
        "testpassword",
        "987654321",
        "a674fcba9923871b56311462dd1e41f2676a8997aa082cc9074442f015fa1ec8"
    )]
    #[case(
        "secret",
        "42",
        "5c788b952157fdaf39f511ef1bf19c7af3b078293052c0d5ab4b2d3af737b740"
    )]
    #[case(
        "ab",
        "c",
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    )]
    fn test_known_vectors(#[case] password: &str, #[case] salt: &str, #[case] expected: &str) {
        assert_eq!(hash_password(password, salt), expected);
        assert!(verify_password(password, salt, expected));
    }

    #[test]
    fn test_verify_rejects_wrong_password() {
        let stored = hash_password("testpassword", "123456789");
        assert!(!verify_password("wrongpassword", "123456789", &stored));
    }

    #[test]
    fn test_verify_rejects_length_mismatch() {
        let stored = hash_password("testpassword", "123456789");
        assert!(!verify_password("testpassword", "123456789", &stored[..63]));
        assert!(!verify_password("testpassword", "123456789", ""));
    }

    #[rstest]
    #[case("RFID_CARD_123456789_HASH", Some(123_456_789))]
    #[case("RFID_CARD_0_HASH", Some(0))]
    #[case("RFID_CARD__HASH", None)]
    #[case("RFID_CARD_12a_HASH", None)]
    #[case("AUTHORIZED_CARD_HASH", None)]
    #[case("RFID_CARD_42", None)]
    fn test_parse_card_hash_key(#[case] key: &str, #[case] expected: Option<u64>) {
        assert_eq!(parse_card_hash_key(key), expected.map(CardId::new));
    }

    #[test]
    fn test_key_round_trip() {
        let card = CardId::new(987_654_321);
        assert_eq!(parse_card_hash_key(&card_hash_key(card)), Some(card));
        assert_eq!(card_salt(card), "987654321");
    }
}
