//! Tests for the dotenv-backed credential store.

use std::fs;

use cardlock_auth::{AuthError, Authenticator, CredentialStore, EnvFileStore};
use cardlock_core::CardId;
use tempfile::TempDir;

const CARD: CardId = CardId::new(123_456_789);
const OTHER_CARD: CardId = CardId::new(987_654_321);
const CARD_HASH: &str = "d429d12dabbb04c8202c542895fef1c53e8327456b7855c7be2bcb26a0a03f60";

fn store_in(dir: &TempDir) -> EnvFileStore {
    EnvFileStore::new(dir.path().join(".env"))
}

#[test]
fn test_enroll_then_authorize_padded_payload() {
    let dir = TempDir::new().unwrap();
    let mut auth = Authenticator::new(store_in(&dir));

    auth.enroll(CARD, "testpassword").unwrap();

    let contents = fs::read_to_string(dir.path().join(".env")).unwrap();
    assert!(contents.contains(&format!("RFID_CARD_123456789_HASH={CARD_HASH}")));
    assert!(contents.starts_with('#'));

    // Tags hand back their text padded to capacity.
    let payload = format!("{:<48}", "testpassword");
    assert!(auth.authorize(CARD, &payload));
    assert!(!auth.authorize(CARD, "wrongpassword"));
    assert!(!auth.authorize(OTHER_CARD, &payload));
}

#[test]
fn test_missing_file_denies_everything() {
    let dir = TempDir::new().unwrap();
    let auth = Authenticator::new(store_in(&dir));
    assert!(!auth.authorize(CARD, "testpassword"));
    assert!(auth.enrolled_cards().unwrap().is_empty());
}

#[test]
fn test_rewrite_preserves_unrelated_lines() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".env");
    fs::write(
        &path,
        "# site settings\nLOG_LEVEL=debug\nRFID_CARD_123456789_HASH=0000\n\nOTHER=1\n",
    )
    .unwrap();

    let mut auth = Authenticator::new(EnvFileStore::new(&path));
    auth.enroll(CARD, "testpassword").unwrap();
    auth.enroll(OTHER_CARD, "testpassword").unwrap();

    let card_line = format!("RFID_CARD_123456789_HASH={CARD_HASH}");
    let contents = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(
        lines,
        vec![
            "# site settings",
            "LOG_LEVEL=debug",
            card_line.as_str(),
            "",
            "OTHER=1",
            "RFID_CARD_987654321_HASH=a674fcba9923871b56311462dd1e41f2676a8997aa082cc9074442f015fa1ec8",
        ]
    );
    assert_eq!(auth.enrolled_cards().unwrap(), vec![CARD, OTHER_CARD]);
}

#[test]
fn test_external_edits_are_seen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".env");
    let auth = Authenticator::new(EnvFileStore::new(&path));
    assert!(!auth.authorize(CARD, "testpassword"));

    fs::write(&path, format!("RFID_CARD_123456789_HASH={CARD_HASH}\n")).unwrap();
    assert!(auth.authorize(CARD, "testpassword"));
}

#[test]
fn test_revoke_removes_only_that_card() {
    let dir = TempDir::new().unwrap();
    let mut auth = Authenticator::new(store_in(&dir));
    auth.enroll(CARD, "a").unwrap();
    auth.enroll(OTHER_CARD, "b").unwrap();

    assert!(auth.revoke(CARD).unwrap());
    assert!(!auth.revoke(CARD).unwrap());
    assert_eq!(auth.enrolled_cards().unwrap(), vec![OTHER_CARD]);
    assert!(auth.authorize(OTHER_CARD, "b"));
}

#[test]
fn test_malformed_file_fails_closed() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".env");
    fs::write(
        &path,
        format!("RFID_CARD_123456789_HASH={CARD_HASH}\nBROKEN='unterminated\n"),
    )
    .unwrap();

    let store = EnvFileStore::new(&path);
    assert!(matches!(
        store.load("RFID_CARD_123456789_HASH"),
        Err(AuthError::Malformed { .. })
    ));

    let auth = Authenticator::new(store);
    assert!(!auth.authorize(CARD, "testpassword"));
}
