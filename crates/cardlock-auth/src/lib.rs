//! Card password hashing and the authorized-credential store.
//!
//! A card is authorized when the SHA-256 of its stored password, salted with
//! the card's decimal identifier, matches the record kept under
//! `RFID_CARD_<id>_HASH` in a flat `KEY=VALUE` credential file.
//!
//! # Examples
//!
//! ```
//! use cardlock_auth::{Authenticator, MemoryStore};
//! use cardlock_core::CardId;
//!
//! let mut auth = Authenticator::new(MemoryStore::new());
//! let card = CardId::new(123456789);
//!
//! auth.enroll(card, "testpassword").unwrap();
//! assert!(auth.authorize(card, "testpassword      "));
//! assert!(!auth.authorize(card, "wrongpassword"));
//! assert!(!auth.authorize(CardId::new(987654321), "testpassword"));
//! ```

pub mod authenticator;
pub mod error;
pub mod hash;
pub mod store;

pub use authenticator::{Authenticator, check_password};
pub use error::{AuthError, Result};
pub use hash::{card_hash_key, card_salt, hash_password, parse_card_hash_key, verify_password};
pub use store::{CredentialStore, EnvFileStore, MemoryStore};
