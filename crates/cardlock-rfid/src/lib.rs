//! RFID credential reader/writer.
//!
//! [`CredentialReader`] wraps a [`CardTransceiver`](cardlock_hardware::CardTransceiver)
//! and turns every transceiver fault into a logged `None` or `false`, so the
//! control loop only ever sees "a credential" or "no credential".

pub mod reader;

pub use reader::CredentialReader;
