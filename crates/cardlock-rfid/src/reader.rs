use std::time::Duration;

use cardlock_core::Credential;
use cardlock_hardware::{CardTransceiver, Result};
use tokio::time::timeout;
use tracing::{debug, error, info};

/// Fault-absorbing front end for an RFID transceiver.
///
/// No operation retries; a failed read or write is logged once and reported
/// as `None` / `false`.
///
/// # Examples
///
/// ```
/// use cardlock_core::CardId;
/// use cardlock_hardware::mock::MockCardTransceiver;
/// use cardlock_rfid::CredentialReader;
///
/// #[tokio::main]
/// async fn main() {
///     let (transceiver, handle) = MockCardTransceiver::new();
///     let mut reader = CredentialReader::new(transceiver);
///
///     handle.add_card(CardId::new(7), "pw");
///     handle.present_card(CardId::new(7)).await.unwrap();
///
///     let credential = reader.read_credential().await.unwrap();
///     assert_eq!(credential.id, CardId::new(7));
/// }
/// ```
#[derive(Debug)]
pub struct CredentialReader<T: CardTransceiver> {
    transceiver: T,
    closed: bool,
}

impl<T: CardTransceiver> CredentialReader<T> {
    pub fn new(transceiver: T) -> Self {
        Self {
            transceiver,
            closed: false,
        }
    }

    /// Wait for a card and read it.
    ///
    /// Returns `None` if the read failed.
    pub async fn read_credential(&mut self) -> Option<Credential> {
        match self.transceiver.read().await {
            Ok(credential) => {
                info!(card_id = %credential.id, "Card detected");
                Some(credential)
            }
            Err(err) => {
                error!(error = %err, "Error reading card");
                None
            }
        }
    }

    /// Wait at most `limit` for a card.
    ///
    /// Returns `None` if no card arrived in time or the read failed. A card
    /// presented after the deadline is picked up by the next call.
    pub async fn try_read_credential(&mut self, limit: Duration) -> Option<Credential> {
        match timeout(limit, self.read_credential()).await {
            Ok(credential) => credential,
            Err(_) => {
                debug!(timeout_ms = limit.as_millis() as u64, "No card presented");
                None
            }
        }
    }

    /// Wait for a card and store `payload` on it.
    ///
    /// Returns `false` if the write failed.
    pub async fn write_credential(&mut self, payload: &str) -> bool {
        match self.transceiver.write(payload).await {
            Ok(card_id) => {
                info!(card_id = %card_id, "Data writing is complete");
                true
            }
            Err(err) => {
                error!(error = %err, "Error writing to card");
                false
            }
        }
    }

    /// Release the transceiver. Safe to call more than once.
    ///
    /// # Errors
    ///
    /// Returns an error if the transceiver could not be shut down cleanly.
    pub async fn cleanup(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.transceiver.close().await?;
        debug!("RFID reader released");
        Ok(())
    }

    pub fn transceiver(&self) -> &T {
        &self.transceiver
    }

    pub fn transceiver_mut(&mut self) -> &mut T {
        &mut self.transceiver
    }
}
