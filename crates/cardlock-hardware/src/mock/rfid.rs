//! Mock RFID card transceiver for testing and development.
//!
//! This module provides a simulated MFRC522-style reader/writer that can be
//! controlled programmatically for testing without requiring physical
//! hardware. Tags live in a shared database so text written through the
//! transceiver is read back on the next presentation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use cardlock_core::{CardId, Credential};
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::{HardwareError, Result};
use crate::traits::CardTransceiver;
use crate::types::tag_text;

type TagDatabase = Arc<Mutex<HashMap<CardId, String>>>;

fn lock_tags(tags: &TagDatabase) -> MutexGuard<'_, HashMap<CardId, String>> {
    tags.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Internal event type for the mock transceiver.
#[derive(Debug, Clone)]
enum CardEvent {
    Presented(CardId),
    Fault(String),
}

/// Mock RFID card transceiver.
///
/// Each read or write consumes one card presentation queued through the
/// paired [`MockCardHandle`]. Reads are cancel-safe: a presentation is only
/// consumed when the read resolves.
///
/// # Examples
///
/// ```
/// use cardlock_core::CardId;
/// use cardlock_hardware::mock::MockCardTransceiver;
/// use cardlock_hardware::traits::CardTransceiver;
///
/// #[tokio::main]
/// async fn main() -> cardlock_hardware::Result<()> {
///     let (mut reader, handle) = MockCardTransceiver::new();
///
///     handle.add_card(CardId::new(123456789), "hunter2");
///     handle.present_card(CardId::new(123456789)).await?;
///
///     let credential = reader.read().await?;
///     assert_eq!(credential.id, CardId::new(123456789));
///     assert_eq!(credential.payload.trim_end(), "hunter2");
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockCardTransceiver {
    event_rx: mpsc::Receiver<CardEvent>,
    tags: TagDatabase,
    closed: bool,
}

impl MockCardTransceiver {
    /// Create a transceiver and the handle that drives it.
    pub fn new() -> (Self, MockCardHandle) {
        let (event_tx, event_rx) = mpsc::channel(32);
        let tags = TagDatabase::default();

        let reader = Self {
            event_rx,
            tags: Arc::clone(&tags),
            closed: false,
        };
        let handle = MockCardHandle { event_tx, tags };

        (reader, handle)
    }

    /// Returns `true` once [`close`](CardTransceiver::close) has run.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    async fn next_event(&mut self) -> Result<CardEvent> {
        if self.closed {
            return Err(HardwareError::disconnected("mock RFID reader closed"));
        }
        self.event_rx
            .recv()
            .await
            .ok_or_else(|| HardwareError::disconnected("RFID event channel closed"))
    }
}

impl CardTransceiver for MockCardTransceiver {
    async fn read(&mut self) -> Result<Credential> {
        match self.next_event().await? {
            CardEvent::Presented(id) => {
                let payload = lock_tags(&self.tags)
                    .get(&id)
                    .cloned()
                    .unwrap_or_else(|| tag_text(""));
                debug!(card_id = %id, "Mock card read");
                Ok(Credential::new(id, payload))
            }
            CardEvent::Fault(message) => Err(HardwareError::card_read(message)),
        }
    }

    async fn write(&mut self, text: &str) -> Result<CardId> {
        match self.next_event().await? {
            CardEvent::Presented(id) => {
                lock_tags(&self.tags).insert(id, tag_text(text));
                debug!(card_id = %id, "Mock card written");
                Ok(id)
            }
            CardEvent::Fault(message) => Err(HardwareError::card_write(message)),
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        self.event_rx.close();
        Ok(())
    }
}

/// Handle for controlling a [`MockCardTransceiver`].
///
/// Clones share both the presentation queue and the tag database.
#[derive(Debug, Clone)]
pub struct MockCardHandle {
    event_tx: mpsc::Sender<CardEvent>,
    tags: TagDatabase,
}

impl MockCardHandle {
    /// Put a tag holding `text` into the database, replacing any previous
    /// contents.
    pub fn add_card(&self, id: CardId, text: &str) {
        lock_tags(&self.tags).insert(id, tag_text(text));
    }

    /// Queue a presentation of `id` to the reader.
    ///
    /// Unknown cards are presented as blank tags.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::Disconnected` if the transceiver was dropped
    /// or closed.
    pub async fn present_card(&self, id: CardId) -> Result<()> {
        self.send(CardEvent::Presented(id)).await
    }

    /// Queue a failed read or write (collision, CRC error, card removed).
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::Disconnected` if the transceiver was dropped
    /// or closed.
    pub async fn inject_fault(&self, message: impl Into<String>) -> Result<()> {
        self.send(CardEvent::Fault(message.into())).await
    }

    async fn send(&self, event: CardEvent) -> Result<()> {
        self.event_tx
            .send(event)
            .await
            .map_err(|_| HardwareError::disconnected("RFID event channel closed"))
    }

    /// Text stored on a tag, including padding.
    pub fn stored_text(&self, id: CardId) -> Option<String> {
        lock_tags(&self.tags).get(&id).cloned()
    }

    /// Number of tags in the database.
    pub fn card_count(&self) -> usize {
        lock_tags(&self.tags).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_present_and_read() {
        let (mut reader, handle) = MockCardTransceiver::new();
        handle.add_card(CardId::new(42), "secret");

        tokio::spawn(async move {
            handle.present_card(CardId::new(42)).await.unwrap();
        });

        let credential = reader.read().await.unwrap();
        assert_eq!(credential.id, CardId::new(42));
        assert_eq!(credential.payload.len(), 48);
        assert_eq!(credential.payload.trim_end(), "secret");
    }

    #[tokio::test]
    async fn test_unknown_card_reads_blank() {
        let (mut reader, handle) = MockCardTransceiver::new();
        handle.present_card(CardId::new(7)).await.unwrap();

        let credential = reader.read().await.unwrap();
        assert_eq!(credential.payload.trim(), "");
    }

    #[tokio::test]
    async fn test_write_then_read_back() {
        let (mut reader, handle) = MockCardTransceiver::new();
        handle.present_card(CardId::new(99)).await.unwrap();
        handle.present_card(CardId::new(99)).await.unwrap();

        let written = reader.write("pass").await.unwrap();
        assert_eq!(written, CardId::new(99));
        assert_eq!(handle.card_count(), 1);

        let credential = reader.read().await.unwrap();
        assert_eq!(credential.payload.trim_end(), "pass");
    }

    #[tokio::test]
    async fn test_injected_faults() {
        let (mut reader, handle) = MockCardTransceiver::new();
        handle.inject_fault("collision").await.unwrap();
        handle.inject_fault("card removed").await.unwrap();

        assert!(matches!(
            reader.read().await,
            Err(HardwareError::CardReadError { .. })
        ));
        assert!(matches!(
            reader.write("x").await,
            Err(HardwareError::CardWriteError { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_read_keeps_presentation() {
        let (mut reader, handle) = MockCardTransceiver::new();

        let timed_out = tokio::time::timeout(Duration::from_millis(100), reader.read()).await;
        assert!(timed_out.is_err());

        handle.present_card(CardId::new(5)).await.unwrap();
        let credential = reader.read().await.unwrap();
        assert_eq!(credential.id, CardId::new(5));
    }

    #[tokio::test]
    async fn test_close_disconnects() {
        let (mut reader, handle) = MockCardTransceiver::new();
        reader.close().await.unwrap();
        assert!(reader.is_closed());
        assert!(matches!(
            reader.read().await,
            Err(HardwareError::Disconnected { .. })
        ));
        assert!(handle.present_card(CardId::new(1)).await.is_err());
    }
}
