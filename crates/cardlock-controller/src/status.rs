//! Status screens shown on the character display.

use std::fmt;

use cardlock_core::{CardId, LockState};

/// What the panel is telling the person at the door.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusMessage {
    /// Peripherals are coming up.
    Starting,
    /// Waiting for a card.
    Ready,
    /// A card was read.
    CardDetected(CardId),
    /// The card was accepted and the lock moved to this state.
    Granted(LockState),
    /// The card was rejected.
    Denied,
    /// An unrecoverable fault stopped the appliance.
    SystemError,
}

impl StatusMessage {
    /// The two lines of text for this message, unpadded.
    pub fn text(&self) -> (String, String) {
        match self {
            StatusMessage::Starting => ("RFID Servo Lock".into(), "Starting...".into()),
            StatusMessage::Ready => ("Ready".into(), "Present card".into()),
            StatusMessage::CardDetected(id) => ("Card detected".into(), format!("ID:{id}")),
            StatusMessage::Granted(state) => ("Access granted".into(), state.to_string()),
            StatusMessage::Denied => ("Access denied".into(), "Unknown card".into()),
            StatusMessage::SystemError => ("System error".into(), "Shutting down".into()),
        }
    }

    /// Both lines cut to a panel `columns` wide.
    ///
    /// Text past the last column would land in off-screen DDRAM, so it is
    /// dropped here instead.
    pub fn lines(&self, columns: usize) -> [String; 2] {
        let (first, second) = self.text();
        [fit(&first, columns), fit(&second, columns)]
    }
}

fn fit(text: &str, columns: usize) -> String {
    text.chars().take(columns).collect()
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (first, second) = self.text();
        write!(f, "{first} / {second}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(StatusMessage::Ready, "Ready", "Present card")]
    #[case(StatusMessage::CardDetected(CardId::new(42)), "Card detected", "ID:42")]
    #[case(StatusMessage::Granted(LockState::Unlocked), "Access granted", "UNLOCKED")]
    #[case(StatusMessage::Granted(LockState::Locked), "Access granted", "LOCKED")]
    #[case(StatusMessage::Denied, "Access denied", "Unknown card")]
    #[case(StatusMessage::SystemError, "System error", "Shutting down")]
    fn test_message_text(
        #[case] message: StatusMessage,
        #[case] first: &str,
        #[case] second: &str,
    ) {
        assert_eq!(message.text(), (first.to_string(), second.to_string()));
    }

    #[test]
    fn test_every_message_fits_sixteen_columns() {
        let messages = [
            StatusMessage::Starting,
            StatusMessage::Ready,
            StatusMessage::CardDetected(CardId::new(123_456_789_012)),
            StatusMessage::Granted(LockState::Unlocked),
            StatusMessage::Denied,
            StatusMessage::SystemError,
        ];
        for message in messages {
            for line in message.lines(16) {
                assert!(line.chars().count() <= 16, "{message}");
            }
        }
    }

    #[test]
    fn test_long_card_id_is_truncated() {
        let [_, second] = StatusMessage::CardDetected(CardId::new(u64::MAX)).lines(16);
        assert_eq!(second, "ID:1844674407370");
    }
}
