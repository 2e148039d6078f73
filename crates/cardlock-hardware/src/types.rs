//! Common types shared across hardware device implementations.

use cardlock_core::constants::TAG_TEXT_CAPACITY;

/// Logic level of a digital output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinLevel {
    Low,
    High,
}

impl PinLevel {
    /// Returns `true` for [`PinLevel::High`].
    #[inline]
    pub fn is_high(self) -> bool {
        matches!(self, Self::High)
    }
}

impl From<bool> for PinLevel {
    fn from(high: bool) -> Self {
        if high { Self::High } else { Self::Low }
    }
}

/// Fit text into a tag's data blocks.
///
/// Text longer than [`TAG_TEXT_CAPACITY`] characters is truncated; shorter
/// text is right-padded with spaces, which is what readers hand back when the
/// tag is read again.
///
/// # Examples
///
/// ```
/// use cardlock_hardware::types::tag_text;
///
/// let stored = tag_text("secret");
/// assert_eq!(stored.len(), 48);
/// assert_eq!(stored.trim_end(), "secret");
/// ```
pub fn tag_text(text: &str) -> String {
    let truncated: String = text.chars().take(TAG_TEXT_CAPACITY).collect();
    format!("{truncated:<width$}", width = TAG_TEXT_CAPACITY)
}
