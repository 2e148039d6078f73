//! Error types for credential enrollment and storage.

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors that can occur while enrolling, revoking or listing credentials.
///
/// Authorization itself never fails: every problem reading a record is
/// treated as "not authorized".
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The password was empty after trimming.
    #[error("Password cannot be empty")]
    EmptyPassword,

    /// The password does not fit in a tag's data blocks.
    #[error("Password is {length} characters, a tag holds at most {capacity}")]
    PasswordTooLong { length: usize, capacity: usize },

    /// The credential file could not be parsed.
    #[error("Malformed credential store {path}: {message}")]
    Malformed { path: String, message: String },

    /// Reading or writing the credential file failed.
    #[error("Credential store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AuthError {
    /// Create a new malformed store error.
    pub fn malformed(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            message: message.into(),
        }
    }
}
