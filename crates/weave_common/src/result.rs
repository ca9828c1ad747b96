//! The internal-error type shared by the Weave crates.

/// An internal error indicating a bug in Weave, not a user input problem.
///
/// User-facing problems (an unroutable design, a malformed input file) have
/// their own error enums in the crates that detect them.
#[derive(Debug, thiserror::Error)]
#[error("internal error: {message}")]
pub struct InternalError {
    /// Description of the internal error.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}
