//! Error types for enginewire.

use thiserror::Error;

/// Main error type for all enginewire operations.
#[derive(Debug, Error)]
pub enum EnginewireError {
    /// I/O error during socket operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Base64 decode error for an external big-integer value.
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Hex decode error for public key material.
    #[error("hex decode error: {0}")]
    Hex(#[from] hex::FromHexError),

    /// JSON error while loading configuration.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Input rejected before any I/O was attempted (bad key length,
    /// bad program name).
    #[error("validation error: {0}")]
    Validation(String),

    /// Malformed length-prefixed stream (e.g. header shorter than 4 bytes).
    #[error("framing error: {0}")]
    Framing(String),

    /// Operation on a session id that was never set up.
    #[error("no session was ever set up for id: {0}")]
    SessionNotFound(String),

    /// Connection to the engine closed unexpectedly.
    #[error("connection closed")]
    ConnectionClosed,

    /// A bootstrap script failed to run or exited non-zero.
    #[error("bootstrap error: {0}")]
    Bootstrap(String),
}

/// Coarse failure category exposed to the outward-facing layers.
///
/// REST/push collaborators map these to their own status codes instead of
/// leaking internal error text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The referenced session does not exist.
    NotFound,
    /// The caller supplied malformed input.
    BadRequest,
    /// Anything else: I/O, framing, bootstrap.
    Internal,
}

impl EnginewireError {
    /// Categorize this error for an external caller.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EnginewireError::SessionNotFound(_) => ErrorKind::NotFound,
            EnginewireError::Validation(_)
            | EnginewireError::Base64(_)
            | EnginewireError::Hex(_) => ErrorKind::BadRequest,
            _ => ErrorKind::Internal,
        }
    }
}

/// Result type alias using EnginewireError.
pub type Result<T> = std::result::Result<T, EnginewireError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(
            EnginewireError::SessionNotFound("7".into()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            EnginewireError::Validation("bad key".into()).kind(),
            ErrorKind::BadRequest
        );
        assert_eq!(
            EnginewireError::Framing("short header".into()).kind(),
            ErrorKind::Internal
        );
        assert_eq!(EnginewireError::ConnectionClosed.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err: EnginewireError = io.into();
        assert!(matches!(err, EnginewireError::Io(_)));
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
