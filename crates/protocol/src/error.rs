//! Error types for the protocol crate.

use thiserror::Error;

/// Protocol error type covering all possible failure modes.
#[derive(Debug, Error)]
pub enum ProtocolError {
    // Serialization errors
    /// Failed to serialize data.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Failed to deserialize data.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    // Frame errors
    /// A frame arrived that does not follow the ttyd wire format.
    ///
    /// Frame decoding itself never returns this (malformed frames decode to
    /// [`Opcode::Unknown`](crate::framing::Opcode::Unknown)); it is reserved
    /// for callers that choose to treat an unknown frame as a hard error.
    #[error("protocol violation: {0}")]
    Violation(String),

    /// Frame payload is not valid UTF-8 where text was required.
    #[error("invalid payload text: {0}")]
    InvalidPayloadText(String),

    // Handshake errors
    /// The server rejected the authentication handshake.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    // Connection errors
    /// Connection was closed unexpectedly.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Operation timed out.
    #[error("operation timed out: {0}")]
    Timeout(String),
}

/// Result type alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

// Conversions from underlying crate errors

impl From<serde_json::Error> for ProtocolError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_eof() || err.is_syntax() {
            ProtocolError::Deserialization(err.to_string())
        } else {
            ProtocolError::Serialization(err.to_string())
        }
    }
}

impl From<std::str::Utf8Error> for ProtocolError {
    fn from(err: std::str::Utf8Error) -> Self {
        ProtocolError::InvalidPayloadText(err.to_string())
    }
}

impl From<std::io::Error> for ProtocolError {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind;
        match err.kind() {
            ErrorKind::TimedOut => ProtocolError::Timeout(err.to_string()),
            ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe
            | ErrorKind::UnexpectedEof => ProtocolError::ConnectionClosed(err.to_string()),
            _ => ProtocolError::Violation(err.to_string()),
        }
    }
}
