//! Error types for the session crate.

use protocol::ProtocolError;
use thiserror::Error;

/// Session error type covering all possible failure modes.
#[derive(Debug, Error)]
pub enum SessionError {
    // Transport errors - fatal to the session, require a fresh connect
    /// Transport-level failure (socket, upgrade, TLS).
    #[error("connection error: {0}")]
    Connection(String),

    /// The server rejected our credentials.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The connection went away while the session was using it.
    #[error("disconnected: {0}")]
    Disconnected(String),

    // Command errors - soft, the session stays usable
    /// A command was issued while the session was not idle.
    ///
    /// Timeouts are not errors: a timed-out command ends its stream with a
    /// complete chunk carrying `command_success: false`.
    #[error("session is not idle: {0}")]
    NotIdle(String),

    // Protocol errors - logged, the offending frame is dropped
    /// A frame broke the wire protocol's expectations.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),
}

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

impl From<ProtocolError> for SessionError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::AuthFailed(msg) => SessionError::Auth(msg),
            ProtocolError::ConnectionClosed(msg) => SessionError::Disconnected(msg),
            ProtocolError::Timeout(msg) => SessionError::Connection(msg),
            other => SessionError::ProtocolViolation(other.to_string()),
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for SessionError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        use tokio_tungstenite::tungstenite::Error as WsError;
        match err {
            WsError::Http(response) if response.status().as_u16() == 401 => {
                SessionError::Auth(format!("server returned {}", response.status()))
            }
            WsError::Http(response) if response.status().as_u16() == 403 => {
                SessionError::Auth(format!("server returned {}", response.status()))
            }
            WsError::ConnectionClosed | WsError::AlreadyClosed => {
                SessionError::Disconnected("websocket closed".to_string())
            }
            WsError::Io(io_err) => SessionError::Connection(io_err.to_string()),
            other => SessionError::Connection(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_error_display() {
        let err = SessionError::Connection("refused".to_string());
        assert_eq!(err.to_string(), "connection error: refused");
    }

    #[test]
    fn test_not_idle_display() {
        let err = SessionError::NotIdle("busy".to_string());
        assert_eq!(err.to_string(), "session is not idle: busy");
    }

    #[test]
    fn test_from_protocol_auth_failed() {
        let err: SessionError = ProtocolError::AuthFailed("401".to_string()).into();
        assert!(matches!(err, SessionError::Auth(_)));
    }

    #[test]
    fn test_from_protocol_connection_closed() {
        let err: SessionError = ProtocolError::ConnectionClosed("eof".to_string()).into();
        assert!(matches!(err, SessionError::Disconnected(_)));
    }

    #[test]
    fn test_from_protocol_violation() {
        let err: SessionError = ProtocolError::Violation("bad frame".to_string()).into();
        assert!(matches!(err, SessionError::ProtocolViolation(_)));
    }

    #[test]
    fn test_from_ws_error_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let ws_err = tokio_tungstenite::tungstenite::Error::Io(io_err);
        let err: SessionError = ws_err.into();
        assert!(matches!(err, SessionError::Connection(_)));
    }

    #[test]
    fn test_from_ws_error_closed() {
        let err: SessionError = tokio_tungstenite::tungstenite::Error::ConnectionClosed.into();
        assert!(matches!(err, SessionError::Disconnected(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SessionError>();
    }
}
