//! Authentication handshake payloads for the ttyd multiplexer.
//!
//! ttyd authenticates a client twice:
//!
//! 1. At WebSocket upgrade time, with an HTTP Basic `Authorization` header
//!    (the upgrade also requires the `tty` subprotocol).
//! 2. On the first frame after the upgrade, with a JSON body carrying the
//!    same base64 `user:pass` token plus the initial terminal geometry.
//!
//! Both payloads derive from the same [`Credentials`], so a mismatch
//! between the two is impossible by construction.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// WebSocket subprotocol the server requires at upgrade time.
pub const TTY_SUBPROTOCOL: &str = "tty";

/// Username and password for a ttyd endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Create credentials from a username and password.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// The base64-encoded `user:pass` token.
    pub fn token(&self) -> String {
        BASE64.encode(format!("{}:{}", self.username, self.password))
    }

    /// The value of the HTTP Basic `Authorization` header.
    pub fn authorization_header(&self) -> String {
        format!("Basic {}", self.token())
    }
}

impl std::fmt::Display for Credentials {
    /// Renders the username only. The password never appears in logs.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.username)
    }
}

/// First-frame JSON body sent after the WebSocket upgrade.
///
/// Field names match ttyd's expected JSON keys exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientHello {
    /// Base64 `user:pass` token, same value as the Basic header.
    #[serde(rename = "AuthToken")]
    pub auth_token: String,
    /// Initial terminal width in columns.
    pub columns: u16,
    /// Initial terminal height in rows.
    pub rows: u16,
}

impl ClientHello {
    /// Build the hello body from credentials and terminal geometry.
    pub fn new(credentials: &Credentials, rows: u16, columns: u16) -> Self {
        Self {
            auth_token: credentials.token(),
            columns,
            rows,
        }
    }

    /// Serialize to the JSON bytes sent as the first frame.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}
