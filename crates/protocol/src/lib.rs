//! # ttylink Protocol Library
//!
//! This crate provides wire-format definitions for the ttyd terminal
//! multiplexer protocol as spoken by ttylink clients.
//!
//! ## Overview
//!
//! The protocol crate is the foundation of ttylink's communication layer,
//! providing:
//!
//! - **Frame Codec**: One-byte-opcode framing for terminal input, resize
//!   requests, and server output
//! - **Handshake**: ttyd's double authentication (Basic header at upgrade
//!   time plus the AuthToken first frame)
//! - **Error Types**: Protocol-level error taxonomy
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         Session Library (session)       │  classification, timeouts
//! ├─────────────────────────────────────────┤
//! │         Frame Codec / Handshake         │  opcode framing, auth JSON
//! ├─────────────────────────────────────────┤
//! │        Transport (WebSocket, tty)       │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```rust
//! use protocol::{decode, encode_input, encode_resize, ClientHello, Credentials, Opcode};
//!
//! // Build the authentication payloads
//! let creds = Credentials::new("admin", "secret");
//! let header = creds.authorization_header();
//! let hello = ClientHello::new(&creds, 24, 80).to_bytes().unwrap();
//!
//! // Encode terminal traffic
//! let input = encode_input("pwd\n");
//! let resize = encode_resize(24, 80).unwrap();
//!
//! // Decode a server frame
//! let frame = decode(b"0/tmp/example\r\n");
//! assert_eq!(frame.opcode, Opcode::Output);
//! ```
//!
//! ## Modules
//!
//! - [`framing`]: Frame codec for the one-byte-opcode wire format
//! - [`handshake`]: Credentials and first-frame authentication body
//! - [`error`]: Error types

pub mod error;
pub mod framing;
pub mod handshake;

pub use error::{ProtocolError, Result};
pub use framing::{
    decode, encode_input, encode_resize, Opcode, Resize, ServerFrame, OPCODE_INPUT,
    OPCODE_OUTPUT, OPCODE_RESIZE, OPCODE_SET_PREFERENCES, OPCODE_SET_WINDOW_TITLE,
};
pub use handshake::{ClientHello, Credentials, TTY_SUBPROTOCOL};
