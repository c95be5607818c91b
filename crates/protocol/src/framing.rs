//! Frame codec for the ttyd multiplexer wire format.
//!
//! # Frame Format
//!
//! Every frame is a single WebSocket binary message with a one-byte ASCII
//! opcode prefix followed by the payload:
//!
//! - Client → server: `'0'` terminal input (UTF-8 text), `'1'` resize
//!   (JSON `{"columns": c, "rows": r}`).
//! - Server → client: `'0'` terminal output, `'1'` set window title,
//!   `'2'` set preferences.
//!
//! Decoding is total: an unrecognized opcode or an empty frame decodes to
//! [`Opcode::Unknown`] with the raw bytes preserved, it never fails. The
//! multiplexer may grow opcodes over time and an old client must keep
//! working against a newer server.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Client opcode for terminal input.
pub const OPCODE_INPUT: u8 = b'0';

/// Client opcode for a terminal resize request.
pub const OPCODE_RESIZE: u8 = b'1';

/// Server opcode for terminal output.
pub const OPCODE_OUTPUT: u8 = b'0';

/// Server opcode for a window title update.
pub const OPCODE_SET_WINDOW_TITLE: u8 = b'1';

/// Server opcode for a preferences blob.
pub const OPCODE_SET_PREFERENCES: u8 = b'2';

/// Opcode of a server-to-client frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    /// Terminal output data.
    Output,
    /// The server is setting the window title.
    SetWindowTitle,
    /// The server is pushing client preferences.
    SetPreferences,
    /// Any opcode this client does not recognize.
    Unknown,
}

impl Opcode {
    /// Map a raw opcode byte to a server opcode.
    #[inline]
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            OPCODE_OUTPUT => Opcode::Output,
            OPCODE_SET_WINDOW_TITLE => Opcode::SetWindowTitle,
            OPCODE_SET_PREFERENCES => Opcode::SetPreferences,
            _ => Opcode::Unknown,
        }
    }
}

/// JSON body of a resize frame.
///
/// ttyd expects `columns` before `rows`; field order here matches the
/// on-wire layout produced by the reference web client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resize {
    /// Terminal width in columns.
    pub columns: u16,
    /// Terminal height in rows.
    pub rows: u16,
}

/// A decoded server-to-client frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerFrame {
    /// The frame opcode.
    pub opcode: Opcode,
    /// Payload bytes following the opcode.
    ///
    /// For [`Opcode::Unknown`] this holds the entire raw frame, opcode
    /// byte included, so nothing is lost for logging.
    pub payload: Vec<u8>,
}

impl ServerFrame {
    /// Interpret the payload as UTF-8 text.
    pub fn payload_text(&self) -> Result<&str> {
        Ok(std::str::from_utf8(&self.payload)?)
    }

    /// Interpret the payload as UTF-8 text, replacing invalid sequences.
    ///
    /// Terminal output can legitimately split a multi-byte character across
    /// frames, so the read path prefers lossy decoding over a hard error.
    pub fn payload_text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

/// Encode a terminal input frame: opcode `'0'` followed by the text.
pub fn encode_input(text: &str) -> Vec<u8> {
    let mut frame = Vec::with_capacity(1 + text.len());
    frame.push(OPCODE_INPUT);
    frame.extend_from_slice(text.as_bytes());
    frame
}

/// Encode a resize frame: opcode `'1'` followed by the JSON body.
pub fn encode_resize(rows: u16, columns: u16) -> Result<Vec<u8>> {
    let body = serde_json::to_vec(&Resize { columns, rows })?;
    let mut frame = Vec::with_capacity(1 + body.len());
    frame.push(OPCODE_RESIZE);
    frame.extend_from_slice(&body);
    Ok(frame)
}

/// Decode a server-to-client frame.
///
/// Never fails: unrecognized opcodes and empty frames decode to
/// [`Opcode::Unknown`] with the raw bytes preserved.
pub fn decode(data: &[u8]) -> ServerFrame {
    match data.split_first() {
        Some((&byte, payload)) => match Opcode::from_byte(byte) {
            Opcode::Unknown => ServerFrame {
                opcode: Opcode::Unknown,
                payload: data.to_vec(),
            },
            opcode => ServerFrame {
                opcode,
                payload: payload.to_vec(),
            },
        },
        None => ServerFrame {
            opcode: Opcode::Unknown,
            payload: Vec::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_input_prefixes_opcode() {
        let frame = encode_input("pwd\n");
        assert_eq!(frame[0], b'0');
        assert_eq!(&frame[1..], b"pwd\n");
    }

    #[test]
    fn test_encode_input_empty() {
        let frame = encode_input("");
        assert_eq!(frame, vec![b'0']);
    }

    #[test]
    fn test_encode_input_utf8() {
        let frame = encode_input("echo héllo");
        assert_eq!(frame[0], b'0');
        assert_eq!(std::str::from_utf8(&frame[1..]).unwrap(), "echo héllo");
    }

    #[test]
    fn test_encode_resize_json_body() {
        let frame = encode_resize(24, 80).unwrap();
        assert_eq!(frame[0], b'1');

        let body: Resize = serde_json::from_slice(&frame[1..]).unwrap();
        assert_eq!(body.columns, 80);
        assert_eq!(body.rows, 24);
    }

    #[test]
    fn test_encode_resize_field_order() {
        // columns must come before rows on the wire
        let frame = encode_resize(24, 80).unwrap();
        let text = std::str::from_utf8(&frame[1..]).unwrap();
        assert_eq!(text, r#"{"columns":80,"rows":24}"#);
    }

    #[test]
    fn test_decode_output() {
        let frame = decode(b"0hello world");
        assert_eq!(frame.opcode, Opcode::Output);
        assert_eq!(frame.payload, b"hello world");
    }

    #[test]
    fn test_decode_output_empty_payload() {
        let frame = decode(b"0");
        assert_eq!(frame.opcode, Opcode::Output);
        assert!(frame.payload.is_empty());
    }

    #[test]
    fn test_decode_set_window_title() {
        let frame = decode(b"1user@host: /tmp");
        assert_eq!(frame.opcode, Opcode::SetWindowTitle);
        assert_eq!(frame.payload_text().unwrap(), "user@host: /tmp");
    }

    #[test]
    fn test_decode_set_preferences() {
        let frame = decode(br#"2{"fontSize": 14}"#);
        assert_eq!(frame.opcode, Opcode::SetPreferences);
        assert_eq!(frame.payload_text().unwrap(), r#"{"fontSize": 14}"#);
    }

    #[test]
    fn test_decode_unknown_opcode_preserves_raw_bytes() {
        let frame = decode(b"9mystery");
        assert_eq!(frame.opcode, Opcode::Unknown);
        assert_eq!(frame.payload, b"9mystery");
    }

    #[test]
    fn test_decode_empty_frame() {
        let frame = decode(b"");
        assert_eq!(frame.opcode, Opcode::Unknown);
        assert!(frame.payload.is_empty());
    }

    #[test]
    fn test_decode_binary_garbage_never_errors() {
        let frame = decode(&[0xff, 0xfe, 0x00, 0x01]);
        assert_eq!(frame.opcode, Opcode::Unknown);
        assert_eq!(frame.payload, vec![0xff, 0xfe, 0x00, 0x01]);
    }

    #[test]
    fn test_payload_text_invalid_utf8() {
        let frame = decode(&[b'0', 0xff, 0xfe]);
        assert!(frame.payload_text().is_err());
    }

    #[test]
    fn test_payload_text_lossy_replaces_invalid() {
        let frame = decode(&[b'0', b'o', b'k', 0xff]);
        assert_eq!(frame.payload_text_lossy(), "ok\u{fffd}");
    }

    #[test]
    fn test_opcode_from_byte() {
        assert_eq!(Opcode::from_byte(b'0'), Opcode::Output);
        assert_eq!(Opcode::from_byte(b'1'), Opcode::SetWindowTitle);
        assert_eq!(Opcode::from_byte(b'2'), Opcode::SetPreferences);
        assert_eq!(Opcode::from_byte(b'3'), Opcode::Unknown);
        assert_eq!(Opcode::from_byte(0x00), Opcode::Unknown);
    }

    #[test]
    fn test_resize_roundtrip() {
        let resize = Resize {
            columns: 132,
            rows: 43,
        };
        let json = serde_json::to_string(&resize).unwrap();
        let back: Resize = serde_json::from_str(&json).unwrap();
        assert_eq!(back, resize);
    }
}
