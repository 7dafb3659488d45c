//! Wire format encoding and decoding.
//!
//! Every message in either direction is framed as:
//! ```text
//! ┌──────────────┬───────────────┐
//! │ Length       │ Payload       │
//! │ 4 bytes      │ Length bytes  │
//! │ uint32 LE    │ opaque        │
//! └──────────────┴───────────────┘
//! ```
//!
//! The header counts payload bytes only and is never part of the payload
//! handed to consumers. All multi-byte integers on the wire are Little
//! Endian.

use crate::error::{EnginewireError, Result};

/// Header size in bytes (fixed, exactly 4).
pub const HEADER_SIZE: usize = 4;

/// Encode a payload length as a 4-byte little-endian header.
///
/// # Example
///
/// ```
/// use enginewire::protocol::encode_length_header;
///
/// assert_eq!(encode_length_header(16), [0x10, 0, 0, 0]);
/// ```
#[inline]
pub fn encode_length_header(length: u32) -> [u8; HEADER_SIZE] {
    length.to_le_bytes()
}

/// Decode the payload length from the first 4 bytes of a buffer.
///
/// # Errors
///
/// Returns a framing error if fewer than 4 bytes are supplied.
///
/// # Example
///
/// ```
/// use enginewire::protocol::decode_header_length;
///
/// assert_eq!(decode_header_length(&[0x06, 0, 0, 0, 0xAA]).unwrap(), 6);
/// assert!(decode_header_length(&[1, 2, 3]).is_err());
/// ```
pub fn decode_header_length(buf: &[u8]) -> Result<u32> {
    if buf.len() < HEADER_SIZE {
        return Err(EnginewireError::Framing(format!(
            "length header needs at least {} bytes, got {}",
            HEADER_SIZE,
            buf.len()
        )));
    }
    Ok(u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]))
}

/// Build a complete wire message: length header followed by payload.
pub fn build_message(payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    buf.extend_from_slice(&encode_length_header(payload.len() as u32));
    buf.extend_from_slice(payload);
    buf
}
