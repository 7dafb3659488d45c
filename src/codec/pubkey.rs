//! Public key codec.
//!
//! External representation: a 64-character hex string (256 bits). Wire
//! representation: eight 4-byte big-endian groups, each group's byte order
//! reversed independently (not the whole buffer), behind a 4-byte length
//! header of 32.
//!
//! Key material is opaque to the proxy: it is transcoded and passed
//! through, never inspected or used for authentication here.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{EnginewireError, Result};
use crate::protocol::{encode_length_header, HEADER_SIZE};

/// Expected length of the external hex representation.
pub const PUBLIC_KEY_HEX_LEN: usize = 64;

/// Size of the key on the wire (excluding the length header).
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Width of one independently reversed group.
const GROUP_SIZE: usize = 4;

/// Codec for 256-bit public key material.
pub struct PublicKeyCodec;

impl PublicKeyCodec {
    /// Encode a 64-character hex public key as framed wire bytes.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the input is not exactly 64
    /// characters, and a hex decode error if it contains non-hex
    /// characters. Both are rejected before any I/O.
    pub fn encode(hex_key: &str) -> Result<Bytes> {
        if hex_key.len() != PUBLIC_KEY_HEX_LEN {
            return Err(EnginewireError::Validation(format!(
                "public key must be {} hex characters, got {}",
                PUBLIC_KEY_HEX_LEN,
                hex_key.len()
            )));
        }

        let decoded = hex::decode(hex_key)?;

        let mut buf = BytesMut::with_capacity(HEADER_SIZE + PUBLIC_KEY_SIZE);
        buf.put_slice(&encode_length_header(PUBLIC_KEY_SIZE as u32));

        // Reverse each 4-byte group independently, not the whole buffer.
        for group in decoded.chunks_exact(GROUP_SIZE) {
            let mut reversed = [0u8; GROUP_SIZE];
            for (slot, byte) in reversed.iter_mut().zip(group.iter().rev()) {
                *slot = *byte;
            }
            buf.put_slice(&reversed);
        }

        Ok(buf.freeze())
    }
}
