//! Big-integer codec - 128-bit fields between base64 and the wire.
//!
//! External representation: base64 of a 16-byte big-endian value.
//! Wire representation: the same 16 bytes byte-reversed (little-endian),
//! concatenated per element, behind a 4-byte little-endian length header.
//!
//! # Example
//!
//! ```
//! use enginewire::codec::{BigIntCodec, BIGINT_FIELD_SIZE};
//!
//! let wire = BigIntCodec::encode(&["4ug="]).unwrap();
//! // 4-byte header (16) then 0xE2E8 reversed and zero-padded to 16 bytes
//! assert_eq!(wire.len(), 4 + BIGINT_FIELD_SIZE);
//! assert_eq!(&wire[..6], &[0x10, 0, 0, 0, 0xE8, 0xE2]);
//! ```

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::{BufMut, Bytes, BytesMut};

use crate::error::Result;
use crate::protocol::{encode_length_header, HEADER_SIZE};

/// Size of one big-integer field on the wire.
pub const BIGINT_FIELD_SIZE: usize = 16;

/// Codec for 128-bit integer values.
pub struct BigIntCodec;

impl BigIntCodec {
    /// Encode a sequence of base64 big-endian values as framed wire bytes.
    ///
    /// Each decoded value is byte-reversed into a 16-byte little-endian
    /// field. Element lengths are not validated: a value decoding to fewer
    /// than 16 bytes is zero-padded, one decoding to more is truncated to
    /// its 16 low-order bytes. Both fill exactly one field either way.
    ///
    /// # Errors
    ///
    /// Returns a base64 decode error for malformed input; no I/O is
    /// attempted.
    pub fn encode<S: AsRef<str>>(values: &[S]) -> Result<Bytes> {
        let body_len = values.len() * BIGINT_FIELD_SIZE;
        let mut buf = BytesMut::with_capacity(HEADER_SIZE + body_len);
        buf.put_slice(&encode_length_header(body_len as u32));

        for value in values {
            let decoded = STANDARD.decode(value.as_ref())?;

            let mut field = [0u8; BIGINT_FIELD_SIZE];
            for (slot, byte) in field.iter_mut().zip(decoded.iter().rev()) {
                *slot = *byte;
            }
            buf.put_slice(&field);
        }

        Ok(buf.freeze())
    }

    /// Decode little-endian wire buffers back to base64 big-endian strings.
    ///
    /// The inverse of the per-element [`encode`](Self::encode) transform:
    /// reverse each buffer's byte order, then base64-encode.
    pub fn decode_to_base64<B: AsRef<[u8]>>(buffers: &[B]) -> Vec<String> {
        buffers
            .iter()
            .map(|buf| {
                let reversed: Vec<u8> = buf.as_ref().iter().rev().copied().collect();
                STANDARD.encode(reversed)
            })
            .collect()
    }
}
