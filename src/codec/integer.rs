//! 32-bit integer codec.
//!
//! Each value is written as a 4-byte little-endian signed integer; the
//! concatenated fields sit behind the usual 4-byte length header.

use bytes::{BufMut, Bytes, BytesMut};

use crate::protocol::{encode_length_header, HEADER_SIZE};

/// Size of one 32-bit integer field on the wire.
pub const INTEGER_FIELD_SIZE: usize = 4;

/// Codec for 32-bit signed integer values.
pub struct IntegerCodec;

impl IntegerCodec {
    /// Encode a sequence of 32-bit integers as framed wire bytes.
    ///
    /// Infallible: every `i32` has exactly one wire representation.
    pub fn encode(values: &[i32]) -> Bytes {
        let body_len = values.len() * INTEGER_FIELD_SIZE;
        let mut buf = BytesMut::with_capacity(HEADER_SIZE + body_len);
        buf.put_slice(&encode_length_header(body_len as u32));

        for value in values {
            buf.put_slice(&value.to_le_bytes());
        }

        buf.freeze()
    }
}
