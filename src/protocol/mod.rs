//! Protocol module - wire format and stream reassembly.
//!
//! This module implements the engine's byte framing:
//! - 4-byte little-endian length header encoding/decoding
//! - Frame buffer for recovering whole messages from arbitrary chunking

mod frame_buffer;
mod wire_format;

pub use frame_buffer::FrameBuffer;
pub use wire_format::{build_message, decode_header_length, encode_length_header, HEADER_SIZE};
