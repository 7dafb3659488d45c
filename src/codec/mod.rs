//! Codec module - transforms between external and engine representations.
//!
//! External callers speak base64/hex/JSON-friendly values; the engine
//! speaks little-endian binary fields behind a 4-byte length header. The
//! codecs here are the byte-level bridge:
//!
//! - [`BigIntCodec`] - 128-bit values, base64 big-endian externally,
//!   16-byte little-endian fields on the wire
//! - [`IntegerCodec`] - 32-bit signed integers, 4-byte little-endian fields
//! - [`PublicKeyCodec`] - 64-char hex keys, eight independently
//!   byte-reversed 4-byte groups on the wire
//!
//! # Design
//!
//! Codecs are marker structs with static methods rather than trait objects:
//! there is no runtime codec selection, and the proxy never interprets the
//! numeric content beyond transcoding bytes.
//!
//! # Example
//!
//! ```
//! use enginewire::codec::BigIntCodec;
//!
//! let wire = BigIntCodec::encode(&["4ug="]).unwrap();
//! assert_eq!(hex::encode(&wire), "10000000e8e20000000000000000000000000000");
//! ```

mod bigint;
mod integer;
mod pubkey;

pub use bigint::{BigIntCodec, BIGINT_FIELD_SIZE};
pub use integer::{IntegerCodec, INTEGER_FIELD_SIZE};
pub use pubkey::{PublicKeyCodec, PUBLIC_KEY_HEX_LEN, PUBLIC_KEY_SIZE};
