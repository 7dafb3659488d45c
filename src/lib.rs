//! # enginewire
//!
//! Session multiplexing and binary framing core for a protocol-translation
//! proxy: many untrusted web/REST clients on one side, a single stateful
//! engine speaking a length-prefixed binary protocol over TCP on the other.
//!
//! ## Architecture
//!
//! - **Codec**: pure transforms between external representations (base64
//!   big-endian 128-bit values, 32-bit integers, hex public keys) and the
//!   engine's little-endian wire fields
//! - **Protocol**: the 4-byte little-endian length framing and the
//!   per-session reassembly of messages split or coalesced by the transport
//! - **Session**: the registry mapping session ids to live connections,
//!   reassemblers and FIFO message queues
//! - **Bootstrap**: validated stop-then-start control of the engine process
//!
//! The proxy never interprets payloads: bytes in, bytes out, framing only.
//!
//! ## Example
//!
//! ```ignore
//! use enginewire::{EngineConfig, SessionOptions, SessionRegistry};
//!
//! #[tokio::main]
//! async fn main() -> enginewire::Result<()> {
//!     let registry = SessionRegistry::new(EngineConfig::from_env());
//!
//!     let id = registry
//!         .setup(SessionOptions::new().on_message(|| println!("frame ready")))
//!         .await?;
//!
//!     registry.send_big_integers(&id, &["4ug="])?;
//!     if let Some(reply) = registry.pop_message(&id)? {
//!         println!("engine sent {} bytes", reply.len());
//!     }
//!
//!     registry.close_connection(&id);
//!     Ok(())
//! }
//! ```

pub mod bootstrap;
pub mod codec;
pub mod config;
pub mod error;
pub mod protocol;
pub mod session;

mod writer;

pub use config::EngineConfig;
pub use error::{EnginewireError, ErrorKind, Result};
pub use session::{SessionOptions, SessionRegistry};
