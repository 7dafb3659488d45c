//! Session module - connection lifecycle, registry and inbound queueing.
//!
//! A session is one external client's logical relationship to one engine
//! connection: the [`SessionRegistry`] owns the id → state map, each live
//! session owns exactly one [`Connection`] plus a frame reassembler and an
//! [`InboundQueue`] of completed messages awaiting consumption.

pub(crate) mod connection;
mod queue;
mod registry;

pub use connection::{ClosedCallback, Connection, NotifyCallback};
pub use queue::InboundQueue;
pub use registry::{SessionOptions, SessionRegistry};
