//! Frame buffer for accumulating partial reads.
//!
//! Uses `bytes::BytesMut` for zero-copy buffer management.
//! Implements a state machine for handling fragmented messages:
//! - `AwaitingHeader`: positioned at a message boundary, need 4 header bytes
//! - `AwaitingPayload`: header parsed, need N more payload bytes
//!
//! The engine stream delivers bytes with arbitrary chunking: a message may
//! arrive whole, split across many reads, or coalesced with the next
//! message(s) in a single read. `push` handles all three, draining complete
//! messages with an explicit loop so a read containing many small messages
//! never grows the stack.
//!
//! # Example
//!
//! ```
//! use enginewire::protocol::FrameBuffer;
//!
//! let mut buffer = FrameBuffer::new();
//!
//! // Two coalesced messages in one read
//! let messages = buffer.push(&[2, 0, 0, 0, 0xAA, 0xBB, 1, 0, 0, 0, 0xCC]);
//! assert_eq!(messages.len(), 2);
//! assert_eq!(&messages[0][..], &[0xAA, 0xBB]);
//! assert_eq!(&messages[1][..], &[0xCC]);
//! ```

use bytes::{Bytes, BytesMut};

use super::wire_format::HEADER_SIZE;

/// State machine for message parsing.
#[derive(Debug, Clone, Copy)]
enum State {
    /// At a message boundary, waiting for a complete 4-byte length header.
    AwaitingHeader,
    /// Header consumed, waiting for the remaining payload bytes.
    AwaitingPayload { remaining: u32 },
}

/// Buffer for accumulating incoming bytes and extracting complete messages.
///
/// One per session; all mutation happens from that session's single inbound
/// byte stream, so the buffer needs no internal synchronization. Carryover
/// bytes (a short header fragment or a partial payload) stay in the buffer
/// until later chunks complete them.
pub struct FrameBuffer {
    /// Accumulated bytes from socket reads.
    buffer: BytesMut,
    /// Current parsing state.
    state: State,
}

impl FrameBuffer {
    /// Create a new frame buffer.
    ///
    /// Default capacity: 64KB.
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(64 * 1024),
            state: State::AwaitingHeader,
        }
    }

    /// Push data into the buffer and extract all complete messages.
    ///
    /// This is the main API for processing incoming data from the socket.
    /// Returns the completed message payloads, oldest first, with the
    /// length headers stripped. If data is fragmented, partial data is
    /// buffered internally for the next push.
    pub fn push(&mut self, data: &[u8]) -> Vec<Bytes> {
        self.buffer.extend_from_slice(data);

        let mut messages = Vec::new();

        // Drain as many complete messages as possible. An explicit loop,
        // not recursion: one read may coalesce thousands of tiny messages.
        while let Some(payload) = self.try_extract_one() {
            messages.push(payload);
        }

        messages
    }

    /// Try to extract a single message payload from the buffer.
    ///
    /// Returns `None` when more data is needed.
    fn try_extract_one(&mut self) -> Option<Bytes> {
        loop {
            match self.state {
                State::AwaitingHeader => {
                    if self.buffer.len() < HEADER_SIZE {
                        return None;
                    }

                    let header = self.buffer.split_to(HEADER_SIZE);
                    let expected =
                        u32::from_le_bytes([header[0], header[1], header[2], header[3]]);

                    if expected == 0 {
                        // Zero-length message: complete at the boundary.
                        return Some(Bytes::new());
                    }

                    self.state = State::AwaitingPayload {
                        remaining: expected,
                    };
                    // Fall through and try the payload immediately.
                }

                State::AwaitingPayload { remaining } => {
                    let remaining = remaining as usize;

                    if self.buffer.len() < remaining {
                        return None;
                    }

                    // Zero-copy freeze of exactly one payload.
                    let payload = self.buffer.split_to(remaining).freeze();
                    self.state = State::AwaitingHeader;
                    return Some(payload);
                }
            }
        }
    }

    /// True iff the buffer is positioned at a message boundary with no
    /// carryover bytes.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty() && matches!(self.state, State::AwaitingHeader)
    }

    /// Number of carryover bytes not yet attributable to a complete message.
    pub fn carryover_len(&self) -> usize {
        self.buffer.len()
    }

    /// Clear the buffer and reset to the message boundary.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.state = State::AwaitingHeader;
    }

    /// Get the current state for debugging.
    #[cfg(test)]
    fn state_name(&self) -> &'static str {
        match self.state {
            State::AwaitingHeader => "AwaitingHeader",
            State::AwaitingPayload { .. } => "AwaitingPayload",
        }
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}
