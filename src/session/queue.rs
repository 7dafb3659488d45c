//! Inbound message queue.
//!
//! One FIFO per session, append-only from the connection's read task,
//! consumed only by `pop_message`. Unbounded by design: consumers are
//! expected to drain promptly, and a producer outpacing an absent consumer
//! is an accepted resource-growth risk rather than something the queue
//! prevents.

use std::collections::VecDeque;
use std::sync::Mutex;

use bytes::Bytes;

/// FIFO of completed messages awaiting consumption.
///
/// Messages are opaque payload bytes with the length header already
/// stripped. Order is exactly the order frames completed on the transport;
/// no reordering, no deduplication.
#[derive(Debug, Default)]
pub struct InboundQueue {
    inner: Mutex<VecDeque<Bytes>>,
}

impl InboundQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a completed message.
    pub fn push(&self, message: Bytes) {
        self.inner
            .lock()
            .expect("inbound queue lock poisoned")
            .push_back(message);
    }

    /// Remove and return the oldest message, or `None` if empty.
    pub fn pop(&self) -> Option<Bytes> {
        self.inner
            .lock()
            .expect("inbound queue lock poisoned")
            .pop_front()
    }

    /// Number of queued messages.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .expect("inbound queue lock poisoned")
            .len()
    }

    /// True if no messages are queued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Discard all queued messages.
    pub fn clear(&self) {
        self.inner
            .lock()
            .expect("inbound queue lock poisoned")
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let queue = InboundQueue::new();
        queue.push(Bytes::from_static(b"first"));
        queue.push(Bytes::from_static(b"second"));
        queue.push(Bytes::from_static(b"third"));

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.pop().unwrap(), Bytes::from_static(b"first"));
        assert_eq!(queue.pop().unwrap(), Bytes::from_static(b"second"));
        assert_eq!(queue.pop().unwrap(), Bytes::from_static(b"third"));
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_empty_pop_is_none_not_panic() {
        let queue = InboundQueue::new();
        assert!(queue.pop().is_none());
        assert!(queue.pop().is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_clear() {
        let queue = InboundQueue::new();
        queue.push(Bytes::from_static(b"x"));
        queue.push(Bytes::from_static(b"y"));
        queue.clear();
        assert!(queue.is_empty());
        assert!(queue.pop().is_none());
    }
}
