//! One live outbound connection to the engine.
//!
//! A [`Connection`] owns the TCP stream's two halves indirectly: the write
//! half lives inside a spawned writer task (see [`crate::writer`]) and the
//! read half inside a spawned read task that feeds the session's
//! [`FrameBuffer`] and [`InboundQueue`]. Teardown aborts both tasks;
//! nothing blocks on a remote peer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

use crate::error::Result;
use crate::protocol::FrameBuffer;
use crate::session::InboundQueue;
use crate::writer::{spawn_writer_task, WriterHandle};

/// Notification fired when the reassembler completes a frame.
///
/// Carries no payload: the consumer pulls the message body separately via
/// `pop_message`.
pub type NotifyCallback = Arc<dyn Fn() + Send + Sync>;

/// Notification fired once when the engine closes the transport.
pub type ClosedCallback = Arc<dyn Fn() + Send + Sync>;

/// Size of the read buffer handed to the socket.
const READ_BUF_SIZE: usize = 64 * 1024;

/// A live connection to the engine for one session.
pub struct Connection {
    writer: WriterHandle,
    alive: Arc<AtomicBool>,
    read_task: JoinHandle<()>,
    write_task: JoinHandle<Result<()>>,
}

impl Connection {
    /// Dial the engine and wire up the read/write tasks for a session.
    ///
    /// Suspends only up to connect-success-or-error; no artificial timeout
    /// is imposed beyond the transport's own. A refused or unreachable
    /// engine surfaces as `Err` and is never retried here.
    pub async fn establish(
        addr: &str,
        session_id: String,
        queue: Arc<InboundQueue>,
        on_message: Option<NotifyCallback>,
        on_closed: Option<ClosedCallback>,
    ) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        tracing::debug!("session {}: connected to engine at {}", session_id, addr);

        let (reader, write_half) = stream.into_split();
        let (writer, write_task) = spawn_writer_task(write_half);

        let alive = Arc::new(AtomicBool::new(true));
        let alive_flag = alive.clone();

        let read_task = tokio::spawn(async move {
            read_loop(reader, &session_id, &queue, on_message.as_ref()).await;
            alive_flag.store(false, Ordering::Release);
            if let Some(cb) = &on_closed {
                cb();
            }
        });

        Ok(Self {
            writer,
            alive,
            read_task,
            write_task,
        })
    }

    /// True while the engine has not closed the transport.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Handle for queueing outbound messages.
    pub(crate) fn writer(&self) -> &WriterHandle {
        &self.writer
    }

    /// Tear the connection down and discard the session's queued messages.
    ///
    /// Aborts both tasks and clears the queue immediately, then clears it
    /// once more after the aborted reader settles: abort only lands at the
    /// task's next await, so a push already executing in the current loop
    /// iteration could otherwise slip in behind the first clear. The close
    /// callback does not fire for an explicit teardown; it is reserved for
    /// the engine closing the transport.
    pub(crate) fn close_with_queue(self, queue: Arc<InboundQueue>) {
        let Self {
            read_task,
            write_task,
            alive,
            ..
        } = self;

        read_task.abort();
        write_task.abort();
        alive.store(false, Ordering::Release);
        queue.clear();

        tokio::spawn(async move {
            let _ = read_task.await;
            queue.clear();
        });
    }
}

/// Read bytes from the engine until EOF or a transport/framing failure.
///
/// Every completed frame is appended to the queue before the no-payload
/// notification fires, so a consumer woken by the callback always finds the
/// message already poppable.
async fn read_loop<R: tokio::io::AsyncRead + Unpin>(
    mut reader: R,
    session_id: &str,
    queue: &InboundQueue,
    on_message: Option<&NotifyCallback>,
) {
    let mut frame_buffer = FrameBuffer::new();
    let mut buf = vec![0u8; READ_BUF_SIZE];

    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => {
                tracing::debug!("session {}: engine closed the transport", session_id);
                return;
            }
            Ok(n) => n,
            Err(e) => {
                tracing::warn!("session {}: transport error: {}", session_id, e);
                return;
            }
        };

        for message in frame_buffer.push(&buf[..n]) {
            queue.push(message);
            if let Some(cb) = on_message {
                cb();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use std::sync::atomic::AtomicUsize;
    use tokio::io::duplex;

    #[tokio::test]
    async fn test_read_loop_queues_frames_and_notifies() {
        let (mut engine, proxy) = duplex(4096);
        let queue = Arc::new(InboundQueue::new());
        let notified = Arc::new(AtomicUsize::new(0));

        let notified_clone = notified.clone();
        let on_message: NotifyCallback = Arc::new(move || {
            notified_clone.fetch_add(1, Ordering::SeqCst);
        });

        let queue_clone = queue.clone();
        let task = tokio::spawn(async move {
            read_loop(proxy, "t", &queue_clone, Some(&on_message)).await;
        });

        // Two coalesced messages in one write
        tokio::io::AsyncWriteExt::write_all(
            &mut engine,
            &[2, 0, 0, 0, 0xAA, 0xBB, 1, 0, 0, 0, 0xCC],
        )
        .await
        .unwrap();
        drop(engine);
        task.await.unwrap();

        assert_eq!(notified.load(Ordering::SeqCst), 2);
        assert_eq!(queue.pop().unwrap(), Bytes::from_static(&[0xAA, 0xBB]));
        assert_eq!(queue.pop().unwrap(), Bytes::from_static(&[0xCC]));
        assert!(queue.pop().is_none());
    }

    #[tokio::test]
    async fn test_read_loop_split_message_across_writes() {
        let (mut engine, proxy) = duplex(4096);
        let queue = Arc::new(InboundQueue::new());

        let queue_clone = queue.clone();
        let task = tokio::spawn(async move {
            read_loop(proxy, "t", &queue_clone, None).await;
        });

        tokio::io::AsyncWriteExt::write_all(&mut engine, &[3, 0])
            .await
            .unwrap();
        tokio::io::AsyncWriteExt::flush(&mut engine).await.unwrap();
        tokio::io::AsyncWriteExt::write_all(&mut engine, &[0, 0, 1, 2])
            .await
            .unwrap();
        tokio::io::AsyncWriteExt::write_all(&mut engine, &[3])
            .await
            .unwrap();
        drop(engine);
        task.await.unwrap();

        assert_eq!(queue.pop().unwrap(), Bytes::from_static(&[1, 2, 3]));
        assert!(queue.pop().is_none());
    }
}
