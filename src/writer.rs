//! Dedicated writer task for outbound engine messages.
//!
//! Each session connection gets one writer task fed by an mpsc channel of
//! pre-framed buffers (the codecs already prepend the length header, so a
//! message is written verbatim). The channel replaces an
//! `Arc<Mutex<WriteHalf>>`: senders never contend on a lock, and ready
//! messages are batched into single vectored writes.
//!
//! ```text
//! send_big_integers ─┐
//! send_integers     ─┼─► mpsc::Sender<Bytes> ─► Writer Task ─► TCP socket
//! auth material     ─┘
//! ```
//!
//! Dropping the last [`WriterHandle`] closes the channel; the task drains
//! and exits, which shuts down the connection's write side.

use std::io::IoSlice;

use bytes::Bytes;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{EnginewireError, Result};

/// Default channel capacity.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Maximum messages to batch in a single write operation.
const MAX_BATCH_SIZE: usize = 64;

/// Handle for sending pre-framed messages to the writer task.
///
/// Cheaply cloneable; one per live session connection.
#[derive(Clone)]
pub struct WriterHandle {
    tx: mpsc::Sender<Bytes>,
}

impl WriterHandle {
    /// Send a framed message to the writer task.
    ///
    /// Waits for channel capacity. Errors only if the connection's writer
    /// task has exited.
    pub async fn send(&self, message: Bytes) -> Result<()> {
        self.tx
            .send(message)
            .await
            .map_err(|_| EnginewireError::ConnectionClosed)
    }

    /// Send without waiting for capacity.
    ///
    /// Used on the registry's synchronous send path: a full channel or a
    /// dead task both surface as [`EnginewireError::ConnectionClosed`]-class
    /// failures to the caller.
    pub fn try_send(&self, message: Bytes) -> Result<()> {
        self.tx
            .try_send(message)
            .map_err(|_| EnginewireError::ConnectionClosed)
    }
}

/// Spawn the writer task for a connection's write half.
///
/// Returns a handle for queueing messages and the task's join handle.
pub fn spawn_writer_task<W>(writer: W) -> (WriterHandle, JoinHandle<Result<()>>)
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(DEFAULT_CHANNEL_CAPACITY);
    let task = tokio::spawn(writer_loop(rx, writer));
    (WriterHandle { tx }, task)
}

/// Main writer loop - receives framed messages and writes them out.
async fn writer_loop<W>(mut rx: mpsc::Receiver<Bytes>, mut writer: W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    loop {
        // Wait for the first message
        let first = match rx.recv().await {
            Some(m) => m,
            None => return Ok(()), // Channel closed, clean shutdown
        };

        // Collect additional ready messages without blocking
        let mut batch = Vec::with_capacity(MAX_BATCH_SIZE);
        batch.push(first);

        while batch.len() < MAX_BATCH_SIZE {
            match rx.try_recv() {
                Ok(message) => batch.push(message),
                Err(_) => break,
            }
        }

        write_batch(&mut writer, &batch).await?;
    }
}

/// Write a batch of framed messages using vectored I/O.
async fn write_batch<W>(writer: &mut W, batch: &[Bytes]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    if batch.is_empty() {
        return Ok(());
    }

    let total_size: usize = batch.iter().map(|m| m.len()).sum();
    let slices: Vec<IoSlice<'_>> = batch.iter().map(|m| IoSlice::new(m)).collect();

    // Fast path: everything fits in one syscall
    let mut total_written = writer.write_vectored(&slices).await?;
    if total_written == 0 && total_size > 0 {
        return Err(EnginewireError::Io(std::io::Error::new(
            std::io::ErrorKind::WriteZero,
            "write_vectored returned 0",
        )));
    }

    // Slow path: continue with whatever remains after a partial write
    while total_written < total_size {
        let remaining = build_remaining_slices(batch, total_written);
        if remaining.is_empty() {
            break;
        }

        let written = writer.write_vectored(&remaining).await?;
        if written == 0 {
            return Err(EnginewireError::Io(std::io::Error::new(
                std::io::ErrorKind::WriteZero,
                "write_vectored returned 0",
            )));
        }
        total_written += written;
    }

    writer.flush().await?;
    Ok(())
}

/// Build the IoSlice array for data remaining after a partial write.
fn build_remaining_slices(batch: &[Bytes], skip_bytes: usize) -> Vec<IoSlice<'_>> {
    let mut slices = Vec::with_capacity(batch.len());
    let mut skipped = 0;

    for message in batch {
        let end = skipped + message.len();
        if skip_bytes < end {
            let start = skip_bytes.saturating_sub(skipped);
            slices.push(IoSlice::new(&message[start..]));
        }
        skipped = end;
    }

    slices
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::Duration;
    use tokio::io::duplex;

    #[tokio::test]
    async fn test_writer_handle_send() {
        let (client, mut server) = duplex(4096);
        let (handle, _task) = spawn_writer_task(client);

        handle
            .send(Bytes::from_static(&[5, 0, 0, 0, b'h', b'e', b'l', b'l', b'o']))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(10)).await;

        let mut buf = vec![0u8; 64];
        let n = tokio::io::AsyncReadExt::read(&mut server, &mut buf)
            .await
            .unwrap();
        assert_eq!(n, 9);
        assert_eq!(&buf[..4], &[5, 0, 0, 0]);
    }

    #[tokio::test]
    async fn test_writer_batching_preserves_order() {
        let (client, mut server) = duplex(4096);
        let (handle, _task) = spawn_writer_task(client);

        for i in 0..10u8 {
            let mut msg = vec![1, 0, 0, 0];
            msg.push(i);
            handle.send(Bytes::from(msg)).await.unwrap();
        }

        tokio::time::sleep(Duration::from_millis(50)).await;

        let mut buf = vec![0u8; 1024];
        let n = tokio::io::AsyncReadExt::read(&mut server, &mut buf)
            .await
            .unwrap();

        assert_eq!(n, 10 * 5);
        for i in 0..10u8 {
            assert_eq!(buf[i as usize * 5 + 4], i);
        }
    }

    #[tokio::test]
    async fn test_writer_shutdown_on_channel_close() {
        let (client, _server) = duplex(4096);
        let (handle, task) = spawn_writer_task(client);

        drop(handle);

        let result = task.await.unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_send_after_task_gone() {
        let (client, server) = duplex(4096);
        let (handle, task) = spawn_writer_task(client);

        // Kill the peer and the task
        drop(server);
        task.abort();
        let _ = task.await;

        let result = handle.send(Bytes::from_static(b"x")).await;
        assert!(matches!(result, Err(EnginewireError::ConnectionClosed)));
    }

    #[tokio::test]
    async fn test_write_batch_multiple() {
        let mut buf = Cursor::new(Vec::new());

        let batch = vec![
            Bytes::from_static(&[2, 0, 0, 0, 0xAA, 0xBB]),
            Bytes::from_static(&[1, 0, 0, 0, 0xCC]),
        ];
        write_batch(&mut buf, &batch).await.unwrap();

        let written = buf.into_inner();
        assert_eq!(written.len(), 11);
        assert_eq!(written[10], 0xCC);
    }

    #[test]
    fn test_build_remaining_slices() {
        let batch = vec![Bytes::from_static(b"abcd"), Bytes::from_static(b"efgh")];

        let slices = build_remaining_slices(&batch, 0);
        assert_eq!(slices.len(), 2);

        let slices = build_remaining_slices(&batch, 2);
        assert_eq!(slices.len(), 2);
        assert_eq!(&*slices[0], b"cd");

        let slices = build_remaining_slices(&batch, 4);
        assert_eq!(slices.len(), 1);
        assert_eq!(&*slices[0], b"efgh");

        let slices = build_remaining_slices(&batch, 8);
        assert!(slices.is_empty());
    }
}
