//! Bounded byte channel between the TAR writer and its consumer.
//!
//! The conversion worker writes TAR bytes synchronously into a [`TarSink`],
//! which batches them into chunks and hands them to a bounded tokio channel.
//! The consumer reads them back through [`TarStream`], an
//! [`AsyncRead`](tokio::io::AsyncRead). When the channel is full the worker
//! blocks, so a slow consumer pauses the conversion instead of letting
//! output pile up in memory.

use std::io;
use std::io::Write;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::task::Context;
use std::task::Poll;

use bytes::Bytes;
use bytes::BytesMut;
use tokio::io::AsyncRead;
use tokio::io::AsyncReadExt;
use tokio::io::ReadBuf;
use tokio::sync::mpsc;

use crate::ConversionError;

/// Size of the chunks handed to the consumer.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Number of chunks that may be in flight before the writer blocks.
pub const CHANNEL_CAPACITY: usize = 8;

type Chunk = io::Result<Bytes>;

/// Creates a connected sink and stream.
pub(crate) fn channel() -> (TarSink, TarStream) {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    let complete = Arc::new(AtomicBool::new(false));
    let sink = TarSink {
        tx,
        buffer: BytesMut::with_capacity(CHUNK_SIZE),
        bytes_sent: 0,
        closed: false,
        complete: Arc::clone(&complete),
    };
    let stream = TarStream {
        rx,
        chunk: Bytes::new(),
        done: false,
        complete,
    };
    (sink, stream)
}

/// Synchronous writer feeding the TAR output channel.
///
/// Must only be written to from a blocking context (a `spawn_blocking` task
/// or a plain thread), since full-channel writes block the calling thread.
///
/// The stream only ends cleanly if the conversion marked the archive as
/// complete before dropping the sink. A sink dropped without it, for example
/// while unwinding from a panic, makes the stream fail.
#[derive(Debug)]
pub struct TarSink {
    tx: mpsc::Sender<Chunk>,
    buffer: BytesMut,
    bytes_sent: u64,
    closed: bool,
    complete: Arc<AtomicBool>,
}

impl TarSink {
    /// Total bytes handed to the consumer so far.
    #[must_use]
    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }

    fn send_chunk(&mut self) -> io::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let chunk = self.buffer.split().freeze();
        let len = chunk.len() as u64;
        self.tx.blocking_send(Ok(chunk)).map_err(|_| {
            self.closed = true;
            io::Error::new(io::ErrorKind::BrokenPipe, "TAR output stream closed")
        })?;
        self.bytes_sent += len;
        Ok(())
    }

    /// Marks the output as a complete archive. Call after the final flush.
    pub(crate) fn mark_complete(&mut self) {
        self.complete.store(true, Ordering::Release);
    }

    /// Pushes `err` to the consumer and closes the sink.
    ///
    /// Buffered bytes that were not yet sent are discarded. Every later write
    /// fails, so nothing can follow the error in the stream.
    pub(crate) fn abort_blocking(&mut self, err: &ConversionError) {
        self.buffer.clear();
        if !self.closed {
            self.closed = true;
            let _ = self.tx.blocking_send(Err(io::Error::other(err.to_string())));
        }
    }

    /// Asynchronous counterpart of [`abort_blocking`](Self::abort_blocking),
    /// for failures that happen before the blocking pass starts.
    pub(crate) async fn abort(mut self, err: &ConversionError) {
        self.buffer.clear();
        self.closed = true;
        let _ = self.tx.send(Err(io::Error::other(err.to_string()))).await;
    }
}

impl Write for TarSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.closed {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "TAR output stream closed",
            ));
        }

        let mut offset = 0;
        while offset < buf.len() {
            if self.buffer.len() >= CHUNK_SIZE {
                self.send_chunk()?;
            }
            let to_copy = (CHUNK_SIZE - self.buffer.len()).min(buf.len() - offset);
            self.buffer.extend_from_slice(&buf[offset..offset + to_copy]);
            offset += to_copy;
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.closed {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "TAR output stream closed",
            ));
        }
        self.send_chunk()
    }
}

/// Readable TAR output of a conversion.
///
/// Yields the TAR bytes in order. If the conversion fails, the stream
/// returns an error after the bytes that were already produced; it never
/// yields a truncated archive followed by a clean end of file.
///
/// Dropping the stream before the end makes the conversion fail with
/// [`ConversionError::OutputClosed`].
#[derive(Debug)]
pub struct TarStream {
    rx: mpsc::Receiver<Chunk>,
    chunk: Bytes,
    done: bool,
    complete: Arc<AtomicBool>,
}

impl TarStream {
    /// Reads the whole TAR output into memory.
    ///
    /// # Errors
    ///
    /// Returns the conversion error, as an `io::Error`, if the conversion
    /// fails.
    pub async fn read_all(mut self) -> io::Result<Vec<u8>> {
        let mut out = Vec::new();
        self.read_to_end(&mut out).await?;
        Ok(out)
    }
}

impl AsyncRead for TarStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();

        loop {
            if !this.chunk.is_empty() {
                let n = this.chunk.len().min(buf.remaining());
                buf.put_slice(&this.chunk.split_to(n));
                return Poll::Ready(Ok(()));
            }
            if this.done {
                return Poll::Ready(Ok(()));
            }

            match this.rx.poll_recv(cx) {
                Poll::Ready(Some(Ok(chunk))) => this.chunk = chunk,
                Poll::Ready(Some(Err(err))) => {
                    this.done = true;
                    return Poll::Ready(Err(err));
                }
                Poll::Ready(None) => {
                    this.done = true;
                    if this.complete.load(Ordering::Acquire) {
                        return Poll::Ready(Ok(()));
                    }
                    return Poll::Ready(Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "TAR output ended before the conversion completed",
                    )));
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_bytes_arrive_in_order() {
        let (mut sink, stream) = channel();
        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        let expected = data.clone();

        let writer = tokio::task::spawn_blocking(move || {
            for piece in data.chunks(777) {
                sink.write_all(piece).unwrap();
            }
            sink.flush().unwrap();
            sink.mark_complete();
            sink.bytes_sent()
        });

        let received = stream.read_all().await.unwrap();
        assert_eq!(writer.await.unwrap(), expected.len() as u64);
        assert_eq!(received, expected);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_dropped_stream_fails_writes() {
        let (mut sink, stream) = channel();
        drop(stream);

        let result = tokio::task::spawn_blocking(move || {
            sink.write_all(&vec![0u8; CHUNK_SIZE * 2])?;
            sink.flush()
        })
        .await
        .unwrap();

        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::BrokenPipe);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_abort_surfaces_error_after_data() {
        let (mut sink, stream) = channel();

        tokio::task::spawn_blocking(move || {
            sink.write_all(b"partial").unwrap();
            sink.flush().unwrap();
            sink.abort_blocking(&ConversionError::OutputClosed);
            assert!(sink.write_all(b"more").is_err());
        })
        .await
        .unwrap();

        let mut stream = stream;
        let mut out = Vec::new();
        let err = stream.read_to_end(&mut out).await.unwrap_err();
        assert_eq!(out, b"partial");
        assert!(err.to_string().contains("closed"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_sink_dropped_mid_write_fails_stream() {
        let (mut sink, stream) = channel();

        let writer = tokio::task::spawn_blocking(move || {
            sink.write_all(b"partial").unwrap();
            sink.flush().unwrap();
            if !sink.closed {
                panic!("writer failed mid-archive");
            }
        });

        let mut stream = stream;
        let mut out = Vec::new();
        let err = stream.read_to_end(&mut out).await.unwrap_err();
        assert_eq!(out, b"partial");
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert!(writer.await.unwrap_err().is_panic());
    }

    #[tokio::test]
    async fn test_async_abort() {
        let (sink, stream) = channel();
        sink.abort(&ConversionError::MissingEndOfCentralDirectory)
            .await;

        let err = stream.read_all().await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "end of central directory record signature not found"
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_backpressure_bounds_in_flight_chunks() {
        let (mut sink, mut stream) = channel();

        let writer = tokio::task::spawn_blocking(move || {
            sink.write_all(&vec![1u8; CHUNK_SIZE * (CHANNEL_CAPACITY + 4)])?;
            sink.flush()?;
            sink.mark_complete();
            Ok::<u64, io::Error>(sink.bytes_sent())
        });

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(!writer.is_finished());

        let mut out = Vec::new();
        stream.read_to_end(&mut out).await.unwrap();
        assert_eq!(writer.await.unwrap().unwrap(), out.len() as u64);
        assert_eq!(out.len(), CHUNK_SIZE * (CHANNEL_CAPACITY + 4));
    }
}
