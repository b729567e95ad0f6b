//! Reader that enforces a declared content length.
//!
//! A TAR header carries the entry size before the content, so the content
//! stream must produce exactly that many bytes. The `tar` crate pads
//! whatever it copies without checking it against the header, which would
//! silently corrupt the archive on a short read.

use std::io;
use std::io::Read;

/// What went wrong while reading through an [`ExactSizeReader`].
#[derive(Debug)]
pub enum ReadFailure {
    /// The inner reader returned an error.
    Inner(io::Error),
    /// The inner reader ended early or ran past the declared size.
    Length {
        /// Declared size.
        expected: u64,
        /// Bytes observed.
        actual: u64,
    },
}

/// Wrapper that yields exactly `expected` bytes or fails.
///
/// The first failure is recorded and can be taken back with
/// [`take_failure`](Self::take_failure) after the consumer (the TAR builder)
/// has turned it into a plain `io::Error`.
///
/// # Examples
///
/// ```
/// use std::io::Read;
/// use zip2tar_core::io::ExactSizeReader;
///
/// let mut reader = ExactSizeReader::new(&b"hello"[..], 5);
/// let mut out = Vec::new();
/// reader.read_to_end(&mut out)?;
/// assert_eq!(out, b"hello");
/// assert_eq!(reader.bytes_read(), 5);
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct ExactSizeReader<R> {
    inner: R,
    expected: u64,
    read: u64,
    failure: Option<ReadFailure>,
}

impl<R> ExactSizeReader<R> {
    /// Wraps `inner`, which must yield exactly `expected` bytes.
    #[must_use]
    pub fn new(inner: R, expected: u64) -> Self {
        Self {
            inner,
            expected,
            read: 0,
            failure: None,
        }
    }

    /// Bytes read so far.
    #[must_use]
    pub fn bytes_read(&self) -> u64 {
        self.read
    }

    /// Takes the recorded failure, if any.
    pub fn take_failure(&mut self) -> Option<ReadFailure> {
        self.failure.take()
    }

    fn fail(&mut self, failure: ReadFailure) -> io::Error {
        let err = match &failure {
            ReadFailure::Inner(err) => io::Error::new(err.kind(), err.to_string()),
            ReadFailure::Length { expected, actual } => io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("expected {expected} bytes, got {actual}"),
            ),
        };
        self.failure = Some(failure);
        err
    }
}

impl<R: Read> Read for ExactSizeReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let remaining = self.expected - self.read;
        if remaining == 0 {
            // Probe one byte to catch content longer than declared.
            let mut probe = [0u8; 1];
            return match self.inner.read(&mut probe) {
                Ok(0) => Ok(0),
                Ok(_) => Err(self.fail(ReadFailure::Length {
                    expected: self.expected,
                    actual: self.expected + 1,
                })),
                Err(e) => Err(self.fail(ReadFailure::Inner(e))),
            };
        }

        let limit = usize::try_from(remaining).map_or(buf.len(), |r| r.min(buf.len()));
        match self.inner.read(&mut buf[..limit]) {
            Ok(0) => Err(self.fail(ReadFailure::Length {
                expected: self.expected,
                actual: self.read,
            })),
            Ok(n) => {
                self.read += n as u64;
                Ok(n)
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Err(e),
            Err(e) => Err(self.fail(ReadFailure::Inner(e))),
        }
    }
}
