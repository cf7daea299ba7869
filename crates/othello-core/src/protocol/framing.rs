//! Stream framing over any tokio byte stream.
//!
//! TCP delivers bytes, not messages: one `read` may return half a header, or
//! the tail of one frame glued to the start of the next. [`FrameReader`]
//! buffers whatever arrives and hands out whole [`OthelloMessage`]s.
//! [`FrameWriter`] stamps each outgoing frame with its own sequence number.

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::protocol::codec::{decode_message, encode_message, ProtocolError};
use crate::protocol::messages::OthelloMessage;
use crate::protocol::sequence::SequenceCounter;

const READ_CHUNK: usize = 4096;

/// Errors raised while reading or writing frames.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("stream I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The bytes on the stream are not a valid frame. The stream cannot be
    /// resynchronised after this.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The peer closed the stream in the middle of a frame.
    #[error("stream closed with {buffered} bytes of an incomplete frame")]
    Truncated { buffered: usize },
}

impl FrameError {
    /// For an error from [`FrameWriter::send`]: true when the write half may
    /// hold a partial frame and must not be written to again.
    pub fn poisons_writer(&self) -> bool {
        !matches!(self, FrameError::Protocol(_))
    }
}

/// Reads whole messages from a byte stream.
pub struct FrameReader<R> {
    inner: R,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Vec::with_capacity(READ_CHUNK),
        }
    }

    /// Returns the next message, or `Ok(None)` on a clean end of stream.
    ///
    /// # Errors
    ///
    /// [`FrameError::Protocol`] for a corrupt frame, [`FrameError::Truncated`]
    /// if the stream ends mid-frame, [`FrameError::Io`] for socket errors.
    pub async fn next_message(&mut self) -> Result<Option<OthelloMessage>, FrameError> {
        loop {
            match decode_message(&self.buf) {
                Ok((msg, consumed)) => {
                    self.buf.drain(..consumed);
                    return Ok(Some(msg));
                }
                // Incomplete header or payload – keep reading.
                Err(ProtocolError::InsufficientData { .. })
                | Err(ProtocolError::PayloadLengthMismatch { .. }) => {}
                Err(e) => return Err(FrameError::Protocol(e)),
            }

            let mut chunk = [0u8; READ_CHUNK];
            let n = self.inner.read(&mut chunk).await?;
            if n == 0 {
                return if self.buf.is_empty() {
                    Ok(None)
                } else {
                    Err(FrameError::Truncated {
                        buffered: self.buf.len(),
                    })
                };
            }
            self.buf.extend_from_slice(&chunk[..n]);
        }
    }
}

/// Writes messages to a byte stream, one whole frame per call.
pub struct FrameWriter<W> {
    inner: W,
    seq: SequenceCounter,
}

impl<W: AsyncWrite + Unpin> FrameWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            seq: SequenceCounter::new(),
        }
    }

    /// Encodes, writes and flushes `msg`. Returns the sequence number used.
    ///
    /// # Errors
    ///
    /// [`FrameError::Protocol`] if `msg` cannot be encoded; nothing was
    /// written and the stream is still usable. [`FrameError::Io`] otherwise,
    /// after which the stream may hold a partial frame.
    pub async fn send(&mut self, msg: &OthelloMessage) -> Result<u64, FrameError> {
        let bytes = encode_message(msg, self.seq.current())?;
        let seq = self.seq.next();
        self.inner.write_all(&bytes).await?;
        self.inner.flush().await?;
        Ok(seq)
    }

    /// Shuts down the write direction of the stream.
    pub async fn shutdown(&mut self) -> Result<(), FrameError> {
        self.inner.shutdown().await?;
        Ok(())
    }

    pub fn frames_sent(&self) -> u64 {
        self.seq.current()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
