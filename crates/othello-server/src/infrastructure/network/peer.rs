//! Frame-writing [`PeerSink`] over a TCP write half.
//!
//! Every write goes through a per-peer mutex so frames from concurrent
//! broadcasts never interleave on the wire. An optional deadline keeps one
//! stalled client from holding up the session: on timeout the writer is
//! dropped and the peer counts as gone.

use std::time::Duration;

use async_trait::async_trait;
use othello_core::{FrameError, FrameWriter, OthelloMessage};
use tokio::io::AsyncWrite;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::application::session_hub::{ConnectionError, PeerSink};

/// The sink used for real client connections.
pub type TcpPeer = StreamPeer<OwnedWriteHalf>;

/// A [`PeerSink`] that writes frames to any async byte stream.
pub struct StreamPeer<W> {
    label: String,
    writer: Mutex<Option<FrameWriter<W>>>,
    write_timeout: Option<Duration>,
}

impl<W: AsyncWrite + Unpin + Send> StreamPeer<W> {
    /// `label` only appears in log lines, typically the peer address.
    pub fn new(label: impl Into<String>, stream: W, write_timeout: Option<Duration>) -> Self {
        Self {
            label: label.into(),
            writer: Mutex::new(Some(FrameWriter::new(stream))),
            write_timeout,
        }
    }

    pub async fn is_closed(&self) -> bool {
        self.writer.lock().await.is_none()
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> PeerSink for StreamPeer<W> {
    async fn send(&self, msg: &OthelloMessage) -> Result<(), ConnectionError> {
        let mut guard = self.writer.lock().await;
        let writer = guard.as_mut().ok_or(ConnectionError::Closed)?;

        let result = match self.write_timeout {
            Some(limit) => match tokio::time::timeout(limit, writer.send(msg)).await {
                Ok(sent) => sent,
                Err(_) => {
                    warn!("write to {} timed out after {limit:?}, dropping peer", self.label);
                    *guard = None;
                    return Err(ConnectionError::Timeout(limit));
                }
            },
            None => writer.send(msg).await,
        };

        match result {
            Ok(seq) => {
                debug!("sent {:?} #{seq} to {}", msg.message_type(), self.label);
                Ok(())
            }
            Err(e) => {
                if e.poisons_writer() {
                    *guard = None;
                } else {
                    warn!("could not encode {:?} for {}: {e}", msg.message_type(), self.label);
                }
                Err(e.into())
            }
        }
    }

    async fn close(&self) {
        if let Some(mut writer) = self.writer.lock().await.take() {
            if let Err(e) = writer.shutdown().await {
                debug!("shutdown of {} failed: {e}", self.label);
            }
        }
    }
}

impl From<FrameError> for ConnectionError {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::Io(e) => ConnectionError::Io(e),
            other => ConnectionError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                other.to_string(),
            )),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
