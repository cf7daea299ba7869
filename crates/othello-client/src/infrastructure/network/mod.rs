//! Network infrastructure for the client application.
//!
//! Holds the TCP connection to the game server and dispatches inbound
//! [`OthelloMessage`]s to the application layer.
//!
//! Architecture:
//! - `ClientConnection` owns the write half of the stream.
//! - A spawned task owns the read half, decodes frames and forwards them on
//!   an `mpsc` channel as [`NetworkEvent`]s.
//! - Outbound intents go through [`GameSender`].

use std::sync::Arc;

use async_trait::async_trait;
use othello_core::{FrameError, FrameReader, FrameWriter, OthelloMessage};
use thiserror::Error;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use crate::application::play::GameSender;

/// Errors that can occur in the client network layer.
#[derive(Debug, Error)]
pub enum ClientNetworkError {
    /// TCP connection to the server failed.
    #[error("failed to connect to server at {addr}: {source}")]
    ConnectFailed {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    /// An I/O error occurred on the established connection.
    #[error("connection I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A message could not be encoded or decoded.
    #[error("protocol error: {0}")]
    Protocol(String),
    /// The connection was closed by either side.
    #[error("connection closed")]
    Closed,
}

impl From<FrameError> for ClientNetworkError {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::Io(e) => ClientNetworkError::Io(e),
            other => ClientNetworkError::Protocol(other.to_string()),
        }
    }
}

/// Events emitted by the network layer to the application layer.
#[derive(Debug)]
pub enum NetworkEvent {
    /// A message was received from the server.
    MessageReceived(OthelloMessage),
    /// The TCP connection was established.
    Connected { server_addr: String },
    /// The server closed the connection, or reading from it failed.
    Disconnected,
}

/// Connection from the client to the game server.
pub struct ClientConnection {
    writer: Arc<Mutex<Option<FrameWriter<OwnedWriteHalf>>>>,
}

impl ClientConnection {
    /// Connects to `addr` (`host:port`) and starts the read task.
    ///
    /// The returned receiver yields `Connected` first, then one
    /// `MessageReceived` per frame, then `Disconnected` exactly once.
    ///
    /// # Errors
    ///
    /// [`ClientNetworkError::ConnectFailed`] if the TCP connect fails.
    pub async fn connect(
        addr: &str,
    ) -> Result<(Self, mpsc::Receiver<NetworkEvent>), ClientNetworkError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|source| ClientNetworkError::ConnectFailed {
                addr: addr.to_string(),
                source,
            })?;
        if let Err(e) = stream.set_nodelay(true) {
            debug!("set_nodelay failed: {e}");
        }
        info!("connected to server at {addr}");

        let (read_half, write_half) = stream.into_split();
        let (tx, rx) = mpsc::channel(128);
        // Capacity is fresh, so this cannot fail.
        let _ = tx.try_send(NetworkEvent::Connected {
            server_addr: addr.to_string(),
        });
        tokio::spawn(read_loop(FrameReader::new(read_half), tx));

        Ok((
            Self {
                writer: Arc::new(Mutex::new(Some(FrameWriter::new(write_half)))),
            },
            rx,
        ))
    }

    /// Encodes and sends a message to the server.
    ///
    /// # Errors
    ///
    /// [`ClientNetworkError::Closed`] after [`close`](Self::close) or a
    /// previous write failure; otherwise the underlying error. Only I/O
    /// failures close the connection.
    pub async fn send_message(&self, msg: &OthelloMessage) -> Result<(), ClientNetworkError> {
        let mut guard = self.writer.lock().await;
        let writer = guard.as_mut().ok_or(ClientNetworkError::Closed)?;
        if let Err(e) = writer.send(msg).await {
            if e.poisons_writer() {
                *guard = None;
            }
            return Err(e.into());
        }
        Ok(())
    }

    /// Shuts down the write direction. The server sees this as a disconnect.
    pub async fn close(&self) {
        if let Some(mut writer) = self.writer.lock().await.take() {
            if let Err(e) = writer.shutdown().await {
                debug!("shutdown failed: {e}");
            }
        }
    }
}

#[async_trait]
impl GameSender for ClientConnection {
    async fn send(&self, msg: &OthelloMessage) -> Result<(), ClientNetworkError> {
        self.send_message(msg).await
    }
}

/// Reads frames until the stream ends and forwards them on `tx`.
async fn read_loop(mut reader: FrameReader<OwnedReadHalf>, tx: mpsc::Sender<NetworkEvent>) {
    loop {
        match reader.next_message().await {
            Ok(Some(msg)) => {
                debug!("received {:?}", msg.message_type());
                if tx.send(NetworkEvent::MessageReceived(msg)).await.is_err() {
                    return;
                }
            }
            Ok(None) => {
                info!("server closed the connection");
                break;
            }
            Err(e) => {
                warn!("dropping connection: {e}");
                break;
            }
        }
    }
    let _ = tx.send(NetworkEvent::Disconnected).await;
}

// ── Tests ─────────────────────────────────────────────────────────────────────
