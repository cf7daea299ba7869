//! TCP accept loop and per-connection read tasks.
//!
//! One [`SessionHub`] is live at a time. The accept loop seats incoming
//! connections into it and spawns a read task per seated peer; the task
//! decodes frames and dispatches them to the hub until the peer goes away or
//! the game ends. A decode error is treated exactly like a disconnect.
//!
//! When the hub reports the game finished, the loop stops accepting, waits
//! for the read tasks to wind down and, if configured, starts a fresh hub
//! with a new board.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use othello_core::{FrameReader, Player, SurrenderPolicy};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::application::session_hub::{PeerSink, SessionHub};
use crate::infrastructure::network::peer::TcpPeer;
use crate::infrastructure::storage::config::ServerConfig;

/// Pause after a failed `accept` so a persistent error does not spin.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Runtime knobs for [`serve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerOptions {
    pub surrender_policy: SurrenderPolicy,
    /// Deadline for a single frame write; `None` waits forever.
    pub write_timeout: Option<Duration>,
    /// Start a new game after each one instead of returning.
    pub restart_after_game: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self::from(&ServerConfig::default())
    }
}

impl From<&ServerConfig> for ServerOptions {
    fn from(cfg: &ServerConfig) -> Self {
        Self {
            surrender_policy: cfg.surrender_policy(),
            write_timeout: cfg.write_timeout(),
            restart_after_game: cfg.session.restart_after_game,
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Hosts games on `listener`.
///
/// Returns after the first game ends unless `options.restart_after_game` is
/// set, in which case it runs until the surrounding task is cancelled.
///
/// # Errors
///
/// Returns an error if the listener's local address cannot be read.
pub async fn serve(listener: TcpListener, options: ServerOptions) -> anyhow::Result<()> {
    let local = listener
        .local_addr()
        .context("failed to read listener address")?;
    info!("Othello server listening on {local}");

    loop {
        let hub = Arc::new(SessionHub::new(options.surrender_policy));
        info!(session = %hub.id(), "waiting for two players");
        run_session(&listener, Arc::clone(&hub), &options).await;
        info!(session = %hub.id(), "session closed");

        if !options.restart_after_game {
            return Ok(());
        }
    }
}

// ── Session loop ──────────────────────────────────────────────────────────────

/// Accepts connections into `hub` until its game is over.
async fn run_session(listener: &TcpListener, hub: Arc<SessionHub>, options: &ServerOptions) {
    let mut readers = JoinSet::new();

    loop {
        tokio::select! {
            _ = hub.wait_finished() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, addr)) => admit(&hub, stream, addr, options, &mut readers).await,
                Err(e) => {
                    warn!("accept error: {e}");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                }
            },
        }
    }

    while let Some(joined) = readers.join_next().await {
        if let Err(e) = joined {
            warn!(session = %hub.id(), "read task failed: {e}");
        }
    }
}

/// Seats one new connection or turns it away.
async fn admit(
    hub: &Arc<SessionHub>,
    stream: TcpStream,
    addr: SocketAddr,
    options: &ServerOptions,
    readers: &mut JoinSet<()>,
) {
    if let Err(e) = stream.set_nodelay(true) {
        debug!("set_nodelay failed for {addr}: {e}");
    }
    let (read_half, write_half) = stream.into_split();
    let peer = Arc::new(TcpPeer::new(
        addr.to_string(),
        write_half,
        options.write_timeout,
    ));

    match hub.join(peer.clone()).await {
        Ok(seat) => {
            info!(session = %hub.id(), "{addr} connected as {seat}");
            readers.spawn(read_loop(
                Arc::clone(hub),
                seat,
                FrameReader::new(read_half),
                addr,
            ));
        }
        Err(e) => {
            info!(session = %hub.id(), "turning away {addr}: {e}");
            peer.close().await;
        }
    }
}

/// Feeds one peer's frames into the hub, then reports the peer gone.
async fn read_loop(
    hub: Arc<SessionHub>,
    seat: Player,
    mut reader: FrameReader<OwnedReadHalf>,
    addr: SocketAddr,
) {
    loop {
        tokio::select! {
            _ = hub.wait_finished() => break,
            next = reader.next_message() => match next {
                Ok(Some(msg)) => hub.dispatch(seat, msg).await,
                Ok(None) => {
                    info!(session = %hub.id(), "{seat} ({addr}) disconnected");
                    break;
                }
                Err(e) => {
                    warn!(session = %hub.id(), "dropping {seat} ({addr}): {e}");
                    break;
                }
            },
        }
    }
    hub.leave(seat).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_follow_config() {
        // Arrange
        let mut cfg = ServerConfig::default();
        cfg.session.surrender_on_any_turn = true;
        cfg.session.write_timeout_ms = 0;
        cfg.session.restart_after_game = true;

        // Act
        let options = ServerOptions::from(&cfg);

        // Assert
        assert_eq!(options.surrender_policy, SurrenderPolicy::AnyTurn);
        assert_eq!(options.write_timeout, None);
        assert!(options.restart_after_game);
    }

    #[test]
    fn test_default_options_end_after_one_game() {
        let options = ServerOptions::default();

        assert!(!options.restart_after_game);
        assert_eq!(options.surrender_policy, SurrenderPolicy::OwnTurnOnly);
        assert_eq!(options.write_timeout, Some(Duration::from_millis(5000)));
    }
}
