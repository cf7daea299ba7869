//! SessionHub: one two-player game and the peers attached to it.
//!
//! The hub is the only place the authoritative [`Game`] lives. Every intent
//! from a peer runs validate → apply → advance → broadcast while holding the
//! game lock, so two moves that arrive at nearly the same instant are applied
//! one after the other and the second sees the board the first left behind.
//!
//! # Locking
//!
//! ```text
//! table: Mutex<Table>      game + phase, held for a whole intent
//! peers: RwLock<Seats>     who to send to; always taken *after* table
//! ```
//!
//! Chat only reads `peers`, so it never waits behind a move.
//!
//! # Lifecycle
//!
//! `Waiting` until both seats are filled, then `Playing`, then `Finished`.
//! Finishing broadcasts GAME_OVER, closes every sink and flips the
//! [`SessionHub::finished`] signal so the listener can tear the session down.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use othello_core::protocol::messages::{
    clip_text, ChatMessage, InfoMessage, MoveRequest, RejectReason, StateMessage, WelcomeMessage,
};
use othello_core::{
    Coord, Game, GameResult, Move, MoveError, MoveOutcome, OthelloMessage, Player,
    SurrenderError, SurrenderPolicy, TurnState,
};
use thiserror::Error;
use tokio::sync::{watch, Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Errors a [`PeerSink`] can report when delivering a frame.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("connection I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The write did not finish within the configured deadline.
    #[error("write timed out after {0:?}")]
    Timeout(Duration),

    /// The sink was already closed.
    #[error("connection closed")]
    Closed,
}

/// Why a peer could not be seated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum JoinError {
    #[error("the session already has two players")]
    SessionFull,
}

/// Outbound half of one peer connection.
///
/// The TCP implementation lives in `infrastructure::network::peer`; tests use
/// in-memory recorders or the generated `MockPeerSink`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PeerSink: Send + Sync {
    /// Delivers one message. Implementations serialize their own writes.
    async fn send(&self, msg: &OthelloMessage) -> Result<(), ConnectionError>;

    /// Flushes and closes the connection. Later sends fail with `Closed`.
    async fn close(&self);
}

/// Where the session is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Waiting,
    Playing,
    Finished,
}

struct Table {
    game: Game,
    phase: Phase,
}

type Seats = [Option<Arc<dyn PeerSink>>; 2];

/// Seats two peers and arbitrates their game.
pub struct SessionHub {
    id: Uuid,
    policy: SurrenderPolicy,
    table: Mutex<Table>,
    peers: RwLock<Seats>,
    finished: watch::Sender<bool>,
}

impl SessionHub {
    pub fn new(policy: SurrenderPolicy) -> Self {
        Self::with_game(policy, Game::new())
    }

    /// A hub whose game starts from `game` once both seats are filled.
    fn with_game(policy: SurrenderPolicy, game: Game) -> Self {
        let (finished, _) = watch::channel(false);
        Self {
            id: Uuid::new_v4(),
            policy,
            table: Mutex::new(Table {
                game,
                phase: Phase::Waiting,
            }),
            peers: RwLock::new([None, None]),
            finished,
        }
    }

    /// Identifier used to tell sessions apart in the logs.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub async fn phase(&self) -> Phase {
        self.table.lock().await.phase
    }

    /// A copy of the current game.
    pub async fn game(&self) -> Game {
        self.table.lock().await.game.clone()
    }

    /// Receiver that flips to `true` once the game is over and all peers are closed.
    pub fn finished(&self) -> watch::Receiver<bool> {
        self.finished.subscribe()
    }

    pub fn is_finished(&self) -> bool {
        *self.finished.borrow()
    }

    /// Resolves once the session has finished.
    pub async fn wait_finished(&self) {
        let mut rx = self.finished.subscribe();
        // Err only if the sender is gone, which cannot outlive `self`.
        let _ = rx.wait_for(|done| *done).await;
    }

    // ── Intents ──────────────────────────────────────────────────────────────

    /// Seats `sink` in the first free seat and welcomes it.
    ///
    /// The first peer plays Black. Seating the second peer starts the game
    /// and broadcasts the opening STATE.
    ///
    /// # Errors
    ///
    /// [`JoinError::SessionFull`] once both seats are taken or the game has
    /// already started or finished.
    pub async fn join(&self, sink: Arc<dyn PeerSink>) -> Result<Player, JoinError> {
        let mut table = self.table.lock().await;
        if table.phase != Phase::Waiting {
            return Err(JoinError::SessionFull);
        }

        let (seat, both_seated) = {
            let mut peers = self.peers.write().await;
            let seat = Player::ALL
                .into_iter()
                .find(|p| peers[p.seat()].is_none())
                .ok_or(JoinError::SessionFull)?;
            peers[seat.seat()] = Some(Arc::clone(&sink));
            (seat, peers.iter().all(Option::is_some))
        };
        info!(session = %self.id, "{seat} seated");

        let welcome = OthelloMessage::Welcome(WelcomeMessage {
            player: seat,
            text: format!("You play {seat}."),
        });
        deliver(seat, sink.as_ref(), &welcome).await;

        if both_seated {
            table.phase = Phase::Playing;
            info!(session = %self.id, "both seats filled, Black to move");
            self.broadcast(&state_of(&table.game)).await;
        } else {
            let waiting = OthelloMessage::Info(InfoMessage::waiting_for_opponent());
            deliver(seat, sink.as_ref(), &waiting).await;
        }
        Ok(seat)
    }

    /// Validates and applies a move from `seat`.
    ///
    /// On success every peer receives the new STATE, followed by a pass
    /// notice and/or GAME_OVER when applicable. On failure only the
    /// submitter receives MOVE_REJECTED and nothing else changes.
    pub async fn submit_move(
        &self,
        seat: Player,
        request: MoveRequest,
    ) -> Result<MoveOutcome, MoveError> {
        let mut table = self.table.lock().await;

        match play(&mut table, seat, request) {
            Ok(outcome) => {
                debug!(session = %self.id, "{seat} played ({}, {})", request.row, request.col);
                self.broadcast(&state_of(&table.game)).await;
                if let Some(pass) = outcome.pass {
                    info!(session = %self.id, "{} passes", pass.skipped);
                    self.broadcast(&OthelloMessage::Info(InfoMessage::pass(pass.skipped, pass.next)))
                        .await;
                }
                if let TurnState::GameOver(result) = outcome.turn {
                    self.conclude(&mut table, result).await;
                }
                Ok(outcome)
            }
            Err(err) => {
                debug!(session = %self.id, "rejected move from {seat}: {err}");
                self.reject(seat, RejectReason::from(&err)).await;
                Err(err)
            }
        }
    }

    /// Ends the game with `seat` surrendering.
    ///
    /// Whether the opponent's turn counts is decided by the hub's
    /// [`SurrenderPolicy`].
    pub async fn submit_surrender(&self, seat: Player) -> Result<GameResult, SurrenderError> {
        let mut table = self.table.lock().await;

        let attempt = match table.phase {
            Phase::Waiting => Err(SurrenderError::NotStarted),
            Phase::Playing | Phase::Finished => table.game.surrender(seat, self.policy),
        };
        match attempt {
            Ok(result) => {
                info!(session = %self.id, "{seat} surrendered");
                self.broadcast(&state_of(&table.game)).await;
                self.conclude(&mut table, result).await;
                Ok(result)
            }
            Err(err) => {
                debug!(session = %self.id, "rejected surrender from {seat}: {err}");
                self.reject(seat, RejectReason::from(&err)).await;
                Err(err)
            }
        }
    }

    /// Relays a chat line to both peers, tagged with the sender.
    ///
    /// Does not touch the game, so it never waits for a move in progress.
    /// Blank lines are dropped and long ones are cut to
    /// [`MAX_TEXT_LEN`](othello_core::protocol::messages::MAX_TEXT_LEN) bytes.
    pub async fn submit_chat(&self, seat: Player, text: &str) {
        let text = clip_text(text.trim());
        if text.is_empty() {
            return;
        }
        let msg = OthelloMessage::Chat(ChatMessage {
            sender: seat,
            text: text.to_string(),
        });
        self.broadcast(&msg).await;
    }

    /// Removes the peer in `seat`.
    ///
    /// Before the game starts this just frees the seat. During the game the
    /// leaver forfeits and the remaining peer is told why the game ended.
    pub async fn leave(&self, seat: Player) {
        let mut table = self.table.lock().await;
        let Some(sink) = self.peers.write().await[seat.seat()].take() else {
            return;
        };
        sink.close().await;

        match table.phase {
            Phase::Waiting => info!(session = %self.id, "{seat} left, seat is free again"),
            Phase::Playing => {
                if let Some(result) = table.game.abandon(seat) {
                    warn!(session = %self.id, "{seat} disconnected mid-game and forfeits");
                    self.broadcast(&OthelloMessage::Info(InfoMessage::opponent_left(seat)))
                        .await;
                    self.conclude(&mut table, result).await;
                }
            }
            Phase::Finished => {}
        }
    }

    /// Routes one inbound message from `seat` to the matching intent.
    pub async fn dispatch(&self, seat: Player, msg: OthelloMessage) {
        match msg {
            OthelloMessage::Move(request) => {
                let _ = self.submit_move(seat, request).await;
            }
            OthelloMessage::Surrender => {
                let _ = self.submit_surrender(seat).await;
            }
            OthelloMessage::ChatSend(text) => self.submit_chat(seat, &text).await,
            other => warn!(
                session = %self.id,
                "{seat} sent {:?}, which only the server may send",
                other.message_type()
            ),
        }
    }

    // ── Helpers ──────────────────────────────────────────────────────────────

    /// Final broadcast and teardown. Caller holds the table lock.
    async fn conclude(&self, table: &mut Table, result: GameResult) {
        table.phase = Phase::Finished;
        info!(
            session = %self.id,
            "game over: {:?} by {:?}, Black {} / White {}",
            result.outcome, result.reason, result.discs.black, result.discs.white
        );
        self.broadcast(&OthelloMessage::GameOver(result)).await;

        let seated: Vec<Arc<dyn PeerSink>> = {
            let mut peers = self.peers.write().await;
            peers.iter_mut().filter_map(Option::take).collect()
        };
        for sink in seated {
            sink.close().await;
        }
        self.finished.send_replace(true);
    }

    async fn broadcast(&self, msg: &OthelloMessage) {
        let targets: Vec<(Player, Arc<dyn PeerSink>)> = {
            let peers = self.peers.read().await;
            Player::ALL
                .into_iter()
                .filter_map(|p| peers[p.seat()].clone().map(|sink| (p, sink)))
                .collect()
        };
        for (player, sink) in targets {
            deliver(player, sink.as_ref(), msg).await;
        }
    }

    async fn reject(&self, seat: Player, reason: RejectReason) {
        let sink = self.peers.read().await[seat.seat()].clone();
        if let Some(sink) = sink {
            deliver(seat, sink.as_ref(), &OthelloMessage::MoveRejected { reason }).await;
        }
    }
}

/// Seat, phase and bounds checks, then the move itself.
fn play(table: &mut Table, seat: Player, request: MoveRequest) -> Result<MoveOutcome, MoveError> {
    match table.phase {
        Phase::Waiting => return Err(MoveError::NotStarted),
        Phase::Finished => return Err(MoveError::GameOver),
        Phase::Playing => {}
    }
    if request.claimed != seat {
        return Err(MoveError::WrongSeat {
            seat,
            claimed: request.claimed,
        });
    }
    let coord = Coord::new(request.row, request.col).ok_or(MoveError::OutOfBounds {
        row: request.row,
        col: request.col,
    })?;
    table.game.play(Move { coord, player: seat })
}

fn state_of(game: &Game) -> OthelloMessage {
    OthelloMessage::State(StateMessage::from_game(game))
}

/// Sends one message and logs a failure; a dead peer never affects the other.
async fn deliver(player: Player, sink: &dyn PeerSink, msg: &OthelloMessage) {
    if let Err(e) = sink.send(msg).await {
        warn!("failed to send {:?} to {player}: {e}", msg.message_type());
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
