//! All Othello-Over-IP protocol message types.
//!
//! Server-to-client codes live in `0x01..=0x0F`, client-to-server codes in
//! `0x10..=0x1F`. Payload layouts are documented on each variant of
//! [`OthelloMessage`]; the byte-level encoding lives in
//! [`crate::protocol::codec`].

use crate::domain::board::{Board, Cell, Player, BOARD_SIZE};
use crate::domain::rules::MoveError;
use crate::domain::turn::{Game, GameResult, SurrenderError};

// ── Protocol constants ────────────────────────────────────────────────────────

/// Current protocol version byte.
pub const PROTOCOL_VERSION: u8 = 0x01;

/// Total size of the common message header in bytes.
pub const HEADER_SIZE: usize = 16;

/// Largest payload a peer will accept in a single frame.
pub const MAX_PAYLOAD_SIZE: usize = 64 * 1024;

/// Number of cell bytes in a STATE payload.
pub const CELL_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

/// Longest text field, in UTF-8 bytes, carried by any message.
///
/// Far below [`MAX_PAYLOAD_SIZE`], so every message with one text field and
/// its fixed fields always fits in a frame.
pub const MAX_TEXT_LEN: usize = 1024;

/// Cuts `text` to at most [`MAX_TEXT_LEN`] bytes on a char boundary.
pub fn clip_text(text: &str) -> &str {
    if text.len() <= MAX_TEXT_LEN {
        return text;
    }
    let mut end = MAX_TEXT_LEN;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

// ── Message type codes ────────────────────────────────────────────────────────

/// All message type codes understood by the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    // Server → client (0x01–0x0F)
    Welcome = 0x01,
    State = 0x02,
    Info = 0x03,
    Chat = 0x04,
    GameOver = 0x05,
    MoveRejected = 0x06,
    // Client → server (0x10–0x1F)
    Move = 0x10,
    Surrender = 0x11,
    ChatSend = 0x12,
}

impl TryFrom<u8> for MessageType {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, ()> {
        match value {
            0x01 => Ok(MessageType::Welcome),
            0x02 => Ok(MessageType::State),
            0x03 => Ok(MessageType::Info),
            0x04 => Ok(MessageType::Chat),
            0x05 => Ok(MessageType::GameOver),
            0x06 => Ok(MessageType::MoveRejected),
            0x10 => Ok(MessageType::Move),
            0x11 => Ok(MessageType::Surrender),
            0x12 => Ok(MessageType::ChatSend),
            _ => Err(()),
        }
    }
}

// ── Per-message payload structs ───────────────────────────────────────────────

/// WELCOME: tells a freshly seated peer which colour it plays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WelcomeMessage {
    pub player: Player,
    /// Human-readable greeting, e.g. "You play Black".
    pub text: String,
}

/// STATE: the authoritative board and whose turn it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateMessage {
    pub cells: [[Cell; BOARD_SIZE]; BOARD_SIZE],
    /// `None` once the game is over (encoded as `0`).
    pub active: Option<Player>,
}

impl StateMessage {
    /// Snapshot of a live game.
    pub fn from_game(game: &Game) -> Self {
        Self {
            cells: *game.board().cells(),
            active: game.turn().active_player(),
        }
    }

    /// Rebuilds a [`Board`] from the snapshot.
    pub fn board(&self) -> Board {
        Board::from_cells(self.cells)
    }
}

/// What an INFO message is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoKind {
    /// `skipped` had no legal move; `next` plays again.
    Pass { skipped: Player, next: Player },
    /// The other seat's connection went away.
    OpponentLeft { player: Player },
    /// The joiner is seated and waits for a second player.
    WaitingForOpponent,
}

impl InfoKind {
    pub(crate) const PASS: u8 = 0x01;
    pub(crate) const OPPONENT_LEFT: u8 = 0x02;
    pub(crate) const WAITING_FOR_OPPONENT: u8 = 0x03;

    pub(crate) fn code(self) -> u8 {
        match self {
            InfoKind::Pass { .. } => Self::PASS,
            InfoKind::OpponentLeft { .. } => Self::OPPONENT_LEFT,
            InfoKind::WaitingForOpponent => Self::WAITING_FOR_OPPONENT,
        }
    }
}

/// INFO: an informational event with a display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoMessage {
    pub kind: InfoKind,
    pub text: String,
}

impl InfoMessage {
    /// Pass notice with the standard wording.
    pub fn pass(skipped: Player, next: Player) -> Self {
        Self {
            kind: InfoKind::Pass { skipped, next },
            text: format!("{skipped} has no legal moves. {next} plays again."),
        }
    }

    pub fn opponent_left(player: Player) -> Self {
        Self {
            kind: InfoKind::OpponentLeft { player },
            text: format!("{player} left the game."),
        }
    }

    pub fn waiting_for_opponent() -> Self {
        Self {
            kind: InfoKind::WaitingForOpponent,
            text: "Waiting for an opponent to join.".to_string(),
        }
    }
}

/// CHAT (server → client): a relayed chat line tagged with its sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender: Player,
    pub text: String,
}

/// Reason byte carried by MOVE_REJECTED.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RejectReason {
    GameOver = 0x01,
    NotYourTurn = 0x02,
    Occupied = 0x03,
    NoFlips = 0x04,
    OutOfBounds = 0x05,
    WrongSeat = 0x06,
    NotStarted = 0x07,
}

impl TryFrom<u8> for RejectReason {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(RejectReason::GameOver),
            0x02 => Ok(RejectReason::NotYourTurn),
            0x03 => Ok(RejectReason::Occupied),
            0x04 => Ok(RejectReason::NoFlips),
            0x05 => Ok(RejectReason::OutOfBounds),
            0x06 => Ok(RejectReason::WrongSeat),
            0x07 => Ok(RejectReason::NotStarted),
            _ => Err(()),
        }
    }
}

impl From<&MoveError> for RejectReason {
    fn from(err: &MoveError) -> Self {
        match err {
            MoveError::GameOver => RejectReason::GameOver,
            MoveError::NotYourTurn { .. } => RejectReason::NotYourTurn,
            MoveError::Occupied(_) => RejectReason::Occupied,
            MoveError::NoFlips(_) => RejectReason::NoFlips,
            MoveError::OutOfBounds { .. } => RejectReason::OutOfBounds,
            MoveError::WrongSeat { .. } => RejectReason::WrongSeat,
            MoveError::NotStarted => RejectReason::NotStarted,
        }
    }
}

impl From<&SurrenderError> for RejectReason {
    fn from(err: &SurrenderError) -> Self {
        match err {
            SurrenderError::GameOver => RejectReason::GameOver,
            SurrenderError::NotYourTurn { .. } => RejectReason::NotYourTurn,
            SurrenderError::NotStarted => RejectReason::NotStarted,
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            RejectReason::GameOver => "the game is already over",
            RejectReason::NotYourTurn => "it is not your turn",
            RejectReason::Occupied => "that cell is already occupied",
            RejectReason::NoFlips => "that move flips no discs",
            RejectReason::OutOfBounds => "that cell is off the board",
            RejectReason::WrongSeat => "you cannot move for the other colour",
            RejectReason::NotStarted => "the game has not started yet",
        };
        f.write_str(text)
    }
}

/// MOVE: a placement intent. `row`/`col` are raw so the server can report
/// out-of-range values instead of failing to decode them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRequest {
    pub row: u8,
    pub col: u8,
    /// The colour the sender believes it plays.
    pub claimed: Player,
}

// ── Top-level message enum ────────────────────────────────────────────────────

/// Discriminated union of every message that can appear on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OthelloMessage {
    /// `[player:1][text_len:2][text:N]`
    Welcome(WelcomeMessage),
    /// `[cells:64][active:1]`
    State(StateMessage),
    /// `[kind:1][kind fields][text_len:2][text:N]`
    Info(InfoMessage),
    /// `[sender:1][text_len:2][text:N]`
    Chat(ChatMessage),
    /// `[outcome:1][by:1][reason:1][black:1][white:1]`
    GameOver(GameResult),
    /// `[reason:1]`
    MoveRejected { reason: RejectReason },
    /// `[row:1][col:1][claimed:1]`
    Move(MoveRequest),
    /// Empty payload.
    Surrender,
    /// `[text_len:2][text:N]`
    ChatSend(String),
}

impl OthelloMessage {
    /// Returns the [`MessageType`] code for this message.
    pub fn message_type(&self) -> MessageType {
        match self {
            OthelloMessage::Welcome(_) => MessageType::Welcome,
            OthelloMessage::State(_) => MessageType::State,
            OthelloMessage::Info(_) => MessageType::Info,
            OthelloMessage::Chat(_) => MessageType::Chat,
            OthelloMessage::GameOver(_) => MessageType::GameOver,
            OthelloMessage::MoveRejected { .. } => MessageType::MoveRejected,
            OthelloMessage::Move(_) => MessageType::Move,
            OthelloMessage::Surrender => MessageType::Surrender,
            OthelloMessage::ChatSend(_) => MessageType::ChatSend,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
