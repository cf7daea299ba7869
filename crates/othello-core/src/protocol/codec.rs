//! Binary codec for encoding and decoding Othello-Over-IP protocol messages.
//!
//! Wire format:
//! ```text
//! [version:1][msg_type:1][reserved:2][payload_len:4][seq:8][payload:N]
//! ```
//! Total header size: 16 bytes. All multi-byte integers are big-endian.

use thiserror::Error;

use crate::domain::board::{Cell, DiscCount, Player, BOARD_SIZE};
use crate::domain::turn::{EndReason, GameResult, Outcome};
use crate::protocol::messages::{
    clip_text, ChatMessage, InfoKind, InfoMessage, MessageType, MoveRequest, OthelloMessage, RejectReason,
    StateMessage, WelcomeMessage, CELL_COUNT, HEADER_SIZE, MAX_PAYLOAD_SIZE, MAX_TEXT_LEN,
    PROTOCOL_VERSION,
};

/// Errors that can occur during message encoding or decoding.
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    /// The byte slice is shorter than the minimum required length.
    #[error("insufficient data: need at least {needed} bytes, got {available}")]
    InsufficientData { needed: usize, available: usize },

    /// The message type byte in the header is not a recognized value.
    #[error("unknown message type: 0x{0:02X}")]
    UnknownMessageType(u8),

    /// The protocol version in the header is not supported.
    #[error("unsupported protocol version: {0}")]
    UnsupportedVersion(u8),

    /// The payload could not be parsed (field value out of range, UTF-8 error, etc.).
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// The encoded payload length field does not match the actual data available.
    #[error("payload length mismatch: header says {declared}, available is {available}")]
    PayloadLengthMismatch { declared: usize, available: usize },

    /// The payload exceeds [`MAX_PAYLOAD_SIZE`].
    #[error("payload of {0} bytes exceeds the {MAX_PAYLOAD_SIZE}-byte limit")]
    PayloadTooLarge(usize),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes an [`OthelloMessage`] into a byte vector including the 16-byte header.
///
/// The sequence number is **not** generated here – pass the next value from a
/// [`crate::protocol::SequenceCounter`].
///
/// # Errors
///
/// Returns [`ProtocolError::PayloadTooLarge`] if the payload would exceed
/// [`MAX_PAYLOAD_SIZE`].
///
/// # Examples
///
/// ```rust
/// use othello_core::protocol::{decode_message, encode_message};
/// use othello_core::OthelloMessage;
///
/// let msg = OthelloMessage::Surrender;
/// let bytes = encode_message(&msg, 0).unwrap();
/// let (decoded, consumed) = decode_message(&bytes).unwrap();
/// assert_eq!(decoded, msg);
/// assert_eq!(consumed, bytes.len());
/// ```
pub fn encode_message(msg: &OthelloMessage, sequence_number: u64) -> Result<Vec<u8>, ProtocolError> {
    let payload = encode_payload(msg);
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(ProtocolError::PayloadTooLarge(payload.len()));
    }
    let payload_len = payload.len() as u32;

    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());

    // Header: version (1) + msg_type (1) + reserved (2) + payload_len (4) + seq (8)
    buf.push(PROTOCOL_VERSION);
    buf.push(msg.message_type() as u8);
    buf.push(0x00); // reserved
    buf.push(0x00); // reserved
    buf.extend_from_slice(&payload_len.to_be_bytes());
    buf.extend_from_slice(&sequence_number.to_be_bytes());

    buf.extend_from_slice(&payload);
    Ok(buf)
}

/// Decodes one [`OthelloMessage`] from the beginning of `bytes`.
///
/// Returns the decoded message and the total number of bytes consumed
/// (header + payload), so the caller can advance their read cursor.
///
/// # Errors
///
/// [`ProtocolError::InsufficientData`] when fewer than [`HEADER_SIZE`] bytes
/// are available and [`ProtocolError::PayloadLengthMismatch`] when the payload
/// has not fully arrived; both mean "read more". Any other variant means the
/// stream is corrupt.
pub fn decode_message(bytes: &[u8]) -> Result<(OthelloMessage, usize), ProtocolError> {
    let (msg_type, payload_len) = decode_header(bytes)?;

    let total_needed = HEADER_SIZE + payload_len;
    if bytes.len() < total_needed {
        return Err(ProtocolError::PayloadLengthMismatch {
            declared: payload_len,
            available: bytes.len() - HEADER_SIZE,
        });
    }

    let payload = &bytes[HEADER_SIZE..total_needed];
    let msg = decode_payload(msg_type, payload)?;
    Ok((msg, total_needed))
}

/// Validates the fixed header and returns the message type and payload length.
///
/// Lets a stream reader reject a bad version, an unknown type or an oversized
/// payload as soon as the header arrives, without waiting for the payload.
pub fn decode_header(bytes: &[u8]) -> Result<(MessageType, usize), ProtocolError> {
    if bytes.len() < HEADER_SIZE {
        return Err(ProtocolError::InsufficientData {
            needed: HEADER_SIZE,
            available: bytes.len(),
        });
    }

    let version = bytes[0];
    if version != PROTOCOL_VERSION {
        return Err(ProtocolError::UnsupportedVersion(version));
    }

    let msg_type_byte = bytes[1];
    let msg_type = MessageType::try_from(msg_type_byte)
        .map_err(|_| ProtocolError::UnknownMessageType(msg_type_byte))?;

    // bytes[2..4] are reserved – ignored on decode

    let payload_len = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
    if payload_len > MAX_PAYLOAD_SIZE {
        return Err(ProtocolError::PayloadTooLarge(payload_len));
    }
    Ok((msg_type, payload_len))
}

/// Reads the sequence number from an encoded header.
pub fn sequence_number(bytes: &[u8]) -> Option<u64> {
    let seq: [u8; 8] = bytes.get(8..HEADER_SIZE)?.try_into().ok()?;
    Some(u64::from_be_bytes(seq))
}

// ── Payload encoding ──────────────────────────────────────────────────────────

fn encode_payload(msg: &OthelloMessage) -> Vec<u8> {
    let mut buf = Vec::new();
    match msg {
        OthelloMessage::Welcome(m) => encode_welcome(&mut buf, m),
        OthelloMessage::State(m) => encode_state(&mut buf, m),
        OthelloMessage::Info(m) => encode_info(&mut buf, m),
        OthelloMessage::Chat(m) => encode_chat(&mut buf, m),
        OthelloMessage::GameOver(r) => encode_game_over(&mut buf, r),
        OthelloMessage::MoveRejected { reason } => buf.push(*reason as u8),
        OthelloMessage::Move(m) => {
            buf.push(m.row);
            buf.push(m.col);
            buf.push(m.claimed as u8);
        }
        OthelloMessage::Surrender => {} // empty payload
        OthelloMessage::ChatSend(text) => write_length_prefixed_string(&mut buf, text),
    }
    buf
}

fn encode_welcome(buf: &mut Vec<u8>, m: &WelcomeMessage) {
    buf.push(m.player as u8);
    write_length_prefixed_string(buf, &m.text);
}

fn encode_state(buf: &mut Vec<u8>, m: &StateMessage) {
    buf.extend(m.cells.iter().flatten().map(|&cell| cell as u8));
    buf.push(m.active.map_or(0x00, |p| p as u8));
}

fn encode_info(buf: &mut Vec<u8>, m: &InfoMessage) {
    buf.push(m.kind.code());
    match m.kind {
        InfoKind::Pass { skipped, next } => {
            buf.push(skipped as u8);
            buf.push(next as u8);
        }
        InfoKind::OpponentLeft { player } => buf.push(player as u8),
        InfoKind::WaitingForOpponent => {}
    }
    write_length_prefixed_string(buf, &m.text);
}

fn encode_chat(buf: &mut Vec<u8>, m: &ChatMessage) {
    buf.push(m.sender as u8);
    write_length_prefixed_string(buf, &m.text);
}

const OUTCOME_BLACK_WINS: u8 = 0x01;
const OUTCOME_WHITE_WINS: u8 = 0x02;
const OUTCOME_DRAW: u8 = 0x03;
const OUTCOME_SURRENDERED: u8 = 0x04;
const OUTCOME_ABANDONED: u8 = 0x05;

fn encode_game_over(buf: &mut Vec<u8>, r: &GameResult) {
    let (outcome, by) = match r.outcome {
        Outcome::BlackWins => (OUTCOME_BLACK_WINS, 0x00),
        Outcome::WhiteWins => (OUTCOME_WHITE_WINS, 0x00),
        Outcome::Draw => (OUTCOME_DRAW, 0x00),
        Outcome::Surrendered(p) => (OUTCOME_SURRENDERED, p as u8),
        Outcome::Abandoned(p) => (OUTCOME_ABANDONED, p as u8),
    };
    buf.push(outcome);
    buf.push(by);
    buf.push(r.reason as u8);
    buf.push(r.discs.black);
    buf.push(r.discs.white);
}

// ── Payload decoding ──────────────────────────────────────────────────────────

fn decode_payload(msg_type: MessageType, payload: &[u8]) -> Result<OthelloMessage, ProtocolError> {
    match msg_type {
        MessageType::Welcome => decode_welcome(payload).map(OthelloMessage::Welcome),
        MessageType::State => decode_state(payload).map(OthelloMessage::State),
        MessageType::Info => decode_info(payload).map(OthelloMessage::Info),
        MessageType::Chat => decode_chat(payload).map(OthelloMessage::Chat),
        MessageType::GameOver => decode_game_over(payload).map(OthelloMessage::GameOver),
        MessageType::MoveRejected => {
            require_exact_len(payload, 1, "MoveRejected")?;
            let reason = RejectReason::try_from(payload[0]).map_err(|_| {
                ProtocolError::MalformedPayload(format!("unknown reject reason: {}", payload[0]))
            })?;
            Ok(OthelloMessage::MoveRejected { reason })
        }
        MessageType::Move => {
            require_exact_len(payload, 3, "Move")?;
            Ok(OthelloMessage::Move(MoveRequest {
                row: payload[0],
                col: payload[1],
                claimed: read_player(payload[2])?,
            }))
        }
        MessageType::Surrender => {
            require_exact_len(payload, 0, "Surrender")?;
            Ok(OthelloMessage::Surrender)
        }
        MessageType::ChatSend => {
            let (text, end) = read_length_prefixed_string(payload, 0)?;
            require_exact_len(payload, end, "ChatSend")?;
            Ok(OthelloMessage::ChatSend(text))
        }
    }
}

fn decode_welcome(p: &[u8]) -> Result<WelcomeMessage, ProtocolError> {
    // 1 (player) + 2 (text_len) + text
    require_len(p, 3, "Welcome")?;
    let player = read_player(p[0])?;
    let (text, end) = read_length_prefixed_string(p, 1)?;
    require_exact_len(p, end, "Welcome")?;
    Ok(WelcomeMessage { player, text })
}

fn decode_state(p: &[u8]) -> Result<StateMessage, ProtocolError> {
    require_exact_len(p, CELL_COUNT + 1, "State")?;
    let mut cells = [[Cell::Empty; BOARD_SIZE]; BOARD_SIZE];
    for (i, &byte) in p[..CELL_COUNT].iter().enumerate() {
        cells[i / BOARD_SIZE][i % BOARD_SIZE] = Cell::try_from(byte)
            .map_err(|_| ProtocolError::MalformedPayload(format!("unknown cell value: {byte}")))?;
    }
    let active = match p[CELL_COUNT] {
        0x00 => None,
        byte => Some(read_player(byte)?),
    };
    Ok(StateMessage { cells, active })
}

fn decode_info(p: &[u8]) -> Result<InfoMessage, ProtocolError> {
    require_len(p, 1, "Info")?;
    let (kind, text_offset) = match p[0] {
        InfoKind::PASS => {
            require_len(p, 3, "Info::Pass")?;
            let skipped = read_player(p[1])?;
            let next = read_player(p[2])?;
            (InfoKind::Pass { skipped, next }, 3)
        }
        InfoKind::OPPONENT_LEFT => {
            require_len(p, 2, "Info::OpponentLeft")?;
            let player = read_player(p[1])?;
            (InfoKind::OpponentLeft { player }, 2)
        }
        InfoKind::WAITING_FOR_OPPONENT => (InfoKind::WaitingForOpponent, 1),
        other => {
            return Err(ProtocolError::MalformedPayload(format!(
                "unknown info kind: {other}"
            )))
        }
    };
    let (text, end) = read_length_prefixed_string(p, text_offset)?;
    require_exact_len(p, end, "Info")?;
    Ok(InfoMessage { kind, text })
}

fn decode_chat(p: &[u8]) -> Result<ChatMessage, ProtocolError> {
    require_len(p, 3, "Chat")?;
    let sender = read_player(p[0])?;
    let (text, end) = read_length_prefixed_string(p, 1)?;
    require_exact_len(p, end, "Chat")?;
    Ok(ChatMessage { sender, text })
}

fn decode_game_over(p: &[u8]) -> Result<GameResult, ProtocolError> {
    require_exact_len(p, 5, "GameOver")?;
    let by_count = |outcome: Outcome| match p[1] {
        0x00 => Ok(outcome),
        other => Err(ProtocolError::MalformedPayload(format!(
            "count outcome carries player byte {other}"
        ))),
    };
    let outcome = match p[0] {
        OUTCOME_BLACK_WINS => by_count(Outcome::BlackWins)?,
        OUTCOME_WHITE_WINS => by_count(Outcome::WhiteWins)?,
        OUTCOME_DRAW => by_count(Outcome::Draw)?,
        OUTCOME_SURRENDERED => Outcome::Surrendered(read_player(p[1])?),
        OUTCOME_ABANDONED => Outcome::Abandoned(read_player(p[1])?),
        other => {
            return Err(ProtocolError::MalformedPayload(format!(
                "unknown outcome: {other}"
            )))
        }
    };
    let reason = EndReason::try_from(p[2])
        .map_err(|_| ProtocolError::MalformedPayload(format!("unknown end reason: {}", p[2])))?;
    let (black, white) = (p[3], p[4]);
    let occupied = black as usize + white as usize;
    if occupied > CELL_COUNT {
        return Err(ProtocolError::MalformedPayload(format!(
            "disc counts {black}+{white} exceed the board"
        )));
    }
    Ok(GameResult {
        outcome,
        reason,
        discs: DiscCount {
            black,
            white,
            empty: (CELL_COUNT - occupied) as u8,
        },
    })
}

// ── Utility helpers ───────────────────────────────────────────────────────────

fn require_len(buf: &[u8], needed: usize, context: &str) -> Result<(), ProtocolError> {
    if buf.len() < needed {
        Err(ProtocolError::MalformedPayload(format!(
            "{context}: need {needed} bytes, got {}",
            buf.len()
        )))
    } else {
        Ok(())
    }
}

fn require_exact_len(buf: &[u8], expected: usize, context: &str) -> Result<(), ProtocolError> {
    if buf.len() != expected {
        Err(ProtocolError::MalformedPayload(format!(
            "{context}: expected {expected} bytes, got {}",
            buf.len()
        )))
    } else {
        Ok(())
    }
}

fn read_player(byte: u8) -> Result<Player, ProtocolError> {
    Player::try_from(byte)
        .map_err(|_| ProtocolError::MalformedPayload(format!("unknown player: {byte}")))
}

/// Writes a 2-byte length prefix followed by the UTF-8 string bytes.
///
/// Strings longer than [`MAX_TEXT_LEN`] bytes are cut at the last char
/// boundary that fits.
fn write_length_prefixed_string(buf: &mut Vec<u8>, s: &str) {
    let s = clip_text(s);
    buf.extend_from_slice(&(s.len() as u16).to_be_bytes());
    buf.extend_from_slice(s.as_bytes());
}

/// Reads a 2-byte length prefix and then that many UTF-8 bytes.
/// Returns the string and the offset of the byte after the string.
fn read_length_prefixed_string(buf: &[u8], offset: usize) -> Result<(String, usize), ProtocolError> {
    if buf.len() < offset + 2 {
        return Err(ProtocolError::MalformedPayload(format!(
            "need 2 bytes for string length at offset {offset}"
        )));
    }
    let len = u16::from_be_bytes([buf[offset], buf[offset + 1]]) as usize;
    if len > MAX_TEXT_LEN {
        return Err(ProtocolError::MalformedPayload(format!(
            "string of {len} bytes exceeds the {MAX_TEXT_LEN}-byte limit"
        )));
    }
    let start = offset + 2;
    if buf.len() < start + len {
        return Err(ProtocolError::MalformedPayload(format!(
            "string of length {len} at offset {start} exceeds buffer"
        )));
    }
    let s = std::str::from_utf8(&buf[start..start + len])
        .map_err(|e| ProtocolError::MalformedPayload(format!("invalid UTF-8: {e}")))?
        .to_string();
    Ok((s, start + len))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
