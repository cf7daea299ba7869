//! # othello-core
//!
//! Shared library for Othello-Over-IP containing the board model, the move
//! rule engine, the turn state machine, and the network protocol codec.
//!
//! This crate is used by both the server and client applications. It never
//! opens sockets: the frame reader and writer are generic over tokio's
//! `AsyncRead` / `AsyncWrite` traits.
//!
//! # Architecture overview
//!
//! Two players on two machines share one game that lives on the server.
//! The server is the only authority on what the board looks like; clients
//! send *intents* (move, surrender, chat) and render whatever state the
//! server pushes back.
//!
//! - **`domain`** – Pure game logic with no I/O. [`Board`] is the 8×8 grid,
//!   [`rules`] decides legality and flips discs, and [`Game`] is the turn
//!   state machine that handles passes and the end of the game.
//!
//! - **`protocol`** – How bytes travel over the network. Messages are encoded
//!   into a compact binary frame (16-byte header + payload) and decoded back
//!   into [`OthelloMessage`] values on the other end.

pub mod domain;
pub mod protocol;

pub use domain::board::{Board, Cell, Coord, Direction, DiscCount, Player, BOARD_SIZE};
pub use domain::rules::{self, MoveError};
pub use domain::turn::{
    EndReason, Game, GameResult, Move, MoveOutcome, Outcome, PassNotice, SurrenderError,
    SurrenderPolicy, TurnState,
};
pub use protocol::codec::{decode_message, encode_message, ProtocolError};
pub use protocol::framing::{FrameError, FrameReader, FrameWriter};
pub use protocol::messages::OthelloMessage;
