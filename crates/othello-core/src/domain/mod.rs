//! Domain entities for Othello-Over-IP.
//!
//! This module contains pure game logic with no infrastructure dependencies.
//! Nothing in here performs I/O, so every rule can be unit-tested without a
//! network or a runtime.
//!
//! The layers build on each other from the leaf up:
//!
//! - [`board`] – the 8×8 grid of cells plus placement and flipping primitives.
//! - [`rules`] – legality checks and move application on top of the board.
//! - [`turn`] – the turn state machine: alternation, forced passes, and the
//!   terminal conditions that end a game.

pub mod board;
pub mod rules;
pub mod turn;
