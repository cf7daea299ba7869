//! Application layer use cases for the client.
//!
//! - **`game_view`** – Mirror of the server's state plus the local pre-checks
//!   (is it my turn, would this move flip anything).
//! - **`commands`** – Parses a line typed on stdin into a [`commands::Command`].
//! - **`play`** – Runs a command against the view and sends the resulting
//!   intent through a [`play::GameSender`].

pub mod commands;
pub mod game_view;
pub mod play;
