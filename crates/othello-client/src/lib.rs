//! othello-client library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! The client never decides anything about the game. It keeps a local copy
//! of the last STATE the server pushed, uses it to refuse obviously bad
//! input before it goes on the wire, and renders it to the terminal.

/// Application layer: the local game view, command parsing and the play session.
pub mod application;

/// Infrastructure layer: the TCP connection and terminal output.
pub mod infrastructure;
