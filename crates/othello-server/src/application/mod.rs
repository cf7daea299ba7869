//! Application layer use cases for the server.
//!
//! - **`session_hub`** – Seats two peers, owns the authoritative [`Game`],
//!   and turns each peer's intents (move, surrender, chat, leave) into state
//!   changes and broadcasts. It talks to peers only through the
//!   [`session_hub::PeerSink`] trait, so it has no socket code of its own.
//!
//! [`Game`]: othello_core::Game

pub mod session_hub;
