//! Network infrastructure for the server.
//!
//! - **`peer`** – [`peer::StreamPeer`], the [`PeerSink`] that writes frames
//!   to one client socket with an optional write deadline.
//! - **`listener`** – The accept loop that seats connections in a
//!   [`SessionHub`] and runs one read task per seated peer.
//!
//! [`PeerSink`]: crate::application::session_hub::PeerSink
//! [`SessionHub`]: crate::application::session_hub::SessionHub

pub mod listener;
pub mod peer;
