//! Infrastructure layer for the server.
//!
//! Contains OS-facing adapters: the TCP listener and per-connection tasks,
//! and TOML configuration storage.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `othello_core`, but MUST NOT be imported by the `application` layer.

pub mod network;
pub mod storage;
