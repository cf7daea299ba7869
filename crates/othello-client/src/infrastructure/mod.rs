//! Infrastructure layer: adapters to the outside world.

pub mod network;
pub mod terminal;
