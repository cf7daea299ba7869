//! Protocol module containing message types, the binary codec, and the
//! stream framing used by both ends of a connection.

pub mod codec;
pub mod framing;
pub mod messages;
pub mod sequence;

pub use codec::{decode_message, encode_message, ProtocolError};
pub use framing::{FrameError, FrameReader, FrameWriter};
pub use messages::*;
pub use sequence::SequenceCounter;
