//! Protocol module containing message types, the binary codec, and the
//! request id allocator.

pub mod codec;
pub mod messages;
pub mod sequence;

pub use codec::{decode_message, encode_message, Frame, ProtocolError};
pub use messages::*;
pub use sequence::SequenceCounter;
