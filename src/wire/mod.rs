mod bitfield;
mod handshake;
mod message;

pub use bitfield::Bitfield;
pub use handshake::{read_handshake, write_handshake, Handshake, PROTOCOL_STRING};
pub use message::{read_length, read_message, write_message, WireMessage, MAX_MESSAGE_LEN};
