//! Message framing for pongsync game sockets.
//!
//! A game socket carries JSON text and binary physics frames on the same
//! connection. Each message is wrapped in an envelope with:
//! - A 2-byte magic number ("PG") for stream synchronization
//! - A 1-byte kind (1 = text, 2 = binary), mirroring WebSocket opcodes
//! - A 4-byte little-endian payload length
//!
//! Readers always hand out complete messages; text payloads arrive parsed.

#[cfg(feature = "async")]
pub mod async_codec;
pub mod codec;
pub mod error;
pub mod kind;
pub mod reader;
pub mod transport;
pub mod writer;

#[cfg(feature = "async")]
pub use async_codec::SocketCodec;
pub use codec::{
    decode_envelope, encode_envelope, encode_message, Envelope, FrameConfig, DEFAULT_MAX_PAYLOAD,
    HEADER_SIZE, MAGIC,
};
pub use error::{FrameError, Result};
pub use kind::{kind_name, BINARY, TEXT};
pub use reader::MessageReader;
pub use transport::{CloseStream, FramedTransport};
pub use writer::MessageWriter;
