use bytes::{Buf, BufMut, Bytes, BytesMut};
use pongsync_transport::Message;

use crate::error::{FrameError, Result};
use crate::kind::{is_known, BINARY, TEXT};

/// Envelope header: magic (2) + kind (1) + length (4) = 7 bytes.
pub const HEADER_SIZE: usize = 7;

/// Magic bytes: "PG" (0x50 0x47).
pub const MAGIC: [u8; 2] = [0x50, 0x47];

/// Default maximum payload size: 1 MiB. Game frames are a few hundred bytes.
pub const DEFAULT_MAX_PAYLOAD: usize = 1024 * 1024;

/// One framed payload, before text is parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Payload kind ([`TEXT`] or [`BINARY`]).
    pub kind: u8,
    /// The raw payload.
    pub payload: Bytes,
}

impl Envelope {
    /// Create a new envelope.
    pub fn new(kind: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            kind,
            payload: payload.into(),
        }
    }

    /// The total wire size of this envelope (header + payload).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }

    /// Convert into an inbound [`Message`], parsing text as JSON.
    pub fn into_message(self) -> Result<Message> {
        match self.kind {
            TEXT => Ok(Message::Json(serde_json::from_slice(&self.payload)?)),
            BINARY => Ok(Message::Binary(self.payload)),
            other => Err(FrameError::UnknownKind(other)),
        }
    }
}

/// Encode an envelope into the wire format.
///
/// Wire format:
/// ```text
/// ┌────────────┬──────────┬──────────────┬──────────────────┐
/// │ Magic (2B) │ Kind(1B) │ Length (4B)  │ Payload          │
/// │ 0x50 0x47  │ 1 = text │ little-endian│ (Length bytes)   │
/// │ "PG"       │ 2 = bin  │              │                  │
/// └────────────┴──────────┴──────────────┴──────────────────┘
/// ```
pub fn encode_envelope(kind: u8, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > u32::MAX as usize {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: u32::MAX as usize,
        });
    }
    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_slice(&MAGIC);
    dst.put_u8(kind);
    dst.put_u32_le(payload.len() as u32);
    dst.put_slice(payload);
    Ok(())
}

/// Encode a [`Message`], serializing JSON as text.
pub fn encode_message(message: &Message, dst: &mut BytesMut) -> Result<()> {
    match message {
        Message::Json(value) => encode_envelope(TEXT, &serde_json::to_vec(value)?, dst),
        Message::Binary(payload) => encode_envelope(BINARY, payload, dst),
    }
}

/// Decode an envelope from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete envelope yet.
/// On success, or on [`FrameError::UnknownKind`], consumes the envelope
/// bytes from the buffer.
pub fn decode_envelope(src: &mut BytesMut, max_payload: usize) -> Result<Option<Envelope>> {
    if src.len() < HEADER_SIZE {
        return Ok(None);
    }

    if src[0..2] != MAGIC {
        return Err(FrameError::InvalidMagic);
    }

    let kind = src[2];
    let payload_len = u32::from_le_bytes([src[3], src[4], src[5], src[6]]) as usize;

    if payload_len > max_payload {
        return Err(FrameError::PayloadTooLarge {
            size: payload_len,
            max: max_payload,
        });
    }

    let total = HEADER_SIZE + payload_len;
    if src.len() < total {
        src.reserve(total - src.len());
        return Ok(None);
    }

    src.advance(HEADER_SIZE);
    let payload = src.split_to(payload_len).freeze();

    if !is_known(kind) {
        return Err(FrameError::UnknownKind(kind));
    }

    Ok(Some(Envelope { kind, payload }))
}

/// Configuration for message framing.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Default: 1 MiB.
    pub max_payload_size: usize,
    /// Read timeout for blocking operations.
    pub read_timeout: Option<std::time::Duration>,
    /// Write timeout for blocking operations.
    pub write_timeout: Option<std::time::Duration>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
            read_timeout: None,
            write_timeout: None,
        }
    }
}
