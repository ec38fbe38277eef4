/// Errors that can occur during message framing.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The envelope header contains an invalid magic number.
    #[error("invalid envelope magic (expected 0x5047 \"PG\")")]
    InvalidMagic,

    /// The envelope kind is neither text nor binary. The envelope was
    /// consumed.
    #[error("unknown envelope kind {0:#04x}")]
    UnknownKind(u8),

    /// The payload exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// A text payload was not valid JSON. The envelope was consumed, so the
    /// stream stays aligned on the next message.
    #[error("text payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// An I/O error occurred while reading or writing.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection was closed before a complete envelope was received.
    #[error("connection closed (incomplete message)")]
    ConnectionClosed,
}

impl FrameError {
    /// Returns true if the stream can keep being read after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InvalidJson(_) | Self::UnknownKind(_))
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
