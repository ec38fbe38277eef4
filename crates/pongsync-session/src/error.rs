/// A binary physics frame that could not be decoded.
///
/// Never fatal: the session logs it and drops the frame.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Too short to hold the ball state.
    #[error("frame too short for ball state (expected {expected} bytes, got {actual})")]
    TruncatedHeader { expected: usize, actual: usize },

    /// Ball state present, but not every paddle record.
    #[error("incomplete paddle data (expected {expected} bytes, got {actual})")]
    TruncatedPaddleData { expected: usize, actual: usize },
}

/// Errors raised by outbound session commands.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The transport refused the command.
    #[error("transport error: {0}")]
    Transport(#[from] pongsync_transport::TransportError),

    /// JSON serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A command payload did not serialize to a JSON object.
    #[error("invalid {action} payload: expected an object, got {found}")]
    InvalidPayload {
        action: &'static str,
        found: &'static str,
    },

    /// The frame timer thread could not be spawned.
    #[error("failed to schedule frame callback: {0}")]
    Timer(#[source] std::io::Error),
}

/// Misuse of a [`SessionContext`](crate::SessionContext).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    /// No session was provided in this context or any parent.
    #[error("no active session: consume() must be called within a provided session scope")]
    NoActiveSession,
}

pub type Result<T> = std::result::Result<T, SessionError>;
