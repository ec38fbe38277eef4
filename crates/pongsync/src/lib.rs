//! Client for the Pong game socket.
//!
//! pongsync mirrors an authoritative server-side Pong match: it decodes the
//! server's binary physics frames, folds its JSON status messages into a
//! scoreboard, and sends match commands back.
//!
//! # Crate Structure
//!
//! - [`transport`]: the outbound transport seam and Unix socket plumbing
//! - [`frame`]: the text/binary message envelope used on the game socket
//! - [`session`]: frame decoding, control-message reduction, the live
//!   session store and its context

/// Re-export transport types.
pub mod transport {
    pub use pongsync_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use pongsync_frame::*;
}

/// Re-export session types.
pub mod session {
    pub use pongsync_session::*;
}
