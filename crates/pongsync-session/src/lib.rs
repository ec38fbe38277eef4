//! Live game-state session for the Pong game socket.
//!
//! A [`Session`] mirrors an authoritative server-side match. Inbound JSON
//! status messages go through the control-message [`reduce`]r; inbound
//! binary physics frames go through the frame [`decode`]r. Both land in one
//! observable [`SessionState`]. Outbound commands (start, stop, pause,
//! resume, paddle and dimension updates) are built here and handed to a
//! [`Transport`](pongsync_transport::Transport).
//!
//! Sessions are shared with consumers through an explicit
//! [`SessionContext`].

pub mod command;
pub mod context;
pub mod decoder;
pub mod error;
pub mod reducer;
pub mod roster;
pub mod settings;
pub mod store;
pub mod timer;

pub use command::{to_snake_case, Command};
pub use context::{SessionContext, SessionHandle};
pub use decoder::{
    decode, encode, frame_len, BallState, DecodedFrame, PaddleState, Vec2, HEADER_SIZE,
    PADDLE_RECORD_SIZE,
};
pub use error::{ContextError, DecodeError, Result, SessionError};
pub use reducer::{reduce, Scoreboard};
pub use roster::{Paddle, PaddleRoster};
pub use settings::{Controller, GameRules, GameSettings, Gameplay, Side};
pub use store::{GameSnapshot, Session, SessionConfig, SessionState};
pub use timer::FrameTimer;
