//! Transport seam for the pongsync game client.
//!
//! The session core never talks to a socket directly. It receives inbound
//! [`Message`]s (parsed JSON or raw binary) and sends outbound commands
//! through anything implementing [`Transport`].
//!
//! Provided here:
//! - [`MemoryTransport`] records outbound commands in memory
//! - [`SocketStream`] / [`SocketListener`] wrap Unix domain sockets for the
//!   framed transport in `pongsync-frame`

pub mod error;
pub mod memory;
pub mod message;
pub mod traits;

#[cfg(unix)]
pub mod uds;

pub use error::{Result, TransportError};
pub use memory::{MemoryTransport, SentLog};
pub use message::Message;
pub use traits::{SocketStream, Transport};

#[cfg(unix)]
pub use uds::{connect, SocketListener};
