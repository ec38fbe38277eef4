use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::error::{Result, TransportError};
use crate::traits::Transport;

/// Shared view of the commands a [`MemoryTransport`] has sent.
#[derive(Debug, Clone, Default)]
pub struct SentLog {
    messages: Arc<Mutex<Vec<serde_json::Value>>>,
}

impl SentLog {
    /// All messages sent so far, oldest first.
    pub fn messages(&self) -> Vec<serde_json::Value> {
        self.lock().clone()
    }

    /// The most recently sent message.
    pub fn last(&self) -> Option<serde_json::Value> {
        self.lock().last().cloned()
    }

    /// Number of messages sent so far.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nothing was sent.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn push(&self, message: serde_json::Value) {
        self.lock().push(message);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<serde_json::Value>> {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// In-memory transport that records outbound commands instead of sending
/// them anywhere.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    sent: SentLog,
    closed: bool,
}

impl MemoryTransport {
    /// Create a transport and the log observing it.
    pub fn new() -> (Self, SentLog) {
        let transport = Self::default();
        let log = transport.sent.clone();
        (transport, log)
    }

    /// Returns true once `close` was called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Transport for MemoryTransport {
    fn send(&mut self, message: &serde_json::Value) -> Result<()> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        self.sent.push(message.clone());
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if !self.closed {
            debug!(sent = self.sent.len(), "memory transport closed");
        }
        self.closed = true;
        Ok(())
    }
}
