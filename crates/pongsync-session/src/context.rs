use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use pongsync_transport::{Message, Transport};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::ContextError;
use crate::store::{Session, SessionConfig, SessionState};

/// Shared access to one [`Session`].
///
/// Cloning is cheap; every clone refers to the same session. Access is
/// serialized, so inbound messages are applied one at a time in the order
/// callers hand them over.
pub struct SessionHandle<T: Transport> {
    inner: Arc<Mutex<Session<T>>>,
}

impl<T: Transport> Clone for SessionHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Transport> SessionHandle<T> {
    fn new(session: Session<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with exclusive access to the session.
    pub fn with<R>(&self, f: impl FnOnce(&mut Session<T>) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.lock().subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.lock().state()
    }

    pub fn handle_message(&self, message: &Message) {
        self.lock().handle_message(message);
    }

    pub fn handle_transport_error(&self, err: &dyn std::fmt::Display) {
        self.lock().handle_transport_error(err);
    }

    /// Returns true if both handles refer to the same session.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn close(&self) {
        let mut session = self.lock();
        let endpoint = session.endpoint().to_string();
        if let Err(err) = session.close() {
            warn!(%endpoint, error = %err, "failed to close session transport");
        }
    }
}

impl<T: Transport> std::fmt::Debug for SessionHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SessionHandle").field(&*self.lock()).finish()
    }
}

type Slot<T> = Arc<Mutex<Option<SessionHandle<T>>>>;

fn lock_slot<T: Transport>(slot: &Slot<T>) -> MutexGuard<'_, Option<SessionHandle<T>>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A scope that owns at most one session and lends it to consumers.
///
/// Consumers in a [`child`](SessionContext::child) scope see the nearest
/// session provided by that scope or any ancestor. Ending (or dropping) a
/// scope tears down the session it provided.
pub struct SessionContext<T: Transport> {
    /// Innermost scope last.
    scopes: Vec<Slot<T>>,
    config: SessionConfig,
}

impl<T: Transport> SessionContext<T> {
    /// Root context with default session configuration.
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    /// Root context whose sessions use `config`.
    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            scopes: vec![Arc::new(Mutex::new(None))],
            config,
        }
    }

    fn own_slot(&self) -> &Slot<T> {
        // `scopes` always holds at least this context's own slot.
        &self.scopes[self.scopes.len() - 1]
    }

    /// Open one session for `endpoint` and publish it in this scope.
    ///
    /// A session previously provided by this scope is torn down first.
    pub fn provide(&self, endpoint: impl Into<String>, transport: T) -> SessionHandle<T> {
        let session = Session::with_config(endpoint, transport, self.config.clone());
        let handle = SessionHandle::new(session);

        let previous = lock_slot(self.own_slot()).replace(handle.clone());
        if let Some(previous) = previous {
            debug!("replacing provided session");
            previous.close();
        }
        handle
    }

    /// The nearest provided session.
    pub fn consume(&self) -> Result<SessionHandle<T>, ContextError> {
        self.scopes
            .iter()
            .rev()
            .find_map(|slot| lock_slot(slot).clone())
            .ok_or(ContextError::NoActiveSession)
    }

    /// A nested scope that inherits this scope's session.
    pub fn child(&self) -> Self {
        let mut scopes = self.scopes.clone();
        scopes.push(Arc::new(Mutex::new(None)));
        Self {
            scopes,
            config: self.config.clone(),
        }
    }

    /// Tear down the session this scope provided. Sessions provided by
    /// ancestors are left alone.
    pub fn end(&self) {
        let provided = lock_slot(self.own_slot()).take();
        if let Some(handle) = provided {
            handle.close();
        }
    }
}

impl<T: Transport> Default for SessionContext<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> Drop for SessionContext<T> {
    fn drop(&mut self) {
        self.end();
    }
}

impl<T: Transport> std::fmt::Debug for SessionContext<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("depth", &self.scopes.len())
            .field("provided", &lock_slot(self.own_slot()).is_some())
            .finish()
    }
}
