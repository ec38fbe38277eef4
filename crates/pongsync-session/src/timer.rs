use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Pending,
    Running,
    Done,
    Cancelled,
}

struct Shared {
    phase: Mutex<Phase>,
    wake: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Phase> {
        self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A one-shot visual-frame callback, cancelled when dropped.
///
/// Once [`FrameTimer::cancel`] returns, a callback that has not started will
/// never start. A callback already running is not waited for, so it may
/// freely lock whatever owns the timer or schedule the next frame.
pub struct FrameTimer {
    shared: Arc<Shared>,
}

impl FrameTimer {
    /// Run `callback` once after `delay`, unless cancelled first.
    pub fn schedule<F>(delay: Duration, callback: F) -> std::io::Result<Self>
    where
        F: FnOnce() + Send + 'static,
    {
        let shared = Arc::new(Shared {
            phase: Mutex::new(Phase::Pending),
            wake: Condvar::new(),
        });
        let worker = Arc::clone(&shared);

        std::thread::Builder::new()
            .name("pongsync-frame".to_string())
            .spawn(move || {
                {
                    let (mut phase, _) = worker
                        .wake
                        .wait_timeout_while(worker.lock(), delay, |phase| {
                            *phase == Phase::Pending
                        })
                        .unwrap_or_else(PoisonError::into_inner);
                    if *phase != Phase::Pending {
                        trace!("frame callback cancelled");
                        return;
                    }
                    *phase = Phase::Running;
                }

                callback();

                *worker.lock() = Phase::Done;
            })?;

        Ok(Self { shared })
    }

    /// Returns true while the callback has neither started nor been
    /// cancelled.
    pub fn is_pending(&self) -> bool {
        *self.shared.lock() == Phase::Pending
    }

    /// Returns true once the callback has returned.
    pub fn has_fired(&self) -> bool {
        *self.shared.lock() == Phase::Done
    }

    /// Cancel the callback if it has not started yet.
    pub fn cancel(&mut self) {
        let mut phase = self.shared.lock();
        if *phase == Phase::Pending {
            *phase = Phase::Cancelled;
            self.shared.wake.notify_all();
        }
    }
}

impl Drop for FrameTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for FrameTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameTimer")
            .field("phase", &*self.shared.lock())
            .finish()
    }
}
