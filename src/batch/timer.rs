//! Flush timer task.
//!
//! A timer is an explicit task object owned by the buffer state: it can be
//! cancelled by whichever flush supersedes it, and it identifies itself by a
//! sequence id so a stale timer never mistakes a newer one for itself.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

pub(crate) type TimerId = u64;

pub(crate) struct ArmedTimer {
    id: TimerId,
    handle: JoinHandle<()>,
}

impl ArmedTimer {
    pub(crate) fn id(&self) -> TimerId {
        self.id
    }

    /// Remove the timer from service.
    ///
    /// The task is cancelled unless `caller` is the timer itself, in which case
    /// it is already running its flush and is simply detached.
    pub(crate) fn disarm(self, caller: Option<TimerId>) {
        if caller != Some(self.id) {
            self.handle.abort();
        }
    }
}

/// Spawn a task that runs `on_fire` after `delay`.
///
/// Must be called from within a tokio runtime.
pub(crate) fn arm<F>(id: TimerId, delay: Duration, on_fire: F) -> ArmedTimer
where
    F: Future<Output = ()> + Send + 'static,
{
    tracing::trace!(timer_id = id, delay_ms = delay.as_millis() as u64, "arming flush timer");
    let handle = tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        on_fire.await;
    });
    ArmedTimer { id, handle }
}
