//! Batch buffer.

use std::mem;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, trace, warn};

use super::config::{BatchBufferConfig, Thresholds};
use super::handle::{Completer, CompletionHandle};
use super::handler::FlushHandler;
use super::stats::{AtomicStats, BatchBufferStats, FlushTrigger};
use super::timer::{self, ArmedTimer, TimerId};
use crate::{Error, HandlerError};

struct BufferState<T> {
    /// Index-aligned with `completers`.
    items: Vec<T>,
    completers: Vec<Completer>,
    last_flush: Instant,
    timer: Option<ArmedTimer>,
    timer_seq: TimerId,
    last_trigger: Option<FlushTrigger>,
    closed: bool,
}

struct Shared<T> {
    handler: Arc<dyn FlushHandler<T>>,
    thresholds: Thresholds,
    state: RwLock<BufferState<T>>,
    /// Held from snapshot until the last handle of the batch is resolved.
    flush_gate: Arc<Mutex<()>>,
    stats: AtomicStats,
}

/// Thread-safe buffer that hands its contents to a [`FlushHandler`] when it
/// reaches `flush_count` items or when `flush_interval` has passed since the
/// last flush, whichever comes first.
///
/// Cloning yields another handle to the same buffer. Timers are tokio tasks,
/// so submitting must happen inside a tokio runtime.
///
/// Items still pending when the last handle is dropped are flushed by the
/// armed timer. Call [`close`](Self::close) for a deterministic shutdown.
///
/// Items must be `Send + Sync`: pending items sit behind a reader/writer lock
/// shared with the timer task.
pub struct BatchBuffer<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for BatchBuffer<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> BatchBuffer<T>
where
    T: Send + Sync + 'static,
{
    pub fn new<H>(handler: H, config: BatchBufferConfig) -> Self
    where
        H: FlushHandler<T>,
    {
        Self::with_shared_handler(Arc::new(handler), config)
    }

    /// Buffer flushing at least once per second and whenever 1024 items are
    /// pending.
    pub fn with_defaults<H>(handler: H) -> Self
    where
        H: FlushHandler<T>,
    {
        Self::new(handler, BatchBufferConfig::default())
    }

    pub fn with_shared_handler(handler: Arc<dyn FlushHandler<T>>, config: BatchBufferConfig) -> Self {
        let thresholds = config.thresholds();
        Self {
            shared: Arc::new(Shared {
                handler,
                thresholds,
                state: RwLock::new(BufferState {
                    items: Vec::new(),
                    completers: Vec::new(),
                    last_flush: Instant::now(),
                    timer: None,
                    timer_seq: 0,
                    last_trigger: None,
                    closed: false,
                }),
                flush_gate: Arc::new(Mutex::new(())),
                stats: AtomicStats::new(),
            }),
        }
    }

    /// Add an item to the buffer.
    ///
    /// If the item brings the buffer to `flush_count`, or `flush_interval` has
    /// already passed since the last flush, the batch is flushed before this
    /// returns. Otherwise a flush timer is armed if none is.
    ///
    /// On a closed buffer the item is dropped and the handle resolves with
    /// [`Error::Closed`].
    ///
    /// # Cancel safety
    ///
    /// Once the item is appended it is never lost by dropping this future. If
    /// it is still pending, it goes out with the next flush. If this call
    /// already started a flush, that flush runs to completion on its own task
    /// and resolves every handle of its batch.
    pub async fn submit(&self, item: T) -> CompletionHandle {
        let (completer, handle) = CompletionHandle::channel();
        let trigger = {
            let mut state = self.shared.state.write().await;
            if state.closed {
                return CompletionHandle::resolved(Err(Error::Closed));
            }
            state.items.push(item);
            state.completers.push(completer);

            let thresholds = &self.shared.thresholds;
            if state.items.len() >= thresholds.flush_count {
                Some(FlushTrigger::Count)
            } else if state.last_flush.elapsed() >= thresholds.flush_interval {
                Some(FlushTrigger::Elapsed)
            } else {
                if state.timer.is_none() {
                    self.shared.arm_timer(&mut state);
                }
                None
            }
        };

        if let Some(trigger) = trigger {
            self.shared.flush(trigger, None).await;
        }
        handle
    }

    /// Flush everything pending right now.
    ///
    /// Never fails: a handler error is delivered through the completion
    /// handles of the flushed items. With nothing pending the handler is not
    /// called, but the interval clock still restarts and the timer is disarmed.
    ///
    /// Dropping this future after the batch was taken does not cancel the
    /// handler.
    pub async fn flush_now(&self) {
        self.shared.flush(FlushTrigger::Explicit, None).await;
    }

    /// Stop accepting items, cancel the armed timer and flush what is pending.
    ///
    /// Returns after the final flush completed. Calling it again is harmless.
    pub async fn close(&self) {
        let already_closed = {
            let mut state = self.shared.state.write().await;
            mem::replace(&mut state.closed, true)
        };
        if !already_closed {
            debug!("closing batch buffer");
        }
        self.shared.flush(FlushTrigger::Close, None).await;
    }

    pub async fn is_closed(&self) -> bool {
        self.shared.state.read().await.closed
    }

    /// Number of items waiting for the next flush.
    pub async fn len(&self) -> usize {
        self.shared.state.read().await.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub fn thresholds(&self) -> Thresholds {
        self.shared.thresholds
    }

    pub async fn stats(&self) -> BatchBufferStats {
        let mut stats = {
            let state = self.shared.state.read().await;
            BatchBufferStats {
                pending: state.items.len(),
                timer_armed: state.timer.is_some(),
                closed: state.closed,
                last_trigger: state.last_trigger,
                ..BatchBufferStats::default()
            }
        };
        self.shared.stats.fill(&mut stats);
        stats
    }
}

impl<T> Shared<T>
where
    T: Send + Sync + 'static,
{
    fn arm_timer(self: &Arc<Self>, state: &mut BufferState<T>) {
        state.timer_seq = state.timer_seq.wrapping_add(1);
        let id = state.timer_seq;
        let shared = Arc::clone(self);
        state.timer = Some(timer::arm(id, self.thresholds.flush_interval, async move {
            shared.on_timer(id).await;
        }));
    }

    async fn on_timer(self: &Arc<Self>, id: TimerId) {
        let still_armed = self
            .state
            .read()
            .await
            .timer
            .as_ref()
            .is_some_and(|timer| timer.id() == id);
        if still_armed {
            self.flush(FlushTrigger::Timer, Some(id)).await;
        } else {
            trace!(timer_id = id, "flush timer superseded");
        }
    }

    /// `caller` is the id of the timer running this flush, if any.
    ///
    /// The handler runs on a spawned task holding the gate, so a dropped
    /// caller detaches from the flush instead of cancelling it.
    async fn flush(self: &Arc<Self>, trigger: FlushTrigger, caller: Option<TimerId>) {
        let gate = Arc::clone(&self.flush_gate).lock_owned().await;

        let (items, completers) = {
            let mut state = self.state.write().await;
            state.last_flush = Instant::now();
            state.last_trigger = Some(trigger);
            if let Some(timer) = state.timer.take() {
                timer.disarm(caller);
            }
            (mem::take(&mut state.items), mem::take(&mut state.completers))
        };

        if items.is_empty() {
            trace!(%trigger, "nothing pending to flush");
            return;
        }

        let shared = Arc::clone(self);
        let task = tokio::spawn(async move {
            let _gate = gate;
            shared.deliver(trigger, items, completers).await;
        });
        if let Err(e) = task.await {
            if e.is_panic() {
                warn!(%trigger, "flush handler panicked, batch abandoned");
            }
        }
    }

    async fn deliver(&self, trigger: FlushTrigger, items: Vec<T>, completers: Vec<Completer>) {
        let size = items.len();
        debug!(%trigger, size, "flushing batch");
        let outcome = self
            .handler
            .flush(items)
            .await
            .map_err(|e| Error::Handler(HandlerError::new(e)));
        self.stats.record(size, outcome.is_ok());
        if outcome.is_err() {
            debug!(%trigger, size, "flush handler failed, resolving batch with its error");
        }

        for completer in completers {
            completer.resolve(outcome.clone());
        }
    }
}
