//! Flush statistics.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// What caused a flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlushTrigger {
    /// Pending items reached the count threshold.
    Count,
    /// The interval had already elapsed when an item was submitted.
    Elapsed,
    /// The armed timer fired.
    Timer,
    /// `flush_now` was called.
    Explicit,
    /// The buffer was closed.
    Close,
}

impl FlushTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlushTrigger::Count => "count",
            FlushTrigger::Elapsed => "elapsed",
            FlushTrigger::Timer => "timer",
            FlushTrigger::Explicit => "explicit",
            FlushTrigger::Close => "close",
        }
    }
}

impl fmt::Display for FlushTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of a buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchBufferStats {
    /// Items waiting for the next flush.
    pub pending: usize,
    pub timer_armed: bool,
    pub closed: bool,
    /// Handler invocations.
    pub flushes: u64,
    /// Handler invocations that returned an error.
    pub failed_flushes: u64,
    pub items_flushed: u64,
    pub last_trigger: Option<FlushTrigger>,
}

impl BatchBufferStats {
    pub fn failure_ratio(&self) -> f64 {
        if self.flushes == 0 {
            0.0
        } else {
            self.failed_flushes as f64 / self.flushes as f64
        }
    }

    pub fn average_batch_size(&self) -> f64 {
        if self.flushes == 0 {
            0.0
        } else {
            self.items_flushed as f64 / self.flushes as f64
        }
    }
}

pub(crate) struct AtomicStats {
    flushes: AtomicU64,
    failed_flushes: AtomicU64,
    items_flushed: AtomicU64,
}

impl AtomicStats {
    pub(crate) fn new() -> Self {
        Self {
            flushes: AtomicU64::new(0),
            failed_flushes: AtomicU64::new(0),
            items_flushed: AtomicU64::new(0),
        }
    }

    pub(crate) fn record(&self, size: usize, ok: bool) {
        self.flushes.fetch_add(1, Ordering::Relaxed);
        self.items_flushed.fetch_add(size as u64, Ordering::Relaxed);
        if !ok {
            self.failed_flushes.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn fill(&self, stats: &mut BatchBufferStats) {
        stats.flushes = self.flushes.load(Ordering::Relaxed);
        stats.failed_flushes = self.failed_flushes.load(Ordering::Relaxed);
        stats.items_flushed = self.items_flushed.load(Ordering::Relaxed);
    }
}
