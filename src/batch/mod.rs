//! # Batch Buffer Module
//!
//! Decouples producers from a consumer that is expensive per call but cheap
//! per additional item (a network write, a disk append, a batched API call).
//!
//! ## Overview
//!
//! Producers call [`BatchBuffer::submit`] and get a [`CompletionHandle`] back
//! immediately. The buffer hands everything pending to its [`FlushHandler`]
//! when either trigger fires:
//!
//! - **Count**: pending items reach `flush_count`; the submitting task runs
//!   the flush before `submit` returns.
//! - **Time**: `flush_interval` passes since the last flush; a timer task is
//!   armed on the first pending item and flushes when it fires, unless another
//!   flush superseded it.
//!
//! [`BatchBuffer::flush_now`] and [`BatchBuffer::close`] flush on demand.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`BatchBuffer`] | Shared buffer with count and time triggers |
//! | [`BatchBufferConfig`] | Thresholds, unset fields fall back to defaults |
//! | [`CompletionHandle`] | Per-item outcome of the flush that carried it |
//! | [`FlushHandler`] | Consumer of flushed batches |
//! | [`BatchBufferStats`] | Point-in-time counters and state |
//!
//! ## Error semantics
//!
//! A handler error fails every item of its batch and nothing else. It is never
//! retried and never returned from `flush_now`; producers only see it if they
//! wait on their handle.
//!
//! ## Example
//!
//! ```rust
//! use batch_buffer::batch::{handler_fn, BatchBuffer, BatchBufferConfig};
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let config = BatchBufferConfig::new()
//!     .with_flush_count(2)
//!     .with_flush_interval(Duration::from_secs(1));
//! let buffer = BatchBuffer::new(
//!     handler_fn(|lines: Vec<String>| async move {
//!         println!("{}", lines.join(" "));
//!         Ok::<(), batch_buffer::BoxError>(())
//!     }),
//!     config,
//! );
//!
//! let hello = buffer.submit("hello".to_string()).await;
//! let world = buffer.submit("world".to_string()).await; // flushes both
//! assert!(hello.await.is_ok());
//! assert!(world.await.is_ok());
//! # }
//! ```

mod buffer;
mod config;
mod handle;
mod handler;
mod stats;
mod timer;

pub use buffer::BatchBuffer;
pub use config::{BatchBufferConfig, Thresholds, DEFAULT_FLUSH_COUNT, DEFAULT_FLUSH_INTERVAL};
pub use handle::CompletionHandle;
pub use handler::{handler_fn, FlushHandler, FnHandler};
pub use stats::{BatchBufferStats, FlushTrigger};
