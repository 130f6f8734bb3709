//! # batch-buffer
//!
//! Concurrent batching buffer: producers submit items one at a time, and the
//! buffer hands them to a user-supplied handler in batches, triggered by an
//! item count or an elapsed interval, whichever comes first.
//!
//! ## Key Features
//!
//! - **Dual trigger**: count threshold checked on every submit, time threshold
//!   driven by a single on-demand timer task
//! - **Non-blocking producers**: the handler runs outside the state lock
//! - **Per-item outcome**: every submit returns a [`batch::CompletionHandle`]
//!   resolved with the result of the flush that carried the item
//! - **Deterministic shutdown**: [`batch::BatchBuffer::close`] flushes the
//!   remainder and cancels the pending timer
//!
//! ## Quick Start
//!
//! ```rust
//! use batch_buffer::batch::{handler_fn, BatchBuffer, BatchBufferConfig};
//! use std::time::Duration;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> batch_buffer::Result<()> {
//!     let buffer = BatchBuffer::new(
//!         handler_fn(|rows: Vec<u64>| async move {
//!             // one round-trip for the whole batch
//!             println!("inserting {} rows", rows.len());
//!             Ok::<(), batch_buffer::BoxError>(())
//!         }),
//!         BatchBufferConfig::new().with_flush_interval(Duration::from_millis(50)),
//!     );
//!
//!     let handle = buffer.submit(42).await;
//!     buffer.flush_now().await;
//!     handle.await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`batch`] | Buffer, configuration, handlers and completion handles |
//! | [`error`] | Error types |

pub mod batch;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{BoxError, Error, HandlerError};

pub use batch::{BatchBuffer, BatchBufferConfig, CompletionHandle, FlushHandler};
