//! Flush handler abstraction.

use async_trait::async_trait;
use std::future::Future;
use std::marker::PhantomData;

use crate::BoxError;

/// Consumer of flushed batches.
///
/// Called with every item pending at flush time, in submission order. The
/// returned error is delivered to every completion handle of that batch; a
/// batch either succeeds or fails as a whole.
///
/// A buffer never runs two flushes of its handler at the same time.
#[async_trait]
pub trait FlushHandler<T>: Send + Sync + 'static {
    async fn flush(&self, batch: Vec<T>) -> Result<(), BoxError>;
}

/// Handler built from an async closure, see [`handler_fn`].
pub struct FnHandler<F, T> {
    f: F,
    _marker: PhantomData<fn(Vec<T>)>,
}

/// Wrap an async closure as a [`FlushHandler`].
///
/// ```rust
/// use batch_buffer::batch::handler_fn;
///
/// let handler = handler_fn(|batch: Vec<String>| async move {
///     println!("writing {} lines", batch.len());
///     Ok::<(), batch_buffer::BoxError>(())
/// });
/// # let _ = handler;
/// ```
pub fn handler_fn<T, F, Fut>(f: F) -> FnHandler<F, T>
where
    F: Fn(Vec<T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send,
{
    FnHandler {
        f,
        _marker: PhantomData,
    }
}

#[async_trait]
impl<T, F, Fut> FlushHandler<T> for FnHandler<F, T>
where
    T: Send + 'static,
    F: Fn(Vec<T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send,
{
    async fn flush(&self, batch: Vec<T>) -> Result<(), BoxError> {
        (self.f)(batch).await
    }
}
