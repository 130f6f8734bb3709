//! Per-item completion handles.

use futures::FutureExt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

use crate::{Error, Result};

/// Sending half of a completion handle, owned by the buffer until the item is
/// flushed. Resolving consumes it, so an item can only be resolved once.
pub(crate) struct Completer {
    tx: oneshot::Sender<Result<()>>,
}

impl Completer {
    pub(crate) fn resolve(self, outcome: Result<()>) {
        // Receiver may already be gone; the producer chose not to wait.
        let _ = self.tx.send(outcome);
    }
}

/// Outcome of one submitted item.
///
/// Resolves with `Ok(())` once the batch holding the item was flushed
/// successfully, or with the handler's error when that flush failed. Waiting
/// is optional; dropping the handle never affects the flush.
///
/// The outcome is cached, so it can be read any number of times.
#[derive(Debug)]
pub struct CompletionHandle {
    rx: Option<oneshot::Receiver<Result<()>>>,
    outcome: Option<Result<()>>,
}

impl CompletionHandle {
    pub(crate) fn channel() -> (Completer, CompletionHandle) {
        let (tx, rx) = oneshot::channel();
        (
            Completer { tx },
            CompletionHandle {
                rx: Some(rx),
                outcome: None,
            },
        )
    }

    /// A handle that is already resolved.
    pub(crate) fn resolved(outcome: Result<()>) -> Self {
        Self {
            rx: None,
            outcome: Some(outcome),
        }
    }

    /// Wait for the item's batch to be flushed.
    pub async fn wait(&mut self) -> Result<()> {
        std::future::poll_fn(|cx| self.poll_outcome(cx)).await
    }

    /// Return the outcome if the item was already flushed, without waiting.
    pub fn try_wait(&mut self) -> Option<Result<()>> {
        if self.outcome.is_none() {
            let rx = self.rx.as_mut()?;
            match rx.try_recv() {
                Ok(outcome) => self.store(outcome),
                Err(oneshot::error::TryRecvError::Empty) => return None,
                Err(oneshot::error::TryRecvError::Closed) => self.store(Err(Error::Abandoned)),
            }
        }
        self.outcome.clone()
    }

    /// Block the current thread until the item is flushed.
    ///
    /// # Panics
    ///
    /// Panics when called from within an asynchronous execution context,
    /// like `tokio::sync::oneshot::Receiver::blocking_recv`.
    pub fn blocking_wait(mut self) -> Result<()> {
        if let Some(outcome) = self.outcome.take() {
            return outcome;
        }
        match self.rx.take() {
            Some(rx) => rx.blocking_recv().unwrap_or(Err(Error::Abandoned)),
            None => Err(Error::Abandoned),
        }
    }

    pub fn is_resolved(&mut self) -> bool {
        self.try_wait().is_some()
    }

    fn poll_outcome(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        if let Some(outcome) = &self.outcome {
            return Poll::Ready(outcome.clone());
        }
        let Some(rx) = self.rx.as_mut() else {
            return Poll::Ready(Err(Error::Abandoned));
        };
        let outcome = match rx.poll_unpin(cx) {
            Poll::Ready(Ok(outcome)) => outcome,
            Poll::Ready(Err(_)) => Err(Error::Abandoned),
            Poll::Pending => return Poll::Pending,
        };
        self.store(outcome.clone());
        Poll::Ready(outcome)
    }

    fn store(&mut self, outcome: Result<()>) {
        self.rx = None;
        self.outcome = Some(outcome);
    }
}

impl Future for CompletionHandle {
    type Output = Result<()>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.get_mut().poll_outcome(cx)
    }
}
