use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Boxed error returned by flush handlers.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Error produced by a flush handler, shared by every completion handle of
/// the batch it failed on.
#[derive(Clone)]
pub struct HandlerError {
    inner: Arc<dyn StdError + Send + Sync + 'static>,
}

impl HandlerError {
    pub fn new(err: BoxError) -> Self {
        Self { inner: Arc::from(err) }
    }

    /// True when both values come from the same handler failure.
    pub fn ptr_eq(&self, other: &HandlerError) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Recover the concrete error type returned by the handler.
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.inner.downcast_ref::<E>()
    }

    pub fn get_ref(&self) -> &(dyn StdError + Send + Sync + 'static) {
        &*self.inner
    }
}

impl fmt::Debug for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.inner, f)
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.inner, f)
    }
}

impl StdError for HandlerError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source()
    }
}

/// Unified error type for the batch buffer.
///
/// Cloneable because a single flush outcome is delivered to every item of the
/// batch.
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("Flush handler error: {0}")]
    Handler(HandlerError),

    #[error("Batch buffer is closed")]
    Closed,

    #[error("Batch buffer dropped before the item was flushed")]
    Abandoned,

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration {
            message: msg.into(),
        }
    }

    /// The handler error, if this outcome came from a failed flush.
    pub fn handler_error(&self) -> Option<&HandlerError> {
        match self {
            Error::Handler(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Error::Closed)
    }

    pub fn is_abandoned(&self) -> bool {
        matches!(self, Error::Abandoned)
    }
}

impl From<HandlerError> for Error {
    fn from(e: HandlerError) -> Self {
        Error::Handler(e)
    }
}
