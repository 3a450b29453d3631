//! Error types shared by the primitives in this crate.
//!
//! Misuse of a channel or a barrier is reported immediately through these
//! types. Failures of a unit of work are different: they are captured as a
//! [`UnitFailure`] inside a [`RunReport`](crate::runner::RunReport) and never
//! propagated to the caller of
//! [`TaskRunner::run_all`](crate::runner::TaskRunner::run_all).
//!
//! # Example
//!
//! ```rust
//! use std::num::NonZeroUsize;
//! use coordina::channel::BoundedChannel;
//! use coordina::error::ClosedQueueError;
//!
//! let channel = BoundedChannel::new(NonZeroUsize::new(1).unwrap());
//! channel.close();
//! assert_eq!(channel.enqueue(7), Err(ClosedQueueError(7)));
//! ```

use std::io;

use thiserror::Error;

/// Boxed error returned by fallible units of work.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Returned by [`BoundedChannel::enqueue`](crate::channel::BoundedChannel::enqueue)
/// when the channel has been closed. The rejected item is handed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("enqueue on a closed channel")]
pub struct ClosedQueueError<T>(pub T);

impl<T> ClosedQueueError<T> {
    /// Returns the item that could not be enqueued.
    pub fn into_inner(self) -> T {
        self.0
    }
}

/// Returned by [`BoundedChannel::try_enqueue`](crate::channel::BoundedChannel::try_enqueue).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TryEnqueueError<T> {
    /// The channel is at capacity.
    #[error("channel is full")]
    Full(T),

    /// The channel has been closed.
    #[error("enqueue on a closed channel")]
    Closed(T),
}

impl<T> TryEnqueueError<T> {
    /// Returns the item that could not be enqueued.
    pub fn into_inner(self) -> T {
        match self {
            TryEnqueueError::Full(item) | TryEnqueueError::Closed(item) => item,
        }
    }
}

impl<T> From<ClosedQueueError<T>> for TryEnqueueError<T> {
    fn from(err: ClosedQueueError<T>) -> Self {
        TryEnqueueError::Closed(err.0)
    }
}

/// Returned by [`BoundedChannel::try_dequeue`](crate::channel::BoundedChannel::try_dequeue).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TryDequeueError {
    /// The channel is open but currently holds no items.
    #[error("channel is empty")]
    Empty,

    /// The channel is closed and drained (end of stream).
    #[error("channel is closed and drained")]
    Closed,
}

/// Returned by [`WaitGroup::signal`](crate::waitgroup::WaitGroup::signal) when
/// it is called more times than the barrier was armed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("barrier armed for {expected} signals was signaled again after release")]
pub struct BarrierOverflowError {
    /// The count the barrier was armed with.
    pub expected: usize,
}

/// Returned by [`WaitGroup::rearm`](crate::waitgroup::WaitGroup::rearm) when
/// the barrier has not been released yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("barrier is still armed with {remaining} outstanding signals")]
pub struct RearmError {
    /// Signals still outstanding at the time of the call.
    pub remaining: usize,
}

/// Failure of a single unit of work submitted to a
/// [`TaskRunner`](crate::runner::TaskRunner).
#[derive(Debug, Error)]
pub enum UnitFailure {
    /// The unit returned an error.
    #[error("unit failed: {0}")]
    Failed(#[source] BoxError),

    /// The unit panicked. The panic payload is kept when it is a string.
    #[error("unit panicked: {message}")]
    Panicked {
        /// Panic message, or a placeholder for non-string payloads.
        message: String,
    },

    /// No thread could be spawned for the unit.
    #[error("could not spawn thread: {0}")]
    Spawn(#[from] io::Error),
}

impl UnitFailure {
    /// Builds a [`UnitFailure::Panicked`] from a payload caught by
    /// [`std::panic::catch_unwind`].
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "(non-string panic payload)".to_string()
        };
        UnitFailure::Panicked { message }
    }
}
