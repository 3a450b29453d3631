//! Units of work and the cancellation token handed to them.

use std::fmt::Debug;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{BoxError, UnitFailure};

type Work = Box<dyn FnOnce(&CancellationToken) -> Result<(), BoxError> + Send + 'static>;

/// Cooperative cancellation flag shared by every unit of one run.
///
/// The runner cancels the token when a configured deadline expires. Units
/// that accept a token (see [`Task::cancellable`]) are expected to poll
/// [`is_cancelled`](CancellationToken::is_cancelled) and return early; nothing
/// forcibly stops a running unit.
///
/// # Examples
///
/// ```rust
/// use coordina::runner::CancellationToken;
///
/// let token = CancellationToken::new();
/// let shared = token.clone();
/// assert!(!shared.is_cancelled());
/// token.cancel();
/// assert!(shared.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the token and every clone of it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// A zero-argument unit of work submitted to a
/// [`TaskRunner`](crate::runner::TaskRunner).
///
/// # Examples
///
/// ```rust
/// use coordina::runner::Task;
///
/// let infallible = Task::new(|| println!("hello")).with_name("greet");
/// let fallible = Task::fallible(|| -> Result<(), std::io::Error> { Ok(()) });
/// let cooperative = Task::cancellable(|token| {
///     if token.is_cancelled() {
///         return Err("gave up");
///     }
///     Ok(())
/// });
/// assert_eq!(infallible.name(), Some("greet"));
/// assert_eq!(fallible.name(), None);
/// assert_eq!(cooperative.name(), None);
/// ```
pub struct Task {
    name: Option<String>,
    work: Work,
}

impl Task {
    /// Wraps a closure that cannot fail. A panic still counts as a failure.
    pub fn new<F>(work: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Task {
            name: None,
            work: Box::new(move |_: &CancellationToken| -> Result<(), BoxError> {
                work();
                Ok(())
            }),
        }
    }

    /// Wraps a closure whose `Err` is reported as [`UnitFailure::Failed`].
    pub fn fallible<F, E>(work: F) -> Self
    where
        F: FnOnce() -> Result<(), E> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        Task {
            name: None,
            work: Box::new(move |_: &CancellationToken| -> Result<(), BoxError> {
                work().map_err(Into::into)
            }),
        }
    }

    /// Wraps a closure that receives the run's [`CancellationToken`].
    pub fn cancellable<F, E>(work: F) -> Self
    where
        F: FnOnce(&CancellationToken) -> Result<(), E> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        Task {
            name: None,
            work: Box::new(move |token: &CancellationToken| -> Result<(), BoxError> {
                work(token).map_err(Into::into)
            }),
        }
    }

    /// Sets a name reported alongside the unit's outcome.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns the name of this unit, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Invokes the unit, turning both returned errors and panics into a
    /// [`UnitFailure`].
    pub(crate) fn run(self, token: &CancellationToken) -> Result<(), UnitFailure> {
        let work = self.work;
        match panic::catch_unwind(AssertUnwindSafe(move || work(token))) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(UnitFailure::Failed(err)),
            Err(payload) => Err(UnitFailure::from_panic(payload)),
        }
    }
}

impl Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_new_runs_closure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let task = {
            let calls = Arc::clone(&calls);
            Task::new(move || {
                calls.fetch_add(1, Ordering::Relaxed);
            })
        };
        assert!(task.run(&CancellationToken::new()).is_ok());
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_fallible_error_is_captured() {
        let task = Task::fallible(|| Err("no such table"));
        match task.run(&CancellationToken::new()) {
            Err(UnitFailure::Failed(err)) => assert_eq!(err.to_string(), "no such table"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_panic_is_captured() {
        let task = Task::new(|| panic!("index out of range"));
        match task.run(&CancellationToken::new()) {
            Err(UnitFailure::Panicked { message }) => assert_eq!(message, "index out of range"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_cancellable_sees_token() {
        let token = CancellationToken::new();
        token.cancel();
        let task = Task::cancellable(|token| {
            if token.is_cancelled() {
                Err("cancelled")
            } else {
                Ok(())
            }
        });
        assert!(matches!(task.run(&token), Err(UnitFailure::Failed(_))));
    }

    #[test]
    fn test_with_name_and_debug() {
        let task = Task::new(|| {}).with_name("job");
        assert_eq!(task.name(), Some("job"));
        assert_eq!(format!("{:?}", task), "Task { name: Some(\"job\") }");
    }

    #[test]
    fn test_token_clones_share_state() {
        let token = CancellationToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }
}
