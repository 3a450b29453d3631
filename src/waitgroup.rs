//! Reusable wait-group barrier.
//!
//! A [`WaitGroup`] is armed with an expected count N. Each of N independent
//! actors calls [`signal`](WaitGroup::signal) exactly once; when the remaining
//! count reaches zero the barrier is released and every coordinator blocked in
//! [`wait`](WaitGroup::wait) resumes.
//!
//! ```text
//!   armed(remaining = N) ──signal──► armed(N-1) ──► ... ──signal──► released
//!          ▲                                                          │
//!          └──────────────────────── rearm(n) ────────────────────────┘
//! ```
//!
//! Waiting on a released barrier returns immediately. Signaling a released
//! barrier is a programming error reported as [`BarrierOverflowError`].
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use std::thread;
//! use coordina::waitgroup::WaitGroup;
//!
//! let wg = Arc::new(WaitGroup::new(2));
//! for _ in 0..2 {
//!     let guard = wg.guard();
//!     thread::spawn(move || {
//!         // work happens here; the guard signals when it goes out of scope
//!         drop(guard);
//!     });
//! }
//! wg.wait();
//! assert!(wg.is_released());
//! ```

use std::fmt::Debug;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{error, trace};

use crate::error::{BarrierOverflowError, RearmError};

#[derive(Debug)]
struct State {
    expected: usize,
    remaining: usize,
    // Bumped on every rearm so waiters of a previous arming are never held
    // back by the next one.
    generation: u64,
}

/// A barrier that releases its waiters after a fixed number of signals.
pub struct WaitGroup {
    state: Mutex<State>,
    released: Condvar,
}

impl WaitGroup {
    /// Creates a barrier armed for `expected` signals.
    ///
    /// A barrier armed for zero signals starts out released.
    pub fn new(expected: usize) -> Self {
        WaitGroup {
            state: Mutex::new(State {
                expected,
                remaining: expected,
                generation: 0,
            }),
            released: Condvar::new(),
        }
    }

    #[inline]
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records one completion.
    ///
    /// The signal that brings the remaining count to zero wakes every waiter.
    ///
    /// # Errors
    ///
    /// Returns [`BarrierOverflowError`] if the barrier is already released.
    pub fn signal(&self) -> Result<(), BarrierOverflowError> {
        let mut state = self.lock();
        if state.remaining == 0 {
            return Err(BarrierOverflowError {
                expected: state.expected,
            });
        }
        state.remaining -= 1;
        if state.remaining == 0 {
            let expected = state.expected;
            drop(state);
            trace!(expected, "barrier released");
            self.released.notify_all();
        }
        Ok(())
    }

    /// Blocks until the barrier is released. Returns at once if it already is.
    pub fn wait(&self) {
        let state = self.lock();
        let generation = state.generation;
        let _state = self
            .released
            .wait_while(state, |s| s.generation == generation && s.remaining > 0)
            .unwrap_or_else(PoisonError::into_inner);
    }

    /// Blocks until the barrier is released or `timeout` elapses.
    ///
    /// Returns `true` if the barrier was released.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let state = self.lock();
        let generation = state.generation;
        let (state, _) = self
            .released
            .wait_timeout_while(state, timeout, |s| {
                s.generation == generation && s.remaining > 0
            })
            .unwrap_or_else(PoisonError::into_inner);
        state.generation != generation || state.remaining == 0
    }

    /// Arms a released barrier again for `expected` signals.
    ///
    /// # Errors
    ///
    /// Returns [`RearmError`] if signals from the current arming are still
    /// outstanding.
    pub fn rearm(&self, expected: usize) -> Result<(), RearmError> {
        let mut state = self.lock();
        if state.remaining > 0 {
            return Err(RearmError {
                remaining: state.remaining,
            });
        }
        state.expected = expected;
        state.remaining = expected;
        state.generation += 1;
        Ok(())
    }

    /// The count the barrier is currently armed with.
    pub fn expected(&self) -> usize {
        self.lock().expected
    }

    /// Signals still outstanding before release.
    pub fn remaining(&self) -> usize {
        self.lock().remaining
    }

    /// Returns `true` once every expected signal has been received.
    pub fn is_released(&self) -> bool {
        self.lock().remaining == 0
    }

    /// Returns a guard that signals this barrier when dropped.
    ///
    /// The guard signals even if the owning thread unwinds, which makes it the
    /// safe way to hand a completion obligation to a spawned actor.
    pub fn guard(self: &Arc<Self>) -> SignalGuard {
        SignalGuard {
            wait_group: Some(Arc::clone(self)),
        }
    }
}

impl Debug for WaitGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("WaitGroup")
            .field("expected", &state.expected)
            .field("remaining", &state.remaining)
            .finish()
    }
}

/// Signals its [`WaitGroup`] exactly once, either explicitly through
/// [`signal`](SignalGuard::signal) or when dropped.
#[derive(Debug)]
pub struct SignalGuard {
    wait_group: Option<Arc<WaitGroup>>,
}

impl SignalGuard {
    /// Signals now and reports overflow to the caller instead of the log.
    pub fn signal(mut self) -> Result<(), BarrierOverflowError> {
        match self.wait_group.take() {
            Some(wait_group) => wait_group.signal(),
            None => Ok(()),
        }
    }
}

impl Drop for SignalGuard {
    fn drop(&mut self) {
        if let Some(wait_group) = self.wait_group.take() {
            if let Err(err) = wait_group.signal() {
                error!(%err, "signal guard dropped after barrier release");
            }
        }
    }
}
