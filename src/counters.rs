//! Shared 64-bit signed counters under two alternative disciplines.
//!
//! Every counter implements the [`Counter`] trait, so callers (and tests) can
//! treat the disciplines interchangeably:
//!
//! | Type | Discipline | Increment |
//! |------|------------|-----------|
//! | [`LockingCounter`](locking::LockingCounter) | mutual exclusion | lock, read-modify-write, unlock |
//! | [`AtomicCounter`](atomic::AtomicCounter) | lock-free | hardware fetch-and-add |
//! | [`CasCounter`](cas::CasCounter) | lock-free | compare-and-swap retry loop |
//!
//! Each discipline is a distinct type, so a single counter instance can never
//! be protected by more than one of them.
//!
//! # Correctness
//!
//! For any number of concurrent actors C each performing K increments, the
//! final value is exactly C×K under every discipline. Values are read after
//! the contributing actors have synchronized with the reader (for example
//! through a [`WaitGroup`](crate::waitgroup::WaitGroup) or a thread join).
//!
//! ```text
//!   actor 0 ──increment──┐
//!   actor 1 ──increment──┼──►  [ Counter ]  ──value()──►  C × K
//!      ...               │
//!   actor C ──increment──┘
//! ```
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use std::thread;
//! use coordina::counters::{Counter, atomic::AtomicCounter};
//!
//! let counter = Arc::new(AtomicCounter::new().with_name("hits"));
//! let handles: Vec<_> = (0..4)
//!     .map(|_| {
//!         let counter = Arc::clone(&counter);
//!         thread::spawn(move || {
//!             for _ in 0..1000 {
//!                 counter.increment();
//!             }
//!         })
//!     })
//!     .collect();
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! assert_eq!(counter.value(), 4000);
//! ```

pub mod atomic;
pub mod cas;
pub mod locking;

use std::fmt::{Debug, Display};

/// Common interface of the counter disciplines.
///
/// Implementors are `Send + Sync` and are meant to be shared through
/// `Arc<impl Counter>` or `&dyn Counter`.
pub trait Counter: Debug + Send + Sync {
    /// Returns the name of this counter, or an empty string if unnamed.
    fn name(&self) -> &str;

    /// Adds `delta` (which may be negative) to the counter.
    fn add(&self, delta: i64);

    /// Increases the counter by exactly one.
    #[inline]
    fn increment(&self) {
        self.add(1);
    }

    /// Returns the current value.
    fn value(&self) -> i64;

    /// Returns the current value and sets the counter back to zero.
    ///
    /// Increments racing with this call land either in the returned value or
    /// in the next read; none is lost.
    fn value_and_reset(&self) -> i64;
}

impl Display for dyn Counter + '_ {
    /// Formats the counter as `name:value` if named, or just `value` otherwise.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.name().is_empty() {
            write!(f, "{}:{}", self.name(), self.value())
        } else {
            write!(f, "{}", self.value())
        }
    }
}
