//! Lock-free counter built on a compare-and-swap retry loop.
//!
//! Unlike [`AtomicCounter`](super::atomic::AtomicCounter), an update may have
//! to retry when another actor changed the value between the load and the
//! swap. Retries back off with [`crossbeam_utils::Backoff`] and are counted so
//! contention can be observed.

use std::fmt::Debug;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use crossbeam_utils::{Backoff, CachePadded};

use crate::counters::Counter;

/// A lock-free counter updated through `compare_exchange_weak`.
///
/// # Examples
///
/// ```rust
/// use coordina::counters::Counter;
/// use coordina::counters::cas::CasCounter;
///
/// let counter = CasCounter::new().with_name("cas");
/// counter.increment();
/// counter.increment();
/// assert_eq!(counter.value(), 2);
/// // single-threaded updates never contend
/// assert_eq!(counter.retries(), 0);
/// ```
pub struct CasCounter {
    name: &'static str,
    value: CachePadded<AtomicI64>,
    retries: AtomicU64,
}

impl CasCounter {
    /// Creates a new counter initialized to zero.
    pub const fn new() -> Self {
        CasCounter {
            name: "",
            value: CachePadded::new(AtomicI64::new(0)),
            retries: AtomicU64::new(0),
        }
    }

    /// Sets the name of this counter, returning `self` for method chaining.
    pub const fn with_name(self, name: &'static str) -> Self {
        Self { name, ..self }
    }

    /// Number of times an update lost a race and had to retry.
    pub fn retries(&self) -> u64 {
        self.retries.load(Ordering::Relaxed)
    }

    /// Applies `f` to the current value until the swap succeeds, returning
    /// the previous value.
    #[inline]
    fn update(&self, f: impl Fn(i64) -> i64) -> i64 {
        let backoff = Backoff::new();
        let mut current = self.value.load(Ordering::Relaxed);
        loop {
            match self.value.compare_exchange_weak(
                current,
                f(current),
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(previous) => return previous,
                Err(actual) => {
                    current = actual;
                    self.retries.fetch_add(1, Ordering::Relaxed);
                    backoff.spin();
                }
            }
        }
    }
}

impl Counter for CasCounter {
    #[inline]
    fn name(&self) -> &str {
        self.name
    }

    #[inline]
    fn add(&self, delta: i64) {
        self.update(|current| current.wrapping_add(delta));
    }

    #[inline]
    fn value(&self) -> i64 {
        self.value.load(Ordering::Acquire)
    }

    #[inline]
    fn value_and_reset(&self) -> i64 {
        self.update(|_| 0)
    }
}

impl Default for CasCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for CasCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CasCounter({}={}, retries={})",
            self.name,
            self.value(),
            self.retries()
        )
    }
}
