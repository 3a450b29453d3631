//! Lock-free counter built on hardware fetch-and-add.

use std::fmt::Debug;
use std::sync::atomic::{AtomicI64, Ordering};

use crossbeam_utils::CachePadded;

use crate::counters::Counter;

/// A lock-free counter backed by a single `AtomicI64`.
///
/// Increments never block and never retry: `fetch_add` is a single atomic
/// read-modify-write instruction. The atomic is wrapped in
/// [`crossbeam_utils::CachePadded`] so that neighbouring data never shares its
/// cache line.
///
/// Updates use `Ordering::Relaxed`; visibility of the final value to a reader
/// is provided by whatever synchronization the reader uses to learn that the
/// writers are done (thread join, wait group, channel).
///
/// # Examples
///
/// ```rust
/// use coordina::counters::Counter;
/// use coordina::counters::atomic::AtomicCounter;
///
/// let counter = AtomicCounter::new();
/// counter.increment();
/// counter.add(-3);
/// assert_eq!(counter.value(), -2);
/// ```
pub struct AtomicCounter {
    name: &'static str,
    value: CachePadded<AtomicI64>,
}

impl AtomicCounter {
    /// Creates a new counter initialized to zero.
    pub const fn new() -> Self {
        AtomicCounter {
            name: "",
            value: CachePadded::new(AtomicI64::new(0)),
        }
    }

    /// Sets the name of this counter, returning `self` for method chaining.
    pub const fn with_name(self, name: &'static str) -> Self {
        Self { name, ..self }
    }
}

impl Counter for AtomicCounter {
    #[inline]
    fn name(&self) -> &str {
        self.name
    }

    #[inline]
    fn add(&self, delta: i64) {
        self.value.fetch_add(delta, Ordering::Relaxed);
    }

    #[inline]
    fn value(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }

    #[inline]
    fn value_and_reset(&self) -> i64 {
        self.value.swap(0, Ordering::Relaxed)
    }
}

impl Default for AtomicCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for AtomicCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AtomicCounter({}={})", self.name, self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static GLOBAL: AtomicCounter = AtomicCounter::new().with_name("global");

    #[test]
    fn test_new() {
        let counter = AtomicCounter::new();
        assert_eq!(counter.value(), 0);
    }

    #[test]
    fn test_const_static() {
        GLOBAL.increment();
        assert!(GLOBAL.value() >= 1);
        assert_eq!(GLOBAL.name(), "global");
    }

    #[test]
    fn test_increment_and_add() {
        let counter = AtomicCounter::new();
        counter.increment();
        counter.add(41);
        assert_eq!(counter.value(), 42);
    }

    #[test]
    fn test_value_and_reset() {
        let counter = AtomicCounter::default();
        counter.add(-9);
        assert_eq!(counter.value_and_reset(), -9);
        assert_eq!(counter.value(), 0);
    }

    #[test]
    fn test_debug() {
        let counter = AtomicCounter::new().with_name("hits");
        counter.add(5);
        assert_eq!(format!("{:?}", counter), "AtomicCounter(hits=5)");
    }

    #[test]
    fn test_multiple_threads() {
        use std::sync::Arc;
        use std::thread;

        let counter = Arc::new(AtomicCounter::new());
        let mut handles = vec![];

        for _ in 0..10 {
            let counter_clone = Arc::clone(&counter);
            handles.push(thread::spawn(move || {
                for _ in 0..1000 {
                    counter_clone.increment();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(counter.value(), 10_000);
    }
}
