//! Counter protected by mutual exclusion.

use std::fmt::Debug;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::counters::Counter;

/// A counter whose every update takes an exclusive lock.
///
/// Increments are fully serialized: no two of them interleave. This is the
/// textbook discipline and the baseline the lock-free counters are measured
/// against.
///
/// # Examples
///
/// ```rust
/// use coordina::counters::Counter;
/// use coordina::counters::locking::LockingCounter;
///
/// let counter = LockingCounter::new().with_name("visits");
/// counter.increment();
/// counter.add(4);
/// assert_eq!(counter.value(), 5);
/// ```
pub struct LockingCounter {
    name: &'static str,
    value: Mutex<i64>,
}

impl LockingCounter {
    /// Creates a new counter initialized to zero.
    pub const fn new() -> Self {
        LockingCounter {
            name: "",
            value: Mutex::new(0),
        }
    }

    /// Sets the name of this counter, returning `self` for method chaining.
    pub fn with_name(self, name: &'static str) -> Self {
        Self { name, ..self }
    }

    /// Locks the value. A panic while holding the guard cannot leave an
    /// `i64` half-written, so a poisoned lock is simply recovered.
    #[inline]
    fn lock(&self) -> MutexGuard<'_, i64> {
        self.value.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Counter for LockingCounter {
    #[inline]
    fn name(&self) -> &str {
        self.name
    }

    #[inline]
    fn add(&self, delta: i64) {
        let mut value = self.lock();
        *value = value.wrapping_add(delta);
    }

    #[inline]
    fn value(&self) -> i64 {
        *self.lock()
    }

    #[inline]
    fn value_and_reset(&self) -> i64 {
        std::mem::take(&mut *self.lock())
    }
}

impl Default for LockingCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for LockingCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LockingCounter({}={})", self.name, self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_new() {
        let counter = LockingCounter::new();
        assert_eq!(counter.value(), 0);
        assert_eq!(counter.name(), "");
    }

    #[test]
    fn test_increment() {
        let counter = LockingCounter::new();
        counter.increment();
        counter.increment();
        assert_eq!(counter.value(), 2);
    }

    #[test]
    fn test_add_negative() {
        let counter = LockingCounter::default();
        counter.add(10);
        counter.add(-15);
        assert_eq!(counter.value(), -5);
    }

    #[test]
    fn test_value_and_reset() {
        let counter = LockingCounter::new();
        counter.add(7);
        assert_eq!(counter.value_and_reset(), 7);
        assert_eq!(counter.value(), 0);
    }

    #[test]
    fn test_with_name_preserves_value() {
        let counter = LockingCounter::new();
        counter.add(2);
        let counter = counter.with_name("test");
        assert_eq!(counter.name(), "test");
        assert_eq!(counter.value(), 2);
    }

    #[test]
    fn test_recovers_from_poisoned_lock() {
        let counter = Arc::new(LockingCounter::new());
        counter.increment();

        let poisoner = Arc::clone(&counter);
        let result = thread::spawn(move || {
            let _guard = poisoner.value.lock().unwrap();
            panic!("poison the lock");
        })
        .join();
        assert!(result.is_err());

        counter.increment();
        assert_eq!(counter.value(), 2);
    }

    #[test]
    fn test_debug() {
        let counter = LockingCounter::new().with_name("locked");
        counter.add(3);
        assert_eq!(format!("{:?}", counter), "LockingCounter(locked=3)");
    }

    #[test]
    fn test_multiple_threads() {
        let counter = Arc::new(LockingCounter::new());
        let handles: Vec<_> = (0..10)
            .map(|_| {
                let counter = Arc::clone(&counter);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        counter.increment();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(counter.value(), 10_000);
    }
}
