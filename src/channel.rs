//! Fixed-capacity FIFO channel with blocking handoff.
//!
//! [`BoundedChannel`] is shared between producers and consumers (typically
//! through an `Arc`). A producer that outpaces its consumers is blocked once
//! the channel holds `capacity` items, so the buffer never grows beyond it.
//!
//! ```text
//!   producer ──enqueue──►  ┌───┬───┬───┬───┐  ──dequeue──► consumer
//!   (blocks when full)     │ 1 │ 2 │ 3 │   │  (blocks when empty and open)
//!                          └───┴───┴───┴───┘
//!                              capacity = 4
//! ```
//!
//! # Lifecycle
//!
//! Producers enqueue until they are done, then one of them calls
//! [`close`](BoundedChannel::close). Items already queued are still delivered;
//! once the channel is closed and drained, [`dequeue`](BoundedChannel::dequeue)
//! returns `None` (end of stream) and never blocks again.
//!
//! # Examples
//!
//! ```rust
//! use std::num::NonZeroUsize;
//! use std::sync::Arc;
//! use std::thread;
//! use coordina::channel::BoundedChannel;
//!
//! let channel = Arc::new(BoundedChannel::new(NonZeroUsize::new(10).unwrap()));
//!
//! let producer = {
//!     let channel = Arc::clone(&channel);
//!     thread::spawn(move || {
//!         for i in 1..=100 {
//!             channel.enqueue(i).unwrap();
//!         }
//!         channel.close();
//!     })
//! };
//!
//! let received: Vec<i32> = channel.iter().collect();
//! producer.join().unwrap();
//! assert_eq!(received, (1..=100).collect::<Vec<_>>());
//! ```

use std::collections::VecDeque;
use std::fmt::Debug;
use std::num::NonZeroUsize;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use tracing::{debug, trace};

use crate::error::{ClosedQueueError, TryDequeueError, TryEnqueueError};

struct State<T> {
    queue: VecDeque<T>,
    closed: bool,
}

/// A bounded multi-producer, multi-consumer FIFO queue.
///
/// All items go through a single queue guarded by one mutex, so delivery is
/// strict FIFO and each producer's own sequence is preserved as a
/// subsequence of the output.
pub struct BoundedChannel<T> {
    capacity: NonZeroUsize,
    state: Mutex<State<T>>,
    not_full: Condvar,
    not_empty: Condvar,
}

impl<T> BoundedChannel<T> {
    /// Creates an open, empty channel holding at most `capacity` items.
    pub fn new(capacity: NonZeroUsize) -> Self {
        BoundedChannel {
            capacity,
            state: Mutex::new(State {
                queue: VecDeque::with_capacity(capacity.get()),
                closed: false,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
        }
    }

    /// No code panics while holding the lock with the queue half-updated,
    /// so a poisoned lock is recovered.
    #[inline]
    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enqueues `item`, blocking while the channel is at capacity.
    ///
    /// # Errors
    ///
    /// Returns [`ClosedQueueError`] carrying the item back if the channel is
    /// closed, either before the call or while the caller was blocked.
    pub fn enqueue(&self, item: T) -> Result<(), ClosedQueueError<T>> {
        let mut state = self.lock();
        loop {
            if state.closed {
                return Err(ClosedQueueError(item));
            }
            if state.queue.len() < self.capacity.get() {
                state.queue.push_back(item);
                drop(state);
                self.not_empty.notify_one();
                return Ok(());
            }
            trace!(capacity = self.capacity.get(), "channel full, producer waiting");
            state = self
                .not_full
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Enqueues `item` without blocking.
    ///
    /// # Errors
    ///
    /// Returns [`TryEnqueueError::Full`] if the channel is at capacity and
    /// [`TryEnqueueError::Closed`] if it is closed.
    pub fn try_enqueue(&self, item: T) -> Result<(), TryEnqueueError<T>> {
        let mut state = self.lock();
        if state.closed {
            return Err(TryEnqueueError::Closed(item));
        }
        if state.queue.len() >= self.capacity.get() {
            return Err(TryEnqueueError::Full(item));
        }
        state.queue.push_back(item);
        drop(state);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Dequeues the oldest item, blocking while the channel is empty and open.
    ///
    /// Returns `None` once the channel is closed and drained. Every later call
    /// returns `None` immediately.
    pub fn dequeue(&self) -> Option<T> {
        let mut state = self.lock();
        loop {
            if let Some(item) = state.queue.pop_front() {
                drop(state);
                self.not_full.notify_one();
                return Some(item);
            }
            if state.closed {
                return None;
            }
            state = self
                .not_empty
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Dequeues the oldest item without blocking.
    ///
    /// # Errors
    ///
    /// Returns [`TryDequeueError::Empty`] if the channel is open but empty and
    /// [`TryDequeueError::Closed`] if it is closed and drained.
    pub fn try_dequeue(&self) -> Result<T, TryDequeueError> {
        let mut state = self.lock();
        match state.queue.pop_front() {
            Some(item) => {
                drop(state);
                self.not_full.notify_one();
                Ok(item)
            }
            None if state.closed => Err(TryDequeueError::Closed),
            None => Err(TryDequeueError::Empty),
        }
    }

    /// Closes the channel.
    ///
    /// Further enqueues fail, queued items stay deliverable, and every actor
    /// blocked in `enqueue` or `dequeue` is woken. Closing is idempotent: the
    /// return value is `true` only for the call that actually closed it.
    pub fn close(&self) -> bool {
        let mut state = self.lock();
        if state.closed {
            return false;
        }
        state.closed = true;
        let pending = state.queue.len();
        drop(state);

        debug!(pending, "channel closed");
        self.not_empty.notify_all();
        self.not_full.notify_all();
        true
    }

    /// Returns `true` once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Number of items currently queued. Never exceeds the capacity.
    pub fn len(&self) -> usize {
        self.lock().queue.len()
    }

    /// Returns `true` if no items are queued.
    pub fn is_empty(&self) -> bool {
        self.lock().queue.is_empty()
    }

    /// Maximum number of items the channel holds.
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Returns a blocking iterator that dequeues until end of stream.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter { channel: self }
    }
}

impl<T> Debug for BoundedChannel<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("BoundedChannel")
            .field("capacity", &self.capacity)
            .field("len", &state.queue.len())
            .field("closed", &state.closed)
            .finish()
    }
}

/// Blocking iterator over a [`BoundedChannel`], ending at end of stream.
///
/// Created by [`BoundedChannel::iter`].
#[derive(Debug)]
pub struct Iter<'a, T> {
    channel: &'a BoundedChannel<T>,
}

impl<T> Iterator for Iter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.channel.dequeue()
    }
}

impl<'a, T> IntoIterator for &'a BoundedChannel<T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}
