//! # Coordina - Counters, Channels, Wait Groups and a Task Runner
//!
//! A small in-process concurrency toolkit built on OS threads and the
//! standard library's synchronization primitives. It collects the four
//! building blocks that show up whenever independent units of work run side
//! by side and must be coordinated:
//!
//! | Module | Type | Purpose |
//! |--------|------|---------|
//! | [`counters`] | [`LockingCounter`](counters::locking::LockingCounter), [`AtomicCounter`](counters::atomic::AtomicCounter), [`CasCounter`](counters::cas::CasCounter) | shared 64-bit counter, locking or lock-free |
//! | [`channel`] | [`BoundedChannel`](channel::BoundedChannel) | fixed-capacity FIFO with backpressure and close |
//! | [`waitgroup`] | [`WaitGroup`](waitgroup::WaitGroup) | barrier released after N completion signals |
//! | [`runner`] | [`TaskRunner`](runner::TaskRunner) | run a batch of units concurrently, time them, isolate failures |
//!
//! ## Design Principles
//!
//! 1. **No global state**: every primitive is an ordinary value, shared via
//!    `Arc` and configured through its constructor.
//!
//! 2. **Fail fast on misuse**: enqueueing on a closed channel or signaling a
//!    released barrier returns an error right away (see [`error`]).
//!
//! 3. **Isolated failures**: a unit of work that errors or panics is reported
//!    in the [`RunReport`](runner::RunReport); its siblings keep running and
//!    the runner itself never fails.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::num::NonZeroUsize;
//! use std::sync::Arc;
//! use coordina::channel::BoundedChannel;
//! use coordina::counters::{Counter, atomic::AtomicCounter};
//! use coordina::runner::TaskRunner;
//!
//! let channel = Arc::new(BoundedChannel::new(NonZeroUsize::new(10).unwrap()));
//! let received = Arc::new(AtomicCounter::new().with_name("received"));
//!
//! let producer = {
//!     let channel = Arc::clone(&channel);
//!     move || {
//!         for i in 1..=100 {
//!             channel.enqueue(i).unwrap();
//!         }
//!         channel.close();
//!     }
//! };
//! let consumer = {
//!     let channel = Arc::clone(&channel);
//!     let received = Arc::clone(&received);
//!     move || {
//!         for _ in channel.iter() {
//!             received.increment();
//!         }
//!     }
//! };
//!
//! let report = TaskRunner::new().run_tasks(vec![
//!     coordina::runner::Task::new(producer),
//!     coordina::runner::Task::new(consumer),
//! ]);
//! assert!(report.is_success());
//! assert_eq!(received.value(), 100);
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events (dispatch, completion, failures,
//! deadline expiry, channel close) and never installs a subscriber itself.
//!
//! ## Feature Flags
//!
//! | Feature | Module | Description |
//! |---------|--------|-------------|
//! | `serde` | [`snapshot`] | Serializable snapshots of counters and reports |
//! | `json` | `observers::json` | Serialize reports and counters to JSON |
//! | `table` | `observers::table` | Pretty-print reports and counters as tables |
//! | `full` | all observers | Enables `json` and `table` |

pub mod channel;
pub mod counters;
pub mod error;
pub mod observers;
pub mod runner;
pub mod waitgroup;

#[cfg(feature = "serde")]
pub mod snapshot;
