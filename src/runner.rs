//! Concurrent execution of independent units of work.
//!
//! [`TaskRunner::run_all`] starts every submitted unit on its own OS thread,
//! times each one, and returns only after all of them have finished. The
//! "all finished" condition is a [`WaitGroup`] armed with the number of
//! units; every worker holds a [`SignalGuard`](crate::waitgroup::SignalGuard)
//! so it signals even when its unit panics.
//!
//! ```text
//!                 ┌──► thread 0: unit 0 ──┐
//!   run_all ──────┼──► thread 1: unit 1 ──┼──signal──► WaitGroup(N) ──► RunReport
//!   (blocks)      └──► thread N: unit N ──┘
//! ```
//!
//! # Failure isolation
//!
//! A unit that returns an error or panics is reported as
//! [`TaskStatus::Failed`]; it never prevents the other units from running and
//! never makes `run_all` itself fail.
//!
//! # Deadlines
//!
//! With [`RunnerConfig::deadline`] set, `run_all` waits at most that long.
//! When the deadline expires the run's [`CancellationToken`] is cancelled and
//! units still running are reported as [`TaskStatus::NotCompleted`]. Their
//! threads are detached, not killed.
//!
//! # Examples
//!
//! ```rust
//! use std::thread;
//! use std::time::Duration;
//! use coordina::runner::{Task, TaskRunner};
//!
//! let report = TaskRunner::new().run_tasks(vec![
//!     Task::new(|| thread::sleep(Duration::from_millis(20))).with_name("sleepy"),
//!     Task::fallible(|| Err("no rows")).with_name("query"),
//! ]);
//!
//! assert_eq!(report.len(), 2);
//! assert!(report.outcomes()[0].is_success());
//! assert!(report.outcomes()[1].failure().is_some());
//! ```

mod report;
mod task;

pub use report::{RunReport, TaskOutcome, TaskStatus};
pub use task::{CancellationToken, Task};

use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::UnitFailure;
use crate::waitgroup::WaitGroup;

/// Configuration for a [`TaskRunner`].
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Worker threads are named `{thread_name_prefix}-{index}`.
    pub thread_name_prefix: String,
    /// Upper bound on how long `run_all` waits. `None` waits for every unit.
    pub deadline: Option<Duration>,
    /// Stack size for worker threads. `None` uses the platform default.
    pub stack_size: Option<usize>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            thread_name_prefix: "coordina-task".to_string(),
            deadline: None,
            stack_size: None,
        }
    }
}

/// What a worker leaves behind for the coordinator.
struct Finished {
    elapsed: Duration,
    result: Result<(), UnitFailure>,
}

type Slot = Mutex<Option<Finished>>;

/// Runs batches of independent units of work, one thread per unit.
///
/// The runner holds only configuration; it can be reused for any number of
/// runs and shared between threads.
#[derive(Debug, Clone, Default)]
pub struct TaskRunner {
    config: RunnerConfig,
}

impl TaskRunner {
    /// Creates a runner with default settings: no deadline, default stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a runner with the specified configuration.
    pub fn with_config(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Sets the prefix used to name worker threads.
    pub fn thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.thread_name_prefix = prefix.into();
        self
    }

    /// Sets the deadline after which `run_all` stops waiting.
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.config.deadline = Some(deadline);
        self
    }

    /// Sets the stack size of worker threads.
    pub fn stack_size(mut self, size: usize) -> Self {
        self.config.stack_size = Some(size);
        self
    }

    /// Returns the runner's configuration.
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Runs plain closures concurrently and waits for all of them.
    ///
    /// Shorthand for [`run_tasks`](Self::run_tasks) with [`Task::new`].
    pub fn run_all<I, F>(&self, units: I) -> RunReport
    where
        I: IntoIterator<Item = F>,
        F: FnOnce() + Send + 'static,
    {
        self.run_tasks(units.into_iter().map(Task::new))
    }

    /// Runs every task on its own thread and returns one outcome per task,
    /// in submission order.
    ///
    /// Blocks until every task has finished, or until the configured deadline
    /// expires.
    pub fn run_tasks<I>(&self, tasks: I) -> RunReport
    where
        I: IntoIterator<Item = Task>,
    {
        let tasks: Vec<Task> = tasks.into_iter().collect();
        let count = tasks.len();
        let started = Instant::now();

        let wait_group = Arc::new(WaitGroup::new(count));
        let slots: Arc<[Slot]> = (0..count).map(|_| Mutex::new(None)).collect();
        let token = CancellationToken::new();
        let mut dispatched = Vec::with_capacity(count);

        for (index, task) in tasks.into_iter().enumerate() {
            let name = task.name().map(str::to_owned);
            debug!(index, name = name.as_deref(), "dispatching unit");
            dispatched.push((name, Instant::now()));

            let guard = wait_group.guard();
            let worker_slots = Arc::clone(&slots);
            let worker_token = token.clone();

            let mut builder = thread::Builder::new()
                .name(format!("{}-{}", self.config.thread_name_prefix, index));
            if let Some(size) = self.config.stack_size {
                builder = builder.stack_size(size);
            }

            let spawned = builder.spawn(move || {
                // Declared first so it is dropped last, after the slot is filled.
                let _guard = guard;
                let start = Instant::now();
                let result = task.run(&worker_token);
                let finished = Finished {
                    elapsed: start.elapsed(),
                    result,
                };
                *worker_slots[index]
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = Some(finished);
            });

            // A failed spawn drops the closure, and with it the guard, so the
            // wait group is still signaled for this unit.
            if let Err(err) = spawned {
                *slots[index].lock().unwrap_or_else(PoisonError::into_inner) = Some(Finished {
                    elapsed: Duration::ZERO,
                    result: Err(UnitFailure::Spawn(err)),
                });
            }
        }

        let all_finished = match self.config.deadline {
            Some(deadline) => wait_group.wait_timeout(deadline.saturating_sub(started.elapsed())),
            None => {
                wait_group.wait();
                true
            }
        };

        if !all_finished {
            warn!(
                remaining = wait_group.remaining(),
                deadline = ?self.config.deadline,
                "deadline expired, cancelling outstanding units"
            );
            token.cancel();
        }

        let outcomes = dispatched
            .into_iter()
            .enumerate()
            .map(|(index, (name, dispatched_at))| {
                let finished = slots[index]
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .take();
                let outcome = match finished {
                    Some(Finished {
                        elapsed,
                        result: Ok(()),
                    }) => TaskOutcome {
                        index,
                        name,
                        elapsed,
                        status: TaskStatus::Completed,
                    },
                    Some(Finished {
                        elapsed,
                        result: Err(failure),
                    }) => TaskOutcome {
                        index,
                        name,
                        elapsed,
                        status: TaskStatus::Failed(failure),
                    },
                    None => TaskOutcome {
                        index,
                        name,
                        elapsed: dispatched_at.elapsed(),
                        status: TaskStatus::NotCompleted,
                    },
                };

                match &outcome.status {
                    TaskStatus::Failed(failure) => {
                        warn!(index, name = outcome.name.as_deref(), %failure, "unit failed")
                    }
                    _ => debug!(
                        index,
                        elapsed = ?outcome.elapsed,
                        status = outcome.status.label(),
                        "unit finished"
                    ),
                }
                outcome
            })
            .collect();

        RunReport::new(outcomes, started.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counters::locking::LockingCounter;
    use crate::counters::Counter;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn test_empty_batch() {
        let report = TaskRunner::new().run_tasks(Vec::new());
        assert!(report.is_empty());
        assert!(report.is_success());
    }

    #[test]
    fn test_units_run_concurrently_and_are_timed() {
        let sleeps = [1_u64, 2, 3];
        let report = TaskRunner::new().run_all(
            sleeps
                .iter()
                .map(|&secs| move || thread::sleep(Duration::from_secs(secs))),
        );

        assert!(report.elapsed() >= Duration::from_secs(3));
        assert!(report.elapsed() < Duration::from_millis(3500));
        assert_eq!(report.len(), 3);

        for (outcome, &secs) in report.iter().zip(sleeps.iter()) {
            let expected = Duration::from_secs(secs);
            assert!(outcome.is_success());
            assert!(outcome.elapsed >= expected, "{:?}", outcome);
            assert!(
                outcome.elapsed - expected < Duration::from_millis(250),
                "{:?}",
                outcome
            );
        }
    }

    #[test]
    fn test_failure_is_isolated() {
        let tasks = (1..=5).map(|n| {
            Task::fallible(move || {
                if n == 3 {
                    Err(format!("unit {n} failed"))
                } else {
                    Ok(())
                }
            })
        });
        let report = TaskRunner::new().run_tasks(tasks);

        assert_eq!(report.len(), 5);
        assert_eq!(report.succeeded().count(), 4);
        let failed: Vec<usize> = report.failed().map(|o| o.index).collect();
        assert_eq!(failed, vec![2]);
        match report.outcomes()[2].failure() {
            Some(UnitFailure::Failed(err)) => assert_eq!(err.to_string(), "unit 3 failed"),
            other => panic!("unexpected failure: {:?}", other),
        }
    }

    #[test]
    fn test_panic_is_isolated() {
        let tasks = vec![
            Task::new(|| {}),
            Task::new(|| panic!("worker exploded")).with_name("explosive"),
            Task::new(|| thread::sleep(Duration::from_millis(20))),
        ];
        let report = TaskRunner::new().run_tasks(tasks);

        assert_eq!(report.succeeded().count(), 2);
        let outcome = &report.outcomes()[1];
        assert_eq!(outcome.name.as_deref(), Some("explosive"));
        assert!(matches!(
            outcome.failure(),
            Some(UnitFailure::Panicked { message }) if message == "worker exploded"
        ));
    }

    #[test]
    fn test_spawn_failure_is_reported() {
        // No OS will map a stack this large, so every spawn fails.
        let started = Instant::now();
        let report = TaskRunner::new()
            .stack_size(1 << 50)
            .run_tasks(vec![Task::new(|| {}), Task::new(|| {})]);

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(report.len(), 2);
        assert_eq!(report.failed().count(), 2);
        for outcome in &report {
            assert!(matches!(outcome.failure(), Some(UnitFailure::Spawn(_))));
            assert_eq!(outcome.elapsed, Duration::ZERO);
        }
    }

    #[test]
    fn test_outcomes_follow_submission_order() {
        let report = TaskRunner::new().run_tasks((0..8_u64).map(|i| {
            Task::new(move || thread::sleep(Duration::from_millis(40 - i * 5)))
                .with_name(format!("unit-{i}"))
        }));

        for (position, outcome) in report.iter().enumerate() {
            assert_eq!(outcome.index, position);
            assert_eq!(outcome.name, Some(format!("unit-{position}")));
        }
    }

    #[test]
    fn test_thread_names_use_prefix() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let runner = TaskRunner::new().thread_name_prefix("worker");
        let report = runner.run_all((0..2).map(|_| {
            let seen = Arc::clone(&seen);
            move || {
                let name = thread::current().name().map(str::to_owned);
                seen.lock().unwrap().push(name);
            }
        }));

        assert!(report.is_success());
        let mut names: Vec<_> = seen.lock().unwrap().drain(..).flatten().collect();
        names.sort();
        assert_eq!(names, vec!["worker-0".to_string(), "worker-1".to_string()]);
    }

    #[test]
    fn test_deadline_reports_not_completed_and_cancels() {
        let observed_cancel = Arc::new(AtomicBool::new(false));
        let slow = {
            let observed_cancel = Arc::clone(&observed_cancel);
            Task::cancellable(move |token| {
                let give_up = Instant::now() + Duration::from_secs(5);
                while !token.is_cancelled() && Instant::now() < give_up {
                    thread::sleep(Duration::from_millis(5));
                }
                observed_cancel.store(token.is_cancelled(), Ordering::Release);
                Ok::<(), std::io::Error>(())
            })
        };
        let fast = Task::new(|| thread::sleep(Duration::from_millis(10)));

        let runner = TaskRunner::new().deadline(Duration::from_millis(200));
        let report = runner.run_tasks(vec![fast, slow]);

        assert!(report.elapsed() < Duration::from_secs(2));
        assert!(report.outcomes()[0].is_success());
        assert!(matches!(
            report.outcomes()[1].status,
            TaskStatus::NotCompleted
        ));
        assert!(report.outcomes()[1].elapsed >= Duration::from_millis(150));

        let wait_until = Instant::now() + Duration::from_secs(2);
        while !observed_cancel.load(Ordering::Acquire) && Instant::now() < wait_until {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(observed_cancel.load(Ordering::Acquire));
    }

    #[test]
    fn test_deadline_not_hit() {
        let runner = TaskRunner::with_config(RunnerConfig {
            deadline: Some(Duration::from_secs(5)),
            ..RunnerConfig::default()
        });
        let report = runner.run_all((0..4).map(|_| || thread::sleep(Duration::from_millis(10))));
        assert!(report.is_success());
        assert!(report.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_units_share_a_counter() {
        let counter = Arc::new(LockingCounter::new());
        let report = TaskRunner::new().run_all((0..10).map(|_| {
            let counter = Arc::clone(&counter);
            move || {
                for _ in 0..1000 {
                    counter.increment();
                }
            }
        }));

        assert!(report.is_success());
        assert_eq!(counter.value(), 10_000);
    }

    #[test]
    fn test_config_builders() {
        let runner = TaskRunner::new()
            .thread_name_prefix("x")
            .deadline(Duration::from_secs(1))
            .stack_size(256 * 1024);
        assert_eq!(runner.config().thread_name_prefix, "x");
        assert_eq!(runner.config().deadline, Some(Duration::from_secs(1)));
        assert_eq!(runner.config().stack_size, Some(256 * 1024));
    }
}
