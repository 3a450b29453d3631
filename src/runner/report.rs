//! Per-unit outcomes and the aggregate report of a run.

use std::fmt::Display;
use std::time::Duration;

use crate::error::UnitFailure;

/// How a single unit of work ended.
#[derive(Debug)]
pub enum TaskStatus {
    /// The unit returned normally.
    Completed,
    /// The unit returned an error, panicked, or could not be started.
    Failed(UnitFailure),
    /// The run's deadline expired before the unit finished. Its thread was
    /// detached, not stopped.
    NotCompleted,
}

impl TaskStatus {
    /// Short lowercase label, used by observers.
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Completed => "completed",
            TaskStatus::Failed(_) => "failed",
            TaskStatus::NotCompleted => "not completed",
        }
    }
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Failed(failure) => write!(f, "failed: {}", failure),
            other => f.write_str(other.label()),
        }
    }
}

/// Outcome of one submitted unit of work.
#[derive(Debug)]
pub struct TaskOutcome {
    /// Position of the unit in the submitted sequence.
    pub index: usize,
    /// Name given with [`Task::with_name`](crate::runner::Task::with_name).
    pub name: Option<String>,
    /// Wall-clock time from just before invocation to just after return, or
    /// the time elapsed since dispatch for a unit that did not complete.
    pub elapsed: Duration,
    /// How the unit ended.
    pub status: TaskStatus,
}

impl TaskOutcome {
    /// Returns `true` if the unit completed without failure.
    pub fn is_success(&self) -> bool {
        matches!(self.status, TaskStatus::Completed)
    }

    /// Returns the failure, if the unit failed.
    pub fn failure(&self) -> Option<&UnitFailure> {
        match &self.status {
            TaskStatus::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    /// The unit's name, or `#index` when it has none.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("#{}", self.index),
        }
    }
}

/// Aggregate result of [`TaskRunner::run_all`](crate::runner::TaskRunner::run_all).
///
/// Holds one [`TaskOutcome`] per submitted unit, in submission order.
///
/// # Examples
///
/// ```rust
/// use coordina::runner::TaskRunner;
///
/// let report = TaskRunner::new().run_all((0..2).map(|i| move || println!("unit {i}")));
/// assert_eq!(report.len(), 2);
/// assert!(report.is_success());
/// ```
#[derive(Debug, Default)]
pub struct RunReport {
    outcomes: Vec<TaskOutcome>,
    elapsed: Duration,
}

impl RunReport {
    pub(crate) fn new(outcomes: Vec<TaskOutcome>, elapsed: Duration) -> Self {
        RunReport { outcomes, elapsed }
    }

    /// All outcomes, in submission order.
    pub fn outcomes(&self) -> &[TaskOutcome] {
        &self.outcomes
    }

    /// Consumes the report, returning its outcomes.
    pub fn into_outcomes(self) -> Vec<TaskOutcome> {
        self.outcomes
    }

    /// Number of submitted units.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Returns `true` if no units were submitted.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Wall-clock time the run took, from the first dispatch until the
    /// runner returned.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Iterates over the outcomes.
    pub fn iter(&self) -> std::slice::Iter<'_, TaskOutcome> {
        self.outcomes.iter()
    }

    /// Outcomes of units that completed.
    pub fn succeeded(&self) -> impl Iterator<Item = &TaskOutcome> {
        self.iter().filter(|o| o.is_success())
    }

    /// Outcomes of units that failed.
    pub fn failed(&self) -> impl Iterator<Item = &TaskOutcome> {
        self.iter().filter(|o| o.failure().is_some())
    }

    /// Outcomes of units still running when the deadline expired.
    pub fn not_completed(&self) -> impl Iterator<Item = &TaskOutcome> {
        self.iter().filter(|o| matches!(o.status, TaskStatus::NotCompleted))
    }

    /// Returns `true` if every unit completed.
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(TaskOutcome::is_success)
    }

    /// The outcome with the longest elapsed time.
    pub fn slowest(&self) -> Option<&TaskOutcome> {
        self.outcomes.iter().max_by_key(|o| o.elapsed)
    }
}

impl<'a> IntoIterator for &'a RunReport {
    type Item = &'a TaskOutcome;
    type IntoIter = std::slice::Iter<'a, TaskOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for RunReport {
    type Item = TaskOutcome;
    type IntoIter = std::vec::IntoIter<TaskOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(index: usize, millis: u64, status: TaskStatus) -> TaskOutcome {
        TaskOutcome {
            index,
            name: None,
            elapsed: Duration::from_millis(millis),
            status,
        }
    }

    fn sample() -> RunReport {
        RunReport::new(
            vec![
                outcome(0, 10, TaskStatus::Completed),
                outcome(
                    1,
                    30,
                    TaskStatus::Failed(UnitFailure::Panicked {
                        message: "boom".into(),
                    }),
                ),
                outcome(2, 20, TaskStatus::NotCompleted),
            ],
            Duration::from_millis(31),
        )
    }

    #[test]
    fn test_partitions() {
        let report = sample();
        assert_eq!(report.len(), 3);
        assert_eq!(report.succeeded().count(), 1);
        assert_eq!(report.failed().count(), 1);
        assert_eq!(report.not_completed().count(), 1);
        assert!(!report.is_success());
    }

    #[test]
    fn test_slowest() {
        let report = sample();
        assert_eq!(report.slowest().map(|o| o.index), Some(1));
        assert!(RunReport::default().slowest().is_none());
    }

    #[test]
    fn test_empty_is_success() {
        let report = RunReport::default();
        assert!(report.is_empty());
        assert!(report.is_success());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(TaskStatus::Completed.to_string(), "completed");
        assert_eq!(TaskStatus::NotCompleted.to_string(), "not completed");
        let failed = TaskStatus::Failed(UnitFailure::Failed("bad input".into()));
        assert_eq!(failed.to_string(), "failed: unit failed: bad input");
        assert_eq!(failed.label(), "failed");
    }

    #[test]
    fn test_display_name() {
        let mut unnamed = outcome(4, 1, TaskStatus::Completed);
        assert_eq!(unnamed.display_name(), "#4");
        unnamed.name = Some("fetch".into());
        assert_eq!(unnamed.display_name(), "fetch");
    }

    #[test]
    fn test_into_iter_preserves_order() {
        let indices: Vec<usize> = sample().into_iter().map(|o| o.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        let report = sample();
        let borrowed: Vec<usize> = (&report).into_iter().map(|o| o.index).collect();
        assert_eq!(borrowed, vec![0, 1, 2]);
    }
}
