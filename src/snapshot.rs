//! Serializable snapshots of counters and run reports.
//!
//! A [`RunReport`] holds live error values and `Duration`s; the types here are
//! plain data that any serde format can carry (files, HTTP bodies, IPC).
//!
//! # Feature Flag
//!
//! This module requires the `serde` feature:
//!
//! ```toml
//! [dependencies]
//! coordina = { version = "0.1", features = ["serde"] }
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use coordina::runner::TaskRunner;
//! use coordina::snapshot::ReportSnapshot;
//!
//! let report = TaskRunner::new().run_all((0..3).map(|_| || {}));
//! let snapshot = ReportSnapshot::from_report(&report);
//! let json = serde_json::to_string(&snapshot).unwrap();
//! ```

use serde::{Deserialize, Serialize};

use crate::counters::Counter;
use crate::runner::{RunReport, TaskOutcome, TaskStatus};

/// A snapshot of a single counter's state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CounterSnapshot {
    /// The name of the counter.
    pub name: String,
    /// The value of the counter.
    pub value: i64,
}

impl CounterSnapshot {
    /// Creates a new counter snapshot.
    pub fn new(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Creates a snapshot from a live counter.
    pub fn from_counter(counter: &dyn Counter) -> Self {
        Self::new(display_name(counter), counter.value())
    }

    /// Creates a snapshot from a live counter and resets it.
    pub fn from_counter_and_reset(counter: &dyn Counter) -> Self {
        Self::new(display_name(counter), counter.value_and_reset())
    }
}

fn display_name(counter: &dyn Counter) -> String {
    if counter.name().is_empty() {
        "(unnamed)".to_string()
    } else {
        counter.name().to_string()
    }
}

/// Serializable form of [`TaskStatus`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StatusSnapshot {
    /// The unit returned normally.
    Completed,
    /// The unit failed; see [`OutcomeSnapshot::error`].
    Failed,
    /// The deadline expired before the unit finished.
    NotCompleted,
}

impl From<&TaskStatus> for StatusSnapshot {
    fn from(status: &TaskStatus) -> Self {
        match status {
            TaskStatus::Completed => StatusSnapshot::Completed,
            TaskStatus::Failed(_) => StatusSnapshot::Failed,
            TaskStatus::NotCompleted => StatusSnapshot::NotCompleted,
        }
    }
}

/// A snapshot of one unit's outcome.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutcomeSnapshot {
    /// Position of the unit in the submitted sequence.
    pub index: usize,
    /// Name of the unit, if it had one.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    /// How the unit ended.
    pub status: StatusSnapshot,
    /// Rendered failure message, for failed units.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
    /// Elapsed wall-clock time in milliseconds.
    pub elapsed_ms: f64,
}

impl From<&TaskOutcome> for OutcomeSnapshot {
    fn from(outcome: &TaskOutcome) -> Self {
        Self {
            index: outcome.index,
            name: outcome.name.clone(),
            status: StatusSnapshot::from(&outcome.status),
            error: outcome.failure().map(ToString::to_string),
            elapsed_ms: outcome.elapsed.as_secs_f64() * 1000.0,
        }
    }
}

/// A snapshot of a whole run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportSnapshot {
    /// Optional timestamp in milliseconds since Unix epoch.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub timestamp_ms: Option<u64>,
    /// Wall-clock duration of the run in milliseconds.
    pub elapsed_ms: f64,
    /// One entry per submitted unit, in submission order.
    pub outcomes: Vec<OutcomeSnapshot>,
}

impl ReportSnapshot {
    /// Captures a run report.
    pub fn from_report(report: &RunReport) -> Self {
        Self {
            timestamp_ms: None,
            elapsed_ms: report.elapsed().as_secs_f64() * 1000.0,
            outcomes: report.iter().map(OutcomeSnapshot::from).collect(),
        }
    }

    /// Sets the capture timestamp.
    pub fn with_timestamp(mut self, timestamp_ms: u64) -> Self {
        self.timestamp_ms = Some(timestamp_ms);
        self
    }

    /// Number of outcomes with the given status.
    pub fn count(&self, status: StatusSnapshot) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }
}
