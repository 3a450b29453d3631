//! JSON observer for run reports and counters.
//!
//! # Feature Flag
//!
//! This module requires the `json` feature:
//!
//! ```toml
//! [dependencies]
//! coordina = { version = "0.1", features = ["json"] }
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use coordina::observers::json::JsonObserver;
//! use coordina::runner::TaskRunner;
//!
//! let report = TaskRunner::new().run_all((0..2).map(|_| || {}));
//! let json = JsonObserver::new().include_timestamp(true).report_to_json(&report)?;
//! // {"timestamp_ms":1760000000000,"elapsed_ms":0.21,"outcomes":[...]}
//! ```

use std::io::Write;

use serde::Serialize;

use crate::counters::Counter;
use crate::observers::Result;
use crate::runner::RunReport;
use crate::snapshot::{CounterSnapshot, ReportSnapshot};

/// Configuration for the JSON observer.
#[derive(Debug, Clone, Default)]
pub struct JsonConfig {
    /// Whether to pretty-print the JSON output.
    pub pretty: bool,
    /// Whether to stamp report snapshots with the current time.
    pub include_timestamp: bool,
}

/// An observer that serializes run reports and counters to JSON.
#[derive(Debug, Clone, Default)]
pub struct JsonObserver {
    config: JsonConfig,
}

impl JsonObserver {
    /// Creates a new JSON observer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new JSON observer with the specified configuration.
    pub fn with_config(config: JsonConfig) -> Self {
        Self { config }
    }

    /// Enables or disables pretty-printing.
    pub fn pretty(mut self, enabled: bool) -> Self {
        self.config.pretty = enabled;
        self
    }

    /// Enables or disables the timestamp on report snapshots.
    pub fn include_timestamp(mut self, enabled: bool) -> Self {
        self.config.include_timestamp = enabled;
        self
    }

    /// Captures a report as a [`ReportSnapshot`], timestamped if configured.
    pub fn snapshot(&self, report: &RunReport) -> ReportSnapshot {
        let snapshot = ReportSnapshot::from_report(report);
        if self.config.include_timestamp {
            snapshot.with_timestamp(current_timestamp_ms())
        } else {
            snapshot
        }
    }

    /// Serializes a run report to a JSON string.
    pub fn report_to_json(&self, report: &RunReport) -> Result<String> {
        self.encode(&self.snapshot(report))
    }

    /// Writes a run report as JSON to `writer`.
    pub fn write_report<W: Write>(&self, writer: W, report: &RunReport) -> Result<()> {
        let snapshot = self.snapshot(report);
        if self.config.pretty {
            serde_json::to_writer_pretty(writer, &snapshot)?;
        } else {
            serde_json::to_writer(writer, &snapshot)?;
        }
        Ok(())
    }

    /// Serializes counters to a JSON array of `{name, value}` objects.
    pub fn counters_to_json<'a>(
        &self,
        counters: impl Iterator<Item = &'a dyn Counter>,
    ) -> Result<String> {
        let snapshots: Vec<CounterSnapshot> = counters.map(CounterSnapshot::from_counter).collect();
        self.encode(&snapshots)
    }

    /// Serializes counters to JSON and resets them.
    pub fn counters_to_json_and_reset<'a>(
        &self,
        counters: impl Iterator<Item = &'a dyn Counter>,
    ) -> Result<String> {
        let snapshots: Vec<CounterSnapshot> = counters
            .map(CounterSnapshot::from_counter_and_reset)
            .collect();
        self.encode(&snapshots)
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let json = if self.config.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(json)
    }
}

/// Returns the current timestamp in milliseconds since Unix epoch.
fn current_timestamp_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
