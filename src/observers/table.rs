//! Table observer for pretty-printing run reports and counters.
//!
//! # Feature Flag
//!
//! This module requires the `table` feature:
//!
//! ```toml
//! [dependencies]
//! coordina = { version = "0.1", features = ["table"] }
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use coordina::observers::table::{TableObserver, TableStyle};
//! use coordina::runner::{Task, TaskRunner};
//!
//! let report = TaskRunner::new().run_tasks(vec![
//!     Task::new(|| {}).with_name("fetch"),
//!     Task::fallible(|| Err("timeout")).with_name("store"),
//! ]);
//!
//! println!("{}", TableObserver::new().with_style(TableStyle::Rounded).render_report(&report));
//! // ╭───┬───────┬───────────┬─────────┬─────────────────────────╮
//! // │ # │ Unit  │ Status    │ Elapsed │ Error                   │
//! // ├───┼───────┼───────────┼─────────┼─────────────────────────┤
//! // │ 0 │ fetch │ completed │ 12µs    │                         │
//! // │ 1 │ store │ failed    │ 9µs     │ unit failed: timeout    │
//! // ╰───┴───────┴───────────┴─────────┴─────────────────────────╯
//! ```

use std::io::Write;

use tabled::{settings::Style, Table, Tabled};

use crate::counters::Counter;
use crate::observers::Result;
use crate::runner::{RunReport, TaskOutcome};

/// Available table styles for rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TableStyle {
    /// ASCII table with simple characters: +, -, |
    Ascii,
    /// Modern rounded corners (default)
    #[default]
    Rounded,
    /// Sharp corners with box-drawing characters
    Sharp,
    /// Modern style with clean lines
    Modern,
    /// GitHub-flavored Markdown table
    Markdown,
    /// Dots for borders
    Dots,
    /// No borders, just spacing
    Blank,
}

/// Configuration for the table observer.
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// The style to use for rendering.
    pub style: TableStyle,
    /// Whether to show the header row.
    pub show_header: bool,
    /// Custom title printed above the table (optional).
    pub title: Option<String>,
    /// Whether to append a summary line to report tables.
    pub show_summary: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            style: TableStyle::default(),
            show_header: true,
            title: None,
            show_summary: true,
        }
    }
}

#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Unit")]
    unit: String,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Elapsed")]
    elapsed: String,
    #[tabled(rename = "Error")]
    error: String,
}

impl From<&TaskOutcome> for OutcomeRow {
    fn from(outcome: &TaskOutcome) -> Self {
        OutcomeRow {
            index: outcome.index,
            unit: outcome.display_name(),
            status: outcome.status.label(),
            elapsed: format!("{:.2?}", outcome.elapsed),
            error: outcome
                .failure()
                .map(ToString::to_string)
                .unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct CounterRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Value")]
    value: i64,
}

/// An observer that renders run reports and counters as ASCII tables.
#[derive(Debug, Clone, Default)]
pub struct TableObserver {
    config: TableConfig,
}

impl TableObserver {
    /// Creates a new table observer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new table observer with the specified configuration.
    pub fn with_config(config: TableConfig) -> Self {
        Self { config }
    }

    /// Sets the table style.
    pub fn with_style(mut self, style: TableStyle) -> Self {
        self.config.style = style;
        self
    }

    /// Sets whether to show the header row.
    pub fn with_header(mut self, show: bool) -> Self {
        self.config.show_header = show;
        self
    }

    /// Sets an optional title for the table.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.config.title = Some(title.into());
        self
    }

    /// Sets whether report tables end with a summary line.
    pub fn with_summary(mut self, show: bool) -> Self {
        self.config.show_summary = show;
        self
    }

    fn apply_style(&self, table: &mut Table) {
        match self.config.style {
            TableStyle::Ascii => table.with(Style::ascii()),
            TableStyle::Rounded => table.with(Style::rounded()),
            TableStyle::Sharp => table.with(Style::sharp()),
            TableStyle::Modern => table.with(Style::modern()),
            TableStyle::Markdown => table.with(Style::markdown()),
            TableStyle::Dots => table.with(Style::dots()),
            TableStyle::Blank => table.with(Style::blank()),
        };
    }

    fn finish(&self, mut table: Table) -> String {
        self.apply_style(&mut table);

        if !self.config.show_header {
            table.with(tabled::settings::Remove::row(
                tabled::settings::object::Rows::first(),
            ));
        }

        match self.config.title {
            Some(ref title) => format!("{}\n{}", title, table),
            None => table.to_string(),
        }
    }

    /// Renders one row per outcome, in submission order.
    pub fn render_report(&self, report: &RunReport) -> String {
        let rows: Vec<OutcomeRow> = report.iter().map(OutcomeRow::from).collect();
        let mut output = self.finish(Table::new(&rows));

        if self.config.show_summary {
            output.push_str(&format!(
                "\n{} completed, {} failed, {} not completed in {:.2?}",
                report.succeeded().count(),
                report.failed().count(),
                report.not_completed().count(),
                report.elapsed()
            ));
        }
        output
    }

    /// Renders a two-column `Name | Value` table of counters.
    pub fn render_counters<'a>(&self, counters: impl Iterator<Item = &'a dyn Counter>) -> String {
        let rows: Vec<CounterRow> = counters
            .map(|c| CounterRow {
                name: if c.name().is_empty() {
                    "(unnamed)".to_string()
                } else {
                    c.name().to_string()
                },
                value: c.value(),
            })
            .collect();
        self.finish(Table::new(&rows))
    }

    /// Writes the rendered report table, followed by a newline, to `writer`.
    pub fn write_report<W: Write>(&self, mut writer: W, report: &RunReport) -> Result<()> {
        writeln!(writer, "{}", self.render_report(report))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counters::atomic::AtomicCounter;
    use crate::counters::cas::CasCounter;
    use crate::runner::{Task, TaskRunner};

    fn sample_report() -> RunReport {
        TaskRunner::new().run_tasks(vec![
            Task::new(|| {}).with_name("fetch"),
            Task::fallible(|| Err("timeout")).with_name("store"),
            Task::new(|| {}),
        ])
    }

    #[test]
    fn test_render_report() {
        let output = TableObserver::new().render_report(&sample_report());
        assert!(output.contains("fetch"));
        assert!(output.contains("store"));
        assert!(output.contains("#2"));
        assert!(output.contains("unit failed: timeout"));
        assert!(output.contains("2 completed, 1 failed, 0 not completed"));
    }

    #[test]
    fn test_render_report_without_summary_or_header() {
        let output = TableObserver::new()
            .with_summary(false)
            .with_header(false)
            .render_report(&sample_report());
        assert!(!output.contains("Status"));
        assert!(!output.contains("not completed in"));
    }

    #[test]
    fn test_render_empty_report() {
        let output = TableObserver::new().render_report(&RunReport::default());
        assert!(output.contains("0 completed"));
    }

    #[test]
    fn test_render_counters() {
        let hits = AtomicCounter::new().with_name("hits");
        let unnamed = CasCounter::new();
        hits.add(42);
        unnamed.add(-1);

        let counters: Vec<&dyn Counter> = vec![&hits, &unnamed];
        let output = TableObserver::new()
            .with_style(TableStyle::Ascii)
            .render_counters(counters.into_iter());

        assert!(output.contains("hits"));
        assert!(output.contains("42"));
        assert!(output.contains("(unnamed)"));
        assert!(output.contains("-1"));
        assert!(output.contains('+'));
    }

    #[test]
    fn test_title() {
        let counters: Vec<&dyn Counter> = vec![];
        let output = TableObserver::new()
            .with_title("Counters")
            .render_counters(counters.into_iter());
        assert!(output.starts_with("Counters\n"));
    }

    #[test]
    fn test_markdown_style() {
        let output = TableObserver::new()
            .with_style(TableStyle::Markdown)
            .render_report(&sample_report());
        assert!(output.contains("| fetch"));
    }

    #[test]
    fn test_write_report() {
        let mut buffer = Vec::new();
        TableObserver::new()
            .write_report(&mut buffer, &sample_report())
            .unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.ends_with('\n'));
        assert!(text.contains("fetch"));
    }
}
