//! Observers that render run reports and counters for humans or machines.
//!
//! - [`table`] - Pretty-print reports and counters as tables using `tabled`
//! - [`json`] - Serialize reports and counters to JSON
//!
//! Both observers share the [`ObserverError`] type.
//!
//! # Feature Flags
//!
//! - `table` - Enables the [`table`] module
//! - `json` - Enables the [`json`] module (implies `serde`)
//! - `full` - Enables both
//!
//! # Example
//!
//! ```rust,ignore
//! use coordina::observers::json::JsonObserver;
//! use coordina::observers::table::TableObserver;
//! use coordina::runner::TaskRunner;
//!
//! let report = TaskRunner::new().run_all((0..3).map(|_| || {}));
//! println!("{}", TableObserver::new().render_report(&report));
//! println!("{}", JsonObserver::new().pretty(true).report_to_json(&report)?);
//! ```

mod error;

pub use error::{ObserverError, Result};

#[cfg(feature = "table")]
pub mod table;

#[cfg(feature = "json")]
pub mod json;
