//! Output module for session statistics and reports
//!
//! This module handles:
//! - Aggregating worker outcomes into session statistics
//! - The immutable per-session `Summary` and its `SessionReport`
//! - Printing summaries and history to stdout
//! - Exporting markdown reports

mod markdown;
pub mod stats;
mod traits;

pub use markdown::{format_history, format_session_report, MarkdownExporter};
pub use stats::{format_mean, print_history, print_summary, Statistics};
pub use traits::{ExportSink, OutputError, OutputResult, SessionReport, Summary};
