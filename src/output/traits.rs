//! Output sink traits and types
//!
//! This module defines the immutable per-session `Summary`, the
//! `SessionReport` handed from the orchestrator to storage and export, and
//! the trait interface for export sinks.

use crate::output::Statistics;
use crate::session::{SearchTerms, WorkerOutcome};
use chrono::{DateTime, NaiveDate, Utc};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Statistics of one finished search
///
/// Built exactly once per session and never modified afterwards. Storing it
/// yields the row id, which `with_id` attaches to a copy.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// Row id assigned by storage; `None` until stored
    pub id: Option<i64>,
    pub destination: String,
    pub date: NaiveDate,
    pub properties_found: u64,
    /// Properties listed without a price
    pub unavailable_properties: u64,
    pub score_mean: Option<f64>,
    pub price_mean: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl Summary {
    pub fn new(terms: &SearchTerms, stats: &Statistics, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: None,
            destination: terms.destination.clone(),
            date: terms.checkin,
            properties_found: stats.properties_found,
            unavailable_properties: stats.unavailable_properties,
            score_mean: stats.score_mean,
            price_mean: stats.price_mean,
            timestamp,
        }
    }

    /// The same summary, carrying the row id storage assigned to it
    pub fn with_id(self, id: i64) -> Self {
        Self {
            id: Some(id),
            ..self
        }
    }
}

/// Everything a finished session produced
///
/// Owned by the caller of `Orchestrator::run`; storage and export borrow it.
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub summary: Summary,
    /// One outcome per site, in the order the sites were configured
    pub outcomes: Vec<WorkerOutcome>,
}

/// Trait for human-readable report writers
pub trait ExportSink {
    /// Writes the statistics and per-site properties of one session
    ///
    /// # Returns
    ///
    /// The path of the written artifact
    fn export_session(&self, report: &SessionReport) -> OutputResult<PathBuf>;

    /// Writes the stored summaries for one destination and date
    ///
    /// # Arguments
    ///
    /// * `destination` - The searched destination
    /// * `date` - The searched check-in date
    /// * `history` - Summaries, most recent first
    fn export_history(
        &self,
        destination: &str,
        date: NaiveDate,
        history: &[Summary],
    ) -> OutputResult<PathBuf>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_from_statistics() {
        let terms = SearchTerms {
            destination: "Syros".to_string(),
            checkin: NaiveDate::from_ymd_opt(2030, 9, 2).unwrap(),
        };
        let stats = Statistics {
            properties_found: 4,
            unavailable_properties: 1,
            score_mean: Some(6.5),
            price_mean: Some(90.0),
        };
        let timestamp = Utc::now();

        let summary = Summary::new(&terms, &stats, timestamp);

        assert_eq!(summary.id, None);
        assert_eq!(summary.destination, "Syros");
        assert_eq!(summary.date, terms.checkin);
        assert_eq!(summary.properties_found, 4);
        assert_eq!(summary.unavailable_properties, 1);
        assert_eq!(summary.score_mean, Some(6.5));
        assert_eq!(summary.timestamp, timestamp);
    }

    #[test]
    fn test_with_id_keeps_statistics() {
        let terms = SearchTerms {
            destination: "Naxos".to_string(),
            checkin: NaiveDate::from_ymd_opt(2030, 5, 12).unwrap(),
        };
        let stats = Statistics {
            properties_found: 2,
            unavailable_properties: 0,
            score_mean: Some(8.0),
            price_mean: Some(70.0),
        };
        let summary = Summary::new(&terms, &stats, Utc::now());

        let stored = summary.clone().with_id(42);

        assert_eq!(stored.id, Some(42));
        assert_eq!(Summary { id: None, ..stored }, summary);
    }
}
