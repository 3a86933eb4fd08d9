//! Storage traits and error types
//!
//! This module defines the trait interface for summary storage backends and
//! associated error types.

use crate::output::Summary;
use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Corrupt row {id}: {message}")]
    CorruptRow { id: i64, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable store for session summaries
pub trait SummaryStore {
    /// Stores a summary
    ///
    /// # Returns
    ///
    /// The id assigned to the stored row
    fn store(&mut self, summary: &Summary) -> StorageResult<i64>;

    /// Lists stored summaries for a search term, most recent first
    ///
    /// # Arguments
    ///
    /// * `destination` - Exact destination as it was searched
    /// * `date` - Searched check-in date
    fn list_history(&self, destination: &str, date: NaiveDate) -> StorageResult<Vec<Summary>>;
}
