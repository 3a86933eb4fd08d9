//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the SummaryStore trait.

use crate::output::Summary;
use crate::storage::schema::{initialize_schema, DATE_COLUMN_FORMAT};
use crate::storage::traits::{StorageError, StorageResult, SummaryStore};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{params, Connection, Row};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Counts stored summaries
    pub fn count(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM searches", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

/// Raw column values of one `searches` row
struct SearchRow {
    id: i64,
    destination: String,
    search_date: String,
    properties_found: i64,
    unavailable_properties: i64,
    score_mean: Option<f64>,
    price_mean: Option<f64>,
    searched_at: String,
}

impl SearchRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            destination: row.get(1)?,
            search_date: row.get(2)?,
            properties_found: row.get(3)?,
            unavailable_properties: row.get(4)?,
            score_mean: row.get(5)?,
            price_mean: row.get(6)?,
            searched_at: row.get(7)?,
        })
    }

    fn into_summary(self) -> StorageResult<Summary> {
        let id = self.id;
        let corrupt = |message: String| StorageError::CorruptRow { id, message };

        let date = NaiveDate::parse_from_str(&self.search_date, DATE_COLUMN_FORMAT)
            .map_err(|e| corrupt(format!("search_date '{}': {}", self.search_date, e)))?;
        let timestamp = DateTime::parse_from_rfc3339(&self.searched_at)
            .map_err(|e| corrupt(format!("searched_at '{}': {}", self.searched_at, e)))?
            .with_timezone(&Utc);

        Ok(Summary {
            id: Some(id),
            destination: self.destination,
            date,
            properties_found: self.properties_found.max(0) as u64,
            unavailable_properties: self.unavailable_properties.max(0) as u64,
            score_mean: self.score_mean,
            price_mean: self.price_mean,
            timestamp,
        })
    }
}

impl SummaryStore for SqliteStorage {
    fn store(&mut self, summary: &Summary) -> StorageResult<i64> {
        self.conn.execute(
            "INSERT INTO searches (destination, search_date, properties_found,
                unavailable_properties, score_mean, price_mean, searched_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                summary.destination,
                summary.date.format(DATE_COLUMN_FORMAT).to_string(),
                summary.properties_found as i64,
                summary.unavailable_properties as i64,
                summary.score_mean,
                summary.price_mean,
                summary
                    .timestamp
                    .to_rfc3339_opts(SecondsFormat::Micros, true),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        tracing::debug!("Stored summary {} for {}", id, summary.destination);
        Ok(id)
    }

    fn list_history(&self, destination: &str, date: NaiveDate) -> StorageResult<Vec<Summary>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, destination, search_date, properties_found, unavailable_properties,
                    score_mean, price_mean, searched_at
             FROM searches
             WHERE destination = ?1 AND search_date = ?2
             ORDER BY searched_at DESC, id DESC",
        )?;

        let rows = stmt
            .query_map(
                params![destination, date.format(DATE_COLUMN_FORMAT).to_string()],
                SearchRow::from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(SearchRow::into_summary).collect()
    }
}
