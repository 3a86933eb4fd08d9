//! Storage module for persisting search summaries
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Storing one summary per finished session
//! - Listing the history of a search term

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{StorageError, StorageResult, SummaryStore};
