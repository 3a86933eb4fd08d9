//! Database schema definitions
//!
//! This module contains the SQL schema for the Stay-Scout database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per finished search session
CREATE TABLE IF NOT EXISTS searches (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    destination TEXT NOT NULL,
    search_date TEXT NOT NULL,
    properties_found INTEGER NOT NULL,
    unavailable_properties INTEGER NOT NULL,
    score_mean REAL,
    price_mean REAL,
    searched_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_searches_terms ON searches(destination, search_date);
"#;

/// Format of `search_date`
pub const DATE_COLUMN_FORMAT: &str = "%Y-%m-%d";

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        initialize_schema(&conn).unwrap();
        let result = initialize_schema(&conn);

        assert!(result.is_ok());
    }

    #[test]
    fn test_searches_table_exists() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='searches'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }
}
