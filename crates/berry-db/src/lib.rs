//! # berry-db
//!
//! SQLite storage for oracle submission series.
//!
//! ## Schema
//!
//! - WAL mode
//! - One `submissions` table keyed by `(series_id, idx)`
//! - Timestamps are Unix epoch seconds, stored as INTEGER
//! - Schema version stored in `PRAGMA user_version`
//!
//! Appends go through [`queries::submissions::append`], which keeps each series
//! non-decreasing in time. Reads for the lookup go through [`SqliteSeries`].

pub mod migrations;
pub mod queries;
pub mod schema;
mod series;

pub use series::SqliteSeries;

use berry_oracle::OracleError;
use rusqlite::Connection;
use std::path::Path;

/// Current schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Database error types.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("migration failed: {0}")]
    Migration(String),

    #[error("constraint violation: {0}")]
    Constraint(String),
}

pub type Result<T> = std::result::Result<T, DbError>;

impl From<DbError> for OracleError {
    fn from(err: DbError) -> Self {
        OracleError::store(err)
    }
}

/// Open or create the submissions database at the given path.
///
/// Configures WAL mode and runs any pending migrations.
pub fn open(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    configure(&conn)?;
    migrations::run(&conn)?;
    Ok(conn)
}

/// Open an in-memory database (for testing).
pub fn open_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure(&conn)?;
    migrations::run(&conn)?;
    Ok(conn)
}

/// Configure SQLite pragmas.
fn configure(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA busy_timeout = 5000;
         PRAGMA synchronous = NORMAL;",
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_memory() {
        let conn = open_memory().expect("open in-memory db");
        let version: u32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .expect("get user_version");
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn test_wal_mode() {
        let conn = open_memory().expect("open");
        let mode: String = conn
            .pragma_query_value(None, "journal_mode", |row| row.get(0))
            .expect("get journal_mode");
        // In-memory databases use "memory" mode, not WAL
        assert!(mode == "wal" || mode == "memory");
    }

    #[test]
    fn test_db_error_converts_to_store_error() {
        let err: OracleError = DbError::Constraint("bad row".into()).into();
        assert!(matches!(err, OracleError::Store(_)));
        assert!(err.to_string().contains("constraint violation: bad row"));
    }
}
