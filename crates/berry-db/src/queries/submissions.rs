//! Oracle submission query functions.

use berry_types::{SeriesId, Timestamp};
use rusqlite::{Connection, OptionalExtension};

use crate::{DbError, Result};

/// A raw submission row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRow {
    pub series_id: SeriesId,
    pub idx: usize,
    pub timestamp: Timestamp,
    pub value: Vec<u8>,
}

/// Append a submission to `series` and return its index.
///
/// The submission's index is the series' current record count. Its timestamp
/// may equal but never precede the last record's; the check and the insert run
/// in one transaction.
pub fn append(
    conn: &Connection,
    series: SeriesId,
    timestamp: Timestamp,
    value: &[u8],
) -> Result<usize> {
    let stored_ts = i64::try_from(timestamp).map_err(|_| {
        DbError::Constraint(format!("timestamp {timestamp} exceeds INTEGER range"))
    })?;

    let tx = conn.unchecked_transaction()?;
    let last: Option<(i64, i64)> = tx
        .query_row(
            "SELECT idx, timestamp FROM submissions
             WHERE series_id = ?1 ORDER BY idx DESC LIMIT 1",
            [series.get() as i64],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let idx = match last {
        Some((last_idx, last_ts)) if stored_ts < last_ts => {
            return Err(DbError::Constraint(format!(
                "non-monotonic timestamp for {series}: {timestamp} < {last_ts} at index {last_idx}"
            )));
        }
        Some((last_idx, _)) => last_idx + 1,
        None => 0,
    };

    tx.execute(
        "INSERT INTO submissions (series_id, idx, timestamp, value)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![series.get() as i64, idx, stored_ts, value],
    )?;
    tx.commit()?;

    tracing::debug!(%series, idx, timestamp, "submission appended");
    Ok(idx as usize)
}

/// Number of submissions in `series`.
pub fn count(conn: &Connection, series: SeriesId) -> Result<usize> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM submissions WHERE series_id = ?1",
        [series.get() as i64],
        |row| row.get(0),
    )?;
    Ok(count as usize)
}

/// Timestamp of the submission at `idx`, if it exists.
pub fn timestamp_at(conn: &Connection, series: SeriesId, idx: usize) -> Result<Option<Timestamp>> {
    let timestamp: Option<i64> = conn
        .query_row(
            "SELECT timestamp FROM submissions WHERE series_id = ?1 AND idx = ?2",
            rusqlite::params![series.get() as i64, idx as i64],
            |row| row.get(0),
        )
        .optional()?;
    Ok(timestamp.map(|ts| ts as u64))
}

/// Value of the submission at `idx`, if it exists.
pub fn value_at(conn: &Connection, series: SeriesId, idx: usize) -> Result<Option<Vec<u8>>> {
    let value = conn
        .query_row(
            "SELECT value FROM submissions WHERE series_id = ?1 AND idx = ?2",
            rusqlite::params![series.get() as i64, idx as i64],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value)
}

/// The most recent submission in `series`.
pub fn last(conn: &Connection, series: SeriesId) -> Result<Option<SubmissionRow>> {
    let row = conn
        .query_row(
            "SELECT idx, timestamp, value FROM submissions
             WHERE series_id = ?1 ORDER BY idx DESC LIMIT 1",
            [series.get() as i64],
            |row| {
                Ok(SubmissionRow {
                    series_id: series,
                    idx: row.get::<_, i64>(0)? as usize,
                    timestamp: row.get::<_, i64>(1)? as u64,
                    value: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(row)
}
