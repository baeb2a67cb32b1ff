//! [`SeriesReader`] over the `submissions` table.

use berry_oracle::{OracleError, SeriesReader};
use berry_types::{SeriesId, Timestamp};
use rusqlite::Connection;

use crate::queries::submissions;

/// Read-only view of the submissions table for the lookup.
///
/// Each trait call is one indexed point query.
#[derive(Debug, Clone, Copy)]
pub struct SqliteSeries<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteSeries<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    fn out_of_range(&self, series: SeriesId, index: usize) -> OracleError {
        match submissions::count(self.conn, series) {
            Ok(count) => OracleError::OutOfRange {
                series,
                index,
                count,
            },
            Err(err) => err.into(),
        }
    }
}

impl SeriesReader for SqliteSeries<'_> {
    type Value = Vec<u8>;

    fn count(&self, series: SeriesId) -> berry_oracle::Result<usize> {
        Ok(submissions::count(self.conn, series)?)
    }

    fn timestamp_at(&self, series: SeriesId, index: usize) -> berry_oracle::Result<Timestamp> {
        submissions::timestamp_at(self.conn, series, index)?
            .ok_or_else(|| self.out_of_range(series, index))
    }

    fn value_at(&self, series: SeriesId, index: usize) -> berry_oracle::Result<Vec<u8>> {
        submissions::value_at(self.conn, series, index)?
            .ok_or_else(|| self.out_of_range(series, index))
    }
}
