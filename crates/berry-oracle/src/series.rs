//! Read-only access to submission series.
//!
//! The lookup only ever needs three reads: the record count, the timestamp at
//! an index, and the value at an index. [`SeriesReader`] is that capability;
//! any store (in-memory, SQLite, remote ledger) can provide it.

use std::collections::HashMap;

use crate::{OracleError, Result, SeriesId, Timestamp};

/// Read capability over index-addressed, timestamp-ordered series.
///
/// Implementations must keep timestamps non-decreasing by index. The lookup
/// relies on that ordering and does not re-check it.
pub trait SeriesReader {
    /// Payload type stored with each record.
    type Value;

    /// Number of records in `series`. Unknown series have zero records.
    fn count(&self, series: SeriesId) -> Result<usize>;

    /// Timestamp of the record at `index`.
    ///
    /// # Errors
    ///
    /// - [`OracleError::OutOfRange`] if `index >= count(series)`
    fn timestamp_at(&self, series: SeriesId, index: usize) -> Result<Timestamp>;

    /// Value of the record at `index`.
    ///
    /// # Errors
    ///
    /// - [`OracleError::OutOfRange`] if `index >= count(series)`
    fn value_at(&self, series: SeriesId, index: usize) -> Result<Self::Value>;
}

impl<R: SeriesReader + ?Sized> SeriesReader for &R {
    type Value = R::Value;

    fn count(&self, series: SeriesId) -> Result<usize> {
        (**self).count(series)
    }

    fn timestamp_at(&self, series: SeriesId, index: usize) -> Result<Timestamp> {
        (**self).timestamp_at(series, index)
    }

    fn value_at(&self, series: SeriesId, index: usize) -> Result<Self::Value> {
        (**self).value_at(series, index)
    }
}

/// In-memory series store with an append-only submission path.
#[derive(Debug, Clone)]
pub struct MemorySeries<V> {
    series: HashMap<SeriesId, Vec<(Timestamp, V)>>,
}

impl<V> MemorySeries<V> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            series: HashMap::new(),
        }
    }

    /// Append a submission and return its index.
    ///
    /// Equal timestamps are accepted; several submissions can land in the
    /// same second.
    ///
    /// # Errors
    ///
    /// - [`OracleError::NonMonotonicTimestamp`] if `timestamp` is lower than
    ///   the last record's timestamp
    pub fn submit(&mut self, series: SeriesId, timestamp: Timestamp, value: V) -> Result<usize> {
        let records = self.series.entry(series).or_default();
        if let Some(&(last, _)) = records.last() {
            if timestamp < last {
                return Err(OracleError::NonMonotonicTimestamp {
                    series,
                    new: timestamp,
                    last,
                });
            }
        }
        records.push((timestamp, value));
        let index = records.len() - 1;
        tracing::debug!(%series, index, timestamp, "memory series: submission appended");
        Ok(index)
    }

    /// Number of records in `series`.
    pub fn len(&self, series: SeriesId) -> usize {
        self.series.get(&series).map_or(0, Vec::len)
    }

    /// Whether `series` has no records.
    pub fn is_empty(&self, series: SeriesId) -> bool {
        self.len(series) == 0
    }

    fn record(&self, series: SeriesId, index: usize) -> Result<&(Timestamp, V)> {
        let records = self.series.get(&series).map(Vec::as_slice).unwrap_or_default();
        records.get(index).ok_or(OracleError::OutOfRange {
            series,
            index,
            count: records.len(),
        })
    }
}

impl<V> Default for MemorySeries<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> SeriesReader for MemorySeries<V> {
    type Value = V;

    fn count(&self, series: SeriesId) -> Result<usize> {
        Ok(self.len(series))
    }

    fn timestamp_at(&self, series: SeriesId, index: usize) -> Result<Timestamp> {
        self.record(series, index).map(|(timestamp, _)| *timestamp)
    }

    fn value_at(&self, series: SeriesId, index: usize) -> Result<V> {
        self.record(series, index).map(|(_, value)| value.clone())
    }
}
