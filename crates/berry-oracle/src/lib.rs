//! # berry-oracle
//!
//! Point-in-time reads over append-only oracle submission series.
//!
//! Given a series and a target timestamp, the lookup finds the last record
//! submitted at or before that time using a bounded binary search. Every
//! timestamp read is assumed to be costly, so the search caches the edges of
//! its range and spends at most two reads per iteration.
//!
//! ## Modules
//!
//! - [`series`] — the read-only [`SeriesReader`](series::SeriesReader) seam and an in-memory store
//! - [`lookup`] — the last-at-or-before search and value-returning helpers
//! - [`metered`] — read counting and cost budgets around any reader
//! - [`reference`] — brute-force linear scan used as ground truth
//! - [`freshness`] — staleness guard for located records

pub mod freshness;
pub mod lookup;
pub mod metered;
pub mod reference;
pub mod series;

pub use berry_types::{Lookup, Record, SeriesId, Timestamp};
pub use lookup::{current_value, data_before, find_last_at_or_before, find_with_stats, LookupStats};
pub use series::{MemorySeries, SeriesReader};

/// Error types for oracle reads and submissions.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    /// A record index outside `[0, count)` was requested from a store.
    #[error("index {index} out of range for {series} with {count} records")]
    OutOfRange {
        /// Series that was read.
        series: SeriesId,
        /// Requested index.
        index: usize,
        /// Number of records in the series.
        count: usize,
    },

    /// A submission would make the series timestamps decrease.
    #[error("non-monotonic timestamp for {series}: {new} < {last}")]
    NonMonotonicTimestamp {
        /// Series being appended to.
        series: SeriesId,
        /// The rejected timestamp.
        new: Timestamp,
        /// Timestamp of the last accepted record.
        last: Timestamp,
    },

    /// A metered read would exceed the configured cost budget.
    #[error("read budget exhausted: {spent} > {budget}")]
    BudgetExhausted {
        /// Cost including the rejected read.
        spent: u64,
        /// Configured budget.
        budget: u64,
    },

    /// The search ran past its iteration bound without resolving.
    #[error("lookup on {series} did not resolve within {limit} iterations")]
    IterationLimit {
        /// Series being searched.
        series: SeriesId,
        /// Iteration bound for the series size.
        limit: usize,
    },

    /// A located record is older than the staleness threshold.
    #[error("stale oracle data: record at {timestamp}, read at {at}, max age {max_age}")]
    StaleData {
        /// Timestamp of the record.
        timestamp: Timestamp,
        /// Time the record was evaluated against.
        at: Timestamp,
        /// Maximum accepted age in seconds.
        max_age: u64,
    },

    /// The backing store failed.
    #[error("store error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl OracleError {
    /// Wrap a backend error raised by a [`SeriesReader`] implementation.
    pub fn store(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        OracleError::Store(Box::new(err))
    }
}

/// Convenience result type for oracle operations.
pub type Result<T> = std::result::Result<T, OracleError>;
