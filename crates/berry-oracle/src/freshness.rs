//! Staleness guard for located records.
//!
//! A lookup answers "what was the last value at or before T", which may be
//! arbitrarily old. Consumers that need a recent value wrap the result in a
//! [`Freshness`] check: a record older than `max_age` seconds relative to
//! the evaluation time is rejected with [`OracleError::StaleData`].

use crate::{OracleError, Record, Result, Timestamp};

/// Default maximum record age in seconds (1 hour).
pub const DEFAULT_MAX_AGE: u64 = 3600;

/// Maximum accepted age of an oracle record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Freshness {
    /// Maximum age in seconds. Zero disables the check.
    max_age: u64,
}

impl Freshness {
    pub fn new(max_age: u64) -> Self {
        Self { max_age }
    }

    /// A guard that accepts records of any age.
    pub fn disabled() -> Self {
        Self { max_age: 0 }
    }

    pub fn is_enabled(&self) -> bool {
        self.max_age > 0
    }

    pub fn max_age(&self) -> u64 {
        self.max_age
    }

    /// Whether a record stamped `timestamp` is stale at time `at`.
    pub fn is_stale(&self, timestamp: Timestamp, at: Timestamp) -> bool {
        self.is_enabled() && at.saturating_sub(timestamp) > self.max_age
    }

    /// Reject `record` if it is stale at time `at`.
    ///
    /// # Errors
    ///
    /// - [`OracleError::StaleData`] if the record is older than `max_age`
    pub fn check<V>(&self, record: &Record<V>, at: Timestamp) -> Result<()> {
        if self.is_stale(record.timestamp, at) {
            tracing::warn!(
                index = record.index,
                timestamp = record.timestamp,
                at,
                max_age = self.max_age,
                "freshness: stale oracle record rejected"
            );
            return Err(OracleError::StaleData {
                timestamp: record.timestamp,
                at,
                max_age: self.max_age,
            });
        }
        Ok(())
    }
}

impl Default for Freshness {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_AGE)
    }
}
