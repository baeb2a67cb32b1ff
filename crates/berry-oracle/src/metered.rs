//! Metered reads.
//!
//! [`MeteredReader`] wraps any [`SeriesReader`] and prices every read against a
//! [`ReadCost`] schedule, the way a gas-billed runtime charges per storage
//! load. An optional budget turns the tally into a hard limit: the read that
//! would overspend fails with [`OracleError::BudgetExhausted`] and is not
//! forwarded to the inner reader.
//!
//! The tally uses interior mutability, so a metered reader is meant for a
//! single caller at a time. Call [`MeteredReader::reset`] between measurements.

use std::cell::Cell;

use crate::series::SeriesReader;
use crate::{OracleError, Result, SeriesId, Timestamp};

/// Price of each kind of read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadCost {
    /// Price of a record-count read.
    pub count: u64,
    /// Price of a timestamp read.
    pub timestamp: u64,
    /// Price of a value read.
    pub value: u64,
}

impl ReadCost {
    /// Every read costs one unit.
    pub const UNIT: ReadCost = ReadCost {
        count: 1,
        timestamp: 1,
        value: 1,
    };
}

impl Default for ReadCost {
    fn default() -> Self {
        Self::UNIT
    }
}

/// Reads issued through a [`MeteredReader`] and their total cost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadTally {
    /// Record-count reads issued.
    pub count_reads: u64,
    /// Timestamp reads issued.
    pub timestamp_reads: u64,
    /// Value reads issued.
    pub value_reads: u64,
    /// Total cost charged for all reads.
    pub cost: u64,
}

impl ReadTally {
    /// Total number of reads of any kind.
    pub fn reads(&self) -> u64 {
        self.count_reads + self.timestamp_reads + self.value_reads
    }
}

#[derive(Debug, Clone, Copy)]
enum ReadKind {
    Count,
    Timestamp,
    Value,
}

/// A [`SeriesReader`] that counts and prices reads.
#[derive(Debug)]
pub struct MeteredReader<R> {
    inner: R,
    schedule: ReadCost,
    budget: Option<u64>,
    tally: Cell<ReadTally>,
}

impl<R: SeriesReader> MeteredReader<R> {
    /// Meter `inner` at unit cost with no budget.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            schedule: ReadCost::default(),
            budget: None,
            tally: Cell::new(ReadTally::default()),
        }
    }

    /// Use a custom price schedule.
    pub fn with_cost(mut self, schedule: ReadCost) -> Self {
        self.schedule = schedule;
        self
    }

    /// Fail any read that would push the total cost above `budget`.
    pub fn with_budget(mut self, budget: u64) -> Self {
        self.budget = Some(budget);
        self
    }

    /// Reads recorded since construction or the last [`reset`](Self::reset).
    pub fn tally(&self) -> ReadTally {
        self.tally.get()
    }

    /// Clear the tally and return what it held.
    pub fn reset(&self) -> ReadTally {
        self.tally.replace(ReadTally::default())
    }

    /// Unwrap the inner reader.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn charge(&self, kind: ReadKind) -> Result<()> {
        let mut tally = self.tally.get();
        let price = match kind {
            ReadKind::Count => self.schedule.count,
            ReadKind::Timestamp => self.schedule.timestamp,
            ReadKind::Value => self.schedule.value,
        };
        let spent = tally.cost.saturating_add(price);
        if let Some(budget) = self.budget {
            if spent > budget {
                tracing::debug!(spent, budget, ?kind, "metered read rejected");
                return Err(OracleError::BudgetExhausted { spent, budget });
            }
        }
        match kind {
            ReadKind::Count => tally.count_reads += 1,
            ReadKind::Timestamp => tally.timestamp_reads += 1,
            ReadKind::Value => tally.value_reads += 1,
        }
        tally.cost = spent;
        self.tally.set(tally);
        Ok(())
    }
}

impl<R: SeriesReader> SeriesReader for MeteredReader<R> {
    type Value = R::Value;

    fn count(&self, series: SeriesId) -> Result<usize> {
        self.charge(ReadKind::Count)?;
        self.inner.count(series)
    }

    fn timestamp_at(&self, series: SeriesId, index: usize) -> Result<Timestamp> {
        self.charge(ReadKind::Timestamp)?;
        self.inner.timestamp_at(series, index)
    }

    fn value_at(&self, series: SeriesId, index: usize) -> Result<Self::Value> {
        self.charge(ReadKind::Value)?;
        self.inner.value_at(series, index)
    }
}
