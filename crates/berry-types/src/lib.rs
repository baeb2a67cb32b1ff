//! # berry-types
//!
//! Shared domain types used across the Berry workspace.
//!
//! A *series* is the append-only, timestamp-ordered list of submissions made
//! for one oracle request id. Records are addressed by their insertion index.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Submission timestamp in Unix epoch seconds.
pub type Timestamp = u64;

/// Opaque identifier of a record series (an oracle request id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeriesId(pub u64);

impl SeriesId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "series#{}", self.0)
    }
}

impl FromStr for SeriesId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl From<u64> for SeriesId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// A single submission in a series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record<V> {
    /// Position of the record in its series.
    pub index: usize,
    /// Time the value was submitted.
    pub timestamp: Timestamp,
    /// Submitted payload.
    pub value: V,
}

/// Outcome of a point-in-time lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", content = "index", rename_all = "snake_case")]
pub enum Lookup {
    /// The record at this index is the last one at or before the target.
    Found(usize),
    /// The series is empty or its first record is after the target.
    NotFound,
}

impl Lookup {
    /// Index of the located record, if any.
    pub fn index(self) -> Option<usize> {
        match self {
            Lookup::Found(index) => Some(index),
            Lookup::NotFound => None,
        }
    }

    pub fn is_found(self) -> bool {
        matches!(self, Lookup::Found(_))
    }
}

impl From<Lookup> for Option<usize> {
    fn from(lookup: Lookup) -> Self {
        lookup.index()
    }
}

impl From<Option<usize>> for Lookup {
    fn from(index: Option<usize>) -> Self {
        index.map_or(Lookup::NotFound, Lookup::Found)
    }
}
