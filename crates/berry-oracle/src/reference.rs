//! Brute-force reference lookup.
//!
//! Walks every record of a series and keeps the last one at or before the
//! target. It makes `count + 1` reads per call and exists as ground truth for
//! the binary search, not as a production read path.

use crate::lookup::at_or_before;
use crate::series::SeriesReader;
use crate::{Lookup, Result, SeriesId};

/// Linear last-at-or-before scan over `series`.
pub fn linear_scan<R>(reader: &R, series: SeriesId, target: i64) -> Result<Lookup>
where
    R: SeriesReader + ?Sized,
{
    let count = reader.count(series)?;
    let mut found = Lookup::NotFound;
    for index in 0..count {
        if at_or_before(reader.timestamp_at(series, index)?, target) {
            found = Lookup::Found(index);
        }
    }
    Ok(found)
}
