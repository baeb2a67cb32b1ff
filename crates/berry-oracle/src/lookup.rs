//! Last-at-or-before lookup over a timestamp-ordered series.
//!
//! The search is a binary search that answers with an insertion point rather
//! than an exact match. At every iteration it first checks the cached edge
//! timestamps of the current range, then reads the middle record and one of
//! its neighbours:
//!
//! ```text
//! ts(end)   <= target            -> Found(end)
//! ts(start) >  target            -> NotFound
//! middle = start + ceil((end - start) / 2)
//! ts(middle) <= target:  ts(middle + 1) > target  ? Found(middle)     : start = middle + 1
//! ts(middle) >  target:  ts(middle - 1) <= target ? Found(middle - 1) : end   = middle - 1
//! ```
//!
//! The peeked neighbour becomes the new cached edge, so a call costs two edge
//! reads plus at most two reads per iteration. Among duplicate timestamps the
//! highest index wins.

use crate::series::SeriesReader;
use crate::{Lookup, OracleError, Record, Result, SeriesId, Timestamp};

/// Counters gathered while resolving a single lookup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LookupStats {
    /// Loop iterations entered.
    pub iterations: usize,
    /// Timestamp reads issued against the store.
    pub timestamp_reads: usize,
}

/// Upper bound on search iterations for a series of `count` records.
pub fn max_iterations(count: usize) -> usize {
    ceil_log2(count) + 1
}

fn ceil_log2(n: usize) -> usize {
    if n <= 1 {
        0
    } else {
        (usize::BITS - (n - 1).leading_zeros()) as usize
    }
}

/// Whether a record stamped `timestamp` is at or before `target`.
///
/// Record timestamps are unsigned, so a negative target precedes everything.
pub(crate) fn at_or_before(timestamp: Timestamp, target: i64) -> bool {
    u64::try_from(target).is_ok_and(|target| timestamp <= target)
}

/// Find the last record in `series` whose timestamp is at or before `target`.
///
/// Returns [`Lookup::NotFound`] for an empty series or when the first record is
/// already after `target`. The series must be non-decreasing by index; on a
/// disordered series the returned index is unspecified, but it is always in
/// range and no read falls outside `[0, count)`.
///
/// # Errors
///
/// Store errors propagate unchanged. The range at least halves every
/// iteration, so [`OracleError::IterationLimit`] marks a broken narrowing step
/// rather than a property of the data.
///
/// # Examples
///
/// ```
/// use berry_oracle::{find_last_at_or_before, Lookup, MemorySeries, SeriesId};
///
/// let feed = SeriesId(1);
/// let mut store = MemorySeries::new();
/// for (i, ts) in [0u64, 2, 4, 6].into_iter().enumerate() {
///     store.submit(feed, ts, i).unwrap();
/// }
/// assert_eq!(find_last_at_or_before(&store, feed, 5).unwrap(), Lookup::Found(2));
/// assert_eq!(find_last_at_or_before(&store, feed, -1).unwrap(), Lookup::NotFound);
/// ```
pub fn find_last_at_or_before<R>(reader: &R, series: SeriesId, target: i64) -> Result<Lookup>
where
    R: SeriesReader + ?Sized,
{
    find_with_stats(reader, series, target).map(|(lookup, _)| lookup)
}

/// Same as [`find_last_at_or_before`], also reporting iteration and read counts.
pub fn find_with_stats<R>(
    reader: &R,
    series: SeriesId,
    target: i64,
) -> Result<(Lookup, LookupStats)>
where
    R: SeriesReader + ?Sized,
{
    let count = reader.count(series)?;
    let mut probe = Probe {
        reader,
        series,
        stats: LookupStats::default(),
    };

    if count == 0 {
        return Ok(probe.finish(Lookup::NotFound, target));
    }

    let mut start = 0;
    let mut end = count - 1;
    let mut ts_end = probe.timestamp(end)?;
    let mut ts_start = if start == end {
        ts_end
    } else {
        probe.timestamp(start)?
    };

    let limit = max_iterations(count);
    for _ in 0..limit {
        probe.stats.iterations += 1;

        if at_or_before(ts_end, target) {
            return Ok(probe.finish(Lookup::Found(end), target));
        }
        if !at_or_before(ts_start, target) {
            return Ok(probe.finish(Lookup::NotFound, target));
        }

        // Both edges disagree with each other, so the range holds at least two
        // records and `middle` lies in (start, end].
        let middle = start + (end - start + 1) / 2;
        let ts_middle = probe.timestamp(middle)?;

        if at_or_before(ts_middle, target) {
            // Everything past `end` is known to be after the target. Only a
            // store that rewrote `end` since it was cached gets here.
            if middle == end {
                return Ok(probe.finish(Lookup::Found(end), target));
            }
            let ts_next = probe.timestamp(middle + 1)?;
            if !at_or_before(ts_next, target) {
                return Ok(probe.finish(Lookup::Found(middle), target));
            }
            start = middle + 1;
            ts_start = ts_next;
            if start == end {
                ts_end = ts_next;
            }
        } else {
            let ts_prev = probe.timestamp(middle - 1)?;
            if at_or_before(ts_prev, target) {
                return Ok(probe.finish(Lookup::Found(middle - 1), target));
            }
            end = middle - 1;
            ts_end = ts_prev;
            if start == end {
                ts_start = ts_prev;
            }
        }
    }

    Err(OracleError::IterationLimit { series, limit })
}

/// Read the record in effect at `target`: the last one at or before it.
///
/// Issues one value read on top of the lookup when a record is found.
pub fn data_before<R>(reader: &R, series: SeriesId, target: i64) -> Result<Option<Record<R::Value>>>
where
    R: SeriesReader + ?Sized,
{
    match find_last_at_or_before(reader, series, target)? {
        Lookup::Found(index) => read_record(reader, series, index).map(Some),
        Lookup::NotFound => Ok(None),
    }
}

/// Read the most recent record of `series`, if any.
pub fn current_value<R>(reader: &R, series: SeriesId) -> Result<Option<Record<R::Value>>>
where
    R: SeriesReader + ?Sized,
{
    match reader.count(series)? {
        0 => Ok(None),
        count => read_record(reader, series, count - 1).map(Some),
    }
}

fn read_record<R>(reader: &R, series: SeriesId, index: usize) -> Result<Record<R::Value>>
where
    R: SeriesReader + ?Sized,
{
    Ok(Record {
        index,
        timestamp: reader.timestamp_at(series, index)?,
        value: reader.value_at(series, index)?,
    })
}

/// Timestamp reader that tallies reads for [`LookupStats`].
struct Probe<'a, R: ?Sized> {
    reader: &'a R,
    series: SeriesId,
    stats: LookupStats,
}

impl<R: SeriesReader + ?Sized> Probe<'_, R> {
    fn timestamp(&mut self, index: usize) -> Result<Timestamp> {
        self.stats.timestamp_reads += 1;
        self.reader.timestamp_at(self.series, index)
    }

    fn finish(self, lookup: Lookup, target: i64) -> (Lookup, LookupStats) {
        tracing::trace!(
            series = %self.series,
            target,
            ?lookup,
            iterations = self.stats.iterations,
            reads = self.stats.timestamp_reads,
            "lookup resolved"
        );
        (lookup, self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::linear_scan;
    use crate::MemorySeries;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::cell::RefCell;

    const FEED: SeriesId = SeriesId(1);

    fn store_with(timestamps: &[Timestamp]) -> MemorySeries<usize> {
        let mut store = MemorySeries::new();
        for (i, &ts) in timestamps.iter().enumerate() {
            store.submit(FEED, ts, i).expect("submit");
        }
        store
    }

    fn find(store: &MemorySeries<usize>, target: i64) -> Lookup {
        find_last_at_or_before(store, FEED, target).expect("lookup must not fail")
    }

    /// Non-decreasing series with runs of duplicates and irregular gaps.
    fn random_series(rng: &mut StdRng, len: usize) -> Vec<Timestamp> {
        let mut ts = rng.gen_range(0..5u64);
        (0..len)
            .map(|_| {
                ts += match rng.gen_range(0..4) {
                    0 => 0,
                    1 => 1,
                    _ => rng.gen_range(2..7),
                };
                ts
            })
            .collect()
    }

    fn sweep_range(timestamps: &[Timestamp]) -> std::ops::RangeInclusive<i64> {
        let first = timestamps.first().copied().unwrap_or(0) as i64;
        let last = timestamps.last().copied().unwrap_or(0) as i64;
        (first - 2)..=(last + 2)
    }

    #[test]
    fn test_even_steps() {
        let timestamps: Vec<Timestamp> = (0..=20).map(|i| i * 2).collect();
        let store = store_with(&timestamps);
        assert_eq!(find(&store, 5), Lookup::Found(2));
        assert_eq!(find(&store, 41), Lookup::Found(20));
        assert_eq!(find(&store, -1), Lookup::NotFound);
        assert_eq!(find(&store, 0), Lookup::Found(0));
        assert_eq!(find(&store, 40), Lookup::Found(20));
        assert_eq!(find(&store, 39), Lookup::Found(19));
    }

    #[test]
    fn test_duplicates_resolve_to_last() {
        let store = store_with(&[10, 10, 10, 20]);
        assert_eq!(find(&store, 10), Lookup::Found(2));
        assert_eq!(find(&store, 15), Lookup::Found(2));
        assert_eq!(find(&store, 9), Lookup::NotFound);
        assert_eq!(find(&store, 20), Lookup::Found(3));
    }

    #[test]
    fn test_single_record() {
        let store = store_with(&[100]);
        assert_eq!(find(&store, 50), Lookup::NotFound);
        assert_eq!(find(&store, 100), Lookup::Found(0));
        assert_eq!(find(&store, 200), Lookup::Found(0));
    }

    #[test]
    fn test_empty_series() {
        let store = store_with(&[]);
        for target in [i64::MIN, -1, 0, 1, i64::MAX] {
            assert_eq!(find(&store, target), Lookup::NotFound);
        }
    }

    #[test]
    fn test_all_equal_timestamps() {
        let store = store_with(&[7; 9]);
        assert_eq!(find(&store, 6), Lookup::NotFound);
        assert_eq!(find(&store, 7), Lookup::Found(8));
        assert_eq!(find(&store, 8), Lookup::Found(8));
    }

    #[test]
    fn test_extreme_targets() {
        let store = store_with(&[0, 1, u64::MAX]);
        assert_eq!(find(&store, i64::MAX), Lookup::Found(1));
        assert_eq!(find(&store, i64::MIN), Lookup::NotFound);
    }

    #[test]
    fn test_matches_linear_scan_on_random_series() {
        let mut rng = StdRng::seed_from_u64(0x00b3_7721);
        for len in 0..=48 {
            for _ in 0..8 {
                let timestamps = random_series(&mut rng, len);
                let store = store_with(&timestamps);
                for target in sweep_range(&timestamps) {
                    let expected = linear_scan(&store, FEED, target).expect("scan");
                    assert_eq!(
                        find(&store, target),
                        expected,
                        "series {timestamps:?}, target {target}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_found_index_is_insertion_point() {
        let mut rng = StdRng::seed_from_u64(7);
        for len in 1..=64 {
            let timestamps = random_series(&mut rng, len);
            let store = store_with(&timestamps);
            for target in sweep_range(&timestamps) {
                match find(&store, target) {
                    Lookup::Found(i) => {
                        assert!(at_or_before(timestamps[i], target));
                        if let Some(&next) = timestamps.get(i + 1) {
                            assert!(!at_or_before(next, target));
                        }
                    }
                    Lookup::NotFound => assert!(!at_or_before(timestamps[0], target)),
                }
            }
        }
    }

    #[test]
    fn test_every_interval_maps_to_its_index() {
        let timestamps: Vec<Timestamp> = vec![3, 3, 5, 9, 9, 9, 10, 14, 20, 20];
        let store = store_with(&timestamps);
        for i in 0..timestamps.len() {
            let lo = timestamps[i] as i64;
            let hi = timestamps.get(i + 1).map_or(lo + 5, |&next| next as i64);
            for target in lo..hi {
                assert_eq!(find(&store, target), Lookup::Found(i), "target {target}");
            }
        }
    }

    #[test]
    fn test_iteration_and_read_bounds() {
        let mut rng = StdRng::seed_from_u64(99);
        for len in 1..=300 {
            let timestamps = random_series(&mut rng, len);
            let store = store_with(&timestamps);
            for target in sweep_range(&timestamps) {
                let (_, stats) = find_with_stats(&store, FEED, target).expect("lookup");
                assert!(stats.iterations <= ceil_log2(len) + 2, "len {len}: {stats:?}");
                assert!(stats.iterations <= max_iterations(len));
                let edge_reads = if len == 1 { 1 } else { 2 };
                assert!(
                    stats.timestamp_reads <= edge_reads + 2 * stats.iterations,
                    "len {len}: {stats:?}"
                );
            }
        }
    }

    /// Reader over a fixed timestamp list in any order.
    struct Unordered(Vec<Timestamp>);

    impl SeriesReader for Unordered {
        type Value = ();

        fn count(&self, _series: SeriesId) -> Result<usize> {
            Ok(self.0.len())
        }

        fn timestamp_at(&self, series: SeriesId, index: usize) -> Result<Timestamp> {
            self.0.get(index).copied().ok_or(OracleError::OutOfRange {
                series,
                index,
                count: self.0.len(),
            })
        }

        fn value_at(&self, series: SeriesId, index: usize) -> Result<()> {
            self.timestamp_at(series, index).map(|_| ())
        }
    }

    /// Reader that answers every timestamp read with a fresh random value.
    struct Shifting {
        len: usize,
        rng: RefCell<StdRng>,
    }

    impl SeriesReader for Shifting {
        type Value = ();

        fn count(&self, _series: SeriesId) -> Result<usize> {
            Ok(self.len)
        }

        fn timestamp_at(&self, series: SeriesId, index: usize) -> Result<Timestamp> {
            if index >= self.len {
                return Err(OracleError::OutOfRange {
                    series,
                    index,
                    count: self.len,
                });
            }
            Ok(self.rng.borrow_mut().gen_range(0..40))
        }

        fn value_at(&self, series: SeriesId, index: usize) -> Result<()> {
            self.timestamp_at(series, index).map(|_| ())
        }
    }

    #[test]
    fn test_disordered_series_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(31);
        for len in 0..=40 {
            for _ in 0..16 {
                let reader = Unordered((0..len).map(|_| rng.gen_range(0..30)).collect());
                for target in -2..=32 {
                    let (lookup, stats) =
                        find_with_stats(&reader, FEED, target).expect("no out-of-range read");
                    if let Lookup::Found(i) = lookup {
                        assert!(i < len, "index {i} for {:?}", reader.0);
                    }
                    assert!(stats.iterations <= max_iterations(len));
                }
            }
        }
    }

    #[test]
    fn test_shifting_store_stays_in_range_and_bounded() {
        for len in 1..=64 {
            let reader = Shifting {
                len,
                rng: RefCell::new(StdRng::seed_from_u64(len as u64)),
            };
            for target in -1..=41 {
                let (lookup, stats) =
                    find_with_stats(&reader, FEED, target).expect("no out-of-range read");
                if let Lookup::Found(i) = lookup {
                    assert!(i < len);
                }
                assert!(stats.iterations <= max_iterations(len), "len {len}: {stats:?}");
            }
        }
    }

    #[test]
    fn test_empty_series_reads_nothing() {
        let store = store_with(&[]);
        let (lookup, stats) = find_with_stats(&store, FEED, 10).expect("lookup");
        assert_eq!(lookup, Lookup::NotFound);
        assert_eq!(stats, LookupStats::default());
    }

    #[test]
    fn test_max_iterations() {
        assert_eq!(max_iterations(0), 1);
        assert_eq!(max_iterations(1), 1);
        assert_eq!(max_iterations(2), 2);
        assert_eq!(max_iterations(3), 3);
        assert_eq!(max_iterations(4), 3);
        assert_eq!(max_iterations(21), 6);
        assert_eq!(max_iterations(1024), 11);
        assert_eq!(max_iterations(1025), 12);
    }

    #[test]
    fn test_data_before_reads_value() {
        let store = store_with(&[0, 2, 4, 6]);
        let record = data_before(&store, FEED, 5).expect("read").expect("found");
        assert_eq!(record, Record { index: 2, timestamp: 4, value: 2 });
        assert!(data_before(&store, FEED, -1).expect("read").is_none());
    }

    #[test]
    fn test_current_value() {
        let store = store_with(&[1, 5, 5]);
        let record = current_value(&store, FEED).expect("read").expect("present");
        assert_eq!(record.index, 2);
        assert_eq!(record.timestamp, 5);
        assert!(current_value(&store, SeriesId(404)).expect("read").is_none());
    }
}
