//! Read-cost sweep.
//!
//! Runs the lookup for every whole-second target from two seconds before the
//! first submission to two seconds after the last. Each result is checked
//! against the linear scan, and the worst-case metered cost is reported.

use anyhow::bail;
use berry_db::SqliteSeries;
use berry_oracle::lookup::max_iterations;
use berry_oracle::metered::MeteredReader;
use berry_oracle::reference::linear_scan;
use berry_oracle::{find_last_at_or_before, SeriesReader};
use berry_types::SeriesId;
use rusqlite::Connection;
use serde_json::Value;

use crate::config::BerryConfig;

/// Upper limit on the number of targets a single sweep visits.
pub const MAX_SWEEP_TARGETS: i64 = 1_000_000;

/// Sweep every target around `series` and report the metered cost.
pub fn sweep(conn: &Connection, config: &BerryConfig, series: SeriesId) -> anyhow::Result<Value> {
    let store = SqliteSeries::new(conn);
    let count = store.count(series)?;
    if count == 0 {
        bail!("{series} has no submissions");
    }
    // Stored timestamps fit in i64.
    let first = store.timestamp_at(series, 0)? as i64;
    let last = store.timestamp_at(series, count - 1)? as i64;
    let low = first.saturating_sub(2);
    let high = last.saturating_add(2);
    let targets = match high.checked_sub(low).and_then(|span| span.checked_add(1)) {
        Some(targets) if targets <= MAX_SWEEP_TARGETS => targets,
        _ => bail!("{series} spans {first}..={last}, more than {MAX_SWEEP_TARGETS} targets"),
    };

    let metered = MeteredReader::new(store).with_cost(config.oracle.read_cost());
    let mut worst_cost = 0;
    let mut worst_target = low;
    let mut total_cost = 0u64;
    let mut mismatches = Vec::new();

    for target in low..=high {
        metered.reset();
        let lookup = find_last_at_or_before(&metered, series, target)?;
        let cost = metered.tally().cost;
        total_cost = total_cost.saturating_add(cost);
        if cost > worst_cost {
            worst_cost = cost;
            worst_target = target;
        }

        let expected = linear_scan(&store, series, target)?;
        if lookup != expected {
            tracing::warn!(%series, target, ?lookup, ?expected, "sweep: lookup disagrees with linear scan");
            mismatches.push(target);
        }
    }

    if !mismatches.is_empty() {
        bail!(
            "{} of {} lookups on {series} disagreed with the linear scan (first at {})",
            mismatches.len(),
            targets,
            mismatches[0]
        );
    }

    let targets = targets as u64;
    tracing::info!(%series, count, targets, worst_cost, "sweep complete");
    Ok(serde_json::json!({
        "series": series,
        "count": count,
        "targets": targets,
        "worst_cost": worst_cost,
        "worst_target": worst_target,
        "mean_cost": total_cost as f64 / targets as f64,
        "max_iterations": max_iterations(count),
    }))
}
