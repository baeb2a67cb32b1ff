//! Read command handlers: `lookup`, `data-before` and `current`.

use berry_db::SqliteSeries;
use berry_oracle::find_with_stats;
use berry_oracle::metered::MeteredReader;
use berry_types::SeriesId;
use rusqlite::Connection;
use serde_json::Value;

use super::record_json;
use crate::config::BerryConfig;

/// Locate the last record at or before `target` and report what it cost.
pub fn lookup(
    conn: &Connection,
    config: &BerryConfig,
    series: SeriesId,
    target: i64,
) -> anyhow::Result<Value> {
    let metered = MeteredReader::new(SqliteSeries::new(conn)).with_cost(config.oracle.read_cost());
    let (lookup, stats) = find_with_stats(&metered, series, target)?;
    let tally = metered.tally();
    Ok(serde_json::json!({
        "series": series,
        "target": target,
        "lookup": lookup,
        "iterations": stats.iterations,
        "timestamp_reads": stats.timestamp_reads,
        "cost": tally.cost,
    }))
}

/// Read the record in effect at `target`, subject to the staleness limit.
pub fn data_before(
    conn: &Connection,
    config: &BerryConfig,
    series: SeriesId,
    target: i64,
) -> anyhow::Result<Value> {
    let store = SqliteSeries::new(conn);
    let record = match berry_oracle::data_before(&store, series, target)? {
        Some(record) => record,
        None => {
            return Ok(serde_json::json!({
                "series": series,
                "target": target,
                "record": null,
            }))
        }
    };

    // A found record implies a non-negative target.
    let at = u64::try_from(target).unwrap_or(record.timestamp);
    config.oracle.freshness().check(&record, at)?;

    Ok(serde_json::json!({
        "series": series,
        "target": target,
        "record": record_json(series, &record),
    }))
}

/// Read the latest record of `series`.
pub fn current(conn: &Connection, series: SeriesId) -> anyhow::Result<Value> {
    let store = SqliteSeries::new(conn);
    let record = berry_oracle::current_value(&store, series)?;
    Ok(serde_json::json!({
        "series": series,
        "record": record.map(|record| record_json(series, &record)),
    }))
}
