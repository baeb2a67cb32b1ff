//! Submission command handler.

use berry_db::queries::submissions;
use berry_types::{SeriesId, Timestamp};
use rusqlite::Connection;
use serde_json::Value;

/// Append `value` to `series`, stamped with `timestamp` or the current time.
pub fn submit(
    conn: &Connection,
    series: SeriesId,
    value: &[u8],
    timestamp: Option<Timestamp>,
) -> anyhow::Result<Value> {
    let timestamp = timestamp.unwrap_or_else(now);
    let index = submissions::append(conn, series, timestamp, value)?;
    tracing::info!(%series, index, timestamp, "value submitted");
    Ok(serde_json::json!({
        "series": series,
        "index": index,
        "timestamp": timestamp,
    }))
}

fn now() -> Timestamp {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
