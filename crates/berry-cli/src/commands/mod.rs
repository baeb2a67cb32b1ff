//! Command handlers.
//!
//! Each handler returns a JSON value that `main` prints on stdout.

pub mod query;
pub mod submit;
pub mod sweep;

use std::str::FromStr;

use anyhow::{bail, Context};
use berry_types::{Record, SeriesId};
use rusqlite::Connection;
use serde_json::Value;

use crate::config::BerryConfig;

pub const USAGE: &str = "usage:
  berry submit <series> <value> [timestamp]
  berry lookup <series> <target>
  berry data-before <series> <target>
  berry current <series>
  berry sweep <series>";

/// Route a command line (without the program name) to its handler.
pub fn dispatch(conn: &Connection, config: &BerryConfig, args: &[String]) -> anyhow::Result<Value> {
    let Some((command, rest)) = args.split_first() else {
        bail!("missing command\n{USAGE}");
    };
    match command.as_str() {
        "submit" => {
            let series = arg(rest, 0, "series")?;
            let value: String = arg(rest, 1, "value")?;
            let timestamp = optional_arg(rest, 2, "timestamp")?;
            submit::submit(conn, series, value.as_bytes(), timestamp)
        }
        "lookup" => {
            let series = arg(rest, 0, "series")?;
            let target = arg(rest, 1, "target")?;
            query::lookup(conn, config, series, target)
        }
        "data-before" => {
            let series = arg(rest, 0, "series")?;
            let target = arg(rest, 1, "target")?;
            query::data_before(conn, config, series, target)
        }
        "current" => query::current(conn, arg(rest, 0, "series")?),
        "sweep" => sweep::sweep(conn, config, arg(rest, 0, "series")?),
        other => bail!("unknown command '{other}'\n{USAGE}"),
    }
}

fn arg<T>(args: &[String], position: usize, name: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    optional_arg(args, position, name)?.with_context(|| format!("missing <{name}>\n{USAGE}"))
}

fn optional_arg<T>(args: &[String], position: usize, name: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    args.get(position)
        .map(|raw| {
            raw.parse::<T>()
                .with_context(|| format!("invalid <{name}> '{raw}'"))
        })
        .transpose()
}

/// JSON view of a stored record.
pub(crate) fn record_json(series: SeriesId, record: &Record<Vec<u8>>) -> Value {
    serde_json::json!({
        "series": series,
        "index": record.index,
        "timestamp": record.timestamp,
        "value": String::from_utf8_lossy(&record.value),
        "value_hex": hex::encode(&record.value),
    })
}
