//! SQL schema definitions.

/// Schema v1: one row per oracle submission.
///
/// `idx` is the position of the submission within its series, assigned at
/// append time as the current record count. The primary key doubles as the
/// index used by `count`, `timestamp_at` and `value_at`.
pub const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS submissions (
    series_id INTEGER NOT NULL,
    idx INTEGER NOT NULL CHECK (idx >= 0),
    timestamp INTEGER NOT NULL CHECK (timestamp >= 0),
    value BLOB NOT NULL,
    PRIMARY KEY (series_id, idx)
) WITHOUT ROWID;
"#;
