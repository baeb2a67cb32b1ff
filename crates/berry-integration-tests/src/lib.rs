//! Integration test crate for the Berry workspace.
//!
//! This crate has no library code. It only contains tests that exercise
//! lookups end to end across the SQLite store, the metered reader and the
//! reference scan.
//!
//! ```sh
//! cargo test -p berry-integration-tests
//! ```
