//! Database query functions.

pub mod submissions;
