//! First/last-seen dates
//!
//! Every qualifier in the scanned keyspace starts with an 8-digit
//! `yyyyMMdd` date, so byte order equals date order. The cursor reports the
//! earliest and latest date per `(row, family)`, or once for the whole range.
//!
//! # Invariants
//!
//! - `first <= last`, both taken from real qualifiers of the group
//! - No entries, no result
//! - Result qualifiers end in [`END_MARKER`], byte-compatible with stored data

mod config;
mod cursor;

pub use config::{FirstLastSeenConfig, PER_ROW_FAMILY};
pub use cursor::{FirstLastSeenCursor, DATE_WIDTH, END_MARKER};
