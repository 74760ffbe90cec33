//! Entry model for the sorted shard keyspace
//!
//! Every entry is a key/value pair where the key is the ordered tuple
//! `(row, family, qualifier, visibility, timestamp)` plus a tombstone flag.
//!
//! # Invariants
//!
//! - Keys order by row, family, qualifier, visibility ascending, then
//!   timestamp descending (newest first)
//! - Within one coordinate a deleted key sorts before a live key
//! - Ranges are the only way to bound a scan; cursors never random-access

mod key;
mod range;
mod record;

pub(crate) use key::escape_bytes;
pub use key::{Key, PartialKey, Value};
pub use range::Range;
pub use record::EntryRecord;
