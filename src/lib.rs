//! shardscan - aggregating scan cursors over a sorted shard keyspace
//!
//! Cursors that stack on a sorted source and fold runs of entries into
//! synthesized results while re-seeking past what they do not need:
//! - `fi_count`: field-index counts per row, field and value
//! - `first_last`: first and last dates seen per row and family

pub mod cli;
pub mod cursor;
pub mod data;
pub mod fi_count;
pub mod first_last;
pub mod observability;
pub mod visibility;
