//! Sorted cursor contract
//!
//! Everything that reads the keyspace speaks one pull protocol:
//!
//! 1. `seek(range, families, inclusive)` positions the cursor
//! 2. `has_top()` reports whether an entry is available
//! 3. `top_key()` / `top_value()` expose it
//! 4. `next()` moves past it
//!
//! Raw storage cursors and the aggregating cursors built on top of them
//! implement the same trait, so aggregating cursors stack.
//!
//! # Invariants
//!
//! - Entries are produced in key order within a seeked range
//! - Forward iteration and explicit re-seek only
//! - `deep_copy` shares no mutable state with the original

mod errors;
mod memory;

use std::collections::BTreeSet;

pub use errors::{ConfigError, CursorError, CursorResult, Severity};
pub use memory::{MemoryCursor, SourceStats};

use crate::data::{Key, Range, Value};

/// Where a scan runs; handed to `deep_copy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorScope {
    /// Client scan
    #[default]
    Scan,
    /// Flush of in-memory data
    MinorCompaction,
    /// Merge of stored files
    MajorCompaction,
}

/// Environment for cursor copies
#[derive(Debug, Clone, Default)]
pub struct CursorEnv {
    pub scope: CursorScope,
}

/// Pull cursor over sorted entries.
pub trait SortedCursor: Send {
    /// Position at the first entry of `range`. `families` restricts the
    /// column families returned: only those when `inclusive`, all but those
    /// otherwise. An empty exclusive set means every family.
    fn seek(
        &mut self,
        range: &Range,
        families: &BTreeSet<Vec<u8>>,
        inclusive: bool,
    ) -> CursorResult<()>;

    /// Whether an entry is available
    fn has_top(&self) -> bool;

    /// Current key
    fn top_key(&self) -> Option<&Key>;

    /// Current value
    fn top_value(&self) -> Option<&[u8]>;

    /// Move past the current entry
    fn next(&mut self) -> CursorResult<()>;

    /// Independent, unpositioned copy
    fn deep_copy(&self, env: &CursorEnv) -> Box<dyn SortedCursor>;
}

/// Read every remaining entry of an already seeked cursor.
pub fn drain(cursor: &mut dyn SortedCursor) -> CursorResult<Vec<(Key, Value)>> {
    let mut entries = Vec::new();
    while cursor.has_top() {
        if let (Some(key), Some(value)) = (cursor.top_key(), cursor.top_value()) {
            entries.push((key.clone(), value.to_vec()));
        }
        cursor.next()?;
    }
    Ok(entries)
}

/// Seek over `range` with no family restriction and drain.
pub fn scan(cursor: &mut dyn SortedCursor, range: &Range) -> CursorResult<Vec<(Key, Value)>> {
    cursor.seek(range, &BTreeSet::new(), false)?;
    drain(cursor)
}
