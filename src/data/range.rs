//! Key ranges
//!
//! A range is a pair of optional bounds, each independently inclusive or
//! exclusive. A missing bound is infinite.

use std::fmt;

use super::key::{Key, PartialKey};

/// A contiguous slice of the sorted keyspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Range {
    start: Option<Key>,
    start_inclusive: bool,
    end: Option<Key>,
    end_inclusive: bool,
}

impl Range {
    /// Range covering the whole keyspace
    pub fn all() -> Self {
        Self::new(None, true, None, true)
    }

    /// Range with explicit bounds
    pub fn new(
        start: Option<Key>,
        start_inclusive: bool,
        end: Option<Key>,
        end_inclusive: bool,
    ) -> Self {
        Self {
            start,
            start_inclusive,
            end,
            end_inclusive,
        }
    }

    /// Every key of exactly one row
    pub fn exact_row(row: impl Into<Vec<u8>>) -> Self {
        let start = Key::for_row(row);
        let end = start.following_key(PartialKey::Row);
        Self::new(Some(start), true, Some(end), false)
    }

    /// Same end bound, new inclusive start.
    pub fn starting_at(&self, start: Key) -> Self {
        Self::new(Some(start), true, self.end.clone(), self.end_inclusive)
    }

    /// Start bound, if any
    pub fn start_key(&self) -> Option<&Key> {
        self.start.as_ref()
    }

    /// Whether the start bound is inclusive
    pub fn is_start_inclusive(&self) -> bool {
        self.start_inclusive
    }

    /// End bound, if any
    pub fn end_key(&self) -> Option<&Key> {
        self.end.as_ref()
    }

    /// Whether the end bound is inclusive
    pub fn is_end_inclusive(&self) -> bool {
        self.end_inclusive
    }

    /// True if `key` sorts before the start bound.
    pub fn before_start_key(&self, key: &Key) -> bool {
        match &self.start {
            None => false,
            Some(start) if self.start_inclusive => key < start,
            Some(start) => key <= start,
        }
    }

    /// True if `key` sorts after the end bound.
    pub fn after_end_key(&self, key: &Key) -> bool {
        match &self.end {
            None => false,
            Some(end) if self.end_inclusive => key > end,
            Some(end) => key >= end,
        }
    }

    /// True if `key` lies within both bounds.
    pub fn contains(&self, key: &Key) -> bool {
        !self.before_start_key(key) && !self.after_end_key(key)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.start {
            Some(start) => write!(f, "{}{}", if self.start_inclusive { "[" } else { "(" }, start)?,
            None => write!(f, "(-inf")?,
        }
        match &self.end {
            Some(end) => write!(f, ", {}{}", end, if self.end_inclusive { "]" } else { ")" }),
            None => write!(f, ", +inf)"),
        }
    }
}
