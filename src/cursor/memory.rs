//! In-memory sorted source
//!
//! A `BTreeMap`-backed cursor that plays the storage engine's raw cursor.
//! Deterministic ordering comes from the map; copies share the immutable
//! entry map but never position or counters.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::data::{Key, Range, Value};

use super::errors::CursorResult;
use super::{CursorEnv, SortedCursor};

/// Seek / next counters of one source instance.
///
/// Cloning the handle shares the counters, which lets a test keep a handle
/// after moving the source into a wrapping cursor.
#[derive(Debug, Clone, Default)]
pub struct SourceStats {
    seeks: Arc<AtomicU64>,
    nexts: Arc<AtomicU64>,
}

impl SourceStats {
    /// Number of `seek` calls
    pub fn seeks(&self) -> u64 {
        self.seeks.load(Ordering::Relaxed)
    }

    /// Number of `next` calls
    pub fn nexts(&self) -> u64 {
        self.nexts.load(Ordering::Relaxed)
    }
}

/// Sorted cursor over an in-memory entry map.
#[derive(Debug)]
pub struct MemoryCursor {
    entries: Arc<BTreeMap<Key, Value>>,
    honor_families: bool,
    range: Range,
    families: BTreeSet<Vec<u8>>,
    families_inclusive: bool,
    top: Option<(Key, Value)>,
    stats: SourceStats,
}

impl MemoryCursor {
    /// Creates an unpositioned cursor. Duplicate keys keep the last value.
    pub fn new(entries: impl IntoIterator<Item = (Key, Value)>) -> Self {
        Self {
            entries: Arc::new(entries.into_iter().collect()),
            honor_families: true,
            range: Range::all(),
            families: BTreeSet::new(),
            families_inclusive: false,
            top: None,
            stats: SourceStats::default(),
        }
    }

    /// Ignore the family set passed to `seek`, as a source without
    /// locality-group support would.
    #[must_use]
    pub fn ignoring_family_hints(mut self) -> Self {
        self.honor_families = false;
        self
    }

    /// Counter handle for this instance
    pub fn stats(&self) -> SourceStats {
        self.stats.clone()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cursor holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn family_admitted(&self, family: &[u8]) -> bool {
        if !self.honor_families {
            return true;
        }
        self.families.contains(family) == self.families_inclusive
    }

    /// First admitted entry at or after `lower` and inside the range.
    fn position(&mut self, lower: Bound<Key>) {
        let mut found = None;
        for (key, value) in self.entries.range((lower, Bound::Unbounded)) {
            if self.range.after_end_key(key) {
                break;
            }
            if self.range.before_start_key(key) || !self.family_admitted(&key.family) {
                continue;
            }
            found = Some((key.clone(), value.clone()));
            break;
        }
        self.top = found;
    }
}

impl SortedCursor for MemoryCursor {
    fn seek(
        &mut self,
        range: &Range,
        families: &BTreeSet<Vec<u8>>,
        inclusive: bool,
    ) -> CursorResult<()> {
        self.stats.seeks.fetch_add(1, Ordering::Relaxed);
        self.range = range.clone();
        self.families = families.clone();
        self.families_inclusive = inclusive;

        let lower = match range.start_key() {
            None => Bound::Unbounded,
            Some(start) if range.is_start_inclusive() => Bound::Included(start.clone()),
            Some(start) => Bound::Excluded(start.clone()),
        };
        self.position(lower);
        Ok(())
    }

    fn has_top(&self) -> bool {
        self.top.is_some()
    }

    fn top_key(&self) -> Option<&Key> {
        self.top.as_ref().map(|(key, _)| key)
    }

    fn top_value(&self) -> Option<&[u8]> {
        self.top.as_ref().map(|(_, value)| value.as_slice())
    }

    fn next(&mut self) -> CursorResult<()> {
        self.stats.nexts.fetch_add(1, Ordering::Relaxed);
        if let Some((key, _)) = self.top.take() {
            self.position(Bound::Excluded(key));
        }
        Ok(())
    }

    fn deep_copy(&self, _env: &CursorEnv) -> Box<dyn SortedCursor> {
        Box::new(Self {
            entries: Arc::clone(&self.entries),
            honor_families: self.honor_families,
            range: Range::all(),
            families: BTreeSet::new(),
            families_inclusive: false,
            top: None,
            stats: SourceStats::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::{drain, scan};

    fn entry(row: &str, family: &str, qualifier: &str) -> (Key, Value) {
        (Key::new(row, family, qualifier).with_timestamp(1), b"v".to_vec())
    }

    fn sample() -> MemoryCursor {
        MemoryCursor::new(vec![
            entry("r1", "d", "x"),
            entry("r1", "fi\0A", "a\0t\0u1"),
            entry("r1", "fi\0B", "b\0t\0u1"),
            entry("r2", "fi\0A", "a\0t\0u2"),
        ])
    }

    #[test]
    fn test_scan_all_in_order() {
        let mut cursor = sample();
        let entries = scan(&mut cursor, &Range::all()).unwrap();
        assert_eq!(entries.len(), 4);
        for pair in entries.windows(2) {
            assert!(pair[0].0 < pair[1].0);
        }
    }

    #[test]
    fn test_range_bounds_respected() {
        let mut cursor = sample();
        let entries = scan(&mut cursor, &Range::exact_row("r2")).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0.row, b"r2".to_vec());
    }

    #[test]
    fn test_inclusive_family_filter() {
        let mut cursor = sample();
        let families: BTreeSet<Vec<u8>> = [b"fi\0A".to_vec()].into_iter().collect();
        cursor.seek(&Range::all(), &families, true).unwrap();
        let entries = drain(&mut cursor).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|(k, _)| k.family == b"fi\0A".to_vec()));
    }

    #[test]
    fn test_exclusive_family_filter() {
        let mut cursor = sample();
        let families: BTreeSet<Vec<u8>> = [b"d".to_vec()].into_iter().collect();
        cursor.seek(&Range::all(), &families, false).unwrap();
        assert_eq!(drain(&mut cursor).unwrap().len(), 3);
    }

    #[test]
    fn test_family_hints_ignored() {
        let mut cursor = sample().ignoring_family_hints();
        let families: BTreeSet<Vec<u8>> = [b"fi\0A".to_vec()].into_iter().collect();
        cursor.seek(&Range::all(), &families, true).unwrap();
        assert_eq!(drain(&mut cursor).unwrap().len(), 4);
    }

    #[test]
    fn test_stats_count_calls() {
        let mut cursor = sample();
        let stats = cursor.stats();
        scan(&mut cursor, &Range::all()).unwrap();
        assert_eq!(stats.seeks(), 1);
        assert_eq!(stats.nexts(), 4);
    }

    #[test]
    fn test_deep_copy_is_independent() {
        let mut original = sample();
        let stats = original.stats();
        original.seek(&Range::all(), &BTreeSet::new(), false).unwrap();
        original.next().unwrap();

        let mut copy = original.deep_copy(&CursorEnv::default());
        assert!(!copy.has_top());
        assert_eq!(scan(copy.as_mut(), &Range::all()).unwrap().len(), 4);

        // original untouched by the copy's scan
        assert_eq!(stats.nexts(), 1);
        assert_eq!(original.top_key().unwrap().family, b"fi\0A".to_vec());
    }
}
