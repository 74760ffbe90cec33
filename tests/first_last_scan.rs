//! First/Last-Seen Scan Tests
//!
//! Tests for first/last cursor behavior:
//! - One result per (row, family), or one for the whole range
//! - first <= last for every result
//! - Synthesized qualifiers sort after every real entry of their date

use shardscan::cursor::{scan, CursorEnv, MemoryCursor, SortedCursor};
use shardscan::data::{Key, Range, Value};
use shardscan::first_last::{FirstLastSeenConfig, FirstLastSeenCursor, END_MARKER, PER_ROW_FAMILY};
use std::collections::BTreeMap;

// =============================================================================
// Helper Functions
// =============================================================================

fn dated(row: &str, family: &str, qualifier: &str) -> (Key, Value) {
    (
        Key::new(row, family, qualifier).with_timestamp(1),
        b"payload".to_vec(),
    )
}

fn first_last(entries: Vec<(Key, Value)>, config: FirstLastSeenConfig) -> Vec<(Key, String)> {
    let mut cursor = FirstLastSeenCursor::new(Box::new(MemoryCursor::new(entries)), config);
    scan(&mut cursor, &Range::all())
        .unwrap()
        .into_iter()
        .map(|(key, value)| (key, String::from_utf8(value).unwrap()))
        .collect()
}

fn split(value: &str) -> (&str, &str) {
    value.split_once(',').unwrap()
}

fn sample() -> Vec<(Key, Value)> {
    vec![
        dated("A", "F", "20210101_a"),
        dated("A", "F", "20210105_b"),
        dated("A", "F", "20210103_c"),
        dated("A", "G", "20191231_d"),
        dated("B", "F", "20200615_e"),
        dated("B", "F", "20200601_f"),
    ]
}

// =============================================================================
// Per Row/Family Tests
// =============================================================================

/// Dates of one (row, family) reduce to first and last.
#[test]
fn test_single_row_family() {
    let results = first_last(sample()[..3].to_vec(), FirstLastSeenConfig::default());

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].1, "20210101,20210105");
}

/// Every (row, family) produces its own result.
#[test]
fn test_result_per_row_family() {
    let results = first_last(sample(), FirstLastSeenConfig::default());
    let summary: Vec<(String, String, String)> = results
        .iter()
        .map(|(key, value)| {
            (
                String::from_utf8(key.row.clone()).unwrap(),
                String::from_utf8(key.family.clone()).unwrap(),
                value.clone(),
            )
        })
        .collect();

    assert_eq!(
        summary,
        vec![
            ("A".to_string(), "F".to_string(), "20210101,20210105".to_string()),
            ("A".to_string(), "G".to_string(), "20191231,20191231".to_string()),
            ("B".to_string(), "F".to_string(), "20200601,20200615".to_string()),
        ]
    );
}

/// first never exceeds last.
#[test]
fn test_first_not_after_last() {
    for (_, value) in first_last(sample(), FirstLastSeenConfig::default()) {
        let (first, last) = split(&value);
        assert!(first <= last, "{} > {}", first, last);
    }
}

/// The synthesized qualifier is the last date plus the end marker and
/// sorts after every real qualifier of that date.
#[test]
fn test_end_marker_sorts_last() {
    let results = first_last(sample()[..3].to_vec(), FirstLastSeenConfig::default());
    let key = &results[0].0;

    let mut expected = b"20210105".to_vec();
    expected.extend_from_slice(END_MARKER.as_bytes());
    assert_eq!(key.qualifier, expected);
    assert_eq!(key.timestamp, i64::MAX);

    for (entry, _) in sample() {
        if entry.qualifier.starts_with(b"20210105") {
            assert!(entry.qualifier < key.qualifier);
        }
    }
    assert!(b"20210105_\xEF\xBF\xBF".as_slice() < key.qualifier.as_slice());
}

// =============================================================================
// Whole Range Tests
// =============================================================================

/// Whole-range mode yields a single result for everything scanned.
#[test]
fn test_whole_range() {
    let results = first_last(sample(), FirstLastSeenConfig::whole_range());

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].1, "20191231,20210105");
    assert_eq!(results[0].0.row, b"A".to_vec());
}

/// Whole-range mode honors the scanned range.
#[test]
fn test_whole_range_restricted_to_row() {
    let mut cursor = FirstLastSeenCursor::new(
        Box::new(MemoryCursor::new(sample())),
        FirstLastSeenConfig::whole_range(),
    );
    let results = scan(&mut cursor, &Range::exact_row("B")).unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].1, b"20200601,20200615".to_vec());
}

// =============================================================================
// Edge Case Tests
// =============================================================================

/// No entries, no result.
#[test]
fn test_no_entries() {
    assert!(first_last(Vec::new(), FirstLastSeenConfig::default()).is_empty());
    assert!(first_last(Vec::new(), FirstLastSeenConfig::whole_range()).is_empty());
}

/// A qualifier too short to carry a date fails the scan.
#[test]
fn test_short_qualifier_fails() {
    let mut cursor = FirstLastSeenCursor::new(
        Box::new(MemoryCursor::new(vec![dated("A", "F", "2021")])),
        FirstLastSeenConfig::default(),
    );
    let err = scan(&mut cursor, &Range::all()).unwrap_err();
    assert_eq!(err.code(), "SCAN_MALFORMED_ENTRY");
}

/// Options select the grouping mode.
#[test]
fn test_from_options() {
    let options = BTreeMap::from([(PER_ROW_FAMILY.to_string(), "FALSE".to_string())]);
    let mut cursor =
        FirstLastSeenCursor::from_options(Box::new(MemoryCursor::new(sample())), &options).unwrap();
    assert!(!cursor.config().per_row_family);
    assert_eq!(scan(&mut cursor, &Range::all()).unwrap().len(), 1);

    let bad = BTreeMap::from([(PER_ROW_FAMILY.to_string(), "perhaps".to_string())]);
    let err = FirstLastSeenCursor::from_options(Box::new(MemoryCursor::new(sample())), &bad)
        .err()
        .unwrap();
    assert_eq!(err.code(), "SCAN_CONFIG_INVALID");
}

// =============================================================================
// Determinism Tests
// =============================================================================

/// A copy scans to the same output, and counters track the work.
#[test]
fn test_deep_copy_identical_output() {
    let mut original =
        FirstLastSeenCursor::new(Box::new(MemoryCursor::new(sample())), FirstLastSeenConfig::default());
    let mut copy = original.deep_copy(&CursorEnv::default());

    let first = scan(&mut original, &Range::all()).unwrap();
    let second = scan(copy.as_mut(), &Range::all()).unwrap();
    assert_eq!(first, second);

    let metrics = original.metrics();
    assert_eq!(metrics.results_emitted, 3);
    assert_eq!(metrics.entries_consumed, 6);
}
