//! Scan counters
//!
//! - Counters only (no gauges, no histograms)
//! - Monotonic increase
//! - One registry per cursor instance; copies start at zero

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters of one aggregating cursor.
///
/// Uses Relaxed ordering; a cursor is driven by one thread at a time and
/// readers only need eventually-exact totals.
#[derive(Debug, Default)]
pub struct ScanMetrics {
    /// Seeks issued to the source, including targeted skips
    seeks_issued: AtomicU64,
    /// Source entries inspected by the scan loop
    entries_examined: AtomicU64,
    /// Source entries stepped over with `next`
    entries_consumed: AtomicU64,
    /// Re-seeks past excluded values, types or families
    targeted_skips: AtomicU64,
    /// Synthesized entries handed out
    results_emitted: AtomicU64,
    /// Groups finalized with nothing to emit
    empty_groups: AtomicU64,
}

impl ScanMetrics {
    /// Create a registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment seeks issued
    pub fn increment_seeks(&self) {
        self.seeks_issued.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment entries examined
    pub fn increment_examined(&self) {
        self.entries_examined.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment entries consumed
    pub fn increment_consumed(&self) {
        self.entries_consumed.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment targeted skips
    pub fn increment_skips(&self) {
        self.targeted_skips.fetch_add(1, Ordering::Relaxed);
    }

    /// Add emitted results
    pub fn add_results(&self, results: u64) {
        self.results_emitted.fetch_add(results, Ordering::Relaxed);
    }

    /// Increment empty groups dropped
    pub fn increment_empty_groups(&self) {
        self.empty_groups.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all counters as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            seeks_issued: self.seeks_issued.load(Ordering::Relaxed),
            entries_examined: self.entries_examined.load(Ordering::Relaxed),
            entries_consumed: self.entries_consumed.load(Ordering::Relaxed),
            targeted_skips: self.targeted_skips.load(Ordering::Relaxed),
            results_emitted: self.results_emitted.load(Ordering::Relaxed),
            empty_groups: self.empty_groups.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of scan counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MetricsSnapshot {
    pub seeks_issued: u64,
    pub entries_examined: u64,
    pub entries_consumed: u64,
    pub targeted_skips: u64,
    pub results_emitted: u64,
    pub empty_groups: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_has_zero_values() {
        assert_eq!(ScanMetrics::new().snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_increment_counters() {
        let metrics = ScanMetrics::new();

        metrics.increment_seeks();
        metrics.increment_seeks();
        metrics.increment_examined();
        metrics.increment_consumed();
        metrics.increment_skips();
        metrics.add_results(3);
        metrics.increment_empty_groups();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.seeks_issued, 2);
        assert_eq!(snapshot.entries_examined, 1);
        assert_eq!(snapshot.entries_consumed, 1);
        assert_eq!(snapshot.targeted_skips, 1);
        assert_eq!(snapshot.results_emitted, 3);
        assert_eq!(snapshot.empty_groups, 1);
    }

    #[test]
    fn test_snapshot_serializes() {
        let metrics = ScanMetrics::new();
        metrics.add_results(2);

        let json = serde_json::to_string(&metrics.snapshot()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["results_emitted"], 2);
        assert_eq!(parsed["seeks_issued"], 0);
    }

    #[test]
    fn test_monotonic_increase() {
        let metrics = ScanMetrics::new();

        let mut prev = metrics.snapshot().entries_examined;
        for _ in 0..10 {
            metrics.increment_examined();
            let current = metrics.snapshot().entries_examined;
            assert!(current > prev);
            prev = current;
        }
    }
}
