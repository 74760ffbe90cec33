//! First/last-seen cursor

use std::collections::{BTreeMap, BTreeSet};

use crate::cursor::{CursorEnv, CursorError, CursorResult, SortedCursor};
use crate::data::{Key, Range, Value};
use crate::observability::{Logger, MetricsSnapshot, ScanMetrics, Severity};

use super::config::FirstLastSeenConfig;

/// Suffix of every synthesized qualifier: U+10FFFF, the largest code point,
/// so `date + END_MARKER` sorts after every real entry of that date.
pub const END_MARKER: &str = "\u{10FFFF}";

/// Width of the `yyyyMMdd` prefix of every qualifier
pub const DATE_WIDTH: usize = 8;

/// Dates of one group
#[derive(Debug)]
struct DateGroup {
    row: Vec<u8>,
    family: Vec<u8>,
    first: Vec<u8>,
    last: Vec<u8>,
}

impl DateGroup {
    fn open(key: &Key) -> CursorResult<Self> {
        let date = date_prefix(key)?.to_vec();
        Ok(Self {
            row: key.row.clone(),
            family: key.family.clone(),
            first: date.clone(),
            last: date,
        })
    }

    fn contains(&self, key: &Key) -> bool {
        key.row == self.row && key.family == self.family
    }

    fn observe(&mut self, key: &Key) -> CursorResult<()> {
        let date = date_prefix(key)?;
        if date < self.first.as_slice() {
            self.first = date.to_vec();
        }
        if date > self.last.as_slice() {
            self.last = date.to_vec();
        }
        Ok(())
    }

    fn into_entry(self) -> (Key, Value) {
        let mut qualifier = self.last.clone();
        qualifier.extend_from_slice(END_MARKER.as_bytes());

        let mut value = self.first;
        value.push(b',');
        value.extend_from_slice(&self.last);

        (Key::new(self.row, self.family, qualifier), value)
    }
}

fn date_prefix(key: &Key) -> CursorResult<&[u8]> {
    key.qualifier
        .get(..DATE_WIDTH)
        .ok_or_else(|| CursorError::malformed_entry(key, "qualifier shorter than its date prefix"))
}

/// Emits the first and last date seen per `(row, family)`, or once for the
/// whole range.
///
/// Result: `row : family : last + END_MARKER -> "first,last"`.
pub struct FirstLastSeenCursor {
    source: Box<dyn SortedCursor>,
    config: FirstLastSeenConfig,
    top: Option<(Key, Value)>,
    metrics: ScanMetrics,
}

impl FirstLastSeenCursor {
    pub fn new(source: Box<dyn SortedCursor>, config: FirstLastSeenConfig) -> Self {
        Self {
            source,
            config,
            top: None,
            metrics: ScanMetrics::new(),
        }
    }

    /// Validate the flat option map and wrap `source`.
    pub fn from_options(
        source: Box<dyn SortedCursor>,
        options: &BTreeMap<String, String>,
    ) -> CursorResult<Self> {
        Ok(Self::new(source, FirstLastSeenConfig::from_options(options)?))
    }

    pub fn config(&self) -> &FirstLastSeenConfig {
        &self.config
    }

    /// Counters of this instance
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Scan one group. The entry that ends a `(row, family)` group stays on
    /// the source and opens the next group.
    fn find_top(&mut self) -> CursorResult<()> {
        self.top = None;
        let mut group: Option<DateGroup> = None;

        while let Some(key) = self.source.top_key() {
            self.metrics.increment_examined();
            match group.as_mut() {
                None => group = Some(DateGroup::open(key)?),
                Some(current) => {
                    if self.config.per_row_family && !current.contains(key) {
                        break;
                    }
                    current.observe(key)?;
                }
            }
            self.source.next()?;
            self.metrics.increment_consumed();
        }

        if let Some(group) = group {
            let entry = group.into_entry();
            if Logger::enabled(Severity::Trace) {
                let key = entry.0.to_string();
                let value = String::from_utf8_lossy(&entry.1).into_owned();
                Logger::trace(
                    "FIRST_LAST_GROUP_FINALIZED",
                    &[("key", key.as_str()), ("value", value.as_str())],
                );
            }
            self.metrics.add_results(1);
            self.top = Some(entry);
        }
        Ok(())
    }
}

impl SortedCursor for FirstLastSeenCursor {
    fn seek(
        &mut self,
        range: &Range,
        families: &BTreeSet<Vec<u8>>,
        inclusive: bool,
    ) -> CursorResult<()> {
        self.metrics.increment_seeks();
        self.source.seek(range, families, inclusive)?;
        self.find_top()
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
        self.find_top()
    }

    fn deep_copy(&self, env: &CursorEnv) -> Box<dyn SortedCursor> {
        Box::new(Self::new(self.source.deep_copy(env), self.config))
    }
}
