//! Field-index counting cursor

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::ops::Bound;
use std::sync::Arc;

use crate::cursor::{CursorEnv, CursorError, CursorResult, SortedCursor};
use crate::data::{Key, PartialKey, Range, Value};
use crate::observability::{Logger, MetricsSnapshot, ScanMetrics, Severity};
use crate::visibility::{ConjunctiveCombiner, LabelCombiner};

use super::config::FieldIndexCountConfig;
use super::group::CountGroup;
use super::qualifier::{
    field_index_family, field_name, is_field_index_family, parse_qualifier, FIELD_INDEX_PREFIX,
};

/// Byte appended to a returned qualifier to resume strictly after its group.
const RESUME_SENTINEL: u8 = 0x01;

/// Counts field-index entries per `(row, field name, value[, data type])`.
///
/// Wraps a source cursor positioned over a shard's keyspace and emits one
/// synthesized entry per non-empty group:
///
/// ```text
/// row : field name : value[\0type] [combined label] max ts -> count
/// ```
///
/// Excluded field names, values and data types are passed over with
/// targeted re-seeks of the source, never entry by entry.
pub struct FieldIndexCountingCursor {
    source: Box<dyn SortedCursor>,
    config: FieldIndexCountConfig,
    combiner: Arc<dyn LabelCombiner>,
    seek_families: BTreeSet<Vec<u8>>,
    /// Range still to scan; its start moves forward with every re-seek
    parent_range: Range,
    /// Set when a re-seek target falls past the end of `parent_range`
    exhausted: bool,
    group: Option<CountGroup>,
    /// Results of the last finalized group not yet handed out
    pending: VecDeque<(Key, Value)>,
    /// Per-visibility resume: results at or before this key were returned
    resume_after: Option<Key>,
    metrics: ScanMetrics,
}

impl FieldIndexCountingCursor {
    /// Wrap `source` with an explicit label combiner.
    pub fn new(
        source: Box<dyn SortedCursor>,
        config: FieldIndexCountConfig,
        combiner: Arc<dyn LabelCombiner>,
    ) -> Self {
        let seek_families = config.seek_families();
        if Logger::enabled(Severity::Trace) {
            for family in &seek_families {
                let family = crate::data::escape_bytes(family);
                Logger::trace("FI_COUNT_SEEK_FAMILY", &[("family", family.as_str())]);
            }
        }
        Self {
            source,
            config,
            combiner,
            seek_families,
            parent_range: Range::all(),
            exhausted: false,
            group: None,
            pending: VecDeque::new(),
            resume_after: None,
            metrics: ScanMetrics::new(),
        }
    }

    /// Wrap `source` combining labels by conjunction.
    pub fn with_default_combiner(source: Box<dyn SortedCursor>, config: FieldIndexCountConfig) -> Self {
        Self::new(source, config, Arc::new(ConjunctiveCombiner))
    }

    /// Validate the flat option map and wrap `source`.
    pub fn from_options(
        source: Box<dyn SortedCursor>,
        options: &BTreeMap<String, String>,
    ) -> CursorResult<Self> {
        let config = FieldIndexCountConfig::from_options(options)?;
        Ok(Self::with_default_combiner(source, config))
    }

    pub fn config(&self) -> &FieldIndexCountConfig {
        &self.config
    }

    /// Counters of this instance
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    fn reset(&mut self) {
        self.exhausted = false;
        self.group = None;
        self.pending.clear();
        self.resume_after = None;
    }

    fn seek_source(&mut self) -> CursorResult<()> {
        self.metrics.increment_seeks();
        if Logger::enabled(Severity::Trace) {
            let range = self.parent_range.to_string();
            Logger::trace("FI_COUNT_SOURCE_SEEK", &[("range", range.as_str())]);
        }
        self.source.seek(
            &self.parent_range,
            &self.seek_families,
            !self.seek_families.is_empty(),
        )
    }

    /// Source top, if any and still inside the bound range. A top before
    /// the start of the range went backwards: the source was seeked there.
    fn source_top_in_range(&self) -> CursorResult<Option<Key>> {
        if self.exhausted {
            return Ok(None);
        }
        let Some(key) = self.source.top_key() else {
            return Ok(None);
        };
        if self.parent_range.before_start_key(key) {
            return Err(self.source_behind(key.clone()));
        }
        if self.parent_range.after_end_key(key) {
            return Ok(None);
        }
        Ok(Some(key.clone()))
    }

    /// Targeted skip: move the range start to `target` and re-seek, or park
    /// the cursor when `target` lies past the end of the range.
    fn reseek(&mut self, target: Key) -> CursorResult<()> {
        self.metrics.increment_skips();
        if Logger::enabled(Severity::Trace) {
            let target = target.to_string();
            Logger::trace("FI_COUNT_SKIP", &[("target", target.as_str())]);
        }
        if self.parent_range.contains(&target) {
            self.parent_range = self.parent_range.starting_at(target);
            self.seek_source()
        } else {
            self.exhausted = true;
            Ok(())
        }
    }

    /// Nothing left to scan: `start` lies past the end of the range.
    fn park(&mut self, start: &Key) {
        if Logger::enabled(Severity::Trace) {
            let start = start.to_string();
            Logger::trace("FI_COUNT_START_OUTSIDE_RANGE", &[("start", start.as_str())]);
        }
        self.exhausted = true;
    }

    fn first_field_family(&self) -> Vec<u8> {
        match self.config.field_names.as_ref().and_then(|names| names.first()) {
            Some(name) => field_index_family(name),
            None => FIELD_INDEX_PREFIX.to_vec(),
        }
    }

    /// Smallest key of `row` that can hold a counted entry.
    fn first_candidate_key(&self, row: &[u8]) -> Key {
        let mut qualifier = Vec::new();
        if let Some(value) = self.config.field_values.as_ref().and_then(|v| v.first()) {
            qualifier.extend_from_slice(value);
            if let Some(data_type) = self.config.data_types.as_ref().and_then(|t| t.first()) {
                qualifier.push(0);
                qualifier.extend_from_slice(data_type);
            }
        }
        Key::new(row, self.first_field_family(), qualifier)
    }

    /// Start key of an interrupted scan, mapped back into the field-index
    /// keyspace. `None` unless the start is exclusive and carries both a
    /// family and a qualifier.
    fn resume_anchor(&mut self, range: &Range) -> Option<Key> {
        let start = range.start_key()?;
        if range.is_start_inclusive() || is_blank(&start.family) || is_blank(&start.qualifier) {
            return None;
        }

        let family = if is_field_index_family(&start.family) {
            start.family.clone()
        } else {
            field_index_family(&start.family)
        };

        let mut qualifier = start.qualifier.clone();
        if self.config.per_visibility {
            // regroup the whole value and drop what was already returned
            self.resume_after = Some(start.clone());
        } else {
            qualifier.push(RESUME_SENTINEL);
        }
        Some(Key::new(start.row.clone(), family, qualifier))
    }

    /// Skip non field-index families: earlier ones to the first field
    /// family of the row, later ones to the next row.
    fn advance_to_field_index(&mut self) -> CursorResult<()> {
        while let Some(key) = self.source_top_in_range()? {
            if is_field_index_family(&key.family) {
                break;
            }
            let target = if key.family.as_slice() > FIELD_INDEX_PREFIX {
                key.following_key(PartialKey::Row)
            } else {
                Key::new(key.row.clone(), self.first_field_family(), Vec::new())
            };
            self.reseek(target)?;
        }
        Ok(())
    }

    /// Next allow-listed field family of the row, or the next row.
    fn advance_to_next_field_name(&mut self, key: &Key, name: &[u8]) -> CursorResult<()> {
        let target = match self.config.field_names.as_ref().and_then(|n| higher(n, name)) {
            Some(next) => Key::new(key.row.clone(), field_index_family(next), Vec::new()),
            None => key.following_key(PartialKey::Row),
        };
        self.reseek(target)
    }

    /// Next allow-listed value of the field, or the next field family.
    fn advance_to_next_field_value(&mut self, key: &Key, value: &[u8]) -> CursorResult<()> {
        let next = self.config.field_values.as_ref().and_then(|v| higher(v, value));
        let target = match next {
            Some(next) => {
                let mut qualifier = next.clone();
                if let Some(data_type) = self.config.data_types.as_ref().and_then(|t| t.first()) {
                    qualifier.push(0);
                    qualifier.extend_from_slice(data_type);
                }
                Key::new(key.row.clone(), key.family.clone(), qualifier)
            }
            None => key.following_key(PartialKey::RowFamily),
        };
        self.reseek(target)
    }

    /// Next allow-listed data type of the value, or past the value.
    fn advance_to_next_data_type(&mut self, key: &Key, value: &[u8], data_type: &[u8]) -> CursorResult<()> {
        let mut qualifier = value.to_vec();
        match self.config.data_types.as_ref().and_then(|t| higher(t, data_type)) {
            Some(next) => {
                qualifier.push(0);
                qualifier.extend_from_slice(next);
            }
            None => qualifier.push(RESUME_SENTINEL),
        }
        self.reseek(Key::new(key.row.clone(), key.family.clone(), qualifier))
    }

    /// Finalize the current group. Returns whether results were queued.
    fn wrap_up(&mut self) -> CursorResult<bool> {
        let Some(group) = self.group.take() else {
            return Ok(false);
        };

        if Logger::enabled(Severity::Trace) {
            let description = group.describe();
            let count = group.count().to_string();
            Logger::trace(
                "FI_COUNT_GROUP_FINALIZED",
                &[("group", description.as_str()), ("count", count.as_str())],
            );
        }

        if group.count() == 0 {
            self.metrics.increment_empty_groups();
            return Ok(false);
        }

        let results = match group.into_results(self.combiner.as_ref(), self.config.per_visibility) {
            Ok(results) => results,
            Err(err) => {
                let message = err.to_string();
                Logger::error(
                    "FI_COUNT_LABEL_COMBINATION_FAILED",
                    &[("code", err.code()), ("error", message.as_str())],
                );
                return Err(err);
            }
        };

        let resume_after = self.resume_after.take();
        let before = self.pending.len();
        self.pending.extend(
            results
                .into_iter()
                .filter(|(key, _)| resume_after.as_ref().map_or(true, |after| key > after)),
        );
        let queued = (self.pending.len() - before) as u64;
        self.metrics.add_results(queued);
        Ok(queued > 0)
    }

    fn source_behind(&self, key: Key) -> CursorError {
        let group = self
            .group
            .as_ref()
            .map(CountGroup::describe)
            .unwrap_or_else(|| self.parent_range.to_string());
        let source_key = key.to_string();
        Logger::fatal(
            "FI_COUNT_SOURCE_BEHIND",
            &[("group", group.as_str()), ("source_key", source_key.as_str())],
        );
        CursorError::SourceBehind {
            group,
            source_key: key,
        }
    }

    /// Scan until the next non-empty group is finalized or the range ends.
    fn find_top(&mut self) -> CursorResult<()> {
        self.group = None;

        loop {
            let Some(key) = self.source_top_in_range()? else {
                self.wrap_up()?;
                return Ok(());
            };
            self.metrics.increment_examined();
            if Logger::enabled(Severity::Trace) {
                let examined = key.to_string();
                Logger::trace("FI_COUNT_EXAMINE", &[("key", examined.as_str())]);
            }

            if let Some(group) = &self.group {
                match key.row.as_slice().cmp(group.row()) {
                    std::cmp::Ordering::Less => return Err(self.source_behind(key)),
                    std::cmp::Ordering::Greater => {
                        if self.wrap_up()? {
                            return Ok(());
                        }
                        continue;
                    }
                    std::cmp::Ordering::Equal => {}
                }
            }

            // Only reached when the source ignores the family hint
            let Some(name) = field_name(&key.family) else {
                if self.wrap_up()? {
                    return Ok(());
                }
                self.advance_to_field_index()?;
                continue;
            };

            if let Some(group) = &self.group {
                match key.family.as_slice().cmp(group.family()) {
                    std::cmp::Ordering::Less => return Err(self.source_behind(key)),
                    std::cmp::Ordering::Greater => {
                        if self.wrap_up()? {
                            return Ok(());
                        }
                        continue;
                    }
                    std::cmp::Ordering::Equal => {}
                }
            }

            if let Some(names) = &self.config.field_names {
                if !names.contains(name) {
                    let name = name.to_vec();
                    self.advance_to_next_field_name(&key, &name)?;
                    continue;
                }
            }

            let parsed = parse_qualifier(&key.qualifier)
                .ok_or_else(|| CursorError::malformed_entry(&key, "field-index qualifier lacks two null separators"))?;

            if let Some(values) = &self.config.field_values {
                if !values.contains(parsed.value) {
                    self.advance_to_next_field_value(&key, parsed.value)?;
                    continue;
                }
            }

            if self.group.as_ref().is_some_and(|g| g.value() != parsed.value) {
                if self.wrap_up()? {
                    return Ok(());
                }
                continue;
            }

            match self.type_step(parsed.data_type) {
                TypeStep::Accept => {}
                TypeStep::Boundary => {
                    if self.wrap_up()? {
                        return Ok(());
                    }
                    continue;
                }
                TypeStep::Skip => {
                    self.advance_to_next_data_type(&key, parsed.value, parsed.data_type)?;
                    continue;
                }
            }

            let accepted = !key.deleted && self.config.window.contains(key.timestamp);
            let data_type = self.config.per_data_type.then_some(parsed.data_type);
            let group = self
                .group
                .get_or_insert_with(|| CountGroup::open(&key, parsed.value, data_type));
            if accepted {
                group.consume(&key);
            }

            self.source.next()?;
            self.metrics.increment_consumed();
        }
    }

    /// Classify an entry's data type against the current group (same value).
    fn type_step(&self, data_type: &[u8]) -> TypeStep {
        let allowed = self
            .config
            .data_types
            .as_ref()
            .map_or(true, |types| types.contains(data_type));

        if !self.config.per_data_type {
            return if allowed { TypeStep::Accept } else { TypeStep::Skip };
        }

        match self.group.as_ref().and_then(CountGroup::data_type) {
            Some(current) if current == data_type => TypeStep::Accept,
            Some(_) => TypeStep::Boundary,
            None if allowed => TypeStep::Accept,
            None => TypeStep::Skip,
        }
    }
}

/// Outcome of the data-type check
enum TypeStep {
    /// Entry belongs to the current (or a new) group
    Accept,
    /// A new data type closes the current group
    Boundary,
    /// Excluded data type; re-seek past it
    Skip,
}

/// Smallest member of `set` strictly greater than `item`.
fn higher<'a>(set: &'a BTreeSet<Vec<u8>>, item: &[u8]) -> Option<&'a Vec<u8>> {
    set.range::<[u8], _>((Bound::Excluded(item), Bound::Unbounded)).next()
}

/// Empty or whitespace-only
fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(|b| *b <= b' ')
}

impl SortedCursor for FieldIndexCountingCursor {
    /// Position on the first non-empty group at or after the start of
    /// `range`. The family arguments are ignored: the cursor always restricts
    /// the source to its own field families.
    fn seek(
        &mut self,
        range: &Range,
        _families: &BTreeSet<Vec<u8>>,
        _inclusive: bool,
    ) -> CursorResult<()> {
        self.reset();
        self.parent_range = range.clone();

        let unanchored = range.start_key().map_or(true, |start| is_blank(&start.row));
        if unanchored {
            // probe for the first row, then start at its first field family
            self.seek_source()?;
            let Some(row) = self.source.top_key().map(|key| key.row.clone()) else {
                return Ok(());
            };
            let candidate = self.first_candidate_key(&row);
            if range.after_end_key(&candidate) {
                self.park(&candidate);
                return Ok(());
            }
            if range.contains(&candidate) {
                self.parent_range = range.starting_at(candidate);
            }
        } else if let Some(anchor) = self.resume_anchor(range) {
            // the anchor may sort before an exclusive start carrying a bare
            // field name, so it replaces the start unconditionally
            if range.after_end_key(&anchor) {
                self.park(&anchor);
                return Ok(());
            }
            self.parent_range = range.starting_at(anchor);
        }

        self.seek_source()?;
        if self.config.field_names.is_none() {
            self.advance_to_field_index()?;
        }
        self.find_top()
    }

    fn has_top(&self) -> bool {
        !self.pending.is_empty()
    }

    fn top_key(&self) -> Option<&Key> {
        self.pending.front().map(|(key, _)| key)
    }

    fn top_value(&self) -> Option<&[u8]> {
        self.pending.front().map(|(_, value)| value.as_slice())
    }

    fn next(&mut self) -> CursorResult<()> {
        self.pending.pop_front();
        if self.pending.is_empty() {
            self.find_top()?;
        }
        Ok(())
    }

    fn deep_copy(&self, env: &CursorEnv) -> Box<dyn SortedCursor> {
        Box::new(Self {
            source: self.source.deep_copy(env),
            config: self.config.clone(),
            combiner: Arc::clone(&self.combiner),
            seek_families: self.seek_families.clone(),
            parent_range: self.parent_range.clone(),
            exhausted: false,
            group: None,
            pending: VecDeque::new(),
            resume_after: None,
            metrics: ScanMetrics::new(),
        })
    }
}
