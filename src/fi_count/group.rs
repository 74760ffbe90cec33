//! Running aggregate of one grouping key

use std::collections::BTreeMap;

use crate::cursor::{CursorError, CursorResult};
use crate::data::{escape_bytes, Key, Value};
use crate::visibility::LabelCombiner;

use super::qualifier::field_name;

/// Entries sharing `(row, field name, value[, data type])`.
///
/// Owned by the cursor for exactly one group and consumed by
/// [`CountGroup::into_results`].
#[derive(Debug)]
pub(crate) struct CountGroup {
    row: Vec<u8>,
    /// Full field-index family, `fi\0` included
    family: Vec<u8>,
    value: Vec<u8>,
    data_type: Option<Vec<u8>>,
    count: u64,
    max_timestamp: i64,
    /// label -> entries carrying it
    labels: BTreeMap<Vec<u8>, u64>,
}

impl CountGroup {
    pub(crate) fn open(key: &Key, value: &[u8], data_type: Option<&[u8]>) -> Self {
        Self {
            row: key.row.clone(),
            family: key.family.clone(),
            value: value.to_vec(),
            data_type: data_type.map(<[u8]>::to_vec),
            count: 0,
            max_timestamp: i64::MIN,
            labels: BTreeMap::new(),
        }
    }

    pub(crate) fn row(&self) -> &[u8] {
        &self.row
    }

    pub(crate) fn family(&self) -> &[u8] {
        &self.family
    }

    pub(crate) fn value(&self) -> &[u8] {
        &self.value
    }

    pub(crate) fn data_type(&self) -> Option<&[u8]> {
        self.data_type.as_deref()
    }

    pub(crate) fn count(&self) -> u64 {
        self.count
    }

    /// Fold an accepted entry into the aggregate.
    pub(crate) fn consume(&mut self, key: &Key) {
        self.count += 1;
        self.max_timestamp = self.max_timestamp.max(key.timestamp);
        *self.labels.entry(key.visibility.clone()).or_insert(0) += 1;
    }

    /// `row fi%00NAME:value[%00type]`
    pub(crate) fn describe(&self) -> String {
        format!(
            "{} {}:{}",
            escape_bytes(&self.row),
            escape_bytes(&self.family),
            escape_bytes(&self.output_qualifier())
        )
    }

    fn output_qualifier(&self) -> Vec<u8> {
        let mut qualifier = self.value.clone();
        if let Some(data_type) = &self.data_type {
            qualifier.push(0);
            qualifier.extend_from_slice(data_type);
        }
        qualifier
    }

    /// Synthesized entries, in key order.
    ///
    /// Aggregated mode yields one entry whose label combines every label of
    /// the group. Per-visibility mode yields one entry per distinct label with
    /// that label's count; all of them carry the group's max timestamp.
    pub(crate) fn into_results(
        self,
        combiner: &dyn LabelCombiner,
        per_visibility: bool,
    ) -> CursorResult<Vec<(Key, Value)>> {
        let name = field_name(&self.family).unwrap_or(&self.family).to_vec();
        let qualifier = self.output_qualifier();
        let base = Key::new(self.row.clone(), name, qualifier).with_timestamp(self.max_timestamp);

        if per_visibility {
            return Ok(self
                .labels
                .iter()
                .map(|(label, count)| {
                    (
                        base.clone().with_visibility(label.clone()),
                        count.to_string().into_bytes(),
                    )
                })
                .collect());
        }

        let labels: Vec<&[u8]> = self.labels.keys().map(Vec::as_slice).collect();
        let combined = combiner
            .combine(&labels)
            .map_err(|source| CursorError::LabelCombination {
                group: self.describe(),
                source,
            })?;
        Ok(vec![(
            base.with_visibility(combined),
            self.count.to_string().into_bytes(),
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visibility::ConjunctiveCombiner;

    fn fi_key(visibility: &str, timestamp: i64) -> Key {
        Key::new("r1", "fi\0COLOR", "red\0csv\0u")
            .with_visibility(visibility)
            .with_timestamp(timestamp)
    }

    #[test]
    fn test_aggregated_result() {
        let mut group = CountGroup::open(&fi_key("", 0), b"red", None);
        group.consume(&fi_key("A", 10));
        group.consume(&fi_key("B", 30));
        group.consume(&fi_key("A", 20));

        let results = group.into_results(&ConjunctiveCombiner, false).unwrap();
        assert_eq!(results.len(), 1);
        let (key, value) = &results[0];
        assert_eq!(key.row, b"r1".to_vec());
        assert_eq!(key.family, b"COLOR".to_vec());
        assert_eq!(key.qualifier, b"red".to_vec());
        assert_eq!(key.visibility, b"A&B".to_vec());
        assert_eq!(key.timestamp, 30);
        assert_eq!(value, b"3");
    }

    #[test]
    fn test_data_type_suffix() {
        let mut group = CountGroup::open(&fi_key("", 0), b"red", Some(b"csv"));
        group.consume(&fi_key("", 5));
        let results = group.into_results(&ConjunctiveCombiner, false).unwrap();
        assert_eq!(results[0].0.qualifier, b"red\0csv".to_vec());
    }

    #[test]
    fn test_negative_timestamps_kept() {
        let mut group = CountGroup::open(&fi_key("", 0), b"red", None);
        group.consume(&fi_key("", -50));
        group.consume(&fi_key("", -20));
        let results = group.into_results(&ConjunctiveCombiner, false).unwrap();
        assert_eq!(results[0].0.timestamp, -20);
    }

    #[test]
    fn test_per_visibility_results() {
        let mut group = CountGroup::open(&fi_key("", 0), b"red", None);
        group.consume(&fi_key("B", 1));
        group.consume(&fi_key("A", 7));
        group.consume(&fi_key("B", 3));

        let results = group.into_results(&ConjunctiveCombiner, true).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0.visibility, b"A".to_vec());
        assert_eq!(results[0].1, b"1");
        assert_eq!(results[1].0.visibility, b"B".to_vec());
        assert_eq!(results[1].1, b"2");
        assert!(results.iter().all(|(key, _)| key.timestamp == 7));
        assert!(results[0].0 < results[1].0);
    }

    #[test]
    fn test_malformed_label_fails_group() {
        let mut group = CountGroup::open(&fi_key("", 0), b"red", None);
        group.consume(&fi_key("A&", 1));
        let err = group.into_results(&ConjunctiveCombiner, false).unwrap_err();
        assert_eq!(err.code(), "SCAN_LABEL_COMBINATION_FAILED");
        assert!(err.to_string().contains("r1 fi%00COLOR:red"));
    }
}
