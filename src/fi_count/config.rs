//! Field-index counting configuration
//!
//! The engine hands cursor options over as a flat string map. They are
//! parsed once into [`FieldIndexCountConfig`]; a cursor is never built from
//! an unvalidated map.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

use crate::cursor::ConfigError;
use crate::observability::Logger;

use super::qualifier::field_index_family;

pub const START_TIME: &str = "FieldIndexCountingIterator.START_TIME";
pub const STOP_TIME: &str = "FieldIndexCountingIterator.STOP_TIME";
pub const START_TIME_INCLUSIVE: &str = "FieldIndexCountingIterator.startInclusive";
pub const STOP_TIME_INCLUSIVE: &str = "FieldIndexCountingIterator.endInclusive";
pub const FIELD_NAMES: &str = "FieldIndexCountingIterator.FIELD_NAMES";
pub const FIELD_VALUES: &str = "FieldIndexCountingIterator.FIELD_VALUES";
pub const DATA_TYPES: &str = "FieldIndexCountingIterator.DATA_TYPES";
pub const UNIQ_BY_DATA_TYPE: &str = "FieldIndexCountingIterator.UNIQ_BY_DATA_TYPE";
pub const UNIQ_BY_VISIBILITY: &str = "FieldIndexCountingIterator.UNIQ_BY_VISIBILITY";

/// List separator inside option values
pub const LIST_SEPARATOR: char = ',';

/// GMT, second resolution
pub const DATE_FORMAT: &str = "%Y%m%d%H%M%S";

/// 0001-01-01T00:00:00Z
const FIRST_FORMATTABLE_SECS: i64 = -62_135_596_800;

/// 9999-12-31T23:59:59Z
const LAST_FORMATTABLE_SECS: i64 = 253_402_300_799;

/// Accepted entry timestamps.
///
/// Bounds are given in seconds while entry timestamps are milliseconds: an
/// inclusive end accepts its whole second, an exclusive end stops one
/// millisecond before it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimestampWindow {
    start: DateTime<Utc>,
    start_inclusive: bool,
    end: DateTime<Utc>,
    end_inclusive: bool,
}

impl TimestampWindow {
    /// Build a window; fails when no millisecond would be accepted.
    pub fn new(
        start: DateTime<Utc>,
        start_inclusive: bool,
        end: DateTime<Utc>,
        end_inclusive: bool,
    ) -> Result<Self, ConfigError> {
        let window = Self {
            start,
            start_inclusive,
            end,
            end_inclusive,
        };
        if window.lower_millis() > window.upper_millis() {
            return Err(ConfigError::EmptyWindow {
                start: format_timestamp(&start),
                end: format_timestamp(&end),
            });
        }
        Ok(window)
    }

    /// Inclusive window from two `yyyyMMddHHmmss` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self, ConfigError> {
        Self::new(
            parse_timestamp(START_TIME, start)?,
            true,
            parse_timestamp(STOP_TIME, end)?,
            true,
        )
    }

    /// Widest window `yyyyMMddHHmmss` can express: years 0001 through 9999.
    pub fn unbounded() -> Self {
        Self {
            start: DateTime::from_timestamp(FIRST_FORMATTABLE_SECS, 0)
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
            start_inclusive: true,
            end: DateTime::from_timestamp(LAST_FORMATTABLE_SECS, 0)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
            end_inclusive: true,
        }
    }

    /// Smallest accepted timestamp (ms)
    pub fn lower_millis(&self) -> i64 {
        let start = self.start.timestamp_millis();
        if self.start_inclusive {
            start
        } else {
            start.saturating_add(1)
        }
    }

    /// Largest accepted timestamp (ms)
    pub fn upper_millis(&self) -> i64 {
        let end = self.end.timestamp_millis().saturating_add(999);
        if self.end_inclusive {
            end
        } else {
            end.saturating_sub(1000)
        }
    }

    /// Whether an entry timestamp falls in the window
    pub fn contains(&self, timestamp: i64) -> bool {
        self.lower_millis() <= timestamp && timestamp <= self.upper_millis()
    }

    pub fn start(&self) -> &DateTime<Utc> {
        &self.start
    }

    pub fn end(&self) -> &DateTime<Utc> {
        &self.end
    }

    pub fn is_start_inclusive(&self) -> bool {
        self.start_inclusive
    }

    pub fn is_end_inclusive(&self) -> bool {
        self.end_inclusive
    }
}

/// Validated configuration of the field-index counting cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIndexCountConfig {
    pub window: TimestampWindow,
    /// Allow-listed field names, `None` for every field
    pub field_names: Option<BTreeSet<Vec<u8>>>,
    /// Allow-listed field values, `None` for every value
    pub field_values: Option<BTreeSet<Vec<u8>>>,
    /// Allow-listed data types, `None` for every type
    pub data_types: Option<BTreeSet<Vec<u8>>>,
    /// One result per (value, data type) instead of per value
    pub per_data_type: bool,
    /// One result per distinct visibility label instead of a combined one
    pub per_visibility: bool,
}

impl FieldIndexCountConfig {
    /// Count every field-index entry inside `window`.
    pub fn new(window: TimestampWindow) -> Self {
        Self {
            window,
            field_names: None,
            field_values: None,
            data_types: None,
            per_data_type: false,
            per_visibility: false,
        }
    }

    /// Restrict to these field names; an empty list means every field.
    #[must_use]
    pub fn with_field_names<I, T>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Vec<u8>>,
    {
        self.field_names = non_empty(names);
        self
    }

    /// Restrict to these field values
    #[must_use]
    pub fn with_field_values<I, T>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Vec<u8>>,
    {
        self.field_values = non_empty(values);
        self
    }

    /// Restrict to these data types
    #[must_use]
    pub fn with_data_types<I, T>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Vec<u8>>,
    {
        self.data_types = non_empty(types);
        self
    }

    #[must_use]
    pub fn with_per_data_type(mut self, per_data_type: bool) -> Self {
        self.per_data_type = per_data_type;
        self
    }

    #[must_use]
    pub fn with_per_visibility(mut self, per_visibility: bool) -> Self {
        self.per_visibility = per_visibility;
        self
    }

    /// Parse the flat option map.
    ///
    /// START_TIME and STOP_TIME are required. Inclusivity flags default to
    /// `true`, the uniqueness flags to `false`. A missing field-name list
    /// is legal but logged.
    pub fn from_options(options: &BTreeMap<String, String>) -> Result<Self, ConfigError> {
        let result = Self::parse_options(options);
        if let Err(ref err) = result {
            let message = err.to_string();
            Logger::error("FI_COUNT_CONFIG_INVALID", &[("error", message.as_str())]);
        }
        result
    }

    fn parse_options(options: &BTreeMap<String, String>) -> Result<Self, ConfigError> {
        let start = required(options, START_TIME)?;
        let end = required(options, STOP_TIME)?;
        let window = TimestampWindow::new(
            parse_timestamp(START_TIME, start)?,
            parse_flag(options, START_TIME_INCLUSIVE, true)?,
            parse_timestamp(STOP_TIME, end)?,
            parse_flag(options, STOP_TIME_INCLUSIVE, true)?,
        )?;

        let field_names = match options.get(FIELD_NAMES) {
            None => {
                Logger::warn("FI_COUNT_FIELD_NAMES_MISSING", &[("option", FIELD_NAMES)]);
                None
            }
            Some(raw) => {
                let names = split_list(raw);
                if names.is_none() {
                    Logger::warn("FI_COUNT_FIELD_NAMES_EMPTY", &[("option", FIELD_NAMES)]);
                }
                names
            }
        };

        Ok(Self {
            window,
            field_names,
            field_values: optional_list(options, FIELD_VALUES),
            data_types: optional_list(options, DATA_TYPES),
            per_data_type: parse_flag(options, UNIQ_BY_DATA_TYPE, false)?,
            per_visibility: parse_flag(options, UNIQ_BY_VISIBILITY, false)?,
        })
    }

    /// Render back into the flat option map accepted by `from_options`.
    pub fn to_options(&self) -> BTreeMap<String, String> {
        let mut options = BTreeMap::new();
        options.insert(START_TIME.to_string(), format_timestamp(&self.window.start));
        options.insert(STOP_TIME.to_string(), format_timestamp(&self.window.end));
        options.insert(
            START_TIME_INCLUSIVE.to_string(),
            self.window.start_inclusive.to_string(),
        );
        options.insert(
            STOP_TIME_INCLUSIVE.to_string(),
            self.window.end_inclusive.to_string(),
        );
        for (option, list) in [
            (FIELD_NAMES, &self.field_names),
            (FIELD_VALUES, &self.field_values),
            (DATA_TYPES, &self.data_types),
        ] {
            if let Some(list) = list {
                options.insert(option.to_string(), join_list(list));
            }
        }
        options.insert(UNIQ_BY_DATA_TYPE.to_string(), self.per_data_type.to_string());
        options.insert(UNIQ_BY_VISIBILITY.to_string(), self.per_visibility.to_string());
        options
    }

    /// Every accepted option with a one-line description
    pub fn describe_options() -> BTreeMap<&'static str, &'static str> {
        BTreeMap::from([
            (START_TIME, "The GMT start time for the scan using the format yyyyMMddHHmmss"),
            (STOP_TIME, "The GMT stop time for the scan using the format yyyyMMddHHmmss"),
            (START_TIME_INCLUSIVE, "Boolean value denoting whether the start time is inclusive"),
            (STOP_TIME_INCLUSIVE, "Boolean value denoting whether the stop time is inclusive"),
            (FIELD_NAMES, "The (optional) field names to count separated by \",\""),
            (FIELD_VALUES, "The (optional) field values to count separated by \",\""),
            (DATA_TYPES, "The (optional) data types to filter by separated by \",\""),
            (UNIQ_BY_DATA_TYPE, "Boolean value denoting whether counts are kept per data type"),
            (UNIQ_BY_VISIBILITY, "Boolean value denoting whether counts are kept per visibility"),
        ])
    }

    /// Families handed to the source on every seek: `fi\0` + each field name.
    pub fn seek_families(&self) -> BTreeSet<Vec<u8>> {
        self.field_names
            .iter()
            .flatten()
            .map(|name| field_index_family(name))
            .collect()
    }
}

fn required<'a>(
    options: &'a BTreeMap<String, String>,
    option: &'static str,
) -> Result<&'a str, ConfigError> {
    options
        .get(option)
        .map(String::as_str)
        .ok_or(ConfigError::MissingOption { option })
}

fn parse_timestamp(option: &'static str, value: &str) -> Result<DateTime<Utc>, ConfigError> {
    NaiveDateTime::parse_from_str(value.trim(), DATE_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|source| ConfigError::InvalidTimestamp {
            option,
            value: value.to_string(),
            source,
        })
}

fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(DATE_FORMAT).to_string()
}

fn parse_flag(
    options: &BTreeMap<String, String>,
    option: &'static str,
    default: bool,
) -> Result<bool, ConfigError> {
    match options.get(option) {
        None => Ok(default),
        Some(raw) if raw.trim().eq_ignore_ascii_case("true") => Ok(true),
        Some(raw) if raw.trim().eq_ignore_ascii_case("false") => Ok(false),
        Some(raw) => Err(ConfigError::InvalidFlag {
            option,
            value: raw.clone(),
        }),
    }
}

/// Blank values count as absent.
fn optional_list(options: &BTreeMap<String, String>, option: &str) -> Option<BTreeSet<Vec<u8>>> {
    options
        .get(option)
        .filter(|raw| !raw.trim().is_empty())
        .and_then(|raw| split_list(raw))
}

/// Split on the list separator, dropping empty tokens; `None` if nothing remains.
fn split_list(raw: &str) -> Option<BTreeSet<Vec<u8>>> {
    non_empty(
        raw.split(LIST_SEPARATOR)
            .filter(|token| !token.is_empty())
            .map(str::as_bytes),
    )
}

fn join_list(list: &BTreeSet<Vec<u8>>) -> String {
    list.iter()
        .map(|item| String::from_utf8_lossy(item).into_owned())
        .collect::<Vec<_>>()
        .join(",")
}

fn non_empty<I, T>(items: I) -> Option<BTreeSet<Vec<u8>>>
where
    I: IntoIterator<Item = T>,
    T: Into<Vec<u8>>,
{
    let set: BTreeSet<Vec<u8>> = items.into_iter().map(Into::into).collect();
    (!set.is_empty()).then_some(set)
}
