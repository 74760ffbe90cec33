//! Field-index counting
//!
//! Answers "how many entries carry field F with value V" per shard row
//! without scanning the field index linearly. The cursor groups entries by
//! `(row, field name, field value[, data type])`, folds each group into one
//! count, and re-seeks its source past every excluded sub-range.
//!
//! # Invariants
//!
//! - One result per non-empty group; groups with a zero count are dropped
//! - Deleted entries and entries outside the timestamp window never count
//! - Results leave the cursor in key order
//! - A malformed field-index qualifier aborts the scan
//! - So does a source entry sorting behind the group or the range start
//!
//! # Resumption
//!
//! An exclusive start key carrying a family and a qualifier is read as "the
//! engine already returned this result". The scan continues strictly after
//! that group. This trigger mirrors how the storage engine re-seeks after an
//! interrupted scan and may need revisiting if that contract changes.

mod config;
mod cursor;
mod group;
mod qualifier;

pub use config::{
    FieldIndexCountConfig, TimestampWindow, DATA_TYPES, DATE_FORMAT, FIELD_NAMES, FIELD_VALUES,
    LIST_SEPARATOR, START_TIME, START_TIME_INCLUSIVE, STOP_TIME, STOP_TIME_INCLUSIVE,
    UNIQ_BY_DATA_TYPE, UNIQ_BY_VISIBILITY,
};
pub use cursor::FieldIndexCountingCursor;
pub use qualifier::{
    field_index_family, field_name, is_field_index_family, parse_qualifier, FieldIndexQualifier,
    FIELD_INDEX_PREFIX,
};
