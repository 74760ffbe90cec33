//! JSON form of an entry
//!
//! Used by the CLI for input/output and by fixtures. Byte fields travel as
//! JSON strings; `\u0000` carries the separators of field-index keys.

use serde::{Deserialize, Serialize};

use super::key::{Key, Value};

/// One entry as a flat JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRecord {
    pub row: String,
    #[serde(default)]
    pub family: String,
    #[serde(default)]
    pub qualifier: String,
    #[serde(default)]
    pub visibility: String,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub value: String,
}

impl EntryRecord {
    /// Convert into a key/value pair
    pub fn into_entry(self) -> (Key, Value) {
        let key = Key::new(self.row, self.family, self.qualifier)
            .with_visibility(self.visibility)
            .with_timestamp(self.timestamp)
            .with_deleted(self.deleted);
        (key, self.value.into_bytes())
    }

    /// Build from a key/value pair; non-UTF-8 bytes are replaced.
    pub fn from_entry(key: &Key, value: &[u8]) -> Self {
        Self {
            row: String::from_utf8_lossy(&key.row).into_owned(),
            family: String::from_utf8_lossy(&key.family).into_owned(),
            qualifier: String::from_utf8_lossy(&key.qualifier).into_owned(),
            visibility: String::from_utf8_lossy(&key.visibility).into_owned(),
            timestamp: key.timestamp,
            deleted: key.deleted,
            value: String::from_utf8_lossy(value).into_owned(),
        }
    }
}
