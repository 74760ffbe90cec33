//! Sorted keys and their prefix arithmetic

use std::cmp::Ordering;
use std::fmt;

/// Entry value; cursors treat it as opaque bytes.
pub type Value = Vec<u8>;

/// Key prefixes used to build "the key right after everything sharing this
/// prefix" when re-seeking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartialKey {
    /// Row only
    Row,
    /// Row and family
    RowFamily,
    /// Row, family and qualifier
    RowFamilyQualifier,
    /// Row, family, qualifier and visibility
    RowFamilyQualifierVisibility,
}

/// A key in the sorted store.
///
/// Ordering is total: row, family, qualifier and visibility compare as raw
/// bytes, timestamps compare newest first and a deleted key precedes a live
/// key at the same coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key {
    /// Group / shard identifier
    pub row: Vec<u8>,
    /// Column family
    pub family: Vec<u8>,
    /// Column qualifier
    pub qualifier: Vec<u8>,
    /// Visibility label expression
    pub visibility: Vec<u8>,
    /// Larger is newer
    pub timestamp: i64,
    /// Tombstone flag
    pub deleted: bool,
}

impl Key {
    /// Smallest key at `(row, family, qualifier)`: empty visibility, newest
    /// possible timestamp, not deleted.
    pub fn new(
        row: impl Into<Vec<u8>>,
        family: impl Into<Vec<u8>>,
        qualifier: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            row: row.into(),
            family: family.into(),
            qualifier: qualifier.into(),
            visibility: Vec::new(),
            timestamp: i64::MAX,
            deleted: false,
        }
    }

    /// Smallest key of a row
    pub fn for_row(row: impl Into<Vec<u8>>) -> Self {
        Self::new(row, Vec::new(), Vec::new())
    }

    /// Set the visibility label
    #[must_use]
    pub fn with_visibility(mut self, visibility: impl Into<Vec<u8>>) -> Self {
        self.visibility = visibility.into();
        self
    }

    /// Set the timestamp
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Mark the key as a tombstone
    #[must_use]
    pub fn with_deleted(mut self, deleted: bool) -> Self {
        self.deleted = deleted;
        self
    }

    /// Returns the smallest key that sorts after every key sharing this
    /// key's `part` prefix.
    pub fn following_key(&self, part: PartialKey) -> Key {
        match part {
            PartialKey::Row => Key::for_row(followed(&self.row)),
            PartialKey::RowFamily => Key::new(self.row.clone(), followed(&self.family), Vec::new()),
            PartialKey::RowFamilyQualifier => Key::new(
                self.row.clone(),
                self.family.clone(),
                followed(&self.qualifier),
            ),
            PartialKey::RowFamilyQualifierVisibility => {
                Key::new(self.row.clone(), self.family.clone(), self.qualifier.clone())
                    .with_visibility(followed(&self.visibility))
            }
        }
    }

    /// Whether both keys agree on the `part` prefix.
    pub fn same_prefix(&self, other: &Key, part: PartialKey) -> bool {
        let rows = self.row == other.row;
        match part {
            PartialKey::Row => rows,
            PartialKey::RowFamily => rows && self.family == other.family,
            PartialKey::RowFamilyQualifier => {
                rows && self.family == other.family && self.qualifier == other.qualifier
            }
            PartialKey::RowFamilyQualifierVisibility => {
                rows && self.family == other.family
                    && self.qualifier == other.qualifier
                    && self.visibility == other.visibility
            }
        }
    }
}

/// `bytes + 0x00`: the immediate successor of `bytes` in byte order.
fn followed(bytes: &[u8]) -> Vec<u8> {
    let mut next = Vec::with_capacity(bytes.len() + 1);
    next.extend_from_slice(bytes);
    next.push(0);
    next
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        self.row
            .cmp(&other.row)
            .then_with(|| self.family.cmp(&other.family))
            .then_with(|| self.qualifier.cmp(&other.qualifier))
            .then_with(|| self.visibility.cmp(&other.visibility))
            .then_with(|| other.timestamp.cmp(&self.timestamp))
            .then_with(|| other.deleted.cmp(&self.deleted))
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Render bytes for logs: printable ASCII as-is, everything else `%XX`.
pub(crate) fn escape_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        if b.is_ascii_graphic() || b == b' ' {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02x}", b));
        }
    }
    out
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}:{} [{}] {}",
            escape_bytes(&self.row),
            escape_bytes(&self.family),
            escape_bytes(&self.qualifier),
            escape_bytes(&self.visibility),
            self.timestamp
        )?;
        if self.deleted {
            write!(f, " (deleted)")?;
        }
        Ok(())
    }
}
