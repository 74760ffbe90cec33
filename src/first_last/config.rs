//! First/last-seen configuration

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cursor::ConfigError;

pub const PER_ROW_FAMILY: &str = "FirstLastSeenIterator.PER_ROW_FAMILY";

/// Grouping of the first/last-seen cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FirstLastSeenConfig {
    /// One result per `(row, family)`; otherwise one for the whole range
    pub per_row_family: bool,
}

impl Default for FirstLastSeenConfig {
    fn default() -> Self {
        Self {
            per_row_family: true,
        }
    }
}

impl FirstLastSeenConfig {
    /// One result for everything the range covers
    pub fn whole_range() -> Self {
        Self {
            per_row_family: false,
        }
    }

    /// Parse the flat option map; absent keys keep their defaults.
    pub fn from_options(options: &BTreeMap<String, String>) -> Result<Self, ConfigError> {
        let per_row_family = match options.get(PER_ROW_FAMILY) {
            None => true,
            Some(raw) if raw.trim().eq_ignore_ascii_case("true") => true,
            Some(raw) if raw.trim().eq_ignore_ascii_case("false") => false,
            Some(raw) => {
                return Err(ConfigError::InvalidFlag {
                    option: PER_ROW_FAMILY,
                    value: raw.clone(),
                })
            }
        };
        Ok(Self { per_row_family })
    }

    pub fn to_options(&self) -> BTreeMap<String, String> {
        BTreeMap::from([(PER_ROW_FAMILY.to_string(), self.per_row_family.to_string())])
    }
}
