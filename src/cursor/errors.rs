//! Cursor error types
//!
//! Error codes:
//! - SCAN_CONFIG_INVALID (ERROR)
//! - SCAN_MALFORMED_ENTRY (FATAL)
//! - SCAN_SOURCE_BEHIND (FATAL)
//! - SCAN_LABEL_COMBINATION_FAILED (ERROR)
//! - SCAN_SOURCE_FAILED (ERROR)
//!
//! Nothing here is retried inside a cursor; the engine owns retry policy.

use std::fmt;

use thiserror::Error;

use crate::data::Key;
use crate::visibility::LabelError;

/// Severity levels for cursor errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The scan failed; the data is fine
    Error,
    /// Data or ordering invariant broken; results would be wrong
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Option map rejected at construction
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required option absent
    #[error("missing required option {option}")]
    MissingOption { option: &'static str },

    /// Timestamp not in `yyyyMMddHHmmss` (GMT)
    #[error("invalid timestamp for {option}: '{value}' ({source})")]
    InvalidTimestamp {
        option: &'static str,
        value: String,
        source: chrono::ParseError,
    },

    /// Boolean option not `true`/`false`
    #[error("invalid boolean for {option}: '{value}'")]
    InvalidFlag { option: &'static str, value: String },

    /// Start of the window after its end
    #[error("timestamp window is empty: {start} .. {end}")]
    EmptyWindow { start: String, end: String },
}

/// Result type for cursor operations
pub type CursorResult<T> = Result<T, CursorError>;

/// Cursor errors
#[derive(Debug, Error)]
pub enum CursorError {
    /// Cursor configuration rejected
    #[error("configuration rejected: {0}")]
    Config(#[from] ConfigError),

    /// Entry does not have the layout its keyspace promises
    #[error("malformed entry {key}: {reason}")]
    MalformedEntry { key: Key, reason: &'static str },

    /// Source returned a key that sorts behind the group being built
    #[error("source is positioned behind the cursor: building {group}, source at {source_key}")]
    SourceBehind { group: String, source_key: Key },

    /// Visibility labels of a group could not be combined; the group is dropped
    #[error("could not combine visibilities for {group}: {source}")]
    LabelCombination { group: String, source: LabelError },

    /// Underlying source failed
    #[error("source cursor failed: {0}")]
    Source(String),
}

impl CursorError {
    /// Create a malformed entry error
    pub fn malformed_entry(key: &Key, reason: &'static str) -> Self {
        Self::MalformedEntry {
            key: key.clone(),
            reason,
        }
    }

    /// Returns the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "SCAN_CONFIG_INVALID",
            Self::MalformedEntry { .. } => "SCAN_MALFORMED_ENTRY",
            Self::SourceBehind { .. } => "SCAN_SOURCE_BEHIND",
            Self::LabelCombination { .. } => "SCAN_LABEL_COMBINATION_FAILED",
            Self::Source(_) => "SCAN_SOURCE_FAILED",
        }
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        match self {
            Self::MalformedEntry { .. } | Self::SourceBehind { .. } => Severity::Fatal,
            _ => Severity::Error,
        }
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}
