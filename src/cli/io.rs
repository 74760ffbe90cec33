//! JSON I/O handling for CLI
//!
//! - Entries: one JSON object per line, in and out
//! - Options: one flat JSON object of strings
//! - UTF-8 only

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::data::{EntryRecord, Key, Value};

use super::errors::{CliError, CliResult};

/// Read entries from a JSON-lines file. Blank lines are skipped.
pub fn read_entries(path: &Path) -> CliResult<Vec<(Key, Value)>> {
    let content = fs::read_to_string(path).map_err(|e| {
        CliError::io_error(format!("Failed to read entries {}: {}", path.display(), e))
    })?;

    let mut entries = Vec::new();
    for (index, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record: EntryRecord = serde_json::from_str(line).map_err(|e| {
            CliError::io_error(format!(
                "Invalid entry at {}:{}: {}",
                path.display(),
                index + 1,
                e
            ))
        })?;
        entries.push(record.into_entry());
    }
    Ok(entries)
}

/// Read the cursor option map
pub fn load_options(path: &Path) -> CliResult<BTreeMap<String, String>> {
    let content = fs::read_to_string(path).map_err(|e| {
        CliError::config_error(format!("Failed to read options {}: {}", path.display(), e))
    })?;

    serde_json::from_str(&content)
        .map_err(|e| CliError::config_error(format!("Failed to parse options: {}", e)))
}

/// Write entries as JSON lines
pub fn write_entries<W: Write>(out: &mut W, entries: &[(Key, Value)]) -> CliResult<()> {
    for (key, value) in entries {
        serde_json::to_writer(&mut *out, &EntryRecord::from_entry(key, value))?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

/// Write one serializable value as a JSON line
pub fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> CliResult<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

/// Write an error object
pub fn write_error<W: Write>(out: &mut W, code: &str, message: &str) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    });
    write_json(out, &response)
}
