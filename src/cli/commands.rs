//! CLI command implementations
//!
//! Each scan command loads its entries into a memory cursor, stacks the
//! aggregating cursor on top, drains the requested range and writes the
//! results as JSON lines.

use std::io::{self, Write};
use std::path::Path;

use crate::cursor::{scan, MemoryCursor};
use crate::data::Range;
use crate::fi_count::{FieldIndexCountConfig, FieldIndexCountingCursor};
use crate::first_last::{FirstLastSeenConfig, FirstLastSeenCursor};
use crate::observability::{Logger, MetricsSnapshot};

use super::args::{Cli, Command};
use super::errors::CliResult;
use super::io::{load_options, read_entries, write_entries, write_json};

/// Main entry point for CLI
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    Logger::set_min_severity(cli.log_level.into());
    run_command(cli.command)
}

/// Run a specific command
pub fn run_command(command: Command) -> CliResult<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match command {
        Command::Count {
            input,
            options,
            row,
            metrics,
        } => {
            let snapshot = count(&mut out, &input, &options, row.as_deref())?;
            if metrics {
                report_metrics(&snapshot)?;
            }
            Ok(())
        }
        Command::FirstLast {
            input,
            whole_range,
            row,
            metrics,
        } => {
            let snapshot = first_last(&mut out, &input, whole_range, row.as_deref())?;
            if metrics {
                report_metrics(&snapshot)?;
            }
            Ok(())
        }
        Command::DescribeOptions => describe_options(&mut out),
    }
}

/// Count field-index entries of `input` under the options in `options_path`.
pub fn count<W: Write>(
    out: &mut W,
    input: &Path,
    options_path: &Path,
    row: Option<&str>,
) -> CliResult<MetricsSnapshot> {
    let entries = read_entries(input)?;
    let options = load_options(options_path)?;

    let source = MemoryCursor::new(entries);
    let mut cursor = FieldIndexCountingCursor::from_options(Box::new(source), &options)?;
    let results = scan(&mut cursor, &scan_range(row))?;
    write_entries(out, &results)?;

    let snapshot = cursor.metrics();
    log_completion("fi_count", &snapshot);
    Ok(snapshot)
}

/// Report first and last dates of `input`.
pub fn first_last<W: Write>(
    out: &mut W,
    input: &Path,
    whole_range: bool,
    row: Option<&str>,
) -> CliResult<MetricsSnapshot> {
    let entries = read_entries(input)?;
    let config = if whole_range {
        FirstLastSeenConfig::whole_range()
    } else {
        FirstLastSeenConfig::default()
    };

    let mut cursor = FirstLastSeenCursor::new(Box::new(MemoryCursor::new(entries)), config);
    let results = scan(&mut cursor, &scan_range(row))?;
    write_entries(out, &results)?;

    let snapshot = cursor.metrics();
    log_completion("first_last", &snapshot);
    Ok(snapshot)
}

/// Write the option keys accepted by `count` with their descriptions
pub fn describe_options<W: Write>(out: &mut W) -> CliResult<()> {
    write_json(out, &FieldIndexCountConfig::describe_options())
}

fn scan_range(row: Option<&str>) -> Range {
    match row {
        Some(row) => Range::exact_row(row),
        None => Range::all(),
    }
}

fn report_metrics(snapshot: &MetricsSnapshot) -> CliResult<()> {
    let stderr = io::stderr();
    let mut err = stderr.lock();
    write_json(&mut err, &serde_json::json!({ "metrics": snapshot }))
}

fn log_completion(cursor: &str, snapshot: &MetricsSnapshot) {
    let results = snapshot.results_emitted.to_string();
    let examined = snapshot.entries_examined.to_string();
    let seeks = snapshot.seeks_issued.to_string();
    Logger::info(
        "SCAN_COMPLETE",
        &[
            ("cursor", cursor),
            ("results", results.as_str()),
            ("examined", examined.as_str()),
            ("seeks", seeks.as_str()),
        ],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::EntryRecord;
    use crate::fi_count::{START_TIME, STOP_TIME, UNIQ_BY_DATA_TYPE};
    use std::fs;
    use tempfile::TempDir;

    fn write_fixture(dir: &TempDir, name: &str, records: &[EntryRecord]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let lines: Vec<String> = records
            .iter()
            .map(|r| serde_json::to_string(r).unwrap())
            .collect();
        fs::write(&path, lines.join("\n")).unwrap();
        path
    }

    fn record(row: &str, family: &str, qualifier: &str, timestamp: i64) -> EntryRecord {
        EntryRecord {
            row: row.to_string(),
            family: family.to_string(),
            qualifier: qualifier.to_string(),
            visibility: String::new(),
            timestamp,
            deleted: false,
            value: String::new(),
        }
    }

    fn read_output(out: &[u8]) -> Vec<EntryRecord> {
        String::from_utf8(out.to_vec())
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    fn write_options(dir: &TempDir, extra: &[(&str, &str)]) -> std::path::PathBuf {
        let mut options = serde_json::Map::new();
        options.insert(START_TIME.to_string(), "19700101000000".into());
        options.insert(STOP_TIME.to_string(), "20991231235959".into());
        for (key, value) in extra {
            options.insert(key.to_string(), (*value).into());
        }
        let path = dir.path().join("options.json");
        fs::write(&path, serde_json::Value::Object(options).to_string()).unwrap();
        path
    }

    // =========================================================================
    // count
    // =========================================================================

    #[test]
    fn test_count_writes_one_line_per_group() {
        let dir = TempDir::new().unwrap();
        let input = write_fixture(
            &dir,
            "entries.jsonl",
            &[
                record("r1", "fi\0COLOR", "red\0csv\0u1", 10),
                record("r1", "fi\0COLOR", "red\0csv\0u2", 20),
                record("r1", "fi\0COLOR", "red\0wiki\0u3", 15),
                record("r1", "fi\0COLOR", "blue\0csv\0u4", 5),
            ],
        );
        let options = write_options(&dir, &[]);

        let mut out = Vec::new();
        let snapshot = count(&mut out, &input, &options, None).unwrap();
        let records = read_output(&out);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].family, "COLOR");
        assert_eq!(records[0].qualifier, "blue");
        assert_eq!(records[0].value, "1");
        assert_eq!(records[1].qualifier, "red");
        assert_eq!(records[1].value, "3");
        assert_eq!(records[1].timestamp, 20);
        assert_eq!(snapshot.results_emitted, 2);
    }

    #[test]
    fn test_count_restricted_to_row() {
        let dir = TempDir::new().unwrap();
        let input = write_fixture(
            &dir,
            "entries.jsonl",
            &[
                record("r1", "fi\0COLOR", "red\0csv\0u1", 10),
                record("r2", "fi\0COLOR", "red\0csv\0u2", 10),
            ],
        );
        let options = write_options(&dir, &[(UNIQ_BY_DATA_TYPE, "true")]);

        let mut out = Vec::new();
        count(&mut out, &input, &options, Some("r2")).unwrap();
        let records = read_output(&out);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].row, "r2");
        assert_eq!(records[0].qualifier, "red\0csv");
    }

    #[test]
    fn test_count_rejects_bad_options() {
        let dir = TempDir::new().unwrap();
        let input = write_fixture(&dir, "entries.jsonl", &[]);
        let options = write_options(&dir, &[(UNIQ_BY_DATA_TYPE, "maybe")]);

        let mut out = Vec::new();
        let err = count(&mut out, &input, &options, None).unwrap_err();
        assert_eq!(err.code_str(), "SCAN_CLI_CONFIG_ERROR");
        assert!(out.is_empty());
    }

    #[test]
    fn test_count_malformed_entry_fails_scan() {
        let dir = TempDir::new().unwrap();
        let input = write_fixture(&dir, "entries.jsonl", &[record("r1", "fi\0COLOR", "red", 1)]);
        let options = write_options(&dir, &[]);

        let mut out = Vec::new();
        let err = count(&mut out, &input, &options, None).unwrap_err();
        assert_eq!(err.code_str(), "SCAN_CLI_SCAN_FAILED");
    }

    // =========================================================================
    // first-last
    // =========================================================================

    #[test]
    fn test_first_last_per_row_family() {
        let dir = TempDir::new().unwrap();
        let input = write_fixture(
            &dir,
            "entries.jsonl",
            &[
                record("A", "F", "20210101_x", 1),
                record("A", "F", "20210301_y", 1),
                record("B", "F", "20200101_z", 1),
            ],
        );

        let mut out = Vec::new();
        first_last(&mut out, &input, false, None).unwrap();
        let records = read_output(&out);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].value, "20210101,20210301");
        assert_eq!(records[0].qualifier, "20210301\u{10FFFF}");
        assert_eq!(records[1].value, "20200101,20200101");
    }

    #[test]
    fn test_first_last_whole_range() {
        let dir = TempDir::new().unwrap();
        let input = write_fixture(
            &dir,
            "entries.jsonl",
            &[
                record("A", "F", "20210101_x", 1),
                record("B", "G", "20190101_z", 1),
            ],
        );

        let mut out = Vec::new();
        let snapshot = first_last(&mut out, &input, true, None).unwrap();
        let records = read_output(&out);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value, "20190101,20210101");
        assert_eq!(snapshot.results_emitted, 1);
    }

    #[test]
    fn test_describe_options_lists_keys() {
        let mut out = Vec::new();
        describe_options(&mut out).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert!(parsed.get(START_TIME).is_some());
        assert!(parsed.get(UNIQ_BY_DATA_TYPE).is_some());
    }
}
