//! CLI argument definitions using clap
//!
//! Commands:
//! - shardscan count --input <entries.jsonl> --options <options.json> [--row <row>]
//! - shardscan first-last --input <entries.jsonl> [--whole-range] [--row <row>]
//! - shardscan describe-options

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::observability::Severity;

/// shardscan - aggregating scans over a sorted shard keyspace
#[derive(Parser, Debug)]
#[command(name = "shardscan")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Minimum severity of log lines (written alongside results on stdout)
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Error)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Count field-index entries per row, field and value
    Count {
        /// Entries, one JSON object per line
        #[arg(long)]
        input: PathBuf,

        /// Cursor options as a flat JSON object of strings
        #[arg(long)]
        options: PathBuf,

        /// Restrict the scan to one row
        #[arg(long)]
        row: Option<String>,

        /// Print scan counters to stderr when done
        #[arg(long)]
        metrics: bool,
    },

    /// Report first and last dates per row and family
    FirstLast {
        /// Entries, one JSON object per line
        #[arg(long)]
        input: PathBuf,

        /// One result for the whole scan instead of per row and family
        #[arg(long)]
        whole_range: bool,

        /// Restrict the scan to one row
        #[arg(long)]
        row: Option<String>,

        /// Print scan counters to stderr when done
        #[arg(long)]
        metrics: bool,
    },

    /// List the options accepted by `count`
    DescribeOptions,
}

/// Log threshold as accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Info,
    Warn,
    Error,
    Fatal,
}

impl From<LogLevel> for Severity {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Severity::Trace,
            LogLevel::Info => Severity::Info,
            LogLevel::Warn => Severity::Warn,
            LogLevel::Error => Severity::Error,
            LogLevel::Fatal => Severity::Fatal,
        }
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
