//! CLI module for shardscan
//!
//! Provides command-line access to the aggregating cursors:
//! - count: field-index counts per row, field and value
//! - first-last: first and last dates per row and family
//! - describe-options: option keys accepted by `count`

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, LogLevel};
pub use commands::{count, describe_options, first_last, run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{load_options, read_entries, write_entries, write_error, write_json};
