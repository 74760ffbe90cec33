//! shardscan CLI entry point
//!
//! This is a minimal entrypoint that:
//! 1. Parses CLI arguments (via cli::run)
//! 2. Dispatches to CLI commands (via cli::run)
//! 3. Prints errors to stderr as JSON
//! 4. Exits with non-zero on failure
//!
//! All logic is delegated to the CLI module.

use shardscan::cli;

fn main() {
    if let Err(e) = cli::run() {
        let mut stderr = std::io::stderr();
        if cli::write_error(&mut stderr, e.code_str(), e.message()).is_err() {
            eprintln!("{}", e);
        }
        std::process::exit(1);
    }
}
