//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit code.

use std::fmt;
use std::io;

use crate::cursor::CursorError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Options or input rejected before scanning
    ConfigError,
    /// I/O error (files, stdout)
    IoError,
    /// Cursor failed mid-scan
    ScanFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "SCAN_CLI_CONFIG_ERROR",
            Self::IoError => "SCAN_CLI_IO_ERROR",
            Self::ScanFailed => "SCAN_CLI_SCAN_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Scan failure
    pub fn scan_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ScanFailed, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<CursorError> for CliError {
    fn from(e: CursorError) -> Self {
        let message = format!("{}: {}", e.code(), e);
        match e {
            CursorError::Config(_) => Self::config_error(message),
            _ => Self::scan_failed(message),
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::ConfigError;
    use crate::data::Key;

    #[test]
    fn test_cursor_config_error_maps_to_config() {
        let err = CliError::from(CursorError::from(ConfigError::MissingOption { option: "START" }));
        assert_eq!(err.code_str(), "SCAN_CLI_CONFIG_ERROR");
        assert!(err.message().contains("SCAN_CONFIG_INVALID"));
    }

    #[test]
    fn test_malformed_entry_maps_to_scan_failed() {
        let err = CliError::from(CursorError::malformed_entry(&Key::for_row("r"), "short"));
        assert_eq!(err.code(), &CliErrorCode::ScanFailed);
        assert!(err.to_string().starts_with("SCAN_CLI_SCAN_FAILED: SCAN_MALFORMED_ENTRY"));
    }
}
