//! Observability subsystem
//!
//! - Structured logging (JSON)
//! - Per-cursor scan counters
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on scan results
//! 3. No async or background threads
//! 4. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use shardscan::observability::{Logger, ScanMetrics};
//!
//! Logger::warn("FI_COUNT_FIELD_NAMES_MISSING", &[("option", "FIELD_NAMES")]);
//!
//! let metrics = ScanMetrics::new();
//! metrics.increment_seeks();
//! ```

mod logger;
mod metrics;

pub use logger::{Logger, Severity};
pub use metrics::{MetricsSnapshot, ScanMetrics};
