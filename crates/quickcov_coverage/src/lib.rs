//! Coverage report parsing and statistics.
//!
//! This crate reads the per-file coverage report emitted by the test runner
//! (statement, function, and branch hit counts) and reduces it to normalized
//! [`TermStats`] per file and across the whole project.

#![warn(missing_docs)]

pub mod aggregate;
pub mod error;
pub mod report;
pub mod stats;

pub use aggregate::{aggregate, delta_annotation, CoverageLevel};
pub use error::CoverageError;
pub use report::{read_coverage_report, CoverageReport, FileReport, RawTerm, DEFAULT_REPORT_PATH};
pub use stats::{stats_for_file, stats_for_term, CoverageStats, TermKind, TermStats};
