//! Error types for coverage report handling.

use std::path::PathBuf;

/// Errors that can occur while reading or interpreting a coverage report.
#[derive(Debug, thiserror::Error)]
pub enum CoverageError {
    /// The report file (or a source file it names) could not be read.
    #[error("coverage I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The report is not valid JSON or is not a JSON object at the top level.
    #[error("failed to parse coverage report: {reason}")]
    ReportParse {
        /// Description of the parse failure.
        reason: String,
    },

    /// A file entry in the report does not have the expected `s`/`f`/`b` shape.
    #[error("malformed coverage report entry for {file}: {reason}")]
    MalformedReport {
        /// The file key of the offending entry.
        file: String,
        /// Description of the shape mismatch.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display() {
        let err = CoverageError::Io {
            path: PathBuf::from("coverage/coverage-final.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        };
        let msg = err.to_string();
        assert!(msg.contains("coverage I/O error"));
        assert!(msg.contains("coverage-final.json"));
    }

    #[test]
    fn malformed_report_display() {
        let err = CoverageError::MalformedReport {
            file: "/app/src/x.js".to_string(),
            reason: "missing term `b`".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "malformed coverage report entry for /app/src/x.js: missing term `b`"
        );
    }

    #[test]
    fn report_parse_display() {
        let err = CoverageError::ReportParse {
            reason: "EOF while parsing".to_string(),
        };
        assert!(err.to_string().starts_with("failed to parse coverage report"));
    }
}
