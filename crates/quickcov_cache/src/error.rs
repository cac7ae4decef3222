//! Error types for cache operations.

use std::path::PathBuf;

/// Errors that can occur during cache operations.
///
/// Every variant is fatal to the current run. The only expected condition,
/// a missing snapshot on the first run, is detected with
/// [`CacheStore::exists`](crate::CacheStore::exists) before loading.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while reading a tracked file or writing the snapshot.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A load was attempted but no snapshot has been persisted yet.
    #[error("no cached snapshot at {path}")]
    CacheMissing {
        /// Where the snapshot was expected.
        path: PathBuf,
    },

    /// The snapshot file exists but could not be parsed.
    #[error("failed to parse cached snapshot {path}: {reason}")]
    SnapshotParse {
        /// The snapshot file path.
        path: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// The snapshot could not be serialized.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display() {
        let err = CacheError::Io {
            path: PathBuf::from("src/x.js"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("cache I/O error"));
        assert!(msg.contains("src/x.js"));
    }

    #[test]
    fn cache_missing_display() {
        let err = CacheError::CacheMissing {
            path: PathBuf::from(".quick-cov-report.json"),
        };
        assert_eq!(err.to_string(), "no cached snapshot at .quick-cov-report.json");
    }

    #[test]
    fn snapshot_parse_display() {
        let err = CacheError::SnapshotParse {
            path: PathBuf::from(".quick-cov-report.json"),
            reason: "unexpected EOF".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("failed to parse cached snapshot"));
        assert!(msg.contains("unexpected EOF"));
    }
}
