//! The persisted snapshot: per-file coverage stats plus file fingerprints.
//!
//! Serialized as pretty-printed JSON with camelCase top-level keys
//! (`sourceFiles`, `testFiles`, `firstRunElapsedTime`). Maps are ordered so
//! the file diffs cleanly between runs.

use std::collections::BTreeMap;
use std::path::PathBuf;

use quickcov_common::ContentHash;
use quickcov_coverage::{aggregate, CoverageStats, TermStats};
use serde::{Deserialize, Serialize};

/// Anything that carries the content hash a file had when it was last seen.
pub trait Fingerprinted {
    /// The stored content hash.
    fn content_hash(&self) -> ContentHash;
}

/// The last-known content hash of a tracked file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFingerprint {
    /// Content hash of the file when it was last fingerprinted.
    pub hash: ContentHash,
}

impl Fingerprinted for FileFingerprint {
    fn content_hash(&self) -> ContentHash {
        self.hash
    }
}

/// Coverage stats for one source file, with the hash of the content they were
/// computed from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceFileCoverage {
    /// Statement coverage.
    pub s: TermStats,
    /// Function coverage.
    pub f: TermStats,
    /// Branch coverage.
    pub b: TermStats,
    /// Content hash of the source file when the stats were computed.
    pub hash: ContentHash,
}

impl SourceFileCoverage {
    /// Pairs computed stats with the file's current hash.
    pub fn new(stats: CoverageStats, hash: ContentHash) -> Self {
        Self {
            s: stats.s,
            f: stats.f,
            b: stats.b,
            hash,
        }
    }

    /// The coverage stats without the hash.
    pub fn stats(&self) -> CoverageStats {
        CoverageStats {
            s: self.s,
            f: self.f,
            b: self.b,
        }
    }
}

impl Fingerprinted for SourceFileCoverage {
    fn content_hash(&self) -> ContentHash {
        self.hash
    }
}

/// The complete cached state carried between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Coverage per source file, keyed by the path the runner reported.
    #[serde(default)]
    pub source_files: BTreeMap<PathBuf, SourceFileCoverage>,

    /// Fingerprints of every test file seen on the last run.
    #[serde(default)]
    pub test_files: BTreeMap<PathBuf, FileFingerprint>,

    /// Wall-clock seconds the first (full) runner invocation took.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_run_elapsed_time: Option<f64>,
}

impl Snapshot {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Project-wide coverage over every cached source file.
    pub fn aggregate(&self) -> CoverageStats {
        aggregate(self.source_files.values().map(SourceFileCoverage::stats))
    }
}
