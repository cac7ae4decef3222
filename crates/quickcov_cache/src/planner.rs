//! Change planning and result merging.
//!
//! The [`Planner`] decides which test and source files changed since the
//! snapshot was taken, and folds the coverage report of a (possibly scoped)
//! runner invocation back into the snapshot without disturbing entries the
//! run did not touch.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use quickcov_coverage::{stats_for_file, CoverageReport};
use rayon::prelude::*;

use crate::error::CacheError;
use crate::registry::FileRegistry;
use crate::snapshot::{SourceFileCoverage, Snapshot};

/// Files that changed since the snapshot was taken.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangedFiles {
    /// Added or modified test files.
    pub test_files: Vec<PathBuf>,
    /// Modified source files that were already tracked.
    pub source_files: Vec<PathBuf>,
}

impl ChangedFiles {
    /// Returns `true` if nothing changed, meaning the runner can be skipped.
    pub fn is_empty(&self) -> bool {
        self.test_files.is_empty() && self.source_files.is_empty()
    }

    /// Total number of changed files.
    pub fn len(&self) -> usize {
        self.test_files.len() + self.source_files.len()
    }

    /// All changed files, test files first.
    pub fn all(&self) -> impl Iterator<Item = &PathBuf> {
        self.test_files.iter().chain(&self.source_files)
    }
}

/// Plans scoped runs and merges their results into the snapshot.
#[derive(Debug, Clone)]
pub struct Planner {
    registry: FileRegistry,
}

impl Planner {
    /// Creates a planner for the project at `root`.
    pub fn new(root: &Path) -> Self {
        Self {
            registry: FileRegistry::new(root),
        }
    }

    /// The file registry used for fingerprinting.
    pub fn registry(&self) -> &FileRegistry {
        &self.registry
    }

    /// Computes which test and source files changed since `snapshot`.
    ///
    /// Test files may be added (any candidate not yet tracked) or modified.
    /// Source files are only checked for modification: the candidate list is
    /// empty, because the only way to learn about a new source file is the
    /// runner's coverage report.
    pub fn plan_changes(
        &self,
        candidate_tests: &[PathBuf],
        snapshot: &Snapshot,
    ) -> Result<ChangedFiles, CacheError> {
        let test_files = self
            .registry
            .changed_or_added(&snapshot.test_files, candidate_tests)?;
        let source_files = self.registry.changed_or_added(&snapshot.source_files, &[])?;

        tracing::info!(
            tests = test_files.len(),
            sources = source_files.len(),
            "planned changes"
        );
        Ok(ChangedFiles {
            test_files,
            source_files,
        })
    }

    /// Computes coverage stats and the current hash for every file in `report`.
    pub fn source_file_coverage(
        &self,
        report: &CoverageReport,
    ) -> Result<BTreeMap<PathBuf, SourceFileCoverage>, CacheError> {
        report
            .files
            .par_iter()
            .map(|(path, file)| -> Result<_, CacheError> {
                let hash = self.registry.fingerprint_file(path)?;
                Ok((path.clone(), SourceFileCoverage::new(stats_for_file(file), hash)))
            })
            .collect()
    }

    /// Folds a fresh coverage report into a copy of `snapshot`.
    ///
    /// Every source file in `report` has its entry replaced; files the report
    /// doesn't mention keep their cached entry. Test fingerprints are
    /// recomputed for `candidate_tests` and replace the previous set, which
    /// drops tests that were deleted or renamed. `touched_tests` are the test
    /// files the scoped run was asked to execute; they are only logged and
    /// have no effect on the merged snapshot.
    ///
    /// Nothing is modified until every fingerprint has been computed, so an
    /// error leaves `snapshot` as it was.
    pub fn merge_results(
        &self,
        snapshot: &Snapshot,
        report: &CoverageReport,
        touched_tests: &[PathBuf],
        candidate_tests: &[PathBuf],
    ) -> Result<Snapshot, CacheError> {
        let fresh_sources = self.source_file_coverage(report)?;
        let test_files = self.registry.fingerprint_all(candidate_tests)?;

        let dropped = snapshot
            .test_files
            .keys()
            .filter(|path| !test_files.contains_key(*path))
            .count();
        tracing::info!(
            replaced_sources = fresh_sources.len(),
            retained_sources = snapshot
                .source_files
                .keys()
                .filter(|path| !fresh_sources.contains_key(*path))
                .count(),
            touched_tests = touched_tests.len(),
            tracked_tests = test_files.len(),
            dropped_tests = dropped,
            "merging coverage results"
        );

        let mut merged = snapshot.clone();
        merged.source_files.extend(fresh_sources);
        merged.test_files = test_files;
        Ok(merged)
    }

    /// Builds the snapshot for a first run from the full coverage report.
    pub fn build_initial(
        &self,
        report: &CoverageReport,
        candidate_tests: &[PathBuf],
        elapsed_secs: Option<f64>,
    ) -> Result<Snapshot, CacheError> {
        let mut snapshot =
            self.merge_results(&Snapshot::new(), report, candidate_tests, candidate_tests)?;
        snapshot.first_run_elapsed_time = elapsed_secs;
        Ok(snapshot)
    }
}
