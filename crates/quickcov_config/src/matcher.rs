//! Compiled test-file globs.

use std::path::Path;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::error::ConfigError;
use crate::types::RunnerConfig;

/// Compiles patterns into a single [`GlobSet`].
///
/// `*` does not cross directory separators, so `*.test.js` only matches at
/// the root while `**/*.test.js` matches at any depth.
pub fn build_globset(patterns: &[String]) -> Result<GlobSet, ConfigError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.kind().to_string(),
            })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| ConfigError::InvalidPattern {
        pattern: patterns.join(", "),
        reason: e.to_string(),
    })
}

/// Decides which project files are tests.
#[derive(Debug, Clone)]
pub struct TestMatcher {
    include: GlobSet,
    ignore: GlobSet,
}

impl TestMatcher {
    /// Compiles the runner's `test_match` and `ignore` patterns.
    pub fn from_config(runner: &RunnerConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            include: build_globset(&runner.test_match)?,
            ignore: build_globset(&runner.ignore)?,
        })
    }

    /// Returns true if `rel_path` (relative to the project root) is a test file.
    pub fn is_test(&self, rel_path: &Path) -> bool {
        let normalized = normalize(rel_path);
        !self.ignore.is_match(&normalized) && self.include.is_match(&normalized)
    }

    /// Returns true if nothing beneath directory `rel_dir` can be a test.
    pub fn skips_dir(&self, rel_dir: &Path) -> bool {
        let normalized = normalize(rel_dir);
        self.ignore.is_match(&normalized) || self.ignore.is_match(format!("{normalized}/*"))
    }
}

fn normalize(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
