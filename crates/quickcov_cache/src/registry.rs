//! File fingerprinting and change detection.
//!
//! Computes content hashes for tracked files and compares them against the
//! hashes stored in the snapshot to find files that were added or modified
//! since the last run.

use std::collections::{BTreeMap, HashSet};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use quickcov_common::ContentHash;
use rayon::prelude::*;

use crate::error::CacheError;
use crate::snapshot::{FileFingerprint, Fingerprinted};

/// Fingerprints files relative to a project root.
///
/// Paths are kept exactly as given (they are the snapshot keys); relative
/// paths are resolved against the root only for disk access.
#[derive(Debug, Clone)]
pub struct FileRegistry {
    root: PathBuf,
}

impl FileRegistry {
    /// Creates a registry rooted at `root`.
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    /// The project root used to resolve relative paths.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        // joining an absolute path replaces the root
        self.root.join(path)
    }

    /// Reads a file and returns its content hash.
    pub fn fingerprint_file(&self, path: &Path) -> Result<ContentHash, CacheError> {
        let resolved = self.resolve(path);
        let content = std::fs::read(&resolved).map_err(|e| CacheError::Io {
            path: resolved,
            source: e,
        })?;
        Ok(ContentHash::from_bytes(&content))
    }

    /// Fingerprints every path, failing on the first unreadable file.
    ///
    /// Files are hashed in parallel; the result is ordered by path, so the
    /// order of `paths` does not matter.
    pub fn fingerprint_all(
        &self,
        paths: &[PathBuf],
    ) -> Result<BTreeMap<PathBuf, FileFingerprint>, CacheError> {
        paths
            .par_iter()
            .map(|path| -> Result<_, CacheError> {
                let hash = self.fingerprint_file(path)?;
                Ok((path.clone(), FileFingerprint { hash }))
            })
            .collect()
    }

    /// Returns the paths that were added or modified relative to `known`.
    ///
    /// A candidate absent from `known` is "added". A known path whose current
    /// content hash differs from the stored one is "modified". Known paths are
    /// checked whether or not they are candidates; a known file that no longer
    /// exists is skipped rather than reported, so stale entries never abort a
    /// run. Added paths come first in candidate order, then modified paths in
    /// `known` order, each path at most once.
    pub fn changed_or_added<F: Fingerprinted>(
        &self,
        known: &BTreeMap<PathBuf, F>,
        candidates: &[PathBuf],
    ) -> Result<Vec<PathBuf>, CacheError> {
        let mut seen = HashSet::new();
        let mut changed = Vec::new();

        for path in candidates {
            if !known.contains_key(path) && seen.insert(path) {
                tracing::debug!(path = %path.display(), "added");
                changed.push(path.clone());
            }
        }

        for (path, entry) in known {
            let resolved = self.resolve(path);
            let content = match std::fs::read(&resolved) {
                Ok(content) => content,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    tracing::debug!(path = %path.display(), "no longer exists, skipping");
                    continue;
                }
                Err(e) => {
                    return Err(CacheError::Io {
                        path: resolved,
                        source: e,
                    });
                }
            };
            if ContentHash::from_bytes(&content) != entry.content_hash() {
                tracing::debug!(path = %path.display(), "modified");
                changed.push(path.clone());
            }
        }

        Ok(changed)
    }
}
