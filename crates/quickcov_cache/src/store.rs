//! Loading and saving the snapshot file.

use std::path::{Path, PathBuf};

use crate::error::CacheError;
use crate::snapshot::Snapshot;

/// Default snapshot file name, relative to the project root.
pub const DEFAULT_CACHE_FILE: &str = ".quick-cov-report.json";

/// Persists the [`Snapshot`] as a single JSON document.
///
/// Saves go through a temporary sibling file that is renamed over the target,
/// so the snapshot on disk is always either the previous complete state or
/// the new one.
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    /// A store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A store backed by [`DEFAULT_CACHE_FILE`] inside `root`.
    pub fn in_dir(root: &Path) -> Self {
        Self::new(root.join(DEFAULT_CACHE_FILE))
    }

    /// The snapshot file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` if a snapshot has been persisted.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Loads the persisted snapshot.
    ///
    /// Fails with [`CacheError::CacheMissing`] when nothing has been saved yet
    /// and [`CacheError::SnapshotParse`] when the file is not a valid snapshot.
    pub fn load(&self) -> Result<Snapshot, CacheError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CacheError::CacheMissing {
                    path: self.path.clone(),
                });
            }
            Err(e) => {
                return Err(CacheError::Io {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };
        let snapshot: Snapshot =
            serde_json::from_str(&content).map_err(|e| CacheError::SnapshotParse {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
        tracing::debug!(
            path = %self.path.display(),
            source_files = snapshot.source_files.len(),
            test_files = snapshot.test_files.len(),
            "loaded snapshot"
        );
        Ok(snapshot)
    }

    /// Writes the full snapshot, replacing whatever was there.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| CacheError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut json =
            serde_json::to_string_pretty(snapshot).map_err(|e| CacheError::Serialization {
                reason: e.to_string(),
            })?;
        json.push('\n');

        let tmp = self.tmp_path();
        std::fs::write(&tmp, json).map_err(|e| CacheError::Io {
            path: tmp.clone(),
            source: e,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            CacheError::Io {
                path: self.path.clone(),
                source: e,
            }
        })?;

        tracing::debug!(path = %self.path.display(), "saved snapshot");
        Ok(())
    }

    /// Deletes the persisted snapshot. Succeeds if there was none.
    pub fn clear(&self) -> Result<(), CacheError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::Io {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{FileFingerprint, SourceFileCoverage};
    use quickcov_common::ContentHash;
    use quickcov_coverage::{CoverageStats, TermStats};

    fn sample_snapshot() -> Snapshot {
        let mut snap = Snapshot::new();
        snap.source_files.insert(
            PathBuf::from("/app/src/x.js"),
            SourceFileCoverage::new(
                CoverageStats {
                    s: TermStats::new(1, 3),
                    f: TermStats::new(2, 2),
                    b: TermStats::new(0, 0),
                },
                ContentHash::from_bytes(b"x"),
            ),
        );
        snap.test_files.insert(
            PathBuf::from("/app/x.test.js"),
            FileFingerprint {
                hash: ContentHash::from_bytes(b"x test"),
            },
        );
        snap.first_run_elapsed_time = Some(2.25);
        snap
    }

    #[test]
    fn exists_false_before_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::in_dir(dir.path());
        assert!(!store.exists());
    }

    #[test]
    fn load_missing_is_cache_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::in_dir(dir.path());
        let err = store.load().unwrap_err();
        assert!(matches!(err, CacheError::CacheMissing { .. }));
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::in_dir(dir.path());
        let snap = sample_snapshot();

        store.save(&snap).unwrap();
        assert!(store.exists());
        assert_eq!(store.load().unwrap(), snap);
    }

    #[test]
    fn save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::in_dir(dir.path());
        store.save(&sample_snapshot()).unwrap();
        store.save(&Snapshot::new()).unwrap();
        assert_eq!(store.load().unwrap(), Snapshot::new());
    }

    #[test]
    fn save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::in_dir(dir.path());
        store.save(&sample_snapshot()).unwrap();
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from(DEFAULT_CACHE_FILE)]);
    }

    #[test]
    fn saved_file_is_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::in_dir(dir.path());
        store.save(&sample_snapshot()).unwrap();
        let text = std::fs::read_to_string(store.path()).unwrap();
        assert!(text.contains("\n  \"sourceFiles\": {"));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn corrupt_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::in_dir(dir.path());
        std::fs::write(store.path(), "not valid json {{{").unwrap();
        assert!(store.exists());
        let err = store.load().unwrap_err();
        assert!(matches!(err, CacheError::SnapshotParse { .. }));
    }

    #[test]
    fn save_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("deeply").join("nested").join("cache.json");
        let store = CacheStore::new(&nested);
        store.save(&Snapshot::new()).unwrap();
        assert!(nested.exists());
    }

    #[test]
    fn clear_removes_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::in_dir(dir.path());
        store.save(&Snapshot::new()).unwrap();
        store.clear().unwrap();
        assert!(!store.exists());
        // clearing twice is fine
        store.clear().unwrap();
    }
}
