//! Incremental coverage cache.
//!
//! This crate owns the persisted [`Snapshot`] of per-file coverage and file
//! fingerprints, detects which files changed since it was taken, and merges
//! the results of scoped runner invocations back into it.

#![warn(missing_docs)]

pub mod error;
pub mod planner;
pub mod registry;
pub mod snapshot;
pub mod store;

pub use error::CacheError;
pub use planner::{ChangedFiles, Planner};
pub use registry::FileRegistry;
pub use snapshot::{FileFingerprint, Fingerprinted, Snapshot, SourceFileCoverage};
pub use store::{CacheStore, DEFAULT_CACHE_FILE};
