//! Shared foundational types used across the quickcov workspace.
//!
//! Currently this is the content fingerprint used to decide whether a tracked
//! source or test file changed between runs.

#![warn(missing_docs)]

pub mod hash;

pub use hash::{ContentHash, ParseHashError};
