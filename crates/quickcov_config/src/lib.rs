//! Loading and validation of quickcov project configuration.
//!
//! Configuration comes from `quickcov.toml` in the project root, with test
//! patterns falling back to `package.json`'s `jest.testMatch` and then to
//! jest's defaults. Nothing is ever executed to obtain configuration.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod matcher;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_file, load_config_from_str, CONFIG_FILE};
pub use matcher::{build_globset, TestMatcher};
pub use types::*;
