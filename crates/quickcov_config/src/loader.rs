//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::matcher::build_globset;
use crate::types::{QuickCovConfig, JEST_DEFAULT_TEST_MATCH};
use std::path::Path;

/// Name of the configuration file looked up in the project root.
pub const CONFIG_FILE: &str = "quickcov.toml";

/// Jest config files that may carry `testMatch` but are never evaluated.
const JEST_CONFIG_FILES: [&str; 4] = [
    "jest.config.js",
    "jest.config.ts",
    "jest.config.mjs",
    "jest.config.cjs",
];

/// Loads and validates the configuration for a project directory.
///
/// Reads `<project_dir>/quickcov.toml` when present and falls back to the
/// defaults otherwise. Test patterns missing from the file are taken from
/// `package.json`'s `jest.testMatch`, then from jest's defaults.
pub fn load_config(project_dir: &Path) -> Result<QuickCovConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE);
    let config = if config_path.is_file() {
        let content = std::fs::read_to_string(&config_path)?;
        parse_config(&content)?
    } else {
        tracing::debug!(path = %config_path.display(), "no config file, using defaults");
        QuickCovConfig::default()
    };
    finish(config, project_dir)
}

/// Loads and validates an explicit configuration file.
///
/// The file's directory stands in for the project directory when resolving
/// test patterns from `package.json`.
pub fn load_config_file(path: &Path) -> Result<QuickCovConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    let project_dir = path.parent().unwrap_or_else(|| Path::new(""));
    finish(config, project_dir)
}

/// Parses and validates a `quickcov.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies. Missing test
/// patterns fall back to jest's defaults directly.
pub fn load_config_from_str(content: &str) -> Result<QuickCovConfig, ConfigError> {
    let mut config = parse_config(content)?;
    if config.runner.test_match.is_empty() {
        config.runner.test_match = default_test_match();
    }
    validate_config(&config)?;
    Ok(config)
}

fn parse_config(content: &str) -> Result<QuickCovConfig, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
}

fn finish(mut config: QuickCovConfig, project_dir: &Path) -> Result<QuickCovConfig, ConfigError> {
    if config.runner.test_match.is_empty() {
        config.runner.test_match = resolve_test_match(project_dir)?;
    }
    validate_config(&config)?;
    Ok(config)
}

/// Picks test patterns for a project whose `quickcov.toml` doesn't set any.
fn resolve_test_match(project_dir: &Path) -> Result<Vec<String>, ConfigError> {
    let package_json = project_dir.join("package.json");
    if package_json.is_file() {
        let content = std::fs::read_to_string(&package_json)?;
        if let Some(patterns) = jest_test_match(&content)? {
            tracing::debug!(count = patterns.len(), "using jest.testMatch from package.json");
            return Ok(patterns);
        }
    }

    if let Some(name) = JEST_CONFIG_FILES
        .iter()
        .find(|name| project_dir.join(name).is_file())
    {
        tracing::warn!(
            file = name,
            "{name} is not evaluated; set runner.test_match in {CONFIG_FILE} if it customises testMatch"
        );
    }
    Ok(default_test_match())
}

/// Extracts `jest.testMatch` from a `package.json` document.
///
/// Returns `None` when the key is absent. A leading `<rootDir>/` is dropped
/// because patterns are already matched relative to the project root.
fn jest_test_match(package_json: &str) -> Result<Option<Vec<String>>, ConfigError> {
    let doc: serde_json::Value = serde_json::from_str(package_json)
        .map_err(|e| ConfigError::ParseError(format!("package.json: {e}")))?;

    let Some(test_match) = doc.get("jest").and_then(|jest| jest.get("testMatch")) else {
        return Ok(None);
    };
    let entries = test_match.as_array().ok_or_else(|| {
        ConfigError::ValidationError("package.json: jest.testMatch must be an array".to_string())
    })?;

    let mut patterns = Vec::with_capacity(entries.len());
    for entry in entries {
        let pattern = entry.as_str().ok_or_else(|| {
            ConfigError::ValidationError(
                "package.json: jest.testMatch entries must be strings".to_string(),
            )
        })?;
        let pattern = pattern.strip_prefix("<rootDir>/").unwrap_or(pattern);
        patterns.push(pattern.to_string());
    }
    Ok(Some(patterns))
}

fn default_test_match() -> Vec<String> {
    JEST_DEFAULT_TEST_MATCH.iter().map(|p| p.to_string()).collect()
}

/// Validates that required fields are present and every glob compiles.
fn validate_config(config: &QuickCovConfig) -> Result<(), ConfigError> {
    let runner = &config.runner;
    if runner.program.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "runner.program must not be empty".to_string(),
        ));
    }
    if runner.test_match.is_empty() {
        return Err(ConfigError::ValidationError(
            "runner.test_match must list at least one pattern".to_string(),
        ));
    }
    if runner.coverage_report.is_empty() {
        return Err(ConfigError::ValidationError(
            "runner.coverage_report must not be empty".to_string(),
        ));
    }
    if config.cache.file.is_empty() {
        return Err(ConfigError::ValidationError(
            "cache.file must not be empty".to_string(),
        ));
    }
    build_globset(&runner.test_match)?;
    build_globset(&runner.ignore)?;
    Ok(())
}
