//! Configuration types deserialized from `quickcov.toml`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};

use quickcov_cache::DEFAULT_CACHE_FILE;
use quickcov_coverage::DEFAULT_REPORT_PATH;

/// Test patterns jest uses when a project doesn't configure `testMatch`.
pub const JEST_DEFAULT_TEST_MATCH: [&str; 2] = [
    "**/__tests__/**/*.{js,jsx,ts,tsx}",
    "**/*.{spec,test}.{js,jsx,ts,tsx}",
];

/// The top-level configuration parsed from `quickcov.toml`.
///
/// Every section is optional; an empty file (or no file at all) describes a
/// jest project with the default layout.
#[derive(Debug, Default, Deserialize)]
pub struct QuickCovConfig {
    /// How to invoke the test runner and find its tests.
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Where the snapshot lives.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Test runner invocation and discovery settings.
#[derive(Debug, Deserialize)]
pub struct RunnerConfig {
    /// Executable to spawn.
    #[serde(default = "default_program")]
    pub program: String,
    /// Extra arguments placed before every generated argument list.
    #[serde(default, deserialize_with = "deserialize_string_or_vec")]
    pub args: Vec<String>,
    /// Globs selecting test files, relative to the project root.
    ///
    /// Empty means "not configured": `package.json`'s `jest.testMatch` is
    /// tried next, then [`JEST_DEFAULT_TEST_MATCH`].
    #[serde(default, deserialize_with = "deserialize_string_or_vec")]
    pub test_match: Vec<String>,
    /// Globs excluded from test discovery.
    #[serde(default = "default_ignore", deserialize_with = "deserialize_string_or_vec")]
    pub ignore: Vec<String>,
    /// Where the runner writes its JSON coverage report, relative to the project root.
    #[serde(default = "default_coverage_report")]
    pub coverage_report: String,
    /// Flag that scopes a run to tests related to the following source files.
    #[serde(default = "default_related_flag")]
    pub related_flag: String,
    /// Flags that turn on coverage collection.
    #[serde(
        default = "default_coverage_flags",
        deserialize_with = "deserialize_string_or_vec"
    )]
    pub coverage_flags: Vec<String>,
    /// Flag that stops the runner at the first failing test. Empty disables it.
    #[serde(default = "default_bail_flag")]
    pub bail_flag: String,
    /// What to do with the coverage report when the runner exits non-zero.
    #[serde(default)]
    pub on_failure: FailurePolicy,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: Vec::new(),
            test_match: Vec::new(),
            ignore: default_ignore(),
            coverage_report: default_coverage_report(),
            related_flag: default_related_flag(),
            coverage_flags: default_coverage_flags(),
            bail_flag: default_bail_flag(),
            on_failure: FailurePolicy::default(),
        }
    }
}

/// Policy for a runner that exits with a non-zero status.
#[derive(Debug, Default, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Merge whatever coverage the runner produced (default).
    #[default]
    Merge,
    /// Abort the run and leave the snapshot untouched.
    Abort,
}

/// Snapshot location settings.
#[derive(Debug, Deserialize)]
pub struct CacheConfig {
    /// Snapshot file path, relative to the project root.
    #[serde(default = "default_cache_file")]
    pub file: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            file: default_cache_file(),
        }
    }
}

fn default_program() -> String {
    "jest".to_string()
}

fn default_ignore() -> Vec<String> {
    vec!["node_modules/**".to_string()]
}

fn default_coverage_report() -> String {
    DEFAULT_REPORT_PATH.to_string()
}

fn default_related_flag() -> String {
    "--findRelatedTests".to_string()
}

fn default_coverage_flags() -> Vec<String> {
    vec!["--coverage".to_string()]
}

fn default_bail_flag() -> String {
    "--bail".to_string()
}

fn default_cache_file() -> String {
    DEFAULT_CACHE_FILE.to_string()
}

/// Deserializes a field that can be either a single string or a list of strings.
///
/// Allows both `test_match = "**/*.test.js"` and
/// `test_match = ["**/*.test.js", "**/*.spec.js"]`.
fn deserialize_string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut vec = Vec::new();
            while let Some(val) = seq.next_element::<String>()? {
                vec.push(val);
            }
            Ok(vec)
        }
    }

    deserializer.deserialize_any(StringOrVec)
}
