//! The raw coverage report produced by the test runner.
//!
//! The report is a JSON object keyed by source file path. Each entry carries
//! three hit-count tables: `s` (statements) and `f` (functions) map an id to a
//! hit count, while `b` (branches) maps an id to one hit count per branch
//! outcome. Instrumenters emit more keys than these (`statementMap`, `fnMap`,
//! ...); those are ignored.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::CoverageError;
use crate::stats::TermKind;

/// Where jest writes its JSON coverage report by default.
pub const DEFAULT_REPORT_PATH: &str = "coverage/coverage-final.json";

/// A parsed coverage report, keyed by source file path as written by the runner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageReport {
    /// Per-file hit counts.
    pub files: BTreeMap<PathBuf, FileReport>,
}

/// Hit counts for a single source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileReport {
    /// Statement id → hit count.
    pub s: BTreeMap<String, u64>,
    /// Function id → hit count.
    pub f: BTreeMap<String, u64>,
    /// Branch id → hit count per branch outcome.
    pub b: BTreeMap<String, Vec<u64>>,
}

/// A borrowed view of one term's raw hit counts.
///
/// Statements and functions count once per entry; branches count once per
/// outcome, which is why they get their own variant.
#[derive(Debug, Clone, Copy)]
pub enum RawTerm<'a> {
    /// One hit count per statement or function.
    Hits(&'a BTreeMap<String, u64>),
    /// One hit-count sequence per branch point.
    Branches(&'a BTreeMap<String, Vec<u64>>),
}

impl FileReport {
    /// Returns the raw hit counts for the given term.
    pub fn term(&self, kind: TermKind) -> RawTerm<'_> {
        match kind {
            TermKind::Statements => RawTerm::Hits(&self.s),
            TermKind::Functions => RawTerm::Hits(&self.f),
            TermKind::Branches => RawTerm::Branches(&self.b),
        }
    }
}

impl CoverageReport {
    /// Parses a coverage report from its JSON text.
    pub fn from_json_str(content: &str) -> Result<Self, CoverageError> {
        let root: Value =
            serde_json::from_str(content).map_err(|e| CoverageError::ReportParse {
                reason: e.to_string(),
            })?;
        let Value::Object(entries) = root else {
            return Err(CoverageError::ReportParse {
                reason: "expected a JSON object keyed by file path".to_string(),
            });
        };

        let mut files = BTreeMap::new();
        for (file, entry) in &entries {
            files.insert(PathBuf::from(file), parse_file_entry(file, entry)?);
        }
        Ok(Self { files })
    }

    /// Returns the number of files in the report.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if the report covers no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Reads and parses the coverage report at `path`.
pub fn read_coverage_report(path: &Path) -> Result<CoverageReport, CoverageError> {
    let content = std::fs::read_to_string(path).map_err(|e| CoverageError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let report = CoverageReport::from_json_str(&content)?;
    tracing::debug!(path = %path.display(), files = report.len(), "read coverage report");
    Ok(report)
}

fn parse_file_entry(file: &str, entry: &Value) -> Result<FileReport, CoverageError> {
    let malformed = |reason: String| CoverageError::MalformedReport {
        file: file.to_string(),
        reason,
    };

    let Value::Object(terms) = entry else {
        return Err(malformed("expected an object with `s`, `f` and `b`".to_string()));
    };

    let s = term_object(terms, TermKind::Statements)
        .and_then(parse_hits)
        .map_err(&malformed)?;
    let f = term_object(terms, TermKind::Functions)
        .and_then(parse_hits)
        .map_err(&malformed)?;
    let b = term_object(terms, TermKind::Branches)
        .and_then(parse_branches)
        .map_err(&malformed)?;
    Ok(FileReport { s, f, b })
}

/// Looks up one term table, tagging errors with the term key.
fn term_object(
    terms: &Map<String, Value>,
    kind: TermKind,
) -> Result<(&'static str, &Map<String, Value>), String> {
    let key = kind.key();
    match terms.get(key) {
        Some(Value::Object(table)) => Ok((key, table)),
        Some(_) => Err(format!("term `{key}` is not an object")),
        None => Err(format!("missing term `{key}`")),
    }
}

fn parse_hits(
    (key, table): (&str, &Map<String, Value>),
) -> Result<BTreeMap<String, u64>, String> {
    table
        .iter()
        .map(|(id, count)| {
            count
                .as_u64()
                .map(|c| (id.clone(), c))
                .ok_or_else(|| format!("term `{key}` entry `{id}` is not a non-negative integer"))
        })
        .collect()
}

fn parse_branches(
    (key, table): (&str, &Map<String, Value>),
) -> Result<BTreeMap<String, Vec<u64>>, String> {
    table
        .iter()
        .map(|(id, outcomes)| {
            let Value::Array(outcomes) = outcomes else {
                return Err(format!("term `{key}` entry `{id}` is not an array"));
            };
            let counts = outcomes
                .iter()
                .map(Value::as_u64)
                .collect::<Option<Vec<u64>>>()
                .ok_or_else(|| {
                    format!("term `{key}` entry `{id}` contains a non-integer hit count")
                })?;
            Ok((id.clone(), counts))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "/app/src/x.js": {
            "path": "/app/src/x.js",
            "statementMap": {},
            "s": { "0": 1, "1": 0 },
            "f": { "0": 3 },
            "b": { "0": [0, 1], "1": [2, 2, 0] }
        }
    }"#;

    #[test]
    fn parse_sample_report() {
        let report = CoverageReport::from_json_str(SAMPLE).unwrap();
        assert_eq!(report.len(), 1);
        let file = &report.files[&PathBuf::from("/app/src/x.js")];
        assert_eq!(file.s.len(), 2);
        assert_eq!(file.f["0"], 3);
        assert_eq!(file.b["1"], vec![2, 2, 0]);
    }

    #[test]
    fn empty_object_is_empty_report() {
        let report = CoverageReport::from_json_str("{}").unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn invalid_json_is_parse_error() {
        let err = CoverageReport::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, CoverageError::ReportParse { .. }));
    }

    #[test]
    fn top_level_array_is_parse_error() {
        let err = CoverageReport::from_json_str("[]").unwrap_err();
        assert!(matches!(err, CoverageError::ReportParse { .. }));
    }

    #[test]
    fn missing_term_is_malformed() {
        let json = r#"{ "a.js": { "s": {}, "f": {} } }"#;
        match CoverageReport::from_json_str(json).unwrap_err() {
            CoverageError::MalformedReport { file, reason } => {
                assert_eq!(file, "a.js");
                assert!(reason.contains("missing term `b`"));
            }
            other => panic!("expected MalformedReport, got {other:?}"),
        }
    }

    #[test]
    fn negative_hit_count_is_malformed() {
        let json = r#"{ "a.js": { "s": { "0": -1 }, "f": {}, "b": {} } }"#;
        let err = CoverageReport::from_json_str(json).unwrap_err();
        assert!(matches!(err, CoverageError::MalformedReport { .. }));
    }

    #[test]
    fn scalar_branch_entry_is_malformed() {
        let json = r#"{ "a.js": { "s": {}, "f": {}, "b": { "0": 1 } } }"#;
        match CoverageReport::from_json_str(json).unwrap_err() {
            CoverageError::MalformedReport { reason, .. } => {
                assert!(reason.contains("term `b` entry `0` is not an array"));
            }
            other => panic!("expected MalformedReport, got {other:?}"),
        }
    }

    #[test]
    fn term_view_matches_kind() {
        let report = CoverageReport::from_json_str(SAMPLE).unwrap();
        let file = report.files.values().next().unwrap();
        assert!(matches!(file.term(TermKind::Statements), RawTerm::Hits(_)));
        assert!(matches!(file.term(TermKind::Functions), RawTerm::Hits(_)));
        assert!(matches!(file.term(TermKind::Branches), RawTerm::Branches(_)));
    }

    #[test]
    fn read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("coverage-final.json");
        std::fs::write(&path, SAMPLE).unwrap();
        let report = read_coverage_report(&path).unwrap();
        assert_eq!(report.len(), 1);
    }

    #[test]
    fn read_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_coverage_report(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, CoverageError::Io { .. }));
    }
}
