//! Per-term coverage statistics.

use serde::{Deserialize, Serialize};

use crate::report::{FileReport, RawTerm};

/// One coverage dimension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TermKind {
    /// Statements (`s`).
    Statements,
    /// Functions (`f`).
    Functions,
    /// Branch outcomes (`b`).
    Branches,
}

impl TermKind {
    /// All terms in display order.
    pub const ALL: [TermKind; 3] = [
        TermKind::Statements,
        TermKind::Functions,
        TermKind::Branches,
    ];

    /// The key used for this term in coverage reports and snapshots.
    pub fn key(self) -> &'static str {
        match self {
            TermKind::Statements => "s",
            TermKind::Functions => "f",
            TermKind::Branches => "b",
        }
    }

    /// Human-readable column title.
    pub fn title(self) -> &'static str {
        match self {
            TermKind::Statements => "Statements",
            TermKind::Functions => "Functions",
            TermKind::Branches => "Branches",
        }
    }
}

/// Covered/total counts for one term, with the derived percentage.
///
/// `percentage` is `covered / total * 100` when `total > 0` and `0.0` when
/// nothing is instrumented, so it is never NaN.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TermStats {
    /// Number of instrumented items.
    pub total: u64,
    /// Number of items hit at least once.
    pub covered: u64,
    /// `covered / total * 100`, or `0.0` for an empty term.
    pub percentage: f64,
}

impl TermStats {
    /// Builds stats from raw counts, computing the percentage.
    pub fn new(covered: u64, total: u64) -> Self {
        debug_assert!(covered <= total, "covered {covered} exceeds total {total}");
        Self {
            total,
            covered,
            percentage: percentage(covered, total),
        }
    }

    /// Formats as `"covered / total"`.
    pub fn covered_over_total(&self) -> String {
        format!("{} / {}", self.covered, self.total)
    }

    /// Formats the percentage with two decimals, e.g. `"87.50%"`.
    pub fn percentage_label(&self) -> String {
        format!("{:.2}%", self.percentage)
    }
}

fn percentage(covered: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        covered as f64 / total as f64 * 100.0
    }
}

/// Statement, function, and branch stats for one file or for a whole project.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageStats {
    /// Statement coverage.
    pub s: TermStats,
    /// Function coverage.
    pub f: TermStats,
    /// Branch coverage.
    pub b: TermStats,
}

impl CoverageStats {
    /// Returns the stats for one term.
    pub fn term(&self, kind: TermKind) -> &TermStats {
        match kind {
            TermKind::Statements => &self.s,
            TermKind::Functions => &self.f,
            TermKind::Branches => &self.b,
        }
    }
}

/// Computes stats for one term of a file.
///
/// Statements and functions count each entry once (`covered` when its hit
/// count is non-zero). Branches count each outcome of each branch point, so
/// `{"0": [0, 1]}` is two branches with one covered.
pub fn stats_for_term(term: RawTerm<'_>) -> TermStats {
    match term {
        RawTerm::Hits(hits) => {
            let covered = hits.values().filter(|&&count| count > 0).count() as u64;
            TermStats::new(covered, hits.len() as u64)
        }
        RawTerm::Branches(branches) => {
            let (covered, total) =
                branches
                    .values()
                    .fold((0u64, 0u64), |(covered, total), outcomes| {
                        let hit = outcomes.iter().filter(|&&count| count > 0).count() as u64;
                        (covered + hit, total + outcomes.len() as u64)
                    });
            TermStats::new(covered, total)
        }
    }
}

/// Computes statement, function, and branch stats for one file.
pub fn stats_for_file(file: &FileReport) -> CoverageStats {
    CoverageStats {
        s: stats_for_term(file.term(TermKind::Statements)),
        f: stats_for_term(file.term(TermKind::Functions)),
        b: stats_for_term(file.term(TermKind::Branches)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn hits(counts: &[u64]) -> BTreeMap<String, u64> {
        counts
            .iter()
            .enumerate()
            .map(|(i, c)| (i.to_string(), *c))
            .collect()
    }

    fn branches(counts: &[&[u64]]) -> BTreeMap<String, Vec<u64>> {
        counts
            .iter()
            .enumerate()
            .map(|(i, c)| (i.to_string(), c.to_vec()))
            .collect()
    }

    #[test]
    fn statements_count_non_zero_entries() {
        let s = hits(&[1, 0, 5, 0]);
        let stats = stats_for_term(RawTerm::Hits(&s));
        assert_eq!(stats.total, 4);
        assert_eq!(stats.covered, 2);
        assert_eq!(stats.percentage, 50.0);
    }

    #[test]
    fn statements_for_arbitrary_counts() {
        let cases: [&[u64]; 5] = [&[], &[0], &[3], &[0, 0, 0], &[1, 2, 3, 0, 7]];
        for counts in cases {
            let s = hits(counts);
            let stats = stats_for_term(RawTerm::Hits(&s));
            assert_eq!(stats.total, counts.len() as u64);
            assert_eq!(stats.covered, counts.iter().filter(|c| **c > 0).count() as u64);
            assert!(stats.covered <= stats.total);
        }
    }

    #[test]
    fn empty_term_has_zero_percentage() {
        let s = hits(&[]);
        let stats = stats_for_term(RawTerm::Hits(&s));
        assert_eq!(stats, TermStats::default());
        assert!(!stats.percentage.is_nan());
    }

    #[test]
    fn branches_count_each_outcome() {
        let b = branches(&[&[0, 1]]);
        let stats = stats_for_term(RawTerm::Branches(&b));
        assert_eq!(stats, TermStats::new(1, 2));
        assert_eq!(stats.percentage, 50.0);
    }

    #[test]
    fn branches_sum_across_points() {
        let b = branches(&[&[0, 1], &[2, 2, 0], &[], &[0]]);
        let stats = stats_for_term(RawTerm::Branches(&b));
        assert_eq!(stats.total, 6);
        assert_eq!(stats.covered, 3);
        assert_eq!(stats.percentage, 50.0);
    }

    #[test]
    fn file_stats_cover_all_terms() {
        let file = FileReport {
            s: hits(&[1, 0]),
            f: hits(&[1]),
            b: branches(&[&[1, 1, 0, 0]]),
        };
        let stats = stats_for_file(&file);
        assert_eq!(stats.s, TermStats::new(1, 2));
        assert_eq!(stats.f.percentage, 100.0);
        assert_eq!(stats.b.covered, 2);
        assert_eq!(stats.b.total, 4);
    }

    #[test]
    fn labels() {
        let stats = TermStats::new(7, 8);
        assert_eq!(stats.covered_over_total(), "7 / 8");
        assert_eq!(stats.percentage_label(), "87.50%");
        assert_eq!(TermStats::default().percentage_label(), "0.00%");
    }

    #[test]
    fn term_keys_and_titles() {
        let keys: Vec<_> = TermKind::ALL.iter().map(|k| k.key()).collect();
        assert_eq!(keys, ["s", "f", "b"]);
        assert_eq!(TermKind::Branches.title(), "Branches");
    }

    #[test]
    fn serde_shape() {
        let stats = TermStats::new(1, 2);
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json, serde_json::json!({ "total": 2, "covered": 1, "percentage": 50.0 }));
    }
}
