//! Project-wide aggregation and before/after comparison of coverage stats.

use crate::stats::{CoverageStats, TermStats};

/// Sums per-file stats into project-wide stats.
///
/// Totals and covered counts are summed per term and the percentage is
/// computed once from the sums, so small files don't skew the result the way
/// averaging per-file percentages would. No files yields all-zero stats.
pub fn aggregate<I>(files: I) -> CoverageStats
where
    I: IntoIterator<Item = CoverageStats>,
{
    let mut sums = [(0u64, 0u64); 3];
    for file in files {
        for (sum, term) in sums.iter_mut().zip([file.s, file.f, file.b]) {
            sum.0 += term.covered;
            sum.1 += term.total;
        }
    }
    let [s, f, b] = sums.map(|(covered, total)| TermStats::new(covered, total));
    CoverageStats { s, f, b }
}

/// Labels the change between two percentages, e.g. `"+2.50%"` or `"-0.33%"`.
///
/// Percentages are compared at display precision (two decimals); when they
/// round to the same value the label is empty.
pub fn delta_annotation(old_pct: f64, new_pct: f64) -> String {
    let old = round2(old_pct);
    let new = round2(new_pct);
    if old == new {
        return String::new();
    }
    let sign = if new > old { '+' } else { '-' };
    format!("{sign}{:.2}%", (new - old).abs())
}

fn round2(pct: f64) -> f64 {
    (pct * 100.0).round() / 100.0
}

/// Coarse classification of a coverage percentage, used for colouring output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoverageLevel {
    /// Below 50%.
    Low,
    /// 50% up to (not including) 80%.
    Medium,
    /// 80% and above.
    High,
}

impl CoverageLevel {
    /// Classifies a percentage.
    pub fn of(percentage: f64) -> Self {
        if percentage < 50.0 {
            CoverageLevel::Low
        } else if percentage < 80.0 {
            CoverageLevel::Medium
        } else {
            CoverageLevel::High
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(s: (u64, u64), f: (u64, u64), b: (u64, u64)) -> CoverageStats {
        CoverageStats {
            s: TermStats::new(s.0, s.1),
            f: TermStats::new(f.0, f.1),
            b: TermStats::new(b.0, b.1),
        }
    }

    #[test]
    fn aggregate_no_files() {
        let total = aggregate(Vec::<CoverageStats>::new());
        assert_eq!(total, CoverageStats::default());
        assert_eq!(total.s.percentage, 0.0);
        assert!(!total.b.percentage.is_nan());
    }

    #[test]
    fn aggregate_sums_before_dividing() {
        // 1/1 and 0/9: averaging percentages would say 50%, the real figure is 10%
        let total = aggregate([file((1, 1), (0, 0), (0, 0)), file((0, 9), (0, 0), (0, 0))]);
        assert_eq!(total.s.covered, 1);
        assert_eq!(total.s.total, 10);
        assert_eq!(total.s.percentage, 10.0);
    }

    #[test]
    fn aggregate_terms_independently() {
        let total = aggregate([file((1, 2), (3, 4), (0, 0)), file((1, 2), (1, 4), (2, 2))]);
        assert_eq!(total.s, TermStats::new(2, 4));
        assert_eq!(total.f, TermStats::new(4, 8));
        assert_eq!(total.b, TermStats::new(2, 2));
    }

    #[test]
    fn delta_equal_is_empty() {
        assert_eq!(delta_annotation(50.0, 50.0), "");
        assert_eq!(delta_annotation(0.0, 0.0), "");
        // indistinguishable at two decimals
        assert_eq!(delta_annotation(66.666_666, 66.667), "");
    }

    #[test]
    fn delta_signed() {
        assert_eq!(delta_annotation(50.0, 52.5), "+2.50%");
        assert_eq!(delta_annotation(80.0, 79.67), "-0.33%");
        assert_eq!(delta_annotation(0.0, 100.0), "+100.00%");
    }

    #[test]
    fn coverage_levels() {
        assert_eq!(CoverageLevel::of(0.0), CoverageLevel::Low);
        assert_eq!(CoverageLevel::of(49.99), CoverageLevel::Low);
        assert_eq!(CoverageLevel::of(50.0), CoverageLevel::Medium);
        assert_eq!(CoverageLevel::of(79.99), CoverageLevel::Medium);
        assert_eq!(CoverageLevel::of(80.0), CoverageLevel::High);
        assert_eq!(CoverageLevel::of(100.0), CoverageLevel::High);
    }
}
