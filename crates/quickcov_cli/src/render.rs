//! Terminal output: greeting, changed-file list and the coverage table.

use std::fmt::Write as _;

use quickcov_cache::ChangedFiles;
use quickcov_coverage::{delta_annotation, CoverageLevel, CoverageStats, TermKind};

const BOLD: &str = "\x1b[1m";
const GREY: &str = "\x1b[90m";
const RED: &str = "\x1b[1;91m";
const YELLOW: &str = "\x1b[1;93m";
const GREEN: &str = "\x1b[1;92m";
const RESET: &str = "\x1b[0m";

/// Renders quickcov's human-readable output.
///
/// Produces a table like:
/// ```text
/// ┌────────────┬───────────┬──────────┐
/// │ Statements │ Functions │ Branches │
/// ├────────────┼───────────┼──────────┤
/// │ 12 / 20    │ 3 / 4     │ 1 / 2    │
/// │ 60.00%     │ 75.00%    │ 50.00%   │
/// └────────────┴───────────┴──────────┘
/// ```
pub struct CoverageRenderer {
    /// Whether to use ANSI color codes in output.
    pub color: bool,
}

impl CoverageRenderer {
    /// Creates a new renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// The banner printed when quickcov starts.
    pub fn greeting(&self) -> String {
        format!("Starting {}...\n", self.paint(BOLD, "quickcov"))
    }

    /// Greys out a command line for status messages.
    pub fn command(&self, command: &str) -> String {
        self.paint(GREY, command)
    }

    /// Lists the files that triggered a scoped run.
    pub fn changed_files(&self, changed: &ChangedFiles) -> String {
        let mut out = format!(
            "{}\n",
            self.paint(YELLOW, "Changes found in the following files:")
        );
        for path in changed.all() {
            let _ = writeln!(out, "  • {}", path.display());
        }
        out
    }

    /// Renders project-wide coverage, annotating percentages with the change
    /// from `before` when one is given.
    pub fn table(&self, before: Option<&CoverageStats>, after: &CoverageStats) -> String {
        let header: Vec<String> = TermKind::ALL.iter().map(|k| k.title().to_string()).collect();
        let counts: Vec<String> = TermKind::ALL
            .iter()
            .map(|&k| after.term(k).covered_over_total())
            .collect();
        let percentages: Vec<String> = TermKind::ALL
            .iter()
            .map(|&k| {
                let now = after.term(k);
                let delta = before
                    .map(|b| delta_annotation(b.term(k).percentage, now.percentage))
                    .unwrap_or_default();
                if delta.is_empty() {
                    now.percentage_label()
                } else {
                    format!("{} {delta}", now.percentage_label())
                }
            })
            .collect();
        let styles: Vec<&str> = TermKind::ALL
            .iter()
            .map(|&k| level_style(CoverageLevel::of(after.term(k).percentage)))
            .collect();

        let widths: Vec<usize> = (0..header.len())
            .map(|i| {
                [&header[i], &counts[i], &percentages[i]]
                    .iter()
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = String::new();
        out.push_str(&border(&widths, '┌', '┬', '┐'));
        out.push_str(&self.row(&header, &widths, &[BOLD; 3]));
        out.push_str(&border(&widths, '├', '┼', '┤'));
        out.push_str(&self.row(&counts, &widths, &styles));
        out.push_str(&self.row(&percentages, &widths, &styles));
        out.push_str(&border(&widths, '└', '┴', '┘'));
        out
    }

    fn row(&self, cells: &[String], widths: &[usize], styles: &[&str]) -> String {
        let mut line = String::from("│");
        for ((cell, &width), style) in cells.iter().zip(widths).zip(styles) {
            let padded = format!("{cell:<width$}");
            let _ = write!(line, " {} │", self.paint(style, &padded));
        }
        line.push('\n');
        line
    }

    fn paint(&self, style: &str, text: &str) -> String {
        if self.color {
            format!("{style}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

fn level_style(level: CoverageLevel) -> &'static str {
    match level {
        CoverageLevel::Low => RED,
        CoverageLevel::Medium => YELLOW,
        CoverageLevel::High => GREEN,
    }
}

fn border(widths: &[usize], left: char, mid: char, right: char) -> String {
    let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
    format!("{left}{}{right}\n", segments.join(&mid.to_string()))
}
