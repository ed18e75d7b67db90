//! Terminal formatting for rankings and summaries.
//!
//! We keep formatting code in one place so:
//! - the fitting code stays clean and testable
//! - the CLI and the TUI print exactly the same text

use crate::domain::{FileIssue, RankedReport, display_name};
use crate::models::ModelKind;

pub const NO_RESULTS_TABLE: &str = "no valid data groups";
pub const NO_RESULTS_SUMMARY: &str = "No valid data was found for fitting analysis.";

const FILE_W: usize = 30;
const RULE_W: usize = 80;

/// Header, rule and one row per ranked entry.
pub fn format_ranked_table(report: &RankedReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<6}{:<30}{:<10}{}\n",
        "Rank", "File", "Distance", "Fitted function"
    ));
    out.push_str(&"-".repeat(RULE_W));
    out.push('\n');

    for (i, entry) in report.entries.iter().enumerate() {
        out.push_str(&format!(
            "{:<6}{:<30}{:<10.4}{}\n",
            i + 1,
            truncate(&entry.source_name(), FILE_W - 1),
            entry.distance,
            entry.equation(),
        ));
    }

    out
}

/// The summary lines handed to the advisor (no advisory section).
pub fn summary_text(report: &RankedReport) -> String {
    let s = &report.summary;
    let best = display_name(&s.best_source);
    let worst = display_name(&s.worst_source);

    let mut out = String::new();
    out.push_str(&format!("Best fitting file: {best}\n"));
    out.push_str(&format!("Worst fitting file: {worst}\n"));
    out.push_str(&format!("Mean distance: {:.4}\n", s.mean_distance));
    out.push_str(&format!("Most common model: {}\n", s.modal_model.display_name()));
    out.push_str(&format!("Recommendation: use the target corresponding to {best}\n"));
    out
}

/// Summary panel text: aggregates, then the advisory reply if any.
pub fn format_summary(report: &RankedReport, advisory: Option<&str>) -> String {
    let mut out = summary_text(report);
    if let Some(text) = advisory {
        out.push_str("\nAdvisory:\n");
        out.push_str(text.trim_end());
        out.push('\n');
    }
    out
}

pub fn format_file_issues(issues: &[FileIssue]) -> String {
    let mut out = String::new();
    for issue in issues {
        out.push_str(&format!(
            "skipped {}: {}\n",
            display_name(&issue.path),
            issue.message
        ));
    }
    out
}

/// The model catalog, one line per kind.
pub fn format_catalog() -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<20} {:>6}  {}\n", "model", "params", "initial guess"));
    for kind in ModelKind::ALL {
        let guess: Vec<String> = kind.initial_guess().iter().map(|v| format!("{v}")).collect();
        out.push_str(&format!(
            "{:<20} {:>6}  [{}]\n",
            kind.display_name(),
            kind.param_count(),
            guess.join(", ")
        ));
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FitResult, Target};
    use crate::report::rank_results;
    use std::path::PathBuf;

    fn report() -> RankedReport {
        let entries = vec![
            FitResult {
                source: PathBuf::from("/data/B.csv"),
                group: 0,
                model: ModelKind::Logarithmic,
                params: vec![2.0, 1.0],
                distance: 2.0,
                n_points: 6,
                points: Vec::new(),
            },
            FitResult {
                source: PathBuf::from("/data/A.csv"),
                group: 1,
                model: ModelKind::Power,
                params: vec![1.5, 2.0],
                distance: 0.5,
                n_points: 7,
                points: Vec::new(),
            },
        ];
        rank_results(Target { x: 3.0, y: 10.0 }, entries).unwrap()
    }

    #[test]
    fn table_has_header_rule_and_rows() {
        let table = format_ranked_table(&report());
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Rank  File"));
        assert!(lines[0].ends_with("Distance  Fitted function"));
        assert_eq!(lines[1], "-".repeat(80));
        assert!(lines[2].starts_with("1     A.csv "));
        assert_eq!(&lines[2][36..46], "0.5000    ");
        assert!(lines[2].ends_with("1.5000 * x^2.0000"));
        assert!(lines[3].starts_with("2     B.csv "));
    }

    #[test]
    fn summary_names_best_file_and_appends_advisory() {
        let text = format_summary(&report(), Some("Prefer A.\n"));
        assert!(text.contains("Best fitting file: A.csv"));
        assert!(text.contains("Worst fitting file: B.csv"));
        assert!(text.contains("Mean distance: 1.2500"));
        assert!(text.contains("use the target corresponding to A.csv"));
        assert!(text.ends_with("\nAdvisory:\nPrefer A.\n"));

        assert!(!format_summary(&report(), None).contains("Advisory:"));
    }

    #[test]
    fn long_names_are_truncated_to_the_column() {
        let name = "a".repeat(40);
        let t = truncate(&name, 29);
        assert_eq!(t.chars().count(), 29);
        assert!(t.ends_with('.'));
    }

    #[test]
    fn catalog_lists_every_model() {
        let text = format_catalog();
        assert_eq!(text.lines().count(), ModelKind::ALL.len() + 1);
        assert!(text.contains("Quartic polynomial"));
    }
}
