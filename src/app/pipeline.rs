//! Shared analysis pipeline used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! read files -> split groups -> fit/select per group -> rank -> advisory
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use std::path::PathBuf;

use tracing::{info, warn};

use crate::advisor::{Advisor, advisory_text};
use crate::domain::{AnalysisConfig, FileIssue, FitResult, RankedReport, Target};
use crate::fit::fit_groups;
use crate::io::load_groups;
use crate::report::{rank_results, summary_text};

/// All computed outputs of a single analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    /// `None` when no group in any file produced a fit.
    pub report: Option<RankedReport>,
    /// Files that could not be read; they contribute no results.
    pub issues: Vec<FileIssue>,
    pub files_read: usize,
    pub groups_seen: usize,
    pub advisory: Option<String>,
}

/// Analyse `files` against `target`.
///
/// Unreadable files are recorded and skipped. The advisor is consulted only
/// when there is something to rank, and its failure becomes text.
pub fn run_analysis(
    files: &[PathBuf],
    target: Target,
    config: &AnalysisConfig,
    advisor: Option<&dyn Advisor>,
) -> AnalysisOutput {
    let mut results: Vec<FitResult> = Vec::new();
    let mut issues = Vec::new();
    let mut files_read = 0;
    let mut groups_seen = 0;

    for path in files {
        let groups = match load_groups(path) {
            Ok(groups) => groups,
            Err(err) => {
                warn!(file = %path.display(), %err, "skipping unreadable file");
                issues.push(FileIssue {
                    path: path.clone(),
                    message: err.message().to_string(),
                });
                continue;
            }
        };
        files_read += 1;
        groups_seen += groups.len();

        let fitted = fit_groups(path, &groups, target, config);
        info!(
            file = %path.display(),
            groups = groups.len(),
            fitted = fitted.len(),
            "file analysed"
        );
        results.extend(fitted);
    }

    let report = rank_results(target, results);
    info!(
        files = files_read,
        skipped = issues.len(),
        groups = groups_seen,
        results = report.as_ref().map_or(0, |r| r.entries.len()),
        "analysis finished"
    );

    let advisory = match (&report, advisor) {
        (Some(report), Some(advisor)) => Some(advisory_text(advisor, &summary_text(report))),
        _ => None,
    };

    AnalysisOutput {
        report,
        issues,
        files_read,
        groups_seen,
        advisory,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::StaticAdvisor;
    use std::cell::Cell;
    use std::io::Write;

    struct Counting<'a>(&'a Cell<usize>);

    impl Advisor for Counting<'_> {
        fn advise(&self, _summary: &str) -> Result<String, crate::error::AppError> {
            self.0.set(self.0.get() + 1);
            Ok("ok".to_string())
        }
    }

    fn write_csv(dir: &std::path::Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn missing_file_is_an_issue_not_an_abort() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_csv(dir.path(), "good.csv", "0,1\n1,3\n2,5\n3,7\n4,9\n");
        let missing = dir.path().join("missing.csv");

        let out = run_analysis(
            &[missing.clone(), good],
            Target { x: 5.0, y: 11.0 },
            &AnalysisConfig::default(),
            Some(&StaticAdvisor::new("fine")),
        );
        assert_eq!(out.issues.len(), 1);
        assert_eq!(out.issues[0].path, missing);
        assert_eq!(out.files_read, 1);
        assert_eq!(out.report.unwrap().entries.len(), 1);
        assert_eq!(out.advisory.as_deref(), Some("fine"));
    }

    #[test]
    fn advisor_is_not_consulted_without_results() {
        let dir = tempfile::tempdir().unwrap();
        let short = write_csv(dir.path(), "short.csv", "1,2\n2,3\n\n4,5\n");
        let calls = Cell::new(0);

        let out = run_analysis(
            &[short],
            Target { x: 1.0, y: 1.0 },
            &AnalysisConfig::default(),
            Some(&Counting(&calls)),
        );
        assert!(out.report.is_none());
        assert!(out.advisory.is_none());
        assert_eq!(out.groups_seen, 2);
        assert_eq!(calls.get(), 0);
    }
}
