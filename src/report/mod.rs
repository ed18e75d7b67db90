//! Cross-file ranking and the aggregates shown next to it.

pub mod format;

pub use format::*;

use std::collections::HashMap;

use crate::domain::{FitResult, RankedReport, Summary, Target};
use crate::models::ModelKind;

/// Sort fit results by distance and compute the summary aggregates.
///
/// The sort is stable (equal distances keep their incoming order). An empty
/// input yields `None` so callers show the no-results message instead of
/// aggregates over nothing.
pub fn rank_results(target: Target, mut results: Vec<FitResult>) -> Option<RankedReport> {
    if results.is_empty() {
        return None;
    }
    results.sort_by(|a, b| a.distance.total_cmp(&b.distance));

    let summary = summarize(&results)?;
    Some(RankedReport {
        target,
        entries: results,
        summary,
    })
}

fn summarize(ranked: &[FitResult]) -> Option<Summary> {
    let best = ranked.first()?;
    let worst = ranked.last()?;
    let mean_distance = ranked.iter().map(|r| r.distance).sum::<f64>() / ranked.len() as f64;

    Some(Summary {
        best_source: best.source.clone(),
        worst_source: worst.source.clone(),
        mean_distance,
        modal_model: modal_model(ranked)?,
        n_results: ranked.len(),
    })
}

/// Most frequent winning model; ties go to the one seen first in `ranked`.
fn modal_model(ranked: &[FitResult]) -> Option<ModelKind> {
    let mut counts: HashMap<ModelKind, usize> = HashMap::new();
    let mut first_seen: Vec<ModelKind> = Vec::new();
    for r in ranked {
        let count = counts.entry(r.model).or_insert(0);
        if *count == 0 {
            first_seen.push(r.model);
        }
        *count += 1;
    }

    let mut best: Option<(ModelKind, usize)> = None;
    for kind in first_seen {
        let n = counts.get(&kind).copied().unwrap_or(0);
        if best.is_none_or(|(_, m)| n > m) {
            best = Some((kind, n));
        }
    }
    best.map(|(kind, _)| kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn result(file: &str, model: ModelKind, distance: f64) -> FitResult {
        FitResult {
            source: PathBuf::from(file),
            group: 0,
            model,
            params: vec![1.0; model.param_count()],
            distance,
            n_points: 5,
            points: Vec::new(),
        }
    }

    const T: Target = Target { x: 3.0, y: 10.0 };

    #[test]
    fn ranking_is_non_decreasing_and_idempotent() {
        let input = vec![
            result("c.csv", ModelKind::Power, 3.0),
            result("a.csv", ModelKind::CubicPoly, 0.1),
            result("b.csv", ModelKind::Exponential, 1.5),
            result("d.csv", ModelKind::Logarithmic, 0.1),
        ];
        let report = rank_results(T, input).unwrap();
        let d: Vec<f64> = report.entries.iter().map(|r| r.distance).collect();
        assert!(d.windows(2).all(|w| w[0] <= w[1]));
        // Stable: a.csv came before d.csv at equal distance.
        assert_eq!(report.entries[0].source_name(), "a.csv");
        assert_eq!(report.entries[1].source_name(), "d.csv");

        let again = rank_results(T, report.entries.clone()).unwrap();
        let names = |r: &RankedReport| r.entries.iter().map(|e| e.source_name()).collect::<Vec<_>>();
        assert_eq!(names(&again), names(&report));
    }

    #[test]
    fn empty_results_are_the_no_results_condition() {
        assert!(rank_results(T, Vec::new()).is_none());
    }

    #[test]
    fn two_files_rank_and_aggregate() {
        let input = vec![
            result("B.csv", ModelKind::QuarticPoly, 2.0),
            result("A.csv", ModelKind::CubicPoly, 0.5),
        ];
        let report = rank_results(T, input).unwrap();
        assert_eq!(report.entries[0].source_name(), "A.csv");
        assert_eq!(report.entries[1].source_name(), "B.csv");
        assert_eq!(report.summary.best_source, PathBuf::from("A.csv"));
        assert_eq!(report.summary.worst_source, PathBuf::from("B.csv"));
        assert!((report.summary.mean_distance - 1.25).abs() < 1e-12);
        assert_eq!(report.summary.n_results, 2);
    }

    #[test]
    fn modal_model_ties_go_to_earliest_in_ranking() {
        let input = vec![
            result("1.csv", ModelKind::Power, 0.4),
            result("2.csv", ModelKind::Exponential, 0.2),
            result("3.csv", ModelKind::Power, 0.9),
            result("4.csv", ModelKind::Exponential, 0.3),
        ];
        let report = rank_results(T, input).unwrap();
        assert_eq!(report.summary.modal_model, ModelKind::Exponential);

        let input = vec![
            result("1.csv", ModelKind::Power, 0.4),
            result("2.csv", ModelKind::Logarithmic, 0.2),
            result("3.csv", ModelKind::Power, 0.9),
        ];
        let report = rank_results(T, input).unwrap();
        assert_eq!(report.summary.modal_model, ModelKind::Power);
    }
}
