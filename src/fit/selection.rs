//! Per-group model selection by distance to the target point.
//!
//! For every group we fit each catalog model and compute
//! `distance = |f(target.x) - target.y|`.
//!
//! Selection rules:
//! 1. Skip groups with fewer than `min_points` valid pairs (silently)
//! 2. Skip models that fail to fit (silently)
//! 3. Keep the model with minimum distance; ties go to the earlier catalog entry
//! 4. A group where every model failed produces no result

use std::path::Path;

use rayon::prelude::*;
use tracing::debug;

use crate::domain::{AnalysisConfig, DataGroup, FitResult, Target};
use crate::fit::fitter::{ModelFit, fit_model};
use crate::models::ModelKind;

/// Fit every catalog model to `group` and keep the one closest to `target`.
pub fn select_best(
    source: &Path,
    group: &DataGroup,
    target: Target,
    config: &AnalysisConfig,
) -> Option<FitResult> {
    if group.points.len() < config.min_points {
        debug!(
            file = %source.display(),
            group = group.index + 1,
            points = group.points.len(),
            "skipping group with too few points"
        );
        return None;
    }

    let mut best: Option<(ModelFit, f64)> = None;
    for kind in ModelKind::ALL {
        let fit = match fit_model(kind, group, target.x, config) {
            Ok(fit) => fit,
            Err(err) => {
                debug!(
                    file = %source.display(),
                    group = group.index + 1,
                    model = kind.display_name(),
                    %err,
                    "model fit skipped"
                );
                continue;
            }
        };
        let distance = fit.distance(target.y);
        debug!(
            file = %source.display(),
            group = group.index + 1,
            model = kind.display_name(),
            sse = fit.sse,
            distance,
            "model fitted"
        );
        // Strict `<`: the first model in catalog order wins ties.
        let better = match &best {
            None => true,
            Some((_, d)) => distance < *d,
        };
        if better {
            best = Some((fit, distance));
        }
    }

    let (fit, distance) = best?;
    Some(FitResult {
        source: source.to_path_buf(),
        group: group.index,
        model: fit.model,
        params: fit.params,
        distance,
        n_points: group.points.len(),
        points: group.points.clone(),
    })
}

/// Run [`select_best`] on every group of one file.
///
/// Groups are independent, so they are fitted in parallel; results keep the
/// original group order.
pub fn fit_groups(
    source: &Path,
    groups: &[DataGroup],
    target: Target,
    config: &AnalysisConfig,
) -> Vec<FitResult> {
    groups
        .par_iter()
        .map(|g| select_best(source, g, target, config))
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect()
}
