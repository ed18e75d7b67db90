//! Fitting a single catalog model to one data group.
//!
//! Given:
//! - the group's `x_i`, `y_i`
//! - a model kind (which fixes the starting guess)
//! - a target `x`
//!
//! we run Levenberg–Marquardt and evaluate the fitted curve at the target.
//! A model that fails to converge, or whose prediction at the target is not
//! finite, is reported as a `FitError` so the caller can skip it.

use crate::domain::{AnalysisConfig, DataGroup};
use crate::error::FitError;
use crate::math::{LmOptions, fit_curve};
use crate::models::ModelKind;

/// A converged fit for a single model kind.
#[derive(Debug, Clone)]
pub struct ModelFit {
    pub model: ModelKind,
    pub params: Vec<f64>,
    pub sse: f64,
    /// Model prediction at the target `x`.
    pub prediction: f64,
}

impl ModelFit {
    pub fn distance(&self, target_y: f64) -> f64 {
        (self.prediction - target_y).abs()
    }
}

/// Fit `model` to `group` and predict at `target_x`.
pub fn fit_model(
    model: ModelKind,
    group: &DataGroup,
    target_x: f64,
    config: &AnalysisConfig,
) -> Result<ModelFit, FitError> {
    let xs = group.xs();
    let ys = group.ys();

    let opts = LmOptions {
        max_evals: config.max_evals,
        ..LmOptions::default()
    };
    let fit = fit_curve(model, &xs, &ys, model.initial_guess(), &opts)?;
    tracing::trace!(
        model = model.display_name(),
        iterations = fit.iterations,
        evals = fit.evals,
        "solver converged"
    );

    let prediction = model.eval(target_x, &fit.params);
    if !prediction.is_finite() {
        return Err(FitError::NonFinite("prediction at target x"));
    }

    Ok(ModelFit {
        model,
        params: fit.params,
        sse: fit.cost,
        prediction,
    })
}
