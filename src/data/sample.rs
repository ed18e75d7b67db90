//! Synthetic multi-group CSV generation.
//!
//! Each group draws one catalog model with random parameters, evaluates it at
//! sorted random `x` positions and adds Gaussian noise. Groups are written
//! one after another with a blank line between them, which is exactly the
//! layout the analysis reads back.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::Point;
use crate::error::AppError;
use crate::models::ModelKind;

/// Knobs for `fitrank sample`.
#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub groups: usize,
    pub points: usize,
    pub seed: u64,
    /// Standard deviation of the additive noise on `y`.
    pub noise: f64,
    pub x_min: f64,
    pub x_max: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            groups: 3,
            points: 12,
            seed: 42,
            noise: 0.05,
            x_min: 0.5,
            x_max: 10.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SampleGroup {
    pub model: ModelKind,
    pub params: Vec<f64>,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone)]
pub struct SampleData {
    pub groups: Vec<SampleGroup>,
}

impl SampleData {
    /// Headerless `x,y` lines, groups separated by one blank line.
    pub fn to_csv_string(&self) -> String {
        let mut out = String::new();
        for (i, group) in self.groups.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            for p in &group.points {
                let _ = writeln!(out, "{:.6},{:.6}", p.x, p.y);
            }
        }
        out
    }
}

pub fn generate_sample(config: &SampleConfig) -> Result<SampleData, AppError> {
    if config.groups == 0 {
        return Err(AppError::new(2, "Group count must be > 0."));
    }
    if config.points == 0 {
        return Err(AppError::new(2, "Points per group must be > 0."));
    }
    if !(config.x_min.is_finite() && config.x_max.is_finite() && config.x_max > config.x_min) {
        return Err(AppError::new(2, "Invalid x range for sample generation."));
    }
    if !(config.noise.is_finite() && config.noise >= 0.0) {
        return Err(AppError::new(2, "Noise must be a finite, non-negative number."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, config.noise)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    // ln(x) and x^b need positive x.
    let kinds: Vec<ModelKind> = ModelKind::ALL
        .into_iter()
        .filter(|k| config.x_min > 0.0 || !matches!(k, ModelKind::Logarithmic | ModelKind::Power))
        .collect();

    let mut groups = Vec::with_capacity(config.groups);
    for _ in 0..config.groups {
        let model = kinds[rng.gen_range(0..kinds.len())];
        let params = random_params(&mut rng, model, config.x_max.abs().max(config.x_min.abs()));

        let mut xs: Vec<f64> = (0..config.points)
            .map(|_| rng.gen_range(config.x_min..=config.x_max))
            .collect();
        xs.sort_by(f64::total_cmp);

        let points = xs
            .into_iter()
            .map(|x| Point {
                x,
                y: model.eval(x, &params) + normal.sample(&mut rng),
            })
            .collect();

        groups.push(SampleGroup { model, params, points });
    }

    Ok(SampleData { groups })
}

/// Parameters drawn so the curve stays within a few orders of magnitude on the x range.
fn random_params(rng: &mut StdRng, model: ModelKind, x_scale: f64) -> Vec<f64> {
    let x_scale = x_scale.max(1.0);
    match model {
        ModelKind::CubicPoly => vec![
            rng.gen_range(-1.0..=1.0) / x_scale.powi(2),
            rng.gen_range(-1.0..=1.0) / x_scale,
            rng.gen_range(-2.0..=2.0),
            rng.gen_range(-5.0..=5.0),
        ],
        ModelKind::QuarticPoly => vec![
            rng.gen_range(-1.0..=1.0) / x_scale.powi(3),
            rng.gen_range(-1.0..=1.0) / x_scale.powi(2),
            rng.gen_range(-1.0..=1.0) / x_scale,
            rng.gen_range(-2.0..=2.0),
            rng.gen_range(-5.0..=5.0),
        ],
        ModelKind::Exponential => vec![
            rng.gen_range(0.5..=3.0),
            rng.gen_range(-1.0..=1.0) / x_scale,
            rng.gen_range(-2.0..=2.0),
        ],
        ModelKind::Logarithmic => vec![rng.gen_range(0.5..=4.0), rng.gen_range(-2.0..=2.0)],
        ModelKind::Power => vec![rng.gen_range(0.5..=3.0), rng.gen_range(0.2..=1.8)],
    }
}

/// Generate and write a sample file.
pub fn write_sample_csv(path: &Path, config: &SampleConfig) -> Result<SampleData, AppError> {
    let sample = generate_sample(config)?;
    fs::write(path, sample.to_csv_string())
        .map_err(|e| AppError::new(2, format!("Failed to write sample CSV '{}': {e}", path.display())))?;
    Ok(sample)
}
