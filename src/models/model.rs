//! Model evaluation for the fixed curve catalog.
//!
//! The fitter relies on three primitive operations per model:
//! - predict `y(x)` given a parameter vector
//! - fill the gradient `∂y/∂p` at `x` (one Jacobian row)
//! - render fitted parameters as an equation string
//!
//! These are implemented here for each model kind.

use serde::{Deserialize, Serialize};

/// Offset added to `x` before taking the logarithm so `x = 0` stays finite.
pub const LOG_EPS: f64 = 1e-6;

/// Rendered when a parameter vector does not match the model shape.
pub const EQUATION_FALLBACK: &str = "unable to render equation";

/// Concrete curve model.
///
/// Declaration order is the catalog order; it decides ties between models
/// that are equally close to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// `a·x³ + b·x² + c·x + d`
    CubicPoly,
    /// `a·x⁴ + b·x³ + c·x² + d·x + e`
    QuarticPoly,
    /// `a·exp(b·x) + c`
    Exponential,
    /// `a·ln(x + ε) + b`
    Logarithmic,
    /// `a·x^b`
    Power,
}

impl ModelKind {
    /// The full catalog, in iteration order.
    pub const ALL: [ModelKind; 5] = [
        ModelKind::CubicPoly,
        ModelKind::QuarticPoly,
        ModelKind::Exponential,
        ModelKind::Logarithmic,
        ModelKind::Power,
    ];

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::CubicPoly => "Cubic polynomial",
            ModelKind::QuarticPoly => "Quartic polynomial",
            ModelKind::Exponential => "Exponential",
            ModelKind::Logarithmic => "Logarithmic",
            ModelKind::Power => "Power",
        }
    }

    /// Number of free parameters.
    pub fn param_count(self) -> usize {
        match self {
            ModelKind::CubicPoly => 4,
            ModelKind::QuarticPoly => 5,
            ModelKind::Exponential => 3,
            ModelKind::Logarithmic | ModelKind::Power => 2,
        }
    }

    /// Starting point for the least-squares search.
    pub fn initial_guess(self) -> &'static [f64] {
        match self {
            ModelKind::CubicPoly => &[1.0, 1.0, 1.0, 1.0],
            ModelKind::QuarticPoly => &[1.0, 1.0, 1.0, 1.0, 1.0],
            ModelKind::Exponential => &[1.0, -1.0, 1.0],
            ModelKind::Logarithmic => &[1.0, 1.0],
            ModelKind::Power => &[1.0, 1.0],
        }
    }

    /// Predict `y(x)`.
    ///
    /// # Panics
    /// Panics if `p` is shorter than `self.param_count()`.
    pub fn eval(self, x: f64, p: &[f64]) -> f64 {
        match self {
            ModelKind::CubicPoly | ModelKind::QuarticPoly => horner(x, &p[..self.param_count()]),
            ModelKind::Exponential => p[0] * (p[1] * x).exp() + p[2],
            ModelKind::Logarithmic => p[0] * (x + LOG_EPS).ln() + p[1],
            ModelKind::Power => p[0] * x.powf(p[1]),
        }
    }

    /// Fill `out` with `∂y/∂p_j` at `x`.
    ///
    /// # Panics
    /// Panics if `p` or `out` is shorter than `self.param_count()`.
    pub fn fill_gradient(self, x: f64, p: &[f64], out: &mut [f64]) {
        match self {
            ModelKind::CubicPoly | ModelKind::QuarticPoly => {
                // Highest power first, matching the coefficient order.
                let k = self.param_count();
                let mut pow = 1.0;
                for j in (0..k).rev() {
                    out[j] = pow;
                    pow *= x;
                }
            }
            ModelKind::Exponential => {
                let e = (p[1] * x).exp();
                out[0] = e;
                out[1] = p[0] * x * e;
                out[2] = 1.0;
            }
            ModelKind::Logarithmic => {
                out[0] = (x + LOG_EPS).ln();
                out[1] = 1.0;
            }
            ModelKind::Power => {
                let xb = x.powf(p[1]);
                out[0] = xb;
                // d/db a·x^b = a·x^b·ln(x); the limit at x = 0 is 0 for b > 0.
                out[1] = if x == 0.0 { 0.0 } else { p[0] * xb * x.ln() };
            }
        }
    }

    /// Render fitted parameters with 4 decimals.
    ///
    /// A parameter vector of the wrong length yields [`EQUATION_FALLBACK`].
    pub fn format_equation(self, p: &[f64]) -> String {
        if p.len() != self.param_count() {
            return EQUATION_FALLBACK.to_string();
        }
        match self {
            ModelKind::CubicPoly => format!(
                "{:.4}x³ + {:.4}x² + {:.4}x + {:.4}",
                p[0], p[1], p[2], p[3]
            ),
            ModelKind::QuarticPoly => format!(
                "{:.4}x⁴ + {:.4}x³ + {:.4}x² + {:.4}x + {:.4}",
                p[0], p[1], p[2], p[3], p[4]
            ),
            ModelKind::Exponential => format!("{:.4} * exp({:.4}x) + {:.4}", p[0], p[1], p[2]),
            ModelKind::Logarithmic => format!("{:.4} * ln(x) + {:.4}", p[0], p[1]),
            ModelKind::Power => format!("{:.4} * x^{:.4}", p[0], p[1]),
        }
    }
}

fn horner(x: f64, coeffs: &[f64]) -> f64 {
    coeffs.iter().fold(0.0, |acc, &c| acc * x + c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guesses_match_param_counts() {
        for kind in ModelKind::ALL {
            assert_eq!(kind.initial_guess().len(), kind.param_count(), "{kind:?}");
        }
    }

    #[test]
    fn eval_smoke() {
        assert!((ModelKind::CubicPoly.eval(2.0, &[1.0, 0.0, 0.0, 1.0]) - 9.0).abs() < 1e-12);
        assert!((ModelKind::QuarticPoly.eval(-1.0, &[1.0, 1.0, 1.0, 1.0, 1.0]) - 1.0).abs() < 1e-12);
        assert!((ModelKind::Exponential.eval(0.0, &[2.0, 5.0, 1.0]) - 3.0).abs() < 1e-12);
        assert!((ModelKind::Power.eval(4.0, &[3.0, 0.5]) - 6.0).abs() < 1e-12);
        assert!(ModelKind::Logarithmic.eval(0.0, &[1.0, 0.0]).is_finite());
    }

    #[test]
    fn gradient_matches_finite_differences() {
        let cases: [(ModelKind, &[f64]); 5] = [
            (ModelKind::CubicPoly, &[0.5, -1.0, 2.0, 3.0]),
            (ModelKind::QuarticPoly, &[0.1, 0.5, -1.0, 2.0, 3.0]),
            (ModelKind::Exponential, &[2.0, -0.3, 1.0]),
            (ModelKind::Logarithmic, &[1.5, 0.2]),
            (ModelKind::Power, &[2.0, 1.3]),
        ];
        let h = 1e-6;
        for (kind, p) in cases {
            let x = 1.7;
            let mut grad = vec![0.0; kind.param_count()];
            kind.fill_gradient(x, p, &mut grad);
            for j in 0..p.len() {
                let mut up = p.to_vec();
                let mut dn = p.to_vec();
                up[j] += h;
                dn[j] -= h;
                let fd = (kind.eval(x, &up) - kind.eval(x, &dn)) / (2.0 * h);
                assert!(
                    (fd - grad[j]).abs() < 1e-5 * (1.0 + fd.abs()),
                    "{kind:?} param {j}: analytic={} fd={fd}",
                    grad[j]
                );
            }
        }
    }

    #[test]
    fn format_equation_uses_four_decimals() {
        let s = ModelKind::CubicPoly.format_equation(&[1.23456, 2.0, -3.0, 0.5]);
        assert_eq!(s, "1.2346x³ + 2.0000x² + -3.0000x + 0.5000");
        let s = ModelKind::Power.format_equation(&[2.0, 0.5]);
        assert_eq!(s, "2.0000 * x^0.5000");
        let s = ModelKind::Logarithmic.format_equation(&[1.0, -2.0]);
        assert_eq!(s, "1.0000 * ln(x) + -2.0000");
    }

    #[test]
    fn format_equation_falls_back_on_bad_shape() {
        assert_eq!(ModelKind::Exponential.format_equation(&[1.0]), EQUATION_FALLBACK);
        assert_eq!(ModelKind::QuarticPoly.format_equation(&[]), EQUATION_FALLBACK);
    }
}
