//! Levenberg–Marquardt nonlinear least squares for catalog models.
//!
//! We minimize `Σ (f(x_i; p) - y_i)²` starting from a given parameter vector.
//! Each iteration solves the damped, column-scaled system
//!
//! ```text
//! [    J    ]       [ -r ]
//! [ √λ · D  ] δ  =  [  0 ]
//! ```
//!
//! in the least-squares sense, where `D = diag(‖J_j‖)`. Steps that lower the
//! cost are accepted and relax the damping; rejected steps raise it.
//!
//! Numerical notes:
//! - The Jacobian comes from the model's analytic gradient.
//! - Non-finite trial costs (e.g. `ln` or `powf` leaving their domain) are
//!   treated as rejected steps rather than hard failures.
//! - Every residual evaluation counts 1 against the budget and every Jacobian
//!   counts one per parameter.

use nalgebra::{DMatrix, DVector};

use crate::error::FitError;
use crate::math::solve_least_squares;
use crate::models::ModelKind;

const LAMBDA_MIN: f64 = 1e-12;
const LAMBDA_MAX: f64 = 1e16;
const LAMBDA_UP: f64 = 10.0;
const LAMBDA_DOWN: f64 = 10.0;

/// Solver tolerances and budget.
#[derive(Debug, Clone)]
pub struct LmOptions {
    /// Maximum number of function evaluations (residuals + Jacobian columns).
    pub max_evals: usize,
    /// Relative cost reduction below which an accepted step counts as converged.
    pub ftol: f64,
    /// Relative step size below which the fit counts as converged.
    pub xtol: f64,
    /// Cosine between residual and Jacobian columns below which the gradient vanishes.
    pub gtol: f64,
    pub initial_lambda: f64,
}

impl Default for LmOptions {
    fn default() -> Self {
        Self {
            max_evals: crate::domain::DEFAULT_MAX_EVALS,
            ftol: 1.49e-8,
            xtol: 1.49e-8,
            gtol: 1e-10,
            initial_lambda: 1e-3,
        }
    }
}

/// A converged fit.
#[derive(Debug, Clone)]
pub struct LmFit {
    pub params: Vec<f64>,
    /// Sum of squared residuals at `params`.
    pub cost: f64,
    pub iterations: usize,
    pub evals: usize,
}

/// Fit `model` to `(xs, ys)` starting from `start`.
pub fn fit_curve(
    model: ModelKind,
    xs: &[f64],
    ys: &[f64],
    start: &[f64],
    opts: &LmOptions,
) -> Result<LmFit, FitError> {
    let k = model.param_count();
    let n = xs.len().min(ys.len());
    if start.len() != k {
        return Err(FitError::ShapeMismatch {
            expected: k,
            got: start.len(),
        });
    }
    if n < k {
        return Err(FitError::Underdetermined { points: n, params: k });
    }
    let xs = &xs[..n];
    let ys = &ys[..n];

    let mut state = Budget::new(opts.max_evals);
    let y_norm = ys.iter().map(|y| y * y).sum::<f64>().sqrt();
    let exact_cost = (1e-12 * (1.0 + y_norm)).powi(2);

    let mut p = DVector::from_column_slice(start);
    let mut r = residuals(model, xs, ys, &p);
    state.spend(1)?;
    let mut cost = r.norm_squared();
    if !cost.is_finite() {
        return Err(FitError::NonFinite("residuals at the starting point"));
    }

    let mut lambda = opts.initial_lambda;
    let mut iterations = 0usize;

    let done = |p: &DVector<f64>, cost: f64, iterations: usize, evals: usize| LmFit {
        params: p.iter().copied().collect(),
        cost,
        iterations,
        evals,
    };

    loop {
        if cost <= exact_cost {
            return Ok(done(&p, cost, iterations, state.used));
        }

        let jac = jacobian(model, xs, &p);
        state.spend(k)?;
        if jac.iter().any(|v| !v.is_finite()) {
            return Err(FitError::NonFinite("jacobian"));
        }

        let col_norms: Vec<f64> = (0..k).map(|c| jac.column(c).norm()).collect();
        if scaled_gradient(&jac, &r, &col_norms, cost.sqrt()) <= opts.gtol {
            return Ok(done(&p, cost, iterations, state.used));
        }

        // Inner loop: raise the damping until a step lowers the cost.
        loop {
            let Some(delta) = damped_step(&jac, &r, &col_norms, lambda) else {
                lambda *= LAMBDA_UP;
                if lambda > LAMBDA_MAX {
                    return Err(FitError::Stalled { lambda });
                }
                continue;
            };

            let trial = &p + &delta;
            let r_trial = residuals(model, xs, ys, &trial);
            state.spend(1)?;
            let cost_trial = r_trial.norm_squared();
            let step_small = delta.norm() <= opts.xtol * (p.norm() + opts.xtol);

            if cost_trial.is_finite() && cost_trial < cost {
                let reduction = (cost - cost_trial) / cost;
                p = trial;
                r = r_trial;
                cost = cost_trial;
                iterations += 1;
                lambda = (lambda / LAMBDA_DOWN).max(LAMBDA_MIN);

                if reduction <= opts.ftol || step_small {
                    return Ok(done(&p, cost, iterations, state.used));
                }
                break;
            }

            // No descent even for a negligible step: we are at a stationary point.
            if step_small {
                return Ok(done(&p, cost, iterations, state.used));
            }
            lambda *= LAMBDA_UP;
            if lambda > LAMBDA_MAX {
                return Err(FitError::Stalled { lambda });
            }
        }
    }
}

struct Budget {
    max: usize,
    used: usize,
}

impl Budget {
    fn new(max: usize) -> Self {
        Self { max, used: 0 }
    }

    fn spend(&mut self, n: usize) -> Result<(), FitError> {
        self.used += n;
        if self.used > self.max {
            return Err(FitError::BudgetExhausted(self.max));
        }
        Ok(())
    }
}

fn residuals(model: ModelKind, xs: &[f64], ys: &[f64], p: &DVector<f64>) -> DVector<f64> {
    let p = p.as_slice();
    DVector::from_iterator(
        xs.len(),
        xs.iter().zip(ys).map(|(&x, &y)| model.eval(x, p) - y),
    )
}

fn jacobian(model: ModelKind, xs: &[f64], p: &DVector<f64>) -> DMatrix<f64> {
    let k = model.param_count();
    let p = p.as_slice();
    let mut jac = DMatrix::<f64>::zeros(xs.len(), k);
    let mut row = vec![0.0; k];
    for (i, &x) in xs.iter().enumerate() {
        model.fill_gradient(x, p, &mut row);
        for j in 0..k {
            jac[(i, j)] = row[j];
        }
    }
    jac
}

/// MINPACK-style gradient test: `max_j |J_jᵀ r| / (‖J_j‖ ‖r‖)`.
fn scaled_gradient(jac: &DMatrix<f64>, r: &DVector<f64>, col_norms: &[f64], r_norm: f64) -> f64 {
    if r_norm == 0.0 {
        return 0.0;
    }
    let g = jac.tr_mul(r);
    col_norms
        .iter()
        .enumerate()
        .filter(|(_, n)| **n > 0.0)
        .map(|(j, n)| (g[j] / (n * r_norm)).abs())
        .fold(0.0, f64::max)
}

fn damped_step(
    jac: &DMatrix<f64>,
    r: &DVector<f64>,
    col_norms: &[f64],
    lambda: f64,
) -> Option<DVector<f64>> {
    let (n, k) = jac.shape();
    let mut a = DMatrix::<f64>::zeros(n + k, k);
    a.view_mut((0, 0), (n, k)).copy_from(jac);
    let sl = lambda.sqrt();
    for j in 0..k {
        // Columns that vanish entirely still get a little damping.
        a[(n + j, j)] = sl * col_norms[j].max(1e-8);
    }

    let mut b = DVector::<f64>::zeros(n + k);
    b.rows_mut(0, n).copy_from(&(-r));

    solve_least_squares(&a, &b)
}
