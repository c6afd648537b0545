//! Newton solver with backtracking line search and pinned-row verification.

use crate::error::{SolverError, SolverResult};
use nalgebra::{DMatrix, DVector};
use rom_core::{Tolerances, nearly_equal};

/// Newton solver configuration.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NewtonConfig {
    /// Maximum iterations
    pub max_iterations: usize,
    /// Absolute tolerance on the residual 2-norm
    pub abs_tol: f64,
    /// Line search backtracking factor
    pub line_search_beta: f64,
    /// Maximum line search iterations
    pub max_line_search_iters: usize,
    /// Smallest accepted |U_ii| / max |U_ii| of the LU factor
    pub min_pivot_ratio: f64,
    /// Relative tolerance for pinned unknowns
    pub pin_tol: f64,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            abs_tol: 1e-5,
            line_search_beta: 0.5,
            max_line_search_iters: 20,
            min_pivot_ratio: 1e-14,
            pin_tol: 1e-10,
        }
    }
}

/// Converged Newton iterate.
#[derive(Clone, Debug)]
pub struct NewtonResult {
    /// Solution vector
    pub x: DVector<f64>,
    /// Final residual norm
    pub residual_norm: f64,
    /// Number of Newton updates taken
    pub iterations: usize,
}

fn pin_tolerance(tol: f64) -> Tolerances {
    Tolerances { abs: tol, rel: tol }
}

fn pins_hold(x: &DVector<f64>, pinned: &[f64], tol: f64) -> bool {
    pinned
        .iter()
        .enumerate()
        .all(|(j, &bc)| nearly_equal(x[j], bc, pin_tolerance(tol)))
}

fn verify_pins(x: &DVector<f64>, pinned: &[f64], tol: f64) -> SolverResult<()> {
    for (j, &bc) in pinned.iter().enumerate() {
        if !nearly_equal(x[j], bc, pin_tolerance(tol)) {
            return Err(SolverError::ConstraintDrift {
                index: j,
                value: x[j],
                expected: bc,
            });
        }
    }
    Ok(())
}

/// Solve `J dx = -r` with a dense LU, rejecting (near-)singular factors.
fn newton_step(
    jac: DMatrix<f64>,
    r: &DVector<f64>,
    iteration: usize,
    config: &NewtonConfig,
) -> SolverResult<DVector<f64>> {
    let lu = jac.lu();
    let pivots = lu.u().diagonal().abs();
    let largest = pivots.max();
    if !(largest > 0.0) || pivots.min() < config.min_pivot_ratio * largest {
        return Err(SolverError::SingularJacobian { iteration });
    }

    let dx = lu
        .solve(&(-r.clone()))
        .ok_or(SolverError::SingularJacobian { iteration })?;
    if dx.iter().any(|v| !v.is_finite()) {
        return Err(SolverError::SingularJacobian { iteration });
    }
    Ok(dx)
}

/// Newton-Raphson on `residual_fn(x) = 0`.
///
/// `pinned` holds the prescribed values of the leading unknowns. The residual
/// is expected to carry the identity constraint rows for them; once they hold
/// they are checked after every update rather than re-imposed.
///
/// On budget exhaustion, or when a line search finds no decrease, the best
/// iterate seen is returned inside [`SolverError::NonConvergence`].
pub fn newton_solve<F, J>(
    x0: DVector<f64>,
    pinned: &[f64],
    residual_fn: F,
    jacobian_fn: J,
    config: &NewtonConfig,
) -> SolverResult<NewtonResult>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
    J: Fn(&DVector<f64>) -> SolverResult<DMatrix<f64>>,
{
    if pinned.len() > x0.len() {
        return Err(SolverError::DimensionMismatch {
            what: "pinned unknowns",
            expected: x0.len(),
            actual: pinned.len(),
        });
    }

    let mut x = x0;
    let mut r = residual_fn(&x)?;
    SolverError::check_len("residual", x.len(), r.len())?;
    let mut r_norm = r.norm();
    if !r_norm.is_finite() {
        return Err(SolverError::NumericalDivergence {
            iteration: 0,
            what: "residual",
        });
    }
    let mut best = x.clone();
    let mut best_norm = r_norm;

    for iter in 0..config.max_iterations {
        if r_norm < config.abs_tol {
            return Ok(NewtonResult {
                x,
                residual_norm: r_norm,
                iterations: iter,
            });
        }

        let jac = jacobian_fn(&x)?;
        if jac.iter().any(|v| !v.is_finite()) {
            return Err(SolverError::NumericalDivergence {
                iteration: iter,
                what: "Jacobian",
            });
        }
        let dx = newton_step(jac, &r, iter, config)?;
        let pinned_before = pins_hold(&x, pinned, config.pin_tol);

        // Full step first, backtrack while the residual does not decrease
        let mut alpha = 1.0;
        let mut accepted = None;
        let mut any_finite = false;
        for _ in 0..=config.max_line_search_iters {
            let x_trial = &x + alpha * &dx;
            let r_trial = residual_fn(&x_trial)?;
            let trial_norm = r_trial.norm();
            if trial_norm.is_finite() {
                any_finite = true;
                if trial_norm < r_norm {
                    accepted = Some((x_trial, r_trial, trial_norm));
                    break;
                }
            }
            alpha *= config.line_search_beta;
        }

        let Some((x_new, r_new, r_new_norm)) = accepted else {
            if !any_finite {
                return Err(SolverError::NumericalDivergence {
                    iteration: iter + 1,
                    what: "residual",
                });
            }
            tracing::warn!(iteration = iter + 1, "line search found no decrease");
            return Err(SolverError::NonConvergence {
                best,
                residual_norm: best_norm,
                iterations: iter + 1,
            });
        };

        if pinned_before {
            verify_pins(&x_new, pinned, config.pin_tol)?;
        }

        x = x_new;
        r = r_new;
        r_norm = r_new_norm;
        tracing::debug!(
            iteration = iter + 1,
            residual_norm = r_norm,
            step = alpha,
            "newton update"
        );

        if r_norm < best_norm {
            best.copy_from(&x);
            best_norm = r_norm;
        }
    }

    if r_norm < config.abs_tol {
        return Ok(NewtonResult {
            x,
            residual_norm: r_norm,
            iterations: config.max_iterations,
        });
    }

    Err(SolverError::NonConvergence {
        best,
        residual_norm: best_norm,
        iterations: config.max_iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_quadratic() {
        // Solve x^2 - 4 = 0 from x = 3
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] * x[0] - 4.0))
        };
        let jacobian = |x: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            Ok(DMatrix::from_element(1, 1, 2.0 * x[0]))
        };

        let x0 = DVector::from_element(1, 3.0);
        let result = newton_solve(x0, &[], residual, jacobian, &NewtonConfig::default()).unwrap();

        assert!((result.x[0] - 2.0).abs() < 1e-6);
        assert!(result.residual_norm < 1e-5);
    }

    #[test]
    fn linear_system_takes_one_update() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 2.0, 5.0]);
        let b = DVector::from_vec(vec![3.0, 1.0]);
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> { Ok(&a * x - &b) };
        let jacobian = |_: &DVector<f64>| -> SolverResult<DMatrix<f64>> { Ok(a.clone()) };

        let x0 = DVector::from_vec(vec![3.0, -40.0]);
        let result = newton_solve(x0, &[3.0], residual, jacobian, &NewtonConfig::default()).unwrap();

        assert_eq!(result.iterations, 1);
        assert!((result.x[0] - 3.0).abs() < 1e-12);
        assert!((result.x[1] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn converged_guess_takes_no_update() {
        let residual =
            |x: &DVector<f64>| -> SolverResult<DVector<f64>> { Ok(x.map(|v| v * v * v)) };
        let jacobian = |x: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            Ok(DMatrix::from_diagonal(&x.map(|v| 3.0 * v * v)))
        };
        let result = newton_solve(
            DVector::zeros(3),
            &[],
            residual,
            jacobian,
            &NewtonConfig::default(),
        )
        .unwrap();
        assert_eq!(result.iterations, 0);
    }

    #[test]
    fn singular_jacobian_is_reported() {
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_vec(vec![x[0] + x[1] - 1.0, 2.0 * x[0] + 2.0 * x[1]]))
        };
        let jacobian = |_: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            Ok(DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 2.0, 2.0]))
        };
        let err = newton_solve(
            DVector::zeros(2),
            &[],
            residual,
            jacobian,
            &NewtonConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SolverError::SingularJacobian { iteration: 0 }));
    }

    #[test]
    fn budget_exhaustion_returns_best_iterate() {
        // x^2 + 1 has no real root; Newton wanders
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] * x[0] + 1.0))
        };
        let jacobian = |x: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            Ok(DMatrix::from_element(1, 1, 2.0 * x[0]))
        };
        let config = NewtonConfig {
            max_iterations: 5,
            ..NewtonConfig::default()
        };
        let err = newton_solve(DVector::from_element(1, 2.0), &[], residual, jacobian, &config)
            .unwrap_err();
        match err {
            SolverError::NonConvergence {
                best,
                residual_norm,
                ..
            } => {
                assert_eq!(best.len(), 1);
                assert!((residual_norm - (best[0] * best[0] + 1.0)).abs() < 1e-12);
                assert!(residual_norm <= 5.0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_finite_initial_residual_is_divergence() {
        let residual = |_: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, f64::NAN))
        };
        let jacobian =
            |_: &DVector<f64>| -> SolverResult<DMatrix<f64>> { Ok(DMatrix::identity(1, 1)) };
        let err = newton_solve(
            DVector::zeros(1),
            &[],
            residual,
            jacobian,
            &NewtonConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SolverError::NumericalDivergence { iteration: 0, .. }
        ));
    }

    #[test]
    fn failed_line_search_returns_best_iterate() {
        // Jacobian with the wrong sign: every step points uphill
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] - 1.0))
        };
        let jacobian =
            |_: &DVector<f64>| -> SolverResult<DMatrix<f64>> { Ok(-DMatrix::identity(1, 1)) };
        let err = newton_solve(
            DVector::from_element(1, 3.0),
            &[],
            residual,
            jacobian,
            &NewtonConfig::default(),
        )
        .unwrap_err();
        match err {
            SolverError::NonConvergence {
                best,
                residual_norm,
                iterations,
            } => {
                assert_eq!(best[0], 3.0);
                assert_eq!(residual_norm, 2.0);
                assert_eq!(iterations, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_finite_trials_are_divergence() {
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            if x[0] == 0.0 {
                Ok(DVector::from_element(1, 1.0))
            } else {
                Ok(DVector::from_element(1, f64::INFINITY))
            }
        };
        let jacobian =
            |_: &DVector<f64>| -> SolverResult<DMatrix<f64>> { Ok(DMatrix::identity(1, 1)) };
        let err = newton_solve(
            DVector::zeros(1),
            &[],
            residual,
            jacobian,
            &NewtonConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SolverError::NumericalDivergence { iteration: 1, .. }
        ));
    }

    #[test]
    fn drifting_pinned_row_is_detected() {
        // Constraint row deliberately wrong: residual row 0 does not pin x0
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_vec(vec![x[0] - 2.0, x[1] - 1.0]))
        };
        let jacobian =
            |_: &DVector<f64>| -> SolverResult<DMatrix<f64>> { Ok(DMatrix::identity(2, 2)) };
        let err = newton_solve(
            DVector::from_vec(vec![1.0, 0.0]),
            &[1.0],
            residual,
            jacobian,
            &NewtonConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SolverError::ConstraintDrift { index: 0, .. }));
    }
}
