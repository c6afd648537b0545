//! Finite difference Jacobian of the reduced residual.
//!
//! The analytic Jacobian in [`crate::model`] is the default; central
//! differences are used for [`crate::JacobianMode::FiniteDifference`] solves
//! and as a reference when checking the analytic derivative.

use crate::error::SolverResult;
use nalgebra::{DMatrix, DVector};

fn step(x: f64, epsilon: f64) -> f64 {
    epsilon * x.abs().max(1.0)
}

/// Central differences: second order accurate, two evaluations per column.
pub fn central_difference_jacobian<F>(
    x: &DVector<f64>,
    f: F,
    epsilon: f64,
) -> SolverResult<DMatrix<f64>>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
{
    let m = f(x)?.len();
    let mut jac = DMatrix::zeros(m, x.len());
    let mut x_shift = x.clone();

    for j in 0..x.len() {
        let h = step(x[j], epsilon);

        x_shift[j] = x[j] + h;
        let f_plus = f(&x_shift)?;
        x_shift[j] = x[j] - h;
        let f_minus = f(&x_shift)?;
        x_shift[j] = x[j];

        jac.set_column(j, &((f_plus - f_minus) / (2.0 * h)));
    }

    Ok(jac)
}
