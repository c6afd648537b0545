//! Error types for solver operations.

use nalgebra::DVector;
use rom_core::CoreError;
use rom_operators::OperatorError;
use thiserror::Error;

/// Errors that can occur while evaluating or solving the reduced system.
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Singular Jacobian at iteration {iteration}")]
    SingularJacobian { iteration: usize },

    #[error("No convergence after {iterations} iterations, best residual = {residual_norm:e}")]
    NonConvergence {
        best: DVector<f64>,
        residual_norm: f64,
        iterations: usize,
    },

    #[error("Non-finite {what} at iteration {iteration}")]
    NumericalDivergence { iteration: usize, what: &'static str },

    #[error("Pressure Laplacian is singular")]
    SingularPressureLaplacian,

    #[error("Pinned unknown {index} drifted to {value} (expected {expected})")]
    ConstraintDrift {
        index: usize,
        value: f64,
        expected: f64,
    },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    #[error("Operator error: {0}")]
    Operators(#[from] OperatorError),
}

pub type SolverResult<T> = Result<T, SolverError>;

impl From<CoreError> for SolverError {
    fn from(e: CoreError) -> Self {
        SolverError::InvalidArg {
            what: e.to_string(),
        }
    }
}

impl SolverError {
    pub(crate) fn check_len(what: &'static str, expected: usize, actual: usize) -> SolverResult<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(SolverError::DimensionMismatch {
                what,
                expected,
                actual,
            })
        }
    }
}
