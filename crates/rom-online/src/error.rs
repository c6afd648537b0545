//! Error types for online solves and reconstruction.

use nalgebra::DVector;
use rom_operators::OperatorError;
use rom_solver::SolverError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RomError {
    #[error("Dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    #[error("Export failed: {what}")]
    Export { what: String },

    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    #[error("Operator error: {0}")]
    Operators(#[from] OperatorError),
}

pub type RomResult<T> = Result<T, RomError>;

impl RomError {
    pub(crate) fn dims(what: impl Into<String>, expected: usize, actual: usize) -> Self {
        RomError::DimensionMismatch {
            what: what.into(),
            expected,
            actual,
        }
    }

    /// True for a dimension mismatch raised at any layer.
    pub fn is_dimension_mismatch(&self) -> bool {
        matches!(
            self,
            RomError::DimensionMismatch { .. }
                | RomError::Solver(SolverError::DimensionMismatch { .. })
                | RomError::Operators(OperatorError::DimensionMismatch { .. })
        )
    }

    /// Best iterate and its residual norm when Newton ran out of budget.
    pub fn non_convergence(&self) -> Option<(&DVector<f64>, f64)> {
        match self {
            RomError::Solver(SolverError::NonConvergence {
                best,
                residual_norm,
                ..
            }) => Some((best, *residual_norm)),
            _ => None,
        }
    }
}
