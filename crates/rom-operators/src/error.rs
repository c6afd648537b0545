//! Error types for operator construction.

use rom_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OperatorError {
    #[error("Dimension mismatch for {what}: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        what: String,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Missing operator: {what}")]
    MissingOperator { what: &'static str },

    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    #[cfg(feature = "serde")]
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type OperatorResult<T> = Result<T, OperatorError>;

impl OperatorError {
    pub(crate) fn shape(
        what: impl Into<String>,
        expected: (usize, usize),
        actual: (usize, usize),
    ) -> Self {
        OperatorError::DimensionMismatch {
            what: what.into(),
            expected,
            actual,
        }
    }
}
