//! Third-order tensors stored as a fixed array of dense slices.

use crate::error::{OperatorError, OperatorResult};
use nalgebra::{DMatrix, DVector};

/// A 3-index tensor `T[k][i][j]` stored as `len()` dense `n x n` slices.
///
/// Used for the convection tensor C (one slice per velocity mode) and the
/// divergence-of-momentum tensor G (one slice per pressure mode). The slice
/// count is fixed at construction.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ConvectionTensor {
    slices: Box<[DMatrix<f64>]>,
}

impl ConvectionTensor {
    pub fn new(slices: Vec<DMatrix<f64>>) -> Self {
        Self {
            slices: slices.into_boxed_slice(),
        }
    }

    /// All-zero tensor with `count` slices of size `n x n`.
    pub fn zeros(count: usize, n: usize) -> Self {
        Self::new(vec![DMatrix::zeros(n, n); count])
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DMatrix<f64>> {
        self.slices.iter()
    }

    /// Check the slice count and that every slice is `n x n`.
    pub fn check_shape(&self, what: &str, count: usize, n: usize) -> OperatorResult<()> {
        if self.len() != count {
            return Err(OperatorError::shape(
                format!("{what} slice count"),
                (count, 1),
                (self.len(), 1),
            ));
        }
        for (k, s) in self.slices.iter().enumerate() {
            if s.shape() != (n, n) {
                return Err(OperatorError::shape(format!("{what}[{k}]"), (n, n), s.shape()));
            }
        }
        Ok(())
    }

    /// Quadratic contraction: `out[k] = aᵀ T[k] a`.
    pub fn contract(&self, a: &DVector<f64>) -> DVector<f64> {
        DVector::from_iterator(self.len(), self.slices.iter().map(|s| a.dot(&(s * a))))
    }

    /// Derivative of [`contract`](Self::contract) with respect to `a`.
    ///
    /// Row `k` is `((T[k] + T[k]ᵀ) a)ᵀ`.
    pub fn linearize(&self, a: &DVector<f64>) -> DMatrix<f64> {
        let n = a.len();
        let mut out = DMatrix::zeros(self.len(), n);
        for (k, s) in self.slices.iter().enumerate() {
            let row = s * a + s.tr_mul(a);
            for j in 0..n {
                out[(k, j)] = row[j];
            }
        }
        out
    }

    pub fn is_finite(&self) -> bool {
        self.slices.iter().all(|s| s.iter().all(|v| v.is_finite()))
    }
}
