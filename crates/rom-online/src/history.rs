//! Append-only record of accepted online solutions.

use crate::error::{RomError, RomResult};
use nalgebra::DVector;

/// One converged online query.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OnlineSolution {
    /// 1-based query number of the driver that produced it
    pub query: usize,
    /// Boundary vector the solve was pinned to
    pub boundary: DVector<f64>,
    pub viscosity: f64,
    /// Reduced unknowns (`[a; b]` or `a`, depending on the stabilisation)
    pub coefficients: DVector<f64>,
    pub residual_norm: f64,
    pub iterations: usize,
}

/// Online solutions in query order. Entries are never removed.
#[derive(Clone, Debug, Default)]
pub struct OnlineHistory {
    entries: Vec<OnlineSolution>,
}

impl OnlineHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, solution: OnlineSolution) -> &OnlineSolution {
        self.entries.push(solution);
        &self.entries[self.entries.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&OnlineSolution> {
        self.entries.get(i)
    }

    pub fn last(&self) -> Option<&OnlineSolution> {
        self.entries.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OnlineSolution> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[OnlineSolution] {
        &self.entries
    }

    /// Every `stride`-th entry with its history position: 0, stride, 2*stride, ...
    pub fn strided(
        &self,
        stride: usize,
    ) -> RomResult<impl Iterator<Item = (usize, &OnlineSolution)>> {
        if stride == 0 {
            return Err(RomError::InvalidArg {
                what: "reconstruction stride must be at least 1".to_string(),
            });
        }
        Ok(self.entries.iter().enumerate().step_by(stride))
    }
}
