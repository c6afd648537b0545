//! Expansion of reduced solutions into full-order fields.

use crate::basis::BasisModes;
use crate::driver::ReducedSteadyNs;
use crate::error::{RomError, RomResult};
use crate::history::{OnlineHistory, OnlineSolution};
use nalgebra::DVector;
use rayon::prelude::*;
use rom_solver::ReducedModel;
use std::path::Path;

/// Full-order approximation of one history entry.
#[derive(Clone, Debug, PartialEq)]
pub struct ReconstructedField {
    /// Position in the online history
    pub solution_index: usize,
    /// Query number of the source solution
    pub query: usize,
    pub velocity: DVector<f64>,
    pub pressure: DVector<f64>,
}

/// Persistence side of the full-order problem.
pub trait FieldSink {
    fn write_fields(&mut self, folder: &Path, fields: &[ReconstructedField]) -> RomResult<()>;
}

fn expand(
    model: &ReducedModel,
    basis: &BasisModes,
    index: usize,
    solution: &OnlineSolution,
) -> RomResult<ReconstructedField> {
    let a = model.velocity_coefficients(&solution.coefficients)?;
    let b = model.pressure_coefficients(&solution.coefficients)?;
    Ok(ReconstructedField {
        solution_index: index,
        query: solution.query,
        velocity: basis.velocity_field(a.as_slice())?,
        pressure: basis.pressure_field(b.as_slice())?,
    })
}

/// Reconstruct every `stride`-th entry of `history`.
///
/// All shapes are checked before any field is built, so the result is either
/// complete or an error.
pub fn reconstruct_history(
    model: &ReducedModel,
    history: &OnlineHistory,
    basis: &BasisModes,
    stride: usize,
) -> RomResult<Vec<ReconstructedField>> {
    let selected: Vec<(usize, &OnlineSolution)> = history.strided(stride)?.collect();
    basis.check(model.operators().counts())?;

    let n = model.unknown_count();
    for (i, solution) in &selected {
        if solution.coefficients.len() != n {
            return Err(RomError::dims(
                format!("coefficients of history entry {i}"),
                n,
                solution.coefficients.len(),
            ));
        }
    }

    selected
        .par_iter()
        .map(|&(i, solution)| expand(model, basis, i, solution))
        .collect()
}

impl ReducedSteadyNs {
    /// Fields for history entries `0, stride, 2*stride, ...`.
    pub fn reconstruct(
        &self,
        basis: &BasisModes,
        stride: usize,
    ) -> RomResult<Vec<ReconstructedField>> {
        reconstruct_history(&self.model, &self.history, basis, stride)
    }

    /// Reconstruct and hand the fields to `sink`. Returns the number written.
    pub fn export(
        &self,
        basis: &BasisModes,
        sink: &mut dyn FieldSink,
        folder: &Path,
        stride: usize,
    ) -> RomResult<usize> {
        let fields = self.reconstruct(basis, stride)?;
        sink.write_fields(folder, &fields)?;
        tracing::info!(
            count = fields.len(),
            stride,
            folder = %folder.display(),
            "reconstructed fields exported"
        );
        Ok(fields.len())
    }
}
