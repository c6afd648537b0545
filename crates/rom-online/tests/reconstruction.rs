//! Reconstruction of the online history into full-order fields.

mod common;

use nalgebra::DVector;
use rom_online::{
    BasisModes, FieldSink, ModeSet, OnlineSettings, ReconstructedField, ReducedSteadyNs,
    RomError, RomResult, Stabilization,
};
use std::path::{Path, PathBuf};

fn solved(stabilization: Stabilization, queries: &[f64]) -> ReducedSteadyNs {
    let mut rom = ReducedSteadyNs::new(
        common::operators(0.2),
        stabilization,
        OnlineSettings::new(1.0),
    )
    .unwrap();
    for &bc in queries {
        rom.solve_online(&[bc]).unwrap();
    }
    rom
}

#[derive(Default)]
struct RecordingSink {
    writes: Vec<(PathBuf, Vec<ReconstructedField>)>,
}

impl FieldSink for RecordingSink {
    fn write_fields(&mut self, folder: &Path, fields: &[ReconstructedField]) -> RomResult<()> {
        self.writes.push((folder.to_path_buf(), fields.to_vec()));
        Ok(())
    }
}

#[test]
fn stride_two_over_five_solutions_gives_three_fields() {
    let rom = solved(Stabilization::Supremizer, &[0.2, 0.4, 0.6, 0.8, 1.0]);
    let fields = rom.reconstruct(&common::basis(), 2).unwrap();
    let picked: Vec<usize> = fields.iter().map(|f| f.solution_index).collect();
    assert_eq!(picked, vec![0, 2, 4]);
    assert_eq!(fields[1].query, 3);

    assert_eq!(rom.reconstruct(&common::basis(), 1).unwrap().len(), 5);
}

#[test]
fn fields_are_linear_combinations_of_modes() {
    for stabilization in [Stabilization::Supremizer, Stabilization::Ppe] {
        let rom = solved(stabilization, &[0.9]);
        let basis = common::basis();
        let fields = rom.reconstruct(&basis, 1).unwrap();
        let y = &rom.history().get(0).unwrap().coefficients;

        let mut u = DVector::zeros(9);
        for (k, mode) in basis.velocity_modes().enumerate() {
            u += mode * y[k];
        }
        assert!((&fields[0].velocity - u).amax() < 1e-12);

        let b = rom.model().pressure_coefficients(y).unwrap();
        let mut p = DVector::zeros(3);
        for (j, mode) in basis.pressure.iter().enumerate() {
            p += mode * b[j];
        }
        assert!((&fields[0].pressure - p).amax() < 1e-12);
    }
}

#[test]
fn zero_coefficients_give_zero_fields() {
    let basis = common::basis();
    let u = basis.velocity_field(&[0.0; 4]).unwrap();
    assert_eq!(u.len(), 9);
    assert!(u.iter().all(|&v| v == 0.0));

    // Homogeneous boundary data has the trivial solution
    for stabilization in [Stabilization::Supremizer, Stabilization::Ppe] {
        let rom = solved(stabilization, &[0.0]);
        let fields = rom.reconstruct(&basis, 1).unwrap();
        assert!(fields[0].velocity.amax() < 1e-12);
        assert!(fields[0].pressure.amax() < 1e-12);
    }
}

#[test]
fn reconstruction_is_idempotent() {
    let rom = solved(Stabilization::Ppe, &[0.3, 0.7]);
    let first = rom.reconstruct(&common::basis(), 1).unwrap();
    let second = rom.reconstruct(&common::basis(), 1).unwrap();
    assert_eq!(first, second);
}

#[test]
fn mismatched_basis_produces_no_output() {
    let rom = solved(Stabilization::Supremizer, &[0.5, 0.6]);
    let mut basis = common::basis();
    basis.pressure = ModeSet::new(vec![DVector::zeros(3)]).unwrap();

    let err = rom.reconstruct(&basis, 1).unwrap_err();
    assert!(matches!(err, RomError::DimensionMismatch { .. }));

    let mut sink = RecordingSink::default();
    assert!(rom.export(&basis, &mut sink, Path::new("out"), 1).is_err());
    assert!(sink.writes.is_empty());

    // Velocity modes shorter than the lifting function
    let ragged = BasisModes {
        velocity: ModeSet::new(vec![DVector::zeros(8); 3]).unwrap(),
        ..common::basis()
    };
    assert!(rom.reconstruct(&ragged, 1).unwrap_err().is_dimension_mismatch());
}

#[test]
fn zero_stride_is_rejected() {
    let rom = solved(Stabilization::Supremizer, &[0.5]);
    let err = rom.reconstruct(&common::basis(), 0).unwrap_err();
    assert!(matches!(err, RomError::InvalidArg { .. }));
}

#[test]
fn export_hands_fields_to_sink() {
    let rom = solved(Stabilization::Ppe, &[0.1, 0.2, 0.3]);
    let mut sink = RecordingSink::default();
    let written = rom
        .export(&common::basis(), &mut sink, Path::new("online_rec"), 2)
        .unwrap();
    assert_eq!(written, 2);
    assert_eq!(sink.writes.len(), 1);
    assert_eq!(sink.writes[0].0, PathBuf::from("online_rec"));
    assert_eq!(sink.writes[0].1.len(), 2);
}

#[test]
fn empty_history_reconstructs_nothing() {
    let rom = ReducedSteadyNs::supremizer(common::operators(0.2), OnlineSettings::new(1.0))
        .unwrap();
    assert!(rom.reconstruct(&common::basis(), 3).unwrap().is_empty());
}
