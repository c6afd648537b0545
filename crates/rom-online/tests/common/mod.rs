#![allow(dead_code)]

use nalgebra::{DMatrix, DVector};
use rom_online::{BasisModes, ModeSet};
use rom_operators::{ConvectionTensor, ModeCounts, ReducedOperators};
use std::sync::Arc;

/// 1 lifting + 3 velocity modes, 2 pressure modes, 1 boundary value.
pub fn counts() -> ModeCounts {
    ModeCounts {
        lifting: 1,
        velocity: 3,
        supremizer: 0,
        pressure: 2,
        boundary: 1,
    }
}

fn entry(i: usize, j: usize, k: usize) -> f64 {
    ((i * 7 + j * 3 + k * 5) % 11) as f64 / 11.0 - 0.5
}

pub fn tensor(count: usize, n: usize, scale: f64) -> ConvectionTensor {
    ConvectionTensor::new(
        (0..count)
            .map(|k| DMatrix::from_fn(n, n, |i, j| scale * entry(i, j, k)))
            .collect(),
    )
}

/// Operators with convection scaled by `convection`; zero gives the Stokes limit.
pub fn operators(convection: f64) -> Arc<ReducedOperators> {
    let b = DMatrix::from_fn(4, 4, |i, j| {
        if i == j {
            2.0 + i as f64
        } else {
            0.2 + 0.1 * entry(i, j, 1)
        }
    });
    let p = DMatrix::from_row_slice(2, 4, &[0.0, 1.0, 0.0, 0.5, 0.0, 0.0, 1.0, -0.3]);
    let k = p.transpose();
    let d = DMatrix::from_row_slice(2, 2, &[-2.0, 0.3, 0.3, -1.5]);
    let ops = ReducedOperators::new(counts(), b, k, p, tensor(4, 4, convection))
        .unwrap()
        .with_pressure_poisson(d, tensor(2, 4, convection * 1.5))
        .unwrap();
    Arc::new(ops)
}

fn modes(count: usize, len: usize, offset: usize) -> ModeSet {
    ModeSet::new(
        (0..count)
            .map(|k| DVector::from_fn(len, |i, _| ((i + 1) as f64 * (k + offset + 1) as f64).cos()))
            .collect(),
    )
    .unwrap()
}

/// Velocity fields of length 9, pressure fields of length 3.
pub fn basis() -> BasisModes {
    BasisModes {
        lifting: modes(1, 9, 0),
        velocity: modes(3, 9, 1),
        supremizer: ModeSet::default(),
        pressure: modes(2, 3, 0),
    }
}
