//! Basis modes supplied by the full-order problem.

use crate::error::{RomError, RomResult};
use nalgebra::DVector;
use rom_operators::ModeCounts;

/// Ordered set of full-order fields of equal length.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ModeSet {
    modes: Vec<DVector<f64>>,
}

impl ModeSet {
    pub fn new(modes: Vec<DVector<f64>>) -> RomResult<Self> {
        if let Some(first) = modes.first() {
            for (i, mode) in modes.iter().enumerate() {
                if mode.len() != first.len() {
                    return Err(RomError::dims(format!("length of mode {i}"), first.len(), mode.len()));
                }
            }
        }
        Ok(Self { modes })
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    /// Length of every mode, `None` for an empty set.
    pub fn field_len(&self) -> Option<usize> {
        self.modes.first().map(|m| m.len())
    }

    /// Common mode length, checked across the whole set.
    fn uniform_len(&self, what: &str) -> RomResult<Option<usize>> {
        let len = self.field_len();
        if let Some(expected) = len
            && let Some(bad) = self.modes.iter().find(|m| m.len() != expected)
        {
            return Err(RomError::dims(format!("{what} mode length"), expected, bad.len()));
        }
        Ok(len)
    }

    pub fn mode(&self, i: usize) -> Option<&DVector<f64>> {
        self.modes.get(i)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DVector<f64>> {
        self.modes.iter()
    }
}

/// Velocity and pressure bases of a full-order problem.
///
/// Velocity coefficients address `lifting ++ velocity ++ supremizer`, the
/// same order as the reduced operators.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BasisModes {
    #[cfg_attr(feature = "serde", serde(default))]
    pub lifting: ModeSet,
    pub velocity: ModeSet,
    #[cfg_attr(feature = "serde", serde(default))]
    pub supremizer: ModeSet,
    pub pressure: ModeSet,
}

impl BasisModes {
    pub fn velocity_modes(&self) -> impl Iterator<Item = &DVector<f64>> {
        self.lifting
            .iter()
            .chain(self.velocity.iter())
            .chain(self.supremizer.iter())
    }

    pub fn velocity_count(&self) -> usize {
        self.lifting.len() + self.velocity.len() + self.supremizer.len()
    }

    fn velocity_field_len(&self) -> RomResult<usize> {
        let mut len = None;
        for (what, set) in [
            ("lifting", &self.lifting),
            ("velocity", &self.velocity),
            ("supremizer", &self.supremizer),
        ] {
            match (len, set.uniform_len(what)?) {
                (None, Some(l)) => len = Some(l),
                (Some(expected), Some(actual)) if expected != actual => {
                    return Err(RomError::dims(format!("{what} mode length"), expected, actual));
                }
                _ => {}
            }
        }
        Ok(len.unwrap_or(0))
    }

    /// Check the mode counts against the operator metadata.
    pub fn check(&self, counts: &ModeCounts) -> RomResult<()> {
        for (what, expected, actual) in [
            ("lifting modes", counts.lifting, self.lifting.len()),
            ("velocity modes", counts.velocity, self.velocity.len()),
            ("supremizer modes", counts.supremizer, self.supremizer.len()),
            ("pressure modes", counts.pressure, self.pressure.len()),
        ] {
            if expected != actual {
                return Err(RomError::dims(what, expected, actual));
            }
        }
        self.velocity_field_len()?;
        self.pressure.uniform_len("pressure")?;
        Ok(())
    }

    /// `sum_k a_k U_k` over the velocity modes.
    pub fn velocity_field(&self, a: &[f64]) -> RomResult<DVector<f64>> {
        if a.len() != self.velocity_count() {
            return Err(RomError::dims(
                "velocity coefficients",
                self.velocity_count(),
                a.len(),
            ));
        }
        let mut field = DVector::zeros(self.velocity_field_len()?);
        for (mode, &w) in self.velocity_modes().zip(a) {
            field.axpy(w, mode, 1.0);
        }
        Ok(field)
    }

    /// `sum_j b_j P_j` over the pressure modes.
    pub fn pressure_field(&self, b: &[f64]) -> RomResult<DVector<f64>> {
        if b.len() != self.pressure.len() {
            return Err(RomError::dims("pressure coefficients", self.pressure.len(), b.len()));
        }
        let mut field = DVector::zeros(self.pressure.uniform_len("pressure")?.unwrap_or(0));
        for (mode, &w) in self.pressure.iter().zip(b) {
            field.axpy(w, mode, 1.0);
        }
        Ok(field)
    }
}
