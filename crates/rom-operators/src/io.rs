//! JSON interchange for reduced operators produced by the offline stage.

use crate::counts::ModeCounts;
use crate::error::OperatorResult;
use crate::store::ReducedOperators;
use crate::tensor::ConvectionTensor;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// On-disk layout. Validation happens when converting into [`ReducedOperators`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorsFile {
    pub counts: ModeCounts,
    pub diffusion: DMatrix<f64>,
    pub gradient: DMatrix<f64>,
    pub divergence: DMatrix<f64>,
    pub convection: ConvectionTensor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass: Option<DMatrix<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure_laplacian: Option<DMatrix<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub momentum_divergence: Option<ConvectionTensor>,
}

impl OperatorsFile {
    pub fn into_operators(self) -> OperatorResult<ReducedOperators> {
        let mut ops = ReducedOperators::new(
            self.counts,
            self.diffusion,
            self.gradient,
            self.divergence,
            self.convection,
        )?;
        if let Some(mass) = self.mass {
            ops = ops.with_mass(mass)?;
        }
        match (self.pressure_laplacian, self.momentum_divergence) {
            (Some(d), Some(g)) => ops.with_pressure_poisson(d, g),
            (None, None) => Ok(ops),
            (Some(_), None) => Err(crate::OperatorError::MissingOperator {
                what: "momentum divergence (G)",
            }),
            (None, Some(_)) => Err(crate::OperatorError::MissingOperator {
                what: "pressure laplacian (D)",
            }),
        }
    }
}

impl From<&ReducedOperators> for OperatorsFile {
    fn from(ops: &ReducedOperators) -> Self {
        Self {
            counts: *ops.counts(),
            diffusion: ops.diffusion().clone(),
            gradient: ops.gradient().clone(),
            divergence: ops.divergence().clone(),
            convection: ops.convection().clone(),
            mass: ops.mass().cloned(),
            pressure_laplacian: ops.pressure_laplacian().cloned(),
            momentum_divergence: ops.momentum_divergence().cloned(),
        }
    }
}

pub fn from_json_str(content: &str) -> OperatorResult<ReducedOperators> {
    let file: OperatorsFile = serde_json::from_str(content)?;
    file.into_operators()
}

pub fn load_json(path: &Path) -> OperatorResult<ReducedOperators> {
    let content = std::fs::read_to_string(path)?;
    from_json_str(&content)
}

pub fn save_json(path: &Path, ops: &ReducedOperators) -> OperatorResult<()> {
    let content = serde_json::to_string_pretty(&OperatorsFile::from(ops))?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_roundtrip_keeps_optional_operators() {
        let counts = ModeCounts {
            lifting: 1,
            velocity: 1,
            supremizer: 0,
            pressure: 1,
            boundary: 1,
        };
        let ops = ReducedOperators::new(
            counts,
            DMatrix::from_row_slice(2, 2, &[2.0, 0.1, 0.1, 3.0]),
            DMatrix::from_row_slice(2, 1, &[0.0, 1.0]),
            DMatrix::from_row_slice(1, 2, &[0.0, 1.0]),
            ConvectionTensor::zeros(2, 2),
        )
        .unwrap()
        .with_pressure_poisson(DMatrix::from_element(1, 1, -1.0), ConvectionTensor::zeros(1, 2))
        .unwrap();

        let json = serde_json::to_string(&OperatorsFile::from(&ops)).unwrap();
        let back = from_json_str(&json).unwrap();
        assert_eq!(back.diffusion(), ops.diffusion());
        assert_eq!(back.pressure_laplacian(), ops.pressure_laplacian());
        assert!(back.mass().is_none());
    }

    #[test]
    fn half_specified_poisson_pair_is_rejected() {
        let json = r#"{
            "counts": {"lifting": 1, "velocity": 0, "pressure": 1, "boundary": 1},
            "diffusion": [[1.0], 1, 1],
            "gradient": [[0.0], 1, 1],
            "divergence": [[0.0], 1, 1],
            "convection": [[[0.0], 1, 1]],
            "pressure_laplacian": [[1.0], 1, 1]
        }"#;
        let err = from_json_str(json).unwrap_err();
        assert!(matches!(
            err,
            crate::OperatorError::MissingOperator { .. }
        ));
    }
}
