//! Reduced inf-sup constant of the velocity/pressure basis pair.

use crate::error::{RomError, RomResult};
use nalgebra::DMatrix;
use rom_operators::{OperatorError, ReducedOperators};

/// Norm used on the pressure space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PressureNorm {
    /// L2-orthonormal pressure modes (identity Gram matrix)
    #[default]
    L2,
    /// H1 seminorm given by -D
    Laplacian,
}

fn invalid(what: &str) -> RomError {
    RomError::InvalidArg {
        what: what.to_string(),
    }
}

fn symmetrize(m: DMatrix<f64>) -> DMatrix<f64> {
    (&m + m.transpose()) * 0.5
}

/// `beta = sqrt(lambda_min(N^-1/2 P M^-1 Pᵀ N^-1/2))`.
///
/// M is the velocity mass matrix (identity when the store has none) and N the
/// pressure Gram matrix selected by `norm`.
pub fn inf_sup_constant(ops: &ReducedOperators, norm: PressureNorm) -> RomResult<f64> {
    if ops.n_p() == 0 {
        return Err(invalid("inf-sup constant needs at least one pressure mode"));
    }
    let p = ops.divergence();

    let m_inv_pt = match ops.mass() {
        Some(m) => m
            .clone()
            .lu()
            .solve(&p.transpose())
            .ok_or_else(|| invalid("velocity mass matrix is singular"))?,
        None => p.transpose(),
    };
    let schur = symmetrize(p * m_inv_pt);

    let schur = match norm {
        PressureNorm::L2 => schur,
        PressureNorm::Laplacian => {
            let d = ops
                .pressure_laplacian()
                .ok_or(OperatorError::MissingOperator {
                    what: "pressure laplacian (D)",
                })?;
            let gram = symmetrize(-d.clone());
            let l = gram
                .cholesky()
                .ok_or_else(|| invalid("-D is not positive definite"))?
                .l();
            // L^-1 S L^-T
            let left = l
                .solve_lower_triangular(&schur)
                .ok_or_else(|| invalid("pressure Gram factor is singular"))?;
            let both = l
                .solve_lower_triangular(&left.transpose())
                .ok_or_else(|| invalid("pressure Gram factor is singular"))?;
            symmetrize(both)
        }
    };

    let lambda_min = schur.symmetric_eigenvalues().min();
    Ok(lambda_min.max(0.0).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rom_operators::{ConvectionTensor, ModeCounts};

    fn store(p: DMatrix<f64>) -> ReducedOperators {
        let (np, nu) = p.shape();
        let counts = ModeCounts {
            lifting: 0,
            velocity: nu,
            supremizer: 0,
            pressure: np,
            boundary: 0,
        };
        ReducedOperators::new(
            counts,
            DMatrix::identity(nu, nu),
            p.transpose(),
            p,
            ConvectionTensor::zeros(nu, nu),
        )
        .unwrap()
    }

    #[test]
    fn orthonormal_divergence_gives_one() {
        let ops = store(DMatrix::identity(2, 2));
        let beta = inf_sup_constant(&ops, PressureNorm::L2).unwrap();
        assert!((beta - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rank_deficient_divergence_gives_zero() {
        let p = DMatrix::from_row_slice(2, 3, &[1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let beta = inf_sup_constant(&store(p), PressureNorm::L2).unwrap();
        assert!(beta.abs() < 1e-7);
    }

    #[test]
    fn mass_matrix_scales_the_constant() {
        let ops = store(DMatrix::identity(2, 2))
            .with_mass(DMatrix::identity(2, 2) * 2.0)
            .unwrap();
        let beta = inf_sup_constant(&ops, PressureNorm::L2).unwrap();
        assert!((beta - 0.5_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn laplacian_norm_uses_minus_d() {
        let ops = store(DMatrix::identity(2, 2))
            .with_pressure_poisson(DMatrix::identity(2, 2) * -4.0, ConvectionTensor::zeros(2, 2))
            .unwrap();
        let beta = inf_sup_constant(&ops, PressureNorm::Laplacian).unwrap();
        assert!((beta - 0.5).abs() < 1e-12);

        let err = inf_sup_constant(&store(DMatrix::identity(2, 2)), PressureNorm::Laplacian)
            .unwrap_err();
        assert!(matches!(err, RomError::Operators(_)));
    }

    #[test]
    fn singular_mass_is_rejected() {
        let ops = store(DMatrix::identity(2, 2))
            .with_mass(DMatrix::zeros(2, 2))
            .unwrap();
        assert!(inf_sup_constant(&ops, PressureNorm::L2).is_err());
    }
}
