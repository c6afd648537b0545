//! Immutable container for the reduced operators.

use crate::counts::ModeCounts;
use crate::error::{OperatorError, OperatorResult};
use crate::tensor::ConvectionTensor;
use nalgebra::DMatrix;
use rom_core::{CoreError, ensure_all_finite};

/// Precomputed reduced operators of the steady Navier-Stokes Galerkin model.
///
/// Every index refers to the same mode ordering across all operators
/// (lifting ++ velocity ++ supremizer for velocity, POD order for pressure).
/// Construct with [`ReducedOperators::new`] and the `with_*` methods; every
/// step checks shapes against the [`ModeCounts`]. Once built the store is
/// read-only and is usually shared behind an `Arc`.
#[derive(Clone, Debug)]
pub struct ReducedOperators {
    counts: ModeCounts,
    /// B: Nu x Nu
    diffusion: DMatrix<f64>,
    /// K: Nu x Np
    gradient: DMatrix<f64>,
    /// P: Np x Nu
    divergence: DMatrix<f64>,
    /// C: Nu slices of Nu x Nu
    convection: ConvectionTensor,
    /// M: Nu x Nu
    mass: Option<DMatrix<f64>>,
    /// D: Np x Np
    pressure_laplacian: Option<DMatrix<f64>>,
    /// G: Np slices of Nu x Nu
    momentum_divergence: Option<ConvectionTensor>,
}

fn check_matrix(what: &str, m: &DMatrix<f64>, expected: (usize, usize)) -> OperatorResult<()> {
    if m.shape() != expected {
        return Err(OperatorError::shape(what, expected, m.shape()));
    }
    ensure_all_finite(m.as_slice(), "reduced operator entry")?;
    Ok(())
}

fn check_tensor(what: &str, t: &ConvectionTensor, count: usize, n: usize) -> OperatorResult<()> {
    t.check_shape(what, count, n)?;
    if !t.is_finite() {
        return Err(CoreError::Invariant {
            what: "reduced tensor contains non-finite entries",
        }
        .into());
    }
    Ok(())
}

impl ReducedOperators {
    /// Build the store from the operators shared by both stabilisation methods.
    pub fn new(
        counts: ModeCounts,
        diffusion: DMatrix<f64>,
        gradient: DMatrix<f64>,
        divergence: DMatrix<f64>,
        convection: ConvectionTensor,
    ) -> OperatorResult<Self> {
        counts.validate()?;
        let (nu, np) = (counts.n_u(), counts.n_p());
        check_matrix("diffusion (B)", &diffusion, (nu, nu))?;
        check_matrix("gradient (K)", &gradient, (nu, np))?;
        check_matrix("divergence (P)", &divergence, (np, nu))?;
        check_tensor("convection (C)", &convection, nu, nu)?;

        Ok(Self {
            counts,
            diffusion,
            gradient,
            divergence,
            convection,
            mass: None,
            pressure_laplacian: None,
            momentum_divergence: None,
        })
    }

    /// Attach the velocity mass matrix M.
    pub fn with_mass(mut self, mass: DMatrix<f64>) -> OperatorResult<Self> {
        let nu = self.counts.n_u();
        check_matrix("mass (M)", &mass, (nu, nu))?;
        self.mass = Some(mass);
        Ok(self)
    }

    /// Attach the pressure Poisson operators D and G used by the PPE method.
    pub fn with_pressure_poisson(
        mut self,
        pressure_laplacian: DMatrix<f64>,
        momentum_divergence: ConvectionTensor,
    ) -> OperatorResult<Self> {
        let (nu, np) = (self.counts.n_u(), self.counts.n_p());
        check_matrix("pressure laplacian (D)", &pressure_laplacian, (np, np))?;
        check_tensor("momentum divergence (G)", &momentum_divergence, np, nu)?;
        self.pressure_laplacian = Some(pressure_laplacian);
        self.momentum_divergence = Some(momentum_divergence);
        Ok(self)
    }

    pub fn counts(&self) -> &ModeCounts {
        &self.counts
    }

    pub fn n_u(&self) -> usize {
        self.counts.n_u()
    }

    pub fn n_p(&self) -> usize {
        self.counts.n_p()
    }

    pub fn n_bc(&self) -> usize {
        self.counts.n_bc()
    }

    pub fn diffusion(&self) -> &DMatrix<f64> {
        &self.diffusion
    }

    pub fn gradient(&self) -> &DMatrix<f64> {
        &self.gradient
    }

    pub fn divergence(&self) -> &DMatrix<f64> {
        &self.divergence
    }

    pub fn convection(&self) -> &ConvectionTensor {
        &self.convection
    }

    pub fn mass(&self) -> Option<&DMatrix<f64>> {
        self.mass.as_ref()
    }

    pub fn pressure_laplacian(&self) -> Option<&DMatrix<f64>> {
        self.pressure_laplacian.as_ref()
    }

    pub fn momentum_divergence(&self) -> Option<&ConvectionTensor> {
        self.momentum_divergence.as_ref()
    }

    /// D and G together, or the name of the first missing one.
    pub fn pressure_poisson(&self) -> OperatorResult<(&DMatrix<f64>, &ConvectionTensor)> {
        let d = self
            .pressure_laplacian
            .as_ref()
            .ok_or(OperatorError::MissingOperator {
                what: "pressure laplacian (D)",
            })?;
        let g = self
            .momentum_divergence
            .as_ref()
            .ok_or(OperatorError::MissingOperator {
                what: "momentum divergence (G)",
            })?;
        Ok((d, g))
    }
}
