//! Reduced residual and Jacobian of the steady Navier-Stokes Galerkin system.
//!
//! With velocity coefficients `a`, pressure coefficients `b` and viscosity `nu`
//! the momentum equations read
//!
//! ```text
//! F_i = nu (B a)_i - aᵀ C[i] a - (K b)_i
//! ```
//!
//! The supremizer formulation solves for `[a; b]` and closes the system with
//! the divergence rows `P a = 0`. The PPE formulation solves for `a` only and
//! eliminates the pressure through the reduced Poisson relation
//! `D b = g(a)`, `g_j(a) = aᵀ G[j] a`.
//!
//! In both cases the first `N_BC` rows are replaced by `y_j - BC_j`.

use crate::error::{SolverError, SolverResult};
use crate::jacobian::central_difference_jacobian;
use crate::newton::{NewtonConfig, NewtonResult, newton_solve};
use nalgebra::{DMatrix, DVector, Dyn, LU};
use rom_core::ensure_positive;
use rom_operators::ReducedOperators;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Pressure stabilisation method, selected once per model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Stabilization {
    /// Pressure Poisson equation
    #[cfg_attr(feature = "serde", serde(rename = "PPE", alias = "ppe"))]
    Ppe,
    /// Supremizer-enriched velocity space
    #[cfg_attr(
        feature = "serde",
        serde(rename = "SUP", alias = "sup", alias = "supremizer")
    )]
    Supremizer,
}

impl fmt::Display for Stabilization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stabilization::Ppe => write!(f, "PPE"),
            Stabilization::Supremizer => write!(f, "SUP"),
        }
    }
}

impl FromStr for Stabilization {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ppe" => Ok(Stabilization::Ppe),
            "sup" | "supremizer" => Ok(Stabilization::Supremizer),
            _ => Err(SolverError::InvalidArg {
                what: format!("unknown stabilization '{s}' (expected PPE or SUP)"),
            }),
        }
    }
}

/// How the Newton Jacobian is obtained.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum JacobianMode {
    #[default]
    Analytic,
    /// Central differences of the residual
    FiniteDifference,
}

/// Step used by [`JacobianMode::FiniteDifference`].
const FD_EPSILON: f64 = 1e-6;

#[derive(Clone, Debug)]
enum Formulation {
    Supremizer,
    Ppe { laplacian: LU<f64, Dyn, Dyn> },
}

/// Residual/Jacobian evaluator for one stabilisation method.
///
/// Holds no per-query state: the boundary vector is passed to every
/// residual evaluation, so one model can serve any number of queries.
#[derive(Clone, Debug)]
pub struct ReducedModel {
    operators: Arc<ReducedOperators>,
    viscosity: f64,
    /// nu * B
    viscous: DMatrix<f64>,
    formulation: Formulation,
}

impl ReducedModel {
    pub fn new(
        operators: Arc<ReducedOperators>,
        stabilization: Stabilization,
        viscosity: f64,
    ) -> SolverResult<Self> {
        let viscosity = ensure_positive(viscosity, "viscosity")?;
        let formulation = match stabilization {
            Stabilization::Supremizer => Formulation::Supremizer,
            Stabilization::Ppe => {
                let (d, _) = operators.pressure_poisson()?;
                let laplacian = d.clone().lu();
                if !laplacian.is_invertible() {
                    return Err(SolverError::SingularPressureLaplacian);
                }
                Formulation::Ppe { laplacian }
            }
        };
        let viscous = operators.diffusion() * viscosity;

        Ok(Self {
            operators,
            viscosity,
            viscous,
            formulation,
        })
    }

    pub fn stabilization(&self) -> Stabilization {
        match self.formulation {
            Formulation::Supremizer => Stabilization::Supremizer,
            Formulation::Ppe { .. } => Stabilization::Ppe,
        }
    }

    pub fn operators(&self) -> &Arc<ReducedOperators> {
        &self.operators
    }

    pub fn viscosity(&self) -> f64 {
        self.viscosity
    }

    pub fn set_viscosity(&mut self, viscosity: f64) -> SolverResult<()> {
        self.viscosity = ensure_positive(viscosity, "viscosity")?;
        self.viscous = self.operators.diffusion() * self.viscosity;
        Ok(())
    }

    /// Length of the unknown vector: `Nu + Np` (supremizer) or `Nu` (PPE).
    pub fn unknown_count(&self) -> usize {
        match self.formulation {
            Formulation::Supremizer => self.operators.n_u() + self.operators.n_p(),
            Formulation::Ppe { .. } => self.operators.n_u(),
        }
    }

    pub fn boundary_count(&self) -> usize {
        self.operators.n_bc()
    }

    fn check_unknowns(&self, y: &DVector<f64>) -> SolverResult<()> {
        SolverError::check_len("unknown vector", self.unknown_count(), y.len())
    }

    /// The velocity block `a` of an unknown vector.
    pub fn velocity_coefficients(&self, y: &DVector<f64>) -> SolverResult<DVector<f64>> {
        self.check_unknowns(y)?;
        Ok(y.rows(0, self.operators.n_u()).into_owned())
    }

    /// Pressure coefficients for an unknown vector.
    ///
    /// Read directly from `y` for the supremizer formulation, recovered from
    /// the Poisson relation `D b = g(a)` for PPE.
    pub fn pressure_coefficients(&self, y: &DVector<f64>) -> SolverResult<DVector<f64>> {
        self.check_unknowns(y)?;
        let nu = self.operators.n_u();
        match &self.formulation {
            Formulation::Supremizer => Ok(y.rows(nu, self.operators.n_p()).into_owned()),
            Formulation::Ppe { laplacian } => {
                let a = y.rows(0, nu).into_owned();
                self.poisson_pressure(laplacian, &a)
            }
        }
    }

    fn poisson_pressure(
        &self,
        laplacian: &LU<f64, Dyn, Dyn>,
        a: &DVector<f64>,
    ) -> SolverResult<DVector<f64>> {
        let (_, g) = self.operators.pressure_poisson()?;
        laplacian
            .solve(&g.contract(a))
            .ok_or(SolverError::SingularPressureLaplacian)
    }

    /// `nu B a - c(a)`, the momentum rows without the pressure term.
    fn momentum(&self, a: &DVector<f64>) -> DVector<f64> {
        &self.viscous * a - self.operators.convection().contract(a)
    }

    /// Nonlinear residual `F(y)` with the boundary rows pinned to `bc`.
    pub fn residual(&self, y: &DVector<f64>, bc: &[f64]) -> SolverResult<DVector<f64>> {
        self.check_unknowns(y)?;
        SolverError::check_len("boundary vector", self.boundary_count(), bc.len())?;

        let ops = &self.operators;
        let (nu, np) = (ops.n_u(), ops.n_p());
        let a = y.rows(0, nu).into_owned();

        let mut f = DVector::zeros(self.unknown_count());
        match &self.formulation {
            Formulation::Supremizer => {
                let b = y.rows(nu, np);
                f.rows_mut(0, nu)
                    .copy_from(&(self.momentum(&a) - ops.gradient() * b));
                f.rows_mut(nu, np).copy_from(&(ops.divergence() * &a));
            }
            Formulation::Ppe { laplacian } => {
                let b = self.poisson_pressure(laplacian, &a)?;
                f.copy_from(&(self.momentum(&a) - ops.gradient() * b));
            }
        }

        for (j, &value) in bc.iter().enumerate() {
            f[j] = y[j] - value;
        }
        Ok(f)
    }

    /// Analytic Jacobian `dF/dy`. Independent of the boundary values.
    pub fn jacobian(&self, y: &DVector<f64>) -> SolverResult<DMatrix<f64>> {
        self.check_unknowns(y)?;

        let ops = &self.operators;
        let (nu, np) = (ops.n_u(), ops.n_p());
        let a = y.rows(0, nu).into_owned();
        let momentum = &self.viscous - ops.convection().linearize(&a);

        let mut jac = match &self.formulation {
            Formulation::Supremizer => {
                let n = nu + np;
                let mut jac = DMatrix::zeros(n, n);
                jac.view_mut((0, 0), (nu, nu)).copy_from(&momentum);
                jac.view_mut((0, nu), (nu, np)).copy_from(&(-ops.gradient()));
                jac.view_mut((nu, 0), (np, nu)).copy_from(ops.divergence());
                jac
            }
            Formulation::Ppe { laplacian } => {
                let (_, g) = ops.pressure_poisson()?;
                // db/da = D^-1 dg/da
                let db = laplacian
                    .solve(&g.linearize(&a))
                    .ok_or(SolverError::SingularPressureLaplacian)?;
                momentum - ops.gradient() * db
            }
        };

        for j in 0..self.boundary_count() {
            jac.row_mut(j).fill(0.0);
            jac[(j, j)] = 1.0;
        }
        Ok(jac)
    }

    /// Starting point for a query: `bc` in the pinned slots, the rest taken
    /// from `previous` when it has the right length, zero otherwise.
    pub fn initial_guess(&self, bc: &[f64], previous: Option<&DVector<f64>>) -> DVector<f64> {
        let n = self.unknown_count();
        let mut y = match previous {
            Some(p) if p.len() == n => p.clone(),
            _ => DVector::zeros(n),
        };
        for (j, &value) in bc.iter().take(n).enumerate() {
            y[j] = value;
        }
        y
    }

    /// Run Newton from `y0` for the boundary vector `bc`.
    pub fn solve(
        &self,
        bc: &[f64],
        y0: DVector<f64>,
        config: &NewtonConfig,
        mode: JacobianMode,
    ) -> SolverResult<NewtonResult> {
        self.check_unknowns(&y0)?;
        SolverError::check_len("boundary vector", self.boundary_count(), bc.len())?;

        let residual_fn = |y: &DVector<f64>| self.residual(y, bc);
        let jacobian_fn = |y: &DVector<f64>| match mode {
            JacobianMode::Analytic => self.jacobian(y),
            JacobianMode::FiniteDifference => {
                central_difference_jacobian(y, residual_fn, FD_EPSILON)
            }
        };
        newton_solve(y0, bc, residual_fn, jacobian_fn, config)
    }
}
