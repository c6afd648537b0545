//! Online solve driver.

use crate::error::{RomError, RomResult};
use crate::history::{OnlineHistory, OnlineSolution};
use nalgebra::DVector;
use rom_operators::{ModeCounts, ReducedOperators};
use rom_solver::{JacobianMode, NewtonConfig, ReducedModel, Stabilization};
use std::sync::Arc;

/// Where the non-pinned unknowns of a new query start from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum WarmStart {
    Zero,
    /// Last accepted solution of this driver
    #[default]
    Previous,
}

/// Settings of a [`ReducedSteadyNs`].
#[derive(Clone, Debug)]
pub struct OnlineSettings {
    pub viscosity: f64,
    pub newton: NewtonConfig,
    pub jacobian: JacobianMode,
    pub warm_start: WarmStart,
}

impl OnlineSettings {
    pub fn new(viscosity: f64) -> Self {
        Self {
            viscosity,
            newton: NewtonConfig::default(),
            jacobian: JacobianMode::default(),
            warm_start: WarmStart::default(),
        }
    }
}

/// Reduced steady Navier-Stokes problem: one Newton solve per query.
///
/// Accepted solutions go to an append-only [`OnlineHistory`]; a failed query
/// leaves the history and the warm-start vector untouched.
#[derive(Clone, Debug)]
pub struct ReducedSteadyNs {
    pub(crate) model: ReducedModel,
    newton: NewtonConfig,
    jacobian: JacobianMode,
    warm_start: WarmStart,
    pub(crate) history: OnlineHistory,
    previous: Option<DVector<f64>>,
    solve_count: usize,
}

impl ReducedSteadyNs {
    pub fn new(
        operators: Arc<ReducedOperators>,
        stabilization: Stabilization,
        settings: OnlineSettings,
    ) -> RomResult<Self> {
        let model = ReducedModel::new(operators, stabilization, settings.viscosity)?;
        Ok(Self {
            model,
            newton: settings.newton,
            jacobian: settings.jacobian,
            warm_start: settings.warm_start,
            history: OnlineHistory::new(),
            previous: None,
            solve_count: 0,
        })
    }

    /// Pressure Poisson stabilisation.
    pub fn ppe(operators: Arc<ReducedOperators>, settings: OnlineSettings) -> RomResult<Self> {
        Self::new(operators, Stabilization::Ppe, settings)
    }

    /// Supremizer stabilisation.
    pub fn supremizer(
        operators: Arc<ReducedOperators>,
        settings: OnlineSettings,
    ) -> RomResult<Self> {
        Self::new(operators, Stabilization::Supremizer, settings)
    }

    pub fn model(&self) -> &ReducedModel {
        &self.model
    }

    pub fn stabilization(&self) -> Stabilization {
        self.model.stabilization()
    }

    pub fn counts(&self) -> &ModeCounts {
        self.model.operators().counts()
    }

    pub fn history(&self) -> &OnlineHistory {
        &self.history
    }

    /// Number of queries that reached the Newton solver, failed ones included.
    pub fn solve_count(&self) -> usize {
        self.solve_count
    }

    pub fn previous_solution(&self) -> Option<&DVector<f64>> {
        self.previous.as_ref()
    }

    pub fn newton_config(&self) -> &NewtonConfig {
        &self.newton
    }

    pub fn set_viscosity(&mut self, viscosity: f64) -> RomResult<()> {
        self.model.set_viscosity(viscosity)?;
        Ok(())
    }

    fn check_boundary(&self, bc: &[f64]) -> RomResult<()> {
        let expected = self.model.boundary_count();
        if bc.len() != expected {
            return Err(RomError::dims("boundary vector", expected, bc.len()));
        }
        if bc.iter().any(|v| !v.is_finite()) {
            return Err(RomError::InvalidArg {
                what: "boundary vector contains non-finite values".to_string(),
            });
        }
        Ok(())
    }

    /// Solve for the boundary vector `bc` and append the result to the history.
    pub fn solve_online(&mut self, bc: &[f64]) -> RomResult<&OnlineSolution> {
        self.check_boundary(bc)?;
        let previous = match self.warm_start {
            WarmStart::Previous => self.previous.as_ref(),
            WarmStart::Zero => None,
        };
        let y0 = self.model.initial_guess(bc, previous);
        self.run(bc, y0)
    }

    /// Same as [`solve_online`](Self::solve_online) from an explicit guess.
    ///
    /// The pinned slots of `guess` are overwritten with `bc`.
    pub fn solve_online_from(
        &mut self,
        bc: &[f64],
        guess: &DVector<f64>,
    ) -> RomResult<&OnlineSolution> {
        self.check_boundary(bc)?;
        let n = self.model.unknown_count();
        if guess.len() != n {
            return Err(RomError::dims("initial guess", n, guess.len()));
        }
        let y0 = self.model.initial_guess(bc, Some(guess));
        self.run(bc, y0)
    }

    fn run(&mut self, bc: &[f64], y0: DVector<f64>) -> RomResult<&OnlineSolution> {
        self.solve_count += 1;
        let query = self.solve_count;

        let result = match self.model.solve(bc, y0, &self.newton, self.jacobian) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(query, error = %e, "online solve failed");
                return Err(e.into());
            }
        };

        tracing::info!(
            query,
            stabilization = %self.model.stabilization(),
            iterations = result.iterations,
            residual_norm = result.residual_norm,
            "online solve converged"
        );

        self.previous = Some(result.x.clone());
        Ok(self.history.push(OnlineSolution {
            query,
            boundary: DVector::from_row_slice(bc),
            viscosity: self.model.viscosity(),
            coefficients: result.x,
            residual_norm: result.residual_norm,
            iterations: result.iterations,
        }))
    }
}
