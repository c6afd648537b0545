//! Mode-count metadata shared by every reduced operator.

use crate::error::{OperatorError, OperatorResult};

/// Number of basis functions of each kind.
///
/// Velocity coefficients are ordered lifting functions first, then POD
/// velocity modes, then supremizer modes. The first `boundary` coefficients
/// are pinned to the boundary-condition vector during an online solve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModeCounts {
    /// Lifting functions (one per parametrised boundary in the usual setup)
    pub lifting: usize,
    /// POD velocity modes
    pub velocity: usize,
    /// Supremizer modes (zero for a pure PPE basis)
    #[cfg_attr(feature = "serde", serde(default))]
    pub supremizer: usize,
    /// POD pressure modes
    pub pressure: usize,
    /// Parametrised boundary degrees of freedom
    pub boundary: usize,
}

impl ModeCounts {
    /// Total velocity basis size, `Nu`.
    pub fn n_u(&self) -> usize {
        self.lifting + self.velocity + self.supremizer
    }

    /// Pressure basis size, `Np`.
    pub fn n_p(&self) -> usize {
        self.pressure
    }

    /// Pinned coefficient count, `N_BC`.
    pub fn n_bc(&self) -> usize {
        self.boundary
    }

    pub fn validate(&self) -> OperatorResult<()> {
        if self.n_u() == 0 {
            return Err(OperatorError::shape("velocity basis", (1, 1), (0, 0)));
        }
        if self.boundary > self.n_u() {
            return Err(OperatorError::shape(
                "boundary count (must not exceed Nu)",
                (self.n_u(), 1),
                (self.boundary, 1),
            ));
        }
        Ok(())
    }
}
