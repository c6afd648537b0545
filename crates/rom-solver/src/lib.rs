//! Nonlinear solver for the steady Navier-Stokes reduced-order model.
//!
//! The unknowns are reduced velocity coefficients (and, for the supremizer
//! formulation, reduced pressure coefficients). The first `N_BC` unknowns are
//! pinned to the boundary-condition vector through explicit constraint rows.

pub mod error;
pub mod jacobian;
pub mod model;
pub mod newton;

pub use error::{SolverError, SolverResult};
pub use jacobian::central_difference_jacobian;
pub use model::{JacobianMode, ReducedModel, Stabilization};
pub use newton::{NewtonConfig, NewtonResult, newton_solve};
