//! Online phase of the steady Navier-Stokes reduced-order model.
//!
//! [`ReducedSteadyNs`] runs one Newton solve per boundary-condition query,
//! keeps the accepted coefficient vectors in an append-only history and
//! expands that history back into full-order fields on request.

pub mod basis;
pub mod driver;
pub mod error;
pub mod history;
pub mod inf_sup;
pub mod reconstruct;

pub use basis::{BasisModes, ModeSet};
pub use driver::{OnlineSettings, ReducedSteadyNs, WarmStart};
pub use error::{RomError, RomResult};
pub use history::{OnlineHistory, OnlineSolution};
pub use inf_sup::{PressureNorm, inf_sup_constant};
pub use reconstruct::{FieldSink, ReconstructedField, reconstruct_history};

pub use rom_solver::{JacobianMode, NewtonConfig, Stabilization};
