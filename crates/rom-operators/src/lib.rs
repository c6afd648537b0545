//! Reduced operator store for the steady Navier-Stokes reduced-order model.
//!
//! The operators are produced by an external Galerkin projection of the
//! full-order discretisation onto the basis modes. This crate only holds them
//! and checks that their shapes agree with the mode counts.

pub mod counts;
pub mod error;
#[cfg(feature = "serde")]
pub mod io;
pub mod store;
pub mod tensor;

pub use counts::ModeCounts;
pub use error::{OperatorError, OperatorResult};
pub use store::ReducedOperators;
pub use tensor::ConvectionTensor;
