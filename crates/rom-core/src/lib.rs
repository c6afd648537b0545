//! rom-core: shared foundation for the reduced-order model crates.
//!
//! Contains:
//! - numeric (tolerances + float checks)
//! - error (shared error types)

pub mod error;
pub mod numeric;

pub use error::{CoreError, CoreResult};
pub use numeric::*;
