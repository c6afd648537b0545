//! rom-results: on-disk storage of reconstructed fields.

pub mod hash;
pub mod store;
pub mod types;

pub use hash::compute_reconstruction_id;
pub use store::FieldStore;
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Reconstruction not found: {folder}")]
    NotFound { folder: String },

    #[error("Inconsistent fields: {what}")]
    Inconsistent { what: String },
}
