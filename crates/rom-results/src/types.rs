//! Persisted record types.

use rom_online::ReconstructedField;
use serde::{Deserialize, Serialize};

pub type ReconstructionId = String;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReconstructionManifest {
    pub reconstruction_id: ReconstructionId,
    pub timestamp: String,
    pub field_count: usize,
    pub velocity_len: usize,
    pub pressure_len: usize,
    pub writer_version: String,
}

/// One line of `fields.jsonl`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldRecord {
    pub solution_index: usize,
    pub query: usize,
    pub velocity: Vec<f64>,
    pub pressure: Vec<f64>,
}

impl From<&ReconstructedField> for FieldRecord {
    fn from(field: &ReconstructedField) -> Self {
        Self {
            solution_index: field.solution_index,
            query: field.query,
            velocity: field.velocity.as_slice().to_vec(),
            pressure: field.pressure.as_slice().to_vec(),
        }
    }
}
