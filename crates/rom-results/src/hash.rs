//! Content-based hashing for reconstruction IDs.

use crate::types::FieldRecord;
use sha2::{Digest, Sha256};

pub fn compute_reconstruction_id(records: &[FieldRecord], writer_version: &str) -> String {
    let mut hasher = Sha256::new();

    for record in records {
        hasher.update(record.solution_index.to_le_bytes());
        hasher.update(record.query.to_le_bytes());
        for v in record.velocity.iter().chain(&record.pressure) {
            hasher.update(v.to_le_bytes());
        }
    }

    hasher.update(writer_version.as_bytes());

    format!("{:x}", hasher.finalize())
}
