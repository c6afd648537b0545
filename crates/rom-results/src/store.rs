//! Reconstruction storage API.

use crate::hash::compute_reconstruction_id;
use crate::types::{FieldRecord, ReconstructionManifest};
use crate::{ResultsError, ResultsResult};
use rom_online::{FieldSink, ReconstructedField, RomError, RomResult};
use std::fs;
use std::path::{Path, PathBuf};

const WRITER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Writes each reconstruction pass to `<root>/<folder>/{manifest.json, fields.jsonl}`.
#[derive(Clone)]
pub struct FieldStore {
    root_dir: PathBuf,
}

impl FieldStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn dir(&self, folder: &Path) -> PathBuf {
        self.root_dir.join(folder)
    }

    pub fn has_reconstruction(&self, folder: &Path) -> bool {
        self.dir(folder).join("manifest.json").exists()
    }

    pub fn save_fields(
        &self,
        folder: &Path,
        records: &[FieldRecord],
    ) -> ResultsResult<ReconstructionManifest> {
        let velocity_len = records.first().map_or(0, |r| r.velocity.len());
        let pressure_len = records.first().map_or(0, |r| r.pressure.len());
        if let Some(bad) = records
            .iter()
            .find(|r| r.velocity.len() != velocity_len || r.pressure.len() != pressure_len)
        {
            return Err(ResultsError::Inconsistent {
                what: format!("field of query {} has a different length", bad.query),
            });
        }

        let manifest = ReconstructionManifest {
            reconstruction_id: compute_reconstruction_id(records, WRITER_VERSION),
            timestamp: chrono::Utc::now().to_rfc3339(),
            field_count: records.len(),
            velocity_len,
            pressure_len,
            writer_version: WRITER_VERSION.to_string(),
        };

        let dir = self.dir(folder);
        fs::create_dir_all(&dir)?;

        let manifest_json = serde_json::to_string_pretty(&manifest)?;
        fs::write(dir.join("manifest.json"), manifest_json)?;

        let mut content = String::new();
        for record in records {
            content.push_str(&serde_json::to_string(record)?);
            content.push('\n');
        }
        fs::write(dir.join("fields.jsonl"), content)?;

        tracing::debug!(dir = %dir.display(), count = records.len(), "fields saved");
        Ok(manifest)
    }

    pub fn load_manifest(&self, folder: &Path) -> ResultsResult<ReconstructionManifest> {
        let path = self.dir(folder).join("manifest.json");
        if !path.exists() {
            return Err(ResultsError::NotFound {
                folder: folder.display().to_string(),
            });
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn load_fields(&self, folder: &Path) -> ResultsResult<Vec<FieldRecord>> {
        let path = self.dir(folder).join("fields.jsonl");
        if !path.exists() {
            return Err(ResultsError::NotFound {
                folder: folder.display().to_string(),
            });
        }

        let content = fs::read_to_string(path)?;
        let mut records = Vec::new();
        for line in content.lines() {
            if !line.trim().is_empty() {
                records.push(serde_json::from_str(line)?);
            }
        }
        Ok(records)
    }

    /// Manifests of every reconstruction directly under the root.
    pub fn list_reconstructions(&self) -> ResultsResult<Vec<(String, ReconstructionManifest)>> {
        let mut found = Vec::new();
        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            if entry.path().is_dir() {
                let name = entry.file_name().to_string_lossy().to_string();
                if let Ok(manifest) = self.load_manifest(Path::new(&name)) {
                    found.push((name, manifest));
                }
            }
        }
        found.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(found)
    }

    pub fn delete(&self, folder: &Path) -> ResultsResult<()> {
        let dir = self.dir(folder);
        if dir.exists() {
            fs::remove_dir_all(dir)?;
        }
        Ok(())
    }
}

impl FieldSink for FieldStore {
    fn write_fields(&mut self, folder: &Path, fields: &[ReconstructedField]) -> RomResult<()> {
        let records: Vec<FieldRecord> = fields.iter().map(FieldRecord::from).collect();
        self.save_fields(folder, &records)
            .map(|_| ())
            .map_err(|e| RomError::Export {
                what: e.to_string(),
            })
    }
}
