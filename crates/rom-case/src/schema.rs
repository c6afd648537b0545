//! Case file schema.

use rom_online::{JacobianMode, NewtonConfig, OnlineSettings, PressureNorm, Stabilization, WarmStart};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CASE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaseDef {
    pub version: u32,
    pub name: String,
    pub stabilization: Stabilization,
    pub viscosity: f64,
    #[serde(default)]
    pub newton: NewtonDef,
    #[serde(default)]
    pub jacobian: JacobianMode,
    #[serde(default)]
    pub warm_start: WarmStart,
    /// Reduced operators (JSON), relative to the case file
    pub operators: PathBuf,
    /// Basis modes (JSON), needed only for reconstruction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basis: Option<PathBuf>,
    #[serde(default)]
    pub queries: Vec<QueryDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputDef>,
    #[serde(default)]
    pub inf_sup_norm: PressureNorm,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewtonDef {
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_search_beta: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_line_search_iters: Option<usize>,
}

fn default_tolerance() -> f64 {
    1e-5
}

fn default_max_iterations() -> usize {
    100
}

impl Default for NewtonDef {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            max_iterations: default_max_iterations(),
            line_search_beta: None,
            max_line_search_iters: None,
        }
    }
}

/// One online query: the boundary vector and an optional viscosity override.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryDef {
    pub bc: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viscosity: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputDef {
    pub folder: PathBuf,
    #[serde(default = "default_stride")]
    pub stride: usize,
}

fn default_stride() -> usize {
    1
}

impl NewtonDef {
    pub fn to_config(&self) -> NewtonConfig {
        let mut config = NewtonConfig {
            max_iterations: self.max_iterations,
            abs_tol: self.tolerance,
            ..NewtonConfig::default()
        };
        if let Some(beta) = self.line_search_beta {
            config.line_search_beta = beta;
        }
        if let Some(iters) = self.max_line_search_iters {
            config.max_line_search_iters = iters;
        }
        config
    }
}

impl CaseDef {
    pub fn online_settings(&self) -> OnlineSettings {
        OnlineSettings {
            viscosity: self.viscosity,
            newton: self.newton.to_config(),
            jacobian: self.jacobian,
            warm_start: self.warm_start,
        }
    }

    /// Rewrite relative file paths against `base_dir` (usually the case file's directory).
    pub fn resolve_paths(&mut self, base_dir: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base_dir.join(&*p);
            }
        };
        resolve(&mut self.operators);
        if let Some(basis) = self.basis.as_mut() {
            resolve(basis);
        }
        if let Some(output) = self.output.as_mut() {
            resolve(&mut output.folder);
        }
    }
}
