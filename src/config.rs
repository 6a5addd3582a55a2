use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{error::Result, powerflow::CalculationMethod};

/// Newton-Raphson settings shared by every timestep of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub method: CalculationMethod,
    /// Convergence threshold on the 2-norm of the p.u. power mismatch.
    pub tolerance: f64,
    pub max_iter: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            method: CalculationMethod::NewtonRaphson,
            tolerance: 1e-8,
            max_iter: 20,
        }
    }
}

/// Run-wide configuration, usually read from a TOML file.
///
/// ```toml
/// s_base = 1e6
/// frequency = 50.0
///
/// [solver]
/// method = "newton_raphson"
/// tolerance = 1e-8
/// max_iter = 20
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub solver: SolverConfig,
    /// Per-unit power base in VA.
    pub s_base: f64,
    /// System frequency in Hz, used for line shunt capacitance.
    pub frequency: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            solver: SolverConfig::default(),
            s_base: 1e6,
            frequency: 50.0,
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
