//! Configuration system for the pipeline simulator.
//!
//! This module defines the configuration structures used to parameterize a
//! run. It provides:
//! 1. **Defaults:** Baseline constants (cycle ceiling, forwarding, predictor).
//! 2. **Structures:** Hierarchical config for general settings and the pipeline.
//! 3. **Enums:** Branch predictor selection, with the short names used on the
//!    command line.
//!
//! Configuration is supplied as JSON or built with `Config::default()`; every
//! field is optional in the JSON document.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::error::{Result, SimError};

/// Default configuration constants for the simulator.
mod defaults {
    /// Cycle ceiling for a run; programs without a reachable HALT stop here.
    pub const MAX_CYCLES: u64 = 2000;

    /// Operand forwarding (EX/MEM and MEM/WB bypass) is on by default.
    pub const FORWARDING: bool = true;
}

/// Branch prediction strategy.
///
/// Serialized with the short names accepted on the command line
/// (`static_nt`, `static_t`, `1bit`, `2bit`, `tournament`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BranchPredictorKind {
    /// Always predict not-taken.
    #[default]
    #[serde(rename = "static_nt", alias = "StaticNotTaken")]
    StaticNotTaken,
    /// Always predict taken.
    #[serde(rename = "static_t", alias = "StaticTaken")]
    StaticTaken,
    /// Per-PC last outcome.
    #[serde(rename = "1bit", alias = "OneBit")]
    OneBit,
    /// Per-PC 2-bit saturating counter.
    #[serde(rename = "2bit", alias = "TwoBit")]
    TwoBit,
    /// Chooser arbitrating between the 1-bit and 2-bit predictors.
    #[serde(rename = "tournament", alias = "Tournament")]
    Tournament,
}

impl BranchPredictorKind {
    /// Every strategy, in the order they are listed in help output.
    pub const ALL: [Self; 5] = [
        Self::StaticNotTaken,
        Self::StaticTaken,
        Self::OneBit,
        Self::TwoBit,
        Self::Tournament,
    ];

    /// Short command-line name.
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::StaticNotTaken => "static_nt",
            Self::StaticTaken => "static_t",
            Self::OneBit => "1bit",
            Self::TwoBit => "2bit",
            Self::Tournament => "tournament",
        }
    }

    /// Resolves a short name, ignoring case.
    ///
    /// Unrecognized names fall back to the default (`static_nt`).
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|kind| kind.short_name().eq_ignore_ascii_case(name.trim()))
            .unwrap_or_else(|| {
                tracing::warn!(
                    name,
                    fallback = Self::default().short_name(),
                    "unknown branch predictor, using default"
                );
                Self::default()
            })
    }
}

/// Root configuration structure containing all simulator settings.
///
/// # Examples
///
/// ```
/// use pipesim_core::config::{BranchPredictorKind, Config};
///
/// let json = r#"{
///     "general": { "max_cycles": 500 },
///     "pipeline": { "forwarding": false, "branch_predictor": "2bit" }
/// }"#;
///
/// let config = Config::from_json_str(json).unwrap();
/// assert_eq!(config.general.max_cycles, 500);
/// assert!(!config.pipeline.forwarding);
/// assert_eq!(config.pipeline.branch_predictor, BranchPredictorKind::TwoBit);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// General simulation settings
    #[serde(default)]
    pub general: GeneralConfig,
    /// Pipeline and branch predictor configuration
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Parses a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] if the document is not valid JSON or does
    /// not match the configuration schema.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] if the file cannot be read, or
    /// [`SimError::Config`] if its contents are not a valid configuration.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| SimError::io(path, e))?;
        Self::from_json_str(&text)
    }
}

/// General simulation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Cycle ceiling; the run stops here even if HALT never retires.
    #[serde(default = "GeneralConfig::default_max_cycles")]
    pub max_cycles: u64,

    /// Enable per-cycle trace logging.
    #[serde(default)]
    pub trace: bool,
}

impl GeneralConfig {
    /// Returns the default cycle ceiling.
    const fn default_max_cycles() -> u64 {
        defaults::MAX_CYCLES
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            max_cycles: defaults::MAX_CYCLES,
            trace: false,
        }
    }
}

/// Pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Bypass results from EX/MEM/WB to ID instead of waiting for writeback.
    #[serde(default = "PipelineConfig::default_forwarding")]
    pub forwarding: bool,

    /// Branch prediction strategy.
    #[serde(default)]
    pub branch_predictor: BranchPredictorKind,
}

impl PipelineConfig {
    /// Returns the default forwarding setting.
    const fn default_forwarding() -> bool {
        defaults::FORWARDING
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            forwarding: defaults::FORWARDING,
            branch_predictor: BranchPredictorKind::default(),
        }
    }
}
