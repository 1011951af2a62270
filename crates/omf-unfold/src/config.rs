use std::fs;
use std::path::{Path, PathBuf};

use omf_core::errors::{ErrorInfo, OmfError};
use omf_core::HyperParams;
use serde::{Deserialize, Serialize};

/// YAML-configurable parameters governing an unfolding run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnfoldConfig {
    /// Number of full Step 1 + Step 2 passes. Larger counts trade bias for variance.
    #[serde(default = "default_iterations")]
    pub num_iterations: usize,
    /// Hyperparameters forwarded verbatim to the Step 1 classifier.
    #[serde(default)]
    pub classifier1_params: HyperParams,
    /// Hyperparameters forwarded verbatim to the Step 2 classifier.
    #[serde(default)]
    pub classifier2_params: HyperParams,
    /// Hyperparameters forwarded verbatim to the Step 1 fallback regressor.
    #[serde(default)]
    pub regressor_params: HyperParams,
    /// Model persistence behaviour.
    #[serde(default)]
    pub persistence: PersistenceConfig,
    /// Master seed and substream policy.
    #[serde(default)]
    pub seed_policy: SeedPolicy,
}

fn default_iterations() -> usize {
    4
}

impl Default for UnfoldConfig {
    fn default() -> Self {
        Self {
            num_iterations: default_iterations(),
            classifier1_params: HyperParams::new(),
            classifier2_params: HyperParams::new(),
            regressor_params: HyperParams::new(),
            persistence: PersistenceConfig::default(),
            seed_policy: SeedPolicy::default(),
        }
    }
}

impl UnfoldConfig {
    /// Convenience constructor overriding only the iteration count.
    pub fn with_iterations(num_iterations: usize) -> Self {
        Self {
            num_iterations,
            ..Self::default()
        }
    }

    /// Parses a configuration from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, OmfError> {
        serde_yaml::from_str(text)
            .map_err(|err| OmfError::Serde(ErrorInfo::new("config-parse", err.to_string())))
    }

    /// Loads a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self, OmfError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            OmfError::Io(
                ErrorInfo::new("config-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        Self::from_yaml_str(&contents).map_err(|err| match err {
            OmfError::Serde(info) => {
                OmfError::Serde(info.with_context("path", path.display().to_string()))
            }
            other => other,
        })
    }
}

/// Where and whether per-iteration models are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Enables writing one artifact per iteration and step.
    #[serde(default)]
    pub save_models: bool,
    /// File name prefix of every artifact.
    #[serde(default = "default_model_save_name")]
    pub model_save_name: String,
    /// Directory receiving the artifacts. Created if it does not exist.
    #[serde(default = "default_model_save_path")]
    pub model_save_path: PathBuf,
}

fn default_model_save_name() -> String {
    "bdt_unbinned_omnifold".to_string()
}

fn default_model_save_path() -> PathBuf {
    PathBuf::from("./weights/")
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            save_models: false,
            model_save_name: default_model_save_name(),
            model_save_path: default_model_save_path(),
        }
    }
}

/// Deterministic seeding configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedPolicy {
    /// Master seed all per-iteration model seeds derive from.
    #[serde(default = "default_master_seed")]
    pub master_seed: u64,
    /// Optional label recorded in manifests.
    #[serde(default)]
    pub label: Option<String>,
}

fn default_master_seed() -> u64 {
    0x0F01_D5EE_D0F0_1D5E_u64
}

impl Default for SeedPolicy {
    fn default() -> Self {
        Self {
            master_seed: default_master_seed(),
            label: None,
        }
    }
}
