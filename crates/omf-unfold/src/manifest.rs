use std::path::{Path, PathBuf};

use omf_core::errors::{ErrorInfo, OmfError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::UnfoldConfig;
use crate::json::{read_json_file, write_json_file};

/// Structured manifest describing a completed unfolding run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunManifest {
    /// Configuration used for the run.
    pub config: UnfoldConfig,
    /// Stable hash of the configuration, shared with artifact provenance.
    pub config_hash: String,
    /// Iterations actually executed.
    pub iterations: usize,
    /// Model artifacts written during the run, in write order.
    pub artifacts: Vec<PathBuf>,
    /// Output files (weights, metrics) produced by the run.
    pub outputs: Vec<PathBuf>,
}

impl RunManifest {
    /// Builds a manifest for `config`, computing its hash.
    pub fn new(config: &UnfoldConfig, iterations: usize) -> Result<Self, OmfError> {
        Ok(Self {
            config: config.clone(),
            config_hash: config_hash(config)?,
            iterations,
            artifacts: Vec::new(),
            outputs: Vec::new(),
        })
    }

    /// Writes the manifest as pretty JSON next to the run outputs.
    pub fn write(&self, path: &Path) -> Result<(), OmfError> {
        write_json_file(path, self)
    }

    /// Loads a manifest written by [`RunManifest::write`].
    pub fn load(path: &Path) -> Result<Self, OmfError> {
        read_json_file(path)
    }
}

/// Hex SHA-256 of the canonical JSON encoding of the configuration.
pub fn config_hash(config: &UnfoldConfig) -> Result<String, OmfError> {
    let value = serde_json::to_value(config)
        .map_err(|err| OmfError::Serde(ErrorInfo::new("config-hash", err.to_string())))?;
    let canonical = serde_json::to_string(&value)
        .map_err(|err| OmfError::Serde(ErrorInfo::new("config-hash", err.to_string())))?;
    Ok(hex::encode(Sha256::digest(canonical.as_bytes())))
}
