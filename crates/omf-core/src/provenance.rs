//! Provenance and schema descriptors attached to persisted model artifacts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Semantic version describing the schema of serialized payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Major version incremented for breaking changes.
    pub major: u32,
    /// Minor version incremented for additive changes.
    pub minor: u32,
    /// Patch version incremented for bug fixes and documentation updates.
    pub patch: u32,
}

impl SchemaVersion {
    /// Creates a new schema version descriptor.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Returns true when a payload written with `other` can be read by `self`.
    pub fn is_compatible_with(&self, other: &SchemaVersion) -> bool {
        self.major == other.major
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::new(1, 0, 0)
    }
}

/// Provenance information attached to every persisted artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ArtifactProvenance {
    /// Stable hash of the run configuration that produced the artifact.
    pub config_hash: String,
    /// Master seed the iteration seeds were derived from.
    pub seed: u64,
    /// One-indexed iteration the artifact belongs to.
    pub iteration: usize,
    /// Step (1 or 2) the artifact belongs to.
    pub step: u8,
    /// Version map for all tools involved in the run.
    pub tool_versions: BTreeMap<String, String>,
}
