#![deny(missing_docs)]
#![doc = include_str!("../docs/unfold-api.md")]

/// YAML configuration schema and defaults.
pub mod config;
/// Deterministic seed derivation helpers.
pub mod determinism;
/// Inference-time application of saved models.
pub mod inference;
/// Input validation and truth-level filtering.
pub mod inputs;
/// JSON file helpers shared by manifests and CLI documents.
pub mod json;
/// Run manifests and configuration hashing.
pub mod manifest;
/// Iteration summaries and CSV export.
pub mod metrics;
/// The iteration loop and its two steps.
pub mod omnifold;
/// Per-iteration model artifacts.
pub mod persistence;
/// Likelihood-ratio weights from model outputs.
pub mod reweight;
/// Raw-array entry point.
pub mod unbinned;

pub use config::{PersistenceConfig, SeedPolicy, UnfoldConfig};
pub use inference::{get_step1_predictions, get_step2_predictions};
pub use inputs::{PreparedSample, UnfoldInputs};
pub use manifest::{config_hash, RunManifest};
pub use metrics::{IterationSummary, MetricsRecorder, WeightStats};
pub use omnifold::{omnifold, step_one, step_two, UnfoldResult};
pub use persistence::{ModelStore, Step1Bundle, Step2Bundle, ARTIFACT_SCHEMA};
pub use reweight::{likelihood_ratio, reweight};
pub use unbinned::{unbinned_omnifold, EventArray, UnbinnedOutput, UnbinnedRequest};
