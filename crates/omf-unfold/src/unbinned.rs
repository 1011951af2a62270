use std::path::PathBuf;

use omf_core::errors::{ErrorInfo, OmfError};
use omf_core::{FeatureMatrix, ModelProvider, NoopObserver};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::UnfoldConfig;
use crate::inputs::UnfoldInputs;
use crate::manifest::config_hash;
use crate::metrics::IterationSummary;
use crate::omnifold::omnifold;
use crate::persistence::ModelStore;

/// Raw event array: one value per event or one row per event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventArray {
    /// One scalar per event, promoted to an N x 1 matrix.
    Column(Vec<f64>),
    /// One feature vector per event.
    Matrix(Vec<Vec<f64>>),
}

impl EventArray {
    /// Number of events.
    pub fn len(&self) -> usize {
        match self {
            EventArray::Column(values) => values.len(),
            EventArray::Matrix(rows) => rows.len(),
        }
    }

    /// Returns true when the array holds no events.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Converts into a feature matrix, rejecting ragged rows.
    pub fn to_matrix(&self) -> Result<FeatureMatrix, OmfError> {
        match self {
            EventArray::Column(values) => Ok(FeatureMatrix::from_column(values.clone())),
            EventArray::Matrix(rows) if rows.is_empty() => Err(OmfError::Config(
                ErrorInfo::new("empty-sample", "event array holds no rows")
                    .with_hint("pass an empty 1D array for an empty sample"),
            )),
            EventArray::Matrix(rows) => FeatureMatrix::from_rows(rows),
        }
    }
}

impl From<Vec<f64>> for EventArray {
    fn from(values: Vec<f64>) -> Self {
        EventArray::Column(values)
    }
}

impl From<Vec<Vec<f64>>> for EventArray {
    fn from(rows: Vec<Vec<f64>>) -> Self {
        EventArray::Matrix(rows)
    }
}

/// Arrays accepted by [`unbinned_omnifold`]; masks and weights are optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnbinnedRequest {
    /// Simulated generator-level entries.
    pub mc_gen: EventArray,
    /// Simulated reconstructed-level entries.
    pub mc_reco: EventArray,
    /// Measured entries.
    pub measured: EventArray,
    /// Simulated events passing reco cuts.
    #[serde(default)]
    pub mc_pass_reco: Option<Vec<bool>>,
    /// Simulated events passing truth cuts.
    #[serde(default)]
    pub mc_pass_truth: Option<Vec<bool>>,
    /// Measured events passing reco cuts.
    #[serde(default)]
    pub measured_pass_reco: Option<Vec<bool>>,
    /// Generator-level weights.
    #[serde(default)]
    pub mc_gen_weights: Option<Vec<f64>>,
    /// Reco-level simulated weights.
    #[serde(default)]
    pub mc_reco_weights: Option<Vec<f64>>,
    /// Measured weights.
    #[serde(default)]
    pub measured_weights: Option<Vec<f64>>,
}

impl UnbinnedRequest {
    /// Request with default masks and weights.
    pub fn new(
        mc_gen: impl Into<EventArray>,
        mc_reco: impl Into<EventArray>,
        measured: impl Into<EventArray>,
    ) -> Self {
        Self {
            mc_gen: mc_gen.into(),
            mc_reco: mc_reco.into(),
            measured: measured.into(),
            mc_pass_reco: None,
            mc_pass_truth: None,
            measured_pass_reco: None,
            mc_gen_weights: None,
            mc_reco_weights: None,
            measured_weights: None,
        }
    }

    /// Promotes the arrays and fills defaults for missing masks.
    pub fn to_inputs(&self) -> Result<UnfoldInputs, OmfError> {
        let mut inputs = UnfoldInputs::new(
            self.mc_gen.to_matrix()?,
            self.mc_reco.to_matrix()?,
            self.measured.to_matrix()?,
        );
        if let Some(mask) = &self.mc_pass_reco {
            inputs.mc_pass_reco = mask.clone();
        }
        if let Some(mask) = &self.mc_pass_truth {
            inputs.mc_pass_truth = mask.clone();
        }
        if let Some(mask) = &self.measured_pass_reco {
            inputs.measured_pass_reco = mask.clone();
        }
        Ok(inputs.with_weights(
            self.mc_gen_weights.clone(),
            self.mc_reco_weights.clone(),
            self.measured_weights.clone(),
        ))
    }
}

/// Weights and bookkeeping returned by [`unbinned_omnifold`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnbinnedOutput {
    /// Step 1 weights of the final iteration, per truth-passing event.
    pub weights_pull: Vec<f64>,
    /// Step 2 weights of the final iteration, per truth-passing event.
    pub weights_push: Vec<f64>,
    /// Per-iteration diagnostics.
    pub iterations: Vec<IterationSummary>,
    /// Model artifacts written, empty unless persistence is enabled.
    pub artifacts: Vec<PathBuf>,
}

/// Unbinned entry point: runs the iteration loop on raw arrays.
///
/// Persistence is opt-in: `persistence.save_models` defaults to `false`, so
/// a default configuration writes no artifacts and `artifacts` comes back
/// empty. This differs from the Python `unbinned_omnifold`, which saves
/// models unless told otherwise. With `save_models` set, the model directory
/// is prepared before any training and every step's models are written as
/// they finish.
pub fn unbinned_omnifold<P>(
    request: &UnbinnedRequest,
    config: &UnfoldConfig,
    provider: &P,
) -> Result<UnbinnedOutput, OmfError>
where
    P: ModelProvider,
    P::Classifier: Serialize,
    P::Regressor: Serialize,
{
    let inputs = request.to_inputs()?;
    inputs.validate()?;
    if config.persistence.save_models {
        let mut store = ModelStore::from_config(&config.persistence)
            .with_provenance(config_hash(config)?, config.seed_policy.master_seed);
        store.prepare()?;
        let result = omnifold(&inputs, config, provider, &mut store)?;
        info!(artifacts = store.written().len(), "unbinned omnifold finished");
        Ok(UnbinnedOutput {
            weights_pull: result.weights_pull,
            weights_push: result.weights_push,
            iterations: result.iterations,
            artifacts: store.written().to_vec(),
        })
    } else {
        let result = omnifold(&inputs, config, provider, NoopObserver)?;
        info!("unbinned omnifold finished");
        Ok(UnbinnedOutput {
            weights_pull: result.weights_pull,
            weights_push: result.weights_push,
            iterations: result.iterations,
            artifacts: Vec::new(),
        })
    }
}
