use omf_core::errors::OmfError;
use omf_core::{FeatureMatrix, ModelProvider, NoopObserver};
use omf_unfold::{omnifold, IterationSummary, UnfoldConfig, UnfoldInputs};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::expand::{aggregate, expand_measured, expand_response};
use crate::histogram::{Histogram1D, Histogram2D};

/// Result of [`binned_omnifold`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinnedOutput {
    /// Unfolded distribution over the response gen axis.
    pub unfolded: Histogram1D,
    /// Final push weight of every synthetic response event, reco-major order.
    pub weights_push: Vec<f64>,
    /// Final pull weight of every synthetic response event.
    pub weights_pull: Vec<f64>,
    /// Per-iteration diagnostics.
    pub iterations: Vec<IterationSummary>,
}

/// Binned entry point: unfolds a measured reco histogram through a response matrix.
///
/// `config` supplies hyperparameters and seeds; its iteration count is
/// replaced by `num_iterations`. Every mask is all-true and no models are
/// persisted.
pub fn binned_omnifold<P: ModelProvider>(
    response: &Histogram2D,
    measured: &Histogram1D,
    num_iterations: usize,
    use_density: bool,
    provider: &P,
    config: &UnfoldConfig,
) -> Result<BinnedOutput, OmfError> {
    if measured.axis != response.x_axis {
        warn!(
            measured_bins = measured.axis.n_bins(),
            reco_bins = response.x_axis.n_bins(),
            "measured axis differs from the response reco axis"
        );
    }
    let expanded = expand_response(response, use_density)?;
    let measured_events = expand_measured(measured, use_density)?;
    info!(
        response_events = expanded.len(),
        measured_events = measured_events.entries.len(),
        num_iterations,
        use_density,
        "starting binned omnifold"
    );

    let inputs = UnfoldInputs::new(
        FeatureMatrix::from_column(expanded.gen.clone()),
        FeatureMatrix::from_column(expanded.reco),
        FeatureMatrix::from_column(measured_events.entries),
    )
    .with_weights(
        Some(expanded.gen_weights),
        Some(expanded.reco_weights),
        Some(measured_events.weights),
    );
    let config = UnfoldConfig {
        num_iterations,
        ..config.clone()
    };
    let result = omnifold(&inputs, &config, provider, NoopObserver)?;
    let unfolded = aggregate(&response.y_axis, &expanded.gen, &result.weights_push)?;
    Ok(BinnedOutput {
        unfolded,
        weights_push: result.weights_push,
        weights_pull: result.weights_pull,
        iterations: result.iterations,
    })
}
