#![deny(missing_docs)]
#![doc = "Histogram gradient boosted decision trees used as the default classifier and regressor providers of the unfolding core."]

/// Binary classifier on the logistic loss.
pub mod classifier;
/// Additive ensembles and the boosting loop.
pub mod ensemble;
/// Loss functions and gradient pairs.
pub mod loss;
/// Hyperparameters and option parsing.
pub mod params;
/// Feature quantisation.
pub mod quantize;
/// Least-squares regressor.
pub mod regressor;
/// Tree structure and growth.
pub mod tree;

use omf_core::errors::OmfError;
use omf_core::{HyperParams, ModelProvider};

pub use classifier::GbdtClassifier;
pub use ensemble::Ensemble;
pub use params::BoostParams;
pub use regressor::GbdtRegressor;

/// Provider constructing boosted classifiers and regressors from option maps.
#[derive(Debug, Clone, Copy, Default)]
pub struct GbdtProvider;

impl ModelProvider for GbdtProvider {
    type Classifier = GbdtClassifier;
    type Regressor = GbdtRegressor;

    fn classifier(&self, params: &HyperParams, seed: u64) -> Result<GbdtClassifier, OmfError> {
        Ok(GbdtClassifier::new(BoostParams::from_options(params, seed)?))
    }

    fn regressor(&self, params: &HyperParams, seed: u64) -> Result<GbdtRegressor, OmfError> {
        Ok(GbdtRegressor::new(BoostParams::from_options(params, seed)?))
    }
}
