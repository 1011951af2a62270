//! Boosted least-squares regressor.

use omf_core::errors::OmfError;
use omf_core::{FeatureMatrix, Regressor};
use serde::{Deserialize, Serialize};

use crate::ensemble::{check_training_inputs, Ensemble};
use crate::loss::SquaredLoss;
use crate::params::BoostParams;

/// Gradient boosted trees on the squared error, starting from the target mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GbdtRegressor {
    params: BoostParams,
    ensemble: Option<Ensemble>,
}

impl GbdtRegressor {
    /// Creates an untrained regressor.
    pub fn new(params: BoostParams) -> Self {
        Self {
            params,
            ensemble: None,
        }
    }

    /// Hyperparameters in use.
    pub fn params(&self) -> &BoostParams {
        &self.params
    }
}

impl Regressor for GbdtRegressor {
    fn fit(&mut self, features: &FeatureMatrix, targets: &[f64]) -> Result<(), OmfError> {
        let weights = vec![1.0; targets.len()];
        check_training_inputs(features, targets, &weights)?;
        let mean = targets.iter().sum::<f64>() / targets.len() as f64;
        self.ensemble = Some(Ensemble::train(
            features,
            targets,
            &weights,
            mean,
            &SquaredLoss,
            &self.params,
        )?);
        Ok(())
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>, OmfError> {
        let ensemble = self.ensemble.as_ref().ok_or_else(|| {
            OmfError::training("not-fitted", "regressor must be fitted before prediction")
        })?;
        ensemble.predict_raw(features)
    }
}
