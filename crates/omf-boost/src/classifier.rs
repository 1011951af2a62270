//! Boosted binary classifier on the logistic loss.

use omf_core::errors::{ErrorInfo, OmfError};
use omf_core::{Classifier, FeatureMatrix};
use serde::{Deserialize, Serialize};

use crate::ensemble::{check_training_inputs, Ensemble};
use crate::loss::{sigmoid, LogisticLoss};
use crate::params::BoostParams;

/// Gradient boosted trees producing class-1 probabilities through a sigmoid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GbdtClassifier {
    params: BoostParams,
    ensemble: Option<Ensemble>,
}

impl GbdtClassifier {
    /// Creates an untrained classifier.
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

    /// The fitted ensemble, if trained.
    pub fn ensemble(&self) -> Option<&Ensemble> {
        self.ensemble.as_ref()
    }
}

impl Classifier for GbdtClassifier {
    fn fit(
        &mut self,
        features: &FeatureMatrix,
        labels: &[f64],
        sample_weight: &[f64],
    ) -> Result<(), OmfError> {
        check_training_inputs(features, labels, sample_weight)?;
        if let Some(idx) = labels.iter().position(|label| *label != 0.0 && *label != 1.0) {
            return Err(OmfError::Training(
                ErrorInfo::new("invalid-label", "labels must be 0 or 1")
                    .with_context("index", idx.to_string()),
            ));
        }
        let (mut positive, mut total) = (0.0, 0.0);
        for (label, weight) in labels.iter().zip(sample_weight) {
            positive += label * weight;
            total += weight;
        }
        if positive <= 0.0 || positive >= total {
            return Err(OmfError::Training(
                ErrorInfo::new(
                    "single-class",
                    "both classes need positive total weight to train a classifier",
                )
                .with_context("class1_weight", positive.to_string())
                .with_context("total_weight", total.to_string()),
            ));
        }
        let prior = positive / total;
        let base_score = (prior / (1.0 - prior)).ln();
        self.ensemble = Some(Ensemble::train(
            features,
            labels,
            sample_weight,
            base_score,
            &LogisticLoss,
            &self.params,
        )?);
        Ok(())
    }

    fn predict_proba(&self, features: &FeatureMatrix) -> Result<Vec<[f64; 2]>, OmfError> {
        let ensemble = self.ensemble.as_ref().ok_or_else(|| {
            OmfError::training("not-fitted", "classifier must be fitted before prediction")
        })?;
        Ok(ensemble
            .predict_raw(features)?
            .into_iter()
            .map(|score| {
                let p1 = sigmoid(score);
                [1.0 - p1, p1]
            })
            .collect())
    }
}
