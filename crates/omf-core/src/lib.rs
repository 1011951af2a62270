#![deny(missing_docs)]
#![doc = "Core traits and data types shared by the OmniFold unfolding crates: the error taxonomy, feature matrices, deterministic seeding and the capability traits behind which classifiers, regressors and model persistence are plugged."]

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub mod errors;
pub mod matrix;
pub mod provenance;
pub mod rng;

pub use errors::{ErrorInfo, OmfError};
pub use matrix::{select_masked, FeatureMatrix};
pub use provenance::{ArtifactProvenance, SchemaVersion};
pub use rng::{derive_substream_seed, RowSampler};

/// Hyperparameters forwarded verbatim to a model provider.
pub type HyperParams = BTreeMap<String, String>;

/// The two halves of an OmniFold iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Step {
    /// Reco-level reweighting of simulation against measurement.
    One,
    /// Gen-level reweighting of the prior against the pulled sample.
    Two,
}

impl Step {
    /// Numeric label used in artifact names and logs.
    pub fn as_u8(&self) -> u8 {
        match self {
            Step::One => 1,
            Step::Two => 2,
        }
    }
}

/// Binary probabilistic classifier trained on weighted, labelled samples.
///
/// Labels are `0.0` or `1.0`. Each `fit` call fully retrains the model.
pub trait Classifier: Send + Sync {
    /// Trains the classifier.
    fn fit(
        &mut self,
        features: &FeatureMatrix,
        labels: &[f64],
        sample_weight: &[f64],
    ) -> Result<(), OmfError>;

    /// Returns `[P(class 0), P(class 1)]` for every row.
    fn predict_proba(&self, features: &FeatureMatrix) -> Result<Vec<[f64; 2]>, OmfError>;
}

/// Regression model mapping features to a continuous target.
pub trait Regressor: Send + Sync {
    /// Trains the regressor.
    fn fit(&mut self, features: &FeatureMatrix, targets: &[f64]) -> Result<(), OmfError>;

    /// Predicts one scalar per row.
    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>, OmfError>;
}

/// Factory for untrained classifiers and regressors.
pub trait ModelProvider {
    /// Classifier type produced by the provider.
    type Classifier: Classifier;
    /// Regressor type produced by the provider.
    type Regressor: Regressor;

    /// Creates an untrained classifier from user hyperparameters and a seed.
    fn classifier(&self, params: &HyperParams, seed: u64) -> Result<Self::Classifier, OmfError>;

    /// Creates an untrained regressor from user hyperparameters and a seed.
    fn regressor(&self, params: &HyperParams, seed: u64) -> Result<Self::Regressor, OmfError>;
}

/// Hook invoked at step boundaries with the models trained in that step.
///
/// An error returned from a hook aborts the run; weights computed before the
/// failing call are left untouched.
pub trait IterationObserver<C, R> {
    /// Called after Step 1 of the one-indexed `iteration`.
    fn step1_complete(
        &mut self,
        iteration: usize,
        classifier: &C,
        regressor: Option<&R>,
    ) -> Result<(), OmfError>;

    /// Called after Step 2 of the one-indexed `iteration`.
    fn step2_complete(&mut self, iteration: usize, classifier: &C) -> Result<(), OmfError>;
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl<C, R> IterationObserver<C, R> for NoopObserver {
    fn step1_complete(&mut self, _: usize, _: &C, _: Option<&R>) -> Result<(), OmfError> {
        Ok(())
    }

    fn step2_complete(&mut self, _: usize, _: &C) -> Result<(), OmfError> {
        Ok(())
    }
}

impl<C, R, O> IterationObserver<C, R> for &mut O
where
    O: IterationObserver<C, R> + ?Sized,
{
    fn step1_complete(
        &mut self,
        iteration: usize,
        classifier: &C,
        regressor: Option<&R>,
    ) -> Result<(), OmfError> {
        (**self).step1_complete(iteration, classifier, regressor)
    }

    fn step2_complete(&mut self, iteration: usize, classifier: &C) -> Result<(), OmfError> {
        (**self).step2_complete(iteration, classifier)
    }
}
