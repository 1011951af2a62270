//! Additive tree ensembles and the shared boosting loop.

use omf_core::errors::{ErrorInfo, OmfError};
use omf_core::{FeatureMatrix, RowSampler};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::loss::{GradientPair, Loss};
use crate::params::BoostParams;
use crate::quantize::BinCuts;
use crate::tree::{Tree, TreeGrower};

/// Fitted additive model: `base_score + learning_rate * sum(tree(x))`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ensemble {
    n_features: usize,
    base_score: f64,
    learning_rate: f64,
    trees: Vec<Tree>,
}

impl Ensemble {
    /// Runs `params.n_estimators` boosting rounds of `loss` starting from `base_score`.
    pub fn train<L: Loss>(
        features: &FeatureMatrix,
        targets: &[f64],
        weights: &[f64],
        base_score: f64,
        loss: &L,
        params: &BoostParams,
    ) -> Result<Self, OmfError> {
        check_training_inputs(features, targets, weights)?;
        let num_rows = features.n_rows();
        let cuts = BinCuts::fit(features, params.max_bins);
        let data = cuts.quantize(features);
        let mut preds = vec![base_score; num_rows];
        let mut grads = vec![GradientPair::default(); num_rows];
        let mut sampler = RowSampler::from_seed(params.seed);
        let mut trees = Vec::with_capacity(params.n_estimators);

        for _ in 0..params.n_estimators {
            loss.gradient_batch(&preds, targets, weights, &mut grads);
            let rows = sampler.subsample(num_rows, params.subsample);
            let tree = TreeGrower::new(&data, &cuts, &grads, params).grow(rows);
            for (row, pred) in preds.iter_mut().enumerate() {
                *pred += params.learning_rate * tree.predict_binned(&data, row);
            }
            trees.push(tree);
        }

        debug!(
            loss = loss.name(),
            rows = num_rows,
            features = features.n_cols(),
            rounds = trees.len(),
            "boosting finished"
        );

        Ok(Self {
            n_features: features.n_cols(),
            base_score,
            learning_rate: params.learning_rate,
            trees,
        })
    }

    /// Raw additive scores for every row.
    pub fn predict_raw(&self, features: &FeatureMatrix) -> Result<Vec<f64>, OmfError> {
        if features.n_cols() != self.n_features {
            return Err(OmfError::Training(
                ErrorInfo::new(
                    "feature-dimension",
                    "prediction features differ from the training dimensionality",
                )
                .with_context("expected", self.n_features.to_string())
                .with_context("found", features.n_cols().to_string()),
            ));
        }
        Ok(features
            .rows()
            .map(|row| {
                self.base_score
                    + self.learning_rate
                        * self.trees.iter().map(|tree| tree.predict_row(row)).sum::<f64>()
            })
            .collect())
    }

    /// Number of fitted trees.
    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// Dimensionality the ensemble was trained on.
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Constant score every prediction starts from.
    pub fn base_score(&self) -> f64 {
        self.base_score
    }
}

/// Shared input checks for classifier and regressor training.
pub(crate) fn check_training_inputs(
    features: &FeatureMatrix,
    targets: &[f64],
    weights: &[f64],
) -> Result<(), OmfError> {
    if features.is_empty() {
        return Err(OmfError::training(
            "empty-training-set",
            "cannot fit a model on zero rows",
        ));
    }
    if targets.len() != features.n_rows() || weights.len() != features.n_rows() {
        return Err(OmfError::Training(
            ErrorInfo::new("length-mismatch", "targets or weights do not match the row count")
                .with_context("rows", features.n_rows().to_string())
                .with_context("targets", targets.len().to_string())
                .with_context("weights", weights.len().to_string()),
        ));
    }
    if let Some(idx) = weights
        .iter()
        .position(|weight| !weight.is_finite() || *weight < 0.0)
    {
        return Err(OmfError::Training(
            ErrorInfo::new("invalid-weight", "sample weights must be finite and non-negative")
                .with_context("index", idx.to_string())
                .with_context("value", weights[idx].to_string()),
        ));
    }
    if let Some(idx) = targets.iter().position(|target| !target.is_finite()) {
        return Err(OmfError::Training(
            ErrorInfo::new("invalid-target", "targets must be finite")
                .with_context("index", idx.to_string()),
        ));
    }
    Ok(())
}
