//! Boosting hyperparameters and their parsing from forwarded option maps.

use std::str::FromStr;

use omf_core::errors::{ErrorInfo, OmfError};
use omf_core::HyperParams;
use serde::{Deserialize, Serialize};

/// Largest supported number of histogram bins per feature.
pub const MAX_BINS_LIMIT: usize = 1024;

/// Hyperparameters shared by the boosted classifier and regressor.
///
/// Option names follow the common gradient boosting vocabulary so that
/// parameter maps written for other libraries mostly carry over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostParams {
    /// Number of boosting rounds (`n_estimators`).
    pub n_estimators: usize,
    /// Shrinkage applied to every tree (`learning_rate`).
    pub learning_rate: f64,
    /// Maximum depth of each tree (`max_depth`).
    pub max_depth: usize,
    /// Minimum number of training rows per leaf (`min_samples_leaf`).
    pub min_samples_leaf: usize,
    /// Minimum hessian sum per child (`min_child_weight`).
    pub min_child_weight: f64,
    /// L2 regularisation on leaf values (`reg_lambda`).
    pub reg_lambda: f64,
    /// Histogram bins per feature (`max_bins`).
    pub max_bins: usize,
    /// Row fraction drawn for each tree (`subsample`).
    pub subsample: f64,
    /// Seed for row subsampling (`random_state`).
    pub seed: u64,
}

impl Default for BoostParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 3,
            min_samples_leaf: 1,
            min_child_weight: 1e-3,
            reg_lambda: 1.0,
            max_bins: 255,
            subsample: 1.0,
            seed: 0,
        }
    }
}

fn parse_option<T: FromStr>(key: &str, raw: &str) -> Result<T, OmfError> {
    raw.trim().parse::<T>().map_err(|_| {
        OmfError::Config(
            ErrorInfo::new("invalid-hyperparameter", "could not parse hyperparameter value")
                .with_context("key", key)
                .with_context("value", raw),
        )
    })
}

impl BoostParams {
    /// Builds parameters from a forwarded option map on top of the defaults.
    ///
    /// The explicit `seed` is used unless the map carries `random_state`.
    pub fn from_options(options: &HyperParams, seed: u64) -> Result<Self, OmfError> {
        let mut params = Self {
            seed,
            ..Self::default()
        };
        for (key, raw) in options {
            match key.as_str() {
                "n_estimators" => params.n_estimators = parse_option(key, raw)?,
                "learning_rate" => params.learning_rate = parse_option(key, raw)?,
                "max_depth" => params.max_depth = parse_option(key, raw)?,
                "min_samples_leaf" => params.min_samples_leaf = parse_option(key, raw)?,
                "min_child_weight" => params.min_child_weight = parse_option(key, raw)?,
                "reg_lambda" => params.reg_lambda = parse_option(key, raw)?,
                "max_bins" => params.max_bins = parse_option(key, raw)?,
                "subsample" => params.subsample = parse_option(key, raw)?,
                "random_state" => params.seed = parse_option(key, raw)?,
                _ => {
                    return Err(OmfError::Config(
                        ErrorInfo::new("unknown-hyperparameter", "unsupported hyperparameter")
                            .with_context("key", key.as_str())
                            .with_hint(
                                "supported: n_estimators, learning_rate, max_depth, \
                                 min_samples_leaf, min_child_weight, reg_lambda, max_bins, \
                                 subsample, random_state",
                            ),
                    ))
                }
            }
        }
        params.validate()?;
        Ok(params)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), OmfError> {
        let invalid = |key: &str, reason: &str| {
            Err(OmfError::Config(
                ErrorInfo::new("invalid-hyperparameter", reason.to_string()).with_context("key", key),
            ))
        };
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return invalid("learning_rate", "learning rate must be positive and finite");
        }
        if self.max_depth == 0 {
            return invalid("max_depth", "trees need a depth of at least one");
        }
        if self.min_samples_leaf == 0 {
            return invalid("min_samples_leaf", "leaves need at least one row");
        }
        if self.min_child_weight.is_nan() || self.min_child_weight < 0.0 {
            return invalid("min_child_weight", "min_child_weight must be non-negative");
        }
        if self.reg_lambda.is_nan() || self.reg_lambda < 0.0 {
            return invalid("reg_lambda", "reg_lambda must be non-negative");
        }
        if self.max_bins < 2 || self.max_bins > MAX_BINS_LIMIT {
            return invalid("max_bins", "max_bins must lie in 2..=1024");
        }
        if !(self.subsample > 0.0 && self.subsample <= 1.0) {
            return invalid("subsample", "subsample must lie in (0, 1]");
        }
        Ok(())
    }
}
