use omf_core::errors::OmfError;
use omf_core::{Classifier, FeatureMatrix, Regressor};

/// Likelihood ratio `p1 / (1 - p1)`; any non-finite result maps to 0.
pub fn likelihood_ratio(p1: f64) -> f64 {
    finite_or_zero(p1 / (1.0 - p1))
}

/// Replaces NaN and infinities with 0.
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Per-event likelihood-ratio weights from a trained classifier.
pub fn reweight<C: Classifier + ?Sized>(
    events: &FeatureMatrix,
    classifier: &C,
) -> Result<Vec<f64>, OmfError> {
    Ok(classifier
        .predict_proba(events)?
        .into_iter()
        .map(|[_, p1]| likelihood_ratio(p1))
        .collect())
}

/// Regressor predictions with the same non-finite guard as [`reweight`].
pub fn regress_weights<R: Regressor + ?Sized>(
    events: &FeatureMatrix,
    regressor: &R,
) -> Result<Vec<f64>, OmfError> {
    Ok(regressor
        .predict(events)?
        .into_iter()
        .map(finite_or_zero)
        .collect())
}
