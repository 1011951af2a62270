use omf_core::errors::{ErrorInfo, OmfError};
use omf_core::{Classifier, FeatureMatrix, Regressor, Step};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::omnifold::scatter;
use crate::persistence::ModelStore;
use crate::reweight::{regress_weights, reweight};

/// Applies the saved Step 1 models of `iteration` to new events.
///
/// Events failing `pass_reco` get the saved regressor's estimate from their
/// gen features. `None` or an empty mask means every event passes. The
/// artifact is loaded before any input is inspected.
pub fn get_step1_predictions<C, R>(
    gen: &FeatureMatrix,
    reco: &FeatureMatrix,
    store: &ModelStore,
    iteration: usize,
    pass_reco: Option<&[bool]>,
) -> Result<Vec<f64>, OmfError>
where
    C: Classifier + DeserializeOwned,
    R: Regressor + DeserializeOwned,
{
    let bundle = store.load_step1::<C, R>(iteration)?;
    let n = reco.n_rows();
    if gen.n_rows() != n {
        return Err(OmfError::Config(
            ErrorInfo::new("length-mismatch", "gen and reco entries must pair by index")
                .with_context("gen", gen.n_rows().to_string())
                .with_context("reco", n.to_string()),
        ));
    }
    let mask = match pass_reco {
        Some(mask) if !mask.is_empty() => {
            if mask.len() != n {
                return Err(OmfError::Config(
                    ErrorInfo::new("length-mismatch", "pass_reco has the wrong length")
                        .with_context("expected", n.to_string())
                        .with_context("found", mask.len().to_string()),
                ));
            }
            mask.to_vec()
        }
        _ => vec![true; n],
    };

    let passing = reweight(&reco.select(&mask)?, &bundle.classifier)?;
    let fail_mask: Vec<bool> = mask.iter().map(|pass| !pass).collect();
    let n_failing = fail_mask.iter().filter(|fail| **fail).count();
    let failing = if n_failing == 0 {
        Vec::new()
    } else {
        let regressor = bundle.regressor.as_ref().ok_or_else(|| {
            OmfError::MissingArtifact(
                ErrorInfo::new(
                    "regressor-missing",
                    "events fail reco cuts but the artifact holds no regressor",
                )
                .with_context(
                    "path",
                    store.artifact_path(iteration, Step::One).display().to_string(),
                )
                .with_context("failing", n_failing.to_string()),
            )
        })?;
        regress_weights(&gen.select(&fail_mask)?, regressor)?
    };
    debug!(iteration, events = n, failing = n_failing, "step 1 predictions");
    Ok(scatter(&mask, &passing, &failing))
}

/// Applies the saved Step 2 classifier of `iteration` to gen-level events.
pub fn get_step2_predictions<C>(
    gen: &FeatureMatrix,
    store: &ModelStore,
    iteration: usize,
) -> Result<Vec<f64>, OmfError>
where
    C: Classifier + DeserializeOwned,
{
    let bundle = store.load_step2::<C>(iteration)?;
    debug!(iteration, events = gen.n_rows(), "step 2 predictions");
    reweight(gen, &bundle.classifier)
}
