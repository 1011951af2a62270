use omf_core::errors::OmfError;
use omf_core::{
    select_masked, Classifier, FeatureMatrix, IterationObserver, ModelProvider, Regressor, Step,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::UnfoldConfig;
use crate::determinism;
use crate::inputs::{PreparedSample, UnfoldInputs};
use crate::metrics::{IterationSummary, MetricsRecorder, WeightStats};
use crate::reweight::{regress_weights, reweight};

/// Weights produced by an unfolding run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnfoldResult {
    /// Weights after the final Step 1, one per truth-passing event.
    pub weights_pull: Vec<f64>,
    /// Weights after the final Step 2, one per truth-passing event.
    pub weights_push: Vec<f64>,
    /// Per-iteration diagnostics.
    pub iterations: Vec<IterationSummary>,
}

/// Runs `config.num_iterations` OmniFold iterations.
///
/// Inputs are validated and truth-filtered before any model is built. Every
/// iteration asks `provider` for fresh models seeded from the master seed and
/// reports them to `observer` at both step boundaries.
pub fn omnifold<P, O>(
    inputs: &UnfoldInputs,
    config: &UnfoldConfig,
    provider: &P,
    mut observer: O,
) -> Result<UnfoldResult, OmfError>
where
    P: ModelProvider,
    O: IterationObserver<P::Classifier, P::Regressor>,
{
    let sample = inputs.prepare()?;
    let n_events = sample.len();
    let use_regressor = sample.needs_regressor();
    let master_seed = config.seed_policy.master_seed;
    info!(
        events = n_events,
        measured = sample.measured.n_rows(),
        iterations = config.num_iterations,
        regressor = use_regressor,
        "starting omnifold"
    );

    let mut weights_pull = vec![1.0; n_events];
    let mut weights_push = vec![1.0; n_events];
    let mut recorder = MetricsRecorder::new();

    for iteration in 1..=config.num_iterations {
        info!(iteration, "step 1");
        let mut classifier = provider.classifier(
            &config.classifier1_params,
            determinism::classifier_seed(master_seed, iteration, Step::One),
        )?;
        let mut regressor = if use_regressor {
            Some(provider.regressor(
                &config.regressor_params,
                determinism::regressor_seed(master_seed, iteration),
            )?)
        } else {
            None
        };
        weights_pull = step_one(&sample, &weights_push, &mut classifier, regressor.as_mut())?;
        observer.step1_complete(iteration, &classifier, regressor.as_ref())?;

        info!(iteration, "step 2");
        let mut classifier = provider.classifier(
            &config.classifier2_params,
            determinism::classifier_seed(master_seed, iteration, Step::Two),
        )?;
        weights_push = step_two(&sample, &weights_pull, &mut classifier)?;
        observer.step2_complete(iteration, &classifier)?;

        let summary = IterationSummary {
            iteration,
            step1_rows: sample.reco_passing.n_rows() + sample.measured.n_rows(),
            step2_rows: 2 * n_events,
            regressor_used: use_regressor,
            pull: WeightStats::from_weights(&weights_pull),
            push: WeightStats::from_weights(&weights_push),
        };
        debug!(
            iteration,
            pull_mean = summary.pull.mean,
            push_mean = summary.push.mean,
            push_max = summary.push.max,
            "iteration weights"
        );
        recorder.push(summary);
    }

    Ok(UnfoldResult {
        weights_pull,
        weights_push,
        iterations: recorder.into_summaries(),
    })
}

/// Step 1: reweights simulated reco entries toward the measurement.
///
/// Returns the cumulative `weights_push * new_weights`. Events without a
/// reconstruction get their new weight from `regressor`, trained on the gen
/// features of reconstructed events; without a regressor they keep weight 0.
pub fn step_one<C, R>(
    sample: &PreparedSample,
    weights_push: &[f64],
    classifier: &mut C,
    regressor: Option<&mut R>,
) -> Result<Vec<f64>, OmfError>
where
    C: Classifier + ?Sized,
    R: Regressor + ?Sized,
{
    let n_sim = sample.reco_passing.n_rows();
    let n_measured = sample.measured.n_rows();
    let features = sample.reco_passing.concat(&sample.measured)?;
    let mut labels = vec![0.0; n_sim];
    labels.resize(n_sim + n_measured, 1.0);
    let push_passing = select_masked(weights_push, &sample.pass_reco);
    let reco_passing = select_masked(&sample.reco_weights, &sample.pass_reco);
    let mut weights: Vec<f64> = push_passing
        .iter()
        .zip(&reco_passing)
        .map(|(push, reco)| push * reco)
        .collect();
    weights.extend_from_slice(&sample.measured_weights);
    debug!(simulated = n_sim, measured = n_measured, "step 1 training set");

    classifier.fit(&features, &labels, &weights)?;
    let passing = reweight(&sample.reco_passing, &*classifier)?;

    let failing = match regressor {
        Some(regressor) => {
            debug!(
                train = sample.gen_passing.n_rows(),
                predict = sample.gen_failing.n_rows(),
                "step 1 regressor"
            );
            regressor.fit(&sample.gen_passing, &passing)?;
            regress_weights(&sample.gen_failing, &*regressor)?
        }
        None => vec![0.0; sample.gen_failing.n_rows()],
    };

    let new_weights = scatter(&sample.pass_reco, &passing, &failing);
    Ok(weights_push
        .iter()
        .zip(&new_weights)
        .map(|(push, new)| push * new)
        .collect())
}

/// Step 2: learns the gen-level map from the prior to the pulled sample.
///
/// The returned weights replace `weights_push`; they are not multiplied into it.
pub fn step_two<C>(
    sample: &PreparedSample,
    weights_pull: &[f64],
    classifier: &mut C,
) -> Result<Vec<f64>, OmfError>
where
    C: Classifier + ?Sized,
{
    let n = sample.len();
    let features: FeatureMatrix = sample.gen.concat(&sample.gen)?;
    let mut labels = vec![0.0; n];
    labels.resize(2 * n, 1.0);
    let mut weights = sample.gen_weights.clone();
    weights.extend(
        weights_pull
            .iter()
            .zip(&sample.gen_weights)
            .map(|(pull, gen)| pull * gen),
    );
    debug!(rows = 2 * n, "step 2 training set");
    classifier.fit(&features, &labels, &weights)?;
    reweight(&sample.gen, &*classifier)
}

/// Interleaves `passing` and `failing` back into event order following `mask`.
pub(crate) fn scatter(mask: &[bool], passing: &[f64], failing: &[f64]) -> Vec<f64> {
    let mut passing = passing.iter();
    let mut failing = failing.iter();
    mask.iter()
        .map(|pass| {
            let source = if *pass { passing.next() } else { failing.next() };
            source.copied().unwrap_or(0.0)
        })
        .collect()
}
