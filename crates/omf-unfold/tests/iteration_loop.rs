use std::sync::{Arc, Mutex};

use omf_core::{
    Classifier, FeatureMatrix, HyperParams, IterationObserver, ModelProvider, NoopObserver,
    OmfError, Regressor,
};
use omf_unfold::{omnifold, UnfoldConfig, UnfoldInputs};
use proptest::prelude::*;

const SENTINEL: f64 = 999.0;

#[derive(Debug, Default)]
struct Log {
    classifier_fits: Vec<(FeatureMatrix, Vec<f64>, Vec<f64>)>,
    regressor_fits: Vec<(FeatureMatrix, Vec<f64>)>,
    regressors_built: usize,
    seeds: Vec<u64>,
}

/// Provider whose models answer a fixed probability read from their params.
#[derive(Clone, Default)]
struct RecordingProvider {
    log: Arc<Mutex<Log>>,
}

struct FixedClassifier {
    p1: f64,
    log: Arc<Mutex<Log>>,
}

struct FixedRegressor {
    value: f64,
    log: Arc<Mutex<Log>>,
}

impl Classifier for FixedClassifier {
    fn fit(
        &mut self,
        features: &FeatureMatrix,
        labels: &[f64],
        sample_weight: &[f64],
    ) -> Result<(), OmfError> {
        self.log.lock().unwrap().classifier_fits.push((
            features.clone(),
            labels.to_vec(),
            sample_weight.to_vec(),
        ));
        Ok(())
    }

    fn predict_proba(&self, features: &FeatureMatrix) -> Result<Vec<[f64; 2]>, OmfError> {
        Ok(vec![[1.0 - self.p1, self.p1]; features.n_rows()])
    }
}

impl Regressor for FixedRegressor {
    fn fit(&mut self, features: &FeatureMatrix, targets: &[f64]) -> Result<(), OmfError> {
        self.log
            .lock()
            .unwrap()
            .regressor_fits
            .push((features.clone(), targets.to_vec()));
        Ok(())
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>, OmfError> {
        Ok(vec![self.value; features.n_rows()])
    }
}

fn param(params: &HyperParams, key: &str, default: f64) -> f64 {
    params
        .get(key)
        .map(|value| value.parse().unwrap())
        .unwrap_or(default)
}

impl ModelProvider for RecordingProvider {
    type Classifier = FixedClassifier;
    type Regressor = FixedRegressor;

    fn classifier(&self, params: &HyperParams, seed: u64) -> Result<FixedClassifier, OmfError> {
        self.log.lock().unwrap().seeds.push(seed);
        Ok(FixedClassifier {
            p1: param(params, "p1", 0.5),
            log: Arc::clone(&self.log),
        })
    }

    fn regressor(&self, params: &HyperParams, _seed: u64) -> Result<FixedRegressor, OmfError> {
        self.log.lock().unwrap().regressors_built += 1;
        Ok(FixedRegressor {
            value: param(params, "value", 1.0),
            log: Arc::clone(&self.log),
        })
    }
}

fn config(iterations: usize, p_step1: f64, p_step2: f64) -> UnfoldConfig {
    let mut config = UnfoldConfig::with_iterations(iterations);
    config
        .classifier1_params
        .insert("p1".into(), p_step1.to_string());
    config
        .classifier2_params
        .insert("p1".into(), p_step2.to_string());
    config
}

fn simple_inputs(n: usize) -> UnfoldInputs {
    let gen: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let reco: Vec<f64> = gen.iter().map(|v| v + 0.25).collect();
    let measured: Vec<f64> = (0..n).map(|i| i as f64 + 0.5).collect();
    UnfoldInputs::new(
        FeatureMatrix::from_column(gen),
        FeatureMatrix::from_column(reco),
        FeatureMatrix::from_column(measured),
    )
}

#[test]
fn zero_iterations_return_ones_without_training() {
    let provider = RecordingProvider::default();
    let mut inputs = simple_inputs(6);
    inputs.mc_pass_truth = vec![true, false, true, true, false, true];
    let result = omnifold(&inputs, &config(0, 0.5, 0.5), &provider, NoopObserver).unwrap();
    assert_eq!(result.weights_pull, vec![1.0; 4]);
    assert_eq!(result.weights_push, vec![1.0; 4]);
    assert!(result.iterations.is_empty());
    assert!(provider.log.lock().unwrap().classifier_fits.is_empty());
}

#[test]
fn step_one_accumulates_and_step_two_replaces() {
    let provider = RecordingProvider::default();
    // p1 = 2/3 gives ratio 2, p1 = 3/4 gives ratio 3.
    let result = omnifold(
        &simple_inputs(5),
        &config(2, 2.0 / 3.0, 0.75),
        &provider,
        NoopObserver,
    )
    .unwrap();
    for (pull, push) in result.weights_pull.iter().zip(&result.weights_push) {
        assert!((pull - 6.0).abs() < 1e-9);
        assert!((push - 3.0).abs() < 1e-9);
    }
    assert_eq!(result.iterations.len(), 2);
    assert!((result.iterations[0].pull.mean - 2.0).abs() < 1e-9);
}

#[test]
fn truth_failing_events_never_reach_training() {
    let provider = RecordingProvider::default();
    let mut inputs = simple_inputs(8);
    let truth = vec![true, true, false, true, false, true, true, true];
    for (idx, pass) in truth.iter().enumerate() {
        if !pass {
            inputs.mc_gen.row_mut(idx)[0] = SENTINEL;
            inputs.mc_reco.row_mut(idx)[0] = SENTINEL;
        }
    }
    inputs.mc_pass_truth = truth;
    inputs.mc_pass_reco = vec![true, false, true, true, true, false, true, true];

    let result = omnifold(&inputs, &config(2, 0.6, 0.4), &provider, NoopObserver).unwrap();
    assert_eq!(result.weights_pull.len(), 6);
    assert_eq!(result.weights_push.len(), 6);

    let log = provider.log.lock().unwrap();
    assert_eq!(log.classifier_fits.len(), 4);
    for (features, labels, weights) in &log.classifier_fits {
        assert!(features.as_slice().iter().all(|v| *v != SENTINEL));
        assert_eq!(labels.len(), features.n_rows());
        assert_eq!(weights.len(), features.n_rows());
    }
    for (features, _) in &log.regressor_fits {
        assert!(features.as_slice().iter().all(|v| *v != SENTINEL));
    }
}

#[test]
fn training_sets_follow_the_two_step_layout() {
    let provider = RecordingProvider::default();
    let inputs = simple_inputs(4).with_weights(
        Some(vec![1.0, 2.0, 3.0, 4.0]),
        Some(vec![0.5; 4]),
        Some(vec![2.0; 4]),
    );
    omnifold(&inputs, &config(1, 2.0 / 3.0, 0.5), &provider, NoopObserver).unwrap();
    let log = provider.log.lock().unwrap();

    let (step1, labels1, weights1) = &log.classifier_fits[0];
    assert_eq!(step1.n_rows(), 8);
    assert_eq!(labels1, &vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0]);
    assert_eq!(weights1, &vec![0.5, 0.5, 0.5, 0.5, 2.0, 2.0, 2.0, 2.0]);

    let (step2, labels2, weights2) = &log.classifier_fits[1];
    assert_eq!(step2.column(0)[..4], step2.column(0)[4..]);
    assert_eq!(labels2[..4], [0.0; 4]);
    assert_eq!(labels2[4..], [1.0; 4]);
    assert_eq!(weights2[..4], [1.0, 2.0, 3.0, 4.0]);
    for (pulled, gen) in weights2[4..].iter().zip([1.0, 2.0, 3.0, 4.0]) {
        assert!((pulled - 2.0 * gen).abs() < 1e-9);
    }
}

#[test]
fn regressor_only_built_when_reco_cuts_fail() {
    let provider = RecordingProvider::default();
    omnifold(&simple_inputs(5), &config(2, 0.5, 0.5), &provider, NoopObserver).unwrap();
    assert_eq!(provider.log.lock().unwrap().regressors_built, 0);

    let provider = RecordingProvider::default();
    let mut inputs = simple_inputs(5);
    inputs.mc_pass_reco = vec![true, true, false, true, false];
    let mut config = config(2, 2.0 / 3.0, 0.5);
    config.regressor_params.insert("value".into(), "1.5".into());
    let result = omnifold(&inputs, &config, &provider, NoopObserver).unwrap();

    let log = provider.log.lock().unwrap();
    assert_eq!(log.regressors_built, 2);
    let (features, targets) = &log.regressor_fits[0];
    assert_eq!(features.column(0), vec![0.0, 1.0, 3.0]);
    assert!(targets.iter().all(|t| (t - 2.0).abs() < 1e-9));
    // Failing events take the regressed weight, passing ones the classifier ratio.
    assert!((result.weights_pull[2] - 1.5).abs() < 1e-9);
    assert!((result.weights_pull[0] - 2.0).abs() < 1e-9);
}

#[test]
fn certain_classifier_output_maps_to_zero_weight() {
    let provider = RecordingProvider::default();
    let result = omnifold(&simple_inputs(3), &config(1, 1.0, 0.5), &provider, NoopObserver)
        .unwrap();
    assert_eq!(result.weights_pull, vec![0.0; 3]);
}

#[test]
fn seeds_depend_on_iteration_and_step() {
    let run = || {
        let provider = RecordingProvider::default();
        omnifold(&simple_inputs(3), &config(2, 0.5, 0.5), &provider, NoopObserver).unwrap();
        let seeds = provider.log.lock().unwrap().seeds.clone();
        seeds
    };
    let seeds = run();
    assert_eq!(seeds.len(), 4);
    let mut unique = seeds.clone();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(unique.len(), 4);
    assert_eq!(seeds, run());
}

#[test]
fn invalid_inputs_fail_before_training() {
    let provider = RecordingProvider::default();
    let mut inputs = simple_inputs(4);
    inputs.mc_pass_reco.pop();
    let err = omnifold(&inputs, &config(1, 0.5, 0.5), &provider, NoopObserver).unwrap_err();
    assert!(matches!(err, OmfError::Config(ref info) if info.code == "length-mismatch"));

    let inputs = simple_inputs(4).with_weights(None, None, Some(vec![1.0, -1.0, 1.0, 1.0]));
    let err = omnifold(&inputs, &config(1, 0.5, 0.5), &provider, NoopObserver).unwrap_err();
    assert!(matches!(err, OmfError::Config(ref info) if info.code == "invalid-weight"));
    assert!(provider.log.lock().unwrap().classifier_fits.is_empty());
}

#[derive(Default)]
struct StepLog(Vec<(usize, u8, bool)>);

impl<C, R> IterationObserver<C, R> for StepLog {
    fn step1_complete(
        &mut self,
        iteration: usize,
        _: &C,
        regressor: Option<&R>,
    ) -> Result<(), OmfError> {
        self.0.push((iteration, 1, regressor.is_some()));
        Ok(())
    }

    fn step2_complete(&mut self, iteration: usize, _: &C) -> Result<(), OmfError> {
        self.0.push((iteration, 2, false));
        if iteration == 2 {
            return Err(OmfError::training("observer-abort", "stop"));
        }
        Ok(())
    }
}

#[test]
fn observer_sees_each_step_and_can_abort() {
    let provider = RecordingProvider::default();
    let mut observer = StepLog::default();
    let err = omnifold(&simple_inputs(3), &config(3, 0.5, 0.5), &provider, &mut observer)
        .unwrap_err();
    assert_eq!(err.info().code, "observer-abort");
    assert_eq!(
        observer.0,
        vec![(1, 1, false), (1, 2, false), (2, 1, false), (2, 2, false)]
    );
}

proptest! {
    #[test]
    fn weights_cover_exactly_the_truth_passing_events(
        masks in proptest::collection::vec((any::<bool>(), any::<bool>()), 1..24),
        iterations in 0usize..3,
    ) {
        let n = masks.len();
        let (truth, reco): (Vec<bool>, Vec<bool>) = masks.into_iter().unzip();
        let expected = truth.iter().filter(|pass| **pass).count();
        let mut inputs = simple_inputs(n);
        inputs.mc_pass_truth = truth;
        inputs.mc_pass_reco = reco;
        let provider = RecordingProvider::default();
        let result = omnifold(&inputs, &config(iterations, 0.6, 0.3), &provider, NoopObserver)
            .unwrap();
        prop_assert_eq!(result.weights_pull.len(), expected);
        prop_assert_eq!(result.weights_push.len(), expected);
        prop_assert!(result.weights_push.iter().all(|w| w.is_finite() && *w >= 0.0));
    }
}
