use omf_boost::{BoostParams, GbdtClassifier, GbdtProvider, GbdtRegressor};
use omf_core::{Classifier, FeatureMatrix, HyperParams, ModelProvider, OmfError, Regressor};
use proptest::prelude::*;

fn separable_sample() -> (FeatureMatrix, Vec<f64>, Vec<f64>) {
    let values: Vec<f64> = (0..40).map(|i| i as f64 / 4.0).collect();
    let labels: Vec<f64> = values.iter().map(|v| if *v >= 5.0 { 1.0 } else { 0.0 }).collect();
    let weights = vec![1.0; values.len()];
    (FeatureMatrix::from_column(values), labels, weights)
}

#[test]
fn classifier_separates_threshold_data() {
    let (features, labels, weights) = separable_sample();
    let mut classifier = GbdtClassifier::new(BoostParams::default());
    classifier.fit(&features, &labels, &weights).unwrap();
    let proba = classifier
        .predict_proba(&FeatureMatrix::from_column(vec![1.0, 9.0]))
        .unwrap();
    assert!(proba[0][1] < 0.2);
    assert!(proba[1][1] > 0.8);
    for row in &proba {
        assert!((row[0] + row[1] - 1.0).abs() < 1e-12);
    }
}

#[test]
fn sample_weights_shift_the_prior() {
    let features = FeatureMatrix::from_column(vec![1.0; 4]);
    let labels = vec![0.0, 0.0, 1.0, 1.0];
    let weights = vec![1.0, 1.0, 3.0, 3.0];
    let mut classifier = GbdtClassifier::new(BoostParams::default());
    classifier.fit(&features, &labels, &weights).unwrap();
    let proba = classifier.predict_proba(&features).unwrap();
    // Constant feature: no split is possible, so the prediction is the weighted prior.
    assert!((proba[0][1] - 0.75).abs() < 1e-9);
}

#[test]
fn single_class_training_fails() {
    let features = FeatureMatrix::from_column(vec![1.0, 2.0]);
    let mut classifier = GbdtClassifier::new(BoostParams::default());
    let err = classifier
        .fit(&features, &[1.0, 1.0], &[1.0, 1.0])
        .unwrap_err();
    assert!(matches!(err, OmfError::Training(info) if info.code == "single-class"));
}

#[test]
fn unfitted_models_refuse_to_predict() {
    let features = FeatureMatrix::from_column(vec![1.0]);
    let classifier = GbdtClassifier::new(BoostParams::default());
    assert!(classifier.predict_proba(&features).is_err());
    let regressor = GbdtRegressor::new(BoostParams::default());
    assert!(regressor.predict(&features).is_err());
}

#[test]
fn dimension_mismatch_at_prediction_is_reported() {
    let (features, labels, weights) = separable_sample();
    let mut classifier = GbdtClassifier::new(BoostParams::default());
    classifier.fit(&features, &labels, &weights).unwrap();
    let wide = FeatureMatrix::from_rows(&[[1.0, 2.0]]).unwrap();
    let err = classifier.predict_proba(&wide).unwrap_err();
    assert!(matches!(err, OmfError::Training(info) if info.code == "feature-dimension"));
}

#[test]
fn regressor_tracks_piecewise_targets() {
    let values: Vec<f64> = (0..30).map(f64::from).collect();
    let targets: Vec<f64> = values.iter().map(|v| if *v < 15.0 { 0.5 } else { 2.0 }).collect();
    let features = FeatureMatrix::from_column(values);
    let mut regressor = GbdtRegressor::new(BoostParams {
        reg_lambda: 0.0,
        ..BoostParams::default()
    });
    regressor.fit(&features, &targets).unwrap();
    let predictions = regressor
        .predict(&FeatureMatrix::from_column(vec![3.0, 25.0]))
        .unwrap();
    assert!((predictions[0] - 0.5).abs() < 0.05);
    assert!((predictions[1] - 2.0).abs() < 0.05);
}

#[test]
fn provider_forwards_options_and_seed() {
    let mut options = HyperParams::new();
    options.insert("n_estimators".into(), "5".into());
    let classifier = GbdtProvider.classifier(&options, 77).unwrap();
    assert_eq!(classifier.params().n_estimators, 5);
    assert_eq!(classifier.params().seed, 77);

    options.insert("bogus".into(), "1".into());
    assert!(GbdtProvider.regressor(&options, 0).is_err());
}

#[test]
fn fitted_classifier_survives_bincode() {
    let (features, labels, weights) = separable_sample();
    let mut classifier = GbdtClassifier::new(BoostParams {
        n_estimators: 10,
        ..BoostParams::default()
    });
    classifier.fit(&features, &labels, &weights).unwrap();
    let bytes = bincode::serialize(&classifier).unwrap();
    let restored: GbdtClassifier = bincode::deserialize(&bytes).unwrap();
    assert_eq!(
        restored.predict_proba(&features).unwrap(),
        classifier.predict_proba(&features).unwrap()
    );
}

#[test]
fn subsampled_training_is_reproducible() {
    let (features, labels, weights) = separable_sample();
    let params = BoostParams {
        subsample: 0.5,
        seed: 11,
        n_estimators: 20,
        ..BoostParams::default()
    };
    let mut a = GbdtClassifier::new(params.clone());
    let mut b = GbdtClassifier::new(params);
    a.fit(&features, &labels, &weights).unwrap();
    b.fit(&features, &labels, &weights).unwrap();
    assert_eq!(a, b);
}

proptest! {
    #[test]
    fn probabilities_stay_in_unit_interval(
        values in proptest::collection::vec(-5.0f64..5.0, 4..30),
        flip in any::<u32>(),
    ) {
        let labels: Vec<f64> = (0..values.len()).map(|i| ((flip >> (i % 32)) & 1) as f64).collect();
        prop_assume!(labels.iter().any(|l| *l == 0.0) && labels.iter().any(|l| *l == 1.0));
        let weights = vec![1.0; values.len()];
        let features = FeatureMatrix::from_column(values);
        let mut classifier = GbdtClassifier::new(BoostParams { n_estimators: 10, ..BoostParams::default() });
        classifier.fit(&features, &labels, &weights).unwrap();
        for row in classifier.predict_proba(&features).unwrap() {
            prop_assert!(row[1] >= 0.0 && row[1] <= 1.0);
            prop_assert!(row[1].is_finite());
        }
    }
}
