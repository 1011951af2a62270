use omf_core::{
    Classifier, FeatureMatrix, HyperParams, IterationObserver, ModelProvider, NoopObserver,
    OmfError, Regressor, Step,
};

#[derive(Default)]
struct ConstantClassifier {
    p1: f64,
}

impl Classifier for ConstantClassifier {
    fn fit(&mut self, _: &FeatureMatrix, labels: &[f64], weights: &[f64]) -> Result<(), OmfError> {
        let total: f64 = weights.iter().sum();
        let positive: f64 = labels.iter().zip(weights).map(|(l, w)| l * w).sum();
        self.p1 = positive / total;
        Ok(())
    }

    fn predict_proba(&self, features: &FeatureMatrix) -> Result<Vec<[f64; 2]>, OmfError> {
        Ok(vec![[1.0 - self.p1, self.p1]; features.n_rows()])
    }
}

#[derive(Default)]
struct MeanRegressor {
    mean: f64,
}

impl Regressor for MeanRegressor {
    fn fit(&mut self, _: &FeatureMatrix, targets: &[f64]) -> Result<(), OmfError> {
        self.mean = targets.iter().sum::<f64>() / targets.len() as f64;
        Ok(())
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>, OmfError> {
        Ok(vec![self.mean; features.n_rows()])
    }
}

struct DummyProvider;

impl ModelProvider for DummyProvider {
    type Classifier = ConstantClassifier;
    type Regressor = MeanRegressor;

    fn classifier(&self, _: &HyperParams, _: u64) -> Result<Self::Classifier, OmfError> {
        Ok(ConstantClassifier::default())
    }

    fn regressor(&self, _: &HyperParams, _: u64) -> Result<Self::Regressor, OmfError> {
        Ok(MeanRegressor::default())
    }
}

#[test]
fn dummy_provider_satisfies_contracts() {
    let provider = DummyProvider;
    let mut classifier = provider.classifier(&HyperParams::new(), 0).unwrap();
    let features = FeatureMatrix::from_column(vec![0.0, 1.0, 2.0, 3.0]);
    classifier
        .fit(&features, &[0.0, 0.0, 1.0, 1.0], &[1.0, 1.0, 1.0, 3.0])
        .unwrap();
    let proba = classifier.predict_proba(&features).unwrap();
    assert!((proba[0][1] - 4.0 / 6.0).abs() < 1e-12);

    let mut regressor = provider.regressor(&HyperParams::new(), 0).unwrap();
    regressor.fit(&features, &[1.0, 2.0, 3.0, 4.0]).unwrap();
    assert_eq!(regressor.predict(&features).unwrap()[3], 2.5);

    let mut observer = NoopObserver;
    let hook: &mut dyn IterationObserver<ConstantClassifier, MeanRegressor> = &mut observer;
    hook.step1_complete(1, &classifier, Some(&regressor)).unwrap();
    hook.step2_complete(1, &classifier).unwrap();
    assert_eq!(Step::Two.as_u8(), 2);
}
