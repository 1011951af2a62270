use criterion::{criterion_group, criterion_main, Criterion};
use omf_boost::GbdtProvider;
use omf_core::{FeatureMatrix, NoopObserver};
use omf_unfold::{omnifold, UnfoldConfig, UnfoldInputs};

fn sample_inputs(n: usize) -> UnfoldInputs {
    let gen: Vec<f64> = (0..n).map(|i| (i as f64 * 0.618_034).fract() * 4.0).collect();
    let reco: Vec<f64> = gen
        .iter()
        .enumerate()
        .map(|(i, g)| g + 0.3 * (i as f64).sin())
        .collect();
    let measured: Vec<f64> = (0..n)
        .map(|i| (i as f64 * 0.414_214).fract() * 4.0 + 0.5)
        .collect();
    let pass_reco = (0..n).map(|i| i % 10 != 0).collect();
    UnfoldInputs::new(
        FeatureMatrix::from_column(gen),
        FeatureMatrix::from_column(reco),
        FeatureMatrix::from_column(measured),
    )
    .with_masks(pass_reco, vec![true; n], vec![true; n])
}

fn bench_iterations(c: &mut Criterion) {
    let inputs = sample_inputs(2_000);
    let mut config = UnfoldConfig::with_iterations(2);
    for params in [
        &mut config.classifier1_params,
        &mut config.classifier2_params,
        &mut config.regressor_params,
    ] {
        params.insert("n_estimators".into(), "25".into());
    }

    c.bench_function("omnifold_two_iterations", |b| {
        b.iter(|| {
            let _ = omnifold(&inputs, &config, &GbdtProvider, NoopObserver).unwrap();
        })
    });
}

criterion_group!(benches, bench_iterations);
criterion_main!(benches);
