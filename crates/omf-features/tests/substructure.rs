use omf_core::OmfError;
use omf_features::{
    get_substructure_obs, ln_rho, tau21, JetLevel, SubstructureDataset, FEATURE_NAMES,
};
use proptest::prelude::*;

fn level(scale: f64) -> JetLevel {
    JetLevel {
        jets: vec![[200.0 * scale, 0.1, 1.0, 20.0 * scale], [150.0, -0.4, 2.0, 12.0]],
        widths: vec![0.2, 0.0],
        mults: vec![25.0, 14.0],
        sdms: vec![10.0, 0.0],
        zgs: vec![0.3, 0.1],
        tau2s: vec![0.05, 0.02],
    }
}

#[test]
fn columns_follow_the_documented_order() {
    let dataset = SubstructureDataset {
        gen: level(1.0),
        sim: level(1.1),
    };
    let (sim, gen) = get_substructure_obs(&dataset).unwrap();
    assert_eq!(gen.n_cols(), FEATURE_NAMES.len());
    assert_eq!(gen.n_rows(), 2);

    let row = gen.row(0);
    assert_eq!(row[0], 20.0);
    assert_eq!(row[1], 0.2);
    assert_eq!(row[2], 25.0);
    assert!((row[3] - 2.0 * (10.0f64 / 200.0).ln()).abs() < 1e-12);
    assert_eq!(row[4], 0.3);
    assert!((row[5] - 0.25).abs() < 1e-12);

    assert!((sim.row(0)[0] - 22.0).abs() < 1e-12);
}

#[test]
fn degenerate_inputs_are_guarded() {
    let dataset = SubstructureDataset {
        gen: level(1.0),
        sim: level(1.0),
    };
    let (_, gen) = get_substructure_obs(&dataset).unwrap();
    // Zero soft-drop mass maps ln rho to 0; zero width stays finite.
    assert_eq!(gen.row(1)[3], 0.0);
    assert!(gen.row(1)[5].is_finite());
    assert_eq!(ln_rho(-1.0, 100.0), 0.0);
    assert_eq!(ln_rho(5.0, 0.0), 2.0 * (5.0f64 / 1e-100).ln());
    assert_eq!(ln_rho(f64::NAN, 100.0), 0.0);
}

#[test]
fn misaligned_observables_are_config_errors() {
    let mut sim = level(1.0);
    sim.zgs.pop();
    let err = get_substructure_obs(&SubstructureDataset {
        gen: level(1.0),
        sim,
    })
    .unwrap_err();
    assert!(matches!(err, OmfError::Config(ref info)
        if info.context.get("observable").map(String::as_str) == Some("zgs")
            && info.context.get("level").map(String::as_str) == Some("sim")));
}

#[test]
fn dataset_parses_from_json() {
    let json = r#"{
        "gen": {"jets": [[100.0, 0.0, 0.0, 10.0]], "widths": [0.1], "mults": [10],
                "sdms": [5.0], "zgs": [0.2], "tau2s": [0.01]},
        "sim": {"jets": [[90.0, 0.0, 0.0, 9.0]], "widths": [0.1], "mults": [11],
                "sdms": [4.0], "zgs": [0.25], "tau2s": [0.02]}
    }"#;
    let dataset: SubstructureDataset = serde_json::from_str(json).unwrap();
    let (sim, _) = get_substructure_obs(&dataset).unwrap();
    assert_eq!(sim.row(0)[2], 11.0);
}

proptest! {
    #[test]
    fn ln_rho_is_always_finite(sdm in -10.0f64..500.0, pt in 0.0f64..1000.0) {
        prop_assert!(ln_rho(sdm, pt).is_finite());
    }

    #[test]
    fn tau21_matches_plain_ratio_for_positive_widths(tau2 in 0.0f64..1.0, width in 0.01f64..1.0) {
        prop_assert!((tau21(tau2, width) - tau2 / width).abs() < 1e-12);
    }
}
