//! Unfolding inputs, validation and truth-level preprocessing.

use omf_core::errors::{ErrorInfo, OmfError};
use omf_core::{select_masked, FeatureMatrix};

/// Everything the iteration loop consumes.
///
/// Masks default to all-true and weights to `None` (uniform weight 1).
/// Weight vectors cover the full, unfiltered samples.
#[derive(Debug, Clone, PartialEq)]
pub struct UnfoldInputs {
    /// Simulated generator-level entries.
    pub mc_gen: FeatureMatrix,
    /// Simulated reconstructed-level entries, paired by index with `mc_gen`.
    pub mc_reco: FeatureMatrix,
    /// Measured reconstructed-level entries.
    pub measured: FeatureMatrix,
    /// Simulated events passing reconstruction cuts.
    pub mc_pass_reco: Vec<bool>,
    /// Simulated events passing generator-level cuts.
    pub mc_pass_truth: Vec<bool>,
    /// Measured events passing reconstruction cuts.
    pub measured_pass_reco: Vec<bool>,
    /// Per-event generator-level weights.
    pub mc_gen_weights: Option<Vec<f64>>,
    /// Per-event reconstructed-level weights.
    pub mc_reco_weights: Option<Vec<f64>>,
    /// Per-event measured weights.
    pub measured_weights: Option<Vec<f64>>,
}

impl UnfoldInputs {
    /// Creates inputs with every mask true and uniform weights.
    pub fn new(mc_gen: FeatureMatrix, mc_reco: FeatureMatrix, measured: FeatureMatrix) -> Self {
        let n_mc = mc_gen.n_rows();
        let n_measured = measured.n_rows();
        Self {
            mc_gen,
            mc_reco,
            measured,
            mc_pass_reco: vec![true; n_mc],
            mc_pass_truth: vec![true; n_mc],
            measured_pass_reco: vec![true; n_measured],
            mc_gen_weights: None,
            mc_reco_weights: None,
            measured_weights: None,
        }
    }

    /// Replaces the three pass masks.
    pub fn with_masks(
        mut self,
        mc_pass_reco: Vec<bool>,
        mc_pass_truth: Vec<bool>,
        measured_pass_reco: Vec<bool>,
    ) -> Self {
        self.mc_pass_reco = mc_pass_reco;
        self.mc_pass_truth = mc_pass_truth;
        self.measured_pass_reco = measured_pass_reco;
        self
    }

    /// Replaces the per-sample weights.
    pub fn with_weights(
        mut self,
        mc_gen_weights: Option<Vec<f64>>,
        mc_reco_weights: Option<Vec<f64>>,
        measured_weights: Option<Vec<f64>>,
    ) -> Self {
        self.mc_gen_weights = mc_gen_weights;
        self.mc_reco_weights = mc_reco_weights;
        self.measured_weights = measured_weights;
        self
    }

    /// Checks every length and weight invariant.
    pub fn validate(&self) -> Result<(), OmfError> {
        let n_mc = self.mc_gen.n_rows();
        let n_measured = self.measured.n_rows();
        expect_len("mc_reco", self.mc_reco.n_rows(), n_mc)?;
        expect_len("mc_pass_reco", self.mc_pass_reco.len(), n_mc)?;
        expect_len("mc_pass_truth", self.mc_pass_truth.len(), n_mc)?;
        expect_len("measured_pass_reco", self.measured_pass_reco.len(), n_measured)?;
        if self.mc_reco.n_cols() != self.measured.n_cols() {
            return Err(OmfError::Config(
                ErrorInfo::new(
                    "reco-dimension",
                    "simulated and measured reco entries have different dimensionality",
                )
                .with_context("mc_reco", self.mc_reco.n_cols().to_string())
                .with_context("measured", self.measured.n_cols().to_string()),
            ));
        }
        for (name, weights, expected) in [
            ("mc_gen_weights", &self.mc_gen_weights, n_mc),
            ("mc_reco_weights", &self.mc_reco_weights, n_mc),
            ("measured_weights", &self.measured_weights, n_measured),
        ] {
            if let Some(weights) = weights {
                expect_len(name, weights.len(), expected)?;
                check_weights(name, weights)?;
            }
        }
        Ok(())
    }

    /// Validates and applies the truth mask, producing the loop's working sample.
    pub fn prepare(&self) -> Result<PreparedSample, OmfError> {
        self.validate()?;
        let truth = &self.mc_pass_truth;
        let gen = self.mc_gen.select(truth)?;
        let reco = self.mc_reco.select(truth)?;
        let pass_reco = select_masked(&self.mc_pass_reco, truth);
        let n = gen.n_rows();
        let gen_weights = match &self.mc_gen_weights {
            Some(weights) => select_masked(weights, truth),
            None => vec![1.0; n],
        };
        let reco_weights = match &self.mc_reco_weights {
            Some(weights) => select_masked(weights, truth),
            None => vec![1.0; n],
        };
        let measured = self.measured.select(&self.measured_pass_reco)?;
        let measured_weights = match &self.measured_weights {
            Some(weights) => select_masked(weights, &self.measured_pass_reco),
            None => vec![1.0; measured.n_rows()],
        };
        let fail_reco: Vec<bool> = pass_reco.iter().map(|pass| !pass).collect();
        Ok(PreparedSample {
            reco_passing: reco.select(&pass_reco)?,
            gen_passing: gen.select(&pass_reco)?,
            gen_failing: gen.select(&fail_reco)?,
            gen,
            pass_reco,
            gen_weights,
            reco_weights,
            measured,
            measured_weights,
        })
    }
}

fn expect_len(name: &str, found: usize, expected: usize) -> Result<(), OmfError> {
    if found == expected {
        return Ok(());
    }
    Err(OmfError::Config(
        ErrorInfo::new("length-mismatch", format!("{name} has the wrong length"))
            .with_context("input", name)
            .with_context("expected", expected.to_string())
            .with_context("found", found.to_string()),
    ))
}

fn check_weights(name: &str, weights: &[f64]) -> Result<(), OmfError> {
    match weights
        .iter()
        .position(|weight| !weight.is_finite() || *weight < 0.0)
    {
        None => Ok(()),
        Some(idx) => Err(OmfError::Config(
            ErrorInfo::new("invalid-weight", "event weights must be finite and non-negative")
                .with_context("input", name)
                .with_context("index", idx.to_string())
                .with_context("value", weights[idx].to_string()),
        )),
    }
}

/// Truth-filtered working sample shared by every iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSample {
    /// Truth-passing generator-level entries.
    pub gen: FeatureMatrix,
    /// Reco mask restricted to truth-passing events.
    pub pass_reco: Vec<bool>,
    /// Generator-level weights of truth-passing events.
    pub gen_weights: Vec<f64>,
    /// Reco-level weights of truth-passing events.
    pub reco_weights: Vec<f64>,
    /// Reco entries of events passing both truth and reco cuts.
    pub reco_passing: FeatureMatrix,
    /// Gen entries of events passing both truth and reco cuts.
    pub gen_passing: FeatureMatrix,
    /// Gen entries of truth-passing events that fail reco cuts.
    pub gen_failing: FeatureMatrix,
    /// Reco-passing measured entries.
    pub measured: FeatureMatrix,
    /// Weights of reco-passing measured entries.
    pub measured_weights: Vec<f64>,
}

impl PreparedSample {
    /// Number of events taking part in the iteration loop.
    pub fn len(&self) -> usize {
        self.gen.n_rows()
    }

    /// Returns true when no event passed the truth cuts.
    pub fn is_empty(&self) -> bool {
        self.gen.is_empty()
    }

    /// True when some retained event lacks a reconstruction and needs the regressor.
    pub fn needs_regressor(&self) -> bool {
        self.pass_reco.iter().any(|pass| !pass)
    }
}
