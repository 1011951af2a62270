#![deny(missing_docs)]
#![doc = "Jet substructure observables used as OmniFold inputs: jet mass, width, constituent multiplicity, groomed mass ln rho, groomed momentum fraction and the N-subjettiness ratio tau21."]

use omf_core::errors::{ErrorInfo, OmfError};
use omf_core::FeatureMatrix;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Column names of the matrices returned by [`get_substructure_obs`], in order.
pub const FEATURE_NAMES: [&str; 6] = [
    "jet_mass",
    "width",
    "multiplicity",
    "ln_rho",
    "z_g",
    "tau21",
];

/// Per-jet inputs of one level (generator or simulated reco).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JetLevel {
    /// Jet four-vectors as `[pt, eta, phi, mass]`.
    pub jets: Vec<[f64; 4]>,
    /// Jet widths.
    pub widths: Vec<f64>,
    /// Constituent multiplicities.
    pub mults: Vec<f64>,
    /// Soft-drop groomed masses.
    pub sdms: Vec<f64>,
    /// Groomed momentum fractions.
    pub zgs: Vec<f64>,
    /// 2-subjettiness values.
    pub tau2s: Vec<f64>,
}

/// Generator-level and simulated jets, paired by index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstructureDataset {
    /// Generator-level jets.
    pub gen: JetLevel,
    /// Simulated reco-level jets.
    pub sim: JetLevel,
}

/// `2 ln(sdm / pt)`, with 0 when the ratio is non-positive or not finite.
pub fn ln_rho(soft_drop_mass: f64, pt: f64) -> f64 {
    let ratio = soft_drop_mass / (pt + 1e-100);
    if ratio.is_finite() && ratio > 0.0 {
        2.0 * ratio.ln()
    } else {
        0.0
    }
}

/// `tau2 / width`, regularised against zero widths.
pub fn tau21(tau2: f64, width: f64) -> f64 {
    tau2 / (1e-50 + width)
}

impl JetLevel {
    /// Number of jets.
    pub fn len(&self) -> usize {
        self.jets.len()
    }

    /// Returns true when there are no jets.
    pub fn is_empty(&self) -> bool {
        self.jets.is_empty()
    }

    fn check_lengths(&self, level: &str) -> Result<(), OmfError> {
        let expected = self.jets.len();
        for (name, len) in [
            ("widths", self.widths.len()),
            ("mults", self.mults.len()),
            ("sdms", self.sdms.len()),
            ("zgs", self.zgs.len()),
            ("tau2s", self.tau2s.len()),
        ] {
            if len != expected {
                return Err(OmfError::Config(
                    ErrorInfo::new("length-mismatch", "jet observables must align with the jets")
                        .with_context("level", level)
                        .with_context("observable", name)
                        .with_context("expected", expected.to_string())
                        .with_context("found", len.to_string()),
                ));
            }
        }
        Ok(())
    }

    /// Six-column feature matrix in [`FEATURE_NAMES`] order.
    pub fn features(&self) -> Result<FeatureMatrix, OmfError> {
        self.check_lengths("jets")?;
        let mut data = Vec::with_capacity(self.len() * FEATURE_NAMES.len());
        for (idx, jet) in self.jets.iter().enumerate() {
            let width = self.widths[idx];
            data.extend_from_slice(&[
                jet[3],
                width,
                self.mults[idx],
                ln_rho(self.sdms[idx], jet[0]),
                self.zgs[idx],
                tau21(self.tau2s[idx], width),
            ]);
        }
        FeatureMatrix::new(FEATURE_NAMES.len(), data)
    }
}

/// Builds the `(sim, gen)` substructure feature matrices.
pub fn get_substructure_obs(
    dataset: &SubstructureDataset,
) -> Result<(FeatureMatrix, FeatureMatrix), OmfError> {
    dataset.sim.check_lengths("sim")?;
    dataset.gen.check_lengths("gen")?;
    let sim = dataset.sim.features()?;
    let gen = dataset.gen.features()?;
    debug!(sim = sim.n_rows(), gen = gen.n_rows(), "substructure features");
    Ok((sim, gen))
}
