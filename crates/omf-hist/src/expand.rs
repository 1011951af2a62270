//! Conversion between binned counts and pseudo-unbinned event arrays.
//!
//! Every bin becomes `trunc(count)` synthetic events sitting at the bin
//! center. In density mode an event carries the bin width as its weight,
//! otherwise weight 1.

use omf_core::errors::{ErrorInfo, OmfError};
use serde::{Deserialize, Serialize};

use crate::axis::Axis;
use crate::histogram::{Histogram1D, Histogram2D};

/// Synthetic events expanded from a 1D histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpandedSample {
    /// Bin center of each synthetic event.
    pub entries: Vec<f64>,
    /// Weight of each synthetic event.
    pub weights: Vec<f64>,
}

/// Paired synthetic events expanded from a response histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpandedResponse {
    /// Reco-axis center of each synthetic event.
    pub reco: Vec<f64>,
    /// Gen-axis center of each synthetic event.
    pub gen: Vec<f64>,
    /// Reco-level weights.
    pub reco_weights: Vec<f64>,
    /// Gen-level weights.
    pub gen_weights: Vec<f64>,
}

impl ExpandedResponse {
    /// Number of synthetic events.
    pub fn len(&self) -> usize {
        self.gen.len()
    }

    /// Returns true when every bin was empty.
    pub fn is_empty(&self) -> bool {
        self.gen.is_empty()
    }
}

/// Number of synthetic events for a bin count.
pub fn bin_multiplicity(count: f64) -> Result<usize, OmfError> {
    if !count.is_finite() || count < 0.0 {
        return Err(OmfError::Histogram(
            ErrorInfo::new("invalid-count", "bin contents must be finite and non-negative")
                .with_context("count", count.to_string()),
        ));
    }
    Ok(count.trunc() as usize)
}

/// Expands a measured histogram into events at its bin centers.
pub fn expand_measured(
    histogram: &Histogram1D,
    use_density: bool,
) -> Result<ExpandedSample, OmfError> {
    histogram.validate()?;
    let axis = &histogram.axis;
    let mut sample = ExpandedSample {
        entries: Vec::new(),
        weights: Vec::new(),
    };
    for (bin, count) in histogram.contents.iter().enumerate() {
        let copies = bin_multiplicity(*count)?;
        let weight = if use_density { axis.width(bin) } else { 1.0 };
        sample
            .entries
            .extend(std::iter::repeat(axis.center(bin)).take(copies));
        sample.weights.extend(std::iter::repeat(weight).take(copies));
    }
    Ok(sample)
}

/// Expands a response histogram reco-major into paired reco/gen events.
pub fn expand_response(
    histogram: &Histogram2D,
    use_density: bool,
) -> Result<ExpandedResponse, OmfError> {
    histogram.validate()?;
    let (x_axis, y_axis) = (&histogram.x_axis, &histogram.y_axis);
    let mut response = ExpandedResponse {
        reco: Vec::new(),
        gen: Vec::new(),
        reco_weights: Vec::new(),
        gen_weights: Vec::new(),
    };
    for ix in 0..x_axis.n_bins() {
        for iy in 0..y_axis.n_bins() {
            let copies = bin_multiplicity(histogram.get(ix, iy)).map_err(|err| match err {
                OmfError::Histogram(info) => OmfError::Histogram(
                    info.with_context("bin", format!("({ix}, {iy})")),
                ),
                other => other,
            })?;
            let (reco_weight, gen_weight) = if use_density {
                (x_axis.width(ix), y_axis.width(iy))
            } else {
                (1.0, 1.0)
            };
            let take = |value: f64| std::iter::repeat(value).take(copies);
            response.reco.extend(take(x_axis.center(ix)));
            response.gen.extend(take(y_axis.center(iy)));
            response.reco_weights.extend(take(reco_weight));
            response.gen_weights.extend(take(gen_weight));
        }
    }
    Ok(response)
}

/// Fills `weights` at `entries` into a fresh histogram over `axis`.
pub fn aggregate(axis: &Axis, entries: &[f64], weights: &[f64]) -> Result<Histogram1D, OmfError> {
    if entries.len() != weights.len() {
        return Err(OmfError::Histogram(
            ErrorInfo::new("weight-length", "one weight is required per entry")
                .with_context("entries", entries.len().to_string())
                .with_context("weights", weights.len().to_string()),
        ));
    }
    let mut histogram = Histogram1D::new(axis.clone());
    for (entry, weight) in entries.iter().zip(weights) {
        histogram.fill(*entry, *weight);
    }
    Ok(histogram)
}
