use omf_core::errors::{ErrorInfo, OmfError};
use serde::{Deserialize, Serialize};

/// Binning along one dimension, described by its sorted edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    edges: Vec<f64>,
}

impl Axis {
    /// Creates an axis from `n_bins + 1` finite, strictly increasing edges.
    pub fn new(edges: Vec<f64>) -> Result<Self, OmfError> {
        let axis = Self { edges };
        axis.validate()?;
        Ok(axis)
    }

    /// Equal-width binning of `[low, high)`.
    pub fn uniform(n_bins: usize, low: f64, high: f64) -> Result<Self, OmfError> {
        if n_bins == 0 {
            return Err(OmfError::Histogram(ErrorInfo::new(
                "axis-edges",
                "an axis needs at least one bin",
            )));
        }
        let width = (high - low) / n_bins as f64;
        Self::new((0..=n_bins).map(|i| low + width * i as f64).collect())
    }

    /// Checks the edge invariants; used after deserialization.
    pub fn validate(&self) -> Result<(), OmfError> {
        if self.edges.len() < 2 {
            return Err(OmfError::Histogram(
                ErrorInfo::new("axis-edges", "an axis needs at least two edges")
                    .with_context("edges", self.edges.len().to_string()),
            ));
        }
        if let Some(idx) = self.edges.iter().position(|edge| !edge.is_finite()) {
            return Err(OmfError::Histogram(
                ErrorInfo::new("axis-edges", "axis edges must be finite")
                    .with_context("index", idx.to_string()),
            ));
        }
        if let Some(idx) = self.edges.windows(2).position(|pair| pair[1] <= pair[0]) {
            return Err(OmfError::Histogram(
                ErrorInfo::new("axis-edges", "axis edges must be strictly increasing")
                    .with_context("index", (idx + 1).to_string()),
            ));
        }
        Ok(())
    }

    /// Number of regular bins.
    pub fn n_bins(&self) -> usize {
        self.edges.len() - 1
    }

    /// Bin edges, length `n_bins + 1`.
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Lower edge of the first bin.
    pub fn low(&self) -> f64 {
        self.edges[0]
    }

    /// Upper edge of the last bin.
    pub fn high(&self) -> f64 {
        self.edges[self.edges.len() - 1]
    }

    /// Midpoint of bin `bin`.
    pub fn center(&self, bin: usize) -> f64 {
        0.5 * (self.edges[bin] + self.edges[bin + 1])
    }

    /// Width of bin `bin`.
    pub fn width(&self, bin: usize) -> f64 {
        self.edges[bin + 1] - self.edges[bin]
    }

    /// All bin centers.
    pub fn centers(&self) -> Vec<f64> {
        (0..self.n_bins()).map(|bin| self.center(bin)).collect()
    }

    /// All bin widths.
    pub fn widths(&self) -> Vec<f64> {
        (0..self.n_bins()).map(|bin| self.width(bin)).collect()
    }

    /// Bin holding `value`, or `None` for underflow, overflow and NaN.
    ///
    /// Bins are half-open `[low, high)`.
    pub fn find_bin(&self, value: f64) -> Option<usize> {
        if !(value >= self.low() && value < self.high()) {
            return None;
        }
        Some(self.edges.partition_point(|edge| *edge <= value) - 1)
    }
}
