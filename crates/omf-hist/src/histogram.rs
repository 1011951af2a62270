use omf_core::errors::{ErrorInfo, OmfError};
use serde::{Deserialize, Serialize};

use crate::axis::Axis;

fn content_length_error(expected: usize, found: usize) -> OmfError {
    OmfError::Histogram(
        ErrorInfo::new("content-length", "bin contents do not match the axis binning")
            .with_context("expected", expected.to_string())
            .with_context("found", found.to_string()),
    )
}

/// One-dimensional weighted histogram with flow bins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram1D {
    /// Binning.
    pub axis: Axis,
    /// Bin contents, excluding under/overflow.
    pub contents: Vec<f64>,
    /// Weight filled below the first edge.
    #[serde(default)]
    pub underflow: f64,
    /// Weight filled at or above the last edge, or at a NaN position.
    #[serde(default)]
    pub overflow: f64,
}

impl Histogram1D {
    /// Empty histogram over `axis`.
    pub fn new(axis: Axis) -> Self {
        let n_bins = axis.n_bins();
        Self {
            axis,
            contents: vec![0.0; n_bins],
            underflow: 0.0,
            overflow: 0.0,
        }
    }

    /// Histogram with given contents and empty flow bins.
    pub fn from_contents(axis: Axis, contents: Vec<f64>) -> Result<Self, OmfError> {
        let histogram = Self {
            axis,
            contents,
            underflow: 0.0,
            overflow: 0.0,
        };
        histogram.validate()?;
        Ok(histogram)
    }

    /// Checks axis and content invariants; used after deserialization.
    pub fn validate(&self) -> Result<(), OmfError> {
        self.axis.validate()?;
        if self.contents.len() != self.axis.n_bins() {
            return Err(content_length_error(self.axis.n_bins(), self.contents.len()));
        }
        Ok(())
    }

    /// Adds `weight` to the bin holding `value`.
    pub fn fill(&mut self, value: f64, weight: f64) {
        match self.axis.find_bin(value) {
            Some(bin) => self.contents[bin] += weight,
            None if value < self.axis.low() => self.underflow += weight,
            None => self.overflow += weight,
        }
    }

    /// Sum of the regular bin contents.
    pub fn integral(&self) -> f64 {
        self.contents.iter().sum()
    }
}

/// Two-dimensional response histogram: reco on x, gen on y.
///
/// Contents are row-major and indexed `[reco][gen]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram2D {
    /// Reco-level binning.
    pub x_axis: Axis,
    /// Gen-level binning.
    pub y_axis: Axis,
    /// Row-major bin contents, `x_axis.n_bins() * y_axis.n_bins()` values.
    pub contents: Vec<f64>,
}

impl Histogram2D {
    /// Empty histogram over the two axes.
    pub fn new(x_axis: Axis, y_axis: Axis) -> Self {
        let size = x_axis.n_bins() * y_axis.n_bins();
        Self {
            x_axis,
            y_axis,
            contents: vec![0.0; size],
        }
    }

    /// Histogram from nested `[reco][gen]` rows.
    pub fn from_rows(x_axis: Axis, y_axis: Axis, rows: &[Vec<f64>]) -> Result<Self, OmfError> {
        if rows.len() != x_axis.n_bins() {
            return Err(content_length_error(x_axis.n_bins(), rows.len()));
        }
        let mut contents = Vec::with_capacity(x_axis.n_bins() * y_axis.n_bins());
        for row in rows {
            if row.len() != y_axis.n_bins() {
                return Err(content_length_error(y_axis.n_bins(), row.len()));
            }
            contents.extend_from_slice(row);
        }
        let histogram = Self {
            x_axis,
            y_axis,
            contents,
        };
        histogram.validate()?;
        Ok(histogram)
    }

    /// Checks axis and content invariants; used after deserialization.
    pub fn validate(&self) -> Result<(), OmfError> {
        self.x_axis.validate()?;
        self.y_axis.validate()?;
        let expected = self.x_axis.n_bins() * self.y_axis.n_bins();
        if self.contents.len() != expected {
            return Err(content_length_error(expected, self.contents.len()));
        }
        Ok(())
    }

    /// Content of bin `(reco, gen)`.
    pub fn get(&self, x_bin: usize, y_bin: usize) -> f64 {
        self.contents[x_bin * self.y_axis.n_bins() + y_bin]
    }

    /// Adds `weight` at `(x, y)`. Entries outside either axis are dropped.
    pub fn fill(&mut self, x: f64, y: f64, weight: f64) {
        if let (Some(ix), Some(iy)) = (self.x_axis.find_bin(x), self.y_axis.find_bin(y)) {
            let n_y = self.y_axis.n_bins();
            self.contents[ix * n_y + iy] += weight;
        }
    }

    /// Sum of all bin contents.
    pub fn integral(&self) -> f64 {
        self.contents.iter().sum()
    }

    /// Reco-level projection (sum over gen bins).
    pub fn projection_x(&self) -> Histogram1D {
        let mut projection = Histogram1D::new(self.x_axis.clone());
        for (ix, row) in self.contents.chunks(self.y_axis.n_bins()).enumerate() {
            projection.contents[ix] = row.iter().sum();
        }
        projection
    }

    /// Gen-level projection (sum over reco bins).
    pub fn projection_y(&self) -> Histogram1D {
        let mut projection = Histogram1D::new(self.y_axis.clone());
        for row in self.contents.chunks(self.y_axis.n_bins()) {
            for (iy, value) in row.iter().enumerate() {
                projection.contents[iy] += value;
            }
        }
        projection
    }
}
