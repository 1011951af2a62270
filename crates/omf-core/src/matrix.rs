//! Dense row-major feature matrices used for every event sample.

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, OmfError};

/// Row-major matrix of `f64` features, one row per event.
///
/// The column count is fixed at construction and is at least one, so a
/// matrix filtered down to zero rows still remembers its dimensionality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFeatureMatrix")]
pub struct FeatureMatrix {
    n_cols: usize,
    data: Vec<f64>,
}

/// Unchecked wire form; decoding goes through [`FeatureMatrix::new`].
#[derive(Deserialize)]
struct RawFeatureMatrix {
    n_cols: usize,
    data: Vec<f64>,
}

impl TryFrom<RawFeatureMatrix> for FeatureMatrix {
    type Error = OmfError;

    fn try_from(raw: RawFeatureMatrix) -> Result<Self, Self::Error> {
        FeatureMatrix::new(raw.n_cols, raw.data)
    }
}

impl FeatureMatrix {
    /// Creates a matrix from a flat row-major buffer.
    pub fn new(n_cols: usize, data: Vec<f64>) -> Result<Self, OmfError> {
        if n_cols == 0 {
            return Err(OmfError::Config(ErrorInfo::new(
                "zero-columns",
                "feature matrices require at least one column",
            )));
        }
        if data.len() % n_cols != 0 {
            return Err(OmfError::Config(
                ErrorInfo::new(
                    "ragged-buffer",
                    "buffer length is not a multiple of the column count",
                )
                .with_context("len", data.len().to_string())
                .with_context("n_cols", n_cols.to_string()),
            ));
        }
        Ok(Self { n_cols, data })
    }

    /// Creates an empty matrix with the given dimensionality.
    pub fn empty(n_cols: usize) -> Result<Self, OmfError> {
        Self::new(n_cols, Vec::new())
    }

    /// Promotes a one-dimensional sample to an `N x 1` matrix.
    pub fn from_column(values: Vec<f64>) -> Self {
        Self {
            n_cols: 1,
            data: values,
        }
    }

    /// Builds a matrix from individual rows, which must all share one length.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, OmfError> {
        let n_cols = match rows.first() {
            Some(row) => row.as_ref().len(),
            None => {
                return Err(OmfError::Config(ErrorInfo::new(
                    "empty-rows",
                    "cannot infer dimensionality from zero rows",
                )))
            }
        };
        let mut data = Vec::with_capacity(rows.len() * n_cols);
        for (idx, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != n_cols {
                return Err(OmfError::Config(
                    ErrorInfo::new("ragged-rows", "rows have differing lengths")
                        .with_context("row", idx.to_string())
                        .with_context("expected", n_cols.to_string())
                        .with_context("found", row.len().to_string()),
                ));
            }
            data.extend_from_slice(row);
        }
        Self::new(n_cols, data)
    }

    /// Builds a matrix by stacking equally long columns side by side.
    pub fn from_columns(columns: &[&[f64]]) -> Result<Self, OmfError> {
        let n_rows = match columns.first() {
            Some(column) => column.len(),
            None => return Self::empty(0),
        };
        if let Some((idx, column)) = columns
            .iter()
            .enumerate()
            .find(|(_, column)| column.len() != n_rows)
        {
            return Err(OmfError::Config(
                ErrorInfo::new("ragged-columns", "columns have differing lengths")
                    .with_context("column", idx.to_string())
                    .with_context("expected", n_rows.to_string())
                    .with_context("found", column.len().to_string()),
            ));
        }
        let mut data = Vec::with_capacity(n_rows * columns.len());
        for row in 0..n_rows {
            data.extend(columns.iter().map(|column| column[row]));
        }
        Self::new(columns.len(), data)
    }

    /// Number of rows (events).
    pub fn n_rows(&self) -> usize {
        self.data.len() / self.n_cols
    }

    /// Number of feature columns.
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Returns true when the matrix holds no rows.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the feature vector of a single event.
    pub fn row(&self, index: usize) -> &[f64] {
        let start = index * self.n_cols;
        &self.data[start..start + self.n_cols]
    }

    /// Mutable access to a single event.
    pub fn row_mut(&mut self, index: usize) -> &mut [f64] {
        let start = index * self.n_cols;
        &mut self.data[start..start + self.n_cols]
    }

    /// Iterates over the rows in order.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[f64]> + '_ {
        self.data.chunks_exact(self.n_cols)
    }

    /// Copies one column out of the matrix.
    pub fn column(&self, column: usize) -> Vec<f64> {
        self.rows().map(|row| row[column]).collect()
    }

    /// Flat row-major view of the data.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Keeps the rows whose mask entry is true.
    pub fn select(&self, mask: &[bool]) -> Result<Self, OmfError> {
        if mask.len() != self.n_rows() {
            return Err(OmfError::Config(
                ErrorInfo::new("mask-length", "mask length does not match row count")
                    .with_context("rows", self.n_rows().to_string())
                    .with_context("mask", mask.len().to_string()),
            ));
        }
        let mut data = Vec::with_capacity(self.data.len());
        for (row, keep) in self.rows().zip(mask) {
            if *keep {
                data.extend_from_slice(row);
            }
        }
        Ok(Self {
            n_cols: self.n_cols,
            data,
        })
    }

    /// Appends the rows of `other` below the rows of `self`.
    pub fn concat(&self, other: &FeatureMatrix) -> Result<Self, OmfError> {
        if self.n_cols != other.n_cols {
            return Err(OmfError::Config(
                ErrorInfo::new("dimension-mismatch", "cannot stack matrices of different width")
                    .with_context("left", self.n_cols.to_string())
                    .with_context("right", other.n_cols.to_string()),
            ));
        }
        let mut data = Vec::with_capacity(self.data.len() + other.data.len());
        data.extend_from_slice(&self.data);
        data.extend_from_slice(&other.data);
        Ok(Self {
            n_cols: self.n_cols,
            data,
        })
    }
}

/// Keeps the entries of `values` whose mask entry is true.
///
/// Callers validate lengths up front; a shorter mask simply truncates.
pub fn select_masked<T: Clone>(values: &[T], mask: &[bool]) -> Vec<T> {
    values
        .iter()
        .zip(mask)
        .filter(|(_, keep)| **keep)
        .map(|(value, _)| value.clone())
        .collect()
}
