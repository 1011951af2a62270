//! Feature quantisation into histogram bins.
//!
//! Every feature gets a sorted list of cut points. A value falls into bin
//! `b` where `b` is the number of cuts less than or equal to the value, so a
//! split "bins `0..=k` go left" is the same as "value < cuts[k] goes left".
//! Non-finite values land in bin 0.

use omf_core::FeatureMatrix;
use serde::{Deserialize, Serialize};

/// Per-feature cut points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinCuts {
    cuts: Vec<Vec<f64>>,
}

impl BinCuts {
    /// Derives cut points from the training matrix.
    ///
    /// Features with at most `max_bins` distinct values are cut at every
    /// midpoint; otherwise cuts sit at approximate quantiles.
    pub fn fit(features: &FeatureMatrix, max_bins: usize) -> Self {
        let cuts = (0..features.n_cols())
            .map(|column| feature_cuts(features.column(column), max_bins))
            .collect();
        Self { cuts }
    }

    /// Number of features covered.
    pub fn num_features(&self) -> usize {
        self.cuts.len()
    }

    /// Cut points of one feature.
    pub fn feature_cuts(&self, feature: usize) -> &[f64] {
        &self.cuts[feature]
    }

    /// Number of bins of one feature.
    pub fn num_bins(&self, feature: usize) -> usize {
        self.cuts[feature].len() + 1
    }

    /// Bin index of a raw value.
    pub fn bin_value(&self, feature: usize, value: f64) -> u16 {
        if !value.is_finite() {
            return 0;
        }
        self.cuts[feature].partition_point(|cut| *cut <= value) as u16
    }

    /// Quantises a full matrix into a column-major bin index.
    pub fn quantize(&self, features: &FeatureMatrix) -> QuantizedMatrix {
        let columns = (0..self.num_features())
            .map(|feature| {
                features
                    .rows()
                    .map(|row| self.bin_value(feature, row[feature]))
                    .collect()
            })
            .collect();
        QuantizedMatrix {
            columns,
            num_rows: features.n_rows(),
        }
    }
}

fn feature_cuts(mut values: Vec<f64>, max_bins: usize) -> Vec<f64> {
    values.retain(|value| value.is_finite());
    values.sort_by(f64::total_cmp);
    let mut unique = values.clone();
    unique.dedup();
    if unique.len() <= 1 {
        return Vec::new();
    }
    if unique.len() <= max_bins {
        return unique
            .windows(2)
            .map(|pair| 0.5 * (pair[0] + pair[1]))
            .collect();
    }
    let mut cuts: Vec<f64> = (1..max_bins)
        .filter_map(|k| {
            let idx = k * values.len() / max_bins;
            let (lo, hi) = (values[idx.saturating_sub(1)], values[idx]);
            (lo < hi).then(|| 0.5 * (lo + hi))
        })
        .collect();
    cuts.dedup();
    cuts
}

/// Column-major bin indices of a training matrix.
#[derive(Debug, Clone)]
pub struct QuantizedMatrix {
    columns: Vec<Vec<u16>>,
    num_rows: usize,
}

impl QuantizedMatrix {
    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Number of features.
    pub fn num_features(&self) -> usize {
        self.columns.len()
    }

    /// Bin indices of one feature for every row.
    pub fn feature_column(&self, feature: usize) -> &[u16] {
        &self.columns[feature]
    }

    /// Bin index of one cell.
    pub fn get(&self, row: usize, feature: usize) -> u16 {
        self.columns[feature][row]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn few_distinct_values_cut_at_midpoints() {
        let features = FeatureMatrix::from_column(vec![1.0, 3.0, 3.0, 5.0]);
        let cuts = BinCuts::fit(&features, 16);
        assert_eq!(cuts.feature_cuts(0), &[2.0, 4.0]);
        assert_eq!(cuts.bin_value(0, 1.0), 0);
        assert_eq!(cuts.bin_value(0, 3.0), 1);
        assert_eq!(cuts.bin_value(0, 4.0), 2);
        assert_eq!(cuts.bin_value(0, f64::NAN), 0);
    }

    #[test]
    fn many_values_respect_bin_budget() {
        let features = FeatureMatrix::from_column((0..1000).map(f64::from).collect());
        let cuts = BinCuts::fit(&features, 8);
        assert!(cuts.num_bins(0) <= 8);
        assert!(cuts.feature_cuts(0).windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn constant_feature_has_single_bin() {
        let features = FeatureMatrix::from_column(vec![2.0; 5]);
        let cuts = BinCuts::fit(&features, 8);
        assert_eq!(cuts.num_bins(0), 1);
        let quantized = cuts.quantize(&features);
        assert!(quantized.feature_column(0).iter().all(|bin| *bin == 0));
    }
}
