//! Regression trees grown depth-wise from gradient histograms.
//!
//! Split gain follows the second-order boosting objective:
//!
//! ```text
//! gain = 0.5 * [G_L^2/(H_L+lambda) + G_R^2/(H_R+lambda) - G^2/(H+lambda)]
//! ```
//!
//! and leaf values are the Newton step `-G / (H + lambda)`.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::loss::GradientPair;
use crate::params::BoostParams;
use crate::quantize::{BinCuts, QuantizedMatrix};

const MIN_SPLIT_GAIN: f64 = 1e-12;

/// A node of a fitted tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// Terminal node carrying a raw score contribution.
    Leaf {
        /// Raw score added for rows reaching this leaf.
        value: f64,
    },
    /// Binary split on one feature.
    Split {
        /// Feature index.
        feature: usize,
        /// Highest bin routed to the left child.
        bin: u16,
        /// Raw threshold; values strictly below it go left.
        threshold: f64,
        /// Index of the left child.
        left: usize,
        /// Index of the right child.
        right: usize,
    },
}

/// Fitted regression tree stored as a flat node array rooted at index 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Score contribution for a raw feature row.
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    let value = row[*feature];
                    index = if value < *threshold || !value.is_finite() {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    /// Score contribution for a quantised training row.
    pub fn predict_binned(&self, data: &QuantizedMatrix, row: usize) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    bin,
                    left,
                    right,
                    ..
                } => {
                    index = if data.get(row, *feature) <= *bin {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    /// Number of leaves.
    pub fn num_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, Node::Leaf { .. }))
            .count()
    }

    /// Nodes in storage order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    bin: u16,
    gain: f64,
}

/// Grows a single tree for one boosting round.
pub struct TreeGrower<'a> {
    data: &'a QuantizedMatrix,
    cuts: &'a BinCuts,
    grads: &'a [GradientPair],
    params: &'a BoostParams,
    nodes: Vec<Node>,
}

impl<'a> TreeGrower<'a> {
    /// Creates a grower over quantised data and per-row gradients.
    pub fn new(
        data: &'a QuantizedMatrix,
        cuts: &'a BinCuts,
        grads: &'a [GradientPair],
        params: &'a BoostParams,
    ) -> Self {
        Self {
            data,
            cuts,
            grads,
            params,
            nodes: Vec::new(),
        }
    }

    /// Grows the tree from the given training rows.
    pub fn grow(mut self, rows: Vec<usize>) -> Tree {
        self.build(rows, 0);
        Tree { nodes: self.nodes }
    }

    fn build(&mut self, rows: Vec<usize>, depth: usize) -> usize {
        let (sum_grad, sum_hess) = rows.iter().fold((0.0, 0.0), |(g, h), &row| {
            (g + self.grads[row].grad, h + self.grads[row].hess)
        });
        let index = self.nodes.len();
        self.nodes.push(Node::Leaf {
            value: leaf_weight(sum_grad, sum_hess, self.params.reg_lambda),
        });
        if depth >= self.params.max_depth || rows.len() < 2 * self.params.min_samples_leaf {
            return index;
        }
        let Some(split) = self.find_split(&rows, sum_grad, sum_hess) else {
            return index;
        };

        let column = self.data.feature_column(split.feature);
        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) =
            rows.into_iter().partition(|&row| column[row] <= split.bin);
        let left = self.build(left_rows, depth + 1);
        let right = self.build(right_rows, depth + 1);
        self.nodes[index] = Node::Split {
            feature: split.feature,
            bin: split.bin,
            threshold: self.cuts.feature_cuts(split.feature)[split.bin as usize],
            left,
            right,
        };
        index
    }

    fn find_split(&self, rows: &[usize], sum_grad: f64, sum_hess: f64) -> Option<SplitCandidate> {
        let candidates: Vec<Option<SplitCandidate>> = (0..self.data.num_features())
            .into_par_iter()
            .map(|feature| self.best_split_for_feature(feature, rows, sum_grad, sum_hess))
            .collect();
        // Sequential reduction keeps ties resolved towards the lowest feature index.
        candidates
            .into_iter()
            .flatten()
            .fold(None, |best: Option<SplitCandidate>, candidate| match best {
                Some(current) if current.gain >= candidate.gain => Some(current),
                _ => Some(candidate),
            })
    }

    fn best_split_for_feature(
        &self,
        feature: usize,
        rows: &[usize],
        sum_grad: f64,
        sum_hess: f64,
    ) -> Option<SplitCandidate> {
        let num_bins = self.cuts.num_bins(feature);
        if num_bins < 2 {
            return None;
        }
        let column = self.data.feature_column(feature);
        let mut histogram = vec![(0.0f64, 0.0f64, 0usize); num_bins];
        for &row in rows {
            let slot = &mut histogram[column[row] as usize];
            slot.0 += self.grads[row].grad;
            slot.1 += self.grads[row].hess;
            slot.2 += 1;
        }

        let lambda = self.params.reg_lambda;
        let parent = leaf_score(sum_grad, sum_hess, lambda);
        let (mut grad_left, mut hess_left, mut count_left) = (0.0, 0.0, 0usize);
        let mut best: Option<SplitCandidate> = None;
        for (bin, (grad, hess, count)) in histogram.iter().enumerate().take(num_bins - 1) {
            grad_left += grad;
            hess_left += hess;
            count_left += count;
            let count_right = rows.len() - count_left;
            if count_left < self.params.min_samples_leaf
                || count_right < self.params.min_samples_leaf
            {
                continue;
            }
            let (grad_right, hess_right) = (sum_grad - grad_left, sum_hess - hess_left);
            if hess_left < self.params.min_child_weight
                || hess_right < self.params.min_child_weight
            {
                continue;
            }
            let gain = 0.5
                * (leaf_score(grad_left, hess_left, lambda)
                    + leaf_score(grad_right, hess_right, lambda)
                    - parent);
            if gain > MIN_SPLIT_GAIN && best.map_or(true, |current| gain > current.gain) {
                best = Some(SplitCandidate {
                    feature,
                    bin: bin as u16,
                    gain,
                });
            }
        }
        best
    }
}

fn leaf_score(sum_grad: f64, sum_hess: f64, lambda: f64) -> f64 {
    let denom = sum_hess + lambda;
    if denom <= 0.0 {
        return 0.0;
    }
    sum_grad * sum_grad / denom
}

/// Newton leaf value `-G / (H + lambda)`.
pub fn leaf_weight(sum_grad: f64, sum_hess: f64, lambda: f64) -> f64 {
    let denom = sum_hess + lambda;
    if denom <= 0.0 {
        return 0.0;
    }
    -sum_grad / denom
}
