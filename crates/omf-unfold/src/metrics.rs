use std::fs::File;
use std::path::Path;

use omf_core::errors::{ErrorInfo, OmfError};
use serde::{Deserialize, Serialize};

/// Mean, minimum and maximum of a weight vector.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WeightStats {
    /// Arithmetic mean of the weights.
    pub mean: f64,
    /// Smallest weight.
    pub min: f64,
    /// Largest weight.
    pub max: f64,
}

impl WeightStats {
    /// Summarises a weight vector. Empty input yields all zeros.
    pub fn from_weights(weights: &[f64]) -> Self {
        if weights.is_empty() {
            return Self {
                mean: 0.0,
                min: 0.0,
                max: 0.0,
            };
        }
        let (sum, min, max) = weights.iter().fold(
            (0.0, f64::INFINITY, f64::NEG_INFINITY),
            |(sum, min, max), &w| (sum + w, min.min(w), max.max(w)),
        );
        Self {
            mean: sum / weights.len() as f64,
            min,
            max,
        }
    }
}

/// Per-iteration diagnostics collected by the loop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IterationSummary {
    /// One-indexed iteration number.
    pub iteration: usize,
    /// Rows in the Step 1 training set.
    pub step1_rows: usize,
    /// Rows in the Step 2 training set.
    pub step2_rows: usize,
    /// Whether the fallback regressor was trained this iteration.
    pub regressor_used: bool,
    /// Summary of `weights_pull` after Step 1.
    pub pull: WeightStats,
    /// Summary of `weights_push` after Step 2.
    pub push: WeightStats,
}

#[derive(Serialize)]
struct SummaryRow {
    iteration: usize,
    step1_rows: usize,
    step2_rows: usize,
    regressor_used: bool,
    pull_mean: f64,
    pull_min: f64,
    pull_max: f64,
    push_mean: f64,
    push_min: f64,
    push_max: f64,
}

impl From<&IterationSummary> for SummaryRow {
    fn from(summary: &IterationSummary) -> Self {
        Self {
            iteration: summary.iteration,
            step1_rows: summary.step1_rows,
            step2_rows: summary.step2_rows,
            regressor_used: summary.regressor_used,
            pull_mean: summary.pull.mean,
            pull_min: summary.pull.min,
            pull_max: summary.pull.max,
            push_mean: summary.push.mean,
            push_min: summary.push.min,
            push_max: summary.push.max,
        }
    }
}

/// Collects iteration summaries and exports them as CSV.
#[derive(Debug, Default, Clone)]
pub struct MetricsRecorder {
    summaries: Vec<IterationSummary>,
}

impl MetricsRecorder {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the summary of a finished iteration.
    pub fn push(&mut self, summary: IterationSummary) {
        self.summaries.push(summary);
    }

    /// Recorded summaries in iteration order.
    pub fn summaries(&self) -> &[IterationSummary] {
        &self.summaries
    }

    /// Consumes the recorder.
    pub fn into_summaries(self) -> Vec<IterationSummary> {
        self.summaries
    }

    /// Writes one CSV row per iteration.
    pub fn write_csv(&self, path: &Path) -> Result<(), OmfError> {
        write_summaries_csv(&self.summaries, path)
    }
}

/// Writes iteration summaries to `path` as CSV with a header row.
pub fn write_summaries_csv(summaries: &[IterationSummary], path: &Path) -> Result<(), OmfError> {
    let io_err = |code: &str, err: String| {
        OmfError::Io(ErrorInfo::new(code, err).with_context("path", path.display().to_string()))
    };
    let file = File::create(path).map_err(|err| io_err("metrics-create", err.to_string()))?;
    let mut writer = csv::Writer::from_writer(file);
    for summary in summaries {
        writer
            .serialize(SummaryRow::from(summary))
            .map_err(|err| io_err("metrics-write", err.to_string()))?;
    }
    writer
        .flush()
        .map_err(|err| io_err("metrics-write", err.to_string()))
}
