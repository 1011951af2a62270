#![deny(missing_docs)]
#![doc = "Histogram adapter for OmniFold: 1D and 2D histograms, expansion of binned counts into synthetic events, re-aggregation over the gen axis and the binned entry point."]

/// Bin edges, centers, widths and lookup.
pub mod axis;
/// Binned entry point.
pub mod binned;
pub mod expand;
/// Weighted 1D and 2D histograms.
pub mod histogram;

pub use axis::Axis;
pub use binned::{binned_omnifold, BinnedOutput};
pub use expand::{
    aggregate, bin_multiplicity, expand_measured, expand_response, ExpandedResponse,
    ExpandedSample,
};
pub use histogram::{Histogram1D, Histogram2D};
