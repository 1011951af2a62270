use omf_core::{derive_substream_seed, Step};

/// Derives the seed handed to the classifier of one iteration step.
pub fn classifier_seed(master_seed: u64, iteration: usize, step: Step) -> u64 {
    derive_substream_seed(master_seed, (iteration as u64) << 8 | step.as_u8() as u64)
}

/// Derives the seed handed to the Step 1 fallback regressor.
pub fn regressor_seed(master_seed: u64, iteration: usize) -> u64 {
    derive_substream_seed(master_seed ^ 0xA5A5_A5A5_A5A5_A5A5, iteration as u64)
}
