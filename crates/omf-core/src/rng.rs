//! Seeded row subsampling and per-step seed derivation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use siphasher::sip::SipHasher13;
use std::hash::Hasher;

/// Draws the training rows for one boosting round.
///
/// Each row is kept independently with probability `fraction`. The stream is
/// seeded from the provider seed, so a fit is reproducible for a fixed
/// `random_state`.
#[derive(Debug, Clone)]
pub struct RowSampler {
    rng: StdRng,
}

impl RowSampler {
    /// Seeds the sampler.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Row indices for the next round, ascending. Never empty when
    /// `num_rows > 0`; a fraction of 1 or more keeps every row without
    /// advancing the stream.
    pub fn subsample(&mut self, num_rows: usize, fraction: f64) -> Vec<usize> {
        if fraction >= 1.0 || num_rows == 0 {
            return (0..num_rows).collect();
        }
        let rows: Vec<usize> = (0..num_rows)
            .filter(|_| self.rng.gen::<f64>() < fraction)
            .collect();
        if rows.is_empty() {
            vec![self.rng.gen_range(0..num_rows)]
        } else {
            rows
        }
    }
}

/// SipHash-1-3 of `(master_seed, substream)` under zero keys; stable across
/// platforms.
pub fn derive_substream_seed(master_seed: u64, substream: u64) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write_u64(master_seed);
    hasher.write_u64(substream);
    hasher.finish()
}
