//! Uniform random sampler drawing minimal samples without replacement.

use rand::rngs::StdRng;
use rand::Rng;

use crate::core::Sampler;
use crate::types::DataMatrix;
use crate::utils::UniformIndexGenerator;

/// Uniform random sampler drawing minimal samples without replacement.
///
/// The sampler owns its RNG; pass `&mut rng` to borrow a caller's generator
/// for a single estimation.
pub struct UniformRandomSampler<R: Rng = StdRng> {
    rng: UniformIndexGenerator<R>,
}

impl<R: Rng> UniformRandomSampler<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng: UniformIndexGenerator::new(rng),
        }
    }
}

impl UniformRandomSampler<StdRng> {
    /// Sampler with a freshly seeded RNG.
    pub fn new() -> Self {
        Self {
            rng: UniformIndexGenerator::from_entropy(),
        }
    }

    /// Sampler from a fixed seed (primarily for tests).
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: UniformIndexGenerator::from_seed(seed),
        }
    }
}

impl Default for UniformRandomSampler<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> Sampler for UniformRandomSampler<R> {
    fn sample(&mut self, data: &DataMatrix, sample_size: usize, out_indices: &mut [usize]) -> bool {
        let n = data.nrows();
        if sample_size == 0 || sample_size > n || out_indices.len() < sample_size {
            return false;
        }

        self.rng.gen_unique(&mut out_indices[..sample_size], n);
        true
    }
}
