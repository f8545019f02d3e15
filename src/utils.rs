//! Random index generation shared by the samplers.
//!
//! The generator never owns global state: it wraps whatever RNG the caller
//! hands in (an owned `StdRng`, or `&mut R` borrowed for the duration of
//! one estimation), so concurrent estimations never share a stream.

use rand::distributions::Uniform;
use rand::prelude::*;

/// Uniform index generator drawing from `[0, n)`.
pub struct UniformIndexGenerator<R: Rng> {
    rng: R,
    dist: Option<(usize, Uniform<usize>)>,
}

impl<R: Rng> UniformIndexGenerator<R> {
    /// Wrap a caller-supplied RNG.
    pub fn new(rng: R) -> Self {
        Self { rng, dist: None }
    }

    /// Draw a single index in `[0, n)`. `n` must be non-zero.
    pub fn next_index(&mut self, n: usize) -> usize {
        if let Some((len, dist)) = &self.dist {
            if *len == n {
                return self.rng.sample(dist);
            }
        }
        let dist = Uniform::new(0, n);
        let idx = self.rng.sample(&dist);
        self.dist = Some((n, dist));
        idx
    }

    /// Fill `out` with distinct indices drawn uniformly from `[0, n)`.
    ///
    /// Requires `out.len() <= n`; suited to the tiny minimal-sample sizes
    /// used here, where rejection of repeats is cheap.
    pub fn gen_unique(&mut self, out: &mut [usize], n: usize) {
        debug_assert!(out.len() <= n);
        for i in 0..out.len() {
            loop {
                let candidate = self.next_index(n);
                if out[..i].iter().all(|&v| v != candidate) {
                    out[i] = candidate;
                    break;
                }
            }
        }
    }
}

impl UniformIndexGenerator<StdRng> {
    /// Generator seeded from the thread-local entropy source.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Generator with a fixed seed (useful for tests).
    pub fn from_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}
