//! Inlier-count scoring.
//!
//! A correspondence is an inlier when its residual under the candidate model
//! is strictly below the threshold. Ties between equally sized consensus sets
//! are never compared: the engine accepts the first set that is large enough.

use crate::core::Scoring;
use crate::types::DataMatrix;

/// Consensus size of one hypothesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Score {
    pub inlier_count: usize,
}

impl Score {
    pub fn new(inlier_count: usize) -> Self {
        Self { inlier_count }
    }

    /// Fraction of `total` correspondences that agree with the model.
    pub fn inlier_ratio(&self, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            self.inlier_count as f64 / total as f64
        }
    }
}

/// RANSAC-style scoring that counts inliers using a user-provided residual
/// function.
///
/// The residual function takes `(data, model, row_index)` and returns a
/// non-negative residual value.
pub struct RansacInlierCountScoring<M, F>
where
    F: Fn(&DataMatrix, &M, usize) -> f64,
{
    threshold: f64,
    residual_fn: F,
    _marker: std::marker::PhantomData<M>,
}

impl<M, F> RansacInlierCountScoring<M, F>
where
    F: Fn(&DataMatrix, &M, usize) -> f64,
{
    pub fn new(threshold: f64, residual_fn: F) -> Self {
        Self {
            threshold,
            residual_fn,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<M, F> Scoring<M> for RansacInlierCountScoring<M, F>
where
    F: Fn(&DataMatrix, &M, usize) -> f64,
{
    type Score = Score;

    fn threshold(&self) -> f64 {
        self.threshold
    }

    fn score(&self, data: &DataMatrix, model: &M, inliers_out: &mut Vec<usize>) -> Self::Score {
        inliers_out.clear();
        inliers_out.extend(
            (0..data.nrows()).filter(|&i| (self.residual_fn)(data, model, i) < self.threshold),
        );
        Score::new(inliers_out.len())
    }
}
