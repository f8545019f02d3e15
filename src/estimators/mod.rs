//! Closed-form least-squares solvers for 2D motion models.
//!
//! Both solvers accumulate the normal equations of their linear model over the
//! selected correspondence rows and solve them through an SVD pseudo-inverse,
//! so the same code path handles the exact three-point case and overdetermined
//! inlier sets.
//! - [`fit_affine`]: 6 unknowns, block-diagonal 6x6 system
//! - [`fit_similarity`]: 4 unknowns `(c, s, tx, ty)`, symmetric 4x4 system

pub mod affine;
pub mod similarity;

pub use affine::{fit_affine, AffineEstimator};
pub use similarity::{fit_similarity, SimilarityEstimator};

use crate::error::EstimationError;
use crate::geometry::{is_coincident, is_degenerate_sample};
use crate::types::{destination, source, DataMatrix};

/// Minimal number of correspondences either solver accepts.
pub const MIN_CORRESPONDENCES: usize = 3;

/// Sweep limit for the SVD of a normal matrix.
const MAX_SVD_ITERATIONS: usize = 1000;

/// Pseudo-inverse cutoff for singular values of an `n x n` normal matrix.
fn pinv_eps(max_singular_value: f64, n: usize) -> f64 {
    max_singular_value * n as f64 * f64::EPSILON
}

/// Non-finite sums (NaN coordinates, or squares overflowing `f64`) make the
/// normal equations meaningless.
fn check_finite<'a>(values: impl IntoIterator<Item = &'a f64>) -> Result<(), EstimationError> {
    if values.into_iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(EstimationError::SolveFailed("non-finite normal equations"))
    }
}

fn check_count(rows: &[usize]) -> Result<(), EstimationError> {
    if rows.len() < MIN_CORRESPONDENCES {
        return Err(EstimationError::InsufficientPoints { count: rows.len() });
    }
    Ok(())
}

/// Sample validity shared by both estimators: three distinct rows whose source
/// points and destination points are pairwise distinct and not collinear.
pub(crate) fn is_valid_triple(data: &DataMatrix, sample: &[usize]) -> bool {
    let &[i0, i1, i2] = sample else {
        return false;
    };
    if i0 == i1 || i0 == i2 || i1 == i2 {
        return false;
    }

    let a = [source(data, i0), source(data, i1), source(data, i2)];
    let b = [destination(data, i0), destination(data, i1), destination(data, i2)];

    for (i, j) in [(0, 1), (0, 2), (1, 2)] {
        if is_coincident(&a[i], &a[j]) || is_coincident(&b[i], &b[j]) {
            return false;
        }
    }

    !is_degenerate_sample(&a[0], &a[1], &a[2], &b[0], &b[1], &b[2])
}
