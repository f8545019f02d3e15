//! Similarity estimator: rotation, uniform scale and translation.

use log::trace;
use nalgebra::{Matrix4, Vector4};

use super::{
    check_count, check_finite, is_valid_triple, pinv_eps, MAX_SVD_ITERATIONS, MIN_CORRESPONDENCES,
};
use crate::core::Estimator;
use crate::error::EstimationError;
use crate::models::TransformModel;
use crate::types::{destination, source, DataMatrix};

/// Least-squares similarity fit over `rows`.
///
/// The model is `dx = c*x - s*y + tx`, `dy = s*x + c*y + ty`. Setting the
/// gradient of the squared residuals w.r.t. `(c, s, tx, ty)` to zero gives
///
/// ```text
/// | S2   0    Sx   Sy | |c |   | sum(x*dx + y*dy) |
/// | 0    S2  -Sy   Sx | |s | = | sum(x*dy - y*dx) |
/// | Sx  -Sy   n    0  | |tx|   | sum(dx)          |
/// | Sy   Sx   0    n  | |ty|   | sum(dy)          |
/// ```
///
/// with `S2 = sum(x^2 + y^2)`, `Sx = sum(x)`, `Sy = sum(y)`.
pub fn fit_similarity(
    data: &DataMatrix,
    rows: &[usize],
) -> Result<TransformModel, EstimationError> {
    check_count(rows)?;

    let (mut s2, mut sx, mut sy) = (0.0, 0.0, 0.0);
    let mut b = Vector4::<f64>::zeros();

    for &r in rows {
        let a = source(data, r);
        let d = destination(data, r);

        s2 += a.x * a.x + a.y * a.y;
        sx += a.x;
        sy += a.y;

        b[0] += a.x * d.x + a.y * d.y;
        b[1] += a.x * d.y - a.y * d.x;
        b[2] += d.x;
        b[3] += d.y;
    }
    let n = rows.len() as f64;

    #[rustfmt::skip]
    let a = Matrix4::new(
        s2,  0.0, sx,  sy,
        0.0, s2,  -sy, sx,
        sx,  -sy, n,   0.0,
        sy,  sx,  0.0, n,
    );

    check_finite(a.iter().chain(b.iter()))?;
    let svd = a
        .try_svd(true, true, f64::EPSILON, MAX_SVD_ITERATIONS)
        .ok_or(EstimationError::SolveFailed("svd did not converge"))?;
    let eps = pinv_eps(svd.singular_values.max(), 4);
    let p = svd.solve(&b, eps).map_err(EstimationError::SolveFailed)?;

    Ok(TransformModel::from_similarity(p[0], p[1], p[2], p[3]))
}

/// Similarity estimator plugged into the RANSAC engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityEstimator;

impl SimilarityEstimator {
    pub fn new() -> Self {
        Self
    }
}

impl Estimator for SimilarityEstimator {
    type Model = TransformModel;

    fn sample_size(&self) -> usize {
        MIN_CORRESPONDENCES
    }

    fn is_valid_sample(&self, data: &DataMatrix, sample: &[usize]) -> bool {
        let valid = is_valid_triple(data, sample);
        if !valid {
            trace!("rejected similarity sample {sample:?}");
        }
        valid
    }

    fn estimate_model(
        &self,
        data: &DataMatrix,
        sample: &[usize],
    ) -> Result<Self::Model, EstimationError> {
        fit_similarity(data, sample)
    }

    fn residual(&self, data: &DataMatrix, model: &Self::Model, row: usize) -> f64 {
        model.l1_residual(&source(data, row), &destination(data, row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimators::test_support::{cloud, mapped};
    use approx::assert_abs_diff_eq;
    use nalgebra::Point2;

    #[test]
    fn recovers_rotation_scale_and_translation() {
        let (scale, angle) = (1.25_f64, 0.3_f64);
        let (c, s) = (scale * angle.cos(), scale * angle.sin());
        let truth = TransformModel::from_similarity(c, s, 14.0, -6.5);
        let data = mapped(&truth, &cloud());
        let rows: Vec<usize> = (0..data.nrows()).collect();

        let t = fit_similarity(&data, &rows).unwrap();

        // Check the individual entries so sign or index slips are caught.
        assert_abs_diff_eq!(t.m[(0, 0)], c, epsilon = 1e-9);
        assert_abs_diff_eq!(t.m[(0, 1)], -s, epsilon = 1e-9);
        assert_abs_diff_eq!(t.m[(1, 0)], s, epsilon = 1e-9);
        assert_abs_diff_eq!(t.m[(1, 1)], c, epsilon = 1e-9);
        assert_abs_diff_eq!(t.m[(0, 2)], 14.0, epsilon = 1e-7);
        assert_abs_diff_eq!(t.m[(1, 2)], -6.5, epsilon = 1e-7);
        assert_abs_diff_eq!(t.rotation(), angle, epsilon = 1e-9);
        assert_abs_diff_eq!(t.scale(), scale, epsilon = 1e-9);
    }

    #[test]
    fn three_point_exact_fit() {
        let truth = TransformModel::from_similarity(0.0, 1.0, 2.0, 3.0);
        let src = [Point2::new(1.0, 1.0), Point2::new(4.0, 1.0), Point2::new(1.0, 5.0)];
        let data = mapped(&truth, &src);

        let t = fit_similarity(&data, &[0, 1, 2]).unwrap();
        let est = SimilarityEstimator::new();
        for r in 0..3 {
            assert_abs_diff_eq!(est.residual(&data, &t, r), 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn output_is_structurally_a_similarity_even_for_affine_data() {
        let shear = TransformModel::from_affine_params(&[1.0, 0.6, 0.0, 0.0, 0.4, 0.0]);
        let data = mapped(&shear, &cloud());
        let rows: Vec<usize> = (0..data.nrows()).collect();

        let t = fit_similarity(&data, &rows).unwrap();
        assert!(t.is_similarity(1e-12));
    }
}
