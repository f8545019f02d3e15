//! Full affine estimator (6 degrees of freedom).

use log::trace;
use nalgebra::{Matrix3, Matrix6, Vector6};

use super::{
    check_count, check_finite, is_valid_triple, pinv_eps, MAX_SVD_ITERATIONS, MIN_CORRESPONDENCES,
};
use crate::core::Estimator;
use crate::error::EstimationError;
use crate::models::TransformModel;
use crate::types::{destination, source, DataMatrix};

/// Least-squares affine fit over `rows`.
///
/// Each output coordinate is an independent linear regression on
/// `(x, y, 1)`, so the 6x6 normal matrix is two copies of the same 3x3
/// block `sum [x^2, xy, x; xy, y^2, y; x, y, 1]` on the diagonal, with right
/// hand side `sum [x*dx, y*dx, dx, x*dy, y*dy, dy]`.
pub fn fit_affine(data: &DataMatrix, rows: &[usize]) -> Result<TransformModel, EstimationError> {
    check_count(rows)?;

    let mut block = Matrix3::<f64>::zeros();
    let mut b = Vector6::<f64>::zeros();

    for &r in rows {
        let a = source(data, r);
        let d = destination(data, r);

        block[(0, 0)] += a.x * a.x;
        block[(0, 1)] += a.x * a.y;
        block[(0, 2)] += a.x;
        block[(1, 1)] += a.y * a.y;
        block[(1, 2)] += a.y;
        block[(2, 2)] += 1.0;

        b[0] += a.x * d.x;
        b[1] += a.y * d.x;
        b[2] += d.x;
        b[3] += a.x * d.y;
        b[4] += a.y * d.y;
        b[5] += d.y;
    }
    block[(1, 0)] = block[(0, 1)];
    block[(2, 0)] = block[(0, 2)];
    block[(2, 1)] = block[(1, 2)];

    let mut a = Matrix6::<f64>::zeros();
    a.fixed_view_mut::<3, 3>(0, 0).copy_from(&block);
    a.fixed_view_mut::<3, 3>(3, 3).copy_from(&block);

    check_finite(a.iter().chain(b.iter()))?;
    let svd = a
        .try_svd(true, true, f64::EPSILON, MAX_SVD_ITERATIONS)
        .ok_or(EstimationError::SolveFailed("svd did not converge"))?;
    let eps = pinv_eps(svd.singular_values.max(), 6);
    let m = svd.solve(&b, eps).map_err(EstimationError::SolveFailed)?;

    Ok(TransformModel::from_affine_params(&[m[0], m[1], m[2], m[3], m[4], m[5]]))
}

/// Affine estimator plugged into the RANSAC engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct AffineEstimator;

impl AffineEstimator {
    pub fn new() -> Self {
        Self
    }
}

impl Estimator for AffineEstimator {
    type Model = TransformModel;

    fn sample_size(&self) -> usize {
        MIN_CORRESPONDENCES
    }

    fn is_valid_sample(&self, data: &DataMatrix, sample: &[usize]) -> bool {
        let valid = is_valid_triple(data, sample);
        if !valid {
            trace!("rejected affine sample {sample:?}");
        }
        valid
    }

    fn estimate_model(
        &self,
        data: &DataMatrix,
        sample: &[usize],
    ) -> Result<Self::Model, EstimationError> {
        fit_affine(data, sample)
    }

    fn residual(&self, data: &DataMatrix, model: &Self::Model, row: usize) -> f64 {
        model.l1_residual(&source(data, row), &destination(data, row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimators::test_support::{cloud, mapped};
    use crate::types::pack_points;
    use approx::assert_abs_diff_eq;
    use nalgebra::{Matrix2x3, Point2};

    #[test]
    fn pure_translation_from_three_points_is_exact() {
        let src = [Point2::new(0.0, 0.0), Point2::new(10.0, 0.0), Point2::new(0.0, 10.0)];
        let dst = [Point2::new(5.0, 5.0), Point2::new(15.0, 5.0), Point2::new(5.0, 15.0)];
        let data = pack_points(&src, &dst).unwrap();

        let t = fit_affine(&data, &[0, 1, 2]).unwrap();
        assert_abs_diff_eq!(t.m, Matrix2x3::new(1.0, 0.0, 5.0, 0.0, 1.0, 5.0), epsilon = 1e-9);
    }

    #[test]
    fn three_point_fit_has_zero_residual() {
        let truth = TransformModel::from_affine_params(&[1.2, -0.3, 7.0, 0.4, 0.9, -3.0]);
        let src = [Point2::new(3.0, 4.0), Point2::new(50.0, 12.0), Point2::new(20.0, 80.0)];
        let data = mapped(&truth, &src);

        let t = fit_affine(&data, &[0, 1, 2]).unwrap();
        let est = AffineEstimator::new();
        for r in 0..3 {
            assert_abs_diff_eq!(est.residual(&data, &t, r), 0.0, epsilon = 1e-8);
        }
        assert_abs_diff_eq!(t.m, truth.m, epsilon = 1e-9);
    }

    #[test]
    fn overdetermined_fit_recovers_transform() {
        let truth = TransformModel::from_affine_params(&[0.95, 0.1, -12.0, -0.05, 1.1, 4.5]);
        let data = mapped(&truth, &cloud());
        let rows: Vec<usize> = (0..data.nrows()).collect();

        let t = fit_affine(&data, &rows).unwrap();
        assert_abs_diff_eq!(t.m, truth.m, epsilon = 1e-8);
    }

    #[test]
    fn too_few_rows_is_an_error() {
        let data = mapped(&TransformModel::identity(), &cloud());
        assert_eq!(
            fit_affine(&data, &[0, 1]),
            Err(EstimationError::InsufficientPoints { count: 2 })
        );
    }
}
