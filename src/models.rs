//! Geometric models produced by the estimators.
//!
//! Both motion models share one value type: a 2x3 matrix mapping a source
//! point to its destination as `dst = M * [x, y, 1]^T`.

use nalgebra::{Matrix2, Matrix2x3, Point2, Vector2};
use serde::{Deserialize, Serialize};

/// Which family of transforms to fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionModel {
    /// Rotation, uniform scale and translation (4 parameters).
    Similarity,
    /// Unconstrained linear part plus translation (6 parameters).
    Affine,
}

impl MotionModel {
    pub fn from_full_affine(full_affine: bool) -> Self {
        if full_affine {
            MotionModel::Affine
        } else {
            MotionModel::Similarity
        }
    }
}

/// 2D transform `[[m00, m01, m02], [m10, m11, m12]]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformModel {
    pub m: Matrix2x3<f64>,
}

impl TransformModel {
    pub fn new(m: Matrix2x3<f64>) -> Self {
        Self { m }
    }

    pub fn identity() -> Self {
        Self::new(Matrix2x3::identity())
    }

    /// Build the similarity `[[c, -s, tx], [s, c, ty]]`.
    pub fn from_similarity(c: f64, s: f64, tx: f64, ty: f64) -> Self {
        Self::new(Matrix2x3::new(c, -s, tx, s, c, ty))
    }

    /// Build from row-major affine parameters `[m00, m01, m02, m10, m11, m12]`.
    pub fn from_affine_params(p: &[f64; 6]) -> Self {
        Self::new(Matrix2x3::new(p[0], p[1], p[2], p[3], p[4], p[5]))
    }

    pub fn linear(&self) -> Matrix2<f64> {
        self.m.fixed_view::<2, 2>(0, 0).into_owned()
    }

    pub fn translation(&self) -> Vector2<f64> {
        self.m.column(2).into_owned()
    }

    /// Map a source point through the transform.
    pub fn apply(&self, p: &Point2<f64>) -> Point2<f64> {
        Point2::from(self.linear() * p.coords + self.translation())
    }

    /// L1 transfer error `|M*src.x - dst.x| + |M*src.y - dst.y|`.
    pub fn l1_residual(&self, src: &Point2<f64>, dst: &Point2<f64>) -> f64 {
        let p = self.apply(src);
        (p.x - dst.x).abs() + (p.y - dst.y).abs()
    }

    /// Rotation angle `atan2(m10, m00)` in radians.
    pub fn rotation(&self) -> f64 {
        self.m[(1, 0)].atan2(self.m[(0, 0)])
    }

    /// Uniform scale `sqrt(m00^2 + m10^2)`; exact for similarity transforms.
    pub fn scale(&self) -> f64 {
        self.m[(0, 0)].hypot(self.m[(1, 0)])
    }

    /// Divide the translation column by `factor`.
    ///
    /// Used to lift a transform estimated on a downsampled image back to
    /// full resolution.
    pub fn unscale_translation(&mut self, factor: f64) {
        self.m[(0, 2)] /= factor;
        self.m[(1, 2)] /= factor;
    }

    /// Whether the linear block has the `[[c, -s], [s, c]]` structure.
    pub fn is_similarity(&self, tol: f64) -> bool {
        (self.m[(0, 0)] - self.m[(1, 1)]).abs() <= tol
            && (self.m[(1, 0)] + self.m[(0, 1)]).abs() <= tol
    }
}

impl Default for TransformModel {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<Matrix2x3<f64>> for TransformModel {
    fn from(m: Matrix2x3<f64>) -> Self {
        Self::new(m)
    }
}
