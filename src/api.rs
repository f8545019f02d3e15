//! High-level entry points.
//!
//! Every call is a pure function of its inputs and the caller's RNG: the
//! RNG is borrowed for the duration of the call and never stored, so
//! independent estimations may run concurrently on separate threads.

use image::DynamicImage;
use log::debug;
use nalgebra::Point2;
use rand::Rng;

use crate::core::{EstimationResult, RansacEngine};
use crate::correspondence::{sample_correspondences, SparseTracker};
use crate::error::EstimationError;
use crate::estimators::{AffineEstimator, SimilarityEstimator};
use crate::models::{MotionModel, TransformModel};
use crate::samplers::UniformRandomSampler;
use crate::settings::{ImageSamplingConfig, RansacConfig};
use crate::types::{pack_points, DataMatrix};

/// Run the consensus search on a correspondence matrix and return the full
/// diagnostic result.
pub fn estimate_correspondences<R>(
    data: &DataMatrix,
    model: MotionModel,
    config: &RansacConfig,
    rng: &mut R,
) -> Result<EstimationResult<TransformModel>, EstimationError>
where
    R: Rng + ?Sized,
{
    let sampler = UniformRandomSampler::with_rng(rng);
    match model {
        MotionModel::Affine => {
            RansacEngine::new(config.clone(), AffineEstimator::new(), sampler).run(data)
        }
        MotionModel::Similarity => {
            RansacEngine::new(config.clone(), SimilarityEstimator::new(), sampler).run(data)
        }
    }
}

/// Estimate the transform mapping `src[i]` onto `dst[i]`.
///
/// `full_affine` selects the 6-parameter affine model; otherwise a
/// similarity (rotation, uniform scale, translation) is fitted.
///
/// # Errors
/// `LengthMismatch` for arrays of different length, `InsufficientPoints`
/// for fewer than 3 pairs, and the engine failures
/// `DegenerateSampleExhausted` / `RansacExhausted`.
pub fn estimate_rigid_transform<R>(
    src: &[Point2<f64>],
    dst: &[Point2<f64>],
    full_affine: bool,
    config: &RansacConfig,
    rng: &mut R,
) -> Result<TransformModel, EstimationError>
where
    R: Rng + ?Sized,
{
    let data = pack_points(src, dst)?;
    let model = MotionModel::from_full_affine(full_affine);
    let result = estimate_correspondences(&data, model, config, rng)?;
    Ok(result.model)
}

/// Estimate the transform between two images of equal size and format.
///
/// Correspondences are generated at a reduced working resolution by
/// `tracker`; the translation of the returned transform is rescaled to the
/// input resolution.
///
/// # Errors
/// `SizeMismatch`, `FormatMismatch` and `UnsupportedFormat` for unusable
/// image pairs, plus every failure of [`estimate_rigid_transform`].
pub fn estimate_rigid_transform_images<T, R>(
    a: &DynamicImage,
    b: &DynamicImage,
    full_affine: bool,
    config: &RansacConfig,
    sampling: &ImageSamplingConfig,
    tracker: &T,
    rng: &mut R,
) -> Result<TransformModel, EstimationError>
where
    T: SparseTracker + ?Sized,
    R: Rng + ?Sized,
{
    let sampled = sample_correspondences(a, b, sampling, tracker)?;
    let motion_model = MotionModel::from_full_affine(full_affine);
    let result = estimate_correspondences(&sampled.data, motion_model, config, rng)?;

    let mut model = result.model;
    model.unscale_translation(sampled.scale);
    debug!(
        "image-mode estimate from {} inliers, translation rescaled by 1/{:.4}",
        result.inliers.len(),
        sampled.scale
    );
    Ok(model)
}
