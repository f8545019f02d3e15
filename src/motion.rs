//! Frame-to-frame motion bookkeeping for video stabilization.
//!
//! Per-frame transforms are reduced to `(dx, dy, da)`, integrated into a
//! camera trajectory, smoothed with a centred moving average and turned back
//! into corrective per-frame transforms. Nothing here touches pixels.

use log::warn;
use nalgebra::{Matrix2x3, Point2};
use rand::Rng;

use crate::api::estimate_rigid_transform;
use crate::error::EstimationError;
use crate::models::TransformModel;
use crate::settings::RansacConfig;

/// Translation and rotation of one frame relative to the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotionParams {
    pub dx: f64,
    pub dy: f64,
    /// Rotation in radians.
    pub da: f64,
}

impl MotionParams {
    pub fn new(dx: f64, dy: f64, da: f64) -> Self {
        Self { dx, dy, da }
    }

    /// Decompose a 2x3 transform; scale and shear are discarded.
    pub fn from_transform(t: &TransformModel) -> Self {
        Self::new(t.m[(0, 2)], t.m[(1, 2)], t.rotation())
    }

    /// Rigid transform `[[cos, -sin, dx], [sin, cos, dy]]`.
    pub fn to_transform(&self) -> TransformModel {
        let (s, c) = self.da.sin_cos();
        TransformModel::new(Matrix2x3::new(c, -s, self.dx, s, c, self.dy))
    }
}

/// Accumulated camera pose after a frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrajectoryPoint {
    pub x: f64,
    pub y: f64,
    pub a: f64,
}

/// Running sums of per-frame motion.
pub fn accumulate(motions: &[MotionParams]) -> Vec<TrajectoryPoint> {
    motions
        .iter()
        .scan(TrajectoryPoint::default(), |acc, m| {
            acc.x += m.dx;
            acc.y += m.dy;
            acc.a += m.da;
            Some(*acc)
        })
        .collect()
}

/// Centred moving average with window `2 * radius + 1`, shrunk at the ends.
pub fn smooth(trajectory: &[TrajectoryPoint], radius: usize) -> Vec<TrajectoryPoint> {
    let n = trajectory.len();
    (0..n)
        .map(|i| {
            let window = &trajectory[i.saturating_sub(radius)..(i + radius + 1).min(n)];
            let k = window.len() as f64;
            let sum = window.iter().fold(TrajectoryPoint::default(), |s, p| TrajectoryPoint {
                x: s.x + p.x,
                y: s.y + p.y,
                a: s.a + p.a,
            });
            TrajectoryPoint {
                x: sum.x / k,
                y: sum.y / k,
                a: sum.a / k,
            }
        })
        .collect()
}

/// Per-frame motions that move the camera along the smoothed trajectory
/// instead of the raw one.
pub fn stabilizing_transforms(motions: &[MotionParams], radius: usize) -> Vec<MotionParams> {
    let raw = accumulate(motions);
    let smoothed = smooth(&raw, radius);

    motions
        .iter()
        .zip(raw.iter().zip(&smoothed))
        .map(|(m, (r, s))| {
            MotionParams::new(m.dx + (s.x - r.x), m.dy + (s.y - r.y), m.da + (s.a - r.a))
        })
        .collect()
}

/// Outcome of estimating one frame pair with fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameMotion {
    pub transform: TransformModel,
    /// Set when estimation failed and the previous transform was reused.
    pub fallback: Option<EstimationError>,
}

/// Sequential per-frame estimator that reuses the previous transform when a
/// frame pair cannot be estimated (identity before the first success).
///
/// This is caller-side policy layered on top of the engine; the engine
/// itself always reports failures.
#[derive(Debug, Clone)]
pub struct FrameMotionEstimator {
    pub config: RansacConfig,
    pub full_affine: bool,
    last: TransformModel,
    motions: Vec<MotionParams>,
    fallbacks: Vec<usize>,
}

impl FrameMotionEstimator {
    pub fn new(config: RansacConfig, full_affine: bool) -> Self {
        Self {
            config,
            full_affine,
            last: TransformModel::identity(),
            motions: Vec::new(),
            fallbacks: Vec::new(),
        }
    }

    /// Estimate the motion from the previous frame's points to the current.
    pub fn push<R>(
        &mut self,
        prev: &[Point2<f64>],
        curr: &[Point2<f64>],
        rng: &mut R,
    ) -> FrameMotion
    where
        R: Rng + ?Sized,
    {
        let frame = self.motions.len();
        let estimate = estimate_rigid_transform(prev, curr, self.full_affine, &self.config, rng);
        let fallback = match estimate {
            Ok(t) => {
                self.last = t;
                None
            }
            Err(err) => {
                warn!("frame {frame}: {err}; reusing previous transform");
                self.fallbacks.push(frame);
                Some(err)
            }
        };

        self.motions.push(MotionParams::from_transform(&self.last));
        FrameMotion {
            transform: self.last,
            fallback,
        }
    }

    /// Motions recorded so far, one per pushed frame pair.
    pub fn motions(&self) -> &[MotionParams] {
        &self.motions
    }

    /// Indices of frame pairs that fell back to the previous transform.
    pub fn fallback_frames(&self) -> &[usize] {
        &self.fallbacks
    }

    /// Corrective motions for the frames recorded so far.
    pub fn stabilized(&self, radius: usize) -> Vec<MotionParams> {
        stabilizing_transforms(&self.motions, radius)
    }
}
