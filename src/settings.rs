//! Configuration types.
//!
//! All structs carry the defaults of the original frame-to-frame estimator
//! and deserialize with `#[serde(default)]`, so a partial JSON/YAML document
//! only needs to name the fields it overrides.

use serde::{Deserialize, Serialize};

use crate::error::EstimationError;

/// Parameters of the RANSAC consensus loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RansacConfig {
    /// Outer iteration count, also the per-iteration budget for redrawing a
    /// degenerate sample.
    pub max_iters: usize,
    /// Fraction of correspondences that must agree before a hypothesis is
    /// accepted.
    pub min_inlier_ratio: f64,
    /// Inlier threshold as a fraction of the larger destination bounding box
    /// extent.
    pub threshold_ratio: f64,
}

impl RansacConfig {
    /// Worst-case number of sample draws for one estimation.
    pub fn max_sample_draws(&self) -> usize {
        self.max_iters.saturating_mul(self.max_iters)
    }
}

impl Default for RansacConfig {
    fn default() -> Self {
        Self {
            max_iters: 500,
            min_inlier_ratio: 0.5,
            threshold_ratio: 0.05,
        }
    }
}

/// Parameters handed verbatim to the external pyramidal sparse tracker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerParams {
    /// Side of the square search window in pixels.
    pub window_size: u32,
    /// Number of pyramid levels above the base image.
    pub pyramid_levels: u32,
    /// Per-level iteration cap.
    pub max_iterations: u32,
    /// Per-level convergence epsilon.
    pub epsilon: f64,
}

impl Default for TrackerParams {
    fn default() -> Self {
        Self {
            window_size: 10,
            pyramid_levels: 3,
            max_iterations: 40,
            epsilon: 0.1,
        }
    }
}

/// Parameters of image-mode correspondence generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSamplingConfig {
    /// Working resolution the input is downscaled to fit inside.
    pub max_width: u32,
    pub max_height: u32,
    /// Rows of the sampling grid; columns follow the aspect ratio.
    pub grid_rows: u32,
    pub tracker: TrackerParams,
}

impl ImageSamplingConfig {
    /// Reject settings that would collapse the working image or the grid.
    pub fn validate(&self) -> Result<(), EstimationError> {
        if self.max_width == 0 || self.max_height == 0 {
            return Err(EstimationError::InvalidConfig(
                "working resolution must be at least 1x1",
            ));
        }
        if self.grid_rows == 0 {
            return Err(EstimationError::InvalidConfig("grid_rows must be positive"));
        }
        Ok(())
    }
}

impl Default for ImageSamplingConfig {
    fn default() -> Self {
        Self {
            max_width: 160,
            max_height: 120,
            grid_rows: 15,
            tracker: TrackerParams::default(),
        }
    }
}
