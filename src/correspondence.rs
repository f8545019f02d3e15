//! Correspondence generation from an image pair.
//!
//! The pair is reduced to a small grayscale working resolution, a regular
//! grid of points is laid over the first image and handed to an external
//! sparse tracker, and the successfully tracked pairs are packed into a
//! correspondence matrix. The downscale factor is returned alongside so
//! translations estimated at working resolution can be lifted back.

use image::imageops::{self, FilterType};
use image::{ColorType, DynamicImage, GenericImageView, GrayImage};
use log::debug;
use nalgebra::Point2;

use crate::error::EstimationError;
use crate::settings::{ImageSamplingConfig, TrackerParams};
use crate::types::{pack_correspondences, Correspondence, DataMatrix};

/// Output of a sparse tracker: one position and one success flag per input
/// point, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackResult {
    pub points: Vec<Point2<f64>>,
    pub status: Vec<bool>,
}

/// Sparse point tracker (typically pyramidal Lucas-Kanade).
///
/// The tracker is an external collaborator; this crate only consumes its
/// output. Points past the shorter of `points`/`status` are treated as lost.
pub trait SparseTracker {
    fn track(
        &self,
        prev: &GrayImage,
        curr: &GrayImage,
        prev_points: &[Point2<f64>],
        params: &TrackerParams,
    ) -> TrackResult;
}

impl<F> SparseTracker for F
where
    F: Fn(&GrayImage, &GrayImage, &[Point2<f64>], &TrackerParams) -> TrackResult,
{
    fn track(
        &self,
        prev: &GrayImage,
        curr: &GrayImage,
        prev_points: &[Point2<f64>],
        params: &TrackerParams,
    ) -> TrackResult {
        self(prev, curr, prev_points, params)
    }
}

/// Correspondences sampled at working resolution.
#[derive(Debug, Clone)]
pub struct SampledCorrespondences {
    pub data: DataMatrix,
    /// Working size divided by input size; `<= 1`.
    pub scale: f64,
    /// Grid columns and rows that were tracked.
    pub grid: (u32, u32),
}

/// Validate that two images can be compared.
pub fn check_image_pair(a: &DynamicImage, b: &DynamicImage) -> Result<(), EstimationError> {
    let (aw, ah) = a.dimensions();
    let (bw, bh) = b.dimensions();
    if (aw, ah) != (bw, bh) {
        return Err(EstimationError::SizeMismatch {
            a_width: aw,
            a_height: ah,
            b_width: bw,
            b_height: bh,
        });
    }
    if a.color() != b.color() {
        return Err(EstimationError::FormatMismatch);
    }
    match a.color() {
        ColorType::L8 | ColorType::Rgb8 => {}
        other => return Err(EstimationError::UnsupportedFormat(format!("{other:?}"))),
    }
    if aw == 0 || ah == 0 {
        return Err(EstimationError::EmptyImage {
            width: aw,
            height: ah,
        });
    }
    Ok(())
}

/// Uniform downscale factor fitting `width x height` inside the configured
/// working resolution. Never upscales; an empty image keeps scale 1.
pub fn working_scale(width: u32, height: u32, config: &ImageSamplingConfig) -> f64 {
    if width == 0 || height == 0 {
        return 1.0;
    }
    let sx = config.max_width as f64 / width as f64;
    let sy = config.max_height as f64 / height as f64;
    sx.min(sy).min(1.0)
}

/// Scaled extent, kept within `1..=dim` for non-empty input.
fn scaled_dim(dim: u32, scale: f64) -> u32 {
    ((dim as f64 * scale).round() as u32).max(1).min(dim)
}

/// Convert to single-channel intensity and resize by `scale`.
pub fn to_working_gray(img: &DynamicImage, scale: f64) -> GrayImage {
    let (w, h) = img.dimensions();
    let (ws, hs) = (scaled_dim(w, scale), scaled_dim(h, scale));

    let gray = match img {
        DynamicImage::ImageLuma8(g) => g.clone(),
        other => other.to_luma8(),
    };
    if (ws, hs) == (w, h) {
        gray
    } else {
        imageops::resize(&gray, ws, hs, FilterType::Triangle)
    }
}

/// Cell centres of a grid with `rows` rows and an aspect-proportional number
/// of columns over a `width x height` image, in row-major order.
pub fn grid_points(width: u32, height: u32, rows: u32) -> (Vec<Point2<f64>>, (u32, u32)) {
    if width == 0 || height == 0 || rows == 0 {
        return (Vec::new(), (0, 0));
    }
    let cols = ((rows as f64 * width as f64 / height as f64).round() as u32).max(1);
    let (w, h) = (width as f64, height as f64);

    let mut points = Vec::with_capacity((rows * cols) as usize);
    for i in 0..rows {
        for j in 0..cols {
            points.push(Point2::new(
                (j as f64 + 0.5) * w / cols as f64,
                (i as f64 + 0.5) * h / rows as f64,
            ));
        }
    }
    (points, (cols, rows))
}

/// Keep only successfully tracked pairs, preserving their relative order.
pub fn repack(prev: &[Point2<f64>], curr: &[Point2<f64>], status: &[bool]) -> DataMatrix {
    let kept: Vec<Correspondence> = prev
        .iter()
        .zip(curr)
        .zip(status)
        .filter_map(|((&a, &b), &ok)| ok.then(|| Correspondence::new(a, b)))
        .collect();

    pack_correspondences(&kept)
}

/// Produce correspondences between `a` and `b` by tracking a regular grid.
pub fn sample_correspondences<T>(
    a: &DynamicImage,
    b: &DynamicImage,
    config: &ImageSamplingConfig,
    tracker: &T,
) -> Result<SampledCorrespondences, EstimationError>
where
    T: SparseTracker + ?Sized,
{
    config.validate()?;
    check_image_pair(a, b)?;

    let (w, h) = a.dimensions();
    let scale = working_scale(w, h, config);
    let gray_a = to_working_gray(a, scale);
    let gray_b = to_working_gray(b, scale);

    let (grid, dims) = grid_points(gray_a.width(), gray_a.height(), config.grid_rows);
    let tracked = tracker.track(&gray_a, &gray_b, &grid, &config.tracker);
    let data = repack(&grid, &tracked.points, &tracked.status);

    debug!(
        "image sampling: {w}x{h} -> {}x{} (scale {scale:.4}), {}x{} grid, {}/{} tracked",
        gray_a.width(),
        gray_a.height(),
        dims.0,
        dims.1,
        data.nrows(),
        grid.len()
    );

    Ok(SampledCorrespondences {
        data,
        scale,
        grid: dims,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{destination, source};
    use image::{Luma, Rgb, RgbImage};

    fn shift_tracker(
        dx: f64,
        dy: f64,
    ) -> impl Fn(&GrayImage, &GrayImage, &[Point2<f64>], &TrackerParams) -> TrackResult {
        move |_prev: &GrayImage, curr: &GrayImage, pts: &[Point2<f64>], _params: &TrackerParams| {
            let (w, h) = (curr.width() as f64, curr.height() as f64);
            let points: Vec<_> = pts.iter().map(|p| Point2::new(p.x + dx, p.y + dy)).collect();
            let status = points
                .iter()
                .map(|q| q.x >= 0.0 && q.y >= 0.0 && q.x < w && q.y < h)
                .collect();
            TrackResult { points, status }
        }
    }

    #[test]
    fn working_scale_fits_and_never_upscales() {
        let cfg = ImageSamplingConfig::default();
        assert_eq!(working_scale(640, 480, &cfg), 0.25);
        assert_eq!(working_scale(1920, 1080, &cfg), 160.0 / 1920.0);
        assert_eq!(working_scale(100, 80, &cfg), 1.0);
    }

    #[test]
    fn grid_is_aspect_proportional_and_centred() {
        let (pts, (cols, rows)) = grid_points(160, 120, 15);
        assert_eq!((cols, rows), (20, 15));
        assert_eq!(pts.len(), 300);
        assert_eq!(pts[0], Point2::new(4.0, 4.0));
        assert_eq!(pts[21], Point2::new(12.0, 12.0));
        assert_eq!(pts[299], Point2::new(156.0, 116.0));
    }

    #[test]
    fn repack_keeps_tracked_pairs_in_order() {
        let prev: Vec<_> = (0..4).map(|i| Point2::new(i as f64, i as f64)).collect();
        let curr: Vec<_> = prev.iter().map(|p| Point2::new(p.x + 10.0, p.y)).collect();
        let data = repack(&prev, &curr, &[true, false, true, true]);

        assert_eq!(data.nrows(), 3);
        assert_eq!(source(&data, 1), prev[2]);
        assert_eq!(destination(&data, 2), curr[3]);
    }

    #[test]
    fn repack_treats_missing_status_as_lost() {
        let prev = [Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)];
        let curr = [Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)];
        assert_eq!(repack(&prev, &curr, &[true]).nrows(), 1);
    }

    #[test]
    fn rgb_input_is_converted_and_downscaled() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(640, 480, Rgb([200, 200, 200])));
        let gray = to_working_gray(&img, 0.25);
        assert_eq!(gray.dimensions(), (160, 120));
        assert_eq!(gray.get_pixel(80, 60), &Luma([200]));
    }

    #[test]
    fn pair_validation_reports_each_failure() {
        let g = DynamicImage::new_luma8(32, 24);
        assert!(matches!(
            check_image_pair(&g, &DynamicImage::new_luma8(32, 25)),
            Err(EstimationError::SizeMismatch { b_height: 25, .. })
        ));
        assert_eq!(
            check_image_pair(&g, &DynamicImage::new_rgb8(32, 24)),
            Err(EstimationError::FormatMismatch)
        );
        assert!(matches!(
            check_image_pair(&DynamicImage::new_luma16(32, 24), &DynamicImage::new_luma16(32, 24)),
            Err(EstimationError::UnsupportedFormat(_))
        ));
        assert_eq!(check_image_pair(&g, &g.clone()), Ok(()));
    }

    #[test]
    fn empty_images_are_rejected() {
        for (w, h) in [(0, 0), (0, 24), (32, 0)] {
            let img = DynamicImage::new_luma8(w, h);
            assert_eq!(
                check_image_pair(&img, &img.clone()),
                Err(EstimationError::EmptyImage {
                    width: w,
                    height: h
                })
            );
        }
    }

    #[test]
    fn scaled_extent_never_grows() {
        assert_eq!(scaled_dim(0, 1.0), 0);
        assert_eq!(scaled_dim(7, 1.0), 7);
        assert_eq!(scaled_dim(4000, 0.0001), 1);
        assert_eq!(scaled_dim(640, 0.25), 160);
    }

    #[test]
    fn zero_working_resolution_is_rejected_before_sampling() {
        let a = DynamicImage::new_luma8(320, 240);
        let cfg = ImageSamplingConfig {
            max_width: 0,
            ..ImageSamplingConfig::default()
        };
        assert!(matches!(
            sample_correspondences(&a, &a, &cfg, &shift_tracker(1.0, 0.0)),
            Err(EstimationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn sampling_tracks_grid_at_working_resolution() {
        let a = DynamicImage::new_luma8(320, 240);
        let b = a.clone();
        let cfg = ImageSamplingConfig::default();

        let out = sample_correspondences(&a, &b, &cfg, &shift_tracker(8.0, 0.0)).unwrap();

        assert_eq!(out.scale, 0.5);
        assert_eq!(out.grid, (20, 15));
        // The last column (x = 156) leaves the 160-wide frame.
        assert_eq!(out.data.nrows(), 19 * 15);
        for r in 0..out.data.nrows() {
            let (p, q) = (source(&out.data, r), destination(&out.data, r));
            assert_eq!(q.x - p.x, 8.0);
            assert_eq!(q.y, p.y);
        }
    }
}
