//! Core shared types for correspondence data.
//!
//! Correspondences are stored row-wise in a dense `nalgebra` matrix so that
//! estimators, samplers and scoring can all address them by row index, the
//! same way regardless of whether they came from point arrays or from image
//! sampling.

use nalgebra::{DMatrix, Point2};

use crate::error::EstimationError;

/// Dynamic matrix of `f64` holding one correspondence per row:
/// `[src.x, src.y, dst.x, dst.y]`.
pub type DataMatrix = DMatrix<f64>;

/// Number of columns in a correspondence [`DataMatrix`].
pub const CORRESPONDENCE_COLS: usize = 4;

/// A source point paired with the point it was observed at in the destination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correspondence {
    pub source: Point2<f64>,
    pub destination: Point2<f64>,
}

impl Correspondence {
    pub fn new(source: Point2<f64>, destination: Point2<f64>) -> Self {
        Self {
            source,
            destination,
        }
    }
}

/// Source point of row `row`.
#[inline]
pub fn source(data: &DataMatrix, row: usize) -> Point2<f64> {
    Point2::new(data[(row, 0)], data[(row, 1)])
}

/// Destination point of row `row`.
#[inline]
pub fn destination(data: &DataMatrix, row: usize) -> Point2<f64> {
    Point2::new(data[(row, 2)], data[(row, 3)])
}

/// Pack two equal-length point arrays into a correspondence matrix.
pub fn pack_points(
    src: &[Point2<f64>],
    dst: &[Point2<f64>],
) -> Result<DataMatrix, EstimationError> {
    if src.len() != dst.len() {
        return Err(EstimationError::LengthMismatch {
            src: src.len(),
            dst: dst.len(),
        });
    }

    let mut data = DataMatrix::zeros(src.len(), CORRESPONDENCE_COLS);
    for (i, (a, b)) in src.iter().zip(dst).enumerate() {
        data[(i, 0)] = a.x;
        data[(i, 1)] = a.y;
        data[(i, 2)] = b.x;
        data[(i, 3)] = b.y;
    }
    Ok(data)
}

/// Pack a slice of [`Correspondence`] values into a correspondence matrix.
pub fn pack_correspondences(pairs: &[Correspondence]) -> DataMatrix {
    DataMatrix::from_fn(pairs.len(), CORRESPONDENCE_COLS, |r, c| {
        let p = &pairs[r];
        match c {
            0 => p.source.x,
            1 => p.source.y,
            2 => p.destination.x,
            _ => p.destination.y,
        }
    })
}
