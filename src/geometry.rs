//! Small geometric predicates used while sampling and scoring.

use std::borrow::Borrow;

use nalgebra::Point2;

/// Relative tolerance on `|e1 x e2| / (|e1| |e2|)` below which a triple is
/// treated as collinear.
pub const COLLINEARITY_EPS: f64 = 0.01;

/// L1 distance below which two points are considered the same point.
pub const COINCIDENCE_EPS: f64 = f32::EPSILON as f64;

/// Axis-aligned rectangle with continuous extents.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Larger of the two extents.
    pub fn max_extent(&self) -> f64 {
        self.width.max(self.height)
    }
}

fn is_collinear(p0: &Point2<f64>, p1: &Point2<f64>, p2: &Point2<f64>) -> bool {
    let e1 = p1 - p0;
    let e2 = p2 - p0;
    let cross = e1.x * e2.y - e1.y * e2.x;
    cross.abs() < COLLINEARITY_EPS * e1.norm() * e2.norm()
}

/// True when either the source triple `a` or the destination triple `b` is
/// (nearly) collinear.
///
/// A triple with a repeated point has a zero edge and is not caught here;
/// see [`is_coincident`].
pub fn is_degenerate_sample(
    a0: &Point2<f64>,
    a1: &Point2<f64>,
    a2: &Point2<f64>,
    b0: &Point2<f64>,
    b1: &Point2<f64>,
    b2: &Point2<f64>,
) -> bool {
    is_collinear(a0, a1, a2) || is_collinear(b0, b1, b2)
}

/// True when `p` and `q` are within [`COINCIDENCE_EPS`] in L1 distance.
pub fn is_coincident(p: &Point2<f64>, q: &Point2<f64>) -> bool {
    (p.x - q.x).abs() + (p.y - q.y).abs() < COINCIDENCE_EPS
}

/// Axis-aligned bounding box of `points`. Empty input yields a zero rect.
pub fn bounding_box<I, P>(points: I) -> Rect
where
    I: IntoIterator<Item = P>,
    P: Borrow<Point2<f64>>,
{
    let mut iter = points.into_iter();
    let Some(first) = iter.next() else {
        return Rect::default();
    };
    let first = *first.borrow();

    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in iter {
        let p = p.borrow();
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }

    Rect {
        x: min_x,
        y: min_y,
        width: max_x - min_x,
        height: max_y - min_y,
    }
}
