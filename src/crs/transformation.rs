use crate::core::point::Point;
use serde::{Deserialize, Serialize};

/// A 4-coefficient affine transformation between a projection's world
/// coordinates and pixel space:
///
/// `transform(p, scale) = (scale * (a * p.x + b), scale * (c * p.y + d))`
///
/// Reusable by any CRS; the coefficients encode the flip and offset that
/// move the projected world into the positive pixel quadrant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transformation {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl Transformation {
    pub fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self { a, b, c, d }
    }

    /// Applies the forward transformation at the given scale
    pub fn transform(&self, point: &Point, scale: f64) -> Point {
        Point::new(
            scale * (self.a * point.x + self.b),
            scale * (self.c * point.y + self.d),
        )
    }

    /// Applies the inverse transformation at the given scale
    pub fn untransform(&self, point: &Point, scale: f64) -> Point {
        Point::new(
            (point.x / scale - self.b) / self.a,
            (point.y / scale - self.d) / self.c,
        )
    }
}
