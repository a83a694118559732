use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// A 2D coordinate.
///
/// The unit system (image pixels, geographic degrees) is up to the caller and
/// only has to be consistent within one call. Serializes as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point at parameter `t` along the segment `self -> other`
    pub fn lerp(self, other: Point2D, t: f64) -> Point2D {
        self + (other - self) * t
    }

    /// z component of `(a - self) x (b - self)`
    pub fn cross(self, a: Point2D, b: Point2D) -> f64 {
        (a.x - self.x) * (b.y - self.y) - (a.y - self.y) * (b.x - self.x)
    }

    pub fn distance(self, other: Point2D) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point2D {
    type Output = Point2D;

    fn add(self, rhs: Point2D) -> Point2D {
        Point2D::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point2D {
    type Output = Point2D;

    fn sub(self, rhs: Point2D) -> Point2D {
        Point2D::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point2D {
    type Output = Point2D;

    fn mul(self, rhs: f64) -> Point2D {
        Point2D::new(self.x * rhs, self.y * rhs)
    }
}

impl From<[f64; 2]> for Point2D {
    fn from([x, y]: [f64; 2]) -> Self {
        Point2D::new(x, y)
    }
}

impl From<Point2D> for [f64; 2] {
    fn from(p: Point2D) -> Self {
        [p.x, p.y]
    }
}

impl From<Point2D> for geo::Coord<f64> {
    fn from(p: Point2D) -> Self {
        geo::coord! { x: p.x, y: p.y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_arithmetic() {
        let a = Point2D::new(1.0, 2.0);
        let b = Point2D::new(4.0, 6.0);

        assert_eq!(a + b, Point2D::new(5.0, 8.0));
        assert_eq!(b - a, Point2D::new(3.0, 4.0));
        assert_eq!((b - a) * 0.5, Point2D::new(1.5, 2.0));
        assert_eq!(a.distance(b), 5.0);
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Point2D::new(0.0, 0.0);
        let b = Point2D::new(2.0, -4.0);

        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 0.5), Point2D::new(1.0, -2.0));
    }

    #[test]
    fn test_cross_sign() {
        let o = Point2D::new(0.0, 0.0);
        assert!(o.cross(Point2D::new(1.0, 0.0), Point2D::new(0.0, 1.0)) > 0.0);
        assert!(o.cross(Point2D::new(0.0, 1.0), Point2D::new(1.0, 0.0)) < 0.0);
        assert_eq!(o.cross(Point2D::new(1.0, 1.0), Point2D::new(2.0, 2.0)), 0.0);
    }

    #[test]
    fn test_serializes_as_pair() {
        let p = Point2D::new(38.030907, -78.511921);
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "[38.030907,-78.511921]");

        let back: Point2D = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}
