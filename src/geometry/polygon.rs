use geo::{Area, BooleanOps, IsConvex, LineString};
use serde::{Deserialize, Serialize};

use super::{Bounds, Point2D};
use crate::error::ConfigError;

/// Axis-aligned box given by its top-left corner and size.
///
/// Used for the monitored spot and for detector bounding boxes. The
/// constructor does not validate; [`Rectangle::is_valid`] checks for strictly
/// positive, finite dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rectangle {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build from two opposite corners (detector `xyxy` format). Corner order
    /// does not matter.
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        let (left, right) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let (top, bottom) = if y1 <= y2 { (y1, y2) } else { (y2, y1) };
        Self::new(left, top, right - left, bottom - top)
    }

    /// Positive, finite size and finite corners
    pub fn is_valid(&self) -> bool {
        let area = self.area();
        self.width > 0.0
            && self.height > 0.0
            && area.is_finite()
            && area > 0.0
            && self.corners().iter().all(|p| p.is_finite())
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// The four corners, starting top-left and going through top-right
    pub fn corners(&self) -> [Point2D; 4] {
        let (x2, y2) = (self.x + self.width, self.y + self.height);
        [
            Point2D::new(self.x, self.y),
            Point2D::new(x2, self.y),
            Point2D::new(x2, y2),
            Point2D::new(self.x, y2),
        ]
    }

    pub fn to_polygon(&self) -> Polygon {
        Polygon::quad(self.corners())
    }
}

/// Closed polygon with at least three vertices.
///
/// Vertex order is kept as given so renderers can draw spaces in a stable
/// winding, but area and intersection area do not depend on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point2D>", into = "Vec<Point2D>")]
pub struct Polygon {
    points: Vec<Point2D>,
}

impl Polygon {
    pub fn new(points: Vec<Point2D>) -> Result<Self, ConfigError> {
        if points.len() < 3 {
            return Err(ConfigError::TooFewVertices(points.len()));
        }
        Ok(Self { points })
    }

    pub(crate) fn quad(points: [Point2D; 4]) -> Self {
        Self {
            points: points.to_vec(),
        }
    }

    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    pub fn bounds(&self) -> Bounds {
        // at least 3 points by construction
        Bounds::from_points(&self.points).unwrap_or(Bounds {
            min_x: 0.0,
            max_x: 0.0,
            min_y: 0.0,
            max_y: 0.0,
        })
    }

    /// Positive when the vertices run counter-clockwise in a y-up frame
    pub fn signed_area(&self) -> f64 {
        ring_signed_area(&self.points)
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    pub fn is_finite(&self) -> bool {
        self.points.iter().all(|p| p.is_finite())
    }

    pub fn is_convex(&self) -> bool {
        to_geo(&self.points).exterior().is_convex()
    }

    /// Clip this polygon against a convex `clip` polygon (Sutherland-Hodgman).
    ///
    /// Returns the vertices of the clipped region, which may be empty. `clip`
    /// may be wound either way; a zero-area clip yields nothing.
    pub fn clip_to_convex(&self, clip: &Polygon) -> Result<Vec<Point2D>, ConfigError> {
        if !clip.is_convex() {
            return Err(ConfigError::NonConvexClip);
        }
        let subject = clip_to_bounds(&self.points, &clip.bounds());
        Ok(clip_convex_unchecked(subject, clip))
    }

    /// Area shared by this polygon and `clip`.
    ///
    /// The subject is first cut down to `clip`'s bounding box with exact
    /// axis snapping, so huge shapes around a small clip keep full precision.
    /// Convex clips finish with Sutherland-Hodgman, others with `geo`'s
    /// boolean intersection.
    pub fn intersection_area(&self, clip: &Polygon) -> f64 {
        let clip_bounds = clip.bounds();
        if !self.is_finite() || !clip.is_finite() || !self.bounds().overlaps(&clip_bounds) {
            return 0.0;
        }

        let subject = clip_to_bounds(&self.points, &clip_bounds);
        if subject.len() < 3 {
            return 0.0;
        }

        let area = if clip.is_convex() {
            let clipped = clip_convex_unchecked(subject, clip);
            if clipped.len() < 3 {
                return 0.0;
            }
            ring_signed_area(&clipped).abs()
        } else {
            to_geo(&subject)
                .intersection(&to_geo(&clip.points))
                .unsigned_area()
        };

        if area.is_finite() { area } else { 0.0 }
    }
}

fn clip_convex_unchecked(subject: Vec<Point2D>, clip: &Polygon) -> Vec<Point2D> {
    let orientation = clip.signed_area().signum();
    if orientation == 0.0 || !orientation.is_finite() {
        return Vec::new();
    }

    let edges = clip.points.len();
    let mut output = subject;

    for i in 0..edges {
        let edge_start = clip.points[i];
        let edge_end = clip.points[(i + 1) % edges];
        let input = std::mem::take(&mut output);

        let Some(&last) = input.last() else {
            break;
        };

        let side = |p: Point2D| edge_start.cross(edge_end, p) * orientation;
        let mut prev = last;
        let mut prev_side = side(prev);

        for &current in &input {
            let current_side = side(current);
            let current_inside = current_side >= 0.0;
            let prev_inside = prev_side >= 0.0;

            if current_inside != prev_inside {
                // sides differ in sign, so the denominator is non-zero
                let t = prev_side / (prev_side - current_side);
                output.push(prev.lerp(current, t));
            }
            if current_inside {
                output.push(current);
            }

            prev = current;
            prev_side = current_side;
        }
    }

    output
}

#[derive(Clone, Copy)]
enum Limit {
    MinX(f64),
    MaxX(f64),
    MinY(f64),
    MaxY(f64),
}

impl Limit {
    fn inside(self, p: Point2D) -> bool {
        match self {
            Limit::MinX(v) => p.x >= v,
            Limit::MaxX(v) => p.x <= v,
            Limit::MinY(v) => p.y >= v,
            Limit::MaxY(v) => p.y <= v,
        }
    }

    /// Crossing of segment `a -> b` with the limit line; the limited
    /// coordinate is set exactly rather than interpolated.
    fn crossing(self, a: Point2D, b: Point2D) -> Point2D {
        match self {
            Limit::MinX(v) | Limit::MaxX(v) => {
                let t = (v - a.x) / (b.x - a.x);
                Point2D::new(v, a.y + (b.y - a.y) * t)
            }
            Limit::MinY(v) | Limit::MaxY(v) => {
                let t = (v - a.y) / (b.y - a.y);
                Point2D::new(a.x + (b.x - a.x) * t, v)
            }
        }
    }
}

/// Sutherland-Hodgman against the four sides of `bounds`
fn clip_to_bounds(points: &[Point2D], bounds: &Bounds) -> Vec<Point2D> {
    let limits = [
        Limit::MinX(bounds.min_x),
        Limit::MaxX(bounds.max_x),
        Limit::MinY(bounds.min_y),
        Limit::MaxY(bounds.max_y),
    ];

    let mut output = points.to_vec();
    for limit in limits {
        let input = std::mem::take(&mut output);
        let Some(&last) = input.last() else {
            break;
        };

        let mut prev = last;
        for &current in &input {
            let current_inside = limit.inside(current);
            if current_inside != limit.inside(prev) {
                output.push(limit.crossing(prev, current));
            }
            if current_inside {
                output.push(current);
            }
            prev = current;
        }
    }
    output
}

impl TryFrom<Vec<Point2D>> for Polygon {
    type Error = ConfigError;

    fn try_from(points: Vec<Point2D>) -> Result<Self, Self::Error> {
        Polygon::new(points)
    }
}

impl From<Polygon> for Vec<Point2D> {
    fn from(polygon: Polygon) -> Self {
        polygon.points
    }
}

impl From<Rectangle> for Polygon {
    fn from(rect: Rectangle) -> Self {
        rect.to_polygon()
    }
}

fn to_geo(points: &[Point2D]) -> geo::Polygon<f64> {
    let ring: LineString<f64> = points.iter().map(|&p| geo::Coord::from(p)).collect();
    geo::Polygon::new(ring, Vec::new())
}

fn ring_signed_area(points: &[Point2D]) -> f64 {
    to_geo(points).signed_area()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f64, y: f64, size: f64) -> Polygon {
        Rectangle::new(x, y, size, size).to_polygon()
    }

    #[test]
    fn test_polygon_requires_three_points() {
        let err = Polygon::new(vec![Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0)]).unwrap_err();
        assert_eq!(err, ConfigError::TooFewVertices(2));
    }

    #[test]
    fn test_rectangle_from_corners_normalizes() {
        let rect = Rectangle::from_corners(10.0, 5.0, 0.0, 0.0);
        assert_eq!(rect, Rectangle::new(0.0, 0.0, 10.0, 5.0));
        assert_eq!(rect.area(), 50.0);
    }

    #[test]
    fn test_rectangle_validity() {
        assert!(Rectangle::new(0.0, 0.0, 1.0, 1.0).is_valid());
        assert!(!Rectangle::new(0.0, 0.0, 0.0, 1.0).is_valid());
        assert!(!Rectangle::new(0.0, 0.0, 1.0, -1.0).is_valid());
        assert!(!Rectangle::new(0.0, 0.0, f64::NAN, 1.0).is_valid());
    }

    #[test]
    fn test_area_ignores_winding() {
        let ccw = square(0.0, 0.0, 2.0);
        let mut reversed: Vec<Point2D> = ccw.points().to_vec();
        reversed.reverse();
        let cw = Polygon::new(reversed).unwrap();

        assert_eq!(ccw.area(), 4.0);
        assert_eq!(cw.area(), 4.0);
        assert_eq!(ccw.signed_area(), -cw.signed_area());
    }

    #[test]
    fn test_intersection_partial_overlap() {
        let roi = square(0.0, 0.0, 10.0);
        let det = Rectangle::new(5.0, 5.0, 10.0, 10.0).to_polygon();

        assert!((det.intersection_area(&roi) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_intersection_contained() {
        let roi = square(0.0, 0.0, 10.0);
        let inner = square(2.0, 2.0, 3.0);
        let outer = square(-5.0, -5.0, 30.0);

        assert!((inner.intersection_area(&roi) - 9.0).abs() < 1e-9);
        assert!((outer.intersection_area(&roi) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_intersection_disjoint_and_touching() {
        let roi = square(0.0, 0.0, 10.0);

        assert_eq!(square(20.0, 20.0, 5.0).intersection_area(&roi), 0.0);
        assert_eq!(square(10.0, 0.0, 5.0).intersection_area(&roi), 0.0);
    }

    #[test]
    fn test_intersection_with_rotated_clip() {
        // diamond inscribed in the 2x2 square centred at (1, 1)
        let diamond = Polygon::new(vec![
            Point2D::new(1.0, 0.0),
            Point2D::new(2.0, 1.0),
            Point2D::new(1.0, 2.0),
            Point2D::new(0.0, 1.0),
        ])
        .unwrap();
        let square = square(0.0, 0.0, 2.0);

        assert!((square.intersection_area(&diamond) - 2.0).abs() < 1e-9);
        assert!((diamond.intersection_area(&square) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_clip_against_clockwise_clip() {
        let roi = square(0.0, 0.0, 10.0);
        let mut cw_points = roi.points().to_vec();
        cw_points.reverse();
        let cw_roi = Polygon::new(cw_points).unwrap();
        let det = Rectangle::new(0.0, 0.0, 10.0, 5.0).to_polygon();

        assert_eq!(det.intersection_area(&cw_roi), 50.0);
    }

    #[test]
    fn test_rectangle_rejects_overflowing_area() {
        assert!(!Rectangle::new(0.0, 0.0, 1e200, 1e200).is_valid());
        assert!(!Rectangle::new(f64::MAX, 0.0, f64::MAX, 1.0).is_valid());
        assert!(!Rectangle::new(0.0, 0.0, 1e-200, 1e-200).is_valid());
    }

    #[test]
    fn test_huge_subject_keeps_precision() {
        let roi = square(0.0, 0.0, 10.0);
        let huge = Rectangle::from_corners(-1e200, -1e200, 1e200, 1e200).to_polygon();

        assert_eq!(huge.intersection_area(&roi), 100.0);
    }

    #[test]
    fn test_intersection_with_concave_clip() {
        // U shape: 10x13 block with a 4x10 notch cut from the top, area 90
        let u_shape = Polygon::new(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(10.0, 0.0),
            Point2D::new(10.0, 13.0),
            Point2D::new(7.0, 13.0),
            Point2D::new(7.0, 3.0),
            Point2D::new(3.0, 3.0),
            Point2D::new(3.0, 13.0),
            Point2D::new(0.0, 13.0),
        ])
        .unwrap();
        assert!(!u_shape.is_convex());
        assert!((u_shape.area() - 90.0).abs() < 1e-9);

        let big = square(-100.0, -100.0, 300.0);
        assert!((big.intersection_area(&u_shape) - 90.0).abs() < 1e-6);

        // full width below the notch floor, then only the two arms
        let band = Rectangle::new(0.0, 2.0, 10.0, 2.0).to_polygon();
        assert!((band.intersection_area(&u_shape) - 16.0).abs() < 1e-6);
    }

    #[test]
    fn test_clip_to_convex_rejects_concave_clip() {
        let arrow = Polygon::new(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(4.0, 2.0),
            Point2D::new(0.0, 4.0),
            Point2D::new(1.0, 2.0),
        ])
        .unwrap();
        let subject = square(0.0, 0.0, 4.0);

        assert_eq!(
            subject.clip_to_convex(&arrow),
            Err(ConfigError::NonConvexClip)
        );
        assert!(subject.clip_to_convex(&square(1.0, 1.0, 2.0)).is_ok());
    }

    #[test]
    fn test_polygon_deserialize_validates() {
        let ok: Polygon = serde_json::from_str("[[0,0],[1,0],[1,1]]").unwrap();
        assert_eq!(ok.points().len(), 3);

        let bad: Result<Polygon, _> = serde_json::from_str("[[0,0],[1,0]]");
        assert!(bad.is_err());
    }
}
