use crate::error::ConfigError;
use crate::geometry::{Point2D, Polygon};

/// Relative tolerance for the zero-area and collinearity checks
const DEGENERATE_EPS: f64 = 1e-9;

/// Return `n + 1` evenly spaced points from `p1` to `p2`, both inclusive.
///
/// Point `i` is `p1 + (p2 - p1) * i / n`; the last point is exactly `p2`.
/// For `n == 0` the result is just `[p1]`.
pub fn interpolate(p1: Point2D, p2: Point2D, n: u32) -> Vec<Point2D> {
    if n == 0 {
        return vec![p1];
    }

    let delta = p2 - p1;
    let mut points: Vec<Point2D> = (0..n)
        .map(|i| p1 + delta * (i as f64 / n as f64))
        .collect();
    points.push(p2);
    points
}

/// Split a diagonal quadrilateral lot into two rows of `n_row` spaces each.
///
/// Corners `a, b, c, d` are expected in consistent (clockwise) order: `a -> b`
/// is the top edge and `d -> c` the bottom edge. The lot is halved along the
/// line joining the midpoints of `a -> d` and `b -> c`. Row 1 lies between
/// the top edge and that midline, row 2 between the midline and the bottom
/// edge. Both rows are built from the same midline points, so row 1's lower
/// edge and row 2's upper edge are bit-identical and the rows sit flush.
///
/// Each space is `[top-left, top-right, bottom-right, bottom-left]` of its
/// row, and spaces are ordered left to right (from the `a`/`d` side).
///
/// The winding of the corners is not checked; mixed-up corners give a
/// geometrically odd layout rather than an error. Duplicate, non-finite or
/// collinear corners and zero-area lots are rejected.
pub fn partition_diagonal_lot(
    a: Point2D,
    b: Point2D,
    c: Point2D,
    d: Point2D,
    n_row: u32,
) -> Result<(Vec<Polygon>, Vec<Polygon>), ConfigError> {
    validate_corners(&[a, b, c, d])?;

    let mid_left = a + (d - a) * 0.5;
    let mid_right = b + (c - b) * 0.5;

    let top = interpolate(a, b, n_row);
    let mid = interpolate(mid_left, mid_right, n_row);
    let bottom = interpolate(d, c, n_row);

    let row1 = (0..n_row as usize)
        .map(|i| Polygon::quad([top[i], top[i + 1], mid[i + 1], mid[i]]))
        .collect();
    let row2 = (0..n_row as usize)
        .map(|i| Polygon::quad([mid[i], mid[i + 1], bottom[i + 1], bottom[i]]))
        .collect();

    Ok((row1, row2))
}

/// Same as [`partition_diagonal_lot`] for row counts from untrusted input
pub fn partition_diagonal_lot_checked(
    a: Point2D,
    b: Point2D,
    c: Point2D,
    d: Point2D,
    n_row: i64,
) -> Result<(Vec<Polygon>, Vec<Polygon>), ConfigError> {
    let n_row = u32::try_from(n_row).map_err(|_| ConfigError::NegativeRowCount(n_row))?;
    partition_diagonal_lot(a, b, c, d, n_row)
}

fn validate_corners(corners: &[Point2D; 4]) -> Result<(), ConfigError> {
    if corners.iter().any(|p| !p.is_finite()) {
        return Err(ConfigError::DegenerateLot("non-finite corner coordinate"));
    }

    for i in 0..corners.len() {
        for j in (i + 1)..corners.len() {
            if corners[i] == corners[j] {
                return Err(ConfigError::DegenerateLot("duplicate corners"));
            }
        }
    }

    // any three corners on one line leave at most a triangle
    for skip in 0..corners.len() {
        let mut triple = corners.iter().enumerate().filter(|&(k, _)| k != skip);
        if let (Some((_, &p)), Some((_, &q)), Some((_, &r))) =
            (triple.next(), triple.next(), triple.next())
        {
            let scale = p.distance(q) * p.distance(r);
            if p.cross(q, r).abs() <= DEGENERATE_EPS * scale {
                return Err(ConfigError::DegenerateLot("collinear corners"));
            }
        }
    }

    let outline = Polygon::quad(*corners);
    let bounds = outline.bounds();
    let extent = bounds.width().max(bounds.height());
    if outline.area() <= DEGENERATE_EPS * extent * extent {
        return Err(ConfigError::DegenerateLot("zero area"));
    }

    Ok(())
}
