use crate::error::ConfigError;
use crate::geometry::{Polygon, Rectangle};

/// Verdict for one frame plus the overlap ratio of every detection
#[derive(Debug, Clone, PartialEq)]
pub struct OccupancyResult {
    pub occupied: bool,
    /// Intersection area / ROI area per detection, in input order
    pub ratios: Vec<f64>,
}

/// Decide whether `roi` is occupied by any of `detections`.
///
/// Each detection's ratio is the area it shares with the ROI divided by the
/// ROI's area. The spot is occupied when at least one ratio is strictly above
/// `threshold`. Ratios are never summed, so several small overlaps do not
/// add up to an occupied spot.
///
/// An empty detection list is a normal frame and yields `occupied = false`.
pub fn evaluate_occupancy(
    roi: &Rectangle,
    detections: &[Polygon],
    threshold: f64,
) -> Result<OccupancyResult, ConfigError> {
    validate(roi, threshold)?;
    Ok(evaluate_unchecked(roi, detections, threshold))
}

fn validate(roi: &Rectangle, threshold: f64) -> Result<(), ConfigError> {
    if !roi.is_valid() {
        return Err(ConfigError::InvalidRoi {
            width: roi.width,
            height: roi.height,
        });
    }
    if !(threshold > 0.0 && threshold <= 1.0) {
        return Err(ConfigError::InvalidThreshold(threshold));
    }
    Ok(())
}

fn evaluate_unchecked(roi: &Rectangle, detections: &[Polygon], threshold: f64) -> OccupancyResult {
    let roi_area = roi.area();
    let roi_shape = roi.to_polygon();

    let ratios: Vec<f64> = detections
        .iter()
        .map(|d| overlap_ratio(d.intersection_area(&roi_shape), roi_area))
        .collect();
    let occupied = ratios.iter().any(|&r| r > threshold);

    OccupancyResult { occupied, ratios }
}

/// NaN (from a non-finite detection) counts as no overlap
fn overlap_ratio(shared: f64, roi_area: f64) -> f64 {
    let ratio = shared / roi_area;
    if ratio.is_nan() {
        0.0
    } else {
        ratio.clamp(0.0, 1.0)
    }
}

/// A validated spot and threshold, built once from configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OccupancyEvaluator {
    roi: Rectangle,
    threshold: f64,
}

impl OccupancyEvaluator {
    pub fn new(roi: Rectangle, threshold: f64) -> Result<Self, ConfigError> {
        validate(&roi, threshold)?;
        Ok(Self { roi, threshold })
    }

    pub fn roi(&self) -> &Rectangle {
        &self.roi
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn evaluate(&self, detections: &[Polygon]) -> OccupancyResult {
        evaluate_unchecked(&self.roi, detections, self.threshold)
    }
}
