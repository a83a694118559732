//! Adapter between a vision model's output and the occupancy evaluator.
//!
//! The detector itself runs out of process and leaves its boxes in a JSON
//! file. This module parses that file and applies the class and confidence
//! filters, so the evaluator only ever sees shapes that should count.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::Path;

use crate::geometry::{Point2D, Polygon, Rectangle};

/// COCO class ids counted as vehicles: car, motorcycle, bus, truck
pub const VEHICLE_CLASSES: [u32; 4] = [2, 3, 5, 7];

/// Human-readable name for a COCO vehicle class id
pub fn class_name(class_id: u32) -> &'static str {
    match class_id {
        2 => "car",
        3 => "motorcycle",
        5 => "bus",
        7 => "truck",
        _ => "other",
    }
}

/// One candidate object in a frame
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub shape: Polygon,
    pub confidence: f64,
    pub class_id: u32,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawShape {
    Corners { xyxy: [f64; 4] },
    Outline { polygon: Vec<Point2D> },
}

#[derive(Debug, Deserialize)]
struct RawDetection {
    #[serde(flatten)]
    shape: RawShape,
    confidence: f64,
    class_id: u32,
}

impl RawDetection {
    fn into_detection(self, index: usize) -> Result<Detection> {
        let shape = match self.shape {
            RawShape::Corners { xyxy: [x1, y1, x2, y2] } => {
                let rect = Rectangle::from_corners(x1, y1, x2, y2);
                // width can overflow even when every corner is finite
                if !(rect.width.is_finite() && rect.height.is_finite()) {
                    bail!("Detection {} has a non-finite box: {:?}", index, [x1, y1, x2, y2]);
                }
                rect.to_polygon()
            }
            RawShape::Outline { polygon } => Polygon::new(polygon)
                .context(format!("Detection {} has an invalid polygon", index))?,
        };
        if !shape.is_finite() {
            bail!("Detection {} has non-finite coordinates", index);
        }

        Ok(Detection {
            shape,
            confidence: self.confidence,
            class_id: self.class_id,
        })
    }
}

/// Parse detector output.
///
/// Accepts a JSON array whose entries carry either an `xyxy` box or a
/// `polygon` outline, plus `confidence` and `class_id`.
pub fn parse_detections(json: &str) -> Result<Vec<Detection>> {
    let raw: Vec<RawDetection> =
        serde_json::from_str(json).context("Failed to parse detections JSON")?;

    raw.into_iter()
        .enumerate()
        .map(|(i, r)| r.into_detection(i))
        .collect()
}

pub fn read_detections(path: &Path) -> Result<Vec<Detection>> {
    let contents = std::fs::read_to_string(path)
        .context(format!("Failed to read detections file: {:?}", path))?;
    parse_detections(&contents)
}

/// Class and confidence gate applied before the overlap test
#[derive(Debug, Clone)]
pub struct DetectionFilter {
    pub min_confidence: f64,
    pub classes: Vec<u32>,
}

impl DetectionFilter {
    pub fn new(min_confidence: f64, classes: Vec<u32>) -> Self {
        Self {
            min_confidence,
            classes,
        }
    }

    pub fn accepts(&self, detection: &Detection) -> bool {
        detection.confidence >= self.min_confidence && self.classes.contains(&detection.class_id)
    }

    /// Keep the accepted detections, in input order
    pub fn apply<'a>(&self, detections: &'a [Detection]) -> Vec<&'a Detection> {
        detections.iter().filter(|d| self.accepts(d)).collect()
    }
}

impl Default for DetectionFilter {
    fn default() -> Self {
        Self::new(0.35, VEHICLE_CLASSES.to_vec())
    }
}
