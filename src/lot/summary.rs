use super::record::Lot;
use crate::geometry::Point2D;

/// Colour tier for a lot's overview marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryColor {
    Green,
    Orange,
    Red,
}

impl SummaryColor {
    /// Red above 80% occupancy, orange above 50%, green otherwise
    pub fn from_occupancy_rate(rate: f64) -> Self {
        if rate > 0.8 {
            SummaryColor::Red
        } else if rate > 0.5 {
            SummaryColor::Orange
        } else {
            SummaryColor::Green
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryColor::Green => "green",
            SummaryColor::Orange => "orange",
            SummaryColor::Red => "red",
        }
    }
}

/// Aggregate view of one lot for the zoomed-out map
#[derive(Debug, Clone, PartialEq)]
pub struct LotSummary {
    pub name: String,
    pub total: usize,
    pub occupied: usize,
    pub available: usize,
    /// Fraction of spaces taken; 0 for a lot without spaces
    pub occupancy_rate: f64,
    /// Percentage of spaces free; 0 for a lot without spaces
    pub percent_open: f64,
    pub color: SummaryColor,
    /// Mean of the four outline corners
    pub label_position: Point2D,
}

impl LotSummary {
    pub fn from_lot(lot: &Lot) -> Self {
        let total = lot.spaces.len();
        let occupied = lot.spaces.iter().filter(|s| s.occupied).count();
        let available = total - occupied;

        let (occupancy_rate, percent_open) = if total > 0 {
            (
                occupied as f64 / total as f64,
                available as f64 / total as f64 * 100.0,
            )
        } else {
            (0.0, 0.0)
        };

        let corner_sum = lot
            .coords
            .iter()
            .fold(Point2D::new(0.0, 0.0), |acc, &p| acc + p);

        Self {
            name: lot.name.clone(),
            total,
            occupied,
            available,
            occupancy_rate,
            percent_open,
            color: SummaryColor::from_occupancy_rate(occupancy_rate),
            label_position: corner_sum * 0.25,
        }
    }
}
