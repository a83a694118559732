use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::generator::partition_diagonal_lot_checked;
use crate::config::LotConfig;
use crate::error::ConfigError;
use crate::geometry::{Point2D, Polygon};

/// One parking space as stored in the lots file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParkingSpace {
    pub id: u32,
    pub coords: Polygon,
    pub occupied: bool,
}

/// A lot with its outline and spaces, in the shape map front ends read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lot {
    pub name: String,
    pub coords: [Point2D; 4],
    pub spaces: Vec<ParkingSpace>,
}

impl Lot {
    pub fn space(&self, id: u32) -> Option<&ParkingSpace> {
        self.spaces.iter().find(|s| s.id == id)
    }

    /// Record a new occupancy value for space `id`
    pub fn apply_occupancy(&mut self, id: u32, occupied: bool) -> Result<(), ConfigError> {
        let space = self
            .spaces
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(ConfigError::UnknownSpace(id))?;
        space.occupied = occupied;
        Ok(())
    }
}

/// Lay out a configured lot.
///
/// Spaces are numbered from 0, row 1 first, left to right, and all start
/// free.
pub fn build_lot(config: &LotConfig) -> Result<Lot, ConfigError> {
    let [a, b, c, d] = config.corners;
    let (row1, row2) = partition_diagonal_lot_checked(a, b, c, d, config.spaces_per_row)?;

    let spaces = row1
        .into_iter()
        .chain(row2)
        .zip(0u32..)
        .map(|(coords, id)| ParkingSpace {
            id,
            coords,
            occupied: false,
        })
        .collect();

    Ok(Lot {
        name: config.name.clone(),
        coords: config.corners,
        spaces,
    })
}

/// Write lots as an indented JSON array
pub fn write_lots(path: &Path, lots: &[Lot]) -> Result<()> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    lots.serialize(&mut serializer)
        .context("Failed to serialize lots")?;

    std::fs::write(path, buf).context(format!("Failed to write lots file: {:?}", path))
}

pub fn read_lots(path: &Path) -> Result<Vec<Lot>> {
    let contents =
        std::fs::read_to_string(path).context(format!("Failed to read lots file: {:?}", path))?;
    serde_json::from_str(&contents).context(format!("Failed to parse lots file: {:?}", path))
}

/// Read lots for display; a missing or broken file reads as no lots.
pub fn load_lots_or_empty(path: &Path) -> Vec<Lot> {
    match read_lots(path) {
        Ok(lots) => lots,
        Err(e) => {
            eprintln!("Warning: {:#}", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stadium() -> LotConfig {
        LotConfig {
            name: "Stadium Parking Lot".to_string(),
            corners: [
                Point2D::new(38.030907, -78.511921),
                Point2D::new(38.031354, -78.511280),
                Point2D::new(38.031283, -78.511202),
                Point2D::new(38.030836, -78.511848),
            ],
            spaces_per_row: 29,
        }
    }

    #[test]
    fn test_build_lot_numbers_spaces() {
        let lot = build_lot(&stadium()).unwrap();

        assert_eq!(lot.name, "Stadium Parking Lot");
        assert_eq!(lot.spaces.len(), 58);
        for (i, space) in lot.spaces.iter().enumerate() {
            assert_eq!(space.id, i as u32);
            assert!(!space.occupied);
            assert_eq!(space.coords.points().len(), 4);
        }
        // first space of row 2 starts at the left midline point
        let a = lot.coords[0];
        let d = lot.coords[3];
        assert_eq!(lot.spaces[29].coords.points()[0], a + (d - a) * 0.5);
    }

    #[test]
    fn test_build_lot_rejects_negative_rows() {
        let mut config = stadium();
        config.spaces_per_row = -2;
        assert_eq!(build_lot(&config), Err(ConfigError::NegativeRowCount(-2)));
    }

    #[test]
    fn test_apply_occupancy() {
        let mut lot = build_lot(&stadium()).unwrap();

        lot.apply_occupancy(3, true).unwrap();
        assert!(lot.space(3).unwrap().occupied);
        assert_eq!(
            lot.apply_occupancy(99, true),
            Err(ConfigError::UnknownSpace(99))
        );
    }

    #[test]
    fn test_record_json_shape() {
        let mut config = stadium();
        config.spaces_per_row = 1;
        let lot = build_lot(&config).unwrap();
        let json = serde_json::to_value(&lot).unwrap();

        assert_eq!(json["name"], "Stadium Parking Lot");
        assert_eq!(json["coords"].as_array().unwrap().len(), 4);
        assert_eq!(json["coords"][0][0], 38.030907);
        assert_eq!(json["spaces"][1]["id"], 1);
        assert_eq!(json["spaces"][1]["occupied"], false);
        assert_eq!(json["spaces"][1]["coords"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_write_then_read_lots() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lots.json");
        let lots = vec![build_lot(&stadium()).unwrap()];

        write_lots(&path, &lots).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("[\n    {"));

        assert_eq!(read_lots(&path).unwrap(), lots);
    }

    #[test]
    fn test_load_lots_or_empty_on_bad_input() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(load_lots_or_empty(&missing).is_empty());

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{not json").unwrap();
        assert!(load_lots_or_empty(&broken).is_empty());
    }
}
