use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Timestamp layout used in status records and their file names
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpotState {
    Occupied,
    Free,
}

impl SpotState {
    pub fn from_occupied(occupied: bool) -> Self {
        if occupied {
            SpotState::Occupied
        } else {
            SpotState::Free
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SpotState::Occupied => "occupied",
            SpotState::Free => "free",
        }
    }
}

impl fmt::Display for SpotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timestamped verdict for one frame, as written to disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotStatus {
    pub timestamp: String,
    pub status: SpotState,
}

impl SpotStatus {
    pub fn new(occupied: bool, at: DateTime<Local>) -> Self {
        Self {
            timestamp: at.format(TIMESTAMP_FORMAT).to_string(),
            status: SpotState::from_occupied(occupied),
        }
    }

    pub fn now(occupied: bool) -> Self {
        Self::new(occupied, Local::now())
    }

    pub fn file_name(&self) -> String {
        format!("spot_{}.json", self.timestamp)
    }
}

/// Write `status` as `spot_<timestamp>.json` inside `dir`, creating `dir`
/// if needed. Returns the written path.
pub fn write_status(dir: &Path, status: &SpotStatus) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).context(format!("Failed to create output dir: {:?}", dir))?;

    let path = dir.join(status.file_name());
    let json = serde_json::to_string_pretty(status).context("Failed to serialize spot status")?;
    std::fs::write(&path, json).context(format!("Failed to write status file: {:?}", path))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 10, 10, 14, 5, 9).unwrap()
    }

    #[test]
    fn test_status_record_shape() {
        let status = SpotStatus::new(true, fixed_time());
        let json = serde_json::to_value(&status).unwrap();

        assert_eq!(json["timestamp"], "20251010_140509");
        assert_eq!(json["status"], "occupied");
        assert_eq!(status.file_name(), "spot_20251010_140509.json");
    }

    #[test]
    fn test_free_state() {
        let status = SpotStatus::new(false, fixed_time());
        assert_eq!(status.status, SpotState::Free);
        assert_eq!(status.status.to_string(), "free");
    }

    #[test]
    fn test_write_status_creates_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("spot_out");
        let status = SpotStatus::new(false, fixed_time());

        let path = write_status(&out, &status).unwrap();
        assert_eq!(path, out.join("spot_20251010_140509.json"));

        let back: SpotStatus =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, status);
    }
}
