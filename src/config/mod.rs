use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::detection::VEHICLE_CLASSES;
use crate::geometry::{Point2D, Rectangle};

fn default_timeout_secs() -> u64 {
    8
}
fn default_confidence() -> f64 {
    0.35
}
fn default_classes() -> Vec<u32> {
    VEHICLE_CLASSES.to_vec()
}
fn default_overlap_threshold() -> f64 {
    0.12
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("spot_out")
}
fn default_snapshot_dir() -> PathBuf {
    PathBuf::from("snaps")
}
fn default_lots_file() -> PathBuf {
    PathBuf::from("lots.json")
}
fn default_verbose() -> bool {
    false
}

/// Everything read from `parkwatch.toml`.
///
/// Loaded once at startup and then only passed around by reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default = "default_verbose")]
    pub verbose: bool,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub spot: SpotConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub lots: Vec<LotConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_file: Option<PathBuf>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            snapshot_url: None,
            snapshot_file: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Detector settings. Detections below `conf` or outside `classes` (COCO ids)
/// are dropped before the overlap test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_confidence")]
    pub conf: f64,
    #[serde(default = "default_classes")]
    pub classes: Vec<u32>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            conf: default_confidence(),
            classes: default_classes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotConfig {
    #[serde(default = "default_overlap_threshold")]
    pub overlap_threshold: f64,
    #[serde(rename = "box", default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<SpotBox>,
}

impl Default for SpotConfig {
    fn default() -> Self {
        Self {
            overlap_threshold: default_overlap_threshold(),
            bounds: None,
        }
    }
}

/// Monitored spot in image pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpotBox {
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
}

impl SpotBox {
    pub fn to_rectangle(self) -> Rectangle {
        Rectangle::new(self.x as f64, self.y as f64, self.w as f64, self.h as f64)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_snapshot_dir")]
    pub snapshot_dir: PathBuf,
    #[serde(default = "default_lots_file")]
    pub lots_file: PathBuf,
    /// Store snapshots under `snapshot_dir/YYYY-MM-DD/`
    #[serde(default)]
    pub daily_subfolders: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            snapshot_dir: default_snapshot_dir(),
            lots_file: default_lots_file(),
            daily_subfolders: false,
        }
    }
}

/// A diagonal lot: corners A, B, C, D in clockwise order and the number of
/// spaces in each of its two rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotConfig {
    pub name: String,
    pub corners: [Point2D; 4],
    pub spaces_per_row: i64,
}

impl FileConfig {
    /// Load the first config found in the search path.
    ///
    /// Files that fail to parse are reported on stderr and skipped.
    pub fn load() -> Option<Self> {
        let config_paths = get_config_paths();

        for path in config_paths {
            if path.exists()
                && let Ok(contents) = std::fs::read_to_string(&path)
            {
                match toml::from_str(&contents) {
                    Ok(config) => return Some(config),
                    Err(e) => {
                        eprintln!("Warning: Failed to parse config file {:?}: {}", path, e);
                    }
                }
            }
        }
        None
    }

    /// Load an explicitly named config file
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!("Config file not found: {:?}", path);
        }
        let contents = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&contents).context(format!("Failed to parse config file: {:?}", path))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, contents).context(format!("Failed to write config file: {:?}", path))
    }
}

/// Store `spot` as the monitored box in the config file at `path`.
///
/// Other settings in the file are kept; a missing file is created.
pub fn define_spot(path: &Path, spot: SpotBox) -> Result<FileConfig> {
    if spot.w <= 0 || spot.h <= 0 {
        bail!(
            "Spot box needs a positive width and height, got {}x{}",
            spot.w,
            spot.h
        );
    }

    let mut config = if path.exists() {
        FileConfig::load_from(path)?
    } else {
        FileConfig::default()
    };
    config.spot.bounds = Some(spot);
    config.save(path)?;
    Ok(config)
}

/// Where `define-spot` writes when no `--config` is given
pub fn default_config_path() -> PathBuf {
    get_config_paths()
        .into_iter()
        .find(|p| p.exists())
        .unwrap_or_else(|| PathBuf::from("parkwatch.toml"))
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("parkwatch.toml"));
    paths.push(PathBuf::from(".parkwatch.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("parkwatch").join("config.toml"));
        paths.push(config_dir.join("parkwatch.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".parkwatch.toml"));
    }

    paths
}
