use anyhow::{Context, Result, bail};
use chrono::Local;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::CameraConfig;

const USER_AGENT: &str = "parkwatch/0.1.0";
const LATEST_NAME: &str = "latest.jpg";

/// Where a frame came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotSource {
    File(PathBuf),
    Url(String),
}

impl SnapshotSource {
    /// A configured local file wins over the URL
    pub fn from_config(camera: &CameraConfig) -> Result<Self> {
        if let Some(ref file) = camera.snapshot_file {
            return Ok(SnapshotSource::File(file.clone()));
        }
        if let Some(ref url) = camera.snapshot_url {
            return Ok(SnapshotSource::Url(url.clone()));
        }
        bail!("Set camera.snapshot_file or camera.snapshot_url in the config file")
    }
}

/// Saved snapshot locations
#[derive(Debug, Clone)]
pub struct SavedSnapshot {
    pub path: PathBuf,
    pub latest: PathBuf,
    pub bytes: usize,
}

/// Grab one frame and store it in `out_dir`.
///
/// The frame is written to `snap_<timestamp>.jpg`, inside a `YYYY-MM-DD`
/// folder when `daily_subfolders` is set, and copied to `out_dir/latest.jpg`.
/// Exactly one attempt is made; scheduling and retries are up to whoever
/// runs this.
pub fn capture_snapshot(
    camera: &CameraConfig,
    out_dir: &Path,
    daily_subfolders: bool,
) -> Result<SavedSnapshot> {
    let bytes = match SnapshotSource::from_config(camera)? {
        SnapshotSource::File(path) => read_snapshot_file(&path)?,
        SnapshotSource::Url(url) => {
            fetch_snapshot(&url, Duration::from_secs(camera.timeout_secs))?
        }
    };
    save_snapshot(&bytes, out_dir, daily_subfolders)
}

fn read_snapshot_file(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        bail!("snapshot_file not found: {:?}", path);
    }
    std::fs::read(path).context(format!("Could not read image file: {:?}", path))
}

/// Fetch raw image bytes from a camera snapshot endpoint
pub fn fetch_snapshot(url: &str, timeout: Duration) -> Result<Vec<u8>> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .context("Failed to create HTTP client")?;

    let response = client
        .get(url)
        .send()
        .context(format!("HTTP error for {}", url))?;

    let status = response.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        bail!("Camera returned 401 Unauthorized; check the snapshot URL credentials");
    }
    if !status.is_success() {
        bail!("Camera returned error status: {}", status);
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    if !is_image_content_type(&content_type) {
        bail!(
            "Not an image: content-type {:?}; the URL may be a viewer page, not a snapshot",
            content_type
        );
    }

    let bytes = response
        .bytes()
        .context("Failed to read snapshot body")?;
    Ok(bytes.to_vec())
}

fn is_image_content_type(content_type: &str) -> bool {
    content_type.trim().to_ascii_lowercase().starts_with("image")
}

fn save_snapshot(bytes: &[u8], out_dir: &Path, daily_subfolders: bool) -> Result<SavedSnapshot> {
    if bytes.is_empty() {
        bail!("Snapshot is empty");
    }

    let now = Local::now();
    let folder = if daily_subfolders {
        out_dir.join(now.format("%Y-%m-%d").to_string())
    } else {
        out_dir.to_path_buf()
    };
    std::fs::create_dir_all(&folder).context(format!("Failed to create dir: {:?}", folder))?;

    let path = folder.join(format!("snap_{}.jpg", now.format("%Y%m%d_%H%M%S_%3f")));
    let latest = out_dir.join(LATEST_NAME);

    std::fs::write(&path, bytes).context(format!("Failed to write snapshot: {:?}", path))?;
    std::fs::write(&latest, bytes).context(format!("Failed to write snapshot: {:?}", latest))?;

    Ok(SavedSnapshot {
        path,
        latest,
        bytes: bytes.len(),
    })
}
