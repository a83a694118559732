use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;

use parkwatch::api::capture_snapshot;
use parkwatch::config::{FileConfig, SpotBox, default_config_path, define_spot};
use parkwatch::detection::{DetectionFilter, class_name, read_detections};
use parkwatch::geometry::Polygon;
use parkwatch::lot::{LotSummary, build_lot, load_lots_or_empty, write_lots};
use parkwatch::occupancy::{OccupancyEvaluator, SpotStatus, write_status};

/// Parking spot occupancy checks and diagonal lot layouts
///
/// Examples:
///   # Lay out every lot from the config file into lots.json
///   parkwatch generate-lots
///
///   # Decide whether the monitored spot is taken in the latest frame
///   parkwatch check --detections detections.json
///
///   # Store the monitored spot (pixels) in the config file
///   parkwatch define-spot --x 120 --y 80 --w 200 --h 110
///
///   # Save one camera frame to the snapshot directory
///   parkwatch snapshot
#[derive(Parser, Debug)]
#[command(name = "parkwatch")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to config file (optional, auto-searches parkwatch.toml if not provided)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate parking space polygons for the configured lots
    GenerateLots {
        /// Output JSON file (defaults to output.lots_file)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Check the monitored spot against a detections file
    Check {
        /// Detector output JSON
        #[arg(short = 'd', long)]
        detections: PathBuf,

        /// Overlap threshold in (0, 1] (defaults to spot.overlap_threshold)
        #[arg(short = 't', long)]
        threshold: Option<f64>,

        /// Directory for the status record (defaults to output.dir)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Print availability for each lot in a lots file
    Summary {
        /// Lots JSON file (defaults to output.lots_file)
        #[arg(short = 'i', long)]
        input: Option<PathBuf>,
    },

    /// Store the monitored spot box in the config file
    DefineSpot {
        #[arg(long, allow_hyphen_values = true)]
        x: i64,
        #[arg(long, allow_hyphen_values = true)]
        y: i64,
        #[arg(long)]
        w: i64,
        #[arg(long)]
        h: i64,
    },

    /// Save a single frame from the configured camera
    Snapshot {
        /// Directory for the frame (defaults to output.snapshot_dir)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Save into a YYYY-MM-DD folder (also output.daily_subfolders)
        #[arg(long)]
        daily_subfolders: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config_path = args.config.as_deref();

    match args.command {
        Command::GenerateLots { output } => {
            let config = load_config(config_path)?;
            run_generate_lots(&config, output, args.verbose || config.verbose)
        }
        Command::Check {
            detections,
            threshold,
            output,
        } => {
            let config = load_config(config_path)?;
            let verbose = args.verbose || config.verbose;
            run_check(&config, &detections, threshold, output, verbose)
        }
        Command::Summary { input } => run_summary(&load_config(config_path)?, input),
        // define-spot edits the file itself, so it must not require a parsable one
        Command::DefineSpot { x, y, w, h } => {
            let path = args.config.clone().unwrap_or_else(default_config_path);
            run_define_spot(&path, SpotBox { x, y, w, h })
        }
        Command::Snapshot {
            output,
            daily_subfolders,
        } => {
            let config = load_config(config_path)?;
            let verbose = args.verbose || config.verbose;
            run_snapshot(&config, output, daily_subfolders, verbose)
        }
    }
}

/// An explicit --config must load; the searched locations fall back to defaults
fn load_config(path: Option<&Path>) -> Result<FileConfig> {
    match path {
        Some(path) => FileConfig::load_from(path),
        None => Ok(FileConfig::load().unwrap_or_default()),
    }
}

fn run_generate_lots(config: &FileConfig, output: Option<PathBuf>, verbose: bool) -> Result<()> {
    if config.lots.is_empty() {
        bail!("No [[lots]] entries in the config file");
    }
    let output_path = output.unwrap_or_else(|| config.output.lots_file.clone());
    let start = Instant::now();

    let mut lots = Vec::with_capacity(config.lots.len());
    for lot_config in &config.lots {
        let lot = build_lot(lot_config).context(format!("Invalid lot: {}", lot_config.name))?;
        if verbose {
            println!(
                "  {}: {} spaces ({} per row)",
                lot.name,
                lot.spaces.len(),
                lot_config.spaces_per_row
            );
        }
        lots.push(lot);
    }

    write_lots(&output_path, &lots)?;

    let total: usize = lots.iter().map(|l| l.spaces.len()).sum();
    println!(
        "Wrote {} lots, {} spaces to {} [{:.1}s]",
        lots.len(),
        total,
        output_path.display(),
        start.elapsed().as_secs_f32()
    );
    Ok(())
}

fn run_check(
    config: &FileConfig,
    detections_path: &Path,
    threshold: Option<f64>,
    output: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    let spot = config
        .spot
        .bounds
        .context("No spot.box in the config file. Run define-spot first.")?;
    let threshold = threshold.unwrap_or(config.spot.overlap_threshold);
    let evaluator = OccupancyEvaluator::new(spot.to_rectangle(), threshold)
        .context("Invalid spot configuration")?;

    let detections = read_detections(detections_path)?;
    let filter = DetectionFilter::new(config.model.conf, config.model.classes.clone());
    let accepted = filter.apply(&detections);

    if verbose {
        println!("Configuration:");
        println!("  Spot: {:?}", evaluator.roi());
        println!("  Overlap threshold: {}", evaluator.threshold());
        println!("  Min confidence: {}", filter.min_confidence);
        println!(
            "  Detections: {} read, {} kept",
            detections.len(),
            accepted.len()
        );
        println!();
    }

    let shapes: Vec<Polygon> = accepted.iter().map(|d| d.shape.clone()).collect();
    let result = evaluator.evaluate(&shapes);

    if verbose {
        for (det, ratio) in accepted.iter().zip(&result.ratios) {
            println!(
                "  {} ({:.2}): overlap {:.3}",
                class_name(det.class_id),
                det.confidence,
                ratio
            );
        }
    }

    let status = SpotStatus::now(result.occupied);
    let out_dir = output.unwrap_or_else(|| config.output.dir.clone());
    let path = write_status(&out_dir, &status)?;

    println!(
        "{} -> {}",
        status.timestamp,
        status.status.as_str().to_uppercase()
    );
    if verbose {
        println!("Status written to {}", path.display());
    }
    Ok(())
}

fn run_summary(config: &FileConfig, input: Option<PathBuf>) -> Result<()> {
    let path = input.unwrap_or_else(|| config.output.lots_file.clone());
    let lots = load_lots_or_empty(&path);

    if lots.is_empty() {
        println!("No lots in {}", path.display());
        return Ok(());
    }

    for lot in &lots {
        let summary = LotSummary::from_lot(lot);
        println!(
            "{}: {} / {} available, {:.0}% open [{}] at ({:.6}, {:.6})",
            summary.name,
            summary.available,
            summary.total,
            summary.percent_open,
            summary.color.as_str(),
            summary.label_position.x,
            summary.label_position.y
        );
    }
    Ok(())
}

fn run_define_spot(path: &Path, spot: SpotBox) -> Result<()> {
    define_spot(path, spot)?;
    println!(
        "Saved spot box to {}: x={} y={} w={} h={}",
        path.display(),
        spot.x,
        spot.y,
        spot.w,
        spot.h
    );
    Ok(())
}

fn run_snapshot(
    config: &FileConfig,
    output: Option<PathBuf>,
    daily_subfolders: bool,
    verbose: bool,
) -> Result<()> {
    let out_dir = output.unwrap_or_else(|| config.output.snapshot_dir.clone());
    let daily = daily_subfolders || config.output.daily_subfolders;
    if verbose {
        println!("Saving snapshot to {}", out_dir.display());
    }

    let spinner = create_spinner("Fetching snapshot...");
    let start = Instant::now();
    let saved = capture_snapshot(&config.camera, &out_dir, daily).context("Snapshot failed")?;
    spinner.finish_with_message(format!(
        "Saved {} ({:.1} KB) [{:.1}s]",
        saved.path.display(),
        saved.bytes as f64 / 1024.0,
        start.elapsed().as_secs_f32()
    ));
    Ok(())
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}
