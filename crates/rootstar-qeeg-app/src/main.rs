//! Rootstar qEEG Application
//!
//! Command-line front end for the feature engine. Reads preprocessed epochs
//! from JSON, runs the extraction, and writes the feature tree as JSON.
//!
//! # Usage
//!
//! ```bash
//! # Extract features with the default bands and montage
//! rootstar-qeeg extract --input epochs.json --output features.json
//!
//! # Use a custom configuration
//! rootstar-qeeg extract --input epochs.json --output features.json --config cfg.json
//!
//! # Print the band registries
//! rootstar-qeeg bands
//!
//! # Print the default configuration (a starting point for --config)
//! rootstar-qeeg config
//! ```
//!
//! The input file holds `{"eo": EpochSet, "ec": EpochSet}` with either key
//! optional; each `EpochSet` is
//! `{"sample_rate", "channels", "condition", "data": [epoch][channel][sample]}`
//! in volts.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rootstar_qeeg_core::{BandRegistry, FeatureConfig};
use rootstar_qeeg_native::{EpochsByCondition, FeatureExtractor};
use serde_json::{json, Value};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Rootstar qEEG Application
#[derive(Parser, Debug)]
#[command(name = "rootstar-qeeg")]
#[command(author, version, about = "Rootstar resting-state qEEG feature extraction", long_about = None)]
struct Cli {
    /// Logging verbosity level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract features from an epoch bundle
    Extract {
        /// Epoch bundle (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Feature output (JSON); stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Feature configuration (JSON); defaults when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the fine and coarse band registries
    Bands {
        /// Configuration to read the registries from
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the default configuration as JSON
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr so JSON on stdout stays clean
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Rootstar qEEG v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Extract { input, output, config } => {
            run_extract(&input, output.as_deref(), config.as_deref())?;
        }
        Commands::Bands { config } => {
            let config = load_config(config.as_deref())?;
            print_registry("Fine bands (power, ratios, asymmetry)", &config.fine_bands);
            print_registry("Coarse bands (connectivity)", &config.coarse_bands);
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&FeatureConfig::default())?);
        }
    }

    Ok(())
}

/// Run the extraction and write the feature tree
fn run_extract(input: &Path, output: Option<&Path>, config: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config)?;
    let bundle = load_bundle(input)?;

    let started = Instant::now();
    let result = FeatureExtractor::new(config).extract(&bundle)?;
    let elapsed = started.elapsed().as_secs_f64();
    info!("Feature extraction complete in {:.2}s", elapsed);

    let tree = with_metadata(result.to_json()?, elapsed);
    let text = serde_json::to_string_pretty(&tree)?;

    match output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Results saved to: {}", path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<FeatureConfig> {
    let Some(path) = path else {
        return Ok(FeatureConfig::default());
    };
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read config {}", path.display()))?;
    let config = serde_json::from_str(&text).with_context(|| format!("Invalid config {}", path.display()))?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

fn load_bundle(path: &Path) -> anyhow::Result<EpochsByCondition> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read epochs {}", path.display()))?;
    parse_bundle(&text).with_context(|| format!("Invalid epoch bundle {}", path.display()))
}

fn parse_bundle(text: &str) -> anyhow::Result<EpochsByCondition> {
    let bundle: EpochsByCondition = serde_json::from_str(text)?;
    for (key, epochs) in [("eo", &bundle.eyes_open), ("ec", &bundle.eyes_closed)] {
        if let Some(epochs) = epochs {
            info!(
                "{}: {} channels, {} epochs of {} samples at {} Hz",
                key,
                epochs.n_channels(),
                epochs.n_epochs(),
                epochs.n_samples(),
                epochs.sample_rate()
            );
        }
    }
    Ok(bundle)
}

/// Attach run metadata under `processing_metadata`
fn with_metadata(mut tree: Value, elapsed_s: f64) -> Value {
    if let Value::Object(map) = &mut tree {
        map.insert(
            "processing_metadata".to_string(),
            json!({
                "engine_version": env!("CARGO_PKG_VERSION"),
                "processing_time_seconds": (elapsed_s * 100.0).round() / 100.0,
                "parallel": cfg!(feature = "parallel"),
            }),
        );
    }
    tree
}

fn print_registry(title: &str, bands: &BandRegistry) {
    println!("{title}");
    for band in bands {
        println!("  {:<10} {:>5.1} - {:>5.1} Hz", band.name, band.low_hz, band.high_hz);
    }
}
