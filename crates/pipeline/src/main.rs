//! Vibration Monitor - Command-Line Entry Point

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pipeline::{init_logging, parse_signal, MonitoringPipeline, PipelineConfig};
use tracing::info;

/// Command-line arguments for vibration-monitor
#[derive(Parser, Debug)]
#[command(name = "vibration-monitor")]
#[command(about = "Vibration feature extraction and anomaly scoring")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "VIBRATION_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract the feature matrix of a signal file and print it as JSON
    Extract {
        /// Samples separated by whitespace or commas
        #[arg(short, long)]
        input: PathBuf,

        /// Normalizer state to apply (overrides configuration)
        #[arg(short, long)]
        normalizer: Option<PathBuf>,
    },
    /// Fit normalization on a healthy-machine signal and save the state
    Fit {
        /// Samples recorded under normal operation
        #[arg(short, long)]
        input: PathBuf,

        /// Destination for the JSON state
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Print the effective configuration and model summary as JSON
    Config,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config =
        PipelineConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    init_logging(&config.logging)?;

    info!("=== Vibration Monitor v{} ===", env!("CARGO_PKG_VERSION"));
    config.log_summary();

    match args.command {
        Command::Extract { input, normalizer } => {
            if normalizer.is_some() {
                config.normalizer.state_path = normalizer;
            }
            let pipeline = MonitoringPipeline::new(&config).context("Failed to build pipeline")?;
            let signal = read_signal(&input)?;
            let report = pipeline
                .feature_report(&signal)
                .context("Feature extraction failed")?;
            info!("Extracted {} windows from {}", report.n_windows, input.display());
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Fit { input, output } => {
            config.normalizer.state_path = None;
            let mut pipeline =
                MonitoringPipeline::new(&config).context("Failed to build pipeline")?;
            let signal = read_signal(&input)?;
            let normalizer = pipeline
                .fit_normalizer(&signal)
                .context("Normalizer fit failed")?;
            normalizer
                .save(&output)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            info!("Normalizer state written to {}", output.display());
        }
        Command::Config => {
            let pipeline = MonitoringPipeline::new(&config).context("Failed to build pipeline")?;
            let summary = serde_json::json!({
                "config": config,
                "models": pipeline.ensemble().model_summary(),
                "normalizer_fitted": pipeline.normalizer().is_some(),
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

fn read_signal(path: &Path) -> Result<Vec<f64>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read signal file {}", path.display()))?;
    let signal = parse_signal(&text).with_context(|| format!("Malformed signal file {}", path.display()))?;
    info!("Read {} samples from {}", signal.len(), path.display());
    Ok(signal)
}
