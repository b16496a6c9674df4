//! Float trajectory plotter - command-line entry point
//!
//! Usage:
//! ```bash
//! plot_trajectories --data tracks.csv --color dac --title "North Atlantic" \
//!     --output tracks.png --index ar_index_global_prof.txt
//! ```
//!
//! Set `RUST_LOG=debug` for detailed logging.

use anyhow::{Context, Result};
use argo_trajectory_plot::argo::{load_trajectories, AgencyIndex, AgencyLookup, ColorMode, FloatId};
use argo_trajectory_plot::config::PlotConfig;
use argo_trajectory_plot::{plot_trajectories, PlotOutcome, PlotRequest};
use clap::{Parser, ValueHint};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about = "Plot Argo float trajectories on a map", long_about = None)]
struct Cli {
    /// Trajectory CSV (FLOAT_ID, LATITUDE, LONGITUDE, optional ALT_LON and DAC)
    #[arg(long, value_hint = ValueHint::FilePath)]
    data: Option<PathBuf>,

    /// Color mode: 'multiple', 'dac' or a color (r, blue, #1F78B4, ...)
    #[arg(long)]
    color: Option<String>,

    #[arg(long)]
    title: Option<String>,

    /// PNG output path; an empty string renders without saving
    #[arg(long, value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,

    /// Floats to plot (default: every float in the data)
    #[arg(long, value_delimiter = ',')]
    floats: Option<Vec<FloatId>>,

    /// Argo profile index used to look up each float's agency
    #[arg(long, value_hint = ValueHint::FilePath)]
    index: Option<PathBuf>,

    /// JSON display settings
    #[arg(long, value_hint = ValueHint::FilePath)]
    settings: Option<PathBuf>,

    /// Print the figure as a base64 PNG data URI
    #[arg(long)]
    data_uri: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    tracing::info!("Float trajectory plotter v{}", env!("CARGO_PKG_VERSION"));

    let config = match &cli.settings {
        Some(path) => PlotConfig::from_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => PlotConfig::default(),
    };

    let loaded = cli
        .data
        .as_deref()
        .map(|path| {
            load_trajectories(path)
                .with_context(|| format!("Failed to load trajectories from {}", path.display()))
        })
        .transpose()?;

    let color = cli
        .color
        .as_deref()
        .map(|spec| spec.parse::<ColorMode>())
        .transpose()
        .context("Invalid --color")?;

    let agencies = match &cli.index {
        Some(path) => Some(
            AgencyIndex::from_profile_index(path)
                .with_context(|| format!("Failed to read profile index {}", path.display()))?,
        ),
        None => loaded.as_ref().and_then(|(_, dac)| dac.clone()),
    };
    if let Some(index) = &agencies {
        tracing::info!("Agency lookup covers {} floats", index.len());
    }

    let mut request = PlotRequest {
        color,
        title: cli.title.clone(),
        output: cli.output.clone(),
        float_ids: cli.floats.clone(),
        ..PlotRequest::default()
    };
    if let Some((table, _)) = &loaded {
        request.data = Some(table);
        if request.float_ids.is_none() {
            request.float_ids = Some(table.float_ids());
        }
    }

    let outcome = plot_trajectories(
        &request,
        &config,
        agencies.as_ref().map(|a| a as &dyn AgencyLookup),
    )
    .context("Plotting failed")?;

    match outcome {
        PlotOutcome::Rendered(figure) => {
            if cli.data_uri {
                println!("{}", figure.to_data_uri()?);
            }
        }
        PlotOutcome::Skipped { .. } => {
            tracing::info!("Nothing plotted");
        }
    }

    Ok(())
}
