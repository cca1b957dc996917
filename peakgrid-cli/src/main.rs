use anyhow::Result;
use clap::Parser;
use peakgrid::grid::{DEFAULT_GRID_SIZE, DEFAULT_HALF_WIDTH_DEG};
use peakgrid::provider::GOOGLE_ELEVATION_ENDPOINT;
use peakgrid::sampler::DEFAULT_BATCH_SIZE;
use peakgrid::PeakCatalog;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

/// 3D wireframe plots of the eight-thousanders from Google Elevation API data
#[derive(Parser)]
#[command(name = "peakgrid")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Mountain to visualize (case-insensitive, alternate spellings accepted)
    #[arg(short, long, default_value = "Everest")]
    peak: String,

    /// Google Maps API key
    #[arg(long, env = "GOOGLE_MAPS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Elevation API endpoint
    #[arg(long, env = "PEAKGRID_ENDPOINT", default_value = GOOGLE_ELEVATION_ENDPOINT)]
    endpoint: String,

    /// Samples per grid side
    #[arg(short = 'n', long, default_value_t = DEFAULT_GRID_SIZE)]
    grid_size: usize,

    /// Grid half-width in degrees
    #[arg(long, default_value_t = DEFAULT_HALF_WIDTH_DEG)]
    half_width: f64,

    /// Locations per API request
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Retry attempts per request on network errors
    #[arg(long, default_value_t = 3)]
    max_retries: u32,

    /// Output image (defaults to <peak>.png, or <peak>.gif with --animate)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write a rotating GIF instead of a still image
    #[arg(short, long)]
    animate: bool,

    /// Frames in the animation
    #[arg(long, default_value_t = 72, requires = "animate")]
    frames: usize,

    /// Delay between animation frames in milliseconds
    #[arg(long, default_value_t = 50, requires = "animate")]
    frame_delay: u32,

    /// Image width in pixels
    #[arg(long, default_value_t = 1200)]
    width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 800)]
    height: u32,

    /// Fetch and summarize only, without writing an image
    #[arg(long, conflicts_with_all = ["output", "animate"])]
    no_plot: bool,

    /// Print the summary as JSON
    #[arg(short, long)]
    json: bool,

    /// List the known peaks and their aliases, then exit
    #[arg(long)]
    list: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    // Must run before parsing so clap's `env` fallbacks see the file
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
        Err(e) if e.not_found() => tracing::debug!("No .env file found"),
        Err(e) => tracing::warn!(error = %e, "Could not read .env file"),
    }

    let catalog = PeakCatalog::eight_thousanders();

    if cli.list {
        return commands::list::run(&catalog, cli.json);
    }

    commands::plot::run(
        &catalog,
        commands::plot::PlotArgs {
            peak: cli.peak,
            api_key: cli.api_key,
            endpoint: cli.endpoint,
            grid_size: cli.grid_size,
            half_width: cli.half_width,
            batch_size: cli.batch_size,
            max_retries: cli.max_retries,
            output: cli.output,
            animate: cli.animate,
            frames: cli.frames,
            frame_delay: cli.frame_delay,
            width: cli.width,
            height: cli.height,
            no_plot: cli.no_plot,
            json: cli.json,
        },
    )
}
