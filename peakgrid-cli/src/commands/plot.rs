use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use peakgrid::render::{self, RenderOptions};
use peakgrid::{
    ApiConfig, ElevationGrid, ElevationSampler, GoogleElevationApi, GridConfig, PeakCatalog,
    PeakGridError, PeakRecord, SampleGrid, SamplerConfig, TerrainScene,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Options collected from the command line.
pub struct PlotArgs {
    pub peak: String,
    pub api_key: Option<String>,
    pub endpoint: String,
    pub grid_size: usize,
    pub half_width: f64,
    pub batch_size: usize,
    pub max_retries: u32,
    pub output: Option<PathBuf>,
    pub animate: bool,
    pub frames: usize,
    pub frame_delay: u32,
    pub width: u32,
    pub height: u32,
    pub no_plot: bool,
    pub json: bool,
}

#[derive(Serialize)]
struct Summary<'a> {
    peak: &'a PeakRecord,
    grid_size: usize,
    half_width_deg: f64,
    samples: usize,
    min_elevation_m: f64,
    max_elevation_m: f64,
    highest_sample: HighestSample,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<&'a Path>,
}

#[derive(Serialize)]
struct HighestSample {
    latitude: f64,
    longitude: f64,
    elevation_m: f64,
}

pub fn run(catalog: &PeakCatalog, args: PlotArgs) -> Result<()> {
    // Name and grid problems are reported before the key is even looked at
    let peak = catalog.resolve(&args.peak)?.clone();
    let grid_config = GridConfig::new(args.grid_size, args.half_width);
    grid_config.validate()?;

    let api_key = args.api_key.ok_or(PeakGridError::MissingApiKey)?;
    let api_config = ApiConfig::new(api_key)?.with_endpoint(args.endpoint);
    let api = GoogleElevationApi::new(api_config).context("Failed to create HTTP client")?;

    let sampler_config = SamplerConfig::default()
        .with_batch_size(args.batch_size)
        .with_max_retries(args.max_retries);
    let sampler = ElevationSampler::new(api, sampler_config)?;

    let samples = SampleGrid::around(&peak, &grid_config)?;
    tracing::info!(
        peak = %peak.name,
        grid_size = samples.size(),
        half_width_deg = args.half_width,
        "Sampling elevation grid"
    );

    let elevations = fetch(&sampler, &samples)
        .with_context(|| format!("Failed to fetch elevation data for {}", peak.name))?;

    let output = if args.no_plot {
        None
    } else {
        Some(
            args.output
                .unwrap_or_else(|| default_output(&peak.name, args.animate)),
        )
    };

    if args.json {
        let (row, col, elevation_m) = elevations.argmax();
        let highest = samples.get(row, col);
        let summary = Summary {
            peak: &peak,
            grid_size: samples.size(),
            half_width_deg: args.half_width,
            samples: samples.len(),
            min_elevation_m: elevations.min(),
            max_elevation_m: elevations.max(),
            highest_sample: HighestSample {
                latitude: highest.lat,
                longitude: highest.lon,
                elevation_m,
            },
            output: output.as_deref(),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&peak, &samples, &elevations);
    }

    let Some(output) = output else {
        return Ok(());
    };

    let scene = TerrainScene::new(peak, samples, elevations)?;
    let options = RenderOptions::default()
        .with_size(args.width, args.height)
        .with_frames(args.frames, args.frame_delay);

    let rendered = if args.animate {
        render::render_gif(&scene, &output, &options)
    } else {
        render::render_png(&scene, &output, &options)
    };
    rendered.with_context(|| format!("Failed to write plot to {}", output.display()))?;

    if !args.json {
        println!("Plot written to: {}", output.display());
    }
    Ok(())
}

fn fetch<P: peakgrid::ElevationProvider>(
    sampler: &ElevationSampler<P>,
    samples: &SampleGrid,
) -> Result<ElevationGrid> {
    let total = sampler.config().batch_count(samples.len());
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
            )?
            .progress_chars("#>-"),
    );
    pb.set_message("batches");

    match sampler.fetch_with_progress(samples, |done, _| pb.set_position(done as u64)) {
        Ok(elevations) => {
            pb.finish_and_clear();
            Ok(elevations)
        }
        Err(e) => {
            pb.abandon();
            Err(e.into())
        }
    }
}

fn print_summary(peak: &PeakRecord, samples: &SampleGrid, elevations: &ElevationGrid) {
    let (row, col, highest) = elevations.argmax();
    let at = samples.get(row, col);

    println!("Visualizing: {} ({} m)", peak.name, peak.height_m);
    println!(
        "Coordinates: {:.4}°, {:.4}°",
        peak.latitude, peak.longitude
    );
    println!(
        "Grid:        {}×{} samples",
        samples.size(),
        samples.size()
    );
    println!(
        "Elevation:   {:.0} m to {:.0} m",
        elevations.min(),
        elevations.max()
    );
    println!(
        "Highest:     {:.0} m at {:.4}°, {:.4}°",
        highest, at.lat, at.lon
    );
}

/// `<peak>.png`, or `<peak>.gif` for animations, with the name lowercased
/// and spaces turned into underscores.
fn default_output(name: &str, animate: bool) -> PathBuf {
    let stem: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    let ext = if animate { "gif" } else { "png" };
    PathBuf::from(format!("{}.{}", stem, ext))
}
