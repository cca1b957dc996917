//! Render a synthetic cone as a wireframe, without any network access.
//!
//! Run with: cargo run --example render --features render -- cone.png

use peakgrid::render::{render_png, RenderOptions};
use peakgrid::{ElevationGrid, GridConfig, PeakCatalog, PeakGridError, SampleGrid, TerrainScene};
use std::env;
use std::path::PathBuf;

fn main() -> Result<(), PeakGridError> {
    let output = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("cone.png"));

    let catalog = PeakCatalog::eight_thousanders();
    let peak = catalog.resolve("Makalu")?.clone();
    let config = GridConfig::new(41, 0.075);
    let samples = SampleGrid::around(&peak, &config)?;

    let mid = (config.size / 2) as f64;
    let values = (0..config.total_points())
        .map(|i| {
            let r = (i / config.size) as f64 - mid;
            let c = (i % config.size) as f64 - mid;
            peak.height_m as f64 - 150.0 * (r * r + c * c).sqrt()
        })
        .collect();
    let elevations = ElevationGrid::from_row_major(config.size, values)?;

    let scene = TerrainScene::new(peak, samples, elevations)?;
    render_png(&scene, &output, &RenderOptions::default())?;
    println!("Wrote {}", output.display());

    Ok(())
}
