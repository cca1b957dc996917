//! # peakgrid - Elevation grids around the eight-thousanders
//!
//! Resolve a mountain name, lay a square grid of coordinates over its summit,
//! fetch elevations for every grid point from the Google Elevation API and
//! hand the result to a wireframe renderer.
//!
//! ## Features
//!
//! - **Forgiving names**: case, spacing and common alternate spellings
//!   ("Kanchenjanga", "Shisha Pangma", "Gasherbrum 2") all resolve
//! - **Exact grids**: the summit sits exactly on the center cell of an odd grid
//! - **Batched fetching**: row-major batches with retries on transient errors,
//!   all-or-nothing reassembly
//! - **Rendering** (`render` feature): wireframe PNG or rotating GIF
//!
//! ## Quick Start
//!
//! ```ignore
//! use peakgrid::{
//!     ApiConfig, ElevationSampler, GoogleElevationApi, GridConfig, PeakCatalog, SampleGrid,
//!     SamplerConfig,
//! };
//!
//! let catalog = PeakCatalog::eight_thousanders();
//! let peak = catalog.resolve("everest")?;
//!
//! let grid = SampleGrid::around(peak, &GridConfig::default())?;
//! let api = GoogleElevationApi::new(ApiConfig::from_env()?)?;
//! let sampler = ElevationSampler::new(api, SamplerConfig::default())?;
//!
//! let elevations = sampler.fetch(&grid)?;
//! println!("{}: {:.0}-{:.0} m", peak.name, elevations.min(), elevations.max());
//! ```
//!
//! ## Grid Layout
//!
//! Grids are N×N and row-major. Row 0 is the southern edge and column 0 the
//! western edge; coordinates run from `center - δ` to `center + δ` on both
//! axes. The default is 50×50 samples with δ = 0.075° (about 16.7 km across).

pub mod catalog;
pub mod error;
pub mod grid;
pub mod provider;
#[cfg(feature = "render")]
pub mod render;
pub mod sampler;

// Re-export main types at crate root for convenience
pub use catalog::{normalize_name, CatalogError, PeakCatalog, PeakRecord};
pub use error::{ErrorKind, PeakGridError, Result};
pub use grid::{ElevationGrid, GridConfig, LatLon, LocalPoint, SampleGrid, TerrainScene};
pub use provider::{ApiConfig, ElevationProvider, GoogleElevationApi};
pub use sampler::{ElevationSampler, SamplerConfig};
