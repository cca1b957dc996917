//! Sample grids and elevation grids.
//!
//! A [`SampleGrid`] is an N×N matrix of coordinates centered on a summit.
//! Rows follow latitude (row 0 = southern edge), columns follow longitude
//! (col 0 = western edge). An [`ElevationGrid`] holds one elevation per
//! sample, at the same row/column.

use serde::Serialize;

use crate::catalog::PeakRecord;
use crate::error::{PeakGridError, Result};

/// Default number of samples per grid side.
pub const DEFAULT_GRID_SIZE: usize = 50;

/// Default angular half-width of the grid in degrees (~16.7 km square overall).
pub const DEFAULT_HALF_WIDTH_DEG: f64 = 0.075;

/// Approximate length of one degree of latitude in meters.
pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// A geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl From<&PeakRecord> for LatLon {
    fn from(peak: &PeakRecord) -> Self {
        Self::new(peak.latitude, peak.longitude)
    }
}

/// Grid shape settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridConfig {
    /// Samples per side (N). Must be at least 2.
    pub size: usize,
    /// Angular half-width δ in degrees. Must be positive.
    pub half_width_deg: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_GRID_SIZE,
            half_width_deg: DEFAULT_HALF_WIDTH_DEG,
        }
    }
}

impl GridConfig {
    /// Create a new grid configuration.
    pub fn new(size: usize, half_width_deg: f64) -> Self {
        Self {
            size,
            half_width_deg,
        }
    }

    /// Set the number of samples per side.
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    /// Set the angular half-width in degrees.
    pub fn with_half_width(mut self, half_width_deg: f64) -> Self {
        self.half_width_deg = half_width_deg;
        self
    }

    /// Check the configuration.
    ///
    /// # Errors
    ///
    /// - [`PeakGridError::InvalidGridSize`] if `size < 2`
    /// - [`PeakGridError::InvalidHalfWidth`] if the half-width is not a
    ///   positive finite number
    pub fn validate(&self) -> Result<()> {
        if self.size < 2 {
            return Err(PeakGridError::InvalidGridSize { size: self.size });
        }
        if !(self.half_width_deg.is_finite() && self.half_width_deg > 0.0) {
            return Err(PeakGridError::InvalidHalfWidth {
                half_width: self.half_width_deg,
            });
        }
        Ok(())
    }

    /// Total number of samples (N²).
    pub fn total_points(&self) -> usize {
        self.size * self.size
    }
}

/// Linearly spaced values from `center - half_width` to `center + half_width`.
///
/// Offsets are computed symmetrically around zero so the middle value of an
/// odd-length axis is exactly `center`.
fn axis(center: f64, half_width: f64, n: usize) -> Vec<f64> {
    let last = (n - 1) as f64;
    (0..n)
        .map(|i| {
            let t = (2.0 * i as f64 - last) / last;
            center + half_width * t
        })
        .collect()
}

/// N×N grid of coordinates centered on a summit.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleGrid {
    center: LatLon,
    lats: Vec<f64>,
    lons: Vec<f64>,
}

impl SampleGrid {
    /// Build a grid around an arbitrary center.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` is invalid.
    pub fn new(center: LatLon, config: &GridConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            center,
            lats: axis(center.lat, config.half_width_deg, config.size),
            lons: axis(center.lon, config.half_width_deg, config.size),
        })
    }

    /// Build a grid around a peak's summit.
    ///
    /// # Example
    ///
    /// ```
    /// use peakgrid::{GridConfig, PeakCatalog, SampleGrid};
    ///
    /// let catalog = PeakCatalog::eight_thousanders();
    /// let everest = catalog.resolve("Everest")?;
    /// let grid = SampleGrid::around(everest, &GridConfig::new(5, 0.1))?;
    ///
    /// assert_eq!(grid.size(), 5);
    /// assert_eq!(grid.get(2, 2).lat, everest.latitude);
    /// # Ok::<(), peakgrid::PeakGridError>(())
    /// ```
    pub fn around(peak: &PeakRecord, config: &GridConfig) -> Result<Self> {
        Self::new(LatLon::from(peak), config)
    }

    /// Samples per side.
    pub fn size(&self) -> usize {
        self.lats.len()
    }

    /// Total number of samples.
    pub fn len(&self) -> usize {
        self.lats.len() * self.lons.len()
    }

    /// Always false; a valid grid has at least 2×2 samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The coordinate the grid was built around.
    pub fn center(&self) -> LatLon {
        self.center
    }

    /// Latitude of each row, south to north.
    pub fn latitudes(&self) -> &[f64] {
        &self.lats
    }

    /// Longitude of each column, west to east.
    pub fn longitudes(&self) -> &[f64] {
        &self.lons
    }

    /// Coordinate at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    pub fn get(&self, row: usize, col: usize) -> LatLon {
        LatLon::new(self.lats[row], self.lons[col])
    }

    /// All coordinates in row-major order.
    pub fn points(&self) -> Vec<LatLon> {
        self.lats
            .iter()
            .flat_map(|&lat| self.lons.iter().map(move |&lon| LatLon::new(lat, lon)))
            .collect()
    }
}

/// N×N matrix of elevations in meters, aligned with a [`SampleGrid`].
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationGrid {
    size: usize,
    values: Vec<f64>,
}

impl ElevationGrid {
    /// Build from row-major values.
    ///
    /// # Errors
    ///
    /// - [`PeakGridError::InvalidGridSize`] if `size < 2` or `size²`
    ///   overflows
    /// - [`PeakGridError::InvalidResponse`] unless exactly `size²` values
    ///   are supplied
    pub fn from_row_major(size: usize, values: Vec<f64>) -> Result<Self> {
        let expected = size
            .checked_mul(size)
            .filter(|_| size >= 2)
            .ok_or(PeakGridError::InvalidGridSize { size })?;
        if values.len() != expected {
            return Err(PeakGridError::InvalidResponse {
                reason: format!(
                    "expected {} elevations for a {}x{} grid, got {}",
                    expected,
                    size,
                    size,
                    values.len()
                ),
            });
        }
        Ok(Self { size, values })
    }

    /// Samples per side.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Elevation at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        assert!(col < self.size, "column {col} out of range");
        self.values[row * self.size + col]
    }

    /// One row of elevations (constant latitude).
    pub fn row(&self, row: usize) -> &[f64] {
        &self.values[row * self.size..(row + 1) * self.size]
    }

    /// Iterate over rows.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks(self.size)
    }

    /// All values in row-major order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Lowest elevation.
    pub fn min(&self) -> f64 {
        self.values.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Highest elevation.
    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// `(row, col, elevation)` of the highest sample; first one wins on ties.
    pub fn argmax(&self) -> (usize, usize, f64) {
        let (index, value) = self
            .values
            .iter()
            .copied()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |best, (i, v)| {
                if v > best.1 {
                    (i, v)
                } else {
                    best
                }
            });
        (index / self.size, index % self.size, value)
    }
}

/// Planar point in meters relative to the grid center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalPoint {
    /// East-west offset in meters.
    pub x: f64,
    /// North-south offset in meters.
    pub y: f64,
    /// Elevation in meters.
    pub z: f64,
}

/// Everything the renderer needs: the peak, where it was sampled, and what
/// came back.
#[derive(Debug, Clone)]
pub struct TerrainScene {
    pub peak: PeakRecord,
    pub samples: SampleGrid,
    pub elevations: ElevationGrid,
}

impl TerrainScene {
    /// Bundle a peak with its sampled grid.
    ///
    /// # Errors
    ///
    /// Returns [`PeakGridError::InvalidResponse`] if the two grids differ in
    /// size.
    pub fn new(peak: PeakRecord, samples: SampleGrid, elevations: ElevationGrid) -> Result<Self> {
        if samples.size() != elevations.size() {
            return Err(PeakGridError::InvalidResponse {
                reason: format!(
                    "elevation grid is {}x{} but sample grid is {}x{}",
                    elevations.size(),
                    elevations.size(),
                    samples.size(),
                    samples.size()
                ),
            });
        }
        Ok(Self {
            peak,
            samples,
            elevations,
        })
    }

    /// Grid projected to a local metric frame, row-major.
    ///
    /// Uses a flat-earth approximation around the mean coordinate:
    /// 111 km per degree of latitude, scaled by `cos(lat)` for longitude.
    pub fn local_meters(&self) -> Vec<Vec<LocalPoint>> {
        let lats = self.samples.latitudes();
        let lons = self.samples.longitudes();
        let center_lat = lats.iter().sum::<f64>() / lats.len() as f64;
        let center_lon = lons.iter().sum::<f64>() / lons.len() as f64;
        let lon_scale = METERS_PER_DEGREE * center_lat.to_radians().cos();

        lats.iter()
            .zip(self.elevations.rows())
            .map(|(&lat, row)| {
                lons.iter()
                    .zip(row)
                    .map(|(&lon, &z)| LocalPoint {
                        x: (lon - center_lon) * lon_scale,
                        y: (lat - center_lat) * METERS_PER_DEGREE,
                        z,
                    })
                    .collect()
            })
            .collect()
    }

    /// `(row, col, elevation)` of the highest sample.
    pub fn highest_cell(&self) -> (usize, usize, f64) {
        self.elevations.argmax()
    }
}
