//! Wireframe rendering of a [`TerrainScene`].
//!
//! Only available when the `render` feature is enabled.
//!
//! The terrain is drawn as a 3D wireframe (polylines along every
//! `stride`-th row and column) in light green on black, over a faint base
//! grid at the lowest elevation. The highest sample gets a yellow square
//! marker with a leader line to a height label. Labels need the `ttf`
//! feature; without it text is laid out but not drawn.
//!
//! [`render_png`] writes a single still image; [`render_gif`] writes an
//! animation rotating the view through a full turn.

use std::f64::consts::TAU;
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::error::{PeakGridError, Result};
use crate::grid::{LocalPoint, TerrainScene};

const LIGHT_GREEN: RGBColor = RGBColor(144, 238, 144);

/// Offset of the height label from the peak marker, in meters (x, y, z).
const LABEL_OFFSET: (f64, f64, f64) = (-800.0, 800.0, 500.0);

/// Plot appearance settings.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Horizontal view angle in radians.
    pub yaw: f64,
    /// Vertical view angle in radians.
    pub pitch: f64,
    /// Draw every n-th row/column of the surface.
    pub stride: usize,
    /// Draw every n-th row/column of the base grid.
    pub base_stride: usize,
    /// Frames in an animation.
    pub frames: usize,
    /// Delay between animation frames in milliseconds.
    pub frame_delay_ms: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
            yaw: (-50.0f64).to_radians(),
            pitch: 30.0f64.to_radians(),
            stride: 2,
            base_stride: 5,
            frames: 72,
            frame_delay_ms: 50,
        }
    }
}

impl RenderOptions {
    /// Set the image size.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the number of animation frames and the delay between them.
    pub fn with_frames(mut self, frames: usize, frame_delay_ms: u32) -> Self {
        self.frames = frames;
        self.frame_delay_ms = frame_delay_ms;
        self
    }

    /// Set the surface and base grid strides.
    pub fn with_strides(mut self, stride: usize, base_stride: usize) -> Self {
        self.stride = stride;
        self.base_stride = base_stride;
        self
    }
}

fn render_err<E: std::fmt::Display>(e: E) -> PeakGridError {
    PeakGridError::Render {
        reason: e.to_string(),
    }
}

/// Projected geometry shared by every frame.
struct Geometry {
    points: Vec<Vec<LocalPoint>>,
    x_range: std::ops::Range<f64>,
    y_range: std::ops::Range<f64>,
    z_range: std::ops::Range<f64>,
    z_min: f64,
    peak: LocalPoint,
}

impl Geometry {
    fn new(scene: &TerrainScene) -> Self {
        let points = scene.local_meters();
        let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
        for p in points.iter().flatten() {
            x_min = x_min.min(p.x);
            x_max = x_max.max(p.x);
            y_min = y_min.min(p.y);
            y_max = y_max.max(p.y);
        }
        let z_min = scene.elevations.min();
        let z_max = scene.elevations.max();
        let (row, col, _) = scene.highest_cell();

        Self {
            peak: points[row][col],
            points,
            x_range: (x_min - 500.0)..(x_max + 500.0),
            y_range: (y_min - 500.0)..(y_max + 500.0),
            z_range: (z_min - 200.0)..(z_max + 500.0),
            z_min,
        }
    }

    /// Polylines along every `stride`-th row and column, at elevation
    /// `flatten_to` if given.
    fn wires(&self, stride: usize, flatten_to: Option<f64>) -> Vec<Vec<(f64, f64, f64)>> {
        let stride = stride.max(1);
        let size = self.points.len();
        // plotters' 3D y axis is vertical: (east, up, north)
        let to_plot = |p: &LocalPoint| (p.x, flatten_to.unwrap_or(p.z), p.y);

        let rows = self
            .points
            .iter()
            .step_by(stride)
            .map(|row| row.iter().map(to_plot).collect::<Vec<_>>());
        let cols = (0..size)
            .step_by(stride)
            .map(|c| {
                self.points
                    .iter()
                    .map(|row| to_plot(&row[c]))
                    .collect::<Vec<_>>()
            });

        rows.chain(cols).collect()
    }
}

fn draw_frame<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    scene: &TerrainScene,
    geometry: &Geometry,
    options: &RenderOptions,
    yaw: f64,
) -> Result<()> {
    area.fill(&BLACK).map_err(render_err)?;

    let title = format!(
        "3D Wire Silhouette of {} ({} m)",
        scene.peak.name, scene.peak.height_m
    );
    let mut chart = ChartBuilder::on(area)
        .margin(20)
        .caption(title, ("sans-serif", 20).into_font().color(&WHITE))
        .build_cartesian_3d(
            geometry.x_range.clone(),
            geometry.z_range.clone(),
            geometry.y_range.clone(),
        )
        .map_err(render_err)?;

    let pitch = options.pitch;
    chart.with_projection(|mut pb| {
        pb.yaw = yaw;
        pb.pitch = pitch;
        pb.scale = 0.85;
        pb.into_matrix()
    });

    chart
        .configure_axes()
        .light_grid_style(WHITE.mix(0.15))
        .max_light_lines(3)
        .draw()
        .map_err(render_err)?;

    for wire in geometry.wires(options.base_stride, Some(geometry.z_min)) {
        chart
            .draw_series(LineSeries::new(wire, LIGHT_GREEN.mix(0.2).stroke_width(1)))
            .map_err(render_err)?;
    }

    for wire in geometry.wires(options.stride, None) {
        chart
            .draw_series(LineSeries::new(wire, LIGHT_GREEN.mix(0.9).stroke_width(1)))
            .map_err(render_err)?;
    }

    let peak = (geometry.peak.x, geometry.peak.z, geometry.peak.y);
    let label = (
        peak.0 + LABEL_OFFSET.0,
        peak.1 + LABEL_OFFSET.2,
        peak.2 + LABEL_OFFSET.1,
    );

    chart
        .draw_series(LineSeries::new(
            [peak, label],
            YELLOW.mix(0.7).stroke_width(2),
        ))
        .map_err(render_err)?;

    chart
        .draw_series(std::iter::once(
            EmptyElement::at(peak) + Rectangle::new([(-8, -8), (8, 8)], YELLOW.stroke_width(2)),
        ))
        .map_err(render_err)?;

    chart
        .draw_series(std::iter::once(
            EmptyElement::at(label)
                + Text::new(
                    format!("{} m", scene.peak.height_m),
                    (4, -20),
                    ("sans-serif", 16).into_font().color(&YELLOW),
                ),
        ))
        .map_err(render_err)?;

    Ok(())
}

/// Render a still wireframe image (PNG, or any format the file extension
/// selects).
pub fn render_png(scene: &TerrainScene, path: &Path, options: &RenderOptions) -> Result<()> {
    let geometry = Geometry::new(scene);
    let root = BitMapBackend::new(path, (options.width, options.height)).into_drawing_area();

    draw_frame(&root, scene, &geometry, options, options.yaw)?;
    root.present().map_err(render_err)?;

    tracing::debug!(path = %path.display(), "Wrote wireframe image");
    Ok(())
}

/// Render an animated GIF rotating the view through a full turn.
pub fn render_gif(scene: &TerrainScene, path: &Path, options: &RenderOptions) -> Result<()> {
    let geometry = Geometry::new(scene);
    let frames = options.frames.max(1);
    let root = BitMapBackend::gif(path, (options.width, options.height), options.frame_delay_ms)
        .map_err(render_err)?
        .into_drawing_area();

    for frame in 0..frames {
        let yaw = options.yaw + TAU * frame as f64 / frames as f64;
        draw_frame(&root, scene, &geometry, options, yaw)?;
        root.present().map_err(render_err)?;
        tracing::trace!(frame = frame + 1, of = frames, "Rendered frame");
    }

    tracing::debug!(path = %path.display(), frames, "Wrote wireframe animation");
    Ok(())
}
