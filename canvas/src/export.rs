//! Export: flatten the composition to a PNG and hand it to a download sink.
//!
//! Rasterizing and saving are host concerns behind two traits, [`Rasterizer`]
//! and [`DownloadSink`]. The coordinator decides what gets drawn and at which
//! size, guards against overlapping exports, and guarantees the sink only sees
//! a complete image.
//!
//! Hosts that need to await something between planning and drawing (the
//! browser decodes the background first) use [`ExportCoordinator::begin`] and
//! [`ExportCoordinator::finish`]; synchronous hosts call
//! [`ExportCoordinator::run`].

#[cfg(test)]
#[path = "export_test.rs"]
mod export_test;

use serde::{Deserialize, Serialize};

use crate::consts::{EXPORT_FILENAME, EXPORT_PIXEL_RATIO};
use crate::geometry::Size;
use crate::style::LayerStyle;

/// Which size the export is based on before the pixel ratio is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportResolution {
    /// The frame as currently rendered on screen.
    Viewport,
    /// The template's design size.
    #[default]
    Design,
}

/// Everything visible in the frame, resolved for a given base size.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    /// Size in CSS pixels that the layer styles were resolved against.
    pub base: Size,
    /// Background image URL, painted cover-fit beneath the layers.
    pub background: Option<String>,
    /// Layers bottom-first.
    pub layers: Vec<LayerStyle>,
}

impl Composition {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.background.is_none() && self.layers.is_empty()
    }
}

/// How to rasterize a [`Composition`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterOptions {
    pub pixel_ratio: f64,
    /// Defeat HTTP caching when fetching the background.
    pub cache_bust: bool,
    pub output_width: u32,
    pub output_height: u32,
}

impl RasterOptions {
    /// Options for `base` at the fixed export pixel ratio.
    #[must_use]
    pub fn for_base(base: Size) -> Self {
        let output = base.scaled(EXPORT_PIXEL_RATIO);
        Self {
            pixel_ratio: EXPORT_PIXEL_RATIO,
            cache_bust: true,
            output_width: to_pixels(output.width),
            output_height: to_pixels(output.height),
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_pixels(v: f64) -> u32 {
    v.round().clamp(0.0, f64::from(u32::MAX)) as u32
}

/// Errors from a [`Rasterizer`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RasterError {
    #[error("background image failed to load: {0}")]
    Image(String),
    #[error("canvas error: {0}")]
    Canvas(String),
    #[error("encoding error: {0}")]
    Encode(String),
}

/// Draws a composition and encodes it as PNG bytes.
pub trait Rasterizer {
    /// # Errors
    ///
    /// Any drawing or encoding failure.
    fn render(&mut self, composition: &Composition, options: &RasterOptions) -> Result<Vec<u8>, RasterError>;
}

/// Receives finished exports.
pub trait DownloadSink {
    /// # Errors
    ///
    /// A message describing why the file could not be saved.
    fn save(&mut self, filename: &str, bytes: &[u8]) -> Result<(), String>;
}

/// Export failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExportError {
    #[error("An export is already in progress.")]
    Busy,
    #[error("Nothing to export yet.")]
    Empty,
    #[error("Export failed. Try again.")]
    Raster(#[from] RasterError),
    #[error("Could not save the exported image.")]
    Download(String),
}

/// A planned export awaiting its pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportJob {
    pub composition: Composition,
    pub options: RasterOptions,
}

/// A successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub filename: String,
    pub width: u32,
    pub height: u32,
    pub bytes: usize,
}

/// Serializes exports and enforces all-or-nothing delivery.
#[derive(Debug, Default)]
pub struct ExportCoordinator {
    resolution: ExportResolution,
    in_progress: bool,
}

impl ExportCoordinator {
    #[must_use]
    pub fn new(resolution: ExportResolution) -> Self {
        Self { resolution, in_progress: false }
    }

    #[must_use]
    pub fn resolution(&self) -> ExportResolution {
        self.resolution
    }

    pub fn set_resolution(&mut self, resolution: ExportResolution) {
        self.resolution = resolution;
    }

    #[must_use]
    pub fn in_progress(&self) -> bool {
        self.in_progress
    }

    /// Reserve the exporter for `composition`.
    ///
    /// # Errors
    ///
    /// [`ExportError::Busy`] while another export is running,
    /// [`ExportError::Empty`] when there is neither background nor text.
    pub fn begin(&mut self, composition: Composition) -> Result<ExportJob, ExportError> {
        if self.in_progress {
            return Err(ExportError::Busy);
        }
        if composition.is_empty() {
            return Err(ExportError::Empty);
        }
        self.in_progress = true;
        let options = RasterOptions::for_base(composition.base);
        Ok(ExportJob { composition, options })
    }

    /// Release the exporter and deliver `rendered` if it succeeded.
    ///
    /// # Errors
    ///
    /// The rasterizer's error, or the sink's. On a raster error the sink is
    /// never called.
    pub fn finish(
        &mut self,
        job: &ExportJob,
        rendered: Result<Vec<u8>, RasterError>,
        sink: &mut dyn DownloadSink,
    ) -> Result<ExportSummary, ExportError> {
        self.in_progress = false;
        let bytes = rendered.inspect_err(|e| log::warn!("export failed: {e}"))?;
        sink.save(EXPORT_FILENAME, &bytes).map_err(ExportError::Download)?;
        Ok(ExportSummary {
            filename: EXPORT_FILENAME.to_owned(),
            width: job.options.output_width,
            height: job.options.output_height,
            bytes: bytes.len(),
        })
    }

    /// Plan, rasterize and deliver in one call.
    ///
    /// # Errors
    ///
    /// See [`Self::begin`] and [`Self::finish`].
    pub fn run(
        &mut self,
        composition: Composition,
        rasterizer: &mut dyn Rasterizer,
        sink: &mut dyn DownloadSink,
    ) -> Result<ExportSummary, ExportError> {
        let job = self.begin(composition)?;
        let rendered = rasterizer.render(&job.composition, &job.options);
        self.finish(&job, rendered, sink)
    }
}

/// `url` with a cache-defeating query parameter. Data URLs are returned as-is.
#[must_use]
pub fn cache_busted(url: &str, stamp: u64) -> String {
    if url.starts_with("data:") || url.starts_with("blob:") {
        return url.to_owned();
    }
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}_={stamp}")
}
