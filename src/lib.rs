//! Longshot
//!
//! Capture the *entire* scrollable content of a rendered document as one
//! image, not just the visible viewport. The document is captured in
//! vertical tiles that are validated, stitched onto a single canvas of fixed
//! width, and encoded as PNG, JPEG or HEIC (with fallback to JPEG when the
//! codec set cannot write HEIC).
//!
//! # Pipeline
//!
//! - [`limits`]: pixel budget gate, checked before any capture work
//! - [`tiling`]: contiguous tile plan for the measured document
//! - [`readiness`]: bounded polling until layout and scroll have settled
//! - [`capture`]: the tile loop, per-tile shape validation, progress
//! - [`coverage`]: the captured tiles must cover the whole canvas
//! - [`compose`]: tiles drawn onto one canvas, each dropped once drawn
//! - [`encode`]: format resolution and encoding
//! - [`export`]: orchestration, off-screen surfaces, hand-off to a sink
//!
//! The content renderer is anything implementing [`ContentRenderer`]. With
//! the `surface` feature (default) the crate ships [`rendering::HtmlSurface`],
//! a pure-Rust off-screen renderer for HTML strings.
//!
//! # Example
//!
//! ```no_run
//! use longshot::rendering::{HtmlSurface, SurfaceConfig};
//! use longshot::{ExportFormat, ExportSource, ImageExportService, Progress};
//!
//! # async fn run() -> longshot::Result<()> {
//! let surface = HtmlSurface::load("<h1>Hello</h1><p>World</p>", SurfaceConfig::default());
//! let service = ImageExportService::default();
//! let mut progress = Progress::new(|p| println!("{:.0}%", p * 100.0));
//! let output = service
//!     .export_single_image(ExportSource::Background(surface), ExportFormat::Png, &mut progress)
//!     .await?;
//! println!("{} bytes as {}", output.bytes.len(), output.format_used);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod capture;
pub mod compose;
pub mod config;
pub mod coverage;
pub mod encode;
pub mod export;
pub mod geometry;
pub mod limits;
pub mod progress;
pub mod readiness;
pub mod renderer;
pub mod sink;
pub mod tiling;

// Built-in off-screen HTML surface
#[cfg(feature = "surface")]
pub mod rendering;

pub use capture::{CapturedTile, LongCapture, TileSnapshotter};
pub use config::ExportConfig;
pub use encode::{resolve_format, EncodedImage, ExportFormat, ImageFormatEncoder};
pub use export::{ExportOutput, ExportSource, ImageExportService};
pub use geometry::{Rect, Size};
pub use limits::ExportLimits;
pub use progress::Progress;
pub use readiness::{evaluate_readiness, ReadinessConfig, ReadinessProber};
pub use renderer::{ContentRenderer, OffscreenSurface, ScrollRestore};
pub use sink::{FileSink, ImageSink, SinkError};
pub use tiling::plan_tiles;

/// Viewport dimensions of a content surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1200,
        }
    }
}
