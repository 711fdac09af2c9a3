//! The tile capture loop
//!
//! Measures the document, plans tiles, then walks them top to bottom:
//! re-measure, scroll, wait for the tile to settle, capture, validate, draw.
//! Tiles are captured strictly in order because they all share one renderer,
//! and each buffer is drawn onto the canvas and dropped before the next
//! capture starts.

use image::RgbaImage;

use crate::compose::Compositor;
use crate::coverage;
use crate::geometry::{Rect, Size};
use crate::limits::ExportLimits;
use crate::progress::Progress;
use crate::readiness::{ReadinessConfig, ReadinessProber};
use crate::renderer::{ContentRenderer, ScrollRestore};
use crate::tiling::plan_tiles;
use crate::{Error, Result};

/// Progress reported before the document readiness wait
pub const PROGRESS_START: f64 = 0.05;
/// Progress at the start of the tile loop
pub const PROGRESS_CAPTURE_BASE: f64 = 0.1;
/// Share of the progress range spent capturing tiles
pub const PROGRESS_CAPTURE_SHARE: f64 = 0.8;
/// Progress once the canvas has been composed
pub const PROGRESS_COMPOSED: f64 = 0.95;

/// A captured strip and where it goes on the canvas.
#[derive(Debug, Clone)]
pub struct CapturedTile {
    /// Tile rect scaled into canvas space
    pub destination: Rect,
    pub pixels: RgbaImage,
}

impl CapturedTile {
    pub fn new(destination: Rect, pixels: RgbaImage) -> Self {
        Self { destination, pixels }
    }
}

/// A fully captured document, drawn onto one canvas.
#[derive(Debug)]
pub struct LongCapture {
    /// Document size measured before planning
    pub document: Size,
    /// Canvas-per-content-unit factor
    pub scale: f64,
    /// Scaled document height (unrounded)
    pub canvas_height: f64,
    /// Canvas-space destination of every drawn tile, top to bottom
    pub tiles: Vec<Rect>,
    pub canvas: RgbaImage,
}

/// Check a captured buffer against the size its tile should have produced.
///
/// Each axis may be off by `max(4px, 10%)` of the expected length.
pub fn validate_tile_shape(pixels: &RgbaImage, tile: Size, scale: f64) -> Result<()> {
    let expected_width = tile.width * scale;
    let expected_height = tile.height * scale;
    let width_delta = (pixels.width() as f64 - expected_width).abs();
    let height_delta = (pixels.height() as f64 - expected_height).abs();

    if width_delta <= (expected_width * 0.1).max(4.0)
        && height_delta <= (expected_height * 0.1).max(4.0)
    {
        Ok(())
    } else {
        log::warn!(
            "captured tile is {}x{}, expected about {:.1}x{:.1}",
            pixels.width(),
            pixels.height(),
            expected_width,
            expected_height
        );
        Err(Error::IncompleteTileCapture)
    }
}

/// Captures the full scrollable content of a renderer as one image.
#[derive(Debug, Clone)]
pub struct TileSnapshotter {
    limits: ExportLimits,
    prober: ReadinessProber,
}

impl TileSnapshotter {
    pub fn new(limits: ExportLimits, readiness: ReadinessConfig) -> Self {
        Self {
            limits,
            prober: ReadinessProber::new(readiness),
        }
    }

    pub fn limits(&self) -> &ExportLimits {
        &self.limits
    }

    pub fn prober(&self) -> &ReadinessProber {
        &self.prober
    }

    /// Capture and compose the whole document into one canvas.
    pub async fn snapshot_long_image<R: ContentRenderer>(
        &self,
        renderer: &mut R,
        progress: &mut Progress,
    ) -> Result<RgbaImage> {
        let capture = self.capture_tiles(renderer, progress).await?;
        progress.report(PROGRESS_COMPOSED);
        Ok(capture.canvas)
    }

    /// Capture every tile of the document onto one canvas and verify the
    /// tiles cover it. The canvas is discarded when coverage fails.
    ///
    /// The renderer's scroll offset is restored before this returns, on
    /// every path, including when the future is dropped.
    pub async fn capture_tiles<R: ContentRenderer>(
        &self,
        renderer: &mut R,
        progress: &mut Progress,
    ) -> Result<LongCapture> {
        self.limits.validate()?;
        let tolerance = self.prober.config().size_tolerance;

        progress.report(PROGRESS_START);
        self.prober.wait_for_document(renderer).await?;

        let document = renderer.measure().await.unwrap_or_default();
        if !document.is_positive() {
            return Err(Error::UnableToMeasureContent);
        }
        if !self.limits.is_within_budget(document.height) {
            log::warn!(
                "document height {} exceeds budget of {} pixels at width {}",
                document.height,
                self.limits.max_pixel_count,
                self.limits.target_width
            );
            return Err(Error::ContentExceedsLimit);
        }

        let scale = self.limits.target_width as f64 / document.width;
        let canvas_height = document.height * scale;
        let rects = plan_tiles(
            document,
            renderer.viewport_height().max(1.0),
            self.limits.tile_height,
        );
        log::info!(
            "capturing {:.0}x{:.0} document in {} tile(s) at scale {:.3}",
            document.width,
            document.height,
            rects.len(),
            scale
        );

        let mut compositor = Compositor::new(self.limits.target_width, canvas_height)?;
        let mut renderer = ScrollRestore::new(renderer);
        let total = rects.len().max(1) as f64;

        for (index, rect) in rects.iter().enumerate() {
            let latest = renderer.measure().await.unwrap_or_default();
            if !latest.approx_eq(&document, tolerance) {
                log::warn!(
                    "layout drifted from {:?} to {:?} before tile {}",
                    document,
                    latest,
                    index
                );
                return Err(Error::UnstableContentLayout);
            }

            renderer.scroll_to(rect.min_y());
            self.prober
                .wait_for_tile(&mut *renderer, rect.min_y(), index == 0)
                .await?;

            let pixels = renderer.capture_region(*rect, scale).await?;
            validate_tile_shape(&pixels, rect.size(), scale)?;
            log::debug!(
                "captured tile {}/{} at y={} ({}x{})",
                index + 1,
                rects.len(),
                rect.min_y(),
                pixels.width(),
                pixels.height()
            );

            let destination = Rect::new(
                0.0,
                rect.min_y() * scale,
                rect.width * scale,
                rect.height * scale,
            );
            compositor.draw(CapturedTile::new(destination, pixels));

            let done = (index + 1) as f64 / total;
            progress.report(PROGRESS_CAPTURE_BASE + done * PROGRESS_CAPTURE_SHARE);
        }
        drop(renderer);

        coverage::validate_coverage(compositor.placed(), canvas_height, tolerance)?;

        let tiles = compositor.placed().to_vec();
        Ok(LongCapture {
            document,
            scale,
            canvas_height,
            tiles,
            canvas: compositor.into_canvas(),
        })
    }
}
