//! The content renderer contract and the scoped guards around it
//!
//! A renderer owns the laid-out document and the scroll position of the
//! surface it is shown in. The pipeline borrows it exclusively for the whole
//! export, repositions it tile by tile, and puts it back afterwards.

use std::ops::{Deref, DerefMut};

use image::RgbaImage;

use crate::geometry::{Rect, Size};
use crate::Result;

/// A surface that has laid out a document and can capture parts of it.
///
/// Observations (`measure`, `is_ready`, `scroll_offset`, `is_scroll_idle`)
/// must be cheap and safe to call repeatedly; the pipeline polls them.
/// `scroll_to` is fire-and-poll: it may take effect later, and readiness
/// polling decides when the new position can be trusted.
#[allow(async_fn_in_trait)]
pub trait ContentRenderer {
    /// Best-effort measurement of the whole document. `None` when the
    /// renderer cannot tell yet.
    async fn measure(&mut self) -> Option<Size>;

    /// Whether layout and scripted content have finished. Implementations
    /// should answer `false` instead of failing when unsure.
    async fn is_ready(&mut self) -> bool;

    /// Request the capturable region to start at `offset_y`.
    fn scroll_to(&mut self, offset_y: f64);

    /// The scroll offset the surface currently shows.
    fn scroll_offset(&self) -> f64;

    /// `false` while the surface is dragging, decelerating or animating.
    fn is_scroll_idle(&self) -> bool {
        true
    }

    /// Height of the visible viewport in content units.
    fn viewport_height(&self) -> f64;

    /// Capture exactly `rect` (content space) scaled by `scale`.
    ///
    /// Fails with [`crate::Error::SnapshotFailed`] when no image could be
    /// produced.
    async fn capture_region(&mut self, rect: Rect, scale: f64) -> Result<RgbaImage>;

    /// `true` until the first layout pass has completed.
    fn is_loading(&self) -> bool {
        false
    }

    /// Release any off-screen resources backing this renderer.
    fn teardown(&mut self) {}
}

/// Restores a renderer's scroll position when dropped.
///
/// Held across the tile loop so the original position comes back on success,
/// on error, and when the export future is dropped mid-flight.
pub struct ScrollRestore<'a, R: ContentRenderer> {
    renderer: &'a mut R,
    original_offset: f64,
}

impl<'a, R: ContentRenderer> ScrollRestore<'a, R> {
    pub fn new(renderer: &'a mut R) -> Self {
        let original_offset = renderer.scroll_offset();
        Self {
            renderer,
            original_offset,
        }
    }

    pub fn original_offset(&self) -> f64 {
        self.original_offset
    }
}

impl<R: ContentRenderer> Deref for ScrollRestore<'_, R> {
    type Target = R;

    fn deref(&self) -> &R {
        self.renderer
    }
}

impl<R: ContentRenderer> DerefMut for ScrollRestore<'_, R> {
    fn deref_mut(&mut self) -> &mut R {
        self.renderer
    }
}

impl<R: ContentRenderer> Drop for ScrollRestore<'_, R> {
    fn drop(&mut self) {
        log::debug!("restoring scroll offset to {}", self.original_offset);
        self.renderer.scroll_to(self.original_offset);
    }
}

/// Owns a temporary off-screen renderer and tears it down when dropped.
pub struct OffscreenSurface<R: ContentRenderer> {
    renderer: R,
}

impl<R: ContentRenderer> OffscreenSurface<R> {
    pub fn new(renderer: R) -> Self {
        Self { renderer }
    }
}

impl<R: ContentRenderer> Deref for OffscreenSurface<R> {
    type Target = R;

    fn deref(&self) -> &R {
        &self.renderer
    }
}

impl<R: ContentRenderer> DerefMut for OffscreenSurface<R> {
    fn deref_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}

impl<R: ContentRenderer> Drop for OffscreenSurface<R> {
    fn drop(&mut self) {
        log::debug!("tearing down off-screen surface");
        self.renderer.teardown();
    }
}
