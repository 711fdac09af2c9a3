//! Off-screen HTML surface
//!
//! A small pure-Rust content renderer: lays an HTML document out once, keeps
//! a display list of it, and rasterizes any region on request. It behaves
//! like a real embedded view where it matters to the capture pipeline:
//! diagram scripts finish a few polls after load, and scrolling takes a
//! poll or two to settle.

pub mod layout;
pub mod paint;
pub mod raster;

use image::RgbaImage;
use scraper::Html;
use serde_json::{json, Value};

use crate::geometry::{Rect, Size};
use crate::readiness::{evaluate_readiness, READY_FLAG};
use crate::renderer::ContentRenderer;
use crate::{Error, Result, Viewport};

use layout::DocumentLayout;
use paint::PaintCommand;

/// Behaviour of an [`HtmlSurface`]
#[derive(Debug, Clone)]
pub struct SurfaceConfig {
    pub viewport: Viewport,
    /// Readiness polls before a `scroll_to` takes effect
    pub scroll_settle_polls: u32,
    /// Readiness polls before diagram scripts report completion
    pub script_polls: u32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            scroll_settle_polls: 1,
            script_polls: 2,
        }
    }
}

pub struct HtmlSurface {
    config: SurfaceConfig,
    layout: DocumentLayout,
    commands: Vec<PaintCommand>,
    scripts_remaining: u32,
    offset: f64,
    pending_offset: Option<f64>,
    settle_remaining: u32,
    polls: u64,
    torn_down: bool,
}

impl HtmlSurface {
    /// Parse and lay out `html` at the configured viewport width.
    pub fn load(html: &str, config: SurfaceConfig) -> Self {
        let document = Html::parse_document(html);
        let layout = layout::layout_document(&document, config.viewport.width);
        let scripts_remaining = if layout.diagram_count() == 0 { 0 } else { config.script_polls };
        let rendered = if scripts_remaining == 0 { layout.diagram_count() } else { 0 };
        let commands = paint::build_display_list(&layout, rendered);
        log::debug!(
            "laid out {} block(s), {}x{}, {} diagram(s)",
            layout.nodes.len(),
            layout.width,
            layout.height,
            layout.diagram_count()
        );
        Self {
            config,
            layout,
            commands,
            scripts_remaining,
            offset: 0.0,
            pending_offset: None,
            settle_remaining: 0,
            polls: 0,
            torn_down: false,
        }
    }

    pub fn document_size(&self) -> Size {
        Size::new(self.layout.width, self.layout.height)
    }

    pub fn layout(&self) -> &DocumentLayout {
        &self.layout
    }

    /// Number of readiness polls answered so far
    pub fn polls(&self) -> u64 {
        self.polls
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// The page's ready signal, in the shape pages report it.
    pub fn ready_signal(&self) -> Value {
        if self.torn_down {
            return json!("loading");
        }
        json!({
            "readyState": "complete",
            READY_FLAG: self.scripts_remaining == 0,
        })
    }

    fn advance(&mut self) {
        self.polls += 1;

        if self.scripts_remaining > 0 {
            self.scripts_remaining -= 1;
            if self.scripts_remaining == 0 {
                log::debug!("diagram scripts finished after {} poll(s)", self.polls);
                self.commands =
                    paint::build_display_list(&self.layout, self.layout.diagram_count());
            }
        }

        if let Some(target) = self.pending_offset {
            if self.settle_remaining == 0 {
                self.offset = target;
                self.pending_offset = None;
            } else {
                self.settle_remaining -= 1;
            }
        }
    }
}

impl ContentRenderer for HtmlSurface {
    async fn measure(&mut self) -> Option<Size> {
        if self.torn_down {
            None
        } else {
            Some(self.document_size())
        }
    }

    async fn is_ready(&mut self) -> bool {
        self.advance();
        evaluate_readiness(&self.ready_signal())
    }

    fn scroll_to(&mut self, offset_y: f64) {
        let target = offset_y.max(0.0);
        if self.config.scroll_settle_polls == 0 {
            self.offset = target;
            self.pending_offset = None;
            return;
        }
        let already_there = self.pending_offset.is_none() && self.offset == target;
        if self.pending_offset == Some(target) || already_there {
            return;
        }
        self.pending_offset = Some(target);
        self.settle_remaining = self.config.scroll_settle_polls;
    }

    fn scroll_offset(&self) -> f64 {
        self.offset
    }

    fn is_scroll_idle(&self) -> bool {
        self.pending_offset.is_none()
    }

    fn viewport_height(&self) -> f64 {
        self.config.viewport.height as f64
    }

    async fn capture_region(&mut self, rect: Rect, scale: f64) -> Result<RgbaImage> {
        tokio::task::yield_now().await;
        if self.torn_down || !(scale.is_finite() && scale > 0.0) {
            return Err(Error::SnapshotFailed);
        }
        let (w, h) = raster::output_size(rect, scale);
        if w == 0 || h == 0 {
            return Err(Error::SnapshotFailed);
        }
        Ok(raster::rasterize_region(&self.commands, rect, scale))
    }

    fn teardown(&mut self) {
        self.torn_down = true;
        self.commands.clear();
        self.pending_offset = None;
    }
}
