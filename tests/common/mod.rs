//! Scripted content renderer shared by the integration tests.
#![allow(dead_code)]

pub mod peak_alloc;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use image::{Rgba, RgbaImage};
use longshot::{ContentRenderer, Error, Progress, Rect, Result, Size};

/// A renderer whose convergence is scripted poll by poll.
pub struct ScriptedRenderer {
    pub size: Size,
    pub viewport: f64,
    pub offset: f64,
    /// `is_ready` answers false for this many polls
    pub not_ready_polls: u32,
    /// Polls a `scroll_to` takes to apply
    pub settle_polls: u32,
    /// Answers for `is_scroll_idle`, one per poll; `true` once exhausted
    pub idle_pattern: VecDeque<bool>,
    /// Answers for `measure`, one per call; `size` once exhausted
    pub measurements: VecDeque<Size>,
    /// After this many captures the document reports `Size`
    pub resize_after_captures: Option<(usize, Size)>,
    /// Multiplies the height of captured buffers
    pub capture_height_factor: f64,
    pub fail_capture_at: Option<usize>,
    pub loading: bool,

    pub ready_polls: u32,
    pub measure_calls: u32,
    pub captures: Vec<Rect>,
    pub scrolls: Vec<f64>,
    pub torn_down: Arc<AtomicBool>,

    pending: Option<(f64, u32)>,
    idle_now: bool,
}

impl ScriptedRenderer {
    pub fn new(width: f64, height: f64, viewport: f64) -> Self {
        Self {
            size: Size::new(width, height),
            viewport,
            offset: 0.0,
            not_ready_polls: 0,
            settle_polls: 0,
            idle_pattern: VecDeque::new(),
            measurements: VecDeque::new(),
            resize_after_captures: None,
            capture_height_factor: 1.0,
            fail_capture_at: None,
            loading: false,
            ready_polls: 0,
            measure_calls: 0,
            captures: Vec::new(),
            scrolls: Vec::new(),
            torn_down: Arc::new(AtomicBool::new(false)),
            pending: None,
            idle_now: true,
        }
    }

    pub fn teardown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.torn_down)
    }
}

/// Color a capture is filled with, derived from the tile's content offset.
pub fn tile_color(origin_y: f64) -> Rgba<u8> {
    let y = origin_y.round() as u32;
    Rgba([(y % 251) as u8, ((y / 251) % 251) as u8, 200, 255])
}

impl ContentRenderer for ScriptedRenderer {
    async fn measure(&mut self) -> Option<Size> {
        self.measure_calls += 1;
        if let Some(size) = self.measurements.pop_front() {
            return Some(size);
        }
        if let Some((after, size)) = self.resize_after_captures {
            if self.captures.len() >= after {
                return Some(size);
            }
        }
        Some(self.size)
    }

    async fn is_ready(&mut self) -> bool {
        self.ready_polls += 1;
        self.idle_now = self.idle_pattern.pop_front().unwrap_or(true);
        if let Some((target, remaining)) = self.pending {
            if remaining == 0 {
                self.offset = target;
                self.pending = None;
            } else {
                self.pending = Some((target, remaining - 1));
            }
        }
        self.ready_polls > self.not_ready_polls
    }

    fn scroll_to(&mut self, offset_y: f64) {
        self.scrolls.push(offset_y);
        if self.settle_polls == 0 {
            self.offset = offset_y;
        } else {
            self.pending = Some((offset_y, self.settle_polls));
        }
    }

    fn scroll_offset(&self) -> f64 {
        self.offset
    }

    fn is_scroll_idle(&self) -> bool {
        self.idle_now && self.pending.is_none()
    }

    fn viewport_height(&self) -> f64 {
        self.viewport
    }

    async fn capture_region(&mut self, rect: Rect, scale: f64) -> Result<RgbaImage> {
        if self.fail_capture_at == Some(self.captures.len()) {
            return Err(Error::SnapshotFailed);
        }
        self.captures.push(rect);
        let w = (rect.width * scale).round() as u32;
        let h = (rect.height * scale * self.capture_height_factor).round() as u32;
        Ok(RgbaImage::from_pixel(w, h, tile_color(rect.y)))
    }

    fn is_loading(&self) -> bool {
        self.loading
    }

    fn teardown(&mut self) {
        self.torn_down.store(true, Ordering::SeqCst);
    }
}

/// A progress reporter that records every emitted value.
pub fn recording_progress() -> (Progress, Arc<Mutex<Vec<f64>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let progress = Progress::new(move |v| sink.lock().unwrap().push(v));
    (progress, seen)
}
