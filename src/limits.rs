//! Export limits and the pixel budget policy

use serde::{Deserialize, Serialize};

/// Immutable sizing configuration for one export.
///
/// `target_width` is the output canvas width in pixels. `max_pixel_count`
/// bounds `target_width * content_height` (measured in content units, before
/// scaling). `tile_height` bounds the content-space height of one tile.
///
/// # Examples
///
/// ```
/// let limits = longshot::ExportLimits::default();
/// assert!(limits.is_within_budget(5_000.0));
/// assert!(!limits.is_within_budget(100_000.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportLimits {
    pub target_width: u32,
    pub max_pixel_count: u64,
    pub tile_height: f64,
}

/// Smallest canvas width a device-fitted configuration may pick.
pub const MIN_TARGET_WIDTH: u32 = 320;

impl Default for ExportLimits {
    fn default() -> Self {
        Self {
            target_width: 1080,
            max_pixel_count: 40_000_000,
            tile_height: 2048.0,
        }
    }
}

impl ExportLimits {
    /// Default limits with the target width fitted to a screen of
    /// `screen_width_points` at `screen_scale` pixels per point.
    pub fn device_fitted(screen_width_points: f64, screen_scale: f64) -> Self {
        let fitted = (screen_width_points * screen_scale).floor();
        let target_width = if fitted.is_finite() && fitted > MIN_TARGET_WIDTH as f64 {
            fitted as u32
        } else {
            MIN_TARGET_WIDTH
        };
        Self {
            target_width,
            ..Self::default()
        }
    }

    pub fn estimated_pixel_count(&self, content_height: f64) -> f64 {
        self.target_width as f64 * content_height
    }

    /// Whether a document of `content_height` may be captured at all.
    pub fn is_within_budget(&self, content_height: f64) -> bool {
        self.estimated_pixel_count(content_height) <= self.max_pixel_count as f64
    }

    pub(crate) fn validate(&self) -> crate::Result<()> {
        if self.target_width < MIN_TARGET_WIDTH {
            return Err(crate::Error::Config(format!(
                "target_width must be at least {MIN_TARGET_WIDTH}, got {}",
                self.target_width
            )));
        }
        if !(self.tile_height.is_finite() && self.tile_height > 0.0) {
            return Err(crate::Error::Config("tile_height must be positive".into()));
        }
        Ok(())
    }
}
