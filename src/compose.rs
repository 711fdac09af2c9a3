//! Composition of captured tiles into one canvas

use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::capture::CapturedTile;
use crate::geometry::Rect;
use crate::{Error, Result};

/// Pixel height of a canvas for a scaled document height.
pub fn canvas_height(scaled_height: f64) -> u32 {
    scaled_height.round().max(1.0) as u32
}

/// A canvas that tiles are drawn into as they arrive.
///
/// Each tile's buffer is consumed and dropped once drawn, so peak memory is
/// the canvas plus the tile in hand. Only destination rects are kept, for
/// the coverage check.
#[derive(Debug)]
pub struct Compositor {
    canvas: RgbaImage,
    placed: Vec<Rect>,
}

impl Compositor {
    /// Allocate a `width` x `canvas_height(height)` canvas.
    pub fn new(width: u32, height: f64) -> Result<Self> {
        if width == 0 || !(height.is_finite() && height > 0.0) {
            return Err(Error::IncompleteComposedImage);
        }
        Ok(Self {
            canvas: RgbaImage::new(width, canvas_height(height)),
            placed: Vec::new(),
        })
    }

    pub fn draw(&mut self, tile: CapturedTile) {
        self.placed.push(tile.destination);
        draw_tile(&mut self.canvas, tile);
    }

    /// Destination rects of every tile drawn so far
    pub fn placed(&self) -> &[Rect] {
        &self.placed
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.canvas.dimensions()
    }

    pub fn into_canvas(self) -> RgbaImage {
        self.canvas
    }
}

/// Draw `tiles` into a fresh `width` x `canvas_height(height)` canvas.
///
/// A buffer that is close to, but not exactly, its destination size is
/// resampled to fit.
pub fn compose<I>(width: u32, height: f64, tiles: I) -> Result<RgbaImage>
where
    I: IntoIterator<Item = CapturedTile>,
{
    let mut compositor = Compositor::new(width, height)?;
    for tile in tiles {
        compositor.draw(tile);
    }
    Ok(compositor.into_canvas())
}

fn draw_tile(canvas: &mut RgbaImage, tile: CapturedTile) {
    let dest = tile.destination;
    // Round edges rather than sizes so adjacent tiles meet without a seam.
    let top = dest.min_y().round();
    let dest_height = (dest.max_y().round() - top).max(0.0) as u32;
    let dest_width = dest.width.round().max(0.0) as u32;
    if dest_width == 0 || dest_height == 0 {
        log::debug!("skipping empty tile at y={}", dest.min_y());
        return;
    }

    let pixels = tile.pixels;
    if pixels.dimensions() == (dest_width, dest_height) {
        imageops::replace(canvas, &pixels, dest.x.round() as i64, top as i64);
    } else {
        let fitted = imageops::resize(&pixels, dest_width, dest_height, FilterType::Triangle);
        drop(pixels);
        imageops::replace(canvas, &fitted, dest.x.round() as i64, top as i64);
    }
}
