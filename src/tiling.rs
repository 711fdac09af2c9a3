//! Tile planning: split a document into contiguous vertical strips

use crate::geometry::{Rect, Size};

/// Divide `document` into full-width tiles from top to bottom.
///
/// Each tile is at most `clamp(viewport_height, 1, tile_height)` tall; the
/// last one is shortened so its bottom lands exactly on the document height.
/// Documents without a positive, finite height produce no tiles.
pub fn plan_tiles(document: Size, viewport_height: f64, tile_height: f64) -> Vec<Rect> {
    if !(document.height.is_finite() && document.height > 0.0) {
        return Vec::new();
    }

    let max_tile = if tile_height.is_finite() { tile_height.max(1.0) } else { 1.0 };
    let viewport = if viewport_height.is_finite() { viewport_height } else { max_tile };
    let effective = viewport.max(1.0).min(max_tile);

    let mut rects = Vec::with_capacity((document.height / effective).ceil() as usize);
    let mut y = 0.0;
    while y < document.height {
        let remaining = document.height - y;
        let height = effective.min(remaining);
        rects.push(Rect::new(0.0, y, document.width, height));
        y += height;
    }
    rects
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiles_start_at_zero_and_are_continuous() {
        let content = Size::new(800.0, 5200.0);
        let rects = plan_tiles(content, 900.0, 2048.0);

        assert_eq!(rects.len(), 6);
        assert_eq!(rects[0].min_y(), 0.0);
        assert_eq!(rects.last().map(|r| r.max_y()), Some(5200.0));
        for pair in rects.windows(2) {
            assert_eq!(pair[0].max_y(), pair[1].min_y());
        }
        assert!(rects.iter().all(|r| r.height > 0.0 && r.width == 800.0));
    }

    #[test]
    fn short_document_is_one_tile() {
        let rects = plan_tiles(Size::new(640.0, 300.0), 900.0, 2048.0);
        assert_eq!(rects, vec![Rect::new(0.0, 0.0, 640.0, 300.0)]);
    }

    #[test]
    fn tile_height_caps_tall_viewports() {
        let rects = plan_tiles(Size::new(800.0, 5000.0), 4000.0, 2048.0);
        assert_eq!(rects.len(), 3);
        assert_eq!(rects[0].height, 2048.0);
        assert_eq!(rects[2].height, 5000.0 - 4096.0);
    }

    #[test]
    fn degenerate_viewport_is_clamped_to_one() {
        let rects = plan_tiles(Size::new(10.0, 3.5), 0.0, 2048.0);
        assert_eq!(rects.len(), 4);
        assert_eq!(rects[3].height, 0.5);
    }

    #[test]
    fn empty_document_has_no_tiles() {
        assert!(plan_tiles(Size::new(800.0, 0.0), 900.0, 2048.0).is_empty());
        assert!(plan_tiles(Size::new(800.0, f64::INFINITY), 900.0, 2048.0).is_empty());
    }
}
