/// Rasterizer for the off-screen surface display list

use image::{Rgba as Pixel, RgbaImage};

use crate::geometry::Rect;
use crate::rendering::layout::{CHAR_WIDTH, LINE_HEIGHT};
use crate::rendering::paint::{text_width, PaintCommand, Rgba};

/// Output pixel size of `region` at `scale`
pub fn output_size(region: Rect, scale: f64) -> (u32, u32) {
    let w = (region.width * scale).round().max(0.0) as u32;
    let h = (region.height * scale).round().max(0.0) as u32;
    (w, h)
}

struct Target<'a> {
    img: &'a mut RgbaImage,
    region: Rect,
    scale: f64,
}

impl Target<'_> {
    /// Fill a content-space rect, clipped to the region.
    fn fill(&mut self, x: f64, y: f64, width: f64, height: f64, rgba: Rgba) {
        let to_px = |v: f64, origin: f64| ((v - origin) * self.scale).round();
        let x0 = to_px(x, self.region.x).max(0.0);
        let y0 = to_px(y, self.region.y).max(0.0);
        let x1 = to_px(x + width, self.region.x).min(self.img.width() as f64);
        let y1 = to_px(y + height, self.region.y).min(self.img.height() as f64);
        if x1 <= x0 || y1 <= y0 {
            return;
        }
        let color = Pixel([rgba.0, rgba.1, rgba.2, rgba.3]);
        for py in y0 as u32..y1 as u32 {
            for px in x0 as u32..x1 as u32 {
                self.img.put_pixel(px, py, color);
            }
        }
    }

    fn intersects(&self, y: f64, height: f64) -> bool {
        y < self.region.max_y() && y + height > self.region.min_y()
    }
}

/// Rasterize the part of `commands` inside `region` at `scale`.
pub fn rasterize_region(commands: &[PaintCommand], region: Rect, scale: f64) -> RgbaImage {
    let (w, h) = output_size(region, scale);
    let mut img = RgbaImage::new(w, h);
    let mut target = Target {
        img: &mut img,
        region,
        scale,
    };

    for cmd in commands {
        match cmd {
            PaintCommand::SolidRect { x, y, width, height, rgba } => {
                if target.intersects(*y as f64, *height as f64) {
                    target.fill(*x as f64, *y as f64, *width as f64, *height as f64, *rgba);
                }
            }
            PaintCommand::Text { x, y, text, scale: s, rgba } => {
                let cell_w = (CHAR_WIDTH * s) as f64;
                let line_h = (LINE_HEIGHT * s) as f64;
                if !target.intersects(*y as f64, line_h) || text_width(text, *s) == 0 {
                    continue;
                }
                // Greeked glyphs: one inset block per visible character.
                let inset = *s as f64;
                for (i, ch) in text.chars().enumerate() {
                    if ch.is_whitespace() {
                        continue;
                    }
                    let gx = *x as f64 + i as f64 * cell_w;
                    target.fill(
                        gx + inset,
                        *y as f64 + 2.0 * inset,
                        cell_w - 2.0 * inset,
                        line_h - 5.0 * inset,
                        *rgba,
                    );
                }
            }
        }
    }
    img
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_cmd(y: i32, height: u32, rgba: Rgba) -> PaintCommand {
        PaintCommand::SolidRect { x: 0, y, width: 100, height, rgba }
    }

    #[test]
    fn region_is_translated_and_scaled() {
        let cmds = vec![
            rect_cmd(0, 50, (255, 0, 0, 255)),
            rect_cmd(50, 50, (0, 0, 255, 255)),
        ];
        let img = rasterize_region(&cmds, Rect::new(0.0, 25.0, 100.0, 50.0), 2.0);
        assert_eq!(img.dimensions(), (200, 100));
        assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(0, 49).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(199, 50).0, [0, 0, 255, 255]);
    }

    #[test]
    fn text_draws_dark_cells() {
        let cmds = vec![
            rect_cmd(0, 20, (255, 255, 255, 255)),
            PaintCommand::Text { x: 0, y: 0, text: "a b".into(), scale: 1, rgba: (0, 0, 0, 255) },
        ];
        let img = rasterize_region(&cmds, Rect::new(0.0, 0.0, 100.0, 20.0), 1.0);
        assert_eq!(img.get_pixel(4, 5).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(12, 5).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(20, 5).0, [0, 0, 0, 255]);
    }

    #[test]
    fn output_size_rounds() {
        assert_eq!(output_size(Rect::new(0.0, 0.0, 800.0, 900.0), 1.35), (1080, 1215));
    }
}
