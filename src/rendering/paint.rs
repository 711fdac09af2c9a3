/// Display list for the off-screen surface

use crate::rendering::layout::{DocumentLayout, ElementType, CHAR_WIDTH, LINE_HEIGHT};

pub type Rgba = (u8, u8, u8, u8);

pub const BACKGROUND: Rgba = (255, 255, 255, 255);
pub const TEXT: Rgba = (17, 17, 17, 255);
pub const MUTED: Rgba = (110, 110, 110, 255);
pub const CODE_BACKGROUND: Rgba = (240, 240, 243, 255);
pub const RULE: Rgba = (210, 210, 210, 255);
pub const DIAGRAM_PENDING: Rgba = (228, 228, 228, 255);
pub const DIAGRAM_DONE: Rgba = (214, 232, 250, 255);
pub const DIAGRAM_STROKE: Rgba = (40, 100, 170, 255);

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    SolidRect {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        rgba: Rgba,
    },
    /// A run of text drawn as one glyph cell per character
    Text {
        x: i32,
        y: i32,
        text: String,
        scale: u32,
        rgba: Rgba,
    },
}

/// Build the paint commands for `layout`. The first `rendered_diagrams`
/// diagrams are drawn finished; the rest as placeholders.
pub fn build_display_list(layout: &DocumentLayout, rendered_diagrams: usize) -> Vec<PaintCommand> {
    let mut cmds = vec![PaintCommand::SolidRect {
        x: 0,
        y: 0,
        width: layout.width.ceil() as u32,
        height: layout.height.ceil() as u32,
        rgba: BACKGROUND,
    }];
    let mut diagram_index = 0;

    for node in &layout.nodes {
        let x = node.rect.x as i32;
        let y = node.rect.y as i32;
        let width = node.rect.width as u32;
        let height = node.rect.height as u32;

        match node.elem_type {
            ElementType::Code | ElementType::Quote => {
                cmds.push(PaintCommand::SolidRect { x, y, width, height, rgba: CODE_BACKGROUND });
            }
            ElementType::Rule => {
                cmds.push(PaintCommand::SolidRect { x, y, width, height, rgba: RULE });
            }
            ElementType::Diagram => {
                let done = diagram_index < rendered_diagrams;
                diagram_index += 1;
                let rgba = if done { DIAGRAM_DONE } else { DIAGRAM_PENDING };
                cmds.push(PaintCommand::SolidRect { x, y, width, height, rgba });
                if done {
                    // Two boxes and a connector stand in for the rendered graph.
                    let bw = width / 4;
                    let bh = height / 5;
                    let top = y + (height / 5) as i32;
                    let bottom = y + (3 * height / 5) as i32;
                    let cx = x + (width / 2) as i32;
                    let left = cx - (bw / 2) as i32;
                    let stroke = |x: i32, y: i32, width: u32, height: u32| PaintCommand::SolidRect {
                        x,
                        y,
                        width,
                        height,
                        rgba: DIAGRAM_STROKE,
                    };
                    cmds.push(stroke(left, top, bw, bh));
                    cmds.push(stroke(cx - 1, top + bh as i32, 2, (bottom - top) as u32 - bh));
                    cmds.push(stroke(left, bottom, bw, bh));
                }
            }
            _ => {}
        }

        let rgba = match node.elem_type {
            ElementType::Quote => MUTED,
            _ => TEXT,
        };
        let (ox, oy) = node.content_origin();
        for (i, line) in node.lines.iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            cmds.push(PaintCommand::Text {
                x: ox as i32,
                y: oy as i32 + (i as u32 * LINE_HEIGHT * node.scale) as i32,
                text: line.clone(),
                scale: node.scale,
                rgba,
            });
        }
    }
    cmds
}

/// Width in content units of `text` drawn at `scale`
pub fn text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * CHAR_WIDTH * scale
}
