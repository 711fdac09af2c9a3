/// Block layout for the off-screen surface
///
/// Stacks the document's blocks vertically across its full height. Text is
/// wrapped on an 8px monospace grid; diagrams reserve a fixed box so their
/// late rendering never moves anything below them.

use scraper::{ElementRef, Html, Selector};

use crate::geometry::Rect;

/// Glyph cell width at scale 1
pub const CHAR_WIDTH: u32 = 8;
/// Line height at scale 1
pub const LINE_HEIGHT: u32 = 12;
/// Page padding around the content column
pub const PAGE_PADDING: u32 = 24;
/// Height reserved for a diagram block
pub const DIAGRAM_HEIGHT: u32 = 240;

const BLOCK_SELECTOR: &str = "h1, h2, h3, h4, h5, h6, p, li, pre, blockquote, hr, .mermaid";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementType {
    Heading(u8),
    Paragraph,
    ListItem,
    Code,
    Quote,
    Rule,
    Diagram,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxModel {
    pub margin: u32,
    pub padding: u32,
}

#[derive(Debug, Clone)]
pub struct LayoutNode {
    /// Border box in content space
    pub rect: Rect,
    pub box_model: BoxModel,
    /// Wrapped text, one entry per line
    pub lines: Vec<String>,
    pub elem_type: ElementType,
    pub scale: u32,
}

impl LayoutNode {
    pub fn content_origin(&self) -> (f64, f64) {
        let p = self.box_model.padding as f64;
        (self.rect.x + p, self.rect.y + p)
    }
}

/// Laid-out document: blocks plus total size.
#[derive(Debug, Clone)]
pub struct DocumentLayout {
    pub nodes: Vec<LayoutNode>,
    pub width: f64,
    pub height: f64,
}

impl DocumentLayout {
    pub fn diagram_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| n.elem_type == ElementType::Diagram)
            .count()
    }
}

fn classify(el: &ElementRef<'_>) -> ElementType {
    if el.value().classes().any(|c| c == "mermaid") {
        return ElementType::Diagram;
    }
    match el.value().name() {
        "h1" => ElementType::Heading(1),
        "h2" => ElementType::Heading(2),
        "h3" => ElementType::Heading(3),
        "h4" => ElementType::Heading(4),
        "h5" => ElementType::Heading(5),
        "h6" => ElementType::Heading(6),
        "li" => ElementType::ListItem,
        "pre" => ElementType::Code,
        "blockquote" => ElementType::Quote,
        "hr" => ElementType::Rule,
        _ => ElementType::Paragraph,
    }
}

/// A block nested in another selected block is drawn by its ancestor.
fn is_nested_block(el: &ElementRef<'_>) -> bool {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| {
            matches!(a.value().name(), "li" | "pre" | "blockquote")
                || a.value().classes().any(|c| c == "mermaid")
        })
}

fn wrap_text(text: &str, chars_per_line: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut cur = String::new();
    for word in text.split_whitespace() {
        if cur.len() + word.len() + 1 > chars_per_line && !cur.is_empty() {
            lines.push(std::mem::take(&mut cur));
        }
        if !cur.is_empty() {
            cur.push(' ');
        }
        cur.push_str(word);
    }
    if !cur.is_empty() {
        lines.push(cur);
    }
    lines
}

/// Lay out `document` in a column `page_width` wide.
pub fn layout_document(document: &Html, page_width: u32) -> DocumentLayout {
    let page_width = page_width.max(PAGE_PADDING * 2 + CHAR_WIDTH * 4);
    let column_width = page_width - PAGE_PADDING * 2;
    let mut y = PAGE_PADDING;
    let mut nodes = Vec::new();

    let selector = match Selector::parse(BLOCK_SELECTOR) {
        Ok(sel) => sel,
        Err(_) => {
            return DocumentLayout {
                nodes,
                width: page_width as f64,
                height: (PAGE_PADDING * 2) as f64,
            }
        }
    };

    for el in document.select(&selector) {
        if is_nested_block(&el) {
            continue;
        }
        let elem_type = classify(&el);
        let (scale, margin, padding) = match elem_type {
            ElementType::Heading(1) => (3, 16, 4),
            ElementType::Heading(2) => (2, 12, 4),
            ElementType::Heading(_) => (1, 10, 4),
            ElementType::Code | ElementType::Quote => (1, 10, 10),
            ElementType::Diagram => (1, 12, 0),
            _ => (1, 6, 4),
        };

        let content_w = column_width.saturating_sub(padding * 2);
        let chars_per_line = ((content_w / (CHAR_WIDTH * scale)) as usize).max(1);
        let raw = el.text().collect::<String>();
        let lines = match elem_type {
            // Code keeps its own line breaks and is clipped, not wrapped.
            ElementType::Code => raw
                .trim_end_matches('\n')
                .lines()
                .map(|l| l.chars().take(chars_per_line).collect())
                .collect(),
            ElementType::Rule | ElementType::Diagram => Vec::new(),
            ElementType::ListItem => wrap_text(&format!("- {}", raw.trim()), chars_per_line),
            _ => wrap_text(&raw, chars_per_line),
        };

        let box_h = match elem_type {
            ElementType::Diagram => DIAGRAM_HEIGHT,
            ElementType::Rule => 2,
            _ => (lines.len() as u32).max(1) * LINE_HEIGHT * scale + padding * 2,
        };

        nodes.push(LayoutNode {
            rect: Rect::new(PAGE_PADDING as f64, y as f64, column_width as f64, box_h as f64),
            box_model: BoxModel { margin, padding },
            lines,
            elem_type,
            scale,
        });
        y += box_h + margin;
    }

    DocumentLayout {
        nodes,
        width: page_width as f64,
        height: (y + PAGE_PADDING) as f64,
    }
}
