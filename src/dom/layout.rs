//! Approximate block layout for documents that have no rendering engine
//! behind them.
//!
//! Hosts embedded in a real browser report measured [`BoxMetrics`] instead;
//! this pass exists so headless hosts still get stable anchor positions and a
//! body content height to feed the resize observation.

use crate::dom::{BoxMetrics, Document, NodeId, NodeType};

const BLOCK_TAGS: &[&str] = &[
    "html",
    "body",
    "div",
    "p",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "ul",
    "ol",
    "li",
    "dl",
    "dt",
    "dd",
    "table",
    "tr",
    "form",
    "section",
    "article",
    "aside",
    "main",
    "header",
    "footer",
    "nav",
    "blockquote",
    "pre",
    "figure",
    "figcaption",
    "details",
    "summary",
];

/// Elements that never produce a box.
const NO_BOX_TAGS: &[&str] = &["head", "title", "meta", "link", "base", "script", "style"];

/// Per-tag vertical margins (top, bottom) in pixels.
fn tag_margins(tag: &str) -> (f32, f32) {
    match tag {
        "h1" => (24.0, 16.0),
        "h2" => (20.0, 12.0),
        "h3" | "h4" => (16.0, 10.0),
        "h5" | "h6" => (12.0, 8.0),
        "p" => (4.0, 10.0),
        "ul" | "ol" | "dl" => (8.0, 8.0),
        "li" => (2.0, 2.0),
        "section" | "article" | "main" => (16.0, 16.0),
        "nav" | "header" | "footer" => (12.0, 12.0),
        "blockquote" => (12.0, 12.0),
        "pre" => (8.0, 8.0),
        _ => (0.0, 0.0),
    }
}

/// Per-tag padding in pixels.
fn tag_padding(tag: &str, is_block: bool) -> f32 {
    match tag {
        "section" | "article" | "main" | "aside" => 16.0,
        "nav" | "header" | "footer" => 12.0,
        "blockquote" => 20.0,
        _ if is_block => 4.0,
        _ => 0.0,
    }
}

/// Lay out the whole document top-to-bottom and store the boxes on each
/// node. Returns the body's content height (0 when there is no body).
pub fn compute_layout(doc: &mut Document, viewport_width: f32) -> f32 {
    let mut cursor_y = 0.0;
    let root = doc.root();
    for child in doc.children(root).to_vec() {
        layout_node(doc, child, &mut cursor_y, viewport_width, 16.0);
    }
    doc.body().map(|b| doc.metrics(b).height).unwrap_or(0.0)
}

fn layout_node(
    doc: &mut Document,
    id: NodeId,
    cursor_y: &mut f32,
    available_width: f32,
    parent_font_size: f32,
) {
    let node = doc.node(id);
    let tag = node.tag.clone();
    let node_type = node.node_type;

    let hidden = node_type == NodeType::Element
        && (NO_BOX_TAGS.contains(&tag.as_str()) || doc.is_hidden(id));
    if hidden {
        *doc.metrics_mut(id) = BoxMetrics {
            top: *cursor_y,
            ..BoxMetrics::default()
        };
        return;
    }

    if node_type == NodeType::Text {
        // Text content contributes to height
        let line_height = parent_font_size * 1.4;
        let chars_per_line = (available_width / (parent_font_size * 0.6)).max(1.0) as usize;
        let text_len = doc.node(id).text.trim().len();
        let lines = (text_len as f32 / chars_per_line as f32).ceil().max(1.0);
        let top = *cursor_y;
        *cursor_y += lines * line_height;
        *doc.metrics_mut(id) = BoxMetrics {
            top,
            width: available_width,
            height: lines * line_height,
            ..BoxMetrics::default()
        };
        return;
    }

    let is_block = BLOCK_TAGS.contains(&tag.as_str());
    let font_size = match tag.as_str() {
        "h1" => 32.0,
        "h2" => 24.0,
        "h3" => 20.0,
        "h4" => 18.0,
        "h5" | "h6" => 16.0,
        "small" => 12.0,
        _ => parent_font_size,
    };

    let (margin_top, margin_bottom) = if is_block { tag_margins(&tag) } else { (0.0, 0.0) };
    let padding = tag_padding(&tag, is_block);

    *cursor_y += margin_top;
    let start_y = *cursor_y;
    *cursor_y += padding;

    let child_width = (available_width - padding * 2.0).max(0.0);
    for child in doc.children(id).to_vec() {
        layout_node(doc, child, cursor_y, child_width, font_size);
    }

    *cursor_y += padding;
    let height = *cursor_y - start_y;
    *cursor_y += margin_bottom;

    *doc.metrics_mut(id) = BoxMetrics {
        top: start_y,
        width: available_width,
        height,
        margin_top,
        margin_bottom,
    };
}
