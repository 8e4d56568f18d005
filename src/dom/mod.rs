pub mod css;
pub mod layout;
pub mod parser;
pub mod selector;

use std::collections::HashMap;

use self::selector::Selector;

/// Handle to a node inside a [`Document`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Document,
    Element,
    Text,
}

/// Rendered box of an element, in CSS pixels.
///
/// `top` is relative to the top of the owning document. Hosts with a real
/// layout engine fill these in; otherwise [`layout::compute_layout`] does.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoxMetrics {
    pub top: f32,
    pub width: f32,
    pub height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
}

impl BoxMetrics {
    /// Border-box height, optionally including vertical margins.
    pub fn outer_height(&self, include_margins: bool) -> f32 {
        if include_margins {
            self.height + self.margin_top + self.margin_bottom
        } else {
            self.height
        }
    }

    /// Bottom edge of the margin box. `top` is the border-box top.
    pub fn bottom(&self) -> f32 {
        self.top + self.height + self.margin_bottom
    }
}

/// Internal DOM node representation.
#[derive(Debug, Clone)]
pub struct DomNode {
    pub tag: String,
    pub attributes: HashMap<String, String>,
    pub text: String,
    pub node_type: NodeType,
    pub metrics: BoxMetrics,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl DomNode {
    fn new(node_type: NodeType, tag: String, text: String) -> Self {
        Self {
            tag,
            attributes: HashMap::new(),
            text,
            node_type,
            metrics: BoxMetrics::default(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|c| c.split_ascii_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }
}

/// An owned, mutable document: the host page or the frame's content.
///
/// Nodes live in an arena and are never freed; detached nodes simply stop
/// being reachable from the root.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<DomNode>,
    pub url: String,
    pub title: String,
}

impl Document {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            nodes: vec![DomNode::new(NodeType::Document, "#document".into(), String::new())],
            url: url.into(),
            title: String::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &DomNode {
        &self.nodes[id.0]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether `id` was handed out by this document.
    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    // ─── Construction ────────────────────────────────────────────────────────

    pub fn create_element(&mut self, tag: impl Into<String>) -> NodeId {
        self.push(DomNode::new(NodeType::Element, tag.into(), String::new()))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(DomNode::new(NodeType::Text, String::new(), text.into()))
    }

    fn push(&mut self, node: DomNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(0, child);
    }

    fn detach(&mut self, child: NodeId) {
        if let Some(old) = self.nodes[child.0].parent.take() {
            self.nodes[old.0].children.retain(|c| *c != child);
        }
    }

    /// Create an element with attributes and append it under `parent`.
    pub fn append_element(&mut self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let id = self.create_element(tag);
        for (k, v) in attrs {
            self.set_attr(id, k, v);
        }
        self.append_child(parent, id);
        id
    }

    // ─── Traversal ───────────────────────────────────────────────────────────

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// `id` followed by its ancestors up to the root (bubble order).
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut cursor = Some(id);
        while let Some(node) = cursor {
            path.push(node);
            cursor = self.parent(node);
        }
        path
    }

    /// All nodes under `id` (excluding `id`) in document order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    fn first_element_tagged(&self, under: NodeId, tag: &str) -> Option<NodeId> {
        self.descendants(under)
            .into_iter()
            .find(|n| self.node(*n).is_element() && self.node(*n).tag == tag)
    }

    /// The root `<html>` element.
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(self.root())
            .iter()
            .copied()
            .find(|n| self.node(*n).is_element())
    }

    pub fn head(&self) -> Option<NodeId> {
        self.first_element_tagged(self.document_element()?, "head")
    }

    pub fn body(&self) -> Option<NodeId> {
        self.first_element_tagged(self.document_element()?, "body")
    }

    /// First element in document order carrying `id`.
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .find(|n| self.node(*n).is_element() && self.node(*n).attr("id") == Some(id))
    }

    // ─── Selectors ───────────────────────────────────────────────────────────

    pub fn select(&self, selector: &Selector) -> Vec<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|n| selector.matches(self, *n))
            .collect()
    }

    pub fn select_first(&self, selector: &Selector) -> Option<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .find(|n| selector.matches(self, *n))
    }

    /// Nearest inclusive ancestor of `id` matching `selector`.
    pub fn closest(&self, id: NodeId, selector: &Selector) -> Option<NodeId> {
        self.ancestors(id)
            .into_iter()
            .find(|n| selector.matches(self, *n))
    }

    // ─── Attributes & classes ────────────────────────────────────────────────

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id).attr(name)
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        self.nodes[id.0]
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.node(id).has_class(class)
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if self.has_class(id, class) {
            return;
        }
        let joined = match self.attr(id, "class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {}", existing.trim(), class),
            _ => class.to_string(),
        };
        self.set_attr(id, "class", &joined);
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        let Some(existing) = self.attr(id, "class") else {
            return;
        };
        let kept: Vec<&str> = existing
            .split_ascii_whitespace()
            .filter(|c| *c != class)
            .collect();
        let kept = kept.join(" ");
        self.set_attr(id, "class", &kept);
    }

    pub fn toggle_class(&mut self, id: NodeId, class: &str) {
        if self.has_class(id, class) {
            self.remove_class(id, class);
        } else {
            self.add_class(id, class);
        }
    }

    // ─── Text ────────────────────────────────────────────────────────────────

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut buf = String::new();
        if self.node(id).node_type == NodeType::Text {
            buf.push_str(&self.node(id).text);
        }
        for n in self.descendants(id) {
            if self.node(n).node_type == NodeType::Text {
                buf.push_str(&self.node(n).text);
            }
        }
        buf
    }

    /// Replace all children of `id` with a single text node.
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        let old = std::mem::take(&mut self.nodes[id.0].children);
        for child in old {
            self.nodes[child.0].parent = None;
        }
        let t = self.create_text(text);
        self.append_child(id, t);
    }

    // ─── Inline style & metrics ──────────────────────────────────────────────

    pub fn style(&self, id: NodeId, property: &str) -> Option<String> {
        let decls = css::parse_declarations(self.attr(id, "style")?);
        css::lookup(&decls, property).map(|v| v.to_string())
    }

    pub fn set_style(&mut self, id: NodeId, property: &str, value: &str) {
        let mut decls = css::parse_declarations(self.attr(id, "style").unwrap_or(""));
        css::upsert(&mut decls, property, value);
        let serialized = css::serialize(&decls);
        self.set_attr(id, "style", &serialized);
    }

    /// Whether the element is hidden through an inline `display: none`.
    pub fn is_hidden(&self, id: NodeId) -> bool {
        self.style(id, "display").as_deref() == Some("none")
    }

    pub fn metrics(&self, id: NodeId) -> BoxMetrics {
        self.node(id).metrics
    }

    pub fn metrics_mut(&mut self, id: NodeId) -> &mut BoxMetrics {
        &mut self.nodes[id.0].metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skeleton() -> (Document, NodeId, NodeId) {
        let mut doc = Document::new("https://example.com/");
        let html = doc.append_element(doc.root(), "html", &[]);
        let head = doc.append_element(html, "head", &[]);
        let body = doc.append_element(html, "body", &[]);
        (doc, head, body)
    }

    #[test]
    fn finds_head_body_and_ids() {
        let (mut doc, head, body) = skeleton();
        let p = doc.append_element(body, "p", &[("id", "intro")]);
        assert_eq!(doc.head(), Some(head));
        assert_eq!(doc.body(), Some(body));
        assert_eq!(doc.element_by_id("intro"), Some(p));
        assert_eq!(doc.element_by_id("missing"), None);
    }

    #[test]
    fn ancestors_are_in_bubble_order() {
        let (mut doc, _, body) = skeleton();
        let div = doc.append_element(body, "div", &[]);
        let a = doc.append_element(div, "a", &[]);
        let path = doc.ancestors(a);
        assert_eq!(path[0], a);
        assert_eq!(path[1], div);
        assert_eq!(path[2], body);
        assert_eq!(*path.last().unwrap(), doc.root());
    }

    #[test]
    fn class_helpers_toggle() {
        let (mut doc, _, body) = skeleton();
        let div = doc.append_element(body, "div", &[("class", "toxresult passed")]);
        doc.add_class(div, "closed");
        assert!(doc.has_class(div, "closed"));
        doc.toggle_class(div, "closed");
        doc.toggle_class(div, "opened");
        assert!(!doc.has_class(div, "closed"));
        assert!(doc.has_class(div, "opened"));
        assert_eq!(doc.attr(div, "class"), Some("toxresult passed opened"));
    }

    #[test]
    fn inline_style_round_trips_through_attribute() {
        let (mut doc, _, body) = skeleton();
        doc.set_attr(body, "style", "color: red");
        doc.set_style(body, "overflow", "hidden");
        doc.set_style(body, "color", "blue");
        assert_eq!(doc.style(body, "overflow").as_deref(), Some("hidden"));
        assert_eq!(doc.attr(body, "style"), Some("color: blue; overflow: hidden"));
        doc.set_style(body, "display", "none");
        assert!(doc.is_hidden(body));
    }

    #[test]
    fn prepend_moves_node_to_front() {
        let (mut doc, head, _) = skeleton();
        let meta = doc.append_element(head, "meta", &[]);
        let base = doc.create_element("base");
        doc.prepend_child(head, base);
        assert_eq!(doc.children(head), &[base, meta]);
        assert_eq!(doc.parent(base), Some(head));
    }

    #[test]
    fn set_text_replaces_children() {
        let (mut doc, _, body) = skeleton();
        let span = doc.append_element(body, "span", &[]);
        let t = doc.create_text("old");
        doc.append_child(span, t);
        doc.set_text(span, "new");
        assert_eq!(doc.text_content(span), "new");
        assert_eq!(doc.children(span).len(), 1);
    }

    #[test]
    fn outer_height_includes_margins_on_request() {
        let m = BoxMetrics {
            top: 10.0,
            width: 100.0,
            height: 40.0,
            margin_top: 4.0,
            margin_bottom: 6.0,
        };
        assert_eq!(m.outer_height(false), 40.0);
        assert_eq!(m.outer_height(true), 50.0);
        assert_eq!(m.bottom(), 56.0);
    }
}
