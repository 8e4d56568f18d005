//! The host page's header chrome (header, navigation, search panel).
//!
//! Located once per page and handed to the synchronizer explicitly, so that
//! every write to the chrome goes through one owner.

use crate::dom::css::px;
use crate::dom::selector::Selector;
use crate::dom::{Document, NodeId};

/// Clamp a header offset for a given scroll position into `[-height, 0]`.
pub fn clamp_offset(scroll_y: f32, header_height: f32) -> f32 {
    if scroll_y.is_nan() {
        return 0.0;
    }
    (-scroll_y).clamp(-header_height.max(0.0), 0.0)
}

#[derive(Debug, Clone, Default)]
pub struct HeaderChrome {
    elements: Vec<NodeId>,
    resting_tops: Vec<f32>,
    offset: f32,
}

impl HeaderChrome {
    /// First match of each selector, in order, skipping the ones absent
    /// from the page.
    pub fn locate(doc: &Document, selectors: &[Selector]) -> Self {
        let mut elements: Vec<NodeId> = Vec::new();
        for sel in selectors {
            match doc.select_first(sel) {
                Some(id) if !elements.contains(&id) => elements.push(id),
                Some(_) => {}
                None => log::debug!("chrome element {} not on page", sel),
            }
        }
        let resting_tops = elements.iter().map(|e| doc.metrics(*e).top).collect();
        Self {
            elements,
            resting_tops,
            offset: 0.0,
        }
    }

    pub fn elements(&self) -> &[NodeId] {
        &self.elements
    }

    /// The header element proper; the first chrome element found.
    pub fn primary(&self) -> Option<NodeId> {
        self.elements.first().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Current vertical offset applied to the chrome (always `<= 0`).
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Height of the box spanning all chrome elements at rest.
    pub fn height(&self, doc: &Document) -> f32 {
        let mut top = f32::INFINITY;
        let mut bottom = f32::NEG_INFINITY;
        for (el, rest) in self.elements.iter().zip(&self.resting_tops) {
            let m = doc.metrics(*el);
            top = top.min(*rest - m.margin_top);
            bottom = bottom.max(*rest + m.height + m.margin_bottom);
        }
        if top.is_finite() && bottom.is_finite() {
            (bottom - top).max(0.0)
        } else {
            0.0
        }
    }

    /// Re-read resting positions (e.g. after the host re-laid the page out)
    /// and drop any applied offset.
    pub fn rest(&mut self, doc: &mut Document) {
        let offset = self.offset;
        self.resting_tops = self
            .elements
            .iter()
            .map(|e| doc.metrics(*e).top - offset)
            .collect();
        self.apply_offset(doc, 0.0);
    }

    /// Move every chrome element by the same offset from its resting top.
    pub fn apply_offset(&mut self, doc: &mut Document, offset: f32) {
        self.offset = offset;
        for (el, rest) in self.elements.iter().zip(&self.resting_tops) {
            let top = *rest + offset;
            doc.set_style(*el, "top", &px(top));
            doc.metrics_mut(*el).top = top;
        }
    }

    /// Hide-on-scroll policy: follow the embedded scroll offset, clamped.
    pub fn follow_scroll(&mut self, doc: &mut Document, scroll_y: f32) -> f32 {
        let offset = clamp_offset(scroll_y, self.height(doc));
        self.apply_offset(doc, offset);
        offset
    }
}
