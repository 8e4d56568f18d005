//! Fragment → element resolution.
//!
//! Mirrors what a browser does when following `#fragment`: an element id
//! wins, otherwise the first `<a name="...">` with exactly that name.

use percent_encoding::percent_decode_str;

use crate::dom::{Document, NodeId};

/// Strip a single leading `#` and percent-decode once.
///
/// Returns `None` for an empty result.
pub fn normalize_fragment(raw: &str) -> Option<String> {
    let raw = raw.strip_prefix('#').unwrap_or(raw);
    let decoded = percent_decode_str(raw).decode_utf8_lossy();
    if decoded.is_empty() {
        None
    } else {
        Some(decoded.into_owned())
    }
}

/// Resolve a URL fragment to an element of `doc`.
///
/// Accepts `"#name"`, `"name"`, percent-encoded forms, or `None`.
pub fn resolve<'a>(doc: &Document, fragment: impl Into<Option<&'a str>>) -> Option<NodeId> {
    let name = normalize_fragment(fragment.into()?)?;
    if let Some(id) = doc.element_by_id(&name) {
        return Some(id);
    }
    doc.descendants(doc.root()).into_iter().find(|n| {
        let node = doc.node(*n);
        node.is_element() && node.tag == "a" && node.attr("name") == Some(name.as_str())
    })
}
