//! In-site link and form rewriting for the embedded document.
//!
//! Documentation is served from a raw location (`base`) but shown to users
//! under a wrapping view route (`baseview`). Links inside the frame point at
//! the raw space; clicking one must land the browser on the matching view
//! URL so the address bar and history stay meaningful.

use std::rc::Rc;

use url::Url;

use crate::anchor;
use crate::config::{DocViewConfig, LinkTarget};
use crate::dom::selector::Selector;
use crate::dom::{Document, NodeId};
use crate::error::DocViewError;
use crate::events::{DelegatedEvent, Effect, EventBus, EventKind};

// ─── URL aliasing ────────────────────────────────────────────────────────────

/// The two prefixes under which the same documentation is reachable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlAliasPair {
    base: String,
    baseview: String,
}

impl UrlAliasPair {
    pub fn new(base: impl Into<String>, baseview: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            baseview: baseview.into(),
        }
    }

    /// Read the pair from the frame element's data attributes.
    pub fn from_frame(doc: &Document, frame: NodeId, config: &DocViewConfig) -> Result<Self, DocViewError> {
        let read = |name: &str| {
            doc.attr(frame, name)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or_else(|| DocViewError::AttributeMissing {
                    attribute: name.to_string(),
                })
        };
        Ok(Self::new(
            read(config.base_url_attribute.as_str())?,
            read(config.baseview_url_attribute.as_str())?,
        ))
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn baseview(&self) -> &str {
        &self.baseview
    }

    pub fn is_view(&self, url: &str) -> bool {
        url.starts_with(&self.baseview)
    }

    /// Swap the raw prefix for the view prefix.
    pub fn to_view(&self, url: &str) -> Option<String> {
        url.strip_prefix(&self.base)
            .map(|rest| format!("{}{}", self.baseview, rest))
    }

    /// Swap the view prefix for the raw prefix.
    pub fn to_base(&self, url: &str) -> Option<String> {
        url.strip_prefix(&self.baseview)
            .map(|rest| format!("{}{}", self.base, rest))
    }
}

// ─── URL helpers ─────────────────────────────────────────────────────────────

/// The URL relative references in `doc` resolve against: its `<base href>`
/// when present, otherwise the document's own URL.
pub fn document_base(doc: &Document, doc_url: &Url) -> Url {
    let href = base_element(doc).and_then(|b| doc.attr(b, "href"));
    match href {
        Some(href) => doc_url.join(href).unwrap_or_else(|_| doc_url.clone()),
        None => doc_url.clone(),
    }
}

/// Resolve a potentially relative reference against the document base.
pub fn absolute_url(doc: &Document, doc_url: &Url, href: &str) -> Result<Url, DocViewError> {
    document_base(doc, doc_url)
        .join(href.trim())
        .map_err(|e| DocViewError::url(href, e))
}

fn base_element(doc: &Document) -> Option<NodeId> {
    let head = doc.head()?;
    doc.children(head)
        .iter()
        .copied()
        .find(|n| doc.node(*n).is_element() && doc.node(*n).tag == "base")
}

fn without_fragment(url: &Url) -> Url {
    let mut u = url.clone();
    u.set_fragment(None);
    let path = u.path().to_string();
    if let Some(dir) = path.strip_suffix("index.html") {
        u.set_path(dir);
    }
    u
}

/// Same document, ignoring fragment and a trailing `index.html`.
fn same_document(a: &Url, b: &Url) -> bool {
    without_fragment(a) == without_fragment(b)
}

/// Navigation target for a link or form: its own `target`, else the
/// document's `<base target>`, else the frame itself.
pub fn effective_target(doc: &Document, element: NodeId) -> String {
    doc.attr(element, "target")
        .or_else(|| base_element(doc).and_then(|b| doc.attr(b, "target")))
        .filter(|t| !t.is_empty())
        .unwrap_or("_self")
        .to_string()
}

// ─── Rewriter ────────────────────────────────────────────────────────────────

/// Delegated click/submit handling for one loaded embedded document.
#[derive(Debug, Clone)]
pub struct LinkRewriter {
    aliases: UrlAliasPair,
    target: LinkTarget,
    document_url: Url,
}

impl LinkRewriter {
    pub fn new(aliases: UrlAliasPair, target: LinkTarget, document_url: Url) -> Self {
        Self {
            aliases,
            target,
            document_url,
        }
    }

    /// Make sure the document has a `<base>` carrying the policy target,
    /// synthesizing `<head>` (and the root element) when missing.
    pub fn prepare_document(&self, doc: &mut Document) {
        let base = match base_element(doc) {
            Some(base) => base,
            None => {
                let head = match doc.head() {
                    Some(head) => head,
                    None => {
                        let html = match doc.document_element() {
                            Some(html) => html,
                            None => doc.append_element(doc.root(), "html", &[]),
                        };
                        let head = doc.create_element("head");
                        doc.prepend_child(html, head);
                        log::debug!("synthesized <head> for {}", self.document_url);
                        head
                    }
                };
                let base = doc.create_element("base");
                doc.prepend_child(head, base);
                base
            }
        };
        doc.set_attr(base, "target", self.target.as_attr());
    }

    /// Register the delegated handlers on `bus`.
    pub fn attach(self: Rc<Self>, bus: &mut EventBus) -> Result<(), DocViewError> {
        let clicks = Rc::clone(&self);
        bus.on(
            EventKind::Click,
            Selector::parse("a[href]")?,
            Rc::new(move |doc: &mut Document, ev: &mut DelegatedEvent| {
                clicks.on_click(doc, ev)
            }),
        );
        let submits = self;
        bus.on(
            EventKind::Submit,
            Selector::parse("form")?,
            Rc::new(move |doc: &mut Document, ev: &mut DelegatedEvent| {
                submits.on_submit(doc, ev)
            }),
        );
        Ok(())
    }

    /// Same-document jump: scroll and update the address bar, no reload.
    fn jump_within(&self, doc: &Document, url: &Url, view: Url, ev: &mut DelegatedEvent) -> bool {
        if url.fragment().is_none() || !same_document(url, &self.document_url) {
            return false;
        }
        let Some(anchor) = anchor::resolve(doc, url.fragment()) else {
            return false;
        };
        log::debug!("in-page jump to #{}", url.fragment().unwrap_or_default());
        ev.push_effect(Effect::ScrollToAnchor(anchor));
        ev.push_effect(Effect::PushHistory(view));
        ev.prevent_default();
        true
    }

    pub fn on_click(&self, doc: &mut Document, ev: &mut DelegatedEvent) {
        let link = ev.current_target;
        let Some(href) = doc.attr(link, "href").map(str::to_string) else {
            return;
        };
        let url = match absolute_url(doc, &self.document_url, &href) {
            Ok(url) => url,
            Err(e) => {
                log::debug!("leaving link alone: {}", e);
                return;
            }
        };

        if let Some(view) = self.aliases.to_view(url.as_str()) {
            let view = match Url::parse(&view) {
                Ok(view) => view,
                Err(e) => {
                    log::debug!("{}", DocViewError::url(&view, e));
                    return;
                }
            };
            self.jump_within(doc, &url, view.clone(), ev);
            match self.target {
                LinkTarget::Top => {
                    log::debug!("rewrote {} -> {}", url, view);
                    doc.set_attr(link, "href", view.as_str());
                }
                LinkTarget::SelfFrame => {
                    if !ev.default_prevented() {
                        ev.push_effect(Effect::PushHistory(view));
                    }
                }
            }
            doc.set_attr(link, "target", self.target.as_attr());
        } else if self.aliases.is_view(url.as_str()) {
            let Some(raw) = self.aliases.to_base(url.as_str()) else {
                return;
            };
            let Ok(raw) = Url::parse(&raw) else {
                return;
            };
            if self.jump_within(doc, &raw, url.clone(), ev) {
                return;
            }
            // Loading the wrapper page inside the frame would nest the host.
            if self.target == LinkTarget::SelfFrame {
                log::debug!("mapped view link {} back to {}", url, raw);
                doc.set_attr(link, "href", raw.as_str());
                doc.set_attr(link, "target", self.target.as_attr());
                ev.push_effect(Effect::PushHistory(url));
            }
        }
    }

    pub fn on_submit(&self, doc: &mut Document, ev: &mut DelegatedEvent) {
        let form = ev.current_target;
        let action = doc.attr(form, "action").unwrap_or("").to_string();
        let url = match absolute_url(doc, &self.document_url, &action) {
            Ok(url) => url,
            Err(e) => {
                log::debug!("leaving form alone: {}", e);
                return;
            }
        };
        let Some(view) = self.aliases.to_view(url.as_str()) else {
            return;
        };
        if self.target == LinkTarget::Top {
            log::debug!("rewrote form action {} -> {}", url, view);
            doc.set_attr(form, "action", &view);
        }
        doc.set_attr(form, "target", self.target.as_attr());
    }
}
