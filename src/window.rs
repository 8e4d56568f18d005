//! Browsing contexts: the host window and the document inside its frame.

use url::Url;

use crate::dom::layout::compute_layout;
use crate::dom::parser::parse_html;
use crate::dom::selector::Selector;
use crate::dom::Document;
use crate::error::DocViewError;

/// Identifies one frame `load` event. Every load gets a fresh id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct LoadId(pub(crate) u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Page,
    Frame,
}

/// A navigation the browser performed as the default action of a click or
/// submit.
#[derive(Debug, Clone, PartialEq)]
pub struct Navigation {
    pub url: Url,
    /// `_top`, `_self`, `_blank`, or a named context.
    pub target: String,
}

/// The top-level page hosting the documentation frame.
#[derive(Debug, Clone)]
pub struct HostWindow {
    pub document: Document,
    pub location: Url,
    /// Width of the host body in CSS pixels.
    pub width: f32,
    pub scroll_y: f32,
    pub focus: Focus,
    /// Entries pushed with `history.pushState`.
    pub history: Vec<Url>,
    pub navigations: Vec<Navigation>,
    scrolls: Vec<f32>,
}

impl HostWindow {
    pub fn new(document: Document, location: Url, width: f32) -> Self {
        Self {
            document,
            location,
            width,
            scroll_y: 0.0,
            focus: Focus::Page,
            history: Vec::new(),
            navigations: Vec::new(),
            scrolls: Vec::new(),
        }
    }

    pub fn scroll_to(&mut self, y: f32) {
        self.scroll_y = y.max(0.0);
        self.scrolls.push(self.scroll_y);
    }

    /// Every programmatic scroll so far, oldest first.
    pub fn scroll_log(&self) -> &[f32] {
        &self.scrolls
    }

    pub fn push_history(&mut self, url: Url) {
        log::debug!("pushState {}", url);
        self.location = url.clone();
        self.history.push(url);
    }

    /// Text of the host `<title>`.
    pub fn title(&self) -> String {
        Selector::parse("title")
            .ok()
            .and_then(|sel| self.document.select_first(&sel))
            .map(|t| self.document.text_content(t))
            .unwrap_or_else(|| self.document.title.clone())
    }

    pub fn set_title(&mut self, title: &str) {
        self.document.title = title.to_string();
        let existing = Selector::parse("title")
            .ok()
            .and_then(|sel| self.document.select_first(&sel));
        match existing {
            Some(t) => self.document.set_text(t, title),
            None => {
                if let Some(head) = self.document.head() {
                    let t = self.document.append_element(head, "title", &[]);
                    self.document.set_text(t, title);
                }
            }
        }
    }
}

/// The document currently shown inside the frame.
#[derive(Debug, Clone)]
pub struct EmbeddedDocument {
    pub document: Document,
    pub url: Url,
    /// Client width of the embedded viewport (excludes its scrollbar).
    pub width: f32,
    pub scroll_y: f32,
    pub(crate) load: LoadId,
    scrolls: Vec<f32>,
}

impl EmbeddedDocument {
    pub fn new(document: Document, width: f32) -> Result<Self, DocViewError> {
        let url = Url::parse(&document.url).map_err(|e| DocViewError::url(&document.url, e))?;
        Ok(Self {
            document,
            url,
            width,
            scroll_y: 0.0,
            load: LoadId::default(),
            scrolls: Vec::new(),
        })
    }

    /// Parse markup and lay it out at `width`, for hosts without a
    /// rendering engine.
    pub fn from_html(html: &str, url: &str, width: f32) -> Result<Self, DocViewError> {
        let mut document = parse_html(html, url);
        compute_layout(&mut document, width);
        Self::new(document, width)
    }

    pub fn load(&self) -> LoadId {
        self.load
    }

    pub fn scroll_to(&mut self, y: f32) {
        self.scroll_y = y.max(0.0);
        self.scrolls.push(self.scroll_y);
    }

    pub fn scroll_log(&self) -> &[f32] {
        &self.scrolls
    }

    /// `<title>` of the embedded document, if any.
    pub fn title(&self) -> Option<String> {
        let from_element = Selector::parse("title")
            .ok()
            .and_then(|sel| self.document.select_first(&sel))
            .map(|t| self.document.text_content(t).trim().to_string());
        from_element
            .filter(|t| !t.is_empty())
            .or_else(|| Some(self.document.title.clone()).filter(|t| !t.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_html_lays_out_content() {
        let doc = EmbeddedDocument::from_html(
            "<html><head><title> Proj docs </title></head><body><h1 id='x'>Hi</h1></body></html>",
            "https://index.example/+doc/proj/index.html",
            800.0,
        )
        .unwrap();
        assert_eq!(doc.title().as_deref(), Some("Proj docs"));
        let body = doc.document.body().unwrap();
        assert!(doc.document.metrics(body).height > 0.0);
    }

    #[test]
    fn rejects_relative_document_urls() {
        let err = EmbeddedDocument::new(Document::new("not a url"), 800.0).unwrap_err();
        assert!(matches!(err, DocViewError::InvalidUrl { .. }));
    }

    #[test]
    fn host_title_is_replaced_in_place() {
        let mut doc = Document::new("https://index.example/");
        let html = doc.append_element(doc.root(), "html", &[]);
        let head = doc.append_element(html, "head", &[]);
        let title = doc.append_element(head, "title", &[]);
        doc.set_text(title, "index");
        let mut host = HostWindow::new(doc, Url::parse("https://index.example/").unwrap(), 1024.0);
        host.set_title("proj 1.0 docs");
        assert_eq!(host.title(), "proj 1.0 docs");
        assert_eq!(host.document.text_content(title), "proj 1.0 docs");
    }

    #[test]
    fn scrolls_are_logged_and_floored_at_zero() {
        let doc = Document::new("https://index.example/");
        let mut host = HostWindow::new(doc, Url::parse("https://index.example/").unwrap(), 1024.0);
        host.scroll_to(120.0);
        host.scroll_to(-5.0);
        assert_eq!(host.scroll_log(), &[120.0, 0.0]);
        assert_eq!(host.scroll_y, 0.0);
    }
}
