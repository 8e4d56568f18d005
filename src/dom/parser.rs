use crate::dom::{Document, NodeId};
use scraper::{ElementRef, Html, Node};

/// Tags whose children should be stripped (invisible/script content)
const SKIP_CHILDREN: &[&str] = &["script", "style", "noscript", "svg"];

/// Parse raw HTML string into an owned [`Document`].
///
/// The HTML5 tree builder always synthesizes `<head>` and `<body>`, so
/// documents produced here are structurally complete.
pub fn parse_html(html: &str, url: &str) -> Document {
    let parsed = Html::parse_document(html);

    // Extract <title>
    let title = scraper::Selector::parse("title")
        .ok()
        .and_then(|sel| parsed.select(&sel).next())
        .map(|el| el.text().collect::<String>())
        .unwrap_or_default();

    let mut doc = Document::new(url);
    doc.title = title.trim().to_string();
    let root = doc.root();
    convert_element(&mut doc, root, parsed.root_element());
    doc
}

fn convert_element(doc: &mut Document, parent: NodeId, el: ElementRef<'_>) {
    let tag = el.value().name.local.as_ref().to_string();
    let id = doc.create_element(tag.as_str());
    for (k, v) in el.value().attrs() {
        doc.set_attr(id, k, v);
    }
    doc.append_child(parent, id);

    // Skip children of invisible elements
    if SKIP_CHILDREN.contains(&tag.as_str()) {
        return;
    }

    for child_ref in el.children() {
        match child_ref.value() {
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child_ref) {
                    convert_element(doc, id, child_el);
                }
            }
            Node::Text(t) => {
                let s = t.text.to_string();
                if !s.trim().is_empty() {
                    let text = doc.create_text(s);
                    doc.append_child(id, text);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_html() {
        let html = r#"
        <html>
            <head><title>Test Page</title></head>
            <body>
                <h1 id="top">Hello</h1>
                <p>Content paragraph</p>
            </body>
        </html>
        "#;

        let doc = parse_html(html, "https://example.com/");
        assert_eq!(doc.title, "Test Page");
        assert!(doc.head().is_some());
        let h1 = doc.element_by_id("top").unwrap();
        assert_eq!(doc.text_content(h1), "Hello");
    }

    #[test]
    fn strips_script_children() {
        let html = r#"
        <html><body>
            <p>Visible</p>
            <script>alert("hidden");</script>
        </body></html>
        "#;

        let doc = parse_html(html, "https://example.com/");
        let body = doc.body().unwrap();
        let text = doc.text_content(body);
        assert!(text.contains("Visible"));
        assert!(!text.contains("alert"));
    }

    #[test]
    fn fragment_markup_gets_head_and_body() {
        let doc = parse_html("<a name=\"x\">x</a>", "https://example.com/");
        assert!(doc.head().is_some());
        assert!(doc.body().is_some());
    }
}
