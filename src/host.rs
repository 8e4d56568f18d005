//! `DocView`: the documentation page as a whole.
//!
//! Owns the host window, the frame's current document and every piece of
//! per-load state. The embedding host feeds it events through the entry
//! points below; each one applies its effects synchronously and never fails
//! outward. Problems are logged and the event degrades to a no-op.

use std::rc::Rc;

use url::Url;

use crate::config::DocViewConfig;
use crate::dom::selector::Selector;
use crate::dom::{Document, NodeId};
use crate::error::DocViewError;
use crate::events::{DelegatedEvent, Effect, EventBus, EventKind};
use crate::page;
use crate::rewrite::{absolute_url, effective_target, LinkRewriter, UrlAliasPair};
use crate::sync::header::HeaderChrome;
use crate::sync::observer::{ObservationId, ResizeEntry};
use crate::sync::{FrameSynchronizer, SyncContext};
use crate::window::{EmbeddedDocument, Focus, HostWindow, LoadId, Navigation};

pub struct DocView {
    config: DocViewConfig,
    host: HostWindow,
    frame: Option<NodeId>,
    aliases: Option<UrlAliasPair>,
    chrome: HeaderChrome,
    sync: FrameSynchronizer,
    embedded: Option<EmbeddedDocument>,
    /// Handlers attached to the embedded document, tagged with its load.
    frame_bus: Option<(LoadId, EventBus)>,
    page_bus: EventBus,
    loads: u64,
    pending_frame_navigation: Option<Url>,
}

impl DocView {
    /// Document-ready setup for the host page.
    pub fn new(document: Document, location: Url, width: f32, mut config: DocViewConfig) -> Self {
        let frame = match config.frame_selector() {
            Ok(sel) => document.select_first(&sel),
            Err(e) => {
                log::warn!("frame selector: {}", e);
                None
            }
        };
        if let Some(frame) = frame {
            config.apply_frame_overrides(&document, frame);
        } else {
            log::debug!("no documentation frame on {}", location);
        }

        let chrome = HeaderChrome::locate(&document, &config.chrome_selectors());
        let aliases = frame.and_then(|f| match UrlAliasPair::from_frame(&document, f, &config) {
            Ok(aliases) => Some(aliases),
            Err(e) => {
                log::debug!("links stay as they are: {}", e);
                None
            }
        });

        let mut host = HostWindow::new(document, location, width);
        let mut page_bus = EventBus::new();
        let fragment = host.location.fragment().map(str::to_string);
        if let Err(e) = page::install(
            &mut host.document,
            &mut page_bus,
            fragment.as_deref(),
            frame.is_some(),
        ) {
            log::debug!("page decorations skipped: {}", e);
        }

        let sync = FrameSynchronizer::new(config.header_mode, config.copy_title);
        Self {
            config,
            host,
            frame,
            aliases,
            chrome,
            sync,
            embedded: None,
            frame_bus: None,
            page_bus,
            loads: 0,
            pending_frame_navigation: None,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────────

    pub fn config(&self) -> &DocViewConfig {
        &self.config
    }

    pub fn host(&self) -> &HostWindow {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut HostWindow {
        &mut self.host
    }

    pub fn frame(&self) -> Option<NodeId> {
        self.frame
    }

    pub fn aliases(&self) -> Option<&UrlAliasPair> {
        self.aliases.as_ref()
    }

    pub fn chrome(&self) -> &HeaderChrome {
        &self.chrome
    }

    pub fn synchronizer(&self) -> &FrameSynchronizer {
        &self.sync
    }

    pub fn embedded(&self) -> Option<&EmbeddedDocument> {
        self.embedded.as_ref()
    }

    pub fn embedded_mut(&mut self) -> Option<&mut EmbeddedDocument> {
        self.embedded.as_mut()
    }

    /// The observation the host should report body size changes under.
    pub fn active_observation(&self) -> Option<ObservationId> {
        self.sync.active_observation()
    }

    /// Where the frame was last asked to navigate itself.
    pub fn pending_frame_navigation(&self) -> Option<&Url> {
        self.pending_frame_navigation.as_ref()
    }

    // ─── Frame lifecycle ─────────────────────────────────────────────────────

    /// A new document finished loading in the frame.
    pub fn load_frame(&mut self, mut embedded: EmbeddedDocument) -> LoadId {
        self.loads += 1;
        let load = LoadId(self.loads);
        embedded.load = load;
        log::debug!("frame load {:?}: {}", load, embedded.url);
        self.embedded = Some(embedded);
        self.frame_bus = None;
        self.pending_frame_navigation = None;
        self.frame_loaded();
        load
    }

    /// The frame's `load` event fired for the current document. Repeated
    /// calls for the same load change nothing.
    pub fn frame_loaded(&mut self) {
        if let Some((sync, ctx)) = self.sync_parts() {
            if let Err(e) = sync.initialize(ctx) {
                log::debug!("frame sync skipped: {}", e);
            }
        }
        if let Err(e) = self.attach_rewriter() {
            log::debug!("link rewriting skipped: {}", e);
        }
    }

    fn attach_rewriter(&mut self) -> Result<(), DocViewError> {
        let Some(aliases) = self.aliases.clone() else {
            return Ok(());
        };
        let embedded = self.embedded.as_mut().ok_or(DocViewError::FrameMissing)?;
        let load = embedded.load();
        if matches!(&self.frame_bus, Some((attached, _)) if *attached == load) {
            return Ok(());
        }
        let rewriter = LinkRewriter::new(aliases, self.config.link_target, embedded.url.clone());
        rewriter.prepare_document(&mut embedded.document);
        let mut bus = EventBus::new();
        Rc::new(rewriter).attach(&mut bus)?;
        self.frame_bus = Some((load, bus));
        Ok(())
    }

    fn sync_parts(&mut self) -> Option<(&mut FrameSynchronizer, SyncContext<'_>)> {
        let frame = self.frame?;
        let embedded = self.embedded.as_mut()?;
        Some((
            &mut self.sync,
            SyncContext {
                host: &mut self.host,
                frame,
                embedded,
                chrome: &mut self.chrome,
            },
        ))
    }

    // ─── Host-driven events ──────────────────────────────────────────────────

    /// The embedded body's content box changed size.
    pub fn content_resized(&mut self, entry: ResizeEntry) {
        if let Some((sync, ctx)) = self.sync_parts() {
            sync.on_resize(ctx, entry);
        }
    }

    /// The embedded document scrolled.
    pub fn frame_scrolled(&mut self, scroll_y: f32) {
        if let Some((sync, ctx)) = self.sync_parts() {
            sync.on_frame_scroll(ctx, scroll_y);
        }
    }

    /// The host window changed width. `frame_width` is the frame's new
    /// client width, without its scrollbar.
    pub fn window_resized(&mut self, width: f32, frame_width: f32) {
        self.host.width = width;
        if let Some(embedded) = self.embedded.as_mut() {
            embedded.width = frame_width;
        }
        if let Some((sync, ctx)) = self.sync_parts() {
            if let Err(e) = sync.on_window_resize(ctx) {
                log::debug!("resize ignored: {}", e);
            }
        }
    }

    /// A click on `target` inside the embedded document. Returns the
    /// navigation the browser performed, if any.
    pub fn click_in_frame(&mut self, target: NodeId) -> Option<Navigation> {
        let event = self.dispatch_in_frame(EventKind::Click, target)?;
        self.finish_frame_event(event, "a[href]", "href")
    }

    /// A form inside the embedded document is being submitted.
    pub fn submit_in_frame(&mut self, form: NodeId) -> Option<Navigation> {
        let event = self.dispatch_in_frame(EventKind::Submit, form)?;
        self.finish_frame_event(event, "form", "action")
    }

    /// A click on `target` in the host page itself.
    pub fn click(&mut self, target: NodeId) -> Option<Navigation> {
        if !self.host.document.contains(target) {
            log::debug!("click target {:?} is not in the host document", target);
            return None;
        }
        let event = self.page_bus.dispatch(&mut self.host.document, EventKind::Click, target);
        let prevented = event.default_prevented();
        self.apply_effects(event.effects);
        if prevented {
            return None;
        }
        let nav = default_navigation(&self.host.document, &self.host.location, target, "a[href]", "href")?;
        self.host.location = nav.url.clone();
        self.host.navigations.push(nav.clone());
        Some(nav)
    }

    fn dispatch_in_frame(&mut self, kind: EventKind, target: NodeId) -> Option<DelegatedEvent> {
        let embedded = self.embedded.as_mut()?;
        if !embedded.document.contains(target) {
            log::debug!("{:?} target {:?} is not in the frame document", kind, target);
            return None;
        }
        let event = match &self.frame_bus {
            Some((load, bus)) if *load == embedded.load() => {
                bus.dispatch(&mut embedded.document, kind, target)
            }
            _ => DelegatedEvent::new(kind, target),
        };
        Some(event)
    }

    fn finish_frame_event(
        &mut self,
        event: DelegatedEvent,
        selector: &str,
        attribute: &str,
    ) -> Option<Navigation> {
        let prevented = event.default_prevented();
        let target = event.target;
        self.apply_effects(event.effects);
        if prevented {
            return None;
        }
        let embedded = self.embedded.as_ref()?;
        let nav = default_navigation(&embedded.document, &embedded.url, target, selector, attribute)?;
        match nav.target.as_str() {
            "_top" | "_parent" => self.host.location = nav.url.clone(),
            "_self" => self.pending_frame_navigation = Some(nav.url.clone()),
            other => log::debug!("navigation opens in {}", other),
        }
        self.host.navigations.push(nav.clone());
        Some(nav)
    }

    fn apply_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ScrollToAnchor(anchor) => {
                    if let Some((sync, ctx)) = self.sync_parts() {
                        sync.scroll_to_anchor(ctx, anchor);
                    }
                }
                Effect::PushHistory(url) => self.host.push_history(url),
                Effect::SetFrameOverflow(value) => {
                    if let Some(embedded) = self.embedded.as_mut() {
                        if let Some(body) = embedded.document.body() {
                            embedded.document.set_style(body, "overflow", &value);
                        }
                    }
                }
                Effect::FocusFrame => {
                    if self.frame.is_some() {
                        self.host.focus = Focus::Frame;
                    }
                }
            }
        }
    }
}

/// What the browser does when nothing prevented the event: follow the
/// closest element matching `selector` to the URL in `attribute`.
fn default_navigation(
    doc: &Document,
    doc_url: &Url,
    target: NodeId,
    selector: &str,
    attribute: &str,
) -> Option<Navigation> {
    let sel = Selector::parse(selector).ok()?;
    let element = doc.closest(target, &sel)?;
    let reference = doc.attr(element, attribute).unwrap_or("");
    let url = match absolute_url(doc, doc_url, reference) {
        Ok(url) => url,
        Err(e) => {
            log::debug!("no navigation: {}", e);
            return None;
        }
    };
    Some(Navigation {
        url,
        target: effective_target(doc, element),
    })
}

impl std::fmt::Debug for DocView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocView")
            .field("location", &self.host.location.as_str())
            .field("frame", &self.frame)
            .field("aliases", &self.aliases)
            .field("load", &self.embedded.as_ref().map(|e| e.load()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HeaderMode, LinkTarget};
    use crate::dom::layout::compute_layout;
    use crate::dom::parser::parse_html;

    const BASE: &str = "https://index.example/+doc/root/dev";
    const VIEW: &str = "https://index.example/+d/root/dev";

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn host_page(frame_attrs: &str) -> Document {
        let html = format!(
            r#"<html><head><title>proj 1.0 documentation</title></head><body>
                <div id="header"><h1>index</h1></div>
                <div id="navigation"><a id="home" href="/">root/dev</a></div>
                <div id="search"><span class="help"><a id="help" href="/+searchhelp">help</a></span></div>
                <div class="query_doc inline" id="help-panel" style="display: none">query syntax</div>
                <p>Built <span class="timestamp" id="built">2020-01-31 17:45:12</span></p>
                <div class="docview"><iframe {frame_attrs}></iframe></div>
            </body></html>"#
        );
        let mut doc = parse_html(&html, &format!("{VIEW}/proj/1.0/index.html"));
        compute_layout(&mut doc, 1000.0);
        doc
    }

    fn aliased() -> String {
        format!(r#"data-base-url="{BASE}" data-baseview-url="{VIEW}""#)
    }

    fn view_at(frame_attrs: &str, location: &str, config: DocViewConfig) -> DocView {
        init_logger();
        DocView::new(
            host_page(frame_attrs),
            Url::parse(location).unwrap(),
            1000.0,
            config,
        )
    }

    fn docs() -> EmbeddedDocument {
        EmbeddedDocument::from_html(
            &format!(
                r#"<html><head><title>proj 1.0 docs</title></head><body>
                    <h1>proj</h1>
                    <p>See the <a id="cl" href="{BASE}/proj/1.0/#changelog">changelog</a>
                    or the <a id="api" href="api.html">API</a>
                    or <a id="pypi" href="https://pypi.org/project/proj/">PyPI</a>.</p>
                    <form id="q" action="search.html"><input name="q"></form>
                    <h2 id="changelog">Changelog</h2>
                    <p>1.0 released</p>
                </body></html>"#
            ),
            &format!("{BASE}/proj/1.0/index.html"),
            985.0,
        )
        .unwrap()
    }

    fn resize(view: &mut DocView, height: f32) {
        let observation = view.active_observation().unwrap();
        view.content_resized(ResizeEntry {
            observation,
            content_height: height,
        });
    }

    fn frame_el(view: &DocView, id: &str) -> NodeId {
        view.embedded().unwrap().document.element_by_id(id).unwrap()
    }

    #[test]
    fn ready_page_is_decorated() {
        let view = view_at(&aliased(), &format!("{VIEW}/proj/1.0/index.html"), DocViewConfig::default());
        let doc = &view.host().document;
        let built = doc.element_by_id("built").unwrap();
        assert_eq!(doc.text_content(built), "2020-01-31");
        assert_eq!(doc.attr(built, "title"), Some("2020-01-31T17:45:12.000Z"));
        assert!(view.frame().is_some());
        assert_eq!(view.aliases().unwrap().base(), BASE);
        assert_eq!(view.chrome().elements().len(), 3);
    }

    #[test]
    fn load_copies_title_and_sizes_frame() {
        let mut view = view_at(&aliased(), &format!("{VIEW}/proj/1.0/index.html"), DocViewConfig::default());
        view.load_frame(docs());
        assert_eq!(view.host().title(), "proj 1.0 docs");
        resize(&mut view, 640.0);
        let frame = view.frame().unwrap();
        assert_eq!(view.host().document.style(frame, "height").as_deref(), Some("640px"));
        // no fragment in the location
        assert!(view.host().scroll_log().is_empty());
    }

    #[test]
    fn location_anchor_scrolls_once_per_load() {
        let mut view = view_at(
            &aliased(),
            &format!("{VIEW}/proj/1.0/index.html#changelog"),
            DocViewConfig::default(),
        );
        view.load_frame(docs());
        for height in [0.0, 500.0, 500.0] {
            resize(&mut view, height);
        }
        assert_eq!(view.host().scroll_log().len(), 1);

        // a new document starts a fresh cycle
        let old = view.active_observation().unwrap();
        let second = view.load_frame(docs());
        assert_eq!(second, LoadId(2));
        view.content_resized(ResizeEntry {
            observation: old,
            content_height: 9999.0,
        });
        assert_eq!(view.host().scroll_log().len(), 1);
        resize(&mut view, 480.0);
        assert_eq!(view.host().scroll_log().len(), 2);
        let frame = view.frame().unwrap();
        assert_eq!(view.host().document.metrics(frame).height, 480.0);
    }

    #[test]
    fn repeated_load_event_is_idempotent() {
        let mut view = view_at(&aliased(), &format!("{VIEW}/proj/1.0/index.html"), DocViewConfig::default());
        view.load_frame(docs());
        let observation = view.active_observation();
        let nodes = view.embedded().unwrap().document.node_count();
        view.frame_loaded();
        assert_eq!(view.active_observation(), observation);
        assert_eq!(view.embedded().unwrap().document.node_count(), nodes);
    }

    #[test]
    fn same_document_anchor_link_scrolls_without_reload() {
        let mut view = view_at(&aliased(), &format!("{VIEW}/proj/1.0/index.html"), DocViewConfig::default());
        view.load_frame(docs());
        resize(&mut view, 700.0);
        let link = frame_el(&view, "cl");

        assert_eq!(view.click_in_frame(link), None);
        let expected = format!("{VIEW}/proj/1.0/#changelog");
        assert_eq!(view.host().history.last().map(Url::as_str), Some(expected.as_str()));
        assert_eq!(view.host().location.as_str(), expected);
        assert_eq!(view.host().scroll_log().len(), 1);
        let doc = &view.embedded().unwrap().document;
        assert_eq!(doc.attr(link, "href"), Some(expected.as_str()));
        assert!(view.host().navigations.is_empty());
    }

    #[test]
    fn internal_link_escapes_to_view_url() {
        let mut view = view_at(&aliased(), &format!("{VIEW}/proj/1.0/index.html"), DocViewConfig::default());
        view.load_frame(docs());
        let nav = view.click_in_frame(frame_el(&view, "api")).unwrap();
        assert_eq!(nav.target, "_top");
        assert_eq!(nav.url.as_str(), format!("{VIEW}/proj/1.0/api.html"));
        assert_eq!(view.host().location, nav.url);
        assert!(view.pending_frame_navigation().is_none());
    }

    #[test]
    fn external_link_is_untouched() {
        let mut view = view_at(&aliased(), &format!("{VIEW}/proj/1.0/index.html"), DocViewConfig::default());
        view.load_frame(docs());
        let link = frame_el(&view, "pypi");
        let nav = view.click_in_frame(link).unwrap();
        assert_eq!(nav.url.as_str(), "https://pypi.org/project/proj/");
        let doc = &view.embedded().unwrap().document;
        assert_eq!(doc.attr(link, "href"), Some("https://pypi.org/project/proj/"));
        assert_eq!(doc.attr(link, "target"), None);
    }

    #[test]
    fn self_frame_policy_keeps_raw_urls() {
        let attrs = format!(r#"{} data-link-target="_self""#, aliased());
        let mut view = view_at(&attrs, &format!("{VIEW}/proj/1.0/index.html"), DocViewConfig::default());
        assert_eq!(view.config().link_target, LinkTarget::SelfFrame);
        view.load_frame(docs());

        let nav = view.click_in_frame(frame_el(&view, "api")).unwrap();
        assert_eq!(nav.target, "_self");
        assert_eq!(nav.url.as_str(), format!("{BASE}/proj/1.0/api.html"));
        assert_eq!(view.pending_frame_navigation(), Some(&nav.url));
        assert_eq!(
            view.host().location.as_str(),
            format!("{VIEW}/proj/1.0/api.html")
        );
    }

    #[test]
    fn form_submission_targets_view_space() {
        let mut view = view_at(&aliased(), &format!("{VIEW}/proj/1.0/index.html"), DocViewConfig::default());
        view.load_frame(docs());
        let nav = view.submit_in_frame(frame_el(&view, "q")).unwrap();
        assert_eq!(nav.url.as_str(), format!("{VIEW}/proj/1.0/search.html"));
        assert_eq!(nav.target, "_top");
    }

    #[test]
    fn without_aliases_links_navigate_the_frame() {
        let mut view = view_at("", &format!("{VIEW}/proj/1.0/index.html"), DocViewConfig::default());
        assert!(view.aliases().is_none());
        view.load_frame(docs());
        resize(&mut view, 300.0);
        let nav = view.click_in_frame(frame_el(&view, "api")).unwrap();
        assert_eq!(nav.target, "_self");
        assert_eq!(nav.url.as_str(), format!("{BASE}/proj/1.0/api.html"));
        assert_eq!(view.host().document.metrics(view.frame().unwrap()).height, 300.0);
    }

    #[test]
    fn help_toggle_hands_scrollbar_and_focus_around() {
        let mut view = view_at(&aliased(), &format!("{VIEW}/proj/1.0/index.html"), DocViewConfig::default());
        view.load_frame(docs());
        let help = view.host().document.element_by_id("help").unwrap();

        assert_eq!(view.click(help), None);
        let body = view.embedded().unwrap().document.body().unwrap();
        let overflow = |v: &DocView| v.embedded().unwrap().document.style(body, "overflow");
        assert_eq!(overflow(&view).as_deref(), Some("hidden"));
        assert_eq!(view.host().focus, Focus::Page);

        view.click(help);
        assert_eq!(overflow(&view).as_deref(), Some("auto"));
        assert_eq!(view.host().focus, Focus::Frame);
    }

    #[test]
    fn host_links_navigate_the_page() {
        let mut view = view_at(&aliased(), &format!("{VIEW}/proj/1.0/index.html"), DocViewConfig::default());
        let home = view.host().document.element_by_id("home").unwrap();
        let nav = view.click(home).unwrap();
        assert_eq!(nav.url.as_str(), "https://index.example/");
        assert_eq!(view.host().location, nav.url);
    }

    #[test]
    fn hide_on_scroll_moves_chrome_with_frame() {
        let config = DocViewConfig::new().with_header_mode(HeaderMode::HideOnScroll);
        let mut view = view_at(&aliased(), &format!("{VIEW}/proj/1.0/index.html"), config);
        view.load_frame(docs());
        view.frame_scrolled(15.0);
        assert_eq!(view.chrome().offset(), -15.0);
        view.frame_scrolled(0.0);
        assert_eq!(view.chrome().offset(), 0.0);
    }

    #[test]
    fn page_without_frame_ignores_frame_events() {
        init_logger();
        let mut doc = parse_html(
            "<html><body><div id=\"header\"></div></body></html>",
            "https://index.example/",
        );
        compute_layout(&mut doc, 800.0);
        let mut view = DocView::new(
            doc,
            Url::parse("https://index.example/").unwrap(),
            800.0,
            DocViewConfig::default(),
        );
        view.load_frame(docs());
        assert!(view.active_observation().is_none());
        view.frame_scrolled(100.0);
        view.window_resized(640.0, 625.0);
        assert_eq!(view.host().title(), "");
        assert_eq!(view.host().width, 640.0);
        assert_eq!(view.embedded().unwrap().width, 625.0);
    }

    #[test]
    fn window_resize_recomputes_scrollbar_gap() {
        let mut view = view_at(&aliased(), &format!("{VIEW}/proj/1.0/index.html"), DocViewConfig::default());
        view.load_frame(docs());
        let header = view.host().document.element_by_id("header").unwrap();
        assert_eq!(view.host().document.style(header, "margin-right").as_deref(), Some("15px"));

        view.window_resized(1600.0, 1583.0);
        assert_eq!(view.host().document.style(header, "margin-right").as_deref(), Some("17px"));
        view.window_resized(800.0, 800.0);
        assert_eq!(view.host().document.style(header, "margin-right").as_deref(), Some("0px"));
    }

    #[test]
    fn unknown_click_targets_are_ignored() {
        let mut view = view_at(&aliased(), &format!("{VIEW}/proj/1.0/index.html"), DocViewConfig::default());
        let mut big = docs();
        let body = big.document.body().unwrap();
        let mut beyond = body;
        for _ in 0..=view.host().document.node_count() {
            beyond = big.document.append_element(body, "p", &[]);
        }
        view.load_frame(big);
        assert!(!view.host().document.contains(beyond));
        assert_eq!(view.click(beyond), None);
        assert!(view.host().navigations.is_empty());
    }
}
