//! Keeps the frame, the embedded document and the host header in step.
//!
//! One [`LoadCycle`] exists per frame load. It owns the resize observation
//! of the embedded body and the latch that makes the initial anchor scroll
//! happen once. Replacing the cycle drops the observation, so notifications
//! from a previous document are recognised as stale and ignored.

pub mod header;
pub mod observer;

use crate::anchor;
use crate::config::HeaderMode;
use crate::dom::css::px;
use crate::dom::NodeId;
use crate::error::DocViewError;
use crate::window::{EmbeddedDocument, HostWindow, LoadId};

use self::header::HeaderChrome;
use self::observer::{ObservationId, ObserverRegistry, ResizeEntry, ResizeObservation};

/// Everything the synchronizer reads and writes during one event.
pub struct SyncContext<'a> {
    pub host: &'a mut HostWindow,
    pub frame: NodeId,
    pub embedded: &'a mut EmbeddedDocument,
    pub chrome: &'a mut HeaderChrome,
}

#[derive(Debug)]
struct LoadCycle {
    load: LoadId,
    observation: ResizeObservation,
    /// Fragment of the host location at load time.
    fragment: Option<String>,
    anchor_scrolled: bool,
    content_height: f32,
}

#[derive(Debug)]
pub struct FrameSynchronizer {
    mode: HeaderMode,
    copy_title: bool,
    observers: ObserverRegistry,
    cycle: Option<LoadCycle>,
}

impl FrameSynchronizer {
    pub fn new(mode: HeaderMode, copy_title: bool) -> Self {
        Self {
            mode,
            copy_title,
            observers: ObserverRegistry::new(),
            cycle: None,
        }
    }

    pub fn mode(&self) -> HeaderMode {
        self.mode
    }

    pub fn active_load(&self) -> Option<LoadId> {
        self.cycle.as_ref().map(|c| c.load)
    }

    /// Observation the host should report body size changes for.
    pub fn active_observation(&self) -> Option<ObservationId> {
        self.cycle.as_ref().map(|c| c.observation.id())
    }

    pub fn is_connected(&self, id: ObservationId) -> bool {
        self.observers.is_connected(id)
    }

    /// Last content height reported for the active cycle.
    pub fn content_height(&self) -> Option<f32> {
        self.cycle.as_ref().map(|c| c.content_height)
    }

    /// Set up a new load cycle. Returns `Ok(false)` when this load was
    /// already initialized.
    pub fn initialize(&mut self, ctx: SyncContext<'_>) -> Result<bool, DocViewError> {
        let load = ctx.embedded.load();
        if self.active_load() == Some(load) {
            log::debug!("load {:?} already initialized", load);
            return Ok(false);
        }

        // The previous document is gone whether or not this one is usable.
        self.cycle = None;

        let body = ctx
            .embedded
            .document
            .body()
            .ok_or(DocViewError::DocumentUnavailable("body"))?;

        if self.copy_title {
            if let Some(title) = ctx.embedded.title() {
                ctx.host.set_title(&title);
            }
        }

        match self.mode {
            HeaderMode::Overlap => apply_overlap(&mut *ctx.host, &mut *ctx.embedded, ctx.chrome)?,
            HeaderMode::BelowNavigation => place_below_navigation(&mut *ctx.host, ctx.frame, ctx.chrome),
            HeaderMode::HideOnScroll => ctx.chrome.rest(&mut ctx.host.document),
        }

        let observation = self.observers.observe(body);
        let fragment = ctx.host.location.fragment().map(str::to_string);
        log::debug!(
            "frame load {:?} ready ({}), pending anchor {:?}",
            load,
            ctx.embedded.url,
            fragment
        );
        self.cycle = Some(LoadCycle {
            load,
            observation,
            fragment,
            anchor_scrolled: false,
            content_height: 0.0,
        });
        Ok(true)
    }

    /// Handle a content-box size notification. Returns whether the initial
    /// anchor scroll ran on this notification.
    pub fn on_resize(&mut self, ctx: SyncContext<'_>, entry: ResizeEntry) -> bool {
        if !self.observers.is_connected(entry.observation) {
            log::trace!("dropping notification from disconnected {:?}", entry.observation);
            return false;
        }
        let mode = self.mode;
        let Some(cycle) = self.cycle.as_mut() else {
            return false;
        };
        if cycle.observation.id() != entry.observation || cycle.load != ctx.embedded.load() {
            log::trace!("dropping notification for another cycle");
            return false;
        }

        let height = entry.content_height.max(0.0);
        cycle.content_height = height;
        if mode != HeaderMode::HideOnScroll {
            ctx.host.document.set_style(ctx.frame, "height", &px(height));
            ctx.host.document.metrics_mut(ctx.frame).height = height;
        }

        if height <= 0.0 || cycle.anchor_scrolled {
            return false;
        }
        cycle.anchor_scrolled = true;

        let Some(target) = anchor::resolve(&ctx.embedded.document, cycle.fragment.as_deref()) else {
            return false;
        };
        self.scroll_to_anchor(ctx, target);
        true
    }

    /// Bring `anchor` (an element of the embedded document) into view.
    pub fn scroll_to_anchor(&self, ctx: SyncContext<'_>, anchor: NodeId) {
        let anchor_top = ctx.embedded.document.metrics(anchor).top;
        match self.mode {
            HeaderMode::HideOnScroll => {
                ctx.embedded.scroll_to(anchor_top);
                let y = ctx.embedded.scroll_y;
                ctx.chrome.follow_scroll(&mut ctx.host.document, y);
            }
            HeaderMode::Overlap | HeaderMode::BelowNavigation => {
                let frame_top = ctx.host.document.metrics(ctx.frame).top;
                ctx.host.scroll_to(frame_top + anchor_top);
            }
        }
    }

    /// The embedded document scrolled to `scroll_y`.
    pub fn on_frame_scroll(&mut self, ctx: SyncContext<'_>, scroll_y: f32) {
        if self.active_load() != Some(ctx.embedded.load()) {
            return;
        }
        ctx.embedded.scroll_y = scroll_y.max(0.0);
        if self.mode == HeaderMode::HideOnScroll {
            let y = ctx.embedded.scroll_y;
            ctx.chrome.follow_scroll(&mut ctx.host.document, y);
        }
    }

    /// The host window was resized; `ctx.host.width` already holds the new
    /// body width.
    pub fn on_window_resize(&mut self, ctx: SyncContext<'_>) -> Result<(), DocViewError> {
        if self.active_load() != Some(ctx.embedded.load()) {
            return Ok(());
        }
        match self.mode {
            HeaderMode::Overlap => apply_overlap(&mut *ctx.host, &mut *ctx.embedded, ctx.chrome)?,
            HeaderMode::BelowNavigation => place_below_navigation(&mut *ctx.host, ctx.frame, ctx.chrome),
            HeaderMode::HideOnScroll => {
                let y = ctx.embedded.scroll_y;
                ctx.chrome.follow_scroll(&mut ctx.host.document, y);
            }
        }
        Ok(())
    }
}

/// Floating header: push the embedded content down by the header's full
/// height and keep the header clear of the frame's scrollbar.
fn apply_overlap(
    host: &mut HostWindow,
    embedded: &mut EmbeddedDocument,
    chrome: &HeaderChrome,
) -> Result<(), DocViewError> {
    let Some(header) = chrome.primary() else {
        return Ok(());
    };
    let root = embedded
        .document
        .document_element()
        .ok_or(DocViewError::DocumentUnavailable("root element"))?;
    let header_height = host.document.metrics(header).outer_height(true);
    let scrollbar = (host.width - embedded.width).max(0.0);

    embedded.document.set_style(root, "margin-top", &px(header_height));
    host.document.set_style(header, "margin-right", &px(scrollbar));
    Ok(())
}

/// Oldest behavior: the frame container starts right under the chrome.
fn place_below_navigation(host: &mut HostWindow, frame: NodeId, chrome: &HeaderChrome) {
    let Some(container) = host.document.parent(frame) else {
        return;
    };
    let bottom = chrome
        .elements()
        .iter()
        .map(|e| {
            let m = host.document.metrics(*e);
            m.top + m.outer_height(false)
        })
        .fold(f32::NEG_INFINITY, f32::max);
    if !bottom.is_finite() {
        return;
    }
    host.document.set_style(container, "top", &px(bottom));
    host.document.metrics_mut(container).top = bottom;
}
