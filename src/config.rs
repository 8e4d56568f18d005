//! Page-level options: header mode, link target policy and selectors.

use std::str::FromStr;

use crate::dom::selector::Selector;
use crate::dom::{Document, NodeId};
use crate::error::DocViewError;

/// Where rewritten in-site links and forms navigate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkTarget {
    /// Escape the frame: the host page navigates to the canonical view URL.
    #[default]
    Top,
    /// Stay inside the frame; only the host address bar follows along.
    SelfFrame,
}

impl LinkTarget {
    pub fn as_attr(self) -> &'static str {
        match self {
            LinkTarget::Top => "_top",
            LinkTarget::SelfFrame => "_self",
        }
    }
}

impl FromStr for LinkTarget {
    type Err = DocViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "_top" | "top" => Ok(LinkTarget::Top),
            "_self" | "self" => Ok(LinkTarget::SelfFrame),
            other => Err(DocViewError::InvalidConfig {
                key: "link-target",
                value: other.to_string(),
            }),
        }
    }
}

/// How the host header relates to the embedded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderMode {
    /// Floating header drawn over the frame; the embedded root gets a top
    /// margin of the header's height and the header keeps clear of the
    /// frame's scrollbar.
    #[default]
    Overlap,
    /// Header slides away as the embedded document scrolls down and comes
    /// back as it scrolls up.
    HideOnScroll,
    /// Frame container placed directly below the navigation bar.
    BelowNavigation,
}

impl FromStr for HeaderMode {
    type Err = DocViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "overlap" => Ok(HeaderMode::Overlap),
            "hide-on-scroll" => Ok(HeaderMode::HideOnScroll),
            "below-navigation" => Ok(HeaderMode::BelowNavigation),
            other => Err(DocViewError::InvalidConfig {
                key: "header-mode",
                value: other.to_string(),
            }),
        }
    }
}

/// Page-level configuration. Defaults match the stock index templates.
#[derive(Debug, Clone)]
pub struct DocViewConfig {
    pub header_mode: HeaderMode,
    pub link_target: LinkTarget,
    pub frame_selector: String,
    /// Header chrome, header first; missing elements are skipped.
    pub chrome_selectors: Vec<String>,
    pub base_url_attribute: String,
    pub baseview_url_attribute: String,
    pub copy_title: bool,
}

impl Default for DocViewConfig {
    fn default() -> Self {
        Self {
            header_mode: HeaderMode::default(),
            link_target: LinkTarget::default(),
            frame_selector: "iframe".into(),
            chrome_selectors: vec!["#header".into(), "#navigation".into(), "#search".into()],
            base_url_attribute: "data-base-url".into(),
            baseview_url_attribute: "data-baseview-url".into(),
            copy_title: true,
        }
    }
}

impl DocViewConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header_mode(mut self, mode: HeaderMode) -> Self {
        self.header_mode = mode;
        self
    }

    pub fn with_link_target(mut self, target: LinkTarget) -> Self {
        self.link_target = target;
        self
    }

    pub fn with_frame_selector(mut self, selector: impl Into<String>) -> Self {
        self.frame_selector = selector.into();
        self
    }

    pub fn with_chrome_selectors<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.chrome_selectors = selectors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_copy_title(mut self, enabled: bool) -> Self {
        self.copy_title = enabled;
        self
    }

    pub(crate) fn frame_selector(&self) -> Result<Selector, DocViewError> {
        Selector::parse(&self.frame_selector)
    }

    /// Chrome selectors that parse; bad ones are logged and dropped.
    pub(crate) fn chrome_selectors(&self) -> Vec<Selector> {
        self.chrome_selectors
            .iter()
            .filter_map(|s| match Selector::parse(s) {
                Ok(sel) => Some(sel),
                Err(e) => {
                    log::warn!("ignoring chrome selector: {}", e);
                    None
                }
            })
            .collect()
    }

    /// Apply `data-link-target` / `data-header-mode` from the frame element.
    /// Unparseable values keep the current setting.
    pub fn apply_frame_overrides(&mut self, doc: &Document, frame: NodeId) {
        if let Some(raw) = doc.attr(frame, "data-link-target") {
            match raw.parse() {
                Ok(target) => self.link_target = target,
                Err(e) => log::warn!("{}", e),
            }
        }
        if let Some(raw) = doc.attr(frame, "data-header-mode") {
            match raw.parse() {
                Ok(mode) => self.header_mode = mode,
                Err(e) => log::warn!("{}", e),
            }
        }
    }
}
