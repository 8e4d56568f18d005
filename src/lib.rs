//! Host-driven behavior of a package index documentation page: a header
//! over an embedded documentation frame, kept in sync with it, plus link
//! rewriting inside the frame.
//!
//! Nothing here talks to a real browser. The host supplies documents,
//! measurements and events; every entry point on [`DocView`] applies its
//! effects to the owned state synchronously.

pub mod anchor;
pub mod config;
pub mod dom;
pub mod error;
pub mod events;
pub mod host;
pub mod page;
pub mod rewrite;
pub mod sync;
pub mod window;

pub use config::{DocViewConfig, HeaderMode, LinkTarget};
pub use dom::parser::parse_html;
pub use dom::{Document, NodeId};
pub use error::DocViewError;
pub use host::DocView;
pub use rewrite::UrlAliasPair;
pub use sync::observer::{ObservationId, ResizeEntry};
pub use window::{EmbeddedDocument, HostWindow, LoadId, Navigation};
