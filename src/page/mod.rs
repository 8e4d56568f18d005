//! Decorations of the host page that do not involve the frame: collapsible
//! result panels, timestamp formatting and the search help toggle.

pub mod help;
pub mod panels;
pub mod timestamp;

use crate::dom::Document;
use crate::error::DocViewError;
use crate::events::EventBus;

/// Run every page decoration against `doc` and register their click
/// handlers on `bus`.
pub fn install(
    doc: &mut Document,
    bus: &mut EventBus,
    fragment: Option<&str>,
    has_frame: bool,
) -> Result<(), DocViewError> {
    panels::install(doc, bus, fragment)?;
    let rewritten = timestamp::format_timestamps(doc)?;
    log::debug!("formatted {} timestamps", rewritten);
    help::install(bus, has_frame)?;
    Ok(())
}
