//! Collapsible `.toxresult` panels and list-valued project metadata.

use std::rc::Rc;

use crate::anchor;
use crate::dom::selector::Selector;
use crate::dom::{Document, NodeId};
use crate::error::DocViewError;
use crate::events::{DelegatedEvent, DelegatedHandler, EventBus, EventKind};

const OPENED: &str = "opened";
const CLOSED: &str = "closed";

/// Set the initial open/closed state and register the toggles.
///
/// A passed panel starts opened only when the location's anchor target is
/// one of its direct children.
pub fn install(
    doc: &mut Document,
    bus: &mut EventBus,
    fragment: Option<&str>,
) -> Result<(), DocViewError> {
    let toxresult = Selector::parse(".toxresult")?;
    let focused = anchor::resolve(doc, fragment)
        .and_then(|a| doc.parent(a))
        .filter(|p| toxresult.matches(doc, *p));

    for panel in doc.select(&Selector::parse(".toxresult.passed")?) {
        let class = if Some(panel) == focused { OPENED } else { CLOSED };
        doc.add_class(panel, class);
    }
    for panel in doc.select(&Selector::parse(".toxresult.failed")?) {
        doc.add_class(panel, OPENED);
    }
    for value in doc.select(&Selector::parse("table.projectinfos .is_list")?) {
        doc.add_class(value, CLOSED);
    }

    let toggle: Rc<dyn DelegatedHandler> = Rc::new(toggle_parent);
    bus.on(EventKind::Click, Selector::parse(".toxresult h2")?, Rc::clone(&toggle));
    bus.on(
        EventKind::Click,
        Selector::parse("table.projectinfos .is_list .value")?,
        toggle,
    );
    Ok(())
}

fn toggle_parent(doc: &mut Document, event: &mut DelegatedEvent) {
    if let Some(parent) = doc.parent(event.current_target) {
        toggle_open(doc, parent);
    }
}

fn toggle_open(doc: &mut Document, id: NodeId) {
    doc.toggle_class(id, CLOSED);
    doc.toggle_class(id, OPENED);
}
