//! Search help panel toggled from the `.help` link.

use std::rc::Rc;

use crate::dom::selector::Selector;
use crate::dom::Document;
use crate::error::DocViewError;
use crate::events::{DelegatedEvent, Effect, EventBus, EventKind};

const HELP_PANEL: &str = ".query_doc.inline";

/// Register the `.help a` toggle. While the panel is open the frame's
/// own scrollbar is hidden; closing the panel hands focus back to the frame.
pub fn install(bus: &mut EventBus, has_frame: bool) -> Result<(), DocViewError> {
    let panel = Selector::parse(HELP_PANEL)?;
    bus.on(
        EventKind::Click,
        Selector::parse(".help a")?,
        Rc::new(move |doc: &mut Document, event: &mut DelegatedEvent| {
            event.prevent_default();
            event.stop_propagation();
            let Some(help) = doc.select_first(&panel) else {
                return;
            };
            let showing = doc.is_hidden(help);
            if showing {
                if has_frame {
                    event.push_effect(Effect::SetFrameOverflow("hidden".into()));
                }
                doc.set_style(help, "display", "block");
            } else {
                doc.set_style(help, "display", "none");
                if has_frame {
                    event.push_effect(Effect::FocusFrame);
                    event.push_effect(Effect::SetFrameOverflow("auto".into()));
                }
            }
        }),
    );
    Ok(())
}
