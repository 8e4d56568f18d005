//! Delegated event handling.
//!
//! Handlers are bound to a document as a whole and filtered by selector,
//! like `$(document).on('click', 'a[href]', ...)`. Dispatch walks from the
//! event target up to the root and invokes every subscription whose
//! selector matches the node currently being visited.

use std::rc::Rc;

use url::Url;

use crate::dom::selector::Selector;
use crate::dom::{Document, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Submit,
}

/// Side effects a handler asks the host window to perform once dispatch
/// has finished. Handlers only ever see their own document.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Scroll so the given element of the embedded document is in view.
    ScrollToAnchor(NodeId),
    /// Replace the host address bar URL without navigating.
    PushHistory(Url),
    /// Set `overflow` on the embedded document's body.
    SetFrameOverflow(String),
    /// Move keyboard focus into the frame.
    FocusFrame,
}

/// One in-flight event.
#[derive(Debug, Clone)]
pub struct DelegatedEvent {
    pub kind: EventKind,
    pub target: NodeId,
    /// The ancestor whose selector matched for the handler being run.
    pub current_target: NodeId,
    default_prevented: bool,
    propagation_stopped: bool,
    pub effects: Vec<Effect>,
}

impl DelegatedEvent {
    pub fn new(kind: EventKind, target: NodeId) -> Self {
        Self {
            kind,
            target,
            current_target: target,
            default_prevented: false,
            propagation_stopped: false,
            effects: Vec::new(),
        }
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn push_effect(&mut self, effect: Effect) {
        self.effects.push(effect);
    }
}

pub trait DelegatedHandler {
    fn handle(&self, doc: &mut Document, event: &mut DelegatedEvent);
}

impl<F> DelegatedHandler for F
where
    F: Fn(&mut Document, &mut DelegatedEvent),
{
    fn handle(&self, doc: &mut Document, event: &mut DelegatedEvent) {
        self(doc, event)
    }
}

struct Subscription {
    kind: EventKind,
    selector: Selector,
    handler: Rc<dyn DelegatedHandler>,
}

/// Subscriptions attached to one document. Dropping the bus drops every
/// handler closure with it.
#[derive(Default)]
pub struct EventBus {
    subscriptions: Vec<Subscription>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&mut self, kind: EventKind, selector: Selector, handler: Rc<dyn DelegatedHandler>) {
        self.subscriptions.push(Subscription {
            kind,
            selector,
            handler,
        });
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Dispatch synchronously in bubble order.
    pub fn dispatch(&self, doc: &mut Document, kind: EventKind, target: NodeId) -> DelegatedEvent {
        let mut event = DelegatedEvent::new(kind, target);
        for node in doc.ancestors(target) {
            for sub in self.subscriptions.iter().filter(|s| s.kind == kind) {
                if !sub.selector.matches(doc, node) {
                    continue;
                }
                log::trace!("{:?} on {} matched {:?}", kind, sub.selector, node);
                event.current_target = node;
                sub.handler.handle(doc, &mut event);
            }
            if event.propagation_stopped {
                break;
            }
        }
        event
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}
