//! Size-change observation as an owned resource.
//!
//! The host owns the real `ResizeObserver`; this side only tracks which
//! observations are still connected so that late callbacks from an earlier
//! document can be told apart and dropped.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::{Rc, Weak};

use crate::dom::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObservationId(u64);

/// A size notification delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeEntry {
    pub observation: ObservationId,
    pub content_height: f32,
}

#[derive(Debug, Default)]
pub struct ObserverRegistry {
    next: u64,
    connected: Rc<RefCell<HashSet<ObservationId>>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start watching `target`'s content box.
    pub fn observe(&mut self, target: NodeId) -> ResizeObservation {
        self.next += 1;
        let id = ObservationId(self.next);
        self.connected.borrow_mut().insert(id);
        log::debug!("observing {:?} as {:?}", target, id);
        ResizeObservation {
            id,
            target,
            registry: Rc::downgrade(&self.connected),
        }
    }

    pub fn is_connected(&self, id: ObservationId) -> bool {
        self.connected.borrow().contains(&id)
    }

    pub fn connected_count(&self) -> usize {
        self.connected.borrow().len()
    }
}

/// Handle for one registered observation. Disconnects on drop.
#[derive(Debug)]
pub struct ResizeObservation {
    id: ObservationId,
    target: NodeId,
    registry: Weak<RefCell<HashSet<ObservationId>>>,
}

impl ResizeObservation {
    pub fn id(&self) -> ObservationId {
        self.id
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn disconnect(self) {
        // Drop does the work
    }
}

impl Drop for ResizeObservation {
    fn drop(&mut self) {
        if let Some(set) = self.registry.upgrade() {
            if set.borrow_mut().remove(&self.id) {
                log::debug!("disconnected {:?}", self.id);
            }
        }
    }
}
