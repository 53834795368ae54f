//! Scene change notifications
//!
//! Typed event channels announcing scene mutations to external consumers
//! (renderer caches, importers, debug tooling). Key principles:
//! - Dispatch is synchronous and ordered, and always happens *before* the
//!   destructive half of the operation that caused it — a listener may still
//!   read a component's last-known state from the event payload.
//! - Listeners are registered per event kind; only interested listeners run.
//! - A listener removes itself by returning [`ListenerAction::Unsubscribe`]
//!   from its callback, so the registry is never mutated mid-iteration.
//! - [`EventBus::unsubscribe`] is idempotent; a stale id is ignored.

use slotmap::{new_key_type, SlotMap};

use crate::foundation::math::Mat4;
use crate::scene::volume::Bounds;
use crate::scene::{ComponentId, NodeId};

new_key_type! {
    struct ListenerKey;
}

/// Opaque handle to a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(ListenerKey);

/// Event kind used for listener routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneEventKind {
    /// A node's world transform changed
    TransformChanged,
    /// A culled component's world bound changed
    BoundsChanged,
    /// A component is about to be removed from its node
    ComponentRemoved,
    /// A node is about to be destroyed
    NodeDisposed,
}

/// A scene mutation notification, carrying old/new state where applicable.
#[derive(Debug, Clone)]
pub enum SceneEvent {
    /// A node's world transform changed
    TransformChanged {
        /// The node whose transform changed
        node: NodeId,
        /// World matrix before the change
        old_world: Mat4,
        /// World matrix after the change
        new_world: Mat4,
    },
    /// A culled component's world bound changed
    BoundsChanged {
        /// The component whose bound moved
        component: ComponentId,
        /// Bound before the change
        old_bounds: Bounds,
        /// Bound after the change
        new_bounds: Bounds,
    },
    /// A component is about to be removed; its state is still readable
    ComponentRemoved {
        /// The node the component was attached to
        node: NodeId,
        /// The component being removed
        component: ComponentId,
    },
    /// A node is about to be destroyed; fired before its components go away
    NodeDisposed {
        /// The node being destroyed
        node: NodeId,
    },
}

impl SceneEvent {
    /// The routing kind of this event
    pub fn kind(&self) -> SceneEventKind {
        match self {
            SceneEvent::TransformChanged { .. } => SceneEventKind::TransformChanged,
            SceneEvent::BoundsChanged { .. } => SceneEventKind::BoundsChanged,
            SceneEvent::ComponentRemoved { .. } => SceneEventKind::ComponentRemoved,
            SceneEvent::NodeDisposed { .. } => SceneEventKind::NodeDisposed,
        }
    }
}

/// What a listener wants to happen to its registration after a callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerAction {
    /// Stay subscribed
    Keep,
    /// Remove this listener; it will not be called again
    Unsubscribe,
}

type Callback = Box<dyn FnMut(&SceneEvent) -> ListenerAction>;

struct Listener {
    kind: SceneEventKind,
    callback: Callback,
}

/// Ordered listener registry for scene events.
#[derive(Default)]
pub struct EventBus {
    listeners: SlotMap<ListenerKey, Listener>,
    // Dispatch order is registration order; the slotmap alone does not
    // guarantee it.
    order: Vec<ListenerKey>,
}

impl EventBus {
    /// Create an empty bus
    pub fn new() -> Self {
        Self {
            listeners: SlotMap::with_key(),
            order: Vec::new(),
        }
    }

    /// Register a listener for one event kind.
    pub fn subscribe<F>(&mut self, kind: SceneEventKind, callback: F) -> ListenerId
    where
        F: FnMut(&SceneEvent) -> ListenerAction + 'static,
    {
        let key = self.listeners.insert(Listener {
            kind,
            callback: Box::new(callback),
        });
        self.order.push(key);
        ListenerId(key)
    }

    /// Remove a listener. Removing one that is already gone is a no-op.
    pub fn unsubscribe(&mut self, id: ListenerId) {
        if self.listeners.remove(id.0).is_some() {
            self.order.retain(|key| *key != id.0);
        }
    }

    /// Dispatch an event to every listener registered for its kind,
    /// in registration order.
    pub fn emit(&mut self, event: &SceneEvent) {
        let kind = event.kind();

        // Snapshot the order: a callback may unsubscribe itself, which
        // mutates the registry but never the snapshot being walked.
        let snapshot: Vec<ListenerKey> = self.order.clone();
        let mut removed = false;

        for key in snapshot {
            let Some(listener) = self.listeners.get_mut(key) else {
                continue;
            };

            if listener.kind != kind {
                continue;
            }

            if (listener.callback)(event) == ListenerAction::Unsubscribe {
                self.listeners.remove(key);
                removed = true;
            }
        }

        if removed {
            let listeners = &self.listeners;
            self.order.retain(|key| listeners.contains_key(*key));
        }
    }

    /// Number of registered listeners
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether no listeners are registered
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn disposed_event() -> SceneEvent {
        SceneEvent::NodeDisposed {
            node: NodeId::default(),
        }
    }

    #[test]
    fn test_dispatch_routes_by_kind() {
        let mut bus = EventBus::new();
        let hits = Rc::new(RefCell::new(0));

        let hits_a = Rc::clone(&hits);
        bus.subscribe(SceneEventKind::NodeDisposed, move |_| {
            *hits_a.borrow_mut() += 1;
            ListenerAction::Keep
        });

        let hits_b = Rc::clone(&hits);
        bus.subscribe(SceneEventKind::TransformChanged, move |_| {
            *hits_b.borrow_mut() += 100;
            ListenerAction::Keep
        });

        bus.emit(&disposed_event());
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn test_dispatch_is_ordered() {
        let mut bus = EventBus::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let order = Rc::clone(&order);
            bus.subscribe(SceneEventKind::NodeDisposed, move |_| {
                order.borrow_mut().push(tag);
                ListenerAction::Keep
            });
        }

        bus.emit(&disposed_event());
        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_self_unsubscribe_during_dispatch() {
        let mut bus = EventBus::new();
        let hits = Rc::new(RefCell::new(0));

        let hits_once = Rc::clone(&hits);
        bus.subscribe(SceneEventKind::NodeDisposed, move |_| {
            *hits_once.borrow_mut() += 1;
            ListenerAction::Unsubscribe
        });

        let hits_keep = Rc::clone(&hits);
        bus.subscribe(SceneEventKind::NodeDisposed, move |_| {
            *hits_keep.borrow_mut() += 10;
            ListenerAction::Keep
        });

        bus.emit(&disposed_event());
        bus.emit(&disposed_event());

        // One-shot listener fired once, the other twice.
        assert_eq!(*hits.borrow(), 21);
        assert_eq!(bus.len(), 1);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let mut bus = EventBus::new();
        let id = bus.subscribe(SceneEventKind::NodeDisposed, |_| ListenerAction::Keep);

        bus.unsubscribe(id);
        bus.unsubscribe(id);
        assert!(bus.is_empty());

        bus.emit(&disposed_event());
    }
}
