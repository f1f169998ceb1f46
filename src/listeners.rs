use super::*;

/// What a handler hands back to the dispatcher.
///
/// Only attribute handlers' return values matter: `Bool(false)` cancels a
/// cancelable event, and a non-empty `Text` during `beforeunload` becomes the
/// prompt message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HandlerValue {
    #[default]
    Undefined,
    Bool(bool),
    Text(String),
}

impl From<()> for HandlerValue {
    fn from(_: ()) -> Self {
        Self::Undefined
    }
}

impl From<bool> for HandlerValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for HandlerValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for HandlerValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

pub type HandlerResult = std::result::Result<HandlerValue, HandlerError>;

type CallbackFn = dyn Fn(&mut Harness, &mut Event, NodeId) -> HandlerResult;

/// A registered handler. Identity (for dedupe and removal) is pointer identity,
/// so keep a clone of the callback around to remove it later.
#[derive(Clone)]
pub struct EventCallback(Rc<CallbackFn>);

impl EventCallback {
    /// The closure receives the harness, the event and the node it is
    /// registered on (`this`).
    pub fn new<F, R>(callback: F) -> Self
    where
        F: Fn(&mut Harness, &mut Event, NodeId) -> std::result::Result<R, HandlerError> + 'static,
        R: Into<HandlerValue>,
    {
        let wrapped = move |harness: &mut Harness, event: &mut Event, this: NodeId| -> HandlerResult {
            callback(harness, event, this).map(Into::into)
        };
        Self(Rc::new(wrapped))
    }

    pub(crate) fn call(&self, harness: &mut Harness, event: &mut Event, this: NodeId) -> HandlerResult {
        (self.0)(harness, event, this)
    }

    pub fn same_as(&self, other: &EventCallback) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for EventCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventCallback({:p})", Rc::as_ptr(&self.0).cast::<()>())
    }
}

impl PartialEq for EventCallback {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListenerOptions {
    pub capture: bool,
    pub once: bool,
    pub passive: bool,
}

impl ListenerOptions {
    pub fn capture() -> Self {
        Self {
            capture: true,
            ..Self::default()
        }
    }

    pub fn once() -> Self {
        Self {
            once: true,
            ..Self::default()
        }
    }

    pub fn passive() -> Self {
        Self {
            passive: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ListenerKind {
    Listener,
    /// The single `on<type>` slot.
    Attribute,
}

#[derive(Debug, Clone)]
pub(crate) struct Listener {
    pub(crate) callback: EventCallback,
    pub(crate) capture: bool,
    pub(crate) once: bool,
    pub(crate) passive: bool,
    pub(crate) kind: ListenerKind,
    /// Shared with snapshots so a removal during dispatch is seen by the walk.
    pub(crate) removed: Rc<Cell<bool>>,
}

impl Listener {
    fn new(callback: EventCallback, options: ListenerOptions, kind: ListenerKind) -> Self {
        Self {
            callback,
            capture: options.capture,
            once: options.once,
            passive: options.passive,
            kind,
            removed: Rc::new(Cell::new(false)),
        }
    }

    pub(crate) fn runs_in(&self, phase: EventPhase) -> bool {
        match phase {
            EventPhase::Capturing => self.capture,
            EventPhase::AtTarget => true,
            EventPhase::Bubbling => !self.capture,
            EventPhase::None => false,
        }
    }
}

/// Per-node, per-type listener lists in registration order.
#[derive(Debug, Default, Clone)]
pub(crate) struct ListenerStore {
    map: HashMap<NodeId, HashMap<String, Vec<Listener>>>,
}

impl ListenerStore {
    /// Returns `false` when the same callback is already registered for the
    /// same type and capture flag.
    pub(crate) fn add(
        &mut self,
        node_id: NodeId,
        event_type: &str,
        callback: EventCallback,
        options: ListenerOptions,
    ) -> bool {
        let listeners = self
            .map
            .entry(node_id)
            .or_default()
            .entry(event_type.to_string())
            .or_default();
        if listeners.iter().any(|existing| {
            existing.kind == ListenerKind::Listener
                && existing.capture == options.capture
                && existing.callback.same_as(&callback)
        }) {
            return false;
        }
        listeners.push(Listener::new(callback, options, ListenerKind::Listener));
        true
    }

    pub(crate) fn remove(
        &mut self,
        node_id: NodeId,
        event_type: &str,
        callback: &EventCallback,
        capture: bool,
    ) -> bool {
        self.remove_where(node_id, event_type, |listener| {
            listener.kind == ListenerKind::Listener
                && listener.capture == capture
                && listener.callback.same_as(callback)
        })
    }

    /// Removes a specific entry (used for `once` listeners).
    pub(crate) fn remove_entry(&mut self, node_id: NodeId, event_type: &str, entry: &Listener) {
        self.remove_where(node_id, event_type, |listener| {
            Rc::ptr_eq(&listener.removed, &entry.removed)
        });
    }

    /// Installs, replaces (keeping its position) or clears the `on<type>` slot.
    pub(crate) fn set_attribute_handler(
        &mut self,
        node_id: NodeId,
        event_type: &str,
        callback: Option<EventCallback>,
    ) {
        let Some(callback) = callback else {
            self.remove_where(node_id, event_type, |listener| {
                listener.kind == ListenerKind::Attribute
            });
            return;
        };
        let listeners = self
            .map
            .entry(node_id)
            .or_default()
            .entry(event_type.to_string())
            .or_default();
        if let Some(slot) = listeners
            .iter_mut()
            .find(|listener| listener.kind == ListenerKind::Attribute)
        {
            slot.callback = callback;
            return;
        }
        listeners.push(Listener::new(
            callback,
            ListenerOptions::default(),
            ListenerKind::Attribute,
        ));
    }

    pub(crate) fn attribute_handler(&self, node_id: NodeId, event_type: &str) -> Option<EventCallback> {
        self.map
            .get(&node_id)?
            .get(event_type)?
            .iter()
            .find(|listener| listener.kind == ListenerKind::Attribute)
            .map(|listener| listener.callback.clone())
    }

    fn remove_where(
        &mut self,
        node_id: NodeId,
        event_type: &str,
        predicate: impl Fn(&Listener) -> bool,
    ) -> bool {
        let Some(events) = self.map.get_mut(&node_id) else {
            return false;
        };
        let Some(listeners) = events.get_mut(event_type) else {
            return false;
        };
        let Some(pos) = listeners.iter().position(predicate) else {
            return false;
        };
        let removed = listeners.remove(pos);
        removed.removed.set(true);
        if listeners.is_empty() {
            events.remove(event_type);
        }
        if events.is_empty() {
            self.map.remove(&node_id);
        }
        true
    }

    /// Copy of the list as it stands now; additions made later are not seen.
    pub(crate) fn snapshot(&self, node_id: NodeId, event_type: &str) -> Vec<Listener> {
        self.map
            .get(&node_id)
            .and_then(|events| events.get(event_type))
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn count(&self, node_id: NodeId, event_type: &str) -> usize {
        self.map
            .get(&node_id)
            .and_then(|events| events.get(event_type))
            .map_or(0, Vec::len)
    }

    /// Drops every list registered on `node_id`. Returns how many listeners went.
    pub(crate) fn remove_node(&mut self, node_id: NodeId) -> usize {
        let Some(events) = self.map.remove(&node_id) else {
            return 0;
        };
        let mut removed = 0;
        for listener in events.values().flatten() {
            listener.removed.set(true);
            removed += 1;
        }
        removed
    }

    pub(crate) fn clear(&mut self) {
        for listener in self.map.values().flat_map(|events| events.values()).flatten() {
            listener.removed.set(true);
        }
        self.map.clear();
    }
}
