use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventPhase {
    #[default]
    None,
    Capturing,
    AtTarget,
    Bubbling,
}

impl EventPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Capturing => "capturing",
            Self::AtTarget => "at_target",
            Self::Bubbling => "bubbling",
        }
    }
}

impl fmt::Display for EventPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interface family accepted by `createEvent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventFamily {
    #[default]
    Event,
    UiEvent,
    MouseEvent,
    KeyboardEvent,
    FocusEvent,
    BeforeUnloadEvent,
    CustomEvent,
}

impl EventFamily {
    /// ASCII case-insensitive, including the legacy plural aliases.
    pub fn parse(name: &str) -> Option<Self> {
        let family = match name.to_ascii_lowercase().as_str() {
            "event" | "events" | "htmlevents" => Self::Event,
            "uievent" | "uievents" => Self::UiEvent,
            "mouseevent" | "mouseevents" => Self::MouseEvent,
            "keyboardevent" => Self::KeyboardEvent,
            "focusevent" => Self::FocusEvent,
            "beforeunloadevent" => Self::BeforeUnloadEvent,
            "customevent" => Self::CustomEvent,
            _ => return None,
        };
        Some(family)
    }
}

/// Options bag for [`Event::new`]. Missing options are `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventInit {
    pub bubbles: bool,
    pub cancelable: bool,
    pub composed: bool,
}

impl EventInit {
    pub fn bubbling() -> Self {
        Self {
            bubbles: true,
            ..Self::default()
        }
    }

    pub fn bubbling_cancelable() -> Self {
        Self {
            bubbles: true,
            cancelable: true,
            ..Self::default()
        }
    }
}

/// Payload carried along with the record. The dispatcher never reads it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventDetail {
    pub key: Option<String>,
    pub key_code: u32,
    pub button: i16,
    pub client_x: f64,
    pub client_y: f64,
    pub ctrl_key: bool,
    pub shift_key: bool,
    pub alt_key: bool,
    pub meta_key: bool,
    pub submitter: Option<NodeId>,
    pub related_target: Option<NodeId>,
    pub data: Option<String>,
}

/// One event record.
///
/// `default_prevented` and `propagation_stopped` are the only cancellation
/// state; `return_value` and `cancel_bubble` are views over them.
#[derive(Debug, Clone)]
pub struct Event {
    event_type: String,
    family: EventFamily,
    bubbles: bool,
    cancelable: bool,
    composed: bool,
    initialized: bool,
    is_trusted: bool,
    pub(crate) target: Option<NodeId>,
    pub(crate) current_target: Option<NodeId>,
    pub(crate) phase: EventPhase,
    default_prevented: bool,
    pub(crate) propagation_stopped: bool,
    pub(crate) immediate_propagation_stopped: bool,
    pub(crate) dispatching: bool,
    pub(crate) in_passive_listener: bool,
    return_value_text: String,
    /// Non-empty `beforeunload` messages seen during the current walk, in order.
    pub(crate) observed_messages: Vec<String>,
    detail: EventDetail,
}

impl Event {
    pub fn new(event_type: &str, init: EventInit) -> Self {
        Self {
            event_type: event_type.to_string(),
            family: EventFamily::Event,
            bubbles: init.bubbles,
            cancelable: init.cancelable,
            composed: init.composed,
            initialized: true,
            is_trusted: false,
            target: None,
            current_target: None,
            phase: EventPhase::None,
            default_prevented: false,
            propagation_stopped: false,
            immediate_propagation_stopped: false,
            dispatching: false,
            in_passive_listener: false,
            return_value_text: String::new(),
            observed_messages: Vec::new(),
            detail: EventDetail::default(),
        }
    }

    /// Legacy `createEvent`: a blank record that must go through
    /// [`Event::init_event`] before it can be dispatched.
    pub fn create(family: &str) -> Result<Self> {
        let family = EventFamily::parse(family).ok_or_else(|| {
            Error::NotSupported(format!("createEvent does not know `{family}`"))
        })?;
        let mut event = Self::new("", EventInit::default());
        event.family = family;
        event.initialized = false;
        Ok(event)
    }

    /// Legacy `initEvent`. Overwrites a not-yet-dispatched record; calling it
    /// while the record is being dispatched fails.
    pub fn init_event(&mut self, event_type: &str, bubbles: bool, cancelable: bool) -> Result<()> {
        if self.dispatching {
            return Err(Error::InvalidState(format!(
                "initEvent(`{event_type}`) while `{}` is being dispatched",
                self.event_type
            )));
        }
        self.event_type = event_type.to_string();
        self.bubbles = bubbles;
        self.cancelable = cancelable;
        self.initialized = true;
        self.is_trusted = false;
        self.target = None;
        self.default_prevented = false;
        self.propagation_stopped = false;
        self.immediate_propagation_stopped = false;
        self.return_value_text.clear();
        self.observed_messages.clear();
        Ok(())
    }

    /// Record for a browser-initiated event with the canonical flags for its type.
    pub(crate) fn synthetic(event_type: &str) -> Self {
        let (bubbles, cancelable, family) = match event_type {
            "click" | "dblclick" | "mousedown" | "mouseup" => (true, true, EventFamily::MouseEvent),
            "submit" | "reset" => (true, true, EventFamily::Event),
            "change" | "input" | "DOMContentLoaded" => (true, false, EventFamily::Event),
            "focus" | "blur" => (false, false, EventFamily::FocusEvent),
            "focusin" | "focusout" => (true, false, EventFamily::FocusEvent),
            "keydown" | "keypress" | "keyup" => (true, true, EventFamily::KeyboardEvent),
            "beforeunload" => (false, true, EventFamily::BeforeUnloadEvent),
            "invalid" => (false, true, EventFamily::Event),
            _ => (false, false, EventFamily::Event),
        };
        let mut event = Self::new(
            event_type,
            EventInit {
                bubbles,
                cancelable,
                composed: false,
            },
        );
        event.family = family;
        event.is_trusted = true;
        event
    }

    pub fn with_detail(mut self, detail: EventDetail) -> Self {
        self.detail = detail;
        self
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn family(&self) -> EventFamily {
        self.family
    }

    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    pub fn cancelable(&self) -> bool {
        self.cancelable
    }

    pub fn composed(&self) -> bool {
        self.composed
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_trusted(&self) -> bool {
        self.is_trusted
    }

    pub(crate) fn set_untrusted(&mut self) {
        self.is_trusted = false;
    }

    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    pub fn current_target(&self) -> Option<NodeId> {
        self.current_target
    }

    pub fn phase(&self) -> EventPhase {
        self.phase
    }

    pub fn is_dispatching(&self) -> bool {
        self.dispatching
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// No-op for non-cancelable records and inside passive listeners.
    pub fn prevent_default(&mut self) {
        if self.cancelable && !self.in_passive_listener {
            self.default_prevented = true;
        }
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn stop_immediate_propagation(&mut self) {
        self.propagation_stopped = true;
        self.immediate_propagation_stopped = true;
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    pub fn immediate_propagation_stopped(&self) -> bool {
        self.immediate_propagation_stopped
    }

    pub fn return_value(&self) -> bool {
        !self.default_prevented
    }

    /// `false` is `prevent_default()`; `true` never un-prevents.
    pub fn set_return_value(&mut self, value: bool) {
        if !value {
            self.prevent_default();
        }
    }

    pub fn cancel_bubble(&self) -> bool {
        self.propagation_stopped
    }

    /// `true` is `stop_propagation()`; `false` is ignored.
    pub fn set_cancel_bubble(&mut self, value: bool) {
        if value {
            self.stop_propagation();
        }
    }

    /// `BeforeUnloadEvent.returnValue` message.
    pub fn return_value_text(&self) -> &str {
        &self.return_value_text
    }

    pub fn set_return_value_text(&mut self, message: &str) {
        self.return_value_text = message.to_string();
    }

    pub fn detail(&self) -> &EventDetail {
        &self.detail
    }

    pub fn detail_mut(&mut self) -> &mut EventDetail {
        &mut self.detail
    }

    pub(crate) fn ensure_not_dispatching(&self) -> Result<()> {
        if self.dispatching {
            return Err(Error::InvalidState(format!(
                "`{}` is already being dispatched",
                self.event_type
            )));
        }
        Ok(())
    }

    pub(crate) fn begin_dispatch(&mut self, target: NodeId) -> Result<()> {
        self.ensure_not_dispatching()?;
        if !self.initialized {
            return Err(Error::InvalidState(
                "event was created but not initialized".into(),
            ));
        }
        self.dispatching = true;
        self.target = Some(target);
        self.observed_messages.clear();
        Ok(())
    }

    pub(crate) fn end_dispatch(&mut self) {
        self.dispatching = false;
        self.in_passive_listener = false;
        self.phase = EventPhase::None;
        self.current_target = None;
        self.propagation_stopped = false;
        self.immediate_propagation_stopped = false;
    }
}
