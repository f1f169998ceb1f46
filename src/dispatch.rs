use super::*;

/// A handler failure captured during a walk.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{event_type}` handler on {node} ({phase}) failed: {error}")]
pub struct ReportedHandlerError {
    pub event_type: String,
    pub node: NodeId,
    pub phase: EventPhase,
    pub error: HandlerError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WalkOutcome {
    Completed,
    PropagationStopped,
    /// The document was replaced by a handler; the rest of the path is stale.
    DocumentReplaced,
}

impl WalkOutcome {
    fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::PropagationStopped => "propagation_stopped",
            Self::DocumentReplaced => "document_replaced",
        }
    }
}

impl Harness {
    /// `dispatchEvent`: walks `event` through the tree and returns
    /// `!default_prevented`.
    ///
    /// The record is marked untrusted. Click activation (checkbox toggling,
    /// following links, ...) still runs; other default actions are reserved
    /// for browser-initiated events.
    pub fn dispatch_event(&mut self, target: NodeId, event: &mut Event) -> Result<bool> {
        // a rejected call must leave a record that is mid-dispatch untouched
        event.ensure_not_dispatching()?;
        event.set_untrusted();
        stacker::grow(32 * 1024 * 1024, || {
            self.dispatch_with_default_actions(target, event)
        })
    }

    /// Dispatches a fresh browser-initiated event of `event_type`.
    pub(crate) fn fire(&mut self, target: NodeId, event_type: &str) -> Result<Event> {
        self.fire_event(target, Event::synthetic(event_type))
    }

    pub(crate) fn fire_event(&mut self, target: NodeId, mut event: Event) -> Result<Event> {
        self.dispatch_with_default_actions(target, &mut event)?;
        Ok(event)
    }

    pub(crate) fn dispatch_with_default_actions(
        &mut self,
        target: NodeId,
        event: &mut Event,
    ) -> Result<bool> {
        self.dom.ensure_node(target)?;
        event.begin_dispatch(target)?;

        let activation = if event.event_type() == "click" {
            self.begin_activation(target, event)
        } else {
            None
        };

        let generation = self.generation;
        let outcome = self.run_dispatch_walk(target, event, generation);
        if outcome == WalkOutcome::DocumentReplaced {
            return Ok(!event.default_prevented());
        }

        if let Some(activation) = activation {
            self.finish_activation(activation, event)?;
        } else if event.is_trusted() && !event.default_prevented() {
            self.run_default_action(target, event)?;
        }
        Ok(!event.default_prevented())
    }

    /// Capturing, at-target and bubbling phases over the path fixed at the
    /// start of the walk. Ends the record's dispatch state before returning.
    pub(crate) fn run_dispatch_walk(
        &mut self,
        target: NodeId,
        event: &mut Event,
        generation: u64,
    ) -> WalkOutcome {
        // labelled up front: after a document replacement the id belongs to another tree
        let target_label = self.trace.enabled.then(|| self.trace_node_label(target));
        let path = self.dom.ancestors_inclusive(target);
        let mut plan = Vec::with_capacity(path.len() * 2);
        for node in path.iter().skip(1).rev() {
            plan.push((*node, EventPhase::Capturing));
        }
        plan.push((target, EventPhase::AtTarget));
        if event.bubbles() {
            for node in path.iter().skip(1) {
                plan.push((*node, EventPhase::Bubbling));
            }
        }

        for (node, phase) in plan {
            if event.propagation_stopped || self.generation != generation {
                break;
            }
            event.current_target = Some(node);
            event.phase = phase;
            self.invoke_listeners(node, event, phase, generation);
        }

        let outcome = if self.generation != generation {
            WalkOutcome::DocumentReplaced
        } else if event.propagation_stopped {
            WalkOutcome::PropagationStopped
        } else {
            WalkOutcome::Completed
        };
        self.trace_event_done(event, outcome, target_label.unwrap_or_default());
        event.end_dispatch();
        outcome
    }

    fn invoke_listeners(
        &mut self,
        node_id: NodeId,
        event: &mut Event,
        phase: EventPhase,
        generation: u64,
    ) {
        let event_type = event.event_type().to_string();
        let listeners = self.listeners.snapshot(node_id, &event_type);
        for listener in listeners {
            if !listener.runs_in(phase) || listener.removed.get() {
                continue;
            }
            if self.generation != generation {
                break;
            }
            if listener.once {
                self.listeners.remove_entry(node_id, &event_type, &listener);
            }
            if self.trace.enabled {
                let target_label = event
                    .target()
                    .map(|target| self.trace_node_label(target))
                    .unwrap_or_default();
                let current_label = self.trace_node_label(node_id);
                self.trace_event_line(format!(
                    "[event] {} target={} current={} phase={} default_prevented={}",
                    event_type,
                    target_label,
                    current_label,
                    phase,
                    event.default_prevented()
                ));
            }

            let message_before = event.return_value_text().to_string();
            event.in_passive_listener = listener.passive;
            let result = listener.callback.call(self, event, node_id);
            event.in_passive_listener = false;

            if event_type == "beforeunload" {
                let message = event.return_value_text();
                if !message.is_empty() && message != message_before {
                    let message = message.to_string();
                    event.observed_messages.push(message);
                }
            }
            match result {
                Ok(value) if listener.kind == ListenerKind::Attribute => {
                    self.apply_attribute_handler_value(event, value);
                }
                Ok(_) => {}
                Err(error) => self.report_handler_error(&event_type, node_id, phase, error),
            }

            if event.immediate_propagation_stopped {
                break;
            }
        }
    }

    fn apply_attribute_handler_value(&mut self, event: &mut Event, value: HandlerValue) {
        match value {
            HandlerValue::Bool(false) => event.prevent_default(),
            HandlerValue::Text(message)
                if event.event_type() == "beforeunload" && !message.is_empty() =>
            {
                event.observed_messages.push(message.clone());
                if event.return_value_text().is_empty() {
                    event.set_return_value_text(&message);
                }
                event.prevent_default();
            }
            _ => {}
        }
    }

    pub(crate) fn report_handler_error(
        &mut self,
        event_type: &str,
        node: NodeId,
        phase: EventPhase,
        error: HandlerError,
    ) {
        let reported = ReportedHandlerError {
            event_type: event_type.to_string(),
            node,
            phase,
            error,
        };
        tracing::warn!(%reported, "event handler failed");
        self.trace_line(format!("[error] {reported}"));
        self.handler_errors.push(reported);
    }

    /// Drains the errors raised by handlers since the last call.
    pub fn take_handler_errors(&mut self) -> Vec<ReportedHandlerError> {
        std::mem::take(&mut self.handler_errors)
    }

    fn trace_event_done(&mut self, event: &Event, outcome: WalkOutcome, target_label: String) {
        if !self.trace.enabled {
            return;
        }
        self.trace_event_line(format!(
            "[event] done {} target={} outcome={} default_prevented={} propagation_stopped={} immediate_stopped={}",
            event.event_type(),
            target_label,
            outcome.as_str(),
            event.default_prevented(),
            event.propagation_stopped,
            event.immediate_propagation_stopped
        ));
    }
}
