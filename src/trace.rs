use super::*;

#[derive(Debug)]
pub(crate) struct TraceState {
    pub(crate) enabled: bool,
    pub(crate) events: bool,
    pub(crate) logs: VecDeque<String>,
    pub(crate) log_limit: usize,
}

impl TraceState {
    pub(crate) fn from_config(config: &HarnessConfig) -> Self {
        Self {
            enabled: config.trace,
            events: config.trace_events,
            logs: VecDeque::new(),
            log_limit: config.trace_log_limit,
        }
    }
}

impl Harness {
    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace.enabled = enabled;
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        std::mem::take(&mut self.trace.logs).into()
    }

    /// Event lines (`[event] ...`) can be silenced while keeping the rest.
    pub fn set_trace_events(&mut self, enabled: bool) {
        self.trace.events = enabled;
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::InvalidState(
                "set_trace_log_limit requires at least 1 entry".into(),
            ));
        }
        self.trace.log_limit = max_entries;
        while self.trace.logs.len() > self.trace.log_limit {
            self.trace.logs.pop_front();
        }
        Ok(())
    }

    pub(crate) fn trace_event_line(&mut self, line: String) {
        if self.trace.events {
            self.trace_line(line);
        }
    }

    pub(crate) fn trace_line(&mut self, line: String) {
        if !self.trace.enabled {
            return;
        }
        tracing::debug!(target: "headless_dom::trace", "{line}");
        if self.trace.logs.len() >= self.trace.log_limit {
            self.trace.logs.pop_front();
        }
        self.trace.logs.push_back(line);
    }

    /// `#id` when the element has one, else `<tag>` or the raw node handle.
    pub(crate) fn trace_node_label(&self, node_id: NodeId) -> String {
        if let Some(id) = self.dom.attr(node_id, "id").filter(|id| !id.is_empty()) {
            return format!("#{id}");
        }
        if node_id == self.dom.root() {
            return "document".to_string();
        }
        match self.dom.tag_name(node_id) {
            Some(tag) => format!("<{tag}>"),
            None => node_id.to_string(),
        }
    }
}
