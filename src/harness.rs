use super::*;

#[derive(Debug, Default)]
pub(crate) struct FocusState {
    pub(crate) active: Option<NodeId>,
    /// Control value when it gained focus, for `change` on blur.
    pub(crate) value_at_focus: Option<String>,
}

#[derive(Debug, Default)]
pub(crate) struct PlatformMocks {
    pub(crate) alerts: Vec<String>,
    pub(crate) confirm_responses: VecDeque<bool>,
    pub(crate) default_confirm_response: bool,
    pub(crate) beforeunload_prompts: Vec<String>,
}

/// One document plus everything the event engine keeps beside it.
pub struct Harness {
    pub(crate) dom: Dom,
    pub(crate) listeners: ListenerStore,
    pub(crate) document_url: String,
    /// Bumped on every document replacement; walks started on an older
    /// generation stop.
    pub(crate) generation: u64,
    pub(crate) config: HarnessConfig,
    pub(crate) focus: FocusState,
    pub(crate) navigation: NavigationState,
    pub(crate) platform: PlatformMocks,
    pub(crate) handler_errors: Vec<ReportedHandlerError>,
    pub(crate) trace: TraceState,
}

impl fmt::Debug for Harness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Harness")
            .field("document_url", &self.document_url)
            .field("generation", &self.generation)
            .field("nodes", &self.dom.nodes.len())
            .field("focused", &self.focus.active)
            .finish_non_exhaustive()
    }
}

impl Harness {
    pub fn from_html(html: &str) -> Result<Self> {
        Self::with_config(html, HarnessConfig::default())
    }

    pub fn from_html_with_url(url: &str, html: &str) -> Result<Self> {
        Self::with_config(html, HarnessConfig::default().with_document_url(url))
    }

    pub fn with_config(html: &str, config: HarnessConfig) -> Result<Self> {
        config.validate()?;
        let mut dom = Dom::parse(html)?;
        dom.set_clone_id_policy(config.clone_id_policy);
        Ok(Self::from_dom(dom, config))
    }

    /// Wraps a tree built by some other parser.
    pub fn from_dom(mut dom: Dom, config: HarnessConfig) -> Self {
        dom.set_clone_id_policy(config.clone_id_policy);
        tracing::debug!(url = %config.document_url, "harness created");
        Self {
            dom,
            listeners: ListenerStore::default(),
            document_url: config.document_url.clone(),
            generation: 0,
            focus: FocusState::default(),
            navigation: NavigationState::default(),
            platform: PlatformMocks::default(),
            handler_errors: Vec::new(),
            trace: TraceState::from_config(&config),
            config,
        }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn set_clone_id_policy(&mut self, policy: CloneIdPolicy) {
        self.config.clone_id_policy = policy;
        self.dom.set_clone_id_policy(policy);
    }

    pub fn set_beforeunload_policy(&mut self, policy: BeforeUnloadPolicy) {
        self.config.beforeunload_policy = policy;
    }

    pub fn set_prompt_on_cancelled_beforeunload(&mut self, enabled: bool) {
        self.config.prompt_on_cancelled_beforeunload = enabled;
    }

    pub fn set_validate_on_submit(&mut self, enabled: bool) {
        self.config.validate_on_submit = enabled;
    }

    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut Dom {
        &mut self.dom
    }

    pub fn document(&self) -> NodeId {
        self.dom.root()
    }

    pub fn document_url(&self) -> &str {
        &self.document_url
    }

    /// Counts document replacements since the harness was created.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn by_id(&self, id: &str) -> Result<NodeId> {
        self.dom.require_by_id(id)
    }

    pub fn add_event_listener(
        &mut self,
        node_id: NodeId,
        event_type: &str,
        callback: EventCallback,
        capture: bool,
    ) -> Result<()> {
        self.add_event_listener_with_options(
            node_id,
            event_type,
            callback,
            ListenerOptions {
                capture,
                ..ListenerOptions::default()
            },
        )
    }

    pub fn add_event_listener_with_options(
        &mut self,
        node_id: NodeId,
        event_type: &str,
        callback: EventCallback,
        options: ListenerOptions,
    ) -> Result<()> {
        self.dom.ensure_node(node_id)?;
        if !self.listeners.add(node_id, event_type, callback, options) {
            tracing::trace!(node = %node_id, event_type, "duplicate listener ignored");
        }
        Ok(())
    }

    /// Returns whether a matching listener was found.
    pub fn remove_event_listener(
        &mut self,
        node_id: NodeId,
        event_type: &str,
        callback: &EventCallback,
        capture: bool,
    ) -> bool {
        self.listeners.remove(node_id, event_type, callback, capture)
    }

    /// Sets (or with `None` clears) the `on<type>` handler slot of a node.
    pub fn set_event_handler(
        &mut self,
        node_id: NodeId,
        event_type: &str,
        callback: Option<EventCallback>,
    ) -> Result<()> {
        self.dom.ensure_node(node_id)?;
        self.listeners
            .set_attribute_handler(node_id, event_type, callback);
        Ok(())
    }

    pub fn event_handler(&self, node_id: NodeId, event_type: &str) -> Option<EventCallback> {
        self.listeners.attribute_handler(node_id, event_type)
    }

    /// Drops the listeners and handler slots of a detached subtree, releasing
    /// whatever their closures captured. The arena slots themselves are only
    /// reclaimed when the document is replaced. Returns the number of
    /// listeners dropped.
    pub fn release_detached(&mut self, node_id: NodeId) -> Result<usize> {
        self.dom.ensure_node(node_id)?;
        if self.dom.is_connected(node_id) {
            return Err(Error::InvalidState(format!(
                "release_detached: {node_id} is still connected"
            )));
        }
        let released: usize = self
            .dom
            .subtree_nodes(node_id)
            .into_iter()
            .map(|node| self.listeners.remove_node(node))
            .sum();
        tracing::debug!(node = %node_id, released, "detached subtree released");
        Ok(released)
    }

    pub fn listener_count(&self, node_id: NodeId, event_type: &str) -> usize {
        self.listeners.count(node_id, event_type)
    }

    /// Legacy `document.createEvent(family)`.
    pub fn create_event(&self, family: &str) -> Result<Event> {
        Event::create(family)
    }

    pub fn alert(&mut self, message: &str) {
        tracing::info!(message, "alert");
        self.platform.alerts.push(message.to_string());
    }

    pub fn take_alert_messages(&mut self) -> Vec<String> {
        std::mem::take(&mut self.platform.alerts)
    }

    pub fn enqueue_confirm_response(&mut self, accepted: bool) {
        self.platform.confirm_responses.push_back(accepted);
    }

    pub fn set_default_confirm_response(&mut self, accepted: bool) {
        self.platform.default_confirm_response = accepted;
    }

    pub(crate) fn next_confirm_response(&mut self) -> bool {
        self.platform
            .confirm_responses
            .pop_front()
            .unwrap_or(self.platform.default_confirm_response)
    }

    /// Messages of the `beforeunload` prompts shown so far (an empty string
    /// for a message-less cancel under `prompt_on_cancelled_beforeunload`).
    pub fn take_beforeunload_prompts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.platform.beforeunload_prompts)
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focus.active
    }
}
