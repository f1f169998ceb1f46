use super::*;

use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    /// Anything other than `post` (ASCII case-insensitive) is `GET`.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("post") {
            Self::Post
        } else {
            Self::Get
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationSource {
    Hyperlink,
    FormSubmission,
    /// [`Harness::navigate`], called by test code or a handler.
    Script,
}

/// A navigation handed to the page-load collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    /// Absolute URL. For `GET` submissions the query already carries the
    /// parameters.
    pub url: String,
    pub method: HttpMethod,
    pub parameters: Vec<(String, String)>,
    pub source: NavigationSource,
}

impl NavigationRequest {
    /// `application/x-www-form-urlencoded` form of the parameters.
    pub fn encoded_parameters(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.parameters.iter())
            .finish()
    }

    /// Request body: the encoded parameters for `POST`, nothing for `GET`.
    pub fn body(&self) -> Option<String> {
        match self.method {
            HttpMethod::Post => Some(self.encoded_parameters()),
            HttpMethod::Get => None,
        }
    }
}

/// Page-load collaborator: turns a request into the next document.
///
/// `Ok(None)` means there is no page for the request; the navigation is
/// recorded and the current document stays.
pub trait PageLoader {
    fn load(&mut self, request: &NavigationRequest) -> Result<Option<Dom>>;
}

type PageInitializerFn = dyn Fn(&mut Harness) -> std::result::Result<(), HandlerError>;

/// Runs after every document replacement, before `DOMContentLoaded`; the place
/// to register listeners on the new page.
#[derive(Clone)]
pub struct PageInitializer(Rc<PageInitializerFn>);

impl PageInitializer {
    pub fn new<F>(init: F) -> Self
    where
        F: Fn(&mut Harness) -> std::result::Result<(), HandlerError> + 'static,
    {
        Self(Rc::new(init))
    }
}

impl fmt::Debug for PageInitializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PageInitializer")
    }
}

type JavascriptUrlFn = dyn Fn(&mut Harness, &str) -> std::result::Result<(), HandlerError>;

/// Receives the source of `javascript:` URLs (the part after the scheme).
#[derive(Clone)]
pub struct JavascriptUrlHandler(Rc<JavascriptUrlFn>);

impl JavascriptUrlHandler {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&mut Harness, &str) -> std::result::Result<(), HandlerError> + 'static,
    {
        let wrapped = move |harness: &mut Harness, source: &str| handler(harness, source);
        Self(Rc::new(wrapped))
    }
}

impl fmt::Debug for JavascriptUrlHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JavascriptUrlHandler")
    }
}

#[derive(Default)]
pub(crate) struct NavigationState {
    pub(crate) log: Vec<NavigationRequest>,
    pub(crate) mock_pages: HashMap<String, String>,
    pub(crate) loader: Option<Box<dyn PageLoader>>,
    pub(crate) initializer: Option<PageInitializer>,
    pub(crate) javascript_url_handler: Option<JavascriptUrlHandler>,
}

pub(crate) fn is_javascript_url(raw: &str) -> bool {
    raw.trim_start()
        .get(..11)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("javascript:"))
}

impl Harness {
    /// Serves `html` for navigations to `url` when no custom loader is set.
    /// A request whose exact URL is not registered falls back to the URL
    /// without its query string.
    pub fn set_mock_page(&mut self, url: &str, html: &str) {
        self.navigation
            .mock_pages
            .insert(url.to_string(), html.to_string());
    }

    pub fn set_page_loader(&mut self, loader: impl PageLoader + 'static) {
        self.navigation.loader = Some(Box::new(loader));
    }

    pub fn set_page_initializer(&mut self, initializer: Option<PageInitializer>) {
        self.navigation.initializer = initializer;
    }

    pub fn set_javascript_url_handler(&mut self, handler: Option<JavascriptUrlHandler>) {
        self.navigation.javascript_url_handler = handler;
    }

    pub fn take_navigations(&mut self) -> Vec<NavigationRequest> {
        std::mem::take(&mut self.navigation.log)
    }

    /// Navigates to `url` (resolved against the document URL) as a script
    /// would. Returns whether the document URL changed.
    pub fn navigate(&mut self, url: &str) -> Result<bool> {
        if is_javascript_url(url) {
            self.run_javascript_url(url)?;
            return Ok(false);
        }
        let resolved = self.resolve_url(url)?;
        let request = NavigationRequest {
            url: resolved.to_string(),
            method: HttpMethod::Get,
            parameters: Vec::new(),
            source: NavigationSource::Script,
        };
        stacker::grow(32 * 1024 * 1024, || self.perform_navigation(request))
    }

    /// Replaces the document with `html` as if the page-load collaborator had
    /// delivered it, then fires the load events.
    pub fn load_html(&mut self, url: &str, html: &str) -> Result<()> {
        let dom = Dom::parse(html)?;
        self.replace_document(dom, url);
        self.run_page_initializer();
        self.fire_load_events()
    }

    pub(crate) fn resolve_url(&self, raw: &str) -> Result<Url> {
        let raw = raw.trim();
        let resolved = match Url::parse(&self.document_url) {
            Ok(base) => base.join(raw),
            Err(_) => Url::parse(raw),
        };
        resolved.or_else(|_| Url::parse(raw)).map_err(|err| Error::Navigation {
            url: raw.to_string(),
            reason: format!("cannot resolve against {}: {err}", self.document_url),
        })
    }

    pub(crate) fn follow_hyperlink(&mut self, anchor: NodeId) -> Result<()> {
        if !self.dom.is_connected(anchor) {
            return Ok(());
        }
        let Some(href) = self.dom.attr(anchor, "href").map(str::to_string) else {
            return Ok(());
        };
        if is_javascript_url(&href) {
            return self.run_javascript_url(&href);
        }
        let url = self.resolve_url(&href)?;
        let request = NavigationRequest {
            url: url.to_string(),
            method: HttpMethod::Get,
            parameters: Vec::new(),
            source: NavigationSource::Hyperlink,
        };
        self.perform_navigation(request)?;
        Ok(())
    }

    pub(crate) fn run_javascript_url(&mut self, raw: &str) -> Result<()> {
        let trimmed = raw.trim_start();
        let source = trimmed.get(11..).unwrap_or_default().to_string();
        self.trace_line(format!("[nav] javascript: {source}"));
        let Some(handler) = self.navigation.javascript_url_handler.clone() else {
            tracing::debug!(source = %source, "javascript: URL ignored, no handler registered");
            return Ok(());
        };
        if let Err(error) = (handler.0)(self, &source) {
            let root = self.dom.root();
            self.report_handler_error("javascript:", root, EventPhase::None, error);
        }
        Ok(())
    }

    /// Full navigation sequence. Returns whether the document URL changed.
    pub(crate) fn perform_navigation(&mut self, request: NavigationRequest) -> Result<bool> {
        if request.method == HttpMethod::Get && self.is_fragment_navigation(&request.url) {
            self.trace_line(format!("[nav] fragment {}", request.url));
            self.document_url = request.url;
            return Ok(true);
        }

        let generation = self.generation;
        if !self.fire_beforeunload()? {
            self.trace_line(format!("[nav] {} cancelled by beforeunload", request.url));
            return Ok(false);
        }
        if self.generation != generation {
            return Ok(false);
        }

        tracing::info!(
            url = %request.url,
            method = request.method.as_str(),
            source = ?request.source,
            "navigation"
        );
        self.trace_line(format!("[nav] {} {}", request.method.as_str(), request.url));
        self.navigation.log.push(request.clone());

        let Some(next) = self.load_page(&request)? else {
            return Ok(false);
        };

        let root = self.dom.root();
        self.fire(root, "unload")?;
        if self.generation != generation {
            return Ok(true);
        }
        self.replace_document(next, &request.url);
        self.run_page_initializer();
        self.fire_load_events()?;
        Ok(true)
    }

    fn is_fragment_navigation(&self, target: &str) -> bool {
        let (Ok(current), Ok(next)) = (Url::parse(&self.document_url), Url::parse(target)) else {
            return false;
        };
        if next.fragment().is_none() {
            return false;
        }
        let mut current = current;
        let mut next = next;
        current.set_fragment(None);
        next.set_fragment(None);
        current == next
    }

    fn load_page(&mut self, request: &NavigationRequest) -> Result<Option<Dom>> {
        if let Some(loader) = self.navigation.loader.as_mut() {
            return loader.load(request);
        }
        let html = self
            .navigation
            .mock_pages
            .get(&request.url)
            .or_else(|| {
                let mut without_query = Url::parse(&request.url).ok()?;
                without_query.set_query(None);
                without_query.set_fragment(None);
                self.navigation.mock_pages.get(without_query.as_str())
            })
            .cloned();
        let Some(html) = html else {
            self.trace_line(format!("[nav] no page for {}", request.url));
            return Ok(None);
        };
        Dom::parse(&html).map(Some)
    }

    /// `beforeunload` on the document. Returns `true` when unloading may go on.
    ///
    /// A prompt is needed when a handler supplied a non-empty message (or,
    /// with `prompt_on_cancelled_beforeunload`, cancelled the event); it is
    /// answered from the confirm response queue.
    pub fn fire_beforeunload(&mut self) -> Result<bool> {
        let root = self.dom.root();
        let event = self.fire(root, "beforeunload")?;
        let message = match self.config.beforeunload_policy {
            BeforeUnloadPolicy::FirstNonEmpty => event.observed_messages.first(),
            BeforeUnloadPolicy::LastNonEmpty => event.observed_messages.last(),
        }
        .cloned();
        let cancelled_prompt =
            self.config.prompt_on_cancelled_beforeunload && event.default_prevented();
        if message.is_none() && !cancelled_prompt {
            return Ok(true);
        }
        let message = message.unwrap_or_default();
        self.platform.beforeunload_prompts.push(message.clone());
        let leave = self.next_confirm_response();
        self.trace_line(format!("[nav] beforeunload prompt {message:?} leave={leave}"));
        Ok(leave)
    }

    /// `DOMContentLoaded` then `load` on the document.
    pub fn fire_load_events(&mut self) -> Result<()> {
        let generation = self.generation;
        let root = self.dom.root();
        self.fire(root, "DOMContentLoaded")?;
        if self.generation == generation {
            self.fire(root, "load")?;
        }
        Ok(())
    }

    /// Swaps in a new tree. Listeners, focus and indexes belong to the old
    /// document and are dropped with it.
    pub(crate) fn replace_document(&mut self, mut dom: Dom, url: &str) {
        dom.set_clone_id_policy(self.config.clone_id_policy);
        self.listeners.clear();
        self.focus = FocusState::default();
        self.dom = dom;
        self.document_url = url.to_string();
        self.generation += 1;
        self.trace_line(format!("[nav] document replaced url={url} generation={}", self.generation));
    }

    fn run_page_initializer(&mut self) {
        let Some(initializer) = self.navigation.initializer.clone() else {
            return;
        };
        if let Err(error) = (initializer.0)(self) {
            let root = self.dom.root();
            self.report_handler_error("pageinit", root, EventPhase::None, error);
        }
    }
}
