//! In-memory [`Session`] backed by a [`FixtureSite`].

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use super::css::CssSelector;
use super::document::{Effect, FixtureDocument, NodeId, BODY};
use super::xpath::XPath;
use crate::config::{Settings, WindowSize};
use crate::locator::{Selector, Strategy};
use crate::result::{VitrineError, VitrineResult};
use crate::session::{BrowserKind, ElementRef, ElementState, ReadyState, Session, SessionProvider};

/// 1x1 transparent PNG returned by fixture screenshots
const BLANK_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// A parsed request for a fixture page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Full URL as navigated
    pub url: String,
    /// Path without query or fragment, no trailing slash (except `/`)
    pub path: String,
    /// Decoded query pairs
    pub query: Vec<(String, String)>,
}

impl Request {
    /// Parse a URL relative to `origin`
    #[must_use]
    pub fn parse(origin: &str, url: &str) -> Self {
        let origin = origin.trim_end_matches('/');
        let full = if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else if url.starts_with('/') {
            format!("{origin}{url}")
        } else {
            format!("{origin}/{url}")
        };
        let after_scheme = full.split_once("://").map_or(full.as_str(), |(_, rest)| rest);
        let path_and_query = after_scheme
            .find('/')
            .map_or("/", |i| &after_scheme[i..]);
        let without_fragment = path_and_query.split('#').next().unwrap_or("/");
        let (path, query) = without_fragment
            .split_once('?')
            .unwrap_or((without_fragment, ""));
        let mut path = path.trim_end_matches('/').to_string();
        if path.is_empty() {
            path.push('/');
        }
        let query = query
            .split('&')
            .filter(|p| !p.is_empty())
            .map(|pair| {
                let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
                (percent_decode(k), percent_decode(v))
            })
            .collect();
        Self {
            url: full,
            path,
            query,
        }
    }

    /// First value of a query parameter
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).unwrap_or("");
                if let Ok(b) = u8::from_str_radix(hex, 16) {
                    out.push(b);
                    i += 2;
                } else {
                    out.push(b'%');
                }
            }
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Percent-encode a query value
#[must_use]
pub fn percent_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(char::from(b));
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

/// Renders a document for a request from the current site state
pub type PageFactory<S> = Arc<dyn Fn(&Request, &S) -> FixtureDocument<S> + Send + Sync>;

/// A set of routes rendering fixture documents
pub struct FixtureSite<S = ()> {
    origin: String,
    routes: Vec<(String, PageFactory<S>)>,
    not_found: Option<PageFactory<S>>,
}

impl<S> Clone for FixtureSite<S> {
    fn clone(&self) -> Self {
        Self {
            origin: self.origin.clone(),
            routes: self.routes.clone(),
            not_found: self.not_found.clone(),
        }
    }
}

impl<S> fmt::Debug for FixtureSite<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixtureSite")
            .field("origin", &self.origin)
            .field("routes", &self.routes.iter().map(|(p, _)| p).collect::<Vec<_>>())
            .finish()
    }
}

impl<S> FixtureSite<S> {
    /// Site served under `origin` (e.g. `https://shop.test`)
    #[must_use]
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into().trim_end_matches('/').to_string(),
            routes: Vec::new(),
            not_found: None,
        }
    }

    /// Add a route for an exact path
    #[must_use]
    pub fn page(
        mut self,
        path: &str,
        factory: impl Fn(&Request, &S) -> FixtureDocument<S> + Send + Sync + 'static,
    ) -> Self {
        let mut path = path.trim_end_matches('/').to_string();
        if path.is_empty() {
            path.push('/');
        }
        self.routes.push((path, Arc::new(factory)));
        self
    }

    /// Add a route serving a fixed document
    #[must_use]
    pub fn static_page(self, path: &str, document: FixtureDocument<S>) -> Self
    where
        S: 'static,
    {
        self.page(path, move |_, _| document.clone())
    }

    /// Render unknown paths with `factory` instead of the bare 404 document
    #[must_use]
    pub fn not_found(
        mut self,
        factory: impl Fn(&Request, &S) -> FixtureDocument<S> + Send + Sync + 'static,
    ) -> Self {
        self.not_found = Some(Arc::new(factory));
        self
    }

    /// Site origin
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    fn render(&self, request: &Request, state: &S) -> FixtureDocument<S> {
        self.routes
            .iter()
            .find(|(path, _)| *path == request.path)
            .map(|(_, factory)| factory)
            .or(self.not_found.as_ref())
            .map_or_else(
                || {
                    FixtureDocument::new("404 Not Found")
                        .with(super::El::new("h1").class("not-found").text("Page not found"))
                },
                |factory| factory(request, state),
            )
    }
}

struct Inner<S> {
    url: String,
    history: Vec<String>,
    document: FixtureDocument<S>,
    generation: u64,
    loaded_at: Instant,
    state: S,
    window: WindowSize,
    closed: bool,
}

/// Session over an in-memory [`FixtureSite`]
pub struct FixtureSession<S = ()> {
    site: FixtureSite<S>,
    inner: Mutex<Inner<S>>,
    quits: Arc<AtomicUsize>,
    actions: Arc<Mutex<Vec<String>>>,
}

impl<S> fmt::Debug for FixtureSession<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixtureSession")
            .field("site", &self.site)
            .field("quits", &self.quits.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl FixtureSession<()> {
    /// Session showing a single document at `url`
    #[must_use]
    pub fn with_document(url: &str, document: FixtureDocument<()>) -> Self {
        let origin = origin_of(url).unwrap_or_else(|| "http://fixture.invalid".to_string());
        let request = Request::parse(&origin, url);
        let site = FixtureSite::new(origin).static_page(&request.path, document);
        Self::open(site, (), &request.url)
    }
}

fn origin_of(url: &str) -> Option<String> {
    let (scheme, rest) = url.split_once("://")?;
    let host = rest.split(['/', '?', '#']).next()?;
    Some(format!("{scheme}://{host}"))
}

impl<S: Send + 'static> FixtureSession<S> {
    /// Open a session on `site` and load `start_url`
    #[must_use]
    pub fn open(site: FixtureSite<S>, state: S, start_url: &str) -> Self {
        let request = Request::parse(site.origin(), start_url);
        let document = site.render(&request, &state);
        Self {
            inner: Mutex::new(Inner {
                url: request.url,
                history: Vec::new(),
                document,
                generation: 0,
                loaded_at: Instant::now(),
                state,
                window: WindowSize::default(),
                closed: false,
            }),
            site,
            quits: Arc::new(AtomicUsize::new(0)),
            actions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Counter of `quit` calls, shared with the session
    #[must_use]
    pub fn quit_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.quits)
    }

    /// Log of actions (`navigate:<url>`, `click:<id>`, ...), shared with the session
    #[must_use]
    pub fn action_log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.actions)
    }

    /// Run a closure against the site state
    pub fn with_state<R>(&self, f: impl FnOnce(&mut S) -> R) -> VitrineResult<R> {
        let mut inner = self.lock()?;
        Ok(f(&mut inner.state))
    }

    fn lock(&self) -> VitrineResult<MutexGuard<'_, Inner<S>>> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| VitrineError::session("fixture session lock poisoned"))?;
        if inner.closed {
            return Err(VitrineError::session("session already quit"));
        }
        Ok(inner)
    }

    fn record(&self, action: String) {
        if let Ok(mut log) = self.actions.lock() {
            log.push(action);
        }
    }

    fn load(&self, inner: &mut Inner<S>, url: &str, push_history: bool) {
        let request = Request::parse(self.site.origin(), url);
        if push_history {
            let previous = std::mem::replace(&mut inner.url, request.url.clone());
            inner.history.push(previous);
        } else {
            inner.url.clone_from(&request.url);
        }
        inner.document = self.site.render(&request, &inner.state);
        inner.generation += 1;
        inner.loaded_at = Instant::now();
    }

    fn resolve(&self, inner: &Inner<S>, element: &ElementRef) -> VitrineResult<NodeId> {
        let stale = || VitrineError::StaleElement {
            element: element.id().to_string(),
        };
        let (generation, node) = element.id().split_once(':').ok_or_else(stale)?;
        let generation: u64 = generation.parse().map_err(|_| stale())?;
        let node: NodeId = node.parse().map_err(|_| stale())?;
        if generation != inner.generation
            || !inner
                .document
                .is_present_at(node, inner.loaded_at.elapsed())
        {
            return Err(stale());
        }
        Ok(node)
    }

    fn apply(&self, inner: &mut Inner<S>, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Navigate(url) => self.load(inner, &url, true),
                Effect::Reload => {
                    let url = inner.url.clone();
                    self.load(inner, &url, false);
                }
                Effect::Show(id) | Effect::Hide(id) if inner.document.by_id(&id).is_none() => {
                    tracing::debug!(id = %id, "fixture effect target missing");
                }
                Effect::Show(id) => set_node(&mut inner.document, &id, |n| n.displayed = true),
                Effect::Hide(id) => set_node(&mut inner.document, &id, |n| n.displayed = false),
                Effect::SetText(id, text) => set_node(&mut inner.document, &id, |n| n.text = text),
                Effect::SetValue(id, value) => set_node(&mut inner.document, &id, |n| {
                    n.attrs.insert("value".to_string(), value);
                }),
                Effect::Append(id, element) => {
                    let parent = inner.document.by_id(&id).unwrap_or(BODY);
                    inner.document.append(parent, &element);
                }
                Effect::Remove(id) => {
                    if let Some(node) = inner.document.by_id(&id) {
                        inner.document.remove(node);
                    }
                }
            }
        }
    }

    fn interactable(&self, inner: &Inner<S>, node: NodeId, element: &ElementRef) -> VitrineResult<()> {
        let doc = &inner.document;
        let enabled = doc.node(node).is_some_and(|n| n.enabled);
        if !doc.is_displayed_at(node, inner.window.width) || !enabled {
            return Err(VitrineError::NotInteractable {
                element: element.id().to_string(),
                message: if enabled { "not displayed" } else { "disabled" }.to_string(),
            });
        }
        Ok(())
    }
}

fn set_node<S>(doc: &mut FixtureDocument<S>, id: &str, f: impl FnOnce(&mut super::document::Node)) {
    if let Some(node) = doc.by_id(id).and_then(|n| doc.node_mut(n)) {
        f(node);
    }
}

fn is_ancestor<S>(doc: &FixtureDocument<S>, ancestor: NodeId, mut node: NodeId) -> bool {
    while let Some(parent) = doc.parent_of(node) {
        if parent == ancestor {
            return true;
        }
        node = parent;
    }
    false
}

fn select_nodes<S>(doc: &FixtureDocument<S>, selector: &Selector) -> VitrineResult<Vec<NodeId>> {
    match selector.strategy() {
        Strategy::Css => Ok(CssSelector::parse(selector.value())?.select(doc)),
        Strategy::XPath => Ok(XPath::parse(selector.value())?.select(doc)),
        Strategy::Id => Ok(doc
            .elements()
            .into_iter()
            .filter(|&n| doc.attr_of(n, "id").as_deref() == Some(selector.value()))
            .collect()),
        Strategy::Text => {
            let wanted = selector.value().trim();
            Ok(doc
                .elements()
                .into_iter()
                .filter(|&n| {
                    doc.text_content(n).trim() == wanted
                        && !doc
                            .children_of(n)
                            .into_iter()
                            .any(|c| doc.text_content(c).trim() == wanted)
                })
                .collect())
        }
    }
}

impl<S: Send + 'static> Session for FixtureSession<S> {
    fn navigate(&self, url: &str) -> VitrineResult<()> {
        let mut inner = self.lock()?;
        self.load(&mut inner, url, true);
        self.record(format!("navigate:{}", inner.url));
        Ok(())
    }

    fn current_url(&self) -> VitrineResult<String> {
        Ok(self.lock()?.url.clone())
    }

    fn title(&self) -> VitrineResult<String> {
        Ok(self.lock()?.document.title().to_string())
    }

    fn ready_state(&self) -> VitrineResult<ReadyState> {
        let inner = self.lock()?;
        if inner.loaded_at.elapsed() < inner.document.loading_duration() {
            Ok(ReadyState::Loading)
        } else {
            Ok(ReadyState::Complete)
        }
    }

    fn find_elements(&self, selector: &Selector) -> VitrineResult<Vec<ElementRef>> {
        let inner = self.lock()?;
        let elapsed = inner.loaded_at.elapsed();
        let nodes = select_nodes(&inner.document, selector)?;
        Ok(nodes
            .into_iter()
            .filter(|&n| inner.document.is_present_at(n, elapsed))
            .map(|n| ElementRef::new(format!("{}:{n}", inner.generation)))
            .collect())
    }

    fn find_elements_within(
        &self,
        parent: &ElementRef,
        selector: &Selector,
    ) -> VitrineResult<Vec<ElementRef>> {
        let inner = self.lock()?;
        let parent = self.resolve(&inner, parent)?;
        let elapsed = inner.loaded_at.elapsed();
        let doc = &inner.document;
        let nodes = select_nodes(doc, selector)?;
        Ok(nodes
            .into_iter()
            .filter(|&n| n != parent && is_ancestor(doc, parent, n))
            .filter(|&n| doc.is_present_at(n, elapsed))
            .map(|n| ElementRef::new(format!("{}:{n}", inner.generation)))
            .collect())
    }

    fn element_state(&self, element: &ElementRef) -> VitrineResult<ElementState> {
        let inner = self.lock()?;
        let node = self.resolve(&inner, element)?;
        let doc = &inner.document;
        let displayed = doc.is_displayed_at(node, inner.window.width);
        let (width, height, enabled) = doc
            .node(node)
            .map_or((0, 0, false), |n| (n.size.0, n.size.1, n.enabled));
        Ok(ElementState {
            displayed,
            enabled,
            width: if displayed { width } else { 0 },
            height: if displayed { height } else { 0 },
        })
    }

    fn click(&self, element: &ElementRef) -> VitrineResult<()> {
        let mut inner = self.lock()?;
        let node = self.resolve(&inner, element)?;
        self.interactable(&inner, node, element)?;
        let doc = &inner.document;
        let label = doc
            .attr_of(node, "id")
            .or_else(|| doc.attr_of(node, "data-action"))
            .unwrap_or_else(|| doc.node(node).map(|n| n.tag().to_string()).unwrap_or_default());
        self.record(format!("click:{label}"));

        let is_checkbox = doc.node(node).is_some_and(|n| {
            n.tag() == "input" && matches!(n.attr("type"), Some("checkbox" | "radio"))
        });
        if is_checkbox {
            if let Some(n) = inner.document.node_mut(node) {
                if n.attrs.remove("checked").is_none() {
                    n.attrs.insert("checked".to_string(), "checked".to_string());
                }
            }
        }

        if let Some(handler) = inner.document.handler_for_click(node) {
            let document = inner.document.clone();
            let effects = handler(&document, node, &mut inner.state);
            self.apply(&mut inner, effects);
        } else if let Some(href) = inner.document.closest_attr(node, "href") {
            self.apply(&mut inner, vec![Effect::Navigate(href)]);
        }
        Ok(())
    }

    fn clear(&self, element: &ElementRef) -> VitrineResult<()> {
        let mut inner = self.lock()?;
        let node = self.resolve(&inner, element)?;
        self.interactable(&inner, node, element)?;
        if let Some(n) = inner.document.node_mut(node) {
            n.attrs.insert("value".to_string(), String::new());
        }
        Ok(())
    }

    fn send_keys(&self, element: &ElementRef, text: &str) -> VitrineResult<()> {
        let mut inner = self.lock()?;
        let node = self.resolve(&inner, element)?;
        self.interactable(&inner, node, element)?;
        let (typed, submit) = text
            .strip_suffix('\n')
            .map_or((text, false), |t| (t, true));
        if let Some(n) = inner.document.node_mut(node) {
            let value = n.attrs.entry("value".to_string()).or_default();
            value.push_str(typed);
        }
        self.record(format!("type:{typed}"));
        if submit {
            if let Some(handler) = inner.document.handler_for_enter(node) {
                let document = inner.document.clone();
                let effects = handler(&document, node, &mut inner.state);
                self.apply(&mut inner, effects);
            }
        }
        Ok(())
    }

    fn text(&self, element: &ElementRef) -> VitrineResult<String> {
        let inner = self.lock()?;
        let node = self.resolve(&inner, element)?;
        if inner.document.is_displayed_at(node, inner.window.width) {
            Ok(inner.document.text_content(node))
        } else {
            Ok(String::new())
        }
    }

    fn attribute(&self, element: &ElementRef, name: &str) -> VitrineResult<Option<String>> {
        let inner = self.lock()?;
        let node = self.resolve(&inner, element)?;
        let doc = &inner.document;
        Ok(match name {
            "checked" => doc.attr_of(node, "checked").map(|_| "true".to_string()),
            "value" => Some(doc.attr_of(node, "value").unwrap_or_default()),
            other => doc.attr_of(node, other),
        })
    }

    fn select_option(&self, element: &ElementRef, visible_text: &str) -> VitrineResult<()> {
        let mut inner = self.lock()?;
        let node = self.resolve(&inner, element)?;
        self.interactable(&inner, node, element)?;
        let doc = &inner.document;
        let option = doc
            .children_of(node)
            .into_iter()
            .find(|&o| doc.text_content(o).trim() == visible_text.trim())
            .ok_or_else(|| VitrineError::NoSuchElement {
                selector: format!("option {visible_text:?}"),
            })?;
        let value = doc
            .attr_of(option, "value")
            .unwrap_or_else(|| visible_text.to_string());
        if let Some(n) = inner.document.node_mut(node) {
            n.attrs.insert("value".to_string(), value);
        }
        let handler = inner.document.handler_for_click(node);
        if let Some(handler) = handler {
            let document = inner.document.clone();
            let effects = handler(&document, node, &mut inner.state);
            self.apply(&mut inner, effects);
        }
        Ok(())
    }

    fn scroll_into_view(&self, element: &ElementRef) -> VitrineResult<()> {
        let inner = self.lock()?;
        self.resolve(&inner, element).map(|_| ())
    }

    fn hover(&self, element: &ElementRef) -> VitrineResult<()> {
        let inner = self.lock()?;
        self.resolve(&inner, element)?;
        self.record(format!("hover:{element}"));
        Ok(())
    }

    fn refresh(&self) -> VitrineResult<()> {
        let mut inner = self.lock()?;
        let url = inner.url.clone();
        self.load(&mut inner, &url, false);
        Ok(())
    }

    fn back(&self) -> VitrineResult<()> {
        let mut inner = self.lock()?;
        if let Some(previous) = inner.history.pop() {
            self.load(&mut inner, &previous, false);
        }
        Ok(())
    }

    fn set_window_size(&self, size: WindowSize) -> VitrineResult<()> {
        self.lock()?.window = size;
        self.record(format!("resize:{}x{}", size.width, size.height));
        Ok(())
    }

    fn window_size(&self) -> VitrineResult<WindowSize> {
        Ok(self.lock()?.window)
    }

    fn screenshot(&self) -> VitrineResult<Vec<u8>> {
        self.lock()?;
        Ok(BLANK_PNG.to_vec())
    }

    fn quit(&self) -> VitrineResult<()> {
        self.quits.fetch_add(1, Ordering::SeqCst);
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| VitrineError::session("fixture session lock poisoned"))?;
        inner.closed = true;
        Ok(())
    }
}

/// Opens a fresh [`FixtureSession`] per scenario
pub struct FixtureProvider<S = ()> {
    site: FixtureSite<S>,
    initial_state: Arc<dyn Fn() -> S + Send + Sync>,
    opened: Arc<AtomicUsize>,
    quits: Arc<Mutex<HashMap<usize, Arc<AtomicUsize>>>>,
}

impl<S> fmt::Debug for FixtureProvider<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixtureProvider")
            .field("site", &self.site)
            .field("opened", &self.opened.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl<S: Send + 'static> FixtureProvider<S> {
    /// Provider for `site`, each session starting from `initial_state()`
    #[must_use]
    pub fn new(site: FixtureSite<S>, initial_state: impl Fn() -> S + Send + Sync + 'static) -> Self {
        Self {
            site,
            initial_state: Arc::new(initial_state),
            opened: Arc::new(AtomicUsize::new(0)),
            quits: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Sessions opened so far
    #[must_use]
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Total `quit` calls per opened session, in opening order
    #[must_use]
    pub fn quit_counts(&self) -> Vec<usize> {
        let Ok(map) = self.quits.lock() else {
            return Vec::new();
        };
        let mut counts: Vec<(usize, usize)> = map
            .iter()
            .map(|(k, v)| (*k, v.load(Ordering::SeqCst)))
            .collect();
        counts.sort_unstable();
        counts.into_iter().map(|(_, v)| v).collect()
    }
}

impl<S: Send + 'static> SessionProvider for FixtureProvider<S> {
    fn create_session(
        &self,
        browser: BrowserKind,
        settings: &Settings,
    ) -> VitrineResult<Box<dyn Session>> {
        let index = self.opened.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(%browser, index, "opening fixture session");
        let session = FixtureSession::open(
            self.site.clone(),
            (self.initial_state)(),
            settings.base_url(),
        );
        session.set_window_size(settings.window())?;
        if let Ok(mut map) = self.quits.lock() {
            map.insert(index, session.quit_counter());
        }
        Ok(Box::new(session))
    }

    fn name(&self) -> &str {
        "fixture"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::fixture::document::El;
    use std::time::Duration;

    fn login_site() -> FixtureSite<bool> {
        FixtureSite::new("https://shop.test")
            .page("/account/login", |_, _| {
                FixtureDocument::new("Login")
                    .with(
                        El::new("form")
                            .id("login-form")
                            .child(El::input("email").id("email"))
                            .child(El::div("error").id("error").hidden().text("Email required"))
                            .child(El::button("Sign in").id("submit")),
                    )
                    .on_click("submit", |doc, _, logged_in: &mut bool| {
                        if doc.value_of("email").is_empty() {
                            vec![Effect::Show("error".to_string())]
                        } else {
                            *logged_in = true;
                            vec![Effect::Navigate("/account".to_string())]
                        }
                    })
            })
            .page("/account", |_, logged_in| {
                FixtureDocument::new("Account")
                    .with(El::new("h1").id("greeting").text(if *logged_in { "Welcome" } else { "Anonymous" }))
            })
    }

    fn first(session: &dyn Session, selector: Selector) -> ElementRef {
        session.find_elements(&selector).unwrap().remove(0)
    }

    mod request_tests {
        use super::*;

        #[test]
        fn test_parse_relative_and_query() {
            let r = Request::parse("https://shop.test/", "/search?q=red+dress&page=2#top");
            assert_eq!(r.path, "/search");
            assert_eq!(r.param("q"), Some("red dress"));
            assert_eq!(r.param("page"), Some("2"));
            assert_eq!(r.url, "https://shop.test/search?q=red+dress&page=2#top");
        }

        #[test]
        fn test_parse_absolute_and_root() {
            let r = Request::parse("https://shop.test", "https://shop.test/");
            assert_eq!(r.path, "/");
            let r = Request::parse("https://shop.test", "https://shop.test");
            assert_eq!(r.path, "/");
            let r = Request::parse("https://shop.test", "account/login/");
            assert_eq!(r.path, "/account/login");
        }

        #[test]
        fn test_percent_round_trip() {
            let encoded = percent_encode("bags & shoes");
            assert_eq!(encoded, "bags+%26+shoes");
            assert_eq!(percent_decode(&encoded), "bags & shoes");
            assert_eq!(percent_decode("100%"), "100%");
        }
    }

    mod session_tests {
        use super::*;

        #[test]
        fn test_click_handler_navigates_and_mutates_state() {
            let session = FixtureSession::open(login_site(), false, "/account/login");
            let email = first(&session, Selector::id("email"));
            session.send_keys(&email, "a@b.c").unwrap();
            session.click(&first(&session, Selector::id("submit"))).unwrap();
            assert_eq!(session.current_url().unwrap(), "https://shop.test/account");
            assert_eq!(session.title().unwrap(), "Account");
            let greeting = first(&session, Selector::id("greeting"));
            assert_eq!(session.text(&greeting).unwrap(), "Welcome");
        }

        #[test]
        fn test_click_handler_shows_error() {
            let session = FixtureSession::open(login_site(), false, "/account/login");
            let error = first(&session, Selector::css(".error"));
            assert!(!session.element_state(&error).unwrap().is_visible());
            session.click(&first(&session, Selector::id("submit"))).unwrap();
            let state = session.element_state(&error).unwrap();
            assert!(state.is_visible());
            assert_eq!(session.text(&error).unwrap(), "Email required");
        }

        #[test]
        fn test_handles_go_stale_after_navigation() {
            let session = FixtureSession::open(login_site(), false, "/account/login");
            let email = first(&session, Selector::id("email"));
            session.navigate("/account").unwrap();
            let err = session.element_state(&email).unwrap_err();
            assert!(err.is_transient());
        }

        #[test]
        fn test_back_restores_previous_page() {
            let session = FixtureSession::open(login_site(), false, "/account/login");
            session.navigate("/account").unwrap();
            session.back().unwrap();
            assert!(session.current_url().unwrap().ends_with("/account/login"));
        }

        #[test]
        fn test_unknown_route_renders_404() {
            let session = FixtureSession::open(login_site(), false, "/nope");
            assert_eq!(session.title().unwrap(), "404 Not Found");
        }

        #[test]
        fn test_custom_not_found_page() {
            let site = login_site().not_found(|request, _| FixtureDocument::new(format!("Missing {}", request.path)));
            let session = FixtureSession::open(site, false, "/nope");
            assert_eq!(session.title().unwrap(), "Missing /nope");
            session.navigate("/account/login").unwrap();
            assert_ne!(session.title().unwrap(), "Missing /account/login");
        }

        #[test]
        fn test_hidden_element_not_clickable() {
            let session = FixtureSession::open(login_site(), false, "/account/login");
            let error = first(&session, Selector::id("error"));
            let err = session.click(&error).unwrap_err();
            assert!(matches!(err, VitrineError::NotInteractable { .. }));
        }

        #[test]
        fn test_resize_applies_breakpoints() {
            let session = FixtureSession::with_document(
                "https://shop.test/",
                FixtureDocument::new("Home")
                    .with(El::new("nav").min_width(768).child(El::link("/shop", "Shop").id("shop")))
                    .with(El::button("Menu").id("menu").max_width(767)),
            );
            assert_eq!(session.window_size().unwrap(), WindowSize::default());
            let shop = first(&session, Selector::id("shop"));
            let menu = first(&session, Selector::id("menu"));
            assert!(session.element_state(&shop).unwrap().is_visible());
            assert!(session.click(&menu).is_err());

            session.set_window_size(WindowSize { width: 375, height: 667 }).unwrap();
            assert_eq!(session.window_size().unwrap().width, 375);
            assert!(!session.element_state(&shop).unwrap().is_visible());
            assert_eq!(session.text(&shop).unwrap(), "");
            session.click(&menu).unwrap();
        }

        #[test]
        fn test_quit_closes_session() {
            let session = FixtureSession::open(login_site(), false, "/account/login");
            session.quit().unwrap();
            let err = session.current_url().unwrap_err();
            assert!(err.is_session_fatal());
            assert_eq!(session.quit_counter().load(Ordering::SeqCst), 1);
        }

        #[test]
        fn test_delayed_element_and_ready_state() {
            let doc = FixtureDocument::new("Slow")
                .loading_for(Duration::from_millis(80))
                .with(El::div("late").appears_after(Duration::from_millis(80)));
            let session = FixtureSession::with_document("https://shop.test/slow", doc);
            assert_eq!(session.ready_state().unwrap(), ReadyState::Loading);
            assert!(session.find_elements(&Selector::css(".late")).unwrap().is_empty());
            std::thread::sleep(Duration::from_millis(120));
            assert_eq!(session.ready_state().unwrap(), ReadyState::Complete);
            assert_eq!(session.find_elements(&Selector::css(".late")).unwrap().len(), 1);
        }

        #[test]
        fn test_checkbox_toggles() {
            let doc = FixtureDocument::new("Form").with(El::input("checkbox").id("remember"));
            let session = FixtureSession::with_document("https://shop.test/f", doc);
            let cb = first(&session, Selector::id("remember"));
            assert_eq!(session.attribute(&cb, "checked").unwrap(), None);
            session.click(&cb).unwrap();
            assert_eq!(session.attribute(&cb, "checked").unwrap().as_deref(), Some("true"));
        }

        #[test]
        fn test_select_option_by_text() {
            let doc = FixtureDocument::new("P").with(El::select(&["S", "M", "L"]).id("size"));
            let session = FixtureSession::with_document("https://shop.test/p", doc);
            let sel = first(&session, Selector::id("size"));
            session.select_option(&sel, "M").unwrap();
            assert_eq!(session.attribute(&sel, "value").unwrap().as_deref(), Some("M"));
            assert!(session.select_option(&sel, "XXL").unwrap_err().is_transient());
        }

        #[test]
        fn test_text_strategy_prefers_innermost() {
            let doc = FixtureDocument::new("T").with(El::div("wrap").child(El::link("/cart", "Cart")));
            let session = FixtureSession::with_document("https://shop.test/", doc);
            let found = session.find_elements(&Selector::text("Cart")).unwrap();
            assert_eq!(found.len(), 1);
            assert_eq!(session.attribute(&found[0], "href").unwrap().as_deref(), Some("/cart"));
        }

        #[test]
        fn test_find_within_scopes_to_descendants() {
            let doc = FixtureDocument::new("Grid")
                .with(El::div("card").child(El::div("title").text("Red Dress")))
                .with(El::div("card").child(El::div("title").text("Blue Heels")))
                .with(El::div("title").text("Outside"));
            let session = FixtureSession::with_document("https://shop.test/", doc);
            let cards = session.find_elements(&Selector::css(".card")).unwrap();
            let titles = session
                .find_elements_within(&cards[1], &Selector::css(".title"))
                .unwrap();
            assert_eq!(titles.len(), 1);
            assert_eq!(session.text(&titles[0]).unwrap(), "Blue Heels");
        }

        #[test]
        fn test_link_click_follows_href() {
            let doc = FixtureDocument::new("T").with(El::link("/cart", "Cart"));
            let session = FixtureSession::with_document("https://shop.test/", doc);
            session.click(&first(&session, Selector::text("Cart"))).unwrap();
            assert_eq!(session.current_url().unwrap(), "https://shop.test/cart");
        }

        #[test]
        fn test_screenshot_is_png() {
            let session = FixtureSession::with_document("https://shop.test/", FixtureDocument::new("x"));
            let png = session.screenshot().unwrap();
            assert_eq!(&png[..4], b"\x89PNG");
        }
    }

    mod provider_tests {
        use super::*;

        #[test]
        fn test_each_session_gets_fresh_state() {
            let provider = FixtureProvider::new(login_site(), || false);
            let settings = Settings::default().with_base_url("https://shop.test/account/login");
            let first_session = provider.create_session(BrowserKind::Chrome, &settings).unwrap();
            first_session.navigate("/account").unwrap();
            let second = provider.create_session(BrowserKind::Chrome, &settings).unwrap();
            assert!(second.current_url().unwrap().ends_with("/account/login"));
            first_session.quit().unwrap();
            second.quit().unwrap();
            assert_eq!(provider.opened(), 2);
            assert_eq!(provider.quit_counts(), vec![1, 1]);
        }

        #[test]
        fn test_sessions_start_at_configured_window() {
            let provider = FixtureProvider::new(login_site(), || false);
            let settings: Settings = serde_yaml_ng::from_str(
                "base_url: https://shop.test/account/login\nwindow:\n  width: 800\n  height: 600\n",
            )
            .unwrap();
            let session = provider.create_session(BrowserKind::Chrome, &settings).unwrap();
            assert_eq!(session.window_size().unwrap(), WindowSize { width: 800, height: 600 });
        }
    }
}
