//! In-memory document tree with a declarative builder.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Default rendered size of a fixture element
pub const DEFAULT_ELEMENT_SIZE: (u32, u32) = (120, 24);

/// Index of a node inside a [`FixtureDocument`]
pub type NodeId = usize;

/// Declarative element description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct El {
    tag: String,
    attrs: BTreeMap<String, String>,
    text: String,
    displayed: bool,
    enabled: bool,
    size: (u32, u32),
    present_from: Option<Duration>,
    present_until: Option<Duration>,
    children: Vec<El>,
}

impl El {
    /// New element with the given tag
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attrs: BTreeMap::new(),
            text: String::new(),
            displayed: true,
            enabled: true,
            size: DEFAULT_ELEMENT_SIZE,
            present_from: None,
            present_until: None,
            children: Vec::new(),
        }
    }

    /// `<div class="...">`
    #[must_use]
    pub fn div(class: &str) -> Self {
        Self::new("div").class(class)
    }

    /// `<a href="...">text</a>`
    #[must_use]
    pub fn link(href: &str, text: &str) -> Self {
        Self::new("a").attr("href", href).text(text)
    }

    /// `<button>text</button>`
    #[must_use]
    pub fn button(text: &str) -> Self {
        Self::new("button").text(text)
    }

    /// `<input type="...">`
    #[must_use]
    pub fn input(input_type: &str) -> Self {
        Self::new("input").attr("type", input_type)
    }

    /// `<select>` with one option per label
    #[must_use]
    pub fn select(options: &[&str]) -> Self {
        options.iter().fold(Self::new("select"), |sel, label| {
            sel.child(Self::new("option").attr("value", label).text(label))
        })
    }

    /// Set the id attribute
    #[must_use]
    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    /// Add a class (space separated classes allowed)
    #[must_use]
    pub fn class(mut self, class: &str) -> Self {
        let merged = match self.attrs.get("class") {
            Some(existing) if !existing.is_empty() => format!("{existing} {class}"),
            _ => class.to_string(),
        };
        self.attrs.insert("class".to_string(), merged);
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    /// Set own text
    #[must_use]
    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    /// Render as `display: none`
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    /// Mark as disabled
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Only rendered when the viewport is at least `px` wide
    #[must_use]
    pub fn min_width(self, px: u32) -> Self {
        self.attr("data-min-width", &px.to_string())
    }

    /// Only rendered when the viewport is at most `px` wide
    #[must_use]
    pub fn max_width(self, px: u32) -> Self {
        self.attr("data-max-width", &px.to_string())
    }

    /// Override the rendered size
    #[must_use]
    pub const fn size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    /// Not in the DOM until `delay` after the page loads
    #[must_use]
    pub const fn appears_after(mut self, delay: Duration) -> Self {
        self.present_from = Some(delay);
        self
    }

    /// Removed from the DOM `delay` after the page loads
    #[must_use]
    pub const fn disappears_after(mut self, delay: Duration) -> Self {
        self.present_until = Some(delay);
        self
    }

    /// Append a child
    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Append several children
    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children.extend(children);
        self
    }
}

/// A node in the arena
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) tag: String,
    pub(crate) attrs: BTreeMap<String, String>,
    pub(crate) text: String,
    pub(crate) displayed: bool,
    pub(crate) enabled: bool,
    pub(crate) size: (u32, u32),
    pub(crate) present_from: Option<Duration>,
    pub(crate) present_until: Option<Duration>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) removed: bool,
}

impl Node {
    /// Tag name, lowercase
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Attribute value
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Whitespace-separated classes
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or_default().split_whitespace()
    }

    /// Whether the node has a class
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }
}

/// Effects a handler applies to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Load another URL (absolute, or a path on the same origin)
    Navigate(String),
    /// Re-render the current URL from site state
    Reload,
    /// Make the element with this id displayed
    Show(String),
    /// Hide the element with this id
    Hide(String),
    /// Replace the own text of the element with this id
    SetText(String, String),
    /// Replace the value of the input with this id
    SetValue(String, String),
    /// Append a new element under the element with this id
    Append(String, El),
    /// Remove the element with this id
    Remove(String),
}

/// Callback fired on click or on Enter
pub type Handler<S> =
    Arc<dyn Fn(&FixtureDocument<S>, NodeId, &mut S) -> Vec<Effect> + Send + Sync>;

/// An in-memory page: title, node arena and event handlers
pub struct FixtureDocument<S = ()> {
    title: String,
    nodes: Vec<Node>,
    loading_for: Duration,
    on_click: HashMap<String, Handler<S>>,
    on_enter: HashMap<String, Handler<S>>,
}

impl<S> Clone for FixtureDocument<S> {
    fn clone(&self) -> Self {
        Self {
            title: self.title.clone(),
            nodes: self.nodes.clone(),
            loading_for: self.loading_for,
            on_click: self.on_click.clone(),
            on_enter: self.on_enter.clone(),
        }
    }
}

impl<S> fmt::Debug for FixtureDocument<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixtureDocument")
            .field("title", &self.title)
            .field("nodes", &self.nodes.len())
            .field("on_click", &self.on_click.keys().collect::<Vec<_>>())
            .field("on_enter", &self.on_enter.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Root `<html>` node
pub const ROOT: NodeId = 0;
/// `<body>` node
pub const BODY: NodeId = 1;

impl<S> FixtureDocument<S> {
    /// Empty document with `<html><body>`
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        let mut doc = Self {
            title: title.into(),
            nodes: Vec::new(),
            loading_for: Duration::ZERO,
            on_click: HashMap::new(),
            on_enter: HashMap::new(),
        };
        let html = doc.push_node(None, &El::new("html"));
        doc.push_node(Some(html), &El::new("body"));
        doc
    }

    /// Append an element tree to `<body>`
    #[must_use]
    pub fn with(mut self, element: El) -> Self {
        self.append(BODY, &element);
        self
    }

    /// Report `readyState = loading` for this long after each load
    #[must_use]
    pub const fn loading_for(mut self, duration: Duration) -> Self {
        self.loading_for = duration;
        self
    }

    /// Register a click handler, keyed by element id or `data-action`
    #[must_use]
    pub fn on_click(
        mut self,
        key: &str,
        handler: impl Fn(&Self, NodeId, &mut S) -> Vec<Effect> + Send + Sync + 'static,
    ) -> Self {
        self.on_click.insert(key.to_string(), Arc::new(handler));
        self
    }

    /// Register an Enter-key handler, keyed by input id or `data-action`
    #[must_use]
    pub fn on_enter(
        mut self,
        key: &str,
        handler: impl Fn(&Self, NodeId, &mut S) -> Vec<Effect> + Send + Sync + 'static,
    ) -> Self {
        self.on_enter.insert(key.to_string(), Arc::new(handler));
        self
    }

    /// Document title
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// How long the document reports `loading`
    #[must_use]
    pub const fn loading_duration(&self) -> Duration {
        self.loading_for
    }

    /// Node by id
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id).filter(|n| !n.removed)
    }

    /// Number of nodes ever allocated
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when only the skeleton exists
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 2
    }

    /// First live node with the given id attribute
    #[must_use]
    pub fn by_id(&self, id: &str) -> Option<NodeId> {
        (0..self.nodes.len()).find(|&n| self.node(n).is_some_and(|node| node.attr("id") == Some(id)))
    }

    /// Current value of the input with this id
    #[must_use]
    pub fn value_of(&self, id: &str) -> String {
        self.by_id(id)
            .and_then(|n| self.node(n))
            .and_then(|n| n.attr("value"))
            .unwrap_or_default()
            .to_string()
    }

    /// Whether the checkbox with this id is checked
    #[must_use]
    pub fn is_checked(&self, id: &str) -> bool {
        self.by_id(id)
            .and_then(|n| self.node(n))
            .is_some_and(|n| n.attr("checked").is_some())
    }

    /// Attribute of a node
    #[must_use]
    pub fn attr_of(&self, node: NodeId, name: &str) -> Option<String> {
        self.node(node).and_then(|n| n.attr(name)).map(str::to_string)
    }

    /// Nearest ancestor-or-self carrying the attribute
    #[must_use]
    pub fn closest_attr(&self, node: NodeId, name: &str) -> Option<String> {
        let mut current = Some(node);
        while let Some(id) = current {
            let n = self.node(id)?;
            if let Some(v) = n.attr(name) {
                return Some(v.to_string());
            }
            current = n.parent;
        }
        None
    }

    /// Concatenated text of the node and its live descendants
    #[must_use]
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        if let Some(n) = self.node(node) {
            if !n.text.is_empty() {
                if !out.is_empty() && !out.ends_with(' ') {
                    out.push(' ');
                }
                out.push_str(&n.text);
            }
            for &child in &n.children {
                self.collect_text(child, out);
            }
        }
    }

    /// Live children of a node
    #[must_use]
    pub fn children_of(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node)
            .map(|n| {
                n.children
                    .iter()
                    .copied()
                    .filter(|&c| self.node(c).is_some())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Parent of a node
    #[must_use]
    pub fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).and_then(|n| n.parent)
    }

    /// Live nodes in document order, excluding the skeleton
    #[must_use]
    pub fn elements(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.walk(ROOT, &mut out);
        out.retain(|&n| n != ROOT && n != BODY);
        out
    }

    fn walk(&self, node: NodeId, out: &mut Vec<NodeId>) {
        if self.node(node).is_some() {
            out.push(node);
            for child in self.children_of(node) {
                self.walk(child, out);
            }
        }
    }

    /// Whether a node is in the DOM at `elapsed` after load
    #[must_use]
    pub fn is_present_at(&self, node: NodeId, elapsed: Duration) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            let Some(n) = self.node(id) else {
                return false;
            };
            if n.present_from.is_some_and(|from| elapsed < from)
                || n.present_until.is_some_and(|until| elapsed >= until)
            {
                return false;
            }
            current = n.parent;
        }
        true
    }

    /// Whether a node and all its ancestors are displayed
    #[must_use]
    pub fn is_displayed(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            match self.node(id) {
                Some(n) if n.displayed => current = n.parent,
                _ => return false,
            }
        }
        true
    }

    /// [`is_displayed`](Self::is_displayed) under a viewport `width` pixels
    /// wide, honouring `data-min-width` / `data-max-width` breakpoints
    #[must_use]
    pub fn is_displayed_at(&self, node: NodeId, width: u32) -> bool {
        if !self.is_displayed(node) {
            return false;
        }
        let bound = |n: &Node, name: &str| n.attr(name).and_then(|v| v.parse::<u32>().ok());
        let mut current = Some(node);
        while let Some(id) = current {
            let Some(n) = self.node(id) else {
                return false;
            };
            if bound(n, "data-min-width").is_some_and(|min| width < min)
                || bound(n, "data-max-width").is_some_and(|max| width > max)
            {
                return false;
            }
            current = n.parent;
        }
        true
    }

    pub(crate) fn handler_for_click(&self, node: NodeId) -> Option<Handler<S>> {
        self.handler_in(&self.on_click, node)
    }

    pub(crate) fn handler_for_enter(&self, node: NodeId) -> Option<Handler<S>> {
        self.handler_in(&self.on_enter, node)
    }

    fn handler_in(&self, map: &HashMap<String, Handler<S>>, node: NodeId) -> Option<Handler<S>> {
        let n = self.node(node)?;
        ["id", "data-action"]
            .iter()
            .filter_map(|attr| n.attr(attr))
            .find_map(|key| map.get(key).cloned())
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id).filter(|n| !n.removed)
    }

    /// Append an element tree under `parent`, returning the new node id
    pub fn append(&mut self, parent: NodeId, element: &El) -> NodeId {
        let id = self.push_node(Some(parent), element);
        for child in &element.children {
            self.append(id, child);
        }
        id
    }

    /// Mark a node and its subtree removed
    pub fn remove(&mut self, node: NodeId) {
        for child in self.children_of(node) {
            self.remove(child);
        }
        if let Some(n) = self.nodes.get_mut(node) {
            n.removed = true;
        }
    }

    fn push_node(&mut self, parent: Option<NodeId>, element: &El) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            tag: element.tag.clone(),
            attrs: element.attrs.clone(),
            text: element.text.clone(),
            displayed: element.displayed,
            enabled: element.enabled,
            size: element.size,
            present_from: element.present_from,
            present_until: element.present_until,
            parent,
            children: Vec::new(),
            removed: false,
        });
        if let Some(p) = parent {
            if let Some(parent_node) = self.nodes.get_mut(p) {
                parent_node.children.push(id);
            }
        }
        id
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn sample() -> FixtureDocument {
        FixtureDocument::new("Sample").with(
            El::div("cart")
                .id("cart")
                .child(El::div("cart-item").child(El::new("span").class("name").text("Red Dress")))
                .child(El::div("cart-item").hidden().text("Shoes")),
        )
    }

    #[test]
    fn test_builder_classes_merge() {
        let el = El::div("a").class("b");
        let doc = FixtureDocument::<()>::new("t").with(el);
        let node = doc.node(doc.elements()[0]).unwrap();
        assert!(node.has_class("a"));
        assert!(node.has_class("b"));
    }

    #[test]
    fn test_text_content_joins_descendants() {
        let doc = sample();
        let cart = doc.by_id("cart").unwrap();
        assert_eq!(doc.text_content(cart), "Red Dress Shoes");
    }

    #[test]
    fn test_displayed_inherits_from_ancestors() {
        let doc = FixtureDocument::<()>::new("t")
            .with(El::div("outer").hidden().child(El::new("span").id("inner")));
        let inner = doc.by_id("inner").unwrap();
        assert!(!doc.is_displayed(inner));
    }

    #[test]
    fn test_breakpoints_follow_viewport_width() {
        let doc = FixtureDocument::<()>::new("t")
            .with(El::new("nav").min_width(768).child(El::link("/shop", "Shop").id("desktop")))
            .with(El::button("Menu").id("toggle").max_width(767));
        let desktop = doc.by_id("desktop").unwrap();
        let toggle = doc.by_id("toggle").unwrap();
        assert!(doc.is_displayed_at(desktop, 1024));
        assert!(!doc.is_displayed_at(toggle, 1024));
        assert!(!doc.is_displayed_at(desktop, 375));
        assert!(doc.is_displayed_at(toggle, 375));
        assert!(doc.is_displayed(desktop));
    }

    #[test]
    fn test_remove_subtree() {
        let mut doc = sample();
        let cart = doc.by_id("cart").unwrap();
        doc.remove(cart);
        assert!(doc.by_id("cart").is_none());
        assert!(doc.elements().is_empty());
    }

    #[test]
    fn test_presence_window() {
        let doc = FixtureDocument::<()>::new("t").with(
            El::div("late")
                .id("late")
                .appears_after(Duration::from_millis(100)),
        );
        let late = doc.by_id("late").unwrap();
        assert!(!doc.is_present_at(late, Duration::from_millis(50)));
        assert!(doc.is_present_at(late, Duration::from_millis(150)));
    }

    #[test]
    fn test_select_builder() {
        let doc = FixtureDocument::<()>::new("t").with(El::select(&["S", "M"]).id("size"));
        let sel = doc.by_id("size").unwrap();
        assert_eq!(doc.children_of(sel).len(), 2);
    }

    #[test]
    fn test_closest_attr() {
        let doc = FixtureDocument::<()>::new("t").with(
            El::div("item")
                .attr("data-index", "3")
                .child(El::button("Remove").id("btn")),
        );
        let btn = doc.by_id("btn").unwrap();
        assert_eq!(doc.closest_attr(btn, "data-index").as_deref(), Some("3"));
    }
}
