//! In-memory `DocumentHost` implementation.
//!
//! # Responsibility
//! - Hold a node arena built from parsed HTML or constructed by callers.
//! - Serve id/selector lookups over connected elements in document order.
//! - Dispatch events to registered listeners on the calling thread.
//!
//! # Invariants
//! - Node ids are never reused; detached nodes stay in the arena.
//! - The document root has no parent and is never appended elsewhere.
//! - A dispatch runs every listener registered before it started, in
//!   registration order, unless one is removed mid-dispatch.

use crate::dom::html::{self, ParsedNode};
use crate::dom::{
    DocumentHost, DomError, DomResult, Event, EventKind, Listener, ListenerId, NodeId, Selector,
    SelectorSubject,
};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fmt::{Debug, Formatter};

static TAG_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9-]*$").expect("valid tag name regex"));

const ROOT: NodeId = NodeId(0);

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
enum NodeKind {
    Document,
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone)]
struct ElementData {
    tag: String,
    attributes: IndexMap<String, String>,
}

impl ElementData {
    fn classes(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .get("class")
            .map(String::as_str)
            .unwrap_or_default()
            .split_whitespace()
    }
}

impl SelectorSubject for ElementData {
    fn tag_name(&self) -> &str {
        &self.tag
    }

    fn element_id(&self) -> Option<&str> {
        self.attributes.get("id").map(String::as_str)
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes().any(|candidate| candidate == class)
    }
}

type ListenerEntry = (ListenerId, Listener<MemoryDocument>);

/// Listeners taken out of the map by one running dispatch.
#[derive(Debug, Default)]
struct DispatchFrame {
    running: HashSet<ListenerId>,
    removed: HashSet<ListenerId>,
}

/// Arena-backed HTML document.
pub struct MemoryDocument {
    nodes: Vec<NodeData>,
    listeners: HashMap<(NodeId, EventKind), Vec<ListenerEntry>>,
    next_listener: u64,
    /// One frame per dispatch on the call stack, innermost last.
    dispatching: Vec<DispatchFrame>,
}

impl Debug for MemoryDocument {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryDocument")
            .field("nodes", &self.nodes.len())
            .field(
                "listeners",
                &self.listeners.values().map(Vec::len).sum::<usize>(),
            )
            .finish()
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// Creates an empty `<html><head></head><body></body></html>` document.
    pub fn new() -> Self {
        let mut document = Self::empty();
        document.insert_parsed(
            ROOT,
            ParsedNode::Element {
                tag: "html".to_string(),
                attributes: Vec::new(),
                children: vec![
                    ParsedNode::Element {
                        tag: "head".to_string(),
                        attributes: Vec::new(),
                        children: Vec::new(),
                    },
                    ParsedNode::Element {
                        tag: "body".to_string(),
                        attributes: Vec::new(),
                        children: Vec::new(),
                    },
                ],
            },
        );
        document
    }

    /// Parses an HTML page. Malformed markup is recovered the way browsers do.
    pub fn parse(source: &str) -> Self {
        let mut document = Self::empty();
        document.insert_parsed(ROOT, html::parse_document(source));
        document
    }

    fn empty() -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
            listeners: HashMap::new(),
            next_listener: 0,
            dispatching: Vec::new(),
        }
    }

    /// The document node.
    pub fn root(&self) -> NodeId {
        ROOT
    }

    /// The `<html>` element.
    pub fn document_element(&self) -> Option<NodeId> {
        self.nodes[ROOT.0]
            .children
            .iter()
            .copied()
            .find(|id| self.element(*id).is_ok())
    }

    /// The `<body>` element, if present.
    pub fn body(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.element_children(html)
            .into_iter()
            .find(|id| self.tag_name(*id) == Some("body"))
    }

    /// Creates a detached text node.
    pub fn create_text_node(&mut self, text: impl Into<String>) -> NodeId {
        self.push_node(NodeKind::Text(text.into()))
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|data| data.parent)
    }

    /// All child nodes, including text.
    pub fn children(&self, node: NodeId) -> DomResult<&[NodeId]> {
        Ok(&self.node(node)?.children)
    }

    /// Element children only, in order. Empty for unknown nodes.
    pub fn element_children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(node.0)
            .map(|data| {
                data.children
                    .iter()
                    .copied()
                    .filter(|child| self.element(*child).is_ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).ok().map(|element| element.tag.as_str())
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)
            .ok()
            .and_then(|element| element.attributes.get(name))
            .map(String::as_str)
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> DomResult<()> {
        self.element_mut(node)?
            .attributes
            .insert(name.to_ascii_lowercase(), value.to_string());
        Ok(())
    }

    pub fn class_list(&self, node: NodeId) -> Vec<&str> {
        self.element(node)
            .map(|element| element.classes().collect())
            .unwrap_or_default()
    }

    /// Concatenated text of the node and all its descendants.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    /// Returns whether `node` is reachable from the document root.
    pub fn is_connected(&self, node: NodeId) -> bool {
        node == ROOT || self.ancestors(node).any(|ancestor| ancestor == ROOT)
    }

    /// Ancestors of `node`, nearest first.
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(node), move |current| self.parent(*current))
    }

    /// Every connected element matching `selector`, in document order.
    pub fn query_selector_all(&self, selector: &Selector) -> Vec<NodeId> {
        self.connected_elements()
            .filter(|id| self.matches(*id, selector))
            .collect()
    }

    /// Detaches `node` from its parent. Detached nodes are invisible to lookups.
    pub fn remove(&mut self, node: NodeId) -> DomResult<()> {
        self.node(node)?;
        if node == ROOT {
            return Err(DomError::Hierarchy {
                parent: ROOT,
                child: node,
                reason: "the document node cannot be removed",
            });
        }
        self.detach(node);
        Ok(())
    }

    /// Serialized children of `node`.
    pub fn inner_html(&self, node: NodeId) -> DomResult<String> {
        let data = self.node(node)?;
        let raw = self.is_raw_text_container(node);
        let mut out = String::new();
        for child in &data.children {
            self.write_node(*child, raw, &mut out);
        }
        Ok(out)
    }

    /// Serialized `node` including its own tag.
    pub fn outer_html(&self, node: NodeId) -> DomResult<String> {
        self.node(node)?;
        let raw = self
            .parent(node)
            .is_some_and(|parent| self.is_raw_text_container(parent));
        let mut out = String::new();
        self.write_node(node, raw, &mut out);
        Ok(out)
    }

    /// Serializes the connected document with an HTML5 doctype.
    pub fn to_html(&self) -> String {
        let mut out = String::from("<!DOCTYPE html>");
        self.write_node(ROOT, false, &mut out);
        out
    }

    /// Delivers one event to the listeners registered on `target`.
    ///
    /// Returns how many listeners ran. Listeners registered while the
    /// dispatch is running are kept for later dispatches but not invoked;
    /// listeners removed before their turn are skipped.
    ///
    /// # Errors
    /// - `UnknownNode` / `NotAnElement` when `target` is not an element.
    pub fn dispatch(&mut self, target: NodeId, kind: EventKind) -> DomResult<usize> {
        self.element(target)?;
        let key = (target, kind);
        let Some(mut running) = self.listeners.remove(&key) else {
            return Ok(0);
        };

        self.dispatching.push(DispatchFrame {
            running: running.iter().map(|(id, _)| *id).collect(),
            removed: HashSet::new(),
        });
        let event = Event { kind, target };
        let mut invoked = 0;
        for (id, listener) in running.iter_mut() {
            if self.removed_while_dispatching(*id) {
                continue;
            }
            listener(self, &event);
            invoked += 1;
        }

        // Nested dispatches pop their own frames before returning.
        let frame = self.dispatching.pop().unwrap_or_default();
        running.retain(|(id, _)| !frame.removed.contains(id));

        if let Some(added) = self.listeners.remove(&key) {
            running.extend(added);
        }
        if !running.is_empty() {
            self.listeners.insert(key, running);
        }
        Ok(invoked)
    }

    fn removed_while_dispatching(&self, listener: ListenerId) -> bool {
        self.dispatching
            .last()
            .is_some_and(|frame| frame.removed.contains(&listener))
    }

    /// Shorthand for `dispatch(target, EventKind::Click)`.
    pub fn click(&mut self, target: NodeId) -> DomResult<usize> {
        self.dispatch(target, EventKind::Click)
    }

    /// Number of listeners currently registered on `target` for `kind`.
    pub fn listener_count(&self, target: NodeId, kind: EventKind) -> usize {
        self.listeners.get(&(target, kind)).map_or(0, Vec::len)
    }

    fn node(&self, node: NodeId) -> DomResult<&NodeData> {
        self.nodes.get(node.0).ok_or(DomError::UnknownNode(node))
    }

    fn element(&self, node: NodeId) -> DomResult<&ElementData> {
        match &self.node(node)?.kind {
            NodeKind::Element(element) => Ok(element),
            _ => Err(DomError::NotAnElement(node)),
        }
    }

    fn element_mut(&mut self, node: NodeId) -> DomResult<&mut ElementData> {
        match self.nodes.get_mut(node.0).map(|data| &mut data.kind) {
            Some(NodeKind::Element(element)) => Ok(element),
            Some(_) => Err(DomError::NotAnElement(node)),
            None => Err(DomError::UnknownNode(node)),
        }
    }

    fn push_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn insert_parsed(&mut self, parent: NodeId, parsed: ParsedNode) -> NodeId {
        let (id, children) = match parsed {
            ParsedNode::Text(text) => (self.push_node(NodeKind::Text(text)), Vec::new()),
            ParsedNode::Element {
                tag,
                attributes,
                children,
            } => {
                let element = ElementData {
                    tag,
                    attributes: attributes.into_iter().collect(),
                };
                (self.push_node(NodeKind::Element(element)), children)
            }
        };
        self.link(parent, id);
        for child in children {
            self.insert_parsed(id, child);
        }
        id
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|child| *child != node);
        }
    }

    fn connected_elements(&self) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack = vec![ROOT];
        std::iter::from_fn(move || {
            while let Some(current) = stack.pop() {
                let data = &self.nodes[current.0];
                stack.extend(data.children.iter().rev().copied());
                if matches!(data.kind, NodeKind::Element(_)) {
                    return Some(current);
                }
            }
            None
        })
    }

    fn matches(&self, node: NodeId, selector: &Selector) -> bool {
        let Ok(element) = self.element(node) else {
            return false;
        };
        let ancestors = self
            .ancestors(node)
            .filter_map(|ancestor| self.element(ancestor).ok());
        selector.matches(element, ancestors)
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        let Some(data) = self.nodes.get(node.0) else {
            return;
        };
        if let NodeKind::Text(text) = &data.kind {
            out.push_str(text);
        }
        for child in &data.children {
            self.collect_text(*child, out);
        }
    }

    fn is_raw_text_container(&self, node: NodeId) -> bool {
        self.tag_name(node).is_some_and(html::is_raw_text)
    }

    fn write_node(&self, node: NodeId, raw_text: bool, out: &mut String) {
        let data = &self.nodes[node.0];
        match &data.kind {
            NodeKind::Document => {
                for child in &data.children {
                    self.write_node(*child, false, out);
                }
            }
            NodeKind::Text(text) if raw_text => out.push_str(text),
            NodeKind::Text(text) => html::escape_text(text, out),
            NodeKind::Element(element) => {
                out.push('<');
                out.push_str(&element.tag);
                for (name, value) in &element.attributes {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    html::escape_attribute(value, out);
                    out.push('"');
                }
                out.push('>');
                if html::is_void(&element.tag) {
                    return;
                }
                let raw = html::is_raw_text(&element.tag);
                for child in &data.children {
                    self.write_node(*child, raw, out);
                }
                out.push_str("</");
                out.push_str(&element.tag);
                out.push('>');
            }
        }
    }
}

impl DocumentHost for MemoryDocument {
    fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.connected_elements().find(|node| {
            self.element(*node)
                .is_ok_and(|element| element.element_id() == Some(id))
        })
    }

    fn query_selector(&self, selector: &Selector) -> Option<NodeId> {
        self.connected_elements()
            .find(|node| self.matches(*node, selector))
    }

    fn create_element(&mut self, tag: &str) -> DomResult<NodeId> {
        if !TAG_NAME_RE.is_match(tag) {
            return Err(DomError::InvalidTagName(tag.to_string()));
        }
        Ok(self.push_node(NodeKind::Element(ElementData {
            tag: tag.to_ascii_lowercase(),
            attributes: IndexMap::new(),
        })))
    }

    fn add_class(&mut self, element: NodeId, class: &str) -> DomResult<()> {
        if class.is_empty() || class.chars().any(char::is_whitespace) {
            return Err(DomError::InvalidClassName(class.to_string()));
        }
        let data = self.element_mut(element)?;
        if data.has_class(class) {
            return Ok(());
        }
        let updated = match data.attributes.get("class").map(|value| value.trim()) {
            Some(existing) if !existing.is_empty() => format!("{existing} {class}"),
            _ => class.to_string(),
        };
        data.attributes.insert("class".to_string(), updated);
        Ok(())
    }

    fn set_inner_html(&mut self, element: NodeId, markup: &str) -> DomResult<()> {
        self.element(element)?;
        let previous = std::mem::take(&mut self.nodes[element.0].children);
        for child in previous {
            self.nodes[child.0].parent = None;
        }
        for parsed in html::parse_fragment(markup) {
            self.insert_parsed(element, parsed);
        }
        Ok(())
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        let parent_data = self.node(parent)?;
        if matches!(parent_data.kind, NodeKind::Text(_)) {
            return Err(DomError::Hierarchy {
                parent,
                child,
                reason: "text nodes cannot have children",
            });
        }
        let child_data = self.node(child)?;
        if matches!(child_data.kind, NodeKind::Document) {
            return Err(DomError::Hierarchy {
                parent,
                child,
                reason: "the document node cannot be appended",
            });
        }
        if child == parent || self.ancestors(parent).any(|ancestor| ancestor == child) {
            return Err(DomError::Hierarchy {
                parent,
                child,
                reason: "a node cannot be appended inside itself",
            });
        }

        self.detach(child);
        self.link(parent, child);
        Ok(())
    }

    fn add_event_listener(
        &mut self,
        target: NodeId,
        kind: EventKind,
        listener: Listener<Self>,
    ) -> DomResult<ListenerId> {
        self.element(target)?;
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners
            .entry((target, kind))
            .or_default()
            .push((id, listener));
        Ok(id)
    }

    fn remove_event_listener(&mut self, listener: ListenerId) -> DomResult<()> {
        if let Some(frame) = self
            .dispatching
            .iter_mut()
            .find(|frame| frame.running.contains(&listener))
        {
            frame.removed.insert(listener);
            return Ok(());
        }

        let key = self
            .listeners
            .iter()
            .find(|(_, entries)| entries.iter().any(|(id, _)| *id == listener))
            .map(|(key, _)| *key)
            .ok_or(DomError::UnknownListener(listener))?;

        if let Some(entries) = self.listeners.get_mut(&key) {
            entries.retain(|(id, _)| *id != listener);
            if entries.is_empty() {
                self.listeners.remove(&key);
            }
        }
        Ok(())
    }
}
