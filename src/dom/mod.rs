//! Arena-backed document model.
//!
//! The live page and every fetched fragment share one arena: fragment nodes
//! are simply created detached and become live once inserted. Removing a node
//! only unlinks it from its parent, so callers may keep a `NodeId` around and
//! re-attach it later (the SEO `<link>` nodes rely on this).
//!
//! # Module Structure
//!
//! ```text
//! dom/
//! ├── mod.rs       # Document, NodeId, tree mutation and queries (this file)
//! ├── selector.rs  # CSS selector parsing and matching
//! ├── parse.rs     # markup -> nodes (tl)
//! ├── markup.rs    # nodes -> markup, entity escaping
//! └── style.rs     # inline `style` declarations
//! ```

pub mod markup;
mod parse;
pub mod selector;
mod style;

pub use selector::Selector;

use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Errors raised by the document model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("unsupported selector `{0}`")]
    Selector(String),

    #[error("markup could not be parsed: {0}")]
    Parse(String),

    #[error("node has no parent to insert next to")]
    Detached,
}

// ============================================================================
// Nodes
// ============================================================================

/// Handle to a node inside a [`Document`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Node payload.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Document,
    Element(Element),
    Text(String),
    Comment(String),
}

/// An element: lowercase tag name plus ordered attributes.
#[derive(Debug, Clone)]
pub struct Element {
    tag: String,
    attrs: SmallVec<[(String, String); 4]>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: SmallVec::new(),
        }
    }

    #[inline]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn set_attr(&mut self, name: &str, value: &str) {
        match self.attrs.iter_mut().find(|(key, _)| key == name) {
            Some(slot) => slot.1 = value.to_string(),
            None => self.attrs.push((name.to_string(), value.to_string())),
        }
    }

    fn remove_attr(&mut self, name: &str) -> bool {
        let before = self.attrs.len();
        self.attrs.retain(|(key, _)| key != name);
        before != self.attrs.len()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|list| list.split_ascii_whitespace().any(|c| c == class))
    }
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

// ============================================================================
// Document
// ============================================================================

/// A mutable HTML document.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document (root node only).
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Document,
            }],
            root: NodeId(0),
        }
    }

    /// Parse a full page.
    pub fn parse(html: &str) -> Result<Self, DomError> {
        let mut doc = Self::new();
        let root = doc.root;
        for node in parse::parse_nodes(&mut doc, html)? {
            doc.append_child(root, node);
        }
        Ok(doc)
    }

    /// Parse markup into detached nodes owned by this document.
    pub fn parse_fragment(&mut self, html: &str) -> Result<Vec<NodeId>, DomError> {
        parse::parse_nodes(self, html)
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            kind,
        });
        id
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element(Element::new(tag)))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    pub(crate) fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Comment(text.to_string()))
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    #[inline]
    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(Element::tag)
    }

    // ------------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------------

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.attr(name))
    }

    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    /// Set an attribute. No-op on non-element nodes.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(element) = self.element_mut(id) {
            element.set_attr(&name.to_ascii_lowercase(), value);
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> bool {
        self.element_mut(id)
            .is_some_and(|element| element.remove_attr(name))
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id).is_some_and(|e| e.has_class(class))
    }

    /// Form control value (the `value` attribute).
    pub fn value(&self, id: NodeId) -> Option<&str> {
        self.attr(id, "value")
    }

    pub fn set_value(&mut self, id: NodeId, value: &str) {
        self.set_attr(id, "value", value);
    }

    pub fn is_disabled(&self, id: NodeId) -> bool {
        self.has_attr(id, "disabled")
    }

    pub fn set_disabled(&mut self, id: NodeId, disabled: bool) {
        if disabled {
            self.set_attr(id, "disabled", "disabled");
        } else {
            self.remove_attr(id, "disabled");
        }
    }

    // ------------------------------------------------------------------------
    // Tree navigation
    // ------------------------------------------------------------------------

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    #[inline]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|child| self.is_element(*child))
    }

    pub(crate) fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|n| *n == id)?;
        siblings[..pos]
            .iter()
            .rev()
            .copied()
            .find(|n| self.is_element(*n))
    }

    pub(crate) fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|n| *n == id)?;
        siblings[pos + 1..]
            .iter()
            .copied()
            .find(|n| self.is_element(*n))
    }

    /// Whether the node is reachable from the document root.
    pub fn is_connected(&self, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(node) = cursor {
            if node == self.root {
                return true;
            }
            cursor = self.parent(node);
        }
        false
    }

    /// Whether `node` is `ancestor` or lies below it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// All nodes below `id` in document order (excluding `id`).
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// Concatenated text of the node and its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let NodeKind::Text(text) = self.kind(id) {
            out.push_str(text);
        }
        for node in self.descendants(id) {
            if let NodeKind::Text(text) = self.kind(node) {
                out.push_str(text);
            }
        }
        out
    }

    /// Replace all children with a single text node.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) {
        for child in self.children(id).to_vec() {
            self.detach(child);
        }
        if !text.is_empty() {
            let node = self.create_text(text);
            self.append_child(id, node);
        }
    }

    // ------------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------------

    /// Append `child` as last child of `parent`, moving it if attached elsewhere.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Insert `nodes` (in order) directly after `reference`.
    pub fn insert_after(&mut self, reference: NodeId, nodes: &[NodeId]) -> Result<(), DomError> {
        let parent = self.parent(reference).ok_or(DomError::Detached)?;
        for node in nodes {
            self.detach(*node);
        }
        let pos = self.nodes[parent.0]
            .children
            .iter()
            .position(|n| *n == reference)
            .ok_or(DomError::Detached)?;
        for (offset, node) in nodes.iter().enumerate() {
            self.nodes[node.0].parent = Some(parent);
            self.nodes[parent.0].children.insert(pos + 1 + offset, *node);
        }
        Ok(())
    }

    /// Unlink a node from its parent. The node (and its subtree) stays valid.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|n| *n != id);
        }
    }

    /// Detach `id` and release its subtree. Returns the released nodes, `id` first.
    ///
    /// Slots are never reused: released handles read as empty, disconnected
    /// comments.
    pub fn remove(&mut self, id: NodeId) -> Vec<NodeId> {
        self.detach(id);
        let mut released = vec![id];
        released.extend(self.descendants(id));
        for node in &released {
            let slot = &mut self.nodes[node.0];
            slot.parent = None;
            slot.children = Vec::new();
            slot.kind = NodeKind::Comment(String::new());
        }
        released
    }

    // ------------------------------------------------------------------------
    // Selector queries
    // ------------------------------------------------------------------------

    /// Whether an element matches the selector.
    pub fn matches(&self, id: NodeId, selector: &Selector) -> bool {
        selector.matches(self, id)
    }

    /// All connected elements matching the selector, in document order.
    pub fn query_selector_all(&self, selector: &Selector) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|node| selector.matches(self, *node))
            .collect()
    }

    /// First connected element matching the selector.
    pub fn query_selector(&self, selector: &Selector) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|node| selector.matches(self, *node))
    }

    /// Nearest inclusive ancestor matching the selector.
    pub fn closest(&self, id: NodeId, selector: &Selector) -> Option<NodeId> {
        let mut cursor = Some(id);
        while let Some(node) = cursor {
            if selector.matches(self, node) {
                return Some(node);
            }
            cursor = self.parent(node);
        }
        None
    }

    /// Descendants of any of `roots` matching the selector (roots excluded).
    pub fn find(&self, roots: &[NodeId], selector: &Selector) -> Vec<NodeId> {
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        for root in roots {
            for node in self.descendants(*root) {
                if selector.matches(self, node) && seen.insert(node) {
                    out.push(node);
                }
            }
        }
        out
    }

    /// Subset of `nodes` matching the selector.
    pub fn filter(&self, nodes: &[NodeId], selector: &Selector) -> Vec<NodeId> {
        nodes
            .iter()
            .copied()
            .filter(|node| selector.matches(self, *node))
            .collect()
    }

    /// Drop nodes that are contained in another node of the same set.
    pub fn outermost(&self, nodes: &[NodeId]) -> Vec<NodeId> {
        nodes
            .iter()
            .copied()
            .filter(|node| {
                !nodes
                    .iter()
                    .any(|other| other != node && self.contains(*other, *node))
            })
            .collect()
    }

    // ------------------------------------------------------------------------
    // Well-known elements
    // ------------------------------------------------------------------------

    fn first_by_tag(&self, tag: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|node| self.tag(*node) == Some(tag))
    }

    pub fn head(&self) -> Option<NodeId> {
        self.first_by_tag("head")
    }

    pub fn body(&self) -> Option<NodeId> {
        self.first_by_tag("body")
    }

    /// `<head>`, created under `<html>` (or the root) when missing.
    pub fn ensure_head(&mut self) -> NodeId {
        if let Some(head) = self.head() {
            return head;
        }
        let parent = self.first_by_tag("html").unwrap_or(self.root);
        let head = self.create_element("head");
        self.nodes[head.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(0, head);
        head
    }

    /// `<body>`, created when missing.
    pub fn ensure_body(&mut self) -> NodeId {
        if let Some(body) = self.body() {
            return body;
        }
        let parent = self.first_by_tag("html").unwrap_or(self.root);
        let body = self.create_element("body");
        self.append_child(parent, body);
        body
    }

    /// `document.title`
    pub fn title(&self) -> String {
        self.first_by_tag("title")
            .map(|node| self.text_content(node).trim().to_string())
            .unwrap_or_default()
    }

    pub fn set_title(&mut self, title: &str) {
        let node = match self.first_by_tag("title") {
            Some(node) => node,
            None => {
                let head = self.ensure_head();
                let node = self.create_element("title");
                self.append_child(head, node);
                node
            }
        };
        self.set_text_content(node, title);
    }
}

// ============================================================================
// Tests
// ============================================================================
