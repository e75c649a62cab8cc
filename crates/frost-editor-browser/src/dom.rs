//! `DomNode` over the live browser DOM.
//!
//! Offsets are UTF-16 code units, the unit `Selection`, `Range` and
//! `Text.splitText` all use.

use std::fmt;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CharacterData, Document, Element, Node, Text};

use frost_editor_core::{DomNode, NodeKind};

/// Handle to a browser DOM node.
///
/// Carries the owning document so text and elements can be created next to
/// any node. Equality is node identity.
#[derive(Clone)]
pub struct BrowserNode {
    node: Node,
    doc: Document,
}

impl BrowserNode {
    /// Wrap `node`. Returns `None` for nodes without a document, which only
    /// happens for a `Document` that is not one of ours.
    pub fn new(node: Node) -> Option<Self> {
        let doc = match node.owner_document() {
            Some(doc) => doc,
            None => node.clone().dyn_into::<Document>().ok()?,
        };
        Some(Self { node, doc })
    }

    pub fn with_document(node: Node, doc: Document) -> Self {
        Self { node, doc }
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn as_element(&self) -> Option<&Element> {
        self.node.dyn_ref::<Element>()
    }

    pub fn into_node(self) -> Node {
        self.node
    }

    fn wrap(&self, node: Node) -> Self {
        Self {
            node,
            doc: self.doc.clone(),
        }
    }
}

impl PartialEq for BrowserNode {
    fn eq(&self, other: &Self) -> bool {
        self.node.is_same_node(Some(&other.node))
    }
}

impl fmt::Debug for BrowserNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag_name() {
            Some(tag) => write!(f, "<{tag}>"),
            None => write!(f, "{:?}", self.node.node_name()),
        }
    }
}

/// Log a failed DOM call. The trait surface is infallible, and these calls
/// only fail on hierarchy or name errors the callers already rule out.
fn check<T>(op: &'static str, result: Result<T, JsValue>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(target: "frost::browser", op, ?err, "DOM operation failed");
            None
        }
    }
}

impl DomNode for BrowserNode {
    fn node_kind(&self) -> NodeKind {
        match self.node.node_type() {
            Node::ELEMENT_NODE => NodeKind::Element,
            Node::TEXT_NODE => NodeKind::Text,
            Node::COMMENT_NODE => NodeKind::Comment,
            _ => NodeKind::Other,
        }
    }

    fn tag_name(&self) -> Option<String> {
        self.as_element()
            .map(|el| el.local_name().to_ascii_lowercase())
    }

    fn parent_node(&self) -> Option<Self> {
        self.node.parent_node().map(|n| self.wrap(n))
    }

    fn first_child(&self) -> Option<Self> {
        self.node.first_child().map(|n| self.wrap(n))
    }

    fn last_child(&self) -> Option<Self> {
        self.node.last_child().map(|n| self.wrap(n))
    }

    fn next_sibling(&self) -> Option<Self> {
        self.node.next_sibling().map(|n| self.wrap(n))
    }

    fn previous_sibling(&self) -> Option<Self> {
        self.node.previous_sibling().map(|n| self.wrap(n))
    }

    fn attributes(&self) -> Vec<(String, String)> {
        let Some(el) = self.as_element() else {
            return Vec::new();
        };
        let attrs = el.attributes();
        (0..attrs.length())
            .filter_map(|i| attrs.item(i))
            .map(|attr| (attr.name(), attr.value()))
            .collect()
    }

    fn get_attribute(&self, name: &str) -> Option<String> {
        self.as_element()?.get_attribute(name)
    }

    fn set_attribute(&self, name: &str, value: &str) {
        if let Some(el) = self.as_element() {
            check("setAttribute", el.set_attribute(name, value));
        }
    }

    fn remove_attribute(&self, name: &str) {
        if let Some(el) = self.as_element() {
            check("removeAttribute", el.remove_attribute(name));
        }
    }

    fn text(&self) -> Option<String> {
        match self.node_kind() {
            NodeKind::Text | NodeKind::Comment => self.node.node_value(),
            _ => None,
        }
    }

    fn set_text(&self, text: &str) {
        if matches!(self.node_kind(), NodeKind::Text | NodeKind::Comment) {
            self.node.set_node_value(Some(text));
        }
    }

    fn text_len(&self) -> usize {
        match self.node_kind() {
            NodeKind::Text => self
                .node
                .dyn_ref::<CharacterData>()
                .map_or(0, |data| data.length() as usize),
            _ => 0,
        }
    }

    fn split_text(&self, offset: usize) -> Option<Self> {
        let text = self.node.dyn_ref::<Text>()?;
        if offset > text.length() as usize {
            return None;
        }
        let tail = check("splitText", text.split_text(offset as u32))?;
        Some(self.wrap(tail.into()))
    }

    fn append_child(&self, child: &Self) {
        check("appendChild", self.node.append_child(&child.node));
    }

    fn insert_before(&self, node: &Self) {
        if let Some(parent) = self.node.parent_node() {
            check("insertBefore", parent.insert_before(&node.node, Some(&self.node)));
        }
    }

    fn insert_after(&self, node: &Self) {
        if let Some(parent) = self.node.parent_node() {
            let next = self.node.next_sibling();
            check("insertBefore", parent.insert_before(&node.node, next.as_ref()));
        }
    }

    fn detach(&self) {
        if let Some(parent) = self.node.parent_node() {
            check("removeChild", parent.remove_child(&self.node));
        }
    }

    fn create_text(&self, text: &str) -> Self {
        self.wrap(self.doc.create_text_node(text).into())
    }

    /// Invalid tag names fall back to an empty text node.
    fn create_element(&self, tag: &str) -> Self {
        match check("createElement", self.doc.create_element(tag)) {
            Some(el) => self.wrap(el.into()),
            None => self.create_text(""),
        }
    }

    fn inner_html(&self) -> String {
        match self.as_element() {
            Some(el) => el.inner_html(),
            None => self.text_content(),
        }
    }

    fn set_inner_html(&self, html: &str) {
        if let Some(el) = self.as_element() {
            el.set_inner_html(html);
        }
    }

    fn text_content(&self) -> String {
        self.node.text_content().unwrap_or_default()
    }
}
