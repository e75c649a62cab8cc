//! In-memory editor backend built on kuchiki.
//!
//! Lets every component run without a browser: server-side cleanup of stored
//! content through [`normalize_html`], and native tests through
//! [`HeadlessHost`] and [`HeadlessObserver`].

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use html5ever::{LocalName, Namespace, QualName};
use kuchiki::traits::TendrilSink;
use kuchiki::{Node, NodeData, NodeRef};

use crate::dom::{self, Boundary, DomNode, NodeKind};
use crate::events::EditorEvent;
use crate::gate::MutationSource;
use crate::normalize::Normalizer;
use crate::platform::{EditingPlatform, HostInput, PlatformError, SelectionPlatform};
use crate::selection::{self, DomSelection};
use crate::style::CascadeResolver;

const HTML_NS: &str = "http://www.w3.org/1999/xhtml";

fn char_to_byte(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

impl DomNode for NodeRef {
    fn node_kind(&self) -> NodeKind {
        match self.data() {
            NodeData::Element(_) => NodeKind::Element,
            NodeData::Text(_) => NodeKind::Text,
            NodeData::Comment(_) => NodeKind::Comment,
            _ => NodeKind::Other,
        }
    }

    fn tag_name(&self) -> Option<String> {
        self.as_element().map(|el| el.name.local.to_string())
    }

    fn parent_node(&self) -> Option<Self> {
        Node::parent(self)
    }

    fn first_child(&self) -> Option<Self> {
        Node::first_child(self)
    }

    fn last_child(&self) -> Option<Self> {
        Node::last_child(self)
    }

    fn next_sibling(&self) -> Option<Self> {
        Node::next_sibling(self)
    }

    fn previous_sibling(&self) -> Option<Self> {
        Node::previous_sibling(self)
    }

    fn attributes(&self) -> Vec<(String, String)> {
        match self.as_element() {
            Some(el) => el
                .attributes
                .borrow()
                .map
                .iter()
                .map(|(name, attr)| (name.local.to_string(), attr.value.clone()))
                .collect(),
            None => Vec::new(),
        }
    }

    fn get_attribute(&self, name: &str) -> Option<String> {
        let el = self.as_element()?;
        let attrs = el.attributes.borrow();
        attrs.get(name).map(str::to_string)
    }

    fn set_attribute(&self, name: &str, value: &str) {
        if let Some(el) = self.as_element() {
            el.attributes.borrow_mut().insert(name, value.to_string());
        }
    }

    fn remove_attribute(&self, name: &str) {
        if let Some(el) = self.as_element() {
            el.attributes.borrow_mut().remove(name);
        }
    }

    fn text(&self) -> Option<String> {
        match self.data() {
            NodeData::Text(text) | NodeData::Comment(text) => Some(text.borrow().clone()),
            _ => None,
        }
    }

    fn set_text(&self, value: &str) {
        if let NodeData::Text(text) | NodeData::Comment(text) = self.data() {
            *text.borrow_mut() = value.to_string();
        }
    }

    fn text_len(&self) -> usize {
        self.as_text().map_or(0, |t| t.borrow().chars().count())
    }

    fn split_text(&self, offset: usize) -> Option<Self> {
        let text = self.as_text()?;
        if offset > text.borrow().chars().count() {
            return None;
        }
        let tail = {
            let mut data = text.borrow_mut();
            let byte = char_to_byte(&data, offset);
            data.split_off(byte)
        };
        let node = NodeRef::new_text(tail);
        NodeRef::insert_after(self, node.clone());
        Some(node)
    }

    fn append_child(&self, child: &Self) {
        NodeRef::append(self, child.clone());
    }

    fn insert_before(&self, node: &Self) {
        NodeRef::insert_before(self, node.clone());
    }

    fn insert_after(&self, node: &Self) {
        NodeRef::insert_after(self, node.clone());
    }

    fn detach(&self) {
        Node::detach(self);
    }

    fn create_text(&self, text: &str) -> Self {
        NodeRef::new_text(text)
    }

    fn create_element(&self, tag: &str) -> Self {
        let name = QualName::new(None, Namespace::from(HTML_NS), LocalName::from(tag));
        NodeRef::new_element(name, Vec::new())
    }

    fn inner_html(&self) -> String {
        dom::children(self).iter().map(ToString::to_string).collect()
    }

    fn set_inner_html(&self, html: &str) {
        for child in dom::children(self) {
            Node::detach(&child);
        }
        let parsed = HeadlessDocument::parse(html);
        for child in dom::children(&parsed) {
            NodeRef::append(self, child);
        }
    }

    fn text_content(&self) -> String {
        self.text_contents()
    }
}

/// Entry point for building headless trees.
pub struct HeadlessDocument;

impl HeadlessDocument {
    /// Parse an HTML fragment and return its `<body>` as the root node.
    pub fn parse(html: &str) -> NodeRef {
        let document = kuchiki::parse_html().one(html);
        match document.select_first("body") {
            Ok(body) => body.as_node().clone(),
            Err(()) => {
                let body = document.create_element("body");
                NodeRef::append(&document, body.clone());
                body
            }
        }
    }
}

/// Normalize a stored HTML fragment outside of any editor.
///
/// Uses the [`CascadeResolver`] defaults for style pruning.
pub fn normalize_html(html: &str) -> String {
    let root = HeadlessDocument::parse(html);
    dom::merge_adjacent_text(&root, &mut []);
    Normalizer::new(&CascadeResolver::default()).run(&root, &[]);
    dom::merge_adjacent_text(&root, &mut []);
    root.inner_html()
}

/// An in-memory editor host.
///
/// Holds the selection, focus flag, host input value and disabled flag, logs
/// dispatched events and native commands, and answers command queries from
/// caller-provided state.
#[derive(Default)]
pub struct HeadlessHost {
    selection: RefCell<Option<DomSelection<NodeRef>>>,
    focused: Cell<bool>,
    value: RefCell<String>,
    disabled: Cell<bool>,
    events: RefCell<Vec<EditorEvent>>,
    commands: RefCell<Vec<(String, Option<String>)>>,
    command_states: RefCell<HashMap<String, bool>>,
    command_values: RefCell<HashMap<String, String>>,
}

impl HeadlessHost {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: RefCell::new(value.into()),
            ..Self::default()
        }
    }

    pub fn is_focused(&self) -> bool {
        self.focused.get()
    }

    pub fn blur(&self) {
        self.focused.set(false);
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.get()
    }

    pub fn events(&self) -> Vec<EditorEvent> {
        self.events.borrow().clone()
    }

    /// Native commands issued so far, as `(name, value)`.
    pub fn commands(&self) -> Vec<(String, Option<String>)> {
        self.commands.borrow().clone()
    }

    pub fn clear_commands(&self) {
        self.commands.borrow_mut().clear();
    }

    pub fn set_command_state(&self, command: &str, state: bool) {
        self.command_states
            .borrow_mut()
            .insert(command.to_string(), state);
    }

    pub fn set_command_value(&self, command: &str, value: &str) {
        self.command_values
            .borrow_mut()
            .insert(command.to_string(), value.to_string());
    }
}

impl SelectionPlatform for HeadlessHost {
    type Node = NodeRef;

    fn selection(&self) -> Option<DomSelection<NodeRef>> {
        self.selection.borrow().clone()
    }

    fn set_selection(&self, selection: &DomSelection<NodeRef>) {
        *self.selection.borrow_mut() = Some(selection.clone());
    }

    fn clear_selection(&self) {
        self.selection.borrow_mut().take();
    }

    fn has_focus_within(&self, _root: &NodeRef) -> bool {
        self.focused.get()
    }

    fn focus(&self, _root: &NodeRef) {
        self.focused.set(true);
    }

    /// Only a selection within a single text node has its contents removed
    /// first. Wider selections collapse to their start.
    fn insert_node(&self, root: &NodeRef, node: &NodeRef) -> Result<(), PlatformError> {
        let current = self.selection().filter(|s| s.within(root));
        let at = match current {
            Some(sel) => {
                let (start, end) = sel.ordered(root);
                if start.node == end.node && start.node.is_text() && end.offset > start.offset {
                    let text = start.node.text().unwrap_or_default();
                    let from = char_to_byte(&text, start.offset);
                    let to = char_to_byte(&text, end.offset);
                    start.node.set_text(&format!("{}{}", &text[..from], &text[to..]));
                }
                start
            }
            None => Boundary::new(root.clone(), dom::child_count(root)),
        };
        selection::insert_at(&at, node);
        let after = Boundary::after(node).ok_or("inserted node has no parent")?;
        self.set_selection(&DomSelection::collapsed(after.node, after.offset));
        Ok(())
    }
}

impl EditingPlatform for HeadlessHost {
    fn exec_command(&self, command: &str, value: Option<&str>) -> bool {
        self.commands
            .borrow_mut()
            .push((command.to_string(), value.map(str::to_string)));
        true
    }

    fn query_command_state(&self, command: &str) -> bool {
        self.command_states
            .borrow()
            .get(command)
            .copied()
            .unwrap_or(false)
    }

    fn query_command_value(&self, command: &str) -> Option<String> {
        self.command_values.borrow().get(command).cloned()
    }
}

impl HostInput for HeadlessHost {
    fn value(&self) -> String {
        self.value.borrow().clone()
    }

    fn set_value(&self, value: &str) {
        *self.value.borrow_mut() = value.to_string();
    }

    fn set_disabled(&self, disabled: bool) {
        self.disabled.set(disabled);
    }

    fn dispatch(&self, event: EditorEvent) {
        self.events.borrow_mut().push(event);
    }
}

#[derive(Debug, Default)]
struct ObserverState {
    observing: bool,
    queued: usize,
    connects: usize,
}

/// A mutation source whose records are simulated by the caller.
///
/// Clones share state, so a test can keep one handle while the editor owns
/// the other.
#[derive(Debug, Clone, Default)]
pub struct HeadlessObserver {
    state: Rc<RefCell<ObserverState>>,
}

impl HeadlessObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `count` mutation records. Dropped unless observing.
    pub fn record(&self, count: usize) {
        let mut state = self.state.borrow_mut();
        if state.observing {
            state.queued += count;
        }
    }

    /// Deliver queued records, as the observer callback would.
    pub fn deliver(&self) -> usize {
        std::mem::take(&mut self.state.borrow_mut().queued)
    }

    pub fn is_observing(&self) -> bool {
        self.state.borrow().observing
    }

    /// How many times observation was (re)connected.
    pub fn connects(&self) -> usize {
        self.state.borrow().connects
    }
}

impl MutationSource for HeadlessObserver {
    fn observe(&mut self) {
        let mut state = self.state.borrow_mut();
        state.observing = true;
        state.connects += 1;
    }

    fn disconnect(&mut self) -> usize {
        let mut state = self.state.borrow_mut();
        state.observing = false;
        std::mem::take(&mut state.queued)
    }
}
