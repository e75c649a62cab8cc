//! Host DOM abstraction.
//!
//! The editor never touches a concrete DOM directly. Everything goes through
//! [`DomNode`], a cheap clonable handle with identity equality, so the same
//! normalizer, selection codec and history code runs against the browser DOM
//! (`frost-editor-browser`) and the in-memory tree in [`crate::headless`].

use std::fmt;

/// Kind of a DOM node, as far as the editor cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Element,
    Text,
    Comment,
    Other,
}

/// A handle to a node in a mutable document tree.
///
/// Equality is node identity, not structural equality.
///
/// Text offsets (`text_len`, `split_text`, selection offsets) are expressed in
/// the backend's native unit: UTF-16 code units in the browser, Unicode scalar
/// values in the headless backend. Callers only ever feed offsets back into
/// the backend that produced them.
pub trait DomNode: Clone + PartialEq + fmt::Debug {
    fn node_kind(&self) -> NodeKind;

    /// Lowercase local name for elements, `None` otherwise.
    fn tag_name(&self) -> Option<String>;

    fn parent_node(&self) -> Option<Self>;
    fn first_child(&self) -> Option<Self>;
    fn last_child(&self) -> Option<Self>;
    fn next_sibling(&self) -> Option<Self>;
    fn previous_sibling(&self) -> Option<Self>;

    /// Attributes in document order. Empty for non-elements.
    fn attributes(&self) -> Vec<(String, String)>;
    fn get_attribute(&self, name: &str) -> Option<String>;
    fn set_attribute(&self, name: &str, value: &str);
    fn remove_attribute(&self, name: &str);

    /// Character data of a text node.
    fn text(&self) -> Option<String>;
    fn set_text(&self, text: &str);

    /// Length of a text node's data, 0 for anything else.
    fn text_len(&self) -> usize;

    /// Split a text node at `offset`, returning the new node holding the tail.
    ///
    /// The tail is inserted as the next sibling. Returns `None` for non-text
    /// nodes or an offset past the end.
    fn split_text(&self, offset: usize) -> Option<Self>;

    fn append_child(&self, child: &Self);
    /// Insert `node` as the previous sibling of `self`.
    fn insert_before(&self, node: &Self);
    /// Insert `node` as the next sibling of `self`.
    fn insert_after(&self, node: &Self);
    fn detach(&self);

    fn create_text(&self, text: &str) -> Self;
    fn create_element(&self, tag: &str) -> Self;

    /// Serialized HTML of the children.
    fn inner_html(&self) -> String;
    /// Replace all children by parsing `html`.
    fn set_inner_html(&self, html: &str);
    fn text_content(&self) -> String;

    fn is_element(&self) -> bool {
        self.node_kind() == NodeKind::Element
    }

    fn is_text(&self) -> bool {
        self.node_kind() == NodeKind::Text
    }

    /// True when this is an element with the given (lowercase) tag.
    fn has_tag(&self, tag: &str) -> bool {
        self.tag_name().is_some_and(|t| t == tag)
    }
}

/// Children of `node` in order, snapshotted.
pub fn children<N: DomNode>(node: &N) -> Vec<N> {
    let mut out = Vec::new();
    let mut next = node.first_child();
    while let Some(child) = next {
        next = child.next_sibling();
        out.push(child);
    }
    out
}

pub fn child_count<N: DomNode>(node: &N) -> usize {
    let mut count = 0;
    let mut next = node.first_child();
    while let Some(child) = next {
        count += 1;
        next = child.next_sibling();
    }
    count
}

pub fn nth_child<N: DomNode>(node: &N, index: usize) -> Option<N> {
    let mut next = node.first_child();
    let mut i = 0;
    while let Some(child) = next {
        if i == index {
            return Some(child);
        }
        i += 1;
        next = child.next_sibling();
    }
    None
}

/// Position of `node` among its parent's children.
pub fn index_in_parent<N: DomNode>(node: &N) -> Option<usize> {
    node.parent_node()?;
    let mut index = 0;
    let mut prev = node.previous_sibling();
    while let Some(p) = prev {
        index += 1;
        prev = p.previous_sibling();
    }
    Some(index)
}

/// Inclusive containment: a node contains itself.
pub fn contains<N: DomNode>(ancestor: &N, node: &N) -> bool {
    let mut current = Some(node.clone());
    while let Some(n) = current {
        if &n == ancestor {
            return true;
        }
        current = n.parent_node();
    }
    false
}

/// All descendants of `root` in preorder, excluding `root`, as a static list.
pub fn descendants<N: DomNode>(root: &N) -> Vec<N> {
    let mut out = Vec::new();
    let mut stack: Vec<N> = children(root).into_iter().rev().collect();
    while let Some(node) = stack.pop() {
        stack.extend(children(&node).into_iter().rev());
        out.push(node);
    }
    out
}

pub fn descendant_elements<N: DomNode>(root: &N) -> Vec<N> {
    descendants(root)
        .into_iter()
        .filter(DomNode::is_element)
        .collect()
}

/// Nearest inclusive ancestor of `node` with one of `tags`, staying inside `root`.
pub fn closest<N: DomNode>(node: &N, tags: &[&str], root: &N) -> Option<N> {
    let mut current = Some(node.clone());
    while let Some(n) = current {
        if &n == root {
            return None;
        }
        if n.tag_name().is_some_and(|t| tags.contains(&t.as_str())) {
            return Some(n);
        }
        current = n.parent_node();
    }
    None
}

/// Replace `node` by its children, in place.
pub fn unwrap<N: DomNode>(node: &N) {
    for child in children(node) {
        node.insert_before(&child);
    }
    node.detach();
}

/// Move all children of `from` to the end of `to`.
pub fn move_children<N: DomNode>(from: &N, to: &N) {
    for child in children(from) {
        to.append_child(&child);
    }
}

/// Same kind and name, same attribute set in any order, ignoring children.
pub fn shallow_equal<N: DomNode>(a: &N, b: &N) -> bool {
    if a.node_kind() != b.node_kind() {
        return false;
    }
    match a.node_kind() {
        NodeKind::Element => {
            if a.tag_name() != b.tag_name() {
                return false;
            }
            let mut left = a.attributes();
            let mut right = b.attributes();
            left.sort();
            right.sort();
            left == right
        }
        NodeKind::Text | NodeKind::Comment => a.text() == b.text(),
        NodeKind::Other => false,
    }
}

/// A selection boundary point: a node plus an offset.
///
/// For text nodes the offset is into the character data. For elements it is a
/// child index, and the boundary sits just before that child.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary<N> {
    pub node: N,
    pub offset: usize,
}

impl<N: DomNode> Boundary<N> {
    pub fn new(node: N, offset: usize) -> Self {
        Self { node, offset }
    }

    /// Boundary just before `node` in its parent.
    pub fn before(node: &N) -> Option<Self> {
        Some(Self::new(node.parent_node()?, index_in_parent(node)?))
    }

    /// Boundary just after `node` in its parent.
    pub fn after(node: &N) -> Option<Self> {
        Some(Self::new(node.parent_node()?, index_in_parent(node)? + 1))
    }
}

/// Merge adjacent text nodes under `root` and drop empty ones, like DOM
/// `Node.normalize()`.
///
/// Boundary points in `tracked` are remapped so that they keep pointing at the
/// same position in the merged text.
pub fn merge_adjacent_text<N: DomNode>(root: &N, tracked: &mut [&mut Boundary<N>]) {
    let mut stack = vec![root.clone()];
    while let Some(parent) = stack.pop() {
        let mut child = parent.first_child();
        while let Some(node) = child {
            child = node.next_sibling();
            match node.node_kind() {
                NodeKind::Element => stack.push(node),
                NodeKind::Text => merge_text_run(&parent, &node, &mut child, tracked),
                _ => {}
            }
        }
    }
}

fn merge_text_run<N: DomNode>(
    parent: &N,
    first: &N,
    cursor: &mut Option<N>,
    tracked: &mut [&mut Boundary<N>],
) {
    let mut data = first.text().unwrap_or_default();
    let mut len = first.text_len();
    while let Some(next) = cursor.clone().filter(DomNode::is_text) {
        let next_len = next.text_len();
        let next_index = index_in_parent(&next).unwrap_or(0);
        for b in tracked.iter_mut() {
            if b.node == next {
                b.node = first.clone();
                b.offset += len;
            } else if &b.node == parent && b.offset == next_index {
                b.node = first.clone();
                b.offset = len;
            } else if &b.node == parent && b.offset > next_index {
                b.offset -= 1;
            }
        }
        data.push_str(&next.text().unwrap_or_default());
        len += next_len;
        *cursor = next.next_sibling();
        next.detach();
    }
    if len == 0 {
        let index = index_in_parent(first).unwrap_or(0);
        for b in tracked.iter_mut() {
            if &b.node == first {
                b.node = parent.clone();
                b.offset = index;
            } else if &b.node == parent && b.offset > index {
                b.offset -= 1;
            }
        }
        first.detach();
    } else if data != first.text().unwrap_or_default() {
        first.set_text(&data);
    }
}
