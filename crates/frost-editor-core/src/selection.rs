//! Selection codec.
//!
//! Converts live selections into index paths relative to the editable root so
//! they survive the root's content being replaced, and brackets normalization
//! passes with marker nodes that ride along with the content.
//!
//! Paths are only meaningful against a tree of the same shape as the one they
//! were computed from. Nothing here validates that: call sites capture before
//! they mutate, never after.

use serde::{Deserialize, Serialize};

use crate::dom::{self, Boundary, DomNode};
use crate::platform::SelectionPlatform;

/// A live selection: anchor and focus boundary points.
#[derive(Debug, Clone, PartialEq)]
pub struct DomSelection<N> {
    pub anchor: Boundary<N>,
    pub focus: Boundary<N>,
}

impl<N: DomNode> DomSelection<N> {
    pub fn new(anchor: Boundary<N>, focus: Boundary<N>) -> Self {
        Self { anchor, focus }
    }

    pub fn collapsed(node: N, offset: usize) -> Self {
        let point = Boundary::new(node, offset);
        Self {
            anchor: point.clone(),
            focus: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// Both boundaries lie inside `root` (inclusive).
    pub fn within(&self, root: &N) -> bool {
        dom::contains(root, &self.anchor.node) && dom::contains(root, &self.focus.node)
    }

    /// Focus comes before anchor in document order.
    pub fn is_backward(&self, root: &N) -> bool {
        boundary_key(&self.focus, root) < boundary_key(&self.anchor, root)
    }

    /// Boundaries in document order: `(start, end)`.
    pub fn ordered(&self, root: &N) -> (Boundary<N>, Boundary<N>) {
        if self.is_backward(root) {
            (self.focus.clone(), self.anchor.clone())
        } else {
            (self.anchor.clone(), self.focus.clone())
        }
    }
}

/// Sort key for a boundary: its node's path followed by the offset.
///
/// An element boundary at index `i` shares its key with the path of child
/// `i`, which makes it sort before every point inside that child.
fn boundary_key<N: DomNode>(point: &Boundary<N>, root: &N) -> Vec<usize> {
    let mut key = path_from_node(&point.node, root);
    key.push(point.offset);
    key
}

/// Position-independent selection, as stored in history entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSnapshot {
    pub anchor_path: Vec<usize>,
    pub anchor_offset: usize,
    pub focus_path: Vec<usize>,
    pub focus_offset: usize,
}

/// Child indices from `root` down to `node`, root-to-leaf.
///
/// Empty when `node` is `root`. `node` must be inside `root`; otherwise the
/// walk runs to the top of its tree.
pub fn path_from_node<N: DomNode>(node: &N, root: &N) -> Vec<usize> {
    let mut path = Vec::new();
    let mut current = node.clone();
    while &current != root {
        let Some(parent) = current.parent_node() else {
            break;
        };
        path.push(dom::index_in_parent(&current).unwrap_or(0));
        current = parent;
    }
    path.reverse();
    path
}

/// Walk `path` down from `root`. `None` when a segment is out of range.
pub fn node_from_path<N: DomNode>(path: &[usize], root: &N) -> Option<N> {
    path.iter()
        .try_fold(root.clone(), |node, &index| dom::nth_child(&node, index))
}

/// Snapshot the live selection relative to `root`.
///
/// `None` without a selection or when either boundary lies outside `root`.
pub fn capture_selection<H: SelectionPlatform>(
    host: &H,
    root: &H::Node,
) -> Option<SelectionSnapshot> {
    let selection = host.selection()?;
    if !selection.within(root) {
        tracing::trace!(target: "frost::selection", "selection outside root, not captured");
        return None;
    }
    Some(SelectionSnapshot {
        anchor_path: path_from_node(&selection.anchor.node, root),
        anchor_offset: selection.anchor.offset,
        focus_path: path_from_node(&selection.focus.node, root),
        focus_offset: selection.focus.offset,
    })
}

/// Re-establish a snapshot, or collapse to the end of `root` without one.
///
/// A path that no longer resolves also falls back to collapsing at the end.
pub fn restore_selection<H: SelectionPlatform>(
    host: &H,
    root: &H::Node,
    snapshot: Option<&SelectionSnapshot>,
) {
    let Some(snapshot) = snapshot else {
        collapse_to_end(host, root);
        return;
    };
    let anchor = node_from_path(&snapshot.anchor_path, root);
    let focus = node_from_path(&snapshot.focus_path, root);
    match (anchor, focus) {
        (Some(anchor), Some(focus)) => host.set_selection(&DomSelection::new(
            Boundary::new(anchor, snapshot.anchor_offset),
            Boundary::new(focus, snapshot.focus_offset),
        )),
        _ => {
            tracing::warn!(
                target: "frost::selection",
                anchor = ?snapshot.anchor_path,
                focus = ?snapshot.focus_path,
                "stale selection path, collapsing to end"
            );
            collapse_to_end(host, root);
        }
    }
}

/// Collapse the selection after the last child of `root`.
pub fn collapse_to_end<H: SelectionPlatform>(host: &H, root: &H::Node) {
    host.set_selection(&DomSelection::collapsed(
        root.clone(),
        dom::child_count(root),
    ));
}

/// Insert `node` at a boundary point, splitting a text node if the point falls
/// inside one.
pub fn insert_at<N: DomNode>(at: &Boundary<N>, node: &N) {
    if at.node.is_text() {
        if at.offset == 0 {
            at.node.insert_before(node);
        } else {
            if at.offset < at.node.text_len() {
                at.node.split_text(at.offset);
            }
            at.node.insert_after(node);
        }
    } else {
        match dom::nth_child(&at.node, at.offset) {
            Some(child) => child.insert_before(node),
            None => at.node.append_child(node),
        }
    }
}

/// The pair of empty text nodes bracketing a selection during normalization.
#[derive(Debug)]
pub struct SelectionMarkers<N> {
    start: N,
    end: N,
    backward: bool,
}

impl<N: DomNode> SelectionMarkers<N> {
    /// Insert markers at the boundaries of `selection`, end first so the start
    /// position stays valid.
    pub fn insert(root: &N, selection: &DomSelection<N>) -> Self {
        let (start_at, end_at) = selection.ordered(root);
        let start = root.create_text("");
        let end = root.create_text("");
        insert_at(&end_at, &end);
        insert_at(&start_at, &start);
        Self {
            start,
            end,
            backward: selection.is_backward(root),
        }
    }

    pub fn nodes(&self) -> [N; 2] {
        [self.start.clone(), self.end.clone()]
    }

    pub fn is_marker(&self, node: &N) -> bool {
        node == &self.start || node == &self.end
    }

    /// Detach both markers and return the selection they delimited: from just
    /// after the start marker to just before the end marker.
    ///
    /// `None` if a marker was detached from the tree along the way.
    pub fn remove(self) -> Option<DomSelection<N>> {
        let start = Boundary::before(&self.start);
        self.start.detach();
        let end = Boundary::before(&self.end);
        self.end.detach();
        let (start, end) = (start?, end?);
        Some(if self.backward {
            DomSelection::new(end, start)
        } else {
            DomSelection::new(start, end)
        })
    }
}
