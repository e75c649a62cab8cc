//! Popover tracking and the structural edits popover items perform.

use serde::Serialize;

use crate::config::{LayoutEntry, PopoverLayouts};
use crate::dom::{self, DomNode};
use crate::registry::PopoverAction;
use crate::style;

/// Element kinds that get a popover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PopoverKind {
    Link,
    Image,
    TableCell,
}

impl PopoverKind {
    pub fn classify<N: DomNode>(node: &N) -> Option<Self> {
        match node.tag_name()?.as_str() {
            "a" => Some(Self::Link),
            "img" => Some(Self::Image),
            "td" | "th" => Some(Self::TableCell),
            _ => None,
        }
    }

    pub fn layout(self, layouts: &PopoverLayouts) -> &[LayoutEntry] {
        match self {
            Self::Link => &layouts.link,
            Self::Image => &layouts.image,
            Self::TableCell => &layouts.table,
        }
    }
}

/// Viewport coordinates of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// What a popover is positioned against.
#[derive(Debug, Clone, PartialEq)]
pub enum Anchor<N> {
    Element(N),
    Point(Point),
}

/// Floating placement, maintained by an external collaborator.
pub trait Positioner {
    /// Recompute placement after the reference moved.
    fn update(&mut self);
    fn dispose(&mut self);
}

#[derive(Debug, Clone, PartialEq)]
pub struct PopoverView<N> {
    pub node: N,
    pub kind: PopoverKind,
    pub anchor: Anchor<N>,
    pub layout: Vec<LayoutEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PopoverChange<N> {
    /// Same node as before; nothing to do.
    Unchanged,
    /// The popover (if any) was torn down and none replaces it.
    Hidden,
    /// Render this popover.
    Shown(PopoverView<N>),
}

/// Tracks which node, if any, currently has a popover.
pub struct PopoverTracker<N> {
    current: Option<(N, PopoverKind)>,
    positioner: Option<Box<dyn Positioner>>,
}

impl<N> Default for PopoverTracker<N> {
    fn default() -> Self {
        Self {
            current: None,
            positioner: None,
        }
    }
}

impl<N: DomNode> PopoverTracker<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the popover to `target`.
    ///
    /// No-op when `target` is already tracked. Images anchor to `origin` when
    /// one is given, everything else to the element itself.
    pub fn refresh(
        &mut self,
        target: Option<N>,
        origin: Option<Point>,
        layouts: &PopoverLayouts,
    ) -> PopoverChange<N> {
        if self.current.as_ref().map(|(node, _)| node) == target.as_ref() {
            return PopoverChange::Unchanged;
        }
        self.remove();
        let Some((node, kind)) = target.and_then(|node| {
            let kind = PopoverKind::classify(&node)?;
            Some((node, kind))
        }) else {
            return PopoverChange::Hidden;
        };
        let anchor = match (kind, origin) {
            (PopoverKind::Image, Some(point)) => Anchor::Point(point),
            _ => Anchor::Element(node.clone()),
        };
        tracing::trace!(target: "frost::popover", ?kind, "popover shown");
        self.current = Some((node.clone(), kind));
        PopoverChange::Shown(PopoverView {
            node,
            kind,
            anchor,
            layout: kind.layout(layouts).to_vec(),
        })
    }

    /// Hand over the positioner for the popover just shown.
    pub fn attach(&mut self, mut positioner: Box<dyn Positioner>) {
        if let Some(mut old) = self.positioner.take() {
            old.dispose();
        }
        positioner.update();
        self.positioner = Some(positioner);
    }

    pub fn update(&mut self) {
        if let Some(positioner) = self.positioner.as_mut() {
            positioner.update();
        }
    }

    /// Tear down the current popover. Returns whether there was one.
    pub fn remove(&mut self) -> bool {
        if let Some(mut positioner) = self.positioner.take() {
            positioner.dispose();
        }
        self.current.take().is_some()
    }

    pub fn current(&self) -> Option<&N> {
        self.current.as_ref().map(|(node, _)| node)
    }

    pub fn kind(&self) -> Option<PopoverKind> {
        self.current.as_ref().map(|(_, kind)| *kind)
    }
}

/// Apply a float/size action to an image.
pub fn apply_image_action<N: DomNode>(image: &N, action: PopoverAction) {
    match action {
        PopoverAction::FloatLeft => style::set_style_property(image, "float", "left"),
        PopoverAction::FloatRight => style::set_style_property(image, "float", "right"),
        PopoverAction::FloatNone => style::remove_style_property(image, "float"),
        PopoverAction::ImageFull => style::set_style_property(image, "width", "100%"),
        PopoverAction::ImageHalf => style::set_style_property(image, "width", "50%"),
        PopoverAction::ImageQuarter => style::set_style_property(image, "width", "25%"),
        PopoverAction::ImageOriginal => style::remove_style_property(image, "width"),
        PopoverAction::ImageRemove => image.detach(),
        _ => {}
    }
}

fn cells<N: DomNode>(row: &N) -> Vec<N> {
    dom::children(row)
        .into_iter()
        .filter(|n| n.has_tag("td") || n.has_tag("th"))
        .collect()
}

/// Rows belonging to `table` itself, not to nested tables.
fn rows<N: DomNode>(table: &N) -> Vec<N> {
    let mut out = Vec::new();
    for child in dom::children(table) {
        if child.has_tag("tr") {
            out.push(child);
        } else if ["thead", "tbody", "tfoot"].iter().any(|t| child.has_tag(t)) {
            out.extend(dom::children(&child).into_iter().filter(|n| n.has_tag("tr")));
        }
    }
    out
}

fn new_cell<N: DomNode>(like: &N) -> N {
    let td = like.create_element("td");
    td.append_child(&like.create_element("br"));
    td
}

/// Apply a table action at `cell`.
///
/// Returns the cell the caret should move to, or `None` when the cell is gone.
pub fn apply_table_action<N: DomNode>(root: &N, cell: &N, action: PopoverAction) -> Option<N> {
    let table = dom::closest(cell, &["table"], root)?;
    let row = dom::closest(cell, &["tr"], &table)?;
    let index = cells(&row).iter().position(|c| c == cell)?;

    match action {
        PopoverAction::TableRowAfter | PopoverAction::TableRowBefore => {
            let new_row = cell.create_element("tr");
            for _ in 0..cells(&row).len() {
                new_row.append_child(&new_cell(cell));
            }
            if action == PopoverAction::TableRowAfter {
                row.insert_after(&new_row);
            } else {
                row.insert_before(&new_row);
            }
        }
        PopoverAction::TableColumnAfter | PopoverAction::TableColumnBefore => {
            for r in rows(&table) {
                let added = new_cell(cell);
                match cells(&r).get(index) {
                    Some(c) if action == PopoverAction::TableColumnAfter => c.insert_after(&added),
                    Some(c) => c.insert_before(&added),
                    None => r.append_child(&added),
                }
            }
        }
        PopoverAction::TableColumnRemove => {
            for r in rows(&table) {
                if let Some(c) = cells(&r).get(index) {
                    c.detach();
                }
            }
            if rows(&table).iter().all(|r| cells(r).is_empty()) {
                table.detach();
            }
            return None;
        }
        PopoverAction::TableRowRemove => {
            row.detach();
            if rows(&table).is_empty() {
                table.detach();
            }
            return None;
        }
        PopoverAction::TableRemove => {
            table.detach();
            return None;
        }
        _ => {}
    }
    Some(cell.clone())
}

/// Build a `rows` × `cols` table with empty cells.
pub fn build_table<N: DomNode>(doc: &N, rows: usize, cols: usize) -> N {
    let table = doc.create_element("table");
    let body = doc.create_element("tbody");
    for _ in 0..rows {
        let row = doc.create_element("tr");
        for _ in 0..cols {
            row.append_child(&doc.create_element("td"));
        }
        body.append_child(&row);
    }
    table.append_child(&body);
    table
}

/// Image width while drag-resizing from the bottom-right handle.
///
/// `(x, y)` is the image's top-left corner, `ratio` its width / height.
pub fn image_resize_width(pointer: Point, x: f64, y: f64, ratio: f64) -> f64 {
    (pointer.x - x).max((pointer.y - y) * ratio).max(1.0)
}

/// Editor panel height while dragging its resize bar. `grab` is how far
/// below the bar's top edge the drag started.
pub fn panel_resize_height(pointer_y: f64, panel_top: f64, grab: f64) -> f64 {
    (pointer_y - panel_top - grab).max(0.0)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::headless::HeadlessDocument;
    use crate::selection::node_from_path;

    #[derive(Default)]
    struct Calls(Rc<RefCell<Vec<&'static str>>>);

    impl Positioner for Calls {
        fn update(&mut self) {
            self.0.borrow_mut().push("update");
        }

        fn dispose(&mut self) {
            self.0.borrow_mut().push("dispose");
        }
    }

    #[test]
    fn refresh_is_noop_for_same_node() {
        let root = HeadlessDocument::parse(r#"<p><a href="x">l</a><img src="i"></p>"#);
        let link = node_from_path(&[0, 0], &root).unwrap();
        let layouts = PopoverLayouts::default();
        let mut tracker = PopoverTracker::new();

        let PopoverChange::Shown(view) = tracker.refresh(Some(link.clone()), None, &layouts) else {
            panic!("expected a popover");
        };
        assert_eq!(view.kind, PopoverKind::Link);
        assert_eq!(view.anchor, Anchor::Element(link.clone()));
        assert_eq!(view.layout, layouts.link);
        assert_eq!(tracker.refresh(Some(link), None, &layouts), PopoverChange::Unchanged);
        assert_eq!(tracker.refresh(None, None, &layouts), PopoverChange::Hidden);
        assert_eq!(tracker.refresh(None, None, &layouts), PopoverChange::Unchanged);
    }

    #[test]
    fn images_anchor_to_pointer() {
        let root = HeadlessDocument::parse(r#"<p><img src="i"></p>"#);
        let img = node_from_path(&[0, 0], &root).unwrap();
        let mut tracker = PopoverTracker::new();
        let point = Point { x: 4.0, y: 9.0 };
        let PopoverChange::Shown(view) =
            tracker.refresh(Some(img), Some(point), &PopoverLayouts::default())
        else {
            panic!("expected a popover");
        };
        assert_eq!(view.anchor, Anchor::Point(point));
    }

    #[test]
    fn positioner_is_disposed_on_teardown() {
        let root = HeadlessDocument::parse(r#"<p><a href="x">l</a><a href="y">m</a></p>"#);
        let first = node_from_path(&[0, 0], &root).unwrap();
        let second = node_from_path(&[0, 1], &root).unwrap();
        let layouts = PopoverLayouts::default();
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut tracker = PopoverTracker::new();

        tracker.refresh(Some(first), None, &layouts);
        tracker.attach(Box::new(Calls(log.clone())));
        tracker.refresh(Some(second.clone()), None, &layouts);
        assert_eq!(*log.borrow(), vec!["update", "dispose"]);
        assert_eq!(tracker.current(), Some(&second));
    }

    #[test]
    fn unclassified_target_hides() {
        let root = HeadlessDocument::parse("<p>x</p>");
        let p = root.first_child().unwrap();
        let mut tracker = PopoverTracker::new();
        assert_eq!(
            tracker.refresh(Some(p), None, &PopoverLayouts::default()),
            PopoverChange::Hidden
        );
        assert!(tracker.current().is_none());
    }

    #[test]
    fn image_actions_edit_style() {
        let root = HeadlessDocument::parse(r#"<p><img src="i"></p>"#);
        let img = node_from_path(&[0, 0], &root).unwrap();
        apply_image_action(&img, PopoverAction::ImageHalf);
        apply_image_action(&img, PopoverAction::FloatRight);
        assert_eq!(
            img.get_attribute("style").as_deref(),
            Some("width: 50%; float: right;")
        );
        apply_image_action(&img, PopoverAction::ImageOriginal);
        apply_image_action(&img, PopoverAction::FloatNone);
        assert!(img.get_attribute("style").is_none());
        apply_image_action(&img, PopoverAction::ImageRemove);
        assert_eq!(root.inner_html(), "<p></p>");
    }

    #[test]
    fn table_rows_and_columns() {
        let root = HeadlessDocument::parse(
            "<table><tbody><tr><td>a</td><td>b</td></tr><tr><td>c</td><td>d</td></tr></tbody></table>",
        );
        let b = node_from_path(&[0, 0, 0, 1], &root).unwrap();

        apply_table_action(&root, &b, PopoverAction::TableRowAfter);
        assert_eq!(
            root.inner_html(),
            "<table><tbody><tr><td>a</td><td>b</td></tr><tr><td><br></td><td><br></td></tr><tr><td>c</td><td>d</td></tr></tbody></table>"
        );

        let caret = apply_table_action(&root, &b, PopoverAction::TableColumnBefore);
        assert_eq!(caret, Some(b.clone()));
        assert_eq!(
            root.inner_html(),
            "<table><tbody><tr><td>a</td><td><br></td><td>b</td></tr><tr><td><br></td><td><br></td><td><br></td></tr><tr><td>c</td><td><br></td><td>d</td></tr></tbody></table>"
        );

        assert_eq!(apply_table_action(&root, &b, PopoverAction::TableColumnRemove), None);
        assert_eq!(
            root.inner_html(),
            "<table><tbody><tr><td>a</td><td><br></td></tr><tr><td><br></td><td><br></td></tr><tr><td>c</td><td><br></td></tr></tbody></table>"
        );
    }

    #[test]
    fn removing_last_row_removes_table() {
        let root = HeadlessDocument::parse("<p>x</p><table><tbody><tr><td>a</td></tr></tbody></table>");
        let a = node_from_path(&[1, 0, 0, 0], &root).unwrap();
        assert_eq!(apply_table_action(&root, &a, PopoverAction::TableRowRemove), None);
        assert_eq!(root.inner_html(), "<p>x</p>");
    }

    #[test]
    fn built_table_shape() {
        let root = HeadlessDocument::parse("");
        let table = build_table(&root, 2, 3);
        root.append_child(&table);
        assert_eq!(
            root.inner_html(),
            "<table><tbody><tr><td></td><td></td><td></td></tr><tr><td></td><td></td><td></td></tr></tbody></table>"
        );
    }

    #[test]
    fn resize_width_takes_larger_axis() {
        let p = Point { x: 150.0, y: 80.0 };
        assert_eq!(image_resize_width(p, 100.0, 50.0, 2.0), 60.0);
        assert_eq!(image_resize_width(Point { x: 0.0, y: 0.0 }, 100.0, 50.0, 2.0), 1.0);
    }

    #[test]
    fn panel_height_follows_the_bar() {
        assert_eq!(panel_resize_height(420.0, 100.0, 5.0), 315.0);
        assert_eq!(panel_resize_height(90.0, 100.0, 5.0), 0.0);
    }
}
