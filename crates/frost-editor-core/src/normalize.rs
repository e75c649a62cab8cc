//! DOM normalizer.
//!
//! Turns whatever contenteditable produced into a canonical shape, in four
//! ordered passes:
//!
//! 1. style pruning: drop inline declarations that compute to the same value
//!    the element would have without them
//! 2. span collapsing: unwrap `span`s that carry no attributes
//! 3. phrasing containment: split text blocks at their first non-phrasing
//!    child and drop blocks left empty
//! 4. adjacent joining: merge neighbouring phrasing containers that are
//!    shallowly equal
//!
//! Each pass is idempotent. Selection markers are plain empty text nodes, so
//! they travel with the content; the passes only need to know about them where
//! they would otherwise block a merge or keep an empty block alive.

use crate::dom::{self, DomNode, NodeKind};
use crate::style::{self, StyleResolver};

const PHRASING: &[&str] = &[
    "a", "abbr", "area", "audio", "b", "bdi", "bdo", "br", "button", "cite", "code", "data",
    "datalist", "del", "dfn", "em", "embed", "i", "iframe", "img", "input", "ins", "kbd", "label",
    "map", "mark", "math", "meter", "noscript", "object", "output", "picture", "progress", "q",
    "ruby", "s", "samp", "script", "select", "slot", "small", "span", "strong", "sub", "sup",
    "svg", "template", "textarea", "time", "u", "var", "video", "wbr",
];

const VOID: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const FORM: &[&str] = &[
    "button", "fieldset", "input", "object", "output", "select", "textarea",
];

/// Blocks whose content model is phrasing content only.
///
/// `blockquote` holds flow content and is left alone.
const TEXT_CONTAINERS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6", "p", "pre"];

fn tag_in<N: DomNode>(node: &N, set: &[&str]) -> bool {
    node.tag_name().is_some_and(|t| set.contains(&t.as_str()))
}

/// Text, comments, and inline text-level elements.
pub fn is_phrasing_content<N: DomNode>(node: &N) -> bool {
    match node.node_kind() {
        NodeKind::Text | NodeKind::Comment => true,
        NodeKind::Element => tag_in(node, PHRASING),
        NodeKind::Other => false,
    }
}

/// A phrasing element that can hold children: not void, not a form control.
pub fn is_phrasing_container<N: DomNode>(node: &N) -> bool {
    node.is_element() && tag_in(node, PHRASING) && !tag_in(node, VOID) && !tag_in(node, FORM)
}

pub fn is_text_container<N: DomNode>(node: &N) -> bool {
    tag_in(node, TEXT_CONTAINERS)
}

/// Runs the four passes over an editable root.
pub struct Normalizer<'a, N> {
    resolver: &'a dyn StyleResolver<N>,
}

impl<'a, N: DomNode> Normalizer<'a, N> {
    pub fn new(resolver: &'a dyn StyleResolver<N>) -> Self {
        Self { resolver }
    }

    /// Run every pass over `root`. `markers` are the selection marker nodes
    /// currently in the tree, if any.
    pub fn run(&self, root: &N, markers: &[N]) {
        self.prune_styles(root);
        collapse_spans(root);
        contain_phrasing(root, markers);
        join_adjacent(root, markers);
        tracing::trace!(target: "frost::normalize", "normalized");
    }

    pub fn prune_styles(&self, root: &N) {
        for element in dom::descendant_elements(root) {
            let Some(attr) = element.get_attribute("style") else {
                continue;
            };
            let declarations = style::parse_declarations(&attr);
            let kept: Vec<_> = declarations
                .iter()
                .filter(|(property, value)| !self.is_redundant(root, &element, property, value))
                .cloned()
                .collect();
            if kept.is_empty() {
                element.remove_attribute("style");
            } else if kept.len() != declarations.len() {
                element.set_attribute("style", &style::serialize_declarations(&kept));
            }
        }
    }

    fn is_redundant(&self, root: &N, element: &N, property: &str, value: &str) -> bool {
        if value.eq_ignore_ascii_case("inherit") {
            return true;
        }
        let mut natural = self.resolver.natural_value(element, property);
        if property == "background-color" && natural.as_deref().is_none_or(style::is_transparent) {
            natural = self.effective_background(root, element);
        }
        match (natural, self.resolver.computed_value(element, property)) {
            (Some(natural), Some(actual)) => style::values_match(property, &natural, &actual),
            _ => false,
        }
    }

    /// Nearest non-transparent background among the ancestors of `element`,
    /// up to and including `root`.
    fn effective_background(&self, root: &N, element: &N) -> Option<String> {
        let mut current = element.parent_node();
        while let Some(ancestor) = current {
            let value = self.resolver.computed_value(&ancestor, "background-color");
            if let Some(value) = value.filter(|v| !style::is_transparent(v)) {
                return Some(value);
            }
            if &ancestor == root {
                break;
            }
            current = ancestor.parent_node();
        }
        None
    }
}

/// Unwrap every attribute-less `span` under `root`.
pub fn collapse_spans<N: DomNode>(root: &N) {
    for element in dom::descendant_elements(root) {
        if element.has_tag("span") && element.attributes().is_empty() {
            dom::unwrap(&element);
        }
    }
}

/// Move everything from the first non-phrasing child of each text block to
/// just after the block, then remove blocks left without content.
///
/// A block holding nothing but markers counts as empty; its markers are left
/// where the block stood.
pub fn contain_phrasing<N: DomNode>(root: &N, markers: &[N]) {
    for container in dom::descendant_elements(root) {
        if !is_text_container(&container) || container.parent_node().is_none() {
            continue;
        }
        let kids = dom::children(&container);
        if let Some(split) = kids.iter().position(|kid| !is_phrasing_content(kid)) {
            let mut after = container.clone();
            for kid in &kids[split..] {
                after.insert_after(kid);
                after = kid.clone();
            }
        }
        let remaining = dom::children(&container);
        if remaining.iter().all(|kid| markers.contains(kid)) {
            for marker in remaining {
                container.insert_before(&marker);
            }
            container.detach();
        }
    }
}

/// Merge each phrasing container with following siblings that are shallowly
/// equal to it. Markers between the two move into the merged element.
pub fn join_adjacent<N: DomNode>(root: &N, markers: &[N]) {
    for element in dom::descendant_elements(root) {
        if !is_phrasing_container(&element) || !dom::contains(root, &element) {
            continue;
        }
        loop {
            let mut between = Vec::new();
            let mut next = element.next_sibling();
            while let Some(marker) = next.clone().filter(|n| markers.contains(n)) {
                next = marker.next_sibling();
                between.push(marker);
            }
            let Some(next) = next else {
                break;
            };
            if !is_phrasing_container(&next) || !dom::shallow_equal(&element, &next) {
                break;
            }
            for marker in &between {
                element.append_child(marker);
            }
            dom::move_children(&next, &element);
            next.detach();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Boundary;
    use crate::headless::{HeadlessDocument, normalize_html};
    use crate::selection::{DomSelection, SelectionMarkers, node_from_path};
    use crate::style::CascadeResolver;

    #[test]
    fn joins_equal_neighbours() {
        insta::assert_snapshot!(normalize_html("<p><b>foo</b><b>bar</b></p>"), @"<p><b>foobar</b></p>");
    }

    #[test]
    fn keeps_neighbours_with_different_attributes() {
        insta::assert_snapshot!(
            normalize_html(r#"<p><b>foo</b><b class="x">bar</b></p>"#),
            @r#"<p><b>foo</b><b class="x">bar</b></p>"#
        );
    }

    #[test]
    fn joins_chains_and_nested_runs() {
        insta::assert_snapshot!(
            normalize_html("<p><b><i>a</i></b><b><i>b</i></b><b>c</b></p>"),
            @"<p><b><i>ab</i>c</b></p>"
        );
    }

    #[test]
    fn does_not_join_void_or_form_elements() {
        insta::assert_snapshot!(
            normalize_html("<p>a<br><br><button>x</button><button>y</button></p>"),
            @"<p>a<br><br><button>x</button><button>y</button></p>"
        );
    }

    #[test]
    fn prunes_inherit_and_redundant_styles() {
        insta::assert_snapshot!(
            normalize_html(r#"<p><span style="color: inherit">x</span><b style="font-weight: bold; color: red">y</b></p>"#),
            @r#"<p>x<b style="color: red;">y</b></p>"#
        );
    }

    #[test]
    fn prunes_background_matching_ancestor() {
        insta::assert_snapshot!(
            normalize_html(r#"<p style="background-color: rgb(255, 0, 0)"><span style="background-color: #ff0000">x</span></p>"#),
            @r#"<p style="background-color: rgb(255, 0, 0)">x</p>"#
        );
    }

    #[test]
    fn keeps_meaningful_background() {
        let html = r#"<p><span style="background-color: rgb(255, 255, 0)">x</span></p>"#;
        assert_eq!(normalize_html(html), html);
    }

    #[test]
    fn removes_empty_style_attribute() {
        assert_eq!(normalize_html(r#"<p><b style="">x</b></p>"#), "<p><b>x</b></p>");
    }

    #[test]
    fn collapses_nested_spans() {
        assert_eq!(
            normalize_html("<p><span><span>a</span><span>b</span></span></p>"),
            "<p>ab</p>"
        );
        assert_eq!(
            normalize_html(r#"<p><span class="k">a</span></p>"#),
            r#"<p><span class="k">a</span></p>"#
        );
    }

    #[test]
    fn splits_blocks_at_first_non_phrasing_child() {
        let root = HeadlessDocument::parse("<div>x</div>");
        let div = root.first_child().unwrap();
        // The HTML parser would never nest these, so build the tree by hand.
        let p = root.create_element("p");
        p.append_child(&root.create_text("a"));
        let inner = root.create_element("ul");
        inner.append_child(&root.create_element("li"));
        p.append_child(&inner);
        p.append_child(&root.create_text("b"));
        DomNode::insert_before(&div, &p);

        contain_phrasing(&root, &[]);
        assert_eq!(root.inner_html(), "<p>a</p><ul><li></li></ul>b<div>x</div>");
    }

    #[test]
    fn removes_emptied_blocks_but_not_placeholder() {
        let root = HeadlessDocument::parse("<p><br></p><h2>t</h2>");
        let h2 = node_from_path(&[1], &root).unwrap();
        h2.first_child().unwrap().detach();
        let empty = root.create_element("p");
        root.append_child(&empty);

        contain_phrasing(&root, &[]);
        assert_eq!(root.inner_html(), "<p><br></p>");
    }

    #[test]
    fn marker_only_block_is_removed_and_markers_survive() {
        let root = HeadlessDocument::parse("<p>x</p><p></p>");
        let empty = node_from_path(&[1], &root).unwrap();
        let markers = SelectionMarkers::insert(&root, &DomSelection::collapsed(empty, 0));
        let nodes = markers.nodes();

        contain_phrasing(&root, &nodes);
        assert_eq!(root.inner_html(), "<p>x</p>");
        assert!(nodes.iter().all(|m| m.parent_node() == Some(root.clone())));
        let restored = markers.remove().unwrap();
        assert_eq!(restored.anchor, Boundary::new(root.clone(), 1));
    }

    #[test]
    fn markers_between_joined_elements_move_inside() {
        let root = HeadlessDocument::parse("<p><b>foo</b><b>bar</b></p>");
        let p = root.first_child().unwrap();
        let sel = DomSelection::collapsed(p.clone(), 1);
        let markers = SelectionMarkers::insert(&root, &sel);
        let nodes = markers.nodes();

        Normalizer::new(&CascadeResolver::default()).run(&root, &nodes);
        let b = p.first_child().unwrap();
        assert_eq!(dom::child_count(&p), 1);
        assert_eq!(b.text_content(), "foobar");
        assert!(nodes.iter().all(|m| m.parent_node() == Some(b.clone())));

        let restored = markers.remove().unwrap();
        let mut anchor = restored.anchor;
        dom::merge_adjacent_text(&root, &mut [&mut anchor]);
        assert_eq!(anchor, Boundary::new(b.first_child().unwrap(), 3));
    }

    #[test]
    fn normalization_is_idempotent() {
        let inputs = [
            "<p><b>a</b><b>b</b><span>c</span></p>",
            r#"<h1>t<div>d</div></h1><p style="color: inherit"><i>x</i><i>y</i></p>"#,
            r#"<p><span style="font-weight: 400">n</span><u>1</u><u>2</u></p><p></p>"#,
            "<p><br></p>",
        ];
        for input in inputs {
            let once = normalize_html(input);
            assert_eq!(normalize_html(&once), once, "input: {input}");
        }
    }
}
