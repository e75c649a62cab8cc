//! Inline style handling and style resolution.
//!
//! Style pruning needs two numbers per declaration: what the property computes
//! to on the element, and what it would compute to without the element's
//! inline style. Browsers answer both through `getComputedStyle`; elsewhere
//! [`CascadeResolver`] evaluates a small cascade of its own.

use std::collections::HashMap;

use crate::dom::DomNode;

/// Answers computed-style questions for the style pruning pass.
pub trait StyleResolver<N: DomNode> {
    /// Value `property` computes to on `element`, inline style included.
    fn computed_value(&self, element: &N, property: &str) -> Option<String>;

    /// Value `property` would compute to on `element` without its inline style.
    fn natural_value(&self, element: &N, property: &str) -> Option<String>;
}

/// Parse a `style` attribute into `(property, value)` declarations.
pub fn parse_declarations(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (property, value) = decl.split_once(':')?;
            let property = property.trim().to_ascii_lowercase();
            let value = value.trim();
            (!property.is_empty() && !value.is_empty())
                .then(|| (property, value.to_string()))
        })
        .collect()
}

pub fn serialize_declarations(declarations: &[(String, String)]) -> String {
    declarations
        .iter()
        .map(|(property, value)| format!("{property}: {value};"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Inline value of `property` on `node`.
pub fn style_property<N: DomNode>(node: &N, property: &str) -> Option<String> {
    let style = node.get_attribute("style")?;
    parse_declarations(&style)
        .into_iter()
        .find(|(p, _)| p == property)
        .map(|(_, v)| v)
}

pub fn set_style_property<N: DomNode>(node: &N, property: &str, value: &str) {
    let mut declarations = node
        .get_attribute("style")
        .map(|s| parse_declarations(&s))
        .unwrap_or_default();
    match declarations.iter_mut().find(|(p, _)| p == property) {
        Some(decl) => decl.1 = value.to_string(),
        None => declarations.push((property.to_string(), value.to_string())),
    }
    node.set_attribute("style", &serialize_declarations(&declarations));
}

/// Remove a declaration, and the attribute once it is empty.
pub fn remove_style_property<N: DomNode>(node: &N, property: &str) {
    let Some(style) = node.get_attribute("style") else {
        return;
    };
    let declarations: Vec<_> = parse_declarations(&style)
        .into_iter()
        .filter(|(p, _)| p != property)
        .collect();
    if declarations.is_empty() {
        node.remove_attribute("style");
    } else {
        node.set_attribute("style", &serialize_declarations(&declarations));
    }
}

const NAMED_COLORS: &[(&str, (u8, u8, u8))] = &[
    ("black", (0, 0, 0)),
    ("white", (255, 255, 255)),
    ("red", (255, 0, 0)),
    ("green", (0, 128, 0)),
    ("blue", (0, 0, 255)),
    ("yellow", (255, 255, 0)),
    ("gray", (128, 128, 128)),
    ("grey", (128, 128, 128)),
    ("silver", (192, 192, 192)),
    ("maroon", (128, 0, 0)),
    ("purple", (128, 0, 128)),
    ("fuchsia", (255, 0, 255)),
    ("lime", (0, 255, 0)),
    ("olive", (128, 128, 0)),
    ("navy", (0, 0, 128)),
    ("teal", (0, 128, 128)),
    ("aqua", (0, 255, 255)),
    ("orange", (255, 165, 0)),
];

fn rgb(r: u8, g: u8, b: u8) -> String {
    format!("rgb({r}, {g}, {b})")
}

/// Canonical `rgb(r, g, b)` / `rgba(...)` / `transparent` form of a color.
///
/// `None` for anything unrecognised.
pub fn normalize_color(value: &str) -> Option<String> {
    let value = value.trim().to_ascii_lowercase();
    if value == "transparent" {
        return Some(value);
    }
    if let Some(&(_, (r, g, b))) = NAMED_COLORS.iter().find(|(name, _)| *name == value) {
        return Some(rgb(r, g, b));
    }
    if let Some(hex) = value.strip_prefix('#') {
        if !hex.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        return match hex.len() {
            3 => {
                let mut digits = hex.chars().map(|c| channel(&format!("{c}{c}")));
                Some(rgb(digits.next()??, digits.next()??, digits.next()??))
            }
            6 => Some(rgb(channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
            _ => None,
        };
    }
    let (name, args) = value.strip_suffix(')')?.split_once('(')?;
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    let channels: Option<Vec<u8>> = parts.iter().take(3).map(|p| p.parse().ok()).collect();
    let channels = channels?;
    match (name.trim(), parts.len()) {
        ("rgb", 3) => Some(rgb(channels[0], channels[1], channels[2])),
        ("rgba", 4) => {
            let alpha: f64 = parts[3].parse().ok()?;
            if alpha == 0.0 {
                Some("transparent".to_string())
            } else if alpha == 1.0 {
                Some(rgb(channels[0], channels[1], channels[2]))
            } else {
                Some(format!(
                    "rgba({}, {}, {}, {})",
                    channels[0], channels[1], channels[2], parts[3]
                ))
            }
        }
        _ => None,
    }
}

pub fn is_transparent(value: &str) -> bool {
    normalize_color(value).is_some_and(|c| c == "transparent")
}

/// Canonical form of a property value, for equality checks.
pub fn normalize_value(property: &str, value: &str) -> String {
    if property.ends_with("color") {
        if let Some(color) = normalize_color(value) {
            return color;
        }
    }
    let value = value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase();
    match (property, value.as_str()) {
        ("font-weight", "normal") => "400".to_string(),
        ("font-weight", "bold") => "700".to_string(),
        ("font-family", _) => value.replace(['"', '\''], "").replace(", ", ","),
        _ => value,
    }
}

/// True when the two values compute to the same thing.
pub fn values_match(property: &str, a: &str, b: &str) -> bool {
    normalize_value(property, a) == normalize_value(property, b)
}

const INHERITED: &[&str] = &[
    "color",
    "direction",
    "font-family",
    "font-size",
    "font-style",
    "font-variant",
    "font-weight",
    "letter-spacing",
    "line-height",
    "text-align",
    "text-indent",
    "text-transform",
    "visibility",
    "white-space",
    "word-spacing",
];

const INITIAL: &[(&str, &str)] = &[
    ("background-color", "transparent"),
    ("float", "none"),
    ("height", "auto"),
    ("margin-bottom", "0px"),
    ("margin-left", "0px"),
    ("margin-right", "0px"),
    ("margin-top", "0px"),
    ("padding-bottom", "0px"),
    ("padding-left", "0px"),
    ("padding-right", "0px"),
    ("padding-top", "0px"),
    ("text-decoration", "none"),
    ("text-decoration-line", "none"),
    ("vertical-align", "baseline"),
    ("width", "auto"),
];

/// User-agent defaults for the tags contenteditable produces.
fn tag_default(tag: &str, property: &str) -> Option<&'static str> {
    let value = match (tag, property) {
        ("b" | "strong" | "th" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6", "font-weight") => "bold",
        ("i" | "em" | "cite" | "var" | "dfn" | "address", "font-style") => "italic",
        ("u" | "ins", "text-decoration" | "text-decoration-line") => "underline",
        ("s" | "strike" | "del", "text-decoration" | "text-decoration-line") => "line-through",
        ("code" | "kbd" | "samp" | "pre" | "tt", "font-family") => "monospace",
        ("sub", "vertical-align") => "sub",
        ("sup", "vertical-align") => "super",
        ("mark", "background-color") => "yellow",
        ("mark", "color") => "black",
        ("center", "text-align") => "center",
        _ => return None,
    };
    Some(value)
}

/// Cascade evaluator for non-browser targets.
///
/// Resolves inline declarations, user-agent tag defaults, inheritance and
/// initial values. Inherited properties bottom out in a configurable root
/// baseline, which stands in for the page's computed style at the editor.
#[derive(Debug, Clone)]
pub struct CascadeResolver {
    baseline: HashMap<String, String>,
}

impl Default for CascadeResolver {
    fn default() -> Self {
        Self::new()
            .with_baseline("color", "rgb(0, 0, 0)")
            .with_baseline("font-family", "Arial")
            .with_baseline("font-size", "16px")
            .with_baseline("font-style", "normal")
            .with_baseline("font-weight", "400")
            .with_baseline("text-align", "start")
    }
}

impl CascadeResolver {
    /// A resolver without any baseline values.
    pub fn new() -> Self {
        Self {
            baseline: HashMap::new(),
        }
    }

    pub fn with_baseline(mut self, property: &str, value: &str) -> Self {
        self.baseline
            .insert(property.to_string(), value.to_string());
        self
    }

    fn parent_value<N: DomNode>(&self, element: &N, property: &str) -> Option<String> {
        match element.parent_node().filter(DomNode::is_element) {
            Some(parent) => self.computed_value(&parent, property),
            None => self.baseline.get(property).cloned(),
        }
    }

    fn initial_value(property: &str) -> Option<String> {
        INITIAL
            .iter()
            .find(|(p, _)| *p == property)
            .map(|(_, v)| v.to_string())
    }
}

impl<N: DomNode> StyleResolver<N> for CascadeResolver {
    fn computed_value(&self, element: &N, property: &str) -> Option<String> {
        match style_property(element, property).as_deref() {
            Some("inherit") => self.parent_value(element, property),
            Some("initial") => Self::initial_value(property),
            Some(value) => Some(value.to_string()),
            None => self.natural_value(element, property),
        }
    }

    fn natural_value(&self, element: &N, property: &str) -> Option<String> {
        if let Some(value) = element.tag_name().and_then(|t| tag_default(&t, property)) {
            return Some(value.to_string());
        }
        if INHERITED.contains(&property) {
            self.parent_value(element, property)
        } else {
            Self::initial_value(property)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom;
    use crate::headless::HeadlessDocument;

    #[test]
    fn declarations_round_trip() {
        let decls = parse_declarations(" color : red;FLOAT: left ; ;");
        assert_eq!(
            decls,
            vec![
                ("color".to_string(), "red".to_string()),
                ("float".to_string(), "left".to_string())
            ]
        );
        assert_eq!(serialize_declarations(&decls), "color: red; float: left;");
    }

    #[test]
    fn set_and_remove_properties() {
        let root = HeadlessDocument::parse("<img src=\"a.png\">");
        let img = root.first_child().unwrap();
        set_style_property(&img, "width", "50%");
        set_style_property(&img, "float", "left");
        set_style_property(&img, "width", "25%");
        assert_eq!(
            img.get_attribute("style").as_deref(),
            Some("width: 25%; float: left;")
        );
        remove_style_property(&img, "width");
        remove_style_property(&img, "float");
        assert!(img.get_attribute("style").is_none());
    }

    #[test]
    fn colors_normalize() {
        assert_eq!(normalize_color("#F00").as_deref(), Some("rgb(255, 0, 0)"));
        assert_eq!(normalize_color("#00ff00").as_deref(), Some("rgb(0, 255, 0)"));
        assert_eq!(normalize_color("rgb(1,2,3)").as_deref(), Some("rgb(1, 2, 3)"));
        assert_eq!(normalize_color("rgba(1, 2, 3, 1)").as_deref(), Some("rgb(1, 2, 3)"));
        assert_eq!(normalize_color("rgba(0, 0, 0, 0)").as_deref(), Some("transparent"));
        assert_eq!(normalize_color("Red").as_deref(), Some("rgb(255, 0, 0)"));
        assert!(normalize_color("var(--x)").is_none());
        // Six bytes, but not six hex digits.
        assert!(normalize_color("#aé€").is_none());
        assert!(normalize_color("#ééé").is_none());
        assert!(is_transparent("rgba(0,0,0,0)"));
    }

    #[test]
    fn font_weights_compare_numerically() {
        assert!(values_match("font-weight", "bold", "700"));
        assert!(values_match("font-family", "\"Times New Roman\", serif", "Times New Roman,serif"));
        assert!(!values_match("width", "50%", "auto"));
    }

    #[test]
    fn cascade_inherits_and_defaults() {
        let root = HeadlessDocument::parse(
            "<p style=\"color: red\"><b><span style=\"color: inherit\">x</span></b></p>",
        );
        let resolver = CascadeResolver::default();
        let span = dom::descendant_elements(&root)
            .into_iter()
            .find(|n| n.has_tag("span"))
            .unwrap();
        let b = span.parent_node().unwrap();

        assert_eq!(resolver.computed_value(&span, "color").as_deref(), Some("red"));
        assert_eq!(resolver.natural_value(&span, "font-weight").as_deref(), Some("bold"));
        assert_eq!(resolver.natural_value(&b, "font-weight").as_deref(), Some("bold"));
        assert_eq!(
            resolver.natural_value(&span, "background-color").as_deref(),
            Some("transparent")
        );
        assert_eq!(resolver.natural_value(&span, "font-size").as_deref(), Some("16px"));
        assert!(resolver.natural_value(&span, "border-radius").is_none());
    }
}
