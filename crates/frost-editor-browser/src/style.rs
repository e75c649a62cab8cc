//! Style resolution through the live cascade.

use wasm_bindgen::JsCast;
use web_sys::{Element, Window};

use frost_editor_core::StyleResolver;

use crate::dom::BrowserNode;

/// Answers style questions with `getComputedStyle`.
///
/// The natural value of a property is measured on a shallow, style-less clone
/// placed next to the element, so it sees the same inherited values.
pub struct ComputedStyleResolver {
    window: Window,
}

impl ComputedStyleResolver {
    pub fn new(window: Window) -> Self {
        Self { window }
    }

    fn property(&self, element: &Element, property: &str) -> Option<String> {
        let style = self.window.get_computed_style(element).ok().flatten()?;
        style
            .get_property_value(property)
            .ok()
            .filter(|v| !v.is_empty())
    }
}

impl StyleResolver<BrowserNode> for ComputedStyleResolver {
    fn computed_value(&self, element: &BrowserNode, property: &str) -> Option<String> {
        self.property(element.as_element()?, property)
    }

    fn natural_value(&self, element: &BrowserNode, property: &str) -> Option<String> {
        let original = element.as_element()?;
        let probe = original.clone_node().ok()?.dyn_into::<Element>().ok()?;
        probe.remove_attribute("style").ok()?;
        let parent = element.node().parent_node()?;
        let next = element.node().next_sibling();
        parent.insert_before(&probe, next.as_ref()).ok()?;
        let value = self.property(&probe, property);
        if let Err(err) = parent.remove_child(&probe) {
            tracing::warn!(target: "frost::normalize", ?err, "style probe left in place");
        }
        value
    }
}
