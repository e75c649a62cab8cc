//! Browser implementation of the editor host traits.
//!
//! Selection goes through `window.getSelection()`, native editing through
//! `document.execCommand`, and the enhanced form control is a `<textarea>`.

use wasm_bindgen::JsCast;
use web_sys::{
    CustomEvent, CustomEventInit, HtmlDocument, HtmlElement, HtmlTextAreaElement, Selection, Window,
};

use frost_editor_core::{
    Boundary, DomSelection, EditingPlatform, EditorEvent, HostInput, PlatformError,
    SelectionPlatform,
};

use crate::dom::BrowserNode;

/// The browser side of an editor: window, document, editable root and the
/// original textarea.
pub struct BrowserHost {
    window: Window,
    document: HtmlDocument,
    root: HtmlElement,
    input: HtmlTextAreaElement,
}

impl BrowserHost {
    pub fn new(root: HtmlElement, input: HtmlTextAreaElement) -> Result<Self, PlatformError> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window
            .document()
            .ok_or("no document")?
            .dyn_into::<HtmlDocument>()
            .map_err(|_| "document is not an HTML document")?;
        Ok(Self {
            window,
            document,
            root,
            input,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn root_element(&self) -> &HtmlElement {
        &self.root
    }

    pub fn input(&self) -> &HtmlTextAreaElement {
        &self.input
    }

    /// The editable root as a `DomNode`.
    pub fn root_node(&self) -> BrowserNode {
        BrowserNode::with_document(self.root.clone().into(), self.document.clone().into())
    }

    pub fn wrap(&self, node: web_sys::Node) -> BrowserNode {
        BrowserNode::with_document(node, self.document.clone().into())
    }

    fn dom_selection(&self) -> Option<Selection> {
        self.window.get_selection().ok().flatten()
    }
}

impl SelectionPlatform for BrowserHost {
    type Node = BrowserNode;

    fn selection(&self) -> Option<DomSelection<BrowserNode>> {
        let sel = self.dom_selection()?;
        let anchor = sel.anchor_node()?;
        let focus = sel.focus_node()?;
        Some(DomSelection::new(
            Boundary::new(self.wrap(anchor), sel.anchor_offset() as usize),
            Boundary::new(self.wrap(focus), sel.focus_offset() as usize),
        ))
    }

    fn set_selection(&self, selection: &DomSelection<BrowserNode>) {
        let Some(sel) = self.dom_selection() else {
            return;
        };
        let result = sel.set_base_and_extent(
            selection.anchor.node.node(),
            selection.anchor.offset as u32,
            selection.focus.node.node(),
            selection.focus.offset as u32,
        );
        if let Err(err) = result {
            tracing::warn!(target: "frost::selection", ?err, "setBaseAndExtent failed");
        }
    }

    fn clear_selection(&self) {
        if let Some(sel) = self.dom_selection() {
            let _ = sel.remove_all_ranges();
        }
    }

    fn has_focus_within(&self, root: &BrowserNode) -> bool {
        self.document
            .active_element()
            .is_some_and(|active| root.node().contains(Some(&active)))
    }

    fn focus(&self, root: &BrowserNode) {
        if let Some(el) = root.node().dyn_ref::<HtmlElement>() {
            let _ = el.focus();
        }
    }

    fn insert_node(&self, root: &BrowserNode, node: &BrowserNode) -> Result<(), PlatformError> {
        let sel = self.dom_selection().ok_or("no selection object")?;
        let range = match self.selection() {
            Some(current) if current.within(root) && sel.range_count() > 0 => sel
                .get_range_at(0)
                .map_err(|e| format!("getRangeAt failed: {:?}", e))?,
            _ => {
                let range = self
                    .document
                    .create_range()
                    .map_err(|e| format!("createRange failed: {:?}", e))?;
                range
                    .select_node_contents(root.node())
                    .map_err(|e| format!("selectNodeContents failed: {:?}", e))?;
                range.collapse_with_to_start(false);
                range
            }
        };
        range
            .delete_contents()
            .map_err(|e| format!("deleteContents failed: {:?}", e))?;
        range
            .insert_node(node.node())
            .map_err(|e| format!("insertNode failed: {:?}", e))?;
        range
            .set_start_after(node.node())
            .map_err(|e| format!("setStartAfter failed: {:?}", e))?;
        range.collapse_with_to_start(true);
        sel.remove_all_ranges()
            .map_err(|e| format!("removeAllRanges failed: {:?}", e))?;
        sel.add_range(&range)
            .map_err(|e| format!("addRange failed: {:?}", e))?;
        Ok(())
    }
}

impl EditingPlatform for BrowserHost {
    fn exec_command(&self, command: &str, value: Option<&str>) -> bool {
        let result = match value {
            Some(value) => self
                .document
                .exec_command_with_show_ui_and_value(command, false, value),
            None => self.document.exec_command(command),
        };
        result.unwrap_or_else(|err| {
            tracing::warn!(target: "frost::command", command, ?err, "execCommand threw");
            false
        })
    }

    fn query_command_state(&self, command: &str) -> bool {
        self.document.query_command_state(command).unwrap_or(false)
    }

    fn query_command_value(&self, command: &str) -> Option<String> {
        self.document
            .query_command_value(command)
            .ok()
            .filter(|v| !v.is_empty())
    }

    fn root_font_size(&self) -> Option<f64> {
        let style = self.window.get_computed_style(&self.root).ok().flatten()?;
        let size = style.get_property_value("font-size").ok()?;
        size.trim().trim_end_matches("px").parse().ok()
    }
}

impl HostInput for BrowserHost {
    fn value(&self) -> String {
        self.input.value()
    }

    fn set_value(&self, value: &str) {
        self.input.set_value(value);
    }

    fn set_disabled(&self, disabled: bool) {
        self.input.set_disabled(disabled);
        let editable = if disabled { "false" } else { "true" };
        if let Err(err) = self.root.set_attribute("contenteditable", editable) {
            tracing::warn!(target: "frost::browser", ?err, "could not toggle contenteditable");
        }
    }

    fn dispatch(&self, event: EditorEvent) {
        dispatch_event(&self.input, event);
    }
}

/// Fire `event` on the enhanced textarea as a bubbling `CustomEvent`.
pub fn dispatch_event(input: &HtmlTextAreaElement, event: EditorEvent) {
    let init = CustomEventInit::new();
    init.set_bubbles(true);
    let result = CustomEvent::new_with_event_init_dict(event.name(), &init)
        .and_then(|ev| input.dispatch_event(&ev));
    if let Err(err) = result {
        tracing::warn!(target: "frost::browser", event = event.name(), ?err, "dispatch failed");
    }
}
