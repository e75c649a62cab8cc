//! Browser event handling for the editor.
//!
//! Extracts what the core needs from DOM events and applies the result back
//! to the event (`preventDefault`) or the source textarea.

use wasm_bindgen::JsCast;
use web_sys::{Event, HtmlTextAreaElement, InputEvent, KeyboardEvent, MouseEvent, Node};

use frost_editor_core::{
    BeforeInputResult, InputType, Key, KeyCombo, KeydownResult, Modifiers, Point, PopoverChange,
    SourceEdit, dom, source,
};

use crate::BrowserEditor;
use crate::dom::BrowserNode;

/// Get input type from a beforeinput or input event.
pub fn input_type(event: &InputEvent) -> InputType {
    InputType::parse(&event.input_type())
}

pub fn key_combo(event: &KeyboardEvent) -> KeyCombo {
    KeyCombo::with_modifiers(
        Key::parse(&event.key()),
        Modifiers {
            ctrl: event.ctrl_key(),
            alt: event.alt_key(),
            shift: event.shift_key(),
            meta: event.meta_key(),
        },
    )
}

/// Viewport coordinates of a pointer event.
pub fn pointer(event: &MouseEvent) -> Point {
    Point {
        x: f64::from(event.client_x()),
        y: f64::from(event.client_y()),
    }
}

fn target_node(editor: &BrowserEditor, event: &Event) -> Option<BrowserNode> {
    let node = event.target()?.dyn_into::<Node>().ok()?;
    Some(editor.host().wrap(node))
}

/// Handle beforeinput. Composition input always passes through, and only a
/// cancelable event is taken over.
pub fn handle_beforeinput(editor: &mut BrowserEditor, event: &InputEvent) {
    if event.is_composing() {
        return;
    }
    let input = input_type(event);
    let cancelable = event.cancelable();
    tracing::trace!(target: "frost::browser", ?input, cancelable, "beforeinput");
    if editor.handle_before_input(&input, cancelable) == BeforeInputResult::Handled {
        event.prevent_default();
    }
}

pub fn handle_input(editor: &mut BrowserEditor, event: &InputEvent) {
    editor.handle_input(&input_type(event));
}

pub fn handle_keydown(editor: &mut BrowserEditor, event: &KeyboardEvent) {
    match editor.handle_keydown(&key_combo(event)) {
        Ok(KeydownResult::Handled) => event.prevent_default(),
        Ok(KeydownResult::NotHandled) => {}
        Err(err) => tracing::warn!(target: "frost::browser", %err, "keydown failed"),
    }
}

/// A click selects the popover target: the nearest link, image or table cell.
pub fn handle_click(editor: &mut BrowserEditor, event: &MouseEvent) -> PopoverChange<BrowserNode> {
    let root = editor.root().clone();
    let target = target_node(editor, event)
        .and_then(|node| dom::closest(&node, &["a", "img", "td", "th"], &root));
    editor.refresh_popover(target, Some(pointer(event)))
}

/// Tab and Shift+Tab in the source textarea. Returns the new text when the
/// key was consumed.
pub fn handle_source_keydown(textarea: &HtmlTextAreaElement, event: &KeyboardEvent) -> Option<String> {
    if Key::parse(&event.key()) != Key::Tab || event.ctrl_key() || event.meta_key() {
        return None;
    }
    event.prevent_default();
    let value = textarea.value();
    let start = textarea.selection_start().ok().flatten().unwrap_or(0) as usize;
    let end = textarea.selection_end().ok().flatten().unwrap_or(0) as usize;
    let SourceEdit { value, start, end } = if event.shift_key() {
        source::outdent(&value, start, end)
    } else {
        source::indent(&value, start, end)
    };
    textarea.set_value(&value);
    if let Err(err) = textarea.set_selection_range(start as u32, end as u32) {
        tracing::warn!(target: "frost::browser", ?err, "setSelectionRange failed");
    }
    Some(value)
}
