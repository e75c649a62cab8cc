//! Mounting an editor onto page elements and wiring its listeners.

use std::cell::{Cell, OnceCell, RefCell};
use std::rc::{Rc, Weak};
use std::sync::Arc;

use gloo_events::{EventListener, EventListenerOptions};
use gloo_timers::callback::Timeout;
use wasm_bindgen::JsCast;
use web_sys::{
    DragEvent, FileList, FileReader, HtmlElement, HtmlImageElement, HtmlTextAreaElement,
    InputEvent, KeyboardEvent, MouseEvent,
};

use frost_editor_core::{
    Editor, EditorError, EditorEvent, EditorOptions, Lifecycle, PlatformError, PopoverChange,
    Registry, popover, style,
};

use crate::BrowserEditor;
use crate::dom::BrowserNode;
use crate::events;
use crate::host::{self, BrowserHost};
use crate::observer::BrowserObserver;
use crate::style::ComputedStyleResolver;

/// Delay before the source gutter is recomputed after typing.
pub const LINE_REFRESH_MS: u32 = 150;

/// The page elements an editor is built from.
pub struct EditorElements {
    /// The original form control. Holds the serialized content.
    pub input: HtmlTextAreaElement,
    /// The contenteditable root.
    pub root: HtmlElement,
    /// The raw HTML view.
    pub source: HtmlTextAreaElement,
    /// Drag handle below the root. Ignored unless the editor is resizable.
    pub resize_bar: Option<HtmlElement>,
}

/// Callbacks into the rendering layer. Each runs after the editor borrow
/// is released, so it may call back into the editor.
#[derive(Clone, Default)]
pub struct MountHooks {
    /// Selection or content changed; toolbar state may be stale.
    pub on_state: Option<Rc<dyn Fn()>>,
    pub on_popover: Option<Rc<dyn Fn(PopoverChange<BrowserNode>)>>,
    /// New line count for the source gutter.
    pub on_lines: Option<Rc<dyn Fn(usize)>>,
    /// Files dropped onto the root. Without it, image files are inlined as
    /// data URLs.
    pub on_image_upload: Option<Rc<dyn Fn(FileList)>>,
}

impl MountHooks {
    fn state(&self) {
        if let Some(f) = &self.on_state {
            f();
        }
    }

    fn popover(&self, change: PopoverChange<BrowserNode>) {
        if matches!(change, PopoverChange::Unchanged) {
            return;
        }
        if let Some(f) = &self.on_popover {
            f(change);
        }
    }
}

/// A mounted editor and the listeners feeding it.
///
/// Dropping it removes every listener and disconnects the observer.
pub struct MountedEditor {
    editor: Rc<RefCell<BrowserEditor>>,
    _listeners: Vec<EventListener>,
    _line_timer: Rc<RefCell<Option<Timeout>>>,
}

impl MountedEditor {
    pub fn editor(&self) -> &Rc<RefCell<BrowserEditor>> {
        &self.editor
    }
}

/// Run `f` on the editor unless it is gone or already borrowed further up
/// the stack.
fn with_editor<R>(
    weak: &Weak<RefCell<BrowserEditor>>,
    f: impl FnOnce(&mut BrowserEditor) -> R,
) -> Option<R> {
    let cell = weak.upgrade()?;
    let Ok(mut editor) = cell.try_borrow_mut() else {
        tracing::warn!(target: "frost::browser", "editor busy, event dropped");
        return None;
    };
    Some(f(&mut editor))
}

/// Forward a root event to the host input. Runs even while the editor is
/// borrowed, since a command focusing the root fires `focus` synchronously.
fn forward(weak: &Weak<RefCell<BrowserEditor>>, input: &HtmlTextAreaElement, event: EditorEvent) {
    let Some(cell) = weak.upgrade() else {
        return;
    };
    if cell.try_borrow().is_ok_and(|ed| ed.is_disposed()) {
        return;
    }
    host::dispatch_event(input, event);
}

/// Build the editor over `elements` and start listening.
pub fn mount(
    elements: EditorElements,
    options: EditorOptions,
    registry: Arc<Registry>,
    hooks: MountHooks,
) -> Result<MountedEditor, EditorError> {
    let EditorElements {
        input,
        root,
        source,
        resize_bar,
    } = elements;
    let resizable = options.resizable;
    root.set_attribute("contenteditable", "true")
        .map_err(|e| PlatformError(format!("could not make root editable: {:?}", e)))?;
    let host = BrowserHost::new(root.clone(), input.clone())?;
    let root_node = host.root_node();
    let resolver = Box::new(ComputedStyleResolver::new(host.window().clone()));

    let slot: Rc<OnceCell<Weak<RefCell<BrowserEditor>>>> = Rc::new(OnceCell::new());
    let observer = {
        let slot = slot.clone();
        let hooks = hooks.clone();
        BrowserObserver::new(root_node.node(), move |count| {
            let Some(weak) = slot.get() else {
                return;
            };
            if with_editor(weak, |ed| ed.handle_mutations(count)).is_some() {
                hooks.state();
            }
        })?
    };

    let editor = Editor::mount(host, root_node, observer, options, registry, resolver)?;
    let editor = Rc::new(RefCell::new(editor));
    let weak = Rc::downgrade(&editor);
    let _ = slot.set(weak.clone());

    let line_timer: Rc<RefCell<Option<Timeout>>> = Rc::default();
    let mut listeners = Vec::new();
    let prevent = EventListenerOptions::enable_prevent_default();

    {
        let weak = weak.clone();
        listeners.push(EventListener::new_with_options(&root, "beforeinput", prevent, move |ev| {
            if let Some(ev) = ev.dyn_ref::<InputEvent>() {
                with_editor(&weak, |ed| events::handle_beforeinput(ed, ev));
            }
        }));
    }
    {
        let weak = weak.clone();
        let hooks = hooks.clone();
        listeners.push(EventListener::new(&root, "input", move |ev| {
            if let Some(ev) = ev.dyn_ref::<InputEvent>() {
                with_editor(&weak, |ed| events::handle_input(ed, ev));
                hooks.state();
            }
        }));
    }
    {
        let weak = weak.clone();
        let hooks = hooks.clone();
        listeners.push(EventListener::new_with_options(&root, "keydown", prevent, move |ev| {
            if let Some(ev) = ev.dyn_ref::<KeyboardEvent>() {
                with_editor(&weak, |ed| events::handle_keydown(ed, ev));
                hooks.state();
            }
        }));
    }
    {
        let weak = weak.clone();
        let hooks = hooks.clone();
        listeners.push(EventListener::new(&root, "keyup", move |_| {
            if let Some(change) = with_editor(&weak, |ed| ed.refresh_cursor()) {
                hooks.popover(change);
            }
            hooks.state();
        }));
    }
    {
        let weak = weak.clone();
        let hooks = hooks.clone();
        listeners.push(EventListener::new(&root, "click", move |ev| {
            if let Some(ev) = ev.dyn_ref::<MouseEvent>() {
                if let Some(change) = with_editor(&weak, |ed| events::handle_click(ed, ev)) {
                    hooks.popover(change);
                }
                hooks.state();
            }
        }));
    }
    for (name, event) in [("focus", EditorEvent::Focus), ("blur", EditorEvent::Blur)] {
        let weak = weak.clone();
        let input = input.clone();
        listeners.push(EventListener::new(&root, name, move |_| {
            forward(&weak, &input, event);
        }));
    }
    {
        // `load` does not bubble. Oversized images are fitted to the root.
        let root_el = root.clone();
        listeners.push(EventListener::new_with_options(
            &root,
            "load",
            EventListenerOptions::run_in_capture_phase(),
            move |ev| {
                let Some(img) = ev
                    .target()
                    .and_then(|t| t.dyn_into::<HtmlImageElement>().ok())
                else {
                    return;
                };
                if img.natural_width() > root_el.client_width().max(0) as u32 {
                    if let Some(node) = BrowserNode::new(img.into()) {
                        style::set_style_property(&node, "width", "100%");
                    }
                }
            },
        ));
    }
    {
        // Images are resized through the popover, not dragged around.
        listeners.push(EventListener::new_with_options(&root, "dragstart", prevent, |ev| {
            if ev.target().is_some_and(|t| t.has_type::<HtmlImageElement>()) {
                ev.prevent_default();
            }
        }));
        listeners.push(EventListener::new_with_options(&root, "dragover", prevent, |ev| {
            ev.prevent_default();
        }));
    }
    {
        let weak = weak.clone();
        let hooks = hooks.clone();
        listeners.push(EventListener::new_with_options(&root, "drop", prevent, move |ev| {
            let Some(transfer) = ev.dyn_ref::<DragEvent>().and_then(DragEvent::data_transfer) else {
                return;
            };
            ev.prevent_default();
            match transfer.files().filter(|files| files.length() > 0) {
                Some(files) => match &hooks.on_image_upload {
                    Some(upload) => upload(files),
                    None => read_images(&weak, &hooks, &files),
                },
                None => {
                    let text = transfer.get_data("text").unwrap_or_default();
                    if let Some(Err(err)) = with_editor(&weak, |ed| ed.drop_text(&text)) {
                        tracing::warn!(target: "frost::browser", %err, "text drop failed");
                    }
                    hooks.state();
                }
            }
        }));
    }
    if let Some(bar) = resize_bar.filter(|_| resizable) {
        listeners.extend(resize_listeners(&weak, &hooks, &root, bar));
    }
    {
        let weak = weak.clone();
        let hooks = hooks.clone();
        let textarea = source.clone();
        listeners.push(EventListener::new_with_options(&source, "keydown", prevent, move |ev| {
            let Some(ev) = ev.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            if let Some(text) = events::handle_source_keydown(&textarea, ev) {
                if let Some(lines) = with_editor(&weak, |ed| ed.set_source_text(&text)) {
                    if let Some(f) = &hooks.on_lines {
                        f(lines);
                    }
                }
            }
        }));
    }
    {
        let weak = weak.clone();
        let hooks = hooks.clone();
        let timer = line_timer.clone();
        let textarea = source.clone();
        listeners.push(EventListener::new(&source, "input", move |_| {
            let Some(lines) = with_editor(&weak, |ed| ed.set_source_text(&textarea.value())) else {
                return;
            };
            let Some(on_lines) = hooks.on_lines.clone() else {
                return;
            };
            // Replacing the pending timeout cancels it; the last call wins.
            *timer.borrow_mut() = Some(Timeout::new(LINE_REFRESH_MS, move || on_lines(lines)));
        }));
    }
    {
        let weak = weak.clone();
        let hooks = hooks.clone();
        listeners.push(EventListener::new(&source, "change", move |_| {
            let result = with_editor(&weak, |ed| ed.commit_source());
            if let Some(Err(err)) = result {
                tracing::warn!(target: "frost::browser", %err, "source commit failed");
            }
            hooks.state();
        }));
    }
    if let Some(window) = web_sys::window() {
        for name in ["resize", "scroll"] {
            let weak = weak.clone();
            listeners.push(EventListener::new(&window, name, move |_| {
                with_editor(&weak, |ed| ed.reposition_popover());
            }));
        }
    }

    tracing::debug!(target: "frost::browser", listeners = listeners.len(), "editor mounted");
    Ok(MountedEditor {
        editor,
        _listeners: listeners,
        _line_timer: line_timer,
    })
}

/// Inline every dropped image file as a data URL.
fn read_images(weak: &Weak<RefCell<BrowserEditor>>, hooks: &MountHooks, files: &FileList) {
    for index in 0..files.length() {
        let Some(file) = files.get(index).filter(|f| f.type_().starts_with("image/")) else {
            continue;
        };
        let reader = match FileReader::new() {
            Ok(reader) => reader,
            Err(err) => {
                tracing::warn!(target: "frost::browser", ?err, "no FileReader");
                return;
            }
        };
        let weak = weak.clone();
        let hooks = hooks.clone();
        let source = reader.clone();
        // Fires at most once; the reader and its listener go away together.
        EventListener::once(&reader, "load", move |_| {
            let Some(src) = source.result().ok().and_then(|r| r.as_string()) else {
                return;
            };
            if let Some(Err(err)) = with_editor(&weak, |ed| ed.drop_image(&src)) {
                tracing::warn!(target: "frost::browser", %err, "image drop failed");
            }
            hooks.state();
        })
        .forget();
        if let Err(err) = reader.read_as_data_url(&file) {
            tracing::warn!(target: "frost::browser", name = %file.name(), ?err, "could not read file");
        }
    }
}

/// Drag the bar to resize the root: down on the bar, then move and up
/// anywhere on the page.
fn resize_listeners(
    weak: &Weak<RefCell<BrowserEditor>>,
    hooks: &MountHooks,
    root: &HtmlElement,
    bar: HtmlElement,
) -> Vec<EventListener> {
    let Some(window) = web_sys::window() else {
        return Vec::new();
    };
    let grab: Rc<Cell<Option<f64>>> = Rc::default();
    let mut listeners = Vec::with_capacity(3);
    {
        let weak = weak.clone();
        let hooks = hooks.clone();
        let grab = grab.clone();
        let handle = bar.clone();
        let prevent = EventListenerOptions::enable_prevent_default();
        listeners.push(EventListener::new_with_options(&bar, "mousedown", prevent, move |ev| {
            let Some(ev) = ev.dyn_ref::<MouseEvent>() else {
                return;
            };
            ev.prevent_default();
            let top = handle.get_bounding_client_rect().top();
            grab.set(Some(f64::from(ev.client_y()) - top));
            if with_editor(&weak, |ed| ed.remove_popover()) == Some(true) {
                hooks.popover(PopoverChange::Hidden);
            }
        }));
    }
    {
        let weak = weak.clone();
        let grab = grab.clone();
        let root = root.clone();
        listeners.push(EventListener::new(&window, "mousemove", move |ev| {
            let (Some(offset), Some(ev)) = (grab.get(), ev.dyn_ref::<MouseEvent>()) else {
                return;
            };
            let top = root.get_bounding_client_rect().top();
            let height = popover::panel_resize_height(f64::from(ev.client_y()), top, offset);
            with_editor(&weak, |ed| ed.resize_panel(height));
        }));
    }
    listeners.push(EventListener::new(&window, "mouseup", move |_| grab.set(None)));
    listeners
}

impl Drop for MountedEditor {
    fn drop(&mut self) {
        if let Ok(mut editor) = self.editor.try_borrow_mut() {
            editor.dispose();
        }
    }
}
