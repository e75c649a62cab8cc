//! JsEditor - the main editor wrapper for JavaScript.

use std::cell::RefMut;
use std::rc::Rc;
use std::sync::Arc;

use wasm_bindgen::prelude::*;
use web_sys::{FileList, HtmlElement, HtmlTextAreaElement};

use frost_editor_browser::{
    BrowserEditor, BrowserNode, EditorElements, EditorOptions, Lifecycle, LinkForm, MountHooks,
    MountedEditor, PopoverChange, Positioner, Registry, VideoEmbed, forms, mount,
};

use crate::types::{JsLinkForm, JsPopoverOutcome, JsToolbarOutcome, PopoverPayload};

fn js_error(err: impl std::fmt::Display) -> JsError {
    JsError::new(&err.to_string())
}

/// Call a JS callback, logging instead of throwing.
fn call(callback: &js_sys::Function, args: &[&JsValue]) {
    let result = match args {
        [] => callback.call0(&JsValue::NULL),
        [a] => callback.call1(&JsValue::NULL, a),
        [a, b, ..] => callback.call2(&JsValue::NULL, a, b),
    };
    if let Err(err) = result {
        tracing::warn!(target: "frost::browser", ?err, "callback threw");
    }
}

/// A JS object with `update()` and `dispose()` methods.
struct JsPositioner(JsValue);

impl JsPositioner {
    fn invoke(&self, method: &str) {
        let Ok(f) = js_sys::Reflect::get(&self.0, &JsValue::from_str(method)) else {
            return;
        };
        if let Some(f) = f.dyn_ref::<js_sys::Function>() {
            if let Err(err) = f.call0(&self.0) {
                tracing::warn!(target: "frost::popover", method, ?err, "positioner threw");
            }
        }
    }
}

impl Positioner for JsPositioner {
    fn update(&mut self) {
        self.invoke("update");
    }

    fn dispose(&mut self) {
        self.invoke("dispose");
    }
}

/// The editor instance exposed to JavaScript.
///
/// Wraps a mounted browser editor. Callbacks:
/// - `onState()`: toolbar state may have changed
/// - `onPopover(payload, element)`: a popover was shown or hidden
/// - `onLines(count)`: line count of the source view
/// - `onImageUpload(files)`: files dropped onto the editor; without it image
///   files are inlined as data URLs
#[wasm_bindgen]
pub struct JsEditor {
    mounted: MountedEditor,
}

#[wasm_bindgen]
impl JsEditor {
    /// Mount an editor. `options` is a partial options object; missing
    /// fields take their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(
        input: HtmlTextAreaElement,
        root: HtmlElement,
        source: HtmlTextAreaElement,
        resize_bar: Option<HtmlElement>,
        options: JsValue,
        on_state: Option<js_sys::Function>,
        on_popover: Option<js_sys::Function>,
        on_lines: Option<js_sys::Function>,
        on_image_upload: Option<js_sys::Function>,
    ) -> Result<JsEditor, JsError> {
        let options: EditorOptions = if options.is_undefined() || options.is_null() {
            EditorOptions::default()
        } else {
            serde_wasm_bindgen::from_value(options)
                .map_err(|e| JsError::new(&format!("Invalid options: {}", e)))?
        };

        let hooks = MountHooks {
            on_state: on_state.map(|f| Rc::new(move || call(&f, &[])) as Rc<dyn Fn()>),
            on_popover: on_popover.map(|f| {
                Rc::new(move |change: PopoverChange<BrowserNode>| {
                    let Some(payload) = PopoverPayload::from_change(&change) else {
                        return;
                    };
                    let element = match &change {
                        PopoverChange::Shown(view) => {
                            JsValue::from(view.node.node().clone())
                        }
                        _ => JsValue::NULL,
                    };
                    match serde_wasm_bindgen::to_value(&payload) {
                        Ok(payload) => call(&f, &[&payload, &element]),
                        Err(err) => tracing::warn!(target: "frost::popover", %err, "serialization failed"),
                    }
                }) as Rc<dyn Fn(PopoverChange<BrowserNode>)>
            }),
            on_lines: on_lines.map(|f| {
                Rc::new(move |lines: usize| call(&f, &[&JsValue::from(lines as u32)])) as Rc<dyn Fn(usize)>
            }),
            on_image_upload: on_image_upload.map(|f| {
                Rc::new(move |files: FileList| call(&f, &[&JsValue::from(files)])) as Rc<dyn Fn(FileList)>
            }),
        };

        let elements = EditorElements {
            input,
            root,
            source,
            resize_bar,
        };
        let mounted =
            mount(elements, options, Arc::new(Registry::standard()), hooks).map_err(js_error)?;
        Ok(Self { mounted })
    }

    // === Content access ===

    /// Get the serialized content.
    #[wasm_bindgen(js_name = getHtml)]
    pub fn get_html(&self) -> Result<String, JsError> {
        Ok(self.editor()?.html())
    }

    /// Replace the content. Recorded in history.
    #[wasm_bindgen(js_name = setHtml)]
    pub fn set_html(&self, html: &str) -> Result<(), JsError> {
        self.editor()?.set_html(html).map_err(js_error)
    }

    // === Commands ===

    /// Run a native command by name, e.g. `execute("bold")` or
    /// `execute("foreColor", "#f00")`.
    #[wasm_bindgen]
    pub fn execute(&self, name: &str, value: Option<String>) -> Result<(), JsError> {
        self.editor()?
            .execute_named(name, value.as_deref())
            .map_err(js_error)
    }

    /// Handle a toolbar click.
    #[wasm_bindgen(js_name = toolbarAction)]
    pub fn toolbar_action(
        &self,
        name: &str,
        value: Option<String>,
    ) -> Result<JsToolbarOutcome, JsError> {
        let outcome = self
            .editor()?
            .toolbar_action(name, value.as_deref())
            .map_err(js_error)?;
        Ok(outcome.into())
    }

    /// Display state of every configured toolbar button.
    #[wasm_bindgen(js_name = toolbarState)]
    pub fn toolbar_state(&self) -> Result<JsValue, JsError> {
        let state = self.editor()?.refresh_toolbar().map_err(js_error)?;
        serde_wasm_bindgen::to_value(&state)
            .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
    }

    // === Popovers ===

    #[wasm_bindgen(js_name = popoverAction)]
    pub fn popover_action(&self, name: &str) -> Result<JsPopoverOutcome, JsError> {
        let outcome = self.editor()?.popover_action(name).map_err(js_error)?;
        Ok(outcome.into())
    }

    /// Hand over the placement object for the popover just shown.
    #[wasm_bindgen(js_name = attachPositioner)]
    pub fn attach_positioner(&self, positioner: JsValue) -> Result<(), JsError> {
        self.editor()?
            .attach_positioner(Box::new(JsPositioner(positioner)));
        Ok(())
    }

    #[wasm_bindgen(js_name = removePopover)]
    pub fn remove_popover(&self) -> Result<bool, JsError> {
        Ok(self.editor()?.remove_popover())
    }

    /// Drag-resize step for the image under the popover.
    #[wasm_bindgen(js_name = resizeImage)]
    pub fn resize_image(&self, width: f64, finished: bool) -> Result<(), JsError> {
        self.editor()?
            .resize_image(width, finished)
            .map_err(js_error)
    }

    // === Forms ===

    #[wasm_bindgen(js_name = submitLink)]
    pub fn submit_link(&self, form: JsLinkForm) -> Result<(), JsError> {
        let form = LinkForm::from(form).validate().map_err(js_error)?;
        self.editor()?.submit_link(&form).map_err(js_error)
    }

    #[wasm_bindgen(js_name = submitImage)]
    pub fn submit_image(&self, url: &str) -> Result<(), JsError> {
        let src = forms::image_src(url).map_err(js_error)?;
        self.editor()?.insert_image(&src).map_err(js_error)?;
        Ok(())
    }

    #[wasm_bindgen(js_name = submitVideo)]
    pub fn submit_video(&self, url: &str) -> Result<(), JsError> {
        let video = VideoEmbed::parse(url).map_err(js_error)?;
        self.editor()?.insert_video(&video).map_err(js_error)
    }

    #[wasm_bindgen(js_name = insertTable)]
    pub fn insert_table(&self, rows: usize, cols: usize) -> Result<(), JsError> {
        self.editor()?.insert_table(rows, cols).map_err(js_error)
    }

    // === Undo/redo ===

    #[wasm_bindgen]
    pub fn undo(&self) -> Result<bool, JsError> {
        self.editor()?.undo().map_err(js_error)
    }

    #[wasm_bindgen]
    pub fn redo(&self) -> Result<bool, JsError> {
        self.editor()?.redo().map_err(js_error)
    }

    #[wasm_bindgen(js_name = canUndo)]
    pub fn can_undo(&self) -> Result<bool, JsError> {
        Ok(self.editor()?.history().can_undo())
    }

    #[wasm_bindgen(js_name = canRedo)]
    pub fn can_redo(&self) -> Result<bool, JsError> {
        Ok(self.editor()?.history().can_redo())
    }

    // === View and state ===

    /// Toggle the source view. Returns whether it is now showing.
    #[wasm_bindgen(js_name = toggleSource)]
    pub fn toggle_source(&self) -> Result<bool, JsError> {
        let mode = self.editor()?.toggle_source().map_err(js_error)?;
        Ok(mode.is_source())
    }

    #[wasm_bindgen(js_name = sourceText)]
    pub fn source_text(&self) -> Result<String, JsError> {
        Ok(self.editor()?.source_text().to_string())
    }

    #[wasm_bindgen]
    pub fn enable(&self) -> Result<(), JsError> {
        self.editor()?.enable();
        Ok(())
    }

    #[wasm_bindgen]
    pub fn disable(&self) -> Result<(), JsError> {
        self.editor()?.disable();
        Ok(())
    }

    /// Stop observing and remove the popover. The instance is inert after.
    #[wasm_bindgen]
    pub fn dispose(&self) -> Result<(), JsError> {
        self.editor()?.dispose();
        Ok(())
    }
}

// Internal methods (not exposed to JS)
impl JsEditor {
    fn editor(&self) -> Result<RefMut<'_, BrowserEditor>, JsError> {
        self.mounted
            .editor()
            .try_borrow_mut()
            .map_err(|_| JsError::new("editor is busy"))
    }
}
