//! `MutationObserver`-backed mutation source.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{MutationObserver, MutationObserverInit, Node};

use frost_editor_core::{MutationSource, PlatformError};

type RecordsCallback = Closure<dyn FnMut(js_sys::Array, MutationObserver)>;

/// Watches the editable root's subtree: children, character data and
/// attributes.
pub struct BrowserObserver {
    observer: MutationObserver,
    target: Node,
    _callback: RecordsCallback,
}

impl BrowserObserver {
    /// `on_records` receives the number of records in each delivered batch.
    pub fn new(
        target: &Node,
        mut on_records: impl FnMut(usize) + 'static,
    ) -> Result<Self, PlatformError> {
        let callback: RecordsCallback =
            Closure::wrap(Box::new(move |records: js_sys::Array, _: MutationObserver| {
                on_records(records.length() as usize);
            }) as Box<dyn FnMut(js_sys::Array, MutationObserver)>);
        let observer = MutationObserver::new(callback.as_ref().unchecked_ref())
            .map_err(|e| format!("MutationObserver failed: {:?}", e))?;
        Ok(Self {
            observer,
            target: target.clone(),
            _callback: callback,
        })
    }
}

impl MutationSource for BrowserObserver {
    fn observe(&mut self) {
        let init = MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(true);
        init.set_character_data(true);
        init.set_attributes(true);
        if let Err(err) = self.observer.observe_with_options(&self.target, &init) {
            tracing::warn!(target: "frost::gate", ?err, "observe failed");
        }
    }

    /// Pending records are taken before disconnecting, which would drop them.
    fn disconnect(&mut self) -> usize {
        let pending = self.observer.take_records().length() as usize;
        self.observer.disconnect();
        pending
    }
}

impl Drop for BrowserObserver {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}
