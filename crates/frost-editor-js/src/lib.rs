//! WASM bindings for the frost rich-text editor.
//!
//! Provides the `JsEditor` component for JavaScript/TypeScript apps. The
//! rendering layer (toolbar, dropdowns, forms, popovers) stays in JS and
//! drives the editor through its methods and callbacks.

mod editor;
mod types;

pub use editor::*;
pub use types::*;

use wasm_bindgen::prelude::*;

use frost_editor_browser::{Point, popover};

/// Initialize panic hook and console logging.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    use tracing::Level;
    use tracing::subscriber::set_global_default;
    use tracing_subscriber::Registry;
    use tracing_subscriber::layer::SubscriberExt;

    let console_level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let wasm_layer = tracing_wasm::WASMLayer::new(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(console_level)
            .build(),
    );

    // A host page may have installed its own subscriber already.
    let _ = set_global_default(Registry::default().with(wasm_layer));
}

/// Width for an image being drag-resized from its bottom-right corner.
#[wasm_bindgen(js_name = imageResizeWidth)]
pub fn image_resize_width(
    pointer_x: f64,
    pointer_y: f64,
    left: f64,
    top: f64,
    aspect_ratio: f64,
) -> f64 {
    popover::image_resize_width(
        Point {
            x: pointer_x,
            y: pointer_y,
        },
        left,
        top,
        aspect_ratio,
    )
}
