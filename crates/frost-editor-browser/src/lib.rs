//! Browser DOM layer for the frost rich-text editor.
//!
//! Implements the core's host traits over `web-sys` and wires DOM events
//! into an [`Editor`]. Assumes a `wasm32-unknown-unknown` target.
//!
//! # Architecture
//!
//! - `dom`: `BrowserNode`, the `DomNode` handle over `web_sys::Node`
//! - `host`: selection, `execCommand` and the enhanced textarea
//! - `observer`: `MutationObserver` as the gate's mutation source
//! - `style`: computed-style resolution for style pruning
//! - `events`: beforeinput, keydown, click and source-view key handling
//! - `mount`: listener wiring and the debounced source gutter
//!
//! # Re-exports
//!
//! This crate re-exports `frost-editor-core` for convenience, so consumers
//! only need to depend on `frost-editor-browser`.

// Re-export core crate
pub use frost_editor_core;
pub use frost_editor_core::*;

pub mod dom;
pub mod events;
pub mod host;
pub mod mount;
pub mod observer;
pub mod style;

pub use dom::BrowserNode;
pub use host::BrowserHost;
pub use mount::{EditorElements, MountHooks, MountedEditor, mount};
pub use observer::BrowserObserver;
pub use style::ComputedStyleResolver;

/// An editor running against the live page.
pub type BrowserEditor = Editor<BrowserHost, BrowserObserver>;
