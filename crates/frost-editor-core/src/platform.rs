//! Platform abstraction traits for editor operations.
//!
//! These traits define the interface between the editor logic and the host
//! environment: the live selection and focus, the native editing engine, and
//! the form control the editor enhances. The browser implementation lives in
//! `frost-editor-browser`; [`crate::headless::HeadlessHost`] implements them
//! in memory.

use crate::dom::DomNode;
use crate::events::EditorEvent;
use crate::selection::DomSelection;

/// Error type for platform operations.
#[derive(Debug, Clone)]
pub struct PlatformError(pub String);

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for PlatformError {}

impl From<&str> for PlatformError {
    fn from(s: &str) -> Self {
        PlatformError(s.to_string())
    }
}

impl From<String> for PlatformError {
    fn from(s: String) -> Self {
        PlatformError(s)
    }
}

/// Live selection and focus.
pub trait SelectionPlatform {
    type Node: DomNode;

    /// The current document selection, if any.
    fn selection(&self) -> Option<DomSelection<Self::Node>>;

    fn set_selection(&self, selection: &DomSelection<Self::Node>);

    fn clear_selection(&self);

    /// True when the active element is `root` or inside it.
    fn has_focus_within(&self, root: &Self::Node) -> bool;

    fn focus(&self, root: &Self::Node);

    /// Replace the selected contents with `node` and put the caret after it.
    ///
    /// Without a selection inside `root`, `node` is appended to `root`.
    fn insert_node(&self, root: &Self::Node, node: &Self::Node) -> Result<(), PlatformError>;
}

/// The native editing engine (`execCommand` and friends).
///
/// Unsupported commands are absorbed by the engine; nothing here reports them.
pub trait EditingPlatform {
    fn exec_command(&self, command: &str, value: Option<&str>) -> bool;

    fn query_command_state(&self, command: &str) -> bool;

    fn query_command_value(&self, command: &str) -> Option<String>;

    /// Computed font size of the editable root in px.
    fn root_font_size(&self) -> Option<f64> {
        None
    }
}

/// The form control being enhanced.
pub trait HostInput {
    fn value(&self) -> String;

    fn set_value(&self, value: &str);

    fn set_disabled(&self, disabled: bool);

    /// Dispatch an editor event on the control for host page listeners.
    fn dispatch(&self, event: EditorEvent);
}

/// Everything an [`crate::Editor`] needs from its environment.
pub trait EditorHost: SelectionPlatform + EditingPlatform + HostInput {}

impl<T> EditorHost for T where T: SelectionPlatform + EditingPlatform + HostInput {}
