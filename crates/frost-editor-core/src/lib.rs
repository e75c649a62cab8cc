//! frost-editor-core: rich-text editor logic without a browser dependency.
//!
//! This crate provides:
//! - `DomNode` - host DOM abstraction, with a kuchiki-backed headless backend
//! - Selection codec: index paths and normalization markers
//! - `Normalizer` - the four-pass DOM cleanup
//! - `ObserveGate` - re-entrant mutation observation suppression
//! - `History` - bounded undo/redo of serialized content
//! - `Editor<H, O>` - command facade, reactive pipeline, toolbar and popover state

pub mod commands;
pub mod config;
pub mod dom;
pub mod editor;
pub mod error;
pub mod events;
pub mod forms;
pub mod gate;
pub mod headless;
pub mod history;
pub mod keys;
pub mod normalize;
pub mod platform;
pub mod popover;
pub mod registry;
pub mod selection;
pub mod source;
pub mod style;
pub mod toolbar;

pub use commands::{BlockTag, Command, FontSize};
pub use config::{EditorOptions, LayoutEntry, OptionsResolver, PopoverLayouts};
pub use dom::{Boundary, DomNode, NodeKind};
pub use editor::{Editor, FormRequest, Lifecycle, PLACEHOLDER, PopoverOutcome, ToolbarOutcome};
pub use error::{EditorError, FormError};
pub use events::{BeforeInputResult, EditorEvent, InputType};
pub use forms::{LinkForm, VideoEmbed};
pub use gate::{MutationSource, ObserveGate};
pub use headless::{HeadlessDocument, HeadlessHost, HeadlessObserver, normalize_html};
pub use history::{DEFAULT_HISTORY_LIMIT, History, HistoryEntry};
pub use keys::{Key, KeyCombo, KeydownResult, Modifiers, Shortcut};
pub use normalize::Normalizer;
pub use platform::{EditingPlatform, EditorHost, HostInput, PlatformError, SelectionPlatform};
pub use popover::{Anchor, Point, PopoverChange, PopoverKind, PopoverTracker, PopoverView, Positioner};
pub use registry::{ActionKind, ButtonBehavior, ButtonSpec, DropdownKind, PopoverAction, Registry};
pub use selection::{DomSelection, SelectionMarkers, SelectionSnapshot};
pub use smol_str::SmolStr;
pub use source::{SourceEdit, ViewMode};
pub use style::{CascadeResolver, StyleResolver};
pub use toolbar::{ButtonContent, ButtonState};
