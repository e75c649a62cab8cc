//! Events dispatched on the host input and input-event classification.

use smol_str::SmolStr;

/// Lifecycle and change notifications for host page listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorEvent {
    Init,
    Change,
    Focus,
    Blur,
}

impl EditorEvent {
    /// Event type name as dispatched on the host input.
    pub fn name(self) -> &'static str {
        match self {
            Self::Init => "init.ui.editor",
            Self::Change => "change.ui.editor",
            Self::Focus => "focus.ui.editor",
            Self::Blur => "blur.ui.editor",
        }
    }
}

/// Type of a `beforeinput`/`input` event, from its `inputType` field.
///
/// Only the kinds the editor reacts to get their own variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputType {
    InsertText,
    InsertParagraph,
    InsertLineBreak,
    InsertFromPaste,
    InsertFromDrop,
    DeleteContentBackward,
    DeleteContentForward,
    FormatBold,
    FormatItalic,
    FormatUnderline,
    HistoryUndo,
    HistoryRedo,
    Unknown(SmolStr),
}

impl InputType {
    /// Parse a browser `inputType` string.
    pub fn parse(s: &str) -> Self {
        match s {
            "insertText" => Self::InsertText,
            "insertParagraph" => Self::InsertParagraph,
            "insertLineBreak" => Self::InsertLineBreak,
            "insertFromPaste" => Self::InsertFromPaste,
            "insertFromDrop" => Self::InsertFromDrop,
            "deleteContentBackward" => Self::DeleteContentBackward,
            "deleteContentForward" => Self::DeleteContentForward,
            "formatBold" => Self::FormatBold,
            "formatItalic" => Self::FormatItalic,
            "formatUnderline" => Self::FormatUnderline,
            "historyUndo" => Self::HistoryUndo,
            "historyRedo" => Self::HistoryRedo,
            other => Self::Unknown(SmolStr::new(other)),
        }
    }

    /// Native undo/redo, which the history stack takes over.
    pub fn is_history(&self) -> bool {
        matches!(self, Self::HistoryUndo | Self::HistoryRedo)
    }

    /// Plain typing skips the normalizer.
    pub fn skips_normalize(&self) -> bool {
        matches!(self, Self::InsertText)
    }
}

/// What the platform should do with a `beforeinput` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeforeInputResult {
    /// The editor handled it, prevent the native action.
    Handled,
    /// Let the native engine apply it.
    PassThrough,
}
