//! Error types for the editor core.

use miette::Diagnostic;
use smol_str::SmolStr;

/// Errors from editor operations.
///
/// These are programming or configuration errors (an unknown toolbar name,
/// a malformed command value). Unsupported native commands are not errors;
/// the editing engine absorbs them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Diagnostic)]
#[non_exhaustive]
pub enum EditorError {
    /// A toolbar or popover control named an action the registry lacks.
    #[error("unknown action `{0}`")]
    #[diagnostic(
        code(frost::unknown_action),
        help("check the toolbar and popover layouts against the registry")
    )]
    UnknownAction(SmolStr),

    /// A native command name outside the supported vocabulary.
    #[error("unknown command `{0}`")]
    #[diagnostic(code(frost::unknown_command))]
    UnknownCommand(SmolStr),

    /// The command needs a value and none was given.
    #[error("command `{0}` requires a value")]
    #[diagnostic(code(frost::missing_value))]
    MissingValue(&'static str),

    /// The value given for a command could not be interpreted.
    #[error("invalid value `{value}` for `{command}`")]
    #[diagnostic(code(frost::invalid_value))]
    InvalidValue {
        command: &'static str,
        value: String,
    },

    /// Options failed validation.
    #[error("invalid options: {0}")]
    #[diagnostic(code(frost::invalid_options))]
    InvalidOptions(String),

    /// A popover action was requested with no popover open.
    #[error("no popover is open")]
    #[diagnostic(code(frost::no_popover))]
    NoPopover,

    /// The editor was disposed.
    #[error("editor has been disposed")]
    #[diagnostic(code(frost::disposed))]
    Disposed,

    /// The host environment refused an operation.
    #[error("platform error: {0}")]
    #[diagnostic(code(frost::platform))]
    Platform(String),
}

impl From<crate::platform::PlatformError> for EditorError {
    fn from(err: crate::platform::PlatformError) -> Self {
        Self::Platform(err.0)
    }
}

/// Validation failures in the link/video forms.
///
/// Reported inline next to the field; the form stays open.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Diagnostic)]
#[non_exhaustive]
pub enum FormError {
    /// Not a recognised video page URL.
    #[error("`{0}` is not a supported video URL")]
    #[diagnostic(code(frost::form::invalid_video_url))]
    InvalidVideoUrl(String),

    /// The URL field is empty.
    #[error("a URL is required")]
    #[diagnostic(code(frost::form::empty_url))]
    EmptyUrl,
}
