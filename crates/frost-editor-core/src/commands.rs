//! The closed set of native editing commands.
//!
//! Every content-mutating operation goes out to the editing engine as one of
//! these. [`crate::Editor::execute`] is the facade that dispatches them.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::EditorError;

/// Block formats offered by the style dropdown and `formatBlock`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockTag {
    P,
    Blockquote,
    Pre,
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    Div,
}

impl BlockTag {
    /// The style dropdown entries, in display order.
    pub const STYLES: [BlockTag; 9] = [
        Self::P,
        Self::Blockquote,
        Self::Pre,
        Self::H1,
        Self::H2,
        Self::H3,
        Self::H4,
        Self::H5,
        Self::H6,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::P => "p",
            Self::Blockquote => "blockquote",
            Self::Pre => "pre",
            Self::H1 => "h1",
            Self::H2 => "h2",
            Self::H3 => "h3",
            Self::H4 => "h4",
            Self::H5 => "h5",
            Self::H6 => "h6",
            Self::Div => "div",
        }
    }

    /// Parse a tag name, accepting the `<h1>` form some engines report.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().trim_start_matches('<').trim_end_matches('>');
        Some(match s.to_ascii_lowercase().as_str() {
            "p" => Self::P,
            "blockquote" => Self::Blockquote,
            "pre" => Self::Pre,
            "h1" => Self::H1,
            "h2" => Self::H2,
            "h3" => Self::H3,
            "h4" => Self::H4,
            "h5" => Self::H5,
            "h6" => Self::H6,
            "div" => Self::Div,
            _ => return None,
        })
    }

    pub fn is_heading(self) -> bool {
        matches!(
            self,
            Self::H1 | Self::H2 | Self::H3 | Self::H4 | Self::H5 | Self::H6
        )
    }
}

/// Legacy `fontSize` level, 1 through 7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct FontSize(u8);

impl FontSize {
    pub fn new(level: u8) -> Option<Self> {
        (1..=7).contains(&level).then_some(Self(level))
    }

    pub fn level(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for FontSize {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::new(level).ok_or_else(|| format!("font size level {level} is not in 1..=7"))
    }
}

impl From<FontSize> for u8 {
    fn from(size: FontSize) -> u8 {
        size.0
    }
}

/// A native editing command with its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    BackColor(SmolStr),
    Bold,
    DefaultParagraphSeparator(BlockTag),
    FontName(SmolStr),
    FontSize(FontSize),
    ForeColor(SmolStr),
    FormatBlock(BlockTag),
    Indent,
    InsertHorizontalRule,
    InsertHtml(String),
    InsertOrderedList,
    InsertText(String),
    InsertUnorderedList,
    Italic,
    JustifyCenter,
    JustifyFull,
    JustifyLeft,
    JustifyRight,
    Outdent,
    RemoveFormat,
    Strikethrough,
    Subscript,
    Superscript,
    Underline,
    Unlink,
}

impl Command {
    /// The `execCommand` name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::BackColor(_) => "backColor",
            Self::Bold => "bold",
            Self::DefaultParagraphSeparator(_) => "defaultParagraphSeparator",
            Self::FontName(_) => "fontName",
            Self::FontSize(_) => "fontSize",
            Self::ForeColor(_) => "foreColor",
            Self::FormatBlock(_) => "formatBlock",
            Self::Indent => "indent",
            Self::InsertHorizontalRule => "insertHorizontalRule",
            Self::InsertHtml(_) => "insertHTML",
            Self::InsertOrderedList => "insertOrderedList",
            Self::InsertText(_) => "insertText",
            Self::InsertUnorderedList => "insertUnorderedList",
            Self::Italic => "italic",
            Self::JustifyCenter => "justifyCenter",
            Self::JustifyFull => "justifyFull",
            Self::JustifyLeft => "justifyLeft",
            Self::JustifyRight => "justifyRight",
            Self::Outdent => "outdent",
            Self::RemoveFormat => "removeFormat",
            Self::Strikethrough => "strikethrough",
            Self::Subscript => "subscript",
            Self::Superscript => "superscript",
            Self::Underline => "underline",
            Self::Unlink => "unlink",
        }
    }

    /// The `execCommand` value argument.
    pub fn value(&self) -> Option<String> {
        match self {
            Self::BackColor(v) | Self::FontName(v) | Self::ForeColor(v) => Some(v.to_string()),
            Self::DefaultParagraphSeparator(tag) | Self::FormatBlock(tag) => {
                Some(tag.as_str().to_string())
            }
            Self::FontSize(size) => Some(size.level().to_string()),
            Self::InsertHtml(v) | Self::InsertText(v) => Some(v.clone()),
            _ => None,
        }
    }

    /// Whether the engine should style with inline CSS rather than
    /// presentational markup for this command.
    pub fn styles_with_css(&self) -> bool {
        matches!(
            self,
            Self::BackColor(_) | Self::FontName(_) | Self::FontSize(_) | Self::ForeColor(_)
        )
    }

    pub fn is_list_insertion(&self) -> bool {
        matches!(self, Self::InsertOrderedList | Self::InsertUnorderedList)
    }

    /// Build a command from its native name and value.
    pub fn parse(name: &str, value: Option<&str>) -> Result<Self, EditorError> {
        fn required<'v>(
            command: &'static str,
            value: Option<&'v str>,
        ) -> Result<&'v str, EditorError> {
            value.ok_or(EditorError::MissingValue(command))
        }
        fn block(command: &'static str, value: Option<&str>) -> Result<BlockTag, EditorError> {
            let raw = required(command, value)?;
            BlockTag::parse(raw).ok_or_else(|| EditorError::InvalidValue {
                command,
                value: raw.to_string(),
            })
        }

        Ok(match name {
            "backColor" => Self::BackColor(required("backColor", value)?.into()),
            "bold" => Self::Bold,
            "defaultParagraphSeparator" => {
                Self::DefaultParagraphSeparator(block("defaultParagraphSeparator", value)?)
            }
            "fontName" => Self::FontName(required("fontName", value)?.into()),
            "fontSize" => {
                let raw = required("fontSize", value)?;
                let size = raw
                    .trim()
                    .parse::<u8>()
                    .ok()
                    .and_then(FontSize::new)
                    .ok_or_else(|| EditorError::InvalidValue {
                        command: "fontSize",
                        value: raw.to_string(),
                    })?;
                Self::FontSize(size)
            }
            "foreColor" => Self::ForeColor(required("foreColor", value)?.into()),
            "formatBlock" => Self::FormatBlock(block("formatBlock", value)?),
            "indent" => Self::Indent,
            "insertHorizontalRule" => Self::InsertHorizontalRule,
            "insertHTML" => Self::InsertHtml(required("insertHTML", value)?.to_string()),
            "insertOrderedList" => Self::InsertOrderedList,
            "insertText" => Self::InsertText(required("insertText", value)?.to_string()),
            "insertUnorderedList" => Self::InsertUnorderedList,
            "italic" => Self::Italic,
            "justifyCenter" => Self::JustifyCenter,
            "justifyFull" => Self::JustifyFull,
            "justifyLeft" => Self::JustifyLeft,
            "justifyRight" => Self::JustifyRight,
            "outdent" => Self::Outdent,
            "removeFormat" => Self::RemoveFormat,
            "strikethrough" => Self::Strikethrough,
            "subscript" => Self::Subscript,
            "superscript" => Self::Superscript,
            "underline" => Self::Underline,
            "unlink" => Self::Unlink,
            other => return Err(EditorError::UnknownCommand(other.into())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_name_and_value() {
        let cases = [
            ("bold", None),
            ("foreColor", Some("rgb(255, 0, 0)")),
            ("fontSize", Some("5")),
            ("formatBlock", Some("h2")),
            ("insertHTML", Some("<hr>")),
        ];
        for (name, value) in cases {
            let command = Command::parse(name, value).unwrap();
            assert_eq!(command.name(), name);
            assert_eq!(command.value().as_deref(), value);
        }
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert_eq!(
            Command::parse("explode", None),
            Err(EditorError::UnknownCommand("explode".into()))
        );
        assert_eq!(
            Command::parse("fontName", None),
            Err(EditorError::MissingValue("fontName"))
        );
        assert!(matches!(
            Command::parse("fontSize", Some("9")),
            Err(EditorError::InvalidValue { command: "fontSize", .. })
        ));
        assert!(matches!(
            Command::parse("formatBlock", Some("table")),
            Err(EditorError::InvalidValue { .. })
        ));
    }

    #[test]
    fn css_mode_and_list_flags() {
        assert!(Command::ForeColor("red".into()).styles_with_css());
        assert!(Command::FontSize(FontSize::new(3).unwrap()).styles_with_css());
        assert!(!Command::Bold.styles_with_css());
        assert!(Command::InsertOrderedList.is_list_insertion());
        assert!(!Command::Indent.is_list_insertion());
    }

    #[test]
    fn block_tags_parse_engine_forms() {
        assert_eq!(BlockTag::parse("<H3>"), Some(BlockTag::H3));
        assert_eq!(BlockTag::parse("p"), Some(BlockTag::P));
        assert_eq!(BlockTag::parse(""), None);
        assert!(BlockTag::H6.is_heading());
    }
}
