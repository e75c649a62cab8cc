//! Editor options and their resolution.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::commands::{BlockTag, FontSize};
use crate::error::EditorError;
use crate::history::DEFAULT_HISTORY_LIMIT;
use crate::registry::Registry;

/// One slot in a toolbar or popover layout: a single name or a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LayoutEntry {
    Item(SmolStr),
    Group(Vec<SmolStr>),
}

impl LayoutEntry {
    pub fn group(names: &[&str]) -> Self {
        Self::Group(names.iter().map(|n| SmolStr::new(n)).collect())
    }

    pub fn names(&self) -> &[SmolStr] {
        match self {
            Self::Item(name) => std::slice::from_ref(name),
            Self::Group(names) => names,
        }
    }
}

fn flatten(entries: &[LayoutEntry]) -> impl Iterator<Item = &SmolStr> {
    entries.iter().flat_map(LayoutEntry::names)
}

/// Popover item layouts per tracked element kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopoverLayouts {
    pub image: Vec<LayoutEntry>,
    pub link: Vec<LayoutEntry>,
    pub table: Vec<LayoutEntry>,
}

impl Default for PopoverLayouts {
    fn default() -> Self {
        Self {
            image: vec![
                LayoutEntry::group(&["imageFull", "imageHalf", "imageQuarter", "imageOriginal"]),
                LayoutEntry::group(&["floatLeft", "floatRight", "floatNone"]),
                LayoutEntry::group(&["imageRemove"]),
            ],
            link: vec![
                LayoutEntry::Item("link".into()),
                LayoutEntry::group(&["linkEdit"]),
                LayoutEntry::group(&["unlink"]),
            ],
            table: vec![
                LayoutEntry::group(&[
                    "tableRowAfter",
                    "tableRowBefore",
                    "tableColumnBefore",
                    "tableColumnAfter",
                ]),
                LayoutEntry::group(&["tableRowRemove", "tableColumnRemove", "tableRemove"]),
            ],
        }
    }
}

/// Per-instance editor options.
///
/// Every field has a default, so a partial JSON object deserializes onto the
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorOptions {
    pub buttons: Vec<LayoutEntry>,
    pub popovers: PopoverLayouts,
    pub default_font: String,
    pub fonts: Vec<String>,
    /// Pixel size of each `fontSize` level, 1 through 7.
    pub font_sizes: [u32; 7],
    pub styles: Vec<BlockTag>,
    pub height: String,
    pub resizable: bool,
    pub history_limit: usize,
    pub shortcuts: bool,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            buttons: vec![
                LayoutEntry::group(&["style"]),
                LayoutEntry::group(&["bold", "italic", "underline", "removeFormat"]),
                LayoutEntry::group(&["font"]),
                LayoutEntry::group(&["color"]),
                LayoutEntry::group(&["unorderedList", "orderedList", "paragraph"]),
                LayoutEntry::group(&["table"]),
                LayoutEntry::group(&["link", "image", "video"]),
                LayoutEntry::group(&["undo", "redo"]),
                LayoutEntry::group(&["fullScreen", "source"]),
            ],
            popovers: PopoverLayouts::default(),
            default_font: "Arial".to_string(),
            fonts: [
                "Arial",
                "Arial Black",
                "Courier New",
                "Georgia",
                "Helvetica",
                "Impact",
                "Tahoma",
                "Times New Roman",
                "Trebuchet MS",
                "Verdana",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            font_sizes: [8, 13, 16, 18, 24, 32, 48],
            styles: BlockTag::STYLES.to_vec(),
            height: "auto".to_string(),
            resizable: true,
            history_limit: DEFAULT_HISTORY_LIMIT,
            shortcuts: true,
        }
    }
}

impl EditorOptions {
    pub fn font_size_px(&self, size: FontSize) -> u32 {
        self.font_sizes[usize::from(size.level()) - 1]
    }

    /// The level whose pixel size is exactly `px`.
    pub fn font_size_for_px(&self, px: u32) -> Option<FontSize> {
        let index = self.font_sizes.iter().position(|&size| size == px)?;
        u8::try_from(index + 1).ok().and_then(FontSize::new)
    }

    /// Every toolbar button name in layout order.
    pub fn button_names(&self) -> impl Iterator<Item = &SmolStr> {
        flatten(&self.buttons)
    }
}

/// Validates and completes options against a registry and the fonts the
/// host can render.
pub struct OptionsResolver<'a> {
    registry: &'a Registry,
    font_available: Box<dyn Fn(&str) -> bool + 'a>,
}

impl<'a> OptionsResolver<'a> {
    /// A resolver that treats every font as available.
    pub fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            font_available: Box::new(|_| true),
        }
    }

    pub fn with_font_check(mut self, check: impl Fn(&str) -> bool + 'a) -> Self {
        self.font_available = Box::new(check);
        self
    }

    pub fn resolve(&self, mut options: EditorOptions) -> Result<EditorOptions, EditorError> {
        if options.history_limit == 0 {
            return Err(EditorError::InvalidOptions(
                "historyLimit must be at least 1".to_string(),
            ));
        }
        for name in options.button_names() {
            self.registry.button(name)?;
        }
        let popovers = &options.popovers;
        for name in flatten(&popovers.image)
            .chain(flatten(&popovers.link))
            .chain(flatten(&popovers.table))
        {
            self.registry.popover_item(name)?;
        }

        options.fonts.retain(|font| (self.font_available)(font));
        if !options.fonts.contains(&options.default_font) {
            if let Some(first) = options.fonts.first() {
                tracing::debug!(
                    default = %options.default_font,
                    fallback = %first,
                    "default font unavailable"
                );
                options.default_font = first.clone();
            }
        }
        options.fonts.sort();
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_merges_onto_defaults() {
        let options: EditorOptions =
            serde_json::from_str(r#"{"historyLimit": 5, "buttons": [["bold"], "italic"]}"#).unwrap();
        assert_eq!(options.history_limit, 5);
        assert_eq!(options.default_font, "Arial");
        assert_eq!(
            options.buttons,
            vec![LayoutEntry::group(&["bold"]), LayoutEntry::Item("italic".into())]
        );
        assert_eq!(options.popovers, PopoverLayouts::default());
    }

    #[test]
    fn font_size_table() {
        let options = EditorOptions::default();
        assert_eq!(options.font_size_px(FontSize::new(3).unwrap()), 16);
        assert_eq!(options.font_size_for_px(48), FontSize::new(7));
        assert_eq!(options.font_size_for_px(17), None);
    }

    #[test]
    fn defaults_resolve_against_standard_registry() {
        let registry = Registry::standard();
        let options = OptionsResolver::new(&registry)
            .resolve(EditorOptions::default())
            .unwrap();
        assert_eq!(options.default_font, "Arial");
    }

    #[test]
    fn unknown_layout_names_are_rejected() {
        let registry = Registry::standard();
        let resolver = OptionsResolver::new(&registry);
        let mut options = EditorOptions::default();
        options.buttons.push(LayoutEntry::Item("sparkle".into()));
        assert_eq!(
            resolver.resolve(options),
            Err(EditorError::UnknownAction("sparkle".into()))
        );

        let mut options = EditorOptions::default();
        options.popovers.table.push(LayoutEntry::Item("tableSpin".into()));
        assert!(resolver.resolve(options).is_err());
    }

    #[test]
    fn unavailable_default_font_falls_back() {
        let registry = Registry::standard();
        let options = OptionsResolver::new(&registry)
            .with_font_check(|font| font.starts_with('T'))
            .resolve(EditorOptions::default())
            .unwrap();
        assert_eq!(options.fonts, vec!["Tahoma", "Times New Roman", "Trebuchet MS"]);
        assert_eq!(options.default_font, "Tahoma");
    }

    #[test]
    fn zero_history_limit_is_invalid() {
        let registry = Registry::standard();
        let options = EditorOptions {
            history_limit: 0,
            ..EditorOptions::default()
        };
        assert!(matches!(
            OptionsResolver::new(&registry).resolve(options),
            Err(EditorError::InvalidOptions(_))
        ));
    }
}
