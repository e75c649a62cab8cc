//! Toolbar and popover registry.
//!
//! Built once, immutable afterwards, and shared between editor instances
//! through an `Arc`. The rendering layer iterates it to build controls; the
//! editor resolves control names through it.

use std::collections::BTreeMap;

use smol_str::SmolStr;

use crate::commands::Command;
use crate::config::LayoutEntry;
use crate::error::EditorError;

/// Toolbar actions that are not plain native commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    FullScreen,
    Image,
    Link,
    Redo,
    Source,
    Undo,
    Video,
}

impl ActionKind {
    /// Stays enabled while the source view is showing.
    pub fn allowed_in_source_view(self) -> bool {
        matches!(self, Self::Source | Self::FullScreen)
    }
}

/// Dropdown menus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropdownKind {
    Color,
    Font,
    FontSize,
    Style,
    Table,
    /// A nested group of other toolbar buttons.
    Buttons(Vec<LayoutEntry>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonBehavior {
    Command(Command),
    Action(ActionKind),
    Dropdown(DropdownKind),
}

/// Content a button derives from the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynamicContent {
    Color,
    Font,
    FontSize,
}

/// When a button is disabled beyond the editor-wide conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisableCheck {
    /// The current block is something other than a plain paragraph.
    NotInParagraph,
    /// The selection is inside a list.
    InList,
    NoUndo,
    NoRedo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonSpec {
    pub behavior: ButtonBehavior,
    pub content: Option<DynamicContent>,
    pub disable: Option<DisableCheck>,
}

impl ButtonSpec {
    fn command(command: Command) -> Self {
        Self {
            behavior: ButtonBehavior::Command(command),
            content: None,
            disable: None,
        }
    }

    fn action(kind: ActionKind) -> Self {
        Self {
            behavior: ButtonBehavior::Action(kind),
            content: None,
            disable: None,
        }
    }

    fn dropdown(kind: DropdownKind) -> Self {
        Self {
            behavior: ButtonBehavior::Dropdown(kind),
            content: None,
            disable: None,
        }
    }

    fn with_content(mut self, content: DynamicContent) -> Self {
        self.content = Some(content);
        self
    }

    fn disabled_when(mut self, check: DisableCheck) -> Self {
        self.disable = Some(check);
        self
    }

    /// Source view and fullscreen stay usable while the source is showing.
    pub fn allowed_in_source_view(&self) -> bool {
        matches!(self.behavior, ButtonBehavior::Action(kind) if kind.allowed_in_source_view())
    }
}

/// Actions offered inside popovers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PopoverAction {
    FloatLeft,
    FloatRight,
    FloatNone,
    ImageFull,
    ImageHalf,
    ImageQuarter,
    ImageOriginal,
    ImageRemove,
    LinkEdit,
    Unlink,
    TableColumnAfter,
    TableColumnBefore,
    TableColumnRemove,
    TableRemove,
    TableRowAfter,
    TableRowBefore,
    TableRowRemove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopoverItem {
    /// Shows the link target; not clickable.
    LinkPreview,
    Action(PopoverAction),
}

/// Name → behavior tables for toolbar buttons and popover items.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    buttons: BTreeMap<SmolStr, ButtonSpec>,
    popover_items: BTreeMap<SmolStr, PopoverItem>,
}

impl Registry {
    /// The standard button and popover vocabulary.
    pub fn standard() -> Self {
        use ActionKind as A;
        use PopoverAction as P;

        let mut buttons = BTreeMap::new();
        let mut button = |name: &str, spec: ButtonSpec| {
            buttons.insert(SmolStr::new(name), spec);
        };

        button("alignCenter", ButtonSpec::command(Command::JustifyCenter));
        button("alignJustify", ButtonSpec::command(Command::JustifyFull));
        button("alignLeft", ButtonSpec::command(Command::JustifyLeft));
        button("alignRight", ButtonSpec::command(Command::JustifyRight));
        button("bold", ButtonSpec::command(Command::Bold));
        button("hr", ButtonSpec::command(Command::InsertHorizontalRule));
        button("indent", ButtonSpec::command(Command::Indent));
        button("italic", ButtonSpec::command(Command::Italic));
        button(
            "orderedList",
            ButtonSpec::command(Command::InsertOrderedList)
                .disabled_when(DisableCheck::NotInParagraph),
        );
        button("outdent", ButtonSpec::command(Command::Outdent));
        button("removeFormat", ButtonSpec::command(Command::RemoveFormat));
        button("strikethrough", ButtonSpec::command(Command::Strikethrough));
        button("subscript", ButtonSpec::command(Command::Subscript));
        button("superscript", ButtonSpec::command(Command::Superscript));
        button("underline", ButtonSpec::command(Command::Underline));
        button("unlink", ButtonSpec::command(Command::Unlink));
        button(
            "unorderedList",
            ButtonSpec::command(Command::InsertUnorderedList)
                .disabled_when(DisableCheck::NotInParagraph),
        );

        button("fullScreen", ButtonSpec::action(A::FullScreen));
        button("image", ButtonSpec::action(A::Image));
        button("link", ButtonSpec::action(A::Link));
        button("redo", ButtonSpec::action(A::Redo).disabled_when(DisableCheck::NoRedo));
        button("source", ButtonSpec::action(A::Source));
        button("undo", ButtonSpec::action(A::Undo).disabled_when(DisableCheck::NoUndo));
        button("video", ButtonSpec::action(A::Video));

        button(
            "color",
            ButtonSpec::dropdown(DropdownKind::Color).with_content(DynamicContent::Color),
        );
        button(
            "font",
            ButtonSpec::dropdown(DropdownKind::Font).with_content(DynamicContent::Font),
        );
        button(
            "fontSize",
            ButtonSpec::dropdown(DropdownKind::FontSize).with_content(DynamicContent::FontSize),
        );
        button(
            "paragraph",
            ButtonSpec::dropdown(DropdownKind::Buttons(vec![
                LayoutEntry::group(&["alignLeft", "alignCenter", "alignRight", "alignJustify"]),
                LayoutEntry::group(&["indent", "outdent"]),
            ])),
        );
        button(
            "style",
            ButtonSpec::dropdown(DropdownKind::Style).disabled_when(DisableCheck::InList),
        );
        button("table", ButtonSpec::dropdown(DropdownKind::Table));

        let popover_items = [
            ("link", PopoverItem::LinkPreview),
            ("floatLeft", PopoverItem::Action(P::FloatLeft)),
            ("floatRight", PopoverItem::Action(P::FloatRight)),
            ("floatNone", PopoverItem::Action(P::FloatNone)),
            ("imageFull", PopoverItem::Action(P::ImageFull)),
            ("imageHalf", PopoverItem::Action(P::ImageHalf)),
            ("imageQuarter", PopoverItem::Action(P::ImageQuarter)),
            ("imageOriginal", PopoverItem::Action(P::ImageOriginal)),
            ("imageRemove", PopoverItem::Action(P::ImageRemove)),
            ("linkEdit", PopoverItem::Action(P::LinkEdit)),
            ("unlink", PopoverItem::Action(P::Unlink)),
            ("tableColumnAfter", PopoverItem::Action(P::TableColumnAfter)),
            ("tableColumnBefore", PopoverItem::Action(P::TableColumnBefore)),
            ("tableColumnRemove", PopoverItem::Action(P::TableColumnRemove)),
            ("tableRemove", PopoverItem::Action(P::TableRemove)),
            ("tableRowAfter", PopoverItem::Action(P::TableRowAfter)),
            ("tableRowBefore", PopoverItem::Action(P::TableRowBefore)),
            ("tableRowRemove", PopoverItem::Action(P::TableRowRemove)),
        ]
        .into_iter()
        .map(|(name, item)| (SmolStr::new(name), item))
        .collect();

        Self {
            buttons,
            popover_items,
        }
    }

    /// Add or replace a toolbar button before the registry is shared.
    pub fn with_button(mut self, name: &str, spec: ButtonSpec) -> Self {
        self.buttons.insert(SmolStr::new(name), spec);
        self
    }

    pub fn button(&self, name: &str) -> Result<&ButtonSpec, EditorError> {
        self.buttons
            .get(name)
            .ok_or_else(|| EditorError::UnknownAction(name.into()))
    }

    pub fn popover_item(&self, name: &str) -> Result<PopoverItem, EditorError> {
        self.popover_items
            .get(name)
            .copied()
            .ok_or_else(|| EditorError::UnknownAction(name.into()))
    }

    /// Buttons in name order.
    pub fn buttons(&self) -> impl Iterator<Item = (&SmolStr, &ButtonSpec)> {
        self.buttons.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups() {
        let registry = Registry::standard();
        assert_eq!(
            registry.button("bold").unwrap().behavior,
            ButtonBehavior::Command(Command::Bold)
        );
        assert_eq!(
            registry.popover_item("tableRowAfter").unwrap(),
            PopoverItem::Action(PopoverAction::TableRowAfter)
        );
        assert_eq!(
            registry.button("nope"),
            Err(EditorError::UnknownAction("nope".into()))
        );
        assert!(registry.popover_item("bold").is_err());
    }

    #[test]
    fn source_view_exemptions() {
        let registry = Registry::standard();
        assert!(registry.button("source").unwrap().allowed_in_source_view());
        assert!(registry.button("fullScreen").unwrap().allowed_in_source_view());
        assert!(!registry.button("bold").unwrap().allowed_in_source_view());
        assert!(!registry.button("undo").unwrap().allowed_in_source_view());
    }

    #[test]
    fn paragraph_dropdown_refers_to_known_buttons() {
        let registry = Registry::standard();
        let ButtonBehavior::Dropdown(DropdownKind::Buttons(groups)) =
            &registry.button("paragraph").unwrap().behavior
        else {
            panic!("paragraph should be a button group");
        };
        for name in groups.iter().flat_map(LayoutEntry::names) {
            assert!(registry.button(name).is_ok(), "{name}");
        }
    }
}
