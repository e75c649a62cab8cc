//! Toolbar state derivation.
//!
//! Pure reads of the editing engine's command state; writing the result onto
//! the rendered buttons is up to the rendering layer.

use serde::Serialize;
use smol_str::SmolStr;

use crate::commands::{BlockTag, FontSize};
use crate::config::{EditorOptions, LayoutEntry};
use crate::error::EditorError;
use crate::platform::EditingPlatform;
use crate::registry::{
    ButtonBehavior, ButtonSpec, DisableCheck, DropdownKind, DynamicContent, Registry,
};

/// Dynamic button content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ButtonContent {
    Text { text: String },
    Color {
        fore: Option<String>,
        back: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ButtonState {
    pub name: SmolStr,
    pub content: Option<ButtonContent>,
    pub active: bool,
    pub disabled: bool,
}

/// Editor state the toolbar depends on besides the engine.
#[derive(Debug, Clone, Copy)]
pub struct ToolbarContext<'a> {
    pub disabled: bool,
    pub source_view: bool,
    pub can_undo: bool,
    pub can_redo: bool,
    pub options: &'a EditorOptions,
}

fn in_list<E: EditingPlatform + ?Sized>(engine: &E) -> bool {
    engine.query_command_state("insertOrderedList")
        || engine.query_command_state("insertUnorderedList")
}

fn is_disabled_by<E: EditingPlatform + ?Sized>(
    check: DisableCheck,
    engine: &E,
    ctx: &ToolbarContext<'_>,
) -> bool {
    match check {
        DisableCheck::NotInParagraph => {
            let block = engine.query_command_value("formatBlock").unwrap_or_default();
            !(block.is_empty() || BlockTag::parse(&block) == Some(BlockTag::P))
        }
        DisableCheck::InList => in_list(engine),
        DisableCheck::NoUndo => !ctx.can_undo,
        DisableCheck::NoRedo => !ctx.can_redo,
    }
}

fn dynamic_content<E: EditingPlatform + ?Sized>(
    content: DynamicContent,
    engine: &E,
    options: &EditorOptions,
) -> Option<ButtonContent> {
    match content {
        DynamicContent::Color => Some(ButtonContent::Color {
            fore: engine.query_command_value("foreColor"),
            back: engine.query_command_value("backColor"),
        }),
        DynamicContent::Font => {
            let current = engine
                .query_command_value("fontName")
                .map(|name| name.replace('"', ""))
                .filter(|name| options.fonts.contains(name));
            Some(ButtonContent::Text {
                text: current.unwrap_or_else(|| options.default_font.clone()),
            })
        }
        DynamicContent::FontSize => {
            let from_level = engine
                .query_command_value("fontSize")
                .and_then(|level| level.trim().parse::<u8>().ok())
                .and_then(FontSize::new)
                .map(|size| options.font_size_px(size));
            let px = match from_level {
                Some(px) => px,
                None => engine.root_font_size()?.round() as u32,
            };
            Some(ButtonContent::Text {
                text: px.to_string(),
            })
        }
    }
}

/// Display state of one button.
pub fn button_state<E: EditingPlatform + ?Sized>(
    name: &str,
    spec: &ButtonSpec,
    engine: &E,
    ctx: &ToolbarContext<'_>,
) -> ButtonState {
    let active = match &spec.behavior {
        ButtonBehavior::Command(command) => match command.value() {
            Some(value) => {
                engine.query_command_value(command.name()).as_deref() == Some(value.as_str())
            }
            None => engine.query_command_state(command.name()),
        },
        _ => false,
    };
    let disabled = ctx.disabled
        || (ctx.source_view && !spec.allowed_in_source_view())
        || spec
            .disable
            .is_some_and(|check| is_disabled_by(check, engine, ctx));
    ButtonState {
        name: SmolStr::new(name),
        content: spec
            .content
            .and_then(|content| dynamic_content(content, engine, ctx.options)),
        active,
        disabled,
    }
}

/// States for every button in the configured layout, dropdown groups
/// included, in layout order.
pub fn refresh_toolbar<E: EditingPlatform + ?Sized>(
    registry: &Registry,
    engine: &E,
    ctx: &ToolbarContext<'_>,
) -> Result<Vec<ButtonState>, EditorError> {
    let mut states = Vec::new();
    let mut queue: Vec<SmolStr> = ctx.options.button_names().cloned().collect();
    queue.reverse();
    while let Some(name) = queue.pop() {
        let spec = registry.button(&name)?;
        if let ButtonBehavior::Dropdown(DropdownKind::Buttons(groups)) = &spec.behavior {
            let nested: Vec<_> = groups.iter().flat_map(LayoutEntry::names).cloned().collect();
            queue.extend(nested.into_iter().rev());
        }
        states.push(button_state(&name, spec, engine, ctx));
    }
    tracing::trace!(target: "frost::toolbar", buttons = states.len(), "toolbar refreshed");
    Ok(states)
}
