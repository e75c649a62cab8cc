//! Types exposed to JavaScript via wasm-bindgen.

use serde::{Deserialize, Serialize};
use tsify_next::Tsify;
use wasm_bindgen::prelude::*;

use frost_editor_browser::{
    DropdownKind, FormRequest, LayoutEntry, LinkForm, Point, PopoverChange, PopoverKind,
    PopoverOutcome, ToolbarOutcome, ViewMode,
};

/// Link form fields, as the rendering layer shows them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct JsLinkForm {
    pub text: String,
    pub href: String,
    pub new_window: bool,
}

impl From<LinkForm> for JsLinkForm {
    fn from(form: LinkForm) -> Self {
        Self {
            text: form.text,
            href: form.href,
            new_window: form.new_window,
        }
    }
}

impl From<JsLinkForm> for LinkForm {
    fn from(form: JsLinkForm) -> Self {
        Self {
            text: form.text,
            href: form.href,
            new_window: form.new_window,
        }
    }
}

/// What a toolbar click asks of the rendering layer.
#[derive(Debug, Clone, Serialize, Tsify)]
#[tsify(into_wasm_abi)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum JsToolbarOutcome {
    Done,
    Ignored,
    /// Show a dropdown. `buttons` is set for button groups.
    OpenDropdown {
        dropdown: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        buttons: Option<Vec<LayoutEntry>>,
    },
    /// Show a form. `link` prefills the link form.
    OpenForm {
        form: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        link: Option<JsLinkForm>,
    },
    ViewChanged { source: bool },
    FullScreen { enabled: bool },
}

fn dropdown_name(kind: &DropdownKind) -> &'static str {
    match kind {
        DropdownKind::Color => "color",
        DropdownKind::Font => "font",
        DropdownKind::FontSize => "fontSize",
        DropdownKind::Style => "style",
        DropdownKind::Table => "table",
        DropdownKind::Buttons(_) => "buttons",
    }
}

impl From<ToolbarOutcome> for JsToolbarOutcome {
    fn from(outcome: ToolbarOutcome) -> Self {
        match outcome {
            ToolbarOutcome::Done => Self::Done,
            ToolbarOutcome::Ignored => Self::Ignored,
            ToolbarOutcome::OpenDropdown(kind) => Self::OpenDropdown {
                dropdown: dropdown_name(&kind).to_string(),
                buttons: match kind {
                    DropdownKind::Buttons(entries) => Some(entries),
                    _ => None,
                },
            },
            ToolbarOutcome::OpenForm(request) => match request {
                FormRequest::Link(form) => Self::OpenForm {
                    form: "link".to_string(),
                    link: Some(form.into()),
                },
                FormRequest::Image => Self::OpenForm {
                    form: "image".to_string(),
                    link: None,
                },
                FormRequest::Video => Self::OpenForm {
                    form: "video".to_string(),
                    link: None,
                },
            },
            ToolbarOutcome::ViewChanged(mode) => Self::ViewChanged {
                source: mode == ViewMode::Source,
            },
            ToolbarOutcome::FullScreen(enabled) => Self::FullScreen { enabled },
        }
    }
}

/// What a popover click asks of the rendering layer.
#[derive(Debug, Clone, Serialize, Tsify)]
#[tsify(into_wasm_abi)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum JsPopoverOutcome {
    Done,
    EditLink { link: JsLinkForm },
}

impl From<PopoverOutcome> for JsPopoverOutcome {
    fn from(outcome: PopoverOutcome) -> Self {
        match outcome {
            PopoverOutcome::Done => Self::Done,
            PopoverOutcome::EditLink(form) => Self::EditLink { link: form.into() },
        }
    }
}

/// Serializable part of a popover change. The anchor element is attached
/// separately, since DOM nodes do not go through serde.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub(crate) enum PopoverPayload {
    Hidden,
    Shown {
        kind: PopoverKind,
        layout: Vec<LayoutEntry>,
        #[serde(skip_serializing_if = "Option::is_none")]
        point: Option<Point>,
    },
}

impl PopoverPayload {
    pub(crate) fn from_change<N>(change: &PopoverChange<N>) -> Option<Self> {
        match change {
            PopoverChange::Unchanged => None,
            PopoverChange::Hidden => Some(Self::Hidden),
            PopoverChange::Shown(view) => Some(Self::Shown {
                kind: view.kind,
                layout: view.layout.clone(),
                point: match view.anchor {
                    frost_editor_browser::Anchor::Point(point) => Some(point),
                    frost_editor_browser::Anchor::Element(_) => None,
                },
            }),
        }
    }
}
