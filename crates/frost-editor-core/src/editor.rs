//! The editor: one editable root, its history and the reactive pipeline.
//!
//! All programmatic DOM work happens inside a suppressed observation scope.
//! Native edits reach the editor as mutation records (see
//! [`Editor::handle_mutations`]) and are committed by the reactive pass:
//! normalize, empty check, value sync and a history entry.

use std::sync::Arc;

use crate::commands::{BlockTag, Command, FontSize};
use crate::config::{EditorOptions, OptionsResolver};
use crate::dom::{self, DomNode};
use crate::error::EditorError;
use crate::events::{BeforeInputResult, EditorEvent, InputType};
use crate::forms::{LinkForm, VideoEmbed};
use crate::gate::{MutationSource, ObserveGate};
use crate::history::{History, HistoryEntry};
use crate::keys::{Key, KeyCombo, KeydownResult, Shortcut};
use crate::normalize::Normalizer;
use crate::platform::EditorHost;
use crate::popover::{self, Point, PopoverChange, PopoverKind, PopoverTracker, Positioner};
use crate::registry::{
    ActionKind, ButtonBehavior, DropdownKind, PopoverAction, PopoverItem, Registry,
};
use crate::selection::{self, DomSelection, SelectionMarkers, SelectionSnapshot};
use crate::source::{self, ViewMode};
use crate::style::{self, StyleResolver};
use crate::toolbar::{self, ButtonState, ToolbarContext};

/// Content of an empty editor.
pub const PLACEHOLDER: &str = "<p><br></p>";

/// Mount and teardown.
pub trait Lifecycle {
    /// Load the host value into the root and record the initial state.
    fn init(&mut self) -> Result<(), EditorError>;

    /// Stop observing and tear down the popover. Later operations fail with
    /// [`EditorError::Disposed`] or do nothing.
    fn dispose(&mut self);

    fn is_disposed(&self) -> bool;
}

/// A form the rendering layer should open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormRequest {
    Link(LinkForm),
    Image,
    Video,
}

/// What a toolbar click asks of the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolbarOutcome {
    Done,
    /// Disabled editor, or a control unavailable in the source view.
    Ignored,
    OpenDropdown(DropdownKind),
    OpenForm(FormRequest),
    ViewChanged(ViewMode),
    FullScreen(bool),
}

/// What a popover click asks of the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopoverOutcome {
    Done,
    /// Open the link form, prefilled. Submitting it edits the link in place.
    EditLink(LinkForm),
}

pub struct Editor<H: EditorHost, O: MutationSource> {
    host: H,
    root: H::Node,
    gate: ObserveGate<O>,
    history: History,
    options: EditorOptions,
    registry: Arc<Registry>,
    resolver: Box<dyn StyleResolver<H::Node>>,
    popover: PopoverTracker<H::Node>,
    view: ViewMode,
    source: String,
    full_screen: bool,
    disabled: bool,
    disposed: bool,
    skip_normalize: bool,
    /// The last `beforeinput` was a history step the stack already ran.
    history_taken: bool,
    /// Selection at the time a form was opened, restored on submit.
    saved_selection: Option<SelectionSnapshot>,
    editing_link: Option<H::Node>,
}

impl<H: EditorHost, O: MutationSource> Editor<H, O> {
    /// Build an editor around `root`. Observation starts immediately; content
    /// is loaded by [`Lifecycle::init`].
    pub fn new(
        host: H,
        root: H::Node,
        observer: O,
        options: EditorOptions,
        registry: Arc<Registry>,
        resolver: Box<dyn StyleResolver<H::Node>>,
    ) -> Result<Self, EditorError> {
        let options = OptionsResolver::new(&registry).resolve(options)?;
        Ok(Self {
            host,
            root,
            gate: ObserveGate::new(observer),
            history: History::new(options.history_limit),
            options,
            registry,
            resolver,
            popover: PopoverTracker::new(),
            view: ViewMode::Editing,
            source: String::new(),
            full_screen: false,
            disabled: false,
            disposed: false,
            skip_normalize: false,
            history_taken: false,
            saved_selection: None,
            editing_link: None,
        })
    }

    /// [`Editor::new`] followed by [`Lifecycle::init`].
    pub fn mount(
        host: H,
        root: H::Node,
        observer: O,
        options: EditorOptions,
        registry: Arc<Registry>,
        resolver: Box<dyn StyleResolver<H::Node>>,
    ) -> Result<Self, EditorError> {
        let mut editor = Self::new(host, root, observer, options, registry, resolver)?;
        editor.init()?;
        Ok(editor)
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn root(&self) -> &H::Node {
        &self.root
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn gate(&self) -> &ObserveGate<O> {
        &self.gate
    }

    pub fn popover(&self) -> &PopoverTracker<H::Node> {
        &self.popover
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn is_full_screen(&self) -> bool {
        self.full_screen
    }

    /// Serialized content of the root.
    pub fn html(&self) -> String {
        self.root.inner_html()
    }

    /// Raw text of the source view.
    pub fn source_text(&self) -> &str {
        &self.source
    }

    fn ensure_live(&self) -> Result<(), EditorError> {
        if self.disposed {
            Err(EditorError::Disposed)
        } else {
            Ok(())
        }
    }

    /// Run `f` with observation suppressed, then run the owed reactive pass,
    /// if any.
    fn suppressed<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.gate.suppress();
        let out = f(self);
        if self.gate.resume() {
            self.react();
        }
        out
    }

    // === Reactive pipeline ===

    /// Observer callback: `count` records were delivered while observing.
    pub fn handle_mutations(&mut self, count: usize) {
        if count == 0 || self.disposed {
            return;
        }
        if !self.gate.is_observing() {
            tracing::warn!(target: "frost::gate", count, "records delivered while suppressed");
            return;
        }
        tracing::trace!(target: "frost::gate", count, "mutations observed");
        if std::mem::take(&mut self.skip_normalize) {
            self.check_empty();
            self.update_value();
        } else {
            self.react();
        }
    }

    /// Commit whatever the root holds now.
    pub fn commit(&mut self) {
        if !self.disposed {
            self.react();
        }
    }

    fn react(&mut self) {
        self.normalize();
        self.check_empty();
        self.update_value();
    }

    /// Run the normalizer over the root, keeping the selection in place.
    pub fn normalize(&mut self) {
        self.suppressed(|ed| {
            let root = ed.root.clone();
            let mut current = ed.host.selection().filter(|s| s.within(&root));
            match current.as_mut() {
                Some(sel) => {
                    dom::merge_adjacent_text(&root, &mut [&mut sel.anchor, &mut sel.focus])
                }
                None => dom::merge_adjacent_text(&root, &mut []),
            }
            let markers = current.map(|sel| SelectionMarkers::insert(&root, &sel));
            let nodes = markers.as_ref().map(|m| m.nodes().to_vec()).unwrap_or_default();

            Normalizer::new(ed.resolver.as_ref()).run(&root, &nodes);

            let Some(markers) = markers else {
                dom::merge_adjacent_text(&root, &mut []);
                return;
            };
            match markers.remove() {
                Some(mut sel) => {
                    dom::merge_adjacent_text(&root, &mut [&mut sel.anchor, &mut sel.focus]);
                    ed.host.set_selection(&sel);
                }
                None => {
                    tracing::warn!(target: "frost::normalize", "selection marker lost");
                    dom::merge_adjacent_text(&root, &mut []);
                    selection::collapse_to_end(&ed.host, &root);
                }
            }
        });
    }

    /// Replace an empty root with the placeholder. Returns whether it did.
    pub fn check_empty(&mut self) -> bool {
        let html = self.root.inner_html();
        let html = html.trim();
        if !(html.is_empty() || html == "<br>") {
            return false;
        }
        self.suppressed(|ed| ed.root.set_inner_html(PLACEHOLDER));
        true
    }

    /// Sync the host value with the root and record a history entry.
    ///
    /// No-op when the host value already matches.
    pub fn update_value(&mut self) -> bool {
        let html = self.root.inner_html();
        if html == self.host.value() {
            return false;
        }
        let (host, root) = (&self.host, &self.root);
        self.history
            .record_change(&html, || selection::capture_selection(host, root));
        self.host.set_value(&html);
        if !self.view.is_source() {
            self.source.clone_from(&html);
        }
        self.host.dispatch(EditorEvent::Change);
        true
    }

    // === Native input ===

    /// `beforeinput`: history types are taken over by the stack when the
    /// event can be cancelled. Otherwise the engine runs and the paired
    /// `input` restores the stack's state over it.
    pub fn handle_before_input(
        &mut self,
        input: &InputType,
        cancelable: bool,
    ) -> BeforeInputResult {
        self.history_taken = false;
        if self.disposed {
            return BeforeInputResult::PassThrough;
        }
        if self.disabled {
            return if cancelable {
                BeforeInputResult::Handled
            } else {
                BeforeInputResult::PassThrough
            };
        }
        if !cancelable {
            return BeforeInputResult::PassThrough;
        }
        match input {
            InputType::HistoryUndo => {
                self.history_taken = true;
                self.step_back();
                BeforeInputResult::Handled
            }
            InputType::HistoryRedo => {
                self.history_taken = true;
                self.step_forward();
                BeforeInputResult::Handled
            }
            _ => BeforeInputResult::PassThrough,
        }
    }

    /// `input`: a history type here means the engine already applied its own
    /// undo, so the stack's state is restored over it. The `input` paired
    /// with a history `beforeinput` the stack already ran is ignored.
    pub fn handle_input(&mut self, input: &InputType) {
        let taken = std::mem::take(&mut self.history_taken);
        if self.disposed {
            return;
        }
        match input {
            InputType::HistoryUndo | InputType::HistoryRedo if taken => {
                tracing::trace!(target: "frost::history", ?input, "history step already applied");
            }
            InputType::HistoryUndo => {
                tracing::debug!(target: "frost::history", "native undo overridden");
                self.step_back();
            }
            InputType::HistoryRedo => {
                tracing::debug!(target: "frost::history", "native redo overridden");
                self.step_forward();
            }
            other => self.skip_normalize = other.skips_normalize(),
        }
    }

    // === History ===

    pub fn undo(&mut self) -> Result<bool, EditorError> {
        self.ensure_live()?;
        Ok(self.step_back())
    }

    pub fn redo(&mut self) -> Result<bool, EditorError> {
        self.ensure_live()?;
        Ok(self.step_forward())
    }

    fn step_back(&mut self) -> bool {
        match self.history.undo().cloned() {
            Some(entry) => {
                self.restore(entry);
                true
            }
            None => false,
        }
    }

    fn step_forward(&mut self) -> bool {
        match self.history.redo().cloned() {
            Some(entry) => {
                self.restore(entry);
                true
            }
            None => false,
        }
    }

    fn restore(&mut self, entry: HistoryEntry) {
        self.popover.remove();
        self.gate.suppress();
        self.root.set_inner_html(&entry.html);
        selection::restore_selection(&self.host, &self.root, entry.selection.as_ref());
        if self.check_empty() {
            selection::collapse_to_end(&self.host, &self.root);
        }
        if self.gate.resume() {
            tracing::trace!(target: "frost::history", "pending mutations superseded by restore");
        }
        let html = self.root.inner_html();
        self.host.set_value(&html);
        self.source = html;
        self.host.dispatch(EditorEvent::Change);
    }

    // === Commands ===

    /// Focus the root unless focus or the selection is already inside it.
    fn focus_root(&self) {
        if self.host.has_focus_within(&self.root) {
            return;
        }
        let anchored = self
            .host
            .selection()
            .is_some_and(|s| dom::contains(&self.root, &s.anchor.node));
        if !anchored {
            self.host.focus(&self.root);
        }
    }

    /// Dispatch a native editing command.
    ///
    /// Does nothing while disabled. Unsupported commands are absorbed by the
    /// engine.
    pub fn execute(&mut self, command: Command) -> Result<(), EditorError> {
        self.ensure_live()?;
        if self.disabled {
            tracing::trace!(target: "frost::command", command = command.name(), "disabled, ignored");
            return Ok(());
        }
        self.focus_root();
        let css = if command.styles_with_css() { "true" } else { "false" };
        self.host.exec_command("styleWithCSS", Some(css));
        if command.is_list_insertion() {
            self.suppressed(|ed| {
                ed.host
                    .exec_command("formatBlock", Some(BlockTag::P.as_str()));
            });
        }
        let value = command.value();
        tracing::debug!(target: "frost::command", command = command.name(), ?value, "execute");
        self.host.exec_command(command.name(), value.as_deref());
        Ok(())
    }

    /// [`Editor::execute`] by native command name.
    pub fn execute_named(&mut self, name: &str, value: Option<&str>) -> Result<(), EditorError> {
        self.execute(Command::parse(name, value)?)
    }

    /// Replace the whole content.
    pub fn set_html(&mut self, html: &str) -> Result<(), EditorError> {
        self.ensure_live()?;
        self.popover.remove();
        self.suppressed(|ed| ed.root.set_inner_html(html));
        self.react();
        Ok(())
    }

    fn insert_node(&mut self, node: &H::Node) -> Result<(), EditorError> {
        self.focus_root();
        if let Some(saved) = self.saved_selection.take() {
            selection::restore_selection(&self.host, &self.root, Some(&saved));
        }
        let root = self.root.clone();
        self.suppressed(|ed| ed.host.insert_node(&root, node))?;
        self.react();
        Ok(())
    }

    /// Insert an image at the selection. Returns the inserted element so the
    /// caller can fit its width once loaded.
    pub fn insert_image(&mut self, src: &str) -> Result<H::Node, EditorError> {
        self.ensure_live()?;
        let image = self.root.create_element("img");
        image.set_attribute("src", src);
        self.insert_node(&image)?;
        Ok(image)
    }

    pub fn insert_link(&mut self, form: &LinkForm) -> Result<(), EditorError> {
        self.ensure_live()?;
        let link = form.to_element(&self.root);
        self.insert_node(&link)
    }

    pub fn insert_video(&mut self, video: &VideoEmbed) -> Result<(), EditorError> {
        self.ensure_live()?;
        if let Some(saved) = self.saved_selection.take() {
            selection::restore_selection(&self.host, &self.root, Some(&saved));
        }
        self.execute(Command::InsertHtml(video.to_html()))
    }

    /// Insert a `rows` × `cols` table and put the caret in its first cell.
    pub fn insert_table(&mut self, rows: usize, cols: usize) -> Result<(), EditorError> {
        self.ensure_live()?;
        if rows == 0 || cols == 0 {
            return Err(EditorError::InvalidValue {
                command: "table",
                value: format!("{rows}x{cols}"),
            });
        }
        let table = popover::build_table(&self.root, rows, cols);
        self.insert_node(&table)?;
        let first = dom::descendant_elements(&table)
            .into_iter()
            .find(|n| n.has_tag("td"));
        if let Some(cell) = first.filter(|cell| dom::contains(&self.root, cell)) {
            self.host.set_selection(&DomSelection::collapsed(cell, 0));
        }
        Ok(())
    }

    pub fn insert_html(&mut self, html: &str) -> Result<(), EditorError> {
        self.execute(Command::InsertHtml(html.to_string()))
    }

    pub fn insert_text(&mut self, text: &str) -> Result<(), EditorError> {
        self.execute(Command::InsertText(text.to_string()))
    }

    // === Drop and panel ===

    fn accepts_drop(&self) -> bool {
        !self.disabled && !self.view.is_source()
    }

    /// Plain text dropped onto the root.
    pub fn drop_text(&mut self, text: &str) -> Result<(), EditorError> {
        self.ensure_live()?;
        if !self.accepts_drop() || text.is_empty() {
            return Ok(());
        }
        self.insert_text(text)
    }

    /// An image file dropped onto the root, read as a data URL. Returns the
    /// inserted element, `None` when the drop was refused.
    pub fn drop_image(&mut self, src: &str) -> Result<Option<H::Node>, EditorError> {
        self.ensure_live()?;
        if !self.accepts_drop() || src.trim().is_empty() {
            return Ok(None);
        }
        self.insert_image(src.trim()).map(Some)
    }

    /// Set the root's CSS height. Not content, so not recorded.
    pub fn set_height(&mut self, height: &str) {
        self.suppressed(|ed| style::set_style_property(&ed.root, "height", height));
    }

    /// Panel drag-resize step. Does nothing unless the editor is resizable.
    pub fn resize_panel(&mut self, height: f64) -> bool {
        if self.disposed || !self.options.resizable {
            return false;
        }
        self.popover.remove();
        self.set_height(&format!("{}px", height.max(0.0).round()));
        true
    }

    /// Submit the link form: edits the link a popover opened it for, or
    /// inserts a new one.
    pub fn submit_link(&mut self, form: &LinkForm) -> Result<(), EditorError> {
        self.ensure_live()?;
        match self.editing_link.take() {
            Some(link) if dom::contains(&self.root, &link) => {
                self.suppressed(|_| form.apply_to(&link));
                self.react();
                Ok(())
            }
            _ => self.insert_link(form),
        }
    }

    // === Toolbar ===

    /// Current display state of every configured button.
    pub fn refresh_toolbar(&self) -> Result<Vec<ButtonState>, EditorError> {
        let ctx = ToolbarContext {
            disabled: self.disabled,
            source_view: self.view.is_source(),
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
            options: &self.options,
        };
        toolbar::refresh_toolbar(&self.registry, &self.host, &ctx)
    }

    /// Handle a click on the toolbar control `name`.
    ///
    /// Dropdown choices carry `value`: a color as `foreColor:<css>` or
    /// `backColor:<css>`, a font name, a pixel size, a block tag, or a table
    /// size as `<rows>x<cols>`.
    pub fn toolbar_action(
        &mut self,
        name: &str,
        value: Option<&str>,
    ) -> Result<ToolbarOutcome, EditorError> {
        self.ensure_live()?;
        let spec = self.registry.button(name)?.clone();
        if self.disabled || (self.view.is_source() && !spec.allowed_in_source_view()) {
            return Ok(ToolbarOutcome::Ignored);
        }
        match spec.behavior {
            ButtonBehavior::Command(command) => {
                self.execute(command)?;
                Ok(ToolbarOutcome::Done)
            }
            ButtonBehavior::Action(kind) => self.run_action(kind),
            ButtonBehavior::Dropdown(kind) => match value {
                Some(value) => self.choose(&kind, value),
                None => Ok(ToolbarOutcome::OpenDropdown(kind)),
            },
        }
    }

    fn run_action(&mut self, kind: ActionKind) -> Result<ToolbarOutcome, EditorError> {
        match kind {
            ActionKind::Undo => {
                self.step_back();
                Ok(ToolbarOutcome::Done)
            }
            ActionKind::Redo => {
                self.step_forward();
                Ok(ToolbarOutcome::Done)
            }
            ActionKind::Source => Ok(ToolbarOutcome::ViewChanged(self.toggle_source()?)),
            ActionKind::FullScreen => {
                self.full_screen = !self.full_screen;
                Ok(ToolbarOutcome::FullScreen(self.full_screen))
            }
            ActionKind::Link => {
                let current = self.selected_link();
                let form = current.as_ref().map(LinkForm::from_link).unwrap_or_default();
                self.editing_link = current;
                Ok(self.open_form(FormRequest::Link(form)))
            }
            ActionKind::Image => Ok(self.open_form(FormRequest::Image)),
            ActionKind::Video => Ok(self.open_form(FormRequest::Video)),
        }
    }

    fn open_form(&mut self, request: FormRequest) -> ToolbarOutcome {
        self.saved_selection = selection::capture_selection(&self.host, &self.root);
        ToolbarOutcome::OpenForm(request)
    }

    fn choose(&mut self, kind: &DropdownKind, value: &str) -> Result<ToolbarOutcome, EditorError> {
        let invalid = |command: &'static str| EditorError::InvalidValue {
            command,
            value: value.to_string(),
        };
        let command = match kind {
            DropdownKind::Color => {
                let (name, color) = value.split_once(':').ok_or_else(|| invalid("color"))?;
                match Command::parse(name, Some(color.trim())) {
                    Ok(c @ (Command::ForeColor(_) | Command::BackColor(_))) => c,
                    _ => return Err(invalid("color")),
                }
            }
            DropdownKind::Font => Command::FontName(value.into()),
            DropdownKind::FontSize => {
                let px = value.trim().trim_end_matches("px").parse::<u32>().ok();
                let size: FontSize = px
                    .and_then(|px| self.options.font_size_for_px(px))
                    .ok_or_else(|| invalid("fontSize"))?;
                Command::FontSize(size)
            }
            DropdownKind::Style => {
                Command::FormatBlock(BlockTag::parse(value).ok_or_else(|| invalid("formatBlock"))?)
            }
            DropdownKind::Table => {
                let (rows, cols): (usize, usize) = value
                    .split_once('x')
                    .and_then(|(r, c)| Some((r.trim().parse().ok()?, c.trim().parse().ok()?)))
                    .ok_or_else(|| invalid("table"))?;
                self.insert_table(rows, cols)?;
                return Ok(ToolbarOutcome::Done);
            }
            DropdownKind::Buttons(_) => return Ok(ToolbarOutcome::OpenDropdown(kind.clone())),
        };
        self.execute(command)?;
        Ok(ToolbarOutcome::Done)
    }

    // === Source view ===

    /// Switch between the rendered and the raw view. Leaving the raw view
    /// commits its text.
    pub fn toggle_source(&mut self) -> Result<ViewMode, EditorError> {
        self.ensure_live()?;
        match self.view {
            ViewMode::Editing => {
                self.popover.remove();
                self.source = self.root.inner_html();
                self.view = ViewMode::Source;
            }
            ViewMode::Source => {
                self.commit_source()?;
                self.view = ViewMode::Editing;
            }
        }
        tracing::debug!(target: "frost::command", view = ?self.view, "view toggled");
        Ok(self.view)
    }

    /// The raw text changed. Returns the line count for the gutter.
    pub fn set_source_text(&mut self, text: &str) -> usize {
        self.source = text.to_string();
        source::line_count(&self.source)
    }

    /// Parse the raw text back into the root and commit it.
    pub fn commit_source(&mut self) -> Result<(), EditorError> {
        self.ensure_live()?;
        let text = self.source.clone();
        if text == self.root.inner_html() {
            return Ok(());
        }
        self.suppressed(|ed| ed.root.set_inner_html(&text));
        self.react();
        Ok(())
    }

    // === Popovers ===

    fn selected_link(&self) -> Option<H::Node> {
        let sel = self.host.selection()?;
        dom::closest(&sel.anchor.node, &["a"], &self.root)
    }

    /// Show the popover for `target`, or hide it. Targets outside the root
    /// hide it.
    pub fn refresh_popover(
        &mut self,
        target: Option<H::Node>,
        origin: Option<Point>,
    ) -> PopoverChange<H::Node> {
        if self.disposed {
            return PopoverChange::Unchanged;
        }
        let target = target.filter(|t| t != &self.root && dom::contains(&self.root, t));
        self.popover.refresh(target, origin, &self.options.popovers)
    }

    /// Popover for the link under the caret, if any.
    pub fn refresh_cursor(&mut self) -> PopoverChange<H::Node> {
        let link = self.selected_link();
        self.refresh_popover(link, None)
    }

    pub fn attach_positioner(&mut self, positioner: Box<dyn Positioner>) {
        self.popover.attach(positioner);
    }

    pub fn remove_popover(&mut self) -> bool {
        self.popover.remove()
    }

    /// The page scrolled or resized under the open popover.
    pub fn reposition_popover(&mut self) {
        self.popover.update();
    }

    /// Handle a click on the popover item `name`.
    pub fn popover_action(&mut self, name: &str) -> Result<PopoverOutcome, EditorError> {
        self.ensure_live()?;
        let item = self.registry.popover_item(name)?;
        let node = self.popover.current().cloned().ok_or(EditorError::NoPopover)?;
        let PopoverItem::Action(action) = item else {
            return Ok(PopoverOutcome::Done);
        };
        tracing::debug!(target: "frost::popover", ?action, "popover action");
        match (self.popover.kind(), action) {
            (_, PopoverAction::LinkEdit) => {
                self.saved_selection = selection::capture_selection(&self.host, &self.root);
                self.editing_link = Some(node.clone());
                return Ok(PopoverOutcome::EditLink(LinkForm::from_link(&node)));
            }
            (_, PopoverAction::Unlink) => {
                self.host.set_selection(&DomSelection::new(
                    dom::Boundary::new(node.clone(), 0),
                    dom::Boundary::new(node.clone(), dom::child_count(&node)),
                ));
                self.execute(Command::Unlink)?;
                if let Some(sel) = self.host.selection() {
                    self.host
                        .set_selection(&DomSelection::new(sel.focus.clone(), sel.focus));
                }
                self.popover.remove();
            }
            (Some(PopoverKind::TableCell), _) => {
                let root = self.root.clone();
                let caret = self.suppressed(|_| popover::apply_table_action(&root, &node, action));
                self.popover.remove();
                self.react();
                if let Some(cell) = caret.filter(|c| dom::contains(&self.root, c)) {
                    self.host.set_selection(&DomSelection::collapsed(cell, 0));
                }
            }
            (Some(PopoverKind::Image), _) => {
                self.suppressed(|_| popover::apply_image_action(&node, action));
                if action == PopoverAction::ImageRemove {
                    self.popover.remove();
                } else {
                    self.popover.update();
                }
                self.react();
            }
            _ => {
                tracing::warn!(target: "frost::popover", ?action, "action does not apply to this popover");
            }
        }
        Ok(PopoverOutcome::Done)
    }

    /// Set the width of the image under the popover while drag-resizing.
    /// The final step commits.
    pub fn resize_image(&mut self, width: f64, finished: bool) -> Result<(), EditorError> {
        self.ensure_live()?;
        let image = self
            .popover
            .current()
            .filter(|n| n.has_tag("img"))
            .cloned()
            .ok_or(EditorError::NoPopover)?;
        let px = format!("{}px", width.max(1.0).round());
        self.suppressed(|_| style::set_style_property(&image, "width", &px));
        self.popover.update();
        if finished {
            self.react();
        }
        Ok(())
    }

    // === Keyboard, focus, enablement ===

    pub fn handle_keydown(&mut self, combo: &KeyCombo) -> Result<KeydownResult, EditorError> {
        self.ensure_live()?;
        if self.view.is_source() || self.disabled {
            return Ok(KeydownResult::NotHandled);
        }
        if self.options.shortcuts {
            if let Some(shortcut) = Shortcut::from_combo(combo) {
                match shortcut {
                    Shortcut::Bold => self.execute(Command::Bold)?,
                    Shortcut::Italic => self.execute(Command::Italic)?,
                    Shortcut::Underline => self.execute(Command::Underline)?,
                    Shortcut::Undo => {
                        self.step_back();
                    }
                    Shortcut::Redo => {
                        self.step_forward();
                    }
                }
                return Ok(KeydownResult::Handled);
            }
        }
        match combo.key {
            Key::Backspace if self.is_blank() => Ok(KeydownResult::Handled),
            Key::Delete => {
                self.prepare_forward_delete()?;
                Ok(KeydownResult::NotHandled)
            }
            _ => Ok(KeydownResult::NotHandled),
        }
    }

    /// At most one child, no text and nothing but line breaks.
    fn is_blank(&self) -> bool {
        dom::child_count(&self.root) <= 1
            && self.root.text_content().is_empty()
            && dom::descendant_elements(&self.root)
                .iter()
                .all(|n| !["img", "hr", "iframe", "table"].iter().any(|t| n.has_tag(t)))
    }

    /// Forward delete from an empty block takes on the next block's format,
    /// so a heading below is not demoted to the empty block's.
    fn prepare_forward_delete(&mut self) -> Result<(), EditorError> {
        let Some(sel) = self.host.selection().filter(|s| s.is_collapsed()) else {
            return Ok(());
        };
        let mut block = sel.anchor.node.clone();
        while let Some(parent) = block.parent_node() {
            if parent == self.root {
                break;
            }
            block = parent;
        }
        if block == self.root || !block.text_content().is_empty() {
            return Ok(());
        }
        let Some(next) = block.next_sibling().filter(DomNode::is_element) else {
            return Ok(());
        };
        let tag = next
            .tag_name()
            .and_then(|t| BlockTag::parse(&t))
            .filter(|t| t.is_heading() || *t == BlockTag::Pre)
            .unwrap_or(BlockTag::P);
        self.execute(Command::FormatBlock(tag))
    }

    pub fn handle_focus(&mut self) {
        if !self.disposed {
            self.host.dispatch(EditorEvent::Focus);
        }
    }

    pub fn handle_blur(&mut self) {
        if !self.disposed {
            self.host.dispatch(EditorEvent::Blur);
        }
    }

    pub fn enable(&mut self) {
        self.set_disabled(false);
    }

    pub fn disable(&mut self) {
        self.set_disabled(true);
    }

    fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
        self.host.set_disabled(disabled);
        if disabled {
            self.popover.remove();
        }
    }
}

impl<H: EditorHost, O: MutationSource> Lifecycle for Editor<H, O> {
    fn init(&mut self) -> Result<(), EditorError> {
        self.ensure_live()?;
        let value = self.host.value();
        self.gate.suppress();
        self.root.set_inner_html(&value);
        style::set_style_property(&self.root, "height", &self.options.height);
        self.normalize();
        self.check_empty();
        if self.gate.resume() {
            tracing::trace!(target: "frost::gate", "mutations before mount discarded");
        }
        let html = self.root.inner_html();
        self.history.clear();
        self.history.push(html.as_str(), None);
        self.host.set_value(&html);
        self.source = html;
        self.host.dispatch(EditorEvent::Init);
        tracing::debug!(target: "frost::history", "editor mounted");
        Ok(())
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.popover.remove();
        self.gate.shutdown();
        self.disposed = true;
        tracing::debug!(target: "frost::history", "editor disposed");
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

#[cfg(test)]
mod tests {
    use kuchiki::NodeRef;

    use super::*;
    use crate::headless::{HeadlessDocument, HeadlessHost, HeadlessObserver};
    use crate::platform::{HostInput, SelectionPlatform};
    use crate::selection::node_from_path;
    use crate::style::CascadeResolver;

    type TestEditor = Editor<HeadlessHost, HeadlessObserver>;

    fn mount(html: &str) -> (TestEditor, HeadlessObserver) {
        let observer = HeadlessObserver::new();
        let editor = Editor::mount(
            HeadlessHost::new(html),
            HeadlessDocument::parse(""),
            observer.clone(),
            EditorOptions::default(),
            Arc::new(Registry::standard()),
            Box::new(CascadeResolver::default()),
        )
        .unwrap();
        (editor, observer)
    }

    fn node(editor: &TestEditor, path: &[usize]) -> NodeRef {
        node_from_path(path, editor.root()).unwrap()
    }

    /// Simulate a native edit followed by observer delivery.
    fn native_edit(editor: &mut TestEditor, observer: &HeadlessObserver, f: impl FnOnce(&NodeRef)) {
        f(editor.root());
        observer.record(1);
        let delivered = observer.deliver();
        editor.handle_mutations(delivered);
    }

    fn set_text(path: &'static [usize], text: &'static str) -> impl FnOnce(&NodeRef) {
        move |root| node_from_path(path, root).unwrap().set_text(text)
    }

    #[test]
    fn mount_records_initial_state() {
        let (editor, _) = mount("<p>a</p><p></p>");
        assert_eq!(editor.html(), "<p>a</p>");
        assert_eq!(editor.host().value(), "<p>a</p>");
        assert_eq!(editor.history().len(), 1);
        assert!(!editor.history().can_undo());
        assert_eq!(editor.host().events(), vec![EditorEvent::Init]);
    }

    #[test]
    fn empty_mount_gets_placeholder() {
        let (editor, _) = mount("");
        assert_eq!(editor.html(), PLACEHOLDER);
        assert_eq!(editor.host().value(), PLACEHOLDER);
    }

    #[test]
    fn undo_and_redo_are_inverse() {
        let (mut editor, observer) = mount("<p>a</p>");
        native_edit(&mut editor, &observer, set_text(&[0, 0], "ab"));
        assert_eq!(editor.host().value(), "<p>ab</p>");
        assert_eq!(editor.history().len(), 2);

        assert!(editor.undo().unwrap());
        assert_eq!(editor.html(), "<p>a</p>");
        assert_eq!(editor.host().value(), "<p>a</p>");
        assert!(!editor.undo().unwrap());

        assert!(editor.redo().unwrap());
        assert_eq!(editor.html(), "<p>ab</p>");
        assert!(!editor.redo().unwrap());
        assert!(observer.is_observing());
    }

    #[test]
    fn new_edit_after_undo_clears_redo() {
        let (mut editor, observer) = mount("<p>a</p>");
        native_edit(&mut editor, &observer, set_text(&[0, 0], "ab"));
        editor.undo().unwrap();
        native_edit(&mut editor, &observer, set_text(&[0, 0], "ax"));
        assert!(!editor.history().can_redo());
        editor.undo().unwrap();
        assert_eq!(editor.html(), "<p>a</p>");
    }

    #[test]
    fn undo_restores_selection() {
        let (mut editor, observer) = mount("<p>a</p>");
        // Caret after the typed character, as the engine leaves it.
        let text = node(&editor, &[0, 0]);
        editor.host().set_selection(&DomSelection::collapsed(text, 2));
        native_edit(&mut editor, &observer, set_text(&[0, 0], "ab"));
        let text = node(&editor, &[0, 0]);
        editor.host().set_selection(&DomSelection::collapsed(text, 3));
        native_edit(&mut editor, &observer, set_text(&[0, 0], "abc"));

        editor.undo().unwrap();
        let sel = editor.host().selection().unwrap();
        assert_eq!(sel.anchor.node, node(&editor, &[0, 0]));
        assert_eq!(sel.anchor.offset, 2);
    }

    #[test]
    fn initial_undo_state_collapses_to_end() {
        let (mut editor, observer) = mount("<p>a</p>");
        native_edit(&mut editor, &observer, set_text(&[0, 0], "ab"));
        editor.undo().unwrap();
        let sel = editor.host().selection().unwrap();
        assert_eq!(sel, DomSelection::collapsed(editor.root().clone(), 1));
    }

    #[test]
    fn native_history_input_is_taken_over() {
        let (mut editor, observer) = mount("<p>a</p>");
        native_edit(&mut editor, &observer, set_text(&[0, 0], "ab"));
        assert_eq!(
            editor.handle_before_input(&InputType::HistoryUndo, true),
            BeforeInputResult::Handled
        );
        assert_eq!(editor.html(), "<p>a</p>");

        // A browser that skipped beforeinput already applied something of its
        // own; the stack wins.
        editor.handle_before_input(&InputType::InsertText, true);
        editor.root().set_inner_html("<p>native</p>");
        editor.handle_input(&InputType::HistoryRedo);
        assert_eq!(editor.html(), "<p>ab</p>");
        assert_eq!(
            editor.handle_before_input(&InputType::InsertText, true),
            BeforeInputResult::PassThrough
        );
    }

    #[test]
    fn history_gesture_steps_once() {
        let (mut editor, observer) = mount("<p>a</p>");
        native_edit(&mut editor, &observer, set_text(&[0, 0], "ab"));
        native_edit(&mut editor, &observer, set_text(&[0, 0], "abc"));
        assert_eq!(editor.history().len(), 3);

        editor.handle_before_input(&InputType::HistoryUndo, true);
        editor.handle_input(&InputType::HistoryUndo);
        assert_eq!(editor.html(), "<p>ab</p>");

        // The next gesture is a new step.
        editor.handle_before_input(&InputType::HistoryUndo, true);
        editor.handle_input(&InputType::HistoryUndo);
        assert_eq!(editor.html(), "<p>a</p>");

        editor.handle_before_input(&InputType::HistoryRedo, true);
        editor.handle_input(&InputType::HistoryRedo);
        assert_eq!(editor.html(), "<p>ab</p>");
    }

    #[test]
    fn uncancelable_history_is_restored_on_input() {
        let (mut editor, observer) = mount("<p>a</p>");
        native_edit(&mut editor, &observer, set_text(&[0, 0], "ab"));
        native_edit(&mut editor, &observer, set_text(&[0, 0], "abc"));

        assert_eq!(
            editor.handle_before_input(&InputType::HistoryUndo, false),
            BeforeInputResult::PassThrough
        );
        assert_eq!(editor.html(), "<p>abc</p>");
        editor.root().set_inner_html("<p>native</p>");
        editor.handle_input(&InputType::HistoryUndo);
        assert_eq!(editor.html(), "<p>ab</p>");
    }

    #[test]
    fn reactive_pass_normalizes() {
        let (mut editor, observer) = mount("<p>a</p>");
        native_edit(&mut editor, &observer, |root| {
            root.set_inner_html("<p><b>x</b><b>y</b><span>z</span></p>")
        });
        assert_eq!(editor.html(), "<p><b>xy</b>z</p>");
        assert_eq!(editor.host().value(), "<p><b>xy</b>z</p>");
    }

    #[test]
    fn typing_skips_normalization() {
        let (mut editor, observer) = mount("<p>a</p>");
        editor.handle_input(&InputType::InsertText);
        native_edit(&mut editor, &observer, |root| {
            root.set_inner_html("<p><b>x</b><b>y</b></p>")
        });
        assert_eq!(editor.html(), "<p><b>x</b><b>y</b></p>");
        // Only the next pass is skipped.
        native_edit(&mut editor, &observer, set_text(&[0, 0, 0], "w"));
        assert_eq!(editor.html(), "<p><b>wy</b></p>");
    }

    #[test]
    fn typing_without_mutations_does_not_skip_later_commits() {
        let (mut editor, _) = mount("<p>a</p>");
        editor.handle_input(&InputType::InsertText);
        editor.set_html("<p><b>x</b><b>y</b></p>").unwrap();
        assert_eq!(editor.html(), "<p><b>xy</b></p>");
        editor.set_source_text("<p><i>1</i><i>2</i></p>");
        editor.commit_source().unwrap();
        assert_eq!(editor.html(), "<p><i>12</i></p>");
    }

    #[test]
    fn normalize_keeps_selection() {
        let (mut editor, _) = mount("<p>a</p>");
        editor.root().set_inner_html("<p><b>foo</b><b>bar</b></p>");
        let bar = node(&editor, &[0, 1, 0]);
        editor.host().set_selection(&DomSelection::collapsed(bar, 1));
        editor.normalize();
        assert_eq!(editor.html(), "<p><b>foobar</b></p>");
        let sel = editor.host().selection().unwrap();
        assert_eq!(sel.anchor.node, node(&editor, &[0, 0, 0]));
        assert_eq!(sel.anchor.offset, 4);
    }

    #[test]
    fn emptied_root_gets_placeholder() {
        let (mut editor, observer) = mount("<p>a</p>");
        native_edit(&mut editor, &observer, |root| root.set_inner_html(""));
        assert_eq!(editor.html(), PLACEHOLDER);
        assert_eq!(editor.host().value(), PLACEHOLDER);
    }

    #[test]
    fn update_value_is_idempotent() {
        let (mut editor, _) = mount("<p>a</p>");
        assert!(!editor.update_value());
        assert_eq!(editor.history().len(), 1);
        assert_eq!(editor.host().events(), vec![EditorEvent::Init]);
    }

    #[test]
    fn facade_sets_css_mode_and_focuses() {
        let (mut editor, _) = mount("<p>a</p>");
        assert!(!editor.host().is_focused());
        editor.execute(Command::ForeColor("red".into())).unwrap();
        editor.execute(Command::Bold).unwrap();
        assert!(editor.host().is_focused());
        assert_eq!(
            editor.host().commands(),
            vec![
                ("styleWithCSS".to_string(), Some("true".to_string())),
                ("foreColor".to_string(), Some("red".to_string())),
                ("styleWithCSS".to_string(), Some("false".to_string())),
                ("bold".to_string(), None),
            ]
        );
    }

    #[test]
    fn list_insertion_forces_paragraph_first() {
        let (mut editor, observer) = mount("<p>a</p>");
        editor.execute(Command::InsertOrderedList).unwrap();
        let names: Vec<_> = editor.host().commands().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["styleWithCSS", "formatBlock", "insertOrderedList"]);
        assert!(observer.is_observing());
    }

    #[test]
    fn disabled_facade_is_noop() {
        let (mut editor, _) = mount("<p>a</p>");
        editor.disable();
        assert!(editor.host().is_disabled());
        editor.execute(Command::Bold).unwrap();
        assert!(editor.host().commands().is_empty());
        assert_eq!(editor.toolbar_action("bold", None), Ok(ToolbarOutcome::Ignored));
        editor.enable();
        assert!(!editor.host().is_disabled());
    }

    #[test]
    fn queued_mutations_coalesce_into_one_pass() {
        let (mut editor, observer) = mount("<p>a</p>");
        editor.root().set_inner_html("<p>b</p>");
        observer.record(3);
        editor.root().set_inner_html("<p>c</p>");
        observer.record(2);
        // The facade's suppressed scope takes the queued records and owes one
        // reactive pass for all of them.
        editor.execute(Command::InsertUnorderedList).unwrap();
        assert_eq!(editor.host().value(), "<p>c</p>");
        assert_eq!(editor.history().len(), 2);
        assert_eq!(observer.deliver(), 0);
    }

    #[test]
    fn execute_named_parses() {
        let (mut editor, _) = mount("<p>a</p>");
        editor.execute_named("fontSize", Some("7")).unwrap();
        assert_eq!(
            editor.execute_named("frobnicate", None),
            Err(EditorError::UnknownCommand("frobnicate".into()))
        );
    }

    #[test]
    fn insert_image_at_caret() {
        let (mut editor, _) = mount("<p>ab</p>");
        let text = node(&editor, &[0, 0]);
        editor.host().set_selection(&DomSelection::collapsed(text, 1));
        editor.insert_image("x.png").unwrap();
        assert_eq!(editor.html(), r#"<p>a<img src="x.png">b</p>"#);
        assert_eq!(editor.history().len(), 2);
    }

    #[test]
    fn insert_table_puts_caret_in_first_cell() {
        let (mut editor, _) = mount("<p>a</p>");
        editor.insert_table(2, 2).unwrap();
        assert_eq!(
            editor.html(),
            "<p>a</p><table><tbody><tr><td></td><td></td></tr><tr><td></td><td></td></tr></tbody></table>"
        );
        let sel = editor.host().selection().unwrap();
        assert_eq!(sel.anchor.node, node(&editor, &[1, 0, 0, 0]));
        assert!(editor.insert_table(0, 3).is_err());
    }

    #[test]
    fn toolbar_dropdown_choices() {
        let (mut editor, _) = mount("<p>a</p>");
        editor.toolbar_action("color", Some("backColor:#ff0")).unwrap();
        editor.toolbar_action("font", Some("Georgia")).unwrap();
        editor.toolbar_action("style", Some("h2")).unwrap();
        let commands: Vec<_> = editor
            .host()
            .commands()
            .into_iter()
            .filter(|(n, _)| n != "styleWithCSS")
            .collect();
        assert_eq!(
            commands,
            vec![
                ("backColor".to_string(), Some("#ff0".to_string())),
                ("fontName".to_string(), Some("Georgia".to_string())),
                ("formatBlock".to_string(), Some("h2".to_string())),
            ]
        );
        assert!(matches!(
            editor.toolbar_action("color", Some("bold:1")),
            Err(EditorError::InvalidValue { command: "color", .. })
        ));
        assert_eq!(
            editor.toolbar_action("paragraph", None),
            Ok(ToolbarOutcome::OpenDropdown(match &editor.registry().button("paragraph").unwrap().behavior {
                ButtonBehavior::Dropdown(kind) => kind.clone(),
                _ => unreachable!(),
            }))
        );
        assert_eq!(
            editor.toolbar_action("sparkle", None),
            Err(EditorError::UnknownAction("sparkle".into()))
        );
    }

    #[test]
    fn font_size_choice_maps_px_to_level() {
        let (mut editor, _) = mount("<p>a</p>");
        editor.toolbar_action("fontSize", Some("24px")).unwrap();
        assert!(
            editor
                .host()
                .commands()
                .contains(&("fontSize".to_string(), Some("5".to_string())))
        );
        assert!(editor.toolbar_action("fontSize", Some("17")).is_err());
    }

    #[test]
    fn source_view_round_trip() {
        let (mut editor, _) = mount("<p>a</p>");
        assert_eq!(
            editor.toolbar_action("source", None),
            Ok(ToolbarOutcome::ViewChanged(ViewMode::Source))
        );
        assert_eq!(editor.source_text(), "<p>a</p>");
        assert_eq!(editor.toolbar_action("bold", None), Ok(ToolbarOutcome::Ignored));
        let states = editor.refresh_toolbar().unwrap();
        assert!(states.iter().find(|s| s.name == "bold").unwrap().disabled);

        assert_eq!(editor.set_source_text("<p>b</p>\n<p>c</p>"), 2);
        editor.commit_source().unwrap();
        assert_eq!(editor.host().value(), "<p>b</p>\n<p>c</p>");
        assert_eq!(editor.toggle_source().unwrap(), ViewMode::Editing);
        assert_eq!(editor.host().events().last(), Some(&EditorEvent::Change));
        editor.undo().unwrap();
        assert_eq!(editor.html(), "<p>a</p>");
    }

    #[test]
    fn link_form_inserts_and_edits() {
        let (mut editor, _) = mount("<p>a</p>");
        let text = node(&editor, &[0, 0]);
        editor.host().set_selection(&DomSelection::collapsed(text, 1));
        let ToolbarOutcome::OpenForm(FormRequest::Link(form)) =
            editor.toolbar_action("link", None).unwrap()
        else {
            panic!("expected the link form");
        };
        assert_eq!(form, LinkForm::default());
        let form = LinkForm {
            text: "go".into(),
            href: "/x".into(),
            new_window: false,
        };
        editor.submit_link(&form).unwrap();
        assert_eq!(editor.html(), r#"<p>a<a href="/x">go</a></p>"#);

        let link = node(&editor, &[0, 1]);
        editor.refresh_popover(Some(link), None);
        let PopoverOutcome::EditLink(mut form) = editor.popover_action("linkEdit").unwrap() else {
            panic!("expected an edit request");
        };
        form.href = "/y".into();
        editor.submit_link(&form).unwrap();
        assert_eq!(editor.html(), r#"<p>a<a href="/y">go</a></p>"#);
    }

    #[test]
    fn popover_outside_root_hides() {
        let (mut editor, _) = mount(r#"<p><a href="/x">l</a></p>"#);
        let elsewhere = HeadlessDocument::parse(r#"<a href="/y">o</a>"#);
        let foreign = elsewhere.first_child().unwrap();
        let link = node(&editor, &[0, 0]);
        assert!(matches!(
            editor.refresh_popover(Some(link.clone()), None),
            PopoverChange::Shown(_)
        ));
        assert_eq!(editor.refresh_popover(Some(foreign), None), PopoverChange::Hidden);
        assert_eq!(editor.popover_action("unlink"), Err(EditorError::NoPopover));
    }

    #[test]
    fn cursor_inside_link_shows_popover() {
        let (mut editor, _) = mount(r#"<p>a<a href="/x">link</a></p>"#);
        let text = node(&editor, &[0, 1, 0]);
        editor.host().set_selection(&DomSelection::collapsed(text, 2));
        assert!(matches!(editor.refresh_cursor(), PopoverChange::Shown(_)));
        assert_eq!(editor.popover().kind(), Some(PopoverKind::Link));
        let text = node(&editor, &[0, 0]);
        editor.host().set_selection(&DomSelection::collapsed(text, 0));
        assert_eq!(editor.refresh_cursor(), PopoverChange::Hidden);
    }

    #[test]
    fn table_popover_actions_commit() {
        let (mut editor, observer) = mount("<table><tbody><tr><td>a</td></tr></tbody></table>");
        let cell = node(&editor, &[0, 0, 0, 0]);
        editor.refresh_popover(Some(cell.clone()), None);
        editor.popover_action("tableColumnAfter").unwrap();
        assert_eq!(
            editor.html(),
            "<table><tbody><tr><td>a</td><td><br></td></tr></tbody></table>"
        );
        assert_eq!(editor.history().len(), 2);
        assert!(editor.popover().current().is_none());
        assert_eq!(editor.host().selection(), Some(DomSelection::collapsed(cell.clone(), 0)));

        editor.refresh_popover(Some(cell), None);
        editor.popover_action("tableRemove").unwrap();
        assert_eq!(editor.html(), PLACEHOLDER);
        assert!(observer.is_observing());
    }

    #[test]
    fn image_popover_and_resize() {
        let (mut editor, _) = mount(r#"<p><img src="i.png"></p>"#);
        let image = node(&editor, &[0, 0]);
        editor.refresh_popover(Some(image.clone()), Some(Point { x: 1.0, y: 2.0 }));
        editor.popover_action("imageHalf").unwrap();
        assert_eq!(editor.html(), r#"<p><img src="i.png" style="width: 50%;"></p>"#);
        assert_eq!(editor.popover().current(), Some(&image));

        editor.resize_image(120.4, false).unwrap();
        assert_eq!(editor.history().len(), 2);
        editor.resize_image(130.6, true).unwrap();
        assert_eq!(editor.html(), r#"<p><img src="i.png" style="width: 131px;"></p>"#);
        assert_eq!(editor.history().len(), 3);

        editor.popover_action("imageRemove").unwrap();
        assert_eq!(editor.html(), PLACEHOLDER);
    }

    #[test]
    fn link_popover_unlink_runs_native_command() {
        let (mut editor, _) = mount(r#"<p><a href="/x">l</a></p>"#);
        editor.refresh_popover(Some(node(&editor, &[0, 0])), None);
        editor.popover_action("unlink").unwrap();
        assert!(editor.host().commands().contains(&("unlink".to_string(), None)));
        assert!(editor.host().selection().unwrap().is_collapsed());
        assert!(editor.popover().current().is_none());
        // The preview item is inert.
        editor.refresh_popover(Some(node(&editor, &[0, 0])), None);
        assert_eq!(editor.popover_action("link"), Ok(PopoverOutcome::Done));
    }

    #[test]
    fn keyboard_shortcuts() {
        let (mut editor, observer) = mount("<p>a</p>");
        let key = |c: &str| Key::character(c);
        assert_eq!(
            editor.handle_keydown(&KeyCombo::ctrl(key("b"))),
            Ok(KeydownResult::Handled)
        );
        assert!(editor.host().commands().contains(&("bold".to_string(), None)));

        native_edit(&mut editor, &observer, set_text(&[0, 0], "ab"));
        editor.handle_keydown(&KeyCombo::ctrl(key("z"))).unwrap();
        assert_eq!(editor.html(), "<p>a</p>");
        editor.handle_keydown(&KeyCombo::ctrl_shift(key("z"))).unwrap();
        assert_eq!(editor.html(), "<p>ab</p>");
        assert_eq!(
            editor.handle_keydown(&KeyCombo::new(key("q"))),
            Ok(KeydownResult::NotHandled)
        );
    }

    #[test]
    fn backspace_blocked_on_blank_root() {
        let (mut editor, _) = mount("");
        assert_eq!(
            editor.handle_keydown(&KeyCombo::new(Key::Backspace)),
            Ok(KeydownResult::Handled)
        );
        let (mut editor, _) = mount("<p><img src=x></p>");
        assert_eq!(
            editor.handle_keydown(&KeyCombo::new(Key::Backspace)),
            Ok(KeydownResult::NotHandled)
        );
    }

    #[test]
    fn forward_delete_adopts_next_heading() {
        let (mut editor, _) = mount("<p><br></p><h2>t</h2>");
        let empty = node(&editor, &[0]);
        editor.host().set_selection(&DomSelection::collapsed(empty, 0));
        assert_eq!(
            editor.handle_keydown(&KeyCombo::new(Key::Delete)),
            Ok(KeydownResult::NotHandled)
        );
        assert!(
            editor
                .host()
                .commands()
                .contains(&("formatBlock".to_string(), Some("h2".to_string())))
        );
    }

    #[test]
    fn dropped_text_and_images_insert_at_caret() {
        let (mut editor, _) = mount("<p>ab</p>");
        editor.drop_text("hi").unwrap();
        assert!(
            editor
                .host()
                .commands()
                .contains(&("insertText".to_string(), Some("hi".to_string())))
        );

        let text = node(&editor, &[0, 0]);
        editor.host().set_selection(&DomSelection::collapsed(text, 1));
        let image = editor.drop_image("data:image/png;base64,AAAA").unwrap();
        assert!(image.is_some());
        assert_eq!(editor.html(), r#"<p>a<img src="data:image/png;base64,AAAA">b</p>"#);
        assert_eq!(editor.history().len(), 2);
        assert_eq!(editor.drop_image("  "), Ok(None));
    }

    #[test]
    fn drops_refused_while_disabled_or_in_source() {
        let (mut editor, _) = mount("<p>a</p>");
        editor.disable();
        editor.drop_text("x").unwrap();
        assert_eq!(editor.drop_image("data:image/png;base64,AAAA"), Ok(None));
        editor.enable();
        editor.toggle_source().unwrap();
        editor.drop_text("x").unwrap();
        assert_eq!(editor.drop_image("data:image/png;base64,AAAA"), Ok(None));
        assert!(editor.host().commands().is_empty());
        assert_eq!(editor.html(), "<p>a</p>");
    }

    #[test]
    fn height_option_and_panel_resize() {
        let (mut editor, observer) = mount("<p>a</p>");
        assert_eq!(editor.root().get_attribute("style").as_deref(), Some("height: auto;"));
        assert!(editor.resize_panel(120.4));
        assert_eq!(editor.root().get_attribute("style").as_deref(), Some("height: 120px;"));
        assert_eq!(editor.html(), "<p>a</p>");
        assert_eq!(editor.history().len(), 1);
        assert!(observer.is_observing());

        let options = EditorOptions {
            height: "300px".into(),
            resizable: false,
            ..EditorOptions::default()
        };
        let mut fixed = Editor::mount(
            HeadlessHost::new("<p>a</p>"),
            HeadlessDocument::parse(""),
            HeadlessObserver::new(),
            options,
            Arc::new(Registry::standard()),
            Box::new(CascadeResolver::default()),
        )
        .unwrap();
        assert_eq!(fixed.root().get_attribute("style").as_deref(), Some("height: 300px;"));
        assert!(!fixed.resize_panel(50.0));
        assert_eq!(fixed.root().get_attribute("style").as_deref(), Some("height: 300px;"));
    }

    #[test]
    fn focus_events_reach_host() {
        let (mut editor, _) = mount("<p>a</p>");
        editor.handle_focus();
        editor.handle_blur();
        assert_eq!(
            editor.host().events(),
            vec![EditorEvent::Init, EditorEvent::Focus, EditorEvent::Blur]
        );
    }

    #[test]
    fn dispose_stops_everything() {
        let (mut editor, observer) = mount("<p>a</p>");
        editor.dispose();
        assert!(editor.is_disposed());
        assert!(!observer.is_observing());
        assert_eq!(editor.execute(Command::Bold), Err(EditorError::Disposed));
        assert_eq!(editor.undo(), Err(EditorError::Disposed));
        editor.handle_mutations(4);
        assert_eq!(editor.history().len(), 1);
    }

    #[test]
    fn invalid_options_fail_construction() {
        let options = EditorOptions {
            history_limit: 0,
            ..EditorOptions::default()
        };
        let result = Editor::mount(
            HeadlessHost::new(""),
            HeadlessDocument::parse(""),
            HeadlessObserver::new(),
            options,
            Arc::new(Registry::standard()),
            Box::new(CascadeResolver::default()),
        );
        assert!(matches!(result, Err(EditorError::InvalidOptions(_))));
    }
}
