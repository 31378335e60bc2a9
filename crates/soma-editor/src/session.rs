//! One editing session: scene, selection, clipboard, history and the
//! pointer controller, driven by host events.
//!
//! Time comes from the host as milliseconds (`now_ms`). Edits that arrive in
//! bursts (drags, slider scrubbing, nudges) schedule a history commit one
//! settle delay in the future; [`EditorSession::tick`] performs it once due.
//! Structural edits (add, delete, duplicate, paste, background) commit
//! immediately.

use crate::config::EditorConfig;
use crate::controller::{Controller, PointerOutcome};
use crate::history::History;
use crate::input::{InputEvent, Modifiers};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use kurbo::{Point, Size, Vec2};
use soma_core::geometry::Guide;
use soma_core::{
    ApproxMeasurer, BackgroundSource, ElementId, Scene, TextElement, TextMeasurer, TextPatch,
};

/// Default preview surface size in physical pixels.
pub const DISPLAY_SIZE: Size = Size::new(900.0, 900.0);

/// Host hook fired after a quick-insert string lands on the canvas.
pub type InsertCallback = Box<dyn FnMut(&str)>;

/// Candidate and favorite strings offered as one-click inserts.
#[derive(Default)]
pub struct QuickInsert {
    pub candidates: Vec<String>,
    pub favorites: Vec<String>,
    on_insert: Option<InsertCallback>,
}

impl QuickInsert {
    pub fn set_on_insert(&mut self, callback: Option<InsertCallback>) {
        self.on_insert = callback;
    }

    fn notify(&mut self, text: &str) {
        if let Some(callback) = self.on_insert.as_mut() {
            callback(text);
        }
    }
}

pub struct EditorSession<M = ApproxMeasurer> {
    scene: Scene,
    selection: Option<ElementId>,
    clipboard: Option<TextElement>,
    history: History,
    controller: Controller,
    config: EditorConfig,
    measurer: M,
    display: Size,
    /// Deadline of the scheduled settle commit.
    pending_commit: Option<u64>,
    /// Set while an undo/redo result settles; suppresses scheduled commits.
    applying_history: bool,
    pub quick_insert: QuickInsert,
}

impl EditorSession<ApproxMeasurer> {
    pub fn new(scene: Scene) -> Self {
        Self::with_measurer(scene, EditorConfig::default(), ApproxMeasurer)
    }
}

impl<M: TextMeasurer> EditorSession<M> {
    pub fn with_measurer(scene: Scene, config: EditorConfig, measurer: M) -> Self {
        let history = History::new(config.history_capacity, &scene);
        Self {
            scene,
            selection: None,
            clipboard: None,
            history,
            controller: Controller::new(),
            config,
            measurer,
            display: DISPLAY_SIZE,
            pending_commit: None,
            applying_history: false,
            quick_insert: QuickInsert::default(),
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn measurer(&self) -> &M {
        &self.measurer
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Current selection, if it still refers to an element in the scene.
    pub fn selection(&self) -> Option<ElementId> {
        self.selection.filter(|id| self.scene.contains(*id))
    }

    pub fn selected_element(&self) -> Option<&TextElement> {
        self.selection().and_then(|id| self.scene.get(id))
    }

    pub fn clipboard(&self) -> Option<&TextElement> {
        self.clipboard.as_ref()
    }

    pub fn guides(&self) -> &[Guide] {
        self.controller.guides()
    }

    pub fn is_dragging(&self) -> bool {
        self.controller.is_dragging()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn has_pending_commit(&self) -> bool {
        self.pending_commit.is_some()
    }

    pub fn is_applying_history(&self) -> bool {
        self.applying_history
    }

    /// Physical size of the preview surface the pointer events refer to.
    pub fn set_display_size(&mut self, width: f64, height: f64) {
        if width > 0.0 && height > 0.0 {
            self.display = Size::new(width, height);
        }
    }

    pub fn display_size(&self) -> Size {
        self.display
    }

    pub fn select(&mut self, id: Option<ElementId>) {
        self.selection = id.filter(|id| self.scene.contains(*id));
    }

    // ─── History plumbing ────────────────────────────────────────────────

    fn commit_now(&mut self) {
        self.pending_commit = None;
        self.history.commit(&self.scene);
    }

    fn schedule_commit(&mut self, now_ms: u64) {
        if self.applying_history {
            log::trace!("session: commit suppressed while applying history");
            return;
        }
        self.pending_commit = Some(now_ms + self.config.settle_delay_ms);
    }

    /// Advance time: perform a due settle commit and let an undo/redo
    /// result settle. Returns whether a commit was attempted.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        self.applying_history = false;
        match self.pending_commit {
            Some(due) if now_ms >= due && !self.controller.is_dragging() => {
                self.commit_now();
                true
            }
            _ => false,
        }
    }

    /// Commit any scheduled snapshot right away.
    pub fn flush(&mut self) {
        if self.pending_commit.is_some() {
            self.commit_now();
        }
    }

    pub fn undo(&mut self) -> bool {
        self.flush();
        match self.history.undo() {
            Some(snapshot) => {
                self.apply_history(snapshot);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        self.flush();
        match self.history.redo() {
            Some(snapshot) => {
                self.apply_history(snapshot);
                true
            }
            None => false,
        }
    }

    fn apply_history(&mut self, snapshot: crate::history::Snapshot) {
        self.applying_history = true;
        self.controller.cancel();
        snapshot.restore_into(&mut self.scene);
        self.selection = None;
    }

    // ─── Scene operations ────────────────────────────────────────────────

    /// Insert `text` at the canvas center with the default style and select
    /// it. Blank strings are ignored.
    pub fn add_text(&mut self, text: &str) -> Option<ElementId> {
        if text.trim().is_empty() {
            return None;
        }
        self.flush();
        let id = self.scene.add_text(text).id;
        self.selection = Some(id);
        self.commit_now();
        Some(id)
    }

    /// Insert a candidate or favorite string and notify the host.
    pub fn insert_quick(&mut self, text: &str) -> Option<ElementId> {
        let id = self.add_text(text)?;
        self.quick_insert.notify(text);
        Some(id)
    }

    /// Merge `patch` into element `id`. Unknown ids are ignored.
    pub fn update_text(&mut self, id: ElementId, patch: &TextPatch, now_ms: u64) -> bool {
        let changed = self.scene.update_text(id, patch);
        if changed {
            self.schedule_commit(now_ms);
        }
        changed
    }

    pub fn update_selected(&mut self, patch: &TextPatch, now_ms: u64) -> bool {
        match self.selection() {
            Some(id) => self.update_text(id, patch, now_ms),
            None => false,
        }
    }

    pub fn set_visible(&mut self, id: ElementId, visible: bool, now_ms: u64) -> bool {
        let patch = TextPatch {
            visible: Some(visible),
            ..TextPatch::default()
        };
        self.update_text(id, &patch, now_ms)
    }

    pub fn delete_text(&mut self, id: ElementId) -> bool {
        if !self.scene.contains(id) {
            return false;
        }
        self.flush();
        if self.scene.delete_text(id).is_none() {
            return false;
        }
        if self.selection == Some(id) {
            self.selection = None;
        }
        self.commit_now();
        true
    }

    pub fn duplicate_text(&mut self, id: ElementId) -> Option<ElementId> {
        if !self.scene.contains(id) {
            return None;
        }
        self.flush();
        let copy = self.scene.duplicate_text(id, self.config.clone_offset)?;
        self.selection = Some(copy);
        self.commit_now();
        Some(copy)
    }

    pub fn copy_selected(&mut self) -> bool {
        match self.selected_element() {
            Some(element) => {
                log::debug!("session: copied {}", element.id);
                self.clipboard = Some(element.clone());
                true
            }
            None => false,
        }
    }

    /// Paste a fresh copy of the clipboard element, offset from it. The
    /// clipboard itself is left as it was.
    pub fn paste(&mut self) -> Option<ElementId> {
        let source = self.clipboard.clone()?;
        self.flush();
        let id = self.scene.paste_text(&source, self.config.clone_offset);
        self.selection = Some(id);
        self.commit_now();
        Some(id)
    }

    pub fn nudge_selected(&mut self, delta: Vec2, now_ms: u64) -> bool {
        let Some(element) = self.selected_element() else {
            return false;
        };
        let patch = TextPatch::position(element.x + delta.x, element.y + delta.y);
        self.update_selected(&patch, now_ms)
    }

    /// Set the background from a host reference string. Anything that is
    /// neither an inline image nor an http(s) URL is rejected and the
    /// current background is kept.
    pub fn set_background(&mut self, reference: Option<&str>) -> Result<bool, String> {
        let source = match reference {
            None => None,
            Some(raw) => match BackgroundSource::parse(raw) {
                Some(source) => Some(source),
                None => {
                    log::warn!("session: rejected background reference {raw:?}");
                    return Err(format!("unsupported background reference {raw:?}"));
                }
            },
        };
        if source == self.scene.background {
            return Ok(false);
        }
        self.flush();
        self.scene.background = source;
        self.commit_now();
        Ok(true)
    }

    // ─── View ────────────────────────────────────────────────────────────

    pub fn zoom_in(&mut self) {
        self.scene
            .view
            .zoom_in(self.config.zoom_step, self.config.max_zoom);
    }

    pub fn zoom_out(&mut self) {
        self.scene
            .view
            .zoom_out(self.config.zoom_step, self.config.min_zoom);
    }

    pub fn reset_view(&mut self) {
        self.scene.view.reset();
    }

    pub fn fit_to_screen(&mut self) {
        let padding = self.config.fit_padding;
        self.scene
            .view
            .fit(self.display.width, self.display.height, padding);
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.scene.view.pan_by(delta);
    }

    // ─── Input ───────────────────────────────────────────────────────────

    fn to_logical(&self, x: f64, y: f64) -> Point {
        self.scene
            .view
            .surface_to_logical(Point::new(x, y), self.display.width, self.display.height)
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) -> PointerOutcome {
        let p = self.to_logical(x, y);
        let outcome = self.controller.pointer_down(&self.scene, &self.measurer, p);
        match outcome {
            PointerOutcome::Grabbed(id) => self.selection = Some(id),
            PointerOutcome::Missed => self.selection = None,
            _ => {}
        }
        outcome
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> PointerOutcome {
        let p = self.to_logical(x, y);
        self.controller
            .pointer_move(&mut self.scene, p, self.config.snap_threshold)
    }

    pub fn pointer_up(&mut self, now_ms: u64) -> PointerOutcome {
        let outcome = self.controller.pointer_up();
        if let PointerOutcome::Released(_) = outcome {
            self.schedule_commit(now_ms);
        }
        outcome
    }

    /// Handle a key press. Returns the action that ran, if any.
    pub fn key_down(
        &mut self,
        key: &str,
        modifiers: Modifiers,
        in_text_input: bool,
        now_ms: u64,
    ) -> Option<ShortcutAction> {
        if in_text_input {
            return None;
        }
        let action = ShortcutMap::resolve(key, modifiers)?;
        if action.needs_selection() && self.selection().is_none() {
            log::trace!("session: {action:?} ignored without selection");
            return None;
        }
        log::debug!("session: shortcut {action:?}");

        match action {
            ShortcutAction::Undo => {
                self.undo();
            }
            ShortcutAction::Redo => {
                self.redo();
            }
            ShortcutAction::Copy => {
                self.copy_selected();
            }
            ShortcutAction::Paste => {
                self.paste();
            }
            ShortcutAction::Duplicate => {
                if let Some(id) = self.selection() {
                    self.duplicate_text(id);
                }
            }
            ShortcutAction::Delete => {
                if let Some(id) = self.selection() {
                    self.delete_text(id);
                }
            }
            ShortcutAction::Nudge { dx, dy, large } => {
                let step = if large {
                    self.config.nudge_step_large
                } else {
                    self.config.nudge_step
                };
                let delta = Vec2::new(f64::from(dx) * step, f64::from(dy) * step);
                self.nudge_selected(delta, now_ms);
            }
            ShortcutAction::ZoomIn => self.zoom_in(),
            ShortcutAction::ZoomOut => self.zoom_out(),
            ShortcutAction::ZoomReset => self.reset_view(),
            ShortcutAction::Deselect => self.selection = None,
        }
        Some(action)
    }

    /// Dispatch a platform-agnostic input event.
    pub fn handle(&mut self, event: &InputEvent, now_ms: u64) -> bool {
        match event {
            InputEvent::PointerDown { x, y } => {
                self.pointer_down(*x, *y) != PointerOutcome::Ignored
            }
            InputEvent::PointerMove { x, y } => {
                matches!(self.pointer_move(*x, *y), PointerOutcome::Moved(_))
            }
            InputEvent::PointerUp { .. } => {
                matches!(self.pointer_up(now_ms), PointerOutcome::Released(_))
            }
            InputEvent::Key {
                key,
                modifiers,
                in_text_input,
            } => self
                .key_down(key, *modifiers, *in_text_input, now_ms)
                .is_some(),
        }
    }
}
