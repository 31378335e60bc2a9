//! WASM bridge for Soma Canvas — exposes the editor session to the page.
//!
//! Compiled via `wasm-pack build --target web`. The page owns the `<canvas>`
//! element and the animation loop; it forwards pointer/keyboard events,
//! calls `tick` and `render` every frame, and passes `performance.now()` (or
//! `Date.now()`) wherever a `now_ms` is expected.

mod canvas2d;
mod console_log;

use canvas2d::{Canvas2dSurface, CanvasExportBackend, CanvasMeasurer};
use kurbo::Vec2;
use serde::Serialize;
use soma_core::{BackgroundSource, CachedMeasurer, ElementId, Scene};
use soma_editor::props::{element_json, property_patch};
use soma_editor::{EditorConfig, EditorSession, Modifiers, PointerOutcome, ShortcutAction};
use soma_render::background::{BackgroundSlot, Fetch, LoadState, LoadTicket};
use soma_render::export::{ExportFormat, ExportRequest, PRESETS, export_image};
use soma_render::paint::{Overlay, render_preview};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlAnchorElement, HtmlImageElement};

type SharedBackground = Rc<RefCell<BackgroundSlot<HtmlImageElement>>>;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct KeyResult {
    handled: bool,
    action: &'static str,
    can_undo: bool,
    can_redo: bool,
}

/// The main WASM-facing canvas controller.
#[wasm_bindgen]
pub struct SomaCanvas {
    session: EditorSession<CachedMeasurer<CanvasMeasurer>>,
    background: SharedBackground,
    /// Called with the load state name whenever the background settles.
    on_background_state: Rc<RefCell<Option<js_sys::Function>>>,
}

#[wasm_bindgen]
impl SomaCanvas {
    /// Create a controller for a preview canvas whose 2D context is `ctx`.
    /// `config_json` may be empty for defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(
        ctx: CanvasRenderingContext2d,
        width: f64,
        height: f64,
        config_json: &str,
        log_level: &str,
    ) -> Result<SomaCanvas, JsValue> {
        console_log::init(console_log::parse_level(log_level));

        let config = if config_json.trim().is_empty() {
            EditorConfig::default()
        } else {
            EditorConfig::from_json(config_json).map_err(|e| JsValue::from_str(&e))?
        };
        let measurer = CachedMeasurer::new(CanvasMeasurer::new(ctx));
        let mut session = EditorSession::with_measurer(Scene::new(), config, measurer);
        session.set_display_size(width, height);
        log::info!("soma canvas ready ({width}x{height})");

        Ok(Self {
            session,
            background: Rc::new(RefCell::new(BackgroundSlot::new())),
            on_background_state: Rc::new(RefCell::new(None)),
        })
    }

    /// Paint the preview onto `ctx`.
    pub fn render(&self, ctx: &CanvasRenderingContext2d) {
        let size = self.session.display_size();
        let mut surface = Canvas2dSurface::new(ctx.clone(), size.width, size.height);
        let overlay = Overlay {
            selection: self.session.selection(),
            guides: self.session.guides(),
        };
        let slot = self.background.borrow();
        render_preview(&mut surface, self.session.scene(), slot.backdrop(), &overlay);
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.session.set_display_size(width, height);
    }

    /// Advance time. Returns `true` when a history commit happened.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        self.session.tick(now_ms as u64)
    }

    /// Web fonts finished loading: cached measurements are stale.
    pub fn fonts_loaded(&self) {
        self.session.measurer().invalidate();
    }

    // ─── Pointer API ─────────────────────────────────────────────────────

    /// Returns the selected element id after the press, or -1.
    pub fn handle_pointer_down(&mut self, x: f64, y: f64) -> f64 {
        match self.session.pointer_down(x, y) {
            PointerOutcome::Grabbed(id) => id.get() as f64,
            _ => -1.0,
        }
    }

    pub fn handle_pointer_move(&mut self, x: f64, y: f64) -> bool {
        matches!(self.session.pointer_move(x, y), PointerOutcome::Moved(_))
    }

    pub fn handle_pointer_up(&mut self, now_ms: f64) -> bool {
        matches!(
            self.session.pointer_up(now_ms as u64),
            PointerOutcome::Released(_)
        )
    }

    // ─── Keyboard Shortcut API ───────────────────────────────────────────

    /// Handle a keyboard event. Returns JSON
    /// `{"handled":bool,"action":"<name>","canUndo":bool,"canRedo":bool}`.
    #[allow(clippy::too_many_arguments)]
    pub fn handle_key(
        &mut self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
        in_text_input: bool,
        now_ms: f64,
    ) -> String {
        let modifiers = Modifiers {
            ctrl,
            shift,
            alt,
            meta,
        };
        let action = self
            .session
            .key_down(key, modifiers, in_text_input, now_ms as u64);
        if matches!(action, Some(ShortcutAction::Undo | ShortcutAction::Redo)) {
            self.sync_background();
        }
        let result = KeyResult {
            handled: action.is_some(),
            action: action.map_or("none", action_to_name),
            can_undo: self.session.can_undo(),
            can_redo: self.session.can_redo(),
        };
        serde_json::to_string(&result).unwrap_or_else(|_| "{}".to_string())
    }

    // ─── Edit API ────────────────────────────────────────────────────────

    /// Insert custom text. Returns the new id, or -1 for blank input.
    pub fn add_text(&mut self, text: &str) -> f64 {
        self.session.add_text(text).map_or(-1.0, |id| id.get() as f64)
    }

    /// Insert a candidate or favorite string; fires the insert callback.
    pub fn insert_quick(&mut self, text: &str) -> f64 {
        self.session
            .insert_quick(text)
            .map_or(-1.0, |id| id.get() as f64)
    }

    pub fn set_candidates_json(&mut self, json: &str) -> Result<(), JsValue> {
        self.session.quick_insert.candidates = parse_string_list(json)?;
        Ok(())
    }

    pub fn set_favorites_json(&mut self, json: &str) -> Result<(), JsValue> {
        self.session.quick_insert.favorites = parse_string_list(json)?;
        Ok(())
    }

    /// `{"candidates":[...],"favorites":[...]}`
    pub fn get_quick_insert_json(&self) -> String {
        serde_json::json!({
            "candidates": self.session.quick_insert.candidates,
            "favorites": self.session.quick_insert.favorites,
        })
        .to_string()
    }

    /// Register `callback(text)` fired after a quick insert, or clear it.
    pub fn set_on_insert(&mut self, callback: Option<js_sys::Function>) {
        let hook = callback.map(|f| {
            Box::new(move |text: &str| {
                if let Err(e) = f.call1(&JsValue::NULL, &JsValue::from_str(text)) {
                    log::warn!("insert callback threw: {e:?}");
                }
            }) as soma_editor::InsertCallback
        });
        self.session.quick_insert.set_on_insert(hook);
    }

    pub fn delete_selected(&mut self) -> bool {
        match self.session.selection() {
            Some(id) => self.session.delete_text(id),
            None => false,
        }
    }

    pub fn duplicate_selected(&mut self) -> bool {
        match self.session.selection() {
            Some(id) => self.session.duplicate_text(id).is_some(),
            None => false,
        }
    }

    pub fn copy_selected(&mut self) -> bool {
        self.session.copy_selected()
    }

    pub fn paste(&mut self) -> bool {
        self.session.paste().is_some()
    }

    pub fn set_visible(&mut self, id: f64, visible: bool, now_ms: f64) -> bool {
        self.session
            .set_visible(ElementId::from_raw(id as u64), visible, now_ms as u64)
    }

    pub fn select_by_id(&mut self, id: f64) -> bool {
        let id = (id >= 0.0).then(|| ElementId::from_raw(id as u64));
        self.session.select(id);
        self.session.selection().is_some()
    }

    pub fn undo(&mut self) -> bool {
        let changed = self.session.undo();
        self.sync_background();
        changed
    }

    pub fn redo(&mut self) -> bool {
        let changed = self.session.redo();
        self.sync_background();
        changed
    }

    pub fn can_undo(&self) -> bool {
        self.session.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.session.can_redo()
    }

    // ─── Properties Panel API ────────────────────────────────────────────

    /// Properties of the selected element as JSON, or `{}`.
    pub fn get_selected_props(&self) -> String {
        match self.session.selected_element() {
            Some(element) => element_json(element).to_string(),
            None => "{}".to_string(),
        }
    }

    /// Layers in paint order: `[{"id":..,"text":..,"visible":..},...]`.
    pub fn get_elements_json(&self) -> String {
        let layers: Vec<serde_json::Value> = self
            .session
            .scene()
            .elements
            .iter()
            .map(|e| serde_json::json!({ "id": e.id.get(), "text": e.text, "visible": e.visible }))
            .collect();
        serde_json::Value::Array(layers).to_string()
    }

    /// Set one property of the selected element. `value_json` is a JSON
    /// literal (`48`, `"#2FFFCC"`, `true`). Returns whether it changed.
    pub fn set_selected_prop(
        &mut self,
        key: &str,
        value_json: &str,
        now_ms: f64,
    ) -> Result<bool, JsValue> {
        let value: serde_json::Value = serde_json::from_str(value_json)
            .map_err(|e| JsValue::from_str(&format!("{key}: {e}")))?;
        let patch = property_patch(key, &value).map_err(|e| JsValue::from_str(&e))?;
        Ok(self.session.update_selected(&patch, now_ms as u64))
    }

    // ─── View API ────────────────────────────────────────────────────────

    pub fn zoom_in(&mut self) {
        self.session.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.session.zoom_out();
    }

    pub fn reset_view(&mut self) {
        self.session.reset_view();
    }

    pub fn fit_to_screen(&mut self) {
        self.session.fit_to_screen();
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.session.pan_by(Vec2::new(dx, dy));
    }

    pub fn zoom_percent(&self) -> u32 {
        self.session.scene().view.zoom_percent()
    }

    // ─── Background API ──────────────────────────────────────────────────

    /// Set the background from an inline `data:image/...` URL or an http(s)
    /// URL. Pass `None` to clear. Rejected references leave the current
    /// background in place.
    pub fn set_background(&mut self, reference: Option<String>) -> Result<(), JsValue> {
        self.session
            .set_background(reference.as_deref())
            .map_err(|e| JsValue::from_str(&e))?;
        self.sync_background();
        Ok(())
    }

    /// `"unset" | "loading" | "loaded" | "failed"`
    pub fn background_state(&self) -> String {
        state_name(self.background.borrow().state()).to_string()
    }

    /// Whether the background must be converted to inline data by the host
    /// before an export can read the canvas back.
    pub fn background_needs_conversion(&self) -> bool {
        self.session
            .scene()
            .background
            .as_ref()
            .is_some_and(|b| !b.is_export_safe())
    }

    pub fn set_on_background_state(&mut self, callback: Option<js_sys::Function>) {
        *self.on_background_state.borrow_mut() = callback;
    }

    // ─── Export API ──────────────────────────────────────────────────────

    /// `[{"name":..,"width":..,"height":..,"format":"png"},...]`
    pub fn get_presets_json(&self) -> String {
        let presets: Vec<serde_json::Value> = PRESETS
            .iter()
            .map(|p| {
                serde_json::json!({
                    "name": p.name,
                    "width": p.width,
                    "height": p.height,
                    "format": p.format.extension(),
                })
            })
            .collect();
        serde_json::Value::Array(presets).to_string()
    }

    /// Export with a named preset and trigger a download. Returns the
    /// filename.
    pub fn export_preset(&self, name: &str, now_ms: f64) -> Result<String, JsValue> {
        let request = ExportRequest::preset(name)
            .ok_or_else(|| JsValue::from_str(&format!("unknown export preset {name:?}")))?;
        self.export_and_download(&request, now_ms)
    }

    /// Export at an arbitrary size; `format` is `"png"` or `"jpg"`.
    pub fn export_custom(
        &self,
        width: u32,
        height: u32,
        format: &str,
        now_ms: f64,
    ) -> Result<String, JsValue> {
        let format = ExportFormat::parse(format)
            .ok_or_else(|| JsValue::from_str(&format!("unknown export format {format:?}")))?;
        let request = ExportRequest::custom(width, height, format)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.export_and_download(&request, now_ms)
    }
}

impl SomaCanvas {
    /// Bring the background slot in line with the scene's reference,
    /// starting a load when it changed.
    fn sync_background(&mut self) {
        let source = self.session.scene().background.clone();
        let ticket = self.background.borrow_mut().request(source.clone());
        if let (Some(ticket), Some(source)) = (ticket, source) {
            let fetch = Fetch::first(&source);
            start_load(
                &self.background,
                &self.on_background_state,
                ticket,
                source,
                fetch,
            );
        }
    }

    fn export_and_download(&self, request: &ExportRequest, now_ms: f64) -> Result<String, JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document available"))?;
        let mut backend = CanvasExportBackend::new(document.clone());

        let slot = self.background.borrow();
        let asset = slot
            .export_backdrop()
            .and_then(|backdrop| {
                export_image(
                    &mut backend,
                    self.session.scene(),
                    backdrop,
                    request,
                    now_ms as u64,
                )
            })
            .map_err(|e| {
                log::error!("export failed: {e}");
                JsValue::from_str(&e.to_string())
            })?;

        let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
        anchor.set_href(&asset.data);
        anchor.set_download(&asset.filename);
        anchor.click();
        log::info!("exported {} ({}x{})", asset.filename, asset.width, asset.height);
        Ok(asset.filename)
    }
}

/// Load `source` into a fresh image element. A failed CORS attempt is
/// retried as a plain request so the preview still shows the image.
fn start_load(
    slot: &SharedBackground,
    callback: &Rc<RefCell<Option<js_sys::Function>>>,
    ticket: LoadTicket,
    source: BackgroundSource,
    fetch: Fetch,
) {
    let image = match HtmlImageElement::new() {
        Ok(image) => image,
        Err(e) => {
            let reason = format!("could not create image element: {e:?}");
            slot.borrow_mut().resolve(ticket, Err(reason));
            notify_state(slot, callback);
            return;
        }
    };
    if fetch == Fetch::Anonymous {
        image.set_cross_origin(Some("anonymous"));
    }

    let on_load = {
        let slot = Rc::clone(slot);
        let callback = Rc::clone(callback);
        let loaded = image.clone();
        Closure::once_into_js(move || {
            slot.borrow_mut().resolve(ticket, Ok(loaded));
            notify_state(&slot, &callback);
        })
    };
    let on_error = {
        let slot = Rc::clone(slot);
        let callback = Rc::clone(callback);
        let source = source.clone();
        Closure::once_into_js(move || {
            let retry = slot.borrow_mut().retry(ticket, fetch);
            match retry {
                Some(next) => start_load(&slot, &callback, ticket, source, next),
                None => {
                    slot.borrow_mut()
                        .resolve(ticket, Err("image failed to load".into()));
                    notify_state(&slot, &callback);
                }
            }
        })
    };
    image.set_onload(Some(on_load.unchecked_ref()));
    image.set_onerror(Some(on_error.unchecked_ref()));
    image.set_src(source.as_str());
}

fn notify_state(
    slot: &SharedBackground,
    callback: &Rc<RefCell<Option<js_sys::Function>>>,
) {
    let name = state_name(slot.borrow().state());
    if let Some(f) = callback.borrow().as_ref()
        && let Err(e) = f.call1(&JsValue::NULL, &JsValue::from_str(name))
    {
        log::warn!("background state callback threw: {e:?}");
    }
}

fn state_name<I>(state: &LoadState<I>) -> &'static str {
    match state {
        LoadState::Unset => "unset",
        LoadState::Loading => "loading",
        LoadState::Loaded(_) => "loaded",
        LoadState::Failed(_) => "failed",
    }
}

fn parse_string_list(json: &str) -> Result<Vec<String>, JsValue> {
    serde_json::from_str(json).map_err(|e| JsValue::from_str(&format!("expected a string array: {e}")))
}

fn action_to_name(action: ShortcutAction) -> &'static str {
    match action {
        ShortcutAction::Undo => "undo",
        ShortcutAction::Redo => "redo",
        ShortcutAction::Copy => "copy",
        ShortcutAction::Paste => "paste",
        ShortcutAction::Duplicate => "duplicate",
        ShortcutAction::Delete => "delete",
        ShortcutAction::Nudge { .. } => "nudge",
        ShortcutAction::ZoomIn => "zoomIn",
        ShortcutAction::ZoomOut => "zoomOut",
        ShortcutAction::ZoomReset => "zoomReset",
        ShortcutAction::Deselect => "deselect",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn state_names() {
        assert_eq!(state_name::<()>(&LoadState::Unset), "unset");
        assert_eq!(state_name::<()>(&LoadState::Failed("x".into())), "failed");
    }

    #[test]
    fn string_lists_parse() {
        assert_eq!(
            parse_string_list(r#"["a","b"]"#).ok(),
            Some(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn action_names_are_camel_case() {
        assert_eq!(action_to_name(ShortcutAction::ZoomReset), "zoomReset");
        assert_eq!(
            action_to_name(ShortcutAction::Nudge {
                dx: 1,
                dy: 0,
                large: false
            }),
            "nudge"
        );
    }
}
