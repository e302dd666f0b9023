//! A browser front end for authoring e-signature forms with quire.

mod geometry;
mod operations;

use geometry::overlay_boxes;
use operations::EditHistory;
use quire_fields::kurbo::{Point, Size};
use quire_fields::{
    Assignee, AuthoringSession, DragOutcome, Field, FieldId, PaletteEntry, PlacementSettings,
    default_palette,
};
use std::fmt::Display;
use wasm_bindgen::prelude::*;

/// Sends library logs to the browser console, and to the page's
/// `addLogEntry(level, message)` hook when it defines one.
struct ConsoleLogger;

impl ConsoleLogger {
    fn forward_to_page(level: log::Level, message: &JsValue) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Ok(hook) = js_sys::Reflect::get(&window, &JsValue::from_str("addLogEntry")) else {
            return;
        };
        if let Some(hook) = hook.dyn_ref::<js_sys::Function>() {
            let level = JsValue::from_str(&level.as_str().to_ascii_lowercase());
            // Exceptions thrown by the hook are dropped.
            let _ = hook.call2(&window, &level, message);
        }
    }
}

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let text = match record.line() {
            Some(line) => format!("[{}:{line}] {}", record.target(), record.args()),
            None => format!("[{}] {}", record.target(), record.args()),
        };
        let message = JsValue::from_str(&text);
        let print = match record.level() {
            log::Level::Error => web_sys::console::error_1,
            log::Level::Warn => web_sys::console::warn_1,
            log::Level::Info | log::Level::Debug | log::Level::Trace => web_sys::console::log_1,
        };
        print(&message);

        Self::forward_to_page(record.level(), &message);
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

fn js_error(err: impl Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn parse_level(level: &str) -> Option<log::LevelFilter> {
    match level.to_ascii_lowercase().as_str() {
        "off" => Some(log::LevelFilter::Off),
        "error" => Some(log::LevelFilter::Error),
        "warn" => Some(log::LevelFilter::Warn),
        "info" => Some(log::LevelFilter::Info),
        "debug" => Some(log::LevelFilter::Debug),
        "trace" => Some(log::LevelFilter::Trace),
        _ => None,
    }
}

fn parse_assignee(assignee: &str) -> Option<Assignee> {
    match assignee {
        "internal" => Some(Assignee::Internal),
        "external" => Some(Assignee::External),
        _ => None,
    }
}

/// Change how much of the library's logging reaches the browser console.
///
/// Accepts `off`, `error`, `warn`, `info`, `debug` or `trace`.
#[wasm_bindgen]
pub fn set_log_level(level: &str) -> bool {
    match parse_level(level) {
        Some(filter) => {
            log::set_max_level(filter);
            true
        }
        None => false,
    }
}

/// A drag-and-drop form builder for one document.
#[wasm_bindgen]
pub struct FormBuilder {
    session: AuthoringSession,
    settings: PlacementSettings,
    palette: Vec<PaletteEntry>,
    history: EditHistory,
    drag_snapshot: Option<Vec<Field>>,
}

#[wasm_bindgen]
impl FormBuilder {
    /// Create a builder on a blank document. `settings` is an optional JSON
    /// object overriding individual placement settings.
    #[wasm_bindgen(constructor)]
    pub fn new(settings: Option<String>) -> Result<FormBuilder, JsValue> {
        console_error_panic_hook::set_once();

        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(log::LevelFilter::Warn);
        }

        let settings = match settings {
            Some(json) => PlacementSettings::from_json(&json).map_err(js_error)?,
            None => PlacementSettings::default(),
        };

        Ok(Self {
            session: AuthoringSession::new(settings.clone()),
            settings,
            palette: default_palette(),
            history: EditHistory::default(),
            drag_snapshot: None,
        })
    }

    /// Load a document from the document service's JSON.
    ///
    /// Page images have to be reported again afterwards.
    #[wasm_bindgen]
    pub fn load_template(&mut self, json: &str) -> Result<(), JsValue> {
        self.session = AuthoringSession::from_json(json, self.settings.clone()).map_err(js_error)?;
        self.history.clear();
        self.drag_snapshot = None;
        Ok(())
    }

    /// The palette as a JSON array of `{type, label, category}`.
    #[wasm_bindgen]
    pub fn palette_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.palette).map_err(js_error)
    }

    #[wasm_bindgen]
    pub fn page_count(&self) -> u32 {
        self.session.pages().page_count()
    }

    /// The expected pixel size of a page preview, `[width, height]`.
    #[wasm_bindgen]
    pub fn raster_size(&self, page: u32) -> js_sys::Float64Array {
        let pages = self.session.pages();
        let size = pages.page(page).raster_size(pages.dpi());
        js_sys::Float64Array::from(&[size.width, size.height][..])
    }

    /// Report that a page image has loaded or been resized.
    #[wasm_bindgen]
    pub fn image_loaded(&mut self, page: u32, width: f64, height: f64) -> bool {
        self.session.image_loaded(page, Size::new(width, height))
    }

    #[wasm_bindgen]
    pub fn image_unloaded(&mut self, page: u32) {
        self.session.image_unloaded(page);
    }

    /// Create a field from the palette entry at `palette_index`, dropped at
    /// `(x, y)` on a page image. Returns the new field's id.
    #[wasm_bindgen]
    pub fn drop_field(&mut self, palette_index: usize, page: u32, x: f64, y: f64) -> Option<String> {
        let entry = self.palette.get(palette_index)?.clone();
        let before = self.session.placement().fields().to_vec();
        let id = self.session.drop_field(&entry, page, Point::new(x, y))?;
        self.history.push(before);
        Some(id.to_string())
    }

    /// Returns the id of the field that was pressed, if any.
    #[wasm_bindgen]
    pub fn pointer_down(&mut self, page: u32, x: f64, y: f64) -> Option<String> {
        let before = self.session.placement().fields().to_vec();
        let id = self.session.pointer_down(page, Point::new(x, y))?;
        self.drag_snapshot = Some(before);
        Some(id.to_string())
    }

    #[wasm_bindgen]
    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.session.pointer_move(Point::new(x, y))
    }

    /// Returns `"moved"`, `"clicked"`, or an empty string if nothing was pressed.
    #[wasm_bindgen]
    pub fn pointer_up(&mut self) -> String {
        let snapshot = self.drag_snapshot.take();
        match self.session.pointer_up() {
            Some(DragOutcome::Moved(_)) => {
                if let Some(before) = snapshot {
                    self.history.push(before);
                }
                "moved".to_string()
            }
            Some(DragOutcome::Clicked(_)) => "clicked".to_string(),
            None => String::new(),
        }
    }

    #[wasm_bindgen]
    pub fn pointer_leave(&mut self) {
        let moved = self.session.placement().dragging().is_some();
        let snapshot = self.drag_snapshot.take();
        self.session.pointer_leave();
        if let (true, Some(before)) = (moved, snapshot) {
            self.history.push(before);
        }
    }

    #[wasm_bindgen]
    pub fn delete_field(&mut self, id: &str) -> bool {
        self.record(|session| session.delete_field(&FieldId::new(id)).is_some())
    }

    #[wasm_bindgen]
    pub fn rename_field(&mut self, id: &str, name: &str) -> bool {
        self.edit(id, |field| {
            field.rename(name);
            true
        })
    }

    #[wasm_bindgen]
    pub fn set_required(&mut self, id: &str, required: bool) -> bool {
        self.edit(id, |field| {
            field.set_required(required);
            true
        })
    }

    /// `assignee` is `"internal"` or `"external"`.
    #[wasm_bindgen]
    pub fn set_assigned_to(&mut self, id: &str, assignee: &str) -> bool {
        let Some(assignee) = parse_assignee(assignee) else {
            return false;
        };
        self.edit(id, |field| {
            field.set_assigned_to(assignee);
            true
        })
    }

    /// Append an option, named `Option <n>` unless `label` is given.
    #[wasm_bindgen]
    pub fn add_option(&mut self, id: &str, label: Option<String>) -> bool {
        self.edit(id, |field| {
            let label = label.unwrap_or_else(|| field.next_option_label());
            field.add_option(label)
        })
    }

    #[wasm_bindgen]
    pub fn edit_option(&mut self, id: &str, index: usize, label: &str) -> bool {
        self.edit(id, |field| field.edit_option(index, label))
    }

    #[wasm_bindgen]
    pub fn remove_option(&mut self, id: &str, index: usize) -> bool {
        self.edit(id, |field| field.remove_option(index))
    }

    #[wasm_bindgen]
    pub fn set_default_option(&mut self, id: &str, option: Option<String>) -> bool {
        self.edit(id, |field| field.set_default_option(option))
    }

    #[wasm_bindgen]
    pub fn select(&mut self, id: &str) -> bool {
        self.session.select(&FieldId::new(id))
    }

    #[wasm_bindgen]
    pub fn clear_selection(&mut self) {
        self.session.clear_selection();
    }

    #[wasm_bindgen]
    pub fn selected_field_id(&self) -> Option<String> {
        self.session.placement().selected().map(FieldId::to_string)
    }

    #[wasm_bindgen]
    pub fn set_active_page(&mut self, page: u32) {
        self.session.set_active_page(page);
    }

    #[wasm_bindgen]
    pub fn active_page(&self) -> u32 {
        self.session.placement().active_page()
    }

    /// A field as JSON, in the document service's format.
    #[wasm_bindgen]
    pub fn field_json(&self, id: &str) -> Result<Option<String>, JsValue> {
        self.session
            .placement()
            .field(&FieldId::new(id))
            .map(|field| serde_json::to_string(field).map_err(js_error))
            .transpose()
    }

    /// The overlay boxes of all fields on loaded pages, as a JSON array.
    #[wasm_bindgen]
    pub fn overlays_json(&mut self) -> Result<String, JsValue> {
        serde_json::to_string(&overlay_boxes(self.session.overlays())).map_err(js_error)
    }

    /// The document as JSON for the document service.
    #[wasm_bindgen]
    pub fn save(&self) -> Result<String, JsValue> {
        let payload = self.session.save_payload().map_err(js_error)?;
        payload.to_json().map_err(js_error)
    }

    #[wasm_bindgen]
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.history.undo(self.session.placement().fields()) else {
            return false;
        };
        self.session.restore(previous);
        true
    }

    #[wasm_bindgen]
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.history.redo(self.session.placement().fields()) else {
            return false;
        };
        self.session.restore(next);
        true
    }

    #[wasm_bindgen]
    pub fn can_undo(&self) -> bool {
        self.history.undo_count() > 0
    }

    #[wasm_bindgen]
    pub fn can_redo(&self) -> bool {
        self.history.redo_count() > 0
    }

    fn record(&mut self, change: impl FnOnce(&mut AuthoringSession) -> bool) -> bool {
        let before = self.session.placement().fields().to_vec();
        let changed = change(&mut self.session);
        if changed {
            self.history.push(before);
        }
        changed
    }

    fn edit(&mut self, id: &str, edit: impl FnOnce(&mut Field) -> bool) -> bool {
        let id = FieldId::new(id);
        self.record(|session| session.edit_field(&id, edit).unwrap_or(false))
    }
}
