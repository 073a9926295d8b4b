//! The `CropEditor` JavaScript class.
//!
//! Wraps a core editor in `Rc<RefCell<_>>` so async methods (file reads,
//! proxied fetches, upload callbacks) can reach it after awaiting. Borrows
//! are never held across an `await`.
//!
//! ```typescript
//! const editor = new CropEditor({ maxFileSize: 5 * 1024 * 1024 });
//! await editor.open('profile', undefined, undefined, user.avatarUrl);
//! canvas.onwheel = (e) => { editor.wheel(e); editor.render(ctx); };
//! await editor.export(async (file) => upload(file));
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Function, Promise};
use photocrop_core::acquire::validate_file;
use photocrop_core::resources::ScrollLock;
use photocrop_core::{
    AcquireError, CropEditor, EditorConfig, EditorError, FileOrigin, FilterPreset, ImageKind,
    LoadOutcome, OpenOptions,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::Clamped;
use wasm_bindgen_futures::future_to_promise;
use web_sys::{CanvasRenderingContext2d, DragEvent, File, ImageData, WheelEvent};

use crate::host::{self, BodyScroll, BrowserTempUrls};
use crate::types::{js_error_message, to_js_error, EditorSnapshot, ExportSummary};

type Inner = Rc<RefCell<CropEditor<BrowserTempUrls>>>;

thread_local! {
    /// One body scroll lock shared by every editor on the page.
    static PAGE_SCROLL: ScrollLock = ScrollLock::new(Rc::new(BodyScroll::default()));
}

/// Alert for mistakes the user can fix, then convert to a JS error.
fn report(err: EditorError) -> JsValue {
    if let EditorError::Acquire(ref e) = err {
        if e.is_user_facing() {
            host::alert(&e.to_string());
        }
    }
    to_js_error(err)
}

#[wasm_bindgen(js_name = CropEditor)]
pub struct JsCropEditor {
    inner: Inner,
}

#[wasm_bindgen(js_class = CropEditor)]
impl JsCropEditor {
    /// Create an editor. `config` is an optional partial `EditorConfig`
    /// object with camelCase keys.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsCropEditor, JsValue> {
        let config: EditorConfig = if config.is_undefined() || config.is_null() {
            EditorConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        let mut editor = CropEditor::with_config(config, BrowserTempUrls).map_err(to_js_error)?;
        editor = editor.with_scroll_lock(PAGE_SCROLL.with(ScrollLock::clone));
        if let Some(origin) = host::page_origin() {
            editor = editor.with_page_origin(origin);
        }
        Ok(JsCropEditor {
            inner: Rc::new(RefCell::new(editor)),
        })
    }

    /// Open for `"profile"` or `"cover"`. Resolves once the initial image
    /// (if any) has loaded.
    pub fn open(
        &self,
        kind: &str,
        target_width: Option<u32>,
        target_height: Option<u32>,
        initial_url: Option<String>,
    ) -> Result<Promise, JsValue> {
        let kind: ImageKind = kind.parse().map_err(to_js_error)?;
        let options = OpenOptions {
            kind,
            target_width,
            target_height,
            initial_url,
        };
        let remote = self.inner.borrow_mut().open(options).map_err(to_js_error)?;

        let inner = self.inner.clone();
        Ok(future_to_promise(async move {
            let Some(load) = remote else {
                return Ok(JsValue::UNDEFINED);
            };
            let fetched = host::fetch_bytes(&load.fetch_url)
                .await
                .map_err(|e| js_error_message(&e));
            let outcome = inner
                .borrow_mut()
                .complete_remote_load(load.ticket, fetched)
                .map_err(to_js_error)?;
            Ok(JsValue::from_bool(outcome == LoadOutcome::Loaded))
        }))
    }

    pub fn close(&self) {
        self.inner.borrow_mut().close();
    }

    /// Load a file from an `<input type="file">`.
    pub fn load_file(&self, file: File) -> Promise {
        self.load(file, FileOrigin::Picker)
    }

    /// Load the first file of a drop event.
    pub fn load_drop(&self, event: DragEvent) -> Result<Promise, JsValue> {
        event.prevent_default();
        let files = event.data_transfer().and_then(|dt| dt.files());
        let count = files.as_ref().map_or(0, |f| f.length());
        match files.and_then(|f| f.get(0)) {
            Some(file) => {
                if count > 1 {
                    log::debug!("Dropped {} files, using \"{}\"", count, file.name());
                }
                Ok(self.load(file, FileOrigin::DragDrop))
            }
            None => Err(report(AcquireError::NoFile.into())),
        }
    }

    /// Resolves `true` once loaded, or `false` if the editor moved on while
    /// the file was being read.
    fn load(&self, file: File, origin: FileOrigin) -> Promise {
        let inner = self.inner.clone();
        future_to_promise(async move {
            // Check type and size before reading the whole file.
            let max = inner.borrow().config().max_file_size;
            if let Err(e) = validate_file(&file.type_(), file.size() as u64, max) {
                log::warn!("Rejected \"{}\": {}", file.name(), e);
                return Err(report(e.into()));
            }
            let ticket = inner.borrow_mut().begin_file_load(&file.name()).map_err(report)?;
            let selected = host::read_file(&file, origin).await?;
            let outcome = inner
                .borrow_mut()
                .complete_file_load(ticket, selected)
                .map_err(report)?;
            Ok(JsValue::from_bool(outcome == LoadOutcome::Loaded))
        })
    }

    pub fn set_viewport(&self, width: u32, height: u32) {
        self.inner.borrow_mut().set_viewport(width, height);
    }

    pub fn pointer_down(&self, x: f64, y: f64) {
        self.inner.borrow_mut().pointer_down(x, y);
    }

    pub fn pointer_move(&self, x: f64, y: f64) {
        self.inner.borrow_mut().pointer_move(x, y);
    }

    pub fn pointer_up(&self) {
        self.inner.borrow_mut().pointer_up();
    }

    pub fn pointer_leave(&self) {
        self.inner.borrow_mut().pointer_leave();
    }

    /// Zoom from a wheel event, keeping the page from scrolling.
    pub fn wheel(&self, event: WheelEvent) {
        if self.inner.borrow_mut().wheel(event.delta_y()) {
            event.prevent_default();
        }
    }

    pub fn rotate_left(&self) {
        self.inner.borrow_mut().rotate_left();
    }

    pub fn rotate_right(&self) {
        self.inner.borrow_mut().rotate_right();
    }

    pub fn set_straighten(&self, degrees: f64) {
        self.inner.borrow_mut().set_straighten(degrees);
    }

    pub fn set_brightness(&self, value: f32) {
        self.inner.borrow_mut().set_brightness(value);
    }

    pub fn set_contrast(&self, value: f32) {
        self.inner.borrow_mut().set_contrast(value);
    }

    pub fn set_saturation(&self, value: f32) {
        self.inner.borrow_mut().set_saturation(value);
    }

    pub fn set_vignette(&self, value: f32) {
        self.inner.borrow_mut().set_vignette(value);
    }

    pub fn apply_preset(&self, name: &str) -> Result<(), JsValue> {
        let preset: FilterPreset = name.parse().map_err(to_js_error)?;
        self.inner.borrow_mut().apply_preset(preset);
        Ok(())
    }

    /// Names of the available presets, in display order.
    pub fn presets() -> Vec<String> {
        FilterPreset::ALL.iter().map(|p| p.name().to_string()).collect()
    }

    pub fn reset(&self) {
        self.inner.borrow_mut().reset();
    }

    /// True once after every state change.
    pub fn needs_redraw(&self) -> bool {
        self.inner.borrow_mut().take_dirty()
    }

    /// Draw the preview onto a 2D context sized to the viewport.
    pub fn render(&self, ctx: &CanvasRenderingContext2d) -> Result<(), JsValue> {
        let surface = self.inner.borrow().render_preview().map_err(to_js_error)?;
        let rgba = surface.to_rgba();
        let data = ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(&rgba[..]),
            surface.width,
            surface.height,
        )?;
        ctx.put_image_data(&data, 0.0, 0.0)
    }

    /// Export the crop and pass it to `on_cropped(file)`. Resolves with a
    /// summary and closes the editor once the callback succeeds. A failed
    /// callback rejects and keeps the editor open.
    pub fn export(&self, on_cropped: Function) -> Promise {
        let inner = self.inner.clone();
        future_to_promise(async move {
            let pending = inner.borrow_mut().begin_export().map_err(to_js_error)?;
            let (file, ticket) = pending.into_parts();
            let js_file = host::to_js_file(&file.bytes, &file.name, &file.mime)?;

            let delivered = host::call_maybe_async(&on_cropped, js_file.as_ref())
                .await
                .map_err(|e| js_error_message(&e));
            let outcome = inner
                .borrow_mut()
                .finish_export(ticket, delivered)
                .map_err(to_js_error)?;
            Ok(serde_wasm_bindgen::to_value(&ExportSummary::from(outcome))?)
        })
    }

    /// Run `on_delete()` and close the editor once it succeeds.
    pub fn delete(&self, on_delete: Function) -> Promise {
        let inner = self.inner.clone();
        future_to_promise(async move {
            let guard = inner.borrow_mut().begin_delete().map_err(to_js_error)?;
            let deleted = host::call_maybe_async(&on_delete, &JsValue::UNDEFINED)
                .await
                .map_err(|e| js_error_message(&e));
            inner.borrow_mut().finish_delete(guard, deleted).map_err(to_js_error)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Current state as a plain object.
    pub fn state(&self) -> Result<JsValue, JsValue> {
        let snapshot = EditorSnapshot::from(&*self.inner.borrow());
        Ok(serde_wasm_bindgen::to_value(&snapshot)?)
    }

    #[wasm_bindgen(getter)]
    pub fn is_open(&self) -> bool {
        self.inner.borrow().is_open()
    }

    #[wasm_bindgen(getter)]
    pub fn is_processing(&self) -> bool {
        self.inner.borrow().is_processing()
    }

    #[wasm_bindgen(getter)]
    pub fn has_image(&self) -> bool {
        self.inner.borrow().has_image()
    }

    /// Object URL of the loaded local file, for a thumbnail.
    #[wasm_bindgen(getter)]
    pub fn preview_url(&self) -> Option<String> {
        self.inner.borrow().temp_url().map(str::to_string)
    }
}
