//! PhotoCrop WASM - browser bindings for the PhotoCrop editor
//!
//! Exposes a `CropEditor` class that drives a `photocrop-core` editor from
//! JavaScript: file and drop input, proxied remote loads, canvas rendering,
//! and async export/delete callbacks.
//!
//! # Module Structure
//!
//! - `editor` - The `CropEditor` class
//! - `host` - Object URLs, body scroll lock, file reads and fetches
//! - `logger` - `log` backend writing to the browser console
//! - `types` - Serializable snapshots returned to JS
//!
//! # Usage
//!
//! ```typescript
//! import init, { CropEditor, set_log_level } from '@photocrop/wasm';
//!
//! await init();
//! set_log_level('debug');
//! const editor = new CropEditor();
//! await editor.open('cover');
//! ```

use wasm_bindgen::prelude::*;

mod editor;
mod host;
mod logger;
mod types;

pub use editor::JsCropEditor;
pub use host::{BodyScroll, BrowserTempUrls};
pub use types::{EditorSnapshot, ExportSummary};

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    logger::install(logger::default_level());
    log::info!("PhotoCrop {} ready", version());
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Change console log verbosity: `"error"`, `"warn"`, `"info"`, `"debug"`,
/// `"trace"` or `"off"`.
#[wasm_bindgen]
pub fn set_log_level(level: &str) -> Result<(), JsValue> {
    let filter = logger::parse_level(level)
        .ok_or_else(|| JsValue::from_str(&format!("Unknown log level: {}", level)))?;
    log::set_max_level(filter);
    Ok(())
}
