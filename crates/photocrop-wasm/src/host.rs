//! Browser implementations of the editor's host resources, plus the async
//! reads (local files, proxied fetches) that feed it.

use std::cell::RefCell;

use js_sys::{Array, Uint8Array};
use photocrop_core::resources::{PageScroll, TempUrlStore};
use photocrop_core::{FileOrigin, SelectedFile};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, File, Response, Url, Window};

pub(crate) fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("No window available"))
}

/// Origin of the current page, e.g. `https://careerbox.app`.
pub(crate) fn page_origin() -> Option<String> {
    web_sys::window()?.location().origin().ok()
}

/// Show a blocking message to the user.
pub(crate) fn alert(message: &str) {
    if let Some(w) = web_sys::window() {
        if w.alert_with_message(message).is_err() {
            log::warn!("Could not show alert: {}", message);
        }
    }
}

fn bytes_to_blob(bytes: &[u8], mime: &str) -> Result<Blob, JsValue> {
    let parts = Array::of1(&Uint8Array::from(bytes));
    let options = BlobPropertyBag::new();
    options.set_type(mime);
    Blob::new_with_u8_array_sequence_and_options(&parts, &options)
}

/// Object URLs via `URL.createObjectURL`.
#[derive(Debug, Default)]
pub struct BrowserTempUrls;

impl TempUrlStore for BrowserTempUrls {
    fn create(&mut self, file: &SelectedFile) -> Option<String> {
        let url = bytes_to_blob(&file.bytes, &file.mime)
            .and_then(|blob| Url::create_object_url_with_blob(&blob));
        match url {
            Ok(url) => Some(url),
            Err(e) => {
                log::warn!("Could not create object URL for \"{}\": {:?}", file.name, e);
                None
            }
        }
    }

    fn revoke(&mut self, url: &str) {
        if let Err(e) = Url::revoke_object_url(url) {
            log::warn!("Could not revoke {}: {:?}", url, e);
        }
    }
}

/// Locks scrolling by setting `overflow: hidden` on `<body>`, restoring the
/// previous value on unlock.
#[derive(Debug, Default)]
pub struct BodyScroll {
    previous: RefCell<Option<String>>,
}

impl PageScroll for BodyScroll {
    fn set_scroll_locked(&self, locked: bool) {
        let Some(body) = web_sys::window().and_then(|w| w.document()).and_then(|d| d.body()) else {
            return;
        };
        let style = body.style();
        let result = if locked {
            let previous = style.get_property_value("overflow").unwrap_or_default();
            *self.previous.borrow_mut() = Some(previous);
            style.set_property("overflow", "hidden")
        } else {
            match self.previous.borrow_mut().take() {
                Some(previous) if !previous.is_empty() => style.set_property("overflow", &previous),
                _ => style.remove_property("overflow").map(|_| ()),
            }
        };
        if let Err(e) = result {
            log::warn!("Could not update body overflow: {:?}", e);
        }
    }
}

/// Read a browser `File` into memory.
pub(crate) async fn read_file(file: &File, origin: FileOrigin) -> Result<SelectedFile, JsValue> {
    let buffer = JsFuture::from(file.array_buffer()).await?;
    let bytes = Uint8Array::new(&buffer).to_vec();
    Ok(SelectedFile::new(file.name(), file.type_(), bytes, origin))
}

/// GET `url` and return the body. Non-2xx responses are errors.
pub(crate) async fn fetch_bytes(url: &str) -> Result<Vec<u8>, JsValue> {
    let response: Response = JsFuture::from(window()?.fetch_with_str(url)).await?.dyn_into()?;
    if !response.ok() {
        return Err(JsValue::from_str(&format!("HTTP {}", response.status())));
    }
    let buffer = JsFuture::from(response.array_buffer()?).await?;
    Ok(Uint8Array::new(&buffer).to_vec())
}

/// Wrap encoded bytes as a `File` for the upload callback.
pub(crate) fn to_js_file(bytes: &[u8], name: &str, mime: &str) -> Result<File, JsValue> {
    let parts = Array::of1(&Uint8Array::from(bytes));
    let options = web_sys::FilePropertyBag::new();
    options.set_type(mime);
    File::new_with_u8_array_sequence_and_options(&parts, name, &options)
}

/// Call `callback(arg)` and await the result if it returned a promise.
pub(crate) async fn call_maybe_async(
    callback: &js_sys::Function,
    arg: &JsValue,
) -> Result<(), JsValue> {
    let returned = callback.call1(&JsValue::NULL, arg)?;
    if let Ok(promise) = returned.dyn_into::<js_sys::Promise>() {
        JsFuture::from(promise).await?;
    }
    Ok(())
}
