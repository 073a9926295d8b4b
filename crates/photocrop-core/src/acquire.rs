//! Image acquisition: validating picked or dropped files and routing remote
//! URLs through the same-origin proxy.
//!
//! Three inputs feed the editor's single load routine:
//! - a file from the native picker,
//! - a file dropped onto the canvas,
//! - a remote URL when re-editing an existing image.
//!
//! Remote images that are not same-origin would taint the canvas and block
//! export, so they are fetched through a proxy endpoint instead.

use thiserror::Error;
use url::{form_urlencoded, Url};

use crate::decode::DecodeError;

/// Why an image could not be acquired.
#[derive(Debug, Error)]
pub enum AcquireError {
    #[error("Please choose an image file (got \"{mime}\")")]
    NotAnImage { mime: String },

    #[error("Image is too large: {size} bytes (limit {max} bytes)")]
    TooLarge { size: u64, max: u64 },

    #[error("No file was provided")]
    NoFile,

    #[error("Invalid image URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to fetch image from {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Failed to decode image from {source_name}: {error}")]
    Decode {
        source_name: String,
        #[source]
        error: DecodeError,
    },
}

impl AcquireError {
    /// True for errors the user caused by choosing the wrong file. These are
    /// shown in a blocking dialog; the rest are logged.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            AcquireError::NotAnImage { .. } | AcquireError::TooLarge { .. } | AcquireError::NoFile
        )
    }
}

/// How a local file reached the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOrigin {
    Picker,
    DragDrop,
}

/// A local file handed to the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    /// MIME type as reported by the browser.
    pub mime: String,
    pub bytes: Vec<u8>,
    pub origin: FileOrigin,
}

impl SelectedFile {
    pub fn new(
        name: impl Into<String>,
        mime: impl Into<String>,
        bytes: Vec<u8>,
        origin: FileOrigin,
    ) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
            origin,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Reject non-images and files above `max_size` bytes.
///
/// Takes the MIME type and size separately so hosts can validate before
/// reading the file into memory.
pub fn validate_file(mime: &str, size: u64, max_size: u64) -> Result<(), AcquireError> {
    if !mime.trim().to_ascii_lowercase().starts_with("image/") {
        return Err(AcquireError::NotAnImage {
            mime: mime.to_string(),
        });
    }
    if size > max_size {
        return Err(AcquireError::TooLarge {
            size,
            max: max_size,
        });
    }
    Ok(())
}

/// Pick the file to load from a drop. Only one image is loaded per drop;
/// extra files are ignored.
pub fn first_dropped(files: Vec<SelectedFile>) -> Result<SelectedFile, AcquireError> {
    let count = files.len();
    let first = files.into_iter().next().ok_or(AcquireError::NoFile)?;
    if count > 1 {
        log::debug!("Dropped {} files, using \"{}\"", count, first.name);
    }
    Ok(first)
}

/// Rewrite `raw` so the browser can read its pixels without tainting the canvas.
///
/// Relative URLs are resolved against `page_origin`. Same-origin, `data:` and
/// `blob:` URLs are returned unchanged; anything else becomes
/// `<endpoint>?url=<encoded absolute url>`.
pub fn proxied_url(raw: &str, page_origin: &str, endpoint: &str) -> Result<String, AcquireError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AcquireError::InvalidUrl {
            url: raw.to_string(),
            reason: "empty URL".to_string(),
        });
    }

    let page = Url::parse(page_origin).map_err(|e| AcquireError::InvalidUrl {
        url: page_origin.to_string(),
        reason: e.to_string(),
    })?;
    let target = page.join(raw).map_err(|e| AcquireError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    if matches!(target.scheme(), "data" | "blob") || target.origin() == page.origin() {
        return Ok(raw.to_string());
    }

    let encoded: String = form_urlencoded::byte_serialize(target.as_str().as_bytes()).collect();
    Ok(format!("{}?url={}", endpoint, encoded))
}
