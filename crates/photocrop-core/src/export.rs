//! Export pipeline: render the crop at target resolution and encode it.
//!
//! Export is split in two so hosts can hand the file to an async callback
//! without keeping the editor borrowed:
//!
//! 1. `CropEditor::begin_export` renders and encodes, marks the editor as
//!    processing and returns a [`PendingExport`]
//! 2. the host delivers the [`CroppedFile`]
//! 3. `CropEditor::finish_export` consumes the [`ExportTicket`] with the
//!    callback's result
//!
//! The ticket owns a [`ProcessingGuard`], so the processing flag is cleared
//! even when step 3 never happens.

use std::cell::Cell;
use std::rc::Rc;

use thiserror::Error;

use crate::decode::Bitmap;
use crate::encode::{encode_jpeg, EncodeError};
use crate::frame::CropFrame;
use crate::render::render_export;
use crate::target::CropTarget;
use crate::{Adjustments, EditorConfig, TransformState};

pub const JPEG_MIME: &str = "image/jpeg";

/// Errors from exporting or deleting.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Editor is not open")]
    NotOpen,

    #[error("No image loaded")]
    NoImage,

    #[error("An export is already in progress")]
    AlreadyProcessing,

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("Callback failed: {0}")]
    Callback(String),
}

/// The finished JPEG handed to the upload callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CroppedFile {
    /// `<kind>-image.jpg`
    pub name: String,
    pub mime: String,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

/// Summary of a delivered export, for logging and host UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub size: usize,
}

impl From<&CroppedFile> for ExportOutcome {
    fn from(file: &CroppedFile) -> Self {
        Self {
            name: file.name.clone(),
            width: file.width,
            height: file.height,
            size: file.bytes.len(),
        }
    }
}

/// Shared "export or delete in flight" flag.
#[derive(Debug, Clone, Default)]
pub struct ProcessingFlag(Rc<Cell<bool>>);

impl ProcessingFlag {
    pub fn is_set(&self) -> bool {
        self.0.get()
    }

    /// Set the flag, or fail if it is already set.
    pub fn try_begin(&self) -> Result<ProcessingGuard, ExportError> {
        if self.0.replace(true) {
            return Err(ExportError::AlreadyProcessing);
        }
        Ok(ProcessingGuard { flag: self.0.clone() })
    }
}

/// Clears the processing flag when dropped.
#[derive(Debug)]
pub struct ProcessingGuard {
    flag: Rc<Cell<bool>>,
}

impl Drop for ProcessingGuard {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

/// An encoded file waiting to be delivered.
#[derive(Debug)]
pub struct PendingExport {
    pub file: CroppedFile,
    guard: ProcessingGuard,
}

impl PendingExport {
    pub(crate) fn new(file: CroppedFile, guard: ProcessingGuard) -> Self {
        Self { file, guard }
    }

    /// Separate the file (for the callback) from the ticket that completes
    /// the export.
    pub fn into_parts(self) -> (CroppedFile, ExportTicket) {
        let outcome = ExportOutcome::from(&self.file);
        (
            self.file,
            ExportTicket {
                outcome,
                _guard: self.guard,
            },
        )
    }
}

/// Proof that an export is in flight. Dropping it ends the export.
#[derive(Debug)]
pub struct ExportTicket {
    pub outcome: ExportOutcome,
    _guard: ProcessingGuard,
}

impl ExportTicket {
    /// Clear the processing flag and return the summary.
    pub fn complete(self) -> ExportOutcome {
        self.outcome
    }
}

/// Render and encode the crop exactly as framed on screen.
pub fn build_cropped_file(
    source: &Bitmap,
    transform: &TransformState,
    adjustments: &Adjustments,
    frame: &CropFrame,
    target: &CropTarget,
    config: &EditorConfig,
) -> Result<CroppedFile, ExportError> {
    let surface = render_export(
        source,
        transform,
        adjustments,
        frame,
        target,
        config.background,
        config.clip_export_to_shape,
    );
    let bytes = encode_jpeg(&surface, config.jpeg_quality)?;

    Ok(CroppedFile {
        name: target.file_name(),
        mime: JPEG_MIME.to_string(),
        width: surface.width,
        height: surface.height,
        bytes,
    })
}
