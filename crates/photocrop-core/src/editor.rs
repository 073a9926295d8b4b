//! The editing session: one image, one crop target, and every user action.
//!
//! A [`CropEditor`] is opened for an [`ImageKind`], loads an image from a
//! picked file, a drop, or a remote URL, applies pan/zoom/rotate/filter
//! interactions, and finally exports a [`CroppedFile`].
//!
//! Every mutation marks the editor dirty. Hosts redraw by calling
//! [`CropEditor::render_preview`], optionally polling
//! [`CropEditor::take_dirty`] first.
//!
//! # Example
//! ```ignore
//! let mut editor = CropEditor::new(EditorConfig::default(), NoTempUrls);
//! editor.open(OpenOptions::new(ImageKind::Profile))?;
//! editor.load_file(file)?;
//! editor.rotate_right();
//! let pending = editor.begin_export()?;
//! let (file, ticket) = pending.into_parts();
//! upload(file);
//! editor.finish_export(ticket, Ok(()))?;
//! ```

use std::fmt::Display;
use std::future::Future;

use thiserror::Error;

use crate::acquire::{first_dropped, proxied_url, validate_file, AcquireError, SelectedFile};
use crate::adjustments::FilterPreset;
use crate::config::{ConfigError, EditorConfig};
use crate::decode::{decode_image, Bitmap};
use crate::export::{
    build_cropped_file, CroppedFile, ExportError, ExportOutcome, ExportTicket, PendingExport,
    ProcessingFlag, ProcessingGuard,
};
use crate::frame::{cover_scale, CropFrame};
use crate::render::{render_preview, RenderStyle, Scene};
use crate::resources::{NoTempUrls, ScrollGuard, ScrollLock, TempUrlStore};
use crate::target::{CropTarget, ImageKind, TargetError};
use crate::{Adjustments, TransformState};

/// Origin used to decide whether a remote URL needs the proxy when the host
/// does not provide one.
pub const DEFAULT_PAGE_ORIGIN: &str = "http://localhost/";

/// Umbrella error for editor operations.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Editor is not open")]
    NotOpen,

    #[error(transparent)]
    Target(#[from] TargetError),

    #[error(transparent)]
    Acquire(#[from] AcquireError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Parameters for [`CropEditor::open`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenOptions {
    pub kind: ImageKind,
    pub target_width: Option<u32>,
    pub target_height: Option<u32>,
    /// Existing image to re-edit.
    pub initial_url: Option<String>,
}

impl OpenOptions {
    pub fn new(kind: ImageKind) -> Self {
        Self {
            kind,
            target_width: None,
            target_height: None,
            initial_url: None,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.target_width = Some(width);
        self.target_height = Some(height);
        self
    }

    pub fn with_initial_url(mut self, url: impl Into<String>) -> Self {
        self.initial_url = Some(url.into());
        self
    }
}

/// Identifies one pending load. Completing with a stale ticket is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    source: String,
}

impl LoadTicket {
    /// The URL or file name the load was requested for.
    pub fn source(&self) -> &str {
        &self.source
    }
}

/// A remote fetch the host should perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteLoad {
    pub ticket: LoadTicket,
    /// URL to fetch, already routed through the proxy when needed.
    pub fetch_url: String,
}

/// What happened to a completed remote load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    /// The editor moved on (closed or loaded something else) first.
    Discarded,
}

#[derive(Debug)]
struct LoadedImage {
    bitmap: Bitmap,
    temp_url: Option<String>,
    label: String,
}

/// Image crop/edit session.
pub struct CropEditor<S: TempUrlStore = NoTempUrls> {
    config: EditorConfig,
    urls: S,
    scroll: ScrollLock,
    scroll_guard: Option<ScrollGuard>,
    page_origin: String,
    target: Option<CropTarget>,
    image: Option<LoadedImage>,
    viewport: (u32, u32),
    transform: TransformState,
    adjustments: Adjustments,
    drag_anchor: Option<(f64, f64)>,
    generation: u64,
    processing: ProcessingFlag,
    dirty: bool,
}

impl<S: TempUrlStore> CropEditor<S> {
    pub fn new(config: EditorConfig, urls: S) -> Self {
        let viewport = (config.viewport_width.max(1), config.viewport_height.max(1));
        Self {
            config,
            urls,
            scroll: ScrollLock::detached(),
            scroll_guard: None,
            page_origin: DEFAULT_PAGE_ORIGIN.to_string(),
            target: None,
            image: None,
            viewport,
            transform: TransformState::default(),
            adjustments: Adjustments::default(),
            drag_anchor: None,
            generation: 0,
            processing: ProcessingFlag::default(),
            dirty: true,
        }
    }

    /// Validate `config` before building the editor.
    pub fn with_config(config: EditorConfig, urls: S) -> Result<Self, EditorError> {
        config.validate()?;
        Ok(Self::new(config, urls))
    }

    /// Share a page scroll lock with other editors.
    pub fn with_scroll_lock(mut self, lock: ScrollLock) -> Self {
        self.scroll = lock;
        self
    }

    /// Origin of the hosting page, e.g. `https://example.com`.
    pub fn with_page_origin(mut self, origin: impl Into<String>) -> Self {
        self.page_origin = origin.into();
        self
    }

    // ===== Lifecycle =====

    /// Start a session for `options.kind`. Reopening discards the previous
    /// session. Returns the remote fetch to perform when an initial URL is
    /// given. A bad target or an unusable initial URL fails before anything
    /// changes.
    pub fn open(&mut self, options: OpenOptions) -> Result<Option<RemoteLoad>, EditorError> {
        let target = CropTarget::new(options.kind, options.target_width, options.target_height)?;
        let initial = match options.initial_url {
            Some(url) if !url.trim().is_empty() => {
                let fetch_url = self.route_remote(&url)?;
                Some((url, fetch_url))
            }
            _ => None,
        };

        self.generation += 1;
        self.release_image();
        self.transform = TransformState::default();
        self.adjustments = Adjustments::default();
        self.drag_anchor = None;
        self.target = Some(target);
        if self.scroll_guard.is_none() {
            self.scroll_guard = Some(self.scroll.acquire());
        }
        self.dirty = true;
        log::info!(
            "Editor opened for {} ({}x{})",
            target.kind,
            target.width,
            target.height
        );

        Ok(initial.map(|(url, fetch_url)| self.issue_remote_load(url, fetch_url)))
    }

    /// End the session, releasing the image, its temporary URL and the
    /// scroll lock. Safe to call repeatedly.
    pub fn close(&mut self) {
        self.generation += 1;
        self.release_image();
        self.transform = TransformState::default();
        self.adjustments = Adjustments::default();
        self.drag_anchor = None;
        if self.target.take().is_some() {
            log::info!("Editor closed");
        }
        self.scroll_guard = None;
        self.dirty = true;
    }

    pub fn is_open(&self) -> bool {
        self.target.is_some()
    }

    // ===== Loading =====

    /// Load a file from the picker or a drop. On any error the previous
    /// image and state are left untouched.
    pub fn load_file(&mut self, file: SelectedFile) -> Result<(), EditorError> {
        if !self.is_open() {
            return Err(EditorError::NotOpen);
        }
        if let Err(e) = validate_file(&file.mime, file.size(), self.config.max_file_size) {
            log::warn!("Rejected \"{}\": {}", file.name, e);
            return Err(e.into());
        }

        let bitmap = decode_image(&file.bytes).map_err(|error| {
            log::error!("Failed to decode \"{}\": {}", file.name, error);
            AcquireError::Decode {
                source_name: file.name.clone(),
                error,
            }
        })?;

        self.generation += 1;
        self.release_image();
        let temp_url = self.urls.create(&file);
        log::info!(
            "Loaded \"{}\" ({:?}, {}x{})",
            file.name,
            file.origin,
            bitmap.width,
            bitmap.height
        );
        self.install_image(bitmap, temp_url, file.name);
        Ok(())
    }

    /// Load the first of the dropped files.
    pub fn load_dropped(&mut self, files: Vec<SelectedFile>) -> Result<(), EditorError> {
        let file = first_dropped(files)?;
        self.load_file(file)
    }

    /// Start reading a local file named `name`. Hosts that read files
    /// asynchronously take a ticket first and hand the contents to
    /// [`complete_file_load`](Self::complete_file_load), so a read that
    /// outlives a close, reopen or newer load is dropped.
    pub fn begin_file_load(&mut self, name: &str) -> Result<LoadTicket, EditorError> {
        if !self.is_open() {
            return Err(EditorError::NotOpen);
        }
        log::debug!("Reading {}", name);
        Ok(self.issue_ticket(name.to_string()))
    }

    /// Finish a local read started with
    /// [`begin_file_load`](Self::begin_file_load).
    pub fn complete_file_load(
        &mut self,
        ticket: LoadTicket,
        file: SelectedFile,
    ) -> Result<LoadOutcome, EditorError> {
        if !self.is_current(&ticket) {
            log::warn!("Discarding stale read of {}", ticket.source);
            return Ok(LoadOutcome::Discarded);
        }
        self.load_file(file)?;
        Ok(LoadOutcome::Loaded)
    }

    /// Prepare a remote load. The host fetches `fetch_url` and reports back
    /// through [`complete_remote_load`](Self::complete_remote_load).
    pub fn begin_remote_load(&mut self, url: &str) -> Result<RemoteLoad, EditorError> {
        if !self.is_open() {
            return Err(EditorError::NotOpen);
        }
        let fetch_url = self.route_remote(url)?;
        Ok(self.issue_remote_load(url.to_string(), fetch_url))
    }

    fn route_remote(&self, url: &str) -> Result<String, AcquireError> {
        proxied_url(url, &self.page_origin, &self.config.proxy_endpoint).map_err(|e| {
            log::warn!("Cannot load \"{}\": {}", url, e);
            e
        })
    }

    fn issue_remote_load(&mut self, url: String, fetch_url: String) -> RemoteLoad {
        log::debug!("Fetching {} via {}", url, fetch_url);
        RemoteLoad {
            ticket: self.issue_ticket(url),
            fetch_url,
        }
    }

    /// Supersede every load in flight.
    fn issue_ticket(&mut self, source: String) -> LoadTicket {
        self.generation += 1;
        LoadTicket {
            generation: self.generation,
            source,
        }
    }

    fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.generation == self.generation && self.is_open()
    }

    /// Finish a remote load with the fetched bytes, or the fetch error.
    pub fn complete_remote_load(
        &mut self,
        ticket: LoadTicket,
        fetched: Result<Vec<u8>, String>,
    ) -> Result<LoadOutcome, EditorError> {
        if !self.is_current(&ticket) {
            log::warn!("Discarding stale load of {}", ticket.source);
            return Ok(LoadOutcome::Discarded);
        }

        let bytes = fetched.map_err(|reason| {
            log::error!("Failed to fetch {}: {}", ticket.source, reason);
            AcquireError::Fetch {
                url: ticket.source.clone(),
                reason,
            }
        })?;
        let bitmap = decode_image(&bytes).map_err(|error| {
            log::error!("Failed to decode {}: {}", ticket.source, error);
            AcquireError::Decode {
                source_name: ticket.source.clone(),
                error,
            }
        })?;

        self.release_image();
        log::info!("Loaded {} ({}x{})", ticket.source, bitmap.width, bitmap.height);
        self.install_image(bitmap, None, ticket.source);
        Ok(LoadOutcome::Loaded)
    }

    /// Make `bitmap` the current image and fit it to cover the viewport.
    ///
    /// The fit scale is not clamped to the zoom range, so the crop frame is
    /// covered even for extreme aspect ratios.
    fn install_image(&mut self, bitmap: Bitmap, temp_url: Option<String>, label: String) {
        self.transform.scale = cover_scale((bitmap.width, bitmap.height), self.viewport);
        self.transform.offset = (0.0, 0.0);
        self.drag_anchor = None;
        self.image = Some(LoadedImage {
            bitmap,
            temp_url,
            label,
        });
        self.dirty = true;
    }

    /// Drop the current image and revoke its temporary URL.
    fn release_image(&mut self) {
        if let Some(image) = self.image.take() {
            if let Some(url) = image.temp_url {
                self.urls.revoke(&url);
            }
            log::debug!("Released {}", image.label);
        }
    }

    // ===== Interaction =====

    /// Resize the canvas. Zero sizes are ignored.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::warn!("Ignoring empty viewport {}x{}", width, height);
            return;
        }
        self.viewport = (width, height);
        self.dirty = true;
    }

    /// Start panning from canvas position `(x, y)`.
    pub fn pointer_down(&mut self, x: f64, y: f64) {
        if self.image.is_some() {
            self.drag_anchor = Some((x, y));
        }
    }

    /// Pan by the movement since the last pointer position.
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        let Some((ax, ay)) = self.drag_anchor else {
            return;
        };
        let (dx, dy) = (x - ax, y - ay);
        self.transform.offset.0 += dx;
        self.transform.offset.1 += dy;
        self.drag_anchor = Some((x, y));
        self.dirty = true;
        log::debug!("Pan by ({:.1}, {:.1})", dx, dy);
    }

    pub fn pointer_up(&mut self) {
        self.drag_anchor = None;
    }

    pub fn pointer_leave(&mut self) {
        self.drag_anchor = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_anchor.is_some()
    }

    /// Zoom one step per wheel event: scrolling up zooms in. Returns true if
    /// the event was consumed and the page should not scroll.
    pub fn wheel(&mut self, delta_y: f64) -> bool {
        if self.image.is_none() {
            return false;
        }
        if delta_y == 0.0 || delta_y.is_nan() {
            return true;
        }
        let step = -delta_y.signum() * self.config.wheel_step;
        let current = self.transform.scale;
        let clamped = self.config.clamp_scale(current + step);
        // A fit scale outside the zoom range only moves in the wheel's direction.
        let scale = if step > 0.0 {
            clamped.max(current)
        } else {
            clamped.min(current)
        };
        if scale != self.transform.scale {
            self.transform.scale = scale;
            self.dirty = true;
            log::debug!("Zoom to {:.2}", scale);
        }
        true
    }

    pub fn rotate_left(&mut self) {
        self.rotate_by(-90.0);
    }

    pub fn rotate_right(&mut self) {
        self.rotate_by(90.0);
    }

    fn rotate_by(&mut self, degrees: f64) {
        self.transform.rotation += degrees;
        self.dirty = true;
        log::debug!("Rotation {:.1}", self.transform.rotation);
    }

    /// Move the straighten slider. The change from the previous slider
    /// position is added to the rotation.
    pub fn set_straighten(&mut self, degrees: f64) {
        if degrees.is_nan() {
            return;
        }
        let limit = self.config.straighten_limit;
        let degrees = degrees.clamp(-limit, limit);
        let delta = degrees - self.transform.straighten;
        self.transform.straighten = degrees;
        self.rotate_by(delta);
    }

    pub fn set_brightness(&mut self, value: f32) {
        self.adjustments.brightness = self.config.clamp_adjustment(value);
        self.adjusted("brightness", self.adjustments.brightness);
    }

    pub fn set_contrast(&mut self, value: f32) {
        self.adjustments.contrast = self.config.clamp_adjustment(value);
        self.adjusted("contrast", self.adjustments.contrast);
    }

    pub fn set_saturation(&mut self, value: f32) {
        self.adjustments.saturation = self.config.clamp_adjustment(value);
        self.adjusted("saturation", self.adjustments.saturation);
    }

    pub fn set_vignette(&mut self, value: f32) {
        self.adjustments.vignette = value.clamp(0.0, 1.0);
        self.adjusted("vignette", self.adjustments.vignette);
    }

    fn adjusted(&mut self, name: &str, value: f32) {
        self.dirty = true;
        log::debug!("Set {} to {:.2}", name, value);
    }

    /// Overwrite brightness, contrast and saturation with a preset.
    pub fn apply_preset(&mut self, preset: FilterPreset) {
        self.adjustments.apply_preset(preset);
        self.dirty = true;
        log::debug!("Applied preset {}", preset);
    }

    /// Restore default transform and adjustments. The image stays loaded.
    pub fn reset(&mut self) {
        self.transform = TransformState::default();
        self.adjustments = Adjustments::default();
        self.drag_anchor = None;
        self.dirty = true;
        log::debug!("Reset transform and adjustments");
    }

    // ===== Rendering =====

    /// Return and clear the redraw flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    /// The crop frame on the current viewport.
    pub fn frame(&self) -> Option<CropFrame> {
        self.target
            .as_ref()
            .map(|t| CropFrame::compute(self.viewport, t, self.config.frame_fill))
    }

    /// Draw the current state at viewport size.
    pub fn render_preview(&self) -> Result<Bitmap, EditorError> {
        let frame = self.frame().ok_or(EditorError::NotOpen)?;
        let mut surface = Bitmap::filled(self.viewport.0, self.viewport.1, self.config.background);
        let scene = Scene {
            source: self.image.as_ref().map(|i| &i.bitmap),
            transform: &self.transform,
            adjustments: &self.adjustments,
        };
        render_preview(&mut surface, &scene, &frame, &RenderStyle::from(&self.config));
        Ok(surface)
    }

    // ===== Export =====

    /// Render and encode the crop, and mark the editor as processing.
    pub fn begin_export(&mut self) -> Result<PendingExport, ExportError> {
        let (target, frame) = match (self.target, self.frame()) {
            (Some(target), Some(frame)) => (target, frame),
            _ => return Err(ExportError::NotOpen),
        };
        let image = self.image.as_ref().ok_or(ExportError::NoImage)?;
        let guard = self.processing.try_begin()?;

        let file = build_cropped_file(
            &image.bitmap,
            &self.transform,
            &self.adjustments,
            &frame,
            &target,
            &self.config,
        )
        .map_err(|e| {
            log::error!("Export failed: {}", e);
            e
        })?;
        log::info!(
            "Exported {} ({}x{}, {} bytes)",
            file.name,
            file.width,
            file.height,
            file.bytes.len()
        );
        Ok(PendingExport::new(file, guard))
    }

    /// Complete an export with the callback's result. Success closes the
    /// editor; failure keeps everything so the user can retry.
    pub fn finish_export(
        &mut self,
        ticket: ExportTicket,
        delivered: Result<(), String>,
    ) -> Result<ExportOutcome, ExportError> {
        let outcome = ticket.complete();
        match delivered {
            Ok(()) => {
                log::info!("Delivered {}", outcome.name);
                self.close();
                Ok(outcome)
            }
            Err(reason) => {
                log::error!("Upload of {} failed: {}", outcome.name, reason);
                Err(ExportError::Callback(reason))
            }
        }
    }

    /// Export and hand the file to `on_cropped`, awaiting it.
    pub async fn export_with<F, Fut, E>(
        &mut self,
        on_cropped: F,
    ) -> Result<ExportOutcome, ExportError>
    where
        F: FnOnce(CroppedFile) -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: Display,
    {
        let (file, ticket) = self.begin_export()?.into_parts();
        let delivered = on_cropped(file).await.map_err(|e| e.to_string());
        self.finish_export(ticket, delivered)
    }

    /// Mark the editor as processing for a delete request.
    pub fn begin_delete(&mut self) -> Result<ProcessingGuard, ExportError> {
        if !self.is_open() {
            return Err(ExportError::NotOpen);
        }
        self.processing.try_begin()
    }

    /// Complete a delete. Success closes the editor.
    pub fn finish_delete(
        &mut self,
        guard: ProcessingGuard,
        deleted: Result<(), String>,
    ) -> Result<(), ExportError> {
        drop(guard);
        match deleted {
            Ok(()) => {
                log::info!("Image deleted");
                self.close();
                Ok(())
            }
            Err(reason) => {
                log::error!("Delete failed: {}", reason);
                Err(ExportError::Callback(reason))
            }
        }
    }

    /// Run the delete callback under the processing flag.
    pub async fn delete_with<F, Fut, E>(&mut self, on_delete: F) -> Result<(), ExportError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: Display,
    {
        let guard = self.begin_delete()?;
        let deleted = on_delete().await.map_err(|e| e.to_string());
        self.finish_delete(guard, deleted)
    }

    // ===== Accessors =====

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn target(&self) -> Option<&CropTarget> {
        self.target.as_ref()
    }

    pub fn transform(&self) -> &TransformState {
        &self.transform
    }

    pub fn adjustments(&self) -> &Adjustments {
        &self.adjustments
    }

    pub fn active_preset(&self) -> FilterPreset {
        self.adjustments.active_preset
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// Dimensions of the loaded image after orientation correction.
    pub fn image_size(&self) -> Option<(u32, u32)> {
        self.image.as_ref().map(|i| (i.bitmap.width, i.bitmap.height))
    }

    /// Temporary URL of the loaded local file, if the host created one.
    pub fn temp_url(&self) -> Option<&str> {
        self.image.as_ref().and_then(|i| i.temp_url.as_deref())
    }

    pub fn is_processing(&self) -> bool {
        self.processing.is_set()
    }
}

impl<S: TempUrlStore> Drop for CropEditor<S> {
    fn drop(&mut self) {
        self.generation += 1;
        self.release_image();
    }
}
