//! JavaScript-facing views of editor state.
//!
//! These are plain serde structs handed to JS through `serde-wasm-bindgen`,
//! so they stay testable without a JS runtime.

use photocrop_core::resources::TempUrlStore;
use photocrop_core::{CropEditor, ExportOutcome, FilterPreset, ImageKind};
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};

/// Snapshot of everything the editor UI displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorSnapshot {
    pub open: bool,
    pub has_image: bool,
    pub processing: bool,
    pub kind: Option<ImageKind>,
    pub target_width: Option<u32>,
    pub target_height: Option<u32>,
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub rotation: f64,
    pub straighten: f64,
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
    pub vignette: f32,
    pub active_preset: FilterPreset,
}

impl<S: TempUrlStore> From<&CropEditor<S>> for EditorSnapshot {
    fn from(editor: &CropEditor<S>) -> Self {
        let target = editor.target();
        let t = editor.transform();
        let a = editor.adjustments();
        Self {
            open: editor.is_open(),
            has_image: editor.has_image(),
            processing: editor.is_processing(),
            kind: target.map(|t| t.kind),
            target_width: target.map(|t| t.width),
            target_height: target.map(|t| t.height),
            scale: t.scale,
            offset_x: t.offset.0,
            offset_y: t.offset.1,
            rotation: t.rotation,
            straighten: t.straighten,
            brightness: a.brightness,
            contrast: a.contrast,
            saturation: a.saturation,
            vignette: a.vignette,
            active_preset: a.active_preset,
        }
    }
}

/// Result of a successful export, resolved from `export()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub size: usize,
}

impl From<ExportOutcome> for ExportSummary {
    fn from(outcome: ExportOutcome) -> Self {
        Self {
            name: outcome.name,
            width: outcome.width,
            height: outcome.height,
            size: outcome.size,
        }
    }
}

/// Convert any displayable error into a JS exception value.
pub(crate) fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Best-effort message from a thrown JS value.
pub(crate) fn js_error_message(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    match value.dyn_ref::<js_sys::Error>() {
        Some(err) => String::from(err.message()),
        None => format!("{:?}", value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use photocrop_core::resources::NoTempUrls;
    use photocrop_core::{EditorConfig, OpenOptions};

    // ===== Snapshot Tests =====

    #[test]
    fn test_snapshot_closed_editor() {
        let editor = CropEditor::new(EditorConfig::default(), NoTempUrls);
        let snap = EditorSnapshot::from(&editor);
        assert!(!snap.open);
        assert!(!snap.has_image);
        assert_eq!(snap.kind, None);
        assert_eq!(snap.scale, 1.0);
        assert_eq!(snap.active_preset, FilterPreset::Original);
    }

    #[test]
    fn test_snapshot_tracks_edits() {
        let mut editor = CropEditor::new(EditorConfig::default(), NoTempUrls);
        editor.open(OpenOptions::new(ImageKind::Cover)).unwrap();
        editor.rotate_left();
        editor.apply_preset(FilterPreset::Muted);

        let snap = EditorSnapshot::from(&editor);
        assert!(snap.open);
        assert_eq!(snap.kind, Some(ImageKind::Cover));
        assert_eq!((snap.target_width, snap.target_height), (Some(1600), Some(400)));
        assert_eq!(snap.rotation, -90.0);
        assert_eq!(snap.saturation, 0.7);
        assert_eq!(snap.active_preset, FilterPreset::Muted);
    }

    #[test]
    fn test_summary_from_outcome() {
        let summary = ExportSummary::from(ExportOutcome {
            name: "profile-image.jpg".into(),
            width: 512,
            height: 512,
            size: 2048,
        });
        assert_eq!(summary.name, "profile-image.jpg");
        assert_eq!(summary.size, 2048);
    }
}
