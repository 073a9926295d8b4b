//! Software renderer for the live preview and the export.
//!
//! Both paths share one pipeline so the exported pixels are a faithful crop
//! of what the user saw:
//!
//! 1. Fill the background
//! 2. Draw the source under its [`Placement`] with the colour filters
//! 3. Darken with the vignette, clipped to the crop shape
//!
//! The preview then dims everything outside the crop region and strokes the
//! crop outline. The export instead renders at target resolution, with pan
//! and zoom multiplied by the export scale factor.

use crate::adjustments::apply_filters;
use crate::decode::Bitmap;
use crate::frame::CropFrame;
use crate::mask::Vignette;
use crate::target::{CropShape, CropTarget};
use crate::transform::{sample_bilinear, Placement};
use crate::{Adjustments, EditorConfig, TransformState};

/// Colours and overlay settings for drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStyle {
    pub background: [u8; 3],
    pub overlay_opacity: f32,
    pub stroke_color: [u8; 3],
    pub stroke_width: f64,
}

impl From<&EditorConfig> for RenderStyle {
    fn from(config: &EditorConfig) -> Self {
        Self {
            background: config.background,
            overlay_opacity: config.overlay_opacity.clamp(0.0, 1.0),
            stroke_color: config.stroke_color,
            stroke_width: config.stroke_width.max(0.0),
        }
    }
}

/// What to draw: the image and the user's edits.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub source: Option<&'a Bitmap>,
    pub transform: &'a TransformState,
    pub adjustments: &'a Adjustments,
}

/// Placement of the source on the viewport canvas.
pub fn preview_placement(
    source: &Bitmap,
    transform: &TransformState,
    viewport: (u32, u32),
) -> Placement {
    Placement::new(
        (
            viewport.0 as f64 / 2.0 + transform.offset.0,
            viewport.1 as f64 / 2.0 + transform.offset.1,
        ),
        transform.scale,
        transform.rotation,
        (source.width as f64, source.height as f64),
    )
}

/// Placement of the source on the export surface.
///
/// The frame is centred on the viewport, so scaling everything about the
/// frame centre by `export_scale` maps the frame exactly onto the output.
pub fn export_placement(
    source: &Bitmap,
    transform: &TransformState,
    frame: &CropFrame,
    target: &CropTarget,
) -> Placement {
    let k = frame.export_scale(target);
    Placement::new(
        (
            target.width as f64 / 2.0 + transform.offset.0 * k,
            target.height as f64 / 2.0 + transform.offset.1 * k,
        ),
        transform.scale * k,
        transform.rotation,
        (source.width as f64, source.height as f64),
    )
}

/// Draw the interactive preview onto `surface` (sized to the viewport).
pub fn render_preview(
    surface: &mut Bitmap,
    scene: &Scene<'_>,
    frame: &CropFrame,
    style: &RenderStyle,
) {
    fill(surface, style.background);

    if let Some(source) = scene.source {
        let placement = preview_placement(source, scene.transform, (surface.width, surface.height));
        draw_image(surface, source, &placement, scene.adjustments);
        apply_vignette(surface, &Vignette::for_frame(frame, scene.adjustments.vignette), frame);
    }

    dim_outside(surface, frame, style.overlay_opacity);
    stroke_outline(surface, frame, style.stroke_color, style.stroke_width);
}

/// Render the crop at exactly `target.width x target.height`.
///
/// `frame` is the on-screen crop frame the user composed against. When
/// `clip_to_shape` is set, pixels outside a circular crop are filled with
/// `background`.
pub fn render_export(
    source: &Bitmap,
    transform: &TransformState,
    adjustments: &Adjustments,
    frame: &CropFrame,
    target: &CropTarget,
    background: [u8; 3],
    clip_to_shape: bool,
) -> Bitmap {
    let mut surface = Bitmap::filled(target.width, target.height, background);
    let placement = export_placement(source, transform, frame, target);
    draw_image(&mut surface, source, &placement, adjustments);

    let out_frame = CropFrame::full(target.width, target.height, target.shape);
    let vignette = Vignette::for_frame(&out_frame, adjustments.vignette);
    apply_vignette(&mut surface, &vignette, &out_frame);

    if clip_to_shape && target.shape == CropShape::Circle {
        for_each_pixel(&mut surface, |x, y, px| {
            if !out_frame.contains(x, y) {
                *px = background;
            }
        });
    }
    surface
}

fn fill(surface: &mut Bitmap, color: [u8; 3]) {
    for px in surface.pixels.chunks_exact_mut(3) {
        px.copy_from_slice(&color);
    }
}

/// Visit every pixel with its centre coordinate.
fn for_each_pixel(surface: &mut Bitmap, mut f: impl FnMut(f64, f64, &mut [u8; 3])) {
    let width = surface.width as usize;
    if width == 0 {
        return;
    }
    for (i, chunk) in surface.pixels.chunks_exact_mut(3).enumerate() {
        let x = (i % width) as f64 + 0.5;
        let y = (i / width) as f64 + 0.5;
        let mut px = [chunk[0], chunk[1], chunk[2]];
        f(x, y, &mut px);
        chunk.copy_from_slice(&px);
    }
}

/// Inverse-map every surface pixel into the source and draw what lands.
fn draw_image(
    surface: &mut Bitmap,
    source: &Bitmap,
    placement: &Placement,
    adjustments: &Adjustments,
) {
    let inverse = placement.inverse();
    let neutral = adjustments.is_neutral();

    for_each_pixel(surface, |x, y, px| {
        let (sx, sy) = inverse.apply(x, y);
        if let Some(mut rgb) = sample_bilinear(source, sx, sy) {
            if !neutral {
                rgb = apply_filters(rgb, adjustments);
            }
            *px = [to_u8(rgb[0]), to_u8(rgb[1]), to_u8(rgb[2])];
        }
    });
}

fn apply_vignette(surface: &mut Bitmap, vignette: &Vignette, clip: &CropFrame) {
    if vignette.is_noop() {
        return;
    }
    for_each_pixel(surface, |x, y, px| {
        if clip.contains(x, y) {
            let f = vignette.factor(x, y);
            for c in px.iter_mut() {
                *c = to_u8(*c as f32 * f);
            }
        }
    });
}

fn dim_outside(surface: &mut Bitmap, frame: &CropFrame, opacity: f32) {
    if opacity <= 0.0 {
        return;
    }
    let keep = 1.0 - opacity.min(1.0);
    for_each_pixel(surface, |x, y, px| {
        if !frame.contains(x, y) {
            for c in px.iter_mut() {
                *c = to_u8(*c as f32 * keep);
            }
        }
    });
}

fn stroke_outline(surface: &mut Bitmap, frame: &CropFrame, color: [u8; 3], width: f64) {
    if width <= 0.0 {
        return;
    }
    let half = width / 2.0;
    for_each_pixel(surface, |x, y, px| {
        if frame.signed_distance(x, y).abs() <= half {
            *px = color;
        }
    });
}

#[inline]
fn to_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::ImageKind;

    const BG: [u8; 3] = [1, 2, 3];
    const RED: [u8; 3] = [200, 10, 10];

    fn style() -> RenderStyle {
        RenderStyle {
            background: BG,
            overlay_opacity: 0.5,
            stroke_color: [255, 255, 255],
            stroke_width: 0.0,
        }
    }

    fn target(kind: ImageKind) -> CropTarget {
        CropTarget::new(kind, None, None).unwrap()
    }

    /// Export with neutral filters and no shape clipping.
    fn export_plain(
        source: &Bitmap,
        transform: &TransformState,
        frame: &CropFrame,
        target: &CropTarget,
    ) -> Bitmap {
        render_export(source, transform, &Adjustments::default(), frame, target, BG, false)
    }

    /// Left half red, right half blue.
    fn split_image(width: u32, height: u32) -> Bitmap {
        Bitmap::from_rgb_image(image::RgbImage::from_fn(width, height, |x, _| {
            image::Rgb(if x < width / 2 { RED } else { [10, 10, 200] })
        }))
    }

    #[test]
    fn test_preview_without_image_is_background() {
        let t = target(ImageKind::Cover);
        let frame = CropFrame::compute((40, 30), &t, 0.9);
        let mut surface = Bitmap::filled(40, 30, [0, 0, 0]);
        let transform = TransformState::default();
        let adjustments = Adjustments::default();
        let scene = Scene {
            source: None,
            transform: &transform,
            adjustments: &adjustments,
        };
        render_preview(&mut surface, &scene, &frame, &style());

        let (cx, cy) = frame.center();
        assert_eq!(surface.pixel(cx as u32, cy as u32), BG);
    }

    #[test]
    fn test_preview_dims_outside_frame() {
        let t = target(ImageKind::Profile);
        let frame = CropFrame::compute((60, 40), &t, 0.9);
        let source = Bitmap::filled(60, 40, RED);
        let transform = TransformState::default();
        let adjustments = Adjustments::default();
        let scene = Scene {
            source: Some(&source),
            transform: &transform,
            adjustments: &adjustments,
        };
        let mut surface = Bitmap::filled(60, 40, BG);
        render_preview(&mut surface, &scene, &frame, &style());

        assert_eq!(surface.pixel(30, 20), RED, "inside the circle");
        assert_eq!(surface.pixel(1, 1), [100, 5, 5], "outside dimmed by half");
    }

    #[test]
    fn test_preview_stroke() {
        let t = target(ImageKind::Cover);
        let frame = CropFrame::compute((100, 100), &t, 0.9);
        let mut surface = Bitmap::filled(100, 100, BG);
        let transform = TransformState::default();
        let adjustments = Adjustments::default();
        let scene = Scene {
            source: None,
            transform: &transform,
            adjustments: &adjustments,
        };
        let mut s = style();
        s.stroke_width = 2.0;
        render_preview(&mut surface, &scene, &frame, &s);

        // Frame top edge sits at y = 50 - 45/4 = 38.75.
        assert_eq!(surface.pixel(50, 38), [255, 255, 255]);
        assert_ne!(surface.pixel(50, 50), [255, 255, 255]);
    }

    #[test]
    fn test_export_exact_dimensions() {
        let source = split_image(300, 200);
        let t = target(ImageKind::Cover);
        let frame = CropFrame::compute((600, 400), &t, 0.9);
        let mut transform = TransformState::default();
        transform.scale = 3.7;
        transform.offset = (-120.0, 55.0);
        transform.rotation = 33.0;

        let out = export_plain(&source, &transform, &frame, &t);
        assert_eq!((out.width, out.height), (1600, 400));
        assert_eq!(out.pixels.len(), 1600 * 400 * 3);
    }

    #[test]
    fn test_export_matches_preview_composition() {
        // Image centred and at 1:1, left half red. The export's left side
        // must be red and its right side blue, like the preview.
        let source = split_image(100, 100);
        let t = CropTarget::new(ImageKind::Cover, Some(200), Some(100)).unwrap();
        let frame = CropFrame::compute((100, 100), &t, 0.9);
        let transform = TransformState::default();

        let out = export_plain(&source, &transform, &frame, &t);
        assert_eq!(out.pixel(20, 50), RED);
        assert_eq!(out.pixel(180, 50), [10, 10, 200]);
    }

    #[test]
    fn test_export_pan_shifts_content() {
        // Pan the image fully right of the frame: the frame sees background.
        let source = Bitmap::filled(50, 50, RED);
        let t = CropTarget::new(ImageKind::Profile, Some(64), Some(64)).unwrap();
        let frame = CropFrame::compute((100, 100), &t, 0.9);
        let mut transform = TransformState::default();
        transform.offset = (200.0, 0.0);

        let out = export_plain(&source, &transform, &frame, &t);
        assert_eq!(out.pixel(32, 32), BG);
    }

    #[test]
    fn test_export_applies_filters() {
        let source = Bitmap::filled(10, 10, [100, 100, 100]);
        let t = CropTarget::new(ImageKind::Profile, Some(16), Some(16)).unwrap();
        let frame = CropFrame::compute((10, 10), &t, 1.0);
        let mut adjustments = Adjustments::default();
        adjustments.brightness = 2.0;

        let identity = TransformState::default();
        let out = render_export(&source, &identity, &adjustments, &frame, &t, BG, false);
        assert_eq!(out.pixel(8, 8), [200, 200, 200]);
    }

    #[test]
    fn test_export_vignette_darkens_edges() {
        let source = Bitmap::filled(100, 100, [200, 200, 200]);
        let t = CropTarget::new(ImageKind::Profile, Some(64), Some(64)).unwrap();
        let frame = CropFrame::compute((100, 100), &t, 0.9);
        let mut transform = TransformState::default();
        transform.scale = 2.0;
        let mut adjustments = Adjustments::default();
        adjustments.vignette = 1.0;

        let out = render_export(&source, &transform, &adjustments, &frame, &t, BG, false);
        let centre = out.pixel(32, 32);
        let rim = out.pixel(32, 1);
        assert_eq!(centre, [200, 200, 200]);
        assert!(rim[0] < 40, "rim should be nearly black, got {:?}", rim);
        // Corners sit outside the circle clip and keep their colour.
        assert_eq!(out.pixel(0, 0), [200, 200, 200]);
    }

    #[test]
    fn test_export_clip_to_circle() {
        let source = Bitmap::filled(100, 100, RED);
        let t = CropTarget::new(ImageKind::Profile, Some(32), Some(32)).unwrap();
        let frame = CropFrame::compute((100, 100), &t, 0.9);
        let mut transform = TransformState::default();
        transform.scale = 2.0;

        let out = render_export(&source, &transform, &Adjustments::default(), &frame, &t, BG, true);
        assert_eq!(out.pixel(0, 0), BG);
        assert_eq!(out.pixel(16, 16), RED);
    }

    #[test]
    fn test_extreme_zoom_out_not_degenerate() {
        let source = Bitmap::filled(10, 10, RED);
        let t = target(ImageKind::Profile);
        let frame = CropFrame::compute((600, 400), &t, 0.9);
        let mut transform = TransformState::default();
        transform.scale = 0.1;
        transform.rotation = -777.0;
        transform.offset = (1e6, -1e6);

        let out = export_plain(&source, &transform, &frame, &t);
        assert_eq!((out.width, out.height), (512, 512));
    }
}
