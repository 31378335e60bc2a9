use kurbo::{Point, Rect, Vec2};
use pretty_assertions::assert_eq;
use soma_core::geometry::{Axis, Guide};
use soma_core::{Scene, TextPatch, ViewTransform, palette};
use soma_render::*;

fn sample_scene() -> Scene {
    let mut scene = Scene::new();
    let id = scene.add_text("Soma").id;
    scene.update_text(
        id,
        &TextPatch {
            x: Some(200.0),
            y: Some(300.0),
            stroke_width: Some(4.0),
            shadow_blur: Some(6.0),
            shadow_offset_x: Some(2.0),
            shadow_offset_y: Some(-3.0),
            ..TextPatch::default()
        },
    );
    scene
}

fn fill_texts(ops: &[DrawOp]) -> Vec<(Point, f64, Option<Shadow>)> {
    ops.iter()
        .filter_map(|op| match op {
            DrawOp::FillText {
                origin,
                font,
                shadow,
                ..
            } => Some((*origin, font.1, *shadow)),
            _ => None,
        })
        .collect()
}

#[test]
fn export_scales_every_quantity() {
    let scene = sample_scene();
    let mut base = RecordingBackend::default();
    let mut double = RecordingBackend::default();

    let one = export_image(
        &mut base,
        &scene,
        Backdrop::Brand,
        &ExportRequest::preset("Instagram Post").unwrap(),
        1,
    )
    .unwrap();
    let two = export_image(
        &mut double,
        &scene,
        Backdrop::Brand,
        &ExportRequest::custom(2160, 2160, ExportFormat::Png).unwrap(),
        1,
    )
    .unwrap();

    assert_eq!(one.scale, 1.0);
    assert_eq!(two.scale, 2.0);
    let a = fill_texts(&one.data);
    let b = fill_texts(&two.data);
    assert_eq!(a.len(), 1);
    assert_eq!(b[0].0, Point::new(a[0].0.x * 2.0, a[0].0.y * 2.0));
    assert_eq!(b[0].1, a[0].1 * 2.0);
    let (sa, sb) = (a[0].2.unwrap(), b[0].2.unwrap());
    assert_eq!(sb.blur, sa.blur * 2.0);
    assert_eq!(sb.offset, sa.offset * 2.0);

    let stroke_widths: Vec<f64> = two
        .data
        .iter()
        .filter_map(|op| match op {
            DrawOp::StrokeText { width, .. } => Some(*width),
            _ => None,
        })
        .collect();
    assert_eq!(stroke_widths, vec![8.0]);
}

#[test]
fn export_ignores_view_transform() {
    let scene = sample_scene();
    let mut zoomed = scene.clone();
    zoomed.view = ViewTransform {
        zoom: 2.5,
        offset: Vec2::new(40.0, -30.0),
    };
    let image = RecordedImage::new("photo", 1600.0, 900.0);
    let request = ExportRequest::preset("Instagram Story").unwrap();

    let plain = export_image(
        &mut RecordingBackend::default(),
        &scene,
        Backdrop::Image(&image),
        &request,
        3,
    )
    .unwrap();
    let moved = export_image(
        &mut RecordingBackend::default(),
        &zoomed,
        Backdrop::Image(&image),
        &request,
        3,
    )
    .unwrap();

    assert_eq!(moved.scale, plain.scale);
    assert_eq!(moved.data, plain.data);
}

#[test]
fn export_fills_full_target_and_skips_overlays() {
    let scene = sample_scene();
    let mut backend = RecordingBackend::default();
    let asset = export_image(
        &mut backend,
        &scene,
        Backdrop::Brand,
        &ExportRequest::preset("Instagram Story").unwrap(),
        7,
    )
    .unwrap();

    assert_eq!(asset.filename, "soma_instagram_story_7.png");
    assert_eq!(asset.mime, "image/png");
    assert_eq!(
        asset.data[1],
        DrawOp::FillRect {
            rect: Rect::new(0.0, 0.0, 1080.0, 1920.0),
            color: palette::BRAND_DARK,
        }
    );
    assert!(
        !asset
            .data
            .iter()
            .any(|op| matches!(op, DrawOp::StrokeRect { .. } | DrawOp::StrokeLine { .. }))
    );
}

#[test]
fn export_cover_fits_image_with_smoothing() {
    let scene = Scene::new();
    let image = RecordedImage::new("photo", 2000.0, 1000.0);
    let mut backend = RecordingBackend::default();
    let asset = export_image(
        &mut backend,
        &scene,
        Backdrop::Image(&image),
        &ExportRequest::preset("Instagram Post").unwrap(),
        0,
    )
    .unwrap();

    let draw = asset
        .data
        .iter()
        .find_map(|op| match op {
            DrawOp::DrawImage {
                dest, smoothing, ..
            } => Some((*dest, *smoothing)),
            _ => None,
        })
        .unwrap();
    assert!(draw.1);
    assert!(asset.data.contains(&DrawOp::Clip {
        rect: Rect::new(0.0, 0.0, 1080.0, 1080.0)
    }));
    assert!((draw.0.height() - 1080.0).abs() < 1e-6);
    assert!((draw.0.x0 + 540.0).abs() < 1e-6);
}

#[test]
fn encode_failure_surfaces_as_error() {
    let scene = sample_scene();
    let mut backend = RecordingBackend {
        fail_with: Some(ExportError::Tainted("https://cdn.example.com/bg.jpg".into())),
    };
    let err = export_image(
        &mut backend,
        &scene,
        Backdrop::Brand,
        &ExportRequest::preset("TikTok").unwrap(),
        0,
    )
    .unwrap_err();
    assert!(matches!(err, ExportError::Tainted(_)));
}

#[test]
fn preview_draws_selection_then_guides() {
    let scene = sample_scene();
    let selected = scene.elements[0].id;
    let guides = [Guide {
        axis: Axis::Vertical,
        at: 540.0,
    }];
    let mut surface = RecordingSurface::new(900.0, 900.0);
    render_preview(
        &mut surface,
        &scene,
        Backdrop::Brand,
        &Overlay {
            selection: Some(selected),
            guides: &guides,
        },
    );

    let tail: Vec<&str> = surface
        .ops
        .iter()
        .map(|op| match op {
            DrawOp::Clear => "clear",
            DrawOp::Clip { .. } => "clip",
            DrawOp::FillRect { .. } => "background",
            DrawOp::DrawImage { .. } => "image",
            DrawOp::StrokeText { .. } => "stroke",
            DrawOp::FillText { .. } => "fill",
            DrawOp::StrokeRect { .. } => "selection",
            DrawOp::StrokeLine { .. } => "guide",
        })
        .collect();
    assert_eq!(
        tail,
        vec!["clear", "background", "stroke", "fill", "selection", "guide"]
    );
    assert_eq!(surface.depth(), 0);

    // Preview maps the 1080 logical canvas onto the 900px surface.
    let DrawOp::StrokeLine { from, to, style } = surface.ops[5] else {
        panic!("expected guide");
    };
    assert!((from.x - 450.0).abs() < 1e-9);
    assert!((to.y - 900.0).abs() < 1e-9);
    assert_eq!(style.dash, Some([5.0, 5.0]));
}

#[test]
fn hidden_elements_are_not_painted() {
    let mut scene = sample_scene();
    let id = scene.elements[0].id;
    scene.set_visible(id, false);
    let mut surface = RecordingSurface::new(1080.0, 1080.0);
    render_preview(&mut surface, &scene, Backdrop::Brand, &Overlay::default());
    assert_eq!(surface.texts().count(), 0);
}
