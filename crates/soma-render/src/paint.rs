//! Scene → surface drawing.
//!
//! One routine paints both the interactive preview and the export. The
//! preview runs it under the view transform at logical scale; the export
//! runs it without any view transform and multiplies every size-dependent
//! quantity by the export scale, so shadows and strokes (which a Canvas2D
//! context does not scale with its transform) come out proportional.

use crate::surface::{LineStyle, Shadow, Surface};
use kurbo::{Affine, Point, Rect, Vec2};
use soma_core::geometry::{Axis, Guide, cover_fit, selection_rect_local};
use soma_core::{CANVAS_HEIGHT, CANVAS_WIDTH, ElementId, Scene, TextElement, palette};

/// What sits underneath the text layers.
#[derive(Debug)]
pub enum Backdrop<'a, I> {
    /// Solid brand fill (no image, image still loading, or image failed).
    Brand,
    Image(&'a I),
}

impl<I> Clone for Backdrop<'_, I> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<I> Copy for Backdrop<'_, I> {}

/// Interactive decorations drawn only in the preview.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overlay<'a> {
    pub selection: Option<ElementId>,
    pub guides: &'a [Guide],
}

pub const SELECTION_STYLE: LineStyle = LineStyle {
    color: palette::ACCENT,
    width: 2.0,
    dash: Some([5.0, 5.0]),
    alpha: 1.0,
};

pub const GUIDE_STYLE: LineStyle = LineStyle {
    color: palette::ACCENT,
    width: 1.0,
    dash: Some([5.0, 5.0]),
    alpha: 0.8,
};

pub fn logical_canvas() -> Rect {
    Rect::new(0.0, 0.0, CANVAS_WIDTH, CANVAS_HEIGHT)
}

/// Paint the interactive preview: view transform, background, text layers,
/// selection outline and snap guides.
pub fn render_preview<S: Surface>(
    surface: &mut S,
    scene: &Scene,
    backdrop: Backdrop<'_, S::Image>,
    overlay: &Overlay<'_>,
) {
    let size = surface.size();
    surface.clear();
    surface.save();
    surface.transform(scene.view.to_affine(size.width, size.height));

    paint_backdrop(surface, backdrop, logical_canvas());
    paint_elements(surface, scene, 1.0, overlay.selection);
    paint_guides(surface, overlay.guides);

    surface.restore();
}

/// Paint the export composition onto a surface already sized to the target
/// resolution. Returns the uniform scale that was applied.
pub fn render_export<S: Surface>(
    surface: &mut S,
    scene: &Scene,
    backdrop: Backdrop<'_, S::Image>,
) -> f64 {
    let size = surface.size();
    let scale = export_scale(size.width, size.height);
    log::debug!(
        "export render {}x{} scale {scale:.4}",
        size.width,
        size.height
    );

    surface.clear();
    surface.save();
    surface.set_image_smoothing(true);
    paint_backdrop(surface, backdrop, Rect::new(0.0, 0.0, size.width, size.height));
    paint_elements(surface, scene, scale, None);
    surface.restore();
    scale
}

/// Single uniform factor mapping the logical canvas into a target size.
pub fn export_scale(target_width: f64, target_height: f64) -> f64 {
    (target_width / CANVAS_WIDTH).min(target_height / CANVAS_HEIGHT)
}

fn paint_backdrop<S: Surface>(surface: &mut S, backdrop: Backdrop<'_, S::Image>, target: Rect) {
    match backdrop {
        Backdrop::Brand => surface.fill_rect(target, palette::BRAND_DARK),
        Backdrop::Image(image) => {
            let dest = cover_fit(surface.image_size(image), target);
            surface.save();
            surface.clip(target);
            // Transparent image regions show the brand color.
            surface.fill_rect(target, palette::BRAND_DARK);
            surface.draw_image(image, dest);
            surface.restore();
        }
    }
}

fn paint_elements<S: Surface>(
    surface: &mut S,
    scene: &Scene,
    scale: f64,
    selection: Option<ElementId>,
) {
    for element in scene.visible() {
        paint_element(surface, element, scale, selection == Some(element.id));
    }
}

fn paint_element<S: Surface>(surface: &mut S, element: &TextElement, scale: f64, selected: bool) {
    log::trace!(
        "PAINT text {} {:?} at ({}, {}) x{scale}",
        element.id,
        element.text,
        element.x,
        element.y
    );

    surface.save();
    surface.set_font(element.font_family, element.font_size * scale);
    surface.set_text_align(element.alignment);
    surface.set_global_alpha(element.opacity);
    surface.transform(
        Affine::translate(Vec2::new(element.x * scale, element.y * scale))
            * Affine::rotate(element.rotation.to_radians()),
    );

    if element.has_shadow() {
        surface.set_shadow(Some(Shadow {
            color: element.shadow_color,
            blur: element.shadow_blur * scale,
            offset: Vec2::new(element.shadow_offset_x, element.shadow_offset_y) * scale,
        }));
    }
    if element.has_stroke() {
        surface.stroke_text(
            &element.text,
            Point::ORIGIN,
            element.stroke_color,
            element.stroke_width * scale,
        );
    }
    surface.fill_text(&element.text, Point::ORIGIN, element.color);

    if selected {
        surface.set_shadow(None);
        let metrics = surface.measure_text(&element.text);
        let outline = selection_rect_local(element, metrics.width);
        surface.stroke_rect(outline, &SELECTION_STYLE);
    }

    surface.restore();
}

fn paint_guides<S: Surface>(surface: &mut S, guides: &[Guide]) {
    if guides.is_empty() {
        return;
    }
    surface.save();
    surface.set_shadow(None);
    for guide in guides {
        let (from, to) = match guide.axis {
            Axis::Vertical => (Point::new(guide.at, 0.0), Point::new(guide.at, CANVAS_HEIGHT)),
            Axis::Horizontal => (Point::new(0.0, guide.at), Point::new(CANVAS_WIDTH, guide.at)),
        };
        surface.stroke_line(from, to, &GUIDE_STYLE);
    }
    surface.restore();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_scale_is_uniform_min() {
        assert_eq!(export_scale(1080.0, 1080.0), 1.0);
        assert_eq!(export_scale(2160.0, 2160.0), 2.0);
        assert_eq!(export_scale(1080.0, 1920.0), 1.0);
        assert!((export_scale(1200.0, 627.0) - 627.0 / 1080.0).abs() < 1e-12);
    }
}
