//! Geometry for direct manipulation: snapping, hit bounds, cover-fit.
//!
//! Everything here is a pure function of its inputs, in logical canvas
//! units.

use crate::id::ElementId;
use crate::measure::TextMetrics;
use crate::model::{CANVAS_HEIGHT, CANVAS_WIDTH, TextElement};
use kurbo::{Affine, Point, Rect, Size, Vec2};
use smallvec::SmallVec;

/// Distance (logical units) within which a dragged anchor locks to a guide.
pub const SNAP_THRESHOLD: f64 = 10.0;
/// Margin added around measured text for pointer hit-testing.
pub const HIT_PADDING: f64 = 10.0;
/// Margin between the text and its dashed selection outline.
pub const SELECTION_PADDING: f64 = 5.0;

// ─── Snapping ────────────────────────────────────────────────────────────

/// Orientation of a snap guide line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// A vertical line at some `x`.
    Vertical,
    /// A horizontal line at some `y`.
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Guide {
    pub axis: Axis,
    pub at: f64,
}

/// At most one guide per axis.
pub type Guides = SmallVec<[Guide; 2]>;

/// Result of [`snap`]: the corrected anchor plus the guides to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct Snap {
    pub x: f64,
    pub y: f64,
    pub guides: Guides,
}

impl Snap {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn vertical(&self) -> Option<f64> {
        guide_on(&self.guides, Axis::Vertical)
    }

    pub fn horizontal(&self) -> Option<f64> {
        guide_on(&self.guides, Axis::Horizontal)
    }
}

pub fn guide_on(guides: &[Guide], axis: Axis) -> Option<f64> {
    guides.iter().find(|g| g.axis == axis).map(|g| g.at)
}

fn set_guide(guides: &mut Guides, axis: Axis, at: f64) {
    match guides.iter_mut().find(|g| g.axis == axis) {
        Some(g) => g.at = at,
        None => guides.push(Guide { axis, at }),
    }
}

/// Snap a proposed anchor for `moving` against the canvas center and the
/// anchors of every other visible element.
///
/// Each axis is independent. Candidates are checked center first, then
/// siblings in paint order; the last one within `threshold` wins.
pub fn snap(
    moving: ElementId,
    proposed: Point,
    elements: &[TextElement],
    threshold: f64,
) -> Snap {
    let center = Point::new(CANVAS_WIDTH / 2.0, CANVAS_HEIGHT / 2.0);
    let mut out = Snap {
        x: proposed.x,
        y: proposed.y,
        guides: Guides::new(),
    };

    if (proposed.x - center.x).abs() < threshold {
        out.x = center.x;
        set_guide(&mut out.guides, Axis::Vertical, center.x);
    }
    if (proposed.y - center.y).abs() < threshold {
        out.y = center.y;
        set_guide(&mut out.guides, Axis::Horizontal, center.y);
    }

    for other in elements.iter().filter(|e| e.visible && e.id != moving) {
        if (proposed.x - other.x).abs() < threshold {
            out.x = other.x;
            set_guide(&mut out.guides, Axis::Vertical, other.x);
        }
        if (proposed.y - other.y).abs() < threshold {
            out.y = other.y;
            set_guide(&mut out.guides, Axis::Horizontal, other.y);
        }
    }

    out
}

// ─── Bounds ──────────────────────────────────────────────────────────────

/// Unrotated hit box of `element` in logical coordinates, padded by
/// [`HIT_PADDING`]. The box spans from one text-height above the baseline
/// down to the padding below it.
pub fn text_bounds(element: &TextElement, metrics: &TextMetrics) -> Rect {
    let height = metrics.height_or(element.font_size);
    let left = element.x + element.alignment.left_offset(metrics.width);
    Rect::new(
        left - HIT_PADDING,
        element.y - height - HIT_PADDING,
        left + metrics.width + HIT_PADDING,
        element.y + HIT_PADDING,
    )
}

/// Selection outline in the element's own (translated + rotated) frame,
/// with the anchor at the origin. Logical units; only the preview draws it.
pub fn selection_rect_local(element: &TextElement, text_width: f64) -> Rect {
    let height = element.font_size;
    let pad = SELECTION_PADDING;
    let left = element.alignment.left_offset(text_width);
    Rect::new(left - pad, -height - pad, left + text_width + pad, pad)
}

/// Whether logical point `p` falls on `element`, taking its rotation into
/// account. Invisible elements never match.
pub fn hits_element(element: &TextElement, metrics: &TextMetrics, p: Point) -> bool {
    if !element.visible {
        return false;
    }
    let local = element_frame(element).inverse() * p;
    let anchored = Point::new(local.x + element.x, local.y + element.y);
    let b = text_bounds(element, metrics);
    anchored.x >= b.x0 && anchored.x <= b.x1 && anchored.y >= b.y0 && anchored.y <= b.y1
}

/// Transform from element-local space (anchor at origin, unrotated) to
/// logical canvas space.
pub fn element_frame(element: &TextElement) -> Affine {
    Affine::translate(Vec2::new(element.x, element.y)) * Affine::rotate(element.rotation.to_radians())
}

// ─── Background fitting ──────────────────────────────────────────────────

/// Destination rectangle that scales an image of `image` size to fully
/// cover `target`, preserving aspect ratio and centering the overflow.
pub fn cover_fit(image: Size, target: Rect) -> Rect {
    if image.width <= 0.0 || image.height <= 0.0 {
        return target;
    }
    let scale = (target.width() / image.width).max(target.height() / image.height);
    let size = Size::new(image.width * scale, image.height * scale);
    let origin = Point::new(
        target.x0 + (target.width() - size.width) / 2.0,
        target.y0 + (target.height() - size.height) / 2.0,
    );
    Rect::from_origin_size(origin, size)
}
