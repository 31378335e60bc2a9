//! Preview view transform: zoom + pan over the logical canvas.
//!
//! The physical preview surface is some fixed pixel size (e.g. 900×900);
//! the logical canvas is always 1080×1080. The full mapping is
//!
//! ```text
//! display_scale · translate(c) · scale(zoom) · translate(-c + offset)
//! ```
//!
//! where `c` is the logical canvas center. Zoom therefore happens around the
//! center, and `offset` pans in logical units.

use crate::model::{CANVAS_HEIGHT, CANVAS_WIDTH};
use kurbo::{Affine, Point, Vec2};

pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 3.0;
pub const ZOOM_STEP: f64 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub zoom: f64,
    pub offset: Vec2,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: ViewTransform = ViewTransform {
        zoom: 1.0,
        offset: Vec2::ZERO,
    };

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Logical → physical transform for a surface of the given pixel size.
    pub fn to_affine(&self, surface_width: f64, surface_height: f64) -> Affine {
        let display = Affine::scale_non_uniform(
            surface_width / CANVAS_WIDTH,
            surface_height / CANVAS_HEIGHT,
        );
        let center = Vec2::new(CANVAS_WIDTH / 2.0, CANVAS_HEIGHT / 2.0);
        display
            * Affine::translate(center)
            * Affine::scale(self.zoom)
            * Affine::translate(self.offset - center)
    }

    /// Map a physical surface coordinate back into logical canvas units.
    pub fn surface_to_logical(&self, p: Point, surface_width: f64, surface_height: f64) -> Point {
        self.to_affine(surface_width, surface_height).inverse() * p
    }

    pub fn zoom_in(&mut self, step: f64, max: f64) {
        self.zoom = (self.zoom * step).min(max);
    }

    pub fn zoom_out(&mut self, step: f64, min: f64) {
        self.zoom = (self.zoom / step).max(min);
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    pub fn reset(&mut self) {
        *self = Self::IDENTITY;
    }

    /// Zoom so the logical canvas fits a `display_width × display_height`
    /// container, shrunk by `padding` (e.g. 0.9), with pan cleared.
    pub fn fit(&mut self, display_width: f64, display_height: f64, padding: f64) {
        let canvas_ratio = CANVAS_WIDTH / CANVAS_HEIGHT;
        let display_ratio = display_width / display_height;
        let zoom = if canvas_ratio > display_ratio {
            display_width / CANVAS_WIDTH
        } else {
            display_height / CANVAS_HEIGHT
        };
        self.zoom = zoom * padding;
        self.offset = Vec2::ZERO;
    }

    /// Zoom as a whole percentage, for the toolbar readout.
    pub fn zoom_percent(&self) -> u32 {
        (self.zoom * 100.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn identity_maps_display_scale_only() {
        let v = ViewTransform::IDENTITY;
        let p = v.to_affine(900.0, 900.0) * Point::new(1080.0, 540.0);
        assert!(approx(p, Point::new(900.0, 450.0)));
    }

    #[test]
    fn surface_to_logical_inverts() {
        let v = ViewTransform {
            zoom: 2.0,
            offset: Vec2::new(30.0, -12.0),
        };
        let logical = Point::new(321.0, 777.0);
        let screen = v.to_affine(900.0, 900.0) * logical;
        assert!(approx(v.surface_to_logical(screen, 900.0, 900.0), logical));
    }

    #[test]
    fn zoom_keeps_center_fixed() {
        let v = ViewTransform {
            zoom: 3.0,
            offset: Vec2::ZERO,
        };
        let c = v.to_affine(1080.0, 1080.0) * Point::new(540.0, 540.0);
        assert!(approx(c, Point::new(540.0, 540.0)));
    }

    #[test]
    fn zoom_is_clamped() {
        let mut v = ViewTransform::IDENTITY;
        for _ in 0..20 {
            v.zoom_in(ZOOM_STEP, MAX_ZOOM);
        }
        assert_eq!(v.zoom, MAX_ZOOM);
        for _ in 0..20 {
            v.zoom_out(ZOOM_STEP, MIN_ZOOM);
        }
        assert_eq!(v.zoom, MIN_ZOOM);
    }

    #[test]
    fn fit_uses_display_ratio() {
        let mut v = ViewTransform {
            zoom: 2.5,
            offset: Vec2::new(5.0, 5.0),
        };
        v.fit(900.0, 900.0, 0.9);
        assert!((v.zoom - 0.75).abs() < 1e-9);
        assert_eq!(v.offset, Vec2::ZERO);
        assert_eq!(v.zoom_percent(), 75);
    }
}
