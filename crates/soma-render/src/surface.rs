//! The drawing surface the pipeline paints onto.
//!
//! Shaped after the Canvas2D context: a current transform and a small
//! save/restore state stack (font, alignment, alpha, shadow). The browser
//! implements it over `CanvasRenderingContext2d`; [`crate::recording`]
//! implements it as a display list for headless rendering and tests.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use soma_core::{Alignment, Color, FontFamily, TextMetrics};

/// Drop shadow applied to subsequent text draws.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    pub color: Color,
    pub blur: f64,
    pub offset: Vec2,
}

/// Stroke parameters for decorations (selection outline, guides).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub color: Color,
    pub width: f64,
    /// `[dash, gap]`, or solid when `None`.
    pub dash: Option<[f64; 2]>,
    pub alpha: f64,
}

pub trait Surface {
    /// Decoded image handle the surface can draw.
    type Image;

    /// Physical size in pixels.
    fn size(&self) -> Size;
    fn image_size(&self, image: &Self::Image) -> Size;

    fn save(&mut self);
    fn restore(&mut self);
    /// Clear every pixel to transparent, ignoring the current transform.
    fn clear(&mut self);
    /// Post-multiply the current transform.
    fn transform(&mut self, affine: Affine);
    fn set_image_smoothing(&mut self, high_quality: bool);
    /// Intersect the clip region with `rect` until the next `restore`.
    fn clip(&mut self, rect: Rect);

    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn draw_image(&mut self, image: &Self::Image, dest: Rect);

    fn set_font(&mut self, family: FontFamily, size: f64);
    fn set_text_align(&mut self, alignment: Alignment);
    fn set_global_alpha(&mut self, alpha: f64);
    /// `None` turns shadows off.
    fn set_shadow(&mut self, shadow: Option<Shadow>);
    fn fill_text(&mut self, text: &str, at: Point, color: Color);
    fn stroke_text(&mut self, text: &str, at: Point, color: Color, width: f64);
    /// Measure `text` in the current font.
    fn measure_text(&mut self, text: &str) -> TextMetrics;

    fn stroke_rect(&mut self, rect: Rect, style: &LineStyle);
    fn stroke_line(&mut self, from: Point, to: Point, style: &LineStyle);
}
