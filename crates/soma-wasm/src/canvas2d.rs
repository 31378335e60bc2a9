//! `Surface` over an HTML `<canvas>` 2D context, plus the browser halves of
//! text measurement and export.

use kurbo::{Affine, Point, Rect, Size};
use soma_core::{Alignment, Color, FontFamily, TextMeasurer, TextMetrics};
use soma_render::export::{ExportBackend, ExportError, ExportFormat};
use soma_render::{LineStyle, Shadow, Surface};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlImageElement, ImageSmoothingQuality,
};

fn css_font(family: FontFamily, size: f64) -> String {
    format!("{size}px {}", family.css_stack())
}

fn log_js_error(what: &str, result: Result<(), JsValue>) {
    if let Err(e) = result {
        log::warn!("canvas2d: {what} failed: {e:?}");
    }
}

pub struct Canvas2dSurface {
    ctx: CanvasRenderingContext2d,
    size: Size,
    font: (FontFamily, f64),
    /// Alpha set by `set_global_alpha`, restored after decorations.
    alpha: f64,
}

impl Canvas2dSurface {
    pub fn new(ctx: CanvasRenderingContext2d, width: f64, height: f64) -> Self {
        Self {
            ctx,
            size: Size::new(width, height),
            font: (FontFamily::Saira, 10.0),
            alpha: 1.0,
        }
    }

    pub fn context(&self) -> &CanvasRenderingContext2d {
        &self.ctx
    }

    fn apply_line(&self, style: &LineStyle) {
        self.ctx.set_stroke_style_str(&style.color.to_css());
        self.ctx.set_line_width(style.width);
        self.ctx.set_global_alpha(self.alpha * style.alpha);
        let dash = match style.dash {
            Some([on, off]) => js_sys::Array::of2(&on.into(), &off.into()),
            None => js_sys::Array::new(),
        };
        log_js_error("setLineDash", self.ctx.set_line_dash(&dash));
    }
}

impl Surface for Canvas2dSurface {
    type Image = HtmlImageElement;

    fn size(&self) -> Size {
        self.size
    }

    fn image_size(&self, image: &HtmlImageElement) -> Size {
        Size::new(
            f64::from(image.natural_width()),
            f64::from(image.natural_height()),
        )
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
        self.alpha = self.ctx.global_alpha();
    }

    fn clear(&mut self) {
        self.ctx.save();
        log_js_error(
            "setTransform",
            self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0),
        );
        self.ctx
            .clear_rect(0.0, 0.0, self.size.width, self.size.height);
        self.ctx.restore();
    }

    fn transform(&mut self, affine: Affine) {
        let [a, b, c, d, e, f] = affine.as_coeffs();
        log_js_error("transform", self.ctx.transform(a, b, c, d, e, f));
    }

    fn set_image_smoothing(&mut self, high_quality: bool) {
        self.ctx.set_image_smoothing_enabled(true);
        if high_quality {
            self.ctx
                .set_image_smoothing_quality(ImageSmoothingQuality::High);
        }
    }

    fn clip(&mut self, rect: Rect) {
        self.ctx.begin_path();
        self.ctx.rect(rect.x0, rect.y0, rect.width(), rect.height());
        self.ctx.clip();
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx
            .fill_rect(rect.x0, rect.y0, rect.width(), rect.height());
    }

    fn draw_image(&mut self, image: &HtmlImageElement, dest: Rect) {
        log_js_error(
            "drawImage",
            self.ctx.draw_image_with_html_image_element_and_dw_and_dh(
                image,
                dest.x0,
                dest.y0,
                dest.width(),
                dest.height(),
            ),
        );
    }

    fn set_font(&mut self, family: FontFamily, size: f64) {
        self.font = (family, size);
        self.ctx.set_font(&css_font(family, size));
    }

    fn set_text_align(&mut self, alignment: Alignment) {
        self.ctx.set_text_align(alignment.as_str());
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.alpha = alpha;
        self.ctx.set_global_alpha(alpha);
    }

    fn set_shadow(&mut self, shadow: Option<Shadow>) {
        match shadow {
            Some(shadow) => {
                self.ctx.set_shadow_blur(shadow.blur);
                self.ctx.set_shadow_offset_x(shadow.offset.x);
                self.ctx.set_shadow_offset_y(shadow.offset.y);
                self.ctx.set_shadow_color(&shadow.color.to_css());
            }
            None => {
                self.ctx.set_shadow_blur(0.0);
                self.ctx.set_shadow_offset_x(0.0);
                self.ctx.set_shadow_offset_y(0.0);
                self.ctx.set_shadow_color("transparent");
            }
        }
    }

    fn fill_text(&mut self, text: &str, at: Point, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
        log_js_error("fillText", self.ctx.fill_text(text, at.x, at.y));
    }

    fn stroke_text(&mut self, text: &str, at: Point, color: Color, width: f64) {
        self.ctx.set_stroke_style_str(&color.to_css());
        self.ctx.set_line_width(width);
        self.ctx.set_line_join("round");
        log_js_error("strokeText", self.ctx.stroke_text(text, at.x, at.y));
    }

    fn measure_text(&mut self, text: &str) -> TextMetrics {
        match self.ctx.measure_text(text) {
            Ok(m) => TextMetrics {
                width: m.width(),
                ascent: m.actual_bounding_box_ascent(),
                descent: m.actual_bounding_box_descent(),
            },
            Err(e) => {
                log::warn!("canvas2d: measureText failed: {e:?}");
                TextMetrics {
                    width: 0.0,
                    ascent: self.font.1,
                    descent: 0.0,
                }
            }
        }
    }

    fn stroke_rect(&mut self, rect: Rect, style: &LineStyle) {
        self.ctx.save();
        self.apply_line(style);
        self.ctx
            .stroke_rect(rect.x0, rect.y0, rect.width(), rect.height());
        self.ctx.restore();
    }

    fn stroke_line(&mut self, from: Point, to: Point, style: &LineStyle) {
        self.ctx.save();
        self.apply_line(style);
        self.ctx.begin_path();
        self.ctx.move_to(from.x, from.y);
        self.ctx.line_to(to.x, to.y);
        self.ctx.stroke();
        self.ctx.restore();
    }
}

/// Hit-test measurement through a 2D context's `measureText`.
pub struct CanvasMeasurer {
    ctx: CanvasRenderingContext2d,
}

impl CanvasMeasurer {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }
}

impl TextMeasurer for CanvasMeasurer {
    fn measure(&self, text: &str, family: FontFamily, font_size: f64) -> TextMetrics {
        self.ctx.save();
        self.ctx.set_font(&css_font(family, font_size));
        let metrics = match self.ctx.measure_text(text) {
            Ok(m) => TextMetrics {
                width: m.width(),
                ascent: m.actual_bounding_box_ascent(),
                descent: m.actual_bounding_box_descent(),
            },
            Err(e) => {
                log::warn!("canvas2d: measureText failed: {e:?}");
                TextMetrics::default()
            }
        };
        self.ctx.restore();
        metrics
    }
}

/// Offscreen-canvas export: render into a detached `<canvas>`, then
/// serialize it to a data URL.
pub struct CanvasExportBackend {
    document: Document,
}

impl CanvasExportBackend {
    pub fn new(document: Document) -> Self {
        Self { document }
    }
}

impl ExportBackend for CanvasExportBackend {
    type Surface = Canvas2dSurface;
    type Encoded = String;

    fn create_surface(&mut self, width: u32, height: u32) -> Result<Canvas2dSurface, ExportError> {
        let canvas: HtmlCanvasElement = self
            .document
            .create_element("canvas")
            .map_err(|e| ExportError::Surface(format!("{e:?}")))?
            .dyn_into()
            .map_err(|_| ExportError::Surface("created element is not a canvas".into()))?;
        canvas.set_width(width);
        canvas.set_height(height);
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .map_err(|e| ExportError::Surface(format!("{e:?}")))?
            .ok_or_else(|| ExportError::Surface("2d context unavailable".into()))?
            .dyn_into()
            .map_err(|_| ExportError::Surface("unexpected context type".into()))?;
        Ok(Canvas2dSurface::new(
            ctx,
            f64::from(width),
            f64::from(height),
        ))
    }

    fn encode(
        &mut self,
        surface: Canvas2dSurface,
        format: ExportFormat,
    ) -> Result<String, ExportError> {
        let canvas = surface
            .context()
            .canvas()
            .ok_or_else(|| ExportError::Encode("context has no canvas".into()))?;
        let encoded = match format.quality() {
            Some(q) => canvas.to_data_url_with_type_and_encoder_options(format.mime(), &q.into()),
            None => canvas.to_data_url_with_type(format.mime()),
        };
        // toDataURL only throws for a tainted canvas (SecurityError).
        encoded.map_err(|e| ExportError::Tainted(format!("{e:?}")))
    }
}
