//! Display-list surface.
//!
//! Records every draw call with its geometry already mapped into device
//! pixels. Used for headless export and by the tests, which assert on the
//! recorded operations instead of on pixels.

use crate::export::{ExportBackend, ExportError};
use crate::surface::{LineStyle, Shadow, Surface};
use kurbo::{Affine, Point, Rect, Size};
use soma_core::{Alignment, ApproxMeasurer, Color, FontFamily, TextMeasurer, TextMetrics};

/// Stand-in for a decoded image.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedImage {
    pub label: String,
    pub size: Size,
}

impl RecordedImage {
    pub fn new(label: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            label: label.into(),
            size: Size::new(width, height),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear,
    Clip {
        rect: Rect,
    },
    FillRect {
        rect: Rect,
        color: Color,
    },
    DrawImage {
        label: String,
        dest: Rect,
        smoothing: bool,
    },
    FillText {
        text: String,
        origin: Point,
        font: (FontFamily, f64),
        align: Alignment,
        color: Color,
        alpha: f64,
        shadow: Option<Shadow>,
    },
    StrokeText {
        text: String,
        origin: Point,
        color: Color,
        width: f64,
        shadow: Option<Shadow>,
    },
    StrokeRect {
        /// Device-space bounding box of the (possibly rotated) rectangle.
        bounds: Rect,
        style: LineStyle,
    },
    StrokeLine {
        from: Point,
        to: Point,
        style: LineStyle,
    },
}

#[derive(Debug, Clone, Copy)]
struct State {
    transform: Affine,
    font: (FontFamily, f64),
    align: Alignment,
    alpha: f64,
    shadow: Option<Shadow>,
    smoothing: bool,
}

impl Default for State {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            font: (FontFamily::Saira, 10.0),
            align: Alignment::Left,
            alpha: 1.0,
            shadow: None,
            smoothing: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordingSurface {
    size: Size,
    state: State,
    stack: Vec<State>,
    pub ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: Size::new(width, height),
            state: State::default(),
            stack: Vec::new(),
            ops: Vec::new(),
        }
    }

    pub fn texts(&self) -> impl Iterator<Item = &DrawOp> {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::FillText { .. }))
    }

    /// Save/restore depth; zero once a render completes.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn device(&self, p: Point) -> Point {
        self.state.transform * p
    }
}

impl Surface for RecordingSurface {
    type Image = RecordedImage;

    fn size(&self) -> Size {
        self.size
    }

    fn image_size(&self, image: &RecordedImage) -> Size {
        image.size
    }

    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        match self.stack.pop() {
            Some(state) => self.state = state,
            None => log::warn!("recording surface: restore without save"),
        }
    }

    fn clear(&mut self) {
        self.ops.push(DrawOp::Clear);
    }

    fn transform(&mut self, affine: Affine) {
        self.state.transform *= affine;
    }

    fn set_image_smoothing(&mut self, high_quality: bool) {
        self.state.smoothing = high_quality;
    }

    fn clip(&mut self, rect: Rect) {
        let rect = self.state.transform.transform_rect_bbox(rect);
        self.ops.push(DrawOp::Clip { rect });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let rect = self.state.transform.transform_rect_bbox(rect);
        self.ops.push(DrawOp::FillRect { rect, color });
    }

    fn draw_image(&mut self, image: &RecordedImage, dest: Rect) {
        let dest = self.state.transform.transform_rect_bbox(dest);
        self.ops.push(DrawOp::DrawImage {
            label: image.label.clone(),
            dest,
            smoothing: self.state.smoothing,
        });
    }

    fn set_font(&mut self, family: FontFamily, size: f64) {
        self.state.font = (family, size);
    }

    fn set_text_align(&mut self, alignment: Alignment) {
        self.state.align = alignment;
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.state.alpha = alpha;
    }

    fn set_shadow(&mut self, shadow: Option<Shadow>) {
        self.state.shadow = shadow;
    }

    fn fill_text(&mut self, text: &str, at: Point, color: Color) {
        self.ops.push(DrawOp::FillText {
            text: text.to_string(),
            origin: self.device(at),
            font: self.state.font,
            align: self.state.align,
            color,
            alpha: self.state.alpha,
            shadow: self.state.shadow,
        });
    }

    fn stroke_text(&mut self, text: &str, at: Point, color: Color, width: f64) {
        self.ops.push(DrawOp::StrokeText {
            text: text.to_string(),
            origin: self.device(at),
            color,
            width,
            shadow: self.state.shadow,
        });
    }

    fn measure_text(&mut self, text: &str) -> TextMetrics {
        let (family, size) = self.state.font;
        ApproxMeasurer.measure(text, family, size)
    }

    fn stroke_rect(&mut self, rect: Rect, style: &LineStyle) {
        let bounds = self.state.transform.transform_rect_bbox(rect);
        self.ops.push(DrawOp::StrokeRect {
            bounds,
            style: *style,
        });
    }

    fn stroke_line(&mut self, from: Point, to: Point, style: &LineStyle) {
        self.ops.push(DrawOp::StrokeLine {
            from: self.device(from),
            to: self.device(to),
            style: *style,
        });
    }
}

/// Export backend producing display lists instead of encoded bytes.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    /// When set, encoding fails with this error (simulates a tainted canvas).
    pub fail_with: Option<ExportError>,
}

impl ExportBackend for RecordingBackend {
    type Surface = RecordingSurface;
    type Encoded = Vec<DrawOp>;

    fn create_surface(&mut self, width: u32, height: u32) -> Result<RecordingSurface, ExportError> {
        Ok(RecordingSurface::new(f64::from(width), f64::from(height)))
    }

    fn encode(
        &mut self,
        surface: RecordingSurface,
        _format: crate::export::ExportFormat,
    ) -> Result<Vec<DrawOp>, ExportError> {
        match &self.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(surface.ops),
        }
    }
}
