//! Core data model for the canvas editor.
//!
//! A [`Scene`] is an ordered list of [`TextElement`]s painted over an
//! optional background image. All positions are expressed in the fixed
//! 1080×1080 *logical canvas*; the on-screen size, zoom and export
//! resolution are applied later by the renderer.

use crate::color::Color;
use crate::id::ElementId;
use crate::view::ViewTransform;
use serde::{Deserialize, Serialize};

// ─── Canvas constants ────────────────────────────────────────────────────

/// Logical canvas width, in logical units.
pub const CANVAS_WIDTH: f64 = 1080.0;
/// Logical canvas height, in logical units.
pub const CANVAS_HEIGHT: f64 = 1080.0;

/// Brand palette.
pub mod palette {
    use crate::color::Color;

    pub const PETROLEO: Color = Color::rgba(1.0 / 255.0, 89.0 / 255.0, 101.0 / 255.0, 1.0);
    pub const PINO: Color = Color::rgba(0.0, 109.0 / 255.0, 90.0 / 255.0, 1.0);
    pub const AQUAMARINA: Color = Color::rgba(47.0 / 255.0, 1.0, 204.0 / 255.0, 1.0);
    pub const LAVANDA: Color = Color::rgba(212.0 / 255.0, 196.0 / 255.0, 252.0 / 255.0, 1.0);
    pub const NEGRO: Color = Color::rgba(5.0 / 255.0, 31.0 / 255.0, 34.0 / 255.0, 1.0);
    pub const BLANCO: Color = Color::rgba(247.0 / 255.0, 251.0 / 255.0, 254.0 / 255.0, 1.0);

    /// Swatches offered by the color pickers, in display order.
    pub const SWATCHES: [(&str, Color); 6] = [
        ("Petróleo", PETROLEO),
        ("Pino", PINO),
        ("Aquamarina", AQUAMARINA),
        ("Lavanda", LAVANDA),
        ("Negro", NEGRO),
        ("Blanco", BLANCO),
    ];

    /// Fill used when there is no usable background image.
    pub const BRAND_DARK: Color = NEGRO;
    /// Selection outlines and snap guides.
    pub const ACCENT: Color = AQUAMARINA;
}

// ─── Text styling enums ──────────────────────────────────────────────────

/// The fixed set of font families offered by the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FontFamily {
    #[default]
    Saira,
    Manrope,
}

impl FontFamily {
    pub const ALL: [FontFamily; 2] = [FontFamily::Saira, FontFamily::Manrope];

    pub fn label(self) -> &'static str {
        match self {
            FontFamily::Saira => "Saira",
            FontFamily::Manrope => "Manrope",
        }
    }

    /// CSS font stack used when setting a Canvas2D font.
    pub fn css_stack(self) -> &'static str {
        match self {
            FontFamily::Saira => "Saira, sans-serif",
            FontFamily::Manrope => "Manrope, sans-serif",
        }
    }

    /// Accepts either the label (`"Manrope"`) or the CSS stack.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|f| s.eq_ignore_ascii_case(f.label()) || s == f.css_stack())
    }
}

/// How `position.x` maps onto the text's horizontal extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Alignment {
    /// `x` is the left edge.
    Left,
    /// `x` is the horizontal center.
    #[default]
    Center,
    /// `x` is the right edge.
    Right,
}

impl Alignment {
    pub fn as_str(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "left" => Some(Alignment::Left),
            "center" => Some(Alignment::Center),
            "right" => Some(Alignment::Right),
            _ => None,
        }
    }

    /// Offset from the anchor to the left edge of a run `width` wide.
    pub fn left_offset(self, width: f64) -> f64 {
        match self {
            Alignment::Left => 0.0,
            Alignment::Center => -width / 2.0,
            Alignment::Right => -width,
        }
    }
}

// ─── Text element ────────────────────────────────────────────────────────

/// One text layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    pub id: ElementId,
    pub text: String,
    /// Anchor in logical units; horizontal meaning depends on `alignment`,
    /// vertically it is the alphabetic baseline.
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
    pub font_family: FontFamily,
    pub color: Color,
    pub alignment: Alignment,
    pub stroke_color: Color,
    /// `0` disables the stroke pass entirely.
    pub stroke_width: f64,
    pub shadow_color: Color,
    /// `0` disables the shadow entirely, whatever the offsets are.
    pub shadow_blur: f64,
    pub shadow_offset_x: f64,
    pub shadow_offset_y: f64,
    /// Degrees, clockwise. Any value; see [`TextElement::display_rotation`].
    pub rotation: f64,
    pub opacity: f64,
    pub visible: bool,
}

/// Default style for freshly inserted text.
pub const DEFAULT_FONT_SIZE: f64 = 48.0;

impl TextElement {
    /// A new element with the editor's default style, anchored at the
    /// logical canvas center.
    pub fn new(id: ElementId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            x: CANVAS_WIDTH / 2.0,
            y: CANVAS_HEIGHT / 2.0,
            font_size: DEFAULT_FONT_SIZE,
            font_family: FontFamily::Saira,
            color: palette::BLANCO,
            alignment: Alignment::Center,
            stroke_color: palette::NEGRO,
            stroke_width: 0.0,
            shadow_color: palette::NEGRO,
            shadow_blur: 0.0,
            shadow_offset_x: 0.0,
            shadow_offset_y: 0.0,
            rotation: 0.0,
            opacity: 1.0,
            visible: true,
        }
    }

    pub fn has_stroke(&self) -> bool {
        self.stroke_width > 0.0
    }

    pub fn has_shadow(&self) -> bool {
        self.shadow_blur > 0.0
    }

    /// Rotation folded into (-180, 180] for display in the side panel.
    pub fn display_rotation(&self) -> f64 {
        let r = self.rotation.rem_euclid(360.0);
        if r > 180.0 { r - 360.0 } else { r }
    }

    /// Same element with a new id, shifted by `(dx, dy)`.
    pub fn cloned_as(&self, id: ElementId, dx: f64, dy: f64) -> Self {
        Self {
            id,
            x: self.x + dx,
            y: self.y + dy,
            ..self.clone()
        }
    }
}

// ─── Background ──────────────────────────────────────────────────────────

/// Reference to the background image, as handed over by the host page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackgroundSource {
    /// Inline `data:image/...` URL. Always safe to draw onto an export surface.
    Embedded(String),
    /// Externally hosted `http(s)` URL. Must be converted to embedded data
    /// by the host before export, or the export surface may be tainted.
    Remote(String),
}

impl BackgroundSource {
    /// Classify a reference string. Returns `None` for anything that is
    /// neither an inline image nor an http(s) URL.
    pub fn parse(src: &str) -> Option<Self> {
        let src = src.trim();
        if src.starts_with("data:image/") {
            Some(BackgroundSource::Embedded(src.to_string()))
        } else if src.starts_with("http://") || src.starts_with("https://") {
            Some(BackgroundSource::Remote(src.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            BackgroundSource::Embedded(s) | BackgroundSource::Remote(s) => s,
        }
    }

    pub fn is_export_safe(&self) -> bool {
        matches!(self, BackgroundSource::Embedded(_))
    }
}

// ─── Scene ───────────────────────────────────────────────────────────────

/// The whole editable composition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Paint order: later elements are drawn on top.
    pub elements: Vec<TextElement>,
    pub background: Option<BackgroundSource>,
    /// Preview-only zoom/pan. Never part of history or export.
    #[serde(skip)]
    pub view: ViewTransform,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_background(background: Option<BackgroundSource>) -> Self {
        Self {
            background,
            ..Self::default()
        }
    }

    pub fn get(&self, id: ElementId) -> Option<&TextElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn position_of(&self, id: ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id == id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.position_of(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Visible elements in paint order.
    pub fn visible(&self) -> impl DoubleEndedIterator<Item = &TextElement> {
        self.elements.iter().filter(|e| e.visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_element_is_centered() {
        let e = TextElement::new(ElementId::fresh(), "Hola");
        assert_eq!((e.x, e.y), (540.0, 540.0));
        assert_eq!(e.font_size, 48.0);
        assert_eq!(e.color.to_hex(), "#F7FBFE");
        assert_eq!(e.stroke_color.to_hex(), "#051F22");
        assert!(!e.has_stroke());
        assert!(!e.has_shadow());
        assert!(e.visible);
    }

    #[test]
    fn display_rotation_folds() {
        let mut e = TextElement::new(ElementId::fresh(), "r");
        e.rotation = 270.0;
        assert_eq!(e.display_rotation(), -90.0);
        e.rotation = -540.0;
        assert_eq!(e.display_rotation(), 180.0);
        e.rotation = 45.0;
        assert_eq!(e.display_rotation(), 45.0);
    }

    #[test]
    fn background_classification() {
        assert!(matches!(
            BackgroundSource::parse("data:image/png;base64,AAAA"),
            Some(BackgroundSource::Embedded(_))
        ));
        let remote = BackgroundSource::parse("https://cdn.example.com/a.png").unwrap();
        assert!(!remote.is_export_safe());
        assert!(BackgroundSource::parse("ftp://x").is_none());
        assert!(BackgroundSource::parse("").is_none());
    }

    #[test]
    fn font_family_parse_accepts_label_and_stack() {
        assert_eq!(FontFamily::parse("manrope"), Some(FontFamily::Manrope));
        assert_eq!(
            FontFamily::parse("Saira, sans-serif"),
            Some(FontFamily::Saira)
        );
        assert_eq!(FontFamily::parse("Comic Sans"), None);
    }

    #[test]
    fn alignment_offsets() {
        assert_eq!(Alignment::Left.left_offset(100.0), 0.0);
        assert_eq!(Alignment::Center.left_offset(100.0), -50.0);
        assert_eq!(Alignment::Right.left_offset(100.0), -100.0);
    }
}
