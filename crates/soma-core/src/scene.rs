//! Scene mutations.
//!
//! Every operation addresses elements by [`ElementId`]. An id that is not in
//! the scene is treated as a stale reference: the operation does nothing and
//! reports that nothing changed, it is never an error.

use crate::color::Color;
use crate::id::ElementId;
use crate::model::{Alignment, FontFamily, Scene, TextElement};
use serde::{Deserialize, Serialize};

/// Offset applied to duplicated and pasted elements, in logical units.
pub const CLONE_OFFSET: f64 = 20.0;

/// Partial update for a [`TextElement`]. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextPatch {
    pub text: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub font_size: Option<f64>,
    pub font_family: Option<FontFamily>,
    pub color: Option<Color>,
    pub alignment: Option<Alignment>,
    pub stroke_color: Option<Color>,
    pub stroke_width: Option<f64>,
    pub shadow_color: Option<Color>,
    pub shadow_blur: Option<f64>,
    pub shadow_offset_x: Option<f64>,
    pub shadow_offset_y: Option<f64>,
    pub rotation: Option<f64>,
    pub opacity: Option<f64>,
    pub visible: Option<bool>,
}

impl TextPatch {
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// True when the patch only moves the element.
    pub fn is_position_only(&self) -> bool {
        let moved = Self {
            x: None,
            y: None,
            ..self.clone()
        };
        moved == Self::default()
    }

    /// Merge into `element`, clamping numeric fields into their valid
    /// domains. Returns whether any field actually changed.
    pub fn apply_to(&self, element: &mut TextElement) -> bool {
        let before = element.clone();
        let non_negative = |v: f64| if v.is_finite() { v.max(0.0) } else { 0.0 };

        if let Some(text) = &self.text {
            element.text.clone_from(text);
        }
        if let Some(x) = self.x.filter(|v| v.is_finite()) {
            element.x = x;
        }
        if let Some(y) = self.y.filter(|v| v.is_finite()) {
            element.y = y;
        }
        if let Some(size) = self.font_size.filter(|v| v.is_finite() && *v > 0.0) {
            element.font_size = size;
        }
        if let Some(family) = self.font_family {
            element.font_family = family;
        }
        if let Some(color) = self.color {
            element.color = color;
        }
        if let Some(alignment) = self.alignment {
            element.alignment = alignment;
        }
        if let Some(color) = self.stroke_color {
            element.stroke_color = color;
        }
        if let Some(w) = self.stroke_width {
            element.stroke_width = non_negative(w);
        }
        if let Some(color) = self.shadow_color {
            element.shadow_color = color;
        }
        if let Some(blur) = self.shadow_blur {
            element.shadow_blur = non_negative(blur);
        }
        if let Some(dx) = self.shadow_offset_x.filter(|v| v.is_finite()) {
            element.shadow_offset_x = dx;
        }
        if let Some(dy) = self.shadow_offset_y.filter(|v| v.is_finite()) {
            element.shadow_offset_y = dy;
        }
        if let Some(r) = self.rotation.filter(|v| v.is_finite()) {
            element.rotation = r;
        }
        if let Some(o) = self.opacity.filter(|v| v.is_finite()) {
            element.opacity = o.clamp(0.0, 1.0);
        }
        if let Some(v) = self.visible {
            element.visible = v;
        }

        *element != before
    }
}

impl Scene {
    /// Append a default-styled element at the canvas center.
    pub fn add_text(&mut self, text: impl Into<String>) -> &TextElement {
        self.push(TextElement::new(ElementId::fresh(), text))
    }

    /// Append an element as-is. Its id must not already be in the scene.
    pub fn push(&mut self, element: TextElement) -> &TextElement {
        debug_assert!(!self.contains(element.id), "duplicate id {}", element.id);
        log::debug!("scene: add {} {:?}", element.id, element.text);
        self.elements.push(element);
        &self.elements[self.elements.len() - 1]
    }

    /// Merge `patch` into element `id`. Returns whether anything changed.
    pub fn update_text(&mut self, id: ElementId, patch: &TextPatch) -> bool {
        match self.elements.iter_mut().find(|e| e.id == id) {
            Some(element) => patch.apply_to(element),
            None => {
                log::trace!("scene: update of stale id {id} ignored");
                false
            }
        }
    }

    /// Remove element `id`, returning it.
    pub fn delete_text(&mut self, id: ElementId) -> Option<TextElement> {
        let idx = self.position_of(id)?;
        log::debug!("scene: delete {id}");
        Some(self.elements.remove(idx))
    }

    /// Clone element `id` with a fresh id, offset by `offset` on both axes,
    /// appended on top. Returns the new id.
    pub fn duplicate_text(&mut self, id: ElementId, offset: f64) -> Option<ElementId> {
        let source = self.get(id)?;
        let copy = source.cloned_as(ElementId::fresh(), offset, offset);
        Some(self.push(copy).id)
    }

    /// Insert a copy of an element held outside the scene (the clipboard).
    /// The stored element is left untouched.
    pub fn paste_text(&mut self, source: &TextElement, offset: f64) -> ElementId {
        let copy = source.cloned_as(ElementId::fresh(), offset, offset);
        self.push(copy).id
    }

    pub fn set_visible(&mut self, id: ElementId, visible: bool) -> bool {
        self.update_text(
            id,
            &TextPatch {
                visible: Some(visible),
                ..TextPatch::default()
            },
        )
    }
}
