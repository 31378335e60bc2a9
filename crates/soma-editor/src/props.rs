//! Side-panel property editing.
//!
//! The panel edits one property at a time by key, with values arriving as
//! JSON. Numeric inputs are clamped to the ranges the panel's sliders
//! expose; colors are CSS strings.

use serde_json::{Value, json};
use soma_core::{Alignment, FontFamily, TextElement, TextPatch, parse_color};
use std::ops::RangeInclusive;

pub const FONT_SIZE_RANGE: RangeInclusive<f64> = 12.0..=120.0;
pub const ROTATION_RANGE: RangeInclusive<f64> = -180.0..=180.0;
pub const OPACITY_RANGE: RangeInclusive<f64> = 0.1..=1.0;
pub const STROKE_WIDTH_RANGE: RangeInclusive<f64> = 0.0..=10.0;
pub const SHADOW_BLUR_RANGE: RangeInclusive<f64> = 0.0..=20.0;
pub const SHADOW_OFFSET_RANGE: RangeInclusive<f64> = -10.0..=10.0;

fn clamp(value: f64, range: &RangeInclusive<f64>) -> f64 {
    value.clamp(*range.start(), *range.end())
}

fn number(key: &str, value: &Value) -> Result<f64, String> {
    value
        .as_f64()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("{key}: expected a number, got {value}"))
}

fn string<'a>(key: &str, value: &'a Value) -> Result<&'a str, String> {
    value
        .as_str()
        .ok_or_else(|| format!("{key}: expected a string, got {value}"))
}

/// Build the patch for setting `key` to `value`.
pub fn property_patch(key: &str, value: &Value) -> Result<TextPatch, String> {
    let mut patch = TextPatch::default();
    match key {
        "text" => patch.text = Some(string(key, value)?.to_string()),
        "x" => patch.x = Some(number(key, value)?),
        "y" => patch.y = Some(number(key, value)?),
        "fontSize" => patch.font_size = Some(clamp(number(key, value)?, &FONT_SIZE_RANGE)),
        "fontFamily" => {
            let name = string(key, value)?;
            patch.font_family =
                Some(FontFamily::parse(name).ok_or_else(|| format!("unknown font family {name:?}"))?);
        }
        "color" => patch.color = Some(parse_color(string(key, value)?)?),
        "alignment" => {
            let name = string(key, value)?;
            patch.alignment =
                Some(Alignment::parse(name).ok_or_else(|| format!("unknown alignment {name:?}"))?);
        }
        "strokeColor" => patch.stroke_color = Some(parse_color(string(key, value)?)?),
        "strokeWidth" => {
            patch.stroke_width = Some(clamp(number(key, value)?, &STROKE_WIDTH_RANGE));
        }
        "shadowColor" => patch.shadow_color = Some(parse_color(string(key, value)?)?),
        "shadowBlur" => patch.shadow_blur = Some(clamp(number(key, value)?, &SHADOW_BLUR_RANGE)),
        "shadowOffsetX" => {
            patch.shadow_offset_x = Some(clamp(number(key, value)?, &SHADOW_OFFSET_RANGE));
        }
        "shadowOffsetY" => {
            patch.shadow_offset_y = Some(clamp(number(key, value)?, &SHADOW_OFFSET_RANGE));
        }
        "rotation" => patch.rotation = Some(clamp(number(key, value)?, &ROTATION_RANGE)),
        "opacity" => patch.opacity = Some(clamp(number(key, value)?, &OPACITY_RANGE)),
        "visible" => {
            patch.visible = Some(
                value
                    .as_bool()
                    .ok_or_else(|| format!("visible: expected a boolean, got {value}"))?,
            );
        }
        _ => return Err(format!("unknown property {key:?}")),
    }
    Ok(patch)
}

/// Panel view of an element: CSS colors, rotation folded into ±180.
pub fn element_json(element: &TextElement) -> Value {
    json!({
        "id": element.id.get(),
        "text": element.text,
        "x": element.x,
        "y": element.y,
        "fontSize": element.font_size,
        "fontFamily": element.font_family.label(),
        "color": element.color.to_hex(),
        "alignment": element.alignment.as_str(),
        "strokeColor": element.stroke_color.to_hex(),
        "strokeWidth": element.stroke_width,
        "shadowColor": element.shadow_color.to_hex(),
        "shadowBlur": element.shadow_blur,
        "shadowOffsetX": element.shadow_offset_x,
        "shadowOffsetY": element.shadow_offset_y,
        "rotation": element.display_rotation(),
        "opacity": element.opacity,
        "visible": element.visible,
    })
}
