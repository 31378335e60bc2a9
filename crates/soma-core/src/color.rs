//! RGBA colors and CSS color-string parsing.
//!
//! The host page hands colors around as CSS strings (`#2FFFCC`,
//! `rgba(5, 31, 34, 0.8)`); the model stores them as normalized floats and
//! the renderer turns them back into CSS for the drawing surface.

use serde::{Deserialize, Serialize};
use winnow::ascii::{float, multispace0};
use winnow::combinator::{alt, delimited, preceded, separated};
use winnow::prelude::*;
use winnow::token::take_while;

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::rgba(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    /// Parse a hex color string: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`.
    /// The string may optionally start with `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();
        let nibble = |i: usize| hex_val(bytes[i]);
        let byte = |i: usize| Some(hex_val(bytes[i])? << 4 | hex_val(bytes[i + 1])?);

        match bytes.len() {
            3 => Some(Self::rgba8(
                nibble(0)? * 17,
                nibble(1)? * 17,
                nibble(2)? * 17,
                255,
            )),
            4 => Some(Self::rgba8(
                nibble(0)? * 17,
                nibble(1)? * 17,
                nibble(2)? * 17,
                nibble(3)? * 17,
            )),
            6 => Some(Self::rgba8(byte(0)?, byte(2)?, byte(4)?, 255)),
            8 => Some(Self::rgba8(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }

    /// CSS string accepted by a Canvas2D `fillStyle`/`strokeStyle`.
    pub fn to_css(&self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            self.to_hex()
        } else {
            format!("rgba({r}, {g}, {b}, {})", a as f32 / 255.0)
        }
    }

    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    pub fn is_transparent(&self) -> bool {
        self.a <= 0.0
    }
}

/// Parse a CSS color: hex, `rgb()`, `rgba()` or `transparent`.
pub fn parse_color(input: &str) -> Result<Color, String> {
    let trimmed = input.trim();
    parse_css_color
        .parse(trimmed)
        .map_err(|e| format!("invalid color {trimmed:?}: {e}"))
}

fn parse_css_color(input: &mut &str) -> ModalResult<Color> {
    alt((parse_hex_color, parse_rgb_function, parse_transparent)).parse_next(input)
}

fn parse_hex_color(input: &mut &str) -> ModalResult<Color> {
    preceded('#', take_while(3..=8, |c: char| c.is_ascii_hexdigit()))
        .verify_map(Color::from_hex)
        .parse_next(input)
}

fn parse_transparent(input: &mut &str) -> ModalResult<Color> {
    "transparent".value(Color::TRANSPARENT).parse_next(input)
}

fn parse_channel(input: &mut &str) -> ModalResult<f64> {
    delimited(multispace0, float, multispace0).parse_next(input)
}

fn parse_rgb_function(input: &mut &str) -> ModalResult<Color> {
    let _ = alt(("rgba", "rgb")).parse_next(input)?;
    let _ = multispace0.parse_next(input)?;
    let channels: Vec<f64> =
        delimited('(', separated(3..=4, parse_channel, ','), ')').parse_next(input)?;

    let rgb = |v: f64| (v.clamp(0.0, 255.0) / 255.0) as f32;
    let alpha = channels.get(3).copied().unwrap_or(1.0).clamp(0.0, 1.0) as f32;
    Ok(Color::rgba(
        rgb(channels[0]),
        rgb(channels[1]),
        rgb(channels[2]),
        alpha,
    ))
}
