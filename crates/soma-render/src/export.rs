//! Export: preset catalog, request validation, file naming and the
//! render-then-encode pipeline.

use crate::paint::{Backdrop, render_export};
use crate::surface::Surface;
use soma_core::Scene;

/// Largest side accepted for a custom export, in pixels.
pub const MAX_EXPORT_SIDE: u32 = 8192;
/// Quality passed to the JPEG encoder.
pub const JPEG_QUALITY: f64 = 0.95;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ExportError {
    #[error("invalid export size {width}x{height}: each side must be between 1 and {max}")]
    InvalidSize { width: u32, height: u32, max: u32 },
    #[error("background image is still loading")]
    BackgroundPending,
    #[error("could not create export surface: {0}")]
    Surface(String),
    #[error("export surface is tainted by a cross-origin background: {0}")]
    Tainted(String),
    #[error("encoding failed: {0}")]
    Encode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
}

impl ExportFormat {
    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
        }
    }

    /// Encoder quality, for lossy formats only.
    pub fn quality(self) -> Option<f64> {
        match self {
            ExportFormat::Png => None,
            ExportFormat::Jpeg => Some(JPEG_QUALITY),
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "png" | "image/png" => Some(ExportFormat::Png),
            "jpg" | "jpeg" | "image/jpeg" => Some(ExportFormat::Jpeg),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportPreset {
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
    pub format: ExportFormat,
}

impl ExportPreset {
    const fn png(name: &'static str, width: u32, height: u32) -> Self {
        Self {
            name,
            width,
            height,
            format: ExportFormat::Png,
        }
    }

    /// Lowercase name with every non-alphanumeric char replaced by `_`.
    pub fn slug(&self) -> String {
        self.name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .collect()
    }
}

pub const PRESETS: [ExportPreset; 8] = [
    ExportPreset::png("Instagram Post", 1080, 1080),
    ExportPreset::png("Instagram Story", 1080, 1920),
    ExportPreset::png("Instagram Reel", 1080, 1920),
    ExportPreset::png("TikTok", 1080, 1920),
    ExportPreset::png("LinkedIn Post", 1200, 1200),
    ExportPreset::png("LinkedIn Article", 1200, 627),
    ExportPreset::png("Twitter/X Post", 1200, 675),
    ExportPreset::png("Facebook Post", 1200, 630),
];

pub fn find_preset(name: &str) -> Option<&'static ExportPreset> {
    PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

/// A validated export target.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportRequest {
    Preset(ExportPreset),
    Custom {
        width: u32,
        height: u32,
        format: ExportFormat,
    },
}

impl ExportRequest {
    pub fn preset(name: &str) -> Option<Self> {
        find_preset(name).copied().map(ExportRequest::Preset)
    }

    pub fn custom(width: u32, height: u32, format: ExportFormat) -> Result<Self, ExportError> {
        let valid = 1..=MAX_EXPORT_SIDE;
        if !valid.contains(&width) || !valid.contains(&height) {
            return Err(ExportError::InvalidSize {
                width,
                height,
                max: MAX_EXPORT_SIDE,
            });
        }
        Ok(ExportRequest::Custom {
            width,
            height,
            format,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        match self {
            ExportRequest::Preset(p) => (p.width, p.height),
            ExportRequest::Custom { width, height, .. } => (*width, *height),
        }
    }

    pub fn format(&self) -> ExportFormat {
        match self {
            ExportRequest::Preset(p) => p.format,
            ExportRequest::Custom { format, .. } => *format,
        }
    }

    /// `soma_<slug>_<ts>.<ext>` for presets,
    /// `soma_canvas_<w>x<h>_<ts>.<ext>` for custom sizes.
    pub fn filename(&self, timestamp_ms: u64) -> String {
        let ext = self.format().extension();
        match self {
            ExportRequest::Preset(p) => format!("soma_{}_{timestamp_ms}.{ext}", p.slug()),
            ExportRequest::Custom { width, height, .. } => {
                format!("soma_canvas_{width}x{height}_{timestamp_ms}.{ext}")
            }
        }
    }
}

/// Platform half of an export: allocate an offscreen surface, then encode it.
pub trait ExportBackend {
    type Surface: Surface;
    type Encoded;

    fn create_surface(&mut self, width: u32, height: u32) -> Result<Self::Surface, ExportError>;
    fn encode(
        &mut self,
        surface: Self::Surface,
        format: ExportFormat,
    ) -> Result<Self::Encoded, ExportError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportedAsset<E> {
    pub filename: String,
    pub mime: &'static str,
    pub width: u32,
    pub height: u32,
    pub scale: f64,
    pub data: E,
}

/// Render `scene` at the requested resolution and encode it.
///
/// The offscreen surface is dropped (or consumed by the encoder) before this
/// returns, on success and on failure alike.
pub fn export_image<B: ExportBackend>(
    backend: &mut B,
    scene: &Scene,
    backdrop: Backdrop<'_, <B::Surface as Surface>::Image>,
    request: &ExportRequest,
    timestamp_ms: u64,
) -> Result<ExportedAsset<B::Encoded>, ExportError> {
    let (width, height) = request.size();
    let format = request.format();
    log::info!("export {width}x{height} {}", format.mime());

    let mut surface = backend.create_surface(width, height)?;
    let scale = render_export(&mut surface, scene, backdrop);
    let data = backend.encode(surface, format)?;

    Ok(ExportedAsset {
        filename: request.filename(timestamp_ms),
        mime: format.mime(),
        width,
        height,
        scale,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn preset_catalog() {
        let story = find_preset("instagram story").unwrap();
        assert_eq!((story.width, story.height), (1080, 1920));
        assert_eq!(story.format, ExportFormat::Png);
        assert!(find_preset("Snapchat").is_none());
        assert_eq!(PRESETS.len(), 8);
    }

    #[test]
    fn preset_filename_uses_slug() {
        let req = ExportRequest::preset("Twitter/X Post").unwrap();
        assert_eq!(req.filename(1700000000000), "soma_twitter_x_post_1700000000000.png");
    }

    #[test]
    fn custom_filename_and_format() {
        let req = ExportRequest::custom(2160, 2160, ExportFormat::Jpeg).unwrap();
        assert_eq!(req.filename(42), "soma_canvas_2160x2160_42.jpg");
        assert_eq!(req.format().mime(), "image/jpeg");
        assert_eq!(req.format().quality(), Some(0.95));
    }

    #[test]
    fn custom_size_bounds() {
        assert!(ExportRequest::custom(1, 8192, ExportFormat::Png).is_ok());
        assert_eq!(
            ExportRequest::custom(0, 100, ExportFormat::Png),
            Err(ExportError::InvalidSize {
                width: 0,
                height: 100,
                max: 8192
            })
        );
        assert!(ExportRequest::custom(100, 8193, ExportFormat::Png).is_err());
    }

    #[test]
    fn format_parse() {
        assert_eq!(ExportFormat::parse("JPG"), Some(ExportFormat::Jpeg));
        assert_eq!(ExportFormat::parse("image/png"), Some(ExportFormat::Png));
        assert_eq!(ExportFormat::parse("webp"), None);
    }
}
