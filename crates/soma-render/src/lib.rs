//! Soma Canvas rendering: one paint pipeline shared by the interactive
//! preview and the fixed-resolution export, over an abstract [`Surface`].

pub mod background;
pub mod export;
pub mod hit;
pub mod paint;
pub mod recording;
pub mod surface;

pub use background::{BackgroundSlot, Fetch, LoadState, LoadTicket};
pub use export::{
    ExportBackend, ExportError, ExportFormat, ExportPreset, ExportRequest, ExportedAsset, PRESETS,
    export_image, find_preset,
};
pub use hit::hit_test;
pub use paint::{Backdrop, Overlay, export_scale, render_export, render_preview};
pub use recording::{DrawOp, RecordedImage, RecordingBackend, RecordingSurface};
pub use surface::{LineStyle, Shadow, Surface};
