//! Soma Canvas core: the text scene model and the pure geometry the editor
//! is built on.

pub mod color;
pub mod geometry;
pub mod id;
pub mod measure;
pub mod model;
pub mod scene;
pub mod view;

pub use color::{Color, parse_color};
pub use geometry::{Axis, Guide, Guides, Snap, snap};
pub use id::ElementId;
pub use measure::{ApproxMeasurer, CachedMeasurer, TextMeasurer, TextMetrics};
pub use model::*;
pub use scene::{CLONE_OFFSET, TextPatch};
pub use view::ViewTransform;

// Re-export kurbo so downstream crates share one geometry vocabulary.
pub use kurbo;
