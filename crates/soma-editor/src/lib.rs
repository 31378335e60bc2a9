//! Soma Canvas editor engine: the interactive session over a scene, with
//! drag-and-snap, keyboard shortcuts, clipboard and bounded undo/redo.

pub mod config;
pub mod controller;
pub mod history;
pub mod input;
pub mod props;
pub mod session;
pub mod shortcuts;

pub use config::EditorConfig;
pub use controller::{Controller, Gesture, PointerOutcome};
pub use history::{History, Snapshot};
pub use input::{InputEvent, Modifiers};
pub use session::{DISPLAY_SIZE, EditorSession, InsertCallback, QuickInsert};
pub use shortcuts::{ShortcutAction, ShortcutMap};
