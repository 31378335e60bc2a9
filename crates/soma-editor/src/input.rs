//! Platform-agnostic input events.
//!
//! Pointer coordinates are physical surface pixels; the session converts
//! them into logical canvas units through the view transform.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        shift: false,
        alt: false,
        meta: false,
    };

    /// Ctrl on Windows/Linux, ⌘ on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown { x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp { x: f64, y: f64 },
    Key {
        /// `KeyboardEvent.key` value, e.g. `"z"`, `"ArrowLeft"`.
        key: String,
        modifiers: Modifiers,
        /// Focus is inside a text field; shortcuts must not fire.
        in_text_input: bool,
    },
}
