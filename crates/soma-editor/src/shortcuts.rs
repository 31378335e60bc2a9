//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. The map lives
//! in Rust so the browser bridge and headless tests share it.

use crate::input::Modifiers;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Edit ──
    Undo,
    Redo,
    Copy,
    Paste,
    Duplicate,
    Delete,
    /// Move the selection one step; `large` is the Shift variant.
    Nudge {
        dx: i8,
        dy: i8,
        large: bool,
    },

    // ── View ──
    ZoomIn,
    ZoomOut,
    ZoomReset,

    // ── UI ──
    Deselect,
}

impl ShortcutAction {
    /// Whether the action does anything without a selection.
    pub fn needs_selection(self) -> bool {
        matches!(
            self,
            ShortcutAction::Copy
                | ShortcutAction::Duplicate
                | ShortcutAction::Delete
                | ShortcutAction::Nudge { .. }
        )
    }
}

pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"z"`, `"Delete"`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        let cmd = modifiers.command();

        if cmd && modifiers.shift {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Redo),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Undo),
                "y" | "Y" => Some(ShortcutAction::Redo),
                "c" | "C" => Some(ShortcutAction::Copy),
                "v" | "V" => Some(ShortcutAction::Paste),
                "d" | "D" => Some(ShortcutAction::Duplicate),
                "=" | "+" => Some(ShortcutAction::ZoomIn),
                "-" => Some(ShortcutAction::ZoomOut),
                "0" => Some(ShortcutAction::ZoomReset),
                _ => None,
            };
        }

        let large = modifiers.shift;
        match key {
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Deselect),
            "ArrowLeft" => Some(ShortcutAction::Nudge { dx: -1, dy: 0, large }),
            "ArrowRight" => Some(ShortcutAction::Nudge { dx: 1, dy: 0, large }),
            "ArrowUp" => Some(ShortcutAction::Nudge { dx: 0, dy: -1, large }),
            "ArrowDown" => Some(ShortcutAction::Nudge { dx: 0, dy: 1, large }),
            _ => None,
        }
    }
}
