//! Bounded linear undo/redo history.
//!
//! Each entry is a full snapshot of the scene content (elements plus the
//! background reference) encoded as MessagePack. Storing bytes keeps every
//! entry an independent copy of the scene, and makes the "unchanged since
//! last commit" check a byte comparison.
//!
//! The cursor always points at the entry matching the live scene. Undo and
//! redo move it and hand back the snapshot to restore.

use serde::{Deserialize, Serialize};
use soma_core::{BackgroundSource, Scene, TextElement};
use std::collections::VecDeque;

/// The persisted part of a [`Scene`]. The view transform is deliberately
/// absent: zooming is not an undoable edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub elements: Vec<TextElement>,
    pub background: Option<BackgroundSource>,
}

impl Snapshot {
    pub fn of(scene: &Scene) -> Self {
        Self {
            elements: scene.elements.clone(),
            background: scene.background.clone(),
        }
    }

    /// Replace the scene content, keeping its view transform.
    pub fn restore_into(self, scene: &mut Scene) {
        scene.elements = self.elements;
        scene.background = self.background;
    }

    fn encode(&self) -> Result<Vec<u8>, rmp_serde::encode::Error> {
        rmp_serde::to_vec_named(self)
    }

    fn decode(bytes: &[u8]) -> Result<Self, rmp_serde::decode::Error> {
        rmp_serde::from_slice(bytes)
    }
}

pub struct History {
    entries: VecDeque<Vec<u8>>,
    cursor: usize,
    capacity: usize,
}

impl History {
    /// Create a history seeded with `initial` as its first entry, so the
    /// very first edit can be undone back to it.
    pub fn new(capacity: usize, initial: &Scene) -> Self {
        let capacity = capacity.max(1);
        let mut entries = VecDeque::with_capacity(capacity);
        match Snapshot::of(initial).encode() {
            Ok(bytes) => entries.push_back(bytes),
            Err(e) => log::error!("history: could not encode initial scene: {e}"),
        }
        Self {
            entries,
            cursor: 0,
            capacity,
        }
    }

    /// Record the current scene. No-op (returns `false`) when it encodes to
    /// the same bytes as the entry under the cursor.
    pub fn commit(&mut self, scene: &Scene) -> bool {
        let bytes = match Snapshot::of(scene).encode() {
            Ok(bytes) => bytes,
            Err(e) => {
                log::error!("history: snapshot encoding failed, commit skipped: {e}");
                return false;
            }
        };
        if self.entries.get(self.cursor) == Some(&bytes) {
            log::trace!("history: unchanged, commit skipped");
            return false;
        }

        // Linear history: anything ahead of the cursor is discarded.
        self.entries.truncate(self.cursor + 1);
        self.entries.push_back(bytes);
        if self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.cursor = self.entries.len() - 1;
        log::debug!(
            "history: commit -> {}/{}",
            self.cursor + 1,
            self.entries.len()
        );
        true
    }

    pub fn undo(&mut self) -> Option<Snapshot> {
        if !self.can_undo() {
            return None;
        }
        let snapshot = self.decode_at(self.cursor - 1)?;
        self.cursor -= 1;
        log::debug!("history: undo -> {}/{}", self.cursor + 1, self.entries.len());
        Some(snapshot)
    }

    pub fn redo(&mut self) -> Option<Snapshot> {
        if !self.can_redo() {
            return None;
        }
        let snapshot = self.decode_at(self.cursor + 1)?;
        self.cursor += 1;
        log::debug!("history: redo -> {}/{}", self.cursor + 1, self.entries.len());
        Some(snapshot)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Snapshot under the cursor, i.e. the last committed or restored state.
    pub fn current(&self) -> Option<Snapshot> {
        self.decode_at(self.cursor)
    }

    fn decode_at(&self, index: usize) -> Option<Snapshot> {
        let bytes = self.entries.get(index)?;
        match Snapshot::decode(bytes) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                log::error!("history: entry {index} is unreadable: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use soma_core::TextPatch;

    #[test]
    fn seeded_with_initial_state() {
        let scene = Scene::new();
        let history = History::new(50, &scene);
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn snapshot_is_independent_of_live_scene() {
        let mut scene = Scene::new();
        let mut history = History::new(50, &scene);
        let id = scene.add_text("a").id;
        history.commit(&scene);
        scene.update_text(id, &TextPatch::position(1.0, 2.0));

        let stored = history.current().unwrap();
        assert_eq!((stored.elements[0].x, stored.elements[0].y), (540.0, 540.0));
    }

    #[test]
    fn undo_redo_walk_the_cursor() {
        let mut scene = Scene::new();
        let mut history = History::new(50, &scene);
        scene.add_text("a");
        history.commit(&scene);
        scene.add_text("b");
        history.commit(&scene);

        assert_eq!(history.undo().unwrap().elements.len(), 1);
        assert_eq!(history.undo().unwrap().elements.len(), 0);
        assert!(history.undo().is_none());
        assert_eq!(history.redo().unwrap().elements.len(), 1);
        assert_eq!(history.redo().unwrap().elements.len(), 2);
        assert!(history.redo().is_none());
    }

    #[test]
    fn restore_keeps_view() {
        let mut scene = Scene::new();
        scene.view.zoom = 2.0;
        let empty = Snapshot::of(&Scene::new());
        scene.add_text("x");
        empty.restore_into(&mut scene);
        assert!(scene.is_empty());
        assert_eq!(scene.view.zoom, 2.0);
    }
}
