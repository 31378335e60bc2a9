//! Direct-manipulation state machine.
//!
//! ```text
//!   Idle ──down on element──▶ Dragging ──up──▶ Idle
//!    │                           │
//!    └──down on empty space──────┴─ (selection cleared, stays Idle)
//! ```
//!
//! Selection happens on the down event itself, so there is no separate
//! resting state between "pressed" and "dragging". All coordinates here are
//! logical canvas units.

use kurbo::{Point, Vec2};
use soma_core::geometry::{Guide, Guides, snap};
use soma_core::{ElementId, Scene, TextMeasurer, TextPatch};
use soma_render::hit_test;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Dragging {
        id: ElementId,
        /// Pointer position minus element anchor at press time.
        grab: Vec2,
    },
}

/// What a pointer event did, for the session to act on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerOutcome {
    /// Pressed on an element; it becomes the selection.
    Grabbed(ElementId),
    /// Pressed on empty canvas; selection must be cleared.
    Missed,
    /// The dragged element moved.
    Moved(ElementId),
    /// A drag ended; a history commit should be scheduled.
    Released(ElementId),
    Ignored,
}

#[derive(Debug, Default)]
pub struct Controller {
    gesture: Gesture,
    guides: Guides,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.gesture, Gesture::Dragging { .. })
    }

    /// Active snap guides, for the renderer.
    pub fn guides(&self) -> &[Guide] {
        &self.guides
    }

    pub fn pointer_down<M: TextMeasurer>(
        &mut self,
        scene: &Scene,
        measurer: &M,
        p: Point,
    ) -> PointerOutcome {
        self.guides.clear();
        match hit_test(scene, measurer, p) {
            Some(id) => {
                let Some(element) = scene.get(id) else {
                    return PointerOutcome::Ignored;
                };
                let grab = p - Point::new(element.x, element.y);
                log::debug!("controller: grab {id} at ({:.1}, {:.1})", p.x, p.y);
                self.gesture = Gesture::Dragging { id, grab };
                PointerOutcome::Grabbed(id)
            }
            None => {
                self.gesture = Gesture::Idle;
                PointerOutcome::Missed
            }
        }
    }

    /// Move the dragged element so it keeps its grab offset, snapping the
    /// proposed anchor. The position goes through the scene's regular
    /// update path.
    pub fn pointer_move(&mut self, scene: &mut Scene, p: Point, threshold: f64) -> PointerOutcome {
        let Gesture::Dragging { id, grab } = self.gesture else {
            return PointerOutcome::Ignored;
        };
        if !scene.contains(id) {
            // Deleted mid-drag (e.g. by undo).
            log::debug!("controller: dragged element {id} vanished");
            self.cancel();
            return PointerOutcome::Ignored;
        }

        let proposed = p - grab;
        let snapped = snap(id, proposed, &scene.elements, threshold);
        self.guides = snapped.guides.clone();
        scene.update_text(id, &TextPatch::position(snapped.x, snapped.y));
        PointerOutcome::Moved(id)
    }

    pub fn pointer_up(&mut self) -> PointerOutcome {
        self.guides.clear();
        match std::mem::take(&mut self.gesture) {
            Gesture::Dragging { id, .. } => PointerOutcome::Released(id),
            Gesture::Idle => PointerOutcome::Ignored,
        }
    }

    /// Abort any gesture without producing a release.
    pub fn cancel(&mut self) {
        self.gesture = Gesture::Idle;
        self.guides.clear();
    }
}
