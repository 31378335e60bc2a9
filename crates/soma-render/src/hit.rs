//! Pointer hit testing over the scene.

use kurbo::Point;
use soma_core::geometry::hits_element;
use soma_core::{ElementId, Scene, TextMeasurer};

/// Topmost visible element under logical point `p`.
///
/// Walks paint order in reverse so the element drawn last (on top) wins.
pub fn hit_test<M: TextMeasurer>(scene: &Scene, measurer: &M, p: Point) -> Option<ElementId> {
    let hit = scene
        .visible()
        .rev()
        .find(|e| hits_element(e, &measurer.measure_element(e), p))
        .map(|e| e.id);
    log::trace!("HIT ({:.1}, {:.1}) -> {hit:?}", p.x, p.y);
    hit
}

#[cfg(test)]
mod tests {
    use super::*;
    use soma_core::{ApproxMeasurer, TextPatch};

    #[test]
    fn topmost_wins() {
        let mut scene = Scene::new();
        let below = scene.add_text("Hello").id;
        let above = scene.add_text("Hello").id;
        let center = Point::new(540.0, 530.0);
        assert_eq!(hit_test(&scene, &ApproxMeasurer, center), Some(above));
        scene.set_visible(above, false);
        assert_eq!(hit_test(&scene, &ApproxMeasurer, center), Some(below));
    }

    #[test]
    fn empty_space_misses() {
        let mut scene = Scene::new();
        let id = scene.add_text("Hi").id;
        scene.update_text(id, &TextPatch::position(100.0, 100.0));
        assert_eq!(hit_test(&scene, &ApproxMeasurer, Point::new(900.0, 900.0)), None);
    }
}
