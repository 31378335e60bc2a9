use kurbo::Point;
use pretty_assertions::assert_eq;
use soma_core::geometry::SNAP_THRESHOLD;
use soma_core::*;

fn place(scene: &mut Scene, text: &str, x: f64, y: f64) -> ElementId {
    let id = scene.add_text(text).id;
    scene.update_text(id, &TextPatch::position(x, y));
    id
}

#[test]
fn layer_order_follows_edits() {
    let mut scene = Scene::new();
    let a = place(&mut scene, "A", 100.0, 100.0);
    let b = place(&mut scene, "B", 200.0, 200.0);
    let c = scene.duplicate_text(a, CLONE_OFFSET).unwrap();

    let order: Vec<ElementId> = scene.elements.iter().map(|e| e.id).collect();
    assert_eq!(order, vec![a, b, c]);

    let removed = scene.delete_text(b).unwrap();
    assert_eq!(removed.text, "B");
    assert!(!scene.contains(b));
    assert_eq!(scene.get(c).map(|e| (e.x, e.y)), Some((120.0, 120.0)));
    assert_eq!(scene.delete_text(b), None);
}

#[test]
fn snapped_anchor_is_stable() {
    let mut scene = Scene::new();
    let moving = place(&mut scene, "drag", 0.0, 0.0);
    place(&mut scene, "anchor", 300.0, 700.0);

    let first = snap(
        moving,
        Point::new(306.0, 544.0),
        &scene.elements,
        SNAP_THRESHOLD,
    );
    assert_eq!(first.point(), Point::new(300.0, 540.0));
    assert_eq!(first.vertical(), Some(300.0));
    assert_eq!(first.horizontal(), Some(540.0));

    let again = snap(moving, first.point(), &scene.elements, SNAP_THRESHOLD);
    assert_eq!(again, first);
}

#[test]
fn hidden_siblings_do_not_attract() {
    let mut scene = Scene::new();
    let moving = place(&mut scene, "drag", 0.0, 0.0);
    let ghost = place(&mut scene, "ghost", 200.0, 200.0);
    scene.set_visible(ghost, false);

    let out = snap(
        moving,
        Point::new(204.0, 197.0),
        &scene.elements,
        SNAP_THRESHOLD,
    );
    assert_eq!(out.point(), Point::new(204.0, 197.0));
    assert!(out.guides.is_empty());
}

#[test]
fn background_reference_classification() {
    let scene = Scene::with_background(BackgroundSource::parse("https://cdn.example.com/a.jpg"));
    let source = scene.background.as_ref().unwrap();
    assert!(!source.is_export_safe());
    assert!(BackgroundSource::parse("data:image/png;base64,AAAA").is_some_and(|s| s.is_export_safe()));
    assert_eq!(BackgroundSource::parse("ftp://example.com/a.jpg"), None);
}
