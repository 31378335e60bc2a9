//! Integration tests: history behavior through the editor session.

use pretty_assertions::assert_eq;
use soma_core::{Scene, TextElement, TextPatch, palette};
use soma_editor::{EditorConfig, EditorSession, History, Modifiers};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn cmd() -> Modifiers {
    Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    }
}

#[test]
fn add_undo_redo_round_trip() {
    init();
    let mut s = EditorSession::new(Scene::new());
    let id = s.add_text("Hola").unwrap();
    let added: TextElement = s.scene().get(id).unwrap().clone();
    assert_eq!((added.x, added.y), (540.0, 540.0));
    assert_eq!(added, TextElement::new(id, "Hola"));

    assert!(s.undo());
    assert!(s.scene().is_empty());
    assert_eq!(s.selection(), None);

    assert!(s.redo());
    assert_eq!(s.scene().elements, vec![added]);
}

#[test]
fn shortcuts_drive_history() {
    init();
    let mut s = EditorSession::new(Scene::new());
    s.add_text("a");
    s.key_down("z", cmd(), false, 0);
    assert!(s.scene().is_empty());
    s.key_down(
        "z",
        Modifiers {
            shift: true,
            ..cmd()
        },
        false,
        0,
    );
    assert_eq!(s.scene().len(), 1);
    s.key_down("z", cmd(), false, 0);
    s.key_down("y", cmd(), false, 0);
    assert_eq!(s.scene().len(), 1);
}

#[test]
fn commit_after_undo_discards_future() {
    init();
    let mut s = EditorSession::new(Scene::new());
    s.add_text("one");
    s.add_text("two");
    s.undo();
    assert!(s.can_redo());
    s.add_text("three");
    assert!(!s.can_redo());
    assert!(!s.redo());
    let texts: Vec<&str> = s.scene().elements.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["one", "three"]);
}

#[test]
fn unchanged_scene_commits_once() {
    init();
    let mut scene = Scene::new();
    let mut history = History::new(50, &scene);
    scene.add_text("x");
    assert!(history.commit(&scene));
    assert!(!history.commit(&scene));
    assert_eq!(history.len(), 2);
}

#[test]
fn history_is_bounded_and_evicts_oldest() {
    init();
    let mut scene = Scene::new();
    let mut history = History::new(50, &scene);
    let id = scene.add_text("x").id;
    for i in 0..120 {
        scene.update_text(id, &TextPatch::position(f64::from(i), 0.0));
        history.commit(&scene);
        assert!(history.len() <= 50);
    }
    assert_eq!(history.len(), 50);

    // Walk back to the oldest surviving entry: 120 commits of x = 0..=119,
    // of which the last 50 (x = 70..=119) remain.
    let mut last = None;
    while let Some(snapshot) = history.undo() {
        last = Some(snapshot);
    }
    assert_eq!(last.unwrap().elements[0].x, 70.0);
}

#[test]
fn drag_commits_once_after_settle() {
    init();
    let mut s = EditorSession::with_measurer(
        Scene::new(),
        EditorConfig::default(),
        soma_core::ApproxMeasurer,
    );
    let id = s.add_text("Drag me").unwrap();
    let before = s.history().len();

    // Identity view on a 900px display: logical = surface × 1.2.
    s.pointer_down(450.0, 441.0);
    for step in 1..=30u32 {
        s.pointer_move(450.0 - f64::from(step) * 5.0, 441.0);
        assert!(!s.tick(u64::from(step)), "no commit mid-drag");
    }
    s.pointer_up(1_000);
    assert!(!s.tick(1_050));
    assert!(s.tick(1_100));
    assert_eq!(s.history().len(), before + 1);

    let moved = s.scene().get(id).unwrap();
    assert!((moved.x - 360.0).abs() < 1e-9);
    s.undo();
    assert_eq!(s.scene().get(id).unwrap().x, 540.0);
}

#[test]
fn pending_edit_is_flushed_before_undo() {
    init();
    let mut s = EditorSession::new(Scene::new());
    let id = s.add_text("a").unwrap();
    s.update_text(
        id,
        &TextPatch {
            font_size: Some(90.0),
            ..TextPatch::default()
        },
        0,
    );
    // Undo before the settle delay: the edit is committed, then undone.
    assert!(s.undo());
    assert_eq!(s.scene().get(id).unwrap().font_size, 48.0);
    assert!(s.redo());
    assert_eq!(s.scene().get(id).unwrap().font_size, 90.0);
}

#[test]
fn delete_keeps_pending_edit_as_its_own_step() {
    init();
    let mut s = EditorSession::new(Scene::new());
    let id = s.add_text("a").unwrap();
    s.update_text(
        id,
        &TextPatch {
            color: Some(palette::PETROLEO),
            ..TextPatch::default()
        },
        0,
    );
    s.key_down("Delete", Modifiers::NONE, false, 50);
    assert!(s.scene().is_empty());

    assert!(s.undo());
    assert_eq!(s.scene().get(id).unwrap().color, palette::PETROLEO);
    assert!(s.undo());
    assert_eq!(s.scene().get(id).unwrap().color, palette::BLANCO);
}

#[test]
fn duplicate_keeps_pending_nudge_as_its_own_step() {
    init();
    let mut s = EditorSession::new(Scene::new());
    let id = s.add_text("a").unwrap();
    s.key_down("ArrowRight", Modifiers::NONE, false, 0);
    s.key_down("d", cmd(), false, 10);
    assert_eq!(s.scene().len(), 2);

    assert!(s.undo());
    assert_eq!(s.scene().len(), 1);
    assert_eq!(s.scene().get(id).unwrap().x, 541.0);
    assert!(s.undo());
    assert_eq!(s.scene().get(id).unwrap().x, 540.0);
}

#[test]
fn paste_and_background_flush_pending_edits_first() {
    init();
    let mut s = EditorSession::new(Scene::new());
    let id = s.add_text("a").unwrap();
    assert!(s.copy_selected());
    s.update_text(id, &TextPatch::position(100.0, 100.0), 0);
    s.paste().unwrap();
    s.update_text(id, &TextPatch::position(200.0, 200.0), 20);
    assert_eq!(
        s.set_background(Some("data:image/png;base64,AAAA")),
        Ok(true)
    );

    assert!(s.undo());
    assert!(s.scene().background.is_none());
    assert_eq!(s.scene().get(id).unwrap().x, 200.0);
    assert!(s.undo());
    assert_eq!(s.scene().get(id).unwrap().x, 100.0);
    assert_eq!(s.scene().len(), 2);
    assert!(s.undo());
    assert_eq!(s.scene().len(), 1);
    assert_eq!(s.scene().get(id).unwrap().x, 100.0);
    assert!(s.undo());
    assert_eq!(s.scene().get(id).unwrap().x, 540.0);
}
