//! Floating media anchors driven through the editor's pointer entry points.

use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use rstest::rstest;
use tempfile::TempDir;
use workpad_editor::{
    Editor, EditorConfig, MediaAnchor, NodeId, Point, PointerInput, PointerRegion, StaticLayout,
    Surface,
};

fn mounted(width: f64, height: f64) -> (Editor, Rc<RefCell<Vec<String>>>) {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&calls);
    let mut editor = Editor::new(EditorConfig::default(), StaticLayout::new(width, height));
    editor.set_on_change(move |raw| sink.borrow_mut().push(raw.to_string()));
    editor.mount("");
    editor.tick();
    (editor, calls)
}

fn find_class(surface: &Surface, class: &str) -> NodeId {
    surface
        .descendants(surface.root())
        .into_iter()
        .find(|&n| surface.element_is(n, |e| e.has_class(class)))
        .expect("element with class present")
}

fn find_tag(surface: &Surface, tag: &str) -> NodeId {
    surface
        .descendants(surface.root())
        .into_iter()
        .find(|&n| surface.element_is(n, |e| e.tag == tag))
        .expect("element present")
}

fn input(x: f64, y: f64, target: NodeId) -> PointerInput {
    PointerInput {
        pointer_id: 7,
        client: Point::new(x, y),
        target: Some(target),
    }
}

fn stored(editor: &Editor) -> MediaAnchor {
    let anchors = editor.anchors();
    assert_eq!(anchors.len(), 1);
    anchors[0].clone()
}

#[test]
fn inserted_anchor_round_trips_through_the_value() {
    let (mut editor, calls) = mounted(800.0, 600.0);

    let inserted = editor.insert_image("data:image/gif;base64,R0lG").unwrap();

    assert_eq!(calls.borrow().len(), 1);
    let value = calls.borrow()[0].clone();
    let reparsed = Surface::from_markup(&value);
    let anchors: Vec<MediaAnchor> = reparsed
        .descendants(reparsed.root())
        .into_iter()
        .filter_map(|n| MediaAnchor::from_node(&reparsed, n))
        .collect();

    assert_eq!(anchors.len(), 1);
    assert_eq!(anchors[0].source, "data:image/gif;base64,R0lG");
    assert!(anchors[0].floating);
    assert_eq!(anchors[0], inserted);
}

#[test]
fn drag_toward_negative_corner_clamps_to_origin() {
    let (mut editor, calls) = mounted(800.0, 600.0);
    let inserted = editor.insert_image("a.png").unwrap();
    assert_eq!(inserted.width, 160.0);
    let image = find_tag(editor.surface().unwrap(), "img");

    editor.on_pointer_down(PointerRegion::Surface, input(30.0, 30.0, image));
    editor.on_pointer_move(input(-10.0, -10.0, image));
    editor.on_pointer_move(input(-50.0, -50.0, image));
    editor.on_pointer_up(input(-50.0, -50.0, image), None);

    assert_eq!(stored(&editor).position, Point::new(0.0, 0.0));
    // insert, then exactly one settle for the whole gesture
    assert_eq!(calls.borrow().len(), 2);
}

#[rstest]
#[case(900.0, 10.0)]
#[case(10.0, 900.0)]
#[case(5000.0, 5000.0)]
fn drag_never_crosses_right_or_bottom_edge(#[case] x: f64, #[case] y: f64) {
    let (mut editor, _) = mounted(500.0, 400.0);
    editor.insert_image("a.png").unwrap();
    let image = find_tag(editor.surface().unwrap(), "img");

    editor.on_pointer_down(PointerRegion::Surface, input(12.0, 12.0, image));
    editor.on_pointer_move(input(x, y, image));
    editor.on_pointer_up(input(x, y, image), None);

    let anchor = stored(&editor);
    let height = anchor.height.unwrap_or(60.0);
    assert!(anchor.position.x + anchor.width <= 500.0);
    assert!(anchor.position.y + height <= 400.0);
    assert!(anchor.position.x >= 0.0 && anchor.position.y >= 0.0);
}

#[rstest]
#[case(-1.0, -1.0)]
#[case(-81.0, -61.0)]
#[case(-100_000.0, -100_000.0)]
fn resize_clamps_at_minimum(#[case] dx: f64, #[case] dy: f64) {
    let (mut editor, _) = mounted(800.0, 600.0);
    editor.insert_image("a.png").unwrap();
    let handle = find_class(editor.surface().unwrap(), "media-anchor-resize");

    // starts at 160x60; the first 80px of width reach the floor
    editor.on_pointer_down(PointerRegion::Surface, input(100.0, 100.0, handle));
    editor.on_pointer_move(input(20.0 + dx, 100.0 + dy, handle));
    editor.on_pointer_up(input(0.0, 0.0, handle), None);

    let anchor = stored(&editor);
    assert_eq!(anchor.width, 80.0);
    assert_eq!(anchor.height, Some(60.0));
}

#[test]
fn pointer_cancel_settles_at_last_position() {
    let (mut editor, calls) = mounted(800.0, 600.0);
    editor.insert_image("a.png").unwrap();
    let image = find_tag(editor.surface().unwrap(), "img");

    editor.on_pointer_down(PointerRegion::Surface, input(12.0, 12.0, image));
    editor.on_pointer_move(input(212.0, 112.0, image));
    editor.on_pointer_cancel(7);

    assert_eq!(stored(&editor).position, Point::new(200.0, 100.0));
    assert_eq!(calls.borrow().len(), 2);
}

#[test]
fn delete_control_removes_anchor_and_syncs() {
    let (mut editor, calls) = mounted(800.0, 600.0);
    editor.insert_image("a.png").unwrap();
    let delete = find_class(editor.surface().unwrap(), "media-anchor-delete");

    editor.on_pointer_down(PointerRegion::Surface, input(0.0, 0.0, delete));

    assert!(editor.anchors().is_empty());
    assert_eq!(calls.borrow().last().map(String::as_str), Some(""));
}

#[test]
fn pointer_down_elsewhere_clears_active_anchor() {
    let (mut editor, _) = mounted(800.0, 600.0);
    editor.insert_image("a.png").unwrap();
    assert!(editor.active_anchor().is_some());

    editor.on_pointer_down(
        PointerRegion::Surface,
        PointerInput {
            pointer_id: 1,
            client: Point::new(500.0, 500.0),
            target: None,
        },
    );

    assert_eq!(editor.active_anchor(), None);
    assert!(!editor.on_key_down("Delete"));
    assert_eq!(editor.anchors().len(), 1);
}

#[test]
fn image_file_is_embedded_as_data_url() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pixel.gif");
    std::fs::write(&path, b"GIF89a").unwrap();
    let (mut editor, _) = mounted(800.0, 600.0);

    let anchor = editor.insert_image_file(&path).unwrap();

    assert_eq!(anchor.source, "data:image/gif;base64,R0lGODlh");
}

#[test]
fn anchor_ids_are_unique_per_document() {
    let (mut editor, _) = mounted(800.0, 600.0);

    let ids: Vec<String> = (0..10)
        .map(|_| editor.insert_image("a.png").unwrap().id)
        .collect();
    let unique: std::collections::HashSet<&String> = ids.iter().collect();

    assert_eq!(unique.len(), ids.len());
}
