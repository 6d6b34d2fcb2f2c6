use roomforge::config::ProjectConfig;
use roomforge::editor::SceneEditor;
use roomforge::ops;

fn editor() -> SceneEditor {
    SceneEditor::new(&ProjectConfig::default())
}

#[test]
fn undo_with_empty_history_is_a_noop() {
    let mut editor = editor();
    assert!(!editor.undo());
    assert!(!editor.redo());
    assert!(editor.objects().is_empty());
    assert!(editor.selected_id().is_none());
}

#[test]
fn undo_steps_back_through_edits() {
    let mut editor = editor();
    editor.add_cube();
    editor.add_sphere();
    assert_eq!(editor.objects().len(), 2);

    assert!(editor.undo());
    assert_eq!(editor.objects().len(), 1);
    assert!(editor.undo());
    assert_eq!(editor.objects().len(), 0);
    assert!(!editor.undo(), "initial empty snapshot is the floor");

    assert!(editor.redo());
    assert!(editor.redo());
    assert_eq!(editor.objects().len(), 2);
    assert!(!editor.redo(), "redo past the newest snapshot is a no-op");
}

#[test]
fn recording_after_undo_discards_redo_branch() {
    let mut editor = editor();
    editor.add_cube(); // A
    let sphere = editor.add_sphere(); // B
    assert!(editor.undo());
    assert!(editor.objects().iter().all(|entity| entity.id != sphere));

    editor.add_light(); // C — replaces B in the timeline
    assert!(!editor.redo(), "redo branch must be gone after a fresh record");
    assert_eq!(editor.objects().len(), 2);
    assert!(editor.objects().iter().all(|entity| entity.id != sphere), "B never comes back");
}

#[test]
fn undo_then_redo_restores_the_same_collection() {
    let mut editor = editor();
    let cube = editor.add_cube();
    editor.rename(&cube, "Pedestal");

    assert!(editor.undo());
    assert_eq!(editor.objects()[0].name, "Cube");
    assert!(editor.redo());
    assert_eq!(editor.objects()[0].name, "Pedestal");
}

#[test]
fn deleting_selected_entity_clears_selection_and_survives_undo() {
    let mut editor = editor();
    let cube = editor.add_cube();
    editor.select(Some(cube));
    assert!(editor.delete_selected());
    assert!(editor.selected_id().is_none());

    assert!(editor.undo());
    assert_eq!(editor.objects().len(), 1);
    assert_eq!(editor.objects()[0].id, cube);
}

#[test]
fn recorded_snapshots_are_isolated_from_later_edits() {
    let mut editor = editor();
    let cube = editor.add_cube();
    editor.recolor(&cube, [0.9, 0.1, 0.1, 1.0]);
    editor.rename(&cube, "Repainted");

    // Walk back to the creation snapshot; the later recolor/rename must
    // not have leaked into it through shared payload state.
    assert!(editor.undo());
    assert!(editor.undo());
    let original = &editor.objects()[0];
    assert_eq!(original.name, "Cube");
    assert_eq!(
        original.node.material.as_ref().unwrap().base_color,
        roomforge::material::rgba_from_hex(ops::CUBE_COLOR)
    );
}

#[test]
fn texture_clear_releases_map_but_history_keeps_it() {
    let mut editor = editor();
    let cube = editor.add_cube();

    let mut png = Vec::new();
    let image = image::RgbaImage::from_pixel(4, 4, image::Rgba([200, 150, 100, 255]));
    image::DynamicImage::ImageRgba8(image)
        .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
        .unwrap();

    assert!(editor.set_texture(&cube, Some(&png)).unwrap());
    assert!(editor.objects()[0].node.material.as_ref().unwrap().base_color_map.is_some());

    assert!(editor.set_texture(&cube, None).unwrap());
    assert!(editor.objects()[0].node.material.as_ref().unwrap().base_color_map.is_none());

    // The textured state is still reachable through history.
    assert!(editor.undo());
    assert!(editor.objects()[0].node.material.as_ref().unwrap().base_color_map.is_some());
}

#[test]
fn undecodable_texture_leaves_history_untouched() {
    let mut editor = editor();
    let cube = editor.add_cube();
    let before = editor.can_redo();

    let err = editor.set_texture(&cube, Some(b"not an image")).unwrap_err();
    assert!(matches!(err, roomforge::EditError::TextureDecode { .. }));
    assert!(editor.objects()[0].node.material.as_ref().unwrap().base_color_map.is_none());
    assert_eq!(editor.can_redo(), before);

    // One undo reaches the empty scene, proving no extra record exists.
    assert!(editor.undo());
    assert!(editor.objects().is_empty());
}
