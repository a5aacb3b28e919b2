use super::*;
use crate::foundation::config::MountOpts;
use crate::render::backend::ResourceKind;
use crate::render::recording::{DrawCommand, RecordingBackend};
use serde_json::json;

fn root() -> RootState<RecordingBackend> {
    let mut gfx = RecordingBackend::new();
    let surface = gfx.make_surface(100, 100).unwrap();
    RootState::new(gfx, surface, &MountOpts::default())
}

fn props(v: serde_json::Value) -> Props {
    v.as_object().cloned().unwrap()
}

#[test]
fn create_instance_applies_initial_props() {
    let mut r = root();
    let id = r
        .create_instance("skRrect", &props(json!({"width": 33})))
        .unwrap();
    let node = r.node(id).unwrap();
    assert_eq!(node.kind(), NodeKind::Rect);
    assert!(node.flags().dirty);
    assert!(node.flags().layout);
    assert_eq!(node.as_rect().unwrap().frame().2, 33.0);
    assert_eq!(r.get_public_instance(id), id);
}

#[test]
fn unknown_type_and_text_are_structural() {
    let mut r = root();
    assert!(r
        .create_instance("div", &Props::new())
        .unwrap_err()
        .is_structural());
    assert!(r.create_text_instance("hi").unwrap_err().is_structural());
    assert!(!r.should_set_text_content("skText", &Props::new()));
}

#[test]
fn failed_create_releases_native_resources() {
    let mut r = root();
    let err = r
        .create_instance("skLine", &props(json!({"x1": "far"})))
        .unwrap_err();
    assert!(matches!(err, crate::SkeneError::Validation(_)));
    assert_eq!(r.gfx().live(ResourceKind::Paint), 0);
    assert!(r.graph().is_empty());
}

#[test]
fn commit_renders_the_tree() {
    let mut r = root();
    let canvas = r.create_instance("skCanvas", &Props::new()).unwrap();
    let rect = r.create_instance("skRrect", &Props::new()).unwrap();
    r.append_initial_child(canvas, rect).unwrap();
    r.append_child_to_container(canvas).unwrap();
    r.prepare_for_commit();
    r.reset_after_commit().unwrap();
    assert!(r.last_commit().is_some());
    assert!(r
        .gfx()
        .commands()
        .iter()
        .any(|c| matches!(c.command, DrawCommand::RRect { .. })));
    assert!(!r.node(rect).unwrap().flags().dirty);
}

#[test]
fn commit_update_diffs_props() {
    let mut r = root();
    let old = props(json!({"x": 1, "width": 5}));
    let id = r.create_instance("skRrect", &old).unwrap();
    *r.node_mut(id).unwrap().flags_mut() = crate::scene::flags::DirtyFlags::CLEAN;
    r.commit_update(id, &old, &props(json!({"x": 2, "width": 5})))
        .unwrap();
    assert!(r.node(id).unwrap().flags().layout);
    assert!(!r.node(id).unwrap().flags().paint);
}

#[test]
fn remove_and_clear_delete_nodes() {
    let mut r = root();
    let canvas = r.create_instance("skCanvas", &Props::new()).unwrap();
    let text = r.create_instance("skText", &Props::new()).unwrap();
    r.append_child(canvas, text).unwrap();
    r.append_child_to_container(canvas).unwrap();
    r.remove_child(canvas, text).unwrap();
    assert_eq!(r.gfx().live(ResourceKind::Font), 0);
    r.clear_container().unwrap();
    assert!(r.graph().is_empty());
}

#[test]
fn now_is_wall_clock_millis() {
    let r = root();
    assert!(r.now() > 1.0e12);
}

#[test]
fn checks_reject_without_allocating() {
    let r = root();
    assert!(r.check_instance("skRrect", &Props::new()).is_ok());
    assert!(r.check_instance("skCircle", &Props::new()).unwrap_err().is_structural());
    let mut bad = Props::new();
    bad.insert("x".to_owned(), serde_json::json!("left"));
    assert!(r.check_instance("skRrect", &bad).is_err());
    assert!(r.check_text_instance("hi").unwrap_err().is_structural());
    assert_eq!(r.gfx().allocated(ResourceKind::Paint), 0);
    assert!(r.graph().is_empty());
}
